//! Synthetic karaoke mix through the default output device
//!
//! A centered "vocal" tone over two hard-panned "instruments". Every two
//! seconds the demo flips between Guide and Singing mode and raises the key.
//!
//! Run with: cargo run --example karaoke_tone --features cpal_sink

use std::f32::consts::TAU;
use std::thread::sleep;
use std::time::{Duration, Instant};

use karaoke_graph::{AudioGraphController, CpalDevice, EngineConfig, KeyShift, MediaElement};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let device = CpalDevice::default_output()?;
    println!("Output: {} ({} Hz, {} ch)", device.name(), device.sample_rate(), device.channels());

    let media_rate = 44_100;
    let (media, mut feed) = MediaElement::new(media_rate, 2, 8192);
    let mut controller = AudioGraphController::new(EngineConfig::default(), media, device);
    controller.initialize()?;
    controller.resume_if_suspended();

    let rate = controller.sample_rate().map(f64::from).unwrap_or(48_000.0);
    let mut frame = 0u64;
    let mut chunk = Vec::with_capacity(8192 * 2);
    let mut key = KeyShift::default();

    println!("Playing... Ctrl+C to stop");

    let start = Instant::now();
    let mut blocks = 0u64;
    let mut next_toggle = Duration::from_secs(2);

    loop {
        // "decode" enough media to keep the graph fed
        chunk.clear();
        for _ in 0..feed.free_frames() {
            let t = frame as f32 / media_rate as f32;
            let vocal = 0.3 * (TAU * 330.0 * t).sin();
            let left = 0.2 * (TAU * 220.0 * t).sin();
            let right = 0.2 * (TAU * 165.0 * t).sin();
            chunk.push(vocal + left);
            chunk.push(vocal + right);
            frame += 1;
        }
        feed.push_interleaved(&chunk);

        let target = (start.elapsed().as_secs_f64() * rate / 64.0) as u64 + 6; // 6 blocks buffer
        while blocks < target {
            controller.process();
            blocks += 1;
        }

        if start.elapsed() >= next_toggle {
            next_toggle += Duration::from_secs(2);
            let singing = !controller.mode().is_singing();
            controller.set_mode(singing);
            if singing {
                key.shift(2);
                controller.set_pitch_offset(key.ratio());
            }
            println!("{:?}, key {}", controller.mode(), key);
        }

        sleep(Duration::from_micros(500));
    }
}
