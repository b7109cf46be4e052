use criterion::{black_box, criterion_group, criterion_main, Criterion};
use karaoke_graph::nodes::{PitchShifter, PitchShifterMessage, RtrbSink};
use karaoke_graph::{AudioGraphController, EngineConfig, Engine, MediaElement, PitchConfig, RingDestination};

const RATE: u32 = 48_000;

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("PitchShifter block", |b| {
        let (producer, mut consumer) = rtrb::RingBuffer::<f32>::new(4096);
        let mut engine = Engine::new(RATE).with_output(RtrbSink::stereo(producer));
        let mut shifter = engine.add(PitchShifter::new(PitchConfig::default(), RATE));
        engine.output(&shifter).unwrap();
        shifter.send(PitchShifterMessage::SetPitchOffset(-0.25)).unwrap();

        b.iter(|| {
            engine.process();
            while let Ok(s) = consumer.pop() {
                black_box(s);
            }
        })
    });

    c.bench_function("karaoke graph block", |b| {
        let (media, mut feed) = MediaElement::new(RATE, 2, 4096);
        let (dest, mut rendered) = RingDestination::new(RATE, 4096);
        let mut controller = AudioGraphController::new(EngineConfig::default(), media, dest);
        controller.initialize().unwrap();
        controller.resume_if_suspended();
        controller.set_mode(true);
        controller.set_pitch_offset(-0.5);

        let noise: Vec<f32> = (0..128).map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0).collect();

        b.iter(|| {
            feed.push_interleaved(&noise);
            controller.process();
            while let Ok(s) = rendered.pop() {
                black_box(s);
            }
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
