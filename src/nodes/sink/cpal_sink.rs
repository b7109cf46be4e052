//! Sound card output through cpal

use std::sync::mpsc;
use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig, SupportedStreamConfig};
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, RingBuffer};

use crate::error::GraphError;
use crate::node::{AudioNode, ProcessContext};
use crate::nodes::RtrbSink;

/// Plays the graph's output on a cpal device.
///
/// The graph side is an [`RtrbSink`]; the device's callback drains the same
/// ring on a thread that owns the stream, and plays silence on underrun.
pub struct CpalSink {
    ring: RtrbSink,
}

impl CpalSink {
    /// Open and start a stream on `device`.
    ///
    /// Returns once the stream is playing, or with the error that kept it
    /// from starting.
    pub fn new(device: &cpal::Device, config: &SupportedStreamConfig) -> Result<Self, GraphError> {
        let stream_config = config.config();
        let channels = stream_config.channels as usize;
        let sample_rate = stream_config.sample_rate.0;
        let (producer, consumer) = RingBuffer::<f32>::new(ring_capacity(sample_rate, channels));

        spawn_stream(device.clone(), config.sample_format(), stream_config, consumer)?;
        tracing::info!(sample_rate, channels, format = ?config.sample_format(), "output stream started");

        Ok(Self {
            ring: RtrbSink::new(producer, channels),
        })
    }
}

/// About 100 ms of interleaved audio.
fn ring_capacity(sample_rate: u32, channels: usize) -> usize {
    (sample_rate as usize / 10 * channels.max(1)).next_power_of_two()
}

fn spawn_stream(
    device: cpal::Device,
    format: SampleFormat,
    config: StreamConfig,
    consumer: Consumer<f32>,
) -> Result<(), GraphError> {
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), GraphError>>();

    thread::Builder::new()
        .name("karaoke-output".into())
        .spawn(move || match open_stream(&device, format, &config, consumer) {
            Ok(_stream) => {
                let _ = ready_tx.send(Ok(()));
                // dropping the stream stops playback
                loop {
                    thread::park();
                }
            }
            Err(err) => {
                let _ = ready_tx.send(Err(err));
            }
        })
        .map_err(|err| GraphError::Stream(err.to_string()))?;

    ready_rx
        .recv()
        .map_err(|_| GraphError::Stream("output thread exited during startup".into()))?
}

fn open_stream(
    device: &cpal::Device,
    format: SampleFormat,
    config: &StreamConfig,
    consumer: Consumer<f32>,
) -> Result<cpal::Stream, GraphError> {
    let stream = match format {
        SampleFormat::F32 => build::<f32>(device, config, consumer),
        SampleFormat::I16 => build::<i16>(device, config, consumer),
        SampleFormat::U16 => build::<u16>(device, config, consumer),
        other => {
            return Err(GraphError::Stream(format!("unsupported sample format {:?}", other)));
        }
    }
    .map_err(|err| GraphError::Stream(err.to_string()))?;

    stream.play().map_err(|err| GraphError::Stream(err.to_string()))?;
    Ok(stream)
}

fn build<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut consumer: Consumer<f32>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for sample in data.iter_mut() {
                *sample = T::from_sample(consumer.pop().unwrap_or(0.0));
            }
        },
        |err| tracing::error!(%err, "output stream error"),
        None,
    )
}

impl AudioNode for CpalSink {
    type Message = ();

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        self.ring.process(ctx, messages, inputs, outputs);
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_holds_about_a_tenth_of_a_second() {
        assert_eq!(ring_capacity(48_000, 2), 16_384);
        assert_eq!(ring_capacity(44_100, 2), 16_384);
        assert_eq!(ring_capacity(96_000, 1), 16_384);
        assert_eq!(ring_capacity(48_000, 6), 32_768);
    }
}
