//! Audio destinations: where the finished mix goes.
//!
//! A [`Destination`] fixes the graph's sample rate and builds the sink node
//! at the end of it. [`RingDestination`] renders into a ring buffer (offline
//! rendering and tests); [`CpalDevice`] plays through a sound card.

#[cfg(feature = "cpal_sink")]
use alloc::{string::String, vec::Vec};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::error::GraphError;
use crate::node::AudioNode;
use crate::nodes::RtrbSink;

#[cfg(feature = "cpal_sink")]
use cpal::traits::{DeviceTrait, HostTrait};

/// Something the karaoke graph can play into.
pub trait Destination {
    /// The sink node terminating the graph
    type Sink: AudioNode<Message = ()>;

    /// Rate the whole graph runs at
    fn sample_rate(&self) -> u32;

    /// Build the sink. Called once, when the graph is built.
    fn create_sink(&mut self) -> Result<Self::Sink, GraphError>;
}

/// Renders the mix as interleaved stereo into a ring buffer.
///
/// ```
/// use karaoke_graph::{Destination, RingDestination};
///
/// let (mut dest, mut rendered) = RingDestination::new(44_100, 4096);
/// assert_eq!(dest.sample_rate(), 44_100);
/// let _sink = dest.create_sink().unwrap();
/// assert!(rendered.pop().is_err());
/// ```
pub struct RingDestination {
    sample_rate: u32,
    producer: Option<Producer<f32>>,
}

impl RingDestination {
    /// `capacity` is in samples (two per stereo frame).
    pub fn new(sample_rate: u32, capacity: usize) -> (Self, Consumer<f32>) {
        let (producer, consumer) = RingBuffer::new(capacity);
        let dest = Self {
            sample_rate,
            producer: Some(producer),
        };
        (dest, consumer)
    }
}

impl Destination for RingDestination {
    type Sink = RtrbSink;

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn create_sink(&mut self) -> Result<RtrbSink, GraphError> {
        self.producer
            .take()
            .map(RtrbSink::stereo)
            .ok_or_else(|| GraphError::Stream("ring destination already has a sink".into()))
    }
}

/// A discovered audio output device.
///
/// Use [`CpalDevice::default_output`] to get the system default, or
/// [`CpalDevice::list_outputs`] to enumerate all available devices.
///
/// ```no_run
/// use karaoke_graph::CpalDevice;
///
/// for device in CpalDevice::list_outputs() {
///     println!("{}: {} Hz, {} ch", device.name(), device.sample_rate(), device.channels());
/// }
/// ```
#[cfg(feature = "cpal_sink")]
pub struct CpalDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
    name: String,
    sample_rate: u32,
    channels: u16,
}

#[cfg(feature = "cpal_sink")]
impl CpalDevice {
    /// The system's default output device.
    pub fn default_output() -> Result<Self, GraphError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(GraphError::NoOutputDevice)?;
        Self::from_device(device).ok_or(GraphError::NoOutputDevice)
    }

    /// All output devices that report a usable default config.
    pub fn list_outputs() -> Vec<Self> {
        let host = cpal::default_host();
        host.output_devices()
            .map(|devices| devices.filter_map(Self::from_device).collect())
            .unwrap_or_default()
    }

    fn from_device(device: cpal::Device) -> Option<Self> {
        let config = device.default_output_config().ok()?;
        let name = device.name().unwrap_or_else(|_| String::from("Unknown"));
        Some(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

#[cfg(feature = "cpal_sink")]
impl Destination for CpalDevice {
    type Sink = crate::nodes::CpalSink;

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn create_sink(&mut self) -> Result<Self::Sink, GraphError> {
        crate::nodes::CpalSink::new(&self.device, &self.config)
    }
}
