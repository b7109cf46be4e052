//! The media element whose audio feeds the graph.
//!
//! Decoding and network retrieval happen elsewhere; the decoder pushes
//! interleaved samples through a [`MediaFeed`]. The element's audio can be
//! routed into a graph exactly once, through [`MediaElement::tap`].

use rtrb::{Consumer, Producer, RingBuffer};

use crate::error::GraphError;
use crate::nodes::MediaSource;

/// A single audio-capable media element.
pub struct MediaElement {
    sample_rate: u32,
    channels: usize,
    /// Set when the current source is cross-origin without CORS approval
    tainted_by: Option<String>,
    consumer: Option<Consumer<f32>>,
}

impl MediaElement {
    /// Create an element decoding at `sample_rate` with `channels` channels,
    /// buffering up to `capacity_frames` frames.
    pub fn new(sample_rate: u32, channels: usize, capacity_frames: usize) -> (Self, MediaFeed) {
        let feed_channels = channels.max(1);
        let (producer, consumer) = RingBuffer::new((capacity_frames * feed_channels).max(1));
        let element = Self {
            sample_rate,
            channels,
            tainted_by: None,
            consumer: Some(consumer),
        };
        let feed = MediaFeed {
            producer,
            channels: feed_channels,
        };
        (element, feed)
    }

    /// Mark the element as playing a cross-origin source from `url`.
    pub fn with_cross_origin_source(mut self, url: impl Into<String>) -> Self {
        self.tainted_by = Some(url.into());
        self
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn is_tapped(&self) -> bool {
        self.consumer.is_none()
    }

    /// Route this element's audio into a graph.
    ///
    /// Succeeds once. A cross-origin element, one with more than two
    /// channels or one without a sample rate cannot be tapped at all.
    pub fn tap(&mut self) -> Result<MediaSource, GraphError> {
        if self.consumer.is_none() {
            return Err(GraphError::SourceAlreadyTapped);
        }
        if let Some(url) = &self.tainted_by {
            return Err(GraphError::CrossOrigin { url: url.clone() });
        }
        if !(1..=2).contains(&self.channels) {
            return Err(GraphError::UnsupportedChannelCount(self.channels));
        }
        if self.sample_rate == 0 {
            return Err(GraphError::InvalidConfig("media sample rate must be > 0".into()));
        }

        let consumer = self.consumer.take().ok_or(GraphError::SourceAlreadyTapped)?;
        tracing::debug!(rate = self.sample_rate, channels = self.channels, "media element tapped");
        Ok(MediaSource::new(consumer, self.channels, self.sample_rate))
    }
}

/// The decoder's side of a [`MediaElement`].
pub struct MediaFeed {
    producer: Producer<f32>,
    channels: usize,
}

impl MediaFeed {
    /// Push interleaved samples, returning how many were accepted.
    ///
    /// Only whole frames are written.
    pub fn push_interleaved(&mut self, samples: &[f32]) -> usize {
        let frames = (self.producer.slots() / self.channels).min(samples.len() / self.channels);
        let count = frames * self.channels;
        for &sample in &samples[..count] {
            if self.producer.push(sample).is_err() {
                break;
            }
        }
        count
    }

    /// Frames that can be pushed without blocking
    pub fn free_frames(&self) -> usize {
        self.producer.slots() / self.channels
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_taps_exactly_once() {
        let (mut element, _feed) = MediaElement::new(48_000, 2, 1024);
        assert!(element.tap().is_ok());
        assert!(element.is_tapped());
        assert!(matches!(element.tap(), Err(GraphError::SourceAlreadyTapped)));
    }

    #[test]
    fn cross_origin_source_cannot_be_tapped() {
        let (element, _feed) = MediaElement::new(48_000, 2, 1024);
        let mut element = element.with_cross_origin_source("https://cdn.example/v.m4a");
        match element.tap() {
            Err(GraphError::CrossOrigin { url }) => assert_eq!(url, "https://cdn.example/v.m4a"),
            other => panic!("unexpected {:?}", other.err()),
        }
        assert!(!element.is_tapped());
    }

    #[test]
    fn surround_media_is_rejected() {
        let (mut element, _feed) = MediaElement::new(48_000, 6, 16);
        assert!(matches!(element.tap(), Err(GraphError::UnsupportedChannelCount(6))));
    }

    #[test]
    fn media_without_a_sample_rate_is_rejected() {
        let (mut element, _feed) = MediaElement::new(0, 2, 16);
        assert!(matches!(element.tap(), Err(GraphError::InvalidConfig(_))));
        assert!(!element.is_tapped());
    }

    #[test]
    fn feed_writes_whole_frames_only() {
        let (_element, mut feed) = MediaElement::new(48_000, 2, 4);
        assert_eq!(feed.push_interleaved(&[0.1, 0.2, 0.3]), 2);
        assert_eq!(feed.free_frames(), 3);
        assert_eq!(feed.push_interleaved(&[0.0; 10]), 6);
        assert_eq!(feed.free_frames(), 0);
    }
}
