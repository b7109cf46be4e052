//! Audio source nodes (generators with no audio inputs)

mod media_source;
mod resampling_source;

pub use media_source::MediaSource;
pub use resampling_source::ResamplingSource;
