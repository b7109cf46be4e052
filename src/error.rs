//! Error types for graph construction and playback.

use thiserror::Error;

/// Errors raised while building the audio graph or its output.
///
/// None of these are fatal to playback: the media keeps playing, only the
/// karaoke effects become unavailable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Media source at {url} is cross-origin; its audio cannot be tapped")]
    CrossOrigin { url: String },

    #[error("Media element audio is already routed into a graph")]
    SourceAlreadyTapped,

    #[error("Unsupported media channel count: {0} (expected 1 or 2)")]
    UnsupportedChannelCount(usize),

    #[error("No audio output device available")]
    NoOutputDevice,

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Routing error: {0}")]
    Routing(String),
}

/// Failure to turn a song id into a playable stream URL.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Stream resolver returned an empty URL")]
    Empty,

    #[error("Stream resolver failed: {0}")]
    Backend(String),
}

/// Media element error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    SourceNotSupported = 4,
}

impl MediaErrorCode {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Aborted),
            2 => Some(Self::Network),
            3 => Some(Self::Decode),
            4 => Some(Self::SourceNotSupported),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Aborted => "MEDIA_ERR_ABORTED",
            Self::Network => "MEDIA_ERR_NETWORK",
            Self::Decode => "MEDIA_ERR_DECODE",
            Self::SourceNotSupported => "MEDIA_ERR_SRC_NOT_SUPPORTED",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Aborted => "playback aborted by the user",
            Self::Network => "network error",
            Self::Decode => "decode error, the format may be unsupported",
            Self::SourceNotSupported => "unsupported source or format",
        }
    }
}

/// Errors surfaced while starting playback of a song.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The start was interrupted by a newer load request. Expected; never shown to the user.
    #[error("Playback aborted by a newer request")]
    Aborted,

    #[error("Playback not allowed: {0}")]
    NotAllowed(String),

    #[error("Media error {} ({}): {}", .0.code(), .0.name(), .0.description())]
    Media(MediaErrorCode),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl PlaybackError {
    /// Whether this failure should be shown to the user.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, PlaybackError::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_codes_round_trip_through_numbers() {
        for code in 1..=4 {
            let parsed = MediaErrorCode::from_code(code).unwrap();
            assert_eq!(parsed.code(), code);
        }
        assert_eq!(MediaErrorCode::from_code(9), None);
    }

    #[test]
    fn media_error_message_names_the_code() {
        let msg = PlaybackError::Media(MediaErrorCode::Network).to_string();
        assert!(msg.contains("MEDIA_ERR_NETWORK"));
        assert!(msg.starts_with("Media error 2"));
    }

    #[test]
    fn aborted_is_not_user_visible() {
        assert!(!PlaybackError::Aborted.is_user_visible());
        assert!(PlaybackError::Resolve(ResolveError::Empty).is_user_visible());
    }
}
