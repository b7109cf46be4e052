//! Semitone key control.

use core::fmt;

/// Largest shift in either direction, one octave.
pub const MAX_SEMITONES: i32 = 12;

/// Half-width of the key indicator track.
const INDICATOR_RANGE: i32 = 5;

/// Key shift in semitones, always within `-12..=12`.
///
/// Positive values are higher. The delay-line shifter works the other way
/// round (a negative modulation depth raises pitch), so [`ratio`](Self::ratio)
/// flips the sign.
///
/// ```
/// use karaoke_graph::KeyShift;
///
/// let mut key = KeyShift::default();
/// key.shift(3);
/// assert_eq!(key.to_string(), "♯ 3");
/// assert_eq!(key.ratio(), -0.25);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyShift(i32);

impl KeyShift {
    pub fn new(semitones: i32) -> Self {
        Self(semitones.clamp(-MAX_SEMITONES, MAX_SEMITONES))
    }

    #[inline]
    pub fn semitones(self) -> i32 {
        self.0
    }

    /// Move by `delta` semitones, saturating at the range ends.
    pub fn shift(&mut self, delta: i32) -> Self {
        *self = Self::new(self.0.saturating_add(delta));
        *self
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    #[inline]
    pub fn is_original(self) -> bool {
        self.0 == 0
    }

    /// Pitch offset ratio for the shifter, `-semitones / 12`.
    ///
    /// The shifter's playback rate is `1 - ratio`, linear in semitones
    /// rather than `2^(n/12)`: ♯ 12 plays at twice the speed (an octave up)
    /// but ♭ 6 already plays at half speed (an octave down), and ♭ 12 gives
    /// a rate of zero, which holds the delayed signal still.
    #[inline]
    pub fn ratio(self) -> f32 {
        -(self.0 as f32) / MAX_SEMITONES as f32
    }

    /// Position of the key indicator, clamped to `-5..=5`.
    ///
    /// Raising the key moves the indicator left (negative).
    pub fn indicator_offset(self) -> i32 {
        (-self.0).clamp(-INDICATOR_RANGE, INDICATOR_RANGE)
    }
}

impl fmt::Display for KeyShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("原調"),
            n if n > 0 => write!(f, "♯ {}", n),
            n => write!(f, "♭ {}", n.abs()),
        }
    }
}
