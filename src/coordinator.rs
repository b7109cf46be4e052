//! Playback coordination: the song queue, play-request generations and
//! the hooks that bring the karaoke graph up when playback starts.
//!
//! Resolving a song into a stream URL is asynchronous and handled by the
//! caller. [`PlaybackCoordinator::play`] hands out a [`PlayTicket`]; the
//! caller resolves the ticket's song and reports back through
//! [`on_stream_resolved`](PlaybackCoordinator::on_stream_resolved). Every
//! `play` bumps the generation, so a ticket from an older request is
//! discarded on arrival without touching the player.
//!
//! Timers are the caller's too: a failed start schedules an advance to the
//! next song, which fires from [`poll`](PlaybackCoordinator::poll).

use std::time::Instant;

use crate::config::CoordinatorConfig;
use crate::controller::{AudioGraphController, Mode};
use crate::destination::Destination;
use crate::error::{MediaErrorCode, PlaybackError, ResolveError};
use crate::key::KeyShift;

/// A queued song.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    pub id: String,
    pub title: String,
}

impl Song {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// The media element, as seen by the coordinator.
pub trait MediaPlayer {
    /// Stop playback and drop the current source.
    fn reset(&mut self);

    fn set_source(&mut self, url: &str);

    /// Start playback of the current source.
    ///
    /// [`PlaybackError::Aborted`] means a newer load interrupted this one.
    fn play(&mut self) -> Result<(), PlaybackError>;
}

/// Where user-visible failures go.
pub trait Notifier {
    fn report(&mut self, error: &PlaybackError);
}

/// Identifies one play request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayTicket {
    generation: u64,
    index: usize,
    song_id: String,
}

impl PlayTicket {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Song to resolve
    pub fn song_id(&self) -> &str {
        &self.song_id
    }
}

/// What became of a resolved play request.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayOutcome {
    Started,
    /// A newer request was issued first; nothing changed
    Discarded,
    /// The start was interrupted by a newer load; logged only
    Aborted,
    /// Reported to the user; the next song plays at `retry_at`
    Failed { error: PlaybackError, retry_at: Instant },
}

#[derive(Clone, Copy, Debug)]
struct ScheduledAdvance {
    at: Instant,
    generation: u64,
}

/// Owns the playback session: queue, current index, generation counter,
/// key shift and the audio graph controller.
pub struct PlaybackCoordinator<P, N, D: Destination> {
    config: CoordinatorConfig,
    player: P,
    notifier: N,
    controller: AudioGraphController<D>,
    queue: Vec<Song>,
    current: Option<usize>,
    generation: u64,
    key: KeyShift,
    advance: Option<ScheduledAdvance>,
}

impl<P, N, D> PlaybackCoordinator<P, N, D>
where
    P: MediaPlayer,
    N: Notifier,
    D: Destination,
{
    pub fn new(
        config: CoordinatorConfig,
        player: P,
        notifier: N,
        controller: AudioGraphController<D>,
    ) -> Self {
        Self {
            config,
            player,
            notifier,
            controller,
            queue: Vec::new(),
            current: None,
            generation: 0,
            key: KeyShift::default(),
            advance: None,
        }
    }

    pub fn enqueue(&mut self, song: Song) {
        self.queue.push(song);
    }

    pub fn queue(&self) -> &[Song] {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.and_then(|i| self.queue.get(i))
    }

    /// Generation of the newest play request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Begin playing the song at `index`.
    ///
    /// Stops the player and returns a ticket for the caller to resolve.
    /// Out-of-range indices are ignored.
    pub fn play(&mut self, index: usize) -> Option<PlayTicket> {
        let song = self.queue.get(index)?;
        self.generation += 1;
        self.current = Some(index);

        let ticket = PlayTicket {
            generation: self.generation,
            index,
            song_id: song.id.clone(),
        };
        tracing::info!(generation = self.generation, index, title = %song.title, "play requested");

        self.player.reset();
        Some(ticket)
    }

    /// Apply the result of resolving `ticket`'s stream URL.
    pub fn on_stream_resolved(
        &mut self,
        ticket: &PlayTicket,
        resolved: Result<String, ResolveError>,
        now: Instant,
    ) -> PlayOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding result of superseded play request"
            );
            return PlayOutcome::Discarded;
        }

        let url = match resolved {
            Ok(url) if url.is_empty() => return self.fail(ResolveError::Empty.into(), now),
            Ok(url) => url,
            Err(err) => return self.fail(err.into(), now),
        };

        let preview: String = url.chars().take(50).collect();
        tracing::debug!(url = %preview, "stream resolved");
        self.player.set_source(&url);
        self.controller.resume_if_suspended();

        match self.player.play() {
            Ok(()) => {
                tracing::info!(generation = self.generation, "playback started");
                self.on_play();
                PlayOutcome::Started
            }
            Err(PlaybackError::Aborted) => {
                tracing::debug!("play interrupted by a newer load, ignoring");
                PlayOutcome::Aborted
            }
            Err(err) => self.fail(err, now),
        }
    }

    /// The player started playing, by request or by user action.
    ///
    /// Builds the karaoke graph on first use and resumes audio. A graph
    /// that cannot be built leaves playback running without effects.
    pub fn on_play(&mut self) {
        if let Err(err) = self.controller.initialize() {
            tracing::warn!(%err, "audio effects unavailable, continuing playback without them");
        }
        self.controller.resume_if_suspended();
    }

    fn fail(&mut self, error: PlaybackError, now: Instant) -> PlayOutcome {
        tracing::error!(%error, generation = self.generation, "playback failed");
        self.notifier.report(&error);

        let retry_at = now + self.config.retry_delay;
        self.advance = Some(ScheduledAdvance {
            at: retry_at,
            generation: self.generation,
        });
        PlayOutcome::Failed { error, retry_at }
    }

    /// When the scheduled advance fires, if any
    pub fn next_advance_at(&self) -> Option<Instant> {
        self.advance.map(|a| a.at)
    }

    /// Run the scheduled advance if it is due.
    ///
    /// An advance scheduled for a request that has since been superseded is
    /// dropped.
    pub fn poll(&mut self, now: Instant) -> Option<PlayTicket> {
        let advance = self.advance?;
        if now < advance.at {
            return None;
        }
        self.advance = None;

        if advance.generation != self.generation {
            tracing::debug!(stale = advance.generation, "dropping superseded auto-advance");
            return None;
        }
        tracing::info!("auto-advancing after failed start");
        self.play_next()
    }

    /// Play the song after the current one.
    ///
    /// At the end of the queue nothing plays and the current index stays on
    /// the last song.
    pub fn play_next(&mut self) -> Option<PlayTicket> {
        let next = self.current.map_or(0, |i| i + 1);
        if next < self.queue.len() {
            self.play(next)
        } else {
            self.current = self.queue.len().checked_sub(1);
            tracing::debug!("end of queue");
            None
        }
    }

    /// The current song finished.
    pub fn on_ended(&mut self) -> Option<PlayTicket> {
        self.play_next()
    }

    /// The media element reported an error while playing. Reported only.
    pub fn on_media_error(&mut self, code: MediaErrorCode) {
        let error = PlaybackError::Media(code);
        tracing::error!(%error, "media element error");
        self.notifier.report(&error);
    }

    pub fn set_mode(&mut self, singing: bool) {
        self.controller.set_mode(singing);
    }

    pub fn toggle_mode(&mut self) -> Mode {
        let mode = self.controller.mode().toggled();
        self.controller.set_mode(mode.is_singing());
        mode
    }

    /// Move the key by `delta` semitones.
    pub fn shift_pitch(&mut self, delta: i32) -> KeyShift {
        let key = self.key.shift(delta);
        self.controller.set_pitch_offset(key.ratio());
        tracing::debug!(semitones = key.semitones(), "key shifted");
        key
    }

    pub fn reset_pitch(&mut self) {
        self.key.reset();
        self.controller.set_pitch_offset(self.key.ratio());
    }

    pub fn key(&self) -> KeyShift {
        self.key
    }

    pub fn controller(&self) -> &AudioGraphController<D> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut AudioGraphController<D> {
        &mut self.controller
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}
