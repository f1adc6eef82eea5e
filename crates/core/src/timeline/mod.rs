use serde::Serialize;

use crate::{
    scene::ComponentId,
    script::{validate_timeline, SegmentDescriptor},
    ClockError, Result,
};

/// Playback position and transport flags for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackClock {
    pub segment_index: usize,
    /// Playback seconds spent in the current segment.
    pub segment_elapsed: f64,
    /// Playback seconds accumulated since the last reset.
    pub total_elapsed: f64,
    pub playing: bool,
    pub speed: f32,
}

impl PlaybackClock {
    pub fn new(speed: f32) -> Self {
        Self {
            segment_index: 0,
            segment_elapsed: 0.0,
            total_elapsed: 0.0,
            playing: false,
            speed,
        }
    }

    /// Rewinds to the first segment and stops. The speed setting is kept.
    pub fn reset(&mut self) {
        self.segment_index = 0;
        self.segment_elapsed = 0.0;
        self.total_elapsed = 0.0;
        self.playing = false;
    }

    /// Adds `delta * speed` to both timers while playing; returns the amount added.
    ///
    /// The timers are `f64` so frame-sized steps still register after days
    /// of accumulated playback.
    pub fn advance(&mut self, delta: f32) -> f64 {
        if !self.playing {
            return 0.0;
        }
        let scaled = f64::from(delta) * f64::from(self.speed);
        self.segment_elapsed += scaled;
        self.total_elapsed += scaled;
        scaled
    }
}

/// Emitted by [`SegmentSequencer::advance`] when time crosses a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Playback moved on to the segment at this index.
    Entered(usize),
    /// The last segment ran out and playback stopped.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// Fraction of the whole tour, in `[0, 1]`.
    pub overall: f32,
    /// Fraction of the current segment, in `[0, 1]`.
    pub segment: f32,
    pub index: usize,
    pub count: usize,
}

/// Walks the segment list as playback time accumulates.
#[derive(Debug, Clone)]
pub struct SegmentSequencer {
    segments: Vec<SegmentDescriptor>,
    starts: Vec<f64>,
    total_duration: f64,
    clock: PlaybackClock,
}

impl SegmentSequencer {
    pub fn new(segments: Vec<SegmentDescriptor>, speed: f32) -> Result<Self> {
        validate_timeline(&segments)?;
        validate_speed(speed)?;

        let mut starts = Vec::with_capacity(segments.len());
        let mut total_duration = 0.0;
        for segment in &segments {
            starts.push(total_duration);
            total_duration += f64::from(segment.duration);
        }

        Ok(Self {
            segments,
            starts,
            total_duration,
            clock: PlaybackClock::new(speed),
        })
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn segments(&self) -> &[SegmentDescriptor] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: construction rejects empty timelines.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.clock.segment_index
    }

    pub fn current(&self) -> &SegmentDescriptor {
        &self.segments[self.clock.segment_index]
    }

    /// Playback offset at which the segment at `index` begins.
    pub fn segment_start(&self, index: usize) -> Option<f64> {
        self.starts.get(index).copied()
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn is_playing(&self) -> bool {
        self.clock.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.clock.playing = playing;
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.clock.playing = !self.clock.playing;
        self.clock.playing
    }

    pub fn speed(&self) -> f32 {
        self.clock.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        validate_speed(speed)?;
        self.clock.speed = speed;
        Ok(())
    }

    /// Accumulates playback time and moves to the next segment once the
    /// current one has run its full duration.
    ///
    /// Time past the boundary is dropped: the new segment starts at zero.
    /// At most one boundary is crossed per call. Past the final segment
    /// playback stops and the index stays on the last segment.
    pub fn advance(&mut self, delta: f32) -> Option<SequencerEvent> {
        if self.clock.advance(delta) <= 0.0 {
            return None;
        }

        let duration = f64::from(self.current().duration);
        if self.clock.segment_elapsed < duration {
            return None;
        }

        let next = self.clock.segment_index + 1;
        if next < self.segments.len() {
            self.clock.segment_index = next;
            self.clock.segment_elapsed = 0.0;
            tracing::info!(index = next, id = %self.segments[next].id, "entered segment");
            Some(SequencerEvent::Entered(next))
        } else {
            self.clock.segment_elapsed = duration;
            self.clock.playing = false;
            tracing::info!(total = self.clock.total_elapsed, "reached end of timeline");
            Some(SequencerEvent::Finished)
        }
    }

    /// Moves to `index`, clamped to the last segment, from its beginning.
    pub fn jump_to(&mut self, index: usize) -> usize {
        let index = index.min(self.segments.len() - 1);
        self.clock.segment_index = index;
        self.clock.segment_elapsed = 0.0;
        tracing::debug!(index, id = %self.segments[index].id, "jumped to segment");
        index
    }

    pub fn next(&mut self) -> usize {
        self.jump_to(self.clock.segment_index.saturating_add(1))
    }

    pub fn previous(&mut self) -> usize {
        self.jump_to(self.clock.segment_index.saturating_sub(1))
    }

    pub fn reset(&mut self) {
        self.clock.reset();
        tracing::debug!("timeline reset");
    }

    pub fn segment_progress(&self) -> f32 {
        (self.clock.segment_elapsed / f64::from(self.current().duration)).clamp(0.0, 1.0) as f32
    }

    pub fn progress(&self) -> Progress {
        let index = self.clock.segment_index;
        let overall =
            ((self.starts[index] + self.clock.segment_elapsed) / self.total_duration).clamp(0.0, 1.0)
                as f32;
        Progress {
            overall,
            segment: self.segment_progress(),
            index,
            count: self.segments.len(),
        }
    }

    /// First segment whose focus includes `id`.
    pub fn find_focus(&self, id: ComponentId) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| segment.focus.contains(&id))
    }
}

fn validate_speed(speed: f32) -> Result<()> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(ClockError::UnsupportedSpeed(speed))
    }
}
