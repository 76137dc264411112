use std::time::{Duration, Instant};

use crate::animation::{AnimationFrame, LoopCount, SharedAnimation};

/// Playback position within one [`crate::Animation`].
///
/// Frame `i` is visible during `[start_i, start_i + delay_i)` of every pass,
/// measured from the instant the cursor was created. Advancing only depends on
/// the cursor state and the timestamp passed in.
pub struct FrameCursor {
    animation: SharedAnimation,
    start: Instant,
    index: usize,
    remaining: Option<Duration>,
}

struct Position {
    index: usize,
    remaining: Option<Duration>,
}

fn duration_from_nanos(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

fn locate(animation: &SharedAnimation, elapsed: Duration) -> Position {
    let last = animation.frame_count() - 1;
    if animation.is_static() {
        return Position {
            index: 0,
            remaining: None,
        };
    }

    let cycle = animation.cycle_duration().as_nanos();
    let elapsed = elapsed.as_nanos();
    let pass = elapsed / cycle;

    let final_pass = match animation.loop_count() {
        LoopCount::Infinite => None,
        LoopCount::Finite(n) => Some(n.get() as u128 - 1),
    };

    if final_pass.is_some_and(|final_pass| pass > final_pass) {
        return Position {
            index: last,
            remaining: None,
        };
    }

    let mut offset = elapsed % cycle;
    for (index, frame) in animation.frames().iter().enumerate() {
        let delay = frame.delay.as_nanos();
        if offset < delay {
            let remaining = if index == last && final_pass == Some(pass) {
                None
            } else {
                Some(duration_from_nanos(delay - offset))
            };
            return Position { index, remaining };
        }
        offset -= delay;
    }

    Position {
        index: last,
        remaining: None,
    }
}

impl FrameCursor {
    pub fn new(animation: SharedAnimation, now: Instant) -> Self {
        let position = locate(&animation, Duration::ZERO);
        Self {
            animation,
            start: now,
            index: position.index,
            remaining: position.remaining,
        }
    }

    /// Recompute the position for `now`. Returns whether the visible frame changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.start);
        let position = locate(&self.animation, elapsed);
        let changed = position.index != self.index;

        self.index = position.index;
        self.remaining = position.remaining;

        changed
    }

    pub fn frame_index(&self) -> usize {
        self.index
    }

    pub fn current_frame(&self) -> &AnimationFrame {
        // index always comes from `locate`, which stays in bounds
        &self.animation.frames()[self.index]
    }

    /// Time from the last advance until the next frame boundary. `None` once
    /// there are no further frames to show.
    pub fn next_delay(&self) -> Option<Duration> {
        self.remaining
    }

    /// [`Self::next_delay`] rounded up to whole milliseconds
    pub fn next_delay_ms(&self) -> Option<u32> {
        self.remaining.map(|d| {
            let ms = d.as_nanos().div_ceil(1_000_000);
            u32::try_from(ms).unwrap_or(u32::MAX)
        })
    }

    pub fn animation(&self) -> &SharedAnimation {
        &self.animation
    }
}
