use egui::ColorImage;

use crate::animation::SharedAnimation;
use crate::clock::{SharedClock, SystemClock};
use crate::cursor::FrameCursor;

/// Steps through an animation without rendering anything. The caller decides
/// when to advance, eg. hover previews that pace themselves.
pub struct FrameIterator {
    cursor: FrameCursor,
    clock: SharedClock,
}

impl FrameIterator {
    pub fn new(animation: SharedAnimation) -> Self {
        Self::with_clock(animation, SystemClock::shared())
    }

    pub fn with_clock(animation: SharedAnimation, clock: SharedClock) -> Self {
        let cursor = FrameCursor::new(animation, clock.now());
        Self { cursor, clock }
    }

    pub fn current_frame(&self) -> &ColorImage {
        &self.cursor.current_frame().image
    }

    pub fn frame_index(&self) -> usize {
        self.cursor.frame_index()
    }

    /// Move the cursor to the present time. Returns whether the visible frame
    /// changed.
    pub fn advance(&mut self) -> bool {
        self.cursor.advance(self.clock.now())
    }

    /// `None` when this is the final frame and stepping should stop
    pub fn next_delay_ms(&self) -> Option<u32> {
        self.cursor.next_delay_ms()
    }

    pub fn animation(&self) -> &SharedAnimation {
        self.cursor.animation()
    }
}
