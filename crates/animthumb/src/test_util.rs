use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::{Color32, ColorImage};

use crate::animation::{Animation, AnimationFrame, LoopCount, SharedAnimation};
use crate::clock::{Clock, ManualClock};
use crate::main_loop::MainLoop;

pub const FRAME_COLORS: [Color32; 3] = [Color32::RED, Color32::GREEN, Color32::BLUE];

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn solid_frame(color: Color32, size: [usize; 2], delay_ms: u64) -> AnimationFrame {
    AnimationFrame::new(ColorImage::new(size, color), ms(delay_ms))
}

/// red, green, blue at 100ms each
pub fn three_frames(loop_count: LoopCount) -> SharedAnimation {
    let frames = FRAME_COLORS
        .iter()
        .map(|c| solid_frame(*c, [4, 4], 100))
        .collect();

    Arc::new(Animation::new(frames, loop_count).expect("valid test animation"))
}

pub fn manual_loop() -> (Arc<ManualClock>, MainLoop) {
    let clock = Arc::new(ManualClock::new());
    let main_loop = MainLoop::new(clock.clone());
    (clock, main_loop)
}

/// Step simulated time forward by `by`, jumping from deadline to deadline and
/// dispatching whatever is due at each one
pub fn run_for(clock: &ManualClock, main_loop: &MainLoop, by: Duration) {
    let end: Instant = clock.now() + by;

    while let Some(deadline) = main_loop.next_deadline() {
        if deadline > end {
            break;
        }
        clock.set(deadline);
        main_loop.dispatch();
    }

    clock.set(end);
    main_loop.dispatch();
}
