use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use egui::ColorImage;

use crate::{Error, Result};

/// Zero-delay frames would make the paintable reschedule itself immediately
const MIN_DELAY: Duration = Duration::from_millis(1);

pub type SharedAnimation = Arc<Animation>;

/// One decoded frame, already composited onto the full canvas
#[derive(Clone)]
pub struct AnimationFrame {
    pub image: Arc<ColorImage>,
    pub delay: Duration,
}

impl AnimationFrame {
    pub fn new(image: ColorImage, delay: Duration) -> Self {
        Self {
            image: Arc::new(image),
            delay,
        }
    }
}

/// How many times the frame sequence is played before freezing on the last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    #[default]
    Infinite,
    Finite(NonZeroU32),
}

/// A decoded, immutable multi-frame image. Shared between any number of
/// [`crate::FrameIterator`]s and [`crate::AnimatedPaintable`]s via [`SharedAnimation`].
pub struct Animation {
    width: u32,
    height: u32,
    frames: Vec<AnimationFrame>,
    loop_count: LoopCount,
    cycle: Duration,
}

impl Animation {
    pub fn new(mut frames: Vec<AnimationFrame>, loop_count: LoopCount) -> Result<Self> {
        let Some(first) = frames.first() else {
            return Err(Error::invalid_argument("animation has no frames"));
        };

        let size = first.image.size;
        if let Some(pos) = frames.iter().position(|f| f.image.size != size) {
            return Err(Error::invalid_argument(format!(
                "frame {pos} is {:?}, expected {size:?}",
                frames[pos].image.size
            )));
        }

        for frame in frames.iter_mut() {
            frame.delay = frame.delay.max(MIN_DELAY);
        }

        let cycle = frames.iter().map(|f| f.delay).sum();

        Ok(Self {
            width: size[0] as u32,
            height: size[1] as u32,
            frames,
            loop_count,
            cycle,
        })
    }

    /// A single frame resource. Never schedules a frame change.
    pub fn still(image: ColorImage) -> Self {
        let size = image.size;
        Self {
            width: size[0] as u32,
            height: size[1] as u32,
            frames: vec![AnimationFrame::new(image, Duration::ZERO)],
            loop_count: LoopCount::Infinite,
            cycle: Duration::ZERO,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// true if there is exactly one frame, ie. not truly animated
    pub fn is_static(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&AnimationFrame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    /// Total duration of one pass over every frame
    pub fn cycle_duration(&self) -> Duration {
        self.cycle
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frames", &self.frames.len())
            .field("loop_count", &self.loop_count)
            .finish()
    }
}
