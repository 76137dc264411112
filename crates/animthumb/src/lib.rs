mod animation;
mod cache;
pub mod clock;
mod cursor;
pub mod decode;
mod error;
mod iterator;
mod main_loop;
mod paintable;
mod result;
pub mod settings;
mod storage;
mod thumbnail;
pub mod ui;

#[cfg(test)]
mod test_util;

pub use animation::{Animation, AnimationFrame, LoopCount, SharedAnimation};
pub use cache::{AnimationCache, DEFAULT_CAPACITY};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use cursor::FrameCursor;
pub use decode::{decode, is_animated, is_supported, load};
pub use error::Error;
pub use iterator::FrameIterator;
pub use main_loop::{MainLoop, TimerId};
pub use paintable::{AnimatedPaintable, FrameBitmap, Paintable, Surface};
pub use result::Result;
pub use settings::{PlaybackMode, Settings, SettingsHandler};
pub use storage::{DataPath, DataPathType};
pub use thumbnail::{AnimatedThumbnails, Thumbnail};
