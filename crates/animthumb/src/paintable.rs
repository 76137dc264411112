use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use egui::ColorImage;
use tracing::trace;

use crate::animation::SharedAnimation;
use crate::cursor::FrameCursor;
use crate::main_loop::{MainLoop, TimerId};

/// Render target for a [`Paintable`]. Blits a bitmap scaled to the given size.
pub trait Surface {
    fn draw_bitmap(&mut self, bitmap: &FrameBitmap, width: f32, height: f32);
}

/// Something with an intrinsic size that can draw itself at any size
pub trait Paintable {
    fn snapshot(&self, surface: &mut dyn Surface, width: f32, height: f32);
    fn intrinsic_width(&self) -> u32;
    fn intrinsic_height(&self) -> u32;
}

/// Render-ready copy of the frame a cursor points at
#[derive(Clone)]
pub struct FrameBitmap {
    frame_index: usize,
    image: Arc<ColorImage>,
}

impl FrameBitmap {
    fn from_cursor(cursor: &FrameCursor) -> Self {
        Self {
            frame_index: cursor.frame_index(),
            image: cursor.current_frame().image.clone(),
        }
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn image(&self) -> &Arc<ColorImage> {
        &self.image
    }

    pub fn size(&self) -> [usize; 2] {
        self.image.size
    }

    /// Whether both bitmaps share the same pixel data
    pub fn same_pixels(&self, other: &FrameBitmap) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

type InvalidateHandler = Rc<dyn Fn()>;

struct PaintableState {
    cursor: FrameCursor,
    bitmap: FrameBitmap,
    playing: bool,
    timer: Option<TimerId>,
    invalidate_handlers: Vec<InvalidateHandler>,
}

/// Plays an [`crate::Animation`] by scheduling itself on a [`MainLoop`].
///
/// While playing there is at most one pending timer, and only when the
/// cursor has a next frame. Each timer fire advances the cursor to the
/// loop's current time, swaps the cached bitmap if the frame changed and
/// notifies invalidate handlers so the host can redraw.
pub struct AnimatedPaintable {
    state: Rc<RefCell<PaintableState>>,
    main_loop: MainLoop,
}

impl AnimatedPaintable {
    /// Shows the first frame immediately. Playback waits for [`Self::start`].
    pub fn new(animation: SharedAnimation, main_loop: &MainLoop) -> Self {
        let cursor = FrameCursor::new(animation, main_loop.now());
        let bitmap = FrameBitmap::from_cursor(&cursor);

        Self {
            state: Rc::new(RefCell::new(PaintableState {
                cursor,
                bitmap,
                playing: false,
                timer: None,
                invalidate_handlers: Vec::new(),
            })),
            main_loop: main_loop.clone(),
        }
    }

    pub fn start(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.playing {
                return;
            }
            state.playing = true;
        }

        schedule_next_frame(&self.state, &self.main_loop);
    }

    /// No timer callback scheduled before this call advances the animation
    /// after it returns.
    pub fn stop(&self) {
        let timer = {
            let mut state = self.state.borrow_mut();
            state.playing = false;
            state.timer.take()
        };

        if let Some(timer) = timer {
            self.main_loop.cancel(timer);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn has_pending_timer(&self) -> bool {
        self.state.borrow().timer.is_some()
    }

    pub fn frame_index(&self) -> usize {
        self.state.borrow().cursor.frame_index()
    }

    pub fn current_bitmap(&self) -> FrameBitmap {
        self.state.borrow().bitmap.clone()
    }

    pub fn animation(&self) -> SharedAnimation {
        self.state.borrow().cursor.animation().clone()
    }

    /// Called whenever the visible frame changes. Handlers may call back into
    /// the paintable.
    pub fn connect_invalidate(&self, handler: impl Fn() + 'static) {
        self.state
            .borrow_mut()
            .invalidate_handlers
            .push(Rc::new(handler));
    }
}

impl Drop for AnimatedPaintable {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Paintable for AnimatedPaintable {
    fn snapshot(&self, surface: &mut dyn Surface, width: f32, height: f32) {
        let bitmap = self.current_bitmap();
        surface.draw_bitmap(&bitmap, width, height);
    }

    fn intrinsic_width(&self) -> u32 {
        self.state.borrow().cursor.animation().width()
    }

    fn intrinsic_height(&self) -> u32 {
        self.state.borrow().cursor.animation().height()
    }
}

fn schedule_next_frame(state: &Rc<RefCell<PaintableState>>, main_loop: &MainLoop) {
    let mut guard = state.borrow_mut();

    let Some(delay) = guard.cursor.next_delay_ms() else {
        guard.timer = None;
        return;
    };

    let weak = Rc::downgrade(state);
    guard.timer = Some(main_loop.schedule(
        Duration::from_millis(delay as u64),
        move |main_loop, id| on_frame_timer(weak, main_loop, id),
    ));
}

fn on_frame_timer(state: Weak<RefCell<PaintableState>>, main_loop: &MainLoop, id: TimerId) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let changed = {
        let mut guard = state.borrow_mut();
        if !guard.playing || guard.timer != Some(id) {
            trace!("ignoring stale frame timer {id:?}");
            return;
        }
        guard.timer = None;

        let now = main_loop.now();
        let changed = guard.cursor.advance(now);
        if changed {
            guard.bitmap = FrameBitmap::from_cursor(&guard.cursor);
        }
        changed
    };

    // reschedule before notifying so a handler calling stop() cancels it
    schedule_next_frame(&state, main_loop);

    if changed {
        let handlers = state.borrow().invalidate_handlers.clone();
        for handler in handlers {
            handler();
        }
    }
}
