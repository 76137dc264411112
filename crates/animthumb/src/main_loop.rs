use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::clock::{SharedClock, SystemClock};

type Callback = Box<dyn FnOnce(&MainLoop, TimerId)>;

/// Token for a pending one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Default)]
struct Timers {
    next_id: u64,
    queue: BTreeMap<(Instant, u64), Callback>,
    deadlines: HashMap<u64, Instant>,
}

/// Single threaded cooperative timer loop.
///
/// Timers are one-shot; a callback that wants to fire again schedules a new
/// timer. Nothing runs until the host calls [`MainLoop::dispatch`], which the
/// viewer does once per egui frame. Cloning gives another handle to the same
/// loop.
#[derive(Clone)]
pub struct MainLoop {
    timers: Rc<RefCell<Timers>>,
    clock: SharedClock,
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new(SystemClock::shared())
    }
}

impl MainLoop {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            timers: Default::default(),
            clock,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Run `callback` once, `delay` from now
    pub fn schedule(
        &self,
        delay: Duration,
        callback: impl FnOnce(&MainLoop, TimerId) + 'static,
    ) -> TimerId {
        let deadline = self.now() + delay;
        let mut timers = self.timers.borrow_mut();

        let id = timers.next_id;
        timers.next_id += 1;
        timers.queue.insert((deadline, id), Box::new(callback));
        timers.deadlines.insert(id, deadline);

        trace!("scheduled timer {id} in {delay:?}");
        TimerId(id)
    }

    /// Remove a pending timer. Once this returns the callback will never run.
    /// Returns false if the timer already ran or was already cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut timers = self.timers.borrow_mut();
        let Some(deadline) = timers.deadlines.remove(&id.0) else {
            return false;
        };

        timers.queue.remove(&(deadline, id.0));
        trace!("cancelled timer {}", id.0);
        true
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.borrow().deadlines.contains_key(&id.0)
    }

    pub fn pending(&self) -> usize {
        self.timers.borrow().queue.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers
            .borrow()
            .queue
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// How long the host can sleep before the next timer is due
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(self.now()))
    }

    /// Run every timer that is due, in deadline order. Timers scheduled by
    /// the callbacks themselves wait for the next dispatch. Returns how many
    /// callbacks ran.
    pub fn dispatch(&self) -> usize {
        let now = self.now();
        let horizon = self.timers.borrow().next_id;
        let mut ran = 0;

        while let Some((id, callback)) = self.pop_due(now, horizon) {
            trace!("firing timer {}", id.0);
            callback(self, id);
            ran += 1;
        }

        ran
    }

    fn pop_due(&self, now: Instant, horizon: u64) -> Option<(TimerId, Callback)> {
        let mut timers = self.timers.borrow_mut();

        let key = timers
            .queue
            .range(..=(now, u64::MAX))
            .map(|(key, _)| *key)
            .find(|(_, id)| *id < horizon)?;

        timers.deadlines.remove(&key.1);
        let callback = timers.queue.remove(&key)?;

        Some((TimerId(key.1), callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{manual_loop, ms};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn timers_fire_in_deadline_order() {
        let (clock, main_loop) = manual_loop();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for (name, delay) in [("c", 30), ("a", 10), ("b", 20)] {
            let fired = fired.clone();
            main_loop.schedule(ms(delay), move |_, _| fired.borrow_mut().push(name));
        }

        clock.advance(ms(15));
        assert_eq!(main_loop.dispatch(), 1);

        clock.advance(ms(100));
        assert_eq!(main_loop.dispatch(), 2);
        assert_eq!(*fired.borrow(), vec!["a", "b", "c"]);
        assert_eq!(main_loop.pending(), 0);
    }

    #[test]
    fn nothing_fires_early() {
        let (clock, main_loop) = manual_loop();
        let id = main_loop.schedule(ms(50), |_, _| panic!("fired early"));

        clock.advance(ms(49));
        assert_eq!(main_loop.dispatch(), 0);
        assert!(main_loop.is_pending(id));
        assert_eq!(main_loop.time_until_next(), Some(ms(1)));
    }

    #[test]
    fn cancelled_timer_never_runs() {
        let (clock, main_loop) = manual_loop();
        let id = main_loop.schedule(ms(10), |_, _| panic!("cancelled timer ran"));

        assert!(main_loop.cancel(id));
        assert!(!main_loop.cancel(id));

        clock.advance(ms(20));
        assert_eq!(main_loop.dispatch(), 0);
        assert_eq!(main_loop.next_deadline(), None);
    }

    #[test]
    fn callback_can_cancel_a_later_due_timer() {
        let (clock, main_loop) = manual_loop();
        let victim = Rc::new(Cell::new(None));

        let v = victim.clone();
        main_loop.schedule(ms(5), move |ml, _| {
            if let Some(id) = v.get() {
                assert!(ml.cancel(id));
            }
        });
        victim.set(Some(
            main_loop.schedule(ms(10), |_, _| panic!("should be cancelled")),
        ));

        clock.advance(ms(20));
        assert_eq!(main_loop.dispatch(), 1);
    }

    #[test]
    fn rescheduled_timers_wait_for_next_dispatch() {
        let (clock, main_loop) = manual_loop();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        main_loop.schedule(ms(10), move |ml, _| {
            c.set(c.get() + 1);
            let c = c.clone();
            ml.schedule(Duration::ZERO, move |_, _| c.set(c.get() + 1));
        });

        clock.advance(ms(10));
        assert_eq!(main_loop.dispatch(), 1);
        assert_eq!(count.get(), 1);

        assert_eq!(main_loop.dispatch(), 1);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn callback_receives_its_own_id() {
        let (clock, main_loop) = manual_loop();
        let seen = Rc::new(Cell::new(None));

        let s = seen.clone();
        let id = main_loop.schedule(ms(1), move |_, id| s.set(Some(id)));

        clock.advance(ms(1));
        main_loop.dispatch();
        assert_eq!(seen.get(), Some(id));
    }
}
