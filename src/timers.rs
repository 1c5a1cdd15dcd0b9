//! Virtual timer queue.
//! Deferred page work (reveals, debounced scroll-spy, banner dismissal, carousel ticks)
//! is queued here with a delay and runs only when the host advances the clock.
//! Timers due at the same instant fire in scheduling order.

use crate::dom::NodeId;

/// Deferred page work.
#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    /// Start staggering every not-yet-visible `.fade-in` element.
    RevealPending,
    /// Make one element visible.
    Reveal(NodeId),
    ScrollSpy,
    ScrollIntoView(NodeId),
    DismissBanner(NodeId),
    CarouselAdvance,
    PhotoCheck,
    PhotoSweep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer {
    id: TimerId,
    due: u64,
    task: Task,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay_ms: u64, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay_ms,
            task,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_scheduled(&self, task: &Task) -> bool {
        self.timers.iter().any(|t| &t.task == task)
    }

    /// Pops the earliest timer due at or before `deadline`, moving the clock to it.
    pub fn pop_due(&mut self, deadline: u64) -> Option<Task> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.id.0))
            .map(|(i, _)| i)?;
        let timer = self.timers.remove(index);
        self.now = self.now.max(timer.due);
        Some(timer.task)
    }

    /// Moves the clock forward once all due timers have been popped.
    pub fn settle_at(&mut self, deadline: u64) {
        self.now = self.now.max(deadline);
    }
}
