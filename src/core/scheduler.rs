//! Ticket-based admission gate serializing every operation on one resource.
//!
//! The scheduler owns a single exclusive gate. Admitting a call acquires the
//! gate, issues the next ticket and hands back an [`Admission`]; the gate stays
//! held until that admission is dropped. Because the admission is `Send`, a
//! non-blocking operation can move it onto another thread and release the gate
//! there once its body finishes.
//!
//! # Ticket bookkeeping
//!
//! `issued` counts admissions and `served` counts released admissions. Both
//! are only touched while the gate is held, so at admission time the newly
//! issued ticket is always exactly `served + 1`: the "wait for my turn" check
//! can never observe contention. It is kept as a debug assertion; arrival
//! ordering comes from the gate itself, which is released with
//! `unlock_fair` so the longest-parked waiter is admitted next.
//!
//! # Re-entry
//!
//! The gate is not re-entrant. A thread running code on behalf of an
//! admission marks itself for as long as that code runs, and
//! [`AccessScheduler::held_on_current_thread`] lets callers refuse to admit
//! from such a thread instead of waiting on themselves forever.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use tracing::trace;

thread_local! {
    static HELD_HERE: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Sequence number issued at admission time, defining arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw sequence number. The first admission on a scheduler receives 1.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counters guarded by the gate.
#[derive(Debug, Default)]
struct TicketState {
    issued: u64,
    served: u64,
}

/// Lock-free mirrors of the ticket counters, readable while the gate is held.
#[derive(Debug, Default)]
struct SchedulerCounters {
    issued: AtomicU64,
    completed: AtomicU64,
    busy: AtomicBool,
}

/// Snapshot of scheduler activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tickets issued so far.
    pub issued: u64,
    /// Admissions released so far.
    pub completed: u64,
    /// Whether an operation currently holds the gate.
    pub busy: bool,
}

/// FIFO mutual-exclusion engine for a single resource.
#[derive(Debug, Default)]
pub struct AccessScheduler {
    gate: Arc<Mutex<TicketState>>,
    counters: Arc<SchedulerCounters>,
}

impl AccessScheduler {
    /// Create a scheduler with an unheld gate and both counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the gate is free, then take it and issue a ticket.
    ///
    /// The gate is not released here; it is released when the returned
    /// [`Admission`] is dropped, on whichever thread that happens.
    pub fn admit(&self) -> Admission {
        let mut state = self.gate.lock_arc();
        state.issued = state.issued.wrapping_add(1);
        let ticket = Ticket(state.issued);
        debug_assert_eq!(
            state.served.wrapping_add(1),
            state.issued,
            "ticket admitted out of turn"
        );

        self.counters.issued.store(state.issued, Ordering::Release);
        self.counters.busy.store(true, Ordering::Release);
        trace!(ticket = ticket.0, "gate acquired");

        Admission {
            guard: Some(state),
            counters: Arc::clone(&self.counters),
            gate: self.gate_id(),
            ticket,
        }
    }

    /// Whether the current thread is running code for an admission on this
    /// scheduler, so admitting here again would never return.
    #[must_use]
    pub fn held_on_current_thread(&self) -> bool {
        let gate = self.gate_id();
        HELD_HERE.with(|held| held.borrow().contains(&gate))
    }

    fn gate_id(&self) -> usize {
        Arc::as_ptr(&self.gate) as usize
    }

    /// Read the counters without touching the gate.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            issued: self.counters.issued.load(Ordering::Acquire),
            completed: self.counters.completed.load(Ordering::Acquire),
            busy: self.counters.busy.load(Ordering::Acquire),
        }
    }
}

/// Exclusive right to touch the resource, held from admission until drop.
///
/// Dropping the admission advances the serve cursor and hands the gate to the
/// next waiter. This happens exactly once on every exit path, including
/// unwinding out of an operation body or a callback.
#[must_use = "dropping the admission releases the gate immediately"]
pub struct Admission {
    guard: Option<ArcMutexGuard<RawMutex, TicketState>>,
    counters: Arc<SchedulerCounters>,
    gate: usize,
    ticket: Ticket,
}

impl Admission {
    /// Ticket issued for this admission.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Mark the current thread as running on behalf of this admission until
    /// the returned marker is dropped.
    pub(crate) fn hold_here(&self) -> HeldHere {
        HELD_HERE.with(|held| held.borrow_mut().push(self.gate));
        HeldHere {
            gate: self.gate,
            _thread_bound: PhantomData,
        }
    }
}

/// Thread-bound marker returned by [`Admission::hold_here`].
pub(crate) struct HeldHere {
    gate: usize,
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for HeldHere {
    fn drop(&mut self) {
        HELD_HERE.with(|held| {
            let mut held = held.borrow_mut();
            if let Some(idx) = held.iter().rposition(|gate| *gate == self.gate) {
                held.remove(idx);
            }
        });
    }
}

impl fmt::Debug for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admission")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        if let Some(mut state) = self.guard.take() {
            state.served = state.served.wrapping_add(1);
            self.counters.completed.store(state.served, Ordering::Release);
            self.counters.busy.store(false, Ordering::Release);
            trace!(ticket = self.ticket.0, "gate released");
            ArcMutexGuard::unlock_fair(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_tickets_start_at_one_and_increase() {
        let scheduler = AccessScheduler::new();
        let first = scheduler.admit().ticket();
        let second = scheduler.admit().ticket();
        assert_eq!(first.value(), 1);
        assert_eq!(second.value(), 2);
        assert!(first < second);
    }

    #[test]
    fn test_stats_track_gate() {
        let scheduler = AccessScheduler::new();
        assert_eq!(scheduler.stats(), SchedulerStats::default());

        let admission = scheduler.admit();
        let stats = scheduler.stats();
        assert_eq!(stats.issued, 1);
        assert_eq!(stats.completed, 0);
        assert!(stats.busy);

        drop(admission);
        let stats = scheduler.stats();
        assert_eq!(stats.completed, 1);
        assert!(!stats.busy);
    }

    #[test]
    fn test_admission_blocks_until_release() {
        let scheduler = Arc::new(AccessScheduler::new());
        let admission = scheduler.admit();
        let entered = Arc::new(AtomicBool::new(false));

        let waiter = {
            let scheduler = Arc::clone(&scheduler);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                let admission = scheduler.admit();
                entered.store(true, Ordering::SeqCst);
                admission.ticket()
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst));

        drop(admission);
        let ticket = waiter.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
        assert_eq!(ticket.value(), 2);
    }

    #[test]
    fn test_admission_released_on_another_thread() {
        let scheduler = AccessScheduler::new();
        let admission = scheduler.admit();

        thread::spawn(move || drop(admission)).join().unwrap();

        assert_eq!(scheduler.admit().ticket().value(), 2);
    }

    #[test]
    fn test_admission_released_on_panic() {
        let scheduler = Arc::new(AccessScheduler::new());
        let worker = {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                let _admission = scheduler.admit();
                panic!("operation body failed");
            })
        };
        assert!(worker.join().is_err());

        assert!(!scheduler.stats().busy);
        assert_eq!(scheduler.admit().ticket().value(), 2);
    }

    #[test]
    fn test_hold_here_is_per_thread_and_per_gate() {
        let scheduler = Arc::new(AccessScheduler::new());
        let other = AccessScheduler::new();
        assert!(!scheduler.held_on_current_thread());

        let admission = scheduler.admit();
        let here = admission.hold_here();
        assert!(scheduler.held_on_current_thread());
        assert!(!other.held_on_current_thread());

        let elsewhere = {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || scheduler.held_on_current_thread())
        };
        assert!(!elsewhere.join().unwrap());

        drop(here);
        assert!(!scheduler.held_on_current_thread());
        drop(admission);
    }

    #[test]
    fn test_concurrent_admissions_are_exclusive() {
        let scheduler = Arc::new(AccessScheduler::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..8 {
            let scheduler = Arc::clone(&scheduler);
            let inside = Arc::clone(&inside);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    let _admission = scheduler.admit();
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    thread::yield_now();
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = scheduler.stats();
        assert_eq!(stats.issued, 400);
        assert_eq!(stats.completed, 400);
    }
}
