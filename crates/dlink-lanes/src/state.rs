use std::sync::Mutex;

/// Shared bookkeeping of one lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaneState {
    /// A submission is in flight (or about to be, after its delay).
    pub busy: bool,
    /// Ticket counter for waiting requests. Bumped by every new waiter and
    /// reset to zero by the request that takes the lane.
    pub generation: u64,
}

/// Outcome of one wake-up of a waiting request.
#[derive(Debug)]
pub(crate) enum WaitPoll<'a> {
    /// A newer request is waiting; this one should give up.
    Superseded,
    /// The lane was free and now belongs to the caller.
    Acquired(BusyGuard<'a>),
    /// Still busy.
    Busy,
}

/// Mutex-protected [`LaneState`].
///
/// Every transition happens under the lock and the lock is never held across
/// an `.await`, so check-and-acquire is atomic even on a multi-threaded
/// runtime.
#[derive(Debug, Default)]
pub(crate) struct LaneCell {
    state: Mutex<LaneState>,
}

impl LaneCell {
    pub(crate) fn snapshot(&self) -> LaneState {
        *self.state.lock().expect("lane lock poisoned")
    }

    /// Take the lane if it is idle.
    pub(crate) fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        let mut state = self.state.lock().expect("lane lock poisoned");
        if state.busy {
            return None;
        }
        state.busy = true;
        Some(BusyGuard { cell: self })
    }

    /// Take the lane if it is idle and reset the ticket counter.
    pub(crate) fn try_acquire_fresh(&self) -> Option<BusyGuard<'_>> {
        let mut state = self.state.lock().expect("lane lock poisoned");
        if state.busy {
            return None;
        }
        state.busy = true;
        state.generation = 0;
        Some(BusyGuard { cell: self })
    }

    /// Register a new waiter and return its ticket.
    pub(crate) fn take_ticket(&self) -> u64 {
        let mut state = self.state.lock().expect("lane lock poisoned");
        state.generation += 1;
        state.generation
    }

    /// Re-check the lane on behalf of the waiter holding `ticket`.
    ///
    /// Any counter other than `ticket` means a newer request took a ticket or
    /// already took the lane and reset the counter. Supersession is checked
    /// before the busy flag, so a stale waiter gives up even when the lane
    /// happens to be free.
    pub(crate) fn poll_waiter(&self, ticket: u64) -> WaitPoll<'_> {
        let mut state = self.state.lock().expect("lane lock poisoned");
        if state.generation != ticket {
            return WaitPoll::Superseded;
        }
        if state.busy {
            return WaitPoll::Busy;
        }
        state.busy = true;
        state.generation = 0;
        WaitPoll::Acquired(BusyGuard { cell: self })
    }

    fn release(&self) {
        self.state.lock().expect("lane lock poisoned").busy = false;
    }
}

/// Marks the lane idle again when dropped, whatever the submission outcome.
#[derive(Debug)]
pub(crate) struct BusyGuard<'a> {
    cell: &'a LaneCell,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.cell.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_is_exclusive_until_guard_drops() {
        let cell = LaneCell::default();
        let guard = cell.try_acquire().unwrap();
        assert!(cell.snapshot().busy);
        assert!(cell.try_acquire().is_none());
        assert!(cell.try_acquire_fresh().is_none());
        drop(guard);
        assert!(!cell.snapshot().busy);
        assert!(cell.try_acquire().is_some());
    }

    #[test]
    fn tickets_increase() {
        let cell = LaneCell::default();
        assert_eq!(cell.take_ticket(), 1);
        assert_eq!(cell.take_ticket(), 2);
        assert_eq!(cell.snapshot().generation, 2);
    }

    #[test]
    fn fresh_acquire_resets_generation() {
        let cell = LaneCell::default();
        cell.take_ticket();
        let _g = cell.try_acquire_fresh().unwrap();
        assert_eq!(cell.snapshot().generation, 0);
    }

    #[test]
    fn stale_waiter_is_superseded_even_when_idle() {
        let cell = LaneCell::default();
        let first = cell.take_ticket();
        let _second = cell.take_ticket();
        assert!(matches!(cell.poll_waiter(first), WaitPoll::Superseded));
    }

    #[test]
    fn waiter_is_superseded_after_newer_waiter_resets_counter() {
        let cell = LaneCell::default();
        let busy = cell.try_acquire().unwrap();
        let older = cell.take_ticket();
        let newer = cell.take_ticket();
        drop(busy);

        let guard = match cell.poll_waiter(newer) {
            WaitPoll::Acquired(guard) => guard,
            other => panic!("expected acquisition, got {other:?}"),
        };
        assert_eq!(cell.snapshot().generation, 0);
        assert!(matches!(cell.poll_waiter(older), WaitPoll::Superseded));
        drop(guard);
        assert!(matches!(cell.poll_waiter(older), WaitPoll::Superseded));
    }

    #[test]
    fn waiter_is_superseded_by_fresh_acquire() {
        let cell = LaneCell::default();
        let busy = cell.try_acquire().unwrap();
        let ticket = cell.take_ticket();
        drop(busy);

        let _newer = cell.try_acquire_fresh().unwrap();
        assert!(matches!(cell.poll_waiter(ticket), WaitPoll::Superseded));
    }

    #[test]
    fn latest_waiter_waits_then_acquires() {
        let cell = LaneCell::default();
        let busy = cell.try_acquire().unwrap();
        let ticket = cell.take_ticket();
        assert!(matches!(cell.poll_waiter(ticket), WaitPoll::Busy));
        drop(busy);
        match cell.poll_waiter(ticket) {
            WaitPoll::Acquired(_guard) => {
                let state = cell.snapshot();
                assert!(state.busy);
                assert_eq!(state.generation, 0);
            }
            other => panic!("expected acquisition, got {other:?}"),
        }
        assert!(!cell.snapshot().busy);
    }
}
