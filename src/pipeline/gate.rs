//! Single-slot frame admission control.
//!
//! Camera frames arrive faster than the detector can process them. The gate
//! keeps at most one frame in flight; anything arriving while the detector
//! is busy is dropped, never queued, which bounds end-to-end latency.

use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const IN_FLIGHT: u8 = 1;
const CLOSED: u8 = 2;

/// Outcome of [`AdmissionGate::try_admit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Dropped,
}

/// At-most-one-in-flight gate with a terminal closed state for teardown.
///
/// `try_admit` runs on the acquisition thread, `complete` on whatever thread
/// the detector completes on; both are single compare-exchanges.
#[derive(Debug, Default)]
pub struct AdmissionGate {
    state: AtomicU8,
}

impl AdmissionGate {
    pub fn new() -> Self {
        AdmissionGate {
            state: AtomicU8::new(IDLE),
        }
    }

    /// Claims the in-flight slot. Returns [`Admission::Dropped`] while a
    /// previous frame is outstanding or once the gate is closed.
    pub fn try_admit(&self) -> Admission {
        match self
            .state
            .compare_exchange(IDLE, IN_FLIGHT, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Admission::Admitted,
            Err(_) => Admission::Dropped,
        }
    }

    /// Releases the in-flight slot after the detector completed, whether it
    /// succeeded or failed. No-op once closed.
    pub fn complete(&self) {
        let _ = self
            .state
            .compare_exchange(IN_FLIGHT, IDLE, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Stops accepting frames permanently. Callbacks that land afterwards
    /// must discard their result instead of touching released state.
    pub fn close(&self) {
        self.state.store(CLOSED, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::SeqCst) == CLOSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_admit_is_dropped_until_completion() {
        let gate = AdmissionGate::new();
        assert_eq!(gate.try_admit(), Admission::Admitted);
        assert_eq!(gate.try_admit(), Admission::Dropped);
        assert_eq!(gate.try_admit(), Admission::Dropped);

        gate.complete();
        assert_eq!(gate.try_admit(), Admission::Admitted);
    }

    #[test]
    fn closed_gate_admits_nothing() {
        let gate = AdmissionGate::new();
        gate.close();
        assert!(gate.is_closed());
        assert_eq!(gate.try_admit(), Admission::Dropped);

        // A late completion must not reopen the gate.
        gate.complete();
        assert!(gate.is_closed());
        assert_eq!(gate.try_admit(), Admission::Dropped);
    }

    #[test]
    fn close_wins_over_in_flight_frame() {
        let gate = AdmissionGate::new();
        assert_eq!(gate.try_admit(), Admission::Admitted);
        gate.close();
        gate.complete();
        assert!(gate.is_closed());
    }
}
