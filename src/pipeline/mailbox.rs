//! Latest-wins handoff between the detector callback and the renderer.

use std::sync::{Arc, Mutex, PoisonError};

use crate::types::DetectionResult;

/// Single-slot, overwrite-on-write holder for the most recent result.
///
/// The detector callback publishes from an engine-owned thread; the renderer
/// reads at its own cadence from the display thread. Readers get either the
/// previous or the new value, never a torn one. No reordering is attempted:
/// if the engine completes out of submission order, the later publish wins.
#[derive(Clone, Debug, Default)]
pub struct ResultMailbox {
    slot: Arc<Mutex<Option<Arc<DetectionResult>>>>,
}

impl ResultMailbox {
    pub fn new() -> Self {
        ResultMailbox::default()
    }

    /// Overwrites the slot. Never blocks beyond the pointer swap and never
    /// queues older results.
    pub fn publish(&self, result: DetectionResult) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(result));
    }

    /// Most recently published result, if any. Safe to call concurrently
    /// with `publish` from any thread.
    pub fn latest(&self) -> Option<Arc<DetectionResult>> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.clone()
    }
}
