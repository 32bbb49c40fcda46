//! Asynchronous handoff to the external landmark engine.

use std::sync::Arc;

use thiserror::Error;

use crate::types::{DetectionResult, PackedImage};

/// Failure reported by the engine through its completion callback.
#[derive(Debug, Error)]
#[error("inference failed: {message}")]
pub struct InferenceError {
    pub message: String,
}

impl InferenceError {
    pub fn new(message: impl Into<String>) -> Self {
        InferenceError {
            message: message.into(),
        }
    }
}

/// Invoked exactly once per accepted submission, on an engine-owned thread.
pub type Completion = Box<dyn FnOnce(Result<DetectionResult, InferenceError>) + Send + 'static>;

/// The external detection engine, e.g. a hand landmarker running in
/// live-stream mode. `submit_async` must return without blocking; results
/// arrive later through the completion callback, not necessarily on the
/// submitting thread and not necessarily in submission order.
pub trait LandmarkEngine: Send + Sync {
    fn submit_async(
        &self,
        image: PackedImage,
        rotation_degrees: i32,
        timestamp_us: i64,
        on_complete: Completion,
    );
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Streaming engines require strictly increasing capture timestamps;
    /// a stale frame is dropped rather than resubmitted.
    #[error("non-monotonic timestamp {got}us, last accepted {last}us")]
    NonMonotonicTimestamp { last: i64, got: i64 },
}

/// Enforces the engine's timestamp contract and hands frames off.
///
/// Lives on the acquisition thread; no retry on failure, since replaying a
/// frame would violate timestamp ordering and compound the backlog.
pub struct Dispatcher {
    engine: Arc<dyn LandmarkEngine>,
    last_timestamp_us: Option<i64>,
}

impl Dispatcher {
    pub fn new(engine: Arc<dyn LandmarkEngine>) -> Self {
        Dispatcher {
            engine,
            last_timestamp_us: None,
        }
    }

    /// Submits a converted frame. Returns as soon as the engine accepted the
    /// buffer; a timestamp at or before the last accepted one is rejected
    /// with no side effects.
    pub fn submit(
        &mut self,
        image: PackedImage,
        rotation_degrees: i32,
        timestamp_us: i64,
        on_complete: Completion,
    ) -> Result<(), DispatchError> {
        if let Some(last) = self.last_timestamp_us {
            if timestamp_us <= last {
                return Err(DispatchError::NonMonotonicTimestamp {
                    last,
                    got: timestamp_us,
                });
            }
        }
        self.last_timestamp_us = Some(timestamp_us);
        self.engine
            .submit_async(image, rotation_degrees, timestamp_us, on_complete);
        Ok(())
    }
}
