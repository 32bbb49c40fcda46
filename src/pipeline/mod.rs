//! The frame-to-overlay pipeline.
//!
//! One frame travels: converter → admission gate → dispatcher → (async
//! engine) → mailbox → renderer. [`FramePipeline`] wires the stages
//! together; [`start_frame_pump`] runs it on a dedicated acquisition thread
//! fed by a channel from the frame source.

pub mod convert;
pub mod dispatch;
pub mod gate;
pub mod mailbox;
pub mod skeleton;

pub use convert::{ConvertError, convert_frame};
pub use dispatch::{Completion, DispatchError, Dispatcher, InferenceError, LandmarkEngine};
pub use gate::{Admission, AdmissionGate};
pub use mailbox::ResultMailbox;
pub use skeleton::{HAND_CONNECTIONS, Orientation, Rotation, map_to_surface, render_overlay};

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::types::CapturedFrame;

const PUMP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What happened to one incoming frame. Every variant other than
/// `Submitted` means the frame was skipped and acquisition continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Handed to the engine; a result will arrive through the mailbox.
    Submitted,
    /// Detector still busy with an earlier frame. Expected under load.
    Dropped,
    ConversionFailed,
    /// Rejected by the dispatcher (stale timestamp).
    Rejected,
}

/// Converter, gate, dispatcher and mailbox assembled around an engine.
///
/// `process` is called from the single acquisition thread; the engine's
/// completion callback touches only the gate and the mailbox, which are the
/// cross-thread boundaries.
pub struct FramePipeline {
    gate: Arc<AdmissionGate>,
    mailbox: ResultMailbox,
    dispatcher: Dispatcher,
}

impl FramePipeline {
    pub fn new(engine: Arc<dyn LandmarkEngine>) -> Self {
        FramePipeline {
            gate: Arc::new(AdmissionGate::new()),
            mailbox: ResultMailbox::new(),
            dispatcher: Dispatcher::new(engine),
        }
    }

    /// Handle for the render side; reads stay valid after the pipeline is
    /// moved onto the pump thread.
    pub fn mailbox(&self) -> ResultMailbox {
        self.mailbox.clone()
    }

    pub fn gate(&self) -> Arc<AdmissionGate> {
        self.gate.clone()
    }

    /// Stops admitting frames permanently. In-flight callbacks arriving
    /// afterwards discard their result.
    pub fn shutdown(&self) {
        self.gate.close();
    }

    /// Runs one frame through the pipeline. Never blocks: the frame is
    /// either handed to the engine or skipped.
    pub fn process(&mut self, captured: &CapturedFrame) -> FrameOutcome {
        let image = match convert_frame(&captured.frame) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("skipping frame at {}us: {err}", captured.timestamp_us);
                return FrameOutcome::ConversionFailed;
            }
        };

        if self.gate.try_admit() == Admission::Dropped {
            log::debug!("detector busy, dropping frame at {}us", captured.timestamp_us);
            return FrameOutcome::Dropped;
        }

        let gate = self.gate.clone();
        let mailbox = self.mailbox.clone();
        let on_complete: Completion = Box::new(move |outcome| {
            if gate.is_closed() {
                log::debug!("discarding detection result after teardown");
                return;
            }
            match outcome {
                Ok(result) => mailbox.publish(result),
                // Stale overlay beats no overlay; the mailbox keeps the
                // previous result on failure.
                Err(err) => log::warn!("{err}"),
            }
            gate.complete();
        });

        match self.dispatcher.submit(
            image,
            captured.rotation_degrees,
            captured.timestamp_us,
            on_complete,
        ) {
            Ok(()) => FrameOutcome::Submitted,
            Err(err) => {
                log::warn!("dropping frame: {err}");
                self.gate.complete();
                FrameOutcome::Rejected
            }
        }
    }
}

/// Running acquisition thread. Stopping (explicitly or on drop) closes the
/// admission gate and joins the thread.
#[derive(Debug)]
pub struct FramePump {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FramePump {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns the acquisition thread: drains the channel to the newest frame,
/// runs it through the pipeline, repeats until stopped or the source hangs
/// up. Older queued frames are discarded, keeping preview latency bounded.
pub fn start_frame_pump(frame_rx: Receiver<CapturedFrame>, mut pipeline: FramePipeline) -> FramePump {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        while !stop_flag.load(Ordering::Relaxed) {
            let mut frame = match frame_rx.recv_timeout(PUMP_POLL_INTERVAL) {
                Ok(frame) => frame,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            while let Ok(newer) = frame_rx.try_recv() {
                frame = newer;
            }
            pipeline.process(&frame);
        }
        pipeline.shutdown();
    });

    FramePump {
        stop,
        handle: Some(handle),
    }
}
