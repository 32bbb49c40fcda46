//! Real-time hand landmark overlay pipeline.
//!
//! Consumes a stream of planar camera frames, submits each to an external
//! asynchronous landmark engine under single-slot backpressure, and renders
//! a skeletal overlay from the latest available result:
//!
//! ```text
//! camera frame → converter → admission gate → dispatcher
//!                                     ⇣ (async engine callback)
//!                       renderer ← mailbox
//! ```
//!
//! The camera itself, the detection model and the display surface are
//! external collaborators: frames arrive over a channel, the engine is
//! anything implementing [`LandmarkEngine`], and rendering draws into a
//! caller-owned RGBA buffer.

pub mod pipeline;
pub mod types;

pub use pipeline::{
    Admission, AdmissionGate, Completion, ConvertError, DispatchError, Dispatcher, FrameOutcome,
    FramePipeline, FramePump, HAND_CONNECTIONS, InferenceError, LandmarkEngine, Orientation,
    ResultMailbox, Rotation, convert_frame, map_to_surface, render_overlay, start_frame_pump,
};
pub use types::{
    CapturedFrame, DetectionResult, FramePlane, Hand, LANDMARK_COUNT, Landmark, PackedImage,
    RawFrame,
};
