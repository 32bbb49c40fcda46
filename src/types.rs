//! Data types flowing through the overlay pipeline.

/// Number of landmarks the detector reports per hand. Wrist is index 0,
/// finger chains follow in anatomical order (thumb, index, middle, ring,
/// pinky), four joints each.
pub const LANDMARK_COUNT: usize = 21;

/// One component plane of a camera frame (luma or chroma), with its own
/// layout. `row_stride` may exceed the payload width (row padding) and
/// `pixel_stride` may exceed 1 (interleaved chroma sharing a buffer).
#[derive(Clone, Debug)]
pub struct FramePlane {
    pub data: Vec<u8>,
    pub row_stride: usize,
    pub pixel_stride: usize,
}

/// A raw 4:2:0 camera frame as delivered by the frame source: either three
/// planes (Y, Cb, Cr) or two (Y plus interleaved chroma).
#[derive(Clone, Debug)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub planes: Vec<FramePlane>,
}

/// Tightly packed interleaved RGB, 3 bytes per pixel. Produced by the
/// converter, consumed (moved) by the dispatcher.
#[derive(Clone, Debug)]
pub struct PackedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// A raw frame tagged with the capture metadata the detector needs.
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    pub frame: RawFrame,
    /// Clockwise rotation to apply before the image is upright, in degrees.
    pub rotation_degrees: i32,
    /// Capture time in microseconds; must increase strictly across frames.
    pub timestamp_us: i64,
}

/// A single tracked point. `x` and `y` are normalized to the source image
/// and may transiently fall slightly outside [0, 1] near the frame edges;
/// `z` is relative depth and unused by rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }
}

/// One detected hand: nominally [`LANDMARK_COUNT`] landmarks in fixed index
/// order. Consumers bound-check instead of assuming the full set is present.
#[derive(Clone, Debug, Default)]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
}

impl Hand {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Hand { landmarks }
    }

    pub fn is_complete(&self) -> bool {
        self.landmarks.len() == LANDMARK_COUNT
    }
}

/// Output of one detector invocation. Immutable once produced; the mailbox
/// hands out shared read-only views of it.
#[derive(Clone, Debug, Default)]
pub struct DetectionResult {
    pub hands: Vec<Hand>,
    pub timestamp_us: i64,
}
