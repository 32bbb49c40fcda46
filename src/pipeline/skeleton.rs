//! Skeleton overlay rendering.
//!
//! Maps normalized hand landmarks onto a surface-sized RGBA buffer and draws
//! the fixed connectivity graph. Rendering is deterministic: same result,
//! same orientation, same surface size, same pixels.

use crate::types::{DetectionResult, Hand, Landmark};

/// The canonical hand skeleton: four bones per finger chain out of the
/// wrist, plus the palm bridges. Index order follows the 21-landmark layout.
pub const HAND_CONNECTIONS: &[(usize, usize)] = &[
    // Thumb
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    // Index finger
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    // Middle finger
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    // Ring finger
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    // Pinky
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    // Palm
    (5, 9),
    (9, 13),
    (13, 17),
];

const LANDMARK_COLOR: [u8; 4] = [255, 0, 0, 255];
const CONNECTION_COLOR: [u8; 4] = [0, 255, 0, 255];
const LINE_THICKNESS: i32 = 4;
const POINT_RADIUS: i32 = 5;

/// Quarter-turn capture rotation reported alongside the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Accepts any multiple of 90, including negatives.
    pub fn from_degrees(degrees: i32) -> Option<Rotation> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// How normalized landmark coordinates relate to the display surface:
/// the capture rotation, plus horizontal mirroring for front-facing sources
/// so the overlay tracks the mirrored preview.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Orientation {
    pub rotation: Rotation,
    pub mirrored: bool,
}

impl Orientation {
    pub fn new(rotation: Rotation, mirrored: bool) -> Self {
        Orientation { rotation, mirrored }
    }

    /// Rotates then mirrors a normalized coordinate pair. Inputs outside
    /// [0, 1] pass through the same transform; nothing is clamped here.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let (x, y) = match self.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (1.0 - y, x),
            Rotation::Deg180 => (1.0 - x, 1.0 - y),
            Rotation::Deg270 => (y, 1.0 - x),
        };
        if self.mirrored { (1.0 - x, y) } else { (x, y) }
    }
}

/// Maps one landmark to surface pixel coordinates.
pub fn map_to_surface(
    landmark: &Landmark,
    orientation: Orientation,
    surface_width: u32,
    surface_height: u32,
) -> (f32, f32) {
    let (x, y) = orientation.apply(landmark.x, landmark.y);
    (x * surface_width as f32, y * surface_height as f32)
}

/// Draws every detected hand into an RGBA surface buffer. `None` (and an
/// empty result) draws nothing; the buffer is left untouched.
pub fn render_overlay(
    buffer: &mut [u8],
    surface_width: u32,
    surface_height: u32,
    result: Option<&DetectionResult>,
    orientation: Orientation,
) {
    let Some(result) = result else {
        return;
    };
    for hand in &result.hands {
        draw_hand(buffer, surface_width, surface_height, hand, orientation);
    }
}

fn draw_hand(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    hand: &Hand,
    orientation: Orientation,
) {
    let points: Vec<(f32, f32)> = hand
        .landmarks
        .iter()
        .map(|landmark| map_to_surface(landmark, orientation, width, height))
        .collect();

    // Edges whose endpoints exceed the hand's landmark count are skipped;
    // hands with fewer than 21 landmarks must not fault.
    for &(a, b) in HAND_CONNECTIONS {
        if let (Some(pa), Some(pb)) = (points.get(a), points.get(b)) {
            draw_line(buffer, width, height, pa, pb, CONNECTION_COLOR, LINE_THICKNESS);
        }
    }

    for &(x, y) in &points {
        draw_circle(
            buffer,
            width,
            height,
            (x as i32, y as i32),
            POINT_RADIUS,
            LANDMARK_COLOR,
        );
    }
}

fn draw_line(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    p0: &(f32, f32),
    p1: &(f32, f32),
    color: [u8; 4],
    thickness: i32,
) {
    let (mut x0, mut y0) = (p0.0 as i32, p0.1 as i32);
    let (x1, y1) = (p1.0 as i32, p1.1 as i32);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = (thickness.max(1) - 1) / 2;

    loop {
        put_pixel_safe(buffer, width, height, x0, y0, color);
        if radius > 0 {
            for ox in -radius..=radius {
                for oy in -radius..=radius {
                    if ox == 0 && oy == 0 {
                        continue;
                    }
                    if ox.abs() + oy.abs() <= radius {
                        put_pixel_safe(buffer, width, height, x0 + ox, y0 + oy, color);
                    }
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_circle(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    color: [u8; 4],
) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_safe(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= width || uy >= height {
        return;
    }
    let idx = ((uy * width + ux) as usize) * 4;
    if idx + 3 < buffer.len() {
        buffer[idx..idx + 4].copy_from_slice(&color);
    }
}
