//! Planar camera frame to packed RGB conversion.
//!
//! Camera frames arrive as 4:2:0 luma/chroma planes whose row and pixel
//! strides rarely match the image width. The converter repacks them into a
//! contiguous bi-planar buffer, then lets `yuv` do the matrix conversion.

use rayon::prelude::*;
use thiserror::Error;
use yuv::{YuvBiPlanarImage, YuvConversionMode, YuvRange, YuvStandardMatrix, yuv_nv12_to_rgb};

use crate::types::{FramePlane, PackedImage, RawFrame};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported plane layout: {planes} planes, luma pixel stride {luma_pixel_stride}")]
    UnsupportedLayout {
        planes: usize,
        luma_pixel_stride: usize,
    },
    #[error("plane {plane} truncated: got {got} bytes, need {needed}")]
    TruncatedPlane {
        plane: usize,
        got: usize,
        needed: usize,
    },
    #[error("YUV to RGB conversion failed: {0}")]
    Conversion(String),
}

/// Converts a 2- or 3-plane 4:2:0 frame into tightly packed RGB.
///
/// Reads honor each plane's row and pixel stride; the output carries exactly
/// `width * height * 3` bytes. Interleaved 2-plane chroma is assumed to be in
/// VU byte order (the common reversed convention) and is swapped to UV while
/// repacking.
pub fn convert_frame(frame: &RawFrame) -> Result<PackedImage, ConvertError> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let chroma_width = width.div_ceil(2);
    let chroma_height = height.div_ceil(2);

    let luma = frame
        .planes
        .first()
        .filter(|plane| plane.pixel_stride == 1)
        .ok_or(ConvertError::UnsupportedLayout {
            planes: frame.planes.len(),
            luma_pixel_stride: frame.planes.first().map_or(0, |p| p.pixel_stride),
        })?;
    check_plane_len(luma, 0, height, width, 1)?;

    let mut y_plane = vec![0u8; width * height];
    y_plane
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, dst)| {
            let start = row * luma.row_stride;
            dst.copy_from_slice(&luma.data[start..start + width]);
        });

    let uv_stride = chroma_width * 2;
    let mut uv_plane = vec![0u8; uv_stride * chroma_height];

    match frame.planes.as_slice() {
        [_, cb, cr] => {
            check_plane_len(cb, 1, chroma_height, chroma_width, cb.pixel_stride)?;
            check_plane_len(cr, 2, chroma_height, chroma_width, cr.pixel_stride)?;
            uv_plane
                .par_chunks_mut(uv_stride)
                .enumerate()
                .for_each(|(row, dst)| {
                    let cb_row = row * cb.row_stride;
                    let cr_row = row * cr.row_stride;
                    for col in 0..chroma_width {
                        dst[col * 2] = cb.data[cb_row + col * cb.pixel_stride];
                        dst[col * 2 + 1] = cr.data[cr_row + col * cr.pixel_stride];
                    }
                });
        }
        [_, chroma] if chroma.pixel_stride == 2 => {
            // Interleaved VU pairs; each chroma sample pair spans two bytes.
            check_plane_len(chroma, 1, chroma_height, chroma_width * 2, 1)?;
            uv_plane
                .par_chunks_mut(uv_stride)
                .enumerate()
                .for_each(|(row, dst)| {
                    let src_row = row * chroma.row_stride;
                    for col in 0..chroma_width {
                        dst[col * 2] = chroma.data[src_row + col * 2 + 1];
                        dst[col * 2 + 1] = chroma.data[src_row + col * 2];
                    }
                });
        }
        planes => {
            return Err(ConvertError::UnsupportedLayout {
                planes: planes.len(),
                luma_pixel_stride: 1,
            });
        }
    }

    let image = YuvBiPlanarImage {
        y_plane: &y_plane,
        y_stride: width as u32,
        uv_plane: &uv_plane,
        uv_stride: uv_stride as u32,
        width: frame.width,
        height: frame.height,
    };

    let mut rgb = vec![0u8; width * height * 3];
    yuv_nv12_to_rgb(
        &image,
        &mut rgb,
        (width * 3) as u32,
        YuvRange::Full,
        YuvStandardMatrix::Bt601,
        YuvConversionMode::Balanced,
    )
    .map_err(|err| ConvertError::Conversion(format!("{err:?}")))?;

    Ok(PackedImage {
        width: frame.width,
        height: frame.height,
        rgb,
    })
}

/// A plane must cover all its rows at the declared strides; the final row
/// only needs the payload samples, not the padding.
fn check_plane_len(
    plane: &FramePlane,
    index: usize,
    rows: usize,
    cols: usize,
    pixel_stride: usize,
) -> Result<(), ConvertError> {
    if rows == 0 || cols == 0 {
        return Ok(());
    }
    let needed = plane.row_stride * (rows - 1) + pixel_stride * (cols - 1) + 1;
    if plane.data.len() < needed {
        return Err(ConvertError::TruncatedPlane {
            plane: index,
            got: plane.data.len(),
            needed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: u32 = 8;
    const HEIGHT: u32 = 6;

    fn planar_frame(y: u8, cb: u8, cr: u8, row_padding: usize) -> RawFrame {
        let w = WIDTH as usize;
        let h = HEIGHT as usize;
        let cw = w / 2;
        let ch = h / 2;
        RawFrame {
            width: WIDTH,
            height: HEIGHT,
            planes: vec![
                FramePlane {
                    data: vec![y; (w + row_padding) * h],
                    row_stride: w + row_padding,
                    pixel_stride: 1,
                },
                FramePlane {
                    data: vec![cb; (cw + row_padding) * ch],
                    row_stride: cw + row_padding,
                    pixel_stride: 1,
                },
                FramePlane {
                    data: vec![cr; (cw + row_padding) * ch],
                    row_stride: cw + row_padding,
                    pixel_stride: 1,
                },
            ],
        }
    }

    fn interleaved_frame(y: u8, cb: u8, cr: u8) -> RawFrame {
        let w = WIDTH as usize;
        let h = HEIGHT as usize;
        let cw = w / 2;
        let ch = h / 2;
        let mut vu = Vec::with_capacity(cw * 2 * ch);
        for _ in 0..cw * ch {
            vu.push(cr);
            vu.push(cb);
        }
        RawFrame {
            width: WIDTH,
            height: HEIGHT,
            planes: vec![
                FramePlane {
                    data: vec![y; w * h],
                    row_stride: w,
                    pixel_stride: 1,
                },
                FramePlane {
                    data: vu,
                    row_stride: cw * 2,
                    pixel_stride: 2,
                },
            ],
        }
    }

    // Reference BT.601 full-range matrix, f32 per channel.
    fn reference_rgb(y: u8, cb: u8, cr: u8) -> [f32; 3] {
        let y = y as f32;
        let u = cb as f32 - 128.0;
        let v = cr as f32 - 128.0;
        [
            (y + 1.402 * v).clamp(0.0, 255.0),
            (y - 0.344_136 * u - 0.714_136 * v).clamp(0.0, 255.0),
            (y + 1.772 * u).clamp(0.0, 255.0),
        ]
    }

    fn assert_constant_rgb(image: &PackedImage, expected: [f32; 3], tolerance: f32) {
        assert_eq!(
            image.rgb.len(),
            image.width as usize * image.height as usize * 3
        );
        for pixel in image.rgb.chunks_exact(3) {
            for (channel, want) in pixel.iter().zip(expected) {
                let got = *channel as f32;
                assert!(
                    (got - want).abs() <= tolerance,
                    "channel {got} deviates from reference {want}"
                );
            }
        }
    }

    #[test]
    fn constant_color_matches_reference_matrix() {
        let frame = planar_frame(120, 100, 140, 0);
        let image = convert_frame(&frame).unwrap();
        assert_constant_rgb(&image, reference_rgb(120, 100, 140), 2.0);
    }

    #[test]
    fn neutral_chroma_is_gray() {
        let frame = planar_frame(128, 128, 128, 0);
        let image = convert_frame(&frame).unwrap();
        assert_constant_rgb(&image, [128.0, 128.0, 128.0], 1.0);
    }

    #[test]
    fn row_padding_is_skipped() {
        let padded = convert_frame(&planar_frame(90, 60, 200, 16)).unwrap();
        let tight = convert_frame(&planar_frame(90, 60, 200, 0)).unwrap();
        assert_eq!(padded.rgb, tight.rgb);
    }

    #[test]
    fn interleaved_chroma_matches_planar() {
        let planar = convert_frame(&planar_frame(120, 100, 140, 0)).unwrap();
        let interleaved = convert_frame(&interleaved_frame(120, 100, 140)).unwrap();
        assert_eq!(planar.rgb, interleaved.rgb);
    }

    #[test]
    fn rejects_unknown_plane_count() {
        let mut frame = planar_frame(0, 0, 0, 0);
        frame.planes.truncate(1);
        assert!(matches!(
            convert_frame(&frame),
            Err(ConvertError::UnsupportedLayout { planes: 1, .. })
        ));
    }

    #[test]
    fn rejects_truncated_luma_plane() {
        let mut frame = planar_frame(0, 0, 0, 0);
        frame.planes[0].data.truncate(4);
        assert!(matches!(
            convert_frame(&frame),
            Err(ConvertError::TruncatedPlane { plane: 0, .. })
        ));
    }

    #[test]
    fn rejects_truncated_chroma_plane() {
        let mut frame = planar_frame(0, 0, 0, 0);
        frame.planes[2].data.truncate(1);
        assert!(matches!(
            convert_frame(&frame),
            Err(ConvertError::TruncatedPlane { plane: 2, .. })
        ));
    }
}
