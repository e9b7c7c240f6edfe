//! Blend masks used to feather rectified patches before compositing.

use crate::{rectify, Homography, Image, ImageView, StitchError};

/// Per-pixel blend weights in `[0, 1]`, shared by every channel.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendMask {
    pub width: usize,
    pub height: usize,
    pub weights: Vec<f32>, // row-major, len = w*h
}

impl BlendMask {
    /// Linear fade from `1.0` on the top row to `0.0` on the bottom row,
    /// constant along each row. A single-row mask is all ones.
    pub fn vertical_fade(width: usize, height: usize) -> Self {
        let mut weights = Vec::with_capacity(width * height);
        for row in 0..height {
            let w = if height > 1 {
                1.0 - row as f32 / (height - 1) as f32
            } else {
                1.0
            };
            weights.extend(std::iter::repeat(w).take(width));
        }
        Self {
            width,
            height,
            weights,
        }
    }

    /// Mask with the same weight everywhere (clamped to `[0, 1]`).
    pub fn uniform(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            weights: vec![value.clamp(0.0, 1.0); width * height],
        }
    }

    #[inline]
    pub fn weight(&self, x: usize, y: usize) -> f32 {
        self.weights[y * self.width + x]
    }
}

/// Multiply every channel of `patch` by the mask weight at that pixel,
/// rounding and saturating back to `u8`.
pub fn apply_blend_mask(patch: &ImageView<'_>, mask: &BlendMask) -> Result<Image, StitchError> {
    if patch.width != mask.width || patch.height != mask.height || patch.channels == 0 {
        return Err(StitchError::DimensionMismatch {
            expected: (mask.width, mask.height, patch.channels.max(1)),
            got: (patch.width, patch.height, patch.channels),
        });
    }

    let c = patch.channels;
    let data = patch
        .data
        .chunks_exact(c)
        .zip(mask.weights.iter())
        .flat_map(|(px, &w)| {
            px.iter()
                .map(move |&v| (v as f32 * w).round().clamp(0.0, 255.0) as u8)
        })
        .collect();

    Ok(Image {
        width: patch.width,
        height: patch.height,
        channels: c,
        data,
    })
}

/// Rectify `src` at the mask's size and feather it in one step.
pub fn rectify_masked(
    src: &ImageView<'_>,
    h: &Homography,
    mask: &BlendMask,
) -> Result<Image, StitchError> {
    let patch = rectify(src, h, mask.width, mask.height)?;
    apply_blend_mask(&patch.view(), mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{estimate_rect_homography, PointQuad};

    #[test]
    fn vertical_fade_runs_from_one_to_zero() {
        let m = BlendMask::vertical_fade(7, 11);
        assert_eq!(m.weights.len(), 77);
        for x in 0..7 {
            assert_eq!(m.weight(x, 0), 1.0);
            assert_eq!(m.weight(x, 10), 0.0);
        }
        for y in 1..11 {
            assert!(m.weight(0, y) <= m.weight(0, y - 1));
            for x in 1..7 {
                assert_eq!(m.weight(x, y), m.weight(0, y));
            }
        }
        assert!((m.weight(3, 5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn single_row_fade_is_full_weight() {
        let m = BlendMask::vertical_fade(5, 1);
        assert!(m.weights.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn mask_scales_every_channel_equally() {
        let patch = Image::filled(4, 3, 3, 200);
        let m = BlendMask::vertical_fade(4, 3);
        let out = apply_blend_mask(&patch.view(), &m).expect("same size");
        assert_eq!(out.pixel(2, 0), &[200, 200, 200]);
        assert_eq!(out.pixel(2, 1), &[100, 100, 100]);
        assert_eq!(out.pixel(2, 2), &[0, 0, 0]);
    }

    #[test]
    fn mismatched_mask_is_rejected() {
        let patch = Image::new(4, 4, 3);
        let m = BlendMask::vertical_fade(4, 5);
        assert!(matches!(
            apply_blend_mask(&patch.view(), &m),
            Err(StitchError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn zero_channel_patch_is_rejected() {
        let patch = Image::new(4, 4, 0);
        let m = BlendMask::vertical_fade(4, 4);
        assert_eq!(
            apply_blend_mask(&patch.view(), &m),
            Err(StitchError::DimensionMismatch {
                expected: (4, 4, 1),
                got: (4, 4, 0),
            })
        );
    }

    #[test]
    fn rectify_masked_uses_mask_size() {
        let src = Image::filled(20, 20, 3, 255);
        let q = PointQuad::rect(19.0, 19.0);
        let h = estimate_rect_homography(&q, 10, 10).expect("rectangle");
        let m = BlendMask::uniform(10, 10, 0.5);
        let out = rectify_masked(&src.view(), &h, &m).expect("masked");
        assert_eq!((out.width, out.height), (10, 10));
        assert_eq!(out.pixel(4, 4), &[128, 128, 128]);
    }
}
