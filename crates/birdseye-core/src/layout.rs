//! Bird's-eye layout: four feathered patches arranged around a reserved
//! vehicle footprint.
//!
//! ```text
//!          w        car_w        w
//!     +--------+-------------+--------+
//!   h |        |    front    |        |
//!     +--------+-------------+--------+
//!     |  left  |   vehicle   | right  | car_h
//!     +--------+-------------+--------+
//!   h |        |    back     |        |
//!     +--------+-------------+--------+
//! ```

use crate::image::{resize_bilinear, rotate, Rotation};
use crate::{apply_blend_mask, BlendMask, Image, ImageView, StitchError};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Size of the reserved vehicle footprint in the middle of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub car_area_width: usize,
    pub car_area_height: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            car_area_width: 200,
            car_area_height: 300,
        }
    }
}

/// The four rectified patches of one camera rig.
#[derive(Clone, Copy, Debug)]
pub struct SurroundViews<'a> {
    pub front: ImageView<'a>,
    pub back: ImageView<'a>,
    pub left: ImageView<'a>,
    pub right: ImageView<'a>,
}

/// Where one view ends up on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub rotation: Rotation,
    pub width: usize,
    pub height: usize,
    pub x: usize,
    pub y: usize,
}

/// Canvas geometry derived from the patch size and the car area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurroundLayout {
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub front: Placement,
    pub back: Placement,
    pub left: Placement,
    pub right: Placement,
}

impl SurroundLayout {
    pub fn new(patch_w: usize, patch_h: usize, params: &LayoutParams) -> Self {
        let (w, h) = (patch_w, patch_h);
        let (cw, ch) = (params.car_area_width, params.car_area_height);
        Self {
            canvas_width: w + cw + w,
            canvas_height: h + ch + h,
            front: Placement {
                rotation: Rotation::None,
                width: cw,
                height: h,
                x: w,
                y: 0,
            },
            back: Placement {
                rotation: Rotation::Rotate180,
                width: cw,
                height: h,
                x: w,
                y: h + ch,
            },
            left: Placement {
                rotation: Rotation::CounterClockwise90,
                width: w,
                height: ch,
                x: 0,
                y: h,
            },
            right: Placement {
                rotation: Rotation::Clockwise90,
                width: w,
                height: ch,
                x: w + cw,
                y: h,
            },
        }
    }

    /// Top-left corner and size of the reserved vehicle area.
    pub fn car_area(&self) -> (usize, usize, usize, usize) {
        (
            self.front.x,
            self.left.y,
            self.front.width,
            self.left.height,
        )
    }
}

/// Composite four same-sized rectified patches into one bird's-eye canvas.
///
/// Each patch is feathered with a vertical fade, re-oriented, resized to its
/// slot and added (saturating) onto a black canvas. The vehicle area is left
/// black.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
pub fn compose(views: &SurroundViews<'_>, params: &LayoutParams) -> Result<Image, StitchError> {
    let f = &views.front;
    let dims = (f.width, f.height, f.channels);
    for v in [&views.back, &views.left, &views.right] {
        let got = (v.width, v.height, v.channels);
        if got != dims {
            return Err(StitchError::DimensionMismatch {
                expected: dims,
                got,
            });
        }
    }
    if params.car_area_width == 0 || params.car_area_height == 0 {
        return Err(StitchError::geometry(format!(
            "car area {}x{} is empty",
            params.car_area_width, params.car_area_height
        )));
    }

    let layout = SurroundLayout::new(f.width, f.height, params);
    log::debug!(
        "composing {}x{} canvas from {}x{} patches",
        layout.canvas_width,
        layout.canvas_height,
        f.width,
        f.height
    );

    let mask = BlendMask::vertical_fade(f.width, f.height);
    let mut canvas = Image::new(layout.canvas_width, layout.canvas_height, f.channels);

    for (view, slot) in [
        (&views.front, layout.front),
        (&views.back, layout.back),
        (&views.left, layout.left),
        (&views.right, layout.right),
    ] {
        let feathered = apply_blend_mask(view, &mask)?;
        let oriented = rotate(&feathered.view(), slot.rotation);
        let sized = resize_bilinear(&oriented.view(), slot.width, slot.height);
        canvas.add_saturating(&sized.view(), slot.x, slot.y)?;
    }

    Ok(canvas)
}

/// Two-camera variant: place `left` and `right` side by side.
pub fn compose_pair(left: &ImageView<'_>, right: &ImageView<'_>) -> Result<Image, StitchError> {
    if left.height != right.height || left.channels != right.channels {
        return Err(StitchError::DimensionMismatch {
            expected: (right.width, left.height, left.channels),
            got: (right.width, right.height, right.channels),
        });
    }
    let mut canvas = Image::new(left.width + right.width, left.height, left.channels);
    canvas.paste(left, 0, 0)?;
    canvas.paste(right, left.width, 0)?;
    Ok(canvas)
}

/// Resize `icon` to the car area and write it over the middle of `canvas`.
pub fn overlay_vehicle_icon(
    canvas: &mut Image,
    icon: &ImageView<'_>,
    patch_w: usize,
    patch_h: usize,
    params: &LayoutParams,
) -> Result<(), StitchError> {
    let layout = SurroundLayout::new(patch_w, patch_h, params);
    if (canvas.width, canvas.height) != (layout.canvas_width, layout.canvas_height) {
        return Err(StitchError::DimensionMismatch {
            expected: (layout.canvas_width, layout.canvas_height, canvas.channels),
            got: canvas.dims(),
        });
    }
    let (x, y, w, h) = layout.car_area();
    let sized = resize_bilinear(icon, w, h);
    canvas.paste(&sized.view(), x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views<'a>(f: &'a Image, b: &'a Image, l: &'a Image, r: &'a Image) -> SurroundViews<'a> {
        SurroundViews {
            front: f.view(),
            back: b.view(),
            left: l.view(),
            right: r.view(),
        }
    }

    #[test]
    fn black_patches_give_black_canvas() {
        let p = Image::new(400, 400, 3);
        let params = LayoutParams {
            car_area_width: 200,
            car_area_height: 300,
        };
        let out = compose(&views(&p, &p, &p, &p), &params).expect("compose");
        assert_eq!((out.width, out.height, out.channels), (1000, 1100, 3));
        assert!(out.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn mismatched_patches_are_rejected() {
        let p = Image::new(40, 40, 3);
        let q = Image::new(40, 41, 3);
        let err = compose(&views(&p, &p, &q, &p), &LayoutParams::default()).unwrap_err();
        assert_eq!(
            err,
            StitchError::DimensionMismatch {
                expected: (40, 40, 3),
                got: (40, 41, 3)
            }
        );
    }

    #[test]
    fn patches_land_in_their_slots() {
        let (w, h) = (20, 10);
        let p = Image::filled(w, h, 1, 255);
        let params = LayoutParams {
            car_area_width: 8,
            car_area_height: 6,
        };
        let out = compose(&views(&p, &p, &p, &p), &params).expect("compose");
        assert_eq!((out.width, out.height), (48, 26));

        // Front: unrotated, bright far edge at the top.
        assert_eq!(out.pixel(24, 0)[0], 255);
        assert_eq!(out.pixel(24, h - 1)[0], 0);
        // Back: rotated 180 degrees, bright edge at the bottom.
        assert_eq!(out.pixel(24, 25)[0], 255);
        assert_eq!(out.pixel(24, h + 6)[0], 0);
        // Left: rotated CCW, bright edge on the outer (left) side.
        assert_eq!(out.pixel(0, 13)[0], 255);
        assert_eq!(out.pixel(w - 1, 13)[0], 0);
        // Right: rotated CW, bright edge on the outer (right) side.
        assert_eq!(out.pixel(47, 13)[0], 255);
        assert_eq!(out.pixel(28, 13)[0], 0);
        // Corners and vehicle area stay empty.
        assert_eq!(out.pixel(0, 0)[0], 0);
        assert_eq!(out.pixel(47, 25)[0], 0);
        assert_eq!(out.pixel(24, 13)[0], 0);
    }

    #[test]
    fn zero_channel_patches_are_rejected() {
        let p = Image::new(6, 6, 0);
        assert!(matches!(
            compose(&views(&p, &p, &p, &p), &LayoutParams::default()),
            Err(StitchError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_car_area_is_invalid() {
        let p = Image::new(4, 4, 3);
        let params = LayoutParams {
            car_area_width: 0,
            car_area_height: 3,
        };
        assert!(matches!(
            compose(&views(&p, &p, &p, &p), &params),
            Err(StitchError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn pair_stacks_horizontally() {
        let a = Image::filled(3, 2, 3, 10);
        let b = Image::filled(5, 2, 3, 20);
        let out = compose_pair(&a.view(), &b.view()).expect("same height");
        assert_eq!((out.width, out.height), (8, 2));
        assert_eq!(out.pixel(2, 1), &[10, 10, 10]);
        assert_eq!(out.pixel(3, 0), &[20, 20, 20]);

        let c = Image::new(5, 3, 3);
        assert!(compose_pair(&a.view(), &c.view()).is_err());
    }

    #[test]
    fn icon_fills_vehicle_area() {
        let params = LayoutParams {
            car_area_width: 4,
            car_area_height: 6,
        };
        let mut canvas = Image::new(2 * 5 + 4, 2 * 3 + 6, 3);
        let icon = Image::filled(32, 32, 3, 77);
        overlay_vehicle_icon(&mut canvas, &icon.view(), 5, 3, &params).expect("overlay");
        assert_eq!(canvas.pixel(5, 3), &[77, 77, 77]);
        assert_eq!(canvas.pixel(8, 8), &[77, 77, 77]);
        assert_eq!(canvas.pixel(4, 3), &[0, 0, 0]);
        assert_eq!(canvas.pixel(9, 9), &[0, 0, 0]);
    }
}
