//! Geometry and pixel math for surround-view bird's-eye stitching.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! decode or encode images and never touches the filesystem; see the
//! `birdseye` facade crate for I/O, configuration and the CLI.
//!
//! Pipeline:
//! 1. [`estimate_rect_homography`] maps a camera's ground [`PointQuad`] onto
//!    a `w x h` rectangle.
//! 2. [`rectify`] warps the camera image into that top-down patch.
//! 3. [`BlendMask::vertical_fade`] and [`apply_blend_mask`] feather the patch.
//! 4. [`compose`] arranges four patches around the vehicle footprint.
//!
//! ```
//! use birdseye_core::{compose, Image, LayoutParams, SurroundViews};
//!
//! let patch = Image::new(400, 400, 3);
//! let views = SurroundViews {
//!     front: patch.view(),
//!     back: patch.view(),
//!     left: patch.view(),
//!     right: patch.view(),
//! };
//! let canvas = compose(&views, &LayoutParams::default()).unwrap();
//! assert_eq!((canvas.width, canvas.height), (1000, 1100));
//! ```

mod error;
mod homography;
mod image;
mod layout;
mod logger;
mod mask;
mod picker;
mod quad;
mod rectify;

pub use error::{Dims, StitchError};
pub use homography::{estimate_rect_homography, homography_from_4pt, Homography};
pub use image::{
    resize_bilinear, rotate, sample_bilinear, sample_bilinear_u8, Image, ImageView, Rotation,
};
pub use layout::{
    compose, compose_pair, overlay_vehicle_icon, LayoutParams, Placement, SurroundLayout,
    SurroundViews,
};
pub use mask::{apply_blend_mask, rectify_masked, BlendMask};
pub use picker::{PickerEvent, PickerState, PointPicker};
pub use quad::{PointQuad, CORNER_LABELS};
pub use rectify::rectify;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
