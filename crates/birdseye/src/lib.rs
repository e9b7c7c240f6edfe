//! High-level facade for surround-view bird's-eye stitching.
//!
//! This crate provides:
//! - re-exports of the geometric core (`birdseye::core`)
//! - a JSON rig configuration ([`RigConfig`])
//! - (feature `image`) image loading/saving and end-to-end pipeline helpers
//!
//! ## Quickstart
//!
//! ```no_run
//! use birdseye::{pipeline, RigConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = RigConfig::load_json("rig.json")?;
//! let out = pipeline::run_surround(&cfg, Path::new("."))?;
//! pipeline::write_surround(&out, &cfg, Path::new("."), None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `birdseye::core`: homography, rectification, blend masks, layout, picker.
//! - `birdseye::config`: rig description loaded from JSON.
//! - `birdseye::io` (feature `image`): decode/encode via the `image` crate.
//! - `birdseye::pipeline` (feature `image`): load → rectify → compose → save.

pub use birdseye_core as core;

pub mod config;
mod error;

#[cfg(feature = "image")]
pub mod io;
#[cfg(feature = "image")]
pub mod pipeline;

pub use birdseye_core::{Image, LayoutParams, PointQuad, StitchError};
pub use config::{CameraConfig, CameraPosition, RigCameras, RigConfig};
pub use error::PipelineError;
