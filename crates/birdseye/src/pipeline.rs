//! End-to-end runs: images and picked quads in, bird's-eye composite out.

use crate::config::{CameraPosition, RigConfig};
use crate::io::{load_image, save_image};
use crate::PipelineError;
use birdseye_core::{
    compose, compose_pair, estimate_rect_homography, overlay_vehicle_icon, rectify, Homography,
    Image, LayoutParams, PointQuad, StitchError, SurroundViews,
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Estimate the ground homography of one camera and warp it top-down.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(src, quad), fields(width = src.width, height = src.height))
)]
pub fn top_down_view(
    src: &Image,
    quad: &PointQuad,
    out_w: usize,
    out_h: usize,
) -> Result<(Image, Homography), StitchError> {
    let h = estimate_rect_homography(quad, out_w, out_h)?;
    let patch = rectify(&src.view(), &h, out_w, out_h)?;
    Ok((patch, h))
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraReport {
    pub camera: CameraPosition,
    pub image_path: String,
    pub image_width: usize,
    pub image_height: usize,
    pub points: PointQuad,
    pub homography: [[f64; 3]; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct SurroundReport {
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub patch_width: usize,
    pub patch_height: usize,
    pub layout: LayoutParams,
    pub vehicle_icon: bool,
    pub cameras: Vec<CameraReport>,
}

/// Result of a full rig run; nothing is written to disk yet.
#[derive(Debug, Clone)]
pub struct SurroundOutput {
    pub canvas: Image,
    /// Unfeathered rectified patches in [`CameraPosition::ALL`] order.
    pub patches: Vec<(CameraPosition, Image)>,
    pub report: SurroundReport,
}

impl SurroundOutput {
    pub fn patch(&self, pos: CameraPosition) -> Option<&Image> {
        self.patches
            .iter()
            .find_map(|(p, img)| (*p == pos).then_some(img))
    }
}

/// Run the whole rig: load, rectify and compose all four cameras.
///
/// Relative paths in `cfg` are resolved against `base_dir`. The first
/// failing stage aborts the run.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg)))]
pub fn run_surround(cfg: &RigConfig, base_dir: &Path) -> Result<SurroundOutput, PipelineError> {
    let mut patches = Vec::with_capacity(4);
    let mut cameras = Vec::with_capacity(4);

    for pos in CameraPosition::ALL {
        let cam = cfg.cameras.get(pos);
        let path = cfg.image_path(pos, base_dir);
        let src = load_image(&path)?;
        let (patch, h) = top_down_view(&src, &cam.points, cfg.patch_width, cfg.patch_height)
            .map_err(|source| PipelineError::Camera {
                camera: pos,
                source,
            })?;
        log::info!(
            "{pos}: {}x{} -> {}x{} top-down patch",
            src.width,
            src.height,
            patch.width,
            patch.height
        );

        cameras.push(CameraReport {
            camera: pos,
            image_path: path.to_string_lossy().into_owned(),
            image_width: src.width,
            image_height: src.height,
            points: cam.points,
            homography: h.to_array(),
        });
        patches.push((pos, patch));
    }

    let views = SurroundViews {
        front: patches[0].1.view(),
        back: patches[1].1.view(),
        left: patches[2].1.view(),
        right: patches[3].1.view(),
    };
    let mut canvas = compose(&views, &cfg.layout)?;

    let vehicle_icon = match cfg.vehicle_icon_path.as_deref() {
        Some(p) => {
            let icon = load_image(crate::config::resolve_path(base_dir, p))?;
            overlay_vehicle_icon(
                &mut canvas,
                &icon.view(),
                cfg.patch_width,
                cfg.patch_height,
                &cfg.layout,
            )?;
            true
        }
        None => false,
    };

    let report = SurroundReport {
        canvas_width: canvas.width,
        canvas_height: canvas.height,
        patch_width: cfg.patch_width,
        patch_height: cfg.patch_height,
        layout: cfg.layout,
        vehicle_icon,
        cameras,
    };

    Ok(SurroundOutput {
        canvas,
        patches,
        report,
    })
}

/// Write the composite, and the optional patches and report, to the paths
/// named in `cfg`. `output_override` replaces the configured output path.
pub fn write_surround(
    out: &SurroundOutput,
    cfg: &RigConfig,
    base_dir: &Path,
    output_override: Option<&Path>,
) -> Result<PathBuf, PipelineError> {
    let output = output_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cfg.output_path(base_dir));
    save_image(&output, &out.canvas)?;

    if let Some(dir) = cfg.patch_dir(base_dir) {
        fs::create_dir_all(&dir)?;
        for (pos, patch) in &out.patches {
            save_image(dir.join(format!("{pos}-top-down.png")), patch)?;
        }
    }

    if let Some(report_path) = cfg.report_path(base_dir) {
        fs::write(&report_path, serde_json::to_string_pretty(&out.report)?)?;
        log::info!("wrote report JSON to {}", report_path.display());
    }

    Ok(output)
}

/// Two-camera variant: rectify both views and place them side by side.
pub fn run_pair(
    left: &Image,
    left_quad: &PointQuad,
    right: &Image,
    right_quad: &PointQuad,
    out_w: usize,
    out_h: usize,
) -> Result<Image, PipelineError> {
    let (l, _) = top_down_view(left, left_quad, out_w, out_h)?;
    let (r, _) = top_down_view(right, right_quad, out_w, out_h)?;
    Ok(compose_pair(&l.view(), &r.view())?)
}
