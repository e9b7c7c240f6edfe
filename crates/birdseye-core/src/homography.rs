use crate::{PointQuad, StitchError};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

// |det| below this (after scale normalization) marks a singular transform.
const SINGULAR_DET_EPS: f64 = 1e-12;

// h33 smaller than this fraction of the Frobenius norm counts as zero.
const H33_REL_EPS: f64 = 1e-9;

/// Projective transform `dst ~ H * src`.
///
/// Estimated transforms are scaled so `h[(2, 2)] == 1` when the source origin
/// maps to a finite point. When it lies on the horizon (`h33 == 0`) the matrix
/// is scaled to unit Frobenius norm with `h[(2, 2)] >= 0` instead.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    /// Map a point and keep the homogeneous weight, so callers can reject
    /// points that land on or behind the line at infinity.
    #[inline]
    pub fn apply_homogeneous(&self, x: f64, y: f64) -> Vector3<f64> {
        self.h * Vector3::new(x, y, 1.0)
    }

    pub fn determinant(&self) -> f64 {
        self.h.determinant()
    }

    pub fn is_singular(&self) -> bool {
        !self.determinant().is_finite() || self.determinant().abs() < SINGULAR_DET_EPS
    }

    pub fn inverse(&self) -> Option<Self> {
        if self.is_singular() {
            return None;
        }
        self.h.try_inverse().map(Self::new)
    }
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points4(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    // translate to centroid, scale so mean distance = sqrt(2)
    let (mut cx, mut cy) = (0.0_f64, 0.0_f64);
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= 4.0;
    cy /= 4.0;

    let mean_dist = pts
        .iter()
        .map(|p| (p.x as f64 - cx).hypot(p.y as f64 - cy))
        .sum::<f64>()
        / 4.0;

    let t = hartley_normalization(cx, cy, mean_dist);
    let out = pts.map(|p| {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new(v[0], v[1])
    });
    (out, t)
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let norm = h.norm();
    if !norm.is_finite() || norm < 1e-300 {
        return None;
    }
    let h33 = h[(2, 2)];
    let s = if h33.abs() > H33_REL_EPS * norm {
        h33
    } else if h33 < 0.0 {
        -norm
    } else {
        norm
    };
    Some(h / s)
}

fn denormalize_homography(
    hn: Matrix3<f64>,
    t_src: Matrix3<f64>,
    t_dst: Matrix3<f64>,
) -> Option<Matrix3<f64>> {
    let t_dst_inv = t_dst.try_inverse()?;
    Some(t_dst_inv * hn * t_src)
}

/// Compute H such that `dst ~ H * src` from 4 correspondences (matched by
/// index). Returns `None` when the 8x8 system is singular.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1
    // h11 x + h12 y + h13 - u h31 x - u h32 y = u
    // h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let (src_n, t_src) = normalize_points4(src);
    let (dst_n, t_dst) = normalize_points4(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let (x, y) = (src_n[k].x, src_n[k].y);
        let (u, v) = (dst_n[k].x, dst_n[k].y);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h_den = denormalize_homography(hn, t_src, t_dst)?;
    let h_den = normalize_homography(h_den)?;

    Some(Homography::new(h_den))
}

/// Estimate the homography taking `src` onto the axis-aligned rectangle
/// `(0,0),(w,0),(w,h),(0,h)`, corner for corner.
pub fn estimate_rect_homography(
    src: &PointQuad,
    dst_width: usize,
    dst_height: usize,
) -> Result<Homography, StitchError> {
    if dst_width == 0 || dst_height == 0 {
        return Err(StitchError::geometry(format!(
            "destination rectangle {dst_width}x{dst_height} is empty"
        )));
    }
    src.validate()?;

    let dst = PointQuad::rect(dst_width as f32, dst_height as f32);
    let h = homography_from_4pt(&src.corners, &dst.corners)
        .ok_or_else(|| StitchError::geometry("4-point system is singular"))?;
    if h.is_singular() {
        return Err(StitchError::geometry("estimated homography is singular"));
    }

    log::debug!(
        "homography {}x{} det={:.3e}",
        dst_width,
        dst_height,
        h.determinant()
    );
    Ok(h)
}
