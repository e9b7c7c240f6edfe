use crate::error::StitchError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Four source corners in the order top-left, top-right, bottom-right,
/// bottom-left. A different order yields a mirrored or folded warp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f32; 2]; 4]", into = "[[f32; 2]; 4]")]
pub struct PointQuad {
    pub corners: [Point2<f32>; 4],
}

/// Human-readable names of the corners, in quad order.
pub const CORNER_LABELS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

// Triangles whose doubled area is below this fraction of the squared quad
// diameter count as collinear.
const COLLINEAR_REL_TOL: f64 = 1e-6;

impl PointQuad {
    pub fn new(corners: [Point2<f32>; 4]) -> Self {
        Self { corners }
    }

    pub fn from_array(pts: [[f32; 2]; 4]) -> Self {
        Self::new(pts.map(|[x, y]| Point2::new(x, y)))
    }

    pub fn to_array(&self) -> [[f32; 2]; 4] {
        self.corners.map(|p| [p.x, p.y])
    }

    /// The canonical destination rectangle `(0,0),(w,0),(w,h),(0,h)`.
    pub fn rect(width: f32, height: f32) -> Self {
        Self::new([
            Point2::new(0.0, 0.0),
            Point2::new(width, 0.0),
            Point2::new(width, height),
            Point2::new(0.0, height),
        ])
    }

    /// Reject non-finite coordinates and any triple of collinear corners.
    pub fn validate(&self) -> Result<(), StitchError> {
        if self
            .corners
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(StitchError::geometry("quad has non-finite coordinates"));
        }

        let pts = self.corners.map(|p| Point2::new(p.x as f64, p.y as f64));
        let mut diam2 = 0.0_f64;
        for i in 0..4 {
            for j in i + 1..4 {
                diam2 = diam2.max((pts[i] - pts[j]).norm_squared());
            }
        }
        if diam2 <= f64::EPSILON {
            return Err(StitchError::geometry("quad corners coincide"));
        }

        for (a, b, c) in [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)] {
            let ab = pts[b] - pts[a];
            let ac = pts[c] - pts[a];
            let area2 = (ab.x * ac.y - ab.y * ac.x).abs();
            if area2 <= COLLINEAR_REL_TOL * diam2 {
                return Err(StitchError::geometry(format!(
                    "corners {}, {} and {} are collinear",
                    CORNER_LABELS[a], CORNER_LABELS[b], CORNER_LABELS[c]
                )));
            }
        }
        Ok(())
    }
}

impl From<[[f32; 2]; 4]> for PointQuad {
    fn from(pts: [[f32; 2]; 4]) -> Self {
        Self::from_array(pts)
    }
}

impl From<PointQuad> for [[f32; 2]; 4] {
    fn from(q: PointQuad) -> Self {
        q.to_array()
    }
}
