use crate::image::sample_bilinear_u8;
use crate::{Homography, Image, ImageView, StitchError};

// Tolerance on the source bounds so that exact-edge mappings survive
// floating-point noise.
const BOUNDS_EPS: f64 = 1e-3;

/// Warp `src` into an `out_w x out_h` top-down patch.
///
/// `h` maps source pixels onto the patch (`patch ~ h * src`); every output
/// pixel is pulled back through `h^-1` and sampled bilinearly. Output pixels
/// whose pre-image leaves the source, or maps to infinity, stay black.
pub fn rectify(
    src: &ImageView<'_>,
    h: &Homography,
    out_w: usize,
    out_h: usize,
) -> Result<Image, StitchError> {
    if out_w == 0 || out_h == 0 {
        return Err(StitchError::geometry(format!(
            "output size {out_w}x{out_h} is empty"
        )));
    }
    let h_src_from_dst = h
        .inverse()
        .ok_or_else(|| StitchError::geometry("homography is singular"))?;

    let mut out = Image::new(out_w, out_h, src.channels);
    if src.width == 0 || src.height == 0 {
        return Ok(out);
    }

    let max_x = (src.width - 1) as f64 + BOUNDS_EPS;
    let max_y = (src.height - 1) as f64 + BOUNDS_EPS;

    for y in 0..out_h {
        for x in 0..out_w {
            let v = h_src_from_dst.apply_homogeneous(x as f64, y as f64);
            let w = v[2];
            if w.is_nan() || w.abs() <= f64::EPSILON {
                continue;
            }
            let sx = v[0] / w;
            let sy = v[1] / w;
            let inside =
                (-BOUNDS_EPS..=max_x).contains(&sx) && (-BOUNDS_EPS..=max_y).contains(&sy);
            if !inside {
                continue;
            }
            sample_bilinear_u8(src, sx as f32, sy as f32, out.pixel_mut(x, y));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{estimate_rect_homography, PointQuad};
    use nalgebra::Matrix3;

    fn gradient(w: usize, h: usize) -> Image {
        let mut img = Image::new(w, h, 3);
        for y in 0..h {
            for x in 0..w {
                let p = img.pixel_mut(x, y);
                p[0] = (x * 255 / (w - 1)) as u8;
                p[1] = (y * 255 / (h - 1)) as u8;
                p[2] = ((x + y) % 256) as u8;
            }
        }
        img
    }

    #[test]
    fn output_has_requested_size() {
        let img = gradient(37, 23);
        let q = PointQuad::from_array([[5.0, 3.0], [30.0, 4.0], [35.0, 20.0], [1.0, 21.0]]);
        for (w, h) in [(400, 400), (1, 1), (13, 71)] {
            let hom = estimate_rect_homography(&q, w, h).expect("valid quad");
            let out = rectify(&img.view(), &hom, w, h).expect("rectify");
            assert_eq!((out.width, out.height, out.channels), (w, h, 3));
        }
    }

    #[test]
    fn aligned_quad_reproduces_image() {
        let img = gradient(32, 24);
        let q = PointQuad::rect(32.0, 24.0);
        let hom = estimate_rect_homography(&q, 32, 24).expect("rectangle");
        let out = rectify(&img.view(), &hom, 32, 24).expect("rectify");
        for (a, b) in out.data.iter().zip(img.data.iter()) {
            assert!((*a as i16 - *b as i16).abs() <= 1, "{a} vs {b}");
        }
    }

    #[test]
    fn outside_source_is_black() {
        let img = Image::filled(10, 10, 3, 200);
        // Shift by 5 px: the first 5 output columns pull from x < 0.
        let hom = Homography::new(Matrix3::new(1.0, 0.0, 5.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0));
        let out = rectify(&img.view(), &hom, 20, 10).expect("rectify");
        assert_eq!(out.pixel(2, 5), &[0, 0, 0]);
        assert_eq!(out.pixel(7, 5), &[200, 200, 200]);
        assert_eq!(out.pixel(17, 5), &[0, 0, 0]);
    }

    #[test]
    fn singular_homography_is_rejected() {
        let img = Image::new(4, 4, 1);
        let hom = Homography::new(Matrix3::new(1.0, 2.0, 0.0, 2.0, 4.0, 0.0, 0.0, 0.0, 1.0));
        assert!(matches!(
            rectify(&img.view(), &hom, 4, 4),
            Err(StitchError::InvalidGeometry { .. })
        ));
    }
}
