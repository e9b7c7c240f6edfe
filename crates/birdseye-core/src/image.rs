//! Interleaved 8-bit image container and the pixel operations the
//! compositor needs: bilinear sampling, quarter-turn rotation, resize and
//! saturating region addition.

use crate::error::{Dims, StitchError};

/// Borrowed row-major image with interleaved channels.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: &'a [u8], // len = w*h*c
}

/// Owned row-major image with interleaved channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

/// Quarter-turn rotations applied to views before placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    None,
    Clockwise90,
    Rotate180,
    CounterClockwise90,
}

impl Image {
    /// Zero-filled (black) image.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0u8; width * height * channels],
        }
    }

    /// Image with every channel of every pixel set to `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![value; width * height * channels],
        }
    }

    /// Wrap an existing buffer; fails if its length does not match.
    pub fn from_raw(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, StitchError> {
        if channels == 0 {
            return Err(StitchError::DimensionMismatch {
                expected: (width, height, 1),
                got: (width, height, channels),
            });
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(StitchError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: &self.data,
        }
    }

    pub fn dims(&self) -> Dims {
        (self.width, self.height, self.channels)
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let i = (y * self.width + x) * self.channels;
        &self.data[i..i + self.channels]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let i = (y * self.width + x) * self.channels;
        &mut self.data[i..i + self.channels]
    }

    /// Saturating per-channel addition of `src` with its top-left corner at
    /// `(x0, y0)`. Pixels falling outside `self` are dropped.
    pub fn add_saturating(
        &mut self,
        src: &ImageView<'_>,
        x0: usize,
        y0: usize,
    ) -> Result<(), StitchError> {
        self.check_channels(src)?;
        self.for_each_overlap(src, x0, y0, |dst, s| {
            for (d, v) in dst.iter_mut().zip(s) {
                *d = d.saturating_add(*v);
            }
        });
        Ok(())
    }

    /// Overwrite the region at `(x0, y0)` with `src`.
    pub fn paste(&mut self, src: &ImageView<'_>, x0: usize, y0: usize) -> Result<(), StitchError> {
        self.check_channels(src)?;
        self.for_each_overlap(src, x0, y0, |dst, s| dst.copy_from_slice(s));
        Ok(())
    }

    fn check_channels(&self, src: &ImageView<'_>) -> Result<(), StitchError> {
        if src.channels != self.channels {
            return Err(StitchError::DimensionMismatch {
                expected: (src.width, src.height, self.channels),
                got: (src.width, src.height, src.channels),
            });
        }
        Ok(())
    }

    fn for_each_overlap<F>(&mut self, src: &ImageView<'_>, x0: usize, y0: usize, mut f: F)
    where
        F: FnMut(&mut [u8], &[u8]),
    {
        let c = self.channels;
        let w = src.width.min(self.width.saturating_sub(x0));
        let h = src.height.min(self.height.saturating_sub(y0));
        if w == 0 {
            return;
        }
        for y in 0..h {
            let d0 = ((y0 + y) * self.width + x0) * c;
            let s0 = y * src.width * c;
            f(
                &mut self.data[d0..d0 + w * c],
                &src.data[s0..s0 + w * c],
            );
        }
    }
}

#[inline]
fn get_channel(src: &ImageView<'_>, x: i32, y: i32, ch: usize) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[(y as usize * src.width + x as usize) * src.channels + ch]
}

/// Bilinear sample of one channel; integer coordinates hit pixel centres and
/// neighbours outside the image read as 0.
#[inline]
pub fn sample_bilinear(src: &ImageView<'_>, x: f32, y: f32, ch: usize) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_channel(src, x0, y0, ch) as f32;
    let p10 = get_channel(src, x0 + 1, y0, ch) as f32;
    let p01 = get_channel(src, x0, y0 + 1, ch) as f32;
    let p11 = get_channel(src, x0 + 1, y0 + 1, ch) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

/// Bilinear sample of every channel into `out` (len = channels), rounded and
/// clamped to `u8`.
#[inline]
pub fn sample_bilinear_u8(src: &ImageView<'_>, x: f32, y: f32, out: &mut [u8]) {
    for (ch, o) in out.iter_mut().enumerate() {
        *o = sample_bilinear(src, x, y, ch).round().clamp(0.0, 255.0) as u8;
    }
}

/// Exact quarter-turn rotation.
pub fn rotate(src: &ImageView<'_>, rotation: Rotation) -> Image {
    let (w, h, c) = (src.width, src.height, src.channels);
    let (ow, oh) = match rotation {
        Rotation::None | Rotation::Rotate180 => (w, h),
        Rotation::Clockwise90 | Rotation::CounterClockwise90 => (h, w),
    };
    let mut out = Image::new(ow, oh, c);
    for y in 0..h {
        for x in 0..w {
            let (dx, dy) = match rotation {
                Rotation::None => (x, y),
                Rotation::Rotate180 => (w - 1 - x, h - 1 - y),
                Rotation::Clockwise90 => (h - 1 - y, x),
                Rotation::CounterClockwise90 => (y, w - 1 - x),
            };
            let s = (y * w + x) * c;
            out.pixel_mut(dx, dy).copy_from_slice(&src.data[s..s + c]);
        }
    }
    out
}

/// Bilinear resize with corner-aligned sampling: the first and last
/// rows/columns of the output sample the first and last of the source.
pub fn resize_bilinear(src: &ImageView<'_>, width: usize, height: usize) -> Image {
    let mut dst = Image::new(width, height, src.channels);
    if width == 0 || height == 0 || src.width == 0 || src.height == 0 {
        return dst;
    }
    if width == src.width && height == src.height {
        dst.data.copy_from_slice(src.data);
        return dst;
    }

    let sx = if width > 1 {
        (src.width - 1) as f32 / (width - 1) as f32
    } else {
        0.0
    };
    let sy = if height > 1 {
        (src.height - 1) as f32 / (height - 1) as f32
    } else {
        0.0
    };

    for y in 0..height {
        let fy = y as f32 * sy;
        for x in 0..width {
            let fx = x as f32 * sx;
            sample_bilinear_u8(src, fx, fy, dst.pixel_mut(x, y));
        }
    }
    dst
}
