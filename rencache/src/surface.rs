use crate::geometry::{Color, Rect};
use std::{error::Error, fmt};

/// An owned RGBA bitmap.
///
/// Surfaces are shared through `Rc`: the owner keeps one reference and the
/// cache holds an extra one for every queued texture draw, so a surface
/// released by its owner mid-frame stays alive until the frame's replay and
/// is freed exactly once, after `end_frame`. The counters are non-atomic;
/// the whole cache is single threaded.
#[derive(Debug)]
pub struct Surface {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Creates a transparent surface. Dimensions must be positive.
    pub fn new(width: i32, height: i32) -> Result<Surface, SurfaceError> {
        Self::filled(width, height, Color::rgba(0, 0, 0, 0))
    }

    /// Creates a surface filled with `color`.
    pub fn filled(width: i32, height: i32, color: Color) -> Result<Surface, SurfaceError> {
        if width <= 0 || height <= 0 {
            return Err(SurfaceError::InvalidSize { width, height });
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Ok(Surface {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The full-surface rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Raw RGBA pixel data, row major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    InvalidSize { width: i32, height: i32 },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::InvalidSize { width, height } => {
                write!(f, "invalid surface size {}x{}", width, height)
            }
        }
    }
}

impl Error for SurfaceError {}
