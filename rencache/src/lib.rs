//! A cache over a software renderer.
//!
//! All drawing operations are recorded as commands when issued. At the end
//! of the frame the commands are hashed into a grid of cells, the cells that
//! changed since the previous frame are merged into dirty rectangles, and
//! only those regions are redrawn.
//!
//! ```
//! use ren_cache::{Color, FontGroup, Rect, RenCache, Renderer, Surface};
//!
//! // A real implementation draws onto the window surface.
//! struct Output;
//! impl Renderer for Output {
//!     fn size(&self) -> (i32, i32) {
//!         (640, 480)
//!     }
//!     fn set_clip(&mut self, _rect: Rect) {}
//!     fn draw_rect(&mut self, _rect: Rect, _color: Color) {}
//!     fn draw_surface(&mut self, _surface: &Surface, _from: Rect, _to: Rect) {}
//!     fn draw_text(&mut self, _fonts: &FontGroup, _text: &str, x: f32, _y: i32, _color: Color) -> f32 {
//!         x
//!     }
//!     fn present(&mut self, _rects: &[Rect]) {}
//! }
//!
//! let mut output = Output;
//! let mut cache = RenCache::new();
//!
//! cache.begin_frame(&mut output);
//! cache.draw_rect(Rect::new(10, 10, 20, 20), Color::rgb(200, 60, 60));
//! cache.end_frame(&mut output);
//!
//! // An identical frame hashes identically and redraws nothing.
//! cache.begin_frame(&mut output);
//! cache.draw_rect(Rect::new(10, 10, 20, 20), Color::rgb(200, 60, 60));
//! cache.end_frame(&mut output);
//! ```

mod cache;
mod command;
mod font;
mod geometry;
mod hash;
mod surface;

pub use crate::cache::RenCache;
pub use crate::font::{Font, FontGroup};
pub use crate::geometry::{Color, Rect};
pub use crate::surface::{Surface, SurfaceError};

/// Change-detection grid width, in cells.
pub const CELLS_X: usize = 80;
/// Change-detection grid height, in cells.
pub const CELLS_Y: usize = 50;
/// Pixel size of one grid cell.
pub const CELL_SIZE: i32 = 96;
/// Capacity of the per-frame command buffer, in bytes.
pub const COMMAND_BUF_SIZE: usize = 1024 * 512;
/// Upper bound on fonts in a fallback group.
pub const FONT_FALLBACK_MAX: usize = 4;

/// The draw operations the cache replays onto the window.
///
/// Replay happens once per dirty rectangle with the clip set to that
/// rectangle, so implementations only rasterize what changed.
pub trait Renderer {
    /// Current output size in pixels.
    fn size(&self) -> (i32, i32);

    fn set_clip(&mut self, rect: Rect);

    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Blits the `from` region of `surface` into the `to` region of the
    /// output.
    fn draw_surface(&mut self, surface: &Surface, from: Rect, to: Rect);

    /// Draws `text` and returns the advanced x position.
    fn draw_text(&mut self, fonts: &FontGroup, text: &str, x: f32, y: i32, color: Color) -> f32;

    /// Flushes the listed regions to the output.
    fn present(&mut self, rects: &[Rect]);
}
