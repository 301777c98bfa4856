use crate::command::{Command, CommandQueue};
use crate::font::FontGroup;
use crate::geometry::{Color, Rect};
use crate::hash::{fnv1a, HASH_INITIAL};
use crate::surface::Surface;
use crate::{Renderer, CELLS_X, CELLS_Y, CELL_SIZE};
use std::mem;
use std::rc::Rc;

/// The draw-command cache.
///
/// Owns the per-frame command queue, the two change-detection grids and the
/// screen state, with an explicit `begin_frame`/`end_frame` lifecycle. All
/// drawing between the two calls is recorded, hashed into the cell grids and
/// replayed only where the grid differs from the previous frame.
///
/// Single threaded and frame synchronous; a frame either completes in
/// `end_frame` or is abandoned wholesale.
pub struct RenCache {
    commands: CommandQueue,
    cells: Box<[u32]>,
    cells_prev: Box<[u32]>,
    rects: Vec<Rect>,
    screen: Rect,
    show_debug: bool,
    tint: u32,
}

impl RenCache {
    pub fn new() -> RenCache {
        RenCache {
            commands: CommandQueue::new(),
            cells: vec![HASH_INITIAL; CELLS_X * CELLS_Y].into_boxed_slice(),
            cells_prev: vec![HASH_INITIAL; CELLS_X * CELLS_Y].into_boxed_slice(),
            rects: Vec::new(),
            screen: Rect::default(),
            show_debug: false,
            tint: 0x6b8b_4567,
        }
    }

    /// Toggles tinting of the dirty rectangles, for debugging redraws.
    pub fn show_debug(&mut self, enable: bool) {
        self.show_debug = enable;
    }

    /// Forces every cell to differ on the next `end_frame`, redrawing the
    /// whole screen.
    pub fn invalidate(&mut self) {
        self.cells_prev.fill(0xFFFF_FFFF);
    }

    /// Starts a frame, invalidating everything when the output size
    /// changed since the last one.
    pub fn begin_frame<R: Renderer>(&mut self, renderer: &mut R) {
        let (width, height) = renderer.size();
        if self.screen.width != width || self.screen.height != height {
            self.screen.width = width;
            self.screen.height = height;
            self.invalidate();
        }
    }

    /// Records a clip rectangle, clamped to the screen. Affects hashing and
    /// replay of every later command this frame.
    pub fn set_clip(&mut self, rect: Rect) {
        self.commands.push(Command::SetClip {
            rect: rect.intersect(self.screen),
        });
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        if !self.screen.overlaps(rect) || rect.is_empty() {
            return;
        }
        self.commands.push(Command::DrawRect { rect, color });
    }

    /// Records a text draw and returns the advanced x position, whether or
    /// not anything lands on screen.
    pub fn draw_text(&mut self, fonts: &FontGroup, text: &str, x: f32, y: i32, color: Color) -> f32 {
        let width = fonts.width(text);
        let rect = Rect::new(x as i32, y, width as i32, fonts.height());
        if self.screen.overlaps(rect) {
            self.commands.push(Command::DrawText {
                rect,
                color,
                fonts: fonts.clone(),
                text: text.into(),
                text_x: x,
                tab_size: fonts.tab_size(),
            });
        }
        x + width
    }

    /// Records a texture blit. The queue keeps its own reference on the
    /// surface, so the caller may release theirs before the frame ends.
    pub fn draw_texture(&mut self, rect: Rect, surface: &Rc<Surface>, source: Rect) {
        if !self.screen.overlaps(rect) || rect.is_empty() {
            return;
        }
        self.commands.push(Command::DrawTexture {
            rect,
            surface: Rc::clone(surface),
            source,
        });
    }

    /// Ends the frame: diffs the cell grids, redraws the changed regions
    /// and presents them.
    pub fn end_frame<R: Renderer>(&mut self, renderer: &mut R) {
        // Hash the commands into the cells they touch, tracking the clip
        // exactly as replay will.
        let mut clip = self.screen;
        for command in self.commands.iter() {
            if let Command::SetClip { rect } = command {
                clip = *rect;
            }
            let rect = command.rect().intersect(clip);
            if rect.is_empty() {
                continue;
            }
            fold_overlapping_cells(&mut self.cells, rect, command.hash());
        }

        // Collect the changed cells into merged rectangles. The reset runs
        // over the whole grid so stale invalidation values can't survive in
        // cells the screen doesn't currently cover.
        self.rects.clear();
        let max_x = (self.screen.width / CELL_SIZE + 1).min(CELLS_X as i32);
        let max_y = (self.screen.height / CELL_SIZE + 1).min(CELLS_Y as i32);
        for y in 0..CELLS_Y as i32 {
            for x in 0..CELLS_X as i32 {
                let idx = cell_index(x, y);
                if x < max_x && y < max_y && self.cells[idx] != self.cells_prev[idx] {
                    push_rect(&mut self.rects, Rect::new(x, y, 1, 1));
                }
                self.cells_prev[idx] = HASH_INITIAL;
            }
        }

        // Expand from cells to pixels.
        for rect in &mut self.rects {
            rect.x *= CELL_SIZE;
            rect.y *= CELL_SIZE;
            rect.width *= CELL_SIZE;
            rect.height *= CELL_SIZE;
            *rect = rect.intersect(self.screen);
        }

        // Redraw the updated regions. Every command replays; the renderer
        // clip confines the rasterization to the dirty rectangle.
        for i in 0..self.rects.len() {
            let dirty = self.rects[i];
            renderer.set_clip(dirty);

            for command in self.commands.iter() {
                match command {
                    Command::SetClip { rect } => renderer.set_clip(rect.intersect(dirty)),
                    Command::DrawRect { rect, color } => renderer.draw_rect(*rect, *color),
                    Command::DrawText {
                        rect,
                        color,
                        fonts,
                        text,
                        text_x,
                        tab_size,
                    } => {
                        fonts.set_tab_size(*tab_size);
                        renderer.draw_text(fonts, text, *text_x, rect.y, *color);
                    }
                    Command::DrawTexture {
                        rect,
                        surface,
                        source,
                    } => renderer.draw_surface(surface, *source, *rect),
                }
            }

            if self.show_debug {
                let color = Color::rgba(self.next_tint(), self.next_tint(), self.next_tint(), 50);
                renderer.draw_rect(dirty, color);
            }
        }

        // Release the queued font and surface references; a surface whose
        // owner let go mid-frame is freed here, after its last replay.
        self.commands.clear();

        if !self.rects.is_empty() {
            renderer.present(&self.rects);
        }

        mem::swap(&mut self.cells, &mut self.cells_prev);
    }

    /// xorshift32, just enough randomness for the debug tint.
    fn next_tint(&mut self) -> u8 {
        self.tint ^= self.tint << 13;
        self.tint ^= self.tint >> 17;
        self.tint ^= self.tint << 5;
        (self.tint & 0xFF) as u8
    }
}

impl Default for RenCache {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_index(x: i32, y: i32) -> usize {
    x as usize + y as usize * CELLS_X
}

/// Folds `hash` into every cell whose pixel rectangle intersects `rect`.
/// `rect` is already clipped to the screen; the cell range is additionally
/// clamped to the grid for screens larger than it covers.
fn fold_overlapping_cells(cells: &mut [u32], rect: Rect, hash: u32) {
    let x1 = rect.x / CELL_SIZE;
    let y1 = rect.y / CELL_SIZE;
    let x2 = ((rect.x + rect.width) / CELL_SIZE).min(CELLS_X as i32 - 1);
    let y2 = ((rect.y + rect.height) / CELL_SIZE).min(CELLS_Y as i32 - 1);

    for y in y1..=y2 {
        for x in x1..=x2 {
            fnv1a(&mut cells[cell_index(x, y)], &hash.to_le_bytes());
        }
    }
}

/// Appends a cell rectangle, greedily merging it into the most recent
/// overlapping one. Order dependent and cheap; at worst it overdraws.
fn push_rect(rects: &mut Vec<Rect>, rect: Rect) {
    for existing in rects.iter_mut().rev() {
        if existing.overlaps(rect) {
            *existing = existing.union(rect);
            return;
        }
    }
    rects.push(rect);
}
