use crate::font::FontGroup;
use crate::geometry::{Color, Rect};
use crate::hash::{fnv1a, HASH_INITIAL};
use crate::surface::Surface;
use crate::{COMMAND_BUF_SIZE, FONT_FALLBACK_MAX};
use log::warn;
use std::rc::Rc;

/// Commands are padded to the maximum scalar alignment when accounting for
/// buffer space.
const COMMAND_ALIGN: usize = 16;

/// One recorded draw call. `rect` is the command's screen footprint.
pub(crate) enum Command {
    SetClip {
        rect: Rect,
    },
    DrawRect {
        rect: Rect,
        color: Color,
    },
    DrawText {
        rect: Rect,
        color: Color,
        fonts: FontGroup,
        text: Box<str>,
        text_x: f32,
        tab_size: i32,
    },
    DrawTexture {
        rect: Rect,
        surface: Rc<Surface>,
        source: Rect,
    },
}

impl Command {
    pub(crate) fn rect(&self) -> Rect {
        match self {
            Command::SetClip { rect }
            | Command::DrawRect { rect, .. }
            | Command::DrawText { rect, .. }
            | Command::DrawTexture { rect, .. } => *rect,
        }
    }

    /// The command's in-buffer size: a type word, the rect, the payload and
    /// any inline text, padded to [`COMMAND_ALIGN`].
    pub(crate) fn size(&self) -> usize {
        let payload = match self {
            Command::SetClip { .. } => 0,
            Command::DrawRect { .. } => 4,
            Command::DrawText { text, .. } => {
                4 + FONT_FALLBACK_MAX * 8 + 4 + 4 + text.len() + 1
            }
            Command::DrawTexture { .. } => 8 + 16,
        };
        let raw = 4 + 16 + payload;
        (raw + COMMAND_ALIGN - 1) & !(COMMAND_ALIGN - 1)
    }

    /// Hashes the command's identity bytes. Identical commands with the
    /// same fonts, colors and positions hash identically across frames;
    /// shared handles are identified by address.
    pub(crate) fn hash(&self) -> u32 {
        let mut h = HASH_INITIAL;
        fnv1a(&mut h, &[self.tag()]);
        fold_rect(&mut h, self.rect());
        match self {
            Command::SetClip { .. } => {}
            Command::DrawRect { color, .. } => fold_color(&mut h, *color),
            Command::DrawText {
                color,
                fonts,
                text,
                text_x,
                tab_size,
                ..
            } => {
                fold_color(&mut h, *color);
                fonts.fold(&mut h);
                fnv1a(&mut h, &text_x.to_le_bytes());
                fnv1a(&mut h, &tab_size.to_le_bytes());
                fnv1a(&mut h, text.as_bytes());
            }
            Command::DrawTexture {
                surface, source, ..
            } => {
                let address = Rc::as_ptr(surface) as usize;
                fnv1a(&mut h, &address.to_le_bytes());
                fold_rect(&mut h, *source);
            }
        }
        h
    }

    fn tag(&self) -> u8 {
        match self {
            Command::SetClip { .. } => 0,
            Command::DrawRect { .. } => 1,
            Command::DrawText { .. } => 2,
            Command::DrawTexture { .. } => 3,
        }
    }
}

fn fold_rect(h: &mut u32, rect: Rect) {
    fnv1a(h, &rect.x.to_le_bytes());
    fnv1a(h, &rect.y.to_le_bytes());
    fnv1a(h, &rect.width.to_le_bytes());
    fnv1a(h, &rect.height.to_le_bytes());
}

fn fold_color(h: &mut u32, color: Color) {
    fnv1a(h, &[color.r, color.g, color.b, color.a]);
}

/// The per-frame command ring: append only, iterated forward, reset after
/// every frame. Capacity is accounted in bytes against
/// [`COMMAND_BUF_SIZE`].
pub(crate) struct CommandQueue {
    commands: Vec<Command>,
    used: usize,
    exhausted: bool,
}

impl CommandQueue {
    pub(crate) fn new() -> CommandQueue {
        CommandQueue {
            commands: Vec::new(),
            used: 0,
            exhausted: false,
        }
    }

    /// Appends a command. On overflow the command is dropped, a warning is
    /// emitted once per frame and all further pushes fail silently.
    pub(crate) fn push(&mut self, command: Command) -> bool {
        let size = command.size();
        if self.used + size > COMMAND_BUF_SIZE {
            if !self.exhausted {
                warn!("exhausted command buffer, dropping draws until next frame");
                self.exhausted = true;
            }
            return false;
        }
        self.used += size;
        self.commands.push(command);
        true
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.commands.len()
    }

    /// Empties the queue, releasing every queued font and surface
    /// reference.
    pub(crate) fn clear(&mut self) {
        self.commands.clear();
        self.used = 0;
        self.exhausted = false;
    }
}
