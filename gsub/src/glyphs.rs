use crate::FontFace;
use std::{fmt, ops};

/// Growth factor applied when an overwrite extends past the current length.
const GROWTH_NUMERATOR: usize = 13;
const GROWTH_DENOMINATOR: usize = 10;

/// A growable ordered sequence of 16-bit glyph ids.
///
/// The substitution lookups edit sequences in place: overwriting single
/// positions, shifting tails left or right, and splicing rewritten windows
/// back in. Every primitive reports success as a `bool`; an out-of-range
/// index leaves the sequence untouched and returns `false`. Writing at
/// exactly `len` is a valid append.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GlyphBuffer {
    glyphs: Vec<u16>,
}

impl GlyphBuffer {
    pub fn new() -> Self {
        GlyphBuffer { glyphs: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        GlyphBuffer {
            glyphs: Vec::with_capacity(capacity),
        }
    }

    /// A sequence holding a copy of `glyphs`.
    pub fn from_glyphs(glyphs: &[u16]) -> Self {
        GlyphBuffer {
            glyphs: glyphs.to_vec(),
        }
    }

    /// Maps each codepoint of `text` through the face's cmap.
    pub fn from_text(face: &impl FontFace, text: &str) -> Self {
        let mut buf = Self::with_capacity(text.len());
        for c in text.chars() {
            buf.glyphs.push(face.glyph_index(c));
        }
        buf
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.glyphs
    }

    /// Overwrites the glyph at `index`, appending when `index == len`.
    pub fn set(&mut self, index: usize, glyph: u16) -> bool {
        if index > self.glyphs.len() {
            return false;
        }
        if index == self.glyphs.len() {
            self.reserve_for(index + 1);
            self.glyphs.push(glyph);
        } else {
            self.glyphs[index] = glyph;
        }
        true
    }

    /// Overwrites `src.len()` glyphs starting at `from`, growing the
    /// sequence when the range extends past the end.
    pub fn set_range(&mut self, from: usize, src: &[u16]) -> bool {
        if from > self.glyphs.len() {
            return false;
        }
        let end = from + src.len();
        if end > self.glyphs.len() {
            self.reserve_for(end);
            self.glyphs.resize(end, 0);
        }
        self.glyphs[from..end].copy_from_slice(src);
        true
    }

    /// Moves the glyphs in `src` to `dst` within the same backing store,
    /// with `memmove` overlap semantics. Grows the sequence when the
    /// destination range extends past the end; a destination starting past
    /// the end opens a zero-filled gap. Substitutions rely on the gap to
    /// shift a tail right and make room for a longer replacement.
    pub fn copy_within(&mut self, src: ops::Range<usize>, dst: usize) -> bool {
        if src.start > src.end || src.end > self.glyphs.len() {
            return false;
        }
        let end = dst + src.len();
        if end > self.glyphs.len() {
            self.reserve_for(end);
            self.glyphs.resize(end, 0);
        }
        self.glyphs.copy_within(src, dst);
        true
    }

    /// Appends a copy of the glyphs in `src` taken from this sequence.
    ///
    /// The copy survives any reallocation the growth needs; `Vec` preserves
    /// the contents before the write happens.
    pub fn extend_from_within(&mut self, src: ops::Range<usize>) -> bool {
        self.copy_within(src, self.glyphs.len())
    }

    pub fn append(&mut self, src: &[u16]) -> bool {
        self.set_range(self.glyphs.len(), src)
    }

    /// Drops the last `reduction` glyphs.
    pub fn shrink(&mut self, reduction: usize) -> bool {
        if reduction > self.glyphs.len() {
            return false;
        }
        let keep = self.glyphs.len() - reduction;
        self.glyphs.truncate(keep);
        true
    }

    fn reserve_for(&mut self, new_len: usize) {
        if new_len > self.glyphs.capacity() {
            let target = new_len * GROWTH_NUMERATOR / GROWTH_DENOMINATOR;
            self.glyphs.reserve_exact(target - self.glyphs.len());
        }
    }
}

impl ops::Index<usize> for GlyphBuffer {
    type Output = u16;

    fn index(&self, index: usize) -> &u16 {
        &self.glyphs[index]
    }
}

impl fmt::Debug for GlyphBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.glyphs.iter()).finish()
    }
}
