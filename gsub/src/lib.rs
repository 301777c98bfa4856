//! OpenType GSUB glyph substitution for software text rendering.
//!
//! A font's GSUB table rewrites glyph sequences according to the script,
//! language and feature set in effect. Build a [`Chain`] once per
//! (script, language, features) selection, then apply it to each
//! [`GlyphBuffer`] before rasterizing.
//!
//! ```
//! use ren_gsub::{Chain, FontFace, GlyphBuffer, Tag};
//!
//! // A real implementation wraps a loaded font face.
//! struct Face;
//! impl FontFace for Face {
//!     fn glyph_index(&self, codepoint: char) -> u16 {
//!         codepoint as u16
//!     }
//!     fn load_table(&self, _tag: Tag) -> Option<Vec<u8>> {
//!         None
//!     }
//! }
//!
//! let face = Face;
//! let chain = Chain::new(&face, None, None, &[Tag::new(b"liga"), Tag::new(b"calt")]);
//!
//! let glyphs = GlyphBuffer::from_text(&face, "ffi");
//! let shaped = chain.apply(&glyphs);
//!
//! // This face carries no GSUB table, so the chain is empty and
//! // shaping is the identity.
//! assert!(chain.is_empty());
//! assert_eq!(shaped, glyphs);
//! ```

mod chain;
mod glyphs;
mod lookup;
mod read;
mod tables;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::chain::{required_feature, Chain};
pub use crate::glyphs::GlyphBuffer;
pub use crate::read::Tag;

/// Source of font data for shaping.
///
/// Only the two queries GSUB interpretation needs: codepoint to glyph id
/// mapping and raw sfnt table loading.
pub trait FontFace {
    /// Returns the glyph id for a codepoint, `0` (`.notdef`) when unmapped.
    fn glyph_index(&self, codepoint: char) -> u16;

    /// Returns a copy of the raw bytes of the sfnt table with the given tag,
    /// or `None` when the face doesn't carry it.
    fn load_table(&self, tag: Tag) -> Option<Vec<u8>>;
}
