use byteorder::{BigEndian, ByteOrder};
use std::fmt;

/// A 4-byte OpenType tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// The `GSUB` sfnt table tag.
    pub const GSUB: Tag = Tag::new(b"GSUB");
    /// Default script/langsys tag.
    pub const DFLT: Tag = Tag::new(b"DFLT");
    /// Lowercase variant some fonts use in place of `DFLT`.
    pub const DFLT_LOWER: Tag = Tag::new(b"dflt");
    /// Latin script, the fallback when no default script is defined.
    pub const LATN: Tag = Tag::new(b"latn");
    /// Sentinel feature tag standing for the script/language's required
    /// feature. Not a real OpenType tag.
    pub const REQUIRED: Tag = Tag::new(b" RQD");

    pub const fn new(bytes: &[u8; 4]) -> Self {
        Tag(*bytes)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

/// A borrowed view of one table structure.
///
/// OpenType offsets are relative to the start of the enclosing structure, so
/// a view keeps the slice from its own first byte to the end of the parent
/// table and resolves children with [`View::slice_at`]. All multibyte reads
/// are big-endian. Offsets in a malformed font surface as slice-index panics;
/// fonts are trusted input.
#[derive(Clone, Copy)]
pub(crate) struct View<'a> {
    data: &'a [u8],
}

impl<'a> View<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        View { data }
    }

    pub(crate) fn u16_at(&self, offset: usize) -> u16 {
        BigEndian::read_u16(&self.data[offset..])
    }

    pub(crate) fn u32_at(&self, offset: usize) -> u32 {
        BigEndian::read_u32(&self.data[offset..])
    }

    pub(crate) fn tag_at(&self, offset: usize) -> Tag {
        Tag([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    /// The view starting `offset` bytes into this structure.
    pub(crate) fn slice_at(&self, offset: usize) -> View<'a> {
        View {
            data: &self.data[offset..],
        }
    }
}
