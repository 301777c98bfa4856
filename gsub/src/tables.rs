//! Typed views over the GSUB table structures.
//!
//! Each view wraps the byte region starting at the structure it names, so
//! the offsets it reads resolve against the right base. Nothing is copied;
//! the views live as long as the table bytes.

use crate::read::{Tag, View};
use log::warn;

pub(crate) struct GsubHeader<'a>(View<'a>);

impl<'a> GsubHeader<'a> {
    pub(crate) fn new(table: &'a [u8]) -> Self {
        GsubHeader(View::new(table))
    }

    pub(crate) fn script_list(&self) -> ScriptList<'a> {
        ScriptList(self.0.slice_at(self.0.u16_at(4) as usize))
    }

    pub(crate) fn feature_list(&self) -> FeatureList<'a> {
        FeatureList(self.0.slice_at(self.0.u16_at(6) as usize))
    }

    pub(crate) fn lookup_list(&self) -> LookupList<'a> {
        LookupList(self.0.slice_at(self.0.u16_at(8) as usize))
    }
}

pub(crate) struct ScriptList<'a>(View<'a>);

impl<'a> ScriptList<'a> {
    /// Finds the script table with the given tag, or the default script
    /// (`DFLT`, tolerating the lowercase variant) when `script` is `None`.
    pub(crate) fn find(&self, script: Option<Tag>) -> Option<ScriptTable<'a>> {
        let count = self.0.u16_at(0);
        for i in 0..count as usize {
            let tag = self.0.tag_at(2 + i * 6);
            let matches = match script {
                None => tag == Tag::DFLT || tag == Tag::DFLT_LOWER,
                Some(wanted) => tag == wanted,
            };
            if matches {
                let offset = self.0.u16_at(2 + i * 6 + 4);
                return Some(ScriptTable(self.0.slice_at(offset as usize)));
            }
        }
        None
    }
}

pub(crate) struct ScriptTable<'a>(View<'a>);

impl<'a> ScriptTable<'a> {
    /// Finds the langsys table for `lang`, or the script's default langsys
    /// when `lang` is `None`.
    ///
    /// `DFLT`/`dflt` should never appear as language tags, but some fonts
    /// carry them anyway, so the default resolution falls back to records
    /// with those tags when `defaultLangSysOffset` is zero.
    pub(crate) fn lang_sys(&self, lang: Option<Tag>) -> Option<LangSys<'a>> {
        let is_default = matches!(lang, None | Some(Tag::DFLT) | Some(Tag::DFLT_LOWER));
        if is_default {
            let offset = self.0.u16_at(0);
            if offset != 0 {
                return Some(LangSys(self.0.slice_at(offset as usize)));
            }
        }
        let Some(lang) = lang else {
            return self
                .lang_sys(Some(Tag::DFLT_LOWER))
                .or_else(|| self.lang_sys(Some(Tag::DFLT)));
        };
        let count = self.0.u16_at(2);
        for i in 0..count as usize {
            if self.0.tag_at(4 + i * 6) == lang {
                let offset = self.0.u16_at(4 + i * 6 + 4);
                return Some(LangSys(self.0.slice_at(offset as usize)));
            }
        }
        None
    }
}

/// Required-feature index value meaning "no required feature".
pub(crate) const NO_REQUIRED_FEATURE: u16 = 0xFFFF;

pub(crate) struct LangSys<'a>(View<'a>);

impl LangSys<'_> {
    pub(crate) fn required_feature_index(&self) -> u16 {
        self.0.u16_at(2)
    }

    pub(crate) fn feature_index_count(&self) -> u16 {
        self.0.u16_at(4)
    }

    pub(crate) fn feature_index(&self, i: u16) -> u16 {
        self.0.u16_at(6 + i as usize * 2)
    }
}

pub(crate) struct FeatureList<'a>(View<'a>);

impl<'a> FeatureList<'a> {
    /// The feature table at `index` along with its record tag.
    pub(crate) fn get(&self, index: u16) -> Option<(Tag, FeatureTable<'a>)> {
        if index >= self.0.u16_at(0) {
            return None;
        }
        let base = 2 + index as usize * 6;
        let tag = self.0.tag_at(base);
        let offset = self.0.u16_at(base + 4);
        Some((tag, FeatureTable(self.0.slice_at(offset as usize))))
    }
}

pub(crate) struct FeatureTable<'a>(View<'a>);

impl FeatureTable<'_> {
    pub(crate) fn lookup_index_count(&self) -> u16 {
        self.0.u16_at(2)
    }

    pub(crate) fn lookup_index(&self, i: u16) -> u16 {
        self.0.u16_at(4 + i as usize * 2)
    }
}

pub(crate) struct LookupList<'a>(View<'a>);

impl<'a> LookupList<'a> {
    pub(crate) fn len(&self) -> u16 {
        self.0.u16_at(0)
    }

    pub(crate) fn lookup(&self, index: u16) -> Option<LookupTable<'a>> {
        if index >= self.len() {
            return None;
        }
        let offset = self.0.u16_at(2 + index as usize * 2);
        Some(LookupTable(self.0.slice_at(offset as usize)))
    }
}

pub(crate) struct LookupTable<'a>(View<'a>);

impl<'a> LookupTable<'a> {
    /// The lookup type, 1 through 8.
    pub(crate) fn kind(&self) -> u16 {
        self.0.u16_at(0)
    }

    pub(crate) fn subtable_count(&self) -> u16 {
        self.0.u16_at(4)
    }

    pub(crate) fn subtable(&self, i: u16) -> View<'a> {
        let offset = self.0.u16_at(6 + i as usize * 2);
        self.0.slice_at(offset as usize)
    }
}

/// A set of glyph ids, each with a rank (its position in the set).
pub(crate) struct Coverage<'a>(View<'a>);

impl<'a> Coverage<'a> {
    pub(crate) fn new(view: View<'a>) -> Self {
        Coverage(view)
    }

    /// Returns the coverage index of `glyph`, or `None` when not covered.
    pub(crate) fn rank(&self, glyph: u16) -> Option<u32> {
        match self.0.u16_at(0) {
            1 => {
                // Sorted glyph array, binary searched.
                let count = self.0.u16_at(2) as usize;
                let mut lo = 0;
                let mut hi = count;
                while lo < hi {
                    let mid = (lo + hi) / 2;
                    if self.0.u16_at(4 + mid * 2) < glyph {
                        lo = mid + 1;
                    } else {
                        hi = mid;
                    }
                }
                if lo < count && self.0.u16_at(4 + lo * 2) == glyph {
                    Some(lo as u32)
                } else {
                    None
                }
            }
            2 => {
                // Glyph ranges; the rank accumulates over preceding ranges.
                let range_count = self.0.u16_at(2) as usize;
                let mut rank = 0u32;
                for i in 0..range_count {
                    let base = 4 + i * 6;
                    let start = self.0.u16_at(base);
                    if glyph < start {
                        break;
                    }
                    let end = self.0.u16_at(base + 2);
                    if glyph > end {
                        rank += u32::from(end - start) + 1;
                        continue;
                    }
                    return Some(rank + u32::from(glyph - start));
                }
                None
            }
            format => {
                warn!("unknown coverage format {}", format);
                None
            }
        }
    }
}

/// A partition of glyph ids into 16-bit classes. Unlisted glyphs are class 0.
pub(crate) struct ClassDef<'a>(View<'a>);

impl<'a> ClassDef<'a> {
    pub(crate) fn new(view: View<'a>) -> Self {
        ClassDef(view)
    }

    pub(crate) fn class(&self, glyph: u16) -> u16 {
        match self.0.u16_at(0) {
            1 => {
                let start = self.0.u16_at(2);
                let count = self.0.u16_at(4);
                if glyph < start || u32::from(glyph) >= u32::from(start) + u32::from(count) {
                    return 0;
                }
                self.0.u16_at(6 + (glyph - start) as usize * 2)
            }
            2 => {
                let range_count = self.0.u16_at(2) as usize;
                let mut lo = 0;
                let mut hi = range_count;
                while lo < hi {
                    let mid = (lo + hi) / 2;
                    let base = 4 + mid * 6;
                    if glyph < self.0.u16_at(base) {
                        hi = mid;
                    } else if glyph > self.0.u16_at(base + 2) {
                        lo = mid + 1;
                    } else {
                        return self.0.u16_at(base + 4);
                    }
                }
                0
            }
            format => {
                warn!("unknown class definition format {}", format);
                0
            }
        }
    }
}
