//! Script/language/feature selection and chain building.

use crate::glyphs::GlyphBuffer;
use crate::lookup::{Interpreter, ALTERNATE};
use crate::read::Tag;
use crate::tables::{FeatureTable, GsubHeader, LookupList, NO_REQUIRED_FEATURE};
use crate::FontFace;
use log::warn;

/// The ordered substitution lookups selected for a (script, language,
/// feature list) triple, together with the GSUB table bytes they point into.
///
/// The caller's feature order decides *which* lookups take part, but not the
/// order they run in: the chain always executes lookups in ascending
/// lookup-list order, as the font's own ordering intends. The one ordering
/// control a caller has is where it puts [`Tag::REQUIRED`], which expands to
/// the script/language's required feature.
pub struct Chain {
    table: Option<Box<[u8]>>,
    lookups: Vec<u16>,
}

impl Chain {
    /// Builds the chain for the face's GSUB table.
    ///
    /// `script` and `lang` select the script and language systems, `None`
    /// meaning the font's defaults. A face without a GSUB table, or without
    /// the requested script or language, yields an empty chain and shaping
    /// is the identity.
    pub fn new(
        face: &impl FontFace,
        script: Option<Tag>,
        lang: Option<Tag>,
        features: &[Tag],
    ) -> Chain {
        match face.load_table(Tag::GSUB) {
            Some(table) => Chain::from_table(table, script, lang, features),
            None => Chain::empty(),
        }
    }

    /// Builds the chain from raw GSUB table bytes.
    pub fn from_table(
        table: Vec<u8>,
        script: Option<Tag>,
        lang: Option<Tag>,
        features: &[Tag],
    ) -> Chain {
        let header = GsubHeader::new(&table);

        let script_table = match header.script_list().find(script) {
            Some(found) => Some(found),
            // Some fonts don't define the default script; latn stands in.
            None if script.is_none() => header.script_list().find(Some(Tag::LATN)),
            None => None,
        };
        let Some(script_table) = script_table else {
            return Chain::empty();
        };
        let Some(lang_sys) = script_table.lang_sys(lang) else {
            return Chain::empty();
        };

        let feature_list = header.feature_list();
        let lookup_list = header.lookup_list();
        let mut seen = vec![false; lookup_list.len() as usize];

        for &wanted in features {
            if wanted == Tag::REQUIRED {
                let required = lang_sys.required_feature_index();
                if required != NO_REQUIRED_FEATURE {
                    match feature_list.get(required) {
                        Some((_, feature)) => mark_lookups(&feature, &lookup_list, &mut seen),
                        None => warn!("unable to obtain required feature #{}", required),
                    }
                }
                continue;
            }
            for j in 0..lang_sys.feature_index_count() {
                let index = lang_sys.feature_index(j);
                let Some((tag, feature)) = feature_list.get(index) else {
                    warn!("unable to obtain feature #{}", index);
                    continue;
                };
                if tag == wanted {
                    // There should be only one feature with a given tag.
                    mark_lookups(&feature, &lookup_list, &mut seen);
                    break;
                }
            }
        }

        let lookups = (0..lookup_list.len())
            .filter(|&i| seen[i as usize])
            .collect();
        Chain {
            table: Some(table.into_boxed_slice()),
            lookups,
        }
    }

    /// A chain that substitutes nothing.
    pub fn empty() -> Chain {
        Chain {
            table: None,
            lookups: Vec::new(),
        }
    }

    /// Number of lookups in the chain.
    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }

    /// Runs every lookup of the chain, in order, over a copy of `glyphs`
    /// and returns the substituted sequence.
    pub fn apply(&self, glyphs: &GlyphBuffer) -> GlyphBuffer {
        let mut out = glyphs.clone();
        let Some(table) = &self.table else {
            return out;
        };
        let header = GsubHeader::new(table);
        let lookup_list = header.lookup_list();
        let interpreter = Interpreter::new(&header);
        for &index in &self.lookups {
            if let Some(lookup) = lookup_list.lookup(index) {
                interpreter.apply_lookup(&lookup, &mut out);
            }
        }
        out
    }
}

/// Marks the feature's lookups in the seen bitmap, dropping alternate-type
/// lookups since the interpreter can't apply them anyway.
fn mark_lookups(feature: &FeatureTable<'_>, lookup_list: &LookupList<'_>, seen: &mut [bool]) {
    for k in 0..feature.lookup_index_count() {
        let index = feature.lookup_index(k);
        let Some(lookup) = lookup_list.lookup(index) else {
            warn!("unable to obtain lookup of feature");
            continue;
        };
        if lookup.kind() == ALTERNATE {
            warn!("dropping unsupported alternate substitution lookup {}", index);
            continue;
        }
        seen[index as usize] = true;
    }
}

/// Returns the tag of the required feature for a (script, language) pair,
/// or `None` when the pair defines no required feature. Lets callers decide
/// where [`Tag::REQUIRED`] belongs in their feature ordering.
pub fn required_feature(
    face: &impl FontFace,
    script: Option<Tag>,
    lang: Option<Tag>,
) -> Option<Tag> {
    let table = face.load_table(Tag::GSUB)?;
    required_feature_in(&table, script, lang)
}

fn required_feature_in(table: &[u8], script: Option<Tag>, lang: Option<Tag>) -> Option<Tag> {
    let header = GsubHeader::new(table);
    let script_table = header.script_list().find(script)?;
    let lang_sys = script_table.lang_sys(lang)?;

    let required = lang_sys.required_feature_index();
    if required == NO_REQUIRED_FEATURE {
        return None;
    }
    let (tag, _) = header.feature_list().get(required)?;
    Some(tag)
}
