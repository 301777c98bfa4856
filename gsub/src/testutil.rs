//! Builders assembling synthetic big-endian GSUB tables for tests.
//!
//! Every structure is produced bottom-up as raw bytes, with child tables
//! appended after their parent's fixed-size header so the offsets are plain
//! running sums.

use crate::read::Tag;

pub(crate) fn be_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_u16s(out: &mut Vec<u8>, words: &[u16]) {
    for &w in words {
        push_u16(out, w);
    }
}

fn push_tag(out: &mut Vec<u8>, tag: Tag) {
    out.extend_from_slice(&tag.0);
}

/// A tag-keyed record list (ScriptList / FeatureList shape): count, records
/// of (tag, offset), then the referenced tables.
fn tagged_list(entries: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, entries.len() as u16);
    let mut offset = 2 + entries.len() * 6;
    for (tag, table) in entries {
        push_tag(&mut out, *tag);
        push_u16(&mut out, offset as u16);
        offset += table.len();
    }
    for (_, table) in entries {
        out.extend_from_slice(table);
    }
    out
}

/// An offset-array header: the given leading words, then `children.len()`
/// offsets, then the children. Offsets are relative to the structure start.
fn offset_array(leading: &[u16], children: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, leading);
    let mut offset = leading.len() * 2 + children.len() * 2;
    for child in children {
        push_u16(&mut out, offset as u16);
        offset += child.len();
    }
    for child in children {
        out.extend_from_slice(child);
    }
    out
}

pub(crate) fn gsub(
    scripts: &[(Tag, Vec<u8>)],
    features: &[(Tag, Vec<u8>)],
    lookups: &[Vec<u8>],
) -> Vec<u8> {
    let script_list = tagged_list(scripts);
    let feature_list = tagged_list(features);
    let lookup_list = offset_array(&[lookups.len() as u16], lookups);

    let mut out = Vec::new();
    push_u16s(&mut out, &[1, 0]);
    let script_off = 10;
    let feature_off = script_off + script_list.len();
    let lookup_off = feature_off + feature_list.len();
    push_u16(&mut out, script_off as u16);
    push_u16(&mut out, feature_off as u16);
    push_u16(&mut out, lookup_off as u16);
    out.extend_from_slice(&script_list);
    out.extend_from_slice(&feature_list);
    out.extend_from_slice(&lookup_list);
    out
}

pub(crate) fn script_table(
    default_lang_sys: Option<Vec<u8>>,
    langs: &[(Tag, Vec<u8>)],
) -> Vec<u8> {
    let mut out = Vec::new();
    let header = 4 + langs.len() * 6;
    let default_len = default_lang_sys.as_ref().map_or(0, Vec::len);
    // Default langsys sits right after the records; explicit ones follow.
    push_u16(&mut out, if default_lang_sys.is_some() { header as u16 } else { 0 });
    push_u16(&mut out, langs.len() as u16);
    let mut offset = header + default_len;
    for (tag, table) in langs {
        push_tag(&mut out, *tag);
        push_u16(&mut out, offset as u16);
        offset += table.len();
    }
    if let Some(table) = default_lang_sys {
        out.extend_from_slice(&table);
    }
    for (_, table) in langs {
        out.extend_from_slice(table);
    }
    out
}

/// A script whose only langsys is the default one.
pub(crate) fn script_default_only(required: u16, feature_indices: &[u16]) -> Vec<u8> {
    script_table(Some(lang_sys(required, feature_indices)), &[])
}

pub(crate) fn lang_sys(required: u16, feature_indices: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[0, required, feature_indices.len() as u16]);
    push_u16s(&mut out, feature_indices);
    out
}

pub(crate) fn feature(lookup_indices: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[0, lookup_indices.len() as u16]);
    push_u16s(&mut out, lookup_indices);
    out
}

pub(crate) fn lookup(kind: u16, subtables: &[Vec<u8>]) -> Vec<u8> {
    offset_array(&[kind, 0, subtables.len() as u16], subtables)
}

pub(crate) fn coverage_glyphs(glyphs: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[1, glyphs.len() as u16]);
    push_u16s(&mut out, glyphs);
    out
}

pub(crate) fn coverage_ranges(ranges: &[(u16, u16)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[2, ranges.len() as u16]);
    let mut rank = 0;
    for &(start, end) in ranges {
        push_u16s(&mut out, &[start, end, rank]);
        rank += end - start + 1;
    }
    out
}

pub(crate) fn class_def1(start: u16, classes: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[1, start, classes.len() as u16]);
    push_u16s(&mut out, classes);
    out
}

pub(crate) fn class_def2(ranges: &[(u16, u16, u16)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[2, ranges.len() as u16]);
    for &(start, end, class) in ranges {
        push_u16s(&mut out, &[start, end, class]);
    }
    out
}

pub(crate) fn single_subst_delta(coverage: &[u8], delta: u16) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[1, 6, delta]);
    out.extend_from_slice(coverage);
    out
}

pub(crate) fn single_subst_map(coverage: &[u8], substitutes: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    let coverage_off = 6 + substitutes.len() * 2;
    push_u16s(&mut out, &[2, coverage_off as u16, substitutes.len() as u16]);
    push_u16s(&mut out, substitutes);
    out.extend_from_slice(coverage);
    out
}

pub(crate) fn multiple_subst(coverage: &[u8], sequences: &[&[u16]]) -> Vec<u8> {
    let tables: Vec<Vec<u8>> = sequences
        .iter()
        .map(|seq| {
            let mut t = Vec::new();
            push_u16(&mut t, seq.len() as u16);
            push_u16s(&mut t, seq);
            t
        })
        .collect();
    let body: usize = tables.iter().map(Vec::len).sum();
    let coverage_off = 6 + sequences.len() * 2 + body;

    let mut out = offset_array(&[1, coverage_off as u16, sequences.len() as u16], &tables);
    out.extend_from_slice(coverage);
    out
}

pub(crate) fn ligature_subst(coverage: &[u8], sets: &[Vec<(u16, Vec<u16>)>]) -> Vec<u8> {
    let set_tables: Vec<Vec<u8>> = sets
        .iter()
        .map(|ligatures| {
            let tables: Vec<Vec<u8>> = ligatures
                .iter()
                .map(|(lig_glyph, components)| {
                    let mut t = Vec::new();
                    push_u16s(&mut t, &[*lig_glyph, components.len() as u16 + 1]);
                    push_u16s(&mut t, components);
                    t
                })
                .collect();
            offset_array(&[ligatures.len() as u16], &tables)
        })
        .collect();
    let body: usize = set_tables.iter().map(Vec::len).sum();
    let coverage_off = 6 + sets.len() * 2 + body;

    let mut out = offset_array(&[1, coverage_off as u16, sets.len() as u16], &set_tables);
    out.extend_from_slice(coverage);
    out
}

/// A sequence rule: the input tail (classes or glyph ids, excluding the
/// initial glyph) plus `(sequence_index, lookup_index)` records.
pub(crate) fn seq_rule(input_tail: &[u16], records: &[(u16, u16)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[input_tail.len() as u16 + 1, records.len() as u16]);
    push_u16s(&mut out, input_tail);
    for &(sequence_index, lookup_index) in records {
        push_u16s(&mut out, &[sequence_index, lookup_index]);
    }
    out
}

pub(crate) fn context1(coverage: &[u8], rule_sets: &[Vec<Vec<u8>>]) -> Vec<u8> {
    let set_tables: Vec<Vec<u8>> = rule_sets
        .iter()
        .map(|rules| offset_array(&[rules.len() as u16], rules))
        .collect();
    let body: usize = set_tables.iter().map(Vec::len).sum();
    let coverage_off = 6 + rule_sets.len() * 2 + body;

    let mut out = offset_array(&[1, coverage_off as u16, rule_sets.len() as u16], &set_tables);
    out.extend_from_slice(coverage);
    out
}

pub(crate) fn context2(
    coverage: &[u8],
    class_def: &[u8],
    rule_sets: &[Option<Vec<Vec<u8>>>],
) -> Vec<u8> {
    let set_tables: Vec<Vec<u8>> = rule_sets
        .iter()
        .map(|set| match set {
            Some(rules) => offset_array(&[rules.len() as u16], rules),
            None => Vec::new(),
        })
        .collect();
    let header = 8 + rule_sets.len() * 2;
    let body: usize = set_tables.iter().map(Vec::len).sum();
    let class_def_off = header + body;
    let coverage_off = class_def_off + class_def.len();

    let mut out = Vec::new();
    push_u16s(
        &mut out,
        &[
            2,
            coverage_off as u16,
            class_def_off as u16,
            rule_sets.len() as u16,
        ],
    );
    let mut offset = header;
    for table in &set_tables {
        if table.is_empty() {
            push_u16(&mut out, 0);
        } else {
            push_u16(&mut out, offset as u16);
        }
        offset += table.len();
    }
    for table in &set_tables {
        out.extend_from_slice(table);
    }
    out.extend_from_slice(class_def);
    out.extend_from_slice(coverage);
    out
}

pub(crate) fn context3(input_coverages: &[Vec<u8>], records: &[(u16, u16)]) -> Vec<u8> {
    let header = 6 + input_coverages.len() * 2 + records.len() * 4;
    let mut out = Vec::new();
    push_u16s(
        &mut out,
        &[3, input_coverages.len() as u16, records.len() as u16],
    );
    let mut offset = header;
    for coverage in input_coverages {
        push_u16(&mut out, offset as u16);
        offset += coverage.len();
    }
    for &(sequence_index, lookup_index) in records {
        push_u16s(&mut out, &[sequence_index, lookup_index]);
    }
    for coverage in input_coverages {
        out.extend_from_slice(coverage);
    }
    out
}

pub(crate) fn chained3(
    backtrack: &[Vec<u8>],
    input: &[Vec<u8>],
    lookahead: &[Vec<u8>],
    records: &[(u16, u16)],
) -> Vec<u8> {
    let coverages: Vec<&Vec<u8>> = backtrack.iter().chain(input).chain(lookahead).collect();
    let header =
        2 + (3 + coverages.len()) * 2 + 2 + records.len() * 4;

    let mut out = Vec::new();
    push_u16(&mut out, 3);
    let mut offset = header;
    let mut offsets = Vec::new();
    for coverage in &coverages {
        offsets.push(offset as u16);
        offset += coverage.len();
    }
    let mut next = offsets.iter();
    push_u16(&mut out, backtrack.len() as u16);
    for _ in backtrack {
        push_u16(&mut out, *next.next().unwrap());
    }
    push_u16(&mut out, input.len() as u16);
    for _ in input {
        push_u16(&mut out, *next.next().unwrap());
    }
    push_u16(&mut out, lookahead.len() as u16);
    for _ in lookahead {
        push_u16(&mut out, *next.next().unwrap());
    }
    push_u16(&mut out, records.len() as u16);
    for &(sequence_index, lookup_index) in records {
        push_u16s(&mut out, &[sequence_index, lookup_index]);
    }
    for coverage in &coverages {
        out.extend_from_slice(coverage);
    }
    out
}

/// A chained sequence rule: backtrack and lookahead stored nearest-first,
/// input excluding the initial glyph.
pub(crate) fn chained_rule(
    backtrack: &[u16],
    input_tail: &[u16],
    lookahead: &[u16],
    records: &[(u16, u16)],
) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, backtrack.len() as u16);
    push_u16s(&mut out, backtrack);
    push_u16(&mut out, input_tail.len() as u16 + 1);
    push_u16s(&mut out, input_tail);
    push_u16(&mut out, lookahead.len() as u16);
    push_u16s(&mut out, lookahead);
    push_u16(&mut out, records.len() as u16);
    for &(sequence_index, lookup_index) in records {
        push_u16s(&mut out, &[sequence_index, lookup_index]);
    }
    out
}

pub(crate) fn chained1(coverage: &[u8], rule_sets: &[Vec<Vec<u8>>]) -> Vec<u8> {
    let set_tables: Vec<Vec<u8>> = rule_sets
        .iter()
        .map(|rules| offset_array(&[rules.len() as u16], rules))
        .collect();
    let body: usize = set_tables.iter().map(Vec::len).sum();
    let coverage_off = 6 + rule_sets.len() * 2 + body;

    let mut out = offset_array(&[1, coverage_off as u16, rule_sets.len() as u16], &set_tables);
    out.extend_from_slice(coverage);
    out
}

pub(crate) fn chained2(
    coverage: &[u8],
    backtrack_classes: &[u8],
    input_classes: &[u8],
    lookahead_classes: &[u8],
    rule_sets: &[Option<Vec<Vec<u8>>>],
) -> Vec<u8> {
    let set_tables: Vec<Vec<u8>> = rule_sets
        .iter()
        .map(|set| match set {
            Some(rules) => offset_array(&[rules.len() as u16], rules),
            None => Vec::new(),
        })
        .collect();
    let header = 12 + rule_sets.len() * 2;
    let body: usize = set_tables.iter().map(Vec::len).sum();
    let backtrack_off = header + body;
    let input_off = backtrack_off + backtrack_classes.len();
    let lookahead_off = input_off + input_classes.len();
    let coverage_off = lookahead_off + lookahead_classes.len();

    let mut out = Vec::new();
    push_u16s(
        &mut out,
        &[
            2,
            coverage_off as u16,
            backtrack_off as u16,
            input_off as u16,
            lookahead_off as u16,
            rule_sets.len() as u16,
        ],
    );
    let mut offset = header;
    for table in &set_tables {
        if table.is_empty() {
            push_u16(&mut out, 0);
        } else {
            push_u16(&mut out, offset as u16);
        }
        offset += table.len();
    }
    for table in &set_tables {
        out.extend_from_slice(table);
    }
    out.extend_from_slice(backtrack_classes);
    out.extend_from_slice(input_classes);
    out.extend_from_slice(lookahead_classes);
    out.extend_from_slice(coverage);
    out
}

pub(crate) fn reverse_chain(
    coverage: &[u8],
    backtrack: &[Vec<u8>],
    lookahead: &[Vec<u8>],
    substitutes: &[u16],
) -> Vec<u8> {
    let header = 2 + 2 + 2 + backtrack.len() * 2 + 2 + lookahead.len() * 2 + 2
        + substitutes.len() * 2;
    let mut offset = header;
    let mut backtrack_offsets = Vec::new();
    for table in backtrack {
        backtrack_offsets.push(offset as u16);
        offset += table.len();
    }
    let mut lookahead_offsets = Vec::new();
    for table in lookahead {
        lookahead_offsets.push(offset as u16);
        offset += table.len();
    }
    let coverage_off = offset;

    let mut out = Vec::new();
    push_u16s(&mut out, &[1, coverage_off as u16, backtrack.len() as u16]);
    push_u16s(&mut out, &backtrack_offsets);
    push_u16(&mut out, lookahead.len() as u16);
    push_u16s(&mut out, &lookahead_offsets);
    push_u16(&mut out, substitutes.len() as u16);
    push_u16s(&mut out, substitutes);
    for table in backtrack {
        out.extend_from_slice(table);
    }
    for table in lookahead {
        out.extend_from_slice(table);
    }
    out.extend_from_slice(coverage);
    out
}

pub(crate) fn extension(kind: u16, inner: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16s(&mut out, &[1, kind]);
    out.extend_from_slice(&8u32.to_be_bytes());
    out.extend_from_slice(inner);
    out
}

/// A whole table with the default script, one feature and the given lookups,
/// the shape most interpreter tests want.
pub(crate) fn gsub_with_lookups(feature_tag: Tag, lookups: &[Vec<u8>]) -> Vec<u8> {
    let indices: Vec<u16> = (0..lookups.len() as u16).collect();
    gsub(
        &[(Tag::DFLT, script_default_only(0xFFFF, &[0]))],
        &[(feature_tag, feature(&indices))],
        lookups,
    )
}
