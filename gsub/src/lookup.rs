//! The substitution lookup interpreter.
//!
//! A lookup sweeps the glyph sequence one position at a time and tries each
//! of its subtables at the current position; the first subtable that applies
//! wins. Applying a subtable returns the next sweep position, so a
//! substitution that grows or shrinks the sequence still advances by exactly
//! one position in the resulting sequence.

use crate::glyphs::GlyphBuffer;
use crate::read::View;
use crate::tables::{ClassDef, Coverage, GsubHeader, LookupList, LookupTable};
use log::warn;

/// GSUB lookup types.
mod kind {
    pub const SINGLE: u16 = 1;
    pub const MULTIPLE: u16 = 2;
    pub const ALTERNATE: u16 = 3;
    pub const LIGATURE: u16 = 4;
    pub const CONTEXT: u16 = 5;
    pub const CHAINED: u16 = 6;
    pub const EXTENSION: u16 = 7;
    pub const REVERSE_CHAIN: u16 = 8;
}

pub(crate) use kind::ALTERNATE;

/// Sequence-context rules may invoke other lookups, which may themselves be
/// contextual. The font's lookup graph is not guaranteed acyclic, so nested
/// expansion stops at this depth.
const NESTING_LIMIT: usize = 16;

pub(crate) struct Interpreter<'a> {
    lookups: LookupList<'a>,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(header: &GsubHeader<'a>) -> Self {
        Interpreter {
            lookups: header.lookup_list(),
        }
    }

    /// Applies one lookup over the whole sequence.
    pub(crate) fn apply_lookup(&self, lookup: &LookupTable<'a>, glyphs: &mut GlyphBuffer) {
        if lookup.kind() == kind::REVERSE_CHAIN {
            // Reverse chaining substitutions sweep last-to-first and never
            // change the sequence length.
            let mut n = 0;
            while n < glyphs.len() {
                let pos = glyphs.len() - 1 - n;
                self.apply_at(lookup, glyphs, pos, 0);
                n += 1;
            }
        } else {
            let mut pos = 0;
            while pos < glyphs.len() {
                pos = self.apply_at(lookup, glyphs, pos, 0);
            }
        }
    }

    /// Tries the lookup's subtables in order at `pos` and returns the next
    /// sweep position. When nothing applies the sweep advances by one.
    fn apply_at(
        &self,
        lookup: &LookupTable<'a>,
        glyphs: &mut GlyphBuffer,
        pos: usize,
        depth: usize,
    ) -> usize {
        let kind = lookup.kind();
        for i in 0..lookup.subtable_count() {
            if let Some(next) = self.apply_subtable(kind, lookup.subtable(i), glyphs, pos, depth) {
                return next;
            }
        }
        pos + 1
    }

    /// Applies one subtable at `pos`. `Some(next)` when the subtable applied.
    fn apply_subtable(
        &self,
        kind: u16,
        sub: View<'a>,
        glyphs: &mut GlyphBuffer,
        pos: usize,
        depth: usize,
    ) -> Option<usize> {
        match kind {
            kind::SINGLE => apply_single(sub, glyphs, pos),
            kind::MULTIPLE => apply_multiple(sub, glyphs, pos),
            kind::ALTERNATE => {
                // Alternate sets exist for user selection among variants,
                // which has no meaning in automatic shaping.
                warn!("alternate substitution lookups are not supported");
                None
            }
            kind::LIGATURE => apply_ligature(sub, glyphs, pos),
            kind::CONTEXT => self.apply_context(sub, glyphs, pos, depth),
            kind::CHAINED => self.apply_chained(sub, glyphs, pos, depth),
            kind::EXTENSION => {
                let ext_kind = sub.u16_at(2);
                if ext_kind == kind::EXTENSION {
                    warn!("extension substitution may not nest");
                    return None;
                }
                let ext = sub.slice_at(sub.u32_at(4) as usize);
                self.apply_subtable(ext_kind, ext, glyphs, pos, depth)
            }
            kind::REVERSE_CHAIN => apply_reverse_chain(sub, glyphs, pos),
            other => {
                warn!("unknown lookup type {}", other);
                None
            }
        }
    }

    /// Sequence Context, formats 1 (glyph rules), 2 (class rules) and
    /// 3 (coverage sequence).
    fn apply_context(
        &self,
        sub: View<'a>,
        glyphs: &mut GlyphBuffer,
        pos: usize,
        depth: usize,
    ) -> Option<usize> {
        match sub.u16_at(0) {
            1 => {
                let coverage = Coverage::new(sub.slice_at(sub.u16_at(2) as usize));
                let rank = coverage.rank(glyphs[pos])?;
                if rank >= u32::from(sub.u16_at(4)) {
                    return None;
                }
                let rule_set_offset = sub.u16_at(6 + rank as usize * 2);
                if rule_set_offset == 0 {
                    return None;
                }
                let rule_set = sub.slice_at(rule_set_offset as usize);

                for i in 0..rule_set.u16_at(0) as usize {
                    let rule = rule_set.slice_at(rule_set.u16_at(2 + i * 2) as usize);
                    let glyph_count = rule.u16_at(0) as usize;
                    if glyph_count == 0 || pos + glyph_count > glyphs.len() {
                        continue;
                    }
                    // The stored input sequence excludes the initial glyph.
                    if !match_sequence(glyphs, pos as isize + 1, rule, 4, glyph_count - 1, 1) {
                        continue;
                    }
                    let records_at = 4 + (glyph_count - 1) * 2;
                    return self.apply_nested(
                        glyphs,
                        pos,
                        glyph_count,
                        rule,
                        records_at,
                        rule.u16_at(2),
                        depth,
                    );
                }
                None
            }
            2 => {
                let coverage = Coverage::new(sub.slice_at(sub.u16_at(2) as usize));
                coverage.rank(glyphs[pos])?;
                let classes = ClassDef::new(sub.slice_at(sub.u16_at(4) as usize));

                let class = classes.class(glyphs[pos]);
                if class >= sub.u16_at(6) {
                    return None;
                }
                let rule_set_offset = sub.u16_at(8 + class as usize * 2);
                if rule_set_offset == 0 {
                    return None;
                }
                let rule_set = sub.slice_at(rule_set_offset as usize);

                for i in 0..rule_set.u16_at(0) as usize {
                    let rule = rule_set.slice_at(rule_set.u16_at(2 + i * 2) as usize);
                    let glyph_count = rule.u16_at(0) as usize;
                    if glyph_count == 0 || pos + glyph_count > glyphs.len() {
                        continue;
                    }
                    if !match_classes(glyphs, pos as isize + 1, &classes, rule, 4, glyph_count - 1, 1)
                    {
                        continue;
                    }
                    let records_at = 4 + (glyph_count - 1) * 2;
                    return self.apply_nested(
                        glyphs,
                        pos,
                        glyph_count,
                        rule,
                        records_at,
                        rule.u16_at(2),
                        depth,
                    );
                }
                None
            }
            3 => {
                let glyph_count = sub.u16_at(2) as usize;
                if glyph_count == 0 || pos + glyph_count > glyphs.len() {
                    return None;
                }
                if !match_coverages(sub, glyphs, pos as isize, 6, glyph_count, 1) {
                    return None;
                }
                let records_at = 6 + glyph_count * 2;
                self.apply_nested(glyphs, pos, glyph_count, sub, records_at, sub.u16_at(4), depth)
            }
            format => {
                warn!("unknown sequence context format {}", format);
                None
            }
        }
    }

    /// Chained Sequence Context, formats 1 to 3. Like the plain contexts but
    /// additionally matching a backtrack sequence (scanned backwards from
    /// `pos - 1`) and a lookahead sequence (forwards from the end of the
    /// input). Both are stored nearest-first.
    fn apply_chained(
        &self,
        sub: View<'a>,
        glyphs: &mut GlyphBuffer,
        pos: usize,
        depth: usize,
    ) -> Option<usize> {
        match sub.u16_at(0) {
            1 => {
                let coverage = Coverage::new(sub.slice_at(sub.u16_at(2) as usize));
                let rank = coverage.rank(glyphs[pos])?;
                if rank >= u32::from(sub.u16_at(4)) {
                    return None;
                }
                let rule_set_offset = sub.u16_at(6 + rank as usize * 2);
                if rule_set_offset == 0 {
                    return None;
                }
                let rule_set = sub.slice_at(rule_set_offset as usize);

                for i in 0..rule_set.u16_at(0) as usize {
                    let rule = rule_set.slice_at(rule_set.u16_at(2 + i * 2) as usize);

                    let backtrack_count = rule.u16_at(0) as usize;
                    let backtrack_at = 2;
                    let mut at = backtrack_at + backtrack_count * 2;
                    let input_count = rule.u16_at(at) as usize;
                    let input_at = at + 2;
                    at = input_at + input_count.saturating_sub(1) * 2;
                    let lookahead_count = rule.u16_at(at) as usize;
                    let lookahead_at = at + 2;
                    at = lookahead_at + lookahead_count * 2;
                    let record_count = rule.u16_at(at);
                    let records_at = at + 2;

                    if input_count == 0
                        || pos + input_count + lookahead_count > glyphs.len()
                        || backtrack_count > pos
                    {
                        continue;
                    }
                    if !match_sequence(glyphs, pos as isize + 1, rule, input_at, input_count - 1, 1)
                    {
                        continue;
                    }
                    if !match_sequence(
                        glyphs,
                        pos as isize - 1,
                        rule,
                        backtrack_at,
                        backtrack_count,
                        -1,
                    ) {
                        continue;
                    }
                    if !match_sequence(
                        glyphs,
                        (pos + input_count) as isize,
                        rule,
                        lookahead_at,
                        lookahead_count,
                        1,
                    ) {
                        continue;
                    }

                    return self.apply_nested(
                        glyphs,
                        pos,
                        input_count,
                        rule,
                        records_at,
                        record_count,
                        depth,
                    );
                }
                None
            }
            2 => {
                let coverage = Coverage::new(sub.slice_at(sub.u16_at(2) as usize));
                coverage.rank(glyphs[pos])?;
                let backtrack_classes = ClassDef::new(sub.slice_at(sub.u16_at(4) as usize));
                let input_classes = ClassDef::new(sub.slice_at(sub.u16_at(6) as usize));
                let lookahead_classes = ClassDef::new(sub.slice_at(sub.u16_at(8) as usize));

                let class = input_classes.class(glyphs[pos]);
                if class >= sub.u16_at(10) {
                    return None;
                }
                let rule_set_offset = sub.u16_at(12 + class as usize * 2);
                if rule_set_offset == 0 {
                    return None;
                }
                let rule_set = sub.slice_at(rule_set_offset as usize);

                for i in 0..rule_set.u16_at(0) as usize {
                    let rule = rule_set.slice_at(rule_set.u16_at(2 + i * 2) as usize);

                    let backtrack_count = rule.u16_at(0) as usize;
                    let backtrack_at = 2;
                    let mut at = backtrack_at + backtrack_count * 2;
                    let input_count = rule.u16_at(at) as usize;
                    let input_at = at + 2;
                    at = input_at + input_count.saturating_sub(1) * 2;
                    let lookahead_count = rule.u16_at(at) as usize;
                    let lookahead_at = at + 2;
                    at = lookahead_at + lookahead_count * 2;
                    let record_count = rule.u16_at(at);
                    let records_at = at + 2;

                    if input_count == 0
                        || pos + input_count + lookahead_count > glyphs.len()
                        || backtrack_count > pos
                    {
                        continue;
                    }
                    if !match_classes(
                        glyphs,
                        pos as isize + 1,
                        &input_classes,
                        rule,
                        input_at,
                        input_count - 1,
                        1,
                    ) {
                        continue;
                    }
                    if !match_classes(
                        glyphs,
                        pos as isize - 1,
                        &backtrack_classes,
                        rule,
                        backtrack_at,
                        backtrack_count,
                        -1,
                    ) {
                        continue;
                    }
                    if !match_classes(
                        glyphs,
                        (pos + input_count) as isize,
                        &lookahead_classes,
                        rule,
                        lookahead_at,
                        lookahead_count,
                        1,
                    ) {
                        continue;
                    }

                    return self.apply_nested(
                        glyphs,
                        pos,
                        input_count,
                        rule,
                        records_at,
                        record_count,
                        depth,
                    );
                }
                None
            }
            3 => {
                let backtrack_count = sub.u16_at(2) as usize;
                let backtrack_at = 4;
                let mut at = backtrack_at + backtrack_count * 2;
                let input_count = sub.u16_at(at) as usize;
                let input_at = at + 2;
                at = input_at + input_count * 2;
                let lookahead_count = sub.u16_at(at) as usize;
                let lookahead_at = at + 2;
                at = lookahead_at + lookahead_count * 2;
                let record_count = sub.u16_at(at);
                let records_at = at + 2;

                if pos + input_count + lookahead_count > glyphs.len() || backtrack_count > pos {
                    return None;
                }
                if !match_coverages(sub, glyphs, pos as isize, input_at, input_count, 1) {
                    return None;
                }
                if !match_coverages(sub, glyphs, pos as isize - 1, backtrack_at, backtrack_count, -1)
                {
                    return None;
                }
                if !match_coverages(
                    sub,
                    glyphs,
                    (pos + input_count) as isize,
                    lookahead_at,
                    lookahead_count,
                    1,
                ) {
                    return None;
                }

                if input_count == 0 {
                    return Some(pos + 1);
                }
                self.apply_nested(glyphs, pos, input_count, sub, records_at, record_count, depth)
            }
            format => {
                warn!("unknown chained sequence context format {}", format);
                None
            }
        }
    }

    /// Executes a matched rule's sequence lookup records.
    ///
    /// The matched input window is copied into a scratch sequence, each
    /// record's lookup is applied there at the record's relative position,
    /// and the (possibly resized) result is spliced back. Returns the sweep
    /// position after the spliced window.
    fn apply_nested(
        &self,
        glyphs: &mut GlyphBuffer,
        pos: usize,
        glyph_count: usize,
        rule: View<'a>,
        records_at: usize,
        record_count: u16,
        depth: usize,
    ) -> Option<usize> {
        if depth >= NESTING_LIMIT {
            warn!("lookup nesting limit reached, dropping contextual substitution");
            return None;
        }

        let mut window = GlyphBuffer::from_glyphs(&glyphs.as_slice()[pos..pos + glyph_count]);
        for i in 0..record_count as usize {
            let sequence_index = rule.u16_at(records_at + i * 4) as usize;
            let lookup_index = rule.u16_at(records_at + i * 4 + 2);
            let Some(lookup) = self.lookups.lookup(lookup_index) else {
                warn!("sequence rule names missing lookup {}", lookup_index);
                continue;
            };
            // Earlier records may have shrunk the window below this index.
            if sequence_index >= window.len() {
                continue;
            }
            self.apply_at(&lookup, &mut window, sequence_index, depth + 1);
        }

        let old_len = glyphs.len();
        glyphs.copy_within(pos + glyph_count..old_len, pos + window.len());
        glyphs.set_range(pos, window.as_slice());
        if window.len() < glyph_count {
            glyphs.shrink(glyph_count - window.len());
        }
        Some(pos + window.len())
    }
}

/// Single substitution: one glyph replaced by one glyph.
fn apply_single(sub: View<'_>, glyphs: &mut GlyphBuffer, pos: usize) -> Option<usize> {
    let coverage = Coverage::new(sub.slice_at(sub.u16_at(2) as usize));
    match sub.u16_at(0) {
        1 => {
            coverage.rank(glyphs[pos])?;
            let delta = sub.u16_at(4);
            let glyph = glyphs[pos].wrapping_add(delta);
            glyphs.set(pos, glyph);
            Some(pos + 1)
        }
        2 => {
            let rank = coverage.rank(glyphs[pos])?;
            glyphs.set(pos, sub.u16_at(6 + rank as usize * 2));
            Some(pos + 1)
        }
        format => {
            warn!("unknown single substitution format {}", format);
            None
        }
    }
}

/// Multiple substitution: one glyph replaced by a sequence.
fn apply_multiple(sub: View<'_>, glyphs: &mut GlyphBuffer, pos: usize) -> Option<usize> {
    let coverage = Coverage::new(sub.slice_at(sub.u16_at(2) as usize));
    let rank = coverage.rank(glyphs[pos])?;
    if rank >= u32::from(sub.u16_at(4)) {
        return None;
    }
    let sequence = sub.slice_at(sub.u16_at(6 + rank as usize * 2) as usize);
    let count = sequence.u16_at(0) as usize;
    if count == 0 {
        return None;
    }

    // Shift the tail right to make room, then write the substitutes.
    let old_len = glyphs.len();
    glyphs.copy_within(pos + 1..old_len, pos + count);
    for j in 0..count {
        glyphs.set(pos + j, sequence.u16_at(2 + j * 2));
    }
    Some(pos + count)
}

/// Ligature substitution: several glyphs replaced by one.
fn apply_ligature(sub: View<'_>, glyphs: &mut GlyphBuffer, pos: usize) -> Option<usize> {
    let coverage = Coverage::new(sub.slice_at(sub.u16_at(2) as usize));
    let rank = coverage.rank(glyphs[pos])?;
    if rank >= u32::from(sub.u16_at(4)) {
        return None;
    }
    let set = sub.slice_at(sub.u16_at(6 + rank as usize * 2) as usize);

    // The first ligature whose component tail matches wins.
    for i in 0..set.u16_at(0) as usize {
        let ligature = set.slice_at(set.u16_at(2 + i * 2) as usize);
        let component_count = ligature.u16_at(2) as usize;
        if component_count == 0 || pos + component_count > glyphs.len() {
            continue;
        }
        let tail_matches =
            (0..component_count - 1).all(|j| glyphs[pos + 1 + j] == ligature.u16_at(4 + j * 2));
        if !tail_matches {
            continue;
        }

        glyphs.set(pos, ligature.u16_at(0));
        let old_len = glyphs.len();
        glyphs.copy_within(pos + component_count..old_len, pos + 1);
        glyphs.shrink(component_count - 1);
        return Some(pos + 1);
    }
    None
}

/// Reverse chaining context single substitution. Matching works like a
/// chained format 3, but the substitution maps through the coverage rank
/// instead of running nested lookups.
fn apply_reverse_chain(sub: View<'_>, glyphs: &mut GlyphBuffer, pos: usize) -> Option<usize> {
    let format = sub.u16_at(0);
    if format != 1 {
        warn!("unknown reverse chaining substitution format {}", format);
        return None;
    }
    let coverage = Coverage::new(sub.slice_at(sub.u16_at(2) as usize));
    let rank = coverage.rank(glyphs[pos])?;

    let backtrack_count = sub.u16_at(4) as usize;
    let backtrack_at = 6;
    let mut at = backtrack_at + backtrack_count * 2;
    let lookahead_count = sub.u16_at(at) as usize;
    let lookahead_at = at + 2;
    at = lookahead_at + lookahead_count * 2;
    let substitute_count = sub.u16_at(at);
    let substitutes_at = at + 2;

    if pos + lookahead_count >= glyphs.len() || backtrack_count > pos {
        return None;
    }
    if !match_coverages(sub, glyphs, pos as isize - 1, backtrack_at, backtrack_count, -1) {
        return None;
    }
    if !match_coverages(sub, glyphs, pos as isize + 1, lookahead_at, lookahead_count, 1) {
        return None;
    }
    if rank >= u32::from(substitute_count) {
        warn!("reverse chaining substitution is shorter than its coverage");
        return None;
    }

    glyphs.set(pos, sub.u16_at(substitutes_at + rank as usize * 2));
    Some(pos + 1)
}

/// Compares `count` glyphs starting at `start` (stepping by `step`) against
/// the glyph ids stored at `at` in `rule`. Callers have already bounds
/// checked the scan range; `start` may be -1 only when `count` is 0.
fn match_sequence(
    glyphs: &GlyphBuffer,
    start: isize,
    rule: View<'_>,
    at: usize,
    count: usize,
    step: isize,
) -> bool {
    for i in 0..count {
        let p = (start + i as isize * step) as usize;
        if glyphs[p] != rule.u16_at(at + i * 2) {
            return false;
        }
    }
    true
}

/// Like [`match_sequence`] but comparing glyph classes.
fn match_classes(
    glyphs: &GlyphBuffer,
    start: isize,
    classes: &ClassDef<'_>,
    rule: View<'_>,
    at: usize,
    count: usize,
    step: isize,
) -> bool {
    for i in 0..count {
        let p = (start + i as isize * step) as usize;
        if classes.class(glyphs[p]) != rule.u16_at(at + i * 2) {
            return false;
        }
    }
    true
}

/// Like [`match_sequence`] but each position has its own coverage table,
/// referenced by an offset array at `at` relative to `base`.
fn match_coverages(
    base: View<'_>,
    glyphs: &GlyphBuffer,
    start: isize,
    at: usize,
    count: usize,
    step: isize,
) -> bool {
    for i in 0..count {
        let p = (start + i as isize * step) as usize;
        let coverage = Coverage::new(base.slice_at(base.u16_at(at + i * 2) as usize));
        if coverage.rank(glyphs[p]).is_none() {
            return false;
        }
    }
    true
}
