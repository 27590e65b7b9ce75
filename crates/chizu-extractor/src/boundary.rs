//! Boundary guard for suffix-based matching rules
//!
//! The `regex` crate has no look-around, so the `(?<![一-龯]) … (?![一-龯])`
//! constraint of the extraction rules is enforced as an explicit check of the
//! characters adjacent to a candidate match. A match touching an ideograph on
//! either side is the interior of a longer compound and must be discarded.

/// CJK ideograph range used by the extraction rules
const IDEOGRAPH_FIRST: char = '一';
const IDEOGRAPH_LAST: char = '龯';

/// Whether a character falls in the ideograph range
pub fn is_ideograph(c: char) -> bool {
    (IDEOGRAPH_FIRST..=IDEOGRAPH_LAST).contains(&c)
}

/// Whether the span `[start, end)` of `text` is free of adjacent ideographs
///
/// `start` and `end` are byte offsets on character boundaries, as produced
/// by regex matching.
pub fn respects_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !is_ideograph(c));

    let after_ok = text[end..].chars().next().map_or(true, |c| !is_ideograph(c));

    before_ok && after_ok
}
