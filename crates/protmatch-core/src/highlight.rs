//! Splits a text into plain and highlighted fragments, optionally reflowing
//! it to a fixed width first.
//!
//! Offsets are byte offsets into the unwrapped text. Wrapping inserts a `\n`
//! after every `wrap` bytes, so an offset `o` moves right by `o / wrap`.

use crate::error::HighlightError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Plain,
    Highlighted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
}

impl Fragment {
    pub fn plain(text: &str) -> Self {
        Self {
            kind: FragmentKind::Plain,
            text: text.to_string(),
        }
    }

    pub fn highlighted(text: &str) -> Self {
        Self {
            kind: FragmentKind::Highlighted,
            text: text.to_string(),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.kind == FragmentKind::Highlighted
    }
}

/// Insert a line break after every `width` bytes. A width of 0 leaves the
/// text alone. No break is added after the final chunk.
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + text.len() / width);
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + width).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        if start > 0 {
            out.push('\n');
        }
        out.push_str(&text[start..end]);
        start = end;
    }
    out
}

/// Map an unwrapped offset to its position in the wrapped text.
pub fn remap_offset(offset: usize, width: usize) -> usize {
    if width == 0 {
        offset
    } else {
        offset + offset / width
    }
}

/// Split `text` into fragments, highlighting `ranges`.
///
/// Ranges may arrive in any order; they are sorted by start. Overlapping
/// ranges are rejected. An empty range still yields an empty highlighted
/// fragment, so highlighted fragments line up 1:1 with the input ranges.
pub fn highlight(
    text: &str,
    ranges: &[(usize, usize)],
    wrap: usize,
) -> Result<Vec<Fragment>, HighlightError> {
    let unwrapped_len = text.len();
    let text = wrap_text(text, wrap);
    let len = text.len();

    let mut remapped = Vec::with_capacity(ranges.len());
    for &(start, end) in ranges {
        if end < start {
            return Err(HighlightError::Inverted { start, end });
        }
        if end > unwrapped_len {
            return Err(HighlightError::OutOfBounds {
                end,
                len: unwrapped_len,
            });
        }
        // An offset equal to the text length on a wrap boundary counts a
        // break that was never inserted; clamp it back onto the text.
        let start = remap_offset(start, wrap).min(len);
        let end = remap_offset(end, wrap).min(len);
        remapped.push((start, end));
    }
    remapped.sort_by_key(|&(start, _)| start);

    if remapped.is_empty() {
        return Ok(vec![Fragment::plain(&text)]);
    }

    let mut fragments = Vec::with_capacity(remapped.len() * 2 + 1);
    let mut last = 0;
    for (start, end) in remapped {
        if start < last {
            return Err(HighlightError::Overlap {
                previous_end: last,
                start,
            });
        }
        let before = slice(&text, last, start)?;
        if !before.is_empty() {
            fragments.push(Fragment::plain(before));
        }
        fragments.push(Fragment::highlighted(slice(&text, start, end)?));
        last = end;
    }
    let rest = slice(&text, last, len)?;
    if !rest.is_empty() {
        fragments.push(Fragment::plain(rest));
    }
    Ok(fragments)
}

fn slice(text: &str, start: usize, end: usize) -> Result<&str, HighlightError> {
    text.get(start..end).ok_or(HighlightError::Misaligned {
        offset: if text.is_char_boundary(start) { end } else { start },
    })
}

/// Concatenated text of all fragments.
pub fn join(fragments: &[Fragment]) -> String {
    fragments.iter().map(|f| f.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(fragments: &[Fragment]) -> Vec<(bool, &str)> {
        fragments
            .iter()
            .map(|f| (f.is_highlighted(), f.text.as_str()))
            .collect()
    }

    #[test]
    fn wrap_inserts_breaks_between_chunks() {
        assert_eq!(wrap_text("ABCDEFGH", 3), "ABC\nDEF\nGH");
        assert_eq!(wrap_text("ABCDEF", 3), "ABC\nDEF");
        assert_eq!(wrap_text("ABC", 0), "ABC");
        assert_eq!(wrap_text("", 4), "");
    }

    #[test]
    fn remap_counts_breaks_before_offset() {
        assert_eq!(remap_offset(65, 60), 66);
        assert_eq!(remap_offset(59, 60), 59);
        assert_eq!(remap_offset(120, 60), 122);
        assert_eq!(remap_offset(7, 0), 7);
    }

    #[test]
    fn no_ranges_gives_single_plain_fragment() {
        let out = highlight("ABCDEFGH", &[], 3).unwrap();
        assert_eq!(kinds(&out), vec![(false, "ABC\nDEF\nGH")]);

        let empty = highlight("", &[], 0).unwrap();
        assert_eq!(kinds(&empty), vec![(false, "")]);
    }

    #[test]
    fn splits_unwrapped_text_at_range_boundaries() {
        let out = highlight("MAAKAAL", &[(4, 6), (1, 3)], 0).unwrap();
        assert_eq!(
            kinds(&out),
            vec![
                (false, "M"),
                (true, "AA"),
                (false, "K"),
                (true, "AA"),
                (false, "L"),
            ]
        );
        assert_eq!(join(&out), "MAAKAAL");
    }

    #[test]
    fn ranges_are_remapped_into_wrapped_coordinates() {
        // ABCD\nEFGH\nIJ
        let out = highlight("ABCDEFGHIJ", &[(3, 6)], 4).unwrap();
        assert_eq!(
            kinds(&out),
            vec![(false, "ABC"), (true, "D\nEF"), (false, "GH\nIJ")]
        );
        assert_eq!(join(&out), wrap_text("ABCDEFGHIJ", 4));
    }

    #[test]
    fn match_after_first_break_shifts_by_one() {
        let text = "A".repeat(70);
        let out = highlight(&text, &[(65, 67)], 60).unwrap();
        let highlighted: Vec<_> = out.iter().filter(|f| f.is_highlighted()).collect();
        assert_eq!(highlighted.len(), 1);
        let prefix: usize = out
            .iter()
            .take_while(|f| !f.is_highlighted())
            .map(|f| f.text.len())
            .sum();
        assert_eq!(prefix, 66);
    }

    #[test]
    fn range_ending_at_text_end_on_wrap_boundary() {
        let out = highlight("ABCDEFGH", &[(6, 8)], 4).unwrap();
        assert_eq!(kinds(&out), vec![(false, "ABCD\nEF"), (true, "GH")]);
    }

    #[test]
    fn zero_length_range_still_emits_fragment() {
        let out = highlight("MAAK", &[(2, 2)], 0).unwrap();
        assert_eq!(kinds(&out), vec![(false, "MA"), (true, ""), (false, "AK")]);
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let err = highlight("MAAKAAL", &[(1, 4), (3, 5)], 0).unwrap_err();
        assert_eq!(err, HighlightError::Overlap { previous_end: 4, start: 3 });
    }

    #[test]
    fn inverted_and_out_of_bounds_ranges_are_rejected() {
        assert_eq!(
            highlight("MAAK", &[(3, 1)], 0).unwrap_err(),
            HighlightError::Inverted { start: 3, end: 1 }
        );
        assert_eq!(
            highlight("MAAK", &[(2, 9)], 0).unwrap_err(),
            HighlightError::OutOfBounds { end: 9, len: 4 }
        );
    }

    #[test]
    fn round_trip_reconstructs_text() {
        let text = "MSTNPKPQRKTKRNTNRRPQDVKFPGGGQIVGGVYLLPRRGPRLGVRATRKTSERSQPRG";
        let ranges = [(0, 1), (10, 14), (14, 14), (30, 59)];
        for wrap in [0, 7, 60] {
            let out = highlight(text, &ranges, wrap).unwrap();
            assert_eq!(join(&out), wrap_text(text, wrap));
            assert_eq!(out.iter().filter(|f| f.is_highlighted()).count(), ranges.len());
        }
    }
}
