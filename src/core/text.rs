// Line-prefix helpers shared by the diagnostic classifier and fault extractor.

/// ASCII case-insensitive `starts_with`.
pub(crate) fn starts_with_ignore_case(line: &str, marker: &str) -> bool {
    line.get(..marker.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(marker))
}

/// Drops the first `count` characters; shorter lines become empty.
pub(crate) fn skip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}
