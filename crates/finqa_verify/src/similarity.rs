use similar::{DiffTag, TextDiff};

/// Character level similarity in `[0, 1]`: twice the number of matched
/// characters divided by the combined length. Two empty strings are
/// identical.
pub fn similarity_ratio(left: &str, right: &str) -> f64 {
    let total = left.chars().count() + right.chars().count();
    if total == 0 {
        return 1.0;
    }

    let diff = TextDiff::from_chars(left, right);
    let matched: usize = diff
        .ops()
        .iter()
        .map(|op| op.as_tag_tuple())
        .filter(|(tag, _, _)| *tag == DiffTag::Equal)
        .map(|(_, old, _)| old.len())
        .sum();

    2.0 * matched as f64 / total as f64
}
