//! Number and text formatting used in run summaries.

/// Formats a number with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use logsift::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// `"1 source"`, `"3 sources"`, `"1,200 addresses"`.
///
/// ```
/// use logsift::utils::format::count_noun;
///
/// assert_eq!(count_noun(1, "source", "sources"), "1 source");
/// assert_eq!(count_noun(1200, "address", "addresses"), "1,200 addresses");
/// ```
pub fn count_noun(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", format_number(n), if n == 1 { singular } else { plural })
}
