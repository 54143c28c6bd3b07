//! Digests of prior chunk results and final merge.
//!
//! Later chunks need to know what earlier chunks already said. Rather
//! than replaying full texts (which would blow the budget the chunking
//! just enforced), each prior result is truncated to a short synopsis
//! and injected into the contextual system prompt of the next chunk.

/// Character budget per prior result in a digest.
const SUMMARY_CHARS_PER_RESULT: usize = 200;

/// Truncate to a character budget without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build a bounded synopsis of prior chunk results.
///
/// Each result is listed in order, truncated to a fixed budget. Empty
/// input yields an empty string. The digest only ever supplements the
/// base system prompt; it never replaces it.
#[must_use]
pub fn summarize_results(prior_results: &[String]) -> String {
    if prior_results.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = prior_results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "{}. {}...",
                i + 1,
                truncate_chars(result, SUMMARY_CHARS_PER_RESULT)
            )
        })
        .collect();

    format!(
        "Summary of previous parts:\n{}\n\n---\n\n",
        lines.join("\n")
    )
}

/// Merge chunk result texts into one response body.
///
/// A single result is returned unchanged. With multiple results, the
/// first is concatenated as-is and every later one is prefixed with a
/// visible part separator.
#[must_use]
pub fn merge_results(results: &[String]) -> String {
    if results.len() == 1 {
        return results[0].clone();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            if i == 0 {
                result.clone()
            } else {
                format!("\n\n--- Part {} ---\n\n{}", i + 1, result)
            }
        })
        .collect()
}
