//! Redaction of matched sensitive spans.

/// Masks a matched span so it can be carried in verdict details and the audit
/// log without leaking the underlying value.
///
/// Every alphanumeric character except the final two is replaced with `*`;
/// separators are preserved so the shape of the match stays recognizable
/// (e.g. an SSN renders as `***-**-**89`).
#[must_use]
pub fn redact(matched: &str) -> String {
    let alnum_total = matched.chars().filter(char::is_ascii_alphanumeric).count();
    let keep_from = alnum_total.saturating_sub(2);

    let mut seen = 0usize;
    matched
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                seen += 1;
                if seen > keep_from { c } else { '*' }
            } else {
                c
            }
        })
        .collect()
}
