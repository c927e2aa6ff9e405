//! Block-set semantics shared by the decision engine and the stores.
//!
//! A domain is blocked when the name itself or any parent formed by dropping
//! leading labels is present in the block-set. Stored entries are lowercase
//! with no trailing dot, so lookups go through [`normalize_domain`] first.

/// Lowercases the name and strips a single trailing dot. A trailing escaped
/// dot belongs to the last label and is kept.
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = match domain.strip_suffix('.') {
        Some(rest) if !ends_with_escape(rest) => rest,
        _ => domain,
    };
    trimmed.to_ascii_lowercase()
}

fn ends_with_escape(s: &str) -> bool {
    s.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Returns every suffix of a normalized name, longest first.
///
/// `a.b.c.com` yields `["a.b.c.com", "b.c.com", "c.com", "com"]`. The empty
/// name (a root query) has no candidates. An escaped dot (`\.`) is part of
/// its label, not a separator.
pub fn suffix_candidates(normalized: &str) -> Vec<String> {
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut candidates = Vec::with_capacity(normalized.matches('.').count() + 1);
    let mut rest = normalized;
    loop {
        candidates.push(rest.to_string());
        match label_separator(rest) {
            Some(pos) => rest = &rest[pos + 1..],
            None => break,
        }
    }
    candidates
}

/// Offset of the first dot not preceded by an escaping backslash.
fn label_separator(name: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, b) in name.bytes().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'.' => return Some(i),
            _ => {}
        }
    }
    None
}
