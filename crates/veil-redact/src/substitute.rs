//! Single-pass, non-overlapping span substitution
//!
//! Matches are collected against the input snapshot, never against partially
//! substituted output, so one replacement can never corrupt or re-match
//! another's result. Candidates are visited in the order given; an earlier
//! candidate's spans win any overlap against later ones, which is why
//! callers sort candidates by descending literal length.

use regex::Regex;

pub(crate) struct Candidate {
    pub pattern: Regex,
    pub replacement: String,
}

pub(crate) fn substitute_all(text: &str, candidates: &[Candidate]) -> String {
    let mut claimed: Vec<(usize, usize, &str)> = Vec::new();
    for candidate in candidates {
        for m in candidate.pattern.find_iter(text) {
            let overlaps = claimed
                .iter()
                .any(|&(start, end, _)| m.start() < end && start < m.end());
            if !overlaps {
                claimed.push((m.start(), m.end(), candidate.replacement.as_str()));
            }
        }
    }

    if claimed.is_empty() {
        return text.to_string();
    }
    claimed.sort_by_key(|&(start, _, _)| start);

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;
    for (start, end, replacement) in claimed {
        result.push_str(&text[last_end..start]);
        result.push_str(replacement);
        last_end = end;
    }
    result.push_str(&text[last_end..]);
    result
}
