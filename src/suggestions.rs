//! # Error Suggestions
//!
//! Helpers for attaching hints to errors. An error should say what went wrong
//! and, where possible, how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! let hint = suggestions::did_you_mean("provison", &["provision", "setup"]);
//! assert_eq!(hint.as_deref(), Some("Did you mean 'provision'?"));
//! ```

use std::path::Path;

/// Generate an error for when no manifest exists at the content root.
pub fn manifest_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Manifest not found: {path}\n\n\
         hint: Run the command from a content directory that contains manifest.yaml\n\
         hint: Use --path to point at a different content directory",
        path = path.display()
    )
}

/// Generate an error for an output directory that already has files in it.
pub fn output_not_empty(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Output directory is not empty: {path}\n\n\
         hint: Use --clear to remove the previous output first\n\
         hint: Use --output to write somewhere else",
        path = path.display()
    )
}

/// Build a "did you mean" hint for `input` from a list of known names.
pub fn did_you_mean(input: &str, candidates: &[&str]) -> Option<String> {
    find_similar(input, candidates).map(|s| format!("Did you mean '{s}'?"))
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row; previous[j] holds the distance for a[..i-1], b[..j].
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}
