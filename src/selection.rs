//! Parsing of the interactive file selection prompt.

use crate::error::{DriveError, Result};

/// What the user picked from a numbered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Quit,
    All,
    /// Zero-based indices into the listing, in the order entered.
    Indices(Vec<usize>),
}

/// Parse a selection line such as `1,2,5`, `all` or `q` against `count` entries.
///
/// Out-of-range numbers are dropped; any non-numeric entry is an error.
pub fn parse_selection(input: &str, count: usize) -> Result<Selection> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "q" => return Ok(Selection::Quit),
        "all" => return Ok(Selection::All),
        _ => {}
    }

    let mut indices = Vec::new();
    for part in input.split(',') {
        let n: usize = part
            .trim()
            .parse()
            .map_err(|_| DriveError::InvalidSelection(part.trim().to_string()))?;
        if (1..=count).contains(&n) {
            indices.push(n - 1);
        }
    }
    Ok(Selection::Indices(indices))
}
