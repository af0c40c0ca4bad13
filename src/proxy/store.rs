//! Newline-delimited text files used to hand candidates between stages

use crate::error::HarvestError;
use crate::Result;
use std::fs;
use std::path::Path;

/// Split a payload into tokens on `\n`, stripping a trailing `\r` from each.
///
/// A payload ending in a newline yields a trailing empty token, so the result
/// reflects the raw split rather than the number of visible lines.
pub fn split_tokens(content: &str) -> impl Iterator<Item = &str> {
    content.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Read the non-empty lines of a file in order, exactly as written
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;
    Ok(non_empty_lines(&content))
}

pub(crate) fn non_empty_lines(content: &str) -> Vec<String> {
    split_tokens(content)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write one entry per line, replacing whatever the file held before
pub fn write_lines<P, I, S>(path: P, lines: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }

    fs::write(path, content).map_err(|e| HarvestError::io(path, e))
}
