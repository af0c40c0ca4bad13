//! Loading the list of proxy source URLs

use crate::error::HarvestError;
use crate::proxy::models::SourceList;
use crate::Result;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Load source URLs from `path`.
///
/// A missing file is created empty and reported as [`SourceList::Created`].
/// Blank lines and `#` comments are skipped; a file with nothing else fails
/// with [`HarvestError::EmptyInput`]. Existing content is never modified.
pub fn load_sources<P: AsRef<Path>>(path: P) -> Result<SourceList> {
    let path = path.as_ref();

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            // create_new so a file that appeared meanwhile is left alone
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(HarvestError::io(path, e)),
            }
            debug!(path = %path.display(), "created empty source list");
            return Ok(SourceList::Created(path.to_path_buf()));
        }
        Err(e) => return Err(HarvestError::io(path, e)),
    };

    let sources = parse_sources(&content);
    if sources.is_empty() {
        return Err(HarvestError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), count = sources.len(), "loaded source list");
    Ok(SourceList::Sources(sources))
}

fn parse_sources(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
