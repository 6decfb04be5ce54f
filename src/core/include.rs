//! Local include extraction
//!
//! Line-oriented scan for `#include "..."` directives. This is not a
//! preprocessor: includes split across lines or sitting inside comments are
//! taken at face value.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::GraphError;

const INCLUDE_DIRECTIVE: &str = "#include";

/// Extract the quoted target of a local include directive
///
/// Returns `None` for empty lines, lines without `#include`, system
/// (`<...>`) includes, and lines missing either quote.
pub fn extract_local_include(line: &str) -> Option<&str> {
    if line.is_empty() {
        return None;
    }
    let directive = line.find(INCLUDE_DIRECTIVE)?;
    let rest_start = directive + INCLUDE_DIRECTIVE.len();

    let open = rest_start + line[rest_start..].find('"')?;
    let close = line.rfind('"')?;
    if close <= open {
        return None;
    }

    Some(&line[open + 1..close])
}

/// Collect every local include named in a file, in order of appearance
pub fn extract_includes(path: &Path) -> Result<Vec<String>, GraphError> {
    let read_error = |e: std::io::Error| GraphError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let file = File::open(path).map_err(read_error)?;
    let mut includes = Vec::new();

    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(read_error)?;
        // Sources are not guaranteed to be UTF-8; directives are ASCII.
        let line = String::from_utf8_lossy(&line);
        if let Some(name) = extract_local_include(line.trim_end_matches('\r')) {
            includes.push(name.to_string());
        }
    }

    Ok(includes)
}
