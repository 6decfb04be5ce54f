//! File classification
//!
//! Maps paths to [`FileKind`] by extension and provides the string-level
//! stem/extension/filename helpers used for unit grouping and object naming.
//! Extension matching is case-sensitive: `.C` is a source file, `.H` a header.

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Extensions recognized as C/C++ source files
pub const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cc", "cxx", "c++", "C"];

/// Extensions recognized as C/C++ header files
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "h++", "H"];

/// Extensions recognized as object files
pub const OBJECT_EXTENSIONS: &[&str] = &["o", "obj"];

/// Kind of a discovered project file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Translation unit (`.cpp`, `.cc`, ...)
    Source,
    /// Header (`.h`, `.hpp`, ...)
    Header,
    /// Compiled object (`.o`, `.obj`)
    Object,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Header => write!(f, "header"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// Classify a path by its extension
pub fn classify(path: &Path) -> Option<FileKind> {
    let text = path.to_str()?;
    let ext = extension(text)?;

    if SOURCE_EXTENSIONS.contains(&ext) {
        Some(FileKind::Source)
    } else if HEADER_EXTENSIONS.contains(&ext) {
        Some(FileKind::Header)
    } else if OBJECT_EXTENSIONS.contains(&ext) {
        Some(FileKind::Object)
    } else {
        None
    }
}

/// Check if a path is a source file
pub fn is_source(path: &Path) -> bool {
    classify(path) == Some(FileKind::Source)
}

/// Check if a path is a header file
pub fn is_header(path: &Path) -> bool {
    classify(path) == Some(FileKind::Header)
}

/// Check if a path is an object file
pub fn is_object(path: &Path) -> bool {
    classify(path) == Some(FileKind::Object)
}

/// Substring before the last `.`
///
/// Empty input and a leading dot (`.txt`) have no stem; a name with no dot
/// is its own stem.
pub fn stem(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    match path.rfind('.') {
        Some(0) => None,
        Some(pos) => Some(&path[..pos]),
        None => Some(path),
    }
}

/// Substring after the last `.`, absent when there is no dot or nothing
/// follows it
pub fn extension(path: &str) -> Option<&str> {
    let pos = path.rfind('.')?;
    let ext = &path[pos + 1..];
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Final path component after the last `/`
pub fn filename(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    match path.rfind('/') {
        Some(pos) if pos + 1 == path.len() => None,
        Some(pos) => Some(&path[pos + 1..]),
        None => Some(path),
    }
}

/// Stem of the filename component (`src/net/socket.cpp` -> `socket`)
pub fn file_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    stem(name)
}

/// Join a stem and an extension (`with_extension("main", "o")` -> `main.o`)
pub fn with_extension(stem: &str, ext: &str) -> String {
    format!("{stem}.{ext}")
}
