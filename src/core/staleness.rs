//! Staleness evaluation
//!
//! Decides whether a compile unit must be recompiled by comparing file
//! modification times. Nothing is cached between invocations; every call
//! reads timestamps from disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::core::unit::{CompileUnit, UnitSet};
use crate::infra::filesystem::modified;

/// Why a unit needs recompiling
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "file", rename_all = "snake_case")]
pub enum StaleReason {
    /// No object file exists (or its timestamp is unreadable)
    NoObject,
    /// The source changed after the object was built
    SourceNewer,
    /// The unit's own header changed after the object was built
    HeaderNewer,
    /// A file in a dependency unit changed after the object was built
    DependencyNewer(PathBuf),
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoObject => write!(f, "no object file"),
            Self::SourceNewer => write!(f, "source modified"),
            Self::HeaderNewer => write!(f, "header modified"),
            Self::DependencyNewer(path) => write!(f, "{} modified", path.display()),
        }
    }
}

/// Reason `unit` must be recompiled, or `None` if its object is current
///
/// Units without a source never need compiling. A file that cannot be
/// stat'ed is treated as not newer than the object.
pub fn staleness(unit: &CompileUnit, units: &UnitSet) -> Option<StaleReason> {
    unit.source.as_ref()?;

    let Some(object_time) = unit.object.as_deref().and_then(modified) else {
        return Some(StaleReason::NoObject);
    };

    if newer_than(unit.source.as_deref(), object_time) {
        return Some(StaleReason::SourceNewer);
    }
    if newer_than(unit.header.as_deref(), object_time) {
        return Some(StaleReason::HeaderNewer);
    }

    for id in units.dependency_closure(unit) {
        let dependency = units.get(id);
        for path in [&dependency.source, &dependency.header].into_iter().flatten() {
            if newer_than(Some(path), object_time) {
                return Some(StaleReason::DependencyNewer(path.clone()));
            }
        }
    }

    unit.includes
        .iter()
        .find(|path| newer_than(Some(path.as_path()), object_time))
        .map(|path| StaleReason::DependencyNewer(path.clone()))
}

/// Whether `unit` must be recompiled
pub fn needs_recompile(unit: &CompileUnit, units: &UnitSet) -> bool {
    staleness(unit, units).is_some()
}

fn newer_than(path: Option<&Path>, object_time: SystemTime) -> bool {
    path.and_then(modified)
        .is_some_and(|time| object_time < time)
}
