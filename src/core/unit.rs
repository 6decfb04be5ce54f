//! Compile units
//!
//! A compile unit groups the source, header and object files that share a
//! filename stem (`main.cpp`, `main.h`, `main.o`). Units are rebuilt from a
//! fresh scan on every invocation.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::classify::{file_stem, with_extension, FileKind};
use crate::core::graph::{DependencyGraph, NodeId};

/// Index of a unit inside a [`UnitSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(usize);

/// Files sharing one stem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileUnit {
    /// Shared filename stem
    pub stem: String,
    /// Translation unit, if any
    pub source: Option<PathBuf>,
    /// Header with the same stem, if any
    pub header: Option<PathBuf>,
    /// Existing object file, if any
    pub object: Option<PathBuf>,
    /// Units whose header this unit transitively includes
    pub dependencies: BTreeSet<UnitId>,
    /// Every header this unit's source or own header transitively includes,
    /// including headers that lost their stem to another file
    pub includes: BTreeSet<PathBuf>,
}

impl CompileUnit {
    /// Create a unit with no files attached
    pub fn new(stem: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            source: None,
            header: None,
            object: None,
            dependencies: BTreeSet::new(),
            includes: BTreeSet::new(),
        }
    }

    /// Where this unit's object should be written
    ///
    /// An existing object keeps its location; otherwise `<output_dir>/<stem>.o`.
    pub fn object_target(&self, output_dir: &Path) -> PathBuf {
        self.object
            .clone()
            .unwrap_or_else(|| output_dir.join(with_extension(&self.stem, "o")))
    }
}

/// All compile units of a project, in build order
#[derive(Debug, Default, Clone)]
pub struct UnitSet {
    units: Vec<CompileUnit>,
    by_stem: HashMap<String, UnitId>,
}

impl UnitSet {
    /// Group graph nodes and object files into units
    ///
    /// Units are created in the order their first file appears in `order`
    /// (dependencies first), followed by object-only units. When two files
    /// of the same kind share a stem, the first one wins and the other is
    /// reported as a warning.
    pub fn assemble(
        graph: &DependencyGraph,
        order: &[NodeId],
        objects: &[PathBuf],
        warn: &mut dyn FnMut(String),
    ) -> Self {
        let mut set = Self::default();
        let mut unit_of_node: HashMap<NodeId, UnitId> = HashMap::new();

        for &id in order {
            let node = graph.node(id);
            let Some(stem) = file_stem(node.path()) else {
                continue;
            };
            let unit_id = set.unit_for(stem);
            let unit = &mut set.units[unit_id.0];
            let slot = match node.kind() {
                FileKind::Source => &mut unit.source,
                FileKind::Header => &mut unit.header,
                FileKind::Object => &mut unit.object,
            };
            match slot {
                Some(existing) => warn(format!(
                    "Ignoring {} (stem '{stem}' already used by {})",
                    node.path().display(),
                    existing.display()
                )),
                None => {
                    *slot = Some(node.path().to_path_buf());
                    unit_of_node.insert(id, unit_id);
                }
            }
        }

        for object in objects {
            let Some(stem) = file_stem(object) else {
                continue;
            };
            let unit_id = set.unit_for(stem);
            let unit = &mut set.units[unit_id.0];
            if unit.object.is_none() {
                unit.object = Some(object.clone());
            }
        }

        let closures = graph.include_closures(order);
        let node_of_unit = |path: &Option<PathBuf>| path.as_deref().and_then(|p| graph.find(p));

        for index in 0..set.units.len() {
            let unit = &set.units[index];
            let roots = [node_of_unit(&unit.source), node_of_unit(&unit.header)];
            let included: BTreeSet<NodeId> = roots
                .into_iter()
                .flatten()
                .flat_map(|root| closures[root.index()].iter().copied())
                .collect();
            let dependencies: BTreeSet<UnitId> = included
                .iter()
                .filter_map(|header| unit_of_node.get(header).copied())
                .filter(|&dep| dep != UnitId(index))
                .collect();
            let includes = included
                .iter()
                .map(|&header| graph.node(header).path().to_path_buf())
                .collect();
            set.units[index].dependencies = dependencies;
            set.units[index].includes = includes;
        }

        set
    }

    fn unit_for(&mut self, stem: &str) -> UnitId {
        if let Some(&id) = self.by_stem.get(stem) {
            return id;
        }
        let id = UnitId(self.units.len());
        self.units.push(CompileUnit::new(stem));
        self.by_stem.insert(stem.to_string(), id);
        id
    }

    /// Look up a unit
    pub fn get(&self, id: UnitId) -> &CompileUnit {
        &self.units[id.0]
    }

    /// Find a unit by stem
    pub fn find(&self, stem: &str) -> Option<UnitId> {
        self.by_stem.get(stem).copied()
    }

    /// Units in build order
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &CompileUnit)> {
        self.units.iter().enumerate().map(|(i, u)| (UnitId(i), u))
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether there are no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Every unit reachable through `dependencies`, walking dependencies of
    /// dependencies
    pub fn dependency_closure(&self, unit: &CompileUnit) -> BTreeSet<UnitId> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<UnitId> = unit.dependencies.iter().copied().collect();
        while let Some(id) = stack.pop() {
            if seen.insert(id) {
                stack.extend(self.units[id.0].dependencies.iter().copied());
            }
        }
        seen
    }
}
