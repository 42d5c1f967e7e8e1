//! Import aggregation across compilation units
//!
//! Collects every distinct `(alias, path)` pair in first-seen order. Sorting
//! is left to the printer's final pass over the assembled bundle.

use indexmap::IndexMap;
use log::{debug, warn};

use crate::{
    parser::CompilationUnit,
    types::{FxIndexSet, ImportDeclaration},
};

/// An explicit alias bound to more than one import path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasConflict {
    pub alias: String,
    pub paths: Vec<String>,
}

/// Ordered set of the imports of all bundled units
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    imports: FxIndexSet<ImportDeclaration>,
}

impl ImportSet {
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    pub fn contains(&self, import: &ImportDeclaration) -> bool {
        self.imports.contains(import)
    }

    /// Imports in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &ImportDeclaration> {
        self.imports.iter()
    }

    /// Returns false if the pair was already present
    pub fn insert(&mut self, import: ImportDeclaration) -> bool {
        self.imports.insert(import)
    }

    /// Aliases that name different paths in different files
    ///
    /// `_` and `.` bind nothing and are never reported.
    pub fn alias_conflicts(&self) -> Vec<AliasConflict> {
        let mut by_alias: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for import in self.imports.iter().filter(|import| !import.is_anonymous()) {
            if let Some(alias) = import.alias.as_deref() {
                let paths = by_alias.entry(alias).or_default();
                if !paths.contains(&import.path.as_str()) {
                    paths.push(&import.path);
                }
            }
        }

        by_alias
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(alias, paths)| AliasConflict {
                alias: alias.to_owned(),
                paths: paths.into_iter().map(str::to_owned).collect(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a ImportSet {
    type Item = &'a ImportDeclaration;
    type IntoIter = indexmap::set::Iter<'a, ImportDeclaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.imports.iter()
    }
}

#[derive(Debug, Default)]
pub struct ImportAggregator {
    set: ImportSet,
}

impl ImportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: &CompilationUnit) {
        let mut added = 0;
        for import in unit.imports() {
            if self.set.insert(import.clone()) {
                added += 1;
            }
        }
        debug!(
            "{}: {} import(s), {} new",
            unit.path().display(),
            unit.imports().len(),
            added
        );
    }

    pub fn finish(self) -> ImportSet {
        for conflict in self.set.alias_conflicts() {
            warn!(
                "Import alias \"{}\" refers to different packages: {}",
                conflict.alias,
                conflict.paths.join(", ")
            );
        }
        self.set
    }

    /// Aggregate the imports of `units`, processed in order
    pub fn collect<'a>(units: impl IntoIterator<Item = &'a CompilationUnit>) -> ImportSet {
        let mut aggregator = Self::new();
        for unit in units {
            aggregator.add_unit(unit);
        }
        aggregator.finish()
    }
}
