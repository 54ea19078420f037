use migpol_universe::{BinaryPackageId, DependencyGroup, PackageUniverse};
use std::collections::HashMap;

/// An in-memory dependency graph: forward dependency groups, conflicts, and
/// their derived reverse-dependency index.
#[derive(Default)]
pub struct InMemoryUniverse {
    depends: HashMap<BinaryPackageId, Vec<DependencyGroup>>,
    conflicts: HashMap<BinaryPackageId, Vec<BinaryPackageId>>,
    reverse: HashMap<BinaryPackageId, Vec<BinaryPackageId>>,
}

impl InMemoryUniverse {
    pub fn new() -> Self {
        InMemoryUniverse::default()
    }

    /// Declares `binary` depends on `group` (one alternative of which must be
    /// installed), updating the reverse index for every alternative.
    pub fn with_dependency(mut self, binary: BinaryPackageId, group: DependencyGroup) -> Self {
        for alt in &group {
            self.reverse.entry(alt.clone()).or_default().push(binary.clone());
        }
        self.depends.entry(binary).or_default().push(group);
        self
    }

    pub fn with_conflict(mut self, binary: BinaryPackageId, other: BinaryPackageId) -> Self {
        self.conflicts.entry(binary).or_default().push(other);
        self
    }
}

impl PackageUniverse for InMemoryUniverse {
    fn dependencies_of(&self, binary: &BinaryPackageId) -> Vec<DependencyGroup> {
        self.depends.get(binary).cloned().unwrap_or_default()
    }

    fn negative_dependencies_of(&self, binary: &BinaryPackageId) -> Vec<BinaryPackageId> {
        self.conflicts.get(binary).cloned().unwrap_or_default()
    }

    fn reverse_dependencies_of(&self, binary: &BinaryPackageId) -> Vec<BinaryPackageId> {
        self.reverse.get(binary).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_populates_both_directions() {
        let libfoo = BinaryPackageId::new("libfoo1", "amd64");
        let app = BinaryPackageId::new("app", "amd64");
        let universe = InMemoryUniverse::new().with_dependency(app.clone(), vec![libfoo.clone()]);

        assert_eq!(universe.dependencies_of(&app), vec![vec![libfoo.clone()]]);
        assert_eq!(universe.reverse_dependencies_of(&libfoo), vec![app]);
    }

    #[test]
    fn unknown_binary_has_no_dependencies() {
        let universe = InMemoryUniverse::new();
        let unknown = BinaryPackageId::new("nope", "amd64");
        assert!(universe.dependencies_of(&unknown).is_empty());
        assert!(universe.reverse_dependencies_of(&unknown).is_empty());
    }
}
