use crate::binary::BinaryPackageId;

/// A dependency disjunction: a binary satisfies this dependency group if any
/// one of the listed alternatives is installed.
pub type DependencyGroup = Vec<BinaryPackageId>;

/// Read-only query surface over the archive's dependency graph, independent
/// of any one suite. The policy engine uses this to discover which
/// additional binaries (and therefore sources) are implicated by installing
/// a candidate's binaries.
pub trait PackageUniverse {
    /// Disjunctive dependency groups declared by `binary` (its `Depends`
    /// alternatives, one group per comma-separated clause).
    fn dependencies_of(&self, binary: &BinaryPackageId) -> Vec<DependencyGroup>;

    /// Binaries that `binary` conflicts with or breaks.
    fn negative_dependencies_of(&self, binary: &BinaryPackageId) -> Vec<BinaryPackageId>;

    /// Binaries that depend on `binary` (directly).
    fn reverse_dependencies_of(&self, binary: &BinaryPackageId) -> Vec<BinaryPackageId>;
}
