/// A binary package identity: name + the architecture it was built for.
/// `"all"` is used for architecture-independent binaries, matching the
/// archive's own convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinaryPackageId {
    pub package_name: String,
    pub architecture: String,
}

impl BinaryPackageId {
    pub fn new(package_name: impl Into<String>, architecture: impl Into<String>) -> Self {
        BinaryPackageId {
            package_name: package_name.into(),
            architecture: architecture.into(),
        }
    }
}

/// A binary package as it exists in a particular suite: which source built
/// it, and on which architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryInfo {
    pub pkg_id: BinaryPackageId,
    pub source: String,
}
