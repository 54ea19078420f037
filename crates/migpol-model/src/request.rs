/// One (testsrc, testver) pair selected for evaluation by the trigger resolver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestCandidate {
    pub source: String,
    pub version: String,
}

impl TestCandidate {
    pub fn new(source: impl Into<String>, version: impl Into<String>) -> Self {
        TestCandidate {
            source: source.into(),
            version: version.into(),
        }
    }
}

/// A request to run one package's test on one architecture for a set of
/// co-migration triggers. `triggers[0]` is always the primary trigger that
/// motivated the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRequest {
    pub source: String,
    pub arch: String,
    pub triggers: Vec<String>,
    pub huge: bool,
}

impl TestRequest {
    /// The primary trigger — the package whose migration motivated this
    /// request. Panics if `triggers` is empty, which would be a logic bug in
    /// whoever constructed this request (the resolver always seeds with the
    /// candidate's own trigger at index 0).
    pub fn primary_trigger(&self) -> &str {
        &self.triggers[0]
    }
}
