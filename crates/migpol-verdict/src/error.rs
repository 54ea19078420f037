#[derive(Debug, thiserror::Error)]
pub enum VerdictError {
    /// A `(testsrc, arch)` leaf had no stored result and was not in Pending
    /// Store — the Trigger Resolver/Test Requester should have guaranteed
    /// one or the other before the Verdict Engine ever sees this leaf.
    #[error("result for {testsrc}/{arch} is neither known nor pending")]
    ResultNeitherKnownNorPending { testsrc: String, arch: String },
}
