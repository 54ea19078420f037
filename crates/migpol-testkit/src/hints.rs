use migpol_universe::{Hint, HintProvider};

/// A fixed set of hints, returned regardless of the queried source/version.
/// Good enough for tests that only ever exercise one candidate.
#[derive(Default)]
pub struct FakeHints {
    pub skiptest: Vec<Hint>,
    pub badtest: Vec<Hint>,
}

impl FakeHints {
    pub fn new() -> Self {
        FakeHints::default()
    }

    pub fn with_skiptest(mut self, hint: Hint) -> Self {
        self.skiptest.push(hint);
        self
    }

    pub fn with_badtest(mut self, hint: Hint) -> Self {
        self.badtest.push(hint);
        self
    }
}

impl HintProvider for FakeHints {
    fn search_force_skiptest(&self, _source: &str, _version: &str) -> Vec<Hint> {
        self.skiptest.clone()
    }

    fn search_force_badtest(&self, _source: &str) -> Vec<Hint> {
        self.badtest.clone()
    }
}
