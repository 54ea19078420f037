use migpol_universe::SuiteView;
use std::collections::HashMap;

/// `binary name -> source names whose Testsuite-Triggers field names that
/// binary`, built once at startup across every suite the engine knows about
/// (source and target). Used by test selection (§4.4 step 5) to find
/// sources that opted in to being re-triggered by a binary's changes.
pub fn build(suites: &[&dyn SuiteView]) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for suite in suites {
        for (source_name, info) in suite.sources() {
            for binary_name in &info.testsuite_triggers {
                let sources = map.entry(binary_name.clone()).or_default();
                if !sources.contains(source_name) {
                    sources.push(source_name.clone());
                }
            }
        }
    }
    for sources in map.values_mut() {
        sources.sort();
    }
    map
}
