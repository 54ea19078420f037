use migpol_universe::{BinaryPackageId, ExcuseHandle, PackageUniverse, SuiteView};
use std::collections::HashMap;

/// Compute `tests`: the sorted-by-source list of `(testsrc, testver)` pairs
/// to evaluate on `arch` for candidate `(src, ver)`.
///
/// `seeds` collects the extra binaries (kernel special case) considered
/// alongside the candidate's own binaries for reverse-dependency and
/// test-suite-trigger expansion; it is returned so [`crate::triggers_list`]
/// can reuse the same starting set without recomputing it.
pub fn select(
    src: &str,
    ver: &str,
    arch: &str,
    candidate_binaries: &[BinaryPackageId],
    candidate_suite: &dyn SuiteView,
    target_suite: &dyn SuiteView,
    universe: &dyn PackageUniverse,
    excuse: &dyn ExcuseHandle,
    inverted_triggers: &HashMap<String, Vec<String>>,
) -> (Vec<(String, String)>, Vec<BinaryPackageId>) {
    // Kernel special case: "linux" with a "linux-meta" sibling source never
    // gets its own test run (the meta package carries the triggers).
    if src.starts_with("linux") && candidate_suite.source("linux-meta").is_some() {
        return (Vec::new(), Vec::new());
    }

    let mut seeds: Vec<BinaryPackageId> = candidate_binaries.to_vec();

    if src.starts_with("linux-meta") {
        let has_image_binary = candidate_binaries
            .iter()
            .filter(|b| b.architecture == arch)
            .any(|b| b.package_name.contains("-image"));
        if has_image_binary {
            if let Some(dkms) = target_suite.binaries(arch).get("dkms") {
                seeds.push(dkms.pkg_id.clone());
            }
        }
    }

    // Build-on-arch check: abort entirely if this arch has no arch-specific
    // build yet but other arches do.
    let has_arch_specific_anywhere = candidate_binaries.iter().any(|b| b.architecture != "all");
    let has_arch_specific_here = candidate_binaries
        .iter()
        .any(|b| b.architecture == arch && b.architecture != "all");
    if has_arch_specific_anywhere && !has_arch_specific_here {
        return (Vec::new(), Vec::new());
    }

    let mut tests: Vec<(String, String)> = Vec::new();
    let mut seen_sources: std::collections::HashSet<String> = std::collections::HashSet::new();

    // Self-test.
    if let Some(own) = candidate_suite.source(src) {
        if own.has_autopkgtest() && excuse.built_binary_count(arch) > 0 {
            tests.push((src.to_string(), ver.to_string()));
            seen_sources.insert(src.to_string());
        }
    }

    // Reverse-dependency expansion.
    for binary in &seeds {
        for rdep in universe.reverse_dependencies_of(binary) {
            let Some(info) = target_suite.binaries(&rdep.architecture).get(&rdep.package_name) else {
                continue;
            };
            if info.source == src {
                continue;
            }
            if seen_sources.contains(&info.source) {
                continue;
            }
            let Some(target_src_info) = target_suite.source(&info.source) else {
                continue;
            };
            if target_src_info.has_autopkgtest() {
                tests.push((info.source.clone(), target_src_info.version.clone()));
                seen_sources.insert(info.source.clone());
            }
        }
    }

    // Test-suite triggers.
    for binary in &seeds {
        let Some(triggering_sources) = inverted_triggers.get(&binary.package_name) else {
            continue;
        };
        for source_name in triggering_sources {
            if seen_sources.contains(source_name) {
                continue;
            }
            let Some(target_src_info) = target_suite.source(source_name) else {
                continue;
            };
            if target_src_info.has_autopkgtest() {
                tests.push((source_name.clone(), target_src_info.version.clone()));
                seen_sources.insert(source_name.clone());
            }
        }
    }

    tests.sort();
    (tests, seeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migpol_universe::{BinaryInfo, DependencyGroup, SourceInfo};
    use std::collections::HashMap as Map;

    struct FakeUniverse;
    impl PackageUniverse for FakeUniverse {
        fn dependencies_of(&self, _binary: &BinaryPackageId) -> Vec<DependencyGroup> {
            Vec::new()
        }
        fn negative_dependencies_of(&self, _binary: &BinaryPackageId) -> Vec<BinaryPackageId> {
            Vec::new()
        }
        fn reverse_dependencies_of(&self, binary: &BinaryPackageId) -> Vec<BinaryPackageId> {
            if binary.package_name == "libfoo1" {
                vec![BinaryPackageId::new("consumer-bin", "amd64")]
            } else {
                Vec::new()
            }
        }
    }

    struct FakeExcuse {
        built: usize,
    }
    impl ExcuseHandle for FakeExcuse {
        fn missing_builds(&self) -> &std::collections::HashSet<String> {
            unimplemented!()
        }
        fn unsatisfiable_on_archs(&self) -> &std::collections::HashSet<String> {
            unimplemented!()
        }
        fn skip_dep_check_archs(&self) -> &std::collections::HashSet<String> {
            unimplemented!()
        }
        fn built_binary_count(&self, _arch: &str) -> usize {
            self.built
        }
        fn depends_packages_flattened(&self) -> &[BinaryPackageId] {
            &[]
        }
        fn add_verdict_info(&mut self, _verdict: migpol_model::Verdict, _message: &str) {}
        fn addinfo(&mut self, _message: &str) {}
        fn addreason(&mut self, _reason: &str) {}
        fn add_bounty(&mut self, _name: &str, _amount: i64) {}
        fn add_penalty(&mut self, _name: &str, _amount: i64) {}
        fn set_autopkgtest_results(&mut self, _labels: std::collections::HashSet<String>) {}
    }

    struct FakeSuite {
        name: String,
        sources: Map<String, SourceInfo>,
        binaries: Map<String, Map<String, BinaryInfo>>,
        empty: Map<String, BinaryInfo>,
    }
    impl SuiteView for FakeSuite {
        fn name(&self) -> &str {
            &self.name
        }
        fn sources(&self) -> &Map<String, SourceInfo> {
            &self.sources
        }
        fn binaries(&self, arch: &str) -> &Map<String, BinaryInfo> {
            self.binaries.get(arch).unwrap_or(&self.empty)
        }
    }

    fn empty_inverted() -> HashMap<String, Vec<String>> {
        HashMap::new()
    }

    #[test]
    fn linux_meta_sibling_yields_empty_tests() {
        let mut sources = Map::new();
        sources.insert(
            "linux-meta".to_string(),
            SourceInfo {
                version: "1.0".into(),
                binaries: vec![],
                testsuite: vec![],
                testsuite_triggers: vec![],
            },
        );
        let suite = FakeSuite {
            name: "noble".into(),
            sources,
            binaries: Map::new(),
            empty: Map::new(),
        };
        let target = FakeSuite {
            name: "noble".into(),
            sources: Map::new(),
            binaries: Map::new(),
            empty: Map::new(),
        };
        let excuse = FakeExcuse { built: 1 };
        let (tests, seeds) = select(
            "linux",
            "6.1",
            "amd64",
            &[],
            &suite,
            &target,
            &FakeUniverse,
            &excuse,
            &empty_inverted(),
        );
        assert!(tests.is_empty());
        assert!(seeds.is_empty());
    }

    #[test]
    fn self_test_requires_built_binary() {
        let mut sources = Map::new();
        sources.insert(
            "foo".to_string(),
            SourceInfo {
                version: "2.0".into(),
                binaries: vec![],
                testsuite: vec!["autopkgtest".into()],
                testsuite_triggers: vec![],
            },
        );
        let suite = FakeSuite {
            name: "noble".into(),
            sources: sources.clone(),
            binaries: Map::new(),
            empty: Map::new(),
        };
        let target = FakeSuite {
            name: "noble".into(),
            sources,
            binaries: Map::new(),
            empty: Map::new(),
        };
        let excuse_built = FakeExcuse { built: 1 };
        let (tests, _) = select(
            "foo",
            "2.0",
            "amd64",
            &[],
            &suite,
            &target,
            &FakeUniverse,
            &excuse_built,
            &empty_inverted(),
        );
        assert_eq!(tests, vec![("foo".to_string(), "2.0".to_string())]);

        let excuse_unbuilt = FakeExcuse { built: 0 };
        let (tests, _) = select(
            "foo",
            "2.0",
            "amd64",
            &[],
            &suite,
            &target,
            &FakeUniverse,
            &excuse_unbuilt,
            &empty_inverted(),
        );
        assert!(tests.is_empty());
    }

    #[test]
    fn build_on_arch_check_aborts_when_no_arch_specific_build_here() {
        let suite = FakeSuite {
            name: "noble".into(),
            sources: Map::new(),
            binaries: Map::new(),
            empty: Map::new(),
        };
        let target = FakeSuite {
            name: "noble".into(),
            sources: Map::new(),
            binaries: Map::new(),
            empty: Map::new(),
        };
        let excuse = FakeExcuse { built: 1 };
        let candidate_binaries = vec![BinaryPackageId::new("foo", "arm64")];
        let (tests, seeds) = select(
            "foo",
            "2.0",
            "amd64",
            &candidate_binaries,
            &suite,
            &target,
            &FakeUniverse,
            &excuse,
            &empty_inverted(),
        );
        assert!(tests.is_empty());
        assert!(seeds.is_empty());
    }

    #[test]
    fn reverse_dependency_expansion_adds_consumer_source() {
        let mut sources = Map::new();
        sources.insert(
            "consumer".to_string(),
            SourceInfo {
                version: "3.0".into(),
                binaries: vec![],
                testsuite: vec!["autopkgtest".into()],
                testsuite_triggers: vec![],
            },
        );
        let mut binaries_amd64 = Map::new();
        binaries_amd64.insert(
            "consumer-bin".to_string(),
            BinaryInfo {
                pkg_id: BinaryPackageId::new("consumer-bin", "amd64"),
                source: "consumer".into(),
            },
        );
        let mut binaries = Map::new();
        binaries.insert("amd64".to_string(), binaries_amd64);

        let candidate_suite = FakeSuite {
            name: "unstable".into(),
            sources: Map::new(),
            binaries: Map::new(),
            empty: Map::new(),
        };
        let target = FakeSuite {
            name: "noble".into(),
            sources,
            binaries,
            empty: Map::new(),
        };
        let excuse = FakeExcuse { built: 0 };
        let candidate_binaries = vec![BinaryPackageId::new("libfoo1", "amd64")];
        let (tests, _) = select(
            "libfoo",
            "2.0",
            "amd64",
            &candidate_binaries,
            &candidate_suite,
            &target,
            &FakeUniverse,
            &excuse,
            &empty_inverted(),
        );
        assert_eq!(tests, vec![("consumer".to_string(), "3.0".to_string())]);
    }
}
