use migpol_model::trigger;
use migpol_universe::{BinaryPackageId, ExcuseHandle, PackageUniverse, SuiteView};
use std::collections::{HashMap, HashSet, VecDeque};

/// Compute the ordered `triggers_list` for candidate `(src, ver)` on `arch`:
/// every `source/version` co-migration directive implicated by installing
/// the candidate, with the candidate's own trigger always at index 0.
pub fn build(
    src: &str,
    ver: &str,
    arch: &str,
    seeds: &[BinaryPackageId],
    candidate_suite: &dyn SuiteView,
    target_suite: &dyn SuiteView,
    universe: &dyn PackageUniverse,
    excuse: &dyn ExcuseHandle,
    inverted_triggers: &HashMap<String, Vec<String>>,
) -> Vec<String> {
    let mut bin_triggers: HashSet<BinaryPackageId> = HashSet::new();
    let mut queue: VecDeque<BinaryPackageId> = seeds.iter().cloned().collect();

    while let Some(binary) = queue.pop_front() {
        if bin_triggers.contains(&binary) {
            continue;
        }
        bin_triggers.insert(binary.clone());

        for group in universe.dependencies_of(&binary) {
            if target_suite.any_of_these_are_in_the_suite(group.iter()) {
                continue;
            }
            for alt in &group {
                let is_new_compared_to_target = candidate_suite
                    .binaries(&alt.architecture)
                    .contains_key(&alt.package_name)
                    && !target_suite
                        .binaries(&alt.architecture)
                        .contains_key(&alt.package_name);
                if is_new_compared_to_target {
                    queue.push_back(alt.clone());
                }
            }
        }
    }

    // Negative dependencies: conflicts present in target by name but absent
    // in the candidate suite by name, i.e. resolved by the new version.
    let visited: Vec<BinaryPackageId> = bin_triggers.iter().cloned().collect();
    for binary in &visited {
        for neg in universe.negative_dependencies_of(binary) {
            let in_target = target_suite
                .binaries(&neg.architecture)
                .contains_key(&neg.package_name);
            let in_candidate = candidate_suite
                .binaries(&neg.architecture)
                .contains_key(&neg.package_name);
            if in_target && !in_candidate {
                bin_triggers.insert(neg);
            }
        }
    }

    for binary in excuse.depends_packages_flattened() {
        if binary.architecture == arch {
            bin_triggers.insert(binary.clone());
        }
    }

    let mut triggers: HashSet<String> = HashSet::new();
    let candidate_binary_names: HashSet<&str> =
        seeds.iter().map(|b| b.package_name.as_str()).collect();

    for binary in &bin_triggers {
        if binary.architecture != arch {
            continue;
        }
        let Some(binary_info) = candidate_suite.binaries(arch).get(&binary.package_name) else {
            continue;
        };
        let source_name = &binary_info.source;
        emit_if_changed(source_name, candidate_suite, target_suite, &mut triggers);

        if !candidate_binary_names.contains(binary.package_name.as_str()) {
            if let Some(triggering_sources) = inverted_triggers.get(&binary.package_name) {
                for other_source in triggering_sources {
                    emit_if_changed(other_source, candidate_suite, target_suite, &mut triggers);
                }
            }
        }
    }

    let primary = trigger::format(src, ver);
    triggers.remove(&primary);
    let mut sorted: Vec<String> = triggers.into_iter().collect();
    sorted.sort();
    sorted.insert(0, primary);
    sorted
}

fn emit_if_changed(
    source_name: &str,
    candidate_suite: &dyn SuiteView,
    target_suite: &dyn SuiteView,
    triggers: &mut HashSet<String>,
) {
    let Some(candidate_info) = candidate_suite.source(source_name) else {
        return;
    };
    let changed = match target_suite.source(source_name) {
        None => true,
        Some(target_info) => target_info.version != candidate_info.version,
    };
    if changed {
        triggers.insert(trigger::format(source_name, &candidate_info.version));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migpol_universe::{BinaryInfo, DependencyGroup, SourceInfo};
    use std::collections::HashMap as Map;

    struct FakeUniverse {
        deps: Map<String, Vec<DependencyGroup>>,
    }
    impl PackageUniverse for FakeUniverse {
        fn dependencies_of(&self, binary: &BinaryPackageId) -> Vec<DependencyGroup> {
            self.deps.get(&binary.package_name).cloned().unwrap_or_default()
        }
        fn negative_dependencies_of(&self, _binary: &BinaryPackageId) -> Vec<BinaryPackageId> {
            Vec::new()
        }
        fn reverse_dependencies_of(&self, _binary: &BinaryPackageId) -> Vec<BinaryPackageId> {
            Vec::new()
        }
    }

    struct FakeExcuse;
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
            0
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

    #[test]
    fn primary_trigger_always_first() {
        let candidate_suite = FakeSuite {
            name: "unstable".into(),
            sources: Map::new(),
            binaries: Map::new(),
            empty: Map::new(),
        };
        let target_suite = FakeSuite {
            name: "noble".into(),
            sources: Map::new(),
            binaries: Map::new(),
            empty: Map::new(),
        };
        let universe = FakeUniverse { deps: Map::new() };
        let excuse = FakeExcuse;
        let triggers = build(
            "foo",
            "2.0",
            "amd64",
            &[],
            &candidate_suite,
            &target_suite,
            &universe,
            &excuse,
            &HashMap::new(),
        );
        assert_eq!(triggers, vec!["foo/2.0".to_string()]);
    }

    #[test]
    fn dependency_on_a_new_binary_emits_its_source_trigger() {
        let mut candidate_binaries_amd64 = Map::new();
        candidate_binaries_amd64.insert(
            "foo-bin".to_string(),
            BinaryInfo {
                pkg_id: BinaryPackageId::new("foo-bin", "amd64"),
                source: "foo".into(),
            },
        );
        candidate_binaries_amd64.insert(
            "libbar2".to_string(),
            BinaryInfo {
                pkg_id: BinaryPackageId::new("libbar2", "amd64"),
                source: "bar".into(),
            },
        );
        let mut candidate_binaries = Map::new();
        candidate_binaries.insert("amd64".to_string(), candidate_binaries_amd64);

        let mut candidate_sources = Map::new();
        candidate_sources.insert(
            "bar".to_string(),
            SourceInfo {
                version: "2.5".into(),
                binaries: vec![],
                testsuite: vec![],
                testsuite_triggers: vec![],
            },
        );

        let candidate_suite = FakeSuite {
            name: "unstable".into(),
            sources: candidate_sources,
            binaries: candidate_binaries,
            empty: Map::new(),
        };

        // Target suite has neither libbar2 nor the "bar" source yet.
        let target_suite = FakeSuite {
            name: "noble".into(),
            sources: Map::new(),
            binaries: Map::new(),
            empty: Map::new(),
        };

        let mut deps = Map::new();
        deps.insert(
            "foo-bin".to_string(),
            vec![vec![BinaryPackageId::new("libbar2", "amd64")]],
        );
        let universe = FakeUniverse { deps };
        let excuse = FakeExcuse;

        let seeds = vec![BinaryPackageId::new("foo-bin", "amd64")];
        let triggers = build(
            "foo",
            "1.0",
            "amd64",
            &seeds,
            &candidate_suite,
            &target_suite,
            &universe,
            &excuse,
            &HashMap::new(),
        );
        assert!(triggers.contains(&"bar/2.5".to_string()));
        assert_eq!(triggers[0], "foo/1.0");
    }
}
