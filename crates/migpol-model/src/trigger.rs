/// Sentinel trigger used for baseline reference runs.
pub const REFERENCE_TRIGGER: &str = "migration-reference/0";

/// Split a `"<source>/<version>"` trigger string into its parts.
///
/// Returns `None` for malformed triggers (no `/`), which callers must log
/// and drop rather than panic on.
pub fn split(trigger: &str) -> Option<(&str, &str)> {
    trigger.split_once('/')
}

/// Format a `(source, version)` pair as a trigger string.
pub fn format(source: &str, version: &str) -> String {
    format!("{source}/{version}")
}

/// Archive hash-prefix bucket for a source package name: `lib*` packages use
/// their first four characters, everything else uses just the first.
pub fn srchash(src: &str) -> &str {
    if src.starts_with("lib") {
        &src[..src.len().min(4)]
    } else {
        &src[..src.len().min(1)]
    }
}
