/// Errors the ingest backends can raise.
///
/// Per the error-handling design: a missing container (HTTP 401) is not an
/// error at all and never reaches this type; only genuinely fatal
/// conditions (anything that should abort the whole run) are represented
/// here, so a caller that sees `Err` knows to propagate it all the way out
/// rather than log-and-continue.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("ingest failed for {src}/{arch}: {source}")]
    Fatal {
        src: String,
        arch: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unsupported swift URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl IngestError {
    pub fn fatal(src: &str, arch: &str, source: anyhow::Error) -> Self {
        IngestError::Fatal {
            src: src.to_string(),
            arch: arch.to_string(),
            source,
        }
    }
}
