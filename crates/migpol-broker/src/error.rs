#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("unsupported broker URL scheme: {0}")]
    UnknownScheme(String),

    #[error("broker publish failed: {0}")]
    Transport(#[source] anyhow::Error),

    #[error(transparent)]
    Ingest(#[from] migpol_ingest::IngestError),

    #[error("I/O error writing file sink: {0}")]
    Io(#[from] std::io::Error),
}
