#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error(transparent)]
    Ingest(#[from] migpol_ingest::IngestError),

    #[error(transparent)]
    Broker(#[from] migpol_broker::BrokerError),

    #[error(transparent)]
    Verdict(#[from] migpol_verdict::VerdictError),
}
