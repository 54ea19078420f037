//! Test Requester (spec.md §4.5): decides whether a `(trigger, testsrc,
//! arch)` leaf needs a fresh autopkgtest run requested, and delivers the
//! request to whichever [`sink::BrokerSink`] the configured broker URL
//! selects.

mod error;
mod request;
mod sink;

pub use error::BrokerError;
pub use request::{request_test, RequestContext, RequestOutcome};
pub use sink::{queue_name, routing_key, AmqpSink, BrokerSink, FileSink, PublishRequest};

/// Construct the sink implied by a broker URL's scheme (`amqp://` or
/// `file://`), matching spec.md §6's `adt_amqp` configuration knob.
pub fn sink_for_url(url: &str) -> Result<Box<dyn BrokerSink>, BrokerError> {
    if let Some(path) = url.strip_prefix("file://") {
        Ok(Box::new(FileSink::new(std::path::PathBuf::from(path))))
    } else if url.starts_with("amqp://") || url.starts_with("amqps://") {
        let sink = AmqpSink::connect(url).map_err(BrokerError::Transport)?;
        Ok(Box::new(sink))
    } else {
        Err(BrokerError::UnknownScheme(url.to_string()))
    }
}
