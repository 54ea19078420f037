use crate::error::BrokerError;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::PathBuf;

/// One outbound test request, fully assembled and ready for a sink to
/// serialize and deliver.
pub struct PublishRequest<'a> {
    pub src: &'a str,
    pub arch: &'a str,
    pub series: &'a str,
    pub triggers: &'a [String],
    pub ppas: &'a [String],
    pub huge: bool,
    pub submit_time: DateTime<Utc>,
}

/// `"ppa"` when any PPA is configured, else `"huge"` for an oversized batch,
/// else empty — selects the queue segment of the AMQP routing key and the
/// `<queue>:` prefix of the file-sink line.
pub fn queue_name(ppas: &[String], huge: bool) -> &'static str {
    if !ppas.is_empty() {
        "ppa"
    } else if huge {
        "huge"
    } else {
        ""
    }
}

pub fn routing_key(req: &PublishRequest) -> String {
    format!(
        "debci-{}-{}-{}",
        queue_name(req.ppas, req.huge),
        req.series,
        req.arch
    )
}

/// Delivery target for an assembled test request: either an AMQP broker or
/// a local append-only file, selected by the configured URL scheme.
pub trait BrokerSink {
    fn publish(&mut self, req: &PublishRequest) -> Result<(), BrokerError>;

    /// `true` if a successful publish must be followed by an atomic
    /// Pending Store persist (AMQP mode only, to bound re-queue damage on
    /// crash).
    fn requires_pending_persist(&self) -> bool {
        false
    }
}

/// `file://...` sink: appends one line per request, never persists Pending
/// Store itself (the file-backend ingest path reconstructs it wholesale on
/// the next run instead).
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        FileSink { path }
    }
}

impl BrokerSink for FileSink {
    fn publish(&mut self, req: &PublishRequest) -> Result<(), BrokerError> {
        let queue = queue_name(req.ppas, req.huge);
        let body = body_json(req, true);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{queue}:{} {body}", req.src)?;
        Ok(())
    }
}

/// `amqp://...` sink: `basic.publish` with persistent delivery to the
/// routing key derived from [`routing_key`].
pub struct AmqpSink {
    channel: amiquip::Channel,
    _connection: amiquip::Connection,
}

impl AmqpSink {
    pub fn connect(amqp_url: &str) -> anyhow::Result<Self> {
        let mut connection = amiquip::Connection::insecure_open(amqp_url)?;
        let channel = connection.open_channel(None)?;
        Ok(AmqpSink {
            channel,
            _connection: connection,
        })
    }
}

impl BrokerSink for AmqpSink {
    fn publish(&mut self, req: &PublishRequest) -> Result<(), BrokerError> {
        let routing_key = routing_key(req);
        let body = format!("{}\n{}", req.src, body_json(req, false));
        let exchange = amiquip::Exchange::direct(&self.channel);
        exchange
            .publish(amiquip::Publish::with_properties(
                body.as_bytes(),
                routing_key,
                amiquip::AmqpProperties::default().with_delivery_mode(2),
            ))
            .map_err(|e| BrokerError::Transport(anyhow::Error::new(e)))
    }

    fn requires_pending_persist(&self) -> bool {
        true
    }
}

/// Build the request body: `triggers`, `ppas` (if any), and `submit-time`.
///
/// `triggers_as_one_joined_string` mirrors the file-sink's historical quirk
/// of serializing the trigger list as a single space-joined element rather
/// than one element per trigger.
fn body_json(req: &PublishRequest, triggers_as_one_joined_string: bool) -> String {
    let mut obj = serde_json::Map::new();
    let triggers_value = if triggers_as_one_joined_string {
        serde_json::json!([req.triggers.join(" ")])
    } else {
        serde_json::json!(req.triggers)
    };
    obj.insert("triggers".to_string(), triggers_value);
    if !req.ppas.is_empty() {
        obj.insert("ppas".to_string(), serde_json::json!(req.ppas));
    }
    obj.insert(
        "submit-time".to_string(),
        serde_json::json!(req.submit_time.format("%Y-%m-%d %H:%M:%S%z").to_string()),
    );
    serde_json::Value::Object(obj).to_string()
}
