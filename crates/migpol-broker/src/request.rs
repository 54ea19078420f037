use crate::error::BrokerError;
use crate::sink::{BrokerSink, PublishRequest};
use chrono::{DateTime, Utc};
use migpol_baseline::BaselineOracle;
use migpol_ingest::ObjectStoreBackend;
use migpol_model::TestStatus;
use migpol_store::{PendingStore, ResultStore};

/// What `request_test` actually did, for the caller's logging/pending-save
/// decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A usable result already existed (or the gating rules decided there
    /// was nothing new to do); no request was sent.
    NoAction,
    /// The request was already in Pending Store; nothing new was sent.
    AlreadyPending,
    /// A new request was queued and, unless `dry_run`, handed to the sink.
    Queued,
}

pub struct RequestContext<'a> {
    pub series: &'a str,
    pub uses_object_store: bool,
    pub huge: bool,
    pub ppas: &'a [String],
    pub retry_older_than_seconds: Option<i64>,
    pub dry_run: bool,
    pub now: DateTime<Utc>,
}

/// Implements spec.md §4.5's `pkg_test_request` gate for one
/// `(trigger, testsrc, arch)` leaf.
#[allow(clippy::too_many_arguments)]
pub fn request_test(
    ctx: &RequestContext,
    trigger: &str,
    testsrc: &str,
    arch: &str,
    triggers_list: &[String],
    store: &mut ResultStore,
    pending: &mut PendingStore,
    baseline: &mut BaselineOracle,
    mut object_store: Option<&mut ObjectStoreBackend>,
    sink: &mut dyn BrokerSink,
) -> Result<RequestOutcome, BrokerError> {
    let mut existing = store.get(trigger, testsrc, arch).cloned();

    if existing.is_none() && ctx.uses_object_store {
        if let Some(os) = object_store.as_deref_mut() {
            os.fetch_for(testsrc, arch, None, store, pending)?;
        }
        existing = store.get(trigger, testsrc, arch).cloned();
    }

    if let Some(result) = existing {
        let fall_through = match result.status {
            TestStatus::OldPass | TestStatus::OldNeutral | TestStatus::OldFail => true,
            TestStatus::Fail => {
                let baseline_result = baseline.baseline_for(store, testsrc, arch);
                let retry_eligible = baseline_result.status.is_non_failing()
                    && ctx
                        .retry_older_than_seconds
                        .map(|secs| result.timestamp + secs < ctx.now.timestamp())
                        .unwrap_or(false);
                if retry_eligible {
                    true
                } else if !ctx.uses_object_store {
                    return Ok(RequestOutcome::NoAction);
                } else {
                    true
                }
            }
            TestStatus::Pass | TestStatus::Neutral => return Ok(RequestOutcome::NoAction),
            TestStatus::None => true,
        };
        debug_assert!(fall_through);
    }

    if pending.contains(trigger, testsrc, arch) {
        return Ok(RequestOutcome::AlreadyPending);
    }
    pending.add(trigger, testsrc, arch);

    if !ctx.dry_run {
        let request = PublishRequest {
            src: testsrc,
            arch,
            series: ctx.series,
            triggers: triggers_list,
            ppas: ctx.ppas,
            huge: ctx.huge,
            submit_time: ctx.now,
        };
        sink.publish(&request)?;
    }

    Ok(RequestOutcome::Queued)
}
