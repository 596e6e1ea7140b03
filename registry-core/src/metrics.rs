//! Prometheus metrics for the registry
//!
//! # Metrics
//!
//! - `registry_operations_accepted_total{op}` - Accepted mutations by operation
//! - `registry_operations_rejected_total{op,kind}` - Rejected mutations by error kind
//! - `registry_audit_entries_total` - Audit entries appended
//! - `registry_fees_collected_total` - Fees credited to escrow

use prometheus::{CounterVec, IntCounter, IntCounterVec, Opts, Registry as PrometheusRegistry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Accepted mutations, labelled by operation
    pub accepted: IntCounterVec,

    /// Rejected mutations, labelled by operation and error kind
    pub rejected: IntCounterVec,

    /// Audit entries appended
    pub audit_entries: IntCounter,

    /// Fees credited to escrow, labelled by workflow
    pub fees_collected: CounterVec,

    /// Prometheus registry for scraping
    pub registry: Arc<PrometheusRegistry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(PrometheusRegistry::new());

        let accepted = IntCounterVec::new(
            Opts::new(
                "registry_operations_accepted_total",
                "Accepted mutations by operation",
            ),
            &["op"],
        )?;
        registry.register(Box::new(accepted.clone()))?;

        let rejected = IntCounterVec::new(
            Opts::new(
                "registry_operations_rejected_total",
                "Rejected mutations by operation and error kind",
            ),
            &["op", "kind"],
        )?;
        registry.register(Box::new(rejected.clone()))?;

        let audit_entries = IntCounter::new(
            "registry_audit_entries_total",
            "Audit entries appended",
        )?;
        registry.register(Box::new(audit_entries.clone()))?;

        let fees_collected = CounterVec::new(
            Opts::new(
                "registry_fees_collected_total",
                "Fees credited to escrow by workflow",
            ),
            &["workflow"],
        )?;
        registry.register(Box::new(fees_collected.clone()))?;

        Ok(Self {
            accepted,
            rejected,
            audit_entries,
            fees_collected,
            registry,
        })
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}
