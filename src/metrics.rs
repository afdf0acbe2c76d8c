//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Session Metrics
    pub static ref SESSIONS_ISSUED_TOTAL: IntCounter = IntCounter::new(
        "storefront_sessions_issued_total",
        "Total number of session tokens issued"
    ).expect("metric can be created");
    pub static ref SESSIONS_REVOKED_TOTAL: IntCounter = IntCounter::new(
        "storefront_sessions_revoked_total",
        "Total number of sessions revoked by logout"
    ).expect("metric can be created");
    pub static ref AUTH_REJECTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("storefront_auth_rejections_total", "Total number of rejected authentication attempts"),
        &["reason"]
    ).expect("metric can be created");

    // Commerce Metrics
    pub static ref ORDERS_PLACED_TOTAL: IntCounter = IntCounter::new(
        "storefront_orders_placed_total",
        "Total number of orders placed"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("storefront_errors_total", "Total number of error responses"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
///
/// Safe to call more than once; duplicate registrations are logged and skipped.
pub fn init_metrics() {
    let collectors: [(&str, Box<dyn prometheus::core::Collector>); 5] = [
        ("SESSIONS_ISSUED_TOTAL", Box::new(SESSIONS_ISSUED_TOTAL.clone())),
        ("SESSIONS_REVOKED_TOTAL", Box::new(SESSIONS_REVOKED_TOTAL.clone())),
        ("AUTH_REJECTIONS_TOTAL", Box::new(AUTH_REJECTIONS_TOTAL.clone())),
        ("ORDERS_PLACED_TOTAL", Box::new(ORDERS_PLACED_TOTAL.clone())),
        ("ERRORS_TOTAL", Box::new(ERRORS_TOTAL.clone())),
    ];

    for (name, collector) in collectors {
        if let Err(error) = REGISTRY.register(collector) {
            tracing::warn!(metric = name, %error, "Metric registration skipped");
        }
    }

    tracing::info!("Metrics registry initialized");
}
