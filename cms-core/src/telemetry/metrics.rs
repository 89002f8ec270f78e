//! Prometheus metrics setup and metric definitions

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "cms_http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "cms_http_request_duration_seconds";
pub const HTTP_REQUESTS_IN_FLIGHT: &str = "cms_http_requests_in_flight";
pub const AUTHORIZATION_CHECKS_TOTAL: &str = "cms_authorization_checks_total";
pub const SOFT_DELETES_TOTAL: &str = "cms_soft_deletes_total";

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    let buckets = [
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets(&buckets)?
        .install_recorder()?;
    Ok(handle)
}

/// Register metric descriptions and emit initial zero values so the exposition
/// carries HELP/TYPE lines from startup.
pub fn describe_metrics() {
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        HTTP_REQUESTS_IN_FLIGHT,
        "Number of HTTP requests currently being processed"
    );

    describe_counter!(
        AUTHORIZATION_CHECKS_TOTAL,
        "Permission checks by evaluation path (claims/store) and outcome"
    );
    describe_counter!(
        SOFT_DELETES_TOTAL,
        "Entities moved to the recycle bin, by entity type"
    );

    counter!(AUTHORIZATION_CHECKS_TOTAL, "path" => "claims", "result" => "granted").absolute(0);
    counter!(AUTHORIZATION_CHECKS_TOTAL, "path" => "store", "result" => "granted").absolute(0);
    counter!(SOFT_DELETES_TOTAL, "entity" => "permission").absolute(0);
    counter!(SOFT_DELETES_TOTAL, "entity" => "role").absolute(0);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => "GET", "path" => "/health").record(0.0);
    gauge!(HTTP_REQUESTS_IN_FLIGHT).set(0.0);
}

/// `path` is `claims` for token-backed checks and `store` for lookups.
pub fn record_authorization_check(path: &'static str, granted: bool) {
    let result = if granted { "granted" } else { "denied" };
    counter!(AUTHORIZATION_CHECKS_TOTAL, "path" => path, "result" => result).increment(1);
}

pub fn record_soft_delete(entity: &'static str) {
    counter!(SOFT_DELETES_TOTAL, "entity" => entity).increment(1);
}
