//! Logging and metrics setup

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

pub const CHAT_REQUESTS: &str = "aura_chat_requests_total";
pub const CRISIS_OVERRIDES: &str = "aura_crisis_overrides_total";
pub const RESPONSES: &str = "aura_responses_total";
pub const GENERATION_FAILURES: &str = "aura_generation_failures_total";
pub const TRANSLATION_FAILURES: &str = "aura_translation_failures_total";
pub const CLASSIFIER_FAILURES: &str = "aura_classifier_failures_total";
pub const CLASSIFIER_LATENCY: &str = "aura_classifier_latency_us";

/// Initialize tracing/logging
pub fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("aura=debug,aura_server=debug,aura_classifiers=debug,aura_responses=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("aura_server=info,aura_classifiers=info,aura_responses=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Install the Prometheus recorder and return the handle for rendering
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(CHAT_REQUESTS, "Total number of chat requests received");
    metrics::describe_counter!(
        CRISIS_OVERRIDES,
        "Chat requests where a crisis phrase forced the distress override"
    );
    metrics::describe_counter!(RESPONSES, "Replies sent, by response source");
    metrics::describe_counter!(
        GENERATION_FAILURES,
        "Hosted generation calls that failed and fell back to the local responder"
    );
    metrics::describe_counter!(
        TRANSLATION_FAILURES,
        "Translations that failed and returned the English reply"
    );
    metrics::describe_counter!(
        CLASSIFIER_FAILURES,
        "Distress classifier runs that failed and were treated as no signal"
    );
    metrics::describe_histogram!(
        CLASSIFIER_LATENCY,
        metrics::Unit::Microseconds,
        "Distress classifier latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
