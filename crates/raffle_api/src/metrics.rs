use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

pub static API_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_api_requests_total",
        "Storefront backend requests by endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .expect("storefront api requests total")
});

pub static API_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "storefront_api_latency_seconds",
        "Storefront backend request latency in seconds",
        &["endpoint"]
    )
    .expect("storefront api latency")
});

pub fn record_request(endpoint: &str, outcome: &str, elapsed_secs: f64) {
    API_REQUESTS_TOTAL
        .with_label_values(&[endpoint, outcome])
        .inc();
    API_LATENCY_SECONDS
        .with_label_values(&[endpoint])
        .observe(elapsed_secs);
}
