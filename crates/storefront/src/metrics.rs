use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};

pub static STORE_LOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_store_loads_total",
        "Prize store load cycles grouped by outcome",
        &["outcome"]
    )
    .expect("storefront store loads total")
});

pub static STORE_LOAD_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "storefront_store_load_duration_seconds",
        "Duration of a full prize store load in seconds",
        vec![0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
    )
    .expect("storefront store load duration")
});

pub static BOARD_PRIZES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "storefront_board_instant_prizes",
        "Instant prizes on the published board"
    )
    .expect("storefront board prizes gauge")
});

pub static BOARD_AWARDED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "storefront_board_awarded_prizes",
        "Awarded instant prizes on the published board"
    )
    .expect("storefront board awarded gauge")
});

pub static WINNER_NAMES_RESOLVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_winner_names_resolved_total",
        "Awarded prizes by where their winner name came from",
        &["source"]
    )
    .expect("storefront winner names resolved")
});

pub static PAYMENT_POLLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_payment_polls_total",
        "Payment status polls grouped by observed status",
        &["status"]
    )
    .expect("storefront payment polls")
});

pub static PAYMENT_OUTCOMES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_payment_outcomes_total",
        "How payment waits ended",
        &["outcome"]
    )
    .expect("storefront payment outcomes")
});

pub fn publish_board_counts(total: usize, awarded: usize) {
    BOARD_PRIZES.set(total as i64);
    BOARD_AWARDED.set(awarded as i64);
}
