//! Telemetry about the lifecycle of tokens.
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::Counter;
use prometheus::CounterVec;
use prometheus::Opts;

use warden_errors::TokenExpired;
use warden_errors::TokenNotFound;
use warden_errors::TokenRevoked;

/// Number of tokens issued.
pub static TOKENS_ISSUED: Lazy<Counter> = Lazy::new(|| {
    Counter::new("warden_tokens_issued", "Number of tokens issued")
        .expect("failed to initialise TOKENS_ISSUED counter")
});

/// Number of token lookups.
pub static TOKENS_LOOKUP: Lazy<Counter> = Lazy::new(|| {
    Counter::new("warden_tokens_lookup", "Number of token lookups")
        .expect("failed to initialise TOKENS_LOOKUP counter")
});

/// Number of token lookups that failed, by reason.
pub static TOKENS_LOOKUP_ERR: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        Opts::new(
            "warden_tokens_lookup_error",
            "Number of token lookups that failed, by reason",
        ),
        &["reason"],
    )
    .expect("failed to initialise TOKENS_LOOKUP_ERR counter")
});

/// Number of tokens renewed.
pub static TOKENS_RENEWED: Lazy<Counter> = Lazy::new(|| {
    Counter::new("warden_tokens_renewed", "Number of tokens renewed")
        .expect("failed to initialise TOKENS_RENEWED counter")
});

/// Number of tokens revoked.
pub static TOKENS_REVOKED: Lazy<Counter> = Lazy::new(|| {
    Counter::new("warden_tokens_revoked", "Number of tokens revoked")
        .expect("failed to initialise TOKENS_REVOKED counter")
});

/// Number of revoked or expired tokens removed from the store.
pub static TOKENS_TIDIED: Lazy<Counter> = Lazy::new(|| {
    Counter::new(
        "warden_tokens_tidied",
        "Number of revoked or expired tokens removed from the store",
    )
    .expect("failed to initialise TOKENS_TIDIED counter")
});

/// Ensure metrics are registered only once.
static METRICS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// The first time this method is called it will register the token metrics.
pub fn register_metrics(reg: &prometheus::Registry) -> Result<()> {
    // Skip registration if already done before.
    if METRICS_REGISTERED.swap(true, Ordering::AcqRel) {
        return Ok(());
    }

    let collectors: [Box<dyn prometheus::core::Collector>; 6] = [
        Box::new(TOKENS_ISSUED.clone()),
        Box::new(TOKENS_LOOKUP.clone()),
        Box::new(TOKENS_LOOKUP_ERR.clone()),
        Box::new(TOKENS_RENEWED.clone()),
        Box::new(TOKENS_REVOKED.clone()),
        Box::new(TOKENS_TIDIED.clone()),
    ];
    for collector in collectors {
        reg.register(collector)?;
    }
    Ok(())
}

/// Count a failed lookup under the reason matching the error.
pub fn count_lookup_error(error: &anyhow::Error) {
    let reason = if error.is::<TokenNotFound>() {
        "not_found"
    } else if error.is::<TokenExpired>() {
        "expired"
    } else if error.is::<TokenRevoked>() {
        "revoked"
    } else {
        "other"
    };
    TOKENS_LOOKUP_ERR.with_label_values(&[reason]).inc();
}
