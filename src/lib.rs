#![doc(test(attr(deny(warnings))))]

//! Shared Ledger keeps the books for a household that shares expenses: even and custom
//! splits, multi-currency normalization, recurring charges, settlement views, CSV
//! interchange and a small experience score for manual bookkeeping.

pub mod assist;
pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod io;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Shared Ledger tracing initialized.");
    });
}
