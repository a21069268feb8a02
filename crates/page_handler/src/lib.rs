//! Activity coordination for the recolorization engine.
//!
//! This crate turns the host's stream of activity signals (timers, frames,
//! mutations, visibility changes, load events) into a bounded number of
//! serialized recolorization passes. It owns the debounce window, the queued
//! pass slot and the visibility gate, and drives [`recolor::Recolorizer`] one
//! batch per cooperative tick.

use anyhow::{Context as _, Result};
use host::{ActivityHub, DocumentHost, StyleSheetHost};
use log::info;

pub mod config;
pub mod runtime;
pub mod scheduler;

pub use config::RecolorConfig;
pub use runtime::{Coordinator, CoordinatorStats, Shutdown};
pub use scheduler::{Admission, AdmissionGate, Debouncer, Suppression};

/// Entry point for an injection layer: recolorize `host` for the lifetime of
/// the page, configured from the environment. Never returns on success.
///
/// # Errors
/// Returns an error only if the coordinator loses track of its own pass state.
pub async fn recolorize<H>(host: H, hub: ActivityHub) -> Result<()>
where
    H: DocumentHost + StyleSheetHost,
{
    let config = RecolorConfig::from_env();
    info!(
        "recolorizing with batch width {} and a {} ms window",
        config.batch_width,
        config.debounce_ms
    );
    Coordinator::new(host, hub, &config)
        .run_forever()
        .await
        .map(drop)
        .context("recolorization coordinator stopped")
}
