//! Shared User-Agent string for measurement and discovery HTTP clients.
//!
//! Single source for the UA format so stream and bootstrap traffic stay
//! consistent and easy to update.

/// Default User-Agent for every request the tool makes.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("fast/{version} (bandwidth-estimator)")
}
