//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::sync::Once;
use tracing::{info, warn};

use ctp_client::REQUIRED_ENV;

static INIT: Once = Once::new();

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Common bootstrap for CLI binaries:
///   * initialize dotenv/env once
///   * log a redacted snapshot of the CTP_* settings
///   * warn early about anything missing (the client build still fails hard)
pub fn bootstrap_cli(bin_name: &str) {
    init_env();
    let snapshot = env_snapshot(&REQUIRED_ENV);
    info!(target = "bootstrap", bin = bin_name, snapshot = ?snapshot, "configuration snapshot");

    let missing: Vec<&str> = REQUIRED_ENV
        .iter()
        .copied()
        .filter(|k| env_opt(k).is_none())
        .collect();
    if !missing.is_empty() {
        warn!(target = "bootstrap", bin = bin_name, missing = ?missing, "required settings missing");
    }
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Redacted `(key, value)` pairs for logging. Unset keys show as empty.
pub fn env_snapshot(keys: &[&str]) -> Vec<(String, String)> {
    keys.iter()
        .map(|&k| {
            let v = env_opt(k).unwrap_or_default();
            (k.to_string(), redact_value(k, &v))
        })
        .collect()
}

pub fn redact_value(key: &str, val: &str) -> String {
    let k = key.to_ascii_uppercase();
    let val_trim = val.trim();
    if val_trim.is_empty() {
        return String::new();
    }
    if k.contains("SECRET") || k.contains("PASSWORD") || k.contains("TOKEN") {
        return "***".to_string();
    }
    // client ids are not secret on their own but only the prefix helps debugging
    if k.ends_with("CLIENT_ID") && val_trim.chars().count() > 6 {
        let prefix: String = val_trim.chars().take(4).collect();
        return format!("{prefix}***");
    }
    val_trim.to_string()
}
