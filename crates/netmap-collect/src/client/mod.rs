//! Controller API clients.
//!
//! Clients never let a controller failure escape as an error to the caller of
//! [`SourceOutcome`]-returning methods: an unreachable controller becomes
//! [`SourceOutcome::Failed`], which the pipeline treats as an empty list.

mod uisp;
mod unifi;

pub use uisp::{UispClient, UispConfig, UISP_API_PREFIX};
pub use unifi::{ControllerFlavor, UnifiClient, UnifiConfig};

use netmap_metrics::metric_defs;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout applied to every controller request.
pub const CONTROLLER_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one best-effort fetch from a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    /// Records were returned.
    Fetched(T),
    /// The controller answered with nothing.
    Empty,
    /// The controller could not be reached or refused the request.
    Failed(String),
}

impl<T> SourceOutcome<Vec<T>> {
    /// `Empty` for an empty list, `Fetched` otherwise.
    pub fn from_list(records: Vec<T>) -> Self {
        if records.is_empty() {
            SourceOutcome::Empty
        } else {
            SourceOutcome::Fetched(records)
        }
    }

    /// Convert a fallible fetch.
    pub fn from_result<E: std::fmt::Display>(result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(records) => Self::from_list(records),
            Err(e) => SourceOutcome::Failed(e.to_string()),
        }
    }

    /// Number of records fetched.
    pub fn len(&self) -> usize {
        match self {
            SourceOutcome::Fetched(records) => records.len(),
            _ => 0,
        }
    }

    /// Whether no records were fetched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log and count the outcome under `source`.
    pub fn observe(self, source: &'static str) -> Self {
        match &self {
            SourceOutcome::Fetched(records) => {
                info!(source, records = records.len(), "Fetched records");
                metrics::counter!(metric_defs::SOURCE_RECORDS.name, "source" => source)
                    .increment(records.len() as u64);
            }
            SourceOutcome::Empty => info!(source, "Source returned no records"),
            SourceOutcome::Failed(reason) => {
                warn!(source, %reason, "Source unavailable");
                metrics::counter!(metric_defs::SOURCE_FAILURES.name, "source" => source).increment(1);
            }
        }
        self
    }
}

impl<T> SourceOutcome<T> {
    /// Whether the fetch failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed(_))
    }
}

impl<T: Default> SourceOutcome<T> {
    /// The fetched value, or the default for `Empty`/`Failed`.
    pub fn into_inner_or_default(self) -> T {
        match self {
            SourceOutcome::Fetched(value) => value,
            SourceOutcome::Empty | SourceOutcome::Failed(_) => T::default(),
        }
    }
}

/// Deserialize each element, skipping (and logging) those that don't fit `T`.
pub fn parse_records<T: DeserializeOwned>(values: Vec<Value>, source: &str) -> Vec<T> {
    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(source, index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();
    if records.len() < total {
        warn!(source, skipped = total - records.len(), "Skipped malformed records");
    }
    records
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::UnifiDevice;
    use serde_json::json;

    #[test]
    fn test_outcome_from_list() {
        assert_eq!(SourceOutcome::<Vec<u8>>::from_list(vec![]), SourceOutcome::Empty);
        assert_eq!(SourceOutcome::from_list(vec![1]), SourceOutcome::Fetched(vec![1]));
    }

    #[test]
    fn test_failed_outcome_is_empty_list() {
        let outcome: SourceOutcome<Vec<u8>> =
            SourceOutcome::from_result(Err::<Vec<u8>, _>("connection refused"));
        assert!(outcome.is_failed());
        assert!(outcome.is_empty());
        assert!(outcome.into_inner_or_default().is_empty());
    }

    #[test]
    fn test_parse_records_skips_malformed() {
        let values = vec![
            json!({"name": "AP", "mac": "aa"}),
            json!("not an object"),
            json!({"name": "Switch", "uplink": "bogus"}),
            json!({"mac": "bb"}),
        ];
        let devices: Vec<UnifiDevice> = parse_records(values, "unifi");
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].display_name().as_deref(), Some("bb"));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://host/", "/api/login"), "https://host/api/login");
        assert_eq!(join_url("https://host", "/api/login"), "https://host/api/login");
    }
}
