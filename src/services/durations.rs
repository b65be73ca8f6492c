//! Customer service-duration profiles
//!
//! Expected unload/load hours per customer, aggregated offline from
//! historical work orders into a JSON lookup. Resolution is three-tier:
//! customer-at-branch entry, then branch default, then the global
//! default. Loaded once at startup and shared read-only.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::defaults::DEFAULT_SERVICE_HOURS;
use crate::types::{Direction, TimeProfile, TimeProfileSource};

/// One aggregated duration entry (per customer-at-branch or per branch).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DurationEntry {
    #[serde(default)]
    pub median_bongkar_hours: Option<f64>,
    #[serde(default)]
    pub median_muat_hours: Option<f64>,
    #[serde(default)]
    pub mode_hour_bongkar: Option<f64>,
    #[serde(default)]
    pub mode_hour_muat: Option<f64>,
    #[serde(default)]
    pub hour_distribution_bongkar: HashMap<String, u32>,
    #[serde(default)]
    pub hour_distribution_muat: HashMap<String, u32>,
    #[serde(default)]
    pub count_hours_bongkar: u32,
    #[serde(default)]
    pub count_hours_muat: u32,
}

impl DurationEntry {
    fn median_hours(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Bongkar => self.median_bongkar_hours,
            Direction::Muat => self.median_muat_hours,
        }
    }

    fn mode_hour(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Bongkar => self.mode_hour_bongkar,
            Direction::Muat => self.mode_hour_muat,
        }
    }

    fn distribution(&self, direction: Direction) -> &HashMap<String, u32> {
        match direction {
            Direction::Bongkar => &self.hour_distribution_bongkar,
            Direction::Muat => &self.hour_distribution_muat,
        }
    }

    fn sample_count(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Bongkar => self.count_hours_bongkar,
            Direction::Muat => self.count_hours_muat,
        }
    }
}

/// Service-duration lookup store.
///
/// Customer entries are keyed `"<CUST ID>__<branch code>"` because the
/// same customer can behave differently per branch depot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DurationStore {
    #[serde(default)]
    customers: HashMap<String, DurationEntry>,
    #[serde(default)]
    cabang_defaults: HashMap<String, DurationEntry>,
    #[serde(default)]
    global_default: Option<f64>,
}

impl DurationStore {
    /// Load the lookup from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read duration lookup {}", path.display()))?;
        let store: DurationStore = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse duration lookup {}", path.display()))?;
        info!(
            "Duration lookup loaded: {} customers, {} branch defaults",
            store.customers.len(),
            store.cabang_defaults.len()
        );
        Ok(store)
    }

    /// Load the lookup if a path is configured and readable, otherwise
    /// fall back to an empty store (global default only).
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::from_file(path) {
                Ok(store) => store,
                Err(e) => {
                    warn!("{:#}. Using global duration defaults.", e);
                    Self::default()
                }
            },
            None => {
                warn!("Duration lookup not configured. Using global duration defaults.");
                Self::default()
            }
        }
    }

    fn composite_key(customer_id: &str, branch: &str) -> String {
        format!("{}__{}", customer_id, branch)
    }

    /// Expected service duration in hours for a customer at a branch.
    ///
    /// Always positive: falls through customer entry, branch default, and
    /// finally the global default.
    pub fn expected_hours(&self, customer_id: &str, branch: &str, direction: Direction) -> f64 {
        let key = Self::composite_key(customer_id, branch);
        if let Some(hours) = self.customers.get(&key).and_then(|e| e.median_hours(direction)) {
            return hours;
        }
        if let Some(hours) = self
            .cabang_defaults
            .get(branch)
            .and_then(|e| e.median_hours(direction))
        {
            return hours;
        }
        self.global_default.unwrap_or(DEFAULT_SERVICE_HOURS)
    }

    /// Historical hour-of-day profile for reporting. Never affects
    /// matching decisions, only what dispatchers see on the result.
    pub fn time_profile(&self, customer_id: &str, branch: &str, direction: Direction) -> TimeProfile {
        let key = Self::composite_key(customer_id, branch);
        if let Some(entry) = self.customers.get(&key) {
            if let Some(mode_hour) = entry.mode_hour(direction) {
                return TimeProfile {
                    mode_hour: Some(mode_hour),
                    distribution: entry.distribution(direction).clone(),
                    sample_count: entry.sample_count(direction),
                    source: TimeProfileSource::Customer,
                };
            }
        }
        if let Some(entry) = self.cabang_defaults.get(branch) {
            if let Some(mode_hour) = entry.mode_hour(direction) {
                return TimeProfile {
                    mode_hour: Some(mode_hour),
                    distribution: HashMap::new(),
                    sample_count: 0,
                    source: TimeProfileSource::CabangDefault,
                };
            }
        }
        TimeProfile::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> DurationStore {
        serde_json::from_str(
            r#"{
                "customers": {
                    "C001__SBY": {
                        "median_bongkar_hours": 3.5,
                        "median_muat_hours": 2.0,
                        "mode_hour_bongkar": 9,
                        "hour_distribution_bongkar": {"8": 4, "9": 11, "10": 2},
                        "count_hours_bongkar": 17
                    }
                },
                "cabang_defaults": {
                    "SBY": {
                        "median_bongkar_hours": 4.25,
                        "median_muat_hours": 4.0,
                        "mode_hour_muat": 14
                    }
                },
                "global_default": 5.0
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_expected_hours_prefers_customer_entry() {
        let store = sample_store();
        let hours = store.expected_hours("C001", "SBY", Direction::Bongkar);
        assert!((hours - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_expected_hours_falls_back_to_branch_default() {
        let store = sample_store();
        let hours = store.expected_hours("C999", "SBY", Direction::Bongkar);
        assert!((hours - 4.25).abs() < 1e-9);
    }

    #[test]
    fn test_expected_hours_falls_back_to_global_default() {
        let store = sample_store();
        let hours = store.expected_hours("C999", "MKS", Direction::Muat);
        assert!((hours - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_expected_hours_empty_store_uses_builtin_default() {
        let store = DurationStore::default();
        let hours = store.expected_hours("C001", "SBY", Direction::Bongkar);
        assert!((hours - DEFAULT_SERVICE_HOURS).abs() < 1e-9);
    }

    #[test]
    fn test_time_profile_from_customer_entry() {
        let store = sample_store();
        let profile = store.time_profile("C001", "SBY", Direction::Bongkar);
        assert_eq!(profile.source, TimeProfileSource::Customer);
        assert_eq!(profile.mode_hour, Some(9.0));
        assert_eq!(profile.sample_count, 17);
        assert_eq!(profile.distribution.get("9"), Some(&11));
    }

    #[test]
    fn test_time_profile_from_branch_default_has_no_distribution() {
        let store = sample_store();
        // C001 has no muat mode hour, so the branch default applies
        let profile = store.time_profile("C001", "SBY", Direction::Muat);
        assert_eq!(profile.source, TimeProfileSource::CabangDefault);
        assert_eq!(profile.mode_hour, Some(14.0));
        assert!(profile.distribution.is_empty());
        assert_eq!(profile.sample_count, 0);
    }

    #[test]
    fn test_time_profile_none_when_unknown() {
        let store = sample_store();
        let profile = store.time_profile("C999", "MKS", Direction::Bongkar);
        assert_eq!(profile.source, TimeProfileSource::None);
        assert_eq!(profile.mode_hour, None);
    }
}
