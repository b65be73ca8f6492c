//! Job types for the triangulation matching engine
//!
//! A `Job` is one container movement at a branch: either an unload
//! (port → customer, "bongkar") or a load (customer → port, "muat").
//! Records arrive pre-validated from the ingestion layer; this module
//! holds the clean domain representation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Coordinates;

// ==========================================================================
// Tests First (TDD)
// ==========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with_service(service_type: &str) -> Job {
        Job {
            id: "SOPT-1".to_string(),
            branch: "SBY".to_string(),
            customer_id: "C001".to_string(),
            location: Coordinates::new(-7.25, 112.75),
            scheduled_at: NaiveDateTime::parse_from_str("2025-03-01 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            size_tag: "20DC".to_string(),
            grade: "A".to_string(),
            service_type: service_type.to_string(),
        }
    }

    #[test]
    fn test_container_size_20_variants_map_to_20_feet() {
        assert_eq!(ContainerSize::from_tag("20DC"), ContainerSize::Feet20);
        assert_eq!(ContainerSize::from_tag("20RM"), ContainerSize::Feet20);
        assert_eq!(ContainerSize::from_tag("21DC"), ContainerSize::Feet20);
    }

    #[test]
    fn test_container_size_other_tags_map_to_40_feet() {
        assert_eq!(ContainerSize::from_tag("40HC"), ContainerSize::Feet40);
        assert_eq!(ContainerSize::from_tag("40RM"), ContainerSize::Feet40);
        assert_eq!(ContainerSize::from_tag("45G1"), ContainerSize::Feet40);
    }

    #[test]
    fn test_container_size_as_feet() {
        assert_eq!(ContainerSize::Feet20.as_feet(), 20);
        assert_eq!(ContainerSize::Feet40.as_feet(), 40);
    }

    #[test]
    fn test_direction_as_str() {
        assert_eq!(Direction::Bongkar.as_str(), "bongkar");
        assert_eq!(Direction::Muat.as_str(), "muat");
    }

    #[test]
    fn test_job_size_class_derived_from_tag() {
        let job = job_with_service("INTERCHANGE");
        assert_eq!(job.size_class(), ContainerSize::Feet20);
    }

    #[test]
    fn test_job_is_stripping_case_insensitive() {
        assert!(job_with_service("STRIPPING").is_stripping());
        assert!(job_with_service("stripping").is_stripping());
        assert!(job_with_service(" Stripping ").is_stripping());
        assert!(!job_with_service("INTERCHANGE").is_stripping());
        assert!(!job_with_service("").is_stripping());
    }
}

// ==========================================================================
// Implementation
// ==========================================================================

/// Direction of a container movement at the customer site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Unload at the customer (port → customer leg).
    Bongkar,
    /// Load at the customer (customer → port leg).
    Muat,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Bongkar => "bongkar",
            Direction::Muat => "muat",
        }
    }
}

/// Container size class used by the trucking cost model.
///
/// Size tags like "20DC" / "21DC" collapse into the 20-foot class;
/// everything else is costed as 40-foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerSize {
    Feet20,
    Feet40,
}

impl ContainerSize {
    /// Derive the size class from a raw size tag (e.g. "20DC", "40HC").
    pub fn from_tag(tag: &str) -> Self {
        if tag.contains("20") || tag.contains("21") {
            ContainerSize::Feet20
        } else {
            ContainerSize::Feet40
        }
    }

    pub fn as_feet(&self) -> u32 {
        match self {
            ContainerSize::Feet20 => 20,
            ContainerSize::Feet40 => 40,
        }
    }
}

/// A validated job record: one container to unload or load at a customer.
///
/// `branch` carries the raw branch value from upstream; normalization to
/// a branch code happens in the matching engine so that alias spellings
/// ("SURABAYA" vs "SBY") still pair up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Work order identifier (NO SOPT).
    pub id: String,
    /// Raw branch name or code as supplied upstream.
    pub branch: String,
    /// Customer identifier, used for service-duration lookups.
    pub customer_id: String,
    /// Customer site coordinates.
    pub location: Coordinates,
    /// Scheduled dispatch-from-port time for this movement.
    pub scheduled_at: NaiveDateTime,
    /// Raw container size tag (e.g. "20DC"). Pairing requires exact equality.
    pub size_tag: String,
    /// Container grade; wildcard values match any grade.
    pub grade: String,
    /// Service type tag; "STRIPPING" jobs never pool.
    pub service_type: String,
}

impl Job {
    /// Size class for cost estimation (20 vs 40 feet).
    pub fn size_class(&self) -> ContainerSize {
        ContainerSize::from_tag(&self.size_tag)
    }

    /// Stripping jobs are pure drop-offs and are excluded from pooling.
    pub fn is_stripping(&self) -> bool {
        self.service_type.trim().eq_ignore_ascii_case("STRIPPING")
    }
}
