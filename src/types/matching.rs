//! Result types for the triangulation matching engine
//!
//! Field names and nesting mirror the payload the dispatch frontend
//! already consumes, so the serialized shape is a compatibility surface.
//! Distances are kilometers, costs are rupiah, times are naive local
//! timestamps formatted as `%Y-%m-%d %H:%M:%S`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ==========================================================================
// Tests First (TDD)
// ==========================================================================


// ==========================================================================
// Feasibility vocabulary
// ==========================================================================

/// Pooling feasibility category for a candidate pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolCategory {
    /// Timing works as scheduled, idle stays within tolerance.
    Optimal,
    /// Truck would arrive late; recoverable by shifting a schedule.
    LateShiftPossible,
    /// Idle exceeds tolerance; reducible by shifting a schedule.
    IdleReducePossible,
    /// No bounded shift makes the pairing work.
    Unfeasible,
}

impl PoolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolCategory::Optimal => "OPTIMAL",
            PoolCategory::LateShiftPossible => "LATE_SHIFT_POSSIBLE",
            PoolCategory::IdleReducePossible => "IDLE_REDUCE_POSSIBLE",
            PoolCategory::Unfeasible => "UNFEASIBLE",
        }
    }
}

/// Schedule adjustment that makes (or keeps) a pairing viable.
///
/// Wire tokens keep the operational Indonesian vocabulary: mundur = push
/// back, maju = bring forward, bongkar = unload, muat = load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftAction {
    #[serde(rename = "MUNDUR_MUAT")]
    DelayLoad,
    #[serde(rename = "MAJU_BONGKAR")]
    AdvanceUnload,
    #[serde(rename = "MAJU_MUAT")]
    AdvanceLoad,
    #[serde(rename = "MUNDUR_BONGKAR")]
    DelayUnload,
    #[serde(rename = "PERFECT")]
    Perfect,
}

impl ShiftAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftAction::DelayLoad => "MUNDUR_MUAT",
            ShiftAction::AdvanceUnload => "MAJU_BONGKAR",
            ShiftAction::AdvanceLoad => "MAJU_MUAT",
            ShiftAction::DelayUnload => "MUNDUR_BONGKAR",
            ShiftAction::Perfect => "PERFECT",
        }
    }
}

// ==========================================================================
// Service-time reporting
// ==========================================================================

/// Historical service-hour profile attached to a match for dispatcher context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeProfile {
    /// Most common hour-of-day for this service, if known.
    pub mode_hour: Option<f64>,
    /// Hour-of-day histogram (keys "0".."23").
    #[serde(default)]
    pub distribution: HashMap<String, u32>,
    /// Number of historical samples behind the profile.
    #[serde(default)]
    pub sample_count: u32,
    /// Where the profile came from.
    pub source: TimeProfileSource,
}

impl TimeProfile {
    /// Empty profile used when no historical data exists.
    pub fn none() -> Self {
        Self {
            mode_hour: None,
            distribution: HashMap::new(),
            sample_count: 0,
            source: TimeProfileSource::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeProfileSource {
    Customer,
    CabangDefault,
    None,
}

// ==========================================================================
// Result payload
// ==========================================================================

/// One matched (unload, load) pair with every figure the dispatcher sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPair {
    #[serde(rename = "DEST_ID")]
    pub dest_id: String,
    #[serde(rename = "ORIG_ID")]
    pub orig_id: String,
    /// Normalized branch code both jobs belong to.
    #[serde(rename = "CABANG")]
    pub cabang: String,
    #[serde(rename = "SIZE_CONT")]
    pub size_cont: String,
    #[serde(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "KATEGORI_POOL")]
    pub kategori_pool: PoolCategory,
    /// Port → unload → load → port distance (km).
    #[serde(rename = "JARAK_TRIANGULASI")]
    pub jarak_triangulasi: f64,
    /// Four-leg distance when the truck returns via the port (km).
    #[serde(rename = "JARAK_VIA_PORT")]
    pub jarak_via_port: f64,
    /// Direct unload → load leg only (km).
    #[serde(rename = "JARAK_BONGKAR_MUAT")]
    pub jarak_bongkar_muat: f64,
    #[serde(rename = "SAVING_KM")]
    pub saving_km: f64,
    #[serde(rename = "COST_TRIANGULASI")]
    pub cost_triangulasi: i64,
    #[serde(rename = "COST_VIA_PORT")]
    pub cost_via_port: i64,
    #[serde(rename = "SAVING_COST")]
    pub saving_cost: i64,
    #[serde(rename = "SCORE_FINAL")]
    pub score_final: f64,
    /// Estimated empty-truck travel time unload → load (hours).
    #[serde(rename = "EST_PERJALANAN_JAM")]
    pub est_perjalanan_jam: f64,
    /// Raw schedule gap before any shift (hours, negative = late).
    #[serde(rename = "GAP_WAKTU_ASLI")]
    pub gap_waktu_asli: f64,
    #[serde(rename = "REKOMENDASI_TINDAKAN")]
    pub rekomendasi_tindakan: String,
    #[serde(rename = "OPSI_SISI_ORIGIN")]
    pub opsi_sisi_origin: Option<String>,
    #[serde(rename = "OPSI_SISI_DEST")]
    pub opsi_sisi_dest: Option<String>,
    #[serde(rename = "WAKTU_BONGKAR_ASLI")]
    pub waktu_bongkar_asli: String,
    #[serde(rename = "WAKTU_MUAT_ASLI")]
    pub waktu_muat_asli: String,
    #[serde(rename = "DURASI_BONGKAR_EST")]
    pub durasi_bongkar_est: f64,
    #[serde(rename = "DURASI_MUAT_EST")]
    pub durasi_muat_est: f64,
    #[serde(rename = "SELESAI_BONGKAR")]
    pub selesai_bongkar: String,
    #[serde(rename = "DEST_CUST_ID")]
    pub dest_cust_id: String,
    #[serde(rename = "ORIG_CUST_ID")]
    pub orig_cust_id: String,
    #[serde(rename = "DEST_TIME_PROFILE")]
    pub dest_time_profile: TimeProfile,
    #[serde(rename = "ORIG_TIME_PROFILE")]
    pub orig_time_profile: TimeProfile,
    /// Encoded polyline of the direct leg, when the router supplied one.
    pub geometry: Option<String>,
    /// `[lat, lng]` of the load customer.
    pub origin_coords: [f64; 2],
    /// `[lat, lng]` of the unload customer.
    pub dest_coords: [f64; 2],
    /// `[lat, lng]` of the branch port.
    pub port_coords: [f64; 2],
}

/// Per-branch aggregate counts and savings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchBreakdown {
    pub cabang: String,
    pub total_origin: u32,
    pub total_dest: u32,
    #[serde(rename = "match")]
    pub matches: u32,
    pub saving: f64,
    pub saving_cost: i64,
}

/// Aggregate statistics over one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStats {
    pub total_match: usize,
    pub total_origin: usize,
    pub total_dest: usize,
    /// Total distance saved across all matches (km).
    pub saving: f64,
    /// Total cost saved across all matches (rupiah).
    pub saving_cost: i64,
    pub cabang_breakdown: Vec<BranchBreakdown>,
}

impl MatchStats {
    pub fn empty(total_dest: usize, total_origin: usize) -> Self {
        Self {
            total_match: 0,
            total_origin,
            total_dest,
            saving: 0.0,
            saving_cost: 0,
            cabang_breakdown: vec![],
        }
    }
}

/// Complete result of one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub results: Vec<MatchedPair>,
    pub stats: MatchStats,
}
