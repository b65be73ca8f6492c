//! Candidate generation and cost-matrix assembly
//!
//! Every unload job is paired against every load job of the same branch.
//! Hard constraints (branch, service type, container size, grade) gate
//! the pairing; surviving candidates get a distance saving, a time-gap
//! feasibility class and a score, and land in a rectangular cost matrix
//! for the assignment solver. Rejected cells carry a sentinel so the
//! solver can still produce a complete assignment.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::defaults;
use crate::services::branches::BranchRegistry;
use crate::services::durations::DurationStore;
use crate::services::geo::travel_hours;
use crate::services::routing::RouteCache;
use crate::types::{Coordinates, Direction, Job, PoolCategory, ShiftAction};

use super::feasibility::{classify, Tolerances};

// ==========================================================================
// Tests First (TDD)
// ==========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;

    use crate::services::routing::{MockRouteProvider, RouteLeg, RouteProvider};

    fn job(id: &str, branch: &str, lat: f64, lng: f64, when: &str, size: &str, grade: &str) -> Job {
        Job {
            id: id.to_string(),
            branch: branch.to_string(),
            customer_id: format!("CUST-{id}"),
            location: Coordinates::new(lat, lng),
            scheduled_at: NaiveDateTime::parse_from_str(when, "%Y-%m-%d %H:%M:%S").unwrap(),
            size_tag: size.to_string(),
            grade: grade.to_string(),
            service_type: "DOOR".to_string(),
        }
    }

    /// Unload near Tanjung Perak, scheduled in the morning.
    fn sby_unload() -> Job {
        job("D-1", "SBY", -7.25, 112.75, "2025-03-01 08:00:00", "20DC", "A")
    }

    /// Load a few km further out, scheduled the same evening. With the
    /// mock provider this sits in the optimal idle window.
    fn sby_load() -> Job {
        job("O-1", "SBY", -7.30, 112.76, "2025-03-01 17:00:00", "20DC", "A")
    }

    async fn build(unloads: &[Job], loads: &[Job]) -> CostMatrix {
        let routes = RouteCache::new(Arc::new(MockRouteProvider::new()));
        build_cost_matrix(
            unloads,
            loads,
            BranchRegistry::builtin(),
            &DurationStore::default(),
            &routes,
            &Tolerances::default(),
            GapModel::DurationAware,
        )
        .await
    }

    #[tokio::test]
    async fn test_compatible_pair_becomes_candidate() {
        let matrix = build(&[sby_unload()], &[sby_load()]).await;
        assert!(matrix.is_feasible(0, 0));

        let detail = matrix.details.get(&(0, 0)).unwrap();
        assert_eq!(detail.dest_id, "D-1");
        assert_eq!(detail.orig_id, "O-1");
        assert_eq!(detail.branch, "SBY");
        assert!(detail.saving_km > 0.0);
        assert!(detail.saving_cost > 0.0);
        assert!(detail.dist_triangulated < detail.dist_via_port);
        assert_eq!(detail.pool, PoolCategory::Optimal);
    }

    #[tokio::test]
    async fn test_cell_encodes_milli_scaled_score() {
        let matrix = build(&[sby_unload()], &[sby_load()]).await;
        let detail = matrix.details.get(&(0, 0)).unwrap();
        let expected = LARGE_CELL - (detail.score * 1000.0).round() as i64;
        assert_eq!(matrix.cells[0][0], expected);
    }

    #[tokio::test]
    async fn test_branch_mismatch_is_rejected() {
        let mut load = sby_load();
        load.branch = "SMG".to_string();
        let matrix = build(&[sby_unload()], &[load]).await;
        assert!(!matrix.is_feasible(0, 0));
        assert!(matrix.details.is_empty());
    }

    #[tokio::test]
    async fn test_branch_alias_pairs_with_code() {
        let mut unload = sby_unload();
        unload.branch = "SURABAYA".to_string();
        let matrix = build(&[unload], &[sby_load()]).await;
        assert!(matrix.is_feasible(0, 0));
        assert_eq!(matrix.details.get(&(0, 0)).unwrap().branch, "SBY");
    }

    #[tokio::test]
    async fn test_unusable_branch_skips_row() {
        let mut unload = sby_unload();
        unload.branch = "  ".to_string();
        let matrix = build(&[unload], &[sby_load()]).await;
        assert!(!matrix.is_feasible(0, 0));
    }

    #[tokio::test]
    async fn test_stripping_jobs_never_pool() {
        let mut unload = sby_unload();
        unload.service_type = "Stripping".to_string();
        let matrix = build(&[unload], &[sby_load()]).await;
        assert!(matrix.details.is_empty());

        let mut load = sby_load();
        load.service_type = "STRIPPING".to_string();
        let matrix = build(&[sby_unload()], &[load]).await;
        assert!(matrix.details.is_empty());
    }

    #[tokio::test]
    async fn test_size_tags_must_match_exactly() {
        let mut load = sby_load();
        load.size_tag = "40HC".to_string();
        let matrix = build(&[sby_unload()], &[load]).await;
        assert!(matrix.details.is_empty());
    }

    #[tokio::test]
    async fn test_grade_wildcard_matches_anything() {
        let mut load = sby_load();
        load.grade = "-".to_string();
        let matrix = build(&[sby_unload()], &[load]).await;
        assert!(matrix.is_feasible(0, 0));
    }

    #[tokio::test]
    async fn test_conflicting_grades_are_rejected() {
        let mut load = sby_load();
        load.grade = "B".to_string();
        let matrix = build(&[sby_unload()], &[load]).await;
        assert!(matrix.details.is_empty());
    }

    #[tokio::test]
    async fn test_hopeless_schedule_gap_is_rejected() {
        // Load four days later: idle excess far beyond every tolerance.
        let mut load = sby_load();
        load.scheduled_at =
            NaiveDateTime::parse_from_str("2025-03-05 17:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let matrix = build(&[sby_unload()], &[load]).await;
        assert!(matrix.details.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_only_model_ignores_service_durations() {
        let routes = RouteCache::new(Arc::new(MockRouteProvider::new()));
        let unloads = vec![sby_unload()];
        let loads = vec![sby_load()];
        let matrix = build_cost_matrix(
            &unloads,
            &loads,
            BranchRegistry::builtin(),
            &DurationStore::default(),
            &routes,
            &Tolerances::default(),
            GapModel::ScheduleOnly,
        )
        .await;

        // 9h schedule window minus prep and the short empty leg leaves
        // more slack than the idle limit tolerates.
        let detail = matrix.details.get(&(0, 0)).unwrap();
        assert_eq!(detail.pool, PoolCategory::IdleReducePossible);
        assert!(detail.time_gap > defaults::MAX_IDLE_HOURS);
    }

    /// Provider with a long detour between customers and short port legs,
    /// so the triangulated tour loses to staying on port shuttles.
    struct DetourProvider;

    #[async_trait]
    impl RouteProvider for DetourProvider {
        async fn route(&self, from: &Coordinates, to: &Coordinates) -> Result<Option<RouteLeg>> {
            let port = BranchRegistry::builtin().port_of("SBY");
            let touches_port = *from == port || *to == port;
            let distance_km = if touches_port { 10.0 } else { 100.0 };
            Ok(Some(RouteLeg { distance_km, duration_hours: distance_km / 40.0, shape: None }))
        }

        fn name(&self) -> &str {
            "Detour"
        }
    }

    #[tokio::test]
    async fn test_negative_saving_is_rejected() {
        let routes = RouteCache::new(Arc::new(DetourProvider));
        let unloads = vec![sby_unload()];
        let loads = vec![sby_load()];
        let matrix = build_cost_matrix(
            &unloads,
            &loads,
            BranchRegistry::builtin(),
            &DurationStore::default(),
            &routes,
            &Tolerances::default(),
            GapModel::DurationAware,
        )
        .await;
        assert!(matrix.details.is_empty());
    }

    #[test]
    fn test_grade_wildcard_set() {
        assert!(grades_match("-", "A"));
        assert!(grades_match("A", "nan"));
        assert!(grades_match("None", ""));
        assert!(grades_match(" A ", "A"));
        assert!(!grades_match("A", "B"));
    }

    #[test]
    fn test_match_score_weights() {
        assert_eq!(match_score(10.0, 0.0), 10_000.0);
        assert_eq!(match_score(10.0, 4.0), 8_000.0);
    }
}

// ==========================================================================
// Implementation
// ==========================================================================

/// Base cost a feasible candidate is subtracted from, milli-scaled so the
/// solver can work in integers without losing score precision.
pub const LARGE_CELL: i64 = 10_000_000_000;

/// Sentinel for pairings that failed a hard constraint. Strictly larger
/// than any feasible cell, so sentinel assignments are recognizable.
pub const INFEASIBLE_CELL: i64 = 1_000_000_000_000;

/// How the unload-to-load time gap is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GapModel {
    /// Full chain: port travel, service duration at the unload site,
    /// preparation and the empty leg between customers.
    #[default]
    DurationAware,
    /// Raw schedule window minus prep and the empty leg. Useful when
    /// service-duration data is too thin to trust.
    ScheduleOnly,
}

/// Everything the reporting layer needs about one feasible candidate.
#[derive(Debug, Clone)]
pub struct CandidateDetail {
    pub dest_id: String,
    pub orig_id: String,
    /// Normalized branch code shared by both jobs.
    pub branch: String,
    pub size_tag: String,
    pub pool: PoolCategory,
    pub score: f64,
    pub saving_km: f64,
    pub saving_cost: f64,
    pub cost_triangulated: f64,
    pub cost_via_port: f64,
    pub dist_triangulated: f64,
    pub dist_via_port: f64,
    pub dist_direct: f64,
    /// Empty-truck travel time between the two customers, hours.
    pub est_travel_hours: f64,
    pub shift_hours: f64,
    pub time_gap: f64,
    pub actions: Vec<ShiftAction>,
    /// Encoded polyline of the direct leg, when the router supplied one.
    pub shape: Option<String>,
    /// Arrival at the unload site (schedule plus the loaded port leg).
    pub unload_arrival: NaiveDateTime,
    /// Truck-needed-at-load time (schedule plus the loaded port leg).
    pub load_deadline: NaiveDateTime,
    pub unload_duration_hours: f64,
    pub load_duration_hours: f64,
    pub unload_finish: NaiveDateTime,
    pub dest_customer: String,
    pub orig_customer: String,
    pub dest_location: Coordinates,
    pub orig_location: Coordinates,
}

/// Rectangular cost matrix (unload rows, load columns) plus the detail
/// record for every feasible cell.
pub struct CostMatrix {
    pub cells: Vec<Vec<i64>>,
    pub details: HashMap<(usize, usize), CandidateDetail>,
}

impl CostMatrix {
    pub fn is_feasible(&self, row: usize, column: usize) -> bool {
        self.cells[row][column] < INFEASIBLE_CELL
    }
}

/// Candidate score: distance saving rewarded, schedule shift penalized.
fn match_score(saving_km: f64, shift_hours: f64) -> f64 {
    saving_km * defaults::WEIGHT_SAVING - shift_hours * defaults::PENALTY_PER_HOUR
}

fn score_cell(score: f64) -> i64 {
    LARGE_CELL - (score * 1000.0).round() as i64
}

/// Grades match when equal or when either side carries a placeholder
/// value (upstream exports use several spellings for "ungraded").
fn grades_match(dest_grade: &str, orig_grade: &str) -> bool {
    const WILDCARDS: [&str; 4] = ["-", "nan", "None", ""];
    let dest_grade = dest_grade.trim();
    let orig_grade = orig_grade.trim();
    if WILDCARDS.contains(&dest_grade) || WILDCARDS.contains(&orig_grade) {
        return true;
    }
    dest_grade == orig_grade
}

fn hours(value: f64) -> chrono::Duration {
    chrono::Duration::milliseconds((value * 3_600_000.0).round() as i64)
}

fn hours_between(later: NaiveDateTime, earlier: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

/// Build the cost matrix for one optimization run.
///
/// Unresolvable port legs fall back to a large distance penalty so the
/// pairing survives with a terrible saving; an unresolvable direct leg
/// kills the pairing outright, since the whole point of the match is
/// driving that leg.
pub async fn build_cost_matrix(
    unload_jobs: &[Job],
    load_jobs: &[Job],
    registry: &BranchRegistry,
    durations: &DurationStore,
    routes: &RouteCache,
    tolerances: &Tolerances,
    gap_model: GapModel,
) -> CostMatrix {
    let mut cells = vec![vec![INFEASIBLE_CELL; load_jobs.len()]; unload_jobs.len()];
    let mut details: HashMap<(usize, usize), CandidateDetail> = HashMap::new();

    for (row, dest) in unload_jobs.iter().enumerate() {
        let Some(branch) = registry.normalize(&dest.branch) else {
            warn!("Unload job {} has no usable branch, skipping", dest.id);
            continue;
        };
        if dest.is_stripping() {
            continue;
        }
        let port = registry.port_of(&branch);

        let dist_port_to_dest = leg_or_penalty(routes, &port, &dest.location).await;
        let dist_dest_to_port = leg_or_penalty(routes, &dest.location, &port).await;
        let unload_arrival =
            dest.scheduled_at + hours(travel_hours(dist_port_to_dest, defaults::TRUCK_SPEED_FULL_KMH));

        for (column, orig) in load_jobs.iter().enumerate() {
            if registry.normalize(&orig.branch).as_deref() != Some(branch.as_str()) {
                continue;
            }
            if orig.is_stripping() {
                continue;
            }
            if dest.size_tag != orig.size_tag {
                continue;
            }
            if !grades_match(&dest.grade, &orig.grade) {
                continue;
            }

            // No direct leg, no roundtrip
            let Some(direct) = routes.route(&dest.location, &orig.location).await else {
                continue;
            };

            let dist_port_to_orig = leg_or_penalty(routes, &port, &orig.location).await;
            let dist_orig_to_port = leg_or_penalty(routes, &orig.location, &port).await;
            let load_deadline =
                orig.scheduled_at + hours(travel_hours(dist_port_to_orig, defaults::TRUCK_SPEED_FULL_KMH));

            let dist_via_port =
                dist_port_to_dest + dist_dest_to_port + dist_port_to_orig + dist_orig_to_port;
            let dist_triangulated = dist_port_to_dest + direct.distance_km + dist_orig_to_port;
            let saving_km = dist_via_port - dist_triangulated;
            if saving_km <= 0.0 {
                continue;
            }

            let unload_duration =
                durations.expected_hours(&dest.customer_id, &branch, Direction::Bongkar);
            let load_duration =
                durations.expected_hours(&orig.customer_id, &branch, Direction::Muat);
            let unload_finish = unload_arrival + hours(unload_duration);
            let est_travel_hours = travel_hours(direct.distance_km, defaults::TRUCK_SPEED_EMPTY_KMH);

            let time_gap = match gap_model {
                GapModel::DurationAware => {
                    let load_site_arrival =
                        unload_finish + hours(defaults::PREP_TIME_HOURS + est_travel_hours);
                    hours_between(load_deadline, load_site_arrival)
                }
                GapModel::ScheduleOnly => {
                    hours_between(orig.scheduled_at, dest.scheduled_at)
                        - (est_travel_hours + defaults::PREP_TIME_HOURS)
                }
            };

            let feasibility = classify(time_gap, tolerances);
            if !feasibility.is_feasible() {
                continue;
            }

            let score = match_score(saving_km, feasibility.shift_hours);
            let size = dest.size_class();
            let cost_via_port = registry.trucking_cost(&branch, size, dist_via_port);
            let cost_triangulated = registry.trucking_cost(&branch, size, dist_triangulated);

            cells[row][column] = score_cell(score);
            details.insert(
                (row, column),
                CandidateDetail {
                    dest_id: dest.id.clone(),
                    orig_id: orig.id.clone(),
                    branch: branch.clone(),
                    size_tag: dest.size_tag.clone(),
                    pool: feasibility.category,
                    score,
                    saving_km,
                    saving_cost: cost_via_port - cost_triangulated,
                    cost_triangulated,
                    cost_via_port,
                    dist_triangulated,
                    dist_via_port,
                    dist_direct: direct.distance_km,
                    est_travel_hours,
                    shift_hours: feasibility.shift_hours,
                    time_gap,
                    actions: feasibility.actions,
                    shape: direct.shape.clone(),
                    unload_arrival,
                    load_deadline,
                    unload_duration_hours: unload_duration,
                    load_duration_hours: load_duration,
                    unload_finish,
                    dest_customer: dest.customer_id.clone(),
                    orig_customer: orig.customer_id.clone(),
                    dest_location: dest.location,
                    orig_location: orig.location,
                },
            );
        }
    }

    debug!(
        "Cost matrix ready: {} x {}, {} feasible candidates",
        unload_jobs.len(),
        load_jobs.len(),
        details.len()
    );
    CostMatrix { cells, details }
}

async fn leg_or_penalty(routes: &RouteCache, from: &Coordinates, to: &Coordinates) -> f64 {
    match routes.route(from, to).await {
        Some(leg) => leg.distance_km,
        None => defaults::UNRESOLVED_LEG_PENALTY_KM,
    }
}
