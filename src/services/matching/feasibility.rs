//! Time-gap feasibility classification
//!
//! Given the slack between finishing an unload and having to start the
//! paired load, decide whether the pairing works as scheduled, works
//! after a bounded schedule shift, or not at all. Pure computation; the
//! tolerances arrive from the caller so deployments can tune them
//! without touching the algorithm.

use crate::defaults;
use crate::types::{PoolCategory, ShiftAction};

// ==========================================================================
// Tests First (TDD)
// ==========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_within_idle_window_is_optimal() {
        let f = classify(2.0, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::Optimal);
        assert_eq!(f.shift_hours, 0.0);
        assert_eq!(f.actions, vec![ShiftAction::Perfect]);
    }

    #[test]
    fn test_zero_gap_is_optimal() {
        let f = classify(0.0, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::Optimal);
    }

    #[test]
    fn test_gap_at_idle_limit_is_still_optimal() {
        let f = classify(defaults::MAX_IDLE_HOURS, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::Optimal);
    }

    #[test]
    fn test_small_shortfall_allows_both_corrections() {
        let f = classify(-5.0, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::LateShiftPossible);
        assert_eq!(f.shift_hours, 5.0);
        assert_eq!(f.actions, vec![ShiftAction::DelayLoad, ShiftAction::AdvanceUnload]);
    }

    #[test]
    fn test_shortfall_beyond_delay_limit_leaves_advance_only() {
        // 10h late: too much to push the load (8h cap) but the unload
        // can still be pulled earlier (24h cap).
        let f = classify(-10.0, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::LateShiftPossible);
        assert_eq!(f.shift_hours, 10.0);
        assert_eq!(f.actions, vec![ShiftAction::AdvanceUnload]);
    }

    #[test]
    fn test_shortfall_at_delay_limit_keeps_both() {
        let f = classify(-8.0, &Tolerances::default());
        assert_eq!(f.actions, vec![ShiftAction::DelayLoad, ShiftAction::AdvanceUnload]);
    }

    #[test]
    fn test_tightened_delay_tolerance_drops_delay_option() {
        let tolerances = Tolerances { max_delay_load_hours: 5.0, ..Tolerances::default() };
        let f = classify(-6.0, &tolerances);
        assert_eq!(f.category, PoolCategory::LateShiftPossible);
        assert_eq!(f.actions, vec![ShiftAction::AdvanceUnload]);
    }

    #[test]
    fn test_hopeless_shortfall_is_unfeasible() {
        let f = classify(-30.0, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::Unfeasible);
        assert_eq!(f.shift_hours, 0.0);
        assert!(f.actions.is_empty());
        assert!(!f.is_feasible());
    }

    #[test]
    fn test_moderate_idle_allows_both_corrections() {
        // 9h gap, 4h allowed: 5h excess fits both adjustment windows.
        let f = classify(9.0, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::IdleReducePossible);
        assert_eq!(f.shift_hours, 5.0);
        assert_eq!(f.actions, vec![ShiftAction::AdvanceLoad, ShiftAction::DelayUnload]);
    }

    #[test]
    fn test_large_idle_excess_leaves_advance_load_only() {
        // 10h excess: beyond the 8h unload-delay window, within the
        // 12h load-advance window.
        let f = classify(14.0, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::IdleReducePossible);
        assert_eq!(f.shift_hours, 10.0);
        assert_eq!(f.actions, vec![ShiftAction::AdvanceLoad]);
    }

    #[test]
    fn test_excessive_idle_is_unfeasible() {
        let f = classify(30.0, &Tolerances::default());
        assert_eq!(f.category, PoolCategory::Unfeasible);
        assert_eq!(f.shift_hours, 0.0);
        assert!(f.actions.is_empty());
    }
}

// ==========================================================================
// Implementation
// ==========================================================================

/// Schedule-adjustment tolerances, all in hours.
#[derive(Debug, Clone, Copy)]
pub struct Tolerances {
    /// Idle time between jobs that needs no correction at all.
    pub max_idle_hours: f64,
    /// How far an unload may be pushed later to absorb idle time.
    pub max_delay_unload_hours: f64,
    /// How far a load may be pushed later to absorb a shortfall.
    pub max_delay_load_hours: f64,
    /// How far an unload may be pulled earlier to absorb a shortfall.
    pub max_advance_unload_hours: f64,
    /// How far a load may be pulled earlier to absorb idle time.
    pub max_advance_load_hours: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            max_idle_hours: defaults::MAX_IDLE_HOURS,
            max_delay_unload_hours: defaults::MAX_DELAY_UNLOAD_HOURS,
            max_delay_load_hours: defaults::MAX_DELAY_LOAD_HOURS,
            max_advance_unload_hours: defaults::MAX_ADVANCE_UNLOAD_HOURS,
            max_advance_load_hours: defaults::MAX_ADVANCE_LOAD_HOURS,
        }
    }
}

/// Outcome of classifying one candidate pairing's time gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Feasibility {
    pub category: PoolCategory,
    /// Hours of schedule shift the correction needs (0 when none needed
    /// or when no correction is possible).
    pub shift_hours: f64,
    /// Viable corrective actions, in preference order.
    pub actions: Vec<ShiftAction>,
}

impl Feasibility {
    pub fn is_feasible(&self) -> bool {
        self.category != PoolCategory::Unfeasible
    }
}

/// Classify a time gap (hours of slack between unload completion and the
/// load's scheduled start) against the adjustment tolerances.
///
/// Negative gaps mean the truck would arrive late for the load; gaps
/// above `max_idle_hours` mean it would sit idle. Both can be repaired
/// by shifting one side's schedule, within bounds.
pub fn classify(time_gap: f64, tolerances: &Tolerances) -> Feasibility {
    if time_gap < 0.0 {
        let shortage = time_gap.abs();
        let can_delay_load = shortage <= tolerances.max_delay_load_hours;
        let can_advance_unload = shortage <= tolerances.max_advance_unload_hours;

        if can_delay_load || can_advance_unload {
            let mut actions = Vec::new();
            if can_delay_load {
                actions.push(ShiftAction::DelayLoad);
            }
            if can_advance_unload {
                actions.push(ShiftAction::AdvanceUnload);
            }
            Feasibility {
                category: PoolCategory::LateShiftPossible,
                shift_hours: shortage,
                actions,
            }
        } else {
            Feasibility {
                category: PoolCategory::Unfeasible,
                shift_hours: 0.0,
                actions: Vec::new(),
            }
        }
    } else if time_gap > tolerances.max_idle_hours {
        let excess = time_gap - tolerances.max_idle_hours;
        let can_advance_load = excess <= tolerances.max_advance_load_hours;
        let can_delay_unload = excess <= tolerances.max_delay_unload_hours;

        if can_advance_load || can_delay_unload {
            let mut actions = Vec::new();
            if can_advance_load {
                actions.push(ShiftAction::AdvanceLoad);
            }
            if can_delay_unload {
                actions.push(ShiftAction::DelayUnload);
            }
            Feasibility {
                category: PoolCategory::IdleReducePossible,
                shift_hours: excess,
                actions,
            }
        } else {
            Feasibility {
                category: PoolCategory::Unfeasible,
                shift_hours: 0.0,
                actions: Vec::new(),
            }
        }
    } else {
        Feasibility {
            category: PoolCategory::Optimal,
            shift_hours: 0.0,
            actions: vec![ShiftAction::Perfect],
        }
    }
}
