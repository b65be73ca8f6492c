//! Schedule guidance for matched pairs
//!
//! Turns a feasibility outcome into the dispatcher-facing text shown on
//! the match card: one headline per category plus per-side option
//! strings describing what to shift and to when. Pure formatting; all
//! numbers arrive precomputed from the matrix builder.

use chrono::NaiveDateTime;

use crate::types::{PoolCategory, ShiftAction};

use super::feasibility::Tolerances;

/// Timestamp format used in dispatcher-facing texts.
const DATE_FORMAT: &str = "%d-%b %H:%M";

/// Dispatcher guidance for one matched pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Headline summary, one or more lines.
    pub text: String,
    /// What to do on the load (origin) side, when anything applies.
    pub origin_option: Option<String>,
    /// What to do on the unload (destination) side, when anything applies.
    pub dest_option: Option<String>,
}

fn hours(value: f64) -> chrono::Duration {
    chrono::Duration::milliseconds((value * 3_600_000.0).round() as i64)
}

/// Build the guidance texts for one matched pair.
///
/// `unload_time` is the truck's arrival at the unload site and
/// `load_time` the moment the truck is needed at the load site, both as
/// computed by the matrix builder. Non-viable shifts still get a text
/// naming the tolerance they exceed, so dispatchers see why only one
/// side is offered.
pub fn build_recommendation(
    category: PoolCategory,
    shift_hours: f64,
    time_gap: f64,
    actions: &[ShiftAction],
    unload_time: NaiveDateTime,
    load_time: NaiveDateTime,
    tolerances: &Tolerances,
) -> Recommendation {
    match category {
        PoolCategory::Optimal => Recommendation {
            text: format!("MATCH OPTIMAL. Idle {time_gap:.1} jam."),
            origin_option: Some(format!(
                "Tidak perlu penyesuaian. Jadwal muat: {}",
                load_time.format(DATE_FORMAT)
            )),
            dest_option: Some(format!(
                "Tidak perlu penyesuaian. Selesai bongkar: {}",
                unload_time.format(DATE_FORMAT)
            )),
        },
        PoolCategory::LateShiftPossible => {
            let mut text = format!("TERLAMBAT {shift_hours:.1} JAM. Perlu penyesuaian jadwal.");

            let origin_option = if actions.contains(&ShiftAction::DelayLoad) {
                let shifted = load_time + hours(shift_hours);
                let option = format!(
                    "Mundurkan jadwal muat dari {} ke {} (+{shift_hours:.1} jam)",
                    load_time.format(DATE_FORMAT),
                    shifted.format(DATE_FORMAT)
                );
                text.push_str(&format!("\n-> Opsi Origin: {option}"));
                option
            } else {
                format!(
                    "Tidak dapat memundurkan muat (melebihi batas {} jam)",
                    tolerances.max_delay_load_hours
                )
            };

            let dest_option = if actions.contains(&ShiftAction::AdvanceUnload) {
                let shifted = unload_time - hours(shift_hours);
                let option = format!(
                    "Percepat bongkar dari {} ke {} (-{shift_hours:.1} jam)",
                    unload_time.format(DATE_FORMAT),
                    shifted.format(DATE_FORMAT)
                );
                text.push_str(&format!("\n-> Opsi Dest: {option}"));
                option
            } else {
                format!(
                    "Tidak dapat mempercepat bongkar (melebihi batas {} jam)",
                    tolerances.max_advance_unload_hours
                )
            };

            Recommendation { text, origin_option: Some(origin_option), dest_option: Some(dest_option) }
        }
        PoolCategory::IdleReducePossible => {
            let mut text =
                format!("IDLE TINGGI ({time_gap:.1} Jam). Bisa dikurangi dengan penyesuaian.");

            let origin_option = if actions.contains(&ShiftAction::AdvanceLoad) {
                let shifted = load_time - hours(shift_hours);
                let option = format!(
                    "Majukan jadwal muat dari {} ke {} (-{shift_hours:.1} jam)",
                    load_time.format(DATE_FORMAT),
                    shifted.format(DATE_FORMAT)
                );
                text.push_str(&format!("\n-> Opsi Origin: {option}"));
                option
            } else {
                format!(
                    "Tidak dapat memajukan muat (melebihi batas {} jam)",
                    tolerances.max_advance_load_hours
                )
            };

            let dest_option = if actions.contains(&ShiftAction::DelayUnload) {
                let shifted = unload_time + hours(shift_hours);
                let option = format!(
                    "Mundurkan bongkar dari {} ke {} (+{shift_hours:.1} jam)",
                    unload_time.format(DATE_FORMAT),
                    shifted.format(DATE_FORMAT)
                );
                text.push_str(&format!("\n-> Opsi Dest: {option}"));
                option
            } else {
                format!(
                    "Tidak dapat memundurkan bongkar (melebihi batas {} jam)",
                    tolerances.max_delay_unload_hours
                )
            };

            Recommendation { text, origin_option: Some(origin_option), dest_option: Some(dest_option) }
        }
        PoolCategory::Unfeasible => Recommendation {
            text: "Status tidak diketahui".to_string(),
            origin_option: None,
            dest_option: None,
        },
    }
}
