//! Branch registry and trucking cost model
//!
//! Immutable lookup tables for every branch the fleet operates from:
//! port coordinates, branch-name aliases, and the linear trucking cost
//! coefficients fitted from historical invoices. Built once at startup
//! and shared read-only across optimization runs.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::types::{ContainerSize, Coordinates};

/// Linear cost coefficients for one branch and container size.
///
/// `cost = base + per_km * distance_km`. `per_km` may be negative where
/// the historical regression produced one; the model is applied as fitted,
/// without clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostCoefficients {
    /// Fixed cost per trip (rupiah).
    pub base: f64,
    /// Marginal cost per kilometer (rupiah/km).
    pub per_km: f64,
}

const fn coeff(base: f64, per_km: f64) -> CostCoefficients {
    CostCoefficients { base, per_km }
}

/// Branch port gate coordinates, keyed by branch code.
const PORT_LOCATIONS: &[(&str, f64, f64)] = &[
    ("AMB", -3.6936513307915373, 128.1781638108562),
    ("BAU", -5.455903265878138, 122.60938584960972),
    ("BIA", -1.1851603736014757, 136.07682156714358),
    ("BIT", 1.442401944168893, 125.19794740287165),
    ("BKS", -3.9071848201989816, 102.30519879122947),
    ("BMS", -3.3327669305844285, 114.55564290033476),
    ("BOE", -4.785618909408796, 121.58287938017267),
    ("BPN", -1.1568616485972183, 116.78528031499359),
    ("BRU", 2.157605639533901, 117.49494602063376),
    ("BTL", -3.4314766905578593, 116.00777973943374),
    ("BTM", 1.1629469531427101, 104.00468304195515),
    ("FAK", -2.932392940033229, 132.3096808628934),
    ("GTO", 0.5101940472432188, 123.06327209675729),
    ("JYP", -2.544847344680502, 140.71329620822493),
    ("KAI", -3.6628405435755065, 133.76092774448097),
    ("KDR", -3.9895283429207495, 122.6190354078469),
    ("KTG", -5.113802573807123, 119.41037950498233),
    ("KTJ", 3.3619660255236283, 99.44941303103899),
    ("MDN", 3.787506344211553, 98.71314917267185),
    ("MKE", -8.478256116269572, 140.39305845664322),
    ("MKS", -5.113802573807123, 119.41037950498233),
    ("MRI", -0.8675417506615584, 134.07615720492146),
    ("NBR", -3.238797960851654, 135.58323888258386),
    ("NNK", 4.142988216468162, 117.66599727361431),
    ("PAL", -0.5812817099682415, 119.79329655793101),
    ("PDG", -0.9981727894996993, 100.36979280361531),
    ("PLM", -2.9798136965465556, 104.78229673306087),
    ("PNK", -0.018584509467722148, 109.33400183258493),
    ("PRW", 0.6832287747358564, 101.65075633957173),
    ("SDA", -0.5755879460602218, 117.2067604145952),
    ("SMG", -6.942867577132296, 110.42457707933995),
    ("SPT", -2.5408470599064956, 112.96458506972988),
    ("SRG", -0.8775088266820529, 131.24542609539967),
    ("SRI", -1.881488025976306, 136.243383575054),
    ("TGK", -1.209244825216147, 122.62847485731344),
    ("TIM", -4.802100356221503, 136.76805472331185),
    ("TRK", 3.284967648005647, 117.59585253796989),
    ("TTE", 0.7817073187610769, 127.38794865150044),
    ("TUA", -5.633732846975406, 132.7426128381603),
    ("SBY", -7.218371647800905, 112.72841955208024),
    ("JKT", -6.108317688297046, 106.87547242239924),
];

/// Full branch names as they appear in upstream exports, mapped to codes.
const BRANCH_ALIASES: &[(&str, &str)] = &[
    ("AMBON", "AMB"),
    ("BAU-BAU", "BAU"),
    ("BIAK", "BIA"),
    ("BITUNG", "BIT"),
    ("BANJARMASIN", "BMS"),
    ("BALIKPAPAN", "BPN"),
    ("BERAU", "BRU"),
    ("BATULICIN", "BTL"),
    ("BATAM", "BTM"),
    ("FAKFAK", "FAK"),
    ("GORONTALO", "GTO"),
    ("JAYAPURA", "JYP"),
    ("KAIMANA", "KAI"),
    ("KENDARI", "KDR"),
    ("KETAPANG", "KTG"),
    ("KUALA TANJUNG", "KTJ"),
    ("MEDAN", "MDN"),
    ("MERAUKE", "MKE"),
    ("MAKASSAR", "MKS"),
    ("MANOKWARI", "MRI"),
    ("NABIRE", "NBR"),
    ("NUNUKAN", "NNK"),
    ("PALU", "PAL"),
    ("PADANG", "PDG"),
    ("PONTIANAK", "PNK"),
    ("PERAWANG", "PRW"),
    ("SAMARINDA", "SDA"),
    ("SEMARANG", "SMG"),
    ("SAMPIT", "SPT"),
    ("SORONG", "SRG"),
    ("SERUI", "SRI"),
    ("TANGKIANG", "TGK"),
    ("TIMIKA", "TIM"),
    ("TARAKAN", "TRK"),
    ("TERNATE", "TTE"),
    ("TUAL", "TUA"),
    ("SURABAYA", "SBY"),
    ("JAKARTA", "JKT"),
];

/// Fitted cost coefficients per branch: (code, 20-foot, 40-foot).
/// Branches with too little history carry the regional placeholder fit.
const COST_MODEL: &[(&str, CostCoefficients, CostCoefficients)] = &[
    ("AMB", coeff(1_614_033.0, 79_722.0), coeff(3_886_774.0, 13_556.0)),
    ("BAU", coeff(1_119_186.0, 52_230.0), coeff(2_589_798.0, 108_403.0)),
    ("BIA", coeff(2_359_216.0, 147_538.0), coeff(1_000_000.0, 50_000.0)),
    ("BIT", coeff(1_260_803.0, 20_888.0), coeff(1_524_331.0, 28_734.0)),
    ("BMS", coeff(594_371.0, 31_275.0), coeff(894_914.0, 42_427.0)),
    ("BPN", coeff(974_899.0, 67_692.0), coeff(2_165_839.0, 84_821.0)),
    ("BRU", coeff(3_406_990.0, 52_272.0), coeff(1_000_000.0, 50_000.0)),
    ("BTL", coeff(1_660_287.0, 40_460.0), coeff(1_000_000.0, 50_000.0)),
    ("BTM", coeff(987_645.0, 12_517.0), coeff(929_887.0, 27_891.0)),
    ("FAK", coeff(3_239_105.0, -121_225.0), coeff(1_000_000.0, 2_506_266.0)),
    ("GTO", coeff(853_478.0, 25_364.0), coeff(1_573_261.0, 43_556.0)),
    ("JYP", coeff(2_147_488.0, 13_825.0), coeff(4_404_528.0, 277_301.0)),
    ("KAI", coeff(3_734_979.0, 44_806.0), coeff(1_000_000.0, 50_000.0)),
    ("KDR", coeff(1_062_738.0, 31_920.0), coeff(1_240_141.0, 57_552.0)),
    ("KTG", coeff(1_185_780.0, 66_563.0), coeff(2_328_730.0, 119_520.0)),
    ("KTJ", coeff(1_000_000.0, 15_843.0), coeff(1_000_000.0, 50_000.0)),
    ("MDN", coeff(1_137_761.0, 19_972.0), coeff(1_418_268.0, 25_977.0)),
    ("MKE", coeff(2_753_493.0, 69_972.0), coeff(5_368_136.0, 170_874.0)),
    ("MKS", coeff(1_191_595.0, 15_765.0), coeff(1_650_161.0, 30_059.0)),
    ("MRI", coeff(2_068_758.0, 61_628.0), coeff(3_978_182.0, 54_214.0)),
    ("NBR", coeff(1_267_122.0, 68_983.0), coeff(3_507_323.0, 112_545.0)),
    ("NNK", coeff(3_323_953.0, 152_794.0), coeff(1_000_000.0, 50_000.0)),
    ("PAL", coeff(933_104.0, 33_897.0), coeff(2_607_104.0, 36_712.0)),
    ("PDG", coeff(2_036_944.0, 6_315.0), coeff(3_423_013.0, 33_926.0)),
    ("PNK", coeff(1_720_838.0, 31_480.0), coeff(2_715_683.0, 44_559.0)),
    ("PRW", coeff(1_177_854.0, 29_299.0), coeff(1_479_783.0, 47_751.0)),
    ("SDA", coeff(1_268_345.0, 68_670.0), coeff(1_887_260.0, 91_306.0)),
    ("SMG", coeff(1_126_369.0, 13_724.0), coeff(1_504_052.0, 12_384.0)),
    ("SPT", coeff(1_996_378.0, 25_314.0), coeff(2_938_327.0, 33_299.0)),
    ("SRG", coeff(1_209_135.0, 102_230.0), coeff(3_855_251.0, 55_001.0)),
    ("SRI", coeff(1_000_000.0, 6_698_886.0), coeff(1_000_000.0, 5_019_305.0)),
    ("TGK", coeff(912_096.0, 32_945.0), coeff(1_175_252.0, 76_463.0)),
    ("TIM", coeff(2_254_624.0, 48_206.0), coeff(1_000_000.0, 244_138.0)),
    ("TRK", coeff(3_287_449.0, -26_129.0), coeff(6_286_036.0, -117_539.0)),
    ("TTE", coeff(2_821_820.0, 24_319.0), coeff(6_108_893.0, 62_815.0)),
    ("TUA", coeff(4_891_380.0, -131_743.0), coeff(1_000_000.0, 2_546_914.0)),
];

/// Fallback coefficients for branches without a fitted model.
const DEFAULT_COST_20: CostCoefficients = coeff(1_200_000.0, 25_000.0);
const DEFAULT_COST_40: CostCoefficients = coeff(1_800_000.0, 40_000.0);

/// Branch whose port stands in when a code has no registered port.
const DEFAULT_PORT_CODE: &str = "JKT";

static BUILTIN: Lazy<BranchRegistry> = Lazy::new(BranchRegistry::from_builtin_tables);

/// Registry of branch ports, aliases, and cost coefficients.
pub struct BranchRegistry {
    ports: HashMap<&'static str, Coordinates>,
    aliases: HashMap<&'static str, &'static str>,
    costs: HashMap<&'static str, (CostCoefficients, CostCoefficients)>,
    default_costs: (CostCoefficients, CostCoefficients),
}

impl BranchRegistry {
    /// The built-in production registry, constructed once.
    pub fn builtin() -> &'static BranchRegistry {
        &BUILTIN
    }

    fn from_builtin_tables() -> Self {
        let ports = PORT_LOCATIONS
            .iter()
            .map(|&(code, lat, lng)| (code, Coordinates { lat, lng }))
            .collect();
        let aliases = BRANCH_ALIASES.iter().copied().collect();
        let costs = COST_MODEL
            .iter()
            .map(|&(code, c20, c40)| (code, (c20, c40)))
            .collect();

        Self {
            ports,
            aliases,
            costs,
            default_costs: (DEFAULT_COST_20, DEFAULT_COST_40),
        }
    }

    /// Normalize a raw branch value to a branch code.
    ///
    /// Trims, uppercases, and resolves full-name aliases. Returns `None`
    /// for empty or placeholder values; unknown-but-nonempty values pass
    /// through uppercased so downstream fallbacks apply.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let cleaned = raw.trim().to_uppercase();
        if cleaned.is_empty() || cleaned == "NAN" || cleaned == "NONE" {
            return None;
        }
        match self.aliases.get(cleaned.as_str()) {
            Some(code) => Some((*code).to_string()),
            None => Some(cleaned),
        }
    }

    /// Whether a raw branch value resolves to a registered port.
    pub fn is_known(&self, raw: &str) -> bool {
        self.normalize(raw)
            .map(|code| self.ports.contains_key(code.as_str()))
            .unwrap_or(false)
    }

    /// Port gate coordinates for a branch code, falling back to the
    /// default port for unregistered codes.
    pub fn port_of(&self, code: &str) -> Coordinates {
        self.ports
            .get(code)
            .copied()
            .unwrap_or_else(|| self.ports[DEFAULT_PORT_CODE])
    }

    /// Cost coefficients for a branch and size, with the two-level
    /// fallback: branch table first, then the default table per size.
    pub fn cost_coefficients(&self, code: &str, size: ContainerSize) -> CostCoefficients {
        let (c20, c40) = self.costs.get(code).copied().unwrap_or(self.default_costs);
        match size {
            ContainerSize::Feet20 => c20,
            ContainerSize::Feet40 => c40,
        }
    }

    /// Estimated trucking cost in rupiah for a trip of `distance_km`.
    pub fn trucking_cost(&self, code: &str, size: ContainerSize, distance_km: f64) -> f64 {
        let coeffs = self.cost_coefficients(code, size);
        coeffs.base + coeffs.per_km * distance_km
    }

    /// All registered branch codes, sorted.
    pub fn codes(&self) -> Vec<&'static str> {
        let mut codes: Vec<&'static str> = self.ports.keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_resolves_alias() {
        let registry = BranchRegistry::builtin();
        assert_eq!(registry.normalize("SURABAYA").as_deref(), Some("SBY"));
        assert_eq!(registry.normalize("MAKASSAR").as_deref(), Some("MKS"));
        assert_eq!(registry.normalize("  banjarmasin ").as_deref(), Some("BMS"));
    }

    #[test]
    fn test_normalize_is_idempotent_on_codes() {
        let registry = BranchRegistry::builtin();
        assert_eq!(registry.normalize("SBY").as_deref(), Some("SBY"));
        assert_eq!(registry.normalize("sby").as_deref(), Some("SBY"));
    }

    #[test]
    fn test_normalize_empty_and_placeholder_values() {
        let registry = BranchRegistry::builtin();
        assert_eq!(registry.normalize(""), None);
        assert_eq!(registry.normalize("   "), None);
        assert_eq!(registry.normalize("nan"), None);
        assert_eq!(registry.normalize("None"), None);
    }

    #[test]
    fn test_normalize_passes_unknown_values_through() {
        let registry = BranchRegistry::builtin();
        assert_eq!(registry.normalize("xyz").as_deref(), Some("XYZ"));
        assert!(!registry.is_known("xyz"));
        assert!(registry.is_known("SEMARANG"));
    }

    #[test]
    fn test_port_of_known_branch() {
        let registry = BranchRegistry::builtin();
        let port = registry.port_of("SBY");
        assert!((port.lat - -7.218371647800905).abs() < 1e-9);
        assert!((port.lng - 112.72841955208024).abs() < 1e-9);
    }

    #[test]
    fn test_port_of_unknown_branch_falls_back_to_jakarta() {
        let registry = BranchRegistry::builtin();
        let fallback = registry.port_of("XYZ");
        let jakarta = registry.port_of("JKT");
        assert_eq!(fallback, jakarta);
    }

    #[test]
    fn test_trucking_cost_is_linear() {
        let registry = BranchRegistry::builtin();
        // MDN 20ft: base 1_137_761, per_km 19_972
        let cost = registry.trucking_cost("MDN", ContainerSize::Feet20, 10.0);
        assert!((cost - (1_137_761.0 + 19_972.0 * 10.0)).abs() < 1e-6);
    }

    #[test]
    fn test_trucking_cost_supports_negative_per_km() {
        let registry = BranchRegistry::builtin();
        let short = registry.trucking_cost("TRK", ContainerSize::Feet20, 5.0);
        let long = registry.trucking_cost("TRK", ContainerSize::Feet20, 50.0);
        // TRK's fitted 20ft per_km is negative, so longer trips cost less
        assert!(long < short);
    }

    #[test]
    fn test_trucking_cost_unknown_branch_uses_default_table() {
        let registry = BranchRegistry::builtin();
        let cost20 = registry.trucking_cost("XYZ", ContainerSize::Feet20, 12.5);
        let cost40 = registry.trucking_cost("XYZ", ContainerSize::Feet40, 12.5);
        assert!((cost20 - (1_200_000.0 + 25_000.0 * 12.5)).abs() < 1e-6);
        assert!((cost40 - (1_800_000.0 + 40_000.0 * 12.5)).abs() < 1e-6);
    }

    #[test]
    fn test_cost_monotonic_in_distance_for_positive_per_km() {
        let registry = BranchRegistry::builtin();
        let near = registry.trucking_cost("BMS", ContainerSize::Feet40, 8.0);
        let far = registry.trucking_cost("BMS", ContainerSize::Feet40, 9.0);
        assert!(far > near);
    }

    #[test]
    fn test_codes_sorted_and_complete() {
        let registry = BranchRegistry::builtin();
        let codes = registry.codes();
        assert_eq!(codes.len(), 41);
        assert!(codes.windows(2).all(|w| w[0] < w[1]));
        assert!(codes.contains(&"SBY"));
        assert!(codes.contains(&"JKT"));
        // Ports without a fitted cost model still resolve
        assert!(codes.contains(&"BKS"));
        assert!(codes.contains(&"BOE"));
        assert!(codes.contains(&"PLM"));
    }
}
