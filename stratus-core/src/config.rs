use serde::{Deserialize, Serialize};

/// Thresholds and economic constants used by matching and viability checks.
///
/// The economic figures are illustrative defaults. Deployments override them
/// through configuration files or the `matching_rules` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Max distance (km) between requested and leg airfields for an exact match
    pub exact_radius_km: f64,

    /// Minimum route overlap percentage for a partial match
    pub partial_min_overlap: f64,

    /// Detour allowance (km) when the request does not state one
    pub default_max_detour_km: f64,

    /// Max distance (km) from a leg's destination to another leg's origin for backhaul
    pub backhaul_radius_km: f64,

    /// Effective speed used to turn detour distance into minutes
    pub cruise_speed_kmh: f64,

    /// Operating cost per additional km flown
    pub fuel_cost_per_km: f64,

    /// Share of the leg price captured when rerouting for one request
    pub reroute_revenue_share: f64,

    /// Share of the leg price captured per request on a multi-stop plan
    pub multi_stop_revenue_share: f64,

    /// Estimated savings versus a full charter, per tier (percent)
    pub exact_savings: f64,
    pub partial_savings: f64,
    pub reroute_savings: f64,
    pub backhaul_savings: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            exact_radius_km: 50.0,
            partial_min_overlap: 90.0,
            default_max_detour_km: 100.0,
            backhaul_radius_km: 100.0,
            cruise_speed_kmh: 420.0,
            fuel_cost_per_km: 5.0,
            reroute_revenue_share: 0.70,
            multi_stop_revenue_share: 0.60,
            exact_savings: 60.0,
            partial_savings: 55.0,
            reroute_savings: 50.0,
            backhaul_savings: 65.0,
        }
    }
}

impl MatchingConfig {
    /// Set a field by its config key. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: f64) -> bool {
        let slot = match key {
            "exact_radius_km" => &mut self.exact_radius_km,
            "partial_min_overlap" => &mut self.partial_min_overlap,
            "default_max_detour_km" => &mut self.default_max_detour_km,
            "backhaul_radius_km" => &mut self.backhaul_radius_km,
            "cruise_speed_kmh" => &mut self.cruise_speed_kmh,
            "fuel_cost_per_km" => &mut self.fuel_cost_per_km,
            "reroute_revenue_share" => &mut self.reroute_revenue_share,
            "multi_stop_revenue_share" => &mut self.multi_stop_revenue_share,
            "exact_savings" => &mut self.exact_savings,
            "partial_savings" => &mut self.partial_savings,
            "reroute_savings" => &mut self.reroute_savings,
            "backhaul_savings" => &mut self.backhaul_savings,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Reject settings that would make scoring meaningless
    pub fn validate(&self) -> Result<(), String> {
        let non_negative = [
            ("exact_radius_km", self.exact_radius_km),
            ("default_max_detour_km", self.default_max_detour_km),
            ("backhaul_radius_km", self.backhaul_radius_km),
            ("fuel_cost_per_km", self.fuel_cost_per_km),
            ("reroute_revenue_share", self.reroute_revenue_share),
            ("multi_stop_revenue_share", self.multi_stop_revenue_share),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        if !(self.cruise_speed_kmh.is_finite() && self.cruise_speed_kmh > 0.0) {
            return Err(format!("cruise_speed_kmh must be positive, got {}", self.cruise_speed_kmh));
        }
        if !(0.0..=100.0).contains(&self.partial_min_overlap) {
            return Err(format!(
                "partial_min_overlap must be within 0..=100, got {}",
                self.partial_min_overlap
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(MatchingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_set_known_and_unknown_keys() {
        let mut config = MatchingConfig::default();
        assert!(config.set("fuel_cost_per_km", 7.5));
        assert_eq!(config.fuel_cost_per_km, 7.5);
        assert!(!config.set("warp_factor", 9.0));
    }

    #[test]
    fn test_validate_rejects_zero_speed() {
        let config = MatchingConfig { cruise_speed_kmh: 0.0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: MatchingConfig = serde_json::from_str(r#"{ "fuel_cost_per_km": 6.0 }"#).unwrap();
        assert_eq!(config.fuel_cost_per_km, 6.0);
        assert_eq!(config.exact_radius_km, 50.0);
    }
}
