use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use stratus_shared::{EmptyLeg, FlightRequest, LegMatch, MatchType};
use tracing::debug;

use crate::config::MatchingConfig;
use crate::geo::haversine_km;

const EXACT_CONFIDENCE: f64 = 1.0;
const PARTIAL_CONFIDENCE: f64 = 0.9;
const REROUTE_CONFIDENCE: f64 = 0.8;
const BACKHAUL_CONFIDENCE: f64 = 0.7;

const EXACT_SCORE: u8 = 100;
const BACKHAUL_SCORE: u8 = 75;

/// Share of the detour allowance that a full-allowance detour costs in score
const REROUTE_PENALTY_POINTS: f64 = 30.0;

/// Inclusive date range `date ± flexible_days`
pub fn date_window(request: &FlightRequest) -> (NaiveDate, NaiveDate) {
    let days = Days::new(u64::from(request.flexible_days()));
    let from = request.date.checked_sub_days(days).unwrap_or(NaiveDate::MIN);
    let to = request.date.checked_add_days(days).unwrap_or(NaiveDate::MAX);
    (from, to)
}

/// Legs departing inside the request's date window
pub fn candidates_in_window<'a>(request: &FlightRequest, legs: &'a [EmptyLeg]) -> Vec<&'a EmptyLeg> {
    let (from, to) = date_window(request);
    legs.iter()
        .filter(|leg| leg.departure_date >= from && leg.departure_date <= to)
        .collect()
}

/// Distances between the requested airfields and a leg's airfields
#[derive(Debug, Clone, Copy)]
struct Deviation {
    origin_km: f64,
    destination_km: f64,
}

impl Deviation {
    fn between(request: &FlightRequest, leg: &EmptyLeg) -> Self {
        Self {
            origin_km: haversine_km(&request.origin.location, &leg.origin.location),
            destination_km: haversine_km(&request.destination.location, &leg.destination.location),
        }
    }

    fn total(&self) -> f64 {
        self.origin_km + self.destination_km
    }

    fn average(&self) -> f64 {
        self.total() / 2.0
    }
}

/// Tiered empty-leg matcher.
///
/// Each leg is tried against exact, partial, reroute and backhaul rules in
/// that order; the first rule that accepts the leg produces its only match.
pub struct RouteMatcher {
    config: MatchingConfig,
}

impl RouteMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Legs too small for the party are never matched nor counted as backhaul options
    pub fn is_eligible(&self, request: &FlightRequest, leg: &EmptyLeg) -> bool {
        leg.aircraft_capacity >= request.passengers
    }

    /// Match every candidate and rank the results by descending score
    pub fn find_matches(&self, request: &FlightRequest, candidates: &[EmptyLeg]) -> Vec<LegMatch> {
        let mut seen = HashSet::new();
        let pool: Vec<&EmptyLeg> = candidates
            .iter()
            .filter(|leg| self.is_eligible(request, leg))
            .filter(|leg| seen.insert(leg.id))
            .collect();

        let excluded = candidates.len() - pool.len();
        if excluded > 0 {
            debug!(excluded, passengers = request.passengers, "Dropped ineligible or duplicate legs");
        }

        let mut matches: Vec<LegMatch> = pool
            .iter()
            .filter_map(|leg| self.match_leg(request, leg, &pool))
            .collect();

        // sort_by is stable, so equal scores keep candidate order
        matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        matches
    }

    /// Try each tier in order against a single leg.
    ///
    /// `pool` is the set of eligible candidates used to look for backhaul
    /// partners; the leg itself may be part of it.
    pub fn match_leg(&self, request: &FlightRequest, leg: &EmptyLeg, pool: &[&EmptyLeg]) -> Option<LegMatch> {
        if !self.is_eligible(request, leg) {
            return None;
        }

        let deviation = Deviation::between(request, leg);
        let mut matched = self
            .exact(leg, &deviation)
            .or_else(|| self.partial(request, leg, &deviation))
            .or_else(|| self.reroute(request, leg, &deviation))
            .or_else(|| self.backhaul(leg, pool))?;

        if request.prefers_aircraft(&leg.aircraft_type) {
            matched.explanation.push_str(" Preferred aircraft type.");
        }
        Some(matched)
    }

    fn exact(&self, leg: &EmptyLeg, deviation: &Deviation) -> Option<LegMatch> {
        let radius = self.config.exact_radius_km;
        if deviation.origin_km > radius || deviation.destination_km > radius {
            return None;
        }

        let explanation = format!(
            "Exact route match: {} to {} departs within {:.0} km of both requested airfields.",
            leg.origin.label(),
            leg.destination.label(),
            radius
        );
        Some(LegMatch::new(
            leg.clone(),
            MatchType::Exact,
            EXACT_SCORE,
            self.config.exact_savings,
            EXACT_CONFIDENCE,
            explanation,
        ))
    }

    /// Percentage of the requested route covered by the leg, floored at zero
    pub fn route_overlap(&self, request: &FlightRequest, leg: &EmptyLeg) -> f64 {
        Self::overlap_for(request, &Deviation::between(request, leg))
    }

    fn overlap_for(request: &FlightRequest, deviation: &Deviation) -> f64 {
        let requested_km = haversine_km(&request.origin.location, &request.destination.location);
        if requested_km <= 0.0 {
            return 0.0;
        }
        (100.0 - (deviation.average() / requested_km) * 100.0).max(0.0)
    }

    fn partial(&self, request: &FlightRequest, leg: &EmptyLeg, deviation: &Deviation) -> Option<LegMatch> {
        let overlap = Self::overlap_for(request, deviation);
        if overlap < self.config.partial_min_overlap {
            return None;
        }

        let score = overlap.round().min(100.0) as u8;
        let explanation = format!(
            "Partial match: {} to {} covers {}% of the requested route (origin {:.0} km, destination {:.0} km away).",
            leg.origin.label(),
            leg.destination.label(),
            score,
            deviation.origin_km,
            deviation.destination_km
        );
        Some(LegMatch::new(
            leg.clone(),
            MatchType::Partial,
            score,
            self.config.partial_savings,
            PARTIAL_CONFIDENCE,
            explanation,
        ))
    }

    fn max_detour_km(&self, request: &FlightRequest) -> f64 {
        request
            .flexible_distance_km
            .unwrap_or(self.config.default_max_detour_km)
    }

    /// Score for a reroute needing `detour_km` when `max_detour_km` is tolerated
    pub fn reroute_score(detour_km: f64, max_detour_km: f64) -> u8 {
        let ratio = if max_detour_km > 0.0 { detour_km / max_detour_km } else { 0.0 };
        (100.0 - ratio * REROUTE_PENALTY_POINTS).max(0.0).round().min(100.0) as u8
    }

    /// Flying time for extra distance at the configured cruise speed
    pub fn detour_minutes(&self, detour_km: f64) -> u32 {
        if self.config.cruise_speed_kmh <= 0.0 {
            return 0;
        }
        (detour_km / (self.config.cruise_speed_kmh / 60.0)).round() as u32
    }

    fn reroute(&self, request: &FlightRequest, leg: &EmptyLeg, deviation: &Deviation) -> Option<LegMatch> {
        let max_detour = self.max_detour_km(request);
        let detour = deviation.total();
        if detour > max_detour {
            return None;
        }

        let minutes = self.detour_minutes(detour);
        let explanation = format!(
            "Reroute match: {} to {} with {:.0} km total detour (about {} min extra).",
            leg.origin.label(),
            leg.destination.label(),
            detour,
            minutes
        );
        Some(
            LegMatch::new(
                leg.clone(),
                MatchType::Reroute,
                Self::reroute_score(detour, max_detour),
                self.config.reroute_savings,
                REROUTE_CONFIDENCE,
                explanation,
            )
            .with_detour(detour, minutes),
        )
    }

    /// Number of other legs departing near this leg's destination
    pub fn backhaul_alternatives(&self, leg: &EmptyLeg, pool: &[&EmptyLeg]) -> usize {
        pool.iter()
            .filter(|other| other.id != leg.id)
            .filter(|other| {
                haversine_km(&leg.destination.location, &other.origin.location) <= self.config.backhaul_radius_km
            })
            .count()
    }

    fn backhaul(&self, leg: &EmptyLeg, pool: &[&EmptyLeg]) -> Option<LegMatch> {
        let alternatives = self.backhaul_alternatives(leg, pool);
        if alternatives == 0 {
            return None;
        }

        let explanation = format!(
            "Backhaul opportunity: {} to {} with {} return leg(s) departing within {:.0} km of {}.",
            leg.origin.label(),
            leg.destination.label(),
            alternatives,
            self.config.backhaul_radius_km,
            leg.destination.label()
        );
        Some(
            LegMatch::new(
                leg.clone(),
                MatchType::Backhaul,
                BACKHAUL_SCORE,
                self.config.backhaul_savings,
                BACKHAUL_CONFIDENCE,
                explanation,
            )
            .with_alternatives(alternatives),
        )
    }
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}
