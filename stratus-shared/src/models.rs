use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// An airport or landing site referenced by a request or a leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airfield {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
    #[serde(flatten)]
    pub location: GeoPoint,
}

impl Airfield {
    pub fn new(name: impl Into<String>, iata: Option<&str>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            iata: iata.map(str::to_string),
            location: GeoPoint::new(latitude, longitude),
        }
    }

    /// Short label for explanations: IATA code when known, display name otherwise
    pub fn label(&self) -> &str {
        self.iata.as_deref().unwrap_or(&self.name)
    }
}

/// A customer's desired trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRequest {
    pub origin: Airfield,
    pub destination: Airfield,
    pub date: NaiveDate,
    pub passengers: u32,
    /// Accept legs departing up to this many days either side of `date`
    #[serde(default)]
    pub flexible_days: Option<u32>,
    /// Maximum total detour tolerated for a reroute match, in km
    #[serde(default)]
    pub flexible_distance_km: Option<f64>,
    #[serde(default)]
    pub aircraft_preferences: Vec<String>,
}

impl FlightRequest {
    pub fn new(origin: Airfield, destination: Airfield, date: NaiveDate, passengers: u32) -> Self {
        Self {
            origin,
            destination,
            date,
            passengers,
            flexible_days: None,
            flexible_distance_km: None,
            aircraft_preferences: Vec::new(),
        }
    }

    pub fn flexible_days(&self) -> u32 {
        self.flexible_days.unwrap_or(0)
    }

    /// Case-insensitive check of the leg's aircraft against the stated preferences
    pub fn prefers_aircraft(&self, aircraft_type: &str) -> bool {
        let aircraft = aircraft_type.to_lowercase();
        self.aircraft_preferences
            .iter()
            .any(|p| !p.is_empty() && aircraft.contains(&p.to_lowercase()))
    }
}

/// A repositioning flight offered by an operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyLeg {
    pub id: Uuid,
    pub operator_id: Uuid,
    pub operator_name: Option<String>,
    pub origin: Airfield,
    pub destination: Airfield,
    pub departure_date: NaiveDate,
    pub aircraft_type: String,
    pub aircraft_capacity: u32,
    pub price: f64,
    pub currency: String,
    pub flexible_routing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Partial,
    Reroute,
    DateFlexible,
    Backhaul,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Partial => "partial",
            MatchType::Reroute => "reroute",
            MatchType::DateFlexible => "date_flexible",
            MatchType::Backhaul => "backhaul",
        }
    }
}

/// Outcome of matching one request against one leg
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegMatch {
    pub leg: EmptyLeg,
    pub match_score: u8,
    pub match_type: MatchType,
    pub savings_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detour_distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detour_time_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backhaul_alternatives: Option<usize>,
    pub explanation: String,
    pub confidence: f64,
}

impl LegMatch {
    /// Score is capped at 100 and confidence clamped to [0, 1]
    pub fn new(
        leg: EmptyLeg,
        match_type: MatchType,
        match_score: u8,
        savings_percent: f64,
        confidence: f64,
        explanation: String,
    ) -> Self {
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        Self {
            leg,
            match_score: match_score.min(100),
            match_type,
            savings_percent,
            detour_distance_km: None,
            detour_time_minutes: None,
            backhaul_alternatives: None,
            explanation,
            confidence,
        }
    }

    pub fn with_detour(mut self, distance_km: f64, time_minutes: u32) -> Self {
        self.detour_distance_km = Some(distance_km);
        self.detour_time_minutes = Some(time_minutes);
        self
    }

    pub fn with_alternatives(mut self, count: usize) -> Self {
        self.backhaul_alternatives = Some(count);
        self
    }
}
