use serde::{Deserialize, Serialize};
use stratus_shared::{EmptyLeg, FlightRequest, GeoPoint};
use uuid::Uuid;

use crate::config::MatchingConfig;
use crate::geo::{haversine_km, path_length_km};

/// Economics of diverting one leg to serve one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerouteViability {
    pub leg_id: Uuid,
    pub additional_distance_km: f64,
    pub fuel_cost: f64,
    pub additional_revenue: f64,
    pub net_gain: f64,
    pub viable: bool,
}

/// Insert the request's origin and destination into the leg's route and
/// compare the extra fuel cost with the revenue it brings.
pub fn assess_reroute(leg: &EmptyLeg, request: &FlightRequest, config: &MatchingConfig) -> RerouteViability {
    let direct = haversine_km(&leg.origin.location, &leg.destination.location);
    let via_request = path_length_km(&[
        leg.origin.location,
        request.origin.location,
        request.destination.location,
        leg.destination.location,
    ]);
    let additional_distance_km = (via_request - direct).max(0.0);

    let fuel_cost = additional_distance_km * config.fuel_cost_per_km;
    let additional_revenue = leg.price * config.reroute_revenue_share;
    let net_gain = additional_revenue - fuel_cost;

    RerouteViability {
        leg_id: leg.id,
        additional_distance_km,
        fuel_cost,
        additional_revenue,
        net_gain,
        viable: net_gain > 0.0,
    }
}

/// How stops are sequenced on a multi-stop plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOrdering {
    /// Pickup then dropoff for each request, in the order given
    #[default]
    InputOrder,
    /// Always fly to the closest pending stop; a dropoff opens once its pickup is done
    NearestNeighbour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Origin,
    Pickup,
    Dropoff,
    Destination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub kind: StopKind,
    /// Index into the submitted requests; absent for the leg's own endpoints
    pub request_index: Option<usize>,
    pub label: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiStopPlan {
    pub leg_id: Uuid,
    pub ordering: StopOrdering,
    pub stops: Vec<Stop>,
    pub total_distance_km: f64,
    pub direct_distance_km: f64,
    pub detour_km: f64,
    pub detour_cost: f64,
    pub estimated_revenue: f64,
    pub viable: bool,
}

/// Build a stop sequence serving every request on one leg.
///
/// Neither ordering searches permutations or honours time windows, so the
/// plan is a heuristic estimate rather than an optimal route.
pub fn plan_multi_stop(
    leg: &EmptyLeg,
    requests: &[FlightRequest],
    ordering: StopOrdering,
    config: &MatchingConfig,
) -> MultiStopPlan {
    let mut stops = Vec::with_capacity(requests.len() * 2 + 2);
    stops.push(Stop {
        kind: StopKind::Origin,
        request_index: None,
        label: leg.origin.label().to_string(),
        location: leg.origin.location,
    });

    match ordering {
        StopOrdering::InputOrder => {
            for (i, request) in requests.iter().enumerate() {
                stops.push(pickup(i, request));
                stops.push(dropoff(i, request));
            }
        }
        StopOrdering::NearestNeighbour => nearest_neighbour(leg, requests, &mut stops),
    }

    stops.push(Stop {
        kind: StopKind::Destination,
        request_index: None,
        label: leg.destination.label().to_string(),
        location: leg.destination.location,
    });

    let points: Vec<GeoPoint> = stops.iter().map(|s| s.location).collect();
    let total_distance_km = path_length_km(&points);
    let direct_distance_km = haversine_km(&leg.origin.location, &leg.destination.location);
    let detour_km = (total_distance_km - direct_distance_km).max(0.0);
    let detour_cost = detour_km * config.fuel_cost_per_km;
    let estimated_revenue = leg.price * config.multi_stop_revenue_share * requests.len() as f64;

    MultiStopPlan {
        leg_id: leg.id,
        ordering,
        stops,
        total_distance_km,
        direct_distance_km,
        detour_km,
        detour_cost,
        estimated_revenue,
        viable: estimated_revenue > detour_cost,
    }
}

fn pickup(index: usize, request: &FlightRequest) -> Stop {
    Stop {
        kind: StopKind::Pickup,
        request_index: Some(index),
        label: request.origin.label().to_string(),
        location: request.origin.location,
    }
}

fn dropoff(index: usize, request: &FlightRequest) -> Stop {
    Stop {
        kind: StopKind::Dropoff,
        request_index: Some(index),
        label: request.destination.label().to_string(),
        location: request.destination.location,
    }
}

fn nearest_neighbour(leg: &EmptyLeg, requests: &[FlightRequest], stops: &mut Vec<Stop>) {
    let mut picked = vec![false; requests.len()];
    let mut dropped = vec![false; requests.len()];
    let mut current = leg.origin.location;

    for _ in 0..requests.len() * 2 {
        let mut best: Option<(f64, Stop)> = None;
        for (i, request) in requests.iter().enumerate() {
            let candidate = if !picked[i] {
                pickup(i, request)
            } else if !dropped[i] {
                dropoff(i, request)
            } else {
                continue;
            };
            let distance = haversine_km(&current, &candidate.location);
            if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                best = Some((distance, candidate));
            }
        }

        let Some((_, stop)) = best else { break };
        if let Some(i) = stop.request_index {
            match stop.kind {
                StopKind::Pickup => picked[i] = true,
                _ => dropped[i] = true,
            }
        }
        current = stop.location;
        stops.push(stop);
    }
}
