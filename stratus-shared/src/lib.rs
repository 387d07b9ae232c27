pub mod models;

pub use models::{Airfield, EmptyLeg, FlightRequest, GeoPoint, LegMatch, MatchType};
