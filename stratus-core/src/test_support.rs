use chrono::NaiveDate;
use stratus_shared::{Airfield, EmptyLeg, FlightRequest};
use uuid::Uuid;

pub fn airfield(code: &str, latitude: f64, longitude: f64) -> Airfield {
    Airfield::new(code, Some(code), latitude, longitude)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn leg(origin: Airfield, destination: Airfield, departure_date: NaiveDate, capacity: u32) -> EmptyLeg {
    EmptyLeg {
        id: Uuid::new_v4(),
        operator_id: Uuid::new_v4(),
        operator_name: Some("Test Operator".to_string()),
        origin,
        destination,
        departure_date,
        aircraft_type: "Citation X".to_string(),
        aircraft_capacity: capacity,
        price: 12000.0,
        currency: "USD".to_string(),
        flexible_routing: true,
    }
}

pub fn request(origin: Airfield, destination: Airfield, date: NaiveDate, passengers: u32) -> FlightRequest {
    FlightRequest::new(origin, destination, date, passengers)
}
