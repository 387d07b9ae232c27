use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::error::Error;
use stratus_core::repository::EmptyLegRepository;
use stratus_shared::{Airfield, EmptyLeg};
use uuid::Uuid;

const LEG_COLUMNS: &str = r#"
    l.id, l.operator_id, o.name AS operator_name,
    l.origin_iata, l.origin_name, l.origin_lat, l.origin_lon,
    l.destination_iata, l.destination_name, l.destination_lat, l.destination_lon,
    l.departure_date, l.aircraft_type, l.aircraft_capacity,
    l.price, l.currency, l.flexible_routing
"#;

pub struct PostgresEmptyLegRepository {
    pool: PgPool,
}

impl PostgresEmptyLegRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LegRow {
    id: Uuid,
    operator_id: Uuid,
    operator_name: Option<String>,
    origin_iata: String,
    origin_name: String,
    origin_lat: f64,
    origin_lon: f64,
    destination_iata: String,
    destination_name: String,
    destination_lat: f64,
    destination_lon: f64,
    departure_date: NaiveDate,
    aircraft_type: String,
    aircraft_capacity: i32,
    price: f64,
    currency: String,
    flexible_routing: bool,
}

impl LegRow {
    fn into_leg(self) -> Result<EmptyLeg, Box<dyn Error + Send + Sync>> {
        let aircraft_capacity = u32::try_from(self.aircraft_capacity)
            .map_err(|_| format!("leg {} has negative capacity {}", self.id, self.aircraft_capacity))?;

        Ok(EmptyLeg {
            id: self.id,
            operator_id: self.operator_id,
            operator_name: self.operator_name,
            origin: Airfield::new(self.origin_name, Some(&self.origin_iata), self.origin_lat, self.origin_lon),
            destination: Airfield::new(
                self.destination_name,
                Some(&self.destination_iata),
                self.destination_lat,
                self.destination_lon,
            ),
            departure_date: self.departure_date,
            aircraft_type: self.aircraft_type,
            aircraft_capacity,
            price: self.price,
            currency: self.currency,
            flexible_routing: self.flexible_routing,
        })
    }
}

#[async_trait]
impl EmptyLegRepository for PostgresEmptyLegRepository {
    async fn find_available_legs(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EmptyLeg>, Box<dyn Error + Send + Sync>> {
        let sql = format!(
            r#"
            SELECT {LEG_COLUMNS}
            FROM empty_legs l
            LEFT JOIN operators o ON o.id = l.operator_id
            WHERE
                l.status = 'available'
                AND l.departure_date BETWEEN $1 AND $2
            ORDER BY l.departure_date, l.id
            "#
        );

        let rows: Vec<LegRow> = sqlx::query_as(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(%from, %to, rows = rows.len(), "Fetched empty-leg candidates");
        rows.into_iter().map(LegRow::into_leg).collect()
    }

    async fn find_leg(
        &self,
        id: Uuid,
    ) -> Result<Option<EmptyLeg>, Box<dyn Error + Send + Sync>> {
        let sql = format!(
            r#"
            SELECT {LEG_COLUMNS}
            FROM empty_legs l
            LEFT JOIN operators o ON o.id = l.operator_id
            WHERE l.id = $1
            "#
        );

        let row: Option<LegRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LegRow::into_leg).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(capacity: i32) -> LegRow {
        LegRow {
            id: Uuid::new_v4(),
            operator_id: Uuid::new_v4(),
            operator_name: None,
            origin_iata: "TEB".to_string(),
            origin_name: "Teterboro".to_string(),
            origin_lat: 40.7128,
            origin_lon: -74.0060,
            destination_iata: "OPF".to_string(),
            destination_name: "Opa-locka Executive".to_string(),
            destination_lat: 25.7617,
            destination_lon: -80.1918,
            departure_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            aircraft_type: "Challenger 350".to_string(),
            aircraft_capacity: capacity,
            price: 14500.0,
            currency: "USD".to_string(),
            flexible_routing: false,
        }
    }

    #[test]
    fn test_row_maps_to_leg() {
        let leg = row(9).into_leg().unwrap();
        assert_eq!(leg.origin.label(), "TEB");
        assert_eq!(leg.origin.name, "Teterboro");
        assert_eq!(leg.destination.location.latitude, 25.7617);
        assert_eq!(leg.aircraft_capacity, 9);
        assert!(leg.operator_name.is_none());
    }

    #[test]
    fn test_negative_capacity_is_rejected() {
        let err = row(-1).into_leg().unwrap_err();
        assert!(err.to_string().contains("negative capacity"));
    }
}
