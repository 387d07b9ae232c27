use async_trait::async_trait;
use chrono::NaiveDate;
use stratus_shared::EmptyLeg;
use uuid::Uuid;

/// Read-only access to empty-leg listings
#[async_trait]
pub trait EmptyLegRepository: Send + Sync {
    /// Available legs departing between `from` and `to`, both inclusive
    async fn find_available_legs(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EmptyLeg>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_leg(
        &self,
        id: Uuid,
    ) -> Result<Option<EmptyLeg>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Listings held in memory, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryLegRepository {
    legs: Vec<EmptyLeg>,
}

impl MemoryLegRepository {
    pub fn new(legs: Vec<EmptyLeg>) -> Self {
        Self { legs }
    }
}

#[async_trait]
impl EmptyLegRepository for MemoryLegRepository {
    async fn find_available_legs(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EmptyLeg>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .legs
            .iter()
            .filter(|leg| leg.departure_date >= from && leg.departure_date <= to)
            .cloned()
            .collect())
    }

    async fn find_leg(
        &self,
        id: Uuid,
    ) -> Result<Option<EmptyLeg>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.legs.iter().find(|leg| leg.id == id).cloned())
    }
}
