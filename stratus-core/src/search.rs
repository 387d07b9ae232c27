use std::sync::Arc;
use std::time::Duration;

use stratus_shared::{EmptyLeg, FlightRequest, LegMatch};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MatchingConfig;
use crate::matcher::{date_window, RouteMatcher};
use crate::repository::EmptyLegRepository;
use crate::viability::{assess_reroute, plan_multi_stop, MultiStopPlan, RerouteViability, StopOrdering};
use crate::{CoreError, CoreResult};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Check a request before any listing is fetched
pub fn validate_request(request: &FlightRequest) -> CoreResult<()> {
    if request.passengers == 0 {
        return Err(CoreError::ValidationError("passengers must be at least 1".to_string()));
    }
    if !request.origin.location.is_valid() {
        return Err(CoreError::ValidationError(format!(
            "origin {} has invalid coordinates",
            request.origin.label()
        )));
    }
    if !request.destination.location.is_valid() {
        return Err(CoreError::ValidationError(format!(
            "destination {} has invalid coordinates",
            request.destination.label()
        )));
    }
    if let Some(km) = request.flexible_distance_km {
        if !km.is_finite() || km < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "flexible_distance_km must be a non-negative number, got {}",
                km
            )));
        }
    }
    Ok(())
}

/// Runs one search: bounded listing retrieval followed by in-memory matching
pub struct EmptyLegSearch {
    repo: Arc<dyn EmptyLegRepository>,
    matcher: RouteMatcher,
    fetch_timeout: Duration,
}

impl EmptyLegSearch {
    pub fn new(repo: Arc<dyn EmptyLegRepository>, config: MatchingConfig) -> Self {
        Self {
            repo,
            matcher: RouteMatcher::new(config),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }

    pub async fn find_matches(&self, request: &FlightRequest) -> CoreResult<Vec<LegMatch>> {
        validate_request(request)?;

        let (from, to) = date_window(request);
        let candidates = self.fetch(self.repo.find_available_legs(from, to)).await?;

        let matches = self.matcher.find_matches(request, &candidates);
        info!(
            %from,
            %to,
            candidates = candidates.len(),
            matches = matches.len(),
            "Empty-leg search completed"
        );
        Ok(matches)
    }

    pub async fn reroute_viability(&self, leg_id: Uuid, request: &FlightRequest) -> CoreResult<RerouteViability> {
        validate_request(request)?;
        let leg = self.load_leg(leg_id).await?;
        Ok(assess_reroute(&leg, request, self.matcher.config()))
    }

    pub async fn multi_stop(
        &self,
        leg_id: Uuid,
        requests: &[FlightRequest],
        ordering: StopOrdering,
    ) -> CoreResult<MultiStopPlan> {
        if requests.is_empty() {
            return Err(CoreError::ValidationError("at least one request is required".to_string()));
        }
        for request in requests {
            validate_request(request)?;
        }

        let leg = self.load_leg(leg_id).await?;
        let seats: u64 = requests.iter().map(|r| u64::from(r.passengers)).sum();
        if seats > u64::from(leg.aircraft_capacity) {
            return Err(CoreError::ValidationError(format!(
                "{} passengers exceed the {} seats on leg {}",
                seats, leg.aircraft_capacity, leg_id
            )));
        }

        Ok(plan_multi_stop(&leg, requests, ordering, self.matcher.config()))
    }

    async fn load_leg(&self, id: Uuid) -> CoreResult<EmptyLeg> {
        self.fetch(self.repo.find_leg(id))
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("empty leg {}", id)))
    }

    async fn fetch<T, F>(&self, query: F) -> CoreResult<T>
    where
        F: std::future::Future<Output = Result<T, Box<dyn std::error::Error + Send + Sync>>>,
    {
        match tokio::time::timeout(self.fetch_timeout, query).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Listing retrieval failed: {}", e);
                Err(CoreError::RetrievalFailed(e.to_string()))
            }
            Err(_) => {
                warn!("Listing retrieval exceeded {:?}", self.fetch_timeout);
                Err(CoreError::RetrievalTimeout(self.fetch_timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryLegRepository;
    use crate::test_support::{airfield, date, leg, request};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use stratus_shared::MatchType;

    struct FailingRepository;

    #[async_trait]
    impl EmptyLegRepository for FailingRepository {
        async fn find_available_legs(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<EmptyLeg>, Box<dyn std::error::Error + Send + Sync>> {
            Err("connection refused".into())
        }

        async fn find_leg(&self, _id: Uuid) -> Result<Option<EmptyLeg>, Box<dyn std::error::Error + Send + Sync>> {
            Err("connection refused".into())
        }
    }

    struct SlowRepository;

    #[async_trait]
    impl EmptyLegRepository for SlowRepository {
        async fn find_available_legs(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<EmptyLeg>, Box<dyn std::error::Error + Send + Sync>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn find_leg(&self, _id: Uuid) -> Result<Option<EmptyLeg>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(None)
        }
    }

    fn teb_opf_request(passengers: u32) -> FlightRequest {
        request(
            airfield("TEB", 40.7128, -74.0060),
            airfield("OPF", 25.7617, -80.1918),
            date(2025, 1, 15),
            passengers,
        )
    }

    fn search_over(legs: Vec<EmptyLeg>) -> EmptyLegSearch {
        EmptyLegSearch::new(Arc::new(MemoryLegRepository::new(legs)), MatchingConfig::default())
    }

    #[tokio::test]
    async fn test_search_applies_date_window() {
        let teb = airfield("TEB", 40.7128, -74.0060);
        let opf = airfield("OPF", 25.7617, -80.1918);
        let on_day = leg(teb.clone(), opf.clone(), date(2025, 1, 15), 8);
        let next_day = leg(teb, opf, date(2025, 1, 16), 8);
        let search = search_over(vec![on_day.clone(), next_day]);

        let mut req = teb_opf_request(4);
        let matches = search.find_matches(&req).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].leg.id, on_day.id);
        assert_eq!(matches[0].match_type, MatchType::Exact);

        req.flexible_days = Some(1);
        assert_eq!(search.find_matches(&req).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_window_is_not_an_error() {
        let search = search_over(Vec::new());
        let matches = search.find_matches(&teb_opf_request(2)).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_surfaced() {
        let search = EmptyLegSearch::new(Arc::new(FailingRepository), MatchingConfig::default());
        let err = search.find_matches(&teb_opf_request(2)).await.unwrap_err();
        assert!(matches!(err, CoreError::RetrievalFailed(ref msg) if msg.contains("connection refused")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieval_timeout_is_surfaced() {
        let search = EmptyLegSearch::new(Arc::new(SlowRepository), MatchingConfig::default())
            .with_fetch_timeout(Duration::from_millis(200));
        let err = search.find_matches(&teb_opf_request(2)).await.unwrap_err();
        assert!(matches!(err, CoreError::RetrievalTimeout(d) if d == Duration::from_millis(200)));
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected() {
        let search = search_over(Vec::new());

        let err = search.find_matches(&teb_opf_request(0)).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        let mut req = teb_opf_request(2);
        req.origin = airfield("???", 123.0, 0.0);
        assert!(matches!(search.find_matches(&req).await, Err(CoreError::ValidationError(_))));

        let mut req = teb_opf_request(2);
        req.flexible_distance_km = Some(-5.0);
        assert!(matches!(search.find_matches(&req).await, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_viability_for_unknown_leg_is_not_found() {
        let search = search_over(Vec::new());
        let err = search.reroute_viability(Uuid::new_v4(), &teb_opf_request(2)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_multi_stop_checks_requests_and_seats() {
        let teb = airfield("TEB", 40.7128, -74.0060);
        let opf = airfield("OPF", 25.7617, -80.1918);
        let small = leg(teb, opf, date(2025, 1, 15), 6);
        let search = search_over(vec![small.clone()]);

        let err = search.multi_stop(small.id, &[], StopOrdering::InputOrder).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        let crowd = vec![teb_opf_request(4), teb_opf_request(4)];
        let err = search.multi_stop(small.id, &crowd, StopOrdering::InputOrder).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(ref msg) if msg.contains("exceed")));

        let huge = vec![teb_opf_request(u32::MAX), teb_opf_request(5)];
        let err = search.multi_stop(small.id, &huge, StopOrdering::InputOrder).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(ref msg) if msg.contains("4294967300 passengers")));

        let pair = vec![teb_opf_request(3), teb_opf_request(3)];
        let plan = search.multi_stop(small.id, &pair, StopOrdering::InputOrder).await.unwrap();
        assert_eq!(plan.stops.len(), 6);
        assert_eq!(plan.leg_id, small.id);
    }
}
