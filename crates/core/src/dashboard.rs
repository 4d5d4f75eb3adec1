//! Dashboard data and its periodic refresh.
//!
//! [`DashboardService`] owns a cached [`DashboardData`] that a background task recomputes on a
//! timer. Each recomputation copies the records out of the store (the only time a store lock
//! is held) and then aggregates the copy. A failed cycle keeps the previous cache.

use crate::aggregate::{feedback_over_time, snapshot, AggregateSnapshot, SentimentPoint};
use crate::alerts::{AlertEvaluator, AlertMessage};
use crate::record::FeedbackRecord;
use crate::store::FeedbackStore;
use crate::{FeedbackError, FeedbackResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;

/// Everything the dashboard shows, computed at `refreshed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub snapshot: AggregateSnapshot,
    pub feedback_over_time: Vec<SentimentPoint>,
    pub forecast: Option<f64>,
    pub refreshed_at: DateTime<Utc>,
}

/// Optional predictive-analytics hook run on every refresh.
///
/// The value it returns is shown as-is; no meaning is attached to it by the service.
pub trait Predictor: Send + Sync {
    fn predict(&self, records: &[FeedbackRecord]) -> Option<f64>;
}

/// The default [`Predictor`]: predicts nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPredictor;

impl Predictor for NoPredictor {
    fn predict(&self, _records: &[FeedbackRecord]) -> Option<f64> {
        None
    }
}

pub struct DashboardService {
    store: Arc<FeedbackStore>,
    alerts: AlertEvaluator,
    predictor: Box<dyn Predictor>,
    cache: RwLock<Option<DashboardData>>,
}

impl DashboardService {
    pub fn new(store: Arc<FeedbackStore>, alerts: AlertEvaluator) -> Self {
        Self {
            store,
            alerts,
            predictor: Box::new(NoPredictor),
            cache: RwLock::new(None),
        }
    }

    pub fn with_predictor(mut self, predictor: impl Predictor + 'static) -> Self {
        self.predictor = Box::new(predictor);
        self
    }

    fn compute(&self, records: &[FeedbackRecord]) -> DashboardData {
        DashboardData {
            snapshot: snapshot(records),
            feedback_over_time: feedback_over_time(records),
            forecast: self.predictor.predict(records),
            refreshed_at: Utc::now(),
        }
    }

    /// Recomputes the dashboard data and replaces the cache.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::LockPoisoned` if the records or cache cannot be locked; the
    /// cached data is left unchanged.
    pub fn refresh(&self) -> FeedbackResult<DashboardData> {
        let records = self.store.all()?;
        let data = self.compute(&records);
        let published = self.publish(data)?;

        tracing::debug!(
            "dashboard refreshed over {} records",
            published.snapshot.total_records
        );
        Ok(published)
    }

    /// Stores `data` unless the cache already holds data computed from more records.
    ///
    /// The store only grows, so a refresh that copied fewer records than the cached data
    /// covers lost a race with a later one and is dropped. Returns whatever the cache holds
    /// afterwards.
    fn publish(&self, data: DashboardData) -> FeedbackResult<DashboardData> {
        let mut cache = self.cache.write().map_err(|_| FeedbackError::LockPoisoned)?;
        if let Some(current) = cache.as_ref() {
            if current.snapshot.total_records > data.snapshot.total_records {
                return Ok(current.clone());
            }
        }
        *cache = Some(data.clone());
        Ok(data)
    }

    /// The most recently refreshed data, computed now if no refresh has happened yet.
    pub fn get_dashboard_data(&self) -> FeedbackResult<DashboardData> {
        let cached = self
            .cache
            .read()
            .map_err(|_| FeedbackError::LockPoisoned)?
            .clone();

        match cached {
            Some(data) => Ok(data),
            None => self.refresh(),
        }
    }

    /// Alerts for the current records.
    pub fn get_alerts(&self) -> FeedbackResult<Vec<AlertMessage>> {
        let records = self.store.all()?;
        Ok(self.alerts.evaluate(&records))
    }

    /// Refreshes every `interval` until `shutdown` changes or its sender is dropped.
    ///
    /// The first refresh happens immediately. Failed cycles are logged and retried on the
    /// next tick.
    pub async fn run_refresher(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh() {
                        tracing::warn!("dashboard refresh failed, keeping previous data: {}", e);
                    }
                }
                _ = shutdown.changed() => {
                    tracing::debug!("dashboard refresher received shutdown signal");
                    break;
                }
            }
        }
    }
}
