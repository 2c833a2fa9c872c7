//! Sequential pipeline driver.
//!
//! Stages run strictly one after another: locate, resolve, query. A stage
//! failure aborts the rest of the run and leaves the persisted session
//! exactly as it was before the run started; the key+coordinate pair is
//! committed as one unit only after resolve succeeds, and before any
//! querying begins.

use tokio::sync::Mutex;
use tracing::info;

use foundation::math::planar_to_wgs84;
use foundation::{ParcelKey, PlanarCoordinate};
use locator::{LocatorConfig, Page, locate};
use services::{CoordinateResolver, RiskQuery};

use crate::error::{ErrorKind, PipelineError};
use crate::report::{Extraction, FullRun, RiskReport};
use crate::session::{SessionState, SessionStore};

/// Buffer used when the caller does not pick one, meters.
pub const DEFAULT_BUFFER_M: f64 = 500.0;

/// Pipeline stage, for log context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunStage {
    Locating,
    Resolving,
    Querying,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::Locating => write!(f, "locating"),
            RunStage::Resolving => write!(f, "resolving"),
            RunStage::Querying => write!(f, "querying"),
        }
    }
}

pub struct Orchestrator {
    store: SessionStore,
    resolver: Box<dyn CoordinateResolver>,
    risk: Box<dyn RiskQuery>,
    locator_config: LocatorConfig,
    /// Single-flight guard: one run per orchestrator at a time.
    run_lock: Mutex<()>,
}

impl Orchestrator {
    pub fn new(
        store: SessionStore,
        resolver: Box<dyn CoordinateResolver>,
        risk: Box<dyn RiskQuery>,
        locator_config: LocatorConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            risk,
            locator_config,
            run_lock: Mutex::new(()),
        }
    }

    /// The persisted session record, as stored.
    pub async fn session(&self) -> Result<SessionState, PipelineError> {
        Ok(self.store.load().await?)
    }

    /// Locate the parcel key on `page` and resolve its center coordinate.
    pub async fn extract_parcel(&self, page: &dyn Page) -> Result<Extraction, PipelineError> {
        let _run = self.begin_run()?;
        self.extract_inner(page).await
    }

    /// Query risk locations around `coordinate`, or around the session's
    /// stored coordinate when none is given.
    pub async fn query_risk(
        &self,
        coordinate: Option<PlanarCoordinate>,
        buffer_m: f64,
    ) -> Result<RiskReport, PipelineError> {
        let _run = self.begin_run()?;
        let state = self.store.load().await?;
        let center = coordinate.or(state.coordinate).ok_or_else(|| {
            PipelineError::new(
                ErrorKind::Precondition,
                "no resolved coordinate available; extract parcel data first",
            )
        })?;
        self.query_inner(center, state.parcel_key, buffer_m).await
    }

    /// Full pipeline: locate, resolve, persist, then query.
    pub async fn run_full(
        &self,
        page: &dyn Page,
        buffer_m: f64,
    ) -> Result<FullRun, PipelineError> {
        let _run = self.begin_run()?;
        let extraction = self.extract_inner(page).await?;
        let report = self
            .query_inner(
                extraction.coordinate,
                Some(extraction.parcel_key.clone()),
                buffer_m,
            )
            .await?;
        Ok(FullRun { extraction, report })
    }

    fn begin_run(&self) -> Result<tokio::sync::MutexGuard<'_, ()>, PipelineError> {
        self.run_lock.try_lock().map_err(|_| {
            PipelineError::new(ErrorKind::Precondition, "another run is already in progress")
        })
    }

    async fn extract_inner(&self, page: &dyn Page) -> Result<Extraction, PipelineError> {
        info!(stage = %RunStage::Locating, "locating parcel key");
        let key = locate(page, &self.locator_config).await?;

        info!(stage = %RunStage::Resolving, "resolving center for {key}");
        let coordinate = self.resolver.resolve(&key).await?;

        self.store
            .save(&SessionState {
                parcel_key: Some(key.clone()),
                coordinate: Some(coordinate),
            })
            .await?;

        Ok(Extraction {
            parcel_key: key,
            coordinate,
        })
    }

    async fn query_inner(
        &self,
        center: PlanarCoordinate,
        parcel_key: Option<ParcelKey>,
        buffer_m: f64,
    ) -> Result<RiskReport, PipelineError> {
        info!(stage = %RunStage::Querying, "querying risk locations");
        let features = self.risk.query(center, buffer_m).await?;
        let wgs84 = planar_to_wgs84(center);

        Ok(RiskReport {
            parcel_key,
            lambert72: center,
            wgs84,
            risk_locations_found: features.len(),
            risk_locations: features,
        })
    }
}
