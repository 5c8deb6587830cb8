//! Application State
//!
//! Shared state across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use realty_analysis::{AnalysisPipeline, SequenceForecaster};
use realty_config::{PriceTableManager, Settings};
use realty_tools::{CollaboratorStatus, IntegrationError, Integrations};

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Immutable settings, loaded once at startup
    pub settings: Arc<Settings>,
    pub pipeline: Arc<AnalysisPipeline>,
    /// Which collaborators had credentials at startup
    pub collaborators: CollaboratorStatus,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(settings: Settings, pipeline: AnalysisPipeline, collaborators: CollaboratorStatus) -> Self {
        Self {
            settings: Arc::new(settings),
            pipeline: Arc::new(pipeline),
            collaborators,
            metrics: None,
        }
    }

    /// Wire the pipeline from settings: price table file, history dataset
    /// and HTTP collaborators
    pub fn from_settings(settings: Settings) -> Result<Self, IntegrationError> {
        let prices = PriceTableManager::load_or_empty(
            &settings.pricing.table_path,
            settings.pricing.default_price_per_sqft,
        );
        let forecaster = SequenceForecaster::from_config(settings.forecast.clone());
        let integrations = Integrations::from_settings(&settings)?;
        Ok(Self::with_integrations(settings, prices, forecaster, integrations))
    }

    pub fn with_integrations(
        settings: Settings,
        prices: PriceTableManager,
        forecaster: SequenceForecaster,
        integrations: Integrations,
    ) -> Self {
        let collaborators = integrations.status();
        let pipeline = AnalysisPipeline::new(&settings, prices, forecaster, integrations);
        Self::new(settings, pipeline, collaborators)
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Reload the price table from disk
    ///
    /// A failed reload keeps the previous table.
    pub fn reload_prices(&self) -> Result<usize, String> {
        self.pipeline
            .prices()
            .reload()
            .map_err(|e| format!("Failed to reload price table: {}", e))
    }
}
