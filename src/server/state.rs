//! Application state management

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;
use uuid::Uuid;

use crate::model;
use crate::monitoring::PipelineMetrics;
use crate::scoring::ScoringEngine;
use crate::store::ResultStore;

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    /// `None` when no model artifact could be loaded; uploads then fail
    /// with a service-unavailable response while the rest of the UI works
    pub engine: Option<Arc<ScoringEngine>>,
    pub store: ResultStore,
    pub metrics: Arc<PipelineMetrics>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let metrics = Arc::new(PipelineMetrics::default());
        let engine = match model::load_classifier(&config.models) {
            Ok(classifier) => Some(Arc::new(ScoringEngine::new(classifier, metrics.clone()))),
            Err(e) => {
                warn!("No usable model artifact: {}", e);
                None
            }
        };
        let store = ResultStore::new(config.store.clone());

        Self {
            config,
            engine,
            store,
            metrics,
            started_at: Instant::now(),
        }
    }

    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()[..8].to_string()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.engine.as_deref().map(ScoringEngine::model_name)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Get system information
    pub fn get_system_info(&self) -> serde_json::Value {
        use sysinfo::System;

        let mut sys = System::new_all();
        sys.refresh_all();

        // Calculate overall CPU usage
        let cpu_usage: f32 =
            sys.cpus().iter().map(|c| c.cpu_usage()).sum::<f32>() / sys.cpus().len() as f32;

        serde_json::json!({
            "cpu_count": sys.cpus().len(),
            "cpu_usage": cpu_usage,
            "total_memory_gb": sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
            "used_memory_gb": sys.used_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
            "memory_usage_percent": (sys.used_memory() as f64 / sys.total_memory() as f64) * 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_short_and_unique() {
        let a = AppState::generate_id();
        let b = AppState::generate_id();
        assert_eq!(a.len(), 8);
        assert_ne!(a, b);
    }
}
