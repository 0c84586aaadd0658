//! coachd - Skill Coaching Agent Daemon
//!
//! Library components for the daemon process.

pub mod agents;
pub mod courses;
pub mod llm;
pub mod manager;
pub mod runtime;
pub mod server;
pub mod sessions;

use std::path::PathBuf;
use std::sync::Arc;

use coach_core::Config;
use llm::OpenAiClient;
use manager::AgentManager;
use tokio::sync::Notify;
use tracing::{error, info};

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// HTTP server port (default: 7760).
    pub port: u16,
    /// Language model used for conversational responses.
    pub llm_model: String,
    pub llm_temperature: f64,
    pub llm_max_tokens: u32,
    /// Path to the course catalog CSV.
    pub catalog_path: PathBuf,
    /// Default idle age for session sweeps, in hours.
    pub session_max_age_hours: u32,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DaemonConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            port: config.port,
            llm_model: config.llm_model.clone(),
            llm_temperature: config.llm_temperature,
            llm_max_tokens: config.llm_max_tokens,
            catalog_path: config.catalog_path.clone(),
            session_max_age_hours: config.session_max_age_hours,
        }
    }
}

/// Daemon state.
pub struct Daemon {
    config: DaemonConfig,
    manager: Arc<AgentManager>,
    shutdown: Notify,
}

impl Daemon {
    /// Create a new daemon with the given configuration.
    pub async fn new(config: DaemonConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let llm = Arc::new(OpenAiClient::from_env(
            &config.llm_model,
            config.llm_temperature,
            config.llm_max_tokens,
        ));

        let manager = Arc::new(AgentManager::new(llm, &config.catalog_path));
        manager.initialize().await?;

        Ok(Self {
            config,
            manager,
            shutdown: Notify::new(),
        })
    }

    /// Get a reference to the agent manager.
    pub fn manager(&self) -> &Arc<AgentManager> {
        &self.manager
    }

    /// Run the daemon until the HTTP server exits or shutdown is requested.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("coachd starting on port {}", self.config.port);
        info!("model: {}", self.config.llm_model);
        info!("catalog: {}", self.config.catalog_path.display());

        let http_manager = Arc::clone(&self.manager);
        let http_port = self.config.port;
        let http_max_age = self.config.session_max_age_hours;
        let mut http_handle = tokio::spawn(async move {
            if let Err(e) = server::start_server(http_manager, http_port, http_max_age).await {
                error!("HTTP server error: {}", e);
            }
        });

        tokio::select! {
            result = &mut http_handle => {
                if let Err(e) = result {
                    error!("HTTP server task failed: {}", e);
                }
            }
            () = self.shutdown.notified() => {
                info!("shutdown signal received, exiting");
                http_handle.abort();
            }
        }

        if let Err(e) = self.manager.cleanup().await {
            error!("agent cleanup failed: {}", e);
        }

        Ok(())
    }

    /// Signal the daemon to shut down.
    pub fn shutdown(&self) {
        info!("shutdown requested");
        self.shutdown.notify_one();
    }
}
