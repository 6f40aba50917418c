//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use approval_directory::{InMemoryDirectory, UserDirectory};
use approval_engine::{EngineConfig, WorkflowEngine};
use notify_dispatch::{
    DispatchConfig, LoggingChannelSender, NotificationDispatcher, NotificationService,
};
use notify_hub::{HubConfig, NotificationHub};
use notify_store::{InMemoryNotificationStore, NotificationStore};
use notify_types::Channel;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Signoff daemon server
pub struct Server {
    config: DaemonConfig,
    engine: Arc<WorkflowEngine>,
    directory: Arc<dyn UserDirectory>,
    dispatcher: Arc<NotificationDispatcher>,
    notifications: Arc<NotificationService>,
    hub: Arc<NotificationHub>,
}

impl Server {
    /// Assemble the component stack from configuration
    pub fn new(config: DaemonConfig) -> Self {
        let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryDirectory::with_users(
            config
                .directory
                .seed_users
                .iter()
                .cloned()
                .map(|seed| seed.into_user()),
        ));

        let engine = Arc::new(WorkflowEngine::with_config(
            Arc::clone(&directory),
            EngineConfig {
                due_soon_window_hours: config.workflow.due_soon_window_hours,
            },
        ));

        let store: Arc<dyn NotificationStore> = Arc::new(InMemoryNotificationStore::new());

        let hub = Arc::new(NotificationHub::with_config(HubConfig {
            queue_capacity: config.stream.queue_capacity,
            dedup_window: config.stream.dedup_window,
        }));

        let mut dispatcher = NotificationDispatcher::new(
            Arc::clone(&engine),
            Arc::clone(&directory),
            Arc::clone(&store),
            Arc::clone(&hub),
        )
        .with_config(DispatchConfig {
            stakeholders: config.fanout.stakeholders.clone(),
            ..DispatchConfig::default()
        });
        if config.fanout.log_channel_sends {
            for channel in Channel::ALL {
                dispatcher = dispatcher.with_sender(Arc::new(LoggingChannelSender::new(channel)));
            }
        }

        let notifications = Arc::new(NotificationService::new(
            Arc::clone(&store),
            Arc::clone(&hub),
        ));

        Self {
            config,
            engine,
            directory,
            dispatcher: Arc::new(dispatcher),
            notifications,
            hub,
        }
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(
            Arc::clone(&self.engine),
            Arc::clone(&self.directory),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.notifications),
            Arc::clone(&self.hub),
        );

        let app = create_router(state, self.config.server.enable_cors);
        let listener = TcpListener::bind(addr).await?;

        info!("signoff daemon listening on {}", addr);
        info!(
            "seeded {} directory users",
            self.config.directory.seed_users.len()
        );

        // Start the due-date sweep in the background
        let sweep = tokio::spawn(due_date_sweep(
            Arc::clone(&self.engine),
            Arc::clone(&self.dispatcher),
            self.config.workflow.due_sweep_interval_secs,
        ));

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        info!("signoff daemon shutting down");
        sweep.abort();

        Ok(())
    }
}

/// Periodically scan for due and overdue reports and dispatch the
/// resulting warnings and escalations.
async fn due_date_sweep(
    engine: Arc<WorkflowEngine>,
    dispatcher: Arc<NotificationDispatcher>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let events = engine.check_due_dates(chrono::Utc::now());
        for event in &events {
            if let Err(error) = dispatcher.handle(event).await {
                warn!(report_id = %event.report_id, %error, "due-date dispatch failed");
            }
        }
        if !events.is_empty() {
            info!(events = events.len(), "due-date sweep dispatched");
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("received terminate signal, initiating graceful shutdown");
        }
    }
}
