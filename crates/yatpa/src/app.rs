//! Main application logic and lifecycle management.
//!
//! [`Application`] wires the flat world, the notifier, the JSON store and the
//! teleport service together, then drives the service from two background
//! loops: the scheduler tick and the expired-request purge.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    demo,
    error::AppError,
    logging::display_banner,
    notifier::{LogNotifier, MessageCatalog},
    runtime::{SystemClock, ThreadRandom},
    signals::{wait_for_shutdown, wait_for_signal, ShutdownState},
    store::JsonFileStore,
    world::FlatWorld,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use yatpa_core::{ActorId, Collaborators, ConfiguredCostGate, Position, TeleportService};

/// The running host.
pub struct Application {
    config: AppConfig,
    world: Arc<FlatWorld>,
    notifier: Arc<LogNotifier>,
    store: Arc<JsonFileStore>,
    service: Arc<TeleportService>,
}

impl Application {
    /// Loads configuration, applies CLI overrides, validates, and builds the host.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Some(store_path) = args.store_path {
            config.server.store_path = store_path.to_string_lossy().to_string();
        }

        if args.demo {
            config.server.demo = true;
        }

        if let Err(e) = config.validate() {
            return Err(AppError::Config(format!("validation failed: {e}")).into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        display_banner();

        Ok(Self::from_config(config)?)
    }

    /// Builds the host from an already validated configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let world = Arc::new(FlatWorld::new(config.world.clone()));
        let notifier = Arc::new(LogNotifier::new(
            MessageCatalog::new(&config.messages),
            &config.effects,
            world.clone(),
        ));
        let store = Arc::new(JsonFileStore::open(config.store_path())?);
        let cost = Arc::new(ConfiguredCostGate::new(config.teleport.costs.clone(), world.clone()));

        let service = Arc::new(TeleportService::new(
            config.teleport.clone(),
            Collaborators {
                world: world.clone(),
                directory: world.clone(),
                notifier: notifier.clone(),
                clock: Arc::new(SystemClock::new()),
                random: Arc::new(ThreadRandom),
                cost,
                store: store.clone(),
            },
        ));

        Ok(Self { config, world, notifier, store, service })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn world(&self) -> &Arc<FlatWorld> {
        &self.world
    }

    pub fn notifier(&self) -> &Arc<LogNotifier> {
        &self.notifier
    }

    pub fn service(&self) -> &Arc<TeleportService> {
        &self.service
    }

    /// Takes an actor out of the world: drops any pending teleport, records
    /// where they left and forgets their message history.
    pub fn disconnect(&self, actor: ActorId) -> Option<Position> {
        self.service.on_disconnect(actor);
        self.notifier.forget(actor);
        self.world.leave(actor)
    }

    /// Runs until a shutdown signal arrives, or until the demo finishes.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting yatpa");
        self.log_configuration_summary();

        let shutdown = ShutdownState::new();
        let tick_handle = spawn_tick_loop(self.service.clone(), shutdown.clone(), self.config.server.tick_interval_ms);
        let purge_handle =
            spawn_purge_loop(self.service.clone(), shutdown.clone(), self.config.server.purge_interval_ms);

        let outcome = if self.config.server.demo {
            let result = demo::run(&self).await;
            shutdown.initiate_shutdown();
            result
        } else {
            info!("✅ yatpa is now running");
            info!("🛑 Press Ctrl+C to gracefully shutdown");
            wait_for_shutdown(&shutdown).await?;

            // merciless shutdown
            tokio::spawn(async move {
                if let Err(e) = wait_for_signal().await {
                    error!("Failed to set up merciless shutdown signal handler: {e}");
                    return;
                }
                warn!("Shutdown handler received again! I'll make this quick.");
                std::process::exit(1);
            });
            Ok(())
        };

        info!("⏳ Waiting for loops to stop...");
        for (name, handle) in [("tick", tick_handle), ("purge", purge_handle)] {
            match tokio::time::timeout(Duration::from_secs(2), handle).await {
                Ok(Ok(())) => debug!("✅ {} loop stopped", name),
                Ok(Err(e)) => error!("❌ {} loop panicked: {}", name, e),
                Err(_) => warn!("⏰ {} loop did not stop within timeout", name),
            }
        }

        let dropped = self.service.scheduler().len();
        if dropped > 0 {
            info!("🧹 Dropping {} pending teleport(s)", dropped);
        }

        if let Err(e) = self.store.flush() {
            error!("❌ Final store flush failed: {}", e);
        } else {
            info!("💾 Player data saved to {}", self.store.path().display());
        }
        shutdown.complete_shutdown();

        info!("👋 yatpa shutdown complete");
        outcome.map_err(Into::into)
    }

    fn log_configuration_summary(&self) {
        let teleport = &self.config.teleport;
        info!("📋 Configuration Summary:");
        info!(
            "  🕒 Tick every {}ms, purge every {}ms",
            self.config.server.tick_interval_ms, self.config.server.purge_interval_ms
        );
        info!(
            "  ⏳ Delay {}s at {} TPS | cancel on move: {} | cancel on damage: {}",
            teleport.teleport_delay_seconds, teleport.ticks_per_second, teleport.cancel_on_move, teleport.cancel_on_damage
        );
        info!(
            "  📨 Requests expire after {}s, cooldown {}s",
            teleport.request_timeout_seconds, teleport.request_cooldown_seconds
        );
        info!(
            "  🎲 Random teleport {}..{} blocks, cooldown {}s",
            teleport.rtp_min_distance, teleport.rtp_max_distance, teleport.rtp_cooldown_seconds
        );
        info!("  💰 Costs enabled: {} ({:?})", teleport.costs.enabled, teleport.costs.mode);
        info!("  💾 Store: {}", self.store.path().display());
    }
}

/// Ticks the scheduler every `interval_ms` until shutdown.
pub fn spawn_tick_loop(service: Arc<TeleportService>, shutdown: ShutdownState, interval_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick_count: u64 = 0;

        info!("🕒 Scheduler tick started with interval: {}ms", interval_ms);
        loop {
            ticker.tick().await;
            if shutdown.is_shutdown_initiated() {
                break;
            }

            tick_count += 1;
            let summary = service.tick();
            if summary.completed + summary.cancelled + summary.failed > 0 {
                debug!("🕒 Tick {}: {:?}", tick_count, summary);
            }
        }
        info!("✅ Scheduler tick loop completed after {} ticks", tick_count);
    })
}

/// Purges expired requests every `interval_ms` until shutdown.
pub fn spawn_purge_loop(service: Arc<TeleportService>, shutdown: ShutdownState, interval_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if shutdown.is_shutdown_initiated() {
                break;
            }

            let expired = service.purge_expired_requests();
            if !expired.is_empty() {
                debug!("🧹 Purged {} expired request(s)", expired.len());
            }
        }
        info!("✅ Request purge loop completed");
    })
}
