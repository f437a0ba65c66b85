//! HTTP surface for `pulse`.
//!
//! Owns the axum router and wires together the background work:
//! - the sampling loop feeding the shared [`HistoryBuffer`]
//! - the report assembler read by every request
//! - graceful shutdown on Ctrl+C / SIGTERM

pub mod error;
pub mod routes;

pub use error::ApiError;

use pulse_config::{PulseConfig, SamplerConfig};
use pulse_core::{HealthScorer, Result};
use pulse_system::{
    spawn_sampler, HistoryBuffer, HostMetadata, HostSource, Jitter, LocalClock, MetricSampler,
    ReportAssembler,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// State shared by every handler.  Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<ReportAssembler>,
    pub history:   Arc<HistoryBuffer>,
    dashboard:     Arc<str>,
}

impl AppState {
    pub fn new(assembler: Arc<ReportAssembler>, refresh_secs: u64) -> Self {
        let history = Arc::clone(assembler.history());
        Self {
            assembler,
            history,
            dashboard: pulse_renderer::render_dashboard(refresh_secs).into(),
        }
    }

    pub fn dashboard(&self) -> &str {
        &self.dashboard
    }
}

/// Sampler reading this host, configured from `[sampler]`.
pub fn build_sampler(config: &SamplerConfig) -> MetricSampler {
    MetricSampler::new(
        HostSource::new(&config.cgroup_root, &config.disk_path),
        config.seed,
    )
    .with_jitter(Jitter {
        cpu:  config.cpu_jitter,
        ram:  config.ram_jitter,
        disk: config.disk_jitter,
    })
}

/// Assembler over `history`, scoring and formatting per `config`.
pub fn build_assembler(config: &PulseConfig, history: Arc<HistoryBuffer>) -> ReportAssembler {
    ReportAssembler::new(
        history,
        HealthScorer::new(config.health.weights, config.health.thresholds),
        HostMetadata::collect(),
        LocalClock::new(config.display.utc_offset_minutes, config.display.label.clone()),
    )
}

/// Start sampling and serve HTTP until a shutdown signal arrives.
pub async fn serve(config: PulseConfig) -> Result<()> {
    let history = Arc::new(HistoryBuffer::new(config.sampler.history_capacity));
    let sampling = spawn_sampler(
        build_sampler(&config.sampler),
        Arc::clone(&history),
        config.sampler.interval(),
    );

    let assembler = Arc::new(build_assembler(&config, history));
    let state = AppState::new(assembler, config.server.refresh_secs);

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        addr = %addr,
        interval_secs = config.sampler.interval_secs,
        history_capacity = config.sampler.history_capacity,
        "pulse listening"
    );

    let served = axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sampling.abort();
    info!("pulse stopped");
    served.map_err(Into::into)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
