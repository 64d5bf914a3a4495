//! trace-topology - Bring-up Entry Point
//!
//! Loads the configuration (first argument, else the platform config file),
//! discovers the trace pipeline from the hardware description, registers
//! the event facade with a logging host and optionally exports a snapshot.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use trace_topology::{
    config::{default_config_path, DiscoveryConfig},
    descriptor::DescriptorTree,
    discovery::bring_up,
    facade::{register_facade, LoggingHost, TraceEventFacade},
    topology::TopologySnapshot,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(config: &DiscoveryConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .with_context(|| format!("invalid log filter '{}'", config.logging.filter))?;

    let (file_layer, guard) = match &config.logging.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .with_context(|| format!("log file {:?} has no file name", path))?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {:?}", dir))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    // An explicit path must load; the platform default may be absent.
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match &explicit {
        Some(path) => DiscoveryConfig::load(path)?,
        None => default_config_path()
            .map(DiscoveryConfig::load_or_default)
            .unwrap_or_default(),
    };
    let config_path = explicit.or_else(default_config_path);

    let _log_guard = init_logging(&config)?;
    tracing::info!("Starting trace topology bring-up");

    let description = config.resolve_description_path(config_path.as_deref());
    tracing::info!("Loading hardware description from {:?}", description);
    let tree = DescriptorTree::load(&description)
        .with_context(|| format!("failed to load {:?}", description))?;

    let outcome = bring_up(&tree, config.validate_links).context("bring-up failed")?;
    if !outcome.link_issues.is_empty() {
        tracing::warn!("{} link issue(s) tolerated", outcome.link_issues.len());
    }

    if let Some(path) = &config.export_path {
        TopologySnapshot::capture(&outcome.registry).save(path)?;
        tracing::info!("Exported topology to {:?}", path);
    }

    let shared = outcome.registry.into_shared();
    let facade = Arc::new(TraceEventFacade::new(shared)?);
    let mut host = LoggingHost::new();
    register_facade(&mut host, facade, &config.pmu_name)?;

    tracing::info!("Bring-up complete");
    Ok(())
}
