// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `conclaved`: the coordination daemon binary. Wires the pure core types
//! and the SQLite store to live dispatch, starts the DM poll loop, and waits
//! for a shutdown signal. The channel-mention and manual trigger paths, and
//! the `ask_agent`/orchestrator RPCs, are exposed to operators and agent
//! tooling through a transport outside this crate's scope (see `bus.rs`);
//! this binary only owns the scheduling loop and the shared dispatch state.

use conclave_core::{AgentId, Config, SystemClock};
use conclave_daemon::bus::EventBus;
use conclave_daemon::dispatcher::Dispatcher;
use conclave_daemon::orchestrator::OrchestratorRunner;
use conclave_daemon::standup::StandupRunner;
use conclave_daemon::{ask_agent, poll};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `COORD_AGENTS`: comma-separated dispatchable agent ids. The registry
/// itself (metadata, enablement, ownership) is out of this crate's scope;
/// this is the minimal seam needed to hand the dispatcher a fixed set at
/// startup.
fn dispatchable_agents_from_env() -> Vec<AgentId> {
    std::env::var("COORD_AGENTS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AgentId::new)
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let dispatchable = dispatchable_agents_from_env();
    if dispatchable.is_empty() {
        tracing::warn!("COORD_AGENTS is empty; the dispatcher will accept no triggers");
    }

    let pool = conclave_storage::open(&config.db_path).await?;
    let bus = EventBus::default();

    let dispatcher = Arc::new(Dispatcher::new(
        dispatchable,
        SystemClock,
        config.cooldown,
        pool,
        config.agent_bin.clone(),
        bus,
    ));
    // Held here for a future transport layer (§1 scopes the RPC surface for
    // these out of this crate) to wire start_standup/trigger_orchestrator/
    // ask_agent against; this binary only owns the scheduling loop itself.
    let _standup = Arc::new(StandupRunner::new(Arc::clone(&dispatcher)));
    let _orchestrator = Arc::new(OrchestratorRunner::new(Arc::clone(&dispatcher)));
    let _ask_counter = Arc::new(ask_agent::AskAgentCallCounter::new(config.max_ask_calls_per_session));

    let dispatcher_enabled = Arc::new(AtomicBool::new(config.dispatcher_enabled));
    let poll_flag = Arc::clone(&dispatcher_enabled);
    let poll_dispatcher = Arc::clone(&dispatcher);
    let poll_handle = tokio::spawn(async move {
        poll::run_poll_loop(poll_dispatcher, config.poll_interval, move || poll_flag.load(Ordering::Relaxed)).await;
    });

    info!(poll_interval_ms = %config.poll_interval.as_millis(), db_path = %config.db_path, "conclaved started");

    shutdown_signal().await;
    info!("shutdown signal received, stopping the poll loop");
    poll_handle.abort();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
