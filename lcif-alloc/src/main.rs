/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use lcif_alloc::allocator::GreedyAllocator;
use lcif_alloc::config::workload::Workload;
use lcif_alloc::config::HeuristicConfig;
use lcif_alloc::task::AssignmentTable;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Greedy cache-affinity task-to-core allocator.
///
/// Example:
///   lcif-alloc --workload demos/workload.yaml --ticks 3
#[derive(Debug, Parser)]
#[command(
    name = "lcif-alloc",
    about = "Cache-affinity aware task-to-core allocator with LCIF tie-breaking",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML workload (cores, ready tasks, residents).
    #[arg(short = 'w', long = "workload")]
    workload: PathBuf,

    /// Path to the YAML heuristic configuration.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Number of allocation passes; `last_core` carries over between passes.
    #[arg(short = 't', long = "ticks", default_value_t = 1)]
    ticks: u32,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        workload = %cli.workload.display(),
        config   = ?cli.config,
        ticks    = cli.ticks,
        "Configuration"
    );

    if let Err(e) = run(&cli) {
        error!("Allocation failed: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let heuristics = match &cli.config {
        Some(path) => HeuristicConfig::load_from_file(path)?,
        None => {
            warn!("No heuristic configuration provided, using defaults");
            HeuristicConfig::default()
        }
    };

    let mut workload = Workload::load_from_file(&cli.workload)?;
    let allocator = GreedyAllocator::new(heuristics);

    for tick in 1..=cli.ticks {
        let mut table = AssignmentTable::with_capacity(workload.table_capacity());
        let placed = allocator
            .allocate_with_residents(
                &mut workload.tasks,
                &workload.cores,
                &workload.residents,
                &mut table,
            )
            .with_context(|| format!("tick {tick}"))?;

        info!(tick, placed, "Assignments:");
        for (task, core) in table.iter() {
            info!("  task {task:>4} -> core {core}");
        }
    }

    Ok(())
}
