//! Greedy task-to-core allocator with LCIF tie-breaking.
//!
//! [`GreedyAllocator`] pairs a priority-ordered ready list with a set of
//! available cores in one synchronous pass.  Each iteration commits the
//! single (task, core) pair with the highest projected speedup; among cores
//! whose speedup for that task falls inside the tolerance band, the one whose
//! current occupants would suffer the least cache interference wins
//! (Last-Level Cache Interference Factor, LCIF).
//!
//! # Per-call lifecycle
//!
//! ```text
//! validate ─► reserve storage ─► SpeedupTable ─► greedy loop (plan) ─► commit
//!    │              │                                                     │
//!    └── Err ───────┴──── nothing written ───────────────────────────────┘ last_core + table
//! ```
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless: occupancy, matrix and flags are locals of one call |
//! | Failure | Every error is raised before the commit step |
//! | Determinism | Row-major first maximum, then first least-impact core in supplied order |
//! | Thread safety | `Send + Sync`; callers serialise passes over the same tasks |
//!
//! # Example
//! ```rust,ignore
//! let alloc = GreedyAllocator::new(HeuristicConfig::default());
//! let mut table = AssignmentTable::with_capacity(4);
//! let placed = alloc.allocate(&mut ready, &[0, 1], &mut table)?;
//! ```

pub mod error;
pub mod speedup;
mod storage;

pub use error::AllocError;
pub use speedup::SpeedupTable;

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::HeuristicConfig;
use crate::estimator::{percent_of, Estimator};
use crate::task::{AssignmentTable, CoreId, ResidentLoad, Task, TaskId};

use storage::StorageBudget;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Largest WCET the percentage heuristics can scale without overflow.
pub const MAX_WCET: u64 = (i64::MAX / 100) as u64;

// ── Internal state types ──────────────────────────────────────────────────────

/// One committed pairing from the greedy loop, recorded by index so the
/// ready list can be mutated after planning finishes.
#[derive(Debug, Clone, Copy)]
struct Placement {
    task_index: usize,
    task_id: TaskId,
    core: CoreId,
}

// ── GreedyAllocator ───────────────────────────────────────────────────────────

/// The greedy LCIF allocator.
///
/// Holds only the heuristic constants.  All per-run state is allocated
/// inside [`allocate_with_residents`](Self::allocate_with_residents) and
/// dropped at the end of the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAllocator {
    estimator: Estimator,
}

impl GreedyAllocator {
    pub fn new(cfg: HeuristicConfig) -> Self {
        Self {
            estimator: Estimator::new(cfg),
        }
    }

    pub fn config(&self) -> &HeuristicConfig {
        self.estimator.config()
    }

    // ── Public entry points ───────────────────────────────────────────────────

    /// Assign up to `min(ready.len(), cores.len())` of the leading ready
    /// tasks to distinct cores.
    ///
    /// On success, each placed task's `last_core` is set to its core and the
    /// same core is written into `table` at the task's id.  Returns the
    /// number of tasks placed; `Ok(0)` if either input is empty.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if an input violates the calling contract
    /// or working storage cannot be reserved.  In either case neither
    /// `ready` nor `table` is modified.
    pub fn allocate(
        &self,
        ready: &mut [Task],
        cores: &[CoreId],
        table: &mut AssignmentTable,
    ) -> Result<usize, AllocError> {
        self.allocate_with_residents(ready, cores, &ResidentLoad::new(), table)
    }

    /// Like [`allocate`](Self::allocate), but with each core's occupancy
    /// seeded from `residents`: tasks already running there before this
    /// pass.  Residents raise the contention penalty and are the occupants
    /// the LCIF tie-break protects.  Entries for cores not in `cores` are
    /// ignored.
    pub fn allocate_with_residents(
        &self,
        ready: &mut [Task],
        cores: &[CoreId],
        residents: &ResidentLoad,
        table: &mut AssignmentTable,
    ) -> Result<usize, AllocError> {
        if ready.is_empty() || cores.is_empty() {
            info!(
                ready = ready.len(),
                cores = cores.len(),
                "nothing to allocate"
            );
            return Ok(0);
        }

        let candidates = ready.len().min(cores.len());
        info!(
            ready = ready.len(),
            candidates,
            cores = cores.len(),
            "=== GreedyAllocator::allocate() ==="
        );

        Self::validate(&ready[..candidates], cores, residents, table)?;

        let plan = self.plan(&ready[..candidates], cores, residents)?;

        // ── Commit ────────────────────────────────────────────────────────────
        for p in &plan {
            ready[p.task_index].last_core = Some(p.core);
            table.set(p.task_id, p.core);
        }

        info!(
            assigned = plan.len(),
            candidates,
            "=== Allocation complete ==="
        );
        Ok(plan.len())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Caller-contract checks.  Runs before any storage is reserved.
    fn validate(
        candidates: &[Task],
        cores: &[CoreId],
        residents: &ResidentLoad,
        table: &AssignmentTable,
    ) -> Result<(), AllocError> {
        let mut seen_cores = BTreeSet::new();
        for &core in cores {
            if !seen_cores.insert(core) {
                return Err(AllocError::DuplicateCore { core });
            }
        }

        let mut seen_ids = BTreeSet::new();
        for task in candidates {
            if !table.fits(task.id) {
                return Err(AllocError::InvalidTaskId {
                    task: task.id,
                    capacity: table.capacity(),
                });
            }
            if !seen_ids.insert(task.id) {
                return Err(AllocError::DuplicateTaskId { task: task.id });
            }
            Self::check_wcet(task)?;
        }

        residents
            .iter()
            .filter(|(core, _)| seen_cores.contains(*core))
            .flat_map(|(_, tasks)| tasks)
            .try_for_each(Self::check_wcet)
    }

    fn check_wcet(task: &Task) -> Result<(), AllocError> {
        if task.wcet == 0 || task.wcet > MAX_WCET {
            return Err(AllocError::InvalidWcet {
                task: task.id,
                wcet: task.wcet,
            });
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Greedy selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the greedy loop and return the pairings in commit order.
    ///
    /// Reads `tasks` only; the caller applies the plan afterwards.
    fn plan(
        &self,
        tasks: &[Task],
        cores: &[CoreId],
        residents: &ResidentLoad,
    ) -> Result<Vec<Placement>, AllocError> {
        let n = tasks.len();
        let m = cores.len();
        let mut budget = StorageBudget::new(self.config().working_storage_limit);

        // Per-core occupancy: residents first, room for one placement.
        let mut occupancy: Vec<Vec<&Task>> = budget.vec("occupancy index", m)?;
        for core in cores {
            let seeded = residents.get(core).map(Vec::as_slice).unwrap_or(&[]);
            let mut list = budget.vec("occupancy list", seeded.len() + 1)?;
            list.extend(seeded.iter());
            occupancy.push(list);
        }

        let speedups = SpeedupTable::build(&self.estimator, tasks, cores, &occupancy, &mut budget)?;

        let mut task_done: Vec<bool> = budget.vec("task flags", n)?;
        task_done.resize(n, false);
        let mut core_done: Vec<bool> = budget.vec("core flags", m)?;
        core_done.resize(m, false);
        let mut lcif: Vec<usize> = budget.vec("lcif candidates", m)?;
        let mut plan: Vec<Placement> = budget.vec("plan", n)?;

        for _ in 0..n {
            let Some((row, best_col, max_speedup)) = speedups.best_open(&task_done, &core_done)
            else {
                debug!(placed = plan.len(), "no open (task, core) pair left");
                break;
            };

            let threshold =
                max_speedup - percent_of(max_speedup, self.config().lcif_tolerance_percent);

            lcif.clear();
            lcif.extend(
                (0..m).filter(|&col| !core_done[col] && speedups.get(row, col) >= threshold),
            );

            let task = &tasks[row];
            let col = if lcif.len() > 1 {
                self.least_impact_core(task, cores, &occupancy, &lcif)
            } else {
                best_col
            };
            let core = cores[col];

            occupancy[col].push(task);
            task_done[row] = true;
            core_done[col] = true;
            plan.push(Placement {
                task_index: row,
                task_id: task.id,
                core,
            });

            info!(
                task = task.id,
                core,
                speedup = speedups.get(row, col),
                max_speedup,
                lcif_candidates = lcif.len(),
                "✓ placed"
            );
        }

        Ok(plan)
    }

    /// Among the LCIF candidate columns, pick the core whose occupants
    /// would be least disturbed by `task`.  Equal impacts keep the first
    /// candidate in supplied core order.
    fn least_impact_core(
        &self,
        task: &Task,
        cores: &[CoreId],
        occupancy: &[Vec<&Task>],
        candidates: &[usize],
    ) -> usize {
        let mut best_col = candidates[0];
        let mut min_impact = i64::MAX;

        for &col in candidates {
            let impact = self.estimator.cache_impact(task, cores[col], &occupancy[col]);
            debug!(
                task = task.id,
                core = cores[col],
                occupants = occupancy[col].len(),
                impact,
                "LCIF candidate"
            );
            if impact < min_impact {
                min_impact = impact;
                best_col = col;
            }
        }

        best_col
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
