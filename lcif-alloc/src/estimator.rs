/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Execution-time and cache-interference heuristics.
//!
//! Both estimators are pure functions of their inputs and the
//! [`HeuristicConfig`] they were built with.  All arithmetic is on signed
//! cost units with truncating percentages, so results are reproducible
//! bit-for-bit across platforms.
//!
//! | Estimator | Question answered |
//! |---|---|
//! | [`Estimator::execution_time`] | How long will *this* task take on *that* core right now? |
//! | [`Estimator::cache_impact`] | How much will *this* task slow down everyone already on *that* core? |

use crate::config::HeuristicConfig;
use crate::task::{CoreId, Task};

/// `pct` percent of `value`, truncated toward zero.
///
/// Saturates instead of overflowing; the allocator rejects WCETs large
/// enough to reach that point.
pub fn percent_of(value: i64, pct: u32) -> i64 {
    value.saturating_mul(i64::from(pct)) / 100
}

/// WCET as a signed cost.
fn cost(task: &Task) -> i64 {
    i64::try_from(task.wcet).unwrap_or(i64::MAX)
}

/// Heuristic estimators parameterised by a [`HeuristicConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Estimator {
    cfg: HeuristicConfig,
}

impl Estimator {
    pub fn new(cfg: HeuristicConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.cfg
    }

    /// Estimated execution time of `task` on `core` given the tasks
    /// currently occupying it.
    ///
    /// * Start from WCET.
    /// * Subtract the affinity discount if `core` is the task's last core.
    /// * Add the contention overhead once per occupant.
    pub fn execution_time(&self, task: &Task, core: CoreId, occupants: &[&Task]) -> i64 {
        let wcet = cost(task);
        let mut estimate = wcet;

        if task.is_warm_on(core) {
            estimate -= percent_of(wcet, self.cfg.affinity_discount_percent);
        }

        let overhead = i64::try_from(self.cfg.contention_overhead).unwrap_or(i64::MAX);
        let occupied = i64::try_from(occupants.len()).unwrap_or(i64::MAX);
        estimate.saturating_add(overhead.saturating_mul(occupied))
    }

    /// Total execution-time increase `newcomer` would inflict on the
    /// occupants of `core`.
    ///
    /// Each occupant is evaluated in isolation so only the newcomer's
    /// marginal interference is measured.  Returns `0` for an empty core.
    pub fn cache_impact(&self, newcomer: &Task, core: CoreId, occupants: &[&Task]) -> i64 {
        let pollution = percent_of(cost(newcomer), self.cfg.interference_percent);

        occupants
            .iter()
            .map(|occupant| {
                let current = self.execution_time(occupant, core, &[]);
                let projected = current.saturating_add(pollution);
                projected - current
            })
            .fold(0i64, i64::saturating_add)
    }

    /// Projected time saved versus WCET.  Higher is better; may be negative.
    pub fn speedup(&self, task: &Task, core: CoreId, occupants: &[&Task]) -> i64 {
        cost(task) - self.execution_time(task, core, occupants)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
