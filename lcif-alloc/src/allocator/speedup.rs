/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dense (candidate task × available core) speedup matrix.
//!
//! Built once per allocation call and read-only afterwards.  Assigned rows
//! and columns are excluded by the caller's flags, not by mutating cells.

use tracing::debug;

use super::error::AllocError;
use super::storage::StorageBudget;
use crate::estimator::Estimator;
use crate::task::{CoreId, Task};

/// Row-major `rows × cols` matrix of `wcet − estimated_time` values.
#[derive(Debug, Clone)]
pub struct SpeedupTable {
    cells: Vec<i64>,
    rows: usize,
    cols: usize,
}

impl SpeedupTable {
    /// Evaluate every `(tasks[i], cores[j])` pair against the occupancy of
    /// core `j` at build time.
    pub(crate) fn build(
        estimator: &Estimator,
        tasks: &[Task],
        cores: &[CoreId],
        occupancy: &[Vec<&Task>],
        budget: &mut StorageBudget,
    ) -> Result<Self, AllocError> {
        let rows = tasks.len();
        let cols = cores.len();
        let size = rows.checked_mul(cols).ok_or(AllocError::StorageExhausted {
            what: "speedup table",
            cells: usize::MAX,
        })?;
        let mut cells = budget.vec("speedup table", size)?;

        for task in tasks {
            for (j, &core) in cores.iter().enumerate() {
                let occupants = occupancy.get(j).map(Vec::as_slice).unwrap_or(&[]);
                let speedup = estimator.speedup(task, core, occupants);
                debug!(
                    task = task.id,
                    core,
                    occupants = occupants.len(),
                    speedup,
                    "speedup cell"
                );
                cells.push(speedup);
            }
        }

        Ok(Self { cells, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Speedup of candidate `row` on core column `col`.
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.cells[row * self.cols + col]
    }

    /// First maximum over cells whose row and column are both still open,
    /// scanning row-major.  Returns `(row, col, speedup)`.
    pub fn best_open(&self, row_done: &[bool], col_done: &[bool]) -> Option<(usize, usize, i64)> {
        let mut best: Option<(usize, usize, i64)> = None;
        for row in (0..self.rows).filter(|&r| !row_done[r]) {
            for col in (0..self.cols).filter(|&c| !col_done[c]) {
                let value = self.get(row, col);
                if best.map_or(true, |(_, _, b)| value > b) {
                    best = Some((row, col, value));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(tasks: &[Task], cores: &[CoreId]) -> SpeedupTable {
        let occupancy: Vec<Vec<&Task>> = vec![Vec::new(); cores.len()];
        let mut budget = StorageBudget::new(None);
        SpeedupTable::build(&Estimator::default(), tasks, cores, &occupancy, &mut budget).unwrap()
    }

    #[test]
    fn cells_hold_wcet_minus_estimate() {
        let tasks = [Task::new(0, 100), Task::new(1, 150).with_last_core(0)];
        let t = table(&tasks, &[0, 1]);
        assert_eq!((t.rows(), t.cols()), (2, 2));
        assert_eq!(t.get(0, 0), 0);
        assert_eq!(t.get(0, 1), 0);
        assert_eq!(t.get(1, 0), 15);
        assert_eq!(t.get(1, 1), 0);
    }

    #[test]
    fn occupancy_lowers_speedup_by_contention() {
        let tasks = [Task::new(0, 100)];
        let resident = Task::new(9, 40);
        let occupancy = vec![vec![&resident, &resident], Vec::new()];
        let mut budget = StorageBudget::new(None);
        let t = SpeedupTable::build(&Estimator::default(), &tasks, &[4, 5], &occupancy, &mut budget)
            .unwrap();
        assert_eq!(t.get(0, 0), -10);
        assert_eq!(t.get(0, 1), 0);
    }

    #[test]
    fn best_open_prefers_first_in_row_major_order() {
        let tasks = [Task::new(0, 100), Task::new(1, 100)];
        let t = table(&tasks, &[0, 1]);
        assert_eq!(t.best_open(&[false, false], &[false, false]), Some((0, 0, 0)));
        assert_eq!(t.best_open(&[true, false], &[true, false]), Some((1, 1, 0)));
    }

    #[test]
    fn best_open_skips_closed_rows_and_cols() {
        let tasks = [Task::new(0, 200).with_last_core(1), Task::new(1, 100)];
        let t = table(&tasks, &[0, 1]);
        assert_eq!(t.best_open(&[false, false], &[false, false]), Some((0, 1, 20)));
        assert_eq!(t.best_open(&[false, false], &[false, true]), Some((0, 0, 0)));
        assert_eq!(t.best_open(&[true, true], &[false, false]), None);
        assert_eq!(t.best_open(&[false, false], &[true, true]), None);
    }

    #[test]
    fn budget_too_small_for_matrix_fails() {
        let tasks = [Task::new(0, 100), Task::new(1, 100)];
        let occupancy: Vec<Vec<&Task>> = vec![Vec::new(); 2];
        let mut budget = StorageBudget::new(Some(3));
        let err = SpeedupTable::build(&Estimator::default(), &tasks, &[0, 1], &occupancy, &mut budget)
            .unwrap_err();
        assert_eq!(
            err,
            AllocError::StorageExhausted {
                what: "speedup table",
                cells: 4
            }
        );
    }
}
