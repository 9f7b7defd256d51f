/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for the greedy allocator.
//!
//! Every variant is raised **before** any task or assignment slot is
//! written, so a caller that sees an `Err` can retry on the next scheduling
//! tick without repairing state.
//!
//! Zero ready tasks or zero available cores is **not** an error: the
//! allocator returns `Ok(0)`.
//!
//! | Variant | Cause |
//! |---|---|
//! | `InvalidTaskId` | caller contract: id does not fit the assignment table |
//! | `DuplicateTaskId` / `DuplicateCore` | caller contract: inputs are not sets |
//! | `InvalidWcet` | caller contract: WCET zero or out of arithmetic range |
//! | `StorageExhausted` | working storage could not be reserved |

use thiserror::Error;

use crate::task::{CoreId, TaskId};

/// Error returned from
/// [`GreedyAllocator::allocate()`](super::GreedyAllocator::allocate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    /// An eligible task's id would index outside the caller's
    /// [`AssignmentTable`](crate::task::AssignmentTable).
    #[error("task id {task} does not fit an assignment table of capacity {capacity}")]
    InvalidTaskId { task: TaskId, capacity: usize },

    /// Two eligible tasks carry the same id.
    #[error("task id {task} appears more than once in the ready list")]
    DuplicateTaskId { task: TaskId },

    /// The available-core list names the same core twice.
    #[error("core {core} appears more than once in the available core list")]
    DuplicateCore { core: CoreId },

    /// A task's WCET is zero, or so large that percentage scaling would
    /// overflow the signed cost range.
    #[error("task {task} has unusable wcet {wcet} (must be within 1..={max})", max = super::MAX_WCET)]
    InvalidWcet { task: TaskId, wcet: u64 },

    /// Internal working storage could not be reserved, either because the
    /// global allocator refused or the configured limit would be exceeded.
    ///
    /// The whole call is abandoned; nothing was committed.
    #[error("failed to reserve working storage for {what} ({cells} cells)")]
    StorageExhausted { what: &'static str, cells: usize },
}
