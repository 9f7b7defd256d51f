/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core data structures shared by the estimators and the allocator.
//!
//! ```text
//! caller ──(ready tasks, core ids)──►  GreedyAllocator  ──►  AssignmentTable
//!    ▲                                      │
//!    └──────────── Task::last_core ◄────────┘   (carried into the next call)
//! ```
//!
//! # Ownership model
//! `Task` records are **owned** by the caller.  The allocator borrows the
//! ready list mutably for the duration of one call and writes exactly one
//! field, `last_core`, on each task it places.  Nothing else survives the
//! call: per-core occupancy and the speedup matrix are local to
//! [`GreedyAllocator::allocate`](crate::allocator::GreedyAllocator::allocate).

use std::collections::BTreeMap;

// ── Identifiers ───────────────────────────────────────────────────────────────

/// Task identifier.  Used as a direct index into an [`AssignmentTable`].
pub type TaskId = usize;

/// Opaque processor core identifier supplied by the caller.
pub type CoreId = u32;

// ── Task ──────────────────────────────────────────────────────────────────────

/// A ready real-time task as seen by the allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    /// Unique, non-negative identifier.
    pub id: TaskId,

    /// Worst-case execution time in abstract cost units.  Must be positive.
    pub wcet: u64,

    /// Core the task was last placed on.  `None` if it has never run.
    ///
    /// The only piece of state carried from one allocation call to the next.
    pub last_core: Option<CoreId>,
}

impl Task {
    /// A task that has never executed.
    pub fn new(id: TaskId, wcet: u64) -> Self {
        Self {
            id,
            wcet,
            last_core: None,
        }
    }

    /// Builder-style setter for the recorded last core.
    pub fn with_last_core(mut self, core: CoreId) -> Self {
        self.last_core = Some(core);
        self
    }

    /// Returns `true` if the task's cache state is expected to be warm on
    /// `core`.
    pub fn is_warm_on(&self, core: CoreId) -> bool {
        self.last_core == Some(core)
    }
}

// ── ResidentLoad ──────────────────────────────────────────────────────────────

/// Tasks already running on a core before an allocation pass begins.
///
/// Seeds the per-core occupancy lists so the estimators see existing load.
/// Residents are read-only: they are never assigned, moved, or updated.
/// `BTreeMap` keeps iteration deterministic.
pub type ResidentLoad = BTreeMap<CoreId, Vec<Task>>;

// ── AssignmentTable ───────────────────────────────────────────────────────────

/// Dense task → core mapping indexed by [`TaskId`].
///
/// Sized by the caller to exceed the largest task id it will ever pass in.
/// Unassigned slots are `None` rather than a `-1` sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentTable {
    slots: Vec<Option<CoreId>>,
}

impl AssignmentTable {
    /// Create a table with `capacity` slots, all unassigned.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of slots; valid task ids are `0..capacity()`.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if `task` indexes a slot in this table.
    pub fn fits(&self, task: TaskId) -> bool {
        task < self.slots.len()
    }

    /// Core assigned to `task`, or `None` if unassigned or out of range.
    pub fn get(&self, task: TaskId) -> Option<CoreId> {
        self.slots.get(task).copied().flatten()
    }

    /// Assigned `(task, core)` pairs in ascending task id order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, CoreId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.map(|core| (id, core)))
    }

    /// Number of assigned slots.
    pub fn assigned_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Mark every slot unassigned, keeping the capacity.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Write `core` into `task`'s slot.  Callers validate the id first.
    pub(crate) fn set(&mut self, task: TaskId, core: CoreId) {
        debug_assert!(self.fits(task), "task id {task} outside table");
        if let Some(slot) = self.slots.get_mut(task) {
            *slot = Some(core);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
