/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! lcif-alloc – cache-affinity aware task-to-core allocation
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task          – Task, ids, AssignmentTable, ResidentLoad
//! ├── estimator     – execution-time and cache-impact heuristics
//! ├── allocator/    – SpeedupTable + greedy loop with LCIF tie-break
//! └── config/       – heuristic constants and workload YAML
//! ```

pub mod allocator;
pub mod config;
pub mod estimator;
pub mod task;
