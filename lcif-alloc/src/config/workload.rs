/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Workload description consumed by the `lcif-alloc` binary.
//!
//! ```yaml
//! cores: [0, 1]
//! tasks:            # ready order = priority order
//!   - { id: 0, wcet: 100 }
//!   - { id: 1, wcet: 150, last_core: 0 }
//! residents:        # optional, tasks already running per core
//!   1:
//!     - { id: 10, wcet: 40 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::task::{CoreId, ResidentLoad, Task, TaskId};

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WorkloadFile {
    cores: Vec<CoreId>,
    #[serde(default)]
    tasks: Vec<TaskEntry>,
    #[serde(default)]
    residents: BTreeMap<CoreId, Vec<TaskEntry>>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    id: TaskId,
    wcet: u64,
    last_core: Option<CoreId>,
}

impl From<TaskEntry> for Task {
    fn from(e: TaskEntry) -> Self {
        Task {
            id: e.id,
            wcet: e.wcet,
            last_core: e.last_core,
        }
    }
}

// ── Workload ──────────────────────────────────────────────────────────────────

/// A ready list, the cores available to it, and any pre-existing load.
#[derive(Debug, Clone, Default)]
pub struct Workload {
    pub cores: Vec<CoreId>,
    pub tasks: Vec<Task>,
    pub residents: ResidentLoad,
}

impl Workload {
    /// Parse a workload YAML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is invalid, or
    /// a task declares a zero WCET.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading workload from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open workload file: {}", path.display()))?;

        let file: WorkloadFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        if let Some(bad) = file.tasks.iter().find(|t| t.wcet == 0) {
            bail!("task {} in {} has a zero wcet", bad.id, path.display());
        }

        let workload = Workload {
            cores: file.cores,
            tasks: file.tasks.into_iter().map(Task::from).collect(),
            residents: file
                .residents
                .into_iter()
                .map(|(core, ts)| (core, ts.into_iter().map(Task::from).collect()))
                .collect(),
        };

        debug!(
            cores = ?workload.cores,
            task_count = workload.tasks.len(),
            resident_cores = workload.residents.len(),
            "workload parsed"
        );

        Ok(workload)
    }

    /// Assignment table capacity large enough for every ready task id.
    pub fn table_capacity(&self) -> usize {
        self.tasks.iter().map(|t| t.id + 1).max().unwrap_or(0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn load_four_task_workload() {
        let yaml = r#"
cores: [0, 1]
tasks:
  - { id: 0, wcet: 100 }
  - { id: 1, wcet: 150, last_core: 0 }
  - { id: 2, wcet: 80, last_core: 1 }
  - { id: 3, wcet: 120 }
"#;
        let f = yaml_tempfile(yaml);
        let wl = Workload::load_from_file(f.path()).unwrap();

        assert_eq!(wl.cores, vec![0, 1]);
        assert_eq!(wl.tasks.len(), 4);
        assert_eq!(wl.tasks[1], Task::new(1, 150).with_last_core(0));
        assert_eq!(wl.tasks[3].last_core, None);
        assert!(wl.residents.is_empty());
        assert_eq!(wl.table_capacity(), 4);
    }

    #[test]
    fn residents_are_keyed_by_core() {
        let yaml = r#"
cores: [4, 5]
tasks:
  - { id: 0, wcet: 100 }
residents:
  5:
    - { id: 10, wcet: 40 }
    - { id: 11, wcet: 60, last_core: 5 }
"#;
        let f = yaml_tempfile(yaml);
        let wl = Workload::load_from_file(f.path()).unwrap();
        assert_eq!(wl.residents.len(), 1);
        assert_eq!(wl.residents[&5].len(), 2);
        assert_eq!(wl.residents[&5][1].last_core, Some(5));
    }

    #[test]
    fn table_capacity_tracks_largest_id() {
        let wl = Workload {
            tasks: vec![Task::new(7, 10), Task::new(2, 10)],
            ..Default::default()
        };
        assert_eq!(wl.table_capacity(), 8);
        assert_eq!(Workload::default().table_capacity(), 0);
    }

    #[test]
    fn zero_wcet_is_rejected() {
        let f = yaml_tempfile("cores: [0]\ntasks:\n  - { id: 0, wcet: 0 }\n");
        assert!(Workload::load_from_file(f.path()).is_err());
    }

    #[test]
    fn missing_cores_is_rejected() {
        let f = yaml_tempfile("tasks:\n  - { id: 0, wcet: 10 }\n");
        assert!(Workload::load_from_file(f.path()).is_err());
    }
}
