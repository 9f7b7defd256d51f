//! Heuristic configuration loading.
//!
//! The execution-time and cache-interference estimators are driven by a
//! handful of calibration constants.  They have no derivation beyond
//! "reasonable for a small multicore", so they live here as data rather than
//! being baked into the algorithm.
//!
//! The expected YAML structure is:
//! ```yaml
//! heuristics:
//!   affinity_discount_percent: 10
//!   contention_overhead: 5
//!   interference_percent: 5
//!   lcif_tolerance_percent: 5
//!   working_storage_limit: 4096
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

pub mod workload;

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Warm-cache discount applied when a task returns to its last core.
pub const DEFAULT_AFFINITY_DISCOUNT_PERCENT: u32 = 10;

/// Cost units added per task already occupying the candidate core.
pub const DEFAULT_CONTENTION_OVERHEAD: u64 = 5;

/// Slowdown inflicted on each occupant, as a percentage of the newcomer's WCET.
pub const DEFAULT_INTERFERENCE_PERCENT: u32 = 5;

/// Width of the LCIF acceptance band below the best speedup.
pub const DEFAULT_LCIF_TOLERANCE_PERCENT: u32 = 5;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct HeuristicConfigFile {
    #[serde(default)]
    heuristics: HeuristicConfig,
}

// ── HeuristicConfig ───────────────────────────────────────────────────────────

/// Calibration constants for the estimators and the LCIF tie-break.
///
/// Percentages are applied with truncating integer arithmetic
/// (`value * pct / 100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicConfig {
    /// Percentage of WCET subtracted when the task's last core matches.
    pub affinity_discount_percent: u32,

    /// Cost units added per occupant of the candidate core.
    pub contention_overhead: u64,

    /// Percentage of the newcomer's WCET added to every occupant's estimate.
    pub interference_percent: u32,

    /// LCIF band: cores within this percentage of the best speedup compete
    /// on cache impact.
    pub lcif_tolerance_percent: u32,

    /// Upper bound on working-storage cells one allocation call may reserve.
    /// `None` means bounded only by the global allocator.
    pub working_storage_limit: Option<usize>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            affinity_discount_percent: DEFAULT_AFFINITY_DISCOUNT_PERCENT,
            contention_overhead: DEFAULT_CONTENTION_OVERHEAD,
            interference_percent: DEFAULT_INTERFERENCE_PERCENT,
            lcif_tolerance_percent: DEFAULT_LCIF_TOLERANCE_PERCENT,
            working_storage_limit: None,
        }
    }
}

impl HeuristicConfig {
    /// Parse `path` and return the resulting configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, or a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading heuristic configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: HeuristicConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let cfg = file.heuristics;
        cfg.validate()
            .with_context(|| format!("Invalid heuristics in {}", path.display()))?;

        debug!(
            affinity_discount_percent = cfg.affinity_discount_percent,
            contention_overhead = cfg.contention_overhead,
            interference_percent = cfg.interference_percent,
            lcif_tolerance_percent = cfg.lcif_tolerance_percent,
            working_storage_limit = ?cfg.working_storage_limit,
            "heuristics loaded"
        );

        Ok(cfg)
    }

    /// Reject percentages above 100 and an overhead that cannot be
    /// represented as a signed cost.
    pub fn validate(&self) -> Result<()> {
        for (name, pct) in [
            ("affinity_discount_percent", self.affinity_discount_percent),
            ("interference_percent", self.interference_percent),
            ("lcif_tolerance_percent", self.lcif_tolerance_percent),
        ] {
            if pct > 100 {
                bail!("{name} must be within 0..=100, got {pct}");
            }
        }
        if i64::try_from(self.contention_overhead).is_err() {
            bail!(
                "contention_overhead {} exceeds the signed cost range",
                self.contention_overhead
            );
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_match_documented_constants() {
        let cfg = HeuristicConfig::default();
        assert_eq!(cfg.affinity_discount_percent, 10);
        assert_eq!(cfg.contention_overhead, 5);
        assert_eq!(cfg.interference_percent, 5);
        assert_eq!(cfg.lcif_tolerance_percent, 5);
        assert_eq!(cfg.working_storage_limit, None);
    }

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
heuristics:
  affinity_discount_percent: 20
  contention_overhead: 8
  interference_percent: 3
  lcif_tolerance_percent: 10
  working_storage_limit: 64
"#;
        let f = yaml_tempfile(yaml);
        let cfg = HeuristicConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.affinity_discount_percent, 20);
        assert_eq!(cfg.contention_overhead, 8);
        assert_eq!(cfg.interference_percent, 3);
        assert_eq!(cfg.lcif_tolerance_percent, 10);
        assert_eq!(cfg.working_storage_limit, Some(64));
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let f = yaml_tempfile("heuristics:\n  contention_overhead: 7\n");
        let cfg = HeuristicConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.contention_overhead, 7);
        assert_eq!(cfg.affinity_discount_percent, 10);
        assert_eq!(cfg.lcif_tolerance_percent, 5);
    }

    #[test]
    fn missing_section_yields_defaults() {
        let f = yaml_tempfile("{}\n");
        let cfg = HeuristicConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg, HeuristicConfig::default());
    }

    #[test]
    fn percentage_above_100_is_rejected() {
        let f = yaml_tempfile("heuristics:\n  lcif_tolerance_percent: 150\n");
        let err = HeuristicConfig::load_from_file(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("lcif_tolerance_percent"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let f = yaml_tempfile("heuristics:\n  cache_ways: 16\n");
        assert!(HeuristicConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = HeuristicConfig::load_from_file(Path::new("/nonexistent/heuristics.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(HeuristicConfig::load_from_file(f.path()).is_err());
    }
}
