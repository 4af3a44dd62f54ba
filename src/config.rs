//! Per-test configuration knobs plus the cross-cutting display knobs.

use std::time::Duration;

use derive_new::new;
use rustc_hash::FxHashSet;

/// Cross-cutting knobs recognized by every test and by the results table.
#[derive(Debug, Clone, new)]
pub struct RunConfig {
    /// Controls whether the equation column renders metabolite names
    /// instead of IDs. Display-only; never affects a verdict.
    #[new(default)]
    pub use_names: bool,
    /// Appends compartment tags to metabolite tokens in the equation
    /// column. Display-only.
    #[new(default)]
    pub add_suffixes: bool,
    /// 0 = silent, 1 = default (`info!`-level progress).
    #[new(value = "1")]
    pub verbose: u8,
    /// Worker count for the dilution and loop-phase-1 pools. `None` lets
    /// the pool pick a default (number of logical CPUs).
    #[new(default)]
    pub worker_threads: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The dilution coupling coefficient `alpha` is a small positive constant
/// tying a dilution sink's flux to the absolute-flux sum through a
/// metabolite's other reactions. Documented here rather than buried as a
/// magic number at the call site.
pub const DEFAULT_DILUTION_ALPHA: f64 = 1e-3;

#[derive(Debug, Clone)]
pub struct DilutionConfig {
    pub media_mets: Option<FxHashSet<String>>,
    pub zero_thresh: f64,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub alpha: f64,
}

impl Default for DilutionConfig {
    fn default() -> Self {
        Self {
            media_mets: None,
            zero_thresh: 1e-8,
            timeout: Duration::from_secs(1800),
            max_attempts: 3,
            alpha: DEFAULT_DILUTION_ALPHA,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub zero_thresh: f64,
    pub corr_thresh: f64,
    pub n_samples: usize,
    /// Fixed seed for the hit-and-run sampler so phase-2 correlations are
    /// reproducible across runs.
    pub sampling_seed: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            zero_thresh: 1e-8,
            corr_thresh: 0.9,
            n_samples: 1000,
            sampling_seed: 0x4d41_4341_57u64,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiphosphateConfig {
    pub ppi_ids: Option<FxHashSet<String>>,
    pub pi_ids: Option<FxHashSet<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct RedoxConfig {
    pub redox_pairs: Vec<(String, String)>,
    pub proton_ids: FxHashSet<String>,
}

/// Bundles every test-specific config plus the cross-cutting one, so
/// `run_all_tests` takes a single argument.
#[derive(Debug, Clone, Default)]
pub struct MacawConfig {
    pub run: RunConfig,
    pub dilution: DilutionConfig,
    pub loop_cfg: LoopConfig,
    pub diphosphate: DiphosphateConfig,
    pub redox: RedoxConfig,
}
