//! Solver configuration types.

/// Configuration options for solver behavior.
///
/// Besides the usual tuning knobs this carries the two re-solve switches:
/// `incremental` and `warm_start`. Backends fold them into the
/// [`SolverCapabilities`](crate::SolverCapabilities) they report, so turning
/// one off makes the controller fall back to full re-submission or a cold
/// start respectively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Time limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    /// Relative MIP gap tolerance. `None` uses solver default.
    pub mip_gap: Option<f64>,
    /// Verbosity level. `None` uses solver default.
    pub verbosity: Option<u32>,
    /// Enable/disable presolve. `None` uses solver default.
    pub presolve: Option<bool>,
    /// Number of threads to use. `None` uses solver default.
    pub threads: Option<u32>,
    /// Feasibility tolerance. `None` uses solver default.
    pub tolerance: Option<f64>,
    /// Log solver output to console. `None` uses solver default.
    pub log_to_console: Option<bool>,
    /// Accept incremental patches between solves. `None` means enabled when supported.
    pub incremental: Option<bool>,
    /// Reuse the previous LP solution as a starting point. `None` means enabled when supported.
    pub warm_start: Option<bool>,
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Set the verbosity level.
    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = Some(level);
        self
    }

    /// Enable or disable presolve.
    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    /// Set the number of threads.
    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    /// Set the feasibility tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Enable or disable console logging.
    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Enable or disable incremental patches between solves.
    pub fn with_incremental(mut self, enabled: bool) -> Self {
        self.incremental = Some(enabled);
        self
    }

    /// Enable or disable LP warm starts.
    pub fn with_warm_start(mut self, enabled: bool) -> Self {
        self.warm_start = Some(enabled);
        self
    }

    /// Whether incremental patches are allowed, given backend support.
    pub fn allows_incremental(&self) -> bool {
        self.incremental.unwrap_or(true)
    }

    /// Whether warm starts are allowed, given backend support.
    pub fn allows_warm_start(&self) -> bool {
        self.warm_start.unwrap_or(true)
    }

    /// Check if this configuration is completely empty (all defaults).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
