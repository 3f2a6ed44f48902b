//! Resident-memory sampling around solver stages.
//!
//! Backends sample before and after building and solving a problem and
//! attach the readings to the solution metadata.

use std::time::Instant;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Errors produced by memory sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    ProcessNotFound { pid: u32 },
}

impl MemoryError {
    pub fn code(&self) -> &'static str {
        match self {
            MemoryError::ProcessNotFound { .. } => "MEMORY_PROCESS_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::ProcessNotFound { pid } => {
                write!(f, "[{}] failed to locate process {}", self.code(), pid)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

/// Resident set size of the current process, in bytes.
pub fn current_rss_bytes() -> Result<u64, MemoryError> {
    let raw_pid = std::process::id();
    let pid = Pid::from_u32(raw_pid);

    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );

    sys.process(pid)
        .map(|process| process.memory())
        .ok_or(MemoryError::ProcessNotFound { pid: raw_pid })
}

/// One reading taken at a named stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RssSample {
    pub stage: &'static str,
    pub rss_bytes: u64,
    pub at: Instant,
}

/// Readings taken across the stages of one solve.
///
/// Sampling failures are logged and skipped, so instrumentation never fails
/// a solve.
#[derive(Debug, Clone, Default)]
pub struct StageMemory {
    samples: Vec<RssSample>,
}

impl StageMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a reading for `stage`.
    pub fn sample(&mut self, stage: &'static str) -> Option<u64> {
        match current_rss_bytes() {
            Ok(rss_bytes) => {
                self.push(stage, rss_bytes);
                Some(rss_bytes)
            }
            Err(err) => {
                tracing::debug!(
                    component = "memory",
                    operation = "sample",
                    status = "error",
                    stage,
                    error_code = err.code(),
                    "Skipped memory sample"
                );
                None
            }
        }
    }

    /// Record an externally taken reading.
    pub fn push(&mut self, stage: &'static str, rss_bytes: u64) {
        self.samples.push(RssSample {
            stage,
            rss_bytes,
            at: Instant::now(),
        });
    }

    pub fn samples(&self) -> &[RssSample] {
        &self.samples
    }

    /// Largest reading, if any.
    pub fn peak_bytes(&self) -> Option<u64> {
        self.samples.iter().map(|sample| sample.rss_bytes).max()
    }

    /// Last reading minus first; positive means growth.
    pub fn growth_bytes(&self) -> Option<i64> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) if self.samples.len() >= 2 => {
                Some(last.rss_bytes as i64 - first.rss_bytes as i64)
            }
            _ => None,
        }
    }
}
