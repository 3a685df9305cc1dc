//! Resource request validation
//!
//! Checks a build's requested CPUs, memory and executor count against the
//! cluster-wide limits before any plan is produced. Validation is pure: the
//! same request and limits always give the same decision.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults::{
    MAX_CPUS_PER_EXECUTOR, MAX_EXECUTORS, MAX_MEM_MB_PER_EXECUTOR, MIN_MEM_MB_PER_EXECUTOR,
};

/// Cluster-wide per-executor limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum CPUs per executor
    #[serde(default = "default_max_cpus")]
    pub max_cpus_per_executor: u32,

    /// Minimum memory per executor in MiB
    #[serde(default = "default_min_mem")]
    pub min_mem_mb_per_executor: u32,

    /// Maximum memory per executor in MiB
    #[serde(default = "default_max_mem")]
    pub max_mem_mb_per_executor: u32,
}

fn default_max_cpus() -> u32 {
    MAX_CPUS_PER_EXECUTOR
}

fn default_min_mem() -> u32 {
    MIN_MEM_MB_PER_EXECUTOR
}

fn default_max_mem() -> u32 {
    MAX_MEM_MB_PER_EXECUTOR
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_cpus_per_executor: default_max_cpus(),
            min_mem_mb_per_executor: default_min_mem(),
            max_mem_mb_per_executor: default_max_mem(),
        }
    }
}

/// An accepted resource request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// CPUs per executor
    pub cpus: u32,
    /// Memory per executor in MiB
    #[serde(rename = "mem")]
    pub mem_mb: u32,
    /// Number of executors the build may fan out to
    pub max_executors: u32,
}

impl ResourceRequest {
    /// Parallel jobs the whole build may run
    pub fn max_jobs(&self) -> u32 {
        self.cpus * self.max_executors
    }
}

/// Why a resource request was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Zero or negative CPUs
    #[error("cpus must be positive, got {cpus}")]
    CpusNotPositive { cpus: i64 },

    /// More CPUs than one executor has
    #[error("cpus {cpus} exceeds the per-executor maximum of {max}")]
    TooManyCpus { cpus: i64, max: u32 },

    /// Less memory than the per-executor minimum
    #[error("mem {mem_mb} MiB is below the per-executor minimum of {min} MiB")]
    MemoryTooLow { mem_mb: i64, min: u32 },

    /// More memory than the per-executor maximum
    #[error("mem {mem_mb} MiB exceeds the per-executor maximum of {max} MiB")]
    MemoryTooHigh { mem_mb: i64, max: u32 },

    /// Executor count outside 1..=10
    #[error("max_executors {max_executors} must be between 1 and {max}")]
    ExecutorsOutOfRange { max_executors: i64, max: u32 },
}

/// Validate a resource request against cluster limits
///
/// Checks CPUs, then memory, then executors, and reports the first
/// violation found.
pub fn validate(
    cpus: i64,
    mem_mb: i64,
    max_executors: i64,
    limits: &ResourceLimits,
) -> Result<ResourceRequest, RejectionReason> {
    if cpus <= 0 {
        return Err(RejectionReason::CpusNotPositive { cpus });
    }
    if cpus > i64::from(limits.max_cpus_per_executor) {
        return Err(RejectionReason::TooManyCpus {
            cpus,
            max: limits.max_cpus_per_executor,
        });
    }

    if mem_mb < i64::from(limits.min_mem_mb_per_executor) || mem_mb <= 0 {
        return Err(RejectionReason::MemoryTooLow {
            mem_mb,
            min: limits.min_mem_mb_per_executor,
        });
    }
    if mem_mb > i64::from(limits.max_mem_mb_per_executor) {
        return Err(RejectionReason::MemoryTooHigh {
            mem_mb,
            max: limits.max_mem_mb_per_executor,
        });
    }

    if max_executors < 1 || max_executors > i64::from(MAX_EXECUTORS) {
        return Err(RejectionReason::ExecutorsOutOfRange {
            max_executors,
            max: MAX_EXECUTORS,
        });
    }

    // All three values are now inside u32 ranges bounded by the limits.
    Ok(ResourceRequest {
        cpus: u32::try_from(cpus).unwrap_or(limits.max_cpus_per_executor),
        mem_mb: u32::try_from(mem_mb).unwrap_or(limits.max_mem_mb_per_executor),
        max_executors: u32::try_from(max_executors).unwrap_or(MAX_EXECUTORS),
    })
}
