//! Audit record types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Per-row field errors: row index -> field id -> message
pub type ErrorLog = BTreeMap<u64, BTreeMap<String, String>>;

// ============================================================================
// Convert Status
// ============================================================================

/// Outcome classification of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConvertStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl ConvertStatus {
    /// No failures is a success (even with no rows); some failures is partial;
    /// every row failing is a failure
    pub fn classify(failure_count: u64, total_count: u64) -> Self {
        if failure_count == 0 {
            Self::Success
        } else if failure_count < total_count {
            Self::PartialSuccess
        } else {
            Self::Failed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::PartialSuccess => "PARTIAL_SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ConvertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConvertStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SUCCESS" => Ok(Self::Success),
            "PARTIAL_SUCCESS" => Ok(Self::PartialSuccess),
            "FAILED" => Ok(Self::Failed),
            other => Err(Error::Other(format!("unknown convert status: {other}"))),
        }
    }
}

// ============================================================================
// Convert Result
// ============================================================================

/// Frozen audit record of a finished conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ConvertStatus>,

    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub failure_count: u64,

    #[serde(default)]
    pub success_count: u64,

    #[serde(default)]
    pub errors: ErrorLog,
}

impl ConvertResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn status(&self) -> ConvertStatus {
        self.result
            .unwrap_or_else(|| ConvertStatus::classify(self.failure_count, self.total_count))
    }

    /// Field errors recorded for one row
    pub fn row_errors(&self, row: u64) -> Option<&BTreeMap<String, String>> {
        self.errors.get(&row)
    }
}

/// Instantaneous failure statistics of a running conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AuditSnapshot {
    pub failure_count: u64,
    pub failure_percentage: f64,
}

// ============================================================================
// Audit Log
// ============================================================================

/// Mutable per-row bookkeeping owned by a writer
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    success_count: u64,
    failure_count: u64,
    errors: ErrorLog,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// Record the field errors of the row at `row`
    pub fn record_failure(&mut self, row: u64, field_errors: BTreeMap<String, String>) {
        self.failure_count += 1;
        self.errors.entry(row).or_default().extend(field_errors);
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn snapshot(&self) -> AuditSnapshot {
        let processed = self.failure_count + self.success_count;
        let failure_percentage = if processed == 0 {
            0.0
        } else {
            self.failure_count as f64 * 100.0 / processed as f64
        };
        AuditSnapshot {
            failure_count: self.failure_count,
            failure_percentage,
        }
    }

    /// Freeze into a classified record covering `total_count` rows
    pub fn finalize(&self, total_count: u64) -> ConvertResult {
        ConvertResult {
            result: Some(ConvertStatus::classify(self.failure_count, total_count)),
            total_count,
            failure_count: self.failure_count,
            success_count: self.success_count,
            errors: self.errors.clone(),
        }
    }
}
