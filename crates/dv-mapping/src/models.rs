//! Typed application models for machines and processes.
//!
//! These are the app-shaped views of [`MACHINE_MAPPING`](crate::MACHINE_MAPPING)
//! and [`PROCESS_MAPPING`](crate::PROCESS_MAPPING) rows. Field names serialize
//! in camelCase so a model converts to exactly the keys the mapping expects.

use conductor_dv_client::Record;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// Machine availability as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Active,
    Idle,
    Error,
    Offline,
}

/// Lifecycle of an automation process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    Completed,
    Failed,
    Pending,
    Stopped,
}

/// A machine that hosts automation agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    pub name: String,
    pub status: MachineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<f64>,
}

/// An automation process run on a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: String,
    pub name: String,
    pub status: ProcessStatus,
    pub machine_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub process_type: Option<String>,
}

fn from_app_record<T: serde::de::DeserializeOwned>(record: &Record) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(record.clone())).map_err(Into::into)
}

fn to_app_record<T: Serialize>(model: &T) -> Result<Record> {
    match serde_json::to_value(model)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Error::new(ErrorKind::InvalidRecord(format!(
            "expected an object, got {}",
            other
        )))),
    }
}

impl Machine {
    /// Parse an app-shaped record (as produced by `from_remote`).
    pub fn from_record(record: &Record) -> Result<Self> {
        from_app_record(record)
    }

    /// Convert to an app-shaped record (ready for `to_remote`).
    pub fn to_record(&self) -> Result<Record> {
        to_app_record(self)
    }
}

impl Process {
    /// Parse an app-shaped record (as produced by `from_remote`).
    pub fn from_record(record: &Record) -> Result<Self> {
        from_app_record(record)
    }

    /// Convert to an app-shaped record (ready for `to_remote`).
    pub fn to_record(&self) -> Result<Record> {
        to_app_record(self)
    }
}
