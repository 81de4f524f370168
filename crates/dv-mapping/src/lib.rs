//! # dv-mapping
//!
//! Translation between the dashboard's record shape (`name`, `ipAddress`,
//! `machineId`, ...) and Dataverse column names (`ac_name`, `ac_ipaddress`,
//! `ac_machineid`, ...).
//!
//! A [`FieldMapping`] is a one-to-one table from application field to remote
//! column for one entity set. [`to_remote`] and [`from_remote`] copy the
//! mapped keys across and drop everything else, so for any record whose keys
//! are mapped app fields:
//!
//! ```rust
//! use conductor_dv_mapping::{from_remote, to_remote, MACHINE_MAPPING};
//! use serde_json::json;
//!
//! let app = json!({"name": "build-agent-01", "ipAddress": "10.0.0.4"});
//! let app = app.as_object().unwrap().clone();
//!
//! let remote = to_remote(&app, &MACHINE_MAPPING);
//! assert_eq!(remote["ac_name"], "build-agent-01");
//! assert_eq!(from_remote(&remote, &MACHINE_MAPPING), app);
//! ```

mod error;
mod mapping;
mod models;
mod tables;

pub use error::{Error, ErrorKind, Result};
pub use mapping::{from_remote, to_remote, FieldMapping};
pub use models::{Machine, MachineStatus, Process, ProcessStatus};
pub use tables::{MACHINE_MAPPING, PROCESS_MAPPING};

pub use conductor_dv_client::Record;
