//! One-to-one field mappings and the record translation functions.

use std::collections::HashSet;

use conductor_dv_client::Record;
use tracing::trace;

use crate::error::{Error, ErrorKind, Result};

/// A one-to-one table from application field names to remote column names
/// for a single entity set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    remote_entity: String,
    fields: Vec<(String, String)>,
}

impl FieldMapping {
    /// Build a mapping, rejecting any field or column that appears twice.
    pub fn new<A, R>(
        remote_entity: impl Into<String>,
        fields: impl IntoIterator<Item = (A, R)>,
    ) -> Result<Self>
    where
        A: Into<String>,
        R: Into<String>,
    {
        let remote_entity = remote_entity.into();
        if remote_entity.trim().is_empty() {
            return Err(Error::new(ErrorKind::MissingEntity));
        }

        let mut app_seen = HashSet::new();
        let mut remote_seen = HashSet::new();
        let mut pairs = Vec::new();

        for (app, remote) in fields {
            let app = app.into();
            let remote = remote.into();
            if !app_seen.insert(app.clone()) {
                return Err(Error::new(ErrorKind::DuplicateAppField(app)));
            }
            if !remote_seen.insert(remote.clone()) {
                return Err(Error::new(ErrorKind::DuplicateRemoteColumn(remote)));
            }
            pairs.push((app, remote));
        }

        Ok(Self {
            remote_entity,
            fields: pairs,
        })
    }

    /// Build a mapping from a table already known to be one-to-one.
    pub(crate) fn from_table(remote_entity: &str, fields: &[(&str, &str)]) -> Self {
        Self {
            remote_entity: remote_entity.to_string(),
            fields: fields
                .iter()
                .map(|(app, remote)| (app.to_string(), remote.to_string()))
                .collect(),
        }
    }

    /// The Dataverse entity set, e.g. `ac_machines`.
    pub fn remote_entity(&self) -> &str {
        &self.remote_entity
    }

    /// `(app_field, remote_column)` pairs in table order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(app, remote)| (app.as_str(), remote.as_str()))
    }

    /// Remote column names in table order, suitable for `$select`.
    pub fn remote_columns(&self) -> Vec<&str> {
        self.fields.iter().map(|(_, remote)| remote.as_str()).collect()
    }

    /// The remote column an application field maps to.
    pub fn remote_column(&self, app_field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(app, _)| app == app_field)
            .map(|(_, remote)| remote.as_str())
    }

    /// The application field a remote column maps to.
    pub fn app_field(&self, remote_column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(_, remote)| remote == remote_column)
            .map(|(app, _)| app.as_str())
    }

    /// See [`to_remote`].
    pub fn to_remote(&self, app_record: &Record) -> Record {
        to_remote(app_record, self)
    }

    /// See [`from_remote`].
    pub fn from_remote(&self, remote_record: &Record) -> Record {
        from_remote(remote_record, self)
    }
}

/// Rename an application-shaped record to remote column names.
///
/// Keys without a mapping are dropped.
pub fn to_remote(app_record: &Record, mapping: &FieldMapping) -> Record {
    let out: Record = mapping
        .fields()
        .filter_map(|(app, remote)| {
            app_record
                .get(app)
                .map(|value| (remote.to_string(), value.clone()))
        })
        .collect();

    if out.len() < app_record.len() {
        trace!(
            entity = mapping.remote_entity(),
            dropped = app_record.len() - out.len(),
            "Dropped unmapped application fields"
        );
    }
    out
}

/// Rename a remote-shaped record to application field names.
///
/// Columns without a mapping (including OData annotations such as
/// `@odata.etag`) are dropped.
pub fn from_remote(remote_record: &Record, mapping: &FieldMapping) -> Record {
    let out: Record = mapping
        .fields()
        .filter_map(|(app, remote)| {
            remote_record
                .get(remote)
                .map(|value| (app.to_string(), value.clone()))
        })
        .collect();

    if out.len() < remote_record.len() {
        trace!(
            entity = mapping.remote_entity(),
            dropped = remote_record.len() - out.len(),
            "Dropped unmapped remote columns"
        );
    }
    out
}
