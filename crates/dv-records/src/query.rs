//! OData query options.

use conductor_dv_client::security::odata;

use crate::error::{Error, ErrorKind, Result};

/// Default `$top` when the caller does not set one.
pub const DEFAULT_TOP: u32 = 50;

/// Options for [`DataverseClient::query`](crate::DataverseClient::query).
///
/// `filter` is sent as-is; escape values placed inside string literals with
/// [`odata::escape_string`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Columns to return; empty means all columns.
    pub select: Vec<String>,
    /// OData `$filter` expression.
    pub filter: Option<String>,
    /// Maximum number of records to return.
    pub top: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            select: Vec::new(),
            filter: None,
            top: DEFAULT_TOP,
        }
    }
}

impl QueryOptions {
    /// Options with no select, no filter and the default `$top`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the returned columns.
    pub fn with_select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the `$filter` expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set `$top`.
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = top;
        self
    }

    /// Query-string pairs in the order they are sent.
    ///
    /// Fails if a `$select` column is not a plain identifier.
    pub fn to_query_params(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = vec![("$top", self.top.to_string())];

        if !self.select.is_empty() {
            if let Some(bad) = self.select.iter().find(|c| !odata::is_safe_identifier(c)) {
                return Err(Error::new(ErrorKind::InvalidInput(format!(
                    "invalid column name in $select: {:?}",
                    bad
                ))));
            }
            params.push(("$select", self.select.join(",")));
        }

        if let Some(filter) = self.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            params.push(("$filter", filter.to_string()));
        }

        Ok(params)
    }
}
