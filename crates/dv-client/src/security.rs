//! Security utilities for building OData requests.
//!
//! Entity set names and record keys end up in the request path, and filter
//! values end up inside `$filter` string literals. Both must be checked or
//! escaped before they are interpolated.
//!
//! ```rust
//! use conductor_dv_client::security::odata;
//!
//! // CORRECT - escape values placed inside a string literal
//! let name = odata::escape_string("O'Brien");
//! let filter = format!("ac_name eq '{}'", name);
//! assert_eq!(filter, "ac_name eq 'O''Brien'");
//! ```

/// OData escaping and identifier validation.
pub mod odata {
    /// Escape a value for use inside a single-quoted OData string literal.
    ///
    /// OData escapes a single quote by doubling it; no other character is
    /// special inside a literal.
    ///
    /// ```rust
    /// use conductor_dv_client::security::odata;
    ///
    /// assert_eq!(odata::escape_string("it's"), "it''s");
    /// ```
    #[must_use]
    pub fn escape_string(value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Validate that an entity set or column name is a plain OData identifier.
    ///
    /// Identifiers start with a letter or underscore and continue with
    /// letters, digits or underscores (`ac_machines`, `ac_ipaddress`).
    ///
    /// ```rust
    /// use conductor_dv_client::security::odata;
    ///
    /// assert!(odata::is_safe_identifier("ac_machines"));
    /// assert!(!odata::is_safe_identifier("ac_machines(1)/x"));
    /// ```
    #[must_use]
    pub fn is_safe_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return false,
        }
        chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    }

    /// Percent-encode a record key for the `entity(key)` path segment.
    #[must_use]
    pub fn encode_key(key: &str) -> String {
        urlencoding::encode(key).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::odata;

    #[test]
    fn test_escape_string_doubles_quotes() {
        assert_eq!(odata::escape_string("O'Brien"), "O''Brien");
        assert_eq!(odata::escape_string("''"), "''''");
        assert_eq!(odata::escape_string("plain"), "plain");
    }

    #[test]
    fn test_escape_string_neutralises_injection() {
        let input = "x' or ac_status ne 'y";
        let filter = format!("ac_name eq '{}'", odata::escape_string(input));
        assert_eq!(filter, "ac_name eq 'x'' or ac_status ne ''y'");
    }

    #[test]
    fn test_safe_identifiers() {
        assert!(odata::is_safe_identifier("ac_machines"));
        assert!(odata::is_safe_identifier("_private"));
        assert!(odata::is_safe_identifier("accounts"));
        assert!(!odata::is_safe_identifier(""));
        assert!(!odata::is_safe_identifier("1accounts"));
        assert!(!odata::is_safe_identifier("ac_machines?$top=1"));
        assert!(!odata::is_safe_identifier("../WhoAmI"));
        assert!(!odata::is_safe_identifier("ac machines"));
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(
            odata::encode_key("3f2c1a00-0000-0000-0000-000000000001"),
            "3f2c1a00-0000-0000-0000-000000000001"
        );
        assert_eq!(odata::encode_key("a/b"), "a%2Fb");
    }
}
