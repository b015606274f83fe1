//! Parser for `debug cfgmgr` JSON replies
//!
//! Reply format:
//! ```json
//! {
//!   "class": "vlan",
//!   "module": "vlan",
//!   "data": [
//!     { "port": "1", "linkState": "1", "portList": "1-52" },
//!     { "port": "2", "linkState": "0", "portList": "1-52" }
//!   ]
//! }
//! ```
//!
//! Only `data` is used. Values are read as strings: numbers and booleans are
//! rendered with their JSON text, `null` counts as absent.

use serde_json::{Map, Value};
use tracing::warn;

use exos_cli_common::{CliError, CliResult};

/// One object from the `data` array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CfgmgrRow {
    fields: Map<String, Value>,
}

impl CfgmgrRow {
    /// Gets a field rendered as a string, if present and not null.
    pub fn get_str(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }
}

/// A parsed cfgmgr reply, remembering the command for error messages.
#[derive(Debug, Clone)]
pub struct CfgmgrReply {
    command: String,
    rows: Vec<CfgmgrRow>,
}

impl CfgmgrReply {
    /// Parses the captured output of `command`.
    pub fn parse(command: &str, output: &str) -> CliResult<Self> {
        let json: Value = serde_json::from_str(output)
            .map_err(|e| CliError::invalid_reply(command, format!("not JSON: {}", e)))?;

        let data = match json {
            Value::Object(mut obj) => obj
                .remove("data")
                .ok_or_else(|| CliError::invalid_reply(command, "no 'data' member"))?,
            _ => {
                return Err(CliError::invalid_reply(
                    command,
                    "reply is not a JSON object",
                ))
            }
        };

        let rows = match data {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(fields) => Some(CfgmgrRow { fields }),
                    other => {
                        warn!(command = %command, row = %other, "Skipping non-object data row");
                        None
                    }
                })
                .collect(),
            _ => return Err(CliError::invalid_reply(command, "'data' is not an array")),
        };

        Ok(Self {
            command: command.to_string(),
            rows,
        })
    }

    /// Returns all data rows.
    pub fn rows(&self) -> &[CfgmgrRow] {
        &self.rows
    }

    /// Returns the first data row.
    pub fn first(&self) -> CliResult<&CfgmgrRow> {
        self.rows
            .first()
            .ok_or_else(|| CliError::empty_reply(&self.command))
    }

    /// Gets a required field of `row`.
    pub fn field(&self, row: &CfgmgrRow, field: &str) -> CliResult<String> {
        row.get_str(field)
            .ok_or_else(|| CliError::missing_field(&self.command, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD: &str = "debug cfgmgr show next vlan.vlan";

    #[test]
    fn test_parse_rows() {
        let reply = CfgmgrReply::parse(
            CMD,
            r#"{"data": [{"name": "Default", "tag": 1, "loopback": false, "descr": null}]}"#,
        )
        .unwrap();

        assert_eq!(reply.rows().len(), 1);
        let row = reply.first().unwrap();
        assert_eq!(row.get_str("name"), Some("Default".to_string()));
        assert_eq!(row.get_str("tag"), Some("1".to_string()));
        assert_eq!(row.get_str("loopback"), Some("false".to_string()));
        assert_eq!(row.get_str("descr"), None);
        assert_eq!(row.get_str("missing"), None);
    }

    #[test]
    fn test_missing_field_error() {
        let reply = CfgmgrReply::parse(CMD, r#"{"data": [{"tag": "1"}]}"#).unwrap();
        let row = reply.first().unwrap();
        match reply.field(row, "name") {
            Err(CliError::MissingField { command, field }) => {
                assert_eq!(command, CMD);
                assert_eq!(field, "name");
            }
            other => panic!("Expected MissingField error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_data() {
        let reply = CfgmgrReply::parse(CMD, r#"{"data": []}"#).unwrap();
        assert!(reply.rows().is_empty());
        assert!(matches!(reply.first(), Err(CliError::EmptyReply { .. })));
    }

    #[test]
    fn test_invalid_replies() {
        assert!(matches!(
            CfgmgrReply::parse(CMD, "Invalid input detected at '^' marker."),
            Err(CliError::InvalidReply { .. })
        ));
        assert!(matches!(
            CfgmgrReply::parse(CMD, r#"{"status": "ERROR"}"#),
            Err(CliError::InvalidReply { .. })
        ));
        assert!(matches!(
            CfgmgrReply::parse(CMD, r#"{"data": {"name": "x"}}"#),
            Err(CliError::InvalidReply { .. })
        ));
        assert!(matches!(
            CfgmgrReply::parse(CMD, "[1, 2]"),
            Err(CliError::InvalidReply { .. })
        ));
    }

    #[test]
    fn test_non_object_rows_skipped() {
        let reply =
            CfgmgrReply::parse(CMD, r#"{"data": ["junk", {"name": "v10"}, 3]}"#).unwrap();
        assert_eq!(reply.rows().len(), 1);
        assert_eq!(reply.rows()[0].get_str("name"), Some("v10".to_string()));
    }
}
