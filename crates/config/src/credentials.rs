//! Service-account credential validation
//!
//! The warehouse collaborator owns authentication; this module only checks
//! that the configured credential payload has the right shape before any
//! network attempt, so "your config is broken" and "the network is broken"
//! surface as different errors.

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::identifiers::is_valid_project_id;

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

/// Fields every service-account key payload must carry
const REQUIRED_FIELDS: &[&str] = &[
    "type",
    "project_id",
    "private_key_id",
    "private_key",
    "client_email",
    "client_id",
    "auth_uri",
    "token_uri",
];

/// Validated view of a service-account key payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
}

impl ServiceAccountKey {
    /// Parse and validate a service-account key JSON payload
    pub fn parse(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| ConfigError::invalid_credentials(format!("not valid JSON: {e}")))?;

        let Some(object) = value.as_object() else {
            return Err(ConfigError::invalid_credentials("payload is not a JSON object"));
        };

        for field in REQUIRED_FIELDS {
            if !object.contains_key(*field) {
                return Err(ConfigError::invalid_credentials(format!(
                    "missing required field '{field}'"
                )));
            }
        }

        let key_type = object.get("type").and_then(Value::as_str).unwrap_or("");
        if key_type != "service_account" {
            return Err(ConfigError::invalid_credentials(format!(
                "unexpected key type '{key_type}'"
            )));
        }

        let client_email = object
            .get("client_email")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        if !is_service_account_email(&client_email) {
            return Err(ConfigError::invalid_credentials(format!(
                "unexpected client email '{client_email}'"
            )));
        }

        let project_id = object
            .get("project_id")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        if !is_valid_project_id(&project_id) {
            return Err(ConfigError::invalid_credentials(format!(
                "embedded project id '{project_id}' is invalid"
            )));
        }

        Ok(Self {
            project_id,
            client_email,
        })
    }
}

/// `<local-part>@<project>.iam.gserviceaccount.com`
fn is_service_account_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains('@')
        && domain.ends_with(".iam.gserviceaccount.com")
        && domain.len() > ".iam.gserviceaccount.com".len()
}
