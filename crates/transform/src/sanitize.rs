//! Attribute Sanitizer - Strip denied attributes before export
//!
//! Removes configured attribute keys from a row's attribute map so they
//! never reach staging files or the warehouse.
//!
//! # Job To Be Done
//!
//! Attribute payloads routinely carry values that have no business in an
//! analytical warehouse (access tokens, coordinates, snapshot URLs). The
//! sanitizer maps entity id globs to lists of attribute keys to drop:
//!
//! ```toml
//! [filter.denied_attributes]
//! "camera.*" = ["access_token", "entity_picture"]
//! "device_tracker.*" = ["latitude", "longitude", "gps_accuracy"]
//! ```
//!
//! Every rule whose entity glob matches the row's entity id is applied.
//! Removal happens before the attribute JSON is serialized, so denied
//! values are absent from the export entirely rather than masked.

use glob::Pattern;
use hearth_config::{ConfigError, FilterConfig};
use serde_json::Map;
use serde_json::Value;

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;

/// One compiled redaction rule: entity glob plus the keys it denies.
#[derive(Debug, Clone)]
struct DenyRule {
    entities: Pattern,
    keys: Vec<String>,
}

/// Removes denied attribute keys from rows whose entity id matches.
#[derive(Debug, Clone, Default)]
pub struct AttributeSanitizer {
    rules: Vec<DenyRule>,
}

impl AttributeSanitizer {
    /// Compiles the denied-attribute rules of `config`.
    pub fn new(config: &FilterConfig) -> Result<Self, ConfigError> {
        let rules = config
            .denied_attributes
            .iter()
            .map(|(raw, keys)| {
                let entities = Pattern::new(raw)
                    .map_err(|err| ConfigError::invalid_pattern(raw, err.msg.to_string()))?;
                Ok(DenyRule {
                    entities,
                    keys: keys.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    /// Removes every denied key for `entity_id` from `attributes` in place.
    ///
    /// Returns the number of keys actually removed.
    pub fn sanitize(&self, entity_id: &str, attributes: &mut Map<String, Value>) -> usize {
        let mut removed = 0;
        for rule in &self.rules {
            if !rule.entities.matches(entity_id) {
                continue;
            }
            for key in &rule.keys {
                if attributes.remove(key).is_some() {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// True when no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
