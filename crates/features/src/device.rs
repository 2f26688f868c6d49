//! Device category classification
//!
//! Classification is tried in priority order:
//! 1. the `device_class` attribute, when the integration set one
//! 2. the entity's domain
//! 3. keyword matching against the entity id, with known false positives
//!    excluded per category

use hearth_record::DeviceCategory;
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "device_test.rs"]
mod tests;

/// `device_class` attribute value -> category
const DEVICE_CLASS_TABLE: &[(&str, DeviceCategory)] = &[
    ("temperature", DeviceCategory::Temperature),
    ("humidity", DeviceCategory::Humidity),
    ("moisture", DeviceCategory::Humidity),
    ("power", DeviceCategory::Power),
    ("current", DeviceCategory::Power),
    ("energy", DeviceCategory::Energy),
    ("carbon_dioxide", DeviceCategory::AirQuality),
    ("co2", DeviceCategory::AirQuality),
    ("pm25", DeviceCategory::AirQuality),
    ("pm10", DeviceCategory::AirQuality),
    ("volatile_organic_compounds", DeviceCategory::AirQuality),
    ("aqi", DeviceCategory::AirQuality),
    ("motion", DeviceCategory::Motion),
    ("occupancy", DeviceCategory::Motion),
    ("presence", DeviceCategory::Motion),
    ("door", DeviceCategory::DoorWindow),
    ("window", DeviceCategory::DoorWindow),
    ("garage_door", DeviceCategory::DoorWindow),
    ("opening", DeviceCategory::DoorWindow),
];

/// Entity domain -> category
const DOMAIN_TABLE: &[(&str, DeviceCategory)] = &[
    ("climate", DeviceCategory::Hvac),
    ("light", DeviceCategory::Light),
];

/// Per-category keyword lists matched as substrings of the entity id,
/// paired with substrings that disqualify a keyword hit
struct KeywordRule {
    category: DeviceCategory,
    keywords: &'static [&'static str],
    false_positives: &'static [&'static str],
}

const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        category: DeviceCategory::Temperature,
        keywords: &["temperature", "temp"],
        false_positives: &[],
    },
    KeywordRule {
        category: DeviceCategory::Humidity,
        keywords: &["humidity"],
        false_positives: &[],
    },
    KeywordRule {
        category: DeviceCategory::Power,
        keywords: &["power", "watt"],
        // "power_factor" is a ratio, not a power reading
        false_positives: &["power_factor"],
    },
    KeywordRule {
        category: DeviceCategory::Energy,
        keywords: &["energy", "consumption", "kwh"],
        false_positives: &[],
    },
    KeywordRule {
        category: DeviceCategory::AirQuality,
        keywords: &["co2", "carbon_dioxide", "pm2_5", "pm25", "air_quality", "voc"],
        false_positives: &[],
    },
    KeywordRule {
        category: DeviceCategory::Hvac,
        keywords: &["thermostat", "hvac"],
        false_positives: &[],
    },
    KeywordRule {
        category: DeviceCategory::Motion,
        keywords: &["motion", "occupancy", "presence", "pir"],
        false_positives: &[],
    },
    KeywordRule {
        category: DeviceCategory::DoorWindow,
        keywords: &["door", "window", "gate"],
        // doorbells report presses, not open/closed
        false_positives: &["doorbell"],
    },
    KeywordRule {
        category: DeviceCategory::Light,
        keywords: &["light", "lamp", "bulb"],
        false_positives: &[],
    },
];

/// Classify an entity into a device category
pub fn classify_device(
    entity_id: &str,
    domain: Option<&str>,
    attributes: &Map<String, Value>,
) -> DeviceCategory {
    if let Some(Value::String(class)) = attributes.get("device_class") {
        for (name, category) in DEVICE_CLASS_TABLE {
            if class == name {
                return *category;
            }
        }
    }

    if let Some(domain) = domain {
        for (name, category) in DOMAIN_TABLE {
            if domain == *name {
                return *category;
            }
        }
    }

    for rule in KEYWORD_RULES {
        let poisoned = rule.false_positives.iter().any(|fp| entity_id.contains(fp));
        if poisoned {
            continue;
        }
        if rule.keywords.iter().any(|kw| entity_id.contains(kw)) {
            return rule.category;
        }
    }

    DeviceCategory::Other
}
