use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::slot::default_time_slots;
use super::{ServiceCatalog, ServiceDef, TimeSlot};

/// Static studio configuration: bookable services and the hourly slots
/// offered every day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudioConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub services: Vec<ServiceDef>,
    #[serde(default = "default_time_slots")]
    pub time_slots: Vec<TimeSlot>,
}

fn default_name() -> String {
    "M&M: Music and More".to_string()
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            services: ServiceCatalog::default().services().to_vec(),
            time_slots: default_time_slots(),
        }
    }
}

impl StudioConfig {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let config: StudioConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.services.is_empty() {
            anyhow::bail!("studio config has no services");
        }
        let mut ids = HashSet::new();
        for service in &self.services {
            if service.id.as_str().is_empty() || service.room.is_empty() {
                anyhow::bail!("service entries need both an id and a room");
            }
            if !ids.insert(&service.id) {
                anyhow::bail!("duplicate service id: {}", service.id);
            }
        }

        if self.time_slots.is_empty() {
            anyhow::bail!("studio config has no time slots");
        }
        if !self.time_slots.windows(2).all(|w| w[0] < w[1]) {
            anyhow::bail!("time slots must be unique and in chronological order");
        }
        Ok(())
    }

    pub fn catalog(&self) -> ServiceCatalog {
        ServiceCatalog::new(self.services.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StudioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog(), ServiceCatalog::default());
    }

    #[test]
    fn test_parse_valid_json() {
        let json = r#"{
            "services": [
                {"id":"a-drums","room":"a","label":"Drums"},
                {"id":"a-keys","room":"a","label":"Keys"}
            ],
            "time_slots": ["10:00","11:00"]
        }"#;
        let config = StudioConfig::from_json(json).unwrap();
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.time_slots.len(), 2);
        assert_eq!(config.name, "M&M: Music and More");
    }

    #[test]
    fn test_missing_slots_use_defaults() {
        let json = r#"{"services":[{"id":"x","room":"r","label":"X"}]}"#;
        let config = StudioConfig::from_json(json).unwrap();
        assert_eq!(config.time_slots, default_time_slots());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(StudioConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_unsorted_slots_rejected() {
        let json = r#"{"services":[{"id":"x","room":"r","label":"X"}],"time_slots":["11:00","10:00"]}"#;
        assert!(StudioConfig::from_json(json).is_err());
    }

    #[test]
    fn test_duplicate_service_rejected() {
        let json = r#"{"services":[{"id":"x","room":"r","label":"X"},{"id":"x","room":"q","label":"Y"}]}"#;
        assert!(StudioConfig::from_json(json).is_err());
    }

    #[test]
    fn test_invalid_slot_rejected() {
        let json = r#"{"services":[{"id":"x","room":"r","label":"X"}],"time_slots":["25:00"]}"#;
        assert!(StudioConfig::from_json(json).is_err());
    }
}
