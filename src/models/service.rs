use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a bookable offering, e.g. `room1-jamming`.
///
/// Kept as an open string rather than a closed enum: identifiers come from
/// configuration and persisted data, and unknown ones must still be usable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceDef {
    pub id: ServiceId,
    pub room: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceCatalog {
    services: Vec<ServiceDef>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new(vec![
            ServiceDef {
                id: ServiceId::from("room1-jamming"),
                room: "room1".to_string(),
                label: "Jamming Session".to_string(),
            },
            ServiceDef {
                id: ServiceId::from("room1-gaming"),
                room: "room1".to_string(),
                label: "Gaming Session".to_string(),
            },
            ServiceDef {
                id: ServiceId::from("room2-recording"),
                room: "room2".to_string(),
                label: "Recording Studio".to_string(),
            },
        ])
    }
}

impl ServiceCatalog {
    pub fn new(services: Vec<ServiceDef>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &[ServiceDef] {
        &self.services
    }

    pub fn get(&self, service: &ServiceId) -> Option<&ServiceDef> {
        self.services.iter().find(|s| &s.id == service)
    }

    pub fn contains(&self, service: &ServiceId) -> bool {
        self.get(service).is_some()
    }

    /// Every service sharing a room with `service`, itself included, in
    /// declaration order. Unknown services only conflict with themselves.
    pub fn conflicts_for(&self, service: &ServiceId) -> Vec<ServiceId> {
        match self.get(service) {
            Some(def) => self
                .services
                .iter()
                .filter(|s| s.room == def.room)
                .map(|s| s.id.clone())
                .collect(),
            None => vec![service.clone()],
        }
    }

    pub fn conflicts(&self, a: &ServiceId, b: &ServiceId) -> bool {
        self.conflicts_for(a).contains(b)
    }

    pub fn display_name<'a>(&'a self, service: &'a ServiceId) -> &'a str {
        self.get(service)
            .map(|s| s.label.as_str())
            .unwrap_or_else(|| service.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ServiceId {
        ServiceId::from(s)
    }

    #[test]
    fn test_room1_services_conflict_with_each_other() {
        let catalog = ServiceCatalog::default();
        assert_eq!(
            catalog.conflicts_for(&id("room1-gaming")),
            vec![id("room1-jamming"), id("room1-gaming")]
        );
        assert_eq!(
            catalog.conflicts_for(&id("room1-jamming")),
            vec![id("room1-jamming"), id("room1-gaming")]
        );
    }

    #[test]
    fn test_room2_only_conflicts_with_itself() {
        let catalog = ServiceCatalog::default();
        assert_eq!(
            catalog.conflicts_for(&id("room2-recording")),
            vec![id("room2-recording")]
        );
    }

    #[test]
    fn test_unknown_service_conflicts_with_itself() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.conflicts_for(&id("karaoke")), vec![id("karaoke")]);
    }

    #[test]
    fn test_conflict_relation_symmetric_and_reflexive() {
        let catalog = ServiceCatalog::default();
        let all: Vec<ServiceId> = catalog.services().iter().map(|s| s.id.clone()).collect();
        for a in &all {
            assert!(catalog.conflicts(a, a));
            for b in &all {
                assert_eq!(catalog.conflicts(a, b), catalog.conflicts(b, a));
            }
        }
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.display_name(&id("room1-gaming")), "Gaming Session");
        assert_eq!(catalog.display_name(&id("karaoke")), "karaoke");
    }

    #[test]
    fn test_serde_transparent_id() {
        let json = serde_json::to_string(&id("room2-recording")).unwrap();
        assert_eq!(json, r#""room2-recording""#);
    }
}
