// Region domain model
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Region {
    pub fn new(id: String, name: String, color: String) -> Self {
        Self { id, name, color }
    }
}

/// Fixed, ordered set of monitored regions, defined once at startup.
///
/// The first region is the primary one: the staggered startup loader fetches
/// it before all others, and it is the initially selected region.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn primary(&self) -> Option<&Region> {
        self.regions.first()
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RegionRegistry {
        RegionRegistry::new(vec![
            Region::new("Mumbai".into(), "Mumbai".into(), "#e74c3c".into()),
            Region::new("Delhi".into(), "Delhi".into(), "#3498db".into()),
        ])
    }

    #[test]
    fn test_primary_is_first() {
        assert_eq!(registry().primary().unwrap().id, "Mumbai");
    }

    #[test]
    fn test_lookup_by_id() {
        let reg = registry();
        assert!(reg.contains("Delhi"));
        assert!(!reg.contains("Pune"));
        assert_eq!(reg.get("Delhi").unwrap().color, "#3498db");
    }

    #[test]
    fn test_ids_preserve_order() {
        assert_eq!(registry().ids(), vec!["Mumbai", "Delhi"]);
    }
}
