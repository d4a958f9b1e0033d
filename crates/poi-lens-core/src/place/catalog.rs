//! Compiled-in catalog of named places

use serde::{Deserialize, Serialize};

use crate::spatial::GeoPoint;

/// A catalog row: a named location with category tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(flatten)]
    pub location: GeoPoint,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, location: GeoPoint, categories: &[&str]) -> Self {
        Self {
            name: name.into(),
            location,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }
}

// Ankara landmarks plus the Maltepe (Istanbul) seaside area
const BUILTIN: &[(&str, f64, f64, &[&str])] = &[
    ("Anıtkabir", 39.925533, 32.836417, &["müze", "tarihi_yer"]),
    ("Kızılay Meydanı", 39.920800, 32.854100, &["meydan"]),
    ("TBMM", 39.911268, 32.850749, &["resmi_bina"]),
    ("Maltepe Sahil", 40.919869, 29.127878, &["park", "sahil"]),
    ("Maltepe Meydanı", 40.922241, 29.129386, &["meydan"]),
    ("Dragos Tepesi", 40.914722, 29.127778, &["park", "manzara"]),
    ("Başıbüyük Hastanesi", 40.927778, 29.131944, &["hastane"]),
    ("Maltepe Üniversitesi", 40.928889, 29.130833, &["üniversite"]),
    ("Maltepe Park AVM", 40.922500, 29.128611, &["avm"]),
    ("Espressolab Maltepe Sahil", 40.919444, 29.127222, &["kafe", "kahve"]),
    ("Pelit Pastanesi Maltepe", 40.919722, 29.127500, &["pastane", "cafe"]),
    ("Starbucks Maltepe Sahil", 40.919556, 29.127111, &["kafe", "kahve"]),
    ("Kahve Dünyası Maltepe", 40.919333, 29.127444, &["kafe", "kahve"]),
    ("Burger King Maltepe Sahil", 40.919778, 29.126889, &["restoran", "fast-food"]),
    ("Midpoint Maltepe", 40.919222, 29.127667, &["restoran"]),
    ("Big Chefs Maltepe", 40.919111, 29.127889, &["restoran", "kafe"]),
    ("Mado Maltepe Sahil", 40.919444, 29.127333, &["kafe", "dondurma"]),
    ("Köfteci Yusuf Maltepe", 40.919667, 29.127000, &["restoran", "köfte"]),
    ("HD İskender Maltepe", 40.919889, 29.126778, &["restoran", "iskender"]),
    ("Baklava Sarayı", 40.919333, 29.127556, &["tatlıcı", "baklava"]),
    ("Özsüt Maltepe", 40.919222, 29.127778, &["pastane", "tatlıcı"]),
];

/// The built-in catalog
pub fn builtin_catalog() -> Vec<CatalogEntry> {
    BUILTIN
        .iter()
        .map(|(name, lat, lon, categories)| {
            CatalogEntry::new(*name, GeoPoint::new(*lat, *lon), categories)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_well_formed() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 21);
        for entry in &catalog {
            assert!(!entry.name.is_empty());
            assert!(entry.location.is_valid(), "{} has bad coordinates", entry.name);
            assert!(!entry.categories.is_empty());
        }
    }

    #[test]
    fn test_entry_json_shape() {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{"name":"Pier","latitude":40.9,"longitude":29.1,"categories":["iskele"]}"#,
        )
        .unwrap();
        assert_eq!(entry.location, GeoPoint::new(40.9, 29.1));
        assert_eq!(entry.categories, vec!["iskele".to_string()]);
    }
}
