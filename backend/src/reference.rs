//! Static reference data: the fuel-type enumeration and the municipality list.
//!
//! Both are loaded once at process start and never mutated.

use std::path::Path;

use serde::Serialize;

use crate::error::ConfigError;
use crate::models::Municipality;
use crate::store::PriceStore;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuelType {
    pub id: i32,
    pub name: &'static str,
    pub short_name: &'static str,
}

pub const FUEL_TYPES: &[FuelType] = &[
    FuelType {
        id: 2,
        name: "Premium bezolovni benzin 95",
        short_name: "BMB 95",
    },
    FuelType {
        id: 3,
        name: "SUPER PLUS bezolovni benzin 98 BAS EN 228",
        short_name: "SUPER 98",
    },
    FuelType {
        id: 4,
        name: "Dizel EURO 5",
        short_name: "EUD5",
    },
    FuelType {
        id: 1002,
        name: "Dizel Euro 5 Aditivirani",
        short_name: "EUD5+",
    },
    FuelType {
        id: 2041,
        name: "Tečni naftni gas",
        short_name: "TNG",
    },
    FuelType {
        id: 2042,
        name: "AD BLUE",
        short_name: "ADB",
    },
    FuelType {
        id: 2043,
        name: "Lož ulje",
        short_name: "LU",
    },
    FuelType {
        id: 2044,
        name: "SUPER bezolovni benzin 100 BAS EN 228",
        short_name: "SUPER 100",
    },
    FuelType {
        id: 2045,
        name: "Dizel EURO 6",
        short_name: "EUD6",
    },
    FuelType {
        id: 2046,
        name: "Dizel EURO 4",
        short_name: "EUD4",
    },
    FuelType {
        id: 2047,
        name: "Premium bezolovni benzin 95 Aditivirani",
        short_name: "BMB95+",
    },
    FuelType {
        id: 2048,
        name: "Konzularni Dizel",
        short_name: "DKON",
    },
];

pub fn fuel_type(id: i32) -> Option<&'static FuelType> {
    FUEL_TYPES.iter().find(|f| f.id == id)
}

/// Parse a JSON array of municipalities.
pub fn parse_municipalities(json: &str) -> Result<Vec<Municipality>, ConfigError> {
    let municipalities: Vec<Municipality> = serde_json::from_str(json)?;

    for m in &municipalities {
        if m.latitude.is_some() != m.longitude.is_some() {
            return Err(ConfigError::Invalid {
                key: format!("municipality {}", m.id),
                value: m.name.clone(),
                reason: "latitude and longitude must be given together".to_string(),
            });
        }
    }

    Ok(municipalities)
}

pub fn load_municipalities(path: &Path) -> Result<Vec<Municipality>, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_municipalities(&contents)
}

/// Load the municipality file and upsert it into `store`. Returns the number of rows seeded.
pub fn seed_municipalities_from_file<S: PriceStore>(
    store: &S,
    path: &Path,
) -> Result<usize, ConfigError> {
    let municipalities = load_municipalities(path)?;
    Ok(store.seed_municipalities(&municipalities)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPriceStore;

    #[test]
    fn test_fuel_type_lookup() {
        let diesel = fuel_type(4).unwrap();
        assert_eq!(diesel.short_name, "EUD5");
        assert!(fuel_type(9999).is_none());
    }

    #[test]
    fn test_fuel_type_ids_are_unique() {
        for (i, a) in FUEL_TYPES.iter().enumerate() {
            for b in &FUEL_TYPES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_parse_municipalities() {
        let json = r#"[
            {"id": 3, "name": "Kiseljak", "latitude": 43.9426, "longitude": 18.0763},
            {"id": 7, "name": "Visoko"}
        ]"#;
        let municipalities = parse_municipalities(json).unwrap();
        assert_eq!(municipalities.len(), 2);
        assert_eq!(municipalities[0].latitude, Some(43.9426));
        assert!(municipalities[1].longitude.is_none());
    }

    #[test]
    fn test_parse_municipalities_rejects_half_centroid() {
        let json = r#"[{"id": 3, "name": "Kiseljak", "latitude": 43.9426}]"#;
        assert!(matches!(
            parse_municipalities(json),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_parse_municipalities_rejects_garbage() {
        assert!(matches!(
            parse_municipalities("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.json", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_seed_municipalities_from_file() {
        let path = temp_file(
            "municipalities-seed",
            r#"[{"id": 1, "name": "Banja Luka"}, {"id": 3, "name": "Kiseljak"}]"#,
        );
        let store = MemoryPriceStore::new();

        let seeded = seed_municipalities_from_file(&store, &path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(seeded, 2);
        assert_eq!(store.latest_municipality_id().unwrap(), Some(3));
    }

    #[test]
    fn test_seed_municipalities_missing_file_is_an_error() {
        let store = MemoryPriceStore::new();
        let path = std::env::temp_dir().join("no-such-municipalities-file.json");

        let err = seed_municipalities_from_file(&store, &path).unwrap_err();

        assert!(matches!(err, ConfigError::Io(_)));
        assert_eq!(store.latest_municipality_id().unwrap(), None);
    }

    #[test]
    fn test_seed_municipalities_invalid_file_stores_nothing() {
        let path = temp_file(
            "municipalities-invalid",
            r#"[{"id": 3, "name": "Kiseljak", "latitude": 43.9426}]"#,
        );
        let store = MemoryPriceStore::new();

        let err = seed_municipalities_from_file(&store, &path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(store.municipalities().unwrap().is_empty());
    }
}
