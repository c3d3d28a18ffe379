//! Place catalog stored as a JSON file.

use camino::{Utf8Path, Utf8PathBuf};
use nearby_core::{CatalogError, Place, PlaceCatalog};

use crate::fs;

/// Catalog backed by a JSON array of places on disk.
///
/// The file is re-read on every fetch, so edits are picked up without a
/// restart. Places keep the order they have in the file.
///
/// ```json
/// [
///   {
///     "id": "tim-hortons-1",
///     "name": "Tim Hortons",
///     "category": "cafes",
///     "coordinate": {"latitude": 45.5017, "longitude": -73.5673},
///     "rating": 4.1
///   }
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonPlaceCatalog {
    path: Utf8PathBuf,
}

impl JsonPlaceCatalog {
    /// Catalog reading from `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the catalog file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl PlaceCatalog for JsonPlaceCatalog {
    fn fetch_nearby_places(&self) -> Result<Vec<Place>, CatalogError> {
        let contents = fs::read_to_string(&self.path).map_err(|err| CatalogError::Io {
            path: self.path.to_string(),
            message: err.to_string(),
        })?;
        let places: Vec<Place> =
            serde_json::from_str(&contents).map_err(|err| CatalogError::Parse {
                path: self.path.to_string(),
                message: err.to_string(),
            })?;
        log::debug!("loaded {} places from {}", places.len(), self.path);
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    const CATALOG: &str = r#"[
        {
            "id": "mcgill",
            "name": "McGill University",
            "category": "education",
            "coordinate": {"latitude": 45.5048, "longitude": -73.5772},
            "address": "845 Sherbrooke St W",
            "rating": 4.6,
            "photo_urls": ["https://img.test/mcgill.jpg"]
        },
        {
            "id": "mount-royal",
            "name": "Mount Royal Park",
            "category": "parks",
            "coordinate": {"latitude": 45.5048, "longitude": -73.5874}
        }
    ]"#;

    #[fixture]
    fn dir() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 path");
        std::fs::write(&path, contents).expect("write catalog");
        path
    }

    #[rstest]
    fn loads_places_in_file_order(dir: TempDir) {
        let catalog = JsonPlaceCatalog::new(write(&dir, "places.json", CATALOG));

        let places = catalog.fetch_nearby_places().expect("catalog should load");

        let ids: Vec<_> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["mcgill", "mount-royal"]);
        assert_eq!(places[0].address.as_deref(), Some("845 Sherbrooke St W"));
        assert_eq!(places[0].photo_urls.len(), 1);
        assert_eq!(places[1].rating, 0.0);
        assert!(places[1].website.is_none());
    }

    #[rstest]
    fn missing_file_is_an_io_error(dir: TempDir) {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).expect("utf-8 path");
        let err = JsonPlaceCatalog::new(path)
            .fetch_nearby_places()
            .expect_err("should fail");
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[rstest]
    #[case::not_json("places")]
    #[case::not_an_array(r#"{"id": "x"}"#)]
    #[case::bad_latitude(
        r#"[{"id":"x","name":"X","category":"parks","coordinate":{"latitude":91.0,"longitude":0.0}}]"#
    )]
    fn malformed_catalog_is_a_parse_error(dir: TempDir, #[case] contents: &str) {
        let catalog = JsonPlaceCatalog::new(write(&dir, "places.json", contents));
        let err = catalog.fetch_nearby_places().expect_err("should fail");
        assert!(matches!(err, CatalogError::Parse { .. }), "{err}");
    }
}
