//! Points of interest shown as map overlays.
//!
//! Places come from an external catalog and are independent of the search
//! state machine. The core only models them and indexes them spatially so the
//! presentation layer can draw the ones inside the visible region.

mod index;

pub use index::PlaceIndex;

use thiserror::Error;

use crate::Coordinate;

/// A point of interest from the place catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Place {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Identifier of the place's [`Category`].
    pub category: String,
    /// Where the place is.
    pub coordinate: Coordinate,
    /// Street address.
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: Option<String>,
    /// Average rating, 0 to 5.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rating: f64,
    /// Contact number.
    #[cfg_attr(feature = "serde", serde(default))]
    pub phone: Option<String>,
    /// Photo URLs, best first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub photo_urls: Vec<String>,
    /// Website URL.
    #[cfg_attr(feature = "serde", serde(default))]
    pub website: Option<String>,
}

impl Place {
    /// A place with no optional details.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            coordinate,
            address: None,
            rating: 0.0,
            phone: None,
            photo_urls: Vec::new(),
            website: None,
        }
    }

    /// The default [`Category`] this place belongs to, if it is a known one.
    #[must_use]
    pub fn known_category(&self) -> Option<Category> {
        Category::lookup(&self.category)
    }
}

/// A grouping of places with its map styling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category {
    /// Stable identifier, e.g. `restaurants`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Symbol name for the map annotation.
    pub icon: Option<String>,
    /// Annotation colour as `#RRGGBB`.
    pub color_hex: Option<String>,
}

const DEFAULT_CATEGORIES: [(&str, &str, &str, &str); 7] = [
    ("restaurants", "Restaurants", "fork.knife", "#FF6B6B"),
    ("cafes", "Cafés", "cup.and.saucer", "#8B4513"),
    ("parks", "Parks", "tree", "#4CAF50"),
    ("shopping", "Shopping", "cart", "#9C27B0"),
    ("libraries", "Libraries", "book", "#2196F3"),
    ("education", "Education", "graduationcap", "#FF9800"),
    ("entertainment", "Entertainment", "theatermasks", "#2196F3"),
];

impl Category {
    /// The built-in categories, in display order.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        DEFAULT_CATEGORIES
            .iter()
            .map(|&(id, name, icon, color)| Self {
                id: id.to_owned(),
                name: name.to_owned(),
                icon: Some(icon.to_owned()),
                color_hex: Some(color.to_owned()),
            })
            .collect()
    }

    /// Find a built-in category by id or display name, ignoring case.
    ///
    /// # Examples
    /// ```
    /// use nearby_core::Category;
    ///
    /// let parks = Category::lookup("PARKS").expect("built-in category");
    /// assert_eq!(parks.icon.as_deref(), Some("tree"));
    /// assert!(Category::lookup("casinos").is_none());
    /// ```
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::defaults()
            .into_iter()
            .find(|c| c.id.eq_ignore_ascii_case(name) || c.name.to_lowercase() == name.to_lowercase())
    }
}

/// Errors raised by a [`PlaceCatalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be read.
    #[error("failed to read place catalog {path}: {message}")]
    Io {
        /// Catalog location.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// The catalog contents were malformed.
    #[error("failed to parse place catalog {path}: {message}")]
    Parse {
        /// Catalog location.
        path: String,
        /// Decoder error message.
        message: String,
    },
}

/// Read-only source of places near the user.
pub trait PlaceCatalog: Send + Sync {
    /// All places, in provider order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog cannot be read.
    fn fetch_nearby_places(&self) -> Result<Vec<Place>, CatalogError>;
}
