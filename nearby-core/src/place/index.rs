//! R\*-tree over catalog places.

use rstar::{AABB, RTree, RTreeObject};

use super::Place;
use crate::BoundingRegion;

#[derive(Debug, Clone)]
struct IndexedPlace {
    position: usize,
    place: Place,
}

impl RTreeObject for IndexedPlace {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let c = self.place.coordinate;
        AABB::from_point([c.longitude(), c.latitude()])
    }
}

/// Spatial index answering "which places are on screen".
///
/// # Examples
/// ```
/// use nearby_core::{BoundingRegion, Coordinate, Place, PlaceIndex};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cafe = Place::new("p1", "Café Olimpico", "cafes", Coordinate::new(45.5228, -73.6019)?);
/// let index = PlaceIndex::new(vec![cafe]);
/// let downtown = BoundingRegion::around(Coordinate::new(45.5017, -73.5673)?, 0.1, 0.1)?;
/// assert_eq!(index.places_in_region(&downtown).len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PlaceIndex {
    tree: RTree<IndexedPlace>,
}

impl PlaceIndex {
    /// Bulk-load `places` into a new index.
    pub fn new(places: Vec<Place>) -> Self {
        let entries = places
            .into_iter()
            .enumerate()
            .map(|(position, place)| IndexedPlace { position, place })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no places.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Places inside `region`, in catalog order. Boundary points are inside.
    #[must_use]
    pub fn places_in_region(&self, region: &BoundingRegion) -> Vec<Place> {
        let rect = region.to_rect();
        let envelope =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut hits: Vec<&IndexedPlace> =
            self.tree.locate_in_envelope_intersecting(&envelope).collect();
        hits.sort_unstable_by_key(|entry| entry.position);
        hits.into_iter().map(|entry| entry.place.clone()).collect()
    }
}
