//! Primitives géométriques: emprise et comptage de sommets

use std::fmt;

use geo::{Coord, LineString, Polygon};

/// Emprise rectangulaire (min_x, min_y, max_x, max_y)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Emprise d'une suite de coordonnées, `None` si elle est vide
    pub fn from_coords<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };

        Some(iter.fold(init, |bbox, c| Self {
            min_x: bbox.min_x.min(c.x),
            min_y: bbox.min_y.min(c.y),
            max_x: bbox.max_x.max(c.x),
            max_y: bbox.max_y.max(c.y),
        }))
    }

    /// Emprise de l'anneau extérieur d'un polygone
    pub fn from_polygon(polygon: &Polygon) -> Option<Self> {
        Self::from_coords(polygon.exterior().coords().copied())
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Ordre attendu par `lasclip -inside`: min_x min_y max_x max_y
impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Nombre de sommets distincts d'un anneau (le sommet de fermeture compte une fois)
pub fn distinct_vertex_count(ring: &LineString) -> usize {
    let mut seen: Vec<Coord> = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        if !seen.contains(c) {
            seen.push(*c);
        }
    }
    seen.len()
}
