//! Types de données pour le crate oereb-geometry

use std::fmt;
use std::str::FromStr;

use geo::{Geometry, LineString, Point, Polygon};
use serde::{Serialize, Serializer};

use crate::GeometryError;

/// Catégorie élémentaire d'une géométrie
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryCategory {
    Point,
    Line,
    Polygon,
    Collection,
}

impl GeometryCategory {
    /// Libellé utilisé dans la configuration
    pub fn label(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Collection => "collection",
        }
    }
}

impl fmt::Display for GeometryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GeometryCategory {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(Self::Point),
            "line" => Ok(Self::Line),
            "polygon" => Ok(Self::Polygon),
            "collection" => Ok(Self::Collection),
            _ => Err(GeometryError::UnknownCategory(s.to_string())),
        }
    }
}

/// Géométrie élémentaire (après dépliage des multi-géométries et collections)
#[derive(Debug, Clone, PartialEq)]
pub enum Elementary {
    Point(Point),
    Line(LineString),
    Polygon(Polygon),
}

impl Elementary {
    pub fn category(&self) -> GeometryCategory {
        match self {
            Self::Point(_) => GeometryCategory::Point,
            Self::Line(_) => GeometryCategory::Line,
            Self::Polygon(_) => GeometryCategory::Polygon,
        }
    }

    pub fn to_geometry(&self) -> Geometry {
        match self {
            Self::Point(p) => Geometry::Point(*p),
            Self::Line(ls) => Geometry::LineString(ls.clone()),
            Self::Polygon(p) => Geometry::Polygon(p.clone()),
        }
    }
}

impl Serialize for Elementary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::serialize_geojson(&self.to_geometry(), serializer)
    }
}

/// Seuils de tolérance d'un thème
#[derive(Debug, Clone, PartialEq)]
pub struct Tolerance {
    /// Longueur minimale retenue pour une ligne
    pub min_length: f64,

    /// Surface minimale (compensée) retenue pour un polygone
    pub min_area: f64,

    /// Unité affichée pour les longueurs
    pub length_unit: String,

    /// Unité affichée pour les surfaces
    pub area_unit: String,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            min_length: 1.0,
            min_area: 1.0,
            length_unit: "m".to_string(),
            area_unit: "m²".to_string(),
        }
    }
}

/// Part d'une géométrie retenue sur la parcelle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Share {
    /// Nombre de points situés sur la parcelle
    Points { count: usize },

    /// Longueur de l'intersection
    Length { length: f64, unit: String },

    /// Surface compensée et pourcentage de la parcelle
    Area {
        area: f64,
        unit: String,
        part_in_percent: f64,
    },
}

impl Share {
    pub fn category(&self) -> GeometryCategory {
        match self {
            Self::Points { .. } => GeometryCategory::Point,
            Self::Length { .. } => GeometryCategory::Line,
            Self::Area { .. } => GeometryCategory::Polygon,
        }
    }
}

/// Motif de rejet d'une géométrie (résultat attendu, pas une erreur)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Intersection vide ou dégénérée
    Empty,
    /// Longueur inférieure au seuil
    BelowMinLength { length: f64, min_length: f64 },
    /// Surface compensée inférieure au seuil
    BelowMinArea { area: f64, min_area: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty intersection"),
            Self::BelowMinLength { length, min_length } => {
                write!(f, "length {length:.3} below {min_length}")
            }
            Self::BelowMinArea { area, min_area } => {
                write!(f, "compensated area {area:.3} below {min_area}")
            }
        }
    }
}

/// Résultat de l'évaluation d'une géométrie élémentaire
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Accepted(Share),
    Rejected(Rejection),
}

impl Evaluation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}
