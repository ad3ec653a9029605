//! Classification et dépliage des géométries
//!
//! La table des types est fournie par la configuration (catégorie -> noms de
//! types). Elle est validée une seule fois au démarrage : une catégorie ou un
//! nom de type inconnu est rejeté immédiatement, pas géométrie par géométrie.

use std::collections::HashMap;

use geo::{Geometry, LineString};
use tracing::trace;

use crate::{Elementary, GeometryCategory, GeometryError};

/// Types rangés par défaut dans la catégorie point
pub const DEFAULT_POINT_TYPES: &[&str] = &["Point", "MultiPoint"];
/// Types rangés par défaut dans la catégorie ligne
pub const DEFAULT_LINE_TYPES: &[&str] = &["LineString", "Line", "MultiLineString"];
/// Types rangés par défaut dans la catégorie polygone
pub const DEFAULT_POLYGON_TYPES: &[&str] = &["Polygon", "Rect", "Triangle", "MultiPolygon"];
/// Types rangés par défaut dans la catégorie collection
pub const DEFAULT_COLLECTION_TYPES: &[&str] = &["GeometryCollection"];

/// Nom de type d'une géométrie `geo`
pub fn type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Catégorie naturelle d'un nom de type, `None` si le nom est inconnu
fn natural_category(type_name: &str) -> Option<GeometryCategory> {
    match type_name {
        "Point" | "MultiPoint" => Some(GeometryCategory::Point),
        "Line" | "LineString" | "MultiLineString" => Some(GeometryCategory::Line),
        "Polygon" | "Rect" | "Triangle" | "MultiPolygon" => Some(GeometryCategory::Polygon),
        "GeometryCollection" => Some(GeometryCategory::Collection),
        _ => None,
    }
}

/// Table validée nom de type -> catégorie
#[derive(Debug, Clone)]
pub struct GeometryTypes {
    by_name: HashMap<String, GeometryCategory>,
}

impl Default for GeometryTypes {
    fn default() -> Self {
        let mut by_name = HashMap::new();
        for (category, names) in [
            (GeometryCategory::Point, DEFAULT_POINT_TYPES),
            (GeometryCategory::Line, DEFAULT_LINE_TYPES),
            (GeometryCategory::Polygon, DEFAULT_POLYGON_TYPES),
            (GeometryCategory::Collection, DEFAULT_COLLECTION_TYPES),
        ] {
            for name in names {
                by_name.insert((*name).to_string(), category);
            }
        }
        Self { by_name }
    }
}

impl GeometryTypes {
    /// Construit la table depuis la configuration (libellé de catégorie -> noms de types)
    ///
    /// # Errors
    ///
    /// - `UnknownCategory` pour un libellé autre que point/line/polygon/collection
    /// - `UnknownTypeName` pour un type que `geo` ne connaît pas
    /// - `CategoryMismatch` si un type est rangé hors de sa catégorie naturelle
    pub fn from_config<'a, I, N>(mapping: I) -> Result<Self, GeometryError>
    where
        I: IntoIterator<Item = (&'a str, N)>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let mut by_name: HashMap<String, GeometryCategory> = HashMap::new();

        for (label, names) in mapping {
            let category: GeometryCategory = label.parse()?;

            for name in names {
                let name = name.as_ref().trim();
                let natural = natural_category(name)
                    .ok_or_else(|| GeometryError::UnknownTypeName(name.to_string()))?;

                if natural != category {
                    return Err(GeometryError::CategoryMismatch {
                        type_name: name.to_string(),
                        category,
                    });
                }

                by_name.insert(name.to_string(), category);
            }
        }

        Ok(Self { by_name })
    }

    /// Catégorie configurée pour une géométrie
    pub fn category_of(&self, geometry: &Geometry) -> Result<GeometryCategory, GeometryError> {
        let name = type_name(geometry);
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| GeometryError::unsupported(name))
    }

    /// Déplie une géométrie en géométries élémentaires
    ///
    /// Les multi-géométries sont éclatées et chaque partie est reclassée.
    /// Une collection d'un seul élément est dépliée récursivement, une
    /// collection vide ne produit rien.
    ///
    /// # Errors
    ///
    /// `UnsupportedGeometryType` ou `TooManyCollectionElements`. L'appelant
    /// écarte alors la restriction entière.
    pub fn flatten(&self, geometry: &Geometry) -> Result<Vec<Elementary>, GeometryError> {
        let mut out = Vec::new();
        self.flatten_into(geometry, &mut out)?;
        Ok(out)
    }

    fn flatten_into(&self, geometry: &Geometry, out: &mut Vec<Elementary>) -> Result<(), GeometryError> {
        // La catégorie est vérifiée avant tout dépliage : un type absent de
        // la configuration est refusé même s'il contient des parties valides
        self.category_of(geometry)?;

        match geometry {
            Geometry::Point(p) => out.push(Elementary::Point(*p)),
            Geometry::LineString(ls) => out.push(Elementary::Line(ls.clone())),
            Geometry::Line(line) => {
                out.push(Elementary::Line(LineString::from(vec![line.start, line.end])))
            }
            Geometry::Polygon(p) => out.push(Elementary::Polygon(p.clone())),
            Geometry::Rect(rect) => out.push(Elementary::Polygon(rect.to_polygon())),
            Geometry::Triangle(tri) => out.push(Elementary::Polygon(tri.to_polygon())),
            Geometry::MultiPoint(mp) => {
                for point in mp.iter() {
                    self.flatten_into(&Geometry::Point(*point), out)?;
                }
            }
            Geometry::MultiLineString(mls) => {
                for ls in mls.iter() {
                    self.flatten_into(&Geometry::LineString(ls.clone()), out)?;
                }
            }
            Geometry::MultiPolygon(mp) => {
                for polygon in mp.iter() {
                    self.flatten_into(&Geometry::Polygon(polygon.clone()), out)?;
                }
            }
            Geometry::GeometryCollection(gc) => match gc.0.as_slice() {
                [] => trace!("Empty geometry collection ignored"),
                [single] => self.flatten_into(single, out)?,
                elements => {
                    return Err(GeometryError::TooManyCollectionElements {
                        count: elements.len(),
                    })
                }
            },
        }

        Ok(())
    }
}
