//! # oereb-geometry
//!
//! Classification et tolérance géométrique pour les extraits du cadastre des
//! restrictions de droit public à la propriété foncière (RDPPF / ÖREB).
//!
//! ## Features
//!
//! - Table des types de géométrie validée au démarrage (point, ligne, polygone, collection)
//! - Dépliage des multi-géométries et des collections à un élément
//! - Intersection avec la parcelle, seuils de longueur et de surface
//! - Compensation des surfaces par la surface du registre foncier
//! - Décodage WKB/WKT via `geozero`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oereb_geometry::{evaluate, GeometryTypes, Tolerance};
//!
//! let types = GeometryTypes::default();
//! for part in types.flatten(&geometry)? {
//!     let result = evaluate(&part, &parcel_boundary, &Tolerance::default(), area_ratio);
//!     println!("{:?}", result);
//! }
//! ```

pub mod classify;
pub mod decode;
pub mod error;
pub mod tolerance;
pub mod types;

pub use classify::{type_name, GeometryTypes};
pub use decode::{geometry_from_wkb, geometry_from_wkt};
pub use error::GeometryError;
pub use tolerance::{evaluate, part_in_percent, round_one_decimal};
pub use types::{Elementary, Evaluation, GeometryCategory, Rejection, Share, Tolerance};

/// Sérialise une géométrie `geo` en objet géométrique GeoJSON
///
/// À utiliser avec `#[serde(serialize_with = "oereb_geometry::serialize_geojson")]`.
pub fn serialize_geojson<G, S>(geometry: &G, serializer: S) -> Result<S::Ok, S::Error>
where
    for<'a> geojson::Value: From<&'a G>,
    S: serde::Serializer,
{
    use serde::Serialize;
    geojson::Geometry::new(geojson::Value::from(geometry)).serialize(serializer)
}
