//! Décodage des géométries à la frontière des sources de données
//!
//! Les sources lisent généralement des colonnes PostGIS (WKB) ou des
//! fixtures textuelles (WKT). Le décodage passe par `geozero`.

use geo::Geometry;
use geozero::wkb::Wkb;
use geozero::wkt::Wkt;
use geozero::ToGeo;

use crate::GeometryError;

/// Décode une géométrie WKB (ISO ou OGC)
pub fn geometry_from_wkb(bytes: &[u8]) -> Result<Geometry, GeometryError> {
    if bytes.is_empty() {
        return Err(GeometryError::Decode("empty WKB buffer".to_string()));
    }
    Wkb(bytes.to_vec())
        .to_geo()
        .map_err(|e| GeometryError::Decode(e.to_string()))
}

/// Décode une géométrie WKT
pub fn geometry_from_wkt(text: &str) -> Result<Geometry, GeometryError> {
    Wkt(text.trim().to_string())
        .to_geo()
        .map_err(|e| GeometryError::Decode(e.to_string()))
}
