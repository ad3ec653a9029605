//! Parcelle (bien-fonds) et commune

use geo::{Area, Geometry, MultiPolygon};
use serde::Serialize;

use crate::ExtractError;

/// Bien-fonds pour lequel l'extrait est établi
///
/// Le rapport `area_ratio` est calculé une seule fois à la construction et
/// sert à toutes les compensations de surface de la composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parcel {
    egrid: String,
    number: String,
    identdn: String,
    fosnr: u32,
    #[serde(serialize_with = "oereb_geometry::serialize_geojson")]
    boundary: MultiPolygon,
    boundary_area: f64,
    registry_area: f64,
    area_ratio: f64,
    /// Type de bien-fonds (bien-fonds, DDP, mine...)
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    land_registry_subunit: Option<String>,
}

impl Parcel {
    /// Construit une parcelle en validant l'emprise et la surface du registre
    ///
    /// # Errors
    ///
    /// `InvalidRecord` si l'emprise n'est pas surfacique, vide ou de surface
    /// non finie, ou si la
    /// surface du registre n'est pas strictement positive.
    pub fn new(
        egrid: impl Into<String>,
        number: impl Into<String>,
        identdn: impl Into<String>,
        fosnr: u32,
        boundary: Geometry,
        registry_area: f64,
    ) -> Result<Self, ExtractError> {
        let egrid = egrid.into();

        let boundary = match boundary {
            Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            Geometry::MultiPolygon(mp) => mp,
            other => {
                return Err(ExtractError::invalid_record(
                    &egrid,
                    format!(
                        "parcel boundary must be a polygon, got {}",
                        oereb_geometry::type_name(&other)
                    ),
                ))
            }
        };

        let geometric_area = boundary.unsigned_area();
        if !geometric_area.is_finite() || geometric_area <= 0.0 {
            return Err(ExtractError::invalid_record(&egrid, "empty parcel boundary"));
        }
        if !registry_area.is_finite() || registry_area <= 0.0 {
            return Err(ExtractError::invalid_record(
                &egrid,
                format!("invalid registry area {registry_area}"),
            ));
        }

        Ok(Self {
            egrid,
            number: number.into(),
            identdn: identdn.into(),
            fosnr,
            boundary,
            boundary_area: geometric_area,
            registry_area,
            area_ratio: geometric_area / registry_area,
            kind: None,
            land_registry_subunit: None,
        })
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Renseigne la sous-unité du registre foncier
    pub fn with_land_registry_subunit(mut self, subunit: impl Into<String>) -> Self {
        self.land_registry_subunit = Some(subunit.into());
        self
    }

    /// Identifiant fédéral (EGRID)
    pub fn egrid(&self) -> &str {
        &self.egrid
    }

    /// Numéro communal
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Identifiant cantonal du registre foncier
    pub fn identdn(&self) -> &str {
        &self.identdn
    }

    /// Numéro OFS de la commune
    pub fn fosnr(&self) -> u32 {
        self.fosnr
    }

    pub fn boundary(&self) -> &MultiPolygon {
        &self.boundary
    }

    /// Surface géométrique de l'emprise
    pub fn boundary_area(&self) -> f64 {
        self.boundary_area
    }

    /// Surface inscrite au registre foncier (fait foi)
    pub fn registry_area(&self) -> f64 {
        self.registry_area
    }

    /// Surface géométrique / surface du registre
    pub fn area_ratio(&self) -> f64 {
        self.area_ratio
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn land_registry_subunit(&self) -> Option<&str> {
        self.land_registry_subunit.as_deref()
    }
}

/// Commune
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Municipality {
    /// Numéro OFS
    pub fosnr: u32,

    pub name: String,

    /// Le cadastre RDPPF est publié pour cette commune
    pub published: bool,
}

impl Municipality {
    pub fn new(fosnr: u32, name: impl Into<String>, published: bool) -> Self {
        Self {
            fosnr,
            name: name.into(),
            published,
        }
    }
}
