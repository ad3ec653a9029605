//! Restrictions de droit public et leurs géométries
//!
//! Deux phases distinctes :
//! - `RestrictionRecord` / `GeometryRecord` : enregistrements bruts livrés par
//!   une source, validés à la construction
//! - `Restriction` / `EvaluatedGeometry` : restrictions retenues après
//!   évaluation de tolérance, avec leurs parts calculées
//!
//! Une `UnevaluatedGeometry` n'expose aucune part : lire une surface avant
//! l'évaluation n'est pas exprimable.

use chrono::NaiveDate;
use geo::Geometry;
use oereb_geometry::{
    evaluate, geometry_from_wkb, geometry_from_wkt, part_in_percent, Elementary, Evaluation,
    GeometryError, GeometryTypes, Rejection, Share, Tolerance,
};
use serde::Serialize;

use super::{Document, Office, Parcel, Symbol};
use crate::ExtractError;

/// Géométrie brute d'une restriction, telle que livrée par la source
#[derive(Debug, Clone)]
pub struct GeometryRecord {
    pub geometry: Geometry,
    pub law_status: String,
    pub published_from: NaiveDate,
    pub published_until: Option<NaiveDate>,
    /// Lien vers les métadonnées de la géodonnée
    pub geo_metadata: Option<String>,
}

impl GeometryRecord {
    /// Construit une géométrie brute en validant statut et fenêtre de publication
    pub fn new(
        geometry: Geometry,
        law_status: impl Into<String>,
        published_from: NaiveDate,
        published_until: Option<NaiveDate>,
    ) -> Result<Self, ExtractError> {
        let law_status = law_status.into();
        if law_status.trim().is_empty() {
            return Err(ExtractError::invalid_record("geometry", "empty law status"));
        }
        if let Some(until) = published_until {
            if until < published_from {
                return Err(ExtractError::invalid_record(
                    "geometry",
                    format!("published until {until} before published from {published_from}"),
                ));
            }
        }

        Ok(Self {
            geometry,
            law_status,
            published_from,
            published_until,
            geo_metadata: None,
        })
    }

    /// Construit depuis une colonne WKB
    pub fn from_wkb(
        bytes: &[u8],
        law_status: impl Into<String>,
        published_from: NaiveDate,
        published_until: Option<NaiveDate>,
    ) -> Result<Self, ExtractError> {
        Self::new(geometry_from_wkb(bytes)?, law_status, published_from, published_until)
    }

    /// Construit depuis un texte WKT
    pub fn from_wkt(
        text: &str,
        law_status: impl Into<String>,
        published_from: NaiveDate,
        published_until: Option<NaiveDate>,
    ) -> Result<Self, ExtractError> {
        Self::new(geometry_from_wkt(text)?, law_status, published_from, published_until)
    }

    pub fn with_geo_metadata(mut self, url: impl Into<String>) -> Self {
        self.geo_metadata = Some(url.into());
        self
    }

    pub fn is_published(&self, at: NaiveDate) -> bool {
        super::is_published(self.published_from, self.published_until, at)
    }

    /// Déplie la géométrie en géométries élémentaires non évaluées
    pub fn flatten(&self, types: &GeometryTypes) -> Result<Vec<UnevaluatedGeometry>, GeometryError> {
        Ok(types
            .flatten(&self.geometry)?
            .into_iter()
            .map(|geometry| UnevaluatedGeometry {
                geometry,
                law_status: self.law_status.clone(),
                published_from: self.published_from,
                published_until: self.published_until,
                geo_metadata: self.geo_metadata.clone(),
            })
            .collect())
    }
}

/// Géométrie élémentaire en attente d'évaluation
#[derive(Debug, Clone)]
pub struct UnevaluatedGeometry {
    geometry: Elementary,
    law_status: String,
    published_from: NaiveDate,
    published_until: Option<NaiveDate>,
    geo_metadata: Option<String>,
}

impl UnevaluatedGeometry {
    pub fn geometry(&self) -> &Elementary {
        &self.geometry
    }

    pub fn law_status(&self) -> &str {
        &self.law_status
    }

    /// Évalue la géométrie contre la parcelle (consomme la phase non évaluée)
    pub fn evaluate(
        self,
        parcel: &Parcel,
        tolerance: &Tolerance,
    ) -> Result<EvaluatedGeometry, Rejection> {
        match evaluate(&self.geometry, parcel.boundary(), tolerance, parcel.area_ratio()) {
            Evaluation::Accepted(share) => Ok(EvaluatedGeometry {
                geometry: self.geometry,
                law_status: self.law_status,
                published_from: self.published_from,
                published_until: self.published_until,
                geo_metadata: self.geo_metadata,
                share,
            }),
            Evaluation::Rejected(rejection) => Err(rejection),
        }
    }
}

/// Géométrie retenue, avec sa part calculée une fois pour toutes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedGeometry {
    geometry: Elementary,
    law_status: String,
    published_from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    published_until: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo_metadata: Option<String>,
    share: Share,
}

impl EvaluatedGeometry {
    pub fn geometry(&self) -> &Elementary {
        &self.geometry
    }

    pub fn law_status(&self) -> &str {
        &self.law_status
    }

    pub fn share(&self) -> &Share {
        &self.share
    }

    pub fn geo_metadata(&self) -> Option<&str> {
        self.geo_metadata.as_deref()
    }
}

/// Restriction brute livrée par une source de thème
#[derive(Debug, Clone)]
pub struct RestrictionRecord {
    pub id: String,
    pub theme: String,
    pub sub_theme: Option<String>,
    pub type_code: String,
    pub type_code_list: String,
    pub law_status: String,
    pub information: String,
    pub view_service_id: String,
    pub office_id: String,
    pub document_ids: Vec<String>,
    pub geometries: Vec<GeometryRecord>,
}

impl RestrictionRecord {
    /// Démarre la construction validée d'une restriction
    pub fn builder(
        id: impl Into<String>,
        theme: impl Into<String>,
        type_code: impl Into<String>,
        law_status: impl Into<String>,
    ) -> RestrictionRecordBuilder {
        RestrictionRecordBuilder {
            id: id.into(),
            theme: theme.into(),
            sub_theme: None,
            type_code: type_code.into(),
            type_code_list: String::new(),
            law_status: law_status.into(),
            information: String::new(),
            view_service_id: None,
            office_id: None,
            document_ids: Vec::new(),
            geometries: Vec::new(),
        }
    }
}

/// Constructeur validant de `RestrictionRecord`
#[derive(Debug, Clone)]
pub struct RestrictionRecordBuilder {
    id: String,
    theme: String,
    sub_theme: Option<String>,
    type_code: String,
    type_code_list: String,
    law_status: String,
    information: String,
    view_service_id: Option<String>,
    office_id: Option<String>,
    document_ids: Vec<String>,
    geometries: Vec<GeometryRecord>,
}

impl RestrictionRecordBuilder {
    pub fn sub_theme(mut self, sub_theme: impl Into<String>) -> Self {
        self.sub_theme = Some(sub_theme.into());
        self
    }

    pub fn type_code_list(mut self, list: impl Into<String>) -> Self {
        self.type_code_list = list.into();
        self
    }

    pub fn information(mut self, information: impl Into<String>) -> Self {
        self.information = information.into();
        self
    }

    pub fn view_service(mut self, id: impl Into<String>) -> Self {
        self.view_service_id = Some(id.into());
        self
    }

    pub fn office(mut self, id: impl Into<String>) -> Self {
        self.office_id = Some(id.into());
        self
    }

    pub fn document(mut self, id: impl Into<String>) -> Self {
        self.document_ids.push(id.into());
        self
    }

    pub fn geometry(mut self, geometry: GeometryRecord) -> Self {
        self.geometries.push(geometry);
        self
    }

    /// Valide et produit l'enregistrement
    ///
    /// # Errors
    ///
    /// `InvalidRecord` si un code obligatoire est vide, si le service de
    /// visualisation ou l'office manque, ou si aucune géométrie n'est fournie.
    pub fn build(self) -> Result<RestrictionRecord, ExtractError> {
        let id = self.id;
        for (field, value) in [
            ("id", &id),
            ("theme", &self.theme),
            ("type code", &self.type_code),
            ("law status", &self.law_status),
        ] {
            if value.trim().is_empty() {
                return Err(ExtractError::invalid_record(&id, format!("empty {field}")));
            }
        }

        let view_service_id = self
            .view_service_id
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ExtractError::invalid_record(&id, "missing view service"))?;
        let office_id = self
            .office_id
            .filter(|o| !o.is_empty())
            .ok_or_else(|| ExtractError::invalid_record(&id, "missing responsible office"))?;

        if self.geometries.is_empty() {
            return Err(ExtractError::invalid_record(&id, "no geometry"));
        }

        Ok(RestrictionRecord {
            id,
            theme: self.theme,
            sub_theme: self.sub_theme,
            type_code: self.type_code,
            type_code_list: self.type_code_list,
            law_status: self.law_status,
            information: self.information,
            view_service_id,
            office_id,
            document_ids: self.document_ids,
            geometries: self.geometries,
        })
    }
}

/// Totaux des parts d'une restriction retenue
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShareTotals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_share: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_in_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_share: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nr_of_points: Option<usize>,
}

impl ShareTotals {
    /// Somme les parts par catégorie
    ///
    /// Le pourcentage total suit la même règle que par géométrie, appliquée à
    /// la surface compensée cumulée.
    pub fn from_geometries(geometries: &[EvaluatedGeometry], boundary_area: f64) -> Self {
        let mut totals = Self::default();

        for geometry in geometries {
            match geometry.share() {
                Share::Points { count } => {
                    *totals.nr_of_points.get_or_insert(0) += count;
                }
                Share::Length { length, unit } => {
                    *totals.length_share.get_or_insert(0.0) += length;
                    totals.length_unit.get_or_insert_with(|| unit.clone());
                }
                Share::Area { area, unit, .. } => {
                    *totals.area_share.get_or_insert(0.0) += area;
                    totals.area_unit.get_or_insert_with(|| unit.clone());
                }
            }
        }

        totals.part_in_percent = totals
            .area_share
            .map(|area| part_in_percent(area, boundary_area));
        totals
    }
}

/// Restriction retenue dans l'extrait
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Restriction {
    pub id: String,
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_theme: Option<String>,
    pub type_code: String,
    pub type_code_list: String,
    pub law_status: String,
    pub information: String,
    pub legend_text: String,
    pub symbol: Symbol,
    pub view_service_id: String,
    pub office: Office,
    pub documents: Vec<Document>,
    pub geometries: Vec<EvaluatedGeometry>,
    #[serde(flatten)]
    pub totals: ShareTotals,
}

impl Restriction {
    /// Assemble une restriction retenue à partir de l'enregistrement brut
    ///
    /// Les géométries brutes de l'enregistrement sont ignorées au profit des
    /// géométries évaluées.
    pub fn assemble(
        record: RestrictionRecord,
        geometries: Vec<EvaluatedGeometry>,
        office: Office,
        documents: Vec<Document>,
        symbol: Symbol,
        legend_text: String,
        boundary_area: f64,
    ) -> Self {
        let totals = ShareTotals::from_geometries(&geometries, boundary_area);
        Self {
            id: record.id,
            theme: record.theme,
            sub_theme: record.sub_theme,
            type_code: record.type_code,
            type_code_list: record.type_code_list,
            law_status: record.law_status,
            information: record.information,
            legend_text,
            symbol,
            view_service_id: record.view_service_id,
            office,
            documents,
            geometries,
            totals,
        }
    }
}
