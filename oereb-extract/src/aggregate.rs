//! Agrégation des restrictions d'un thème
//!
//! Pour chaque restriction livrée par la source :
//! 1. filtre des géométries publiées à la date de référence
//! 2. dépliage en géométries élémentaires
//! 3. évaluation de tolérance, une restriction sans géométrie retenue disparaît
//! 4. résolution de l'office, des documents et de la légende
//!
//! Les erreurs de portée restriction écartent la restriction concernée et sont
//! consignées dans le rapport. Les autres remontent à l'appelant.

use std::collections::HashSet;

use chrono::NaiveDate;
use oereb_geometry::{GeometryTypes, Tolerance};
use tracing::{debug, trace, warn};

use crate::config::{LegendPolicy, ThemeConfig};
use crate::legend;
use crate::model::{
    Document, LegendEntry, Parcel, Restriction, RestrictionRecord, ThemeClassification,
};
use crate::report::ExtractReport;
use crate::source::{Resolver, ThemeData};
use crate::ExtractError;

/// Résultat de l'agrégation d'un thème
#[derive(Debug, Clone)]
pub struct Aggregated {
    pub classification: ThemeClassification,
    /// Restrictions retenues, dans l'ordre de la source
    pub restrictions: Vec<Restriction>,
    /// Légende complète livrée par la source
    pub legend_entries: Vec<LegendEntry>,
}

/// Agrégateur partagé par tous les thèmes d'une composition
pub struct Aggregator<'a> {
    geometry_types: &'a GeometryTypes,
    resolver: &'a dyn Resolver,
    legend_policy: LegendPolicy,
    reference_date: NaiveDate,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        geometry_types: &'a GeometryTypes,
        resolver: &'a dyn Resolver,
        legend_policy: LegendPolicy,
        reference_date: NaiveDate,
    ) -> Self {
        Self {
            geometry_types,
            resolver,
            legend_policy,
            reference_date,
        }
    }

    /// Agrège les données d'un thème pour une parcelle
    ///
    /// # Errors
    ///
    /// Uniquement les erreurs fatales (légende ambiguë, légende manquante en
    /// mode `FailFast`). Les erreurs de portée restriction sont absorbées.
    pub fn aggregate(
        &self,
        theme: &ThemeConfig,
        data: ThemeData,
        parcel: &Parcel,
        report: &mut ExtractReport,
    ) -> Result<Aggregated, ExtractError> {
        let tolerance = Tolerance::from(&theme.tolerance);
        let ThemeData {
            restrictions: records,
            legend_entries,
            has_data,
        } = data;

        report.record_received(&theme.code, records.len());
        let received_any = !records.is_empty();

        let mut restrictions = Vec::new();
        for record in records {
            let record_id = record.id.clone();

            match self.process(theme, &tolerance, record, parcel, &legend_entries, report) {
                Ok(Some(restriction)) => {
                    report.record_kept(&theme.code);
                    restrictions.push(restriction);
                }
                Ok(None) => report.record_filtered(&theme.code),
                Err(e) if e.is_restriction_scoped() => {
                    warn!(theme = %theme.code, restriction = %record_id, error = %e, "Restriction dropped");
                    report.record_dropped(&theme.code, &record_id, e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        let classification = if !restrictions.is_empty() {
            ThemeClassification::Concerned
        } else if has_data || received_any {
            ThemeClassification::NotConcerned
        } else {
            ThemeClassification::WithoutData
        };

        debug!(
            theme = %theme.code,
            kept = restrictions.len(),
            classification = ?classification,
            "Theme aggregated"
        );

        Ok(Aggregated {
            classification,
            restrictions,
            legend_entries,
        })
    }

    /// Traite une restriction, `None` si aucune géométrie n'est retenue
    fn process(
        &self,
        theme: &ThemeConfig,
        tolerance: &Tolerance,
        mut record: RestrictionRecord,
        parcel: &Parcel,
        legend_entries: &[LegendEntry],
        report: &mut ExtractReport,
    ) -> Result<Option<Restriction>, ExtractError> {
        if record.theme != theme.code {
            return Err(ExtractError::invalid_record(
                &record.id,
                format!("theme {} delivered by source of {}", record.theme, theme.code),
            ));
        }

        let geometry_records = std::mem::take(&mut record.geometries);

        let mut unevaluated = Vec::with_capacity(geometry_records.len());
        for geometry in geometry_records
            .iter()
            .filter(|g| g.is_published(self.reference_date))
        {
            unevaluated.extend(geometry.flatten(self.geometry_types)?);
        }

        let mut evaluated = Vec::with_capacity(unevaluated.len());
        for geometry in unevaluated {
            match geometry.evaluate(parcel, tolerance) {
                Ok(geometry) => {
                    report.record_geometry(&theme.code, true);
                    evaluated.push(geometry);
                }
                Err(rejection) => {
                    trace!(restriction = %record.id, %rejection, "Geometry rejected");
                    report.record_geometry(&theme.code, false);
                }
            }
        }

        if evaluated.is_empty() {
            debug!(restriction = %record.id, "No geometry retained");
            return Ok(None);
        }

        let office = self
            .resolver
            .office(&record.office_id)
            .ok_or_else(|| ExtractError::OfficeNotFound(record.office_id.clone()))?;

        let documents = self.resolve_documents(&theme.code, &record, report);

        let resolved = legend::resolve_with_policy(&record, legend_entries, self.legend_policy)?;
        if resolved.placeholder {
            report.record_warning(
                &theme.code,
                Some(&record.id),
                format!("No legend entry for type code {}", record.type_code),
            );
        }

        Ok(Some(Restriction::assemble(
            record,
            evaluated,
            office,
            documents,
            resolved.symbol,
            resolved.legend_text,
            parcel.boundary_area(),
        )))
    }

    /// Documents publiés à la date de référence, dans l'ordre de référence
    fn resolve_documents(
        &self,
        theme_code: &str,
        record: &RestrictionRecord,
        report: &mut ExtractReport,
    ) -> Vec<Document> {
        let mut seen = HashSet::new();
        let mut documents = Vec::with_capacity(record.document_ids.len());

        for id in &record.document_ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            match self.resolver.document(id) {
                Some(document) if document.is_published(self.reference_date) => {
                    documents.push(document);
                }
                Some(_) => trace!(restriction = %record.id, document = %id, "Document not published"),
                None => {
                    warn!(restriction = %record.id, document = %id, "Document not found, skipped");
                    report.record_warning(
                        theme_code,
                        Some(&record.id),
                        format!("Document not found: {id}"),
                    );
                }
            }
        }

        documents
    }
}
