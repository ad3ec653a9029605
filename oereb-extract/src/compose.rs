//! Composition d'un extrait pour une parcelle
//!
//! Étapes :
//! 1. résolution de la commune de la parcelle
//! 2. traitement des thèmes configurés, dans l'ordre de la configuration
//! 3. tri des restrictions et calcul des autres légendes des thèmes concernés
//! 4. scellement de l'extrait (identifiant de contenu, date de création)

use std::collections::HashMap;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use oereb_geometry::GeometryTypes;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::Aggregator;
use crate::availability::AvailabilityGate;
use crate::config::{ExtractConfig, ThemeConfig};
use crate::legend;
use crate::model::{ConcernedTheme, Extract, ExtractBody, Parcel, Theme, ThemeClassification};
use crate::report::ExtractReport;
use crate::sort::sort_restrictions;
use crate::source::{MunicipalityLookup, Resolver, ThemeSource};
use crate::ExtractError;

/// Paramètres d'une demande d'extrait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractParams {
    /// Thèmes demandés, tous les thèmes configurés si `None`
    pub topics: Option<Vec<String>>,

    /// Date à laquelle les publications sont évaluées
    pub reference_date: NaiveDate,
}

impl ExtractParams {
    /// Tous les thèmes, à la date donnée
    pub fn at(reference_date: NaiveDate) -> Self {
        Self {
            topics: None,
            reference_date,
        }
    }

    /// Restreint l'extrait à une liste de thèmes
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = Some(topics.into_iter().map(Into::into).collect());
        self
    }

    fn includes(&self, theme_code: &str) -> bool {
        self.topics
            .as_ref()
            .map_or(true, |topics| topics.iter().any(|t| t == theme_code))
    }
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self::at(Utc::now().date_naive())
    }
}

/// Étapes de la composition, tracées en debug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    MunicipalityResolved,
    ThemesProcessed,
    Composed,
}

/// Issue du traitement d'un thème
enum ThemeOutcome {
    Concerned(ConcernedTheme),
    Other(ThemeClassification),
}

/// Compositeur d'extraits
///
/// Construit une fois à partir d'une configuration validée, puis partagé
/// entre compositions (y compris en parallèle).
pub struct ExtractComposer<'a> {
    config: ExtractConfig,
    geometry_types: GeometryTypes,
    availability: AvailabilityGate,
    municipalities: &'a dyn MunicipalityLookup,
    resolver: &'a dyn Resolver,
}

impl<'a> ExtractComposer<'a> {
    /// Valide la configuration et prépare les tables de composition
    ///
    /// # Errors
    ///
    /// `Config` ou `Geometry` si la configuration est incohérente.
    pub fn new(
        config: ExtractConfig,
        municipalities: &'a dyn MunicipalityLookup,
        resolver: &'a dyn Resolver,
    ) -> Result<Self, ExtractError> {
        config.validate()?;
        let geometry_types = config.geometry_types()?;
        let availability = AvailabilityGate::new(&config.availability);

        info!(themes = config.themes.len(), "Extract composer ready");

        Ok(Self {
            config,
            geometry_types,
            availability,
            municipalities,
            resolver,
        })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Compose l'extrait d'une parcelle
    pub fn compose(
        &self,
        parcel: &Parcel,
        params: &ExtractParams,
        sources: &[&dyn ThemeSource],
    ) -> Result<Extract, ExtractError> {
        let mut report = ExtractReport::new(parcel.egrid());
        self.compose_with_report(parcel, params, sources, &mut report)
    }

    /// Compose l'extrait d'une parcelle en alimentant un rapport
    pub fn compose_with_report(
        &self,
        parcel: &Parcel,
        params: &ExtractParams,
        sources: &[&dyn ThemeSource],
        report: &mut ExtractReport,
    ) -> Result<Extract, ExtractError> {
        let start = Instant::now();

        let result = self.run(parcel, params, sources, report);
        if let Err(e) = &result {
            report.record_fatal(e.to_string());
        }

        report.set_duration(start.elapsed());
        report.finalize();
        debug!(summary = %report.summary(), status = ?report.status, "Composition finished");

        result
    }

    /// Compose les extraits de plusieurs parcelles en parallèle
    ///
    /// Les résultats sont dans l'ordre des parcelles.
    pub fn compose_many(
        &self,
        parcels: &[Parcel],
        params: &ExtractParams,
        sources: &[&dyn ThemeSource],
    ) -> Vec<Result<Extract, ExtractError>> {
        parcels
            .par_iter()
            .map(|parcel| self.compose(parcel, params, sources))
            .collect()
    }

    fn run(
        &self,
        parcel: &Parcel,
        params: &ExtractParams,
        sources: &[&dyn ThemeSource],
        report: &mut ExtractReport,
    ) -> Result<Extract, ExtractError> {
        let mut stage = Stage::Init;
        debug!(egrid = %parcel.egrid(), ?stage, "Composing extract");

        let municipality = self
            .municipalities
            .municipality(parcel.fosnr())
            .ok_or(ExtractError::MunicipalityNotFound {
                fosnr: parcel.fosnr(),
            })?;
        stage = Stage::MunicipalityResolved;
        debug!(fosnr = municipality.fosnr, published = municipality.published, ?stage);

        let sources = self.index_sources(sources)?;
        let aggregator = Aggregator::new(
            &self.geometry_types,
            self.resolver,
            self.config.legend_policy,
            params.reference_date,
        );

        if let Some(topics) = &params.topics {
            for topic in topics.iter().filter(|t| self.config.theme(t).is_none()) {
                warn!(theme = %topic, "Requested theme not configured, ignored");
            }
        }

        let mut concerned_themes = Vec::new();
        let mut not_concerned_themes = Vec::new();
        let mut themes_without_data = Vec::new();

        for theme_config in self.config.themes.iter().filter(|t| params.includes(&t.code)) {
            let theme = Theme::new(&theme_config.code, &theme_config.text);

            let outcome = if !municipality.published {
                ThemeOutcome::Other(ThemeClassification::WithoutData)
            } else if !self.availability.is_available(municipality.fosnr, &theme_config.code) {
                debug!(theme = %theme_config.code, fosnr = municipality.fosnr, "Theme not available");
                ThemeOutcome::Other(ThemeClassification::WithoutData)
            } else if let Some(source) = sources.get(theme_config.code.as_str()) {
                self.process_theme(theme_config, *source, &aggregator, parcel, report)?
            } else {
                warn!(theme = %theme_config.code, "No data source for theme");
                report.record_warning(&theme_config.code, None, "No data source for theme");
                ThemeOutcome::Other(ThemeClassification::WithoutData)
            };

            match outcome {
                ThemeOutcome::Concerned(concerned) => {
                    report.set_classification(&theme_config.code, ThemeClassification::Concerned);
                    concerned_themes.push(concerned);
                }
                ThemeOutcome::Other(classification) => {
                    report.set_classification(&theme_config.code, classification);
                    if classification == ThemeClassification::NotConcerned {
                        not_concerned_themes.push(theme);
                    } else {
                        themes_without_data.push(theme);
                    }
                }
            }
        }
        stage = Stage::ThemesProcessed;
        debug!(
            concerned = concerned_themes.len(),
            not_concerned = not_concerned_themes.len(),
            without_data = themes_without_data.len(),
            ?stage
        );

        let body = ExtractBody {
            real_estate: parcel.clone(),
            municipality,
            concerned_themes,
            not_concerned_themes,
            themes_without_data,
            cadastre_authority: self.config.cadastre_authority.clone(),
            reference_date: params.reference_date,
        };
        let extract = Extract::seal(body, Utc::now())?;

        stage = Stage::Composed;
        debug!(identifier = %extract.extract_identifier, ?stage);

        Ok(extract)
    }

    /// Lit et agrège un thème disponible
    fn process_theme(
        &self,
        theme_config: &ThemeConfig,
        source: &dyn ThemeSource,
        aggregator: &Aggregator<'_>,
        parcel: &Parcel,
        report: &mut ExtractReport,
    ) -> Result<ThemeOutcome, ExtractError> {
        let data = source.fetch(parcel).map_err(|e| ExtractError::Source {
            theme: theme_config.code.clone(),
            reason: e.to_string(),
        })?;

        let aggregated = aggregator.aggregate(theme_config, data, parcel, report)?;

        match aggregated.classification {
            ThemeClassification::Concerned => {
                let mut restrictions = aggregated.restrictions;
                sort_restrictions(
                    &mut restrictions,
                    self.config.law_status_precedence_for(theme_config),
                );
                let other_legends = legend::other_legends(&aggregated.legend_entries, &restrictions);

                Ok(ThemeOutcome::Concerned(ConcernedTheme {
                    theme: Theme::new(&theme_config.code, &theme_config.text),
                    restrictions,
                    other_legends,
                }))
            }
            other => Ok(ThemeOutcome::Other(other)),
        }
    }

    /// Indexe les sources par code de thème
    fn index_sources<'s>(
        &self,
        sources: &[&'s dyn ThemeSource],
    ) -> Result<HashMap<&'s str, &'s dyn ThemeSource>, ExtractError> {
        let mut index = HashMap::with_capacity(sources.len());

        for &source in sources {
            let code = source.theme_code();
            if self.config.theme(code).is_none() {
                warn!(theme = %code, "Data source for unconfigured theme ignored");
                continue;
            }
            if index.insert(code, source).is_some() {
                return Err(ExtractError::Config(format!(
                    "several data sources for theme {code}"
                )));
            }
        }

        Ok(index)
    }
}
