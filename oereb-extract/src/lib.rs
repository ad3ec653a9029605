//! # oereb-extract
//!
//! Composition d'extraits du cadastre des restrictions de droit public à la
//! propriété foncière (RDPPF / ÖREB) pour un bien-fonds.
//!
//! ## Features
//!
//! - Disponibilité des thèmes par commune
//! - Agrégation des restrictions avec filtre de tolérance géométrique
//! - Résolution des offices, documents et entrées de légende
//! - Tri stable par statut juridique
//! - Identifiant d'extrait déterministe (BLAKE3 du contenu)
//! - Rapport de composition avec graceful degradation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oereb_extract::{ExtractComposer, ExtractConfig, ExtractParams, MemoryRegistry};
//!
//! let config = ExtractConfig::from_preset("federal")?;
//! let registry = MemoryRegistry::new();
//! let composer = ExtractComposer::new(config, &registry, &registry)?;
//! let extract = composer.compose(&parcel, &ExtractParams::default(), &sources)?;
//! println!("{}", extract.extract_identifier);
//! ```

pub mod aggregate;
pub mod availability;
pub mod compose;
pub mod config;
pub mod error;
pub mod legend;
pub mod model;
pub mod report;
pub mod sort;
pub mod source;

pub use aggregate::{Aggregated, Aggregator};
pub use availability::{AvailabilityGate, DEFAULT_AVAILABILITY};
pub use compose::{ExtractComposer, ExtractParams};
pub use config::{AvailabilityEntry, ExtractConfig, LegendPolicy, ThemeConfig, ToleranceConfig};
pub use error::ExtractError;
pub use model::{
    ConcernedTheme, Document, DocumentKind, EvaluatedGeometry, Extract, ExtractBody,
    GeometryRecord, LegendEntry, Municipality, Office, Parcel, Restriction, RestrictionRecord,
    ShareTotals, Symbol, Theme, ThemeClassification,
};
pub use report::{ExtractReport, ExtractStatus, Issue, IssueLevel, ThemeStats};
pub use source::{
    MemoryRegistry, MemoryThemeSource, MunicipalityLookup, Resolver, SourceError, ThemeData,
    ThemeSource,
};
