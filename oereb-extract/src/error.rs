//! Types d'erreurs pour la composition d'extraits

use oereb_geometry::GeometryError;
use thiserror::Error;

/// Erreurs pouvant survenir lors de la composition d'un extrait
///
/// Les erreurs de portée restriction (`Geometry`, `OfficeNotFound`,
/// `InvalidRecord`) sont absorbées par l'agrégateur : la restriction est
/// écartée et la composition continue. Les autres interrompent la composition.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Commune de la parcelle introuvable
    #[error("Municipality not found: {fosnr}")]
    MunicipalityNotFound { fosnr: u32 },

    /// Géométrie non supportée ou ambiguë
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Aucune entrée de légende pour un code de type
    #[error("No legend entry for type code {type_code} (theme {theme}, view service {view_service})")]
    MissingLegendEntry {
        type_code: String,
        theme: String,
        view_service: String,
    },

    /// Plusieurs entrées de légende pour un même code de type
    #[error("{count} legend entries for type code {type_code} (theme {theme}, view service {view_service})")]
    AmbiguousLegendEntry {
        type_code: String,
        theme: String,
        view_service: String,
        count: usize,
    },

    /// Office responsable introuvable
    #[error("Office not found: {0}")]
    OfficeNotFound(String),

    /// Enregistrement invalide à la frontière d'une source
    #[error("Invalid record {record}: {reason}")]
    InvalidRecord { record: String, reason: String },

    /// Échec d'une source de données de thème
    #[error("Data source for theme {theme} failed: {reason}")]
    Source { theme: String, reason: String },

    /// Configuration incohérente
    #[error("Configuration error: {0}")]
    Config(String),

    /// Échec de sérialisation du contenu de l'extrait
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractError {
    /// Crée une erreur d'enregistrement invalide avec contexte
    pub fn invalid_record(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Indique si l'erreur ne concerne qu'une restriction
    pub fn is_restriction_scoped(&self) -> bool {
        matches!(
            self,
            Self::Geometry(_) | Self::OfficeNotFound(_) | Self::InvalidRecord { .. }
        )
    }
}
