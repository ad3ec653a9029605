//! Extrait composé, artefact terminal consommé par le rendu

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{LegendEntry, Municipality, Office, Parcel, Restriction};

/// Thème RDPPF
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub code: String,
    pub text: String,
}

impl Theme {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }
}

/// Classement d'un thème dans l'extrait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeClassification {
    /// Au moins une restriction touche la parcelle
    Concerned,
    /// Données présentes, aucune restriction retenue
    NotConcerned,
    /// Pas de données, ou thème non disponible pour la commune
    WithoutData,
}

/// Thème concerné avec ses restrictions ordonnées
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcernedTheme {
    pub theme: Theme,
    pub restrictions: Vec<Restriction>,
    /// Entrées de légende visibles mais sans restriction sur la parcelle
    pub other_legends: Vec<LegendEntry>,
}

/// Contenu déterministe de l'extrait
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractBody {
    pub real_estate: Parcel,
    pub municipality: Municipality,
    pub concerned_themes: Vec<ConcernedTheme>,
    pub not_concerned_themes: Vec<Theme>,
    pub themes_without_data: Vec<Theme>,
    pub cadastre_authority: Office,
    /// Date de référence des fenêtres de publication
    pub reference_date: NaiveDate,
}

/// Extrait RDPPF composé
///
/// `extract_identifier` est l'empreinte BLAKE3 du contenu : deux compositions
/// sur les mêmes entrées donnent le même identifiant. Seule `creation_date`
/// varie d'une exécution à l'autre.
#[derive(Debug, Clone, Serialize)]
pub struct Extract {
    pub extract_identifier: String,
    pub creation_date: DateTime<Utc>,
    #[serde(flatten)]
    pub body: ExtractBody,
}

impl Extract {
    /// Finalise un extrait en calculant son identifiant de contenu
    pub fn seal(body: ExtractBody, creation_date: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(&body)?;
        let extract_identifier = blake3::hash(&bytes).to_hex().to_string();

        Ok(Self {
            extract_identifier,
            creation_date,
            body,
        })
    }

    /// Classement d'un thème, `None` s'il n'a pas été demandé
    pub fn classification_of(&self, theme_code: &str) -> Option<ThemeClassification> {
        let body = &self.body;
        if body.concerned_themes.iter().any(|c| c.theme.code == theme_code) {
            Some(ThemeClassification::Concerned)
        } else if body.not_concerned_themes.iter().any(|t| t.code == theme_code) {
            Some(ThemeClassification::NotConcerned)
        } else if body.themes_without_data.iter().any(|t| t.code == theme_code) {
            Some(ThemeClassification::WithoutData)
        } else {
            None
        }
    }

    /// Toutes les restrictions, dans l'ordre des thèmes puis du statut juridique
    pub fn restrictions(&self) -> impl Iterator<Item = &Restriction> {
        self.body
            .concerned_themes
            .iter()
            .flat_map(|c| c.restrictions.iter())
    }

    /// Restrictions d'un thème concerné
    pub fn restrictions_of(&self, theme_code: &str) -> &[Restriction] {
        self.body
            .concerned_themes
            .iter()
            .find(|c| c.theme.code == theme_code)
            .map(|c| c.restrictions.as_slice())
            .unwrap_or_default()
    }
}
