//! Configuration de la composition
//!
//! Instantané immuable pour la durée d'une composition : thèmes dans l'ordre
//! de publication, seuils de tolérance, précédence des statuts juridiques,
//! table des types de géométrie et table de disponibilité.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use oereb_geometry::{GeometryTypes, Tolerance};

use crate::model::Office;
use crate::ExtractError;

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractConfig {
    /// Thèmes, dans l'ordre de l'extrait
    pub themes: Vec<ThemeConfig>,

    /// Codes de statut juridique, du plus prioritaire au moins prioritaire
    #[serde(default = "default_law_status_precedence")]
    pub law_status_precedence: Vec<String>,

    /// Catégorie (point/line/polygon/collection) -> noms de types
    #[serde(default = "default_geometry_types")]
    pub geometry_types: BTreeMap<String, Vec<String>>,

    /// Exceptions à la disponibilité par défaut
    #[serde(default)]
    pub availability: Vec<AvailabilityEntry>,

    /// Comportement en cas de légende manquante
    #[serde(default)]
    pub legend_policy: LegendPolicy,

    /// Autorité responsable du cadastre RDPPF
    pub cadastre_authority: Office,
}

/// Configuration d'un thème
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemeConfig {
    /// Code du thème (ex: `ch.Nutzungsplanung`)
    pub code: String,

    /// Libellé du thème
    pub text: String,

    /// Seuils de tolérance
    #[serde(default)]
    pub tolerance: ToleranceConfig,

    /// Précédence propre au thème, sinon celle de la configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub law_status_precedence: Option<Vec<String>>,
}

/// Seuils de tolérance d'un thème
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToleranceConfig {
    #[serde(default = "default_min")]
    pub min_length: f64,

    #[serde(default = "default_min")]
    pub min_area: f64,

    #[serde(default = "default_length_unit")]
    pub length_unit: String,

    #[serde(default = "default_area_unit")]
    pub area_unit: String,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            min_length: default_min(),
            min_area: default_min(),
            length_unit: default_length_unit(),
            area_unit: default_area_unit(),
        }
    }
}

impl From<&ToleranceConfig> for Tolerance {
    fn from(config: &ToleranceConfig) -> Self {
        Tolerance {
            min_length: config.min_length,
            min_area: config.min_area,
            length_unit: config.length_unit.clone(),
            area_unit: config.area_unit.clone(),
        }
    }
}

/// Publication d'un thème pour une commune
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AvailabilityEntry {
    /// Numéro OFS de la commune
    pub fosnr: u32,

    /// Code du thème
    pub theme: String,

    pub available: bool,
}

/// Traitement d'une restriction sans entrée de légende
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPolicy {
    /// Warning et symbole de remplacement
    #[default]
    Placeholder,
    /// La composition échoue
    FailFast,
}

fn default_min() -> f64 {
    1.0
}

fn default_length_unit() -> String {
    "m".to_string()
}

fn default_area_unit() -> String {
    "m²".to_string()
}

fn default_law_status_precedence() -> Vec<String> {
    ["inKraft", "AenderungMitVorwirkung", "AenderungOhneVorwirkung"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_geometry_types() -> BTreeMap<String, Vec<String>> {
    use oereb_geometry::classify::{
        DEFAULT_COLLECTION_TYPES, DEFAULT_LINE_TYPES, DEFAULT_POINT_TYPES, DEFAULT_POLYGON_TYPES,
    };

    [
        ("point", DEFAULT_POINT_TYPES),
        ("line", DEFAULT_LINE_TYPES),
        ("polygon", DEFAULT_POLYGON_TYPES),
        ("collection", DEFAULT_COLLECTION_TYPES),
    ]
    .into_iter()
    .map(|(label, names)| {
        (
            label.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        )
    })
    .collect()
}

impl ExtractConfig {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_json(&content)
    }

    /// Charge une configuration depuis une chaîne JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "federal" => Self::from_json(include_str!("presets/federal.json"))
                .context("Failed to parse embedded config"),
            _ => anyhow::bail!("Unknown preset: {}. Use: federal", preset),
        }
    }

    /// Vérifie la cohérence de la configuration
    ///
    /// # Errors
    ///
    /// `Config` pour un code de thème dupliqué ou vide, un seuil négatif ou
    /// non fini, une précédence vide ou une table de types invalide.
    pub fn validate(&self) -> Result<(), ExtractError> {
        let mut seen = HashSet::new();
        for theme in &self.themes {
            if theme.code.trim().is_empty() {
                return Err(ExtractError::Config("empty theme code".to_string()));
            }
            if !seen.insert(theme.code.as_str()) {
                return Err(ExtractError::Config(format!(
                    "duplicate theme code: {}",
                    theme.code
                )));
            }

            let tol = &theme.tolerance;
            for (name, value) in [("min_length", tol.min_length), ("min_area", tol.min_area)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ExtractError::Config(format!(
                        "invalid {name} {value} for theme {}",
                        theme.code
                    )));
                }
            }

            if theme
                .law_status_precedence
                .as_ref()
                .is_some_and(|p| p.is_empty())
            {
                return Err(ExtractError::Config(format!(
                    "empty law status precedence for theme {}",
                    theme.code
                )));
            }
        }

        if self.law_status_precedence.is_empty() {
            return Err(ExtractError::Config(
                "empty law status precedence".to_string(),
            ));
        }

        self.geometry_types()?;
        Ok(())
    }

    /// Table des types de géométrie validée
    pub fn geometry_types(&self) -> Result<GeometryTypes, ExtractError> {
        Ok(GeometryTypes::from_config(
            self.geometry_types
                .iter()
                .map(|(label, names)| (label.as_str(), names.iter())),
        )?)
    }

    /// Récupère la configuration d'un thème
    pub fn theme(&self, code: &str) -> Option<&ThemeConfig> {
        self.themes.iter().find(|t| t.code == code)
    }

    /// Précédence des statuts pour un thème
    pub fn law_status_precedence_for<'a>(&'a self, theme: &'a ThemeConfig) -> &'a [String] {
        theme
            .law_status_precedence
            .as_deref()
            .unwrap_or(&self.law_status_precedence)
    }
}
