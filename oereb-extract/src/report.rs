//! Rapport de composition avec graceful degradation
//!
//! Ce module collecte les restrictions retenues, filtrées et écartées par
//! thème, ainsi que les erreurs et warnings rencontrés pendant la composition.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::model::ThemeClassification;

/// Statut global de la composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractStatus {
    /// Extrait composé sans incident
    Composed,
    /// Extrait composé, des restrictions ont été écartées ou dégradées
    ComposedWithWarnings,
    /// Composition interrompue
    Failed,
}

/// Niveau de sévérité d'un incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueLevel {
    /// Erreur fatale: composition abandonnée
    Fatal,
    /// Erreur: restriction écartée
    Error,
    /// Warning: restriction retenue avec dégradation
    Warning,
}

/// Incident de composition avec contexte
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub level: IssueLevel,
    /// Code du thème (optionnel)
    pub theme: Option<String>,
    /// Identifiant de la restriction (optionnel)
    pub record_id: Option<String>,
    pub message: String,
}

/// Statistiques par thème
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThemeStats {
    /// Restrictions livrées par la source
    pub received: usize,
    /// Restrictions retenues
    pub kept: usize,
    /// Restrictions sans géométrie retenue
    pub filtered: usize,
    /// Restrictions écartées sur erreur
    pub dropped: usize,
    /// Géométries élémentaires retenues
    pub geometries_accepted: usize,
    /// Géométries élémentaires rejetées par la tolérance
    pub geometries_rejected: usize,
    pub classification: Option<ThemeClassification>,
}

/// Rapport complet d'une composition
#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    /// EGRID de la parcelle
    pub egrid: String,
    pub duration_secs: f64,
    pub status: ExtractStatus,
    /// Statistiques par thème
    pub themes: BTreeMap<String, ThemeStats>,
    pub issues: Vec<Issue>,
}

impl ExtractReport {
    /// Crée un nouveau rapport pour une parcelle
    pub fn new(egrid: &str) -> Self {
        Self {
            egrid: egrid.to_string(),
            duration_secs: 0.0,
            status: ExtractStatus::Composed,
            themes: BTreeMap::new(),
            issues: Vec::new(),
        }
    }

    fn stats(&mut self, theme: &str) -> &mut ThemeStats {
        self.themes.entry(theme.to_string()).or_default()
    }

    /// Enregistre les restrictions reçues d'une source
    pub fn record_received(&mut self, theme: &str, count: usize) {
        self.stats(theme).received += count;
    }

    /// Enregistre une restriction retenue
    pub fn record_kept(&mut self, theme: &str) {
        self.stats(theme).kept += 1;
    }

    /// Enregistre une restriction sans géométrie retenue
    pub fn record_filtered(&mut self, theme: &str) {
        self.stats(theme).filtered += 1;
    }

    /// Enregistre le résultat d'évaluation d'une géométrie
    pub fn record_geometry(&mut self, theme: &str, accepted: bool) {
        let stats = self.stats(theme);
        if accepted {
            stats.geometries_accepted += 1;
        } else {
            stats.geometries_rejected += 1;
        }
    }

    /// Enregistre une restriction écartée sur erreur
    pub fn record_dropped(&mut self, theme: &str, record_id: &str, message: impl Into<String>) {
        self.stats(theme).dropped += 1;
        self.issues.push(Issue {
            level: IssueLevel::Error,
            theme: Some(theme.to_string()),
            record_id: Some(record_id.to_string()),
            message: message.into(),
        });
    }

    /// Enregistre un warning
    pub fn record_warning(&mut self, theme: &str, record_id: Option<&str>, message: impl Into<String>) {
        self.issues.push(Issue {
            level: IssueLevel::Warning,
            theme: Some(theme.to_string()),
            record_id: record_id.map(str::to_string),
            message: message.into(),
        });
    }

    /// Enregistre l'erreur qui a interrompu la composition
    pub fn record_fatal(&mut self, message: impl Into<String>) {
        self.issues.push(Issue {
            level: IssueLevel::Fatal,
            theme: None,
            record_id: None,
            message: message.into(),
        });
    }

    /// Enregistre le classement final d'un thème
    pub fn set_classification(&mut self, theme: &str, classification: ThemeClassification) {
        self.stats(theme).classification = Some(classification);
    }

    /// Définit la durée de la composition
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final basé sur les incidents
    pub fn finalize(&mut self) {
        let has_fatal = self.issues.iter().any(|i| i.level == IssueLevel::Fatal);

        self.status = if has_fatal {
            ExtractStatus::Failed
        } else if !self.issues.is_empty() {
            ExtractStatus::ComposedWithWarnings
        } else {
            ExtractStatus::Composed
        };
    }

    /// Nombre de restrictions retenues, tous thèmes confondus
    pub fn total_kept(&self) -> usize {
        self.themes.values().map(|s| s.kept).sum()
    }

    /// Nombre de restrictions écartées sur erreur
    pub fn total_dropped(&self) -> usize {
        self.themes.values().map(|s| s.dropped).sum()
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} kept, {} filtered, {} dropped, {} issues",
            self.egrid,
            self.total_kept(),
            self.themes.values().map(|s| s.filtered).sum::<usize>(),
            self.total_dropped(),
            self.issues.len()
        )
    }
}
