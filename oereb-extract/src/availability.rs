//! Disponibilité des thèmes par commune
//!
//! Un thème est publié pour une commune sauf mention contraire explicite.

use std::collections::HashMap;

use tracing::warn;

use crate::config::AvailabilityEntry;

/// Disponibilité retenue en l'absence d'entrée explicite
pub const DEFAULT_AVAILABILITY: bool = true;

/// Table (commune, thème) -> disponibilité
#[derive(Debug, Clone, Default)]
pub struct AvailabilityGate {
    entries: HashMap<(u32, String), bool>,
}

impl AvailabilityGate {
    /// Construit la table
    ///
    /// Si deux entrées se contredisent pour un même couple, l'indisponibilité
    /// l'emporte : une donnée retirée ne doit jamais être publiée.
    pub fn new<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a AvailabilityEntry>,
    {
        let mut table: HashMap<(u32, String), bool> = HashMap::new();

        for entry in entries {
            let key = (entry.fosnr, entry.theme.clone());
            match table.get(&key) {
                Some(&previous) if previous != entry.available => {
                    warn!(
                        fosnr = entry.fosnr,
                        theme = %entry.theme,
                        "Conflicting availability entries, theme suppressed"
                    );
                    table.insert(key, false);
                }
                _ => {
                    table.insert(key, entry.available);
                }
            }
        }

        Self { entries: table }
    }

    /// Entrée explicite pour le couple, `None` en son absence
    pub fn lookup(&self, fosnr: u32, theme_code: &str) -> Option<bool> {
        self.entries.get(&(fosnr, theme_code.to_string())).copied()
    }

    /// Le thème est-il publié pour la commune
    pub fn is_available(&self, fosnr: u32, theme_code: &str) -> bool {
        self.lookup(fosnr, theme_code).unwrap_or(DEFAULT_AVAILABILITY)
    }
}
