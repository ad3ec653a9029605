//! Résolution des entrées de légende
//!
//! Chaque restriction est associée à exactement une entrée de légende : même
//! code de type, même thème, même service de visualisation.

use std::collections::HashSet;

use tracing::warn;

use crate::config::LegendPolicy;
use crate::model::{LegendEntry, Restriction, RestrictionRecord, Symbol};
use crate::ExtractError;

/// Symbole et texte de légende retenus pour une restriction
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLegend {
    pub symbol: Symbol,
    pub legend_text: String,
    /// Symbole de remplacement faute d'entrée de légende
    pub placeholder: bool,
}

/// Cherche l'unique entrée de légende d'une restriction
///
/// # Errors
///
/// - `MissingLegendEntry` si aucune entrée ne correspond
/// - `AmbiguousLegendEntry` si plusieurs entrées correspondent
pub fn resolve<'e>(
    record: &RestrictionRecord,
    entries: &'e [LegendEntry],
) -> Result<&'e LegendEntry, ExtractError> {
    let mut matches = entries.iter().filter(|entry| {
        entry.type_code == record.type_code
            && entry.theme == record.theme
            && entry.view_service_id == record.view_service_id
    });

    let first = matches.next().ok_or_else(|| ExtractError::MissingLegendEntry {
        type_code: record.type_code.clone(),
        theme: record.theme.clone(),
        view_service: record.view_service_id.clone(),
    })?;

    let others = matches.count();
    if others > 0 {
        return Err(ExtractError::AmbiguousLegendEntry {
            type_code: record.type_code.clone(),
            theme: record.theme.clone(),
            view_service: record.view_service_id.clone(),
            count: others + 1,
        });
    }

    Ok(first)
}

/// Résout la légende en appliquant la politique configurée
///
/// Une ambiguïté est toujours une erreur. Une absence devient un symbole de
/// remplacement avec `LegendPolicy::Placeholder`.
pub fn resolve_with_policy(
    record: &RestrictionRecord,
    entries: &[LegendEntry],
    policy: LegendPolicy,
) -> Result<ResolvedLegend, ExtractError> {
    match resolve(record, entries) {
        Ok(entry) => Ok(ResolvedLegend {
            symbol: entry.symbol.clone(),
            legend_text: entry.legend_text.clone(),
            placeholder: false,
        }),
        Err(e @ ExtractError::MissingLegendEntry { .. }) if policy == LegendPolicy::Placeholder => {
            warn!(
                restriction = %record.id,
                type_code = %record.type_code,
                error = %e,
                "Legend entry missing, using placeholder symbol"
            );
            Ok(ResolvedLegend {
                symbol: Symbol::Placeholder,
                legend_text: record.information.clone(),
                placeholder: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// Autres légendes d'un thème concerné
///
/// Entrées des services de visualisation utilisés par les restrictions
/// retenues, dont le code de type ne correspond à aucune de ces restrictions.
/// Triées par code de type.
pub fn other_legends(entries: &[LegendEntry], restrictions: &[Restriction]) -> Vec<LegendEntry> {
    let view_services: HashSet<&str> = restrictions
        .iter()
        .map(|r| r.view_service_id.as_str())
        .collect();
    let used: HashSet<(&str, &str)> = restrictions
        .iter()
        .map(|r| (r.view_service_id.as_str(), r.type_code.as_str()))
        .collect();

    let mut others: Vec<LegendEntry> = entries
        .iter()
        .filter(|e| view_services.contains(e.view_service_id.as_str()))
        .filter(|e| !used.contains(&(e.view_service_id.as_str(), e.type_code.as_str())))
        .cloned()
        .collect();

    others.sort_by(|a, b| a.type_code.cmp(&b.type_code));
    others
}
