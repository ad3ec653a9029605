//! Tri déterministe des restrictions
//!
//! Clé de tri : rang du code de statut juridique dans la liste de précédence.
//! Un code inconnu prend le rang `precedence.len()`. Le tri est stable, donc
//! idempotent et neutre pour les éléments de même rang.

use crate::model::Restriction;

/// Rang d'un code de statut juridique
pub fn law_status_rank(precedence: &[String], code: &str) -> usize {
    precedence
        .iter()
        .position(|p| p == code)
        .unwrap_or(precedence.len())
}

/// Trie des éléments par statut juridique (tri stable)
pub fn sort_by_law_status<T, F>(items: &mut [T], precedence: &[String], law_status: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_key(|item| law_status_rank(precedence, law_status(item)));
}

/// Ordonne les restrictions d'un thème : statut juridique, puis code de type,
/// puis ordre de la source
pub fn sort_restrictions(restrictions: &mut [Restriction], precedence: &[String]) {
    restrictions.sort_by(|a, b| a.type_code.cmp(&b.type_code));
    sort_by_law_status(restrictions, precedence, |r| r.law_status.as_str());
}
