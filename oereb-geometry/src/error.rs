//! Types d'erreurs pour le crate oereb-geometry

use thiserror::Error;

use crate::GeometryCategory;

/// Erreurs pouvant survenir lors de la classification ou du décodage d'une géométrie
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Type de géométrie absent de la configuration
    #[error("Unsupported geometry type: {type_name}")]
    UnsupportedGeometryType { type_name: String },

    /// Collection avec plus d'un élément (donnée ambiguë)
    #[error("Too many elements in geometry collection: {count}")]
    TooManyCollectionElements { count: usize },

    /// Catégorie inconnue dans la configuration
    #[error("Unknown geometry category: {0}")]
    UnknownCategory(String),

    /// Nom de type inconnu dans la configuration
    #[error("Unknown geometry type name: {0}")]
    UnknownTypeName(String),

    /// Type rangé dans une catégorie qui ne correspond pas à sa nature
    #[error("Geometry type {type_name} cannot belong to category {category}")]
    CategoryMismatch {
        type_name: String,
        category: GeometryCategory,
    },

    /// Échec du décodage WKB/WKT
    #[error("Geometry decoding failed: {0}")]
    Decode(String),
}

impl GeometryError {
    /// Crée une erreur de type non supporté
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedGeometryType {
            type_name: type_name.into(),
        }
    }
}
