//! Collaborateurs externes du moteur
//!
//! Les sources de thèmes, le résolveur d'offices et de documents et la
//! recherche de communes sont implémentés hors du moteur (base de données,
//! services). Les implémentations en mémoire servent aux tests et aux
//! intégrations simples.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::{Document, LegendEntry, Municipality, Office, Parcel, RestrictionRecord};

/// Erreur remontée par une source de données
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

/// Données d'un thème pour une parcelle
#[derive(Debug, Clone, Default)]
pub struct ThemeData {
    /// Restrictions dont l'emprise recoupe la parcelle
    pub restrictions: Vec<RestrictionRecord>,

    /// Légende des services de visualisation du thème
    pub legend_entries: Vec<LegendEntry>,

    /// Le thème dispose de données pour le secteur de la parcelle
    pub has_data: bool,
}

impl ThemeData {
    /// Données avec restrictions, le thème est considéré couvert
    pub fn new(restrictions: Vec<RestrictionRecord>, legend_entries: Vec<LegendEntry>) -> Self {
        Self {
            restrictions,
            legend_entries,
            has_data: true,
        }
    }

    /// Thème couvert, aucune restriction ne recoupe la parcelle
    pub fn not_concerned() -> Self {
        Self {
            has_data: true,
            ..Self::default()
        }
    }

    /// Aucune donnée pour ce thème
    pub fn without_data() -> Self {
        Self::default()
    }
}

/// Source de restrictions d'un thème
///
/// Les géométries livrées sont dans le système de référence de la parcelle.
/// L'absence de restriction se traduit par une liste vide, pas une erreur.
pub trait ThemeSource: Send + Sync {
    /// Code du thème servi
    fn theme_code(&self) -> &str;

    /// Lit les restrictions recoupant la parcelle
    fn fetch(&self, parcel: &Parcel) -> Result<ThemeData, SourceError>;
}

/// Résolution des offices et documents référencés par les restrictions
pub trait Resolver: Send + Sync {
    fn office(&self, id: &str) -> Option<Office>;

    fn document(&self, id: &str) -> Option<Document>;
}

/// Recherche des communes
pub trait MunicipalityLookup: Send + Sync {
    fn municipality(&self, fosnr: u32) -> Option<Municipality>;
}

/// Résolveur et annuaire des communes en mémoire
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    offices: HashMap<String, Office>,
    documents: HashMap<String, Document>,
    municipalities: HashMap<u32, Municipality>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_office(mut self, office: Office) -> Self {
        self.offices.insert(office.id.clone(), office);
        self
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.documents.insert(document.id.clone(), document);
        self
    }

    pub fn with_municipality(mut self, municipality: Municipality) -> Self {
        self.municipalities.insert(municipality.fosnr, municipality);
        self
    }
}

impl Resolver for MemoryRegistry {
    fn office(&self, id: &str) -> Option<Office> {
        self.offices.get(id).cloned()
    }

    fn document(&self, id: &str) -> Option<Document> {
        self.documents.get(id).cloned()
    }
}

impl MunicipalityLookup for MemoryRegistry {
    fn municipality(&self, fosnr: u32) -> Option<Municipality> {
        self.municipalities.get(&fosnr).cloned()
    }
}

/// Source de thème en mémoire, renvoie toujours les mêmes données
#[derive(Debug, Clone)]
pub struct MemoryThemeSource {
    theme_code: String,
    data: ThemeData,
}

impl MemoryThemeSource {
    pub fn new(theme_code: impl Into<String>, data: ThemeData) -> Self {
        Self {
            theme_code: theme_code.into(),
            data,
        }
    }
}

impl ThemeSource for MemoryThemeSource {
    fn theme_code(&self) -> &str {
        &self.theme_code
    }

    fn fetch(&self, _parcel: &Parcel) -> Result<ThemeData, SourceError> {
        Ok(self.data.clone())
    }
}
