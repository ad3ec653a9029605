//! Offices responsables et documents juridiques

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Office responsable d'une restriction ou d'un document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub id: String,
    pub name: String,
    /// Numéro IDE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office_at_web: Option<String>,
}

impl Office {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            uid: None,
            office_at_web: None,
        }
    }
}

/// Nature d'un document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Disposition juridique
    LegalProvision,
    /// Base légale
    Law,
    /// Information et renvoi
    Hint,
}

/// Document juridique rattaché à une restriction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub kind: DocumentKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_at_web: Option<String>,
    pub published_from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_office_id: Option<String>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        kind: DocumentKind,
        title: impl Into<String>,
        published_from: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            abbreviation: None,
            official_number: None,
            text_at_web: None,
            published_from,
            published_until: None,
            responsible_office_id: None,
        }
    }

    pub fn is_published(&self, at: NaiveDate) -> bool {
        super::is_published(self.published_from, self.published_until, at)
    }
}
