//! Entrées de légende et symboles

use serde::{Serialize, Serializer};

/// Représentation graphique d'un type de restriction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symbol {
    /// Image embarquée
    Image {
        mime_type: String,
        #[serde(serialize_with = "serialize_hex")]
        data: Vec<u8>,
    },
    /// Référence vers une image servie ailleurs
    Reference { url: String },
    /// Symbole de remplacement quand la légende est introuvable
    Placeholder,
}

fn serialize_hex<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(data))
}

/// Entrée de légende d'un service de visualisation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    /// Code de type de restriction
    pub type_code: String,

    /// Liste de codes (catalogue) à laquelle le code appartient
    pub type_code_list: String,

    pub symbol: Symbol,

    pub legend_text: String,

    /// Code du thème
    pub theme: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_theme: Option<String>,

    /// Service de visualisation auquel l'entrée appartient
    pub view_service_id: String,
}

impl LegendEntry {
    pub fn new(
        theme: impl Into<String>,
        view_service_id: impl Into<String>,
        type_code: impl Into<String>,
        legend_text: impl Into<String>,
        symbol: Symbol,
    ) -> Self {
        Self {
            type_code: type_code.into(),
            type_code_list: String::new(),
            symbol,
            legend_text: legend_text.into(),
            theme: theme.into(),
            sub_theme: None,
            view_service_id: view_service_id.into(),
        }
    }

    pub fn with_type_code_list(mut self, list: impl Into<String>) -> Self {
        self.type_code_list = list.into();
        self
    }

    pub fn with_sub_theme(mut self, sub_theme: impl Into<String>) -> Self {
        self.sub_theme = Some(sub_theme.into());
        self
    }
}
