//! Modèle de données de l'extrait

pub mod document;
pub mod extract;
pub mod legend;
pub mod parcel;
pub mod restriction;

pub use document::{Document, DocumentKind, Office};
pub use extract::{ConcernedTheme, Extract, ExtractBody, Theme, ThemeClassification};
pub use legend::{LegendEntry, Symbol};
pub use parcel::{Municipality, Parcel};
pub use restriction::{
    EvaluatedGeometry, GeometryRecord, Restriction, RestrictionRecord, RestrictionRecordBuilder,
    ShareTotals, UnevaluatedGeometry,
};

use chrono::NaiveDate;

/// Fenêtre de publication, bornes incluses
pub fn is_published(from: NaiveDate, until: Option<NaiveDate>, at: NaiveDate) -> bool {
    from <= at && until.map_or(true, |until| at <= until)
}
