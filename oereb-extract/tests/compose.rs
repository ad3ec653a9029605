//! Tests d'intégration de la composition d'extraits
//!
//! Exécution:
//! ```bash
//! cargo test -p oereb-extract --test compose
//! RUST_LOG=oereb_extract=debug cargo test -p oereb-extract --test compose -- --nocapture
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use geo::{coord, Geometry, GeometryCollection, LineString, Point, Polygon, Rect};
use oereb_extract::{
    Document, DocumentKind, ExtractComposer, ExtractConfig, ExtractError, ExtractParams,
    ExtractReport, ExtractStatus, GeometryRecord, LegendEntry, MemoryRegistry, MemoryThemeSource,
    Municipality, Office, Parcel, RestrictionRecord, SourceError, Symbol, ThemeClassification,
    ThemeData, ThemeSource,
};
use oereb_geometry::round_one_decimal;
use serde_json::json;

const PLANNING: &str = "ch.Nutzungsplanung";
const NOISE: &str = "ch.Laermempfindlichkeitsstufen";
const GATED: &str = "X";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn params() -> ExtractParams {
    ExtractParams::at(date(2024, 6, 1))
}

fn config_with(legend_policy: &str) -> ExtractConfig {
    let json = json!({
        "themes": [
            { "code": PLANNING, "text": "Nutzungsplanung", "tolerance": { "min_length": 1.0, "min_area": 50.0 } },
            { "code": NOISE, "text": "Lärmempfindlichkeitsstufen" },
            { "code": GATED, "text": "Thème X" }
        ],
        "law_status_precedence": ["inForce", "pending"],
        "availability": [
            { "fosnr": 42, "theme": GATED, "available": false }
        ],
        "legend_policy": legend_policy,
        "cadastre_authority": { "id": "authority", "name": "Cadastre RDPPF" }
    });

    ExtractConfig::from_json(&json.to_string()).unwrap()
}

fn config() -> ExtractConfig {
    config_with("placeholder")
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon()
}

/// Parcelle 10 x 10 (100 m²) inscrite au registre pour 98 m²
fn parcel(fosnr: u32) -> Parcel {
    Parcel::new(
        format!("CH{fosnr}0000001"),
        "1",
        "ZH0001",
        fosnr,
        Geometry::Polygon(rect(0.0, 0.0, 10.0, 10.0)),
        98.0,
    )
    .unwrap()
}

fn registry() -> MemoryRegistry {
    MemoryRegistry::new()
        .with_municipality(Municipality::new(42, "Testdorf", true))
        .with_municipality(Municipality::new(43, "Unpubliziert", false))
        .with_office(Office::new("office", "Amt für Raumentwicklung"))
        .with_document(Document::new(
            "doc",
            DocumentKind::LegalProvision,
            "Bau- und Zonenordnung",
            date(2010, 1, 1),
        ))
}

fn shape(geometry: Geometry, law_status: &str) -> GeometryRecord {
    GeometryRecord::new(geometry, law_status, date(2010, 1, 1), None).unwrap()
}

fn restriction(
    id: &str,
    theme: &str,
    type_code: &str,
    law_status: &str,
    geometry: Geometry,
) -> RestrictionRecord {
    RestrictionRecord::builder(id, theme, type_code, law_status)
        .view_service("vs")
        .office("office")
        .document("doc")
        .information(format!("Restriction {id}"))
        .geometry(shape(geometry, law_status))
        .build()
        .unwrap()
}

fn legend(theme: &str, type_codes: &[&str]) -> Vec<LegendEntry> {
    type_codes
        .iter()
        .map(|code| {
            LegendEntry::new(
                theme,
                "vs",
                *code,
                format!("Legend {code}"),
                Symbol::Image {
                    mime_type: "image/png".to_string(),
                    data: vec![0x89, 0x50, 0x4e, 0x47],
                },
            )
        })
        .collect()
}

/// Source qui compte ses appels
struct CountingSource {
    inner: MemoryThemeSource,
    calls: AtomicUsize,
}

impl CountingSource {
    fn new(theme: &str, data: ThemeData) -> Self {
        Self {
            inner: MemoryThemeSource::new(theme, data),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ThemeSource for CountingSource {
    fn theme_code(&self) -> &str {
        self.inner.theme_code()
    }

    fn fetch(&self, parcel: &Parcel) -> Result<ThemeData, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(parcel)
    }
}

struct FailingSource;

impl ThemeSource for FailingSource {
    fn theme_code(&self) -> &str {
        NOISE
    }

    fn fetch(&self, _parcel: &Parcel) -> Result<ThemeData, SourceError> {
        Err(SourceError("connection refused".to_string()))
    }
}

fn planning_source(records: Vec<RestrictionRecord>, type_codes: &[&str]) -> MemoryThemeSource {
    MemoryThemeSource::new(PLANNING, ThemeData::new(records, legend(PLANNING, type_codes)))
}

#[test]
fn test_compose_is_idempotent() {
    init_tracing();
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let planning = planning_source(
        vec![
            restriction("r1", PLANNING, "A", "inForce", Geometry::Polygon(rect(1.0, 1.0, 9.0, 9.0))),
            restriction("r2", PLANNING, "B", "pending", Geometry::Point(Point::new(5.0, 5.0))),
        ],
        &["A", "B"],
    );
    let noise = MemoryThemeSource::new(NOISE, ThemeData::not_concerned());
    let sources: [&dyn ThemeSource; 2] = [&planning, &noise];

    let first = composer.compose(&parcel(42), &params(), &sources).unwrap();
    let second = composer.compose(&parcel(42), &params(), &sources).unwrap();

    assert_eq!(first.extract_identifier, second.extract_identifier);
    assert_eq!(first.body, second.body);
    assert_eq!(
        serde_json::to_vec(&first.body).unwrap(),
        serde_json::to_vec(&second.body).unwrap()
    );
}

#[test]
fn test_area_compensation_invariant() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let parcel = parcel(42);
    let planning = planning_source(
        vec![restriction("r1", PLANNING, "A", "inForce", Geometry::Polygon(rect(1.0, 1.0, 9.0, 8.0)))],
        &["A"],
    );

    let extract = composer.compose(&parcel, &params(), &[&planning]).unwrap();
    let restrictions = extract.restrictions_of(PLANNING);
    assert_eq!(restrictions.len(), 1);

    let expected = round_one_decimal(100.0 * (56.0 / parcel.area_ratio()) / parcel.boundary_area());
    let actual = restrictions[0].totals.part_in_percent.unwrap();
    assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    assert_eq!(actual, 54.9);

    let area = restrictions[0].totals.area_share.unwrap();
    assert!((area - 54.88).abs() < 1e-9);
}

#[test]
fn test_compensation_before_threshold() {
    // 51 m² bruts, soit 49.98 m² compensés, sous le seuil de 50 m²
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let planning = planning_source(
        vec![restriction("r1", PLANNING, "A", "inForce", Geometry::Polygon(rect(1.0, 1.0, 9.5, 7.0)))],
        &["A"],
    );

    let mut report = ExtractReport::new("CH42");
    let extract = composer
        .compose_with_report(&parcel(42), &params(), &[&planning], &mut report)
        .unwrap();

    assert!(extract.restrictions_of(PLANNING).is_empty());
    assert_eq!(
        extract.classification_of(PLANNING),
        Some(ThemeClassification::NotConcerned)
    );
    assert_eq!(report.themes[PLANNING].geometries_rejected, 1);
}

#[test]
fn test_line_exactly_at_min_length_is_kept() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let exact = LineString::from(vec![(2.0, 2.0), (3.0, 2.0)]);
    let short = LineString::from(vec![(2.0, 4.0), (2.5, 4.0)]);
    let planning = planning_source(
        vec![
            restriction("exact", PLANNING, "A", "inForce", Geometry::LineString(exact)),
            restriction("short", PLANNING, "A", "inForce", Geometry::LineString(short)),
        ],
        &["A"],
    );

    let extract = composer.compose(&parcel(42), &params(), &[&planning]).unwrap();
    let restrictions = extract.restrictions_of(PLANNING);

    assert_eq!(restrictions.len(), 1);
    assert_eq!(restrictions[0].id, "exact");
    assert_eq!(restrictions[0].totals.length_share, Some(1.0));
    assert_eq!(restrictions[0].totals.length_unit.as_deref(), Some("m"));
}

#[test]
fn test_collection_flattening() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();

    let single = GeometryCollection::new_from(vec![Geometry::GeometryCollection(
        GeometryCollection::new_from(vec![Geometry::Point(Point::new(5.0, 5.0))]),
    )]);
    let ambiguous = GeometryCollection::new_from(vec![
        Geometry::Point(Point::new(5.0, 5.0)),
        Geometry::Point(Point::new(6.0, 6.0)),
    ]);
    let planning = planning_source(
        vec![
            restriction("single", PLANNING, "A", "inForce", Geometry::GeometryCollection(single)),
            restriction("ambiguous", PLANNING, "A", "inForce", Geometry::GeometryCollection(ambiguous)),
        ],
        &["A"],
    );

    let mut report = ExtractReport::new("CH42");
    let extract = composer
        .compose_with_report(&parcel(42), &params(), &[&planning], &mut report)
        .unwrap();

    let restrictions = extract.restrictions_of(PLANNING);
    assert_eq!(restrictions.len(), 1);
    assert_eq!(restrictions[0].id, "single");
    assert_eq!(restrictions[0].totals.nr_of_points, Some(1));

    assert_eq!(report.total_dropped(), 1);
    assert_eq!(report.status, ExtractStatus::ComposedWithWarnings);
}

#[test]
fn test_availability_gating_skips_source() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let gated = CountingSource::new(
        GATED,
        ThemeData::new(
            vec![restriction("x1", GATED, "A", "inForce", Geometry::Point(Point::new(5.0, 5.0)))],
            legend(GATED, &["A"]),
        ),
    );

    let extract = composer.compose(&parcel(42), &params(), &[&gated]).unwrap();

    assert_eq!(gated.calls(), 0);
    assert_eq!(extract.classification_of(GATED), Some(ThemeClassification::WithoutData));
    assert_eq!(extract.restrictions().count(), 0);
}

#[test]
fn test_sort_by_law_status_is_stable() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let point = || Geometry::Point(Point::new(5.0, 5.0));
    let planning = planning_source(
        vec![
            restriction("first", PLANNING, "A", "inForce", point()),
            restriction("pending", PLANNING, "A", "pending", point()),
            restriction("second", PLANNING, "A", "inForce", point()),
        ],
        &["A"],
    );

    let extract = composer.compose(&parcel(42), &params(), &[&planning]).unwrap();
    let order: Vec<(&str, &str)> = extract
        .restrictions_of(PLANNING)
        .iter()
        .map(|r| (r.id.as_str(), r.law_status.as_str()))
        .collect();

    assert_eq!(
        order,
        vec![("first", "inForce"), ("second", "inForce"), ("pending", "pending")]
    );
}

#[test]
fn test_unknown_municipality_fails() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();

    let mut report = ExtractReport::new("CH999");
    let result = composer.compose_with_report(&parcel(999), &params(), &[], &mut report);

    assert!(matches!(result, Err(ExtractError::MunicipalityNotFound { fosnr: 999 })));
    assert_eq!(report.status, ExtractStatus::Failed);
}

#[test]
fn test_unpublished_municipality_has_no_data() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let planning = CountingSource::new(
        PLANNING,
        ThemeData::new(
            vec![restriction("r1", PLANNING, "A", "inForce", Geometry::Point(Point::new(5.0, 5.0)))],
            legend(PLANNING, &["A"]),
        ),
    );

    let extract = composer.compose(&parcel(43), &params(), &[&planning]).unwrap();

    assert_eq!(planning.calls(), 0);
    assert!(extract.body.concerned_themes.is_empty());
    assert!(extract.body.not_concerned_themes.is_empty());
    assert_eq!(extract.body.themes_without_data.len(), 3);
}

#[test]
fn test_themes_follow_configuration_order() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let noise = MemoryThemeSource::new(NOISE, ThemeData::not_concerned());

    let extract = composer.compose(&parcel(42), &params(), &[&noise]).unwrap();

    // Pas de source pour la planification, thème X désactivé pour la commune 42
    let without_data: Vec<&str> = extract
        .body
        .themes_without_data
        .iter()
        .map(|t| t.code.as_str())
        .collect();
    assert_eq!(without_data, vec![PLANNING, GATED]);
    assert_eq!(extract.classification_of(NOISE), Some(ThemeClassification::NotConcerned));
    assert_eq!(extract.body.cadastre_authority.id, "authority");
}

#[test]
fn test_topics_filter() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let noise = MemoryThemeSource::new(NOISE, ThemeData::not_concerned());
    let params = params().with_topics([NOISE, "ch.Unknown"]);

    let extract = composer.compose(&parcel(42), &params, &[&noise]).unwrap();

    assert_eq!(extract.classification_of(NOISE), Some(ThemeClassification::NotConcerned));
    assert_eq!(extract.classification_of(PLANNING), None);
    assert_eq!(extract.classification_of(GATED), None);
}

#[test]
fn test_other_legends_and_documents() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let planning = planning_source(
        vec![restriction("r1", PLANNING, "B", "inForce", Geometry::Point(Point::new(5.0, 5.0)))],
        &["C", "B", "A"],
    );

    let extract = composer.compose(&parcel(42), &params(), &[&planning]).unwrap();
    let concerned = &extract.body.concerned_themes[0];

    let others: Vec<&str> = concerned
        .other_legends
        .iter()
        .map(|e| e.type_code.as_str())
        .collect();
    assert_eq!(others, vec!["A", "C"]);

    let restriction = &concerned.restrictions[0];
    assert_eq!(restriction.legend_text, "Legend B");
    assert_eq!(restriction.documents[0].title, "Bau- und Zonenordnung");
    assert_eq!(restriction.office.name, "Amt für Raumentwicklung");
}

#[test]
fn test_missing_legend_policies() {
    let registry = registry();
    let records = vec![restriction("r1", PLANNING, "Z", "inForce", Geometry::Point(Point::new(5.0, 5.0)))];

    let lenient = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let planning = planning_source(records.clone(), &["A"]);
    let mut report = ExtractReport::new("CH42");
    let extract = lenient
        .compose_with_report(&parcel(42), &params(), &[&planning], &mut report)
        .unwrap();
    assert_eq!(extract.restrictions_of(PLANNING)[0].symbol, Symbol::Placeholder);
    assert_eq!(report.status, ExtractStatus::ComposedWithWarnings);

    let strict = ExtractComposer::new(config_with("fail_fast"), &registry, &registry).unwrap();
    let result = strict.compose(&parcel(42), &params(), &[&planning]);
    assert!(matches!(result, Err(ExtractError::MissingLegendEntry { .. })));
}

#[test]
fn test_ambiguous_legend_is_fatal() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let planning = planning_source(
        vec![restriction("r1", PLANNING, "A", "inForce", Geometry::Point(Point::new(5.0, 5.0)))],
        &["A", "A"],
    );

    let result = composer.compose(&parcel(42), &params(), &[&planning]);
    assert!(matches!(
        result,
        Err(ExtractError::AmbiguousLegendEntry { count: 2, .. })
    ));
}

#[test]
fn test_source_failure_is_fatal() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();

    let mut report = ExtractReport::new("CH42");
    let result = composer.compose_with_report(&parcel(42), &params(), &[&FailingSource], &mut report);

    match result {
        Err(ExtractError::Source { theme, reason }) => {
            assert_eq!(theme, NOISE);
            assert_eq!(reason, "connection refused");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(report.status, ExtractStatus::Failed);
}

#[test]
fn test_duplicate_sources_rejected() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let a = MemoryThemeSource::new(NOISE, ThemeData::not_concerned());
    let b = MemoryThemeSource::new(NOISE, ThemeData::without_data());

    let result = composer.compose(&parcel(42), &params(), &[&a, &b]);
    assert!(matches!(result, Err(ExtractError::Config(_))));
}

#[test]
fn test_compose_many_keeps_order() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let noise = MemoryThemeSource::new(NOISE, ThemeData::not_concerned());
    let parcels = vec![parcel(42), parcel(999), parcel(43)];

    let results = composer.compose_many(&parcels, &params(), &[&noise]);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().body.real_estate.fosnr(), 42);
    assert!(matches!(results[1], Err(ExtractError::MunicipalityNotFound { .. })));
    assert_eq!(results[2].as_ref().unwrap().body.municipality.fosnr, 43);
}

#[test]
fn test_extract_serializes_to_json() {
    let registry = registry();
    let composer = ExtractComposer::new(config(), &registry, &registry).unwrap();
    let planning = planning_source(
        vec![restriction("r1", PLANNING, "A", "inForce", Geometry::Polygon(rect(1.0, 1.0, 9.0, 9.0)))],
        &["A"],
    );

    let extract = composer.compose(&parcel(42), &params(), &[&planning]).unwrap();
    let value = serde_json::to_value(&extract).unwrap();

    assert_eq!(value["extract_identifier"], extract.extract_identifier.as_str());
    assert_eq!(value["real_estate"]["boundary"]["type"], "MultiPolygon");
    let restriction = &value["concerned_themes"][0]["restrictions"][0];
    assert_eq!(restriction["symbol"]["data"], "89504e47");
    assert_eq!(restriction["geometries"][0]["share"]["kind"], "area");
}
