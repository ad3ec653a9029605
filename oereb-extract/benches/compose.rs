//! Benchmarks pour la composition d'extraits

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::{coord, Geometry, Rect};
use oereb_extract::{
    ExtractComposer, ExtractConfig, ExtractParams, GeometryRecord, LegendEntry, MemoryRegistry,
    MemoryThemeSource, Municipality, Office, Parcel, RestrictionRecord, Symbol, ThemeData,
    ThemeSource,
};

const THEME: &str = "ch.Nutzungsplanung";

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry {
    Geometry::Polygon(Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon())
}

fn parcel(index: usize) -> Parcel {
    Parcel::new(
        format!("CH{index:012}"),
        index.to_string(),
        "ZH0001",
        261,
        rect(0.0, 0.0, 100.0, 100.0),
        9950.0,
    )
    .unwrap()
}

/// Bandes de zonage, la moitié déborde de la parcelle
fn source(restrictions: usize) -> MemoryThemeSource {
    let records = (0..restrictions)
        .map(|i| {
            let x = (i % 20) as f64 * 10.0 - 50.0;
            let geometry = GeometryRecord::new(rect(x, 0.0, x + 12.0, 100.0), "inKraft", date(), None).unwrap();
            RestrictionRecord::builder(format!("r{i}"), THEME, format!("T{}", i % 5), "inKraft")
                .view_service("vs")
                .office("office")
                .geometry(geometry)
                .build()
                .unwrap()
        })
        .collect();
    let legend = (0..5)
        .map(|i| LegendEntry::new(THEME, "vs", format!("T{i}"), format!("Zone {i}"), Symbol::Placeholder))
        .collect();

    MemoryThemeSource::new(THEME, ThemeData::new(records, legend))
}

fn bench_compose(c: &mut Criterion) {
    let config = ExtractConfig::from_preset("federal").unwrap();
    let registry = MemoryRegistry::new()
        .with_municipality(Municipality::new(261, "Zürich", true))
        .with_office(Office::new("office", "Amt für Städtebau"));
    let composer = ExtractComposer::new(config, &registry, &registry).unwrap();
    let params = ExtractParams::at(date());

    let mut group = c.benchmark_group("compose");

    for restrictions in [10, 100, 1000] {
        let source = source(restrictions);
        let sources: [&dyn ThemeSource; 1] = [&source];
        let parcel = parcel(0);

        group.throughput(Throughput::Elements(restrictions as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(restrictions),
            &sources,
            |b, sources| {
                b.iter(|| {
                    let extract = composer.compose(black_box(&parcel), &params, sources).unwrap();
                    black_box(extract)
                })
            },
        );
    }

    group.finish();
}

fn bench_compose_many(c: &mut Criterion) {
    let config = ExtractConfig::from_preset("federal").unwrap();
    let registry = MemoryRegistry::new()
        .with_municipality(Municipality::new(261, "Zürich", true))
        .with_office(Office::new("office", "Amt für Städtebau"));
    let composer = ExtractComposer::new(config, &registry, &registry).unwrap();
    let params = ExtractParams::at(date());

    let source = source(100);
    let sources: [&dyn ThemeSource; 1] = [&source];
    let parcels: Vec<Parcel> = (0..64).map(parcel).collect();

    let mut group = c.benchmark_group("compose_many");
    group.throughput(Throughput::Elements(parcels.len() as u64));
    group.bench_function("64_parcels", |b| {
        b.iter(|| {
            let results = composer.compose_many(black_box(&parcels), &params, &sources);
            black_box(results)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_compose, bench_compose_many);
criterion_main!(benches);
