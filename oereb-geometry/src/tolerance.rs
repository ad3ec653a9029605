//! Évaluation des géométries contre la parcelle
//!
//! Chaque géométrie élémentaire est intersectée avec l'emprise de la parcelle.
//! Les surfaces sont compensées par le rapport surface géométrique / surface
//! du registre foncier avant comparaison au seuil.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Area, BooleanOps, Contains, EuclideanLength, Intersects, LineString, MultiLineString,
    MultiPolygon, Relate,
};
use tracing::trace;

use crate::{Elementary, Evaluation, Rejection, Share, Tolerance};

/// Arrondit à une décimale, demi-unité éloignée de zéro (`f64::round`)
///
/// `12.25` donne `12.3` et `-12.25` donne `-12.3`.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Surface compensée : surface brute divisée par le rapport de la parcelle
pub fn compensated_area(raw_area: f64, area_ratio: f64) -> f64 {
    raw_area / area_ratio
}

/// Pourcentage de la parcelle couvert par une surface compensée
pub fn part_in_percent(compensated: f64, boundary_area: f64) -> f64 {
    round_one_decimal(compensated / boundary_area * 100.0)
}

/// Intersecte une géométrie élémentaire avec la parcelle et applique les seuils
///
/// # Arguments
///
/// * `geometry` - Géométrie élémentaire de la restriction
/// * `boundary` - Emprise de la parcelle
/// * `tolerance` - Seuils et unités du thème
/// * `area_ratio` - Rapport surface géométrique / surface du registre
///
/// Les comparaisons acceptent l'égalité : une ligne de longueur exactement
/// `min_length` est retenue.
pub fn evaluate(
    geometry: &Elementary,
    boundary: &MultiPolygon,
    tolerance: &Tolerance,
    area_ratio: f64,
) -> Evaluation {
    match geometry {
        Elementary::Point(point) => {
            if boundary.intersects(point) {
                Evaluation::Accepted(Share::Points { count: 1 })
            } else {
                Evaluation::Rejected(Rejection::Empty)
            }
        }
        Elementary::Line(line) => {
            // Intersection avec la parcelle fermée : une ligne posée sur la
            // limite compte pour toute sa longueur
            let length = if line.relate(boundary).is_coveredby() {
                line.euclidean_length()
            } else {
                boundary
                    .clip(&MultiLineString::new(vec![line.clone()]), false)
                    .euclidean_length()
                    + length_along_rings(line, boundary)
            };

            if length <= 0.0 {
                return Evaluation::Rejected(Rejection::Empty);
            }
            if length < tolerance.min_length {
                trace!(length, min_length = tolerance.min_length, "Line below tolerance");
                return Evaluation::Rejected(Rejection::BelowMinLength {
                    length,
                    min_length: tolerance.min_length,
                });
            }

            Evaluation::Accepted(Share::Length {
                length,
                unit: tolerance.length_unit.clone(),
            })
        }
        Elementary::Polygon(polygon) => {
            let raw_area = if boundary.iter().any(|part| part.contains(polygon)) {
                polygon.unsigned_area()
            } else {
                boundary
                    .intersection(&MultiPolygon::new(vec![polygon.clone()]))
                    .unsigned_area()
            };

            if raw_area <= 0.0 {
                return Evaluation::Rejected(Rejection::Empty);
            }

            // Compensation d'abord, seuil ensuite
            let area = compensated_area(raw_area, area_ratio);
            if area < tolerance.min_area {
                trace!(raw_area, area, min_area = tolerance.min_area, "Polygon below tolerance");
                return Evaluation::Rejected(Rejection::BelowMinArea {
                    area,
                    min_area: tolerance.min_area,
                });
            }

            Evaluation::Accepted(Share::Area {
                area,
                unit: tolerance.area_unit.clone(),
                part_in_percent: part_in_percent(area, boundary.unsigned_area()),
            })
        }
    }
}

/// Longueur des tronçons de la ligne confondus avec les contours de la parcelle
///
/// `clip` ne garde que l'intérieur strict, ces tronçons s'y ajoutent.
fn length_along_rings(line: &LineString, boundary: &MultiPolygon) -> f64 {
    let rings = boundary
        .iter()
        .flat_map(|part| std::iter::once(part.exterior()).chain(part.interiors()));

    let mut length = 0.0;
    for ring in rings {
        for edge in ring.lines() {
            for segment in line.lines() {
                if let Some(LineIntersection::Collinear { intersection }) =
                    line_intersection(segment, edge)
                {
                    length += intersection.euclidean_length();
                }
            }
        }
    }
    length
}
