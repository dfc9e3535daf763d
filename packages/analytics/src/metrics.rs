//! Ratio metrics with safe-division semantics.
//!
//! A ratio whose denominator is zero, missing, or not finite is `None`.
//! It is never `0.0` and never infinite.

use ev_map_analytics_models::CountySummary;

/// Divides `numerator` by `denominator`, returning `None` when the
/// denominator is missing, zero, or not finite.
///
/// ```
/// use ev_map_analytics::safe_div;
///
/// assert_eq!(safe_div(6.0, Some(3.0)), Some(2.0));
/// assert_eq!(safe_div(6.0, Some(0.0)), None);
/// assert_eq!(safe_div(6.0, None), None);
/// ```
#[must_use]
pub fn safe_div(numerator: f64, denominator: Option<f64>) -> Option<f64> {
    let denominator = denominator.filter(|d| *d != 0.0 && d.is_finite())?;
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}

/// Returns `count` per 1,000 people. A population that is missing, zero,
/// negative, or not finite yields `None`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn per_thousand(count: u64, population: Option<f64>) -> Option<f64> {
    let population = population.filter(|p| p.is_finite() && *p > 0.0)?;
    safe_div(count as f64, Some(population / 1000.0))
}

/// Returns a copy of `summary` with its three ratios recomputed from its
/// counts and population.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn derive_metrics(summary: CountySummary) -> CountySummary {
    let evs_per_charger = safe_div(
        summary.ev_registrations as f64,
        Some(summary.total_chargers as f64),
    );
    let evs_per_1k_people = per_thousand(summary.ev_registrations, summary.population);
    let chargers_per_1k_people = per_thousand(summary.total_chargers, summary.population);

    CountySummary {
        evs_per_charger,
        evs_per_1k_people,
        chargers_per_1k_people,
        ..summary
    }
}
