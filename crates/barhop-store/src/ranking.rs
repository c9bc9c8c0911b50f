//! Distance ranking shared by the nearby and search queries.

use barhop_core::{Bar, Coordinate, RankedBar};

/// Pairs each bar with its haversine distance from `origin`, drops bars
/// beyond `max_miles` (when given), and sorts nearest first.
///
/// Equal distances keep id order.
pub fn rank_by_distance<'a, I>(
    bars: I,
    origin: &Coordinate,
    max_miles: Option<f64>,
) -> Vec<RankedBar>
where
    I: IntoIterator<Item = &'a Bar>,
{
    let mut ranked: Vec<RankedBar> = bars
        .into_iter()
        .map(|bar| RankedBar {
            distance_miles: origin.distance_miles(&bar.coordinate()),
            bar: bar.clone(),
        })
        .filter(|r| max_miles.is_none_or(|max| r.distance_miles <= max))
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_miles
            .total_cmp(&b.distance_miles)
            .then(a.bar.id.cmp(&b.bar.id))
    });
    ranked
}
