// src/ranking.rs
//! FrequencyRanker: the dominant value of each attribute across an article.
//!
//! Ties go to the lexicographically smallest value so a run is reproducible.
//! Empty values (a geocoder hit without a city, an unparsable timestamp) are
//! not counted; a dimension with nothing left falls back to a placeholder.

use std::collections::HashMap;

use crate::photo::{LocationResult, PoiResult, WeatherResult};

/// Value with the highest count. `None` for an empty map.
pub fn top_entry<'a>(counts: &HashMap<&'a str, u64>) -> Option<&'a str> {
    counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| kb.cmp(ka)))
        .map(|(k, _)| *k)
}

/// Occurrence count of every non-empty value.
pub fn count_values<'a, I>(values: I) -> HashMap<&'a str, u64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = HashMap::new();
    for v in values.into_iter().filter(|v| !v.is_empty()) {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

pub fn most_frequent<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    top_entry(&count_values(values)).map(str::to_string)
}

/// Category with the highest summed score across all photos.
pub fn top_poi_category(pois: &[PoiResult]) -> Option<String> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for (category, score) in pois.iter().flat_map(|p| p.categories.iter()) {
        if category.is_empty() {
            continue;
        }
        *totals.entry(category.as_str()).or_insert(0) += u64::from(*score);
    }
    top_entry(&totals).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedAttributeSet {
    pub country: String,
    pub city: String,
    pub weather: String,
    /// "Weekend" when the dominant day is Saturday or Sunday.
    pub weekday: String,
    pub month: String,
    pub season: String,
    pub poi_category: String,
}

impl RankedAttributeSet {
    pub fn rank(
        locations: &[LocationResult],
        weather: &[WeatherResult],
        pois: &[PoiResult],
    ) -> Self {
        let pick = |v: Option<String>, placeholder: &str| v.unwrap_or_else(|| placeholder.to_string());

        let weekday = pick(
            most_frequent(weather.iter().map(|w| w.time_info.weekday.as_str())),
            "day",
        );

        Self {
            country: pick(most_frequent(locations.iter().map(|l| l.country.as_str())), "country"),
            city: pick(most_frequent(locations.iter().map(|l| l.city.as_str())), "city"),
            weather: pick(most_frequent(weather.iter().map(|w| w.weather.as_str())), "weather"),
            weekday: weekend_label(weekday),
            month: pick(
                most_frequent(weather.iter().map(|w| w.time_info.month.as_str())),
                "month",
            ),
            season: pick(
                most_frequent(weather.iter().map(|w| w.time_info.season.as_str())),
                "season",
            ),
            poi_category: pick(top_poi_category(pois), "places"),
        }
    }
}

fn weekend_label(day: String) -> String {
    match day.as_str() {
        "Saturday" | "Sunday" => "Weekend".to_string(),
        _ => day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_maximum_wins() {
        let got = most_frequent(["a", "b", "b", "c", "b", "a"]);
        assert_eq!(got.as_deref(), Some("b"));
    }

    #[test]
    fn tie_goes_to_smallest_value() {
        let got = most_frequent(["Rome", "Milan", "Rome", "Milan", "Turin"]);
        assert_eq!(got.as_deref(), Some("Milan"));
    }

    #[test]
    fn empty_values_are_ignored() {
        assert_eq!(most_frequent(["", "", "Oslo"]).as_deref(), Some("Oslo"));
        assert_eq!(most_frequent(["", ""]), None);
        assert_eq!(most_frequent(Vec::<&str>::new()), None);
    }

    #[test]
    fn poi_scores_are_summed_not_counted() {
        let poi = |pairs: &[(&str, u32)]| PoiResult {
            article_id: "a".into(),
            photo_index: 1,
            categories: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        };
        // Parks leads on two photos but Museums has the larger total.
        let pois = [
            poi(&[("Parks", 10), ("Museums", 9)]),
            poi(&[("Parks", 10), ("Museums", 9)]),
            poi(&[("Parks", 1), ("Museums", 90)]),
        ];
        assert_eq!(top_poi_category(&pois).as_deref(), Some("Museums"));
    }

    #[test]
    fn sunday_becomes_weekend() {
        assert_eq!(weekend_label("Sunday".into()), "Weekend");
        assert_eq!(weekend_label("Saturday".into()), "Weekend");
        assert_eq!(weekend_label("Friday".into()), "Friday");
    }

    #[test]
    fn placeholders_fill_missing_dimensions() {
        let ranked = RankedAttributeSet::rank(&[], &[], &[]);
        assert_eq!(ranked.country, "country");
        assert_eq!(ranked.city, "city");
        assert_eq!(ranked.poi_category, "places");
        assert_eq!(ranked.weekday, "day");
    }
}
