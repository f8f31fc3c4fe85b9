// tests/ranking.rs
use std::collections::HashMap;

use travel_article_headings::enrich::date_to_season;
use travel_article_headings::photo::{LocationResult, PoiResult, WeatherResult};
use travel_article_headings::ranking::{most_frequent, RankedAttributeSet};

fn loc(i: usize, country: &str, city: &str) -> LocationResult {
    LocationResult {
        article_id: "usa.csv".into(),
        photo_index: i,
        country: country.into(),
        city: city.into(),
    }
}

fn weather(i: usize, descriptor: &str, ts: &str) -> WeatherResult {
    WeatherResult {
        article_id: "usa.csv".into(),
        photo_index: i,
        weather: descriptor.into(),
        time_info: date_to_season(ts).unwrap(),
    }
}

fn poi(i: usize, pairs: &[(&str, u32)]) -> PoiResult {
    PoiResult {
        article_id: "usa.csv".into(),
        photo_index: i,
        categories: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<HashMap<_, _>>(),
    }
}

#[test]
fn usa_and_new_york_dominate() {
    let mut locations = Vec::new();
    for i in 1..=4 {
        locations.push(loc(i, "USA", "New York"));
    }
    for i in 5..=7 {
        locations.push(loc(i, "USA", "San Francisco"));
    }
    for i in 8..=9 {
        locations.push(loc(i, "Canada", "Vancouver"));
    }
    let weather = vec![weather(1, "sunny", "2019-10-29T11:11:59Z")];
    let pois = vec![poi(1, &[("Bars", 10)])];

    let ranked = RankedAttributeSet::rank(&locations, &weather, &pois);
    assert_eq!(ranked.country, "USA");
    assert_eq!(ranked.city, "New York");
    assert_eq!(ranked.poi_category, "Bars");
}

#[test]
fn tied_maximum_returns_one_of_the_tied_values() {
    let values = ["hazy", "sunny", "sunny", "hazy", "wet"];
    let got = most_frequent(values).unwrap();
    assert!(got == "hazy" || got == "sunny", "{got}");
    assert_ne!(got, "wet");
}

#[test]
fn weekend_days_collapse_to_weekend() {
    let weather = vec![
        weather(1, "stormy", "2019-12-29 11:11:59"),
        weather(2, "stormy", "2019-12-29 13:00:00"),
        weather(3, "hazy", "2019-10-29T11:11:59Z"),
    ];
    let ranked = RankedAttributeSet::rank(&[loc(1, "UK", "London")], &weather, &[poi(1, &[("Pubs", 1)])]);
    assert_eq!(ranked.weekday, "Weekend");
    assert_eq!(ranked.weather, "stormy");
    assert_eq!(ranked.month, "December");
    assert_eq!(ranked.season, "Winter");
}

#[test]
fn poi_category_uses_summed_scores() {
    let pois = vec![
        poi(1, &[("Zoos", 40), ("Cafes", 30)]),
        poi(2, &[("Zoos", 0), ("Cafes", 30)]),
    ];
    let ranked = RankedAttributeSet::rank(&[loc(1, "Spain", "Madrid")], &[], &pois);
    assert_eq!(ranked.poi_category, "Cafes");
}
