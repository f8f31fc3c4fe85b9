// src/headline.rs
//! HeadlineSynthesizer: eight headlines from fixed templates.

use rand::seq::IndexedRandom;
use rand::Rng;
use std::ops::Index;

use crate::ranking::RankedAttributeSet;

pub const HEADLINE_COUNT: usize = 8;

const OPENERS: [&str; 5] = [
    "Enjoy your break",
    "Having great time",
    "Experience of a lifetime",
    "Have a holiday of a lifetime",
    "Wonderful break",
];
const CHEERFUL_OPENERS: [&str; 2] = ["Enjoy happy days", "Have hilarious time"];
const COMPANY: [&str; 3] = ["with friends", "with family", "on your own"];
const PLACE_CONNECTIVES: [&str; 4] = ["full of", "bursting with", "brimming with", "packed with"];
const ADJECTIVES: [&str; 5] = ["Hilarious", "Beautiful", "Brilliant", "Family fun", "Glorious"];

#[derive(Debug, Clone, Copy)]
enum Fragment {
    Word(&'static str),
    Opener,
    CheerfulOpener,
    Company,
    PlaceConnective,
    Adjective,
    Country,
    City,
    Weather,
    Weekday,
    Month,
    Season,
    Poi,
}

use Fragment::*;

const TEMPLATES: [&[Fragment]; HEADLINE_COUNT] = [
    &[Opener, Company, Word("in"), Weather, Country],
    &[Adjective, Month, Company, Word("in"), Weather, Country],
    &[Adjective, Weekday, Word("enjoying"), City, Word("of"), PlaceConnective, Poi],
    &[Adjective, Season, Word("break in"), Country, PlaceConnective, Poi],
    &[Adjective, Weekday, Word("stay in"), City, PlaceConnective, Poi],
    &[CheerfulOpener, Company, Word("in"), Weather, City],
    &[Opener, Company, Word("in"), Country, PlaceConnective, Poi],
    &[Opener, Word("in"), City, PlaceConnective, Poi],
];

/// Exactly [`HEADLINE_COUNT`] non-empty headlines, in template order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineSet(Vec<String>);

impl HeadlineSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl Index<usize> for HeadlineSet {
    type Output = String;

    fn index(&self, i: usize) -> &String {
        &self.0[i]
    }
}

impl<'a> IntoIterator for &'a HeadlineSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub fn synthesize<R: Rng + ?Sized>(ranked: &RankedAttributeSet, rng: &mut R) -> HeadlineSet {
    let headlines = TEMPLATES
        .iter()
        .map(|template| {
            template
                .iter()
                .map(|f| render(*f, ranked, rng))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    HeadlineSet(headlines)
}

fn render<'a, R: Rng + ?Sized>(f: Fragment, r: &'a RankedAttributeSet, rng: &mut R) -> &'a str {
    match f {
        Word(w) => w,
        Opener => pick(&OPENERS, rng),
        CheerfulOpener => pick(&CHEERFUL_OPENERS, rng),
        Company => pick(&COMPANY, rng),
        PlaceConnective => pick(&PLACE_CONNECTIVES, rng),
        Adjective => pick(&ADJECTIVES, rng),
        Country => &r.country,
        City => &r.city,
        Weather => &r.weather,
        Weekday => &r.weekday,
        Month => &r.month,
        Season => &r.season,
        Poi => &r.poi_category,
    }
}

fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}
