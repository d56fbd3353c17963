//! Aggregates a user's visit list into chart-ready numbers.
//!
//! Everything here is a pure function over the rows already loaded from the
//! store. A region counts as visited when at least one of its visits has a
//! rating above zero, and it is always counted once, at its highest rating.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::data::regions::{self, MacroRegion};
use crate::models::visit::{self, VisitRating};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub rating: i32,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBucket {
    pub year: i32,
    pub visits: usize,
    pub first_time_visits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub year: i32,
    pub regions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroRegionProgress {
    pub macro_region: MacroRegion,
    pub name: &'static str,
    pub visited: usize,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelStats {
    pub total_regions: usize,
    pub visited_regions: usize,
    pub visited_percentage: f64,
    pub total_visits: usize,
    pub score: i32,
    pub rating_breakdown: Vec<RatingBucket>,
    pub yearly: Vec<YearBucket>,
    pub cumulative: Vec<CumulativePoint>,
    pub macro_regions: Vec<MacroRegionProgress>,
}

/// Summary of one region across all of its visits
#[derive(Debug, Clone, Copy)]
struct RegionSummary {
    highest_rating: i32,
    first_year: i32,
}

pub fn compute_stats(visits: &[visit::Model]) -> TravelStats {
    let counted: Vec<&visit::Model> = visits
        .iter()
        .filter(|v| v.rating > 0 && regions::find(&v.region_id).is_some())
        .collect();

    let summaries = summarize_regions(&counted);
    let total_regions = regions::all().len();

    TravelStats {
        total_regions,
        visited_regions: summaries.len(),
        visited_percentage: percentage(summaries.len(), total_regions),
        total_visits: counted.len(),
        score: summaries.values().map(|s| s.highest_rating).sum(),
        rating_breakdown: rating_breakdown(&summaries, total_regions),
        yearly: yearly_buckets(&counted, &summaries),
        cumulative: cumulative_regions(&summaries, &counted),
        macro_regions: macro_region_progress(&summaries),
    }
}

/// Highest rating of each region, keyed by region id
pub fn highest_ratings(visits: &[visit::Model]) -> HashMap<String, i32> {
    let mut highest: HashMap<String, i32> = HashMap::new();
    for v in visits {
        let entry = highest.entry(v.region_id.clone()).or_insert(v.rating);
        if v.rating > *entry {
            *entry = v.rating;
        }
    }
    highest
}

fn summarize_regions<'a>(visits: &[&'a visit::Model]) -> HashMap<&'a str, RegionSummary> {
    let mut summaries: HashMap<&str, RegionSummary> = HashMap::new();

    for &v in visits {
        summaries
            .entry(v.region_id.as_str())
            .and_modify(|s| {
                s.highest_rating = s.highest_rating.max(v.rating);
                s.first_year = s.first_year.min(v.visit_year);
            })
            .or_insert(RegionSummary {
                highest_rating: v.rating,
                first_year: v.visit_year,
            });
    }

    summaries
}

fn rating_breakdown(
    summaries: &HashMap<&str, RegionSummary>,
    total_regions: usize,
) -> Vec<RatingBucket> {
    (0..=5)
        .rev()
        .map(|rating| {
            let count = if rating == 0 {
                total_regions - summaries.len()
            } else {
                summaries
                    .values()
                    .filter(|s| s.highest_rating == rating)
                    .count()
            };

            RatingBucket {
                rating,
                label: VisitRating::from_value(rating)
                    .map(|r| r.label())
                    .unwrap_or("Unknown"),
                count,
            }
        })
        .collect()
}

fn yearly_buckets(
    visits: &[&visit::Model],
    summaries: &HashMap<&str, RegionSummary>,
) -> Vec<YearBucket> {
    let mut by_year: BTreeMap<i32, YearBucket> = BTreeMap::new();

    for v in visits {
        by_year
            .entry(v.visit_year)
            .or_insert(YearBucket {
                year: v.visit_year,
                visits: 0,
                first_time_visits: 0,
            })
            .visits += 1;
    }

    for summary in summaries.values() {
        if let Some(bucket) = by_year.get_mut(&summary.first_year) {
            bucket.first_time_visits += 1;
        }
    }

    by_year.into_values().collect()
}

fn cumulative_regions(
    summaries: &HashMap<&str, RegionSummary>,
    visits: &[&visit::Model],
) -> Vec<CumulativePoint> {
    let mut new_per_year: BTreeMap<i32, usize> = visits.iter().map(|v| (v.visit_year, 0)).collect();
    for summary in summaries.values() {
        *new_per_year.entry(summary.first_year).or_insert(0) += 1;
    }

    let mut running = 0;
    new_per_year
        .into_iter()
        .map(|(year, added)| {
            running += added;
            CumulativePoint {
                year,
                regions: running,
            }
        })
        .collect()
}

fn macro_region_progress(summaries: &HashMap<&str, RegionSummary>) -> Vec<MacroRegionProgress> {
    MacroRegion::ALL
        .iter()
        .map(|macro_region| {
            let total = regions::count_in(*macro_region);
            let visited = regions::all()
                .iter()
                .filter(|r| r.macro_region == *macro_region && summaries.contains_key(r.id))
                .count();

            MacroRegionProgress {
                macro_region: *macro_region,
                name: macro_region.name(),
                visited,
                total,
                percentage: percentage(visited, total),
            }
        })
        .collect()
}

/// Percentage rounded to one decimal
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    ((part as f64 / whole as f64) * 1000.0).round() / 10.0
}
