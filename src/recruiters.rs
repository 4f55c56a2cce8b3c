use std::collections::{HashMap, HashSet};

use crate::aggregate::round2;
use crate::models::{
    CompanyProfile, PackageBucket, PlacementRecord, RecruiterSummary, SectorSummary, Tier,
};

struct RecruiterAccumulator {
    sector: String,
    tier: Tier,
    total_placements: u32,
    package_sum: f64,
    highest_package: f64,
}

/// Top-N recruiter leaderboard over the subset. Descending by total
/// placements, ties ascending by company name; fewer than N companies
/// returns all of them.
pub fn top_recruiters(records: &[PlacementRecord], limit: usize) -> Vec<RecruiterSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, RecruiterAccumulator> = HashMap::new();

    for record in records {
        for cp in &record.company_placements {
            let entry = totals
                .entry(cp.company.clone())
                .or_insert_with(|| {
                    order.push(cp.company.clone());
                    RecruiterAccumulator {
                        // Sector and tier are assumed stable per company;
                        // first occurrence wins.
                        sector: cp.sector.clone(),
                        tier: cp.tier,
                        total_placements: 0,
                        package_sum: 0.0,
                        highest_package: 0.0,
                    }
                });
            entry.total_placements += cp.placements;
            entry.package_sum += cp.avg_package * cp.placements as f64;
            entry.highest_package = entry.highest_package.max(cp.highest_package);
        }
    }

    let mut summaries: Vec<RecruiterSummary> = order
        .into_iter()
        .map(|company| {
            let acc = &totals[&company];
            let avg_package = if acc.total_placements == 0 {
                0.0
            } else {
                round2(acc.package_sum / acc.total_placements as f64)
            };
            RecruiterSummary {
                company,
                sector: acc.sector.clone(),
                tier: acc.tier,
                total_placements: acc.total_placements,
                avg_package,
                highest_package: acc.highest_package,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_placements
            .cmp(&a.total_placements)
            .then_with(|| a.company.cmp(&b.company))
    });
    summaries.truncate(limit);
    summaries
}

struct ProfileAccumulator {
    sector: String,
    tier: Tier,
    total_hires: u32,
    package_sum: f64,
    min_package: f64,
    max_package: f64,
    colleges: HashSet<u32>,
    branches: HashSet<String>,
}

/// Per-company hiring profiles across the subset, optionally narrowed by a
/// case-insensitive name substring and an exact sector. Sorted descending by
/// hires.
pub fn company_profiles(
    records: &[PlacementRecord],
    name_query: Option<&str>,
    sector: Option<&str>,
) -> Vec<CompanyProfile> {
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, ProfileAccumulator> = HashMap::new();

    for record in records {
        for cp in &record.company_placements {
            let entry = stats.entry(cp.company.clone()).or_insert_with(|| {
                order.push(cp.company.clone());
                ProfileAccumulator {
                    sector: cp.sector.clone(),
                    tier: cp.tier,
                    total_hires: 0,
                    package_sum: 0.0,
                    min_package: f64::INFINITY,
                    max_package: 0.0,
                    colleges: HashSet::new(),
                    branches: HashSet::new(),
                }
            });
            entry.total_hires += cp.placements;
            entry.package_sum += cp.avg_package * cp.placements as f64;
            entry.min_package = entry.min_package.min(cp.avg_package);
            entry.max_package = entry.max_package.max(cp.avg_package);
            entry.colleges.insert(record.college_id);
            entry.branches.insert(record.branch.clone());
        }
    }

    let mut profiles: Vec<CompanyProfile> = order
        .into_iter()
        .map(|name| {
            let acc = &stats[&name];
            let avg_package = if acc.total_hires == 0 {
                0.0
            } else {
                round2(acc.package_sum / acc.total_hires as f64)
            };
            CompanyProfile {
                name,
                sector: acc.sector.clone(),
                tier: acc.tier,
                total_hires: acc.total_hires,
                avg_package,
                min_package: if acc.min_package.is_finite() {
                    acc.min_package
                } else {
                    0.0
                },
                max_package: acc.max_package,
                college_count: acc.colleges.len(),
                branch_count: acc.branches.len(),
            }
        })
        .collect();

    if let Some(query) = name_query {
        let query = query.to_lowercase();
        profiles.retain(|p| p.name.to_lowercase().contains(&query));
    }
    if let Some(sector) = sector {
        profiles.retain(|p| p.sector == sector);
    }

    profiles.sort_by(|a, b| {
        b.total_hires
            .cmp(&a.total_hires)
            .then_with(|| a.name.cmp(&b.name))
    });
    profiles
}

struct SectorAccumulator {
    placements: u32,
    package_sum: f64,
    companies: HashSet<String>,
}

/// Placements, distinct company count and placements-weighted average
/// package per sector, in first-encounter order.
pub fn sector_breakdown(records: &[PlacementRecord]) -> Vec<SectorSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, SectorAccumulator> = HashMap::new();

    for record in records {
        for cp in &record.company_placements {
            let entry = stats.entry(cp.sector.clone()).or_insert_with(|| {
                order.push(cp.sector.clone());
                SectorAccumulator {
                    placements: 0,
                    package_sum: 0.0,
                    companies: HashSet::new(),
                }
            });
            entry.placements += cp.placements;
            entry.package_sum += cp.avg_package * cp.placements as f64;
            entry.companies.insert(cp.company.clone());
        }
    }

    order
        .into_iter()
        .map(|sector| {
            let acc = &stats[&sector];
            SectorSummary {
                sector,
                placements: acc.placements,
                avg_package: if acc.placements == 0 {
                    0.0
                } else {
                    round2(acc.package_sum / acc.placements as f64)
                },
                companies: acc.companies.len(),
            }
        })
        .collect()
}

const PACKAGE_RANGES: [(&str, f64, f64); 5] = [
    ("0-10 LPA", 0.0, 10.0),
    ("10-20 LPA", 10.0, 20.0),
    ("20-50 LPA", 20.0, 50.0),
    ("50-100 LPA", 50.0, 100.0),
    ("100+ LPA", 100.0, f64::INFINITY),
];

/// Buckets company placements into fixed LPA ranges by their average
/// package; empty buckets are dropped.
pub fn package_distribution(records: &[PlacementRecord]) -> Vec<PackageBucket> {
    let mut counts = [0u32; PACKAGE_RANGES.len()];

    for record in records {
        for cp in &record.company_placements {
            for (i, (_, min, max)) in PACKAGE_RANGES.iter().enumerate() {
                if cp.avg_package >= *min && cp.avg_package < *max {
                    counts[i] += cp.placements;
                }
            }
        }
    }

    PACKAGE_RANGES
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(&(range, _, _), count)| PackageBucket { range, count })
        .collect()
}
