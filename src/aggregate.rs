use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{AggregatedView, College, GrowthMetrics, HeadlineStats, PlacementRecord, TypeBreakdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    College,
    Branch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortPolicy {
    PlacementRate,
    AvgPackage,
    TotalStudents,
    Alphabetical,
}

impl std::fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortPolicy::PlacementRate => "placement-rate",
            SortPolicy::AvgPackage => "avg-package",
            SortPolicy::TotalStudents => "total-students",
            SortPolicy::Alphabetical => "alphabetical",
        };
        write!(f, "{name}")
    }
}

/// Percentage of placed students, rounded. A zero-student group is 0, never
/// NaN or infinity.
pub fn placement_rate(placed: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        (100.0 * placed as f64 / total as f64).round() as u32
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reduces a record subset into one view per group. Groups come out in
/// first-encounter order; callers apply a sort policy on top.
pub fn aggregate(
    records: &[PlacementRecord],
    group_by: GroupBy,
    colleges: &BTreeMap<u32, College>,
) -> Vec<AggregatedView> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&PlacementRecord>> = HashMap::new();

    for record in records {
        let key = match group_by {
            GroupBy::College => college_name(colleges, record.college_id),
            GroupBy::Branch => record.branch.clone(),
        };
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(record);
    }

    order
        .into_iter()
        .map(|key| {
            let members = &groups[&key];
            let college_id = match group_by {
                GroupBy::College => members.first().map(|r| r.college_id),
                GroupBy::Branch => None,
            };
            reduce_group(key, college_id, members)
        })
        .collect()
}

fn reduce_group(
    group: String,
    college_id: Option<u32>,
    members: &[&PlacementRecord],
) -> AggregatedView {
    let total_students: u32 = members.iter().map(|r| r.total_students).sum();
    let placed_students: u32 = members.iter().map(|r| r.placed_students).sum();

    // Simple mean of per-record packages, not weighted by group size.
    let avg_package = if members.is_empty() {
        0.0
    } else {
        round2(members.iter().map(|r| r.avg_package).sum::<f64>() / members.len() as f64)
    };
    let highest_package = members
        .iter()
        .map(|r| r.highest_package)
        .fold(0.0_f64, f64::max);

    let mut companies: HashSet<&str> = HashSet::new();
    let mut recruiter_order: Vec<&str> = Vec::new();
    let mut recruiter_totals: HashMap<&str, u32> = HashMap::new();
    for record in members {
        for cp in &record.company_placements {
            companies.insert(cp.company.as_str());
            if !recruiter_totals.contains_key(cp.company.as_str()) {
                recruiter_order.push(cp.company.as_str());
            }
            *recruiter_totals.entry(cp.company.as_str()).or_insert(0) += cp.placements;
        }
    }

    // Ties go to the company seen first in record order.
    let mut top_recruiter: Option<&str> = None;
    let mut top_placements = 0u32;
    for company in &recruiter_order {
        let placements = recruiter_totals[company];
        if placements > top_placements {
            top_placements = placements;
            top_recruiter = Some(company);
        }
    }

    AggregatedView {
        group,
        college_id,
        total_students,
        placed_students,
        placement_rate: placement_rate(placed_students, total_students),
        avg_package,
        highest_package,
        total_companies: companies.len(),
        top_recruiter: top_recruiter.map(str::to_string),
    }
}

/// Stable sort; equal keys keep their relative input order.
pub fn sort_views(views: &mut [AggregatedView], policy: SortPolicy) {
    match policy {
        SortPolicy::PlacementRate => {
            views.sort_by(|a, b| b.placement_rate.cmp(&a.placement_rate));
        }
        SortPolicy::AvgPackage => {
            views.sort_by(|a, b| {
                b.avg_package
                    .partial_cmp(&a.avg_package)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        SortPolicy::TotalStudents => {
            views.sort_by(|a, b| b.total_students.cmp(&a.total_students));
        }
        SortPolicy::Alphabetical => {
            views.sort_by(|a, b| a.group.cmp(&b.group));
        }
    }
}

/// Headline figures across the whole record set.
pub fn headline_stats(
    records: &[PlacementRecord],
    colleges: &BTreeMap<u32, College>,
) -> HeadlineStats {
    let total_students: u32 = records.iter().map(|r| r.total_students).sum();
    let placed_students: u32 = records.iter().map(|r| r.placed_students).sum();
    let avg_package = if records.is_empty() {
        0.0
    } else {
        round2(records.iter().map(|r| r.avg_package).sum::<f64>() / records.len() as f64)
    };
    let highest_package = records
        .iter()
        .map(|r| r.highest_package)
        .fold(0.0_f64, f64::max);
    let companies: HashSet<&str> = records
        .iter()
        .flat_map(|r| r.company_placements.iter())
        .map(|cp| cp.company.as_str())
        .collect();
    let internship_offers: u32 = records.iter().map(|r| r.internship_offers).sum();
    let higher_studies: u32 = records.iter().map(|r| r.higher_studies).sum();

    HeadlineStats {
        total_colleges: colleges.len(),
        total_records: records.len(),
        total_students,
        placed_students,
        unplaced_students: total_students.saturating_sub(placed_students),
        placement_rate: placement_rate(placed_students, total_students),
        avg_package,
        highest_package,
        total_companies: companies.len(),
        internship_offers,
        higher_studies,
    }
}

/// Rolls per-college views up by college type. Placement rate comes from the
/// summed cohorts; avg package is the mean of the per-college means.
pub fn type_breakdown(
    college_views: &[AggregatedView],
    colleges: &BTreeMap<u32, College>,
) -> Vec<TypeBreakdown> {
    let mut order = Vec::new();
    let mut stats: HashMap<String, (usize, u32, u32, f64)> = HashMap::new();

    for view in college_views {
        let Some(college) = view.college_id.and_then(|id| colleges.get(&id)) else {
            continue;
        };
        let key = college.college_type.to_string();
        if !stats.contains_key(&key) {
            order.push((key.clone(), college.college_type));
        }
        let entry = stats.entry(key).or_insert((0, 0, 0, 0.0));
        entry.0 += 1;
        entry.1 += view.total_students;
        entry.2 += view.placed_students;
        entry.3 += view.avg_package;
    }

    order
        .into_iter()
        .map(|(key, college_type)| {
            let (count, total, placed, package_sum) = stats[&key];
            TypeBreakdown {
                college_type,
                colleges: count,
                total_students: total,
                placed_students: placed,
                placement_rate: placement_rate(placed, total),
                avg_package: round2(package_sum / count as f64),
            }
        })
        .collect()
}

/// Mean placement-rate and package deltas versus the previous year. Either
/// side empty yields zero growth.
pub fn year_over_year(records: &[PlacementRecord], year: u16) -> GrowthMetrics {
    fn means(records: &[PlacementRecord], year: u16) -> Option<(f64, f64)> {
        let subset: Vec<&PlacementRecord> = records.iter().filter(|r| r.year == year).collect();
        if subset.is_empty() {
            return None;
        }
        let rate = subset
            .iter()
            .map(|r| {
                if r.total_students == 0 {
                    0.0
                } else {
                    100.0 * r.placed_students as f64 / r.total_students as f64
                }
            })
            .sum::<f64>()
            / subset.len() as f64;
        let package = subset.iter().map(|r| r.avg_package).sum::<f64>() / subset.len() as f64;
        Some((rate, package))
    }

    match (means(records, year), means(records, year.saturating_sub(1))) {
        (Some((rate, package)), Some((prev_rate, prev_package))) => GrowthMetrics {
            placement_growth: rate - prev_rate,
            package_growth: package - prev_package,
        },
        _ => GrowthMetrics {
            placement_growth: 0.0,
            package_growth: 0.0,
        },
    }
}

fn college_name(colleges: &BTreeMap<u32, College>, id: u32) -> String {
    colleges
        .get(&id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("College {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyPlacement, Tier};

    fn record(college_id: u32, year: u16, total: u32, placed: u32, avg: f64) -> PlacementRecord {
        PlacementRecord {
            college_id,
            branch: "Computer Science".to_string(),
            year,
            total_students: total,
            placed_students: placed,
            avg_package: avg,
            highest_package: avg * 2.0,
            min_cgpa: 6.5,
            internship_offers: 0,
            higher_studies: 0,
            company_placements: Vec::new(),
        }
    }

    fn cp(company: &str, placements: u32) -> CompanyPlacement {
        CompanyPlacement {
            company: company.to_string(),
            sector: "IT Services".to_string(),
            tier: Tier::Tier1,
            placements,
            avg_package: 10.0,
            highest_package: 20.0,
        }
    }

    fn catalog() -> BTreeMap<u32, College> {
        use crate::models::CollegeType;
        let mut map = BTreeMap::new();
        for (id, name) in [(1, "Alpha College"), (2, "Beta College")] {
            map.insert(
                id,
                College {
                    id,
                    name: name.to_string(),
                    college_type: if id == 1 {
                        CollegeType::Government
                    } else {
                        CollegeType::Private
                    },
                    location: "Pune".to_string(),
                    ranking: id,
                    established: 1960,
                    total_students: 5000,
                    placement_officer: "Officer".to_string(),
                },
            );
        }
        map
    }

    #[test]
    fn rate_follows_rounded_ratio() {
        assert_eq!(placement_rate(80, 100), 80);
        assert_eq!(placement_rate(50, 50), 100);
        assert_eq!(placement_rate(1, 3), 33);
        assert_eq!(placement_rate(2, 3), 67);
        assert_eq!(placement_rate(0, 0), 0);
    }

    #[test]
    fn two_college_ranking_scenario() {
        let records = vec![record(1, 2024, 100, 80, 10.0), record(2, 2024, 50, 50, 8.0)];
        let mut views = aggregate(&records, GroupBy::College, &catalog());
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].group, "Alpha College");
        assert_eq!(views[0].placement_rate, 80);
        assert_eq!(views[1].placement_rate, 100);

        sort_views(&mut views, SortPolicy::PlacementRate);
        assert_eq!(views[0].group, "Beta College");
        assert_eq!(views[1].group, "Alpha College");
    }

    #[test]
    fn avg_package_is_unweighted_mean() {
        let records = vec![record(1, 2023, 1000, 900, 10.0), record(1, 2024, 10, 9, 20.0)];
        let views = aggregate(&records, GroupBy::College, &catalog());
        assert_eq!(views.len(), 1);
        // Mean of the record means, regardless of cohort sizes.
        assert_eq!(views[0].avg_package, 15.0);
    }

    #[test]
    fn top_recruiter_tie_goes_to_first_encountered() {
        let mut a = record(1, 2024, 100, 80, 10.0);
        a.company_placements = vec![cp("Zeta Corp", 10), cp("Acme Ltd", 10)];
        let views = aggregate(&[a], GroupBy::College, &catalog());
        assert_eq!(views[0].top_recruiter.as_deref(), Some("Zeta Corp"));
        assert_eq!(views[0].total_companies, 2);
    }

    #[test]
    fn zero_student_group_has_zero_rate() {
        let records = vec![record(1, 2024, 0, 0, 0.0)];
        let views = aggregate(&records, GroupBy::College, &catalog());
        assert_eq!(views[0].placement_rate, 0);
    }

    #[test]
    fn sorts_are_stable() {
        let mut views = aggregate(
            &[
                record(1, 2024, 100, 80, 10.0),
                record(2, 2024, 50, 40, 12.0),
            ],
            GroupBy::College,
            &catalog(),
        );
        // Both groups land at 80%; input order must survive the sort.
        assert!(views.iter().all(|v| v.placement_rate == 80));
        sort_views(&mut views, SortPolicy::PlacementRate);
        assert_eq!(views[0].group, "Alpha College");
        assert_eq!(views[1].group, "Beta College");
    }

    #[test]
    fn branch_grouping_carries_no_college_id() {
        let records = vec![record(1, 2024, 100, 80, 10.0)];
        let views = aggregate(&records, GroupBy::Branch, &catalog());
        assert_eq!(views[0].group, "Computer Science");
        assert_eq!(views[0].college_id, None);
    }

    #[test]
    fn headline_counts_distinct_companies() {
        let mut a = record(1, 2024, 100, 80, 10.0);
        a.company_placements = vec![cp("Acme Ltd", 5), cp("Zeta Corp", 5)];
        let mut b = record(2, 2024, 100, 70, 8.0);
        b.company_placements = vec![cp("Acme Ltd", 4)];
        let stats = headline_stats(&[a, b], &catalog());
        assert_eq!(stats.total_companies, 2);
        assert_eq!(stats.total_students, 200);
        assert_eq!(stats.placement_rate, 75);
        assert_eq!(stats.avg_package, 9.0);
    }

    #[test]
    fn headline_sums_unplaced_internships_and_higher_studies() {
        let mut a = record(1, 2024, 100, 80, 10.0);
        a.internship_offers = 12;
        a.higher_studies = 5;
        let mut b = record(2, 2024, 50, 40, 8.0);
        b.internship_offers = 8;
        b.higher_studies = 3;
        let stats = headline_stats(&[a, b], &catalog());
        assert_eq!(stats.unplaced_students, 30);
        assert_eq!(stats.internship_offers, 20);
        assert_eq!(stats.higher_studies, 8);
    }

    #[test]
    fn type_breakdown_splits_government_and_private() {
        let records = vec![record(1, 2024, 100, 80, 10.0), record(2, 2024, 50, 50, 8.0)];
        let views = aggregate(&records, GroupBy::College, &catalog());
        let breakdown = type_breakdown(&views, &catalog());
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].colleges, 1);
        assert_eq!(breakdown[0].placement_rate, 80);
        assert_eq!(breakdown[1].placement_rate, 100);
    }

    #[test]
    fn growth_is_zero_without_a_previous_year() {
        let records = vec![record(1, 2024, 100, 80, 10.0)];
        let growth = year_over_year(&records, 2024);
        assert_eq!(growth.placement_growth, 0.0);
        assert_eq!(growth.package_growth, 0.0);
    }

    #[test]
    fn growth_compares_yearly_means() {
        let records = vec![record(1, 2023, 100, 70, 10.0), record(1, 2024, 100, 80, 12.0)];
        let growth = year_over_year(&records, 2024);
        assert!((growth.placement_growth - 10.0).abs() < 1e-9);
        assert!((growth.package_growth - 2.0).abs() < 1e-9);
    }
}
