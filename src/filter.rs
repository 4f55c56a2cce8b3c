use std::collections::BTreeMap;

use crate::models::{College, CollegeType, PlacementRecord};

/// Recognized filter options. All absent options mean "no filter"; options
/// combine by logical AND.
#[derive(Debug, Default, Clone)]
pub struct FilterOptions {
    pub year: Option<u16>,
    pub college_type: Option<CollegeType>,
    pub branch: Option<String>,
    pub min_cgpa: Option<f64>,
    pub min_package: Option<f64>,
    pub max_package: Option<f64>,
    pub search_text: Option<String>,
}

/// Parses a numeric bound from raw UI input. Empty or non-numeric input is
/// "no bound", never zero.
pub fn numeric_bound(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// Normalizes a branch selection; the UI sends "all" for no filter.
pub fn branch_option(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Filters records, preserving input order. College-scoped options
/// (type, search text) are evaluated against the record's college.
pub fn filter_records(
    records: &[PlacementRecord],
    colleges: &BTreeMap<u32, College>,
    options: &FilterOptions,
) -> Vec<PlacementRecord> {
    records
        .iter()
        .filter(|record| {
            if let Some(year) = options.year {
                if record.year != year {
                    return false;
                }
            }
            if let Some(branch) = &options.branch {
                if &record.branch != branch {
                    return false;
                }
            }
            if let Some(bound) = options.min_cgpa {
                if record.min_cgpa < bound {
                    return false;
                }
            }
            if let Some(bound) = options.min_package {
                if record.avg_package < bound {
                    return false;
                }
            }
            if let Some(bound) = options.max_package {
                if record.avg_package > bound {
                    return false;
                }
            }
            let college = colleges.get(&record.college_id);
            if let Some(wanted) = options.college_type {
                match college {
                    Some(college) if college.college_type == wanted => {}
                    _ => return false,
                }
            }
            if let Some(query) = &options.search_text {
                match college {
                    Some(college) if college_matches(college, query) => {}
                    _ => return false,
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// Filters the college catalog, preserving input order.
pub fn filter_colleges(colleges: &[College], options: &FilterOptions) -> Vec<College> {
    colleges
        .iter()
        .filter(|college| {
            if let Some(wanted) = options.college_type {
                if college.college_type != wanted {
                    return false;
                }
            }
            if let Some(query) = &options.search_text {
                if !college_matches(college, query) {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// Case-insensitive substring match over name, location, type and placement
/// officer; any field containing the query is a hit.
fn college_matches(college: &College, query: &str) -> bool {
    let query = query.to_lowercase();
    [
        college.name.as_str(),
        college.location.as_str(),
        &college.college_type.to_string(),
        college.placement_officer.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&query))
}
