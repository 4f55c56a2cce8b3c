use std::collections::BTreeSet;

use crate::aggregate::{placement_rate, round2};
use crate::models::{PlacementRecord, TrendPoint};

/// Multi-year series of aggregate metrics, optionally scoped to one college.
/// Years without matching records are omitted, not zero-filled; the output
/// is ascending by year.
pub fn trend_points(records: &[PlacementRecord], college_id: Option<u32>) -> Vec<TrendPoint> {
    let scoped: Vec<&PlacementRecord> = records
        .iter()
        .filter(|r| college_id.map_or(true, |id| r.college_id == id))
        .collect();

    let years: BTreeSet<u16> = scoped.iter().map(|r| r.year).collect();

    years
        .into_iter()
        .map(|year| {
            let members: Vec<&&PlacementRecord> =
                scoped.iter().filter(|r| r.year == year).collect();
            let total: u32 = members.iter().map(|r| r.total_students).sum();
            let placed: u32 = members.iter().map(|r| r.placed_students).sum();
            let avg_package =
                round2(members.iter().map(|r| r.avg_package).sum::<f64>() / members.len() as f64);
            let highest_package = members
                .iter()
                .map(|r| r.highest_package)
                .fold(0.0_f64, f64::max);
            TrendPoint {
                year,
                placement_rate: placement_rate(placed, total),
                avg_package,
                highest_package,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn missing_years_are_omitted() {
        let records = vec![record(1, 2021, 100, 80, 10.0), record(1, 2023, 100, 90, 12.0)];
        let points = trend_points(&records, Some(1));
        let years: Vec<u16> = points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2021, 2023]);
    }

    #[test]
    fn years_come_out_ascending() {
        let records = vec![
            record(1, 2024, 100, 80, 10.0),
            record(1, 2020, 100, 70, 8.0),
            record(1, 2022, 100, 75, 9.0),
        ];
        let points = trend_points(&records, None);
        let years: Vec<u16> = points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2022, 2024]);
    }

    #[test]
    fn scope_excludes_other_colleges() {
        let records = vec![record(1, 2022, 100, 80, 10.0), record(2, 2023, 100, 90, 12.0)];
        let points = trend_points(&records, Some(1));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].year, 2022);
    }

    #[test]
    fn point_uses_per_year_reduction() {
        let records = vec![record(1, 2023, 100, 80, 10.0), record(2, 2023, 100, 60, 14.0)];
        let points = trend_points(&records, None);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].placement_rate, 70);
        assert_eq!(points[0].avg_package, 12.0);
        assert_eq!(points[0].highest_package, 28.0);
    }

    #[test]
    fn unknown_college_yields_empty_series() {
        let records = vec![record(1, 2023, 100, 80, 10.0)];
        assert!(trend_points(&records, Some(99)).is_empty());
    }
}
