use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, GroupBy, SortPolicy};
use crate::models::{AggregatedView, College, PlacementRecord};
use crate::recruiters;
use crate::trends;

/// Fixed export shape for the college view. Column order and naming are a
/// stable contract; external consumers round-trip these files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeCsvRow {
    #[serde(rename = "College")]
    pub college: String,
    #[serde(rename = "Type")]
    pub college_type: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "TotalStudents")]
    pub total_students: u32,
    #[serde(rename = "PlacedStudents")]
    pub placed_students: u32,
    #[serde(rename = "PlacementRate")]
    pub placement_rate: u32,
    #[serde(rename = "AvgPackage")]
    pub avg_package: f64,
    #[serde(rename = "HighestPackage")]
    pub highest_package: f64,
    #[serde(rename = "TopRecruiter")]
    pub top_recruiter: String,
}

pub fn college_csv_rows(
    views: &[AggregatedView],
    colleges: &BTreeMap<u32, College>,
) -> Vec<CollegeCsvRow> {
    views
        .iter()
        .map(|view| {
            let college = view.college_id.and_then(|id| colleges.get(&id));
            CollegeCsvRow {
                college: view.group.clone(),
                college_type: college
                    .map(|c| c.college_type.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                location: college
                    .map(|c| c.location.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                total_students: view.total_students,
                placed_students: view.placed_students,
                placement_rate: view.placement_rate,
                avg_package: view.avg_package,
                highest_package: view.highest_package,
                top_recruiter: view
                    .top_recruiter
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
            }
        })
        .collect()
}

pub fn write_college_csv<W: std::io::Write>(
    writer: W,
    rows: &[CollegeCsvRow],
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_college_csv<R: std::io::Read>(reader: R) -> anyhow::Result<Vec<CollegeCsvRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in reader.deserialize::<CollegeCsvRow>() {
        rows.push(result.context("malformed college csv row")?);
    }
    Ok(rows)
}

/// Markdown summary across the record set: headline stats, college ranking,
/// recruiter leaderboard, multi-year trend.
pub fn build_report(records: &[PlacementRecord], colleges: &BTreeMap<u32, College>) -> String {
    let stats = aggregate::headline_stats(records, colleges);
    let mut views = aggregate::aggregate(records, GroupBy::College, colleges);
    aggregate::sort_views(&mut views, SortPolicy::PlacementRate);
    let recruiters = recruiters::top_recruiters(records, 10);
    let trend = trends::trend_points(records, None);

    let mut output = String::new();
    let today = chrono::Utc::now().date_naive();

    let _ = writeln!(output, "# Placement Statistics Report");
    let _ = writeln!(output, "Generated on {today}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline");
    let _ = writeln!(
        output,
        "- {} records across {} colleges",
        stats.total_records, stats.total_colleges
    );
    let _ = writeln!(
        output,
        "- {} of {} students placed ({}%), {} unplaced",
        stats.placed_students, stats.total_students, stats.placement_rate,
        stats.unplaced_students
    );
    let _ = writeln!(
        output,
        "- {} internship offers, {} pursuing higher studies",
        stats.internship_offers, stats.higher_studies
    );
    let _ = writeln!(
        output,
        "- Average package {:.2} LPA, highest {:.2} LPA, {} recruiting companies",
        stats.avg_package, stats.highest_package, stats.total_companies
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## College Ranking");
    if views.is_empty() {
        let _ = writeln!(output, "No placement records in this dataset.");
    } else {
        for view in views.iter().take(10) {
            let _ = writeln!(
                output,
                "- {}: {}% placed ({} of {}), avg {:.2} LPA, top recruiter {}",
                view.group,
                view.placement_rate,
                view.placed_students,
                view.total_students,
                view.avg_package,
                view.top_recruiter.as_deref().unwrap_or("N/A")
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Recruiters");
    if recruiters.is_empty() {
        let _ = writeln!(output, "No company placements recorded.");
    } else {
        for summary in &recruiters {
            let _ = writeln!(
                output,
                "- {} ({}, {}): {} placements, avg {:.2} LPA, highest {:.2} LPA",
                summary.company,
                summary.sector,
                summary.tier,
                summary.total_placements,
                summary.avg_package,
                summary.highest_package
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Yearly Trend");
    if trend.is_empty() {
        let _ = writeln!(output, "No placement records in this dataset.");
    } else {
        for point in &trend {
            let _ = writeln!(
                output,
                "- {}: {}% placed, avg {:.2} LPA, highest {:.2} LPA",
                point.year, point.placement_rate, point.avg_package, point.highest_package
            );
        }
    }

    output
}
