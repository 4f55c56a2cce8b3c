use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod aggregate;
mod filter;
mod models;
mod predict;
mod recruiters;
mod report;
mod store;
mod trends;

use crate::aggregate::{GroupBy, SortPolicy};
use crate::filter::FilterOptions;
use crate::models::{CollegeType, PlacementRecord, StudentProfile};
use crate::store::{Dataset, RecordStore};

#[derive(Parser)]
#[command(name = "placement-stats")]
#[command(about = "Placement statistics aggregation and prediction engine", long_about = None)]
struct Cli {
    /// JSON dataset path; falls back to $PLACEMENT_DATA, then the built-in seed
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FilterArgs {
    #[arg(long)]
    year: Option<u16>,
    #[arg(long, value_enum)]
    college_type: Option<CollegeType>,
    /// Branch name; "all" or empty means no filter
    #[arg(long)]
    branch: Option<String>,
    /// Lower bound on the record's CGPA cutoff; non-numeric input is ignored
    #[arg(long)]
    min_cgpa: Option<String>,
    /// Inclusive lower bound on average package (LPA)
    #[arg(long)]
    min_package: Option<String>,
    /// Inclusive upper bound on average package (LPA)
    #[arg(long)]
    max_package: Option<String>,
    /// Substring match on college name, location, type or placement officer
    #[arg(long)]
    search: Option<String>,
}

impl FilterArgs {
    fn options(&self) -> FilterOptions {
        FilterOptions {
            year: self.year,
            college_type: self.college_type,
            branch: self.branch.as_deref().and_then(filter::branch_option),
            min_cgpa: self.min_cgpa.as_deref().and_then(filter::numeric_bound),
            min_package: self.min_package.as_deref().and_then(filter::numeric_bound),
            max_package: self.max_package.as_deref().and_then(filter::numeric_bound),
            search_text: self.search.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ranked per-college placement view
    Colleges {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = SortPolicy::PlacementRate)]
        sort_by: SortPolicy,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Per-branch placement view
    Branches {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = SortPolicy::PlacementRate)]
        sort_by: SortPolicy,
    },
    /// College directory with catalog details
    Directory {
        #[arg(long, value_enum)]
        college_type: Option<CollegeType>,
        /// Substring match on college name, location, type or placement officer
        #[arg(long)]
        search: Option<String>,
    },
    /// Multi-year placement trend, optionally for one college
    Trends {
        #[arg(long)]
        college: Option<u32>,
    },
    /// Top recruiter leaderboard
    Recruiters {
        #[arg(long)]
        year: Option<u16>,
        #[arg(long)]
        college: Option<u32>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Sector breakdown and package distribution
    Sectors {
        #[arg(long)]
        year: Option<u16>,
        #[arg(long)]
        college: Option<u32>,
    },
    /// Per-company hiring profiles
    Companies {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        year: Option<u16>,
    },
    /// Year-over-year growth of placement rate and package
    Growth {
        #[arg(long)]
        year: u16,
    },
    /// Estimate placement probability for a student profile
    Predict {
        #[arg(long)]
        college: u32,
        #[arg(long)]
        branch: String,
        #[arg(long)]
        cgpa: f64,
        #[arg(long, default_value_t = 0)]
        projects: u32,
        #[arg(long, default_value_t = 0)]
        internships: u32,
        #[arg(long, default_value_t = 0)]
        certifications: u32,
        #[arg(long, default_value = "")]
        skills: String,
    },
    /// Headline statistics across the dataset
    Stats,
    /// Write the college view as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = SortPolicy::PlacementRate)]
        sort_by: SortPolicy,
        #[arg(long, default_value = "colleges.csv")]
        out: PathBuf,
    },
    /// Merge a flat admin CSV into the dataset and write the result
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "dataset.json")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let data_path = cli
        .data
        .or_else(|| std::env::var_os("PLACEMENT_DATA").map(PathBuf::from));
    let store = RecordStore::load(data_path.as_deref())?;

    match cli.command {
        Commands::Colleges {
            filters,
            sort_by,
            limit,
        } => {
            let subset = filter::filter_records(store.records(), store.colleges(), &filters.options());
            let mut views = aggregate::aggregate(&subset, GroupBy::College, store.colleges());
            aggregate::sort_views(&mut views, sort_by);
            if views.is_empty() {
                println!("No records match these filters.");
                return Ok(());
            }
            for (rank, view) in views.iter().take(limit).enumerate() {
                println!(
                    "{}. {} — {}% placed ({} of {}), avg {:.2} LPA, highest {:.2} LPA, top recruiter {}",
                    rank + 1,
                    view.group,
                    view.placement_rate,
                    view.placed_students,
                    view.total_students,
                    view.avg_package,
                    view.highest_package,
                    view.top_recruiter.as_deref().unwrap_or("N/A")
                );
            }
        }
        Commands::Branches { filters, sort_by } => {
            let subset = filter::filter_records(store.records(), store.colleges(), &filters.options());
            let mut views = aggregate::aggregate(&subset, GroupBy::Branch, store.colleges());
            aggregate::sort_views(&mut views, sort_by);
            if views.is_empty() {
                println!("No records match these filters.");
                return Ok(());
            }
            for view in &views {
                println!(
                    "- {}: {}% placed, avg {:.2} LPA, {} companies",
                    view.group, view.placement_rate, view.avg_package, view.total_companies
                );
            }
        }
        Commands::Directory {
            college_type,
            search,
        } => {
            let catalog: Vec<_> = store.colleges().values().cloned().collect();
            let options = FilterOptions {
                college_type,
                search_text: search,
                ..Default::default()
            };
            let matches = filter::filter_colleges(&catalog, &options);
            if matches.is_empty() {
                println!("No colleges match.");
                return Ok(());
            }
            for college in &matches {
                println!(
                    "{}. {} ({}, {}) — rank #{}, est. {}, {} students, officer {}",
                    college.id,
                    college.name,
                    college.college_type,
                    college.location,
                    college.ranking,
                    college.established,
                    college.total_students,
                    college.placement_officer
                );
            }
        }
        Commands::Trends { college } => {
            if let Some(id) = college {
                if store.college(id).is_none() {
                    println!("College {id} not found.");
                    return Ok(());
                }
            }
            let points = trends::trend_points(store.records(), college);
            if points.is_empty() {
                println!("No records in scope.");
                return Ok(());
            }
            for point in &points {
                println!(
                    "{}: {}% placed, avg {:.2} LPA, highest {:.2} LPA",
                    point.year, point.placement_rate, point.avg_package, point.highest_package
                );
            }
        }
        Commands::Recruiters {
            year,
            college,
            limit,
        } => {
            let subset = scoped_records(&store, year, college);
            let summaries = recruiters::top_recruiters(&subset, limit);
            if summaries.is_empty() {
                println!("No company placements in scope.");
                return Ok(());
            }
            for (rank, summary) in summaries.iter().enumerate() {
                println!(
                    "{}. {} ({}, {}): {} placements, avg {:.2} LPA, highest {:.2} LPA",
                    rank + 1,
                    summary.company,
                    summary.sector,
                    summary.tier,
                    summary.total_placements,
                    summary.avg_package,
                    summary.highest_package
                );
            }
        }
        Commands::Sectors { year, college } => {
            let subset = scoped_records(&store, year, college);
            let sectors = recruiters::sector_breakdown(&subset);
            if sectors.is_empty() {
                println!("No company placements in scope.");
                return Ok(());
            }
            for sector in &sectors {
                println!(
                    "- {}: {} companies, {} placements, avg {:.2} LPA",
                    sector.sector, sector.companies, sector.placements, sector.avg_package
                );
            }
            println!();
            println!("Package distribution:");
            for bucket in recruiters::package_distribution(&subset) {
                println!("- {}: {} placements", bucket.range, bucket.count);
            }
        }
        Commands::Companies {
            search,
            sector,
            year,
        } => {
            let subset = scoped_records(&store, year, None);
            let profiles =
                recruiters::company_profiles(&subset, search.as_deref(), sector.as_deref());
            if profiles.is_empty() {
                println!("No companies match.");
                return Ok(());
            }
            for profile in &profiles {
                println!(
                    "- {} ({}, {}): {} hires across {} colleges / {} branches, avg {:.2} LPA ({:.2}-{:.2})",
                    profile.name,
                    profile.sector,
                    profile.tier,
                    profile.total_hires,
                    profile.college_count,
                    profile.branch_count,
                    profile.avg_package,
                    profile.min_package,
                    profile.max_package
                );
            }
        }
        Commands::Growth { year } => {
            let growth = aggregate::year_over_year(store.records(), year);
            println!(
                "{year} vs {}: placement {:+.1} pts, package {:+.2} LPA",
                year.saturating_sub(1),
                growth.placement_growth,
                growth.package_growth
            );
        }
        Commands::Predict {
            college,
            branch,
            cgpa,
            projects,
            internships,
            certifications,
            skills,
        } => {
            if store.college(college).is_none() {
                println!("College {college} not found.");
                return Ok(());
            }
            let profile = StudentProfile {
                college_id: college,
                branch,
                cgpa,
                projects,
                internships,
                certifications,
                skills,
            };
            match predict::predict(store.records(), &profile) {
                Some(prediction) => {
                    println!("Placement probability: {}%", prediction.probability);
                    println!("Expected package: {:.2} LPA", prediction.expected_package);
                    println!(
                        "College average placement: {}%",
                        prediction.avg_college_placement
                    );
                    println!("Recommendations:");
                    for rec in &prediction.recommendations {
                        println!("- [{}] {}", rec.severity, rec.text);
                    }
                }
                None => {
                    println!(
                        "Insufficient data: no records for this college and branch since 2022."
                    );
                }
            }
        }
        Commands::Stats => {
            let stats = aggregate::headline_stats(store.records(), store.colleges());
            println!(
                "{} records across {} colleges",
                stats.total_records, stats.total_colleges
            );
            println!(
                "{} of {} students placed ({}%), {} unplaced",
                stats.placed_students, stats.total_students, stats.placement_rate,
                stats.unplaced_students
            );
            println!(
                "{} internship offers, {} pursuing higher studies",
                stats.internship_offers, stats.higher_studies
            );
            println!(
                "Average package {:.2} LPA, highest {:.2} LPA, {} recruiting companies",
                stats.avg_package, stats.highest_package, stats.total_companies
            );
            let views = aggregate::aggregate(store.records(), GroupBy::College, store.colleges());
            for breakdown in aggregate::type_breakdown(&views, store.colleges()) {
                println!(
                    "- {}: {} colleges, {}% placed, avg {:.2} LPA",
                    breakdown.college_type,
                    breakdown.colleges,
                    breakdown.placement_rate,
                    breakdown.avg_package
                );
            }
        }
        Commands::Export {
            filters,
            sort_by,
            out,
        } => {
            let subset = filter::filter_records(store.records(), store.colleges(), &filters.options());
            let mut views = aggregate::aggregate(&subset, GroupBy::College, store.colleges());
            aggregate::sort_views(&mut views, sort_by);
            let rows = report::college_csv_rows(&views, store.colleges());
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            report::write_college_csv(file, &rows)?;
            println!("Wrote {} rows to {}.", rows.len(), out.display());
        }
        Commands::Import { csv, out } => {
            let imported = store::read_admin_csv(&csv, &store)?;
            let inserted = imported.len();
            let mut dataset = store.dataset();
            dataset.records.extend(imported);
            let merged = validate_merged(dataset)?;
            std::fs::write(&out, serde_json::to_string_pretty(&merged)?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Imported {inserted} records from {}; dataset written to {}.",
                csv.display(),
                out.display()
            );
        }
        Commands::Report { out } => {
            let report = report::build_report(store.records(), store.colleges());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn scoped_records(store: &RecordStore, year: Option<u16>, college: Option<u32>) -> Vec<PlacementRecord> {
    store
        .records()
        .iter()
        .filter(|r| year.map_or(true, |y| r.year == y))
        .filter(|r| college.map_or(true, |id| r.college_id == id))
        .cloned()
        .collect()
}

fn validate_merged(dataset: Dataset) -> anyhow::Result<Dataset> {
    // Revalidate the merged dataset before it is written out.
    RecordStore::from_dataset(dataset.clone())?;
    Ok(dataset)
}
