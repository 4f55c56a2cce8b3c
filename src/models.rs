use serde::{Deserialize, Serialize};

/// Supported observation window for placement records.
pub const YEAR_MIN: u16 = 2020;
pub const YEAR_MAX: u16 = 2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum CollegeType {
    Government,
    Private,
}

impl std::fmt::Display for CollegeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollegeType::Government => write!(f, "Government"),
            CollegeType::Private => write!(f, "Private"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Tier 1")]
    Tier1,
    #[serde(rename = "Tier 2")]
    Tier2,
    #[serde(rename = "Tier 3")]
    Tier3,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Tier1 => write!(f, "Tier 1"),
            Tier::Tier2 => write!(f, "Tier 2"),
            Tier::Tier3 => write!(f, "Tier 3"),
        }
    }
}

/// Reference catalog entry, immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct College {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub college_type: CollegeType,
    pub location: String,
    pub ranking: u32,
    pub established: u16,
    pub total_students: u32,
    pub placement_officer: String,
}

/// Per-company hiring breakdown nested in a placement record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyPlacement {
    pub company: String,
    pub sector: String,
    pub tier: Tier,
    pub placements: u32,
    pub avg_package: f64,
    pub highest_package: f64,
}

/// One (college, branch, year) observation. Packages are in LPA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub college_id: u32,
    pub branch: String,
    pub year: u16,
    pub total_students: u32,
    #[serde(alias = "offers")]
    pub placed_students: u32,
    pub avg_package: f64,
    pub highest_package: f64,
    pub min_cgpa: f64,
    #[serde(default)]
    pub internship_offers: u32,
    #[serde(default)]
    pub higher_studies: u32,
    #[serde(default)]
    pub company_placements: Vec<CompanyPlacement>,
}

/// Derived per-group metrics. `college_id` is set only for college grouping.
#[derive(Debug, Clone)]
pub struct AggregatedView {
    pub group: String,
    pub college_id: Option<u32>,
    pub total_students: u32,
    pub placed_students: u32,
    pub placement_rate: u32,
    pub avg_package: f64,
    pub highest_package: f64,
    pub total_companies: usize,
    pub top_recruiter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub year: u16,
    pub placement_rate: u32,
    pub avg_package: f64,
    pub highest_package: f64,
}

#[derive(Debug, Clone)]
pub struct RecruiterSummary {
    pub company: String,
    pub sector: String,
    pub tier: Tier,
    pub total_placements: u32,
    pub avg_package: f64,
    pub highest_package: f64,
}

#[derive(Debug, Clone)]
pub struct HeadlineStats {
    pub total_colleges: usize,
    pub total_records: usize,
    pub total_students: u32,
    pub placed_students: u32,
    pub unplaced_students: u32,
    pub placement_rate: u32,
    pub avg_package: f64,
    pub highest_package: f64,
    pub total_companies: usize,
    pub internship_offers: u32,
    pub higher_studies: u32,
}

#[derive(Debug, Clone)]
pub struct TypeBreakdown {
    pub college_type: CollegeType,
    pub colleges: usize,
    pub total_students: u32,
    pub placed_students: u32,
    pub placement_rate: u32,
    pub avg_package: f64,
}

#[derive(Debug, Clone)]
pub struct SectorSummary {
    pub sector: String,
    pub placements: u32,
    pub avg_package: f64,
    pub companies: usize,
}

#[derive(Debug, Clone)]
pub struct CompanyProfile {
    pub name: String,
    pub sector: String,
    pub tier: Tier,
    pub total_hires: u32,
    pub avg_package: f64,
    pub min_package: f64,
    pub max_package: f64,
    pub college_count: usize,
    pub branch_count: usize,
}

#[derive(Debug, Clone)]
pub struct PackageBucket {
    pub range: &'static str,
    pub count: u32,
}

/// Year-over-year deltas of mean placement rate and mean package.
#[derive(Debug, Clone)]
pub struct GrowthMetrics {
    pub placement_growth: f64,
    pub package_growth: f64,
}

#[derive(Debug, Clone)]
pub struct StudentProfile {
    pub college_id: u32,
    pub branch: String,
    pub cgpa: f64,
    pub projects: u32,
    pub internships: u32,
    pub certifications: u32,
    pub skills: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Info,
    Success,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub probability: u32,
    pub expected_package: f64,
    pub avg_college_placement: u32,
    pub recommendations: Vec<Recommendation>,
}
