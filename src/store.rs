use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{
    College, CollegeType, CompanyPlacement, PlacementRecord, Tier, YEAR_MAX, YEAR_MIN,
};

/// On-disk dataset shape: reference catalogs plus the raw records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub colleges: Vec<College>,
    pub branches: Vec<String>,
    pub records: Vec<PlacementRecord>,
}

/// Immutable record store. Built once at startup, read-only afterwards.
pub struct RecordStore {
    colleges: BTreeMap<u32, College>,
    branches: Vec<String>,
    records: Vec<PlacementRecord>,
}

impl RecordStore {
    pub fn from_dataset(dataset: Dataset) -> anyhow::Result<Self> {
        let mut colleges = BTreeMap::new();
        for college in dataset.colleges {
            let id = college.id;
            if colleges.insert(id, college).is_some() {
                bail!("duplicate college id {id} in catalog");
            }
        }

        for record in &dataset.records {
            let Some(college) = colleges.get(&record.college_id) else {
                bail!(
                    "record references unknown college id {}",
                    record.college_id
                );
            };
            if !dataset.branches.iter().any(|b| b == &record.branch) {
                bail!(
                    "record for {} references branch {:?} outside the catalog",
                    college.name,
                    record.branch
                );
            }
            if record.year < YEAR_MIN || record.year > YEAR_MAX {
                bail!(
                    "record for {} has year {} outside {}-{}",
                    college.name,
                    record.year,
                    YEAR_MIN,
                    YEAR_MAX
                );
            }
            if record.placed_students > record.total_students {
                bail!(
                    "record for {} {} {}: placed {} exceeds total {}",
                    college.name,
                    record.branch,
                    record.year,
                    record.placed_students,
                    record.total_students
                );
            }

            // Advisory only: keep the record, flag the inconsistency.
            let company_sum: u32 = record.company_placements.iter().map(|cp| cp.placements).sum();
            if company_sum > record.placed_students {
                warn!(
                    college = %college.name,
                    branch = %record.branch,
                    year = record.year,
                    company_sum,
                    placed = record.placed_students,
                    "company placements sum past placed students"
                );
            }
        }

        info!(
            colleges = colleges.len(),
            records = dataset.records.len(),
            "record store loaded"
        );

        Ok(Self {
            colleges,
            branches: dataset.branches,
            records: dataset.records,
        })
    }

    /// Loads from a JSON dataset file, or the embedded seed when none given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read dataset {}", path.display()))?;
                let dataset: Dataset = serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse dataset {}", path.display()))?;
                Self::from_dataset(dataset)
            }
            None => Self::from_dataset(seed_dataset()),
        }
    }

    pub fn records(&self) -> &[PlacementRecord] {
        &self.records
    }

    pub fn colleges(&self) -> &BTreeMap<u32, College> {
        &self.colleges
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn college(&self, id: u32) -> Option<&College> {
        self.colleges.get(&id)
    }

    pub fn dataset(&self) -> Dataset {
        Dataset {
            colleges: self.colleges.values().cloned().collect(),
            branches: self.branches.clone(),
            records: self.records.clone(),
        }
    }
}

/// Reads flat admin-export rows and resolves college names against the
/// catalog. Imported rows carry no nested company data.
pub fn read_admin_csv(path: &Path, store: &RecordStore) -> anyhow::Result<Vec<PlacementRecord>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "College")]
        college: String,
        #[serde(rename = "Branch")]
        branch: String,
        #[serde(rename = "Year")]
        year: u16,
        #[serde(rename = "Offers")]
        offers: u32,
        #[serde(rename = "Avg Package")]
        avg_package: f64,
        #[serde(rename = "Highest Package")]
        highest_package: f64,
        #[serde(rename = "Min CGPA")]
        min_cgpa: f64,
        #[serde(rename = "Total Students")]
        total_students: u32,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let Some(college) = store
            .colleges()
            .values()
            .find(|c| c.name == row.college)
        else {
            bail!("import row references unknown college {:?}", row.college);
        };

        records.push(PlacementRecord {
            college_id: college.id,
            branch: row.branch,
            year: row.year,
            total_students: row.total_students,
            placed_students: row.offers,
            avg_package: row.avg_package,
            highest_package: row.highest_package,
            min_cgpa: row.min_cgpa,
            internship_offers: 0,
            higher_studies: 0,
            company_placements: Vec::new(),
        });
    }

    Ok(records)
}

/// Built-in dataset used when no `--data` file is supplied, and by tests.
pub fn seed_dataset() -> Dataset {
    fn college(
        id: u32,
        name: &str,
        college_type: CollegeType,
        location: &str,
        ranking: u32,
        established: u16,
        total_students: u32,
        placement_officer: &str,
    ) -> College {
        College {
            id,
            name: name.to_string(),
            college_type,
            location: location.to_string(),
            ranking,
            established,
            total_students,
            placement_officer: placement_officer.to_string(),
        }
    }

    fn cp(
        company: &str,
        sector: &str,
        tier: Tier,
        placements: u32,
        avg_package: f64,
        highest_package: f64,
    ) -> CompanyPlacement {
        CompanyPlacement {
            company: company.to_string(),
            sector: sector.to_string(),
            tier,
            placements,
            avg_package,
            highest_package,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        college_id: u32,
        branch: &str,
        year: u16,
        total_students: u32,
        placed_students: u32,
        avg_package: f64,
        highest_package: f64,
        min_cgpa: f64,
        internship_offers: u32,
        higher_studies: u32,
        company_placements: Vec<CompanyPlacement>,
    ) -> PlacementRecord {
        PlacementRecord {
            college_id,
            branch: branch.to_string(),
            year,
            total_students,
            placed_students,
            avg_package,
            highest_package,
            min_cgpa,
            internship_offers,
            higher_studies,
            company_placements,
        }
    }

    let colleges = vec![
        college(
            1,
            "National Institute of Technology",
            CollegeType::Government,
            "Warangal",
            1,
            1959,
            9000,
            "Dr. Meena Krishnan",
        ),
        college(
            2,
            "Government College of Engineering",
            CollegeType::Government,
            "Pune",
            4,
            1948,
            6500,
            "Prof. S. Deshmukh",
        ),
        college(
            3,
            "City Institute of Science",
            CollegeType::Government,
            "Mumbai",
            6,
            1962,
            5200,
            "Ms. Asha Verma",
        ),
        college(
            4,
            "Sunrise Institute of Technology",
            CollegeType::Private,
            "Bengaluru",
            3,
            1998,
            7800,
            "Mr. Rahul Nair",
        ),
        college(
            5,
            "Greenfield University",
            CollegeType::Private,
            "Hyderabad",
            5,
            2002,
            11000,
            "Ms. Divya Reddy",
        ),
        college(
            6,
            "Lakeside College of Engineering",
            CollegeType::Private,
            "Chennai",
            7,
            1995,
            4300,
            "Mr. Arun Kumar",
        ),
    ];

    let branches = vec![
        "Computer Science".to_string(),
        "Electronics".to_string(),
        "Mechanical".to_string(),
        "Civil".to_string(),
        "Information Technology".to_string(),
    ];

    let records = vec![
        record(1, "Computer Science", 2020, 180, 152, 11.2, 38.0, 7.0, 40, 12, vec![
            cp("TechNova Systems", "IT Services", Tier::Tier1, 42, 12.5, 38.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 30, 9.8, 16.0),
            cp("FinEdge Capital", "Finance", Tier::Tier1, 18, 18.0, 32.0),
        ]),
        record(1, "Computer Science", 2021, 185, 160, 12.4, 42.0, 7.0, 44, 10, vec![
            cp("TechNova Systems", "IT Services", Tier::Tier1, 48, 13.0, 42.0),
            cp("CloudNine Labs", "IT Services", Tier::Tier1, 26, 15.5, 30.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 28, 10.2, 17.0),
        ]),
        record(1, "Computer Science", 2022, 190, 171, 13.8, 45.0, 7.2, 50, 9, vec![
            cp("TechNova Systems", "IT Services", Tier::Tier1, 52, 14.2, 45.0),
            cp("CloudNine Labs", "IT Services", Tier::Tier1, 31, 16.8, 34.0),
            cp("FinEdge Capital", "Finance", Tier::Tier1, 22, 19.5, 36.0),
        ]),
        record(1, "Computer Science", 2023, 195, 178, 15.1, 52.0, 7.2, 55, 8, vec![
            cp("TechNova Systems", "IT Services", Tier::Tier1, 55, 15.0, 52.0),
            cp("CloudNine Labs", "IT Services", Tier::Tier1, 34, 17.6, 38.0),
            cp("FinEdge Capital", "Finance", Tier::Tier1, 25, 21.0, 40.0),
        ]),
        record(1, "Computer Science", 2024, 200, 186, 16.4, 58.0, 7.5, 60, 7, vec![
            cp("TechNova Systems", "IT Services", Tier::Tier1, 58, 16.2, 58.0),
            cp("CloudNine Labs", "IT Services", Tier::Tier1, 36, 18.4, 41.0),
            cp("FinEdge Capital", "Finance", Tier::Tier1, 28, 22.5, 44.0),
        ]),
        record(1, "Electronics", 2023, 140, 118, 10.6, 28.0, 6.8, 30, 10, vec![
            cp("ChipForge Semiconductors", "Electronics", Tier::Tier1, 32, 12.0, 28.0),
            cp("TechNova Systems", "IT Services", Tier::Tier1, 24, 11.0, 20.0),
        ]),
        record(1, "Electronics", 2024, 145, 126, 11.3, 30.0, 6.8, 32, 9, vec![
            cp("ChipForge Semiconductors", "Electronics", Tier::Tier1, 36, 12.8, 30.0),
            cp("TechNova Systems", "IT Services", Tier::Tier1, 26, 11.6, 22.0),
        ]),
        record(2, "Computer Science", 2022, 150, 121, 9.4, 26.0, 6.5, 28, 11, vec![
            cp("TechNova Systems", "IT Services", Tier::Tier1, 34, 10.2, 26.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 27, 8.6, 14.0),
        ]),
        record(2, "Computer Science", 2023, 155, 129, 10.1, 29.0, 6.5, 30, 10, vec![
            cp("TechNova Systems", "IT Services", Tier::Tier1, 38, 10.8, 29.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 29, 9.0, 15.0),
        ]),
        record(2, "Mechanical", 2023, 120, 84, 7.2, 16.0, 6.0, 18, 14, vec![
            cp("AutoMotiv Engineering", "Manufacturing", Tier::Tier2, 26, 7.8, 16.0),
            cp("CoreSteel Industries", "Manufacturing", Tier::Tier3, 19, 6.4, 10.0),
        ]),
        record(2, "Mechanical", 2024, 125, 90, 7.6, 17.5, 6.0, 20, 12, vec![
            cp("AutoMotiv Engineering", "Manufacturing", Tier::Tier2, 28, 8.2, 17.5),
            cp("CoreSteel Industries", "Manufacturing", Tier::Tier3, 21, 6.8, 11.0),
        ]),
        record(3, "Computer Science", 2021, 110, 83, 8.2, 22.0, 6.5, 20, 9, vec![
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 24, 8.8, 15.0),
            cp("TechNova Systems", "IT Services", Tier::Tier1, 20, 9.5, 22.0),
        ]),
        record(3, "Computer Science", 2023, 115, 91, 9.0, 24.0, 6.5, 24, 8, vec![
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 27, 9.2, 16.0),
            cp("TechNova Systems", "IT Services", Tier::Tier1, 23, 10.0, 24.0),
        ]),
        record(3, "Civil", 2023, 95, 58, 6.1, 12.0, 5.8, 12, 10, vec![
            cp("BuildWell Infra", "Infrastructure", Tier::Tier2, 22, 6.5, 12.0),
        ]),
        record(4, "Computer Science", 2022, 210, 174, 10.8, 34.0, 6.8, 46, 12, vec![
            cp("CloudNine Labs", "IT Services", Tier::Tier1, 40, 13.5, 34.0),
            cp("TechNova Systems", "IT Services", Tier::Tier1, 38, 11.2, 24.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 32, 9.4, 15.0),
        ]),
        record(4, "Computer Science", 2023, 215, 182, 11.6, 36.0, 6.8, 50, 11, vec![
            cp("CloudNine Labs", "IT Services", Tier::Tier1, 44, 14.2, 36.0),
            cp("TechNova Systems", "IT Services", Tier::Tier1, 40, 11.8, 26.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 33, 9.8, 16.0),
        ]),
        record(4, "Information Technology", 2024, 160, 138, 10.2, 27.0, 6.6, 36, 8, vec![
            cp("CloudNine Labs", "IT Services", Tier::Tier1, 34, 12.4, 27.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 30, 9.1, 15.0),
        ]),
        record(5, "Computer Science", 2023, 240, 190, 9.6, 30.0, 6.4, 48, 16, vec![
            cp("TechNova Systems", "IT Services", Tier::Tier1, 46, 10.4, 30.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 40, 8.8, 14.0),
            cp("FinEdge Capital", "Finance", Tier::Tier1, 20, 16.5, 28.0),
        ]),
        record(5, "Electronics", 2024, 170, 131, 8.8, 24.0, 6.2, 30, 12, vec![
            cp("ChipForge Semiconductors", "Electronics", Tier::Tier1, 32, 10.6, 24.0),
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 28, 8.2, 13.0),
        ]),
        record(6, "Computer Science", 2024, 130, 96, 7.4, 18.0, 6.0, 22, 9, vec![
            cp("DataWorks Analytics", "Analytics", Tier::Tier2, 28, 7.8, 13.0),
            cp("TechNova Systems", "IT Services", Tier::Tier1, 22, 8.4, 18.0),
        ]),
        record(6, "Civil", 2024, 90, 52, 5.8, 11.0, 5.6, 10, 8, vec![
            cp("BuildWell Infra", "Infrastructure", Tier::Tier2, 20, 6.2, 11.0),
        ]),
    ];

    Dataset {
        colleges,
        branches,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_dataset_loads() {
        let store = RecordStore::from_dataset(seed_dataset()).unwrap();
        assert_eq!(store.colleges().len(), 6);
        assert!(!store.records().is_empty());
        assert!(store.college(1).is_some());
        assert!(store.college(99).is_none());
    }

    #[test]
    fn seed_records_stay_within_catalogs() {
        let dataset = seed_dataset();
        for record in &dataset.records {
            assert!(dataset.branches.contains(&record.branch));
            assert!(record.year >= YEAR_MIN && record.year <= YEAR_MAX);
            assert!(record.placed_students <= record.total_students);
        }
    }

    #[test]
    fn rejects_unknown_college() {
        let mut dataset = seed_dataset();
        dataset.records[0].college_id = 42;
        assert!(RecordStore::from_dataset(dataset).is_err());
    }

    #[test]
    fn rejects_branch_outside_catalog() {
        let mut dataset = seed_dataset();
        dataset.records[0].branch = "Astrology".to_string();
        assert!(RecordStore::from_dataset(dataset).is_err());
    }

    #[test]
    fn rejects_placed_exceeding_total() {
        let mut dataset = seed_dataset();
        dataset.records[0].placed_students = dataset.records[0].total_students + 1;
        assert!(RecordStore::from_dataset(dataset).is_err());
    }

    #[test]
    fn rejects_year_outside_window() {
        let mut dataset = seed_dataset();
        dataset.records[0].year = 2019;
        assert!(RecordStore::from_dataset(dataset).is_err());
    }

    #[test]
    fn company_oversum_is_kept_with_warning() {
        let mut dataset = seed_dataset();
        let expected = dataset.records.len();
        dataset.records[0].company_placements[0].placements = 10_000;
        let store = RecordStore::from_dataset(dataset).unwrap();
        assert_eq!(store.records().len(), expected);
    }

    #[test]
    fn dataset_round_trips_through_json() {
        let dataset = seed_dataset();
        let raw = serde_json::to_string(&dataset).unwrap();
        let parsed: Dataset = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.records.len(), dataset.records.len());
        assert_eq!(parsed.colleges.len(), dataset.colleges.len());
    }
}
