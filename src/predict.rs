use crate::models::{PlacementRecord, Prediction, Recommendation, Severity, StudentProfile};

/// Only recent history feeds the baseline.
const RECENCY_FLOOR: u16 = 2022;

/// Probability is never allowed to read as certainty in either direction.
const SCORE_MIN: i32 = 5;
const SCORE_MAX: i32 = 95;

const SKILL_KEYWORDS: [&str; 6] = [
    "python",
    "java",
    "react",
    "javascript",
    "machine learning",
    "data science",
];

/// Deterministic heuristic scorer. Returns `None` when no historical records
/// match the profile's college and branch within the recency window; that is
/// the explicit insufficient-data outcome, distinct from any low score.
pub fn predict(records: &[PlacementRecord], profile: &StudentProfile) -> Option<Prediction> {
    let history: Vec<&PlacementRecord> = records
        .iter()
        .filter(|r| {
            r.college_id == profile.college_id
                && r.branch == profile.branch
                && r.year >= RECENCY_FLOOR
        })
        .collect();

    if history.is_empty() {
        return None;
    }

    let avg_placement_rate = history
        .iter()
        .map(|r| {
            if r.total_students == 0 {
                0.0
            } else {
                100.0 * r.placed_students as f64 / r.total_students as f64
            }
        })
        .sum::<f64>()
        / history.len() as f64;
    let avg_package =
        history.iter().map(|r| r.avg_package).sum::<f64>() / history.len() as f64;
    let min_cgpa = history
        .iter()
        .map(|r| r.min_cgpa)
        .fold(f64::INFINITY, f64::min);

    let mut score: i32 = 50;

    score += if profile.cgpa >= min_cgpa + 1.0 {
        25
    } else if profile.cgpa >= min_cgpa {
        15
    } else if profile.cgpa >= min_cgpa - 0.5 {
        5
    } else {
        -20
    };

    score += match profile.projects {
        3.. => 15,
        1..=2 => 8,
        0 => 0,
    };

    score += match profile.internships {
        2.. => 12,
        1 => 6,
        0 => 0,
    };

    score += match profile.certifications {
        3.. => 10,
        1..=2 => 5,
        0 => 0,
    };

    let skills = profile.skills.to_lowercase();
    let matched = SKILL_KEYWORDS
        .iter()
        .filter(|keyword| skills.contains(*keyword))
        .count() as i32;
    score += matched * 3;

    let score = score.clamp(SCORE_MIN, SCORE_MAX);

    Some(Prediction {
        probability: score as u32,
        expected_package: avg_package * (score as f64 / 100.0),
        avg_college_placement: avg_placement_rate.round() as u32,
        recommendations: recommendations(profile),
    })
}

/// Independent threshold rules evaluated in a fixed order; severities are
/// presentation hints only and never feed the score.
fn recommendations(profile: &StudentProfile) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if profile.cgpa < 7.5 {
        out.push(Recommendation {
            severity: Severity::Warning,
            text: "Focus on improving academic performance. Many companies have CGPA cutoffs around 7.5-8.0".to_string(),
        });
    }
    if profile.projects < 2 {
        out.push(Recommendation {
            severity: Severity::Info,
            text: "Build more projects showcasing your technical skills. Aim for at least 2-3 substantial projects".to_string(),
        });
    }
    if profile.internships == 0 {
        out.push(Recommendation {
            severity: Severity::Info,
            text: "Try to get internship experience. It significantly boosts placement chances".to_string(),
        });
    }
    if profile.skills.trim().len() < 10 {
        out.push(Recommendation {
            severity: Severity::Info,
            text: "Develop in-demand technical skills like programming languages, frameworks, and tools".to_string(),
        });
    }
    out.push(Recommendation {
        severity: Severity::Success,
        text: "Practice coding problems regularly and participate in competitive programming"
            .to_string(),
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(college_id: u32, branch: &str, year: u16, min_cgpa: f64, avg: f64) -> PlacementRecord {
        PlacementRecord {
            college_id,
            branch: branch.to_string(),
            year,
            total_students: 100,
            placed_students: 80,
            avg_package: avg,
            highest_package: avg * 2.0,
            min_cgpa,
            internship_offers: 0,
            higher_studies: 0,
            company_placements: Vec::new(),
        }
    }

    fn profile() -> StudentProfile {
        StudentProfile {
            college_id: 1,
            branch: "Computer Science".to_string(),
            cgpa: 8.5,
            projects: 3,
            internships: 1,
            certifications: 0,
            skills: "Python, React".to_string(),
        }
    }

    #[test]
    fn strong_profile_clamps_to_95() {
        // 50 + 25 + 15 + 6 + 0 + 6 = 102, clamped.
        let records = vec![record(1, "Computer Science", 2023, 7.0, 12.0)];
        let prediction = predict(&records, &profile()).unwrap();
        assert_eq!(prediction.probability, 95);
    }

    #[test]
    fn cgpa_shortfall_costs_twenty_points() {
        let records = vec![record(1, "Computer Science", 2023, 9.5, 12.0)];
        let weak = StudentProfile {
            cgpa: 4.0,
            projects: 0,
            internships: 0,
            certifications: 0,
            skills: String::new(),
            ..profile()
        };
        // 50 - 20, nothing else contributes.
        let prediction = predict(&records, &weak).unwrap();
        assert_eq!(prediction.probability, 30);
        assert!(prediction.probability >= 5);
    }

    #[test]
    fn insufficient_data_is_not_a_score() {
        let records = vec![
            record(1, "Computer Science", 2021, 7.0, 12.0), // too old
            record(2, "Computer Science", 2023, 7.0, 12.0), // other college
            record(1, "Mechanical", 2023, 7.0, 12.0),       // other branch
        ];
        assert!(predict(&records, &profile()).is_none());
    }

    #[test]
    fn expected_package_scales_with_score() {
        let records = vec![record(1, "Computer Science", 2023, 7.0, 12.0)];
        let prediction = predict(&records, &profile()).unwrap();
        assert!((prediction.expected_package - 12.0 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn baseline_uses_min_cgpa_across_subset() {
        let records = vec![
            record(1, "Computer Science", 2022, 8.0, 12.0),
            record(1, "Computer Science", 2023, 7.0, 14.0),
        ];
        // cgpa 8.0 >= min(7.0) + 1 earns the full CGPA bump.
        let prediction = predict(
            &records,
            &StudentProfile {
                cgpa: 8.0,
                ..profile()
            },
        )
        .unwrap();
        // 50 + 25 + 15 + 6 + 0 + 6 = 102 -> 95
        assert_eq!(prediction.probability, 95);
        assert!((prediction.expected_package - 13.0 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn skill_matching_ignores_case() {
        let records = vec![record(1, "Computer Science", 2023, 7.0, 12.0)];
        let loud = StudentProfile {
            skills: "PYTHON and MACHINE LEARNING".to_string(),
            projects: 0,
            internships: 0,
            ..profile()
        };
        // 50 + 25 + 0 + 0 + 0 + 6 = 81
        let prediction = predict(&records, &loud).unwrap();
        assert_eq!(prediction.probability, 81);
    }

    #[test]
    fn deterministic_across_calls() {
        let records = vec![record(1, "Computer Science", 2023, 7.0, 12.0)];
        let a = predict(&records, &profile()).unwrap();
        let b = predict(&records, &profile()).unwrap();
        assert_eq!(a.probability, b.probability);
        assert_eq!(a.expected_package, b.expected_package);
        assert_eq!(a.avg_college_placement, b.avg_college_placement);
        assert_eq!(a.recommendations.len(), b.recommendations.len());
    }

    #[test]
    fn recommendation_rules_follow_fixed_order() {
        let weak = StudentProfile {
            cgpa: 6.0,
            projects: 0,
            internships: 0,
            certifications: 0,
            skills: "c".to_string(),
            ..profile()
        };
        let recs = recommendations(&weak);
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0].severity, Severity::Warning);
        assert!(recs[1..4].iter().all(|r| r.severity == Severity::Info));
        assert_eq!(recs.last().unwrap().severity, Severity::Success);

        // A strong profile still gets the closing tip.
        let recs = recommendations(&StudentProfile {
            skills: "python, java, react and more".to_string(),
            ..profile()
        });
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].severity, Severity::Success);
    }
}
