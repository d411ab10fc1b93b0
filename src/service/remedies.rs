//! Remedy suggestions for analyzed cases
//!
//! Suggestions come from a fixed table; rubric content is not consulted yet.

use crate::model::{RemedySuggestion, RubricCandidate};

/// Number of suggestions returned per case
const TOP_REMEDIES: usize = 3;

struct CannedRemedy {
    name: &'static str,
    percentage: f64,
    matched_rubrics: &'static [&'static str],
    details: &'static str,
}

const COMMON_REMEDIES: &[CannedRemedy] = &[
    CannedRemedy {
        name: "Nux Vomica",
        percentage: 98.0,
        matched_rubrics: &["Mind-Irritable", "Stomach-Nausea"],
        details: "For digestive issues with irritability",
    },
    CannedRemedy {
        name: "Arsenicum Album",
        percentage: 95.0,
        matched_rubrics: &["Anxiety", "Restlessness"],
        details: "For anxiety and restlessness with burning pains",
    },
    CannedRemedy {
        name: "Pulsatilla",
        percentage: 85.0,
        matched_rubrics: &["Weeping", "Changeable"],
        details: "For emotional symptoms with changeability",
    },
    CannedRemedy {
        name: "Sulphur",
        percentage: 80.0,
        matched_rubrics: &["Skin-Itching", "Heat"],
        details: "For skin conditions with heat sensation",
    },
    CannedRemedy {
        name: "Bryonia",
        percentage: 75.0,
        matched_rubrics: &["Worse-Motion", "Thirst"],
        details: "For motion-related symptoms with great thirst",
    },
];

/// Derive remedy suggestions for a set of rubrics
pub fn derive_remedies(_rubrics: &[RubricCandidate]) -> Vec<RemedySuggestion> {
    COMMON_REMEDIES
        .iter()
        .take(TOP_REMEDIES)
        .map(|remedy| RemedySuggestion {
            name: remedy.name.to_string(),
            percentage: remedy.percentage,
            matched_rubrics: remedy.matched_rubrics.iter().map(|r| r.to_string()).collect(),
            details: remedy.details.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisResult;

    fn names(remedies: &[RemedySuggestion]) -> Vec<(&str, f64)> {
        remedies
            .iter()
            .map(|r| (r.name.as_str(), r.percentage))
            .collect()
    }

    #[test]
    fn test_fixed_top_three() {
        let remedies = derive_remedies(&AnalysisResult::service_unavailable().rubrics);
        assert_eq!(
            names(&remedies),
            vec![
                ("Nux Vomica", 98.0),
                ("Arsenicum Album", 95.0),
                ("Pulsatilla", 85.0)
            ]
        );
        assert_eq!(
            remedies[0].matched_rubrics,
            vec!["Mind-Irritable", "Stomach-Nausea"]
        );
        assert_eq!(remedies[2].details, "For emotional symptoms with changeability");
    }

    #[test]
    fn test_empty_input_gives_same_result() {
        let many: Vec<RubricCandidate> = (0..7)
            .map(|i| RubricCandidate {
                path: format!("Skin > Itching > {}", i),
                confidence: 0.9,
                evidence: "itching".to_string(),
                category: "Skin".to_string(),
            })
            .collect();

        assert_eq!(derive_remedies(&[]), derive_remedies(&many));
        assert_eq!(derive_remedies(&[]).len(), 3);
    }
}
