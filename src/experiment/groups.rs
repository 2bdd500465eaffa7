// Experiment group matrix: recommender persona × user initial-stance persona

use anyhow::{bail, Result};

use crate::config::Persona;

/// A named pairing of a recommender persona and a user persona
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentGroup {
    /// `"{recommender}-{user}"`, e.g. "A-HIGH"
    pub label: String,
    pub recommender: Persona,
    pub user: Persona,
}

impl ExperimentGroup {
    pub fn new(recommender: Persona, user: Persona) -> Self {
        Self {
            label: format!("{}-{}", recommender.label, user.label),
            recommender,
            user,
        }
    }
}

/// Full cross-product, grouped by user stance: every recommender style is run
/// against the first initial stance before moving on to the next.
pub fn build_groups(recommenders: &[Persona], users: &[Persona]) -> Vec<ExperimentGroup> {
    users
        .iter()
        .flat_map(|user| {
            recommenders
                .iter()
                .map(move |recommender| ExperimentGroup::new(recommender.clone(), user.clone()))
        })
        .collect()
}

/// Keep only the requested labels (matrix order preserved). An empty filter
/// keeps everything; an unknown label is an error.
pub fn select_groups(
    groups: Vec<ExperimentGroup>,
    labels: &[String],
) -> Result<Vec<ExperimentGroup>> {
    if labels.is_empty() {
        return Ok(groups);
    }

    for label in labels {
        if !groups.iter().any(|g| &g.label == label) {
            let known: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
            bail!("Unknown group '{}'. Available groups: {}", label, known.join(", "));
        }
    }

    Ok(groups
        .into_iter()
        .filter(|g| labels.contains(&g.label))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_groups() -> Vec<ExperimentGroup> {
        build_groups(
            &Persona::builtin_recommenders().unwrap(),
            &Persona::builtin_users().unwrap(),
        )
    }

    #[test]
    fn test_builtin_matrix_has_six_groups_in_order() {
        let labels: Vec<String> = builtin_groups().into_iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["A-HIGH", "B-HIGH", "C-HIGH", "A-LOW", "B-LOW", "C-LOW"]);
        assert_eq!(labels.len() % 2, 0);
    }

    #[test]
    fn test_group_carries_both_personas() {
        let groups = builtin_groups();
        let c_low = groups.iter().find(|g| g.label == "C-LOW").unwrap();
        assert_eq!(c_low.recommender.label, "C");
        assert_eq!(c_low.user.label, "LOW");
    }

    #[test]
    fn test_select_groups_filters_and_keeps_order() {
        let selected = select_groups(
            builtin_groups(),
            &["B-LOW".to_string(), "A-HIGH".to_string()],
        )
        .unwrap();
        let labels: Vec<&str> = selected.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["A-HIGH", "B-LOW"]);
    }

    #[test]
    fn test_select_groups_empty_filter_keeps_all() {
        assert_eq!(select_groups(builtin_groups(), &[]).unwrap().len(), 6);
    }

    #[test]
    fn test_select_groups_rejects_unknown_label() {
        let err = select_groups(builtin_groups(), &["D-MID".to_string()]).unwrap_err();
        assert!(err.to_string().contains("D-MID"));
        assert!(err.to_string().contains("A-HIGH"));
    }
}
