//! Label migration, labels are matched by name
use std::collections::HashMap;

use log::{error, info, warn};

use super::{settle, RepositoryContext, DEFAULT_LABEL_COLOR};
use crate::{
    entities::{NewLabel, SourceLabel},
    mapping::LabelMapping,
    outcome::{BatchCounts, EntityKind, ItemOutcome},
    utils::normalize_color,
};

/// Destination label for a source label
pub fn new_label(label: &SourceLabel) -> NewLabel {
    NewLabel {
        name: label.name.clone(),
        color: label
            .color
            .as_deref()
            .map(normalize_color)
            .unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string()),
        description: label.description.clone().unwrap_or_default(),
    }
}

/// Copy the labels of a repository.
/// Labels already on the destination are mapped, not created again.
pub async fn migrate_labels(ctx: &RepositoryContext<'_>) -> (LabelMapping, BatchCounts) {
    let mut mapping = LabelMapping::new();
    let mut counts = BatchCounts::default();
    let labels = match ctx.source.list_labels(ctx.project_id).await {
        Ok(labels) => labels,
        Err(e) => {
            error!("Unable to list the labels of {}: {e}", ctx.repo.name);
            return (mapping, counts);
        }
    };
    let existing: HashMap<String, String> = match ctx.destination.list_labels(ctx.repo).await {
        Ok(names) => names.into_iter().map(|n| (n.to_lowercase(), n)).collect(),
        Err(e) => {
            warn!("Unable to list the labels of {}: {e}", ctx.repo.name);
            HashMap::new()
        }
    };

    for label in labels {
        let result = match existing.get(&label.name.to_lowercase()) {
            Some(name) => {
                mapping.insert(label.name.clone(), name.clone());
                Ok(ItemOutcome::Skipped(format!("label {name} already exists")))
            }
            None => ctx
                .destination
                .create_label(ctx.repo, new_label(&label))
                .await
                .map(|()| {
                    info!("Migrated label {}", label.name);
                    mapping.insert(label.name.clone(), label.name.clone());
                    ItemOutcome::Created
                }),
        };
        let outcome = settle(EntityKind::Label, label.name.clone(), &label.name, result);
        counts.record(&outcome);
    }
    info!("Labels of {}: {counts}", ctx.repo.name);
    (mapping, counts)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{context, handle, FakeDestination, FakeSource};

    fn label(name: &str, color: Option<&str>) -> SourceLabel {
        SourceLabel {
            name: name.to_string(),
            color: color.map(str::to_string),
            description: None,
        }
    }

    #[test]
    fn color_and_description_normalized() {
        let created = new_label(&label("bug", Some("#ff0000")));
        assert_eq!(created.color, "ff0000");
        assert_eq!(created.description, "");
        assert_eq!(new_label(&label("bug", Some("ff0000"))).color, "ff0000");
        assert_eq!(new_label(&label("bug", None)).color, DEFAULT_LABEL_COLOR);
    }

    #[tokio::test]
    async fn failed_label_does_not_stop_the_batch() {
        let source = FakeSource {
            labels: vec![
                label("bug", Some("#ff0000")),
                label("bad label", Some("zzz")),
                label("Feature", Some("00ff00")),
                label("docs", None),
            ],
            ..Default::default()
        };
        let destination = FakeDestination::default();
        {
            let mut state = destination.state();
            state.labels.push("feature".to_string());
            state.refused_labels.insert("bad label".to_string());
        }
        let repo = handle("api");
        let ctx = context(&source, &destination, &repo);

        let (mapping, counts) = migrate_labels(&ctx).await;
        assert_eq!(counts.total, 4);
        assert_eq!(counts.created, 2);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(mapping.get(&"Feature".to_string()), Some(&"feature".to_string()));
        assert_eq!(mapping.get(&"bad label".to_string()), None);
        let state = destination.state();
        assert_eq!(state.created_labels[0].color, "ff0000");
    }
}
