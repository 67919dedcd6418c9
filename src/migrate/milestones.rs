//! Milestone migration
use std::collections::HashMap;

use log::{error, info, warn};

use super::{settle, RepositoryContext};
use crate::{
    entities::{NewMilestone, SourceMilestone},
    mapping::MilestoneMapping,
    outcome::{BatchCounts, EntityKind, ItemOutcome},
    utils::NormalizedState,
};

/// Destination milestone for a source milestone
pub fn new_milestone(milestone: &SourceMilestone) -> NewMilestone {
    NewMilestone {
        title: milestone.title.clone(),
        description: milestone.description.clone().unwrap_or_default(),
        state: NormalizedState::from_source(&milestone.state),
    }
}

/// Copy the milestones of a repository, mapping source ids to destination numbers.
/// Milestones with a title already on the destination are mapped, not created again.
pub async fn migrate_milestones(ctx: &RepositoryContext<'_>) -> (MilestoneMapping, BatchCounts) {
    let mut mapping = MilestoneMapping::new();
    let mut counts = BatchCounts::default();
    let milestones = match ctx.source.list_milestones(ctx.project_id).await {
        Ok(milestones) => milestones,
        Err(e) => {
            error!("Unable to list the milestones of {}: {e}", ctx.repo.name);
            return (mapping, counts);
        }
    };
    let existing: HashMap<String, u64> = match ctx.destination.list_milestones(ctx.repo).await {
        Ok(milestones) => milestones.into_iter().collect(),
        Err(e) => {
            warn!("Unable to list the milestones of {}: {e}", ctx.repo.name);
            HashMap::new()
        }
    };

    for milestone in milestones {
        let result = match existing.get(&milestone.title) {
            Some(number) => {
                mapping.insert(milestone.id, *number);
                Ok(ItemOutcome::Skipped(format!(
                    "milestone {} already exists",
                    milestone.title
                )))
            }
            None => ctx
                .destination
                .create_milestone(ctx.repo, new_milestone(&milestone))
                .await
                .map(|number| {
                    info!("Migrated milestone {}", milestone.title);
                    mapping.insert(milestone.id, number);
                    ItemOutcome::Created
                }),
        };
        let outcome = settle(
            EntityKind::Milestone,
            milestone.id.to_string(),
            &milestone.title,
            result,
        );
        counts.record(&outcome);
    }
    info!("Milestones of {}: {counts}", ctx.repo.name);
    (mapping, counts)
}
