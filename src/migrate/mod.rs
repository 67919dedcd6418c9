//! Migrators of the collaboration metadata of one repository
//!
//! Every migrator reports one [`ItemOutcome`] per source entity and never
//! stops the batch on a failed entity.
use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::{
    entities::SourceLabel,
    errors::MigratorError,
    mapping::LabelMapping,
    outcome::{EntityFailure, EntityKind, ItemOutcome},
    platform::{DestinationPlatform, SourcePlatform},
    utils::DestinationHandle,
};

pub mod issues;
pub mod labels;
pub mod milestones;
pub mod requests;

/// Color of labels created without a source color
pub const DEFAULT_LABEL_COLOR: &str = "ededed";

/// Everything a migrator needs to work on one repository
pub struct RepositoryContext<'a> {
    /// Source platform
    pub source: &'a dyn SourcePlatform,

    /// Destination platform
    pub destination: &'a dyn DestinationPlatform,

    /// Project id on the source
    pub project_id: u64,

    /// Repository on the destination
    pub repo: &'a DestinationHandle,

    /// Pause after each issue or merge request
    pub item_delay: Duration,
}

impl RepositoryContext<'_> {
    /// Pause to stay under the destination rate limits
    pub(crate) async fn pause(&self) {
        if !self.item_delay.is_zero() {
            tokio::time::sleep(self.item_delay).await;
        }
    }

    /// Copy every non blank note to an issue or a pull request, in order
    pub(crate) async fn copy_comments(
        &self,
        number: u64,
        notes: Vec<String>,
    ) -> Result<usize, MigratorError> {
        let mut copied = 0;
        for body in notes.into_iter().filter(|body| !body.trim().is_empty()) {
            self.destination
                .create_comment(self.repo, number, body)
                .await?;
            copied += 1;
        }
        Ok(copied)
    }
}

/// Outcome of an entity, failures logged with their identifier and title
pub(crate) fn settle(
    kind: EntityKind,
    identifier: String,
    title: &str,
    result: Result<ItemOutcome, MigratorError>,
) -> ItemOutcome {
    match result {
        Ok(outcome) => outcome,
        Err(error) => {
            let failure = EntityFailure {
                kind,
                identifier,
                title: title.to_string(),
                error,
            };
            failure.log();
            ItemOutcome::Failed(failure)
        }
    }
}

/// Progress bar over a batch of entities
pub(crate) fn progress_bar(len: usize, prefix: String) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{prefix:.bold.dim} [{pos}/{len}] {wide_msg}") {
        pb.set_style(style);
    }
    pb.set_prefix(prefix);
    pb
}

/// Labels known on the destination, creating the missing ones on demand
pub(crate) struct LabelCatalog {
    /// Destination names by lowercase name, the destination ignores case
    known: HashMap<String, String>,

    /// Source labels by name, for colors and descriptions
    source_labels: HashMap<String, SourceLabel>,

    /// Names the destination refused, not retried
    refused: HashSet<String>,
}

impl LabelCatalog {
    /// Load the labels of both sides
    pub(crate) async fn load(ctx: &RepositoryContext<'_>, mapping: &LabelMapping) -> Self {
        let mut known = HashMap::new();
        match ctx.destination.list_labels(ctx.repo).await {
            Ok(names) => {
                for name in names {
                    known.insert(name.to_lowercase(), name);
                }
            }
            Err(e) => warn!("Unable to list the labels of {}: {e}", ctx.repo.name),
        }
        for name in mapping.destinations() {
            known.insert(name.to_lowercase(), name.clone());
        }
        let source_labels = match ctx.source.list_labels(ctx.project_id).await {
            Ok(labels) => labels.into_iter().map(|l| (l.name.clone(), l)).collect(),
            Err(e) => {
                warn!("Unable to list the source labels of {}: {e}", ctx.repo.name);
                HashMap::new()
            }
        };
        Self {
            known,
            source_labels,
            refused: HashSet::new(),
        }
    }

    /// Destination names for source label names.
    /// Missing labels are created, a label that can't be created is dropped.
    pub(crate) async fn resolve(
        &mut self,
        ctx: &RepositoryContext<'_>,
        mapping: &LabelMapping,
        names: &[String],
    ) -> Vec<String> {
        let mut resolved = vec![];
        for name in names {
            let name = mapping.get(name).unwrap_or(name);
            if let Some(existing) = self.known.get(&name.to_lowercase()) {
                resolved.push(existing.clone());
                continue;
            }
            if self.refused.contains(name) {
                continue;
            }
            let label = match self.source_labels.get(name) {
                Some(source) => labels::new_label(source),
                None => labels::new_label(&SourceLabel {
                    name: name.clone(),
                    ..Default::default()
                }),
            };
            match ctx.destination.create_label(ctx.repo, label).await {
                Ok(()) => {
                    info!("Created missing label {name} on {}", ctx.repo.name);
                    self.known.insert(name.to_lowercase(), name.clone());
                    resolved.push(name.clone());
                }
                Err(e) => {
                    warn!("Unable to create label {name} on {}: {e}", ctx.repo.name);
                    self.refused.insert(name.clone());
                }
            }
        }
        resolved
    }
}
