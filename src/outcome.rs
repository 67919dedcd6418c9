//! Per item results and their aggregation
use std::fmt;

use log::warn;

use crate::errors::MigratorError;

/// Kind of entity a result is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Label
    Label,
    /// Milestone
    Milestone,
    /// Issue
    Issue,
    /// Merge request
    Request,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Label => write!(f, "label"),
            EntityKind::Milestone => write!(f, "milestone"),
            EntityKind::Issue => write!(f, "issue"),
            EntityKind::Request => write!(f, "merge request"),
        }
    }
}

/// Failure of a single entity, kept with what is needed to reconcile it manually
#[derive(Debug)]
pub struct EntityFailure {
    /// Kind of the failed entity
    pub kind: EntityKind,

    /// Source identifier (iid, id or name)
    pub identifier: String,

    /// Human readable title
    pub title: String,

    /// Underlying error
    pub error: MigratorError,
}

impl EntityFailure {
    /// Log the failure with the status and body of the platform response
    pub fn log(&self) {
        warn!(
            "Failed to migrate {} {} ({}): {}",
            self.kind, self.identifier, self.title, self.error
        );
        if let Some(status) = self.error.status() {
            warn!("Platform status for {} {}: {status}", self.kind, self.identifier);
        }
    }
}

/// Result of the migration of one entity
#[derive(Debug)]
pub enum ItemOutcome {
    /// Created on the destination
    Created,
    /// Not created, with the reason
    Skipped(String),
    /// Not migrated as is, a closed issue with this number keeps a record of it
    Recorded(u64),
    /// Failed, the batch goes on
    Failed(EntityFailure),
}

impl ItemOutcome {
    /// Whether the destination API was written to (or attempted) for this item.
    /// A duplicate skipped before any call is the only outcome that didn't.
    pub fn reached_destination(&self) -> bool {
        !matches!(self, ItemOutcome::Skipped(_))
    }
}

/// Counts of a batch of entities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    /// Entities read from the source
    pub total: usize,
    /// Entities created on the destination
    pub created: usize,
    /// Entities skipped (already there, or recorded as a closed issue)
    pub skipped: usize,
    /// Entities that failed
    pub failed: usize,
}

impl BatchCounts {
    /// Account for one item
    pub fn record(&mut self, outcome: &ItemOutcome) {
        self.total += 1;
        match outcome {
            ItemOutcome::Created => self.created += 1,
            ItemOutcome::Skipped(_) | ItemOutcome::Recorded(_) => self.skipped += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }

}

impl fmt::Display for BatchCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} skipped, {} failed (total {})",
            self.created, self.skipped, self.failed, self.total
        )
    }
}

/// What happened to one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryReport {
    /// Name of the repository
    pub name: String,
    /// Whether the git history was copied
    pub history_copied: bool,
    /// Label counts
    pub labels: BatchCounts,
    /// Milestone counts
    pub milestones: BatchCounts,
    /// Issue counts
    pub issues: BatchCounts,
    /// Merge request counts
    pub requests: BatchCounts,
}

/// Tally of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Repositories whose migration went through
    pub succeeded: usize,
    /// Repositories attempted
    pub total: usize,
    /// Report of every repository that went through
    pub reports: Vec<RepositoryReport>,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::MigratorErrorKind;

    #[test]
    fn counts_every_outcome() {
        let mut counts = BatchCounts::default();
        counts.record(&ItemOutcome::Created);
        counts.record(&ItemOutcome::Skipped("already exists".to_string()));
        counts.record(&ItemOutcome::Recorded(12));
        counts.record(&ItemOutcome::Failed(EntityFailure {
            kind: EntityKind::Issue,
            identifier: "#3".to_string(),
            title: "Broken".to_string(),
            error: MigratorError::new(MigratorErrorKind::EntityMigration),
        }));
        assert_eq!(counts.total, 4);
        assert_eq!(counts.skipped, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(
            counts.to_string(),
            "1 created, 2 skipped, 1 failed (total 4)"
        );
    }

    #[test]
    fn only_duplicates_skip_the_destination() {
        assert!(ItemOutcome::Created.reached_destination());
        assert!(ItemOutcome::Recorded(4).reached_destination());
        assert!(!ItemOutcome::Skipped("already exists".to_string()).reached_destination());
    }
}
