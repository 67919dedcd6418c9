//! Issue migration
//!
//! Issues are deduplicated on `(title, state)` against the destination: a
//! second run skips what the first one created. Two distinct source issues
//! sharing a title and a state are treated as the same issue.
use std::collections::HashSet;

use log::{error, info};

use super::{progress_bar, settle, LabelCatalog, RepositoryContext};
use crate::{
    entities::{ExistingItem, NewIssue, SourceIssue},
    errors::MigratorError,
    mapping::{LabelMapping, MilestoneMapping},
    outcome::{BatchCounts, EntityKind, ItemOutcome},
    utils::NormalizedState,
};

/// Copy the issues of a repository with their comments and state
pub async fn migrate_issues(
    ctx: &RepositoryContext<'_>,
    labels: &LabelMapping,
    milestones: &MilestoneMapping,
) -> BatchCounts {
    let mut counts = BatchCounts::default();
    let issues = match ctx.source.list_issues(ctx.project_id).await {
        Ok(issues) => issues,
        Err(e) => {
            error!("Unable to list the issues of {}: {e}", ctx.repo.name);
            return counts;
        }
    };
    let mut existing: HashSet<ExistingItem> = match ctx.destination.list_issues(ctx.repo).await {
        Ok(items) => items.into_iter().collect(),
        Err(e) => {
            error!(
                "Unable to list the existing issues of {}, issues not migrated: {e}",
                ctx.repo.name
            );
            return counts;
        }
    };
    let mut catalog = LabelCatalog::load(ctx, labels).await;

    let pb = progress_bar(issues.len(), format!("{}: issues", ctx.repo.name));
    for issue in issues {
        pb.set_message(format!("#{} {}", issue.iid, issue.title));
        let result = migrate_issue(ctx, &mut catalog, labels, milestones, &mut existing, &issue).await;
        let outcome = settle(
            EntityKind::Issue,
            format!("#{}", issue.iid),
            &issue.title,
            result,
        );
        match &outcome {
            ItemOutcome::Created => info!("Migrated issue #{}", issue.iid),
            ItemOutcome::Skipped(reason) => info!("Skipped issue #{} ({})", issue.iid, reason),
            ItemOutcome::Recorded(_) | ItemOutcome::Failed(_) => {}
        }
        counts.record(&outcome);
        pb.inc(1);
        if outcome.reached_destination() {
            ctx.pause().await;
        }
    }
    pb.finish_and_clear();
    info!("Issues of {}: {counts}", ctx.repo.name);
    counts
}

/// Migrate one issue: create, comment, then close
async fn migrate_issue(
    ctx: &RepositoryContext<'_>,
    catalog: &mut LabelCatalog,
    labels: &LabelMapping,
    milestones: &MilestoneMapping,
    existing: &mut HashSet<ExistingItem>,
    issue: &SourceIssue,
) -> Result<ItemOutcome, MigratorError> {
    let state = NormalizedState::from_source(&issue.state);
    let key = ExistingItem {
        title: issue.title.clone(),
        state,
    };
    if existing.contains(&key) {
        return Ok(ItemOutcome::Skipped(format!(
            "{} issue with this title already exists",
            state.as_str()
        )));
    }

    let new_issue = NewIssue {
        title: issue.title.clone(),
        body: issue.description.clone().unwrap_or_default(),
        labels: catalog.resolve(ctx, labels, &issue.labels).await,
        milestone: issue.milestone_id.and_then(|id| milestones.get(&id).copied()),
    };
    let number = ctx.destination.create_issue(ctx.repo, new_issue).await?;
    existing.insert(key);

    let notes = ctx
        .source
        .list_issue_notes(ctx.project_id, issue.iid)
        .await?;
    ctx.copy_comments(number, notes).await?;

    if state == NormalizedState::Closed {
        ctx.destination.close_issue(ctx.repo, number).await?;
    }
    Ok(ItemOutcome::Created)
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::test_utils::{context, handle, FakeDestination, FakeSource};

    fn issue(iid: u64, title: &str, state: &str) -> SourceIssue {
        SourceIssue {
            iid,
            title: title.to_string(),
            description: None,
            state: state.to_string(),
            labels: vec![],
            milestone_id: None,
        }
    }

    #[tokio::test]
    async fn second_run_creates_nothing() {
        let source = FakeSource {
            issues: vec![
                issue(1, "Crash on start", "opened"),
                issue(2, "Typo in README", "closed"),
            ],
            ..Default::default()
        };
        let destination = FakeDestination::default();
        let repo = handle("api");
        let ctx = context(&source, &destination, &repo);

        let first = migrate_issues(&ctx, &LabelMapping::new(), &MilestoneMapping::new()).await;
        assert_eq!(first.created, 2);
        let second = migrate_issues(&ctx, &LabelMapping::new(), &MilestoneMapping::new()).await;
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(destination.state().issues.len(), 2);
    }

    #[tokio::test]
    async fn same_title_different_state_is_not_a_duplicate() {
        let source = FakeSource {
            issues: vec![issue(1, "Flaky test", "opened")],
            ..Default::default()
        };
        let destination = FakeDestination::default();
        destination
            .state()
            .existing_issue("Flaky test", NormalizedState::Closed);
        let repo = handle("api");
        let ctx = context(&source, &destination, &repo);
        let counts = migrate_issues(&ctx, &LabelMapping::new(), &MilestoneMapping::new()).await;
        assert_eq!(counts.created, 1);
    }

    #[tokio::test]
    async fn issue_carries_body_labels_milestone_comments_and_state() {
        let mut closed = issue(7, "Memory leak", "closed");
        closed.labels = vec!["bug".to_string()];
        closed.milestone_id = Some(30);
        let source = FakeSource {
            issues: vec![closed],
            notes: [(7, vec!["first".to_string(), " ".to_string(), "second".to_string()])]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let destination = FakeDestination::default();
        let repo = handle("api");
        let ctx = context(&source, &destination, &repo);
        let mut milestones = MilestoneMapping::new();
        milestones.insert(30, 3);

        let counts = migrate_issues(&ctx, &LabelMapping::new(), &milestones).await;
        assert_eq!(counts.created, 1);
        let state = destination.state();
        let created = &state.issues[0];
        assert_eq!(created.issue.body, "");
        assert_eq!(created.issue.labels, vec!["bug"]);
        assert_eq!(created.issue.milestone, Some(3));
        assert_eq!(created.state, NormalizedState::Closed);
        assert_eq!(
            state.comments,
            vec![
                (created.number, "first".to_string()),
                (created.number, "second".to_string())
            ]
        );
        assert_eq!(state.created_labels.len(), 1);
        assert_eq!(state.created_labels[0].color, "ededed");
    }

    #[tokio::test]
    async fn failed_issue_does_not_stop_the_batch() {
        let source = FakeSource {
            issues: vec![
                issue(1, "First", "opened"),
                issue(2, "Rejected", "opened"),
                issue(3, "Third", "opened"),
                issue(4, "Fourth", "closed"),
            ],
            ..Default::default()
        };
        let destination = FakeDestination::default();
        destination
            .state()
            .refused_issues
            .insert("Rejected".to_string());
        let repo = handle("api");
        let ctx = context(&source, &destination, &repo);

        let counts = migrate_issues(&ctx, &LabelMapping::new(), &MilestoneMapping::new()).await;
        assert_eq!(counts.total, 4);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.created, 3);
        let titles: Vec<String> = destination
            .state()
            .issues
            .iter()
            .map(|i| i.issue.title.clone())
            .collect();
        assert_eq!(titles, vec!["First", "Third", "Fourth"]);
    }

    #[tokio::test]
    async fn comments_wait_for_the_issue() {
        let source = FakeSource {
            issues: vec![issue(2, "Rejected", "opened")],
            notes: [(2, vec!["lost".to_string()])].into_iter().collect(),
            ..Default::default()
        };
        let destination = FakeDestination::default();
        destination
            .state()
            .refused_issues
            .insert("Rejected".to_string());
        let repo = handle("api");
        let ctx = context(&source, &destination, &repo);
        let counts = migrate_issues(&ctx, &LabelMapping::new(), &MilestoneMapping::new()).await;
        assert_eq!(counts.failed, 1);
        assert!(destination.state().comments.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_after_each_call_but_not_after_duplicates() {
        let source = FakeSource {
            issues: vec![
                issue(1, "Known", "opened"),
                issue(2, "Rejected", "opened"),
                issue(3, "New", "closed"),
            ],
            ..Default::default()
        };
        let destination = FakeDestination::default();
        {
            let mut state = destination.state();
            state.existing_issue("Known", NormalizedState::Open);
            state.refused_issues.insert("Rejected".to_string());
        }
        let repo = handle("api");
        let mut ctx = context(&source, &destination, &repo);
        ctx.item_delay = Duration::from_millis(100);

        let start = Instant::now();
        let counts = migrate_issues(&ctx, &LabelMapping::new(), &MilestoneMapping::new()).await;
        let elapsed = start.elapsed();
        assert_eq!((counts.created, counts.skipped, counts.failed), (1, 1, 1));
        assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(300), "{elapsed:?}");
    }
}
