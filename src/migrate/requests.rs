//! Merge request migration
//!
//! A merge request becomes a pull request only when both of its branches
//! exist on the destination. Otherwise a closed issue keeps a record of it.
use std::collections::HashSet;

use log::{error, info, warn};

use super::{progress_bar, settle, LabelCatalog, RepositoryContext};
use crate::{
    entities::{ExistingItem, NewIssue, NewPull, SourceRequest},
    errors::MigratorError,
    mapping::{LabelMapping, MilestoneMapping},
    outcome::{BatchCounts, EntityKind, ItemOutcome},
    utils::NormalizedState,
};

/// State of the destination a batch of requests is checked against
struct DestinationState {
    /// Branch names
    branches: HashSet<String>,

    /// Pull requests, by title and state
    pulls: HashSet<ExistingItem>,

    /// Issue titles, for the record of skipped requests
    issue_titles: HashSet<String>,
}

/// Title of the issue recording a request that couldn't be migrated
pub fn record_title(request: &SourceRequest) -> String {
    format!(
        "[Migration skipped] MR: {} (source: {}, target: {})",
        request.title, request.source_branch, request.target_branch
    )
}

/// Body of the issue recording a request that couldn't be migrated
pub fn record_body(request: &SourceRequest) -> String {
    format!(
        "This merge request was skipped during the migration.\n\
         - GitLab MR: !{}\n\
         - Title: {}\n\
         - Author: {}\n\
         - State: {}\n\
         - Source branch: {}\n\
         - Target branch: {}\n\
         - Reason: the branches don't exist on GitHub, no pull request could be opened.\n\
         - GitLab URL: {}\n",
        request.iid,
        request.title,
        request.author.as_deref().unwrap_or("unknown"),
        request.state,
        request.source_branch,
        request.target_branch,
        request.web_url,
    )
}

/// Copy the merge requests of a repository as pull requests
pub async fn migrate_requests(
    ctx: &RepositoryContext<'_>,
    labels: &LabelMapping,
    milestones: &MilestoneMapping,
) -> BatchCounts {
    let mut counts = BatchCounts::default();
    let requests = match ctx.source.list_requests(ctx.project_id).await {
        Ok(requests) => requests,
        Err(e) => {
            error!("Unable to list the merge requests of {}: {e}", ctx.repo.name);
            return counts;
        }
    };
    if requests.is_empty() {
        info!("No merge requests in {}", ctx.repo.name);
        return counts;
    }
    let mut state = match load_destination(ctx).await {
        Ok(state) => state,
        Err(e) => {
            error!(
                "Unable to read {}, merge requests not migrated: {e}",
                ctx.repo.name
            );
            return counts;
        }
    };
    let mut catalog = LabelCatalog::load(ctx, labels).await;

    let pb = progress_bar(requests.len(), format!("{}: merge requests", ctx.repo.name));
    for request in requests {
        pb.set_message(format!("!{} {}", request.iid, request.title));
        let result = migrate_request(ctx, &mut catalog, labels, milestones, &mut state, &request).await;
        let outcome = settle(
            EntityKind::Request,
            format!("!{}", request.iid),
            &request.title,
            result,
        );
        match &outcome {
            ItemOutcome::Created => info!("Migrated merge request !{}", request.iid),
            ItemOutcome::Skipped(reason) => {
                info!("Skipped merge request !{} ({reason})", request.iid)
            }
            ItemOutcome::Recorded(number) => info!(
                "Merge request !{} recorded as closed issue #{number}",
                request.iid
            ),
            ItemOutcome::Failed(_) => {}
        }
        counts.record(&outcome);
        pb.inc(1);
        if outcome.reached_destination() {
            ctx.pause().await;
        }
    }
    pb.finish_and_clear();
    info!("Merge requests of {}: {counts}", ctx.repo.name);
    counts
}

/// Fetch the branches, pull requests and issue titles of the destination
async fn load_destination(ctx: &RepositoryContext<'_>) -> Result<DestinationState, MigratorError> {
    let branches = ctx.destination.list_branches(ctx.repo).await?;
    let pulls = ctx.destination.list_pulls(ctx.repo).await?;
    let issues = ctx.destination.list_issues(ctx.repo).await?;
    Ok(DestinationState {
        branches: branches.into_iter().collect(),
        pulls: pulls.into_iter().collect(),
        issue_titles: issues.into_iter().map(|issue| issue.title).collect(),
    })
}

/// Migrate one request: open, label, set the milestone, comment, then close
async fn migrate_request(
    ctx: &RepositoryContext<'_>,
    catalog: &mut LabelCatalog,
    labels: &LabelMapping,
    milestones: &MilestoneMapping,
    state: &mut DestinationState,
    request: &SourceRequest,
) -> Result<ItemOutcome, MigratorError> {
    if !state.branches.contains(&request.source_branch)
        || !state.branches.contains(&request.target_branch)
    {
        warn!(
            "Merge request !{}: missing branch (source: {}, target: {})",
            request.iid, request.source_branch, request.target_branch
        );
        return record_skipped(ctx, state, request).await;
    }

    let pull_state = NormalizedState::from_request(&request.state);
    let key = ExistingItem {
        title: request.title.clone(),
        state: pull_state,
    };
    if state.pulls.contains(&key) {
        return Ok(ItemOutcome::Skipped(format!(
            "{} pull request with this title already exists",
            pull_state.as_str()
        )));
    }

    let pull = NewPull {
        title: request.title.clone(),
        body: request.description.clone().unwrap_or_default(),
        head: request.source_branch.clone(),
        base: request.target_branch.clone(),
    };
    let number = ctx.destination.create_pull(ctx.repo, pull).await?;
    state.pulls.insert(key);

    let names = catalog.resolve(ctx, labels, &request.labels).await;
    if !names.is_empty() {
        ctx.destination.add_labels(ctx.repo, number, names).await?;
    }
    if let Some(milestone) = request.milestone_id.and_then(|id| milestones.get(&id)) {
        ctx.destination
            .set_milestone(ctx.repo, number, *milestone)
            .await?;
    }

    let notes = ctx
        .source
        .list_request_notes(ctx.project_id, request.iid)
        .await?;
    ctx.copy_comments(number, notes).await?;

    if pull_state == NormalizedState::Closed {
        ctx.destination.close_pull(ctx.repo, number).await?;
    }
    Ok(ItemOutcome::Created)
}

/// Record a request without its branches as a closed issue
async fn record_skipped(
    ctx: &RepositoryContext<'_>,
    state: &mut DestinationState,
    request: &SourceRequest,
) -> Result<ItemOutcome, MigratorError> {
    let title = record_title(request);
    if state.issue_titles.contains(&title) {
        return Ok(ItemOutcome::Skipped("missing branch, already recorded".to_string()));
    }
    let issue = NewIssue {
        title: title.clone(),
        body: record_body(request),
        ..Default::default()
    };
    let number = ctx.destination.create_issue(ctx.repo, issue).await?;
    state.issue_titles.insert(title);
    ctx.destination.close_issue(ctx.repo, number).await?;
    Ok(ItemOutcome::Recorded(number))
}
