//! Migration of every repository, one after the other
use log::{debug, error, info, warn};

use crate::{
    config::MigrationConfig,
    errors::MigratorError,
    mapping::{LabelMapping, MilestoneMapping},
    migrate::{
        issues::migrate_issues, labels::migrate_labels, milestones::migrate_milestones,
        requests::migrate_requests, RepositoryContext,
    },
    outcome::{MigrationOutcome, RepositoryReport},
    platform::{DestinationPlatform, SourcePlatform},
    provision::ensure_repository,
    resolver::Resolver,
    transport::{HistoryTransport, MirrorJob},
    utils::{DestinationHandle, RepositoryDescriptor},
};

/// Runs the migration steps in order for each repository
pub struct Orchestrator<'a> {
    /// Resolved configuration
    config: &'a MigrationConfig,

    /// Platform the repositories come from
    source: &'a dyn SourcePlatform,

    /// Platform the repositories go to
    destination: &'a dyn DestinationPlatform,

    /// History copy
    transport: &'a dyn HistoryTransport,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator
    pub fn new(
        config: &'a MigrationConfig,
        source: &'a dyn SourcePlatform,
        destination: &'a dyn DestinationPlatform,
        transport: &'a dyn HistoryTransport,
    ) -> Self {
        Self {
            config,
            source,
            destination,
            transport,
        }
    }

    /// Migrate the configured repository, or every repository of the group
    /// # Errors
    /// Error if the repositories can't be resolved
    pub async fn run(&self) -> Result<MigrationOutcome, MigratorError> {
        let resolver = Resolver::new(self.source);
        let repositories = match &self.config.target_repo {
            Some(name) => vec![resolver.find_repository(name).await?],
            None => resolver.list_repositories().await?,
        };
        let mut outcome = MigrationOutcome {
            succeeded: 0,
            total: repositories.len(),
            reports: vec![],
        };
        for repo in &repositories {
            match self.migrate_repository(repo).await {
                Ok(report) => {
                    outcome.succeeded += 1;
                    outcome.reports.push(report);
                }
                Err(e) => error!("Migration of {} failed: {e}", repo.name),
            }
        }
        info!("{}/{} repositories migrated", outcome.succeeded, outcome.total);
        Ok(outcome)
    }

    /// Migrate one repository.
    ///
    /// Only provisioning can fail the repository, later steps log their failures.
    /// # Errors
    /// `Provision` error if the destination repository can't be created
    pub async fn migrate_repository(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<RepositoryReport, MigratorError> {
        info!("Migrating {}", repo.show_full_name());
        let handle = ensure_repository(self.destination, repo, self.config).await?;
        let mut report = RepositoryReport {
            name: repo.name.clone(),
            history_copied: self.copy_history(repo, &handle).await,
            ..Default::default()
        };

        let ctx = RepositoryContext {
            source: self.source,
            destination: self.destination,
            project_id: repo.id,
            repo: &handle,
            item_delay: self.config.item_delay,
        };
        let mut labels = LabelMapping::new();
        let mut milestones = MilestoneMapping::new();
        if self.config.migrate_labels {
            (labels, report.labels) = migrate_labels(&ctx).await;
        }
        if self.config.migrate_milestones {
            (milestones, report.milestones) = migrate_milestones(&ctx).await;
        }
        debug!(
            "{}: {} labels and {} milestones mapped",
            repo.name,
            labels.len(),
            milestones.len()
        );
        if self.config.migrate_issues {
            report.issues = migrate_issues(&ctx, &labels, &milestones).await;
        }
        if self.config.migrate_merge_requests {
            report.requests = migrate_requests(&ctx, &labels, &milestones).await;
        }
        info!("Migration of {} done", repo.name);
        Ok(report)
    }

    /// Copy the git history, failures are logged and the migration goes on
    async fn copy_history(&self, repo: &RepositoryDescriptor, handle: &DestinationHandle) -> bool {
        let urls = self
            .source
            .authenticated_url(repo)
            .and_then(|source_url| {
                Ok((source_url, self.destination.authenticated_url(handle)?))
            });
        let (source_url, destination_url) = match urls {
            Ok(urls) => urls,
            Err(e) => {
                error!("Unable to build the clone URLs of {}: {e}", repo.name);
                return false;
            }
        };
        let job = MirrorJob {
            name: repo.name.clone(),
            source_url,
            destination_url,
        };
        match self.transport.transport_history(job).await {
            Ok(()) => true,
            Err(e) => {
                warn!("History of {} not copied: {e}", repo.name);
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        entities::{SourceIssue, SourceLabel},
        errors::MigratorErrorKind,
        test_utils::{descriptor, test_config, FakeDestination, FakeSource, FakeTransport},
    };

    fn source_with_content() -> FakeSource {
        FakeSource {
            projects: vec![descriptor(1, "api"), descriptor(2, "web")],
            labels: vec![SourceLabel {
                name: "bug".to_string(),
                color: Some("#ff0000".to_string()),
                description: None,
            }],
            issues: vec![SourceIssue {
                iid: 1,
                title: "Crash".to_string(),
                state: "opened".to_string(),
                labels: vec!["bug".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn provision_failure_fails_only_that_repository() {
        let source = source_with_content();
        let destination = FakeDestination::default();
        destination.state().refused_repos.insert("api".to_string());
        let transport = FakeTransport::default();
        let config = test_config();

        let outcome = Orchestrator::new(&config, &source, &destination, &transport)
            .run()
            .await
            .expect("resolved");
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.reports[0].name, "web");
        assert_eq!(transport.jobs(), vec!["web".to_string()]);
    }

    #[tokio::test]
    async fn transport_failure_still_migrates_metadata() {
        let source = source_with_content();
        let destination = FakeDestination::default();
        let transport = FakeTransport::failing();
        let mut config = test_config();
        config.target_repo = Some("api".to_string());

        let outcome = Orchestrator::new(&config, &source, &destination, &transport)
            .run()
            .await
            .expect("resolved");
        assert_eq!(outcome.succeeded, 1);
        let report = &outcome.reports[0];
        assert!(!report.history_copied);
        assert_eq!(report.labels.created, 1);
        assert_eq!(report.issues.created, 1);
        assert_eq!(destination.state().issues[0].issue.labels, vec!["bug"]);
    }

    #[tokio::test]
    async fn disabled_steps_are_skipped() {
        let source = source_with_content();
        let destination = FakeDestination::default();
        let transport = FakeTransport::default();
        let mut config = test_config();
        config.target_repo = Some("web".to_string());
        config.migrate_labels = false;
        config.migrate_issues = false;

        let outcome = Orchestrator::new(&config, &source, &destination, &transport)
            .run()
            .await
            .expect("resolved");
        let report = &outcome.reports[0];
        assert!(report.history_copied);
        assert_eq!(report.labels.total, 0);
        assert_eq!(report.issues.total, 0);
        let state = destination.state();
        assert!(state.created_labels.is_empty());
        assert!(state.issues.is_empty());
    }

    #[tokio::test]
    async fn unknown_target_is_an_error() {
        let source = source_with_content();
        let destination = FakeDestination::default();
        let transport = FakeTransport::default();
        let mut config = test_config();
        config.target_repo = Some("docs".to_string());

        let err = Orchestrator::new(&config, &source, &destination, &transport)
            .run()
            .await
            .expect_err("no such repository");
        assert_eq!(err.kind(), &MigratorErrorKind::NotFound);
        assert!(destination.state().created_repos.is_empty());
    }
}
