//! Command line options for the gitlab2github tool
use clap::Parser;
use log::{error, info};

use crate::{
    config::MigrationConfig,
    errors::MigratorError,
    github::config::GithubConfig,
    gitlab::config::GitlabConfig,
    orchestrator::Orchestrator,
    resolver::Resolver,
    transport::MirrorTransport,
    utils::RepositoryDescriptor,
};

/// gitlab2github - Migrate GitLab projects to GitHub
#[derive(Parser, Default, Clone, Debug)]
pub struct GitlabToGithubCli {
    /// Only migrate the repository with this name
    #[arg(short, long)]
    pub repo: Option<String>,

    /// List the repositories of the GitLab group
    #[arg(short, long)]
    pub list: bool,

    /// Show what would be migrated, without migrating
    #[arg(long)]
    pub dry_run: bool,

    /// Create every repository as private
    #[arg(long)]
    pub force_private: bool,

    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Verbose mode (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Run the tool with the provided command line options
/// # Errors
/// Error if the configuration is incomplete or the repositories can't be resolved
pub async fn gitlab2github_main(args: GitlabToGithubCli) -> Result<(), MigratorError> {
    let config = MigrationConfig::try_new(&args)?;
    let source = GitlabConfig::get_platform(&config);
    let resolver = Resolver::new(&source);

    if args.list {
        let repositories = resolver.list_repositories().await?;
        if repositories.is_empty() {
            println!("No repository found");
            return Ok(());
        }
        println!("Repositories of group {}:", config.gitlab_group_id);
        for repo in &repositories {
            println!("- {} - {}", repo.name, describe(repo));
        }
        println!("Total: {} repositories", repositories.len());
        return Ok(());
    }

    if args.dry_run {
        match &config.target_repo {
            Some(name) => {
                let repo = resolver.find_repository(name).await?;
                println!("Would migrate: {}", repo.show_full_name());
                println!("  description: {}", describe(&repo));
                println!("  visibility: {}", repo.visibility);
                println!("  url: {}", repo.web_url);
            }
            None => {
                let repositories = resolver.list_repositories().await?;
                println!("Would migrate {} repositories", repositories.len());
                for repo in &repositories {
                    println!("- {}", repo.show_full_name());
                }
            }
        }
        return Ok(());
    }

    let destination = GithubConfig::get_platform(&config);
    let transport = MirrorTransport::try_new()?;
    let orchestrator = Orchestrator::new(&config, &source, &destination, &transport);
    tokio::select! {
        outcome = orchestrator.run() => {
            let outcome = outcome?;
            info!(
                "Migration done: {}/{} repositories migrated",
                outcome.succeeded, outcome.total
            );
            for report in &outcome.reports {
                println!(
                    "{}: history {}",
                    report.name,
                    if report.history_copied { "copied" } else { "NOT copied" }
                );
                println!("  labels: {}", report.labels);
                println!("  milestones: {}", report.milestones);
                println!("  issues: {}", report.issues);
                println!("  merge requests: {}", report.requests);
            }
            println!("{}/{} repositories migrated", outcome.succeeded, outcome.total);
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            error!("Interrupted, removing {}", transport.scratch_root().display());
            transport.shutdown().await;
            Err("Interrupted".into())
        }
    }
}

/// Description of a repository for display
fn describe(repo: &RepositoryDescriptor) -> &str {
    match repo.description.as_deref() {
        Some(d) if !d.is_empty() => d,
        _ => "no description",
    }
}
