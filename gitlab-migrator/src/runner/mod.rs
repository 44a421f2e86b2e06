//! Runs migrations for one or more projects.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::attachments::remove_stale_manifest;
use crate::config::Settings;
use crate::github::GitHubClient;
use crate::gitlab::GitLabClient;
use crate::migration::Migrator;
use crate::projects::load_project_list;
use crate::summary::{ProcessingResult, RunSummary};
use tracing::{error, info, info_span, Instrument};

/// Orchestrates a full migration run.
pub struct Runner {
    config: RunnerConfig,
    settings: Settings,
}

impl Runner {
    /// Loads settings and applies token overrides.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the settings file is invalid or a
    /// token is missing.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let mut settings = Settings::load(config.settings_path())?;
        if let Some(token) = config.gitlab_token() {
            settings.gitlab.token = token.to_string();
        }
        if let Some(token) = config.github_token() {
            settings.github.token = token.to_string();
        }
        settings.validate_tokens(config.settings_path())?;

        Ok(Self { config, settings })
    }

    /// Loaded settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings for every project to migrate, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ProjectList`] if the project list cannot be
    /// loaded.
    pub fn projects(&self) -> Result<Vec<Settings>, RunnerError> {
        let Some(path) = self.config.projects_path() else {
            return Ok(vec![self.settings.clone()]);
        };

        let projects = load_project_list(path, self.settings.csv_import)?;
        Ok(projects
            .iter()
            .map(|p| self.settings.for_project(p.gitlab_project_id, &p.github_path))
            .collect())
    }

    /// Migrates every project sequentially.
    ///
    /// The manifest of a previous run is removed once up front; every project
    /// then adds its group to the same manifest. A project that aborts is
    /// recorded and the run moves on to the next.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ProjectList`] if the project list cannot be
    /// loaded and [`RunnerError::Manifest`] if a stale manifest cannot be
    /// removed.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let projects = self.projects()?;
        self.clear_manifest().await?;
        info!(count = projects.len(), "Migrating projects");

        let mut summary = RunSummary::new();
        for settings in &projects {
            let span = info_span!(
                "project",
                id = settings.gitlab.project_id,
                repo = %format!("{}/{}", settings.github.owner, settings.github.repo)
            );
            let result = migrate_project(settings).instrument(span).await;
            summary.record_result(result);
        }
        Ok(summary)
    }

    async fn clear_manifest(&self) -> Result<(), RunnerError> {
        remove_stale_manifest(&self.settings.attachments.manifest_path()).await?;
        Ok(())
    }
}

async fn migrate_project(settings: &Settings) -> ProcessingResult {
    let repository = format!("{}/{}", settings.github.owner, settings.github.repo);
    let aborted = |error: String| {
        error!(error = %error, "Migration aborted");
        ProcessingResult::Aborted {
            project_id: settings.gitlab.project_id,
            repository: repository.clone(),
            error,
        }
    };

    let source = match GitLabClient::new(
        settings.gitlab.url.as_deref(),
        &settings.gitlab.token,
        settings.gitlab.project_id,
    ) {
        Ok(client) => client,
        Err(e) => return aborted(e.to_string()),
    };
    let target = match GitHubClient::new(
        settings.github.api_url.as_deref(),
        &settings.github.token,
        &settings.github.owner,
        &settings.github.repo,
        settings.request_delay(),
    ) {
        Ok(client) => client,
        Err(e) => return aborted(e.to_string()),
    };

    info!(source = %source.host(), "Starting migration");
    match Migrator::new(settings, &source, &target).migrate().await {
        Ok(summary) => {
            info!(
                failures = summary.failures(),
                attachments = summary.attachments,
                "Migration complete"
            );
            ProcessingResult::Completed(summary)
        }
        Err(e) => aborted(e.to_string()),
    }
}
