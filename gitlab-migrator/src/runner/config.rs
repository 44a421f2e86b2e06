//! Runner configuration.

use std::path::{Path, PathBuf};

/// Configuration for a migration run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the settings file.
    settings_path: PathBuf,
    /// GitLab token overriding the settings file.
    gitlab_token: Option<String>,
    /// GitHub token overriding the settings file.
    github_token: Option<String>,
    /// Project list for multi-project runs.
    projects_path: Option<PathBuf>,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(settings_path: PathBuf) -> Self {
        Self {
            settings_path,
            gitlab_token: None,
            github_token: None,
            projects_path: None,
        }
    }

    /// Sets the GitLab token, replacing the one in the settings file.
    pub fn with_gitlab_token(mut self, token: Option<String>) -> Self {
        self.gitlab_token = token;
        self
    }

    /// Sets the GitHub token, replacing the one in the settings file.
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token;
        self
    }

    /// Migrates every project listed in a CSV file instead of the one in the
    /// settings file.
    pub fn with_projects_path(mut self, projects_path: Option<PathBuf>) -> Self {
        self.projects_path = projects_path;
        self
    }

    /// Returns the settings file path.
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Returns the GitLab token override.
    pub fn gitlab_token(&self) -> Option<&str> {
        self.gitlab_token.as_deref()
    }

    /// Returns the GitHub token override.
    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }

    /// Returns the project list path.
    pub fn projects_path(&self) -> Option<&Path> {
        self.projects_path.as_deref()
    }
}
