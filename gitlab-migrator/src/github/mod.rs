//! GitHub target platform over octocrab.

mod rate_limit;

pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, RateLimitInfo};

use crate::platform::{
    IssueDraft, Label, MilestoneDraft, PlatformError, PullRequestDraft, ReleaseDraft,
    TargetPlatform,
};
use crate::records::{RecordState, TargetMilestone, TargetRecord};
use async_trait::async_trait;
use octocrab::models::IssueState;
use octocrab::{params, Octocrab, Page};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Milestone as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
struct GitHubMilestone {
    number: u64,
    title: String,
}

impl From<GitHubMilestone> for TargetMilestone {
    fn from(m: GitHubMilestone) -> Self {
        Self {
            number: m.number,
            title: m.title,
        }
    }
}

/// Client for the repository receiving the migration.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
    owner: String,
    repo: String,
    request_delay: Duration,
}

impl GitHubClient {
    /// Creates a client for `owner/repo`.
    ///
    /// `api_url` overrides the API endpoint for GitHub Enterprise.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or the client cannot be
    /// built.
    pub fn new(
        api_url: Option<&str>,
        token: &str,
        owner: &str,
        repo: &str,
        request_delay: Duration,
    ) -> Result<Self, PlatformError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(api_url) = api_url {
            builder = builder.base_uri(api_url)?;
        }

        Ok(Self {
            octocrab: builder.build()?,
            owner: owner.to_string(),
            repo: repo.to_string(),
            request_delay,
        })
    }

    /// `owner/repo`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn route(&self, path: &str) -> String {
        format!("/repos/{}/{}{path}", self.owner, self.repo)
    }

    /// Waits for quota before a mutating call.
    async fn before_write(&self) -> Result<(), PlatformError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        Ok(())
    }

    /// Spaces out mutating calls.
    async fn after_write(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    async fn set_open(&self, number: u64, open: bool) -> Result<(), PlatformError> {
        let state = if open {
            IssueState::Open
        } else {
            IssueState::Closed
        };

        self.before_write().await?;
        self.octocrab
            .issues(&self.owner, &self.repo)
            .update(number)
            .state(state)
            .send()
            .await?;
        self.after_write().await;
        Ok(())
    }

    async fn label_pull_request(
        &self,
        number: u64,
        draft: &PullRequestDraft,
    ) -> Result<(), PlatformError> {
        self.before_write().await?;
        let issues = self.octocrab.issues(&self.owner, &self.repo);
        let mut update = issues.update(number).labels(&draft.labels);
        if let Some(milestone) = draft.milestone {
            update = update.milestone(milestone);
        }
        update.send().await?;
        self.after_write().await;
        Ok(())
    }
}

fn is_not_found(error: &octocrab::Error) -> bool {
    matches!(error, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

#[async_trait]
impl TargetPlatform for GitHubClient {
    async fn has_issues_or_pull_requests(&self) -> Result<bool, PlatformError> {
        let page = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .list()
            .state(params::State::All)
            .per_page(1)
            .send()
            .await?;
        Ok(!page.items.is_empty())
    }

    async fn update_description(&self, description: &str) -> Result<(), PlatformError> {
        self.before_write().await?;
        let _: serde_json::Value = self
            .octocrab
            .patch(
                self.route(""),
                Some(&serde_json::json!({ "description": description })),
            )
            .await?;
        self.after_write().await;
        Ok(())
    }

    async fn list_milestones(&self) -> Result<Vec<TargetMilestone>, PlatformError> {
        let page: Page<GitHubMilestone> = self
            .octocrab
            .get(
                self.route("/milestones"),
                Some(&[("state", "all"), ("per_page", "100"), ("direction", "asc")]),
            )
            .await?;
        let milestones = self.octocrab.all_pages(page).await?;
        Ok(milestones.into_iter().map(TargetMilestone::from).collect())
    }

    async fn create_milestone(
        &self,
        draft: &MilestoneDraft,
    ) -> Result<TargetMilestone, PlatformError> {
        let state = if draft.state.is_open() { "open" } else { "closed" };

        self.before_write().await?;
        let created: GitHubMilestone = self
            .octocrab
            .post(
                self.route("/milestones"),
                Some(&serde_json::json!({
                    "title": draft.title,
                    "description": draft.description,
                    "state": state,
                })),
            )
            .await?;
        self.after_write().await;
        Ok(created.into())
    }

    async fn list_label_names(&self) -> Result<Vec<String>, PlatformError> {
        let page = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .list_labels_for_repo()
            .per_page(100)
            .send()
            .await?;
        let labels = self.octocrab.all_pages(page).await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn create_label(&self, label: &Label) -> Result<(), PlatformError> {
        self.before_write().await?;
        self.octocrab
            .issues(&self.owner, &self.repo)
            .create_label(
                &label.name,
                label.color.trim_start_matches('#'),
                &label.description,
            )
            .await?;
        self.after_write().await;
        Ok(())
    }

    async fn release_exists(&self, tag_name: &str) -> Result<bool, PlatformError> {
        match self
            .octocrab
            .repos(&self.owner, &self.repo)
            .releases()
            .get_by_tag(tag_name)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_release(&self, draft: &ReleaseDraft) -> Result<(), PlatformError> {
        self.before_write().await?;
        self.octocrab
            .repos(&self.owner, &self.repo)
            .releases()
            .create(&draft.tag_name)
            .name(&draft.name)
            .body(&draft.body)
            .send()
            .await?;
        self.after_write().await;
        Ok(())
    }

    async fn branch_exists(&self, branch: &str) -> Result<bool, PlatformError> {
        match self
            .octocrab
            .repos(&self.owner, &self.repo)
            .get_ref(&params::repos::Reference::Branch(branch.to_string()))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_issues(&self) -> Result<Vec<TargetRecord>, PlatformError> {
        let page = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .list()
            .state(params::State::All)
            .per_page(100)
            .send()
            .await?;
        let issues = self.octocrab.all_pages(page).await?;
        debug!(count = issues.len(), "Listed target issues");

        Ok(issues
            .into_iter()
            .map(|issue| TargetRecord {
                number: issue.number,
                title: issue.title,
                body: issue.body.unwrap_or_default(),
                open: issue.state == IssueState::Open,
                is_pull_request: issue.pull_request.is_some(),
            })
            .collect())
    }

    async fn list_pull_requests(&self) -> Result<Vec<TargetRecord>, PlatformError> {
        let page = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .list()
            .state(params::State::All)
            .per_page(100)
            .send()
            .await?;
        let pulls = self.octocrab.all_pages(page).await?;
        debug!(count = pulls.len(), "Listed target pull requests");

        Ok(pulls
            .into_iter()
            .map(|pull| TargetRecord {
                number: pull.number,
                title: pull.title.unwrap_or_default(),
                body: pull.body.unwrap_or_default(),
                open: pull.state == Some(IssueState::Open),
                is_pull_request: true,
            })
            .collect())
    }

    async fn create_issue(&self, draft: &IssueDraft) -> Result<TargetRecord, PlatformError> {
        self.before_write().await?;
        let issues = self.octocrab.issues(&self.owner, &self.repo);
        let mut request = issues
            .create(&draft.title)
            .body(&draft.body)
            .labels(draft.labels.clone());
        if let Some(milestone) = draft.milestone {
            request = request.milestone(milestone);
        }
        let issue = request.send().await?;
        self.after_write().await;

        // The number is taken now; a failed close is mirrored on the next run.
        let mut open = true;
        if !draft.state.is_open() {
            match self.set_open(issue.number, false).await {
                Ok(()) => open = false,
                Err(e) => warn!(
                    number = issue.number,
                    title = %draft.title,
                    error = %e,
                    "Created issue but could not close it"
                ),
            }
        }

        Ok(TargetRecord {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            open,
            is_pull_request: false,
        })
    }

    async fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
    ) -> Result<TargetRecord, PlatformError> {
        self.before_write().await?;
        let pull = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .create(&draft.title, &draft.head, &draft.base)
            .body(&draft.body)
            .send()
            .await?;
        self.after_write().await;

        if !draft.labels.is_empty() || draft.milestone.is_some() {
            if let Err(e) = self.label_pull_request(pull.number, draft).await {
                warn!(
                    number = pull.number,
                    title = %draft.title,
                    error = %e,
                    "Created pull request but could not set labels or milestone"
                );
            }
        }

        Ok(TargetRecord {
            number: pull.number,
            title: pull.title.unwrap_or_default(),
            body: pull.body.unwrap_or_default(),
            open: true,
            is_pull_request: true,
        })
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), PlatformError> {
        self.before_write().await?;
        self.octocrab
            .issues(&self.owner, &self.repo)
            .create_comment(number, body)
            .await?;
        self.after_write().await;
        Ok(())
    }

    async fn update_state(
        &self,
        existing: &TargetRecord,
        state: RecordState,
    ) -> Result<(), PlatformError> {
        let open = state.is_open();
        if existing.open == open {
            return Ok(());
        }
        self.set_open(existing.number, open).await
    }
}
