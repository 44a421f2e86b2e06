//! GitLab source platform over the REST v4 API.

mod convert;
mod types;

pub use types::{
    GitLabIssue, GitLabLabel, GitLabMergeRequest, GitLabMilestone, GitLabNote, GitLabProject,
    GitLabRelease,
};

use crate::platform::{ByteStream, Label, PlatformError, RecordFilter, Release, SourcePlatform};
use crate::records::{Note, SourceRecord};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "https://gitlab.com";

const PAGE_SIZE: &str = "100";

/// Read-only client for one GitLab project.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    client: reqwest::Client,
    host: String,
    project_id: u64,
}

impl GitLabClient {
    /// Creates a client for `project_id` on `host`, authenticated with a
    /// personal access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn new(host: Option<&str>, token: &str, project_id: u64) -> Result<Self, PlatformError> {
        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(token)
            .map_err(|e| PlatformError::Rejected(format!("invalid GitLab token: {e}")))?;
        token.set_sensitive(true);
        headers.insert("PRIVATE-TOKEN", token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let host = host.unwrap_or(DEFAULT_HOST).trim_end_matches('/').to_string();
        Ok(Self {
            client,
            host,
            project_id,
        })
    }

    /// Host the client talks to, without trailing slash.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/api/v4/projects/{}{path}", self.host, self.project_id)
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, PlatformError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(PlatformError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let text = self.get(url, query).await?.text().await?;
        serde_json::from_str(&text).map_err(|source| PlatformError::DecodeError {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches every page of a list endpoint, following `x-next-page`.
    async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, PlatformError> {
        let mut items = Vec::new();
        let mut page = "1".to_string();

        loop {
            let mut params = query.to_vec();
            params.push(("per_page", PAGE_SIZE));
            params.push(("page", &page));

            let response = self.get(url, &params).await?;
            let next = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let text = response.text().await?;
            let batch: Vec<T> =
                serde_json::from_str(&text).map_err(|source| PlatformError::DecodeError {
                    url: url.to_string(),
                    source,
                })?;
            debug!(url, page = %page, count = batch.len(), "Fetched page");
            items.extend(batch);

            match next {
                Some(next) => page = next,
                None => return Ok(items),
            }
        }
    }

    async fn fetch_notes(&self, path: &str) -> Result<Vec<Note>, PlatformError> {
        let notes: Vec<GitLabNote> = self
            .get_all(&self.project_url(path), &[("sort", "asc")])
            .await?;
        Ok(notes.into_iter().filter_map(convert::to_note).collect())
    }

    async fn fetch_records<T, F>(
        &self,
        path: &str,
        filter: &RecordFilter,
        convert: F,
    ) -> Result<Vec<SourceRecord>, PlatformError>
    where
        T: DeserializeOwned,
        F: Fn(T) -> SourceRecord,
    {
        let mut query = vec![("sort", "asc"), ("scope", "all")];
        if let Some(label) = &filter.label {
            query.push(("labels", label.as_str()));
        }

        let items: Vec<T> = self.get_all(&self.project_url(path), &query).await?;
        Ok(items.into_iter().map(convert).collect())
    }
}

#[async_trait]
impl SourcePlatform for GitLabClient {
    async fn project_description(&self) -> Result<Option<String>, PlatformError> {
        let project: GitLabProject = self.get_json(&self.project_url(""), &[]).await?;
        Ok(project.description.filter(|d| !d.trim().is_empty()))
    }

    async fn merge_requests_enabled(&self) -> bool {
        match self
            .get_json::<GitLabProject>(&self.project_url(""), &[])
            .await
        {
            Ok(project) => project.merge_requests_enabled.unwrap_or_else(|| {
                warn!(
                    project_id = self.project_id,
                    "Project does not report merge_requests_enabled"
                );
                false
            }),
            Err(e) => {
                error!(project_id = self.project_id, error = %e, "Failed to fetch project");
                false
            }
        }
    }

    async fn releases_enabled(&self) -> bool {
        match self
            .get(&self.project_url("/releases"), &[("per_page", "1")])
            .await
        {
            Ok(_) => true,
            Err(PlatformError::UnexpectedStatus { status, .. })
                if status == StatusCode::FORBIDDEN.as_u16() =>
            {
                debug!(project_id = self.project_id, "Releases are disabled");
                false
            }
            Err(e) => {
                error!(project_id = self.project_id, error = %e, "Failed to check releases");
                false
            }
        }
    }

    async fn fetch_milestones(
        &self,
        include_ancestors: bool,
    ) -> Result<Vec<SourceRecord>, PlatformError> {
        let include = if include_ancestors { "true" } else { "false" };
        let milestones: Vec<GitLabMilestone> = self
            .get_all(
                &self.project_url("/milestones"),
                &[("include_ancestors", include)],
            )
            .await?;
        Ok(milestones
            .into_iter()
            .map(convert::to_milestone_record)
            .collect())
    }

    async fn fetch_labels(&self) -> Result<Vec<Label>, PlatformError> {
        let labels: Vec<GitLabLabel> = self.get_all(&self.project_url("/labels"), &[]).await?;
        Ok(labels.into_iter().map(convert::to_label).collect())
    }

    async fn fetch_issues(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<SourceRecord>, PlatformError> {
        self.fetch_records::<GitLabIssue, _>("/issues", filter, convert::to_issue_record)
            .await
    }

    async fn fetch_merge_requests(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<SourceRecord>, PlatformError> {
        self.fetch_records::<GitLabMergeRequest, _>(
            "/merge_requests",
            filter,
            convert::to_merge_request_record,
        )
        .await
    }

    async fn fetch_releases(&self) -> Result<Vec<Release>, PlatformError> {
        let releases: Vec<GitLabRelease> =
            self.get_all(&self.project_url("/releases"), &[]).await?;
        Ok(releases.into_iter().map(convert::to_release).collect())
    }

    async fn fetch_issue_notes(&self, iid: u64) -> Result<Vec<Note>, PlatformError> {
        self.fetch_notes(&format!("/issues/{iid}/notes")).await
    }

    async fn fetch_merge_request_notes(&self, iid: u64) -> Result<Vec<Note>, PlatformError> {
        self.fetch_notes(&format!("/merge_requests/{iid}/notes"))
            .await
    }

    async fn fetch_attachment(&self, relative_path: &str) -> Option<ByteStream> {
        let url = format!("{}/api/v4/projects/{relative_path}", self.host);
        match self.get(&url, &[]).await {
            Ok(response) => Some(Box::pin(
                response.bytes_stream().map_err(std::io::Error::other),
            )),
            Err(e) => {
                error!(path = relative_path, error = %e, "Could not download attachment");
                None
            }
        }
    }
}
