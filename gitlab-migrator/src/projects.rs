//! Project lists for migrating several projects in one run.
//!
//! A project list is a CSV file with one project per row:
//!
//! ```text
//! gitlabProjectId,gitlabPath,githubPath
//! 42,acme/widgets,acme-gh/widgets
//! # comments and blank lines are ignored
//! 43,acme/gadgets,gadgets
//! ```
//!
//! The header row is optional and detected automatically.

use crate::config::CsvImportSettings;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while loading a project list.
#[derive(Debug, Error)]
pub enum ProjectListError {
    /// The file does not exist.
    #[error("Project list not found: {path}")]
    MissingFile { path: String },

    /// The file could not be read or parsed.
    #[error("Failed to read project list '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// No usable row was found.
    #[error("Project list '{path}' contains no valid projects")]
    Empty { path: String },
}

/// One row of a project list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMapping {
    /// GitLab project id.
    pub gitlab_project_id: u64,

    /// GitLab `group/project` path, informational.
    pub gitlab_path: String,

    /// GitHub `owner/repo` or bare repository name.
    pub github_path: String,
}

/// Loads a project list from `path`.
///
/// Rows that are too short, have empty values or a non-numeric id are
/// skipped with a warning.
///
/// # Errors
///
/// Returns [`ProjectListError`] if the file is missing, unreadable, or has no
/// valid rows.
pub fn load_project_list(
    path: &Path,
    columns: CsvImportSettings,
) -> Result<Vec<ProjectMapping>, ProjectListError> {
    let path_str = path.display().to_string();
    if !path.exists() {
        return Err(ProjectListError::MissingFile { path: path_str });
    }

    let file = std::fs::File::open(path).map_err(|e| ProjectListError::CsvError {
        path: path_str.clone(),
        source: e.into(),
    })?;
    let projects = parse_project_list(file, columns).map_err(|source| {
        ProjectListError::CsvError {
            path: path_str.clone(),
            source,
        }
    })?;

    if projects.is_empty() {
        return Err(ProjectListError::Empty { path: path_str });
    }

    info!(path = %path_str, count = projects.len(), "Loaded project list");
    Ok(projects)
}

/// Parses project list rows from any reader.
///
/// # Errors
///
/// Returns an error if the input is not valid CSV.
pub fn parse_project_list<R: std::io::Read>(
    reader: R,
    columns: CsvImportSettings,
) -> Result<Vec<ProjectMapping>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let needed = columns
        .gitlab_project_id_column
        .max(columns.gitlab_project_path_column)
        .max(columns.github_project_path_column);

    let mut projects = Vec::new();
    let mut first_row = true;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let is_first = std::mem::replace(&mut first_row, false);

        if needed >= record.len() {
            warn!(
                line,
                columns = record.len(),
                needed = needed + 1,
                "Row too short, skipping"
            );
            continue;
        }

        let id = &record[columns.gitlab_project_id_column];
        let gitlab_path = &record[columns.gitlab_project_path_column];
        let github_path = &record[columns.github_project_path_column];

        if is_first && looks_like_header(id) {
            info!(line, "Skipping header row");
            continue;
        }

        if id.is_empty() || gitlab_path.is_empty() || github_path.is_empty() {
            warn!(line, "Row has empty values, skipping");
            continue;
        }

        let Ok(gitlab_project_id) = id.parse::<u64>() else {
            warn!(line, id, "Invalid project id, skipping");
            continue;
        };

        projects.push(ProjectMapping {
            gitlab_project_id,
            gitlab_path: gitlab_path.to_string(),
            github_path: github_path.to_string(),
        });
    }

    Ok(projects)
}

fn looks_like_header(id: &str) -> bool {
    let lower = id.to_lowercase();
    id.parse::<u64>().is_err() || lower.contains("id") || lower.contains("project")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> Vec<ProjectMapping> {
        parse_project_list(content.as_bytes(), CsvImportSettings::default()).unwrap()
    }

    #[test]
    fn can_parse_with_header_and_comments() {
        let projects = parse(
            "gitlabProjectId,gitlabPath,githubPath\n\
             # first batch\n\
             42, acme/widgets , acme-gh/widgets\n\
             \n\
             43,acme/gadgets,gadgets\n",
        );

        assert_eq!(
            projects,
            vec![
                ProjectMapping {
                    gitlab_project_id: 42,
                    gitlab_path: "acme/widgets".to_string(),
                    github_path: "acme-gh/widgets".to_string(),
                },
                ProjectMapping {
                    gitlab_project_id: 43,
                    gitlab_path: "acme/gadgets".to_string(),
                    github_path: "gadgets".to_string(),
                },
            ]
        );
    }

    #[test]
    fn first_numeric_row_is_data() {
        let projects = parse("1,a/b,c/d\n2,e/f,g/h\n");
        assert_eq!(projects.len(), 2);
    }

    #[test]
    fn skips_invalid_rows() {
        let projects = parse("1,a/b,c/d\n2,e/f\nx,g/h,i/j\n3,,k/l\n4,m/n,o/p\n");
        assert_eq!(
            projects
                .iter()
                .map(|p| p.gitlab_project_id)
                .collect::<Vec<_>>(),
            vec![1, 4]
        );
    }

    #[test]
    fn respects_custom_columns() {
        let columns = CsvImportSettings {
            gitlab_project_id_column: 2,
            gitlab_project_path_column: 0,
            github_project_path_column: 1,
        };
        let projects = parse_project_list("a/b,c/d,5\n".as_bytes(), columns).unwrap();
        assert_eq!(projects[0].gitlab_project_id, 5);
        assert_eq!(projects[0].github_path, "c/d");
    }

    #[test]
    fn load_rejects_missing_and_empty_files() {
        let temp = TempDir::new().unwrap();
        let missing =
            load_project_list(&temp.path().join("none.csv"), CsvImportSettings::default());
        assert!(matches!(missing, Err(ProjectListError::MissingFile { .. })));

        let path = temp.path().join("empty.csv");
        std::fs::write(&path, "gitlabProjectId,gitlabPath,githubPath\n").unwrap();
        let empty = load_project_list(&path, CsvImportSettings::default());
        assert!(matches!(empty, Err(ProjectListError::Empty { .. })));
    }
}
