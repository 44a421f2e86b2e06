use std::path::{Path, PathBuf};

use gitlab_migrator::attachments::StorageBackend;
use gitlab_migrator::records::RecordState;
use gitlab_migrator::{load_project_list, ConfigError, ProjectListError, Settings};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/settings")
}

#[test]
fn load_settings_from_fixture() {
    let settings = Settings::load(&fixtures_root().join("full.toml")).unwrap();

    assert_eq!(settings.gitlab.project_id, 1234);
    assert_eq!(
        settings.gitlab.url.as_deref(),
        Some("https://gitlab.example.com/")
    );
    assert_eq!(settings.github.owner, "acme");
    assert_eq!(settings.github.repo, "widgets");
    assert!(!settings.transfer.description);
    assert!(!settings.transfer.releases);
    assert!(settings.transfer.issues);
    assert!(settings.transfer.ancestor_milestones);
    assert!(!settings.use_placeholder_milestones_for_missing_milestones);
    assert!(settings.use_replacement_issues_for_creation_fails);
    assert_eq!(settings.filter_by_label.as_deref(), Some("migrate"));
    assert_eq!(
        settings.skipped_merge_request_states(),
        vec![RecordState::Closed, RecordState::Closed]
    );
    assert_eq!(settings.request_delay().as_millis(), 500);
    assert_eq!(settings.drain_timeout().as_secs(), 5);
    assert_eq!(
        settings.attachments.manifest_path(),
        Path::new("out/manifest.json")
    );
    assert_eq!(
        settings.storage_backend(),
        StorageBackend::ObjectStorage {
            bucket: "acme-attachments".to_string(),
            region: Some("eu-west-1".to_string()),
        }
    );
    assert_eq!(settings.csv_import.gitlab_project_id_column, 2);
    assert_eq!(settings.usermap.get("jdoe").map(String::as_str), Some("janedoe"));
}

#[test]
fn fixture_tokens_are_placeholders() {
    let path = fixtures_root().join("full.toml");
    let settings = Settings::load(&path).unwrap();

    assert!(matches!(
        settings.validate_tokens(&path),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn load_settings_rejects_invalid_fixture() {
    let result = Settings::load(&fixtures_root().join("slash-in-repo.toml"));

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn load_settings_reports_missing_file() {
    let result = Settings::load(&fixtures_root().join("missing.toml"));

    assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
}

#[test]
fn project_list_fixture_uses_configured_columns() {
    let settings = Settings::load(&fixtures_root().join("full.toml")).unwrap();
    let projects =
        load_project_list(&fixtures_root().join("projects.csv"), settings.csv_import).unwrap();

    let rows: Vec<(u64, &str, &str)> = projects
        .iter()
        .map(|p| {
            (
                p.gitlab_project_id,
                p.gitlab_path.as_str(),
                p.github_path.as_str(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![(11, "group/one", "acme/one"), (12, "group/two", "two")]
    );

    let second = settings.for_project(projects[1].gitlab_project_id, &projects[1].github_path);
    assert_eq!(second.gitlab.project_id, 12);
    assert_eq!(second.github.owner, "acme");
    assert_eq!(second.github.repo, "two");
}

#[test]
fn project_list_reports_missing_file() {
    let settings = Settings::load(&fixtures_root().join("full.toml")).unwrap();
    let result = load_project_list(&fixtures_root().join("missing.csv"), settings.csv_import);

    assert!(matches!(result, Err(ProjectListError::MissingFile { .. })));
}
