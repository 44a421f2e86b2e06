use std::fs;

use gitlab_migrator::platform::{Label, MemorySource, MemoryTarget, MemoryTargetState};
use gitlab_migrator::records::{BranchPair, EntityKind, MilestoneRef, RecordState, SourceRecord};
use gitlab_migrator::{MigrationError, Migrator, Settings};
use tempfile::TempDir;

fn settings(dir: &TempDir) -> Settings {
    toml::from_str(&format!(
        r#"
use-replacement-issues-for-creation-fails = true

[gitlab]
project-id = 42

[github]
owner = "acme"
repo = "widgets"

[attachments]
output-dir = "{}"
"#,
        dir.path().display()
    ))
    .unwrap()
}

fn record(kind: EntityKind, iid: u64, title: &str, state: RecordState) -> SourceRecord {
    let path = match kind {
        EntityKind::Issue => "issues",
        EntityKind::MergeRequest => "merge_requests",
        EntityKind::Milestone => "milestones",
    };
    let mut record = SourceRecord::new(
        kind,
        iid,
        title,
        state,
        format!("https://gitlab.test/acme/widgets/-/{path}/{iid}"),
    );
    record.body = format!("{title} details");
    record
}

/// A project with a deleted issue, a confidential issue, an issue GitHub
/// rejects and a screenshot upload.
fn project() -> MemorySource {
    let mut crash = record(EntityKind::Issue, 1, "Crash on start", RecordState::Closed);
    crash.body = "Stack trace: ![trace](/uploads/f00d/trace.png)".to_string();
    crash.milestone = Some(MilestoneRef {
        iid: 1,
        title: "v1.0".to_string(),
    });
    crash.labels = vec!["Bug".to_string()];

    let mut secret = record(EntityKind::Issue, 2, "Leaked credentials", RecordState::Open);
    secret.confidential = true;

    let mut feature = record(EntityKind::MergeRequest, 1, "Add widgets", RecordState::Open);
    feature.branches = Some(BranchPair {
        source: "feature/widgets".to_string(),
        target: "main".to_string(),
    });

    let mut source = MemorySource {
        description: Some("Widget factory".to_string()),
        milestones: vec![
            record(EntityKind::Milestone, 1, "v1.0", RecordState::Closed),
            record(EntityKind::Milestone, 2, "v2.0", RecordState::Open),
        ],
        labels: vec![Label {
            name: "Bug".to_string(),
            color: "#d73a4a".to_string(),
            description: "Something is broken".to_string(),
        }],
        issues: vec![
            crash,
            secret,
            record(EntityKind::Issue, 4, "Rejected by GitHub", RecordState::Open),
            record(EntityKind::Issue, 5, "Docs", RecordState::Open),
        ],
        merge_requests: vec![
            feature,
            record(EntityKind::MergeRequest, 2, "Old fix", RecordState::Merged),
        ],
        ..MemorySource::default()
    };
    source
        .attachments
        .insert("42/uploads/f00d/trace.png".to_string(), b"trace".to_vec());
    source
}

fn target() -> MemoryTarget {
    MemoryTarget::with_state(MemoryTargetState {
        branches: ["feature/widgets".to_string(), "main".to_string()].into(),
        rejected_titles: ["Rejected by GitHub".to_string()].into(),
        ..MemoryTargetState::default()
    })
}

#[tokio::test]
async fn full_run_keeps_numbers_aligned() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    let source = project();
    let target = target();

    let summary = Migrator::new(&settings, &source, &target)
        .migrate()
        .await
        .unwrap();

    let state = target.state();
    let titles: Vec<(u64, &str)> = state
        .records
        .iter()
        .map(|r| (r.number, r.title.as_str()))
        .collect();
    assert_eq!(
        titles,
        vec![
            (1, "Crash on start"),
            (2, "[PLACEHOLDER] - for confidential issue #2"),
            (3, "[PLACEHOLDER] - for issue #3"),
            (4, "Rejected by GitHub [REPLACEMENT ISSUE]"),
            (5, "Docs"),
            (6, "Add widgets"),
            (7, "Old fix - [merged]"),
        ]
    );
    assert!(!state.records[0].open);
    assert!(state.records[5].is_pull_request);
    assert!(!state.records[1].body.contains("Leaked credentials details"));
    assert_eq!(state.description.as_deref(), Some("Widget factory"));
    assert_eq!(state.milestones.len(), 2);

    assert_eq!(summary.issues.created, 2);
    assert_eq!(summary.issues.placeholders, 2);
    assert_eq!(summary.issues.replacements, 1);
    assert_eq!(summary.merge_requests.created, 2);
    assert_eq!(summary.labels.created, 3);
    assert!(summary.all_success());
}

#[tokio::test]
async fn full_run_writes_attachment_manifest() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    let source = project();
    let target = target();

    let summary = Migrator::new(&settings, &source, &target)
        .migrate()
        .await
        .unwrap();
    assert_eq!(summary.attachments, 1);
    assert!(summary.attachments_drained);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("attachments.json")).unwrap())
            .unwrap();
    let (repo_id, group) = manifest.as_object().unwrap().iter().next().unwrap();
    assert_eq!(group["repoUrl"], "https://github.com/acme/widgets.git");
    assert_eq!(
        group["uniqueGitTag"],
        format!("attachments-from-gitlab-{repo_id}")
    );

    let attachment = &group["attachments"][0];
    assert_eq!(
        attachment["targetPath"],
        format!(".github-migration/attachments/{repo_id}/f00d-trace.png")
    );
    let file = attachment["filePath"].as_str().unwrap();
    assert_eq!(fs::read(file).unwrap(), b"trace");

    let url = attachment["attachmentUrl"].as_str().unwrap();
    assert!(target.state().records[0]
        .body
        .starts_with(&format!("Stack trace: ![trace]({url})")));
}

#[tokio::test]
async fn second_run_is_refused_but_phases_converge() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    let source = project();
    let target = target();

    Migrator::new(&settings, &source, &target)
        .migrate()
        .await
        .unwrap();
    let created = target.state().records.clone();

    let rerun = Migrator::new(&settings, &source, &target).migrate().await;
    assert!(matches!(
        rerun,
        Err(MigrationError::ExistingTargetRecords { .. })
    ));

    let mut resume = Migrator::new(&settings, &source, &target);
    resume.migrate_issues().await.unwrap();
    resume.migrate_merge_requests().await.unwrap();

    assert_eq!(target.state().records, created);
    assert_eq!(resume.summary().issues.new_on_target(), 0);
    assert_eq!(resume.summary().merge_requests.new_on_target(), 0);
    assert_eq!(resume.summary().issues.existing, 5);
}

#[tokio::test]
async fn merge_request_failure_aborts_without_manifest() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    let source = project();
    let target = target();
    target
        .state()
        .rejected_titles
        .insert("Old fix - [merged]".to_string());

    let result = Migrator::new(&settings, &source, &target).migrate().await;

    assert!(matches!(
        result,
        Err(MigrationError::MergeRequestCreation { iid: 2, .. })
    ));
    assert_eq!(target.state().records.len(), 6);
    assert!(!dir.path().join("attachments.json").exists());
}

#[tokio::test]
async fn projects_share_one_manifest() {
    let dir = TempDir::new().unwrap();
    let base = settings(&dir);

    for (project_id, github_path) in [(1, "acme/widgets"), (2, "acme/gadgets")] {
        let settings = base.for_project(project_id, github_path);
        let mut source = MemorySource {
            issues: vec![record(EntityKind::Issue, 1, "Logo", RecordState::Open)],
            ..MemorySource::default()
        };
        source.issues[0].body = "![logo](/uploads/beef/logo.png)".to_string();
        source.attachments.insert(
            format!("{project_id}/uploads/beef/logo.png"),
            b"logo".to_vec(),
        );

        Migrator::new(&settings, &source, &MemoryTarget::new())
            .migrate()
            .await
            .unwrap();
    }

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("attachments.json")).unwrap())
            .unwrap();
    let repo_urls: Vec<&str> = manifest
        .as_object()
        .unwrap()
        .values()
        .map(|group| group["repoUrl"].as_str().unwrap())
        .collect();
    assert_eq!(repo_urls.len(), 2);
    assert!(repo_urls.contains(&"https://github.com/acme/widgets.git"));
    assert!(repo_urls.contains(&"https://github.com/acme/gadgets.git"));
}

#[tokio::test]
async fn failed_close_after_creation_keeps_numbers_aligned() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    let source = project();
    let target = target();
    target
        .state()
        .unclosable_titles
        .insert("Crash on start".to_string());

    let summary = Migrator::new(&settings, &source, &target)
        .migrate()
        .await
        .unwrap();

    {
        let state = target.state();
        assert_eq!(state.records[0].number, 1);
        assert_eq!(state.records[0].title, "Crash on start");
        assert!(state.records[0].open);
        assert_eq!(state.records[4].number, 5);
        assert_eq!(state.records[4].title, "Docs");
        assert!(!state
            .records
            .iter()
            .any(|r| r.title == "Crash on start [REPLACEMENT ISSUE]"));
    }
    assert_eq!(summary.issues.created, 2);
    assert_eq!(summary.issues.replacements, 1);
    assert_eq!(summary.issues.failed, 0);

    let mut resume = Migrator::new(&settings, &source, &target);
    resume.migrate_issues().await.unwrap();
    assert!(!target.state().records[0].open);
    assert_eq!(resume.summary().issues.new_on_target(), 0);
}
