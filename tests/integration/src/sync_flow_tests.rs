//! End-to-end sync scenarios through the public API
//!
//! These tests walk a project through a realistic template lifecycle:
//! initial deployment, user customization of every file class, a template
//! upgrade, and verification that nothing the user wrote was lost and
//! nothing the template added was dropped.

use pretty_assertions::assert_eq;
use tpl_core::{
    BackupManager, BackupType, Dependencies, DirectoryDeployer, FixedVersion, SyncEngine,
    SyncOptions, recorded_template_version,
};
use tpl_fs::NormalizedPath;
use tpl_merge::formats::USER_ENTRIES_HEADER;
use tpl_test_utils::TestProject;

const GUIDE_V1: &str = "\
# Project Guide

<!-- tpl:section:getting-started -->
Install the tool and run `sync`.
<!-- /tpl:section:getting-started -->
";

const GUIDE_V2: &str = "\
# Project Guide

<!-- tpl:section:getting-started -->
Install the tool, then run `sync --check` first.
<!-- /tpl:section:getting-started -->

<!-- tpl:section:troubleshooting -->
Check the backup directory before filing a bug.
<!-- /tpl:section:troubleshooting -->
";

fn deps(template_dir: NormalizedPath, version: &str) -> Dependencies {
    Dependencies {
        deployer: Box::new(DirectoryDeployer::new(template_dir)),
        version_source: Box::new(FixedVersion(version.to_string())),
    }
}

fn stage_v1(project: &TestProject) -> NormalizedPath {
    project.stage_template(
        "template-v1",
        &[
            (
                "config.yaml",
                "template_version: 1.0.0\nproject_name: unnamed\n",
            ),
            (
                "sections/workflow.yaml",
                "branch_prefix: feature/\nreview_required: true\n",
            ),
            (
                "sections/settings.json",
                "{\n  \"telemetry\": false\n}\n",
            ),
            ("GUIDE.md", GUIDE_V1),
            (".templateignore", "*.bak\n"),
        ],
    )
}

fn stage_v2(project: &TestProject) -> NormalizedPath {
    project.stage_template(
        "template-v2",
        &[
            (
                "config.yaml",
                "template_version: 2.0.0\nproject_name: unnamed\n",
            ),
            // review_required default flipped, auto_rebase added
            (
                "sections/workflow.yaml",
                "branch_prefix: feature/\nreview_required: false\nauto_rebase: true\n",
            ),
            (
                "sections/settings.json",
                "{\n  \"telemetry\": false\n}\n",
            ),
            ("GUIDE.md", GUIDE_V2),
            (".templateignore", "*.bak\n*.orig\n"),
        ],
    )
}

#[test]
fn full_lifecycle_preserves_user_work_and_tracks_the_template() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    // Initial deployment
    let result = engine
        .sync(&deps(stage_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();
    assert!(result.ran);
    assert_eq!(
        recorded_template_version(&project.norm_root()).unwrap(),
        "1.0.0"
    );

    // The owner customizes every class of file
    project.write_config_file("config.yaml", "template_version: 1.0.0\nproject_name: skunkworks\n");
    project.write_config_file(
        "sections/workflow.yaml",
        "branch_prefix: sw/\nreview_required: true\n",
    );
    project.write_config_file(".templateignore", "*.bak\nsecrets/\n");
    project.write_config_file("identity.yaml", "owner: alice\nteam: platform\n");
    let guide_with_notes = format!(
        "{GUIDE_V1}\n<!-- tpl:section:house-rules -->\nDeploys happen on Fridays. Kidding.\n<!-- /tpl:section:house-rules -->\n"
    );
    project.write_config_file("GUIDE.md", &guide_with_notes);

    // Template upgrade
    let result = engine
        .sync(&deps(stage_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();
    assert!(result.ran);
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    assert!(result.backup_path.is_some());

    // Structured three-way: edited values survive, unedited defaults track
    // the template, new fields appear
    assert_eq!(
        project.read_config_file("sections/workflow.yaml"),
        "auto_rebase: true\nbranch_prefix: sw/\nreview_required: false\n"
    );

    // The recorded version is template-owned; the project name is not
    assert_eq!(
        project.read_config_file("config.yaml"),
        "project_name: skunkworks\ntemplate_version: 2.0.0\n"
    );

    // Ignore file: template entries first, user entries under the marker
    assert_eq!(
        project.read_config_file(".templateignore"),
        format!("*.bak\n*.orig\n\n{USER_ENTRIES_HEADER}\nsecrets/\n")
    );

    // Guide: template sections refreshed, user section carried forward
    let guide = project.read_config_file("GUIDE.md");
    assert!(guide.contains("run `sync --check` first"));
    assert!(guide.contains("tpl:section:troubleshooting"));
    assert!(guide.contains("Deploys happen on Fridays. Kidding."));

    // The identity file only the project knows about came back verbatim
    assert_eq!(
        project.read_config_file("identity.yaml"),
        "owner: alice\nteam: platform\n"
    );
}

#[test]
fn second_sync_to_same_version_is_a_noop() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps(stage_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();
    project.write_config_file("sections/workflow.yaml", "branch_prefix: sw/\n");

    let result = engine
        .sync(&deps(stage_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    assert!(!result.ran);
    assert_eq!(
        project.read_config_file("sections/workflow.yaml"),
        "branch_prefix: sw/\n"
    );
}

#[test]
fn upgrade_then_forced_rerun_is_byte_stable() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps(stage_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();
    project.write_config_file(
        "sections/workflow.yaml",
        "branch_prefix: sw/\nreview_required: true\n",
    );
    project.write_config_file(".templateignore", "*.bak\nsecrets/\n");

    engine
        .sync(&deps(stage_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();
    let workflow_first = project.read_config_file("sections/workflow.yaml");
    let ignore_first = project.read_config_file(".templateignore");
    let guide_first = project.read_config_file("GUIDE.md");

    let options = SyncOptions {
        force: true,
        ..SyncOptions::default()
    };
    engine
        .sync(&deps(stage_v2(&project), "2.0.0"), &options)
        .unwrap();

    assert_eq!(project.read_config_file("sections/workflow.yaml"), workflow_first);
    assert_eq!(project.read_config_file(".templateignore"), ignore_first);
    assert_eq!(project.read_config_file("GUIDE.md"), guide_first);
}

#[test]
fn snapshots_accumulate_and_verify() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps(stage_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();
    engine
        .sync(&deps(stage_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();

    let manager = BackupManager::new(project.norm_root());
    let snapshots = manager.list_snapshots().unwrap();
    assert_eq!(snapshots.len(), 1);

    let metadata = manager.load_metadata(&snapshots[0]).unwrap();
    assert_eq!(metadata.backup_type, BackupType::PreSync);
    assert!(
        metadata
            .backed_up_items
            .contains(&"sections/workflow.yaml".to_string())
    );
    assert!(manager.verify(&snapshots[0]).unwrap().is_empty());

    // The snapshot carries the v1 defaults tier that powered the merge
    let base = snapshots[0].join(".template-defaults/sections/workflow.yaml");
    assert!(base.is_file());
}

#[test]
fn warnings_surface_without_stopping_the_sync() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps(stage_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();
    project.write_config_file("sections/workflow.yaml", "branch_prefix: [unclosed");
    project.write_config_file("sections/settings.json", "{\n  \"telemetry\": true\n}\n");

    let result = engine
        .sync(&deps(stage_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();

    assert!(result.ran);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].path, "sections/workflow.yaml");
    // The healthy file still merged
    assert_eq!(
        project.read_config_file("sections/settings.json"),
        "{\n  \"telemetry\": true\n}\n"
    );
}
