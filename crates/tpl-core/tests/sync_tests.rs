//! Tests for the SyncEngine

use pretty_assertions::assert_eq;
use tpl_core::{
    Dependencies, Deployer, DirectoryDeployer, Error, FixedVersion, Result, SyncEngine,
    SyncOptions,
};
use tpl_fs::NormalizedPath;
use tpl_test_utils::TestProject;

fn deps_for(template_dir: NormalizedPath, version: &str) -> Dependencies {
    Dependencies {
        deployer: Box::new(DirectoryDeployer::new(template_dir)),
        version_source: Box::new(FixedVersion(version.to_string())),
    }
}

fn template_v1(project: &TestProject) -> NormalizedPath {
    project.stage_template(
        "template-v1",
        &[
            ("config.yaml", "template_version: 1.0.0\ntheme: default\n"),
            (
                "sections/core.yaml",
                "log_level: info\nretries: 3\nlegacy_flag: true\n",
            ),
            ("sections/settings.json", "{\n  \"editor\": \"vi\"\n}\n"),
            (".gitignore", "*.log\ntarget/\n"),
        ],
    )
}

fn template_v2(project: &TestProject) -> NormalizedPath {
    project.stage_template(
        "template-v2",
        &[
            ("config.yaml", "template_version: 2.0.0\ntheme: default\n"),
            // log_level default changed, legacy_flag removed, timeout added
            (
                "sections/core.yaml",
                "log_level: warn\nretries: 3\ntimeout: 30\n",
            ),
            ("sections/settings.json", "{\n  \"editor\": \"vi\"\n}\n"),
            (".gitignore", "*.log\ntarget/\ndist/\n"),
        ],
    )
}

#[test]
fn fresh_project_deploys_without_backup() {
    let project = TestProject::new();
    let template = template_v1(&project);
    let engine = SyncEngine::new(project.norm_root());

    let result = engine
        .sync(&deps_for(template, "1.0.0"), &SyncOptions::default())
        .unwrap();

    assert!(result.ran);
    assert!(result.backup_path.is_none());
    assert_eq!(result.merged, 0);
    assert_eq!(result.restored, 0);
    project.assert_file_exists(".template/config.yaml");
    project.assert_file_exists(".template/sections/core.yaml");
    project.assert_file_exists(".template/.template-defaults/sections/core.yaml");
    project.assert_file_not_exists(".template-backups");
}

#[test]
fn matching_version_skips() {
    let project = TestProject::new();
    let template = template_v1(&project);
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template.clone(), "1.0.0"), &SyncOptions::default())
        .unwrap();

    // User customization that a rerun must not touch
    project.write_config_file("sections/core.yaml", "log_level: debug\n");

    let result = engine
        .sync(&deps_for(template, "1.0.0"), &SyncOptions::default())
        .unwrap();

    assert!(!result.ran);
    assert_eq!(project.read_config_file("sections/core.yaml"), "log_level: debug\n");
}

#[test]
fn force_runs_despite_matching_version() {
    let project = TestProject::new();
    let template = template_v1(&project);
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template.clone(), "1.0.0"), &SyncOptions::default())
        .unwrap();

    let options = SyncOptions {
        force: true,
        ..SyncOptions::default()
    };
    let result = engine.sync(&deps_for(template, "1.0.0"), &options).unwrap();

    assert!(result.ran);
    assert!(result.backup_path.is_some());
}

#[test]
fn dry_run_changes_nothing() {
    let project = TestProject::new();
    let template = template_v1(&project);
    let engine = SyncEngine::new(project.norm_root());

    let options = SyncOptions {
        dry_run: true,
        ..SyncOptions::default()
    };
    let result = engine.sync(&deps_for(template, "1.0.0"), &options).unwrap();

    assert!(!result.ran);
    project.assert_file_not_exists(".template");
    project.assert_file_not_exists(".template-backups");
}

#[test]
fn upgrade_merges_three_way_through_defaults_tier() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    // User customizes one default and leaves the others untouched
    project.write_config_file(
        "sections/core.yaml",
        "log_level: info\nretries: 10\nlegacy_flag: true\n",
    );

    let result = engine
        .sync(&deps_for(template_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();

    assert!(result.ran);
    assert!(result.warnings.is_empty());
    // Unedited default tracks the template, edited value survives, removed
    // key is dropped, new key appears
    assert_eq!(
        project.read_config_file("sections/core.yaml"),
        "log_level: warn\nretries: 10\ntimeout: 30\n"
    );
    // The recorded version is template-owned
    project.assert_file_contains(".template/config.yaml", "template_version: 2.0.0");
}

#[test]
fn custom_sections_survive_redeployment() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    project.write_config_file("sections/mine.yaml", "custom: true\n");
    project.write_config_file("notes.txt", "remember the milk\n");

    let result = engine
        .sync(&deps_for(template_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();

    assert_eq!(result.restored, 2);
    assert_eq!(project.read_config_file("sections/mine.yaml"), "custom: true\n");
    assert_eq!(project.read_config_file("notes.txt"), "remember the milk\n");
}

#[test]
fn ignore_file_entries_survive_under_marker() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    project.write_config_file(".gitignore", "*.log\ntarget/\n.envrc\n");

    engine
        .sync(&deps_for(template_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();

    assert_eq!(
        project.read_config_file(".gitignore"),
        "*.log\ntarget/\ndist/\n\n# User-defined entries\n.envrc\n"
    );
}

#[test]
fn json_settings_keep_user_values() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    project.write_config_file(
        "sections/settings.json",
        "{\n  \"editor\": \"hx\",\n  \"wrap\": true\n}\n",
    );

    engine
        .sync(&deps_for(template_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();

    assert_eq!(
        project.read_config_file("sections/settings.json"),
        "{\n  \"editor\": \"hx\",\n  \"wrap\": true\n}\n"
    );
}

#[test]
fn corrupt_user_file_degrades_to_warning() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    project.write_config_file("sections/core.yaml", "log_level: [unclosed");

    let result = engine
        .sync(&deps_for(template_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();

    assert!(result.ran);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].path, "sections/core.yaml");
    // The deployed template file stays in place for the broken path
    assert_eq!(
        project.read_config_file("sections/core.yaml"),
        "log_level: warn\nretries: 3\ntimeout: 30\n"
    );
}

#[test]
fn unreadable_version_fails_open() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    // Clobber the version file so the recorded version cannot be parsed;
    // a sync to the *same* version must still run.
    project.write_config_file("config.yaml", "template_version: [unclosed");

    let result = engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    assert!(result.ran);
    project.assert_file_contains(".template/config.yaml", "template_version: 1.0.0");
}

#[test]
fn deploy_failure_surfaces_and_keeps_backup() {
    struct FailingDeployer;
    impl Deployer for FailingDeployer {
        fn deploy(&self, _project_root: &NormalizedPath) -> Result<()> {
            Err(Error::DeployFailed {
                message: "network unreachable".to_string(),
            })
        }
    }

    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();

    let deps = Dependencies {
        deployer: Box::new(FailingDeployer),
        version_source: Box::new(FixedVersion("2.0.0".to_string())),
    };
    let err = engine.sync(&deps, &SyncOptions::default()).unwrap_err();

    assert!(matches!(err, Error::DeployFailed { .. }));
    // The pre-deploy snapshot remains for manual recovery
    project.assert_file_exists(".template-backups");
}

#[test]
fn retention_prunes_old_snapshots() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());
    let options = SyncOptions {
        force: true,
        retain: 1,
        ..SyncOptions::default()
    };

    let template = template_v1(&project);
    engine
        .sync(&deps_for(template.clone(), "1.0.0"), &SyncOptions::default())
        .unwrap();

    for _ in 0..3 {
        engine.sync(&deps_for(template.clone(), "1.0.0"), &options).unwrap();
    }

    let backups_root = project.root().join(".template-backups");
    let snapshots = std::fs::read_dir(&backups_root)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .count();
    assert_eq!(snapshots, 1);
}

#[test]
fn rerun_sync_is_idempotent() {
    let project = TestProject::new();
    let engine = SyncEngine::new(project.norm_root());

    engine
        .sync(&deps_for(template_v1(&project), "1.0.0"), &SyncOptions::default())
        .unwrap();
    project.write_config_file(
        "sections/core.yaml",
        "log_level: info\nretries: 10\nlegacy_flag: true\n",
    );

    engine
        .sync(&deps_for(template_v2(&project), "2.0.0"), &SyncOptions::default())
        .unwrap();
    let after_first = project.read_config_file("sections/core.yaml");

    // Version now matches; force a second pass over the merged tree
    let options = SyncOptions {
        force: true,
        ..SyncOptions::default()
    };
    engine
        .sync(&deps_for(template_v2(&project), "2.0.0"), &options)
        .unwrap();

    assert_eq!(project.read_config_file("sections/core.yaml"), after_first);
}
