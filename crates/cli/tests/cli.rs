//! CLI integration tests for `skillbridge`.
//!
//! Each test runs the real binary with HOME, config and history redirected
//! into a temp directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use anyhow::{Context, Result};
use skillbridge_test_utils::{write_file, SkillTreeFixture};

fn run(fx: &SkillTreeFixture, args: &[&str]) -> Result<Output> {
    let root = fx.tempdir.path();
    let output = Command::new(env!("CARGO_BIN_EXE_skillbridge"))
        .args(args)
        .env("HOME", root)
        .env("SKILLBRIDGE_HOME", root.join("data"))
        .env("SKILLBRIDGE_CONFIG", root.join("data/config.json"))
        .env("SKILLBRIDGE_HISTORY", root.join("data/history.json"))
        .env_remove("SKILLBRIDGE_SKILLS_DIR")
        .env_remove("SKILLBRIDGE_MCP_FILE")
        .env_remove("RUST_LOG")
        .output()
        .with_context(|| format!("failed to run skillbridge {args:?}"))?;

    if cfg!(debug_assertions) {
        eprintln!("stdout:\n{}", String::from_utf8_lossy(&output.stdout));
        eprintln!("stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    }
    Ok(output)
}

fn run_json(fx: &SkillTreeFixture, args: &[&str]) -> Result<serde_json::Value> {
    let mut full = vec!["--format", "json"];
    full.extend_from_slice(args);
    let output = run(fx, &full)?;
    assert!(output.status.success(), "command failed: {args:?}");
    serde_json::from_slice(&output.stdout).context("stdout is not JSON")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn given_new_skills_when_import_all_new_then_status_is_identical() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    fx.create_skill("docs/pdf", &[("run.sh", "echo pdf\n")])?;
    fx.create_skill("review", &[])?;
    let source = path_str(&fx.skills_root);
    let target = path_str(&fx.target_root);

    let status = run_json(&fx, &["skills", "status", "--source", source, "--target", target])?;
    let statuses: Vec<&str> = status["skills"]
        .as_array()
        .context("skills array")?
        .iter()
        .filter_map(|row| row["status"].as_str())
        .collect();
    assert_eq!(statuses, vec!["new", "new"]);

    let imported = run_json(
        &fx,
        &["skills", "import", "--source", source, "--target", target, "--all-new"],
    )?;
    assert_eq!(imported["imported"], serde_json::json!(["docs/pdf", "review"]));
    assert!(fx.target_root.join("pdf/run.sh").exists());

    let status = run_json(&fx, &["skills", "status", "--source", source, "--target", target])?;
    assert!(status["skills"]
        .as_array()
        .context("skills array")?
        .iter()
        .all(|row| row["status"] == "identical"));
    Ok(())
}

#[test]
fn given_configured_source_when_status_without_source_then_config_is_used() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    fx.create_skill("lint", &[])?;
    let source = path_str(&fx.skills_root);
    let target = path_str(&fx.target_root);

    let output = run(&fx, &["config", "set", "--skills-dir", source])?;
    assert!(output.status.success());

    let status = run_json(&fx, &["skills", "status", "--target", target])?;
    assert_eq!(status["skills"][0]["name"], "lint");
    Ok(())
}

#[test]
fn given_non_interactive_delete_without_yes_then_it_refuses() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    fx.write_target("old/SKILL.md", "description: old")?;
    let target = path_str(&fx.target_root);

    let output = run(&fx, &["skills", "delete", "--target", target, "old"])?;
    assert!(!output.status.success());
    assert!(fx.target_root.join("old").exists());

    let output = run(&fx, &["skills", "delete", "--target", target, "--yes", "old"])?;
    assert!(output.status.success());
    assert!(!fx.target_root.join("old").exists());
    Ok(())
}

#[test]
fn given_divergent_server_when_import_then_target_matches_source() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    let source = fx.write_mcp(
        "source.json",
        serde_json::json!({"fs": {"command": "fs-mcp"}, "git": {"command": "git-mcp"}}),
    )?;
    let target = fx.write_mcp("target.json", serde_json::json!({"git": {"command": "old"}}))?;
    let (source, target) = (path_str(&source), path_str(&target));

    let diff = run_json(&fx, &["mcp", "diff", "--source", source, "--target", target, "git"])?;
    assert_eq!(diff["status"], "divergent");
    assert!(diff["diff"].as_str().unwrap_or_default().contains("git-mcp"));

    run_json(&fx, &["mcp", "import", "--source", source, "--target", target, "--all"])?;
    let status = run_json(&fx, &["mcp", "status", "--source", source, "--target", target])?;
    assert!(status["servers"]
        .as_array()
        .context("servers array")?
        .iter()
        .all(|row| row["status"] == "identical"));
    Ok(())
}

#[test]
fn given_unparsable_target_when_import_or_delete_then_file_is_untouched() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    let source = fx.write_mcp("source.json", serde_json::json!({"fs": {"command": "fs-mcp"}}))?;
    let original = r#"{"theme":"dark","mcpServers":{"keep":{"x":1},}}"#;
    let target = write_file(fx.tempdir.path(), "target.json", original)?;
    let (source, target_arg) = (path_str(&source), path_str(&target));

    let output = run(&fx, &["mcp", "import", "--source", source, "--target", target_arg, "fs"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed target"));
    assert_eq!(fs::read_to_string(&target)?, original);

    let output = run(&fx, &["mcp", "delete", "--target", target_arg, "--yes", "keep"])?;
    assert!(!output.status.success());
    assert_eq!(fs::read_to_string(&target)?, original);

    let servers_not_object = r#"{"theme":"dark","mcpServers":["keep"]}"#;
    fs::write(&target, servers_not_object)?;
    let output = run(&fx, &["mcp", "import", "--source", source, "--target", target_arg, "fs"])?;
    assert!(!output.status.success());
    assert_eq!(fs::read_to_string(&target)?, servers_not_object);
    Ok(())
}

#[test]
fn given_target_with_other_settings_when_import_then_they_are_kept() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    let source = fx.write_mcp("source.json", serde_json::json!({"fs": {"command": "fs-mcp"}}))?;
    let target = write_file(
        fx.tempdir.path(),
        "target.jsonc",
        "{\n  // editor settings\n  \"theme\": \"dark\",\n  \"mcpServers\": {\"keep\": {\"x\": 1}}\n}\n",
    )?;
    let (source, target_arg) = (path_str(&source), path_str(&target));

    run_json(&fx, &["mcp", "import", "--source", source, "--target", target_arg, "fs"])?;
    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&target)?)?;
    assert_eq!(saved["theme"], "dark");
    assert_eq!(saved["mcpServers"]["keep"], serde_json::json!({"x": 1}));
    assert_eq!(saved["mcpServers"]["fs"], serde_json::json!({"command": "fs-mcp"}));
    Ok(())
}

#[test]
fn given_used_targets_then_history_lists_them() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    let target = path_str(&fx.target_root);
    run_json(
        &fx,
        &["skills", "status", "--source", path_str(&fx.skills_root), "--target", target],
    )?;

    let history = run_json(&fx, &["history"])?;
    let items = history.as_array().context("history array")?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "skill");
    assert_eq!(items[0]["path"], target);

    let removed = run_json(&fx, &["history", "remove", target])?;
    assert_eq!(removed["removed"], true);
    let history = run_json(&fx, &["history"])?;
    assert_eq!(history, serde_json::json!([]));
    Ok(())
}

#[test]
fn given_install_dry_run_then_destination_is_predicted() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    let target = path_str(&fx.target_root);
    let preview = run_json(
        &fx,
        &[
            "install",
            "https://github.com/owner/repo/tree/main/skills/pdf",
            "--target",
            target,
            "--dry-run",
        ],
    )?;
    assert_eq!(
        preview["destination"],
        path_str(&fx.target_root.join("owner").join("pdf"))
    );

    let preview = run_json(
        &fx,
        &["install", "https://example.com/x", "--target", target, "--dry-run"],
    )?;
    assert_eq!(preview["error"], "not_github");
    Ok(())
}

#[test]
fn given_describe_then_descriptor_text_is_printed() -> Result<()> {
    let fx = SkillTreeFixture::new()?;
    fx.create_skill("docs/pdf", &[])?;
    let output = run(
        &fx,
        &["skills", "describe", "pdf", "--source", path_str(&fx.skills_root)],
    )?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Test skill docs/pdf");
    Ok(())
}
