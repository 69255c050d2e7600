//! Handlers for `skillbridge skills ...`.

use anyhow::{anyhow, bail, Result};
use serde_json::json;
use skillbridge_state::AppConfig;
use skillbridge_sync::{
    build_skills_rows, collect_diff_files, collect_source_skill_rel_paths,
    collect_target_skill_dirs, delete_skill_dirs, file_text_diff, get_skill_description,
    import_skills_to_target, is_text_file, Description, SkillRow, SkillSelection, SyncStatus,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::{confirm, print_json, remember_skills_dir, report_failures};
use crate::cli::{OutputFormat, Selection, SkillPaths, SkillsCommand};

pub(crate) fn handle_skills_command(command: SkillsCommand, format: OutputFormat) -> Result<()> {
    match command {
        SkillsCommand::Status { paths } => handle_status(paths, format),
        SkillsCommand::Import {
            paths,
            names,
            selection,
        } => handle_import(paths, names, selection, format),
        SkillsCommand::Delete { target, names, yes } => handle_delete(target, names, yes, format),
        SkillsCommand::Diff { paths, name, file } => handle_diff(paths, name, file, format),
        SkillsCommand::Describe {
            name,
            source,
            target,
        } => handle_describe(name, source, target, format),
    }
}

fn source_root(source: Option<PathBuf>) -> Result<PathBuf> {
    match source {
        Some(dir) => Ok(dir),
        None => Ok(AppConfig::load()?.skills_dir),
    }
}

fn load_rows(paths: &SkillPaths) -> Result<(PathBuf, Vec<SkillRow>)> {
    let skills_root = source_root(paths.source.clone())?;
    let rows = build_skills_rows(&skills_root, &paths.target)?;
    Ok((skills_root, rows))
}

/// Picks an item by relative path first, then by unique basename.
fn pick<'a, T>(items: &'a [T], name: &str, rel_path: impl Fn(&T) -> &str) -> Result<&'a T> {
    if let Some(item) = items.iter().find(|i| rel_path(*i) == name) {
        return Ok(item);
    }
    let basename = |i: &&T| rel_path(*i).rsplit('/').next() == Some(name);
    let matches: Vec<&T> = items.iter().filter(basename).collect();
    match matches.as_slice() {
        [item] => Ok(*item),
        [] => Err(anyhow!("skill '{name}' not found in source")),
        many => Err(anyhow!(
            "skill name '{name}' is ambiguous: {}",
            many.iter()
                .map(|i| rel_path(*i))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn find_row<'a>(rows: &'a [SkillRow], name: &str) -> Result<&'a SkillRow> {
    pick(rows, name, |r| r.entry.rel_path.as_str())
}

/// Target directories no source skill maps to.
fn target_only(rows: &[SkillRow], target: &Path) -> Vec<String> {
    let known: BTreeSet<&str> = rows.iter().map(|r| r.entry.name.as_str()).collect();
    collect_target_skill_dirs(target)
        .into_iter()
        .filter(|name| !known.contains(name.as_str()))
        .collect()
}

fn handle_status(paths: SkillPaths, format: OutputFormat) -> Result<()> {
    let (skills_root, rows) = load_rows(&paths)?;
    let extra = target_only(&rows, &paths.target);
    remember_skills_dir(&paths.target);

    if format.is_json() {
        return print_json(&json!({
            "source": skills_root,
            "target": paths.target,
            "skills": rows,
            "target_only": extra,
        }));
    }

    if rows.is_empty() {
        println!("No skills found under {}", skills_root.display());
    }
    for row in &rows {
        println!(
            "{:<10} {:<16} {:<24} {}",
            row.status.label(),
            row.entry.group.as_deref().unwrap_or("-"),
            row.entry.name,
            row.entry.target_path.display()
        );
    }
    for name in &extra {
        println!("{:<10} {:<16} {:<24} {}", "target", "-", name, paths.target.join(name).display());
    }
    Ok(())
}

fn handle_import(
    paths: SkillPaths,
    names: Vec<String>,
    selection: Selection,
    format: OutputFormat,
) -> Result<()> {
    let (skills_root, rows) = load_rows(&paths)?;
    let chosen: Vec<SkillSelection> = if selection.all || selection.all_new {
        rows.iter()
            .filter(|r| selection.all || r.status == SyncStatus::New)
            .map(SkillSelection::from)
            .collect()
    } else {
        if names.is_empty() {
            bail!("no skills selected; pass names, --all-new or --all");
        }
        names
            .iter()
            .map(|name| find_row(&rows, name).map(SkillSelection::from))
            .collect::<Result<_>>()?
    };

    std::fs::create_dir_all(&paths.target)?;
    let failures = import_skills_to_target(&skills_root, &paths.target, &chosen);
    remember_skills_dir(&paths.target);

    let imported: Vec<&str> = chosen
        .iter()
        .filter(|c| failures.iter().all(|f| f.name != c.rel_path))
        .map(|c| c.rel_path.as_str())
        .collect();
    if format.is_json() {
        print_json(&json!({ "imported": imported, "failures": failures }))?;
    } else {
        for rel in &imported {
            println!("imported {rel}");
        }
        if chosen.is_empty() {
            println!("Nothing to import.");
        }
    }
    report_failures(&failures, "import(s)")
}

fn handle_delete(target: PathBuf, names: Vec<String>, yes: bool, format: OutputFormat) -> Result<()> {
    let prompt = format!(
        "Delete {} skill(s) from {}? ({})",
        names.len(),
        target.display(),
        names.join(", ")
    );
    if !confirm(&prompt, yes)? {
        println!("Cancelled.");
        return Ok(());
    }
    let failures = delete_skill_dirs(&target, &names);
    remember_skills_dir(&target);

    let deleted: Vec<&String> = names
        .iter()
        .filter(|n| failures.iter().all(|f| &f.name != *n))
        .collect();
    if format.is_json() {
        print_json(&json!({ "deleted": deleted, "failures": failures }))?;
    } else {
        for name in &deleted {
            println!("deleted {name}");
        }
    }
    report_failures(&failures, "deletion(s)")
}

fn handle_diff(
    paths: SkillPaths,
    name: String,
    file: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let (_, rows) = load_rows(&paths)?;
    let row = find_row(&rows, &name)?;
    let source_dir = &row.entry.source_path;
    let target_dir = &row.entry.target_path;

    if let Some(rel) = file {
        if !is_text_file(&rel) {
            bail!("{rel} is not a text file; no diff available");
        }
        let diff = file_text_diff(source_dir, target_dir, &rel).unwrap_or_default();
        if format.is_json() {
            return print_json(&json!({ "skill": row.entry.rel_path, "file": rel, "diff": diff }));
        }
        if diff.is_empty() {
            println!("{rel}: no differences");
        } else {
            print!("{diff}");
        }
        return Ok(());
    }

    let entries = collect_diff_files(source_dir, target_dir, None);
    if format.is_json() {
        return print_json(&json!({
            "skill": row.entry.rel_path,
            "status": row.status,
            "files": entries,
        }));
    }
    println!("{} ({})", row.entry.rel_path, row.status);
    if entries.is_empty() {
        println!("  no differing files");
    }
    for entry in &entries {
        println!("  {:<9} {}", entry.kind.as_str(), entry.rel_path);
    }
    Ok(())
}

fn handle_describe(
    name: String,
    source: Option<PathBuf>,
    target: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let dir = match target {
        Some(target) => target.join(&name),
        None => {
            let skills_root = source_root(source)?;
            let rels = collect_source_skill_rel_paths(&skills_root);
            skills_root.join(pick(&rels, &name, |r| r.as_str())?)
        }
    };
    let description = get_skill_description(&dir);

    if format.is_json() {
        return print_json(&json!({
            "skill": name,
            "path": dir,
            "description": description.text(),
            "outcome": outcome(&description),
        }));
    }
    match &description {
        Description::Found(text) => println!("{text}"),
        Description::MissingDescriptor => println!("(no SKILL.md in {})", dir.display()),
        Description::MissingField => println!("(SKILL.md has no description)"),
        Description::ReadError(err) => println!("(could not read SKILL.md: {err})"),
    }
    Ok(())
}

fn outcome(description: &Description) -> &'static str {
    match description {
        Description::Found(_) => "found",
        Description::MissingDescriptor => "missing_descriptor",
        Description::MissingField => "missing_field",
        Description::ReadError(_) => "read_error",
    }
}
