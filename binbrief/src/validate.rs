//! Checking a generated agent system for the files and sections it needs.

use std::fs;
use std::path::Path;

use libbrief::ParseOptions;
use log::{debug, warn};

use crate::brief::{load_brief, normalize, Templates, PROCESS_CONTRACT};
use crate::error::{BriefError, Result};
use crate::generate::{safe_join, BRIEF_FILE, REQUIRED_FILES};

/// Top-level directories that never hold role skills.
const SKIP_DIRS: &[&str] = &["scripts", "templates", "references", "assets", "logs"];

/// Template paths named by the stored brief, or the defaults when the brief
/// is missing or unreadable.
fn stored_templates(root: &Path) -> Templates {
    let path = root.join(BRIEF_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            debug!("no stored brief at {}: {}", path.display(), e);
            return Templates::default();
        }
    };
    match load_brief(&text, &ParseOptions::default()).and_then(|data| normalize(&data)) {
        Ok((brief, _)) => brief.templates,
        Err(e) => {
            warn!("stored brief {} is invalid: {}", path.display(), e);
            Templates::default()
        }
    }
}

/// Every problem found in the system at `root`. Empty means valid.
pub fn validate_system(root: &Path) -> Result<Vec<String>> {
    let mut errors = Vec::new();
    let templates = stored_templates(root);

    for rel in REQUIRED_FILES {
        if !root.join(rel).exists() {
            errors.push(format!("Missing required file: {}", rel));
        }
    }

    // Template paths come from the stored brief and may have been edited.
    let mut pr_body = None;
    for rel in [&templates.pr_body, &templates.acceptance_checklist] {
        match safe_join(root, rel) {
            Ok(path) if path.exists() => {
                if *rel == templates.pr_body {
                    pr_body = Some(path);
                }
            }
            Ok(_) => errors.push(format!("Missing required file: {}", rel)),
            Err(e) => errors.push(e.to_string()),
        }
    }

    if let Some(text) = pr_body.and_then(|path| fs::read_to_string(path).ok()) {
        if !text.contains("Agent-Status:") {
            errors.push("PR body template missing 'Agent-Status:' line.".to_string());
        }
    }

    if let Ok(text) = fs::read_to_string(root.join("AGENTS.md")) {
        if !text.contains(PROCESS_CONTRACT) {
            errors.push(format!("AGENTS.md must reference {}.", PROCESS_CONTRACT));
        }
    }

    let mut entries = fs::read_dir(root)
        .map_err(|e| BriefError::io(root, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| BriefError::io(root, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut roles = 0;
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !entry.path().is_dir() || SKIP_DIRS.contains(&name.as_str()) {
            continue;
        }
        let skill = entry.path().join("SKILL.md");
        let text = match fs::read_to_string(&skill) {
            Ok(text) => text,
            Err(_) => continue,
        };
        roles += 1;
        debug!("checking role skill {}", skill.display());
        if !text.contains("Acceptance Criteria") {
            errors.push(format!(
                "{}/SKILL.md missing Acceptance Criteria section.",
                name
            ));
        }
        if !text.contains("Workflow") {
            errors.push(format!("{}/SKILL.md missing Workflow section.", name));
        }
    }

    if roles == 0 {
        errors.push("No role SKILL.md files found.".to_string());
    }

    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate;
    use pretty_assertions::assert_eq;

    fn build(dir: &Path, text: &str) {
        let data = load_brief(text, &ParseOptions::default()).unwrap();
        let (brief, questions) = normalize(&data).unwrap();
        generate(dir, &brief, &questions, text).unwrap();
    }

    #[test]
    fn test_generated_system_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        build(
            tmp.path(),
            "roles:\n  - name: writer\ntemplates:\n  pr_body: docs/body.md\n",
        );
        assert_eq!(validate_system(tmp.path()).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let errors = validate_system(tmp.path()).unwrap();
        assert_eq!(errors.len(), REQUIRED_FILES.len() + 3);
        assert_eq!(errors[0], "Missing required file: AGENTS.md");
        assert_eq!(errors.last().unwrap(), "No role SKILL.md files found.");
    }

    #[test]
    fn test_broken_files_reported() {
        let tmp = tempfile::tempdir().unwrap();
        build(tmp.path(), "roles:\n  - name: writer\n");
        fs::write(tmp.path().join("templates/pr-body.md"), "# Summary\n").unwrap();
        fs::write(tmp.path().join("AGENTS.md"), "# AGENTS\n").unwrap();
        fs::write(tmp.path().join("writer/SKILL.md"), "# writer\n").unwrap();
        fs::remove_file(tmp.path().join("scripts/agent-chat.sh")).unwrap();

        assert_eq!(
            validate_system(tmp.path()).unwrap(),
            vec![
                "Missing required file: scripts/agent-chat.sh",
                "PR body template missing 'Agent-Status:' line.",
                "AGENTS.md must reference agent-process-contract.md.",
                "writer/SKILL.md missing Acceptance Criteria section.",
                "writer/SKILL.md missing Workflow section.",
            ]
        );
    }

    #[test]
    fn test_stored_template_paths_stay_inside_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("system");
        build(&root, "roles:\n  - name: writer\n");
        fs::write(tmp.path().join("outside.md"), "Agent-Status: ready\n").unwrap();
        fs::write(
            root.join(BRIEF_FILE),
            "roles:\n  - name: writer\ntemplates:\n  pr_body: ../outside.md\n",
        )
        .unwrap();

        assert_eq!(
            validate_system(&root).unwrap(),
            vec!["Path '../outside.md' must be relative and stay inside the output directory."]
        );
    }

    #[test]
    fn test_skip_dirs_are_not_roles() {
        let tmp = tempfile::tempdir().unwrap();
        build(tmp.path(), "roles:\n  - name: writer\n");
        fs::remove_dir_all(tmp.path().join("writer")).unwrap();
        fs::write(tmp.path().join("templates/SKILL.md"), "no sections").unwrap();

        let errors = validate_system(tmp.path()).unwrap();
        assert_eq!(errors, vec!["No role SKILL.md files found."]);
    }
}
