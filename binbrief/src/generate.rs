//! Writing a normalized brief out as an agent system directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};

use crate::brief::Brief;
use crate::error::{BriefError, Result};
use crate::render;

/// Name of the copy of the source brief kept in the generated system.
pub const BRIEF_FILE: &str = "brief.yaml";

/// Files every generated system must contain.
pub const REQUIRED_FILES: &[&str] = &[
    "AGENTS.md",
    "SKILLS.md",
    "agent-process-contract.md",
    BRIEF_FILE,
    "scripts/agent-worktree.sh",
    "scripts/agent-chat.sh",
];

const SCRIPTS: &[&str] = &[
    "scripts/agent-worktree.sh",
    "scripts/agent-chat.sh",
    "scripts/scaffold_prs.sh",
];

/// Create `path` as an empty directory, failing if it already has entries.
pub fn ensure_empty_dir(path: &Path) -> Result<()> {
    if path.exists() {
        let mut entries = fs::read_dir(path).map_err(|e| BriefError::io(path, e))?;
        if entries.next().is_some() {
            return Err(BriefError::OutputNotEmpty(path.to_path_buf()));
        }
    }
    fs::create_dir_all(path).map_err(|e| BriefError::io(path, e))
}

/// Write `content`, creating parent directories and ending with a newline.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BriefError::io(parent, e))?;
    }
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| BriefError::io(path, e))?;
    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| BriefError::io(path, e))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms).map_err(|e| BriefError::io(path, e))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Resolve a brief-supplied relative path under `root`.
///
/// Absolute paths and `..` components are rejected.
pub fn safe_join(root: &Path, relative: &str) -> Result<PathBuf> {
    let path = Path::new(relative);
    let escapes = path.components().any(|c| {
        !matches!(c, Component::Normal(_) | Component::CurDir)
    });
    if relative.is_empty() || escapes {
        return Err(BriefError::UnsafePath(relative.to_string()));
    }
    Ok(root.join(path))
}

/// Write the complete agent system for `brief` into `output`.
///
/// `brief_source` is the original brief text, stored alongside the
/// generated files.
pub fn generate(
    output: &Path,
    brief: &Brief,
    open_questions: &[String],
    brief_source: &str,
) -> Result<()> {
    // Resolve every brief-supplied path before touching the filesystem.
    let pr_body = safe_join(output, &brief.templates.pr_body)?;
    let checklist = safe_join(output, &brief.templates.acceptance_checklist)?;
    let references = brief
        .references
        .iter()
        .map(|r| -> Result<_> { Ok((r, safe_join(output, &r.path)?)) })
        .collect::<Result<Vec<_>>>()?;
    let policies = brief
        .policies
        .iter()
        .map(|p| -> Result<_> {
            let rel = format!("references/policies/{}.md", p);
            let path = safe_join(output, &rel)?;
            Ok((p, rel, path))
        })
        .collect::<Result<Vec<_>>>()?;

    ensure_empty_dir(output)?;

    write_file(
        &output.join("AGENTS.md"),
        &render::render_agents(brief, open_questions),
    )?;
    write_file(&output.join("SKILLS.md"), &render::render_skills(brief))?;
    write_file(
        &output.join(&brief.workflow.pr_process_contract),
        &render::render_process_contract(),
    )?;
    write_file(&output.join(BRIEF_FILE), brief_source)?;

    let scripts = output.join("scripts");
    write_file(
        &scripts.join("agent-worktree.sh"),
        &render::render_worktree_script(),
    )?;
    write_file(&scripts.join("agent-chat.sh"), &render::render_chat_script())?;

    write_file(&pr_body, &render::render_pr_body_template())?;
    write_file(&checklist, &render::render_acceptance_checklist())?;

    for role in &brief.roles {
        write_file(
            &output.join(&role.slug).join("SKILL.md"),
            &render::render_role_skill(role, &brief.policies, &brief.references),
        )?;
    }

    let mut reference_paths = HashSet::new();
    for (reference, path) in &references {
        reference_paths.insert(reference.path.as_str());
        write_file(
            path,
            &render::render_reference_stub(&reference.path, &reference.purpose),
        )?;
    }

    for (policy, rel, path) in &policies {
        if reference_paths.contains(rel.as_str()) {
            continue;
        }
        let text = match render::policy_module(policy) {
            Some(text) => text.to_string(),
            None => render::render_reference_stub(rel, "Policy module guidance."),
        };
        write_file(path, &text)?;
    }

    if brief.workflow.create_draft_prs {
        write_file(
            &scripts.join("scaffold_prs.sh"),
            &render::render_scaffold_script(&brief.templates.pr_body),
        )?;
    }

    for rel in REQUIRED_FILES {
        if !output.join(rel).exists() {
            return Err(BriefError::MissingRequiredFile((*rel).to_string()));
        }
    }

    for rel in SCRIPTS {
        let script = output.join(rel);
        if script.exists() {
            set_executable(&script)?;
        }
    }

    info!(
        "generated {} roles into {}",
        brief.roles.len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::{load_brief, normalize};
    use libbrief::ParseOptions;
    use pretty_assertions::assert_eq;

    const BRIEF: &str = "\
system:
  name: publishing
  description: Editorial pipeline
  version: 2
workflow:
  create_draft_prs: true
roles:
  - name: Copy Editor
    description: Checks style.
  - name: writer
policies:
  - citations-required
  - house-rules
  - plagiarism-check
references:
  - path: references/policies/plagiarism-check.md
    purpose: Our own plagiarism notes.
";

    fn build(dir: &Path, text: &str) -> Result<()> {
        let data = load_brief(text, &ParseOptions::default())?;
        let (brief, questions) = normalize(&data)?;
        generate(dir, &brief, &questions, text)
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_generate_full_system() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("system");
        build(&out, BRIEF).unwrap();

        for rel in REQUIRED_FILES {
            assert!(out.join(rel).is_file(), "missing {}", rel);
        }
        assert!(out.join("templates/pr-body.md").is_file());
        assert!(out.join("templates/acceptance-checklist.md").is_file());
        assert!(out.join("copy-editor/SKILL.md").is_file());
        assert!(out.join("writer/SKILL.md").is_file());
        assert!(out.join("scripts/scaffold_prs.sh").is_file());

        assert_eq!(read(out.join(BRIEF_FILE)), BRIEF);
        assert!(read(out.join("AGENTS.md"))
            .contains("System: publishing - Editorial pipeline (v2)"));
        assert!(read(out.join("AGENTS.md")).ends_with('\n'));

        assert!(read(out.join("references/policies/citations-required.md"))
            .starts_with("# Citations Required Policy"));
        assert_eq!(
            read(out.join("references/policies/house-rules.md")),
            "# House Rules\n\nPurpose: Policy module guidance.\n\n- Add detailed guidance here.\n"
        );
        // The reference stub wins over the built-in policy text.
        assert!(read(out.join("references/policies/plagiarism-check.md"))
            .contains("Purpose: Our own plagiarism notes."));
    }

    #[cfg(unix)]
    #[test]
    fn test_scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        build(tmp.path(), BRIEF).unwrap();
        for rel in SCRIPTS {
            let mode = fs::metadata(tmp.path().join(rel)).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111, "{} not executable", rel);
        }
    }

    #[test]
    fn test_no_scaffold_without_draft_prs() {
        let tmp = tempfile::tempdir().unwrap();
        build(tmp.path(), "system:\n  name: x\n").unwrap();
        assert!(!tmp.path().join("scripts/scaffold_prs.sh").exists());
        assert!(tmp.path().join("owner/SKILL.md").is_file());
    }

    #[test]
    fn test_output_must_be_empty() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("existing.txt"), "x").unwrap();
        let err = build(tmp.path(), "system:\n  name: x\n").unwrap_err();
        assert!(matches!(err, BriefError::OutputNotEmpty(_)));
        assert!(err.to_string().ends_with("is not empty."));
    }

    #[test]
    fn test_unsafe_paths_rejected_before_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("system");
        let err = build(&out, "references:\n  - path: ../outside.md\n").unwrap_err();
        assert!(matches!(err, BriefError::UnsafePath(ref p) if p == "../outside.md"));
        assert!(!out.exists());

        let err = build(&out, "templates:\n  pr_body: /etc/pr-body.md\n").unwrap_err();
        assert!(matches!(err, BriefError::UnsafePath(_)));
    }

    #[test]
    fn test_safe_join() {
        let root = Path::new("out");
        assert_eq!(
            safe_join(root, "./templates/a.md").unwrap(),
            root.join("./templates/a.md")
        );
        assert!(safe_join(root, "a/../../b").is_err());
        assert!(safe_join(root, "").is_err());
    }
}
