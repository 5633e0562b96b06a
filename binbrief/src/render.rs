//! Rendering of the generated documents and scripts.
//!
//! Every function here is pure: it takes the normalized brief (or a piece of
//! it) and returns the file text. Writing is left to `generate`.

use std::path::Path;

use crate::brief::{Brief, Reference, Role, PROCESS_CONTRACT};

/// Command the generated docs tell readers to run for validation.
pub const VALIDATE_COMMAND: &str = "brief validate .";

/// Built-in text for the well-known policy modules.
pub fn policy_module(name: &str) -> Option<&'static str> {
    match name {
        "plagiarism-check" => Some(PLAGIARISM_CHECK),
        "copyright-compliance" => Some(COPYRIGHT_COMPLIANCE),
        "citations-required" => Some(CITATIONS_REQUIRED),
        "ai-assisted-disclosure" => Some(AI_ASSISTED_DISCLOSURE),
        _ => None,
    }
}

const PLAGIARISM_CHECK: &str = "\
# Plagiarism Check Policy

- Use approved tooling to scan drafts for originality.
- Record tool name, version, and summary results in the PR body.
- Resolve or cite any flagged passages before requesting review.
";

const COPYRIGHT_COMPLIANCE: &str = "\
# Copyright Compliance Policy

- Only use content that is authored in-house or licensed for use.
- Document licenses and attributions in the PR body.
- Remove or replace content that cannot be cleared.
";

const CITATIONS_REQUIRED: &str = "\
# Citations Required Policy

- Every factual claim must have a citation.
- List sources in the acceptance checklist or PR body.
- Prefer primary sources when available.
";

const AI_ASSISTED_DISCLOSURE: &str = "\
# AI-Assisted Disclosure Policy

- Disclose AI assistance in the PR body.
- Document the prompts and tools used.
- Human reviewers must verify all outputs.
";

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn push_section(lines: &mut Vec<String>, heading: &str, items: impl IntoIterator<Item = String>) {
    lines.push(String::new());
    lines.push(heading.to_string());
    lines.extend(items.into_iter().map(|item| format!("- {}", item)));
}

fn reference_line(reference: &Reference) -> String {
    format!("{}: {}", reference.path, reference.purpose)
}

/// AGENTS.md: the entry point describing the whole system.
pub fn render_agents(brief: &Brief, open_questions: &[String]) -> String {
    let system = &brief.system;
    let workflow = &brief.workflow;
    let templates = &brief.templates;

    let mut lines = vec![
        "# AGENTS".to_string(),
        String::new(),
        format!(
            "System: {} - {} (v{})",
            system.name, system.description, system.version
        ),
        String::new(),
        format!("Process Contract: {}", PROCESS_CONTRACT),
        String::new(),
        "Roles:".to_string(),
    ];
    lines.extend(brief.roles.iter().map(|role| {
        format!(
            "- {}: {} ({}/SKILL.md)",
            role.name, role.description, role.slug
        )
    }));

    push_section(
        &mut lines,
        "Workflow:",
        [
            format!("Worktrees required: {}", yes_no(workflow.use_worktrees)),
            format!("Draft PRs: {}", yes_no(workflow.create_draft_prs)),
            "PR bodies must include 'Agent-Status: ...'".to_string(),
        ],
    );
    push_section(
        &mut lines,
        "Templates:",
        [
            format!("PR body: {}", templates.pr_body),
            format!("Acceptance checklist: {}", templates.acceptance_checklist),
        ],
    );

    if !brief.policies.is_empty() {
        push_section(&mut lines, "Policy Modules:", brief.policies.iter().cloned());
    }

    push_section(
        &mut lines,
        "Validation:",
        [format!("Run `{}` from the repo root.", VALIDATE_COMMAND)],
    );

    if !open_questions.is_empty() {
        push_section(&mut lines, "Open Questions:", open_questions.iter().cloned());
    }

    lines.join("\n")
}

/// SKILLS.md: index of role skills, policies and references.
pub fn render_skills(brief: &Brief) -> String {
    let mut lines = vec![
        "# SKILLS".to_string(),
        String::new(),
        "Each role has a dedicated SKILL.md describing responsibilities, workflow,".to_string(),
        "and acceptance criteria.".to_string(),
        String::new(),
        "Roles:".to_string(),
    ];
    lines.extend(
        brief
            .roles
            .iter()
            .map(|role| format!("- {}: {}/SKILL.md", role.name, role.slug)),
    );

    if !brief.policies.is_empty() {
        push_section(&mut lines, "Policy Modules:", brief.policies.iter().cloned());
    }
    if !brief.references.is_empty() {
        push_section(
            &mut lines,
            "References:",
            brief.references.iter().map(reference_line),
        );
    }

    push_section(
        &mut lines,
        "Validation:",
        [format!("Run `{}` before opening a PR.", VALIDATE_COMMAND)],
    );

    lines.join("\n")
}

/// <slug>/SKILL.md for a single role.
pub fn render_role_skill(role: &Role, policies: &[String], references: &[Reference]) -> String {
    let mut lines = vec![
        format!("# {} Skill", role.name),
        String::new(),
        "## Mission".to_string(),
        role.description.clone(),
        String::new(),
        "## Responsibilities".to_string(),
        "- Translate the role description into PR-scoped deliverables.".to_string(),
        "- Maintain the PR body status using `Agent-Status: ...`.".to_string(),
        "- Coordinate with other roles when dependencies arise.".to_string(),
        String::new(),
        "## Workflow".to_string(),
        format!(
            "1. Review `{}` and the acceptance checklist.",
            PROCESS_CONTRACT
        ),
        "2. Create a worktree with `scripts/agent-worktree.sh`.".to_string(),
        "3. Execute the scoped work and capture updates in the PR body.".to_string(),
        format!("4. Validate outputs with `{}`.", VALIDATE_COMMAND),
        String::new(),
        "## Acceptance Criteria".to_string(),
        "- Responsibilities are complete and reflected in the PR scope.".to_string(),
        "- PR body includes an up-to-date `Agent-Status: ...` line.".to_string(),
        "- Acceptance checklist is fully satisfied.".to_string(),
    ];

    if !policies.is_empty() {
        lines.push("- Policy modules are followed and documented.".to_string());
        lines.push(String::new());
        lines.push("## Policy Modules".to_string());
        lines.extend(policies.iter().map(|p| format!("- {}", p)));
    }

    if !references.is_empty() {
        lines.push(String::new());
        lines.push("## References".to_string());
        lines.extend(references.iter().map(|r| format!("- {}", reference_line(r))));
    }

    lines.join("\n")
}

/// Placeholder document for a reference or an unknown policy module.
pub fn render_reference_stub(path: &str, purpose: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "# {}\n\nPurpose: {}\n\n- Add detailed guidance here.\n",
        title_case(&stem.replace('-', " ")),
        purpose
    )
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts after any character that is not a letter, so
/// `"ai assisted"` becomes `"Ai Assisted"` and `"v2release"` becomes
/// `"V2Release"`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

pub fn render_process_contract() -> String {
    format!(
        "\
# Agent Process Contract

This system uses a PR-driven workflow with explicit agent roles.

## Contract Rules
- All work happens in a dedicated worktree per PR.
- The PR body must include an `Agent-Status: ...` line.
- Each PR must reference the relevant role acceptance criteria.
- No destructive commands are permitted in scripts or workflows.
- Approvals are required for any external tooling not listed in policies.

## Suggested Workflow
1. Read the relevant role skill and the acceptance checklist.
2. Create a worktree using `scripts/agent-worktree.sh`.
3. Execute the scoped tasks and record updates in the PR body.
4. Run validation (`{}`).
5. Request review when acceptance criteria are met.
",
        VALIDATE_COMMAND
    )
}

pub fn render_pr_body_template() -> String {
    "\
# Summary

Agent-Status: Draft

## Scope
-

## Acceptance Checklist
- [ ] See templates/acceptance-checklist.md

## Risks / Notes
-
"
    .to_string()
}

pub fn render_acceptance_checklist() -> String {
    format!(
        "\
# Acceptance Checklist

- [ ] Acceptance criteria from the assigned role skill are satisfied.
- [ ] Required policy modules are followed and documented.
- [ ] PR body includes `Agent-Status: ...` and scope notes.
- [ ] Validation passes (`{}`).
",
        VALIDATE_COMMAND
    )
}

pub fn render_worktree_script() -> String {
    r#"#!/usr/bin/env bash
set -euo pipefail

if [ "$#" -lt 2 ]; then
  echo "Usage: $0 <branch-name> <worktree-path>"
  exit 1
fi

branch="$1"
worktree_path="$2"

if ! git rev-parse --git-dir >/dev/null 2>&1; then
  echo "Error: run from inside a git repository."
  exit 1
fi

if git show-ref --verify --quiet "refs/heads/$branch"; then
  git worktree add "$worktree_path" "$branch"
else
  git worktree add -b "$branch" "$worktree_path"
fi
"#
    .to_string()
}

pub fn render_chat_script() -> String {
    r#"#!/usr/bin/env bash
set -euo pipefail

if [ "$#" -lt 2 ]; then
  echo "Usage: $0 <role> <message>"
  exit 1
fi

role="$1"
message="$2"
log_dir="${LOG_DIR:-logs}"
mkdir -p "$log_dir"
timestamp=$(date -u +"%Y-%m-%dT%H:%M:%SZ")
printf "[%s] [%s] %s\n" "$timestamp" "$role" "$message" >> "$log_dir/agent-chat.log"
"#
    .to_string()
}

pub fn render_scaffold_script(pr_body: &str) -> String {
    format!(
        r#"#!/usr/bin/env bash
set -euo pipefail

if ! command -v gh >/dev/null 2>&1; then
  echo "GitHub CLI (gh) is required to scaffold draft PRs."
  exit 1
fi

if [ "$#" -lt 2 ]; then
  echo "Usage: $0 <branch-name> <title>"
  exit 1
fi

branch="$1"
title="$2"

gh pr create --draft --title "$title" --body-file {} --head "$branch"
"#,
        pr_body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::{SystemInfo, Templates, Workflow};
    use pretty_assertions::assert_eq;

    fn sample_brief() -> Brief {
        Brief {
            system: SystemInfo {
                name: "publishing".into(),
                description: "Editorial pipeline".into(),
                version: "2".into(),
            },
            workflow: Workflow {
                pr_process_contract: PROCESS_CONTRACT.into(),
                use_worktrees: true,
                create_draft_prs: false,
            },
            roles: vec![Role {
                name: "Copy Editor".into(),
                description: "Checks style.".into(),
                slug: "copy-editor".into(),
            }],
            policies: vec!["citations-required".into()],
            templates: Templates::default(),
            references: vec![Reference {
                path: "references/style-guide.md".into(),
                purpose: "House style.".into(),
            }],
        }
    }

    #[test]
    fn test_render_agents() {
        let questions = vec!["System version missing; defaulted to 1.".to_string()];
        let text = render_agents(&sample_brief(), &questions);
        let expected = "\
# AGENTS

System: publishing - Editorial pipeline (v2)

Process Contract: agent-process-contract.md

Roles:
- Copy Editor: Checks style. (copy-editor/SKILL.md)

Workflow:
- Worktrees required: yes
- Draft PRs: no
- PR bodies must include 'Agent-Status: ...'

Templates:
- PR body: templates/pr-body.md
- Acceptance checklist: templates/acceptance-checklist.md

Policy Modules:
- citations-required

Validation:
- Run `brief validate .` from the repo root.

Open Questions:
- System version missing; defaulted to 1.";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_agents_omits_empty_sections() {
        let mut brief = sample_brief();
        brief.policies.clear();
        let text = render_agents(&brief, &[]);
        assert!(!text.contains("Policy Modules:"));
        assert!(!text.contains("Open Questions:"));
        assert!(text.ends_with("from the repo root."));
    }

    #[test]
    fn test_render_skills() {
        let text = render_skills(&sample_brief());
        assert!(text.contains("- Copy Editor: copy-editor/SKILL.md"));
        assert!(text.contains("References:\n- references/style-guide.md: House style."));
        assert!(text.ends_with("- Run `brief validate .` before opening a PR."));
    }

    #[test]
    fn test_render_role_skill() {
        let brief = sample_brief();
        let text = render_role_skill(&brief.roles[0], &brief.policies, &brief.references);
        assert!(text.starts_with("# Copy Editor Skill\n\n## Mission\nChecks style.\n"));
        assert!(text.contains("## Workflow"));
        assert!(text.contains("## Acceptance Criteria"));
        assert!(text.contains(
            "- Policy modules are followed and documented.\n\n## Policy Modules\n- citations-required"
        ));
        assert!(text.ends_with("## References\n- references/style-guide.md: House style."));

        let bare = render_role_skill(&brief.roles[0], &[], &[]);
        assert!(bare.ends_with("- Acceptance checklist is fully satisfied."));
    }

    #[test]
    fn test_reference_stub_title() {
        assert_eq!(
            render_reference_stub("references/policies/ai-assisted-disclosure.md", "Policy."),
            "# Ai Assisted Disclosure\n\nPurpose: Policy.\n\n- Add detailed guidance here.\n"
        );
        assert!(render_reference_stub("notes/STYLE.txt", "x").starts_with("# Style\n"));
    }

    #[test]
    fn test_policy_modules() {
        assert!(policy_module("citations-required")
            .unwrap()
            .starts_with("# Citations Required Policy"));
        assert!(policy_module("unknown").is_none());
    }

    #[test]
    fn test_scripts() {
        assert!(render_worktree_script().starts_with("#!/usr/bin/env bash\n"));
        assert!(render_chat_script().contains("${LOG_DIR:-logs}"));
        assert!(render_scaffold_script("templates/body.md")
            .contains("--body-file templates/body.md --head"));
        assert!(render_pr_body_template().contains("Agent-Status: Draft"));
        assert!(render_process_contract().contains("Run validation (`brief validate .`)."));
    }
}
