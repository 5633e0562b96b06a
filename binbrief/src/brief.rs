//! Loading a brief and filling in what it leaves out.
//!
//! The parser hands back a generic value tree. This module checks the shape
//! of the parts the generator needs and applies defaults, recording an
//! "open question" for every default it had to choose so the generated
//! system can surface them.

use libbrief::{parse_with_options, Mapping, ParseOptions, Value};
use log::debug;
use num_traits::Zero;

use crate::error::{BriefError, Result};

pub const DEFAULT_SYSTEM_NAME: &str = "unnamed-system";
pub const DEFAULT_DESCRIPTION: &str = "No description provided.";
pub const DEFAULT_VERSION: &str = "1";
pub const PROCESS_CONTRACT: &str = "agent-process-contract.md";
pub const DEFAULT_USE_WORKTREES: bool = true;
pub const DEFAULT_CREATE_DRAFT_PRS: bool = false;
pub const DEFAULT_PR_BODY: &str = "templates/pr-body.md";
pub const DEFAULT_ACCEPTANCE_CHECKLIST: &str = "templates/acceptance-checklist.md";
pub const DEFAULT_PURPOSE: &str = "No purpose provided.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub pr_process_contract: String,
    pub use_worktrees: bool,
    pub create_draft_prs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub description: String,
    /// Directory name for the role's SKILL.md.
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub pr_body: String,
    pub acceptance_checklist: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            pr_body: DEFAULT_PR_BODY.to_string(),
            acceptance_checklist: DEFAULT_ACCEPTANCE_CHECKLIST.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub path: String,
    pub purpose: String,
}

/// A brief with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brief {
    pub system: SystemInfo,
    pub workflow: Workflow,
    pub roles: Vec<Role>,
    pub policies: Vec<String>,
    pub templates: Templates,
    pub references: Vec<Reference>,
}

/// Parse brief text, requiring a mapping at the root.
pub fn load_brief(text: &str, options: &ParseOptions) -> Result<Mapping> {
    match parse_with_options(text, options)? {
        Value::Mapping(map) => Ok(map),
        other => {
            debug!("brief root is a {}", other.kind());
            Err(BriefError::NotAMapping)
        }
    }
}

/// Whether a value counts as "set" for defaulting purposes.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Integer(n) => !n.is_zero(),
        Value::String(s) => !s.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
    }
}

/// Render a scalar as text. Mappings and sequences have no text form.
///
/// Keywords keep the spelling briefs have always been rendered with:
/// `None`, `True` and `False`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("None".to_string()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Integer(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Mapping(_) | Value::Sequence(_) => None,
    }
}

/// Look up `key`, treating a falsy value like an absent one.
fn truthy<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| is_truthy(v))
}

/// The text of a truthy scalar field, if any.
fn text_field(map: &Mapping, section: &str, key: &str) -> Result<Option<String>> {
    match truthy(map, key) {
        Some(value) => scalar_text(value).map(Some).ok_or_else(|| {
            BriefError::invalid(format!(
                "{}.{} must be a scalar, found a {}.",
                section,
                key,
                value.kind()
            ))
        }),
        None => Ok(None),
    }
}

/// A section that must be a mapping when it is set at all.
fn section<'a>(data: &'a Mapping, key: &str) -> Result<Option<&'a Mapping>> {
    match truthy(data, key) {
        Some(Value::Mapping(map)) => Ok(Some(map)),
        Some(other) => Err(BriefError::invalid(format!(
            "{} must be a mapping, found a {}.",
            key,
            other.kind()
        ))),
        None => Ok(None),
    }
}

/// A section that must be a sequence when it is set at all.
fn list_section<'a>(data: &'a Mapping, key: &str, message: &str) -> Result<&'a [Value]> {
    match truthy(data, key) {
        Some(Value::Sequence(items)) => Ok(items),
        Some(_) => Err(BriefError::invalid(message)),
        None => Ok(&[]),
    }
}

/// Apply defaults to a parsed brief.
///
/// Returns the normalized brief and the open questions raised while
/// filling it in.
pub fn normalize(data: &Mapping) -> Result<(Brief, Vec<String>)> {
    let mut questions = Vec::new();
    let empty = Mapping::new();

    let system = normalize_system(section(data, "system")?.unwrap_or(&empty), &mut questions)?;
    let workflow =
        normalize_workflow(section(data, "workflow")?.unwrap_or(&empty), &mut questions)?;
    let roles = normalize_roles(data, &mut questions)?;
    let templates =
        normalize_templates(section(data, "templates")?.unwrap_or(&empty), &mut questions)?;

    let policies = list_section(data, "policies", "Policies must be a list.")?
        .iter()
        .map(|policy| {
            scalar_text(policy).ok_or_else(|| {
                BriefError::invalid(format!(
                    "Policies entries must be scalars, found a {}.",
                    policy.kind()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let references = list_section(data, "references", "References must be a list.")?
        .iter()
        .map(normalize_reference)
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "normalized brief with {} roles, {} policies, {} references",
        roles.len(),
        policies.len(),
        references.len()
    );

    Ok((
        Brief {
            system,
            workflow,
            roles,
            policies,
            templates,
            references,
        },
        questions,
    ))
}

fn normalize_system(raw: &Mapping, questions: &mut Vec<String>) -> Result<SystemInfo> {
    let version = match raw.get("version") {
        Some(v) if !v.is_null() => scalar_text(v).ok_or_else(|| {
            BriefError::invalid(format!(
                "system.version must be a scalar, found a {}.",
                v.kind()
            ))
        })?,
        _ => DEFAULT_VERSION.to_string(),
    };

    let system = SystemInfo {
        name: text_field(raw, "system", "name")?.unwrap_or_else(|| DEFAULT_SYSTEM_NAME.into()),
        description: text_field(raw, "system", "description")?
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.into()),
        version,
    };

    if !raw.contains_key("name") {
        questions.push(format!(
            "System name missing; used '{}'.",
            DEFAULT_SYSTEM_NAME
        ));
    }
    if !raw.contains_key("description") {
        questions.push("System description missing; used a placeholder.".to_string());
    }
    if !raw.contains_key("version") {
        questions.push(format!(
            "System version missing; defaulted to {}.",
            DEFAULT_VERSION
        ));
    }

    Ok(system)
}

fn normalize_workflow(raw: &Mapping, questions: &mut Vec<String>) -> Result<Workflow> {
    let requested = text_field(raw, "workflow", "pr_process_contract")?;
    if requested.as_deref().is_some_and(|c| c != PROCESS_CONTRACT) {
        questions.push(format!(
            "Brief requested a non-standard process contract; generated '{}' instead.",
            PROCESS_CONTRACT
        ));
    }

    let flag = |key: &str, default: bool| raw.get(key).map_or(default, is_truthy);
    let workflow = Workflow {
        pr_process_contract: PROCESS_CONTRACT.to_string(),
        use_worktrees: flag("use_worktrees", DEFAULT_USE_WORKTREES),
        create_draft_prs: flag("create_draft_prs", DEFAULT_CREATE_DRAFT_PRS),
    };

    if !raw.contains_key("use_worktrees") {
        questions.push("Workflow use_worktrees missing; defaulted to true.".to_string());
    }
    if !raw.contains_key("create_draft_prs") {
        questions.push("Workflow create_draft_prs missing; defaulted to false.".to_string());
    }

    Ok(workflow)
}

fn normalize_roles(data: &Mapping, questions: &mut Vec<String>) -> Result<Vec<Role>> {
    let raw = match truthy(data, "roles") {
        Some(Value::Sequence(items)) => items.as_slice(),
        Some(_) => return Err(BriefError::invalid("Roles entries must be mappings.")),
        None => {
            questions.push("No roles provided; generated placeholder role 'owner'.".to_string());
            return Ok(vec![Role {
                name: "owner".to_string(),
                description: "Owns overall system delivery and coordination.".to_string(),
                slug: "owner".to_string(),
            }]);
        }
    };

    let mut roles = Vec::with_capacity(raw.len());
    for entry in raw {
        let role = entry
            .as_mapping()
            .ok_or_else(|| BriefError::invalid("Roles entries must be mappings."))?;
        let name = text_field(role, "roles", "name")?
            .ok_or_else(|| BriefError::invalid("Each role must include a name."))?;
        let description =
            text_field(role, "roles", "description")?.unwrap_or_else(|| DEFAULT_DESCRIPTION.into());

        let slug = slugify(&name);
        if slug != name {
            questions.push(format!("Role '{}' normalized to directory '{}'.", name, slug));
        }
        roles.push(Role {
            name,
            description,
            slug,
        });
    }
    Ok(roles)
}

fn normalize_templates(raw: &Mapping, questions: &mut Vec<String>) -> Result<Templates> {
    let defaults = Templates::default();
    let templates = Templates {
        pr_body: text_field(raw, "templates", "pr_body")?.unwrap_or(defaults.pr_body),
        acceptance_checklist: text_field(raw, "templates", "acceptance_checklist")?
            .unwrap_or(defaults.acceptance_checklist),
    };

    if !raw.contains_key("pr_body") {
        questions.push("Templates pr_body missing; used default path.".to_string());
    }
    if !raw.contains_key("acceptance_checklist") {
        questions.push("Templates acceptance_checklist missing; used default path.".to_string());
    }

    Ok(templates)
}

fn normalize_reference(entry: &Value) -> Result<Reference> {
    let raw = entry
        .as_mapping()
        .ok_or_else(|| BriefError::invalid("References entries must be mappings."))?;
    let path = text_field(raw, "references", "path")?
        .ok_or_else(|| BriefError::invalid("Reference entries must include a path."))?;
    let purpose =
        text_field(raw, "references", "purpose")?.unwrap_or_else(|| DEFAULT_PURPOSE.into());
    Ok(Reference { path, purpose })
}

/// Turn a role name into a directory name.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9-]` with a
/// single dash, collapses dashes and trims them from both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "role".to_string()
    } else {
        slug.to_string()
    }
}
