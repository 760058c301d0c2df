//! Approver resolution for the review workflow.
//!
//! Projects assign free-text role names to members. Resolution maps those
//! names onto the structured approver roles the review workflow understands,
//! using an ordered table of hint predicates over a normalized form of the
//! name.

use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Structured approver roles derived from free-text role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproverRole {
    /// Product owner of the project.
    ProductOwner,
    /// Project lead.
    Lead,
}

impl ApproverRole {
    /// Returns the stable transport string for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductOwner => "po",
            Self::Lead => "lead",
        }
    }
}

/// A project-scoped pairing of a user to a free-text role name.
///
/// Either field may be absent; such rows are skipped by resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// The assigned user, when one is linked.
    pub user_id: Option<UserId>,
    /// The free-text role name, when one is set.
    pub role_name: Option<String>,
}

/// An approver derived from a role assignment. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedApprover {
    /// The structured role the assignment matched.
    pub role: ApproverRole,
    /// The assigned user.
    pub user_id: UserId,
    /// The original, un-normalized role name.
    pub role_name: String,
}

/// Normalizes a free-text role name for hint matching.
///
/// Trims, ASCII-lowercases, and collapses any run of whitespace, hyphen, or
/// underscore characters into a single space. Idempotent.
#[must_use]
pub fn normalize_role_name(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut pending_space = false;

    for character in raw.trim().chars() {
        if character.is_whitespace() || character == '-' || character == '_' {
            pending_space = !normalized.is_empty();
            continue;
        }

        if pending_space {
            normalized.push(' ');
            pending_space = false;
        }
        normalized.push(character.to_ascii_lowercase());
    }

    normalized
}

type HintPredicate = fn(&str) -> bool;

/// Hint rules in evaluation order: PO before LEAD.
const HINT_RULES: [(ApproverRole, HintPredicate); 2] = [
    (ApproverRole::ProductOwner, matches_product_owner_hint),
    (ApproverRole::Lead, matches_lead_hint),
];

const PRODUCT_OWNER_HINTS: [&str; 2] = ["po", "product owner"];

fn matches_product_owner_hint(normalized: &str) -> bool {
    PRODUCT_OWNER_HINTS.iter().any(|hint| {
        normalized == *hint
            || normalized.contains(hint)
            // Dotted abbreviations such as "p.o." match after dot removal.
            || normalized.replace('.', "") == *hint
    })
}

fn matches_lead_hint(normalized: &str) -> bool {
    // "lead" must appear as a whole word at a name boundary; "leader" or
    // other words merely containing it do not match.
    normalized == "lead" || normalized.ends_with(" lead") || normalized.starts_with("lead ")
}

/// Resolves a project's role assignments into structured approvers.
///
/// Pure and deterministic; output order follows input order, with PO
/// entries before LEAD entries for an assignment matching both hint sets.
/// A name such as "lead po" yields two approvers pointing at the same
/// user, intentionally without deduplication.
#[must_use]
pub fn resolve_approvers(assignments: &[RoleAssignment]) -> Vec<ResolvedApprover> {
    let mut approvers = Vec::new();

    for assignment in assignments {
        let (Some(user_id), Some(role_name)) =
            (assignment.user_id, assignment.role_name.as_deref())
        else {
            continue;
        };

        let normalized = normalize_role_name(role_name);
        for (role, matches_hint) in HINT_RULES {
            if matches_hint(&normalized) {
                approvers.push(ResolvedApprover {
                    role,
                    user_id,
                    role_name: role_name.to_owned(),
                });
            }
        }
    }

    approvers
}
