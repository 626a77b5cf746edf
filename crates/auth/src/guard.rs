//! Route/action guard over the permission gate.

use serde::Serialize;

use crate::{Authority, PermissionGate, PermissionSet, PrincipalSource};

/// What a protected view or action requires.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "authorities", rename_all = "snake_case")]
pub enum Requirement {
    /// Anyone, signed in or not.
    #[default]
    Public,
    /// Every listed authority.
    All(Vec<Authority>),
    /// At least one listed authority.
    Any(Vec<Authority>),
}

impl Requirement {
    pub fn authority(authority: Authority) -> Self {
        Self::All(vec![authority])
    }

    pub fn all(authorities: impl IntoIterator<Item = Authority>) -> Self {
        Self::All(authorities.into_iter().collect())
    }

    pub fn any(authorities: impl IntoIterator<Item = Authority>) -> Self {
        Self::Any(authorities.into_iter().collect())
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    pub fn is_met_by(&self, permissions: &PermissionSet) -> bool {
        match self {
            Self::Public => true,
            Self::All(required) => permissions.contains_all(required),
            Self::Any(required) => permissions.contains_any(required),
        }
    }

    /// Authorities that would have to be added for the requirement to hold.
    ///
    /// For `Any`, every listed authority is reported when none is held.
    pub fn missing(&self, permissions: &PermissionSet) -> Vec<Authority> {
        match self {
            Self::Public => Vec::new(),
            Self::All(required) => required
                .iter()
                .filter(|a| !permissions.contains(a))
                .cloned()
                .collect(),
            Self::Any(required) if permissions.contains_any(required) => Vec::new(),
            Self::Any(required) => required.clone(),
        }
    }
}

/// Outcome of guarding a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    Render,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Signed in, but the requirement is not met.
    Unauthorized,
}

/// Decide whether a protected view may render.
pub fn guard<P: PrincipalSource>(gate: &PermissionGate<P>, requirement: &Requirement) -> GuardDecision {
    if requirement.is_public() {
        return GuardDecision::Render;
    }
    let Some(principal) = gate.principal() else {
        return GuardDecision::RedirectToLogin;
    };
    let permissions = crate::derive_permissions(Some(&principal));
    if requirement.is_met_by(&permissions) {
        GuardDecision::Render
    } else {
        GuardDecision::Unauthorized
    }
}

/// Why a guard decision came out the way it did.
#[derive(Debug, Clone, Serialize)]
pub struct GuardExplanation {
    pub decision: GuardDecision,
    pub requirement: Requirement,
    pub signed_in: bool,
    pub granted: Vec<Authority>,
    pub missing: Vec<Authority>,
    pub reason: String,
}

/// Explain a guard decision (for the unauthorized page and diagnostics).
pub fn explain<P: PrincipalSource>(gate: &PermissionGate<P>, requirement: &Requirement) -> GuardExplanation {
    let principal = gate.principal();
    let permissions = crate::derive_permissions(principal.as_ref());
    let decision = guard(gate, requirement);
    let missing = match decision {
        GuardDecision::Render => Vec::new(),
        _ => requirement.missing(&permissions),
    };

    let reason = match decision {
        GuardDecision::Render if requirement.is_public() => "public".to_string(),
        GuardDecision::Render => "all required authorities are held".to_string(),
        GuardDecision::RedirectToLogin => "not signed in".to_string(),
        GuardDecision::Unauthorized => format!(
            "missing {}",
            missing
                .iter()
                .map(Authority::as_str)
                .collect::<Vec<_>>()
                .join(if matches!(requirement, Requirement::Any(_)) { " or " } else { " and " })
        ),
    };

    GuardExplanation {
        decision,
        requirement: requirement.clone(),
        signed_in: principal.is_some(),
        granted: permissions.sorted(),
        missing,
        reason,
    }
}
