//! Plan computation
//!
//! Compares the last observed state with the declared one and picks the
//! lifecycle step the host should run next.

use std::fmt;

use serde::Serialize;

use crate::drift::{self, PlanValue, PrivateState};
use crate::resource::{FileState, RepositoryFile};

/// Step needed to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    /// Path or branch changed: delete the old file, create the new one
    Replace,
    NoOp,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::NoOp => "no-op",
        };
        f.write_str(name)
    }
}

/// Result of planning one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub action: Action,

    /// Declared state with frozen and computed attributes applied
    pub planned: RepositoryFile,

    /// Whether the drift freeze replaced the declared content
    pub content_frozen: bool,
}

/// Plan `desired` against `prior`.
pub fn plan(prior: Option<&FileState>, desired: &RepositoryFile, private: &PrivateState) -> Plan {
    let Some(prior) = prior.filter(|state| state.exists()) else {
        return Plan {
            action: Action::Create,
            planned: desired.clone(),
            content_frozen: false,
        };
    };

    if prior.locator() != desired.path || prior.file.branch() != desired.branch() {
        tracing::debug!(
            prior_path = %prior.locator(),
            path = %desired.path,
            "Immutable attribute changed, replacing file"
        );
        return Plan {
            action: Action::Replace,
            planned: desired.clone(),
            content_frozen: false,
        };
    }

    let content = match drift::freeze_content(
        Some(&prior.file.content),
        PlanValue::Known(desired.content.clone()),
        private,
    ) {
        PlanValue::Known(content) => content,
        PlanValue::Unknown => desired.content.clone(),
    };

    let planned = RepositoryFile {
        content,
        author_name: desired
            .author_name
            .clone()
            .or_else(|| prior.file.author_name.clone()),
        message: desired.message.clone().or_else(|| prior.file.message.clone()),
        ..desired.clone()
    };
    let content_frozen = planned.content != desired.content;

    let action = if planned == prior.file {
        Action::NoOp
    } else {
        Action::Update
    };

    Plan {
        action,
        planned,
        content_frozen,
    }
}
