//! Drift freeze
//!
//! When the provider sets `ignore_updates`, Read records a sticky flag in the
//! resource's private state. At plan time the flag makes the prior content
//! win over any proposed change, so edits are never planned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Private-state key holding the ignore-updates flag.
pub const IGNORE_UPDATES_KEY: &str = "IgnoreUpdates";

/// Per-resource key/value store kept by the host outside the user schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateState(BTreeMap<String, String>);

impl PrivateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_key(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set_key(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// The ignore-updates flag; anything but `true` (any case) is off.
    pub fn ignore_updates(&self) -> bool {
        self.get_key(IGNORE_UPDATES_KEY)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn set_ignore_updates(&mut self, ignore: bool) {
        self.set_key(IGNORE_UPDATES_KEY, if ignore { "true" } else { "false" });
    }
}

/// A planned attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanValue<T> {
    /// Not known until apply
    Unknown,
    Known(T),
}

/// Decide the effective proposed value of a frozen attribute.
///
/// Without a prior value, or while the proposal is unknown, the proposal
/// stands. Otherwise an ignore-updates flag replaces a differing proposal
/// with the prior value.
pub fn decide<T: PartialEq>(
    prior: Option<T>,
    proposed: PlanValue<T>,
    ignore_updates: bool,
) -> PlanValue<T> {
    let Some(prior) = prior else {
        tracing::debug!("No prior value, keeping proposed value");
        return proposed;
    };

    match proposed {
        PlanValue::Unknown => {
            tracing::debug!("Proposed value is unknown, keeping it");
            PlanValue::Unknown
        }
        PlanValue::Known(value) if ignore_updates && value != prior => {
            tracing::debug!("Using prior value instead of proposed value");
            PlanValue::Known(prior)
        }
        known => known,
    }
}

/// [`decide`] for file content, reading the flag from private state.
pub fn freeze_content(
    prior: Option<&str>,
    proposed: PlanValue<String>,
    private: &PrivateState,
) -> PlanValue<String> {
    decide(prior.map(str::to_string), proposed, private.ignore_updates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, PlanValue::Known("new"), true, PlanValue::Known("new"))]
    #[case(Some("old"), PlanValue::Unknown, true, PlanValue::Unknown)]
    #[case(Some("old"), PlanValue::Known("new"), true, PlanValue::Known("old"))]
    #[case(Some("old"), PlanValue::Known("new"), false, PlanValue::Known("new"))]
    #[case(Some("same"), PlanValue::Known("same"), true, PlanValue::Known("same"))]
    fn test_decide(
        #[case] prior: Option<&str>,
        #[case] proposed: PlanValue<&str>,
        #[case] ignore: bool,
        #[case] expected: PlanValue<&str>,
    ) {
        assert_eq!(decide(prior, proposed, ignore), expected);
    }

    #[rstest]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("false", false)]
    #[case("yes", false)]
    fn test_flag_parsing(#[case] raw: &str, #[case] expected: bool) {
        let mut private = PrivateState::new();
        private.set_key(IGNORE_UPDATES_KEY, raw);
        assert_eq!(private.ignore_updates(), expected);
    }

    #[test]
    fn test_flag_absent_is_off() {
        assert!(!PrivateState::new().ignore_updates());
    }

    #[test]
    fn test_private_state_serializes_as_map() {
        let mut private = PrivateState::new();
        private.set_ignore_updates(true);
        assert_eq!(
            serde_json::to_string(&private).unwrap(),
            r#"{"IgnoreUpdates":"true"}"#
        );
    }

    proptest! {
        #[test]
        fn prop_frozen_content_always_equals_prior(prior in ".*", proposed in ".*") {
            let mut private = PrivateState::new();
            private.set_ignore_updates(true);
            let effective = freeze_content(Some(&prior), PlanValue::Known(proposed), &private);
            prop_assert_eq!(effective, PlanValue::Known(prior));
        }

        #[test]
        fn prop_unfrozen_content_passes_through(prior in ".*", proposed in ".*") {
            let effective = freeze_content(Some(&prior), PlanValue::Known(proposed.clone()), &PrivateState::new());
            prop_assert_eq!(effective, PlanValue::Known(proposed));
        }
    }
}
