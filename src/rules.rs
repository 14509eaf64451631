//! Named production rules.

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Separates a rule's name from its body in a rule expression.
pub const RULE_DELIMITER: char = '=';

/// A single production rule: every occurrence of `name` is rewritten to `body`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub body: String,
}

impl Rule {
    /// Parses `<name>=<body>`, splitting at the first `=`.
    pub fn parse(expression: &str) -> Result<Self, RuleError> {
        let (name, body) = expression.split_once(RULE_DELIMITER).ok_or_else(|| {
            RuleError::InvalidRuleFormat {
                expression: expression.to_owned(),
            }
        })?;
        Ok(Self {
            name: name.to_owned(),
            body: body.to_owned(),
        })
    }
}

/// The rule set of one L-System session.
///
/// Rules are kept in ascending name order. Generation walks them in that
/// order, so the ordering is observable in the produced axioms.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleStore {
    rules: BTreeMap<String, String>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and inserts a rule expression.
    ///
    /// If a rule with the same name already exists the store is left
    /// untouched and the existing body wins.
    pub fn add_rule(&mut self, expression: &str) -> Result<(), RuleError> {
        let rule = Rule::parse(expression)?;
        self.insert(rule);
        Ok(())
    }

    /// Inserts an already-parsed rule. Returns `false` if the name was taken.
    pub fn insert(&mut self, rule: Rule) -> bool {
        if self.rules.contains_key(&rule.name) {
            trace!(name = %rule.name, "rule already present, ignoring");
            return false;
        }
        debug!(name = %rule.name, body = %rule.body, "rule added");
        self.rules.insert(rule.name, rule.body);
        true
    }

    /// Removes the rule called `name`, if any.
    pub fn remove_rule(&mut self, name: &str) -> Option<Rule> {
        let body = self.rules.remove(name)?;
        debug!(name, "rule removed");
        Some(Rule {
            name: name.to_owned(),
            body,
        })
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    /// Returns the body bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.rules.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates `(name, body)` pairs in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_at_first_delimiter() {
        let rule = Rule::parse("F=F[+F]=F").unwrap();
        assert_eq!(rule.name, "F");
        assert_eq!(rule.body, "F[+F]=F");
    }

    #[test]
    fn empty_body_is_allowed() {
        let rule = Rule::parse("X=").unwrap();
        assert_eq!(rule.name, "X");
        assert_eq!(rule.body, "");
    }

    #[test]
    fn missing_delimiter_is_rejected_and_store_unchanged() {
        let mut store = RuleStore::new();
        store.add_rule("A=B").unwrap();
        let err = store.add_rule("noequalsign").unwrap_err();
        assert_eq!(
            err,
            RuleError::InvalidRuleFormat {
                expression: "noequalsign".into()
            }
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("A"), Some("B"));
    }

    #[test]
    fn first_writer_wins() {
        let mut store = RuleStore::new();
        store.add_rule("A=X").unwrap();
        store.add_rule("A=Y").unwrap();
        assert_eq!(store.get("A"), Some("X"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut store = RuleStore::new();
        store.add_rule("A=B").unwrap();
        assert!(store.remove_rule("Z").is_none());
        assert_eq!(store.len(), 1);

        let removed = store.remove_rule("A").unwrap();
        assert_eq!(removed.body, "B");
        assert!(store.is_empty());
    }

    #[test]
    fn iteration_is_in_ascending_name_order() {
        let mut store = RuleStore::new();
        for expr in ["b=1", "AB=2", "A=3", "B=4"] {
            store.add_rule(expr).unwrap();
        }
        let names: Vec<_> = store.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["A", "AB", "B", "b"]);

        store.clear_rules();
        assert!(store.is_empty());
    }
}
