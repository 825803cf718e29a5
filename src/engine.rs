//! Token substitution engine.
//!
//! Tokens have the form `[[GROUP.PROPERTY|modifier|...]]`. Group and property
//! names are matched case-insensitively; modifiers are applied left to right
//! to the resolved property value.

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};
use crate::guid::GuidCache;
use crate::value::ValueProviderGroup;

pub const TOKEN_START: &str = "[[";
pub const TOKEN_END: &str = "]]";
pub const MODIFIER_SEPARATOR: char = '|';

pub const LOWERCASE: &str = "lowercase";
pub const UPPERCASE: &str = "uppercase";
pub const GUID: &str = "guid";

/// A transform applied to a resolved value before insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier<'a> {
    Lowercase,
    Uppercase,
    /// Replaces the value with the identifier cached under the whole modifier string.
    Guid(&'a str),
}

impl<'a> Modifier<'a> {
    /// Parses a single modifier, ignoring surrounding separators.
    ///
    /// # Errors
    /// * `Error::UnsupportedModifier` for anything outside `lowercase`,
    ///   `uppercase` and `guid[...]`
    pub fn parse(modifier: &'a str) -> Result<Self> {
        let modifier = modifier.trim_matches(MODIFIER_SEPARATOR);
        if modifier.eq_ignore_ascii_case(LOWERCASE) {
            Ok(Modifier::Lowercase)
        } else if modifier.eq_ignore_ascii_case(UPPERCASE) {
            Ok(Modifier::Uppercase)
        } else if modifier.get(..GUID.len()).is_some_and(|head| head.eq_ignore_ascii_case(GUID)) {
            Ok(Modifier::Guid(modifier))
        } else {
            Err(Error::UnsupportedModifier { modifier: modifier.to_string() })
        }
    }
}

/// Substitutes tokens in paths and file contents.
///
/// One engine is used for a whole generation run, so identifiers produced by
/// `guid` modifiers are shared by every resource of that run.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    guids: GuidCache,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guids(&self) -> &GuidCache {
        &self.guids
    }

    /// Replaces every token of `group` found in `text`.
    ///
    /// Properties are processed in registration order. Tokens that belong to
    /// other groups are left untouched.
    ///
    /// # Errors
    /// * `Error::UnterminatedToken` if a token has no closing `]]`
    /// * `Error::UnsupportedModifier` if a token uses an unknown modifier
    pub fn substitute(&self, text: &str, group: &ValueProviderGroup) -> Result<String> {
        debug!("Filling template with values of group '{}'", group.name());

        let container = group.name().to_uppercase();
        let names: Vec<String> = group.properties().map(|(name, _)| name.to_uppercase()).collect();

        let mut content = text.to_string();
        for ((_, value), name) in group.properties().zip(&names) {
            let prefix = format!("{TOKEN_START}{container}.{name}");
            // Remainders of longer property names sharing this prefix, e.g. SPACE for NAMESPACE.
            let claimed: Vec<&str> = names
                .iter()
                .filter_map(|other| other.strip_prefix(name.as_str()))
                .filter(|rest| !rest.is_empty())
                .collect();
            content = self.replace_tokens(&content, &prefix, &claimed, || value.resolve())?;
        }
        Ok(content)
    }

    /// Folds `text` through [`TemplateEngine::substitute`] once per group, in order.
    pub fn substitute_all(&self, text: &str, groups: &[ValueProviderGroup]) -> Result<String> {
        groups
            .iter()
            .try_fold(text.to_string(), |content, group| self.substitute(&content, group))
    }

    /// Applies one modifier to `value`.
    pub fn apply_modifier(&self, value: &str, modifier: &str) -> Result<String> {
        Ok(match Modifier::parse(modifier)? {
            Modifier::Lowercase => value.to_lowercase(),
            Modifier::Uppercase => value.to_uppercase(),
            Modifier::Guid(key) => self.guids.get_or_create(key).to_string(),
        })
    }

    /// Single pass over `text` replacing each token starting with `prefix`.
    ///
    /// Occurrences continuing with one of `claimed` belong to another property
    /// and are skipped. Inserted values are not rescanned for the same prefix.
    fn replace_tokens<F>(
        &self,
        text: &str,
        prefix: &str,
        claimed: &[&str],
        resolve: F,
    ) -> Result<String>
    where
        F: Fn() -> String,
    {
        let pattern = prefix_pattern(prefix)?;
        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut search_from = 0;

        while let Some(found) = pattern.find_at(text, search_from) {
            let (start, after) = (found.start(), found.end());

            if claimed.iter().any(|rest| starts_with_ignore_case(&text[after..], rest)) {
                search_from = after;
                continue;
            }

            debug!("Found template key '{prefix}' at position '{start}'");

            let end = text[after..].find(TOKEN_END).map(|offset| after + offset).ok_or_else(
                || Error::UnterminatedToken { key: prefix.to_string(), position: start },
            )?;

            let mut value = resolve();
            for modifier in text[after..end].split(MODIFIER_SEPARATOR).filter(|m| !m.is_empty()) {
                value = self.apply_modifier(&value, modifier)?;
            }

            output.push_str(&text[cursor..start]);
            output.push_str(&value);
            cursor = end + TOKEN_END.len();
            search_from = cursor;

            debug!("Replaced template key '{prefix}' at position '{start}'");
        }

        output.push_str(&text[cursor..]);
        Ok(output)
    }
}

fn prefix_pattern(prefix: &str) -> Result<Regex> {
    RegexBuilder::new(&regex::escape(prefix))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::TemplateError(e.to_string()))
}

fn starts_with_ignore_case(text: &str, upper: &str) -> bool {
    text.get(..upper.len()).is_some_and(|head| head.to_uppercase() == upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    fn solution() -> ValueProviderGroup {
        ValueProviderGroup::new("SolutionTemplate")
            .with_value("Name", "Acme")
            .with_value("Namespace", "Acme.Core")
            .with_value("Empty", "")
    }

    #[test]
    fn test_text_without_tokens_is_unchanged() {
        let engine = TemplateEngine::new();
        let text = "no tokens [[OTHER.NAME]] here [[ and ]] there";
        assert_eq!(engine.substitute(text, &solution()).unwrap(), text);
        assert_eq!(engine.substitute("", &solution()).unwrap(), "");
    }

    #[test]
    fn test_plain_token() {
        let engine = TemplateEngine::new();
        let result = engine.substitute("Project [[SOLUTION.NAME]];", &solution()).unwrap();
        assert_eq!(result, "Project Acme;");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let engine = TemplateEngine::new();
        let result = engine
            .substitute("[[solution.name]] [[SOLUTION.NAME]] [[Solution.name]]", &solution())
            .unwrap();
        assert_eq!(result, "Acme Acme Acme");
    }

    #[test]
    fn test_longer_property_name_is_not_confused() {
        let engine = TemplateEngine::new();
        let result =
            engine.substitute("[[SOLUTION.NAMESPACE]]/[[SOLUTION.NAME]]", &solution()).unwrap();
        assert_eq!(result, "Acme.Core/Acme");
    }

    #[test]
    fn test_unknown_longer_property_is_rejected() {
        let engine = TemplateEngine::new();
        let group = ValueProviderGroup::new("Solution").with_value("Name", "Acme");

        for text in ["[[SOLUTION.NAMEX]]", "[[SOLUTION.NAME_lower]]"] {
            match engine.substitute(text, &group) {
                Err(Error::UnsupportedModifier { modifier }) => {
                    assert_eq!(format!("[[SOLUTION.NAME{modifier}]]"), text)
                }
                other => panic!("Expected UnsupportedModifier for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_typo_after_longer_property_is_rejected() {
        let engine = TemplateEngine::new();
        let result = engine.substitute("[[SOLUTION.NAMESPACES]]", &solution());
        assert!(matches!(result, Err(Error::UnsupportedModifier { modifier }) if modifier == "S"));
    }

    #[test]
    fn test_empty_value_collapses() {
        let engine = TemplateEngine::new();
        let result = engine.substitute("a[[SOLUTION.EMPTY|uppercase]]b", &solution()).unwrap();
        assert_eq!(result, "ab");
    }

    #[test]
    fn test_modifier_chain() {
        let engine = TemplateEngine::new();
        let group = solution();
        assert_eq!(engine.substitute("[[SOLUTION.NAME|uppercase]]", &group).unwrap(), "ACME");
        assert_eq!(engine.substitute("[[SOLUTION.NAME|lowercase]]", &group).unwrap(), "acme");
        assert_eq!(
            engine.substitute("[[SOLUTION.NAME|lowercase|uppercase]]", &group).unwrap(),
            engine.substitute("[[SOLUTION.NAME|uppercase]]", &group).unwrap()
        );
        assert_eq!(engine.substitute("[[SOLUTION.NAME||UpperCase|]]", &group).unwrap(), "ACME");
    }

    #[test]
    fn test_guid_modifier_is_stable_per_key() {
        let engine = TemplateEngine::new();
        let result = engine
            .substitute(
                "[[SOLUTION.NAME|guid:x]] [[SOLUTION.NAME|guid:x]] [[SOLUTION.NAME|guid:y]]",
                &solution(),
            )
            .unwrap();
        let guids: Vec<&str> = result.split(' ').collect();

        assert_eq!(guids.len(), 3);
        assert!(Uuid::parse_str(guids[0]).is_ok());
        assert_eq!(guids[0], guids[1]);
        assert_ne!(guids[0], guids[2]);
    }

    #[test]
    fn test_guid_is_shared_across_calls_and_groups() {
        let engine = TemplateEngine::new();
        let company = ValueProviderGroup::new("Company").with_value("Name", "WildGums");

        let first = engine.substitute("[[SOLUTION.NAME|guid]]", &solution()).unwrap();
        let second = engine.substitute("[[COMPANY.NAME|guid]]", &company).unwrap();
        assert_eq!(first, second);

        let other_engine = TemplateEngine::new();
        let third = other_engine.substitute("[[COMPANY.NAME|guid]]", &company).unwrap();
        assert_ne!(first, third);
    }

    #[test]
    fn test_guid_then_case_modifier() {
        let engine = TemplateEngine::new();
        let upper = engine.substitute("[[SOLUTION.NAME|guid|uppercase]]", &solution()).unwrap();
        let lower = engine.substitute("[[SOLUTION.NAME|guid|lowercase]]", &solution()).unwrap();

        assert_eq!(upper, upper.to_uppercase());
        assert_eq!(lower, upper.to_lowercase());
        assert_eq!(lower, engine.guids().get_or_create("guid").to_string());
    }

    #[test]
    fn test_unterminated_token() {
        let engine = TemplateEngine::new();
        let result = engine.substitute("x [[SOLUTION.NAME]] then [[SOLUTION.NAME", &solution());

        match result {
            Err(Error::UnterminatedToken { key, position }) => {
                assert_eq!(key, "[[SOLUTION.NAME");
                assert_eq!(position, 25);
            }
            other => panic!("Expected UnterminatedToken, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_modifier() {
        let engine = TemplateEngine::new();
        let result = engine.substitute("[[SOLUTION.NAME|frobnicate]]", &solution());

        match result {
            Err(Error::UnsupportedModifier { modifier }) => assert_eq!(modifier, "frobnicate"),
            other => panic!("Expected UnsupportedModifier, got {other:?}"),
        }
    }

    #[test]
    fn test_modifier_parse() {
        assert_eq!(Modifier::parse("LOWERCASE").unwrap(), Modifier::Lowercase);
        assert_eq!(Modifier::parse("|uppercase|").unwrap(), Modifier::Uppercase);
        assert_eq!(Modifier::parse("guid:foo").unwrap(), Modifier::Guid("guid:foo"));
        assert_eq!(Modifier::parse("Guid").unwrap(), Modifier::Guid("Guid"));
        assert!(Modifier::parse("gui").is_err());
        assert!(Modifier::parse(" lowercase").is_err());
    }

    #[test]
    fn test_nested_value_resolved_per_occurrence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let group = ValueProviderGroup::new("Project").with_nested("Id", "core", move |tag| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(format!("{tag}-id"))
        });
        let engine = TemplateEngine::new();

        let result = engine.substitute("[[PROJECT.ID]] [[project.id|uppercase]]", &group).unwrap();
        assert_eq!(result, "core-id CORE-ID");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        engine.substitute("nothing to see", &group).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_substitute_all_folds_groups_in_order() {
        let engine = TemplateEngine::new();
        let groups = vec![
            solution(),
            ValueProviderGroup::new("CompanyTemplate").with_value("Name", Value::from("WildGums")),
        ];

        let result = engine
            .substitute_all("[[COMPANY.NAME]].[[SOLUTION.NAME|lowercase]]", &groups)
            .unwrap();
        assert_eq!(result, "WildGums.acme");
    }

    #[test]
    fn test_value_containing_own_token_is_not_rescanned() {
        let engine = TemplateEngine::new();
        let group = ValueProviderGroup::new("Solution").with_value("Name", "[[SOLUTION.NAME]]");

        let result = engine.substitute("<[[SOLUTION.NAME]]>", &group).unwrap();
        assert_eq!(result, "<[[SOLUTION.NAME]]>");
    }
}
