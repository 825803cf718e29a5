//! Configuration handling for solgen.
//! Loads the context file supplying token values and applies command line
//! overrides on top of it.

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::Path;

use crate::context::SolutionContext;
use crate::error::{Error, Result};
use crate::value::{group_name, CompanyTemplate, SolutionTemplate, Value, ValueProviderGroup};

/// A property value in the context file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Env(EnvValue),
    Scalar(serde_json::Value),
}

/// `{ env: VAR }`, read from the environment each time a token uses it.
/// Objects with any other key are plain scalars.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvValue {
    pub env: String,
}

impl ConfigValue {
    pub fn env<S: Into<String>>(name: S) -> Self {
        ConfigValue::Env(EnvValue { env: name.into() })
    }
}

impl From<ConfigValue> for Value {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Env(EnvValue { env }) => {
                Value::nested(env, |name| std::env::var(name).ok())
            }
            ConfigValue::Scalar(value) => Value::Scalar(value),
        }
    }
}

/// Groups of properties keyed by group name, in file order.
pub type ContextConfig = IndexMap<String, IndexMap<String, ConfigValue>>;

/// A `GROUP.PROPERTY=VALUE` override given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub group: String,
    pub property: String,
    pub value: String,
}

impl std::str::FromStr for Override {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            || Error::ConfigError(format!("invalid override '{s}', expected GROUP.PROPERTY=VALUE"));

        let (key, value) = s.split_once('=').ok_or_else(invalid)?;
        let (group, property) = key.trim().split_once('.').ok_or_else(invalid)?;
        if group.is_empty() || property.is_empty() {
            return Err(invalid());
        }

        Ok(Self { group: group.to_string(), property: property.to_string(), value: value.to_string() })
    }
}

/// Reads a context file from disk.
///
/// # Errors
/// * `Error::IoError` if the file can't be read
/// * `Error::ConfigError` if the content is neither valid JSON nor YAML
pub fn load_context_file<P: AsRef<Path>>(path: P) -> Result<ContextConfig> {
    let path = path.as_ref();
    debug!("Loading context from {}", path.display());
    parse_context(&std::fs::read_to_string(path)?)
}

/// Parses context content, trying JSON first and YAML second.
pub fn parse_context(content: &str) -> Result<ContextConfig> {
    if content.trim().is_empty() {
        return Ok(ContextConfig::new());
    }

    match serde_json::from_str(content) {
        Ok(config) => Ok(config),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid context format: {e}"))),
    }
}

/// Applies overrides to `config`, matching group and property names case-insensitively.
pub fn apply_overrides(config: &mut ContextConfig, overrides: &[Override]) {
    for item in overrides {
        let group = match config.keys().position(|key| key.eq_ignore_ascii_case(&item.group)) {
            Some(index) => &mut config[index],
            None => config.entry(item.group.clone()).or_default(),
        };

        let value = ConfigValue::Scalar(serde_json::Value::String(item.value.clone()));
        match group.keys().position(|key| key.eq_ignore_ascii_case(&item.property)) {
            Some(index) => group[index] = value,
            None => {
                group.insert(item.property.clone(), value);
            }
        }
    }
}

/// Builds the generation context for `output_dir` from the loaded configuration.
///
/// The solution name defaults to the name of the output directory.
pub fn build_context<P: AsRef<Path>>(output_dir: P, config: ContextConfig) -> SolutionContext {
    let output_dir = output_dir.as_ref();

    let lookup = |group: &str, property: &str| -> Option<String> {
        config
            .iter()
            .find(|(name, _)| group_name(name).eq_ignore_ascii_case(group))
            .and_then(|(_, properties)| {
                properties.iter().find(|(name, _)| name.eq_ignore_ascii_case(property))
            })
            .map(|(_, value)| Value::from(value.clone()).resolve())
    };

    let default_name = output_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let solution = SolutionTemplate {
        name: lookup("Solution", "Name").unwrap_or(default_name),
        directory: lookup("Solution", "Directory").unwrap_or_default(),
    };
    let company = CompanyTemplate { name: lookup("Company", "Name").unwrap_or_default() };

    let mut context = SolutionContext::new(output_dir, solution, company);
    for (name, properties) in config {
        let mut group = ValueProviderGroup::new(name);
        for (property, value) in properties {
            group.insert(property, value.into());
        }
        context.add_group(group);
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TemplateContext;
    use serde_json::json;

    #[test]
    fn test_parse_json_context() {
        let config = parse_context(r#"{"solution": {"name": "Acme", "version": 2}}"#).unwrap();
        assert_eq!(config["solution"]["name"], ConfigValue::Scalar(json!("Acme")));
        assert_eq!(config["solution"]["version"], ConfigValue::Scalar(json!(2)));
    }

    #[test]
    fn test_parse_yaml_context() {
        let content = "solution:\n  name: Acme\nproject:\n  owner:\n    env: SOLGEN_TEST_OWNER\n";
        let config = parse_context(content).unwrap();

        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["solution", "project"]);
        assert_eq!(config["project"]["owner"], ConfigValue::env("SOLGEN_TEST_OWNER"));
    }

    #[test]
    fn test_object_with_extra_keys_is_scalar() {
        let config = parse_context(r#"{"project": {"owner": {"env": "USER", "default": "me"}}}"#)
            .unwrap();
        assert_eq!(
            config["project"]["owner"],
            ConfigValue::Scalar(json!({"env": "USER", "default": "me"}))
        );
    }

    #[test]
    fn test_parse_empty_and_invalid_context() {
        assert!(parse_context("  \n").unwrap().is_empty());
        assert!(matches!(parse_context("- just\n- a list\n"), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_override_parsing() {
        let item: Override = "Solution.Name=Acme=Corp".parse().unwrap();
        assert_eq!(item.group, "Solution");
        assert_eq!(item.property, "Name");
        assert_eq!(item.value, "Acme=Corp");

        assert!("Solution=Acme".parse::<Override>().is_err());
        assert!(".Name=Acme".parse::<Override>().is_err());
        assert!("SolutionName".parse::<Override>().is_err());
    }

    #[test]
    fn test_apply_overrides_case_insensitive() {
        let mut config = parse_context(r#"{"solution": {"name": "Acme"}}"#).unwrap();
        let overrides = vec![
            "SOLUTION.NAME=Globex".parse().unwrap(),
            "project.id=42".parse().unwrap(),
        ];
        apply_overrides(&mut config, &overrides);

        assert_eq!(config["solution"]["name"], ConfigValue::Scalar(json!("Globex")));
        assert_eq!(config["project"]["id"], ConfigValue::Scalar(json!("42")));
    }

    #[test]
    fn test_build_context() {
        let config = parse_context(
            r#"{"solution": {"name": "Acme", "year": 2016}, "company": {"name": "WildGums"}, "project": {"id": "core"}}"#,
        )
        .unwrap();
        let context = build_context("/tmp/out", config);
        let groups = context.provider_groups();
        let names: Vec<&str> = groups.iter().map(|g| g.name()).collect();

        assert_eq!(names, vec!["Solution", "Company", "DateTime", "project"]);

        let solution = context.group("Solution").unwrap();
        assert_eq!(solution.get("Name").map(Value::resolve), Some("Acme".to_string()));
        assert_eq!(solution.get("Year").map(Value::resolve), Some("2016".to_string()));
        assert_eq!(
            context.group("Company").and_then(|g| g.get("Name")).map(Value::resolve),
            Some("WildGums".to_string())
        );
    }

    #[test]
    fn test_solution_name_defaults_to_output_dir() {
        let context = build_context("/tmp/Acme.Tools", ContextConfig::new());
        assert_eq!(
            context.group("Solution").and_then(|g| g.get("Name")).map(Value::resolve),
            Some("Acme.Tools".to_string())
        );
    }

    #[test]
    fn test_env_value_is_resolved_lazily() {
        let value: Value = ConfigValue::env("SOLGEN_TEST_UNSET_VARIABLE").into();
        assert_eq!(value.resolve(), "");
    }
}
