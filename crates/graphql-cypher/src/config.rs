//! The configuration of a [`GraphqlCypher`](crate::GraphqlCypher) instance,
//! usually read from a TOML file:
//!
//! ```toml
//! log_level = "debug"
//!
//! [features]
//! default_mutation_operations = ["CREATE", "UPDATE", "DELETE"]
//!
//! [features.filters]
//! string_comparison = true
//!
//! [authorization]
//! key = "secret"
//! algorithm = "HS256"
//! issuer = "https://auth.example.com"
//! ```

mod log_level;

use std::{collections::BTreeSet, str::FromStr};

use graphql_cypher_schema::{FilterOptions, ModelOptions, MutationOperation};
use serde::{Deserialize, Deserializer};

pub use log_level::LogLevel;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not parse the configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log_level: LogLevel,
    pub features: FeaturesConfig,
    /// Verification of the bearer tokens. Without it every request is anonymous.
    pub authorization: Option<AuthorizationConfig>,
    /// Serve a federation subgraph, even when the type definitions do not
    /// link the federation specification.
    pub subgraph: bool,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn model_options(&self) -> ModelOptions {
        let filters = self.features.filters;

        ModelOptions {
            filters: FilterOptions {
                string_regex: filters.string_regex,
                string_comparison: filters.string_comparison,
                id_regex: filters.id_regex,
                id_comparison: filters.id_comparison,
            },
            default_mutation_operations: self.features.default_mutation_operations.clone(),
            subgraph: self.subgraph,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeaturesConfig {
    pub filters: FiltersConfig,
    /// Applied to the entities without `@mutation`, unless the schema itself
    /// carries one.
    #[serde(deserialize_with = "mutation_operations")]
    pub default_mutation_operations: BTreeSet<MutationOperation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FiltersConfig {
    /// `_MATCHES` on String.
    pub string_regex: bool,
    /// `_LT`, `_LTE`, `_GT` and `_GTE` on String.
    pub string_comparison: bool,
    /// `_MATCHES` on ID.
    pub id_regex: bool,
    /// `_LT`, `_LTE`, `_GT` and `_GTE` on ID.
    pub id_comparison: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// The shared secret the tokens are signed with.
    pub key: String,
    #[serde(default)]
    pub algorithm: JwtAlgorithm,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum JwtAlgorithm {
    #[default]
    #[serde(rename = "HS256")]
    Hs256,
    #[serde(rename = "HS384")]
    Hs384,
    #[serde(rename = "HS512")]
    Hs512,
}

fn mutation_operations<'de, D>(deserializer: D) -> Result<BTreeSet<MutationOperation>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|operation| {
            MutationOperation::from_str(operation).map_err(|_| {
                serde::de::Error::custom(format!(
                    r#""{operation}" is not a mutation operation (expected one of CREATE, UPDATE, DELETE)."#
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn empty_config() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.model_options().default_mutation_operations.is_empty());
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml_str(indoc! {r#"
            log_level = "debug"
            subgraph = true

            [features]
            default_mutation_operations = ["CREATE", "DELETE"]

            [features.filters]
            string_regex = true
            id_comparison = true

            [authorization]
            key = "secret"
            algorithm = "HS512"
            audience = "movies"
        "#})
        .unwrap();

        let options = config.model_options();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(options.subgraph);
        assert!(options.filters.string_regex);
        assert!(!options.filters.string_comparison);
        assert!(options.filters.id_comparison);
        assert_eq!(
            options.default_mutation_operations,
            BTreeSet::from([MutationOperation::Create, MutationOperation::Delete])
        );

        let authorization = config.authorization.unwrap();
        assert_eq!(authorization.algorithm, JwtAlgorithm::Hs512);
        assert_eq!(authorization.issuer, None);
        assert_eq!(authorization.audience.as_deref(), Some("movies"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = Config::from_toml_str(indoc! {r#"
            [features.filters]
            number_regex = true
        "#})
        .unwrap_err();

        assert!(error.to_string().contains("unknown field `number_regex`"), "{error}");
    }

    #[test]
    fn unknown_mutation_operation() {
        let error = Config::from_toml_str(indoc! {r#"
            [features]
            default_mutation_operations = ["UPSERT"]
        "#})
        .unwrap_err();

        assert!(error.to_string().contains(r#""UPSERT" is not a mutation operation"#), "{error}");
    }

    #[test]
    fn authorization_needs_a_key() {
        let error = Config::from_toml_str(indoc! {r#"
            [authorization]
            algorithm = "HS256"
        "#})
        .unwrap_err();

        assert!(error.to_string().contains("missing field `key`"), "{error}");
    }
}
