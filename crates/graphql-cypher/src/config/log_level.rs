use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// The `EnvFilter` directive of the level: our crates log at the level,
    /// everything else only warnings and errors.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "warn,graphql_cypher=info,graphql_cypher_augment=info,graphql_cypher_translate=info",
            LogLevel::Debug => "warn,graphql_cypher=debug,graphql_cypher_augment=debug,graphql_cypher_translate=debug",
            LogLevel::Trace => "warn,graphql_cypher=trace,graphql_cypher_augment=trace,graphql_cypher_translate=trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const VALUES: &[(&str, LogLevel)] = &[
            ("off", LogLevel::Off),
            ("error", LogLevel::Error),
            ("warn", LogLevel::Warn),
            ("info", LogLevel::Info),
            ("debug", LogLevel::Debug),
            ("trace", LogLevel::Trace),
        ];

        VALUES
            .iter()
            .find(|(string, _log_level)| string.eq_ignore_ascii_case(s))
            .map(|(_, log_level)| *log_level)
            .ok_or_else(|| {
                format!(
                    r#""{s}" is not a valid log level (expected one of {})."#,
                    VALUES
                        .iter()
                        .map(|(string, _log_level)| *string)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("off", LogLevel::Off)]
    #[case("ERROR", LogLevel::Error)]
    #[case("Warn", LogLevel::Warn)]
    #[case("info", LogLevel::Info)]
    #[case("dEbUg", LogLevel::Debug)]
    #[case("TRACE", LogLevel::Trace)]
    fn log_level_from_string_any_case(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(LogLevel::from_str(input), Ok(expected));
        assert!(expected.as_str().eq_ignore_ascii_case(input));
    }

    #[test]
    fn log_level_from_invalid_string() {
        assert_eq!(
            LogLevel::from_str("verbose"),
            Err(
                r#""verbose" is not a valid log level (expected one of off, error, warn, info, debug, trace)."#
                    .to_owned()
            )
        );
    }

    #[test]
    fn only_our_crates_log_below_warn() {
        assert_eq!(LogLevel::Warn.as_filter_str(), "warn");
        assert!(LogLevel::Debug.as_filter_str().starts_with("warn,graphql_cypher=debug"));
    }
}
