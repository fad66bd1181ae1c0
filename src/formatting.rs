//! Output line templates.
//!
//! A template is plain text with `$name` placeholders. A backslash escapes the following
//! character, so `\$` prints a literal dollar sign.
//!
//! Placeholder   | Value
//! --------------|------------------------------------------------------------
//! `$status`     | The rendered value of the watched property
//! `$node`       | The node the notification came from (empty in agent mode)
//! `$interface`  | The interface whose properties changed
//! `$property`   | The name of the watched property

pub mod parse;
pub mod value;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{Deserialize, Deserializer};

use parse::Token;

pub const PLACEHOLDERS: &[&str] = &["status", "node", "interface", "property"];

pub type Values<'a> = HashMap<&'static str, &'a str>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown placeholder '${0}'")]
    UnknownPlaceholder(String),
    #[error("unexpected input at '{0}'")]
    Trailing(String),
    #[error("invalid template")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Text(String),
    Placeholder(&'static str),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    items: Vec<Item>,
}

impl Format {
    pub fn render(&self, values: &Values) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                Item::Text(text) => out.push_str(text),
                Item::Placeholder(name) => out.push_str(values.get(name).copied().unwrap_or("")),
            }
        }
        out
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, tokens) = parse::parse_tokens(s).map_err(|_| FormatError::Invalid)?;
        if !rest.is_empty() {
            return Err(FormatError::Trailing(rest.into()));
        }
        let items = tokens
            .into_iter()
            .map(|token| match token {
                Token::Text(text) => Ok(Item::Text(text)),
                Token::Placeholder(name) => PLACEHOLDERS
                    .iter()
                    .find(|p| **p == name)
                    .map(|p| Item::Placeholder(*p))
                    .ok_or_else(|| FormatError::UnknownPlaceholder(name.into())),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { items })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            match item {
                Item::Text(text) => {
                    for c in text.chars() {
                        if c == '$' || c == '\\' {
                            f.write_str("\\")?;
                        }
                        write!(f, "{c}")?;
                    }
                }
                Item::Placeholder(name) => write!(f, "${name}")?,
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_agent_status() {
        let format: Format = "Agent status: $status".parse().unwrap();
        let values: Values = [("status", "online")].into_iter().collect();
        assert_eq!(format.render(&values), "Agent status: online");
    }

    #[test]
    fn missing_values_render_empty() {
        let format: Format = "[$node] $status".parse().unwrap();
        let values: Values = [("status", "offline")].into_iter().collect();
        assert_eq!(format.render(&values), "[] offline");
    }

    #[test]
    fn unknown_placeholder() {
        assert_eq!(
            "Agent $state".parse::<Format>(),
            Err(FormatError::UnknownPlaceholder("state".into()))
        );
    }

    #[test]
    fn dangling_dollar() {
        assert!("price: $".parse::<Format>().is_err());
    }

    #[test]
    fn escaped_dollar_round_trips() {
        let format: Format = "\\$$status".parse().unwrap();
        let values: Values = [("status", "5")].into_iter().collect();
        assert_eq!(format.render(&values), "$5");
        assert_eq!(format.to_string(), "\\$$status");
    }
}
