//! Pass-through options for the underlying encoder and HandBrake.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arguments::{ArgumentKey, ArgumentValue, OptionEncoder, Optionable};

const ENCODER_OPTION: ArgumentKey = ArgumentKey::new("encoder-option");
const HANDBRAKE_OPTION: ArgumentKey = ArgumentKey::new("handbrake-option");

/// A `name=value` pair, or a bare `name` when there is no value.
///
/// Prefixing the name with `_` asks the tool to disable that option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl KeyValueOption {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    #[must_use]
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Removes an option the tool would otherwise set.
    #[must_use]
    pub fn disable(name: &str) -> Self {
        Self::flag(format!("_{name}"))
    }
}

impl fmt::Display for KeyValueOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for KeyValueOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some(("", _)) => Err(format!("missing option name in '{s}'")),
            Some((name, value)) => Ok(Self::new(name, value)),
            None if s.is_empty() => Err("empty option".to_string()),
            None => Ok(Self::flag(s)),
        }
    }
}

impl ArgumentValue for KeyValueOption {
    fn argument_string(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedOptions {
    pub encoder_options: Vec<KeyValueOption>,
    pub handbrake_options: Vec<KeyValueOption>,
}

impl Optionable for AdvancedOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode_sequence(ENCODER_OPTION, &self.encoder_options);
        options.encode_sequence(HANDBRAKE_OPTION, &self.handbrake_options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value_option() {
        assert_eq!(
            "stop-at=duration:30".parse(),
            Ok(KeyValueOption::new("stop-at", "duration:30"))
        );
        assert_eq!("_deblock".parse(), Ok(KeyValueOption::disable("deblock")));
        assert!("=1".parse::<KeyValueOption>().is_err());
    }

    #[test]
    fn test_pass_through_options() {
        let advanced = AdvancedOptions {
            encoder_options: vec![
                KeyValueOption::new("vbv-bufsize", "1500"),
                KeyValueOption::disable("rc-lookahead"),
            ],
            handbrake_options: vec![KeyValueOption::new("start-at", "duration:10")],
        };
        assert_eq!(
            advanced.build_options(),
            vec![
                "--encoder-option=vbv-bufsize=1500",
                "--encoder-option=_rc-lookahead",
                "--handbrake-option=start-at=duration:10",
            ]
        );
    }
}
