//! Default-suppressing encoder that turns option fields into tokens.
//!
//! The encoding itself is the pure [`encode_fields`] function over a list of
//! [`Field`]s. [`OptionEncoder`] is the typed front end option groups use to
//! collect those fields in declaration order.

use super::key::{ArgumentKey, Token};
use super::value::ArgumentValue;

/// The value side of one configuration field, already rendered to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Optional single value with an optional inherent default.
    Scalar {
        value: Option<String>,
        default: Option<String>,
    },
    /// Boolean switch with its inherent default.
    Flag { value: bool, default: bool },
    /// Repeated option, one token per element.
    Sequence(Vec<String>),
    /// Keyed entries, one `key=entryKey=entryValue` token each.
    Mapping(Vec<(String, String)>),
}

/// A configuration field: key plus value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: ArgumentKey,
    pub value: FieldValue,
}

impl Field {
    fn push_tokens(&self, tokens: &mut Vec<Token>) {
        let key = self.key;
        match &self.value {
            FieldValue::Scalar { value, default } => {
                if value == default {
                    return;
                }
                if let Some(value) = value {
                    tokens.push(Token::Assignment {
                        key,
                        value: value.clone(),
                    });
                }
            }
            FieldValue::Flag { value, default } => {
                if *value && value != default {
                    tokens.push(Token::Flag(key));
                }
            }
            FieldValue::Sequence(values) => {
                tokens.extend(values.iter().map(|value| Token::Assignment {
                    key,
                    value: value.clone(),
                }));
            }
            FieldValue::Mapping(entries) => {
                tokens.extend(entries.iter().map(|(entry_key, entry_value)| {
                    Token::Assignment {
                        key,
                        value: format!("{entry_key}={entry_value}"),
                    }
                }));
            }
        }
    }
}

/// Encodes fields into tokens, preserving field and element order.
///
/// Never fails: whether a combination of fields makes sense is up to the
/// option groups that produced them.
#[must_use]
pub fn encode_fields<'a, I>(fields: I) -> Vec<Token>
where
    I: IntoIterator<Item = &'a Field>,
{
    let mut tokens = Vec::new();
    for field in fields {
        field.push_tokens(&mut tokens);
    }
    tokens
}

/// Collects typed option values as [`Field`]s.
#[derive(Debug, Clone, Default)]
pub struct OptionEncoder {
    fields: Vec<Field>,
}

impl OptionEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, key: ArgumentKey, value: FieldValue) {
        self.fields.push(Field { key, value });
    }

    /// Encodes an optional value that has no inherent default.
    pub fn encode<T: ArgumentValue + ?Sized>(&mut self, key: ArgumentKey, value: Option<&T>) {
        self.push(
            key,
            FieldValue::Scalar {
                value: value.map(ArgumentValue::argument_string),
                default: None,
            },
        );
    }

    /// Encodes an optional value, suppressing it when it equals `default`.
    pub fn encode_with_default<T: ArgumentValue + ?Sized>(
        &mut self,
        key: ArgumentKey,
        value: Option<&T>,
        default: Option<&T>,
    ) {
        self.push(
            key,
            FieldValue::Scalar {
                value: value.map(ArgumentValue::argument_string),
                default: default.map(ArgumentValue::argument_string),
            },
        );
    }

    /// Encodes a value that is always set but has an inherent default.
    pub fn encode_value<T: ArgumentValue + ?Sized>(
        &mut self,
        key: ArgumentKey,
        value: &T,
        default: &T,
    ) {
        self.encode_with_default(key, Some(value), Some(default));
    }

    /// Encodes a boolean switch as a bare flag when it is on and differs from `default`.
    pub fn encode_flag(&mut self, key: ArgumentKey, value: bool, default: bool) {
        self.push(key, FieldValue::Flag { value, default });
    }

    /// Encodes every element as its own token under the same key.
    pub fn encode_sequence<T: ArgumentValue>(&mut self, key: ArgumentKey, values: &[T]) {
        self.push(
            key,
            FieldValue::Sequence(values.iter().map(ArgumentValue::argument_string).collect()),
        );
    }

    /// Encodes every entry as `key=entryKey=entryValue`, in iteration order.
    pub fn encode_mapping<K, V, I>(&mut self, key: ArgumentKey, entries: I)
    where
        K: ArgumentValue,
        V: ArgumentValue,
        I: IntoIterator<Item = (K, V)>,
    {
        self.push(
            key,
            FieldValue::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.argument_string(), v.argument_string()))
                    .collect(),
            ),
        );
    }

    /// Nests another option group, keeping its fields in place.
    pub fn encode_group<O: Optionable + ?Sized>(&mut self, group: &O) {
        group.encode(self);
    }

    /// The fields collected so far.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Runs the encoding over the collected fields.
    #[must_use]
    pub fn finish(self) -> Vec<Token> {
        encode_fields(&self.fields)
    }
}

/// A group of options that can describe itself to an [`OptionEncoder`].
pub trait Optionable {
    /// Pushes this group's fields in declaration order.
    fn encode(&self, options: &mut OptionEncoder);

    /// Encodes the group into tokens.
    fn tokens(&self) -> Vec<Token> {
        let mut options = OptionEncoder::new();
        self.encode(&mut options);
        options.finish()
    }

    /// Encodes the group into rendered command-line arguments.
    fn build_options(&self) -> Vec<String> {
        self.tokens().iter().map(Token::render).collect()
    }
}
