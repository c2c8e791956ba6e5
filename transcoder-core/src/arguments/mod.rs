// ============================================================================
// transcoder-core/src/arguments/mod.rs
// ============================================================================
//
// ARGUMENT ENCODING: Typed options to `transcode-video` command-line tokens
//
// KEY COMPONENTS:
// - ArgumentKey / Token: option names and rendered arguments
// - ArgumentValue: text representation of option values
// - Field / encode_fields: the pure, default-suppressing encoding step
// - OptionEncoder / Optionable: how option groups describe themselves
//
// Encoding never fails and performs no IO. Ordering is the order in which
// fields were pushed, then element order inside sequences and mappings.

mod encoder;
mod key;
mod value;

pub use encoder::{Field, FieldValue, OptionEncoder, Optionable, encode_fields};
pub use key::{ArgumentKey, Token, quote_value};
pub use value::ArgumentValue;
