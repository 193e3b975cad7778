//! Error types for binding configuration structs to flags

use crate::value::ValueError;

/// Errors that can occur while binding a configuration struct.
///
/// Every variant is terminal: the configuration is not usable and startup
/// should stop.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// A field's type is outside the supported set.
    ///
    /// Supported types are `bool`, `Duration`, `f64`, `isize`, `i64`, `usize`,
    /// `u64` and `String`. No field is bound when this is returned.
    #[error("field '{field}' has unsupported type {type_name}")]
    UnsupportedFieldType {
        /// Identifier of the offending field
        field: String,
        /// Rust type name of the field
        type_name: &'static str,
    },

    /// A field identifier made only of separators derives an empty flag name.
    ///
    /// No field is bound when this is returned.
    #[error("field '{field}' does not derive a flag name")]
    EmptyFlagName {
        /// Identifier of the offending field
        field: String,
    },

    /// The initial value taken from the environment or the declared default
    /// could not be converted to the field's type.
    ///
    /// No field is bound when this is returned.
    #[error("Can't parse {flag_name} value {initial_value:?}: {source}")]
    InvalidFieldValue {
        /// Flag name of the offending field
        flag_name: String,
        /// Text that failed to convert
        initial_value: String,
        /// Underlying conversion failure
        source: ValueError,
    },

    /// The environment variable for a field holds non-UTF-8 data.
    #[error("Environment variable '{env_name}' is not valid unicode")]
    EnvNotUnicode {
        /// Name of the environment variable
        env_name: String,
    },

    /// The flag registry refused a binding.
    #[error(transparent)]
    Registry(#[from] FlagError),
}

/// Errors raised by a flag registry.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    /// A flag with the same name is already registered.
    #[error("flag redefined: {flag_name}")]
    Redefined {
        /// Name registered twice
        flag_name: String,
    },

    /// A binding without a flag name.
    #[error("flag name is empty")]
    EmptyName,

    /// A value for a flag does not convert to the flag's type.
    ///
    /// Raised for a binding whose default is invalid, or whose target type is
    /// unsupported.
    #[error("invalid value {value:?} for flag {flag_name}: {source}")]
    InvalidValue {
        /// Name of the flag
        flag_name: String,
        /// Rejected text
        value: String,
        /// Underlying conversion failure
        source: ValueError,
    },

    /// Command-line arguments could not be parsed.
    ///
    /// This includes explicit help requests; check
    /// [`clap::Error::kind`] to tell them apart.
    #[error(transparent)]
    Parse(#[from] clap::Error),
}

impl SetupError {
    /// Create an invalid value error (used by the binder)
    pub(crate) fn invalid_value(
        flag_name: impl Into<String>,
        initial_value: impl Into<String>,
        source: ValueError,
    ) -> Self {
        Self::InvalidFieldValue {
            flag_name: flag_name.into(),
            initial_value: initial_value.into(),
            source,
        }
    }
}
