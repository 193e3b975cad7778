//! Binding configuration struct fields to flags
//!
//! Each field goes through the same resolution:
//!
//! 1. The flag name is derived from the field identifier (see [`flag_name`]).
//! 2. With an `env` tag, the variable it names is read as written. When that
//!    one is unset or empty, the tag scoped by the base prefix is read instead
//!    (see [`env_name`]). Without a tag the variable is the base prefix joined
//!    with the flag name.
//! 3. The initial value is the environment variable when it is set and not
//!    empty, otherwise the `default` tag, otherwise the empty string.
//! 4. The initial value must convert to the field type.
//!
//! Every field is resolved before the first one is registered, so a record
//! that fails resolution leaves the registry untouched.

use std::env;
use std::path::Path;

use crate::error::SetupError;
use crate::flagset::{Binding, FlagSet, Registry};
use crate::name::{env_name, flag_name};
use crate::value::Target;

/// Per-field options, usually written as `#[conf(...)]` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    /// Textual default used when the environment variable is unset or empty
    pub default: Option<String>,
    /// Environment variable name to use instead of the flag name. Read as
    /// written first, then scoped by the base prefix.
    pub env: Option<String>,
    /// Reserved. Accepted and reported, but the derived flag name is always
    /// used.
    pub flag: Option<String>,
    /// Help text passed verbatim to the registry
    pub help: Option<String>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// One field of a configuration record.
#[derive(Debug)]
pub struct Field<'a> {
    /// Identifier as declared, used to derive the flag name
    pub ident: String,
    pub tags: Tags,
    pub target: Target<'a>,
}

impl<'a> Field<'a> {
    pub fn new(ident: impl Into<String>, target: impl Into<Target<'a>>) -> Self {
        Self {
            ident: ident.into(),
            tags: Tags::default(),
            target: target.into(),
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

/// A configuration record whose fields can be bound to flags.
///
/// Usually implemented with `#[derive(FlagConf)]`. A manual implementation
/// lists every field in declaration order:
///
/// ```
/// use flagconf::{Field, Record, Tags};
///
/// struct Config {
///     port: u64,
/// }
///
/// impl Record for Config {
///     fn fields(&mut self) -> Vec<Field<'_>> {
///         vec![Field::new("port", &mut self.port).with_tags(Tags::new().with_default("8080"))]
///     }
/// }
/// ```
pub trait Record {
    /// Mutable views of every field, in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;

    /// Bind this record to a new [`FlagSet`], see [`setup`].
    ///
    /// # Errors
    ///
    /// Same as [`setup_into`].
    fn bind(&mut self, base: &str) -> Result<FlagSet<'_>, SetupError>
    where
        Self: Sized,
    {
        setup(self, base)
    }
}

/// Bind `record` to a new [`FlagSet`] named after the running program.
///
/// # Errors
///
/// Same as [`setup_into`].
pub fn setup<'a, R>(record: &'a mut R, base: &str) -> Result<FlagSet<'a>, SetupError>
where
    R: Record + ?Sized,
{
    let mut set = FlagSet::new(program_name());
    setup_into(record, base, &mut set)?;
    Ok(set)
}

/// Register every field of `record` with `registry`.
///
/// Environment variable names are scoped by `base`. This only establishes
/// initial values and wiring; parsing the command line is left to the
/// registry, e.g. [`FlagSet::parse`].
///
/// # Errors
///
/// - [`SetupError::UnsupportedFieldType`] when a field type cannot be bound
/// - [`SetupError::EmptyFlagName`] when a field identifier derives no flag name
/// - [`SetupError::InvalidFieldValue`] when an initial value does not convert
/// - [`SetupError::EnvNotUnicode`] when an environment variable is not UTF-8
/// - [`SetupError::Registry`] when the registry refuses a binding
///
/// All but the last are detected before anything is registered.
pub fn setup_into<'a, R, G>(record: &'a mut R, base: &str, registry: &mut G) -> Result<(), SetupError>
where
    R: Record + ?Sized,
    G: Registry<'a> + ?Sized,
{
    let bindings = record
        .fields()
        .into_iter()
        .map(|field| resolve(field, base, lookup_env))
        .collect::<Result<Vec<_>, _>>()?;

    for binding in bindings {
        registry.register(binding)?;
    }
    Ok(())
}

fn resolve<'a, F>(field: Field<'a>, base: &str, lookup: F) -> Result<Binding<'a>, SetupError>
where
    F: Fn(&str) -> Result<Option<String>, SetupError>,
{
    let Field { ident, tags, target } = field;

    let Some(kind) = target.kind() else {
        return Err(SetupError::UnsupportedFieldType {
            field: ident,
            type_name: target.type_name(),
        });
    };

    let flag_name = flag_name(&ident);
    if flag_name.is_empty() {
        return Err(SetupError::EmptyFlagName { field: ident });
    }
    if let Some(flag) = tags.flag.as_deref().filter(|f| !f.is_empty()) {
        tracing::debug!(
            field = %ident,
            flag,
            derived = %flag_name,
            "flag tag is reserved, registering the derived name"
        );
    }

    let read = |name: &str| lookup(name).map(|value| value.filter(|v| !v.is_empty()));
    let (env_name, found) = match tags.env.as_deref().filter(|e| !e.is_empty()) {
        Some(tag) => match read(tag)? {
            Some(value) => (tag.to_owned(), Some(value)),
            None => {
                let scoped = env_name(base, tag);
                let value = read(&scoped)?;
                (scoped, value)
            }
        },
        None => {
            let derived = env_name(base, &flag_name);
            let value = read(&derived)?;
            (derived, value)
        }
    };

    let (default, source) = match found {
        Some(value) => (value, "environment"),
        None => match tags.default {
            Some(default) => (default, "default"),
            None => (String::new(), "zero"),
        },
    };

    kind.validate(&default)
        .map_err(|e| SetupError::invalid_value(&flag_name, &default, e))?;

    tracing::debug!(flag = %flag_name, env = %env_name, %kind, source, "resolved field");

    Ok(Binding {
        flag_name,
        env_name,
        default,
        usage: tags.help.unwrap_or_default(),
        target,
    })
}

fn lookup_env(name: &str) -> Result<Option<String>, SetupError> {
    match env::var(name) {
        Ok(value) => {
            tracing::trace!(env = name, "environment variable found");
            Ok(Some(value))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(SetupError::EnvNotUnicode {
            env_name: name.to_owned(),
        }),
    }
}

fn program_name() -> String {
    env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default()
}
