//! Flag registry abstraction and the bundled clap-backed [`FlagSet`]
//!
//! The binder never parses arguments itself. It hands one [`Binding`] per
//! field to a [`Registry`], and the registry owns the field references from
//! then on. [`FlagSet`] is the registry shipped with the crate: it renders the
//! bindings as a [`clap::Command`] and writes parsed values back through them.

use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command};

use crate::error::FlagError;
use crate::value::{Kind, Target};

/// Arg id of the trailing operands. Derived flag names never contain brackets.
const OPERANDS: &str = "[operands]";

/// A configuration field ready to be registered as a flag.
///
/// Produced once per field by the binder and moved into the registry.
#[derive(Debug)]
pub struct Binding<'a> {
    /// Name of the command-line flag, without leading dashes
    pub flag_name: String,
    /// Environment variable the initial value was looked up in
    pub env_name: String,
    /// Validated initial value, written to the field on registration
    pub default: String,
    /// Help text for the flag
    pub usage: String,
    /// Field the flag writes to
    pub target: Target<'a>,
}

/// Something that accepts flag bindings.
///
/// Implement this to bind configuration fields to a flag facility other than
/// [`FlagSet`].
pub trait Registry<'a> {
    /// Register `binding`, taking ownership of its field reference.
    ///
    /// Implementations are expected to write the binding's default into the
    /// field.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError`] when the binding cannot be registered.
    fn register(&mut self, binding: Binding<'a>) -> Result<(), FlagError>;
}

/// A flag registered in a [`FlagSet`].
#[derive(Debug)]
pub struct Flag<'a> {
    name: String,
    env_name: String,
    usage: String,
    default: String,
    kind: Kind,
    target: Target<'a>,
}

impl Flag<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Default as text, exactly as it was resolved during setup.
    pub fn default_text(&self) -> &str {
        &self.default
    }

    pub const fn kind(&self) -> Kind {
        self.kind
    }

    fn arg(&self) -> Arg {
        let kind = self.kind;
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.usage.clone())
            .value_name(kind.as_str())
            .action(ArgAction::Set)
            .value_parser(move |text: &str| kind.validate(text).map(|()| text.to_owned()));

        arg = match kind {
            Kind::Bool => arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true"),
            _ => arg.num_args(1).allow_hyphen_values(true),
        };

        if self.default.is_empty() {
            arg
        } else {
            arg.default_value(self.default.clone())
        }
    }
}

/// A set of flags bound to configuration fields.
///
/// ```
/// use std::time::Duration;
/// use flagconf::{setup_into, FlagConf, FlagSet};
///
/// #[derive(Debug, Default, FlagConf)]
/// struct Config {
///     #[conf(default = "3s", help = "how long to wait")]
///     timeout: Duration,
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// let mut flags = FlagSet::new("app");
/// setup_into(&mut config, "app", &mut flags)?;
/// flags.parse(["--timeout", "1m"])?;
/// drop(flags);
/// assert_eq!(config.timeout, Duration::from_secs(60));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FlagSet<'a> {
    name: String,
    flags: Vec<Flag<'a>>,
    args: Vec<OsString>,
}

impl<'a> FlagSet<'a> {
    /// Create an empty set; `name` is used as the program name in help output.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered flags in registration order.
    pub fn flags(&self) -> impl Iterator<Item = &Flag<'a>> + '_ {
        self.flags.iter()
    }

    /// Arguments left after the flags by the last successful parse.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag<'a>> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Build the clap command describing every registered flag.
    ///
    /// Flag parsing stops at the first argument that is not a flag or at
    /// `--`; everything from there on is an operand.
    pub fn command(&self) -> Command {
        let mut command = Command::new(self.name.clone()).args_override_self(true);
        if self.lookup("help").is_some() {
            command = command.disable_help_flag(true);
        }
        let operands = Arg::new(OPERANDS)
            .value_name("ARG")
            .action(ArgAction::Append)
            .num_args(1..)
            .trailing_var_arg(true)
            .value_parser(clap::value_parser!(OsString));
        self.flags
            .iter()
            .fold(command, |command, flag| command.arg(flag.arg()))
            .arg(operands)
    }

    /// Render the usage text for the registered flags.
    pub fn render_help(&self) -> String {
        self.command().render_help().to_string()
    }

    /// Parse `args` and write every value given on the command line into its
    /// field.
    ///
    /// `args` must not include the program name. Flags absent from `args` keep
    /// the value set during registration. Operands are available from
    /// [`FlagSet::args`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::Parse`] for unknown flags, invalid values and help
    /// requests. No field is written in that case.
    pub fn parse<I, T>(&mut self, args: I) -> Result<(), FlagError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv = std::iter::once(OsString::from(&self.name)).chain(args.into_iter().map(Into::into));
        let matches = self.command().try_get_matches_from(argv)?;

        self.args = matches
            .get_many::<OsString>(OPERANDS)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        for flag in &mut self.flags {
            if matches.value_source(&flag.name) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(text) = matches.get_one::<String>(&flag.name) {
                tracing::trace!(flag = %flag.name, value = %text, "flag set from command line");
                flag.target
                    .assign(text)
                    .map_err(|source| FlagError::InvalidValue {
                        flag_name: flag.name.clone(),
                        value: text.clone(),
                        source,
                    })?;
            }
        }

        Ok(())
    }

    /// Parse the arguments of the running process, skipping the program name.
    ///
    /// # Errors
    ///
    /// Same as [`FlagSet::parse`].
    pub fn parse_env_args(&mut self) -> Result<(), FlagError> {
        self.parse(std::env::args_os().skip(1))
    }
}

impl<'a> Registry<'a> for FlagSet<'a> {
    fn register(&mut self, binding: Binding<'a>) -> Result<(), FlagError> {
        let Binding {
            flag_name,
            env_name,
            default,
            usage,
            mut target,
        } = binding;

        if flag_name.is_empty() {
            return Err(FlagError::EmptyName);
        }
        if self.lookup(&flag_name).is_some() {
            return Err(FlagError::Redefined { flag_name });
        }

        // assign rejects unsupported targets, so kind() is known below
        if let Err(source) = target.assign(&default) {
            return Err(FlagError::InvalidValue {
                flag_name,
                value: default,
                source,
            });
        }
        let kind = target.kind().unwrap_or(Kind::String);

        self.flags.push(Flag {
            name: flag_name,
            env_name,
            usage,
            default,
            kind,
            target,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn binding<'a>(name: &str, default: &str, target: impl Into<Target<'a>>) -> Binding<'a> {
        Binding {
            flag_name: name.to_owned(),
            env_name: format!("TEST_{}", name.to_uppercase()),
            default: default.to_owned(),
            usage: format!("usage of {name}"),
            target: target.into(),
        }
    }

    #[test]
    fn test_register_writes_default() {
        let mut port = 0u64;
        let mut verbose = false;
        let mut set = FlagSet::new("test");
        set.register(binding("port", "8080", &mut port)).unwrap();
        set.register(binding("verbose", "true", &mut verbose)).unwrap();
        assert_eq!(set.len(), 2);
        drop(set);

        assert_eq!(port, 8080);
        assert!(verbose);
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let mut a = String::new();
        let mut b = String::new();
        let mut set = FlagSet::new("test");
        set.register(binding("name", "", &mut a)).unwrap();

        let result = set.register(binding("name", "", &mut b));
        assert!(matches!(result, Err(FlagError::Redefined { flag_name }) if flag_name == "name"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut a = String::new();
        let mut set = FlagSet::new("test");
        assert!(matches!(set.register(binding("", "", &mut a)), Err(FlagError::EmptyName)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_register_rejects_invalid_default() {
        let mut n = 0i64;
        let mut set = FlagSet::new("test");
        let result = set.register(binding("n", "x", &mut n));
        assert!(matches!(result, Err(FlagError::InvalidValue { .. })));
        assert!(set.is_empty());
    }

    #[test]
    fn test_parse_overrides_only_given_flags() {
        let mut name = String::new();
        let mut retries = 0isize;
        let mut wait = Duration::ZERO;
        let mut set = FlagSet::new("test");
        set.register(binding("name", "def", &mut name)).unwrap();
        set.register(binding("retries", "3", &mut retries)).unwrap();
        set.register(binding("wait", "1s", &mut wait)).unwrap();

        set.parse(["--retries", "-2", "--wait=250ms"]).unwrap();
        drop(set);

        assert_eq!(name, "def");
        assert_eq!(retries, -2);
        assert_eq!(wait, Duration::from_millis(250));
    }

    #[test]
    fn test_parse_bool_forms() {
        let mut a = false;
        let mut b = true;
        let mut c = false;
        let mut set = FlagSet::new("test");
        set.register(binding("a", "false", &mut a)).unwrap();
        set.register(binding("b", "true", &mut b)).unwrap();
        set.register(binding("c", "false", &mut c)).unwrap();

        set.parse(["--a", "--b=false", "--c=1"]).unwrap();
        drop(set);

        assert!(a);
        assert!(!b);
        assert!(c);
    }

    #[test]
    fn test_parse_stops_at_first_operand() {
        let mut verbose = false;
        let mut level = 0u64;
        let mut set = FlagSet::new("test");
        set.register(binding("verbose", "false", &mut verbose)).unwrap();
        set.register(binding("level", "1", &mut level)).unwrap();

        set.parse(["--verbose", "input.txt", "--level", "9"]).unwrap();
        assert_eq!(set.args(), ["input.txt", "--level", "9"]);
        drop(set);

        assert!(verbose);
        assert_eq!(level, 1);
    }

    #[test]
    fn test_parse_bool_does_not_take_separate_value() {
        let mut verbose = false;
        let mut set = FlagSet::new("test");
        set.register(binding("verbose", "false", &mut verbose)).unwrap();

        set.parse(["--verbose", "false"]).unwrap();
        assert_eq!(set.args(), ["false"]);
        drop(set);

        assert!(verbose);
    }

    #[test]
    fn test_parse_operands_after_terminator() {
        let mut level = 0u64;
        let mut set = FlagSet::new("test");
        set.register(binding("level", "1", &mut level)).unwrap();

        set.parse(["--level", "3", "--", "--level", "4"]).unwrap();
        assert_eq!(set.args(), ["--level", "4"]);

        set.parse(["--level", "5"]).unwrap();
        assert!(set.args().is_empty());
        drop(set);

        assert_eq!(level, 5);
    }

    #[test]
    fn test_parse_last_occurrence_wins() {
        let mut level = 0u64;
        let mut set = FlagSet::new("test");
        set.register(binding("level", "1", &mut level)).unwrap();

        set.parse(["--level", "2", "--level", "5"]).unwrap();
        drop(set);

        assert_eq!(level, 5);
    }

    #[test]
    fn test_parse_errors_leave_fields_untouched() {
        let mut level = 0u64;
        let mut set = FlagSet::new("test");
        set.register(binding("level", "1", &mut level)).unwrap();

        assert!(matches!(
            set.parse(["--level", "many"]),
            Err(FlagError::Parse(_))
        ));
        assert!(matches!(
            set.parse(["--unknown", "1"]),
            Err(FlagError::Parse(_))
        ));
        drop(set);

        assert_eq!(level, 1);
    }

    #[test]
    fn test_help_request_is_reported() {
        let mut level = 0u64;
        let mut set = FlagSet::new("test");
        set.register(binding("level", "1", &mut level)).unwrap();

        match set.parse(["--help"]) {
            Err(FlagError::Parse(e)) => assert_eq!(e.kind(), clap::error::ErrorKind::DisplayHelp),
            other => panic!("Expected help request, got {other:?}"),
        }
    }

    #[test]
    fn test_field_named_help_replaces_help_flag() {
        let mut help = false;
        let mut set = FlagSet::new("test");
        set.register(binding("help", "false", &mut help)).unwrap();

        set.parse(["--help"]).unwrap();
        drop(set);

        assert!(help);
    }

    #[test]
    fn test_render_help_lists_flags() {
        let mut timeout = Duration::ZERO;
        let mut set = FlagSet::new("test");
        set.register(binding("timeout", "3s", &mut timeout)).unwrap();

        let help = set.render_help();
        assert!(help.contains("--timeout"));
        assert!(help.contains("usage of timeout"));
        assert!(help.contains("3s"));
    }

    #[test]
    fn test_lookup_exposes_flag_metadata() {
        let mut ratio = 0.0f64;
        let mut set = FlagSet::new("test");
        set.register(binding("ratio", "0.5", &mut ratio)).unwrap();

        let flag = set.lookup("ratio").unwrap();
        assert_eq!(flag.kind(), Kind::F64);
        assert_eq!(flag.default_text(), "0.5");
        assert_eq!(flag.env_name(), "TEST_RATIO");
        assert_eq!(flag.usage(), "usage of ratio");
        assert!(set.lookup("missing").is_none());
    }
}
