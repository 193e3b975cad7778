//! Bind configuration structs to command-line flags and environment variables
//!
//! `flagconf` walks the fields of a configuration struct, derives a flag name
//! and an environment variable name for each of them, and registers every field
//! as a flag whose default comes from the environment or from a declared
//! default. Parsing the command line afterwards writes straight into the
//! struct.
//!
//! # Features
//!
//! - **Derived names**: `max_connections` becomes `--max-connections` and
//!   `MYAPP_MAX_CONNECTIONS`
//! - **Declarative**: Automatic implementation with `#[derive(FlagConf)]`
//! - **Layered values**: command line, then environment, then declared default
//! - **Operands**: flag parsing stops at the first non-flag argument, the rest
//!   is available from [`FlagSet::args`]
//! - **Injected registry**: bind into the bundled clap-backed [`FlagSet`] or
//!   any other [`Registry`]
//!
//! # Supported Types
//!
//! `bool`, [`std::time::Duration`] (`"3s"`, `"1h30m"`), `f64`, `isize`, `i64`,
//! `usize`, `u64` and `String`. Any other field type makes setup fail with
//! [`SetupError::UnsupportedFieldType`].
//!
//! # Example
//!
//! ```rust
//! use flagconf::{setup_into, FlagConf, FlagSet};
//!
//! #[derive(Debug, Default, FlagConf)]
//! struct Config {
//!     #[conf(help = "address to listen on")]
//!     pub listen_addr: String,
//!
//!     #[conf(default = true)]
//!     pub enable_tls: bool,
//!
//!     #[conf(default = "4")]
//!     pub worker_count: isize,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! #     std::env::set_var("MYAPP_WORKER_COUNT", "11");
//! let mut config = Config::default();
//! let mut flags = FlagSet::new("myapp");
//! setup_into(&mut config, "myapp", &mut flags)?;
//! flags.parse(["--listen-addr", "0.0.0.0:8080"])?;
//! drop(flags);
//!
//! assert_eq!(config.listen_addr, "0.0.0.0:8080");
//! assert!(config.enable_tls);
//! assert_eq!(config.worker_count, 11);
//! #     std::env::remove_var("MYAPP_WORKER_COUNT");
//! #     Ok(())
//! # }
//! ```
//!
//! # Attributes
//!
//! ## `#[conf(default = "value")]`
//!
//! Textual default used when the environment variable is unset or empty.
//! Integer, float and bool literals are accepted and used as text. Without a
//! default the initial text is empty, which only converts for `String` fields.
//!
//! ## `#[conf(env = "NAME")]`
//!
//! Read the initial value from `NAME` instead of the derived
//! `{BASE}_{FLAG_NAME}` variable. When `NAME` is unset or empty, `{BASE}_NAME`
//! is read instead.
//!
//! ## `#[conf(help = "text")]`
//!
//! Help text shown for the flag.
//!
//! ## `#[conf(flag = "name")]`
//!
//! Reserved. The tag is accepted but the derived flag name is always used.

mod bind;
mod error;
mod flagset;
mod name;
pub mod value;

pub use bind::{setup, setup_into, Field, Record, Tags};
pub use error::{FlagError, SetupError};
pub use flagconf_derive::FlagConf;
pub use flagset::{Binding, Flag, FlagSet, Registry};
pub use name::{env_name, flag_name};
pub use value::{Kind, Target, ValueError};
