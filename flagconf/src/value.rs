//! Text to value conversion for the supported field types

use std::fmt;
use std::time::Duration;

/// Errors produced while converting text into a field value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The text is not valid syntax for the target kind.
    #[error("invalid {kind} syntax {text:?}")]
    Syntax {
        /// Kind that parsing was attempted for
        kind: Kind,
        /// Offending text
        text: String,
    },

    /// The text is well formed but the value does not fit the target kind.
    #[error("{kind} value {text:?} out of range")]
    Range {
        /// Kind that parsing was attempted for
        kind: Kind,
        /// Offending text
        text: String,
    },

    /// A duration component used a unit that is not recognized.
    #[error("unknown unit {unit:?} in duration {text:?}")]
    UnknownUnit {
        /// Unit as written
        unit: String,
        /// Full duration text
        text: String,
    },

    /// A duration component had no unit.
    #[error("missing unit in duration {text:?}")]
    MissingUnit {
        /// Full duration text
        text: String,
    },

    /// Durations cannot be negative.
    #[error("negative duration {text:?} is not supported")]
    Negative {
        /// Full duration text
        text: String,
    },
}

/// The fixed set of field types that can be bound to a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Duration,
    F64,
    Isize,
    I64,
    Usize,
    U64,
    String,
}

impl Kind {
    /// Check that `text` converts into this kind without keeping the value.
    ///
    /// # Errors
    ///
    /// Returns the conversion error for `text`.
    pub fn validate(self, text: &str) -> Result<(), ValueError> {
        match self {
            Self::Bool => parse_bool(text).map(drop),
            Self::Duration => parse_duration(text).map(drop),
            Self::F64 => parse_f64(text).map(drop),
            Self::Isize => parse_isize(text).map(drop),
            Self::I64 => parse_i64(text).map(drop),
            Self::Usize => parse_usize(text).map(drop),
            Self::U64 => parse_u64(text).map(drop),
            Self::String => Ok(()),
        }
    }

    /// Name used in error messages and help output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Duration => "duration",
            Self::F64 => "float",
            Self::Isize => "int",
            Self::I64 => "int64",
            Self::Usize => "uint",
            Self::U64 => "uint64",
            Self::String => "string",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable reference to a configuration field, tagged by its type.
///
/// Any field whose type is outside the supported set is represented by
/// [`Target::Unsupported`] so that the binder can reject the record before
/// anything is registered.
#[derive(Debug)]
pub enum Target<'a> {
    Bool(&'a mut bool),
    Duration(&'a mut Duration),
    F64(&'a mut f64),
    Isize(&'a mut isize),
    I64(&'a mut i64),
    Usize(&'a mut usize),
    U64(&'a mut u64),
    String(&'a mut String),
    Unsupported {
        /// Rust type name of the field
        type_name: &'static str,
    },
}

impl<'a> Target<'a> {
    /// Placeholder for a field of type `T` that cannot be bound.
    ///
    /// Used by the derive macro for every field type it does not recognize.
    pub fn unsupported<T: ?Sized>() -> Self {
        Self::Unsupported {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Kind of the referenced field, `None` when the type is unsupported.
    pub const fn kind(&self) -> Option<Kind> {
        match self {
            Self::Bool(_) => Some(Kind::Bool),
            Self::Duration(_) => Some(Kind::Duration),
            Self::F64(_) => Some(Kind::F64),
            Self::Isize(_) => Some(Kind::Isize),
            Self::I64(_) => Some(Kind::I64),
            Self::Usize(_) => Some(Kind::Usize),
            Self::U64(_) => Some(Kind::U64),
            Self::String(_) => Some(Kind::String),
            Self::Unsupported { .. } => None,
        }
    }

    /// Rust type name of the referenced field.
    pub fn type_name(&self) -> &'static str {
        use std::any::type_name;

        match self {
            Self::Bool(_) => type_name::<bool>(),
            Self::Duration(_) => type_name::<Duration>(),
            Self::F64(_) => type_name::<f64>(),
            Self::Isize(_) => type_name::<isize>(),
            Self::I64(_) => type_name::<i64>(),
            Self::Usize(_) => type_name::<usize>(),
            Self::U64(_) => type_name::<u64>(),
            Self::String(_) => type_name::<String>(),
            Self::Unsupported { type_name } => *type_name,
        }
    }

    /// Convert `text` and write it through to the field.
    ///
    /// The field is left untouched when conversion fails.
    ///
    /// # Errors
    ///
    /// Returns the conversion error for `text`, or [`ValueError::Syntax`] with
    /// the string kind for an unsupported target.
    pub fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        match self {
            Self::Bool(field) => **field = parse_bool(text)?,
            Self::Duration(field) => **field = parse_duration(text)?,
            Self::F64(field) => **field = parse_f64(text)?,
            Self::Isize(field) => **field = parse_isize(text)?,
            Self::I64(field) => **field = parse_i64(text)?,
            Self::Usize(field) => **field = parse_usize(text)?,
            Self::U64(field) => **field = parse_u64(text)?,
            Self::String(field) => **field = text.to_owned(),
            Self::Unsupported { .. } => {
                return Err(ValueError::Syntax {
                    kind: Kind::String,
                    text: text.to_owned(),
                })
            }
        }
        Ok(())
    }
}

macro_rules! impl_from_target {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a mut $ty> for Target<'a> {
                fn from(field: &'a mut $ty) -> Self {
                    Self::$variant(field)
                }
            }
        )*
    };
}

impl_from_target! {
    bool => Bool,
    Duration => Duration,
    f64 => F64,
    isize => Isize,
    i64 => I64,
    usize => Usize,
    u64 => U64,
    String => String,
}

/// Parse a boolean the way command-line flag libraries traditionally do.
///
/// # Errors
///
/// Returns [`ValueError::Syntax`] for anything but the accepted spellings.
pub fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(syntax(Kind::Bool, text)),
    }
}

/// Parse a 64-bit float.
///
/// # Errors
///
/// Returns [`ValueError::Syntax`] when `text` is not a float literal.
pub fn parse_f64(text: &str) -> Result<f64, ValueError> {
    text.parse::<f64>().map_err(|_| syntax(Kind::F64, text))
}

/// Parse a signed 64-bit integer.
///
/// Accepts an optional sign, `0x`, `0o` and `0b` prefixes, a leading `0` for
/// octal and `_` between digits.
///
/// # Errors
///
/// Returns [`ValueError::Syntax`] for malformed text and [`ValueError::Range`]
/// when the value does not fit.
pub fn parse_i64(text: &str) -> Result<i64, ValueError> {
    signed(Kind::I64, text)
}

/// Parse a machine-width signed integer, see [`parse_i64`].
///
/// # Errors
///
/// Same as [`parse_i64`].
pub fn parse_isize(text: &str) -> Result<isize, ValueError> {
    let value = signed(Kind::Isize, text)?;
    isize::try_from(value).map_err(|_| range(Kind::Isize, text))
}

/// Parse an unsigned 64-bit integer, see [`parse_i64`] for the syntax.
///
/// # Errors
///
/// Returns [`ValueError::Syntax`] for malformed text, including a leading
/// minus sign, and [`ValueError::Range`] when the value does not fit.
pub fn parse_u64(text: &str) -> Result<u64, ValueError> {
    magnitude(Kind::U64, text)
}

/// Parse a machine-width unsigned integer, see [`parse_u64`].
///
/// # Errors
///
/// Same as [`parse_u64`].
pub fn parse_usize(text: &str) -> Result<usize, ValueError> {
    let value = magnitude(Kind::Usize, text)?;
    usize::try_from(value).map_err(|_| range(Kind::Usize, text))
}

fn signed(kind: Kind, text: &str) -> Result<i64, ValueError> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = magnitude(kind, digits).map_err(|e| match e {
        ValueError::Range { .. } => range(kind, text),
        _ => syntax(kind, text),
    })?;

    if negative {
        0i64.checked_sub_unsigned(value)
            .ok_or_else(|| range(kind, text))
    } else {
        i64::try_from(value).map_err(|_| range(kind, text))
    }
}

fn magnitude(kind: Kind, text: &str) -> Result<u64, ValueError> {
    let (radix, body) = split_radix(text);
    // a prefix counts as a digit, so one `_` may follow it
    let body = if radix == 10 { body } else { body.strip_prefix('_').unwrap_or(body) };
    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return Err(syntax(kind, text));
    }

    let digits: String = body.chars().filter(|&c| c != '_').collect();
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(syntax(kind, text));
    }

    u64::from_str_radix(&digits, radix).map_err(|_| range(kind, text))
}

fn split_radix(text: &str) -> (u32, &str) {
    let bytes = text.as_bytes();
    match bytes {
        [b'0', b'x' | b'X', ..] => (16, &text[2..]),
        [b'0', b'o' | b'O', ..] => (8, &text[2..]),
        [b'0', b'b' | b'B', ..] => (2, &text[2..]),
        [b'0', _, ..] => (8, &text[1..]),
        _ => (10, text),
    }
}

/// Parse a duration such as `"300ms"`, `"1.5h"` or `"2h45m"`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `"0"`
/// is accepted. The total must fit in `i64::MAX` nanoseconds.
///
/// # Errors
///
/// Returns a [`ValueError`] describing the first malformed component.
pub fn parse_duration(text: &str) -> Result<Duration, ValueError> {
    let mut rest = text;
    if let Some(stripped) = rest.strip_prefix('-') {
        if stripped.trim_start_matches(['0', '.']).chars().any(|c| c.is_ascii_digit()) {
            return Err(ValueError::Negative {
                text: text.to_owned(),
            });
        }
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(syntax(Kind::Duration, text));
    }

    let limit = u128::from(i64::MAX.unsigned_abs());
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(syntax(Kind::Duration, text));
        }

        let unit_len = after_number
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_number.len());
        let (unit, remainder) = after_number.split_at(unit_len);
        if unit.is_empty() {
            return Err(ValueError::MissingUnit {
                text: text.to_owned(),
            });
        }
        let scale = unit_nanos(unit).ok_or_else(|| ValueError::UnknownUnit {
            unit: unit.to_owned(),
            text: text.to_owned(),
        })?;

        let whole = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse::<u128>()
                .map_err(|_| range(Kind::Duration, text))?
        };
        let mut nanos = whole
            .checked_mul(scale)
            .ok_or_else(|| range(Kind::Duration, text))?;

        let mut place = scale;
        for digit in frac_part.chars().filter_map(|c| c.to_digit(10)) {
            place /= 10;
            if place == 0 {
                break;
            }
            nanos += u128::from(digit) * place;
        }

        total = total
            .checked_add(nanos)
            .filter(|t| *t <= limit)
            .ok_or_else(|| range(Kind::Duration, text))?;
        rest = remainder;
    }

    let nanos = u64::try_from(total).map_err(|_| range(Kind::Duration, text))?;
    Ok(Duration::from_nanos(nanos))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    })
}

fn syntax(kind: Kind, text: &str) -> ValueError {
    ValueError::Syntax {
        kind,
        text: text.to_owned(),
    }
}

fn range(kind: Kind, text: &str) -> ValueError {
    ValueError::Range {
        kind,
        text: text.to_owned(),
    }
}
