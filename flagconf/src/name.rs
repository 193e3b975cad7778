//! Flag and environment variable names derived from field identifiers

/// Derive the command-line flag name for a field identifier.
///
/// A dash is inserted between two characters whenever one is a letter and the
/// other is not, and at every lower-to-upper case hump. The result is
/// lower-cased, underscores become dashes and runs of dashes collapse into one.
///
/// ```
/// use flagconf::flag_name;
///
/// assert_eq!(flag_name("FieldName15"), "field-name-15");
/// assert_eq!(flag_name("With_Underscores"), "with-underscores");
/// assert_eq!(flag_name("third_field"), "third-field");
/// ```
pub fn flag_name(ident: &str) -> String {
    let mut split = String::with_capacity(ident.len() + 4);
    let mut last: Option<char> = None;

    for c in ident.chars() {
        if let Some(prev) = last {
            let class_flip = prev.is_alphabetic() != c.is_alphabetic();
            let hump = prev.is_lowercase() && c.is_uppercase();
            if class_flip || hump {
                split.push('-');
            }
        }
        split.push(c);
        last = Some(c);
    }

    let dashed = split.to_lowercase().replace('_', "-");
    collapse(&dashed, '-')
}

/// Derive the environment variable name for `name` scoped by `base`.
///
/// `name` is expected to be already separated, typically the output of
/// [`flag_name`]: it is upper-cased, dashes become underscores, the upper-cased
/// `base` and an underscore are prepended, and runs of underscores collapse
/// into one.
///
/// ```
/// use flagconf::env_name;
///
/// assert_eq!(env_name("base", "third-field"), "BASE_THIRD_FIELD");
/// assert_eq!(env_name("extra_", "_UnderscoresHere"), "EXTRA_UNDERSCORESHERE");
/// ```
pub fn env_name(base: &str, name: &str) -> String {
    let joined = format!(
        "{}_{}",
        base.to_uppercase(),
        name.to_uppercase().replace('-', "_")
    );
    collapse(&joined, '_')
}

/// Collapse every run of `sep` into a single `sep` and drop it from both ends.
fn collapse(s: &str, sep: char) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == sep && (out.is_empty() || out.ends_with(sep)) {
            continue;
        }
        out.push(c);
    }
    if out.ends_with(sep) {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("FieldName15", "field-name-15")]
    #[case("Field", "field")]
    #[case("ComboFieldName", "combo-field-name")]
    #[case("With_Underscores", "with-underscores")]
    #[case("third_field", "third-field")]
    #[case("one", "one")]
    #[case("HTTPServer", "httpserver")]
    #[case("retry_count2", "retry-count-2")]
    #[case("a___b", "a-b")]
    #[case("_leading", "leading")]
    #[case("trailing_", "trailing")]
    fn test_flag_name(#[case] ident: &str, #[case] expected: &str) {
        assert_eq!(flag_name(ident), expected);
    }

    #[rstest]
    #[case("base", "FieldName15", "BASE_FIELDNAME15")]
    #[case("prefixHere", "underscores_in_name", "PREFIXHERE_UNDERSCORES_IN_NAME")]
    #[case("extra_", "_UnderscoresHere", "EXTRA_UNDERSCORESHERE")]
    #[case("base", "dash-es", "BASE_DASH_ES")]
    #[case("base", "third-field", "BASE_THIRD_FIELD")]
    #[case("", "one", "ONE")]
    #[case("app__", "--x--", "APP_X")]
    fn test_env_name(#[case] base: &str, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(env_name(base, name), expected);
    }

    #[test]
    fn test_flag_name_is_idempotent() {
        for ident in ["FieldName15", "ComboFieldName", "With_Underscores", "x1y2"] {
            let once = flag_name(ident);
            assert_eq!(flag_name(&once), once);
        }
    }

    #[test]
    fn test_collapse_reaches_fixed_point() {
        assert_eq!(collapse("a---b", '-'), "a-b");
        assert_eq!(collapse("a----b--c", '-'), "a-b-c");
        let once = env_name("x__", "__y__z");
        assert_eq!(collapse(&once, '_'), once);
        assert!(!once.contains("__"));
    }

    #[test]
    fn test_derived_names_keep_their_alphabets() {
        for ident in ["FieldName15", "max_connections", "Retry2Times", "_x_"] {
            let flag = flag_name(ident);
            assert!(!flag.is_empty());
            assert!(flag
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            assert!(!flag.contains("--"));

            let env = env_name("app", &flag);
            assert!(env
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
            assert!(!env.contains("__"));
        }
    }
}
