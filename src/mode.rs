use crate::Result;

/// How options are spelled on the command line.
///
/// The default, `--` with `=`, is getopt mode: long options are written as
/// `--name=value` and single letter options as `-n value`, possibly bundled
/// as `-vn value`. Any other prefix turns every option into a "long" one,
/// `-name=value` for prefix `-`, for example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    option_prefix: String,
    delimiter: String,
    short_addressing: bool,
}

impl Default for Mode {
    fn default() -> Mode {
        Mode { option_prefix: "--".to_string(), delimiter: "=".to_string(), short_addressing: true }
    }
}

impl Mode {
    pub fn new(option_prefix: impl Into<String>, delimiter: impl Into<String>) -> Result<Mode> {
        let option_prefix = option_prefix.into();
        let delimiter = delimiter.into();
        if option_prefix.is_empty() {
            bail!(Config, "option prefix cannot be empty")
        }
        if delimiter.is_empty() {
            bail!(Config, "option delimiter cannot be empty")
        }
        let short_addressing = option_prefix == "--";
        Ok(Mode { option_prefix, delimiter, short_addressing })
    }

    pub fn option_prefix(&self) -> &str {
        &self.option_prefix
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn short_addressing(&self) -> bool {
        self.short_addressing
    }

    /// Whether `name` lives in the single letter namespace.
    pub(crate) fn is_short_name(&self, name: &str) -> bool {
        self.short_addressing && is_single_char(name)
    }

    /// Prefix used to display `name` in help output.
    pub fn prefix_for(&self, name: &str) -> &str {
        if self.is_short_name(name) {
            "-"
        } else {
            &self.option_prefix
        }
    }

    /// Separator between `name` and its value in help output.
    pub fn delimiter_for(&self, name: &str) -> &str {
        if self.is_short_name(name) {
            " "
        } else {
            &self.delimiter
        }
    }

    /// Splits `token` into name and value around the first delimiter that
    /// has something on both sides of it.
    pub fn separate<'a>(&self, token: &'a str) -> Option<(&'a str, &'a str)> {
        let first = token.chars().next()?.len_utf8();
        let at = token[first..].find(&self.delimiter)? + first;
        let value = &token[at + self.delimiter.len()..];
        if value.is_empty() {
            return None;
        }
        Some((&token[..at], value))
    }
}

pub(crate) fn is_single_char(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some() && chars.next().is_none()
}
