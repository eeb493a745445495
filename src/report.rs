//! Rendering of aggregated key failures.
//!
//! # Output Format
//!
//! ```text
//! Errors found while parsing environment:
//! [PORT]:
//!   This field is required.
//!   (received undefined)
//!
//! [FEATURES]:
//!   malformed structured value: key must be a string at line 1 column 2
//!   (received "{bad json")
//!
//! Description of [FEATURES]: JSON object of feature flags
//! ```
//!
//! Object-shaped values with per-member issues get a sub-section:
//!
//! ```text
//! [DATABASE]:
//!   Errors on object keys:
//!     [port]:
//!       Expected number, received string
//!   (received "{\"port\":\"x\"}")
//! ```

use std::io::{IsTerminal, Write};

use crate::error::{EnvErrors, KeyError, KeyFailure, ParseEnvError};
use crate::value::Value;

const BANNER: &str = "Errors found while parsing environment:";
const REDACTED: &str = "[REDACTED]";

/// Options for rendering the failure report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Replace received and default values of sensitive-looking keys.
    pub redact_sensitive: bool,
    /// ANSI colors for keys and values. Off unless asked for.
    pub color: ColorOption,
}

impl ReportOptions {
    /// Set whether to redact sensitive values.
    pub fn with_redaction(mut self, redact: bool) -> Self {
        self.redact_sensitive = redact;
        self
    }

    /// Set the color option.
    pub fn with_color(mut self, color: ColorOption) -> Self {
        self.color = color;
        self
    }
}

/// Color output option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorOption {
    /// Color when stderr is a terminal. Rendering to a string or an arbitrary
    /// writer stays plain.
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    #[default]
    Never,
}

/// ANSI color codes for terminal output.
struct Colors {
    key: &'static str,
    value: &'static str,
    info: &'static str,
    reset: &'static str,
}

impl Colors {
    fn enabled() -> Self {
        Self {
            key: "\x1b[1;31m",  // bold red
            value: "\x1b[33m",  // yellow
            info: "\x1b[1;36m", // bold cyan
            reset: "\x1b[0m",
        }
    }

    fn disabled() -> Self {
        Self {
            key: "",
            value: "",
            info: "",
            reset: "",
        }
    }
}

struct ReportPrinter<'a> {
    options: &'a ReportOptions,
    colors: Colors,
}

impl<'a> ReportPrinter<'a> {
    fn new(options: &'a ReportOptions, use_color: bool) -> Self {
        let colors = if use_color {
            Colors::enabled()
        } else {
            Colors::disabled()
        };
        Self { options, colors }
    }

    fn print(&self, errors: &EnvErrors, writer: &mut dyn Write) {
        writeln!(writer, "{}", BANNER).ok();
        for (i, failure) in errors.iter().enumerate() {
            if i > 0 {
                writeln!(writer).ok();
            }
            self.print_failure(failure, writer);
        }
    }

    fn print_failure(&self, failure: &KeyFailure, writer: &mut dyn Write) {
        let c = &self.colors;
        writeln!(writer, "{}[{}]{}:", c.key, failure.key, c.reset).ok();

        match &failure.error {
            KeyError::Validation(errors) => {
                let flat = errors.flatten();
                for message in &flat.form_errors {
                    writeln!(writer, "  {}", message).ok();
                }
                if !flat.field_errors.is_empty() {
                    writeln!(writer, "  Errors on object keys:").ok();
                    for (field, messages) in &flat.field_errors {
                        writeln!(writer, "    [{}]:", field).ok();
                        for message in messages {
                            writeln!(writer, "      {}", message).ok();
                        }
                    }
                }
            }
            KeyError::Coercion(error) => {
                for line in error.to_string().lines() {
                    writeln!(writer, "  {}", line).ok();
                }
            }
        }

        let received = match &failure.raw_value {
            Some(raw) => self.maybe_redact(&failure.key, || json_string(raw)),
            None => "undefined".to_string(),
        };
        writeln!(writer, "  (received {}{}{})", c.value, received, c.reset).ok();

        if failure.used_default {
            let default = failure.default_value.as_ref().unwrap_or(&Value::Undefined);
            let shown = self.maybe_redact(&failure.key, || default.to_string());
            writeln!(writer, "  (used default of {}{}{})", c.value, shown, c.reset).ok();
        }

        if let Some(description) = &failure.description {
            writeln!(writer).ok();
            writeln!(
                writer,
                "{}Description of [{}]:{} {}",
                c.info, failure.key, c.reset, description
            )
            .ok();
        }
    }

    fn maybe_redact(&self, key: &str, render: impl FnOnce() -> String) -> String {
        if self.options.redact_sensitive && is_sensitive_key(key) {
            REDACTED.to_string()
        } else {
            render()
        }
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Check if a key name appears to hold sensitive data.
fn is_sensitive_key(key: &str) -> bool {
    let sensitive_patterns = ["password", "secret", "key", "token", "credential"];
    let lower = key.to_lowercase();
    sensitive_patterns.iter().any(|p| lower.contains(p))
}

/// Render the report for `errors`.
///
/// Failures appear in the order they were collected, which is declaration
/// order for a parse run.
pub fn render_report(errors: &EnvErrors, options: &ReportOptions) -> String {
    let printer = ReportPrinter::new(options, options.color == ColorOption::Always);
    let mut buf = Vec::new();
    printer.print(errors, &mut buf);
    String::from_utf8(buf).unwrap_or_default()
}

/// Write the report for `errors` to `writer`.
pub fn write_report(errors: &EnvErrors, options: &ReportOptions, writer: &mut dyn Write) {
    ReportPrinter::new(options, options.color == ColorOption::Always).print(errors, writer);
}

/// Write the report for `errors` to stderr, coloring it when `options.color`
/// allows and stderr is a terminal.
pub fn eprint_report(errors: &EnvErrors, options: &ReportOptions) {
    let use_color = match options.color {
        ColorOption::Always => true,
        ColorOption::Never => false,
        ColorOption::Auto => std::io::stderr().is_terminal(),
    };
    ReportPrinter::new(options, use_color).print(errors, &mut std::io::stderr());
}

/// Fatal handling for parse results at process start.
pub trait ParseResultExt<T> {
    /// Unwrap or print the error to stderr and exit with code 1.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use preflight::prelude::*;
    ///
    /// let schema = EnvSchema::new().key("PORT", schema::number().int());
    /// let env = EnvParser::new(&schema).parse_from_process().unwrap_or_exit();
    /// ```
    fn unwrap_or_exit(self) -> T;

    /// Convert to Result, printing the error to stderr but not exiting.
    fn unwrap_or_print(self) -> Result<T, ParseEnvError>;
}

impl<T> ParseResultExt<T> for Result<T, ParseEnvError> {
    fn unwrap_or_exit(self) -> T {
        match self.unwrap_or_print() {
            Ok(value) => value,
            Err(_) => std::process::exit(1),
        }
    }

    fn unwrap_or_print(self) -> Result<T, ParseEnvError> {
        if let Err(error) = &self {
            match error {
                ParseEnvError::Invalid(errors) => errors.eprint(),
                ParseEnvError::UnsupportedType(e) => eprintln!("{}", e),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoercionError, Issue, IssueCode, PathSegment, ValidationErrors};
    use crate::validate::REQUIRED_MESSAGE;

    fn required(key: &str) -> KeyFailure {
        KeyFailure {
            key: key.to_string(),
            raw_value: None,
            used_default: false,
            default_value: None,
            description: None,
            error: KeyError::Validation(ValidationErrors::single(Issue {
                path: vec![],
                code: IssueCode::InvalidType {
                    expected: "number".to_string(),
                    received: "undefined",
                },
                message: REQUIRED_MESSAGE.to_string(),
            })),
        }
    }

    fn malformed(key: &str, raw: &str) -> KeyFailure {
        KeyFailure {
            key: key.to_string(),
            raw_value: Some(raw.to_string()),
            used_default: false,
            default_value: None,
            description: None,
            error: KeyError::Coercion(CoercionError::MalformedStructuredValue {
                message: "expected value at line 1 column 1".to_string(),
            }),
        }
    }

    fn render(failures: Vec<KeyFailure>) -> String {
        let errors = EnvErrors::from_vec(failures).unwrap();
        render_report(&errors, &ReportOptions::default())
    }

    #[test]
    fn test_single_required_block() {
        assert_eq!(
            render(vec![required("PORT")]),
            "Errors found while parsing environment:\n\
             [PORT]:\n  \
             This field is required.\n  \
             (received undefined)\n"
        );
    }

    #[test]
    fn test_blocks_joined_by_blank_line() {
        let report = render(vec![required("PORT"), malformed("FEATURES", "{bad json")]);
        assert_eq!(
            report,
            "Errors found while parsing environment:\n\
             [PORT]:\n  \
             This field is required.\n  \
             (received undefined)\n\
             \n\
             [FEATURES]:\n  \
             malformed structured value: expected value at line 1 column 1\n  \
             (received \"{bad json\")\n"
        );
    }

    #[test]
    fn test_used_default_and_description() {
        let mut failure = malformed("FEATURES", "x");
        failure.raw_value = None;
        failure.used_default = true;
        failure.default_value = Some(Value::from("{oops"));
        failure.description = Some("feature flags".to_string());

        let report = render(vec![failure]);
        assert!(report.contains("  (received undefined)\n"));
        assert!(report.contains("  (used default of \"{oops\")\n"));
        assert!(report.ends_with("\n\nDescription of [FEATURES]: feature flags\n"));
    }

    #[test]
    fn test_undefined_default_renders_undefined() {
        let mut failure = required("STAGE");
        failure.used_default = true;
        failure.default_value = Some(Value::Undefined);
        assert!(render(vec![failure]).contains("  (used default of undefined)\n"));
    }

    #[test]
    fn test_field_errors_section() {
        let failure = KeyFailure {
            key: "DATABASE".to_string(),
            raw_value: Some(r#"{"port":"x"}"#.to_string()),
            used_default: false,
            default_value: None,
            description: None,
            error: KeyError::Validation(ValidationErrors::single(Issue {
                path: vec![PathSegment::Key("port".to_string())],
                code: IssueCode::InvalidType {
                    expected: "number".to_string(),
                    received: "string",
                },
                message: "Expected number, received string".to_string(),
            })),
        };

        let report = render(vec![failure]);
        assert!(report.contains(
            "[DATABASE]:\n  \
             Errors on object keys:\n    \
             [port]:\n      \
             Expected number, received string\n  \
             (received \"{\\\"port\\\":\\\"x\\\"}\")\n"
        ));
    }

    #[test]
    fn test_multiline_coercion_message_is_indented() {
        let mut failure = malformed("A", "x");
        failure.error = KeyError::Coercion(CoercionError::MalformedStructuredValue {
            message: "first\nsecond".to_string(),
        });
        let report = render(vec![failure]);
        assert!(report.contains("  malformed structured value: first\n  second\n"));
    }

    #[test]
    fn test_redaction_of_sensitive_values() {
        let mut failure = malformed("API_TOKEN", "hunter2");
        failure.used_default = true;
        failure.default_value = Some(Value::from("fallback-secret"));
        let errors = EnvErrors::single(failure);

        let redacted = render_report(&errors, &ReportOptions::default().with_redaction(true));
        assert!(redacted.contains("(received [REDACTED])"));
        assert!(redacted.contains("(used default of [REDACTED])"));
        assert!(!redacted.contains("hunter2"));
        assert!(!redacted.contains("fallback-secret"));

        let plain = render_report(&errors, &ReportOptions::default());
        assert!(plain.contains("(received \"hunter2\")"));
    }

    #[test]
    fn test_redaction_leaves_other_keys() {
        let errors = EnvErrors::single(malformed("FEATURES", "{bad"));
        let report = render_report(&errors, &ReportOptions::default().with_redaction(true));
        assert!(report.contains("(received \"{bad\")"));
    }

    #[test]
    fn test_is_sensitive_key() {
        assert!(is_sensitive_key("DB_PASSWORD"));
        assert!(is_sensitive_key("JWT_SECRET"));
        assert!(is_sensitive_key("API_KEY"));
        assert!(is_sensitive_key("GITHUB_TOKEN"));
        assert!(is_sensitive_key("AWS_CREDENTIALS"));
        assert!(!is_sensitive_key("PORT"));
        assert!(!is_sensitive_key("DATABASE_HOST"));
    }

    #[test]
    fn test_unwrap_or_print_passes_through() {
        let ok: Result<u8, ParseEnvError> = Ok(3);
        assert_eq!(ok.unwrap_or_print().unwrap(), 3);

        let err: Result<u8, ParseEnvError> =
            Err(ParseEnvError::Invalid(EnvErrors::single(required("PORT"))));
        let back = err.unwrap_or_print().unwrap_err();
        assert_eq!(back.failures().map(EnvErrors::len), Some(1));
    }

    #[test]
    fn test_color_off_by_default() {
        let errors = EnvErrors::single(required("PORT"));
        assert_eq!(ReportOptions::default().color, ColorOption::Never);
        assert!(!render_report(&errors, &ReportOptions::default()).contains('\x1b'));

        let auto = ReportOptions::default().with_color(ColorOption::Auto);
        assert!(!render_report(&errors, &auto).contains('\x1b'));
    }

    #[test]
    fn test_color_always_wraps_key_and_values() {
        let mut failure = malformed("FEATURES", "{bad");
        failure.used_default = true;
        failure.default_value = Some(Value::from("{oops"));
        failure.description = Some("feature flags".to_string());
        let errors = EnvErrors::single(failure);

        let options = ReportOptions::default().with_color(ColorOption::Always);
        let report = render_report(&errors, &options);
        assert!(report.contains("\x1b[1;31m[FEATURES]\x1b[0m:\n"));
        assert!(report.contains("  (received \x1b[33m\"{bad\"\x1b[0m)\n"));
        assert!(report.contains("  (used default of \x1b[33m\"{oops\"\x1b[0m)\n"));
        assert!(report.contains("\x1b[1;36mDescription of [FEATURES]:\x1b[0m feature flags\n"));
        assert!(report.starts_with(BANNER));
    }

    #[test]
    fn test_write_report_matches_render() {
        let errors = EnvErrors::single(required("PORT"));
        let mut buf = Vec::new();
        write_report(&errors, &ReportOptions::default(), &mut buf);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            render_report(&errors, &ReportOptions::default())
        );
    }
}
