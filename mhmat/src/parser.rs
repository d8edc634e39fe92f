//! Reading MHMAT text into settings
//!
//! Parsing is forgiving: lines with unknown keys or an unexpected shape are
//! reported as [`Diagnostic`]s and skipped. Only a float key with a value that
//! is not a number aborts the parse.
//!
//! ```rust
//! use mhmat::parser::MhmatReader;
//!
//! # fn main() -> mhmat::Result<()> {
//! let parsed = MhmatReader::new()
//!     .with_base_location("/materials")
//!     .parse_str("tag red\ntag female\ndiffuseTexture skin.png\n")?;
//!
//! assert_eq!(parsed.settings.get_str("tag"), Some("red, female"));
//! assert_eq!(parsed.settings.get_str("diffuseTexture"), Some("/materials/skin.png"));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use regex::Regex;

use crate::{
    error::{Error, Result},
    io::{base_location, DefaultFileSystem, FileSystem},
    keys::{mhmat_keys, KeyKind, PathRule, Registry},
    logging::{self, LogLevel, Logger},
    settings::{SettingsMap, ShaderConfig},
    value::{parse_value, ParsedValue, Value},
};

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([a-zA-Z]+)(?:\s+(.*))?$").expect("valid line pattern"))
}

fn litsphere_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^litspheres/(.+)\.png$").expect("valid litsphere pattern"))
}

/// What went wrong on a skipped line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The key is not in the registry
    UnknownKey {
        /// The key as written
        key: String,
    },
    /// The line does not have the shape its key needs
    MalformedLine {
        /// Why the line was rejected
        reason: String,
    },
}

/// A non-fatal problem found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    /// The problem
    pub kind: DiagnosticKind,
    /// The offending line, trimmed
    pub text: String,
}

impl Diagnostic {
    fn unknown_key(line: usize, key: &str, text: &str) -> Self {
        Self {
            line,
            kind: DiagnosticKind::UnknownKey {
                key: key.to_string(),
            },
            text: text.to_string(),
        }
    }

    fn malformed<R: Into<String>>(line: usize, reason: R, text: &str) -> Self {
        Self {
            line,
            kind: DiagnosticKind::MalformedLine {
                reason: reason.into(),
            },
            text: text.to_string(),
        }
    }

    /// Whether this is an unknown key diagnostic
    pub fn is_unknown_key(&self) -> bool {
        matches!(self.kind, DiagnosticKind::UnknownKey { .. })
    }

    /// Whether this is a malformed line diagnostic
    pub fn is_malformed_line(&self) -> bool {
        matches!(self.kind, DiagnosticKind::MalformedLine { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnknownKey { key } => {
                write!(f, "line {}: unknown key '{}'", self.line, key)
            }
            DiagnosticKind::MalformedLine { reason } => {
                write!(f, "line {}: malformed line ({}): {}", self.line, reason, self.text)
            }
        }
    }
}

/// One piece of information read from a line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEntry {
    /// A registry key and its value
    Setting {
        /// Canonical key name
        key: &'static str,
        /// The value
        value: Value,
    },
    /// One `tag` occurrence
    Tag(String),
    /// A `shaderConfig NAME VALUE` switch
    ShaderSwitch {
        /// Switch name
        name: String,
        /// Switch value
        enabled: bool,
    },
    /// The name from `shaderParam litsphereTexture litspheres/NAME.png`
    Litsphere(String),
}

/// Result of looking at one line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Blank, comment, tolerated or valueless line
    Skip,
    /// Something to store
    Entry(ParsedEntry),
    /// A line that was rejected
    Diagnostic(Diagnostic),
}

/// Everything read from one material file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMaterial {
    /// Values of the keys the file mentions
    pub settings: SettingsMap,
    /// `shaderConfig` switches in file order
    pub shader_config: ShaderConfig,
    /// Problems with skipped lines
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedMaterial {
    /// Lit-sphere name from the `shaderParam litsphereTexture` line
    pub fn litsphere(&self) -> Option<&str> {
        self.settings.get_str(mhmat_keys::LITSPHERE_TEXTURE)
    }

    fn apply(&mut self, entry: ParsedEntry) {
        match entry {
            ParsedEntry::Setting { key, value } => {
                self.settings.set(key, value);
            }
            ParsedEntry::Tag(tag) => {
                self.settings.append_tag(tag);
            }
            ParsedEntry::ShaderSwitch { name, enabled } => {
                self.shader_config.set(name, enabled);
            }
            ParsedEntry::Litsphere(name) => {
                self.settings.set_string(mhmat_keys::LITSPHERE_TEXTURE, name);
            }
        }
    }
}

/// Configurable MHMAT reader
pub struct MhmatReader<'r> {
    registry: &'r Registry,
    base_location: Option<String>,
    logger: Option<Arc<Mutex<Logger>>>,
}

impl MhmatReader<'static> {
    /// Create a reader using the standard registry and no base location
    pub fn new() -> Self {
        Self {
            registry: Registry::standard(),
            base_location: None,
            logger: None,
        }
    }
}

impl Default for MhmatReader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MhmatReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MhmatReader")
            .field("registry_keys", &self.registry.len())
            .field("base_location", &self.base_location)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl<'r> MhmatReader<'r> {
    /// Use a different key registry
    pub fn with_registry<'s>(self, registry: &'s Registry) -> MhmatReader<'s> {
        MhmatReader {
            registry,
            base_location: self.base_location,
            logger: self.logger,
        }
    }

    /// Set the directory relative file paths are resolved against
    pub fn with_base_location<S: Into<String>>(mut self, base: S) -> Self {
        self.base_location = Some(base.into());
        self
    }

    /// Report diagnostics to this logger instead of the global one
    pub fn with_logger(mut self, logger: Arc<Mutex<Logger>>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The configured base location
    pub fn base_location(&self) -> Option<&str> {
        self.base_location.as_deref()
    }

    /// Parse material text
    pub fn parse_str(&self, text: &str) -> Result<ParsedMaterial> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut parsed = ParsedMaterial::default();

        for (index, raw) in text.lines().enumerate() {
            match self.parse_line(index + 1, raw)? {
                LineOutcome::Skip => {}
                LineOutcome::Entry(entry) => parsed.apply(entry),
                LineOutcome::Diagnostic(diagnostic) => {
                    self.report(LogLevel::Warn, &diagnostic.to_string());
                    parsed.diagnostics.push(diagnostic);
                }
            }
        }

        Ok(parsed)
    }

    /// Parse a material file from disk
    ///
    /// Without an explicit base location, relative paths resolve against the
    /// file's directory.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<ParsedMaterial> {
        let path = path.as_ref();
        self.parse_file_with(&DefaultFileSystem, &path.to_string_lossy())
    }

    /// Parse a material file read through a custom file system
    pub fn parse_file_with(&self, fs: &dyn FileSystem, path: &str) -> Result<ParsedMaterial> {
        let text = fs.read_to_string(path)?;
        match (&self.base_location, base_location(path)) {
            (None, Some(base)) => MhmatReader {
                registry: self.registry,
                base_location: Some(base),
                logger: self.logger.clone(),
            }
            .parse_str(&text),
            _ => self.parse_str(&text),
        }
    }

    /// Interpret a single line
    ///
    /// `line` is the 1-based line number used in diagnostics and errors.
    pub fn parse_line(&self, line: usize, raw: &str) -> Result<LineOutcome> {
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') || text.starts_with('/') {
            return Ok(LineOutcome::Skip);
        }

        let Some(caps) = line_regex().captures(text) else {
            if text.starts_with("shader") {
                self.report(LogLevel::Debug, &format!("line {line}: skipped shader line: {text}"));
                return Ok(LineOutcome::Skip);
            }
            return Ok(LineOutcome::Diagnostic(Diagnostic::malformed(
                line,
                "expected a key followed by a value",
                text,
            )));
        };
        let ident = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(2).map_or("", |m| m.as_str());

        if is_shader_ident(ident) {
            return Ok(self.parse_shader_line(line, text, ident, rest));
        }

        let Some(def) = self.registry.lookup(ident) else {
            return Ok(LineOutcome::Diagnostic(Diagnostic::unknown_key(line, ident, text)));
        };

        let base = self.base_location.as_deref();
        Ok(match parse_value(def.kind, def.path_rule, rest, base) {
            ParsedValue::Set(Value::String(tag)) if def.name == mhmat_keys::TAG => {
                LineOutcome::Entry(ParsedEntry::Tag(tag))
            }
            ParsedValue::Set(value) => LineOutcome::Entry(ParsedEntry::Setting {
                key: def.name,
                value,
            }),
            ParsedValue::Unset => LineOutcome::Skip,
            ParsedValue::Malformed(reason) => {
                LineOutcome::Diagnostic(Diagnostic::malformed(line, reason, text))
            }
            ParsedValue::InvalidFloat(value) => {
                return Err(Error::malformed_float(def.name, value, line));
            }
        })
    }

    /// `shader`, `shaderParam` and `shaderConfig` lines
    ///
    /// Anything in the shader section that is not understood is skipped without
    /// a diagnostic.
    fn parse_shader_line(&self, line: usize, text: &str, ident: &str, rest: &str) -> LineOutcome {
        let tolerated = || {
            self.report(LogLevel::Debug, &format!("line {line}: skipped shader line: {text}"));
            LineOutcome::Skip
        };

        if ident.eq_ignore_ascii_case(mhmat_keys::SHADER) {
            let Some(def) = self.registry.lookup_shader(mhmat_keys::SHADER) else {
                return tolerated();
            };
            return match parse_value(def.kind, def.path_rule, rest, None) {
                ParsedValue::Set(value) => LineOutcome::Entry(ParsedEntry::Setting {
                    key: def.name,
                    value,
                }),
                _ => tolerated(),
            };
        }

        let Some(sub_key) = rest.split_whitespace().next() else {
            return tolerated();
        };
        let def = self.registry.lookup_shader(&format!("{ident} {sub_key}"));

        if ident.eq_ignore_ascii_case("shaderConfig") {
            let kind = def.map_or(KeyKind::ShaderBoolean, |d| d.kind);
            let name = def
                .and_then(|d| d.name.split_once(' '))
                .map_or(sub_key, |(_, switch)| switch);
            return match parse_value(kind, PathRule::Plain, rest, None) {
                ParsedValue::Set(Value::Boolean(enabled)) => {
                    LineOutcome::Entry(ParsedEntry::ShaderSwitch {
                        name: name.to_string(),
                        enabled,
                    })
                }
                _ => tolerated(),
            };
        }

        match def {
            Some(def) if def.kind == KeyKind::ShaderString => {
                match parse_value(def.kind, def.path_rule, rest, None) {
                    ParsedValue::Set(Value::String(texture)) => {
                        match litsphere_regex().captures(&texture).and_then(|c| c.get(1)) {
                            Some(name) => LineOutcome::Entry(ParsedEntry::Litsphere(
                                name.as_str().to_string(),
                            )),
                            None => tolerated(),
                        }
                    }
                    _ => tolerated(),
                }
            }
            _ => tolerated(),
        }
    }

    fn report(&self, level: LogLevel, message: &str) {
        match &self.logger {
            Some(logger) => logger
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .log(level, message),
            None => logging::log(level, message),
        }
    }
}

fn is_shader_ident(ident: &str) -> bool {
    ["shader", "shaderParam", "shaderConfig"]
        .iter()
        .any(|s| s.eq_ignore_ascii_case(ident))
}

/// Parse material text with the standard registry
///
/// `base_location` is the directory relative file paths resolve against.
pub fn parse(text: &str, base_location: Option<&str>) -> Result<ParsedMaterial> {
    let reader = MhmatReader::new();
    match base_location {
        Some(base) => reader.with_base_location(base).parse_str(text),
        None => reader.parse_str(text),
    }
}
