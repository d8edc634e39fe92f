//! Typed MHMAT values and their per-kind text conversions
//!
//! Every key in the schema has a [`KeyKind`]. Reading a value dispatches once on
//! that kind through [`parse_value`], writing goes through [`format_value`].

use std::fmt;

use crate::{
    error::{Error, Result},
    keys::{KeyKind, PathRule},
    types::Color,
};

/// Boolean tokens read as `true`; every other non-empty token reads as `false`
pub const TRUE_TOKENS: [&str; 3] = ["true", "t", "1"];

/// A typed settings value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Free text
    String(String),
    /// Double precision number
    Float(f64),
    /// Flag
    Boolean(bool),
    /// RGB color
    Color(Color),
    /// File reference, already resolved against the material's location
    FilePath(String),
}

impl Value {
    /// Try to get this value as text (strings and file paths)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) | Value::FilePath(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get this value as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get this value as a color
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(v) | Value::FilePath(v) => f.write_str(v),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Boolean(v) => f.write_str(format_boolean(*v)),
            Value::Color(v) => write!(f, "{v}"),
        }
    }
}

/// Outcome of converting the text after a key into a typed value
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// A value was read
    Set(Value),
    /// Nothing after the key; the setting stays absent
    Unset,
    /// The text does not have the shape the kind needs
    Malformed(String),
    /// A float kind whose text is not a number
    InvalidFloat(String),
}

/// Convert the remainder of a line into a value of the given kind
///
/// `base` is the directory relative file paths are joined onto. Shader kinds
/// expect `rest` to be `SUBKEY VALUE` and convert only `VALUE`.
pub fn parse_value(kind: KeyKind, rule: PathRule, rest: &str, base: Option<&str>) -> ParsedValue {
    let rest = rest.trim();
    if rest.is_empty() {
        return ParsedValue::Unset;
    }

    match kind {
        KeyKind::String => ParsedValue::Set(Value::String(rest.to_string())),
        KeyKind::Float => match rest.parse::<f64>() {
            Ok(v) => ParsedValue::Set(Value::Float(v)),
            Err(_) => ParsedValue::InvalidFloat(rest.to_string()),
        },
        KeyKind::Boolean => ParsedValue::Set(Value::Boolean(parse_boolean(rest))),
        KeyKind::Color => match parse_color(rest) {
            Some(color) => ParsedValue::Set(Value::Color(color)),
            None => ParsedValue::Malformed(format!("expected three numbers, got {rest:?}")),
        },
        KeyKind::FilePath => ParsedValue::Set(Value::FilePath(resolve_path(rest, base, rule))),
        KeyKind::ShaderString | KeyKind::ShaderBoolean => {
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            match tokens.as_slice() {
                [_, value] if kind == KeyKind::ShaderString => {
                    ParsedValue::Set(Value::String((*value).to_string()))
                }
                [_, value] => ParsedValue::Set(Value::Boolean(parse_boolean(value))),
                _ => ParsedValue::Malformed(format!("expected a name and a value, got {rest:?}")),
            }
        }
    }
}

/// Render a value in the canonical form for its kind
///
/// Fails with [`Error::TypeMismatch`] when the value's type is not the one the
/// kind declares, and with [`Error::InvalidValue`] when text spans lines.
pub fn format_value(key: &str, kind: KeyKind, value: &Value) -> Result<String> {
    match (kind, value) {
        (KeyKind::String | KeyKind::ShaderString, Value::String(v)) => {
            check_single_line(key, v)?;
            Ok(v.clone())
        }
        (KeyKind::Float, Value::Float(v)) => Ok(format_float(*v)),
        (KeyKind::Boolean | KeyKind::ShaderBoolean, Value::Boolean(v)) => {
            Ok(format_boolean(*v).to_string())
        }
        (KeyKind::Color, Value::Color(v)) => Ok(v.to_string()),
        (KeyKind::FilePath, Value::FilePath(v)) => {
            check_single_line(key, v)?;
            Ok(v.clone())
        }
        _ => Err(Error::type_mismatch(key, kind.type_name())),
    }
}

/// Reject text that would break out of its line in a material file
pub fn check_single_line(key: &str, text: &str) -> Result<()> {
    if text.contains(['\n', '\r']) {
        return Err(Error::invalid_value(key, "line breaks cannot be written"));
    }
    Ok(())
}

/// Read a boolean token
pub fn parse_boolean(token: &str) -> bool {
    let token = token.trim().to_lowercase();
    TRUE_TOKENS.contains(&token.as_str())
}

/// Canonical spelling of a boolean
pub fn format_boolean(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Fixed four decimal rendering used for every float in a material file
pub fn format_float(value: f64) -> String {
    format!("{value:.4}")
}

/// Read exactly three whitespace separated numbers
pub fn parse_color(text: &str) -> Option<Color> {
    let mut parts = text.split_whitespace().map(str::parse::<f64>);
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Color::new(r, g, b))
}

/// Resolve a file reference against the directory of the material file
///
/// Plain paths starting with `/` are kept as written. Structured paths point
/// inside another container file and are always joined onto `base`. Without a
/// base the path is returned unchanged.
pub fn resolve_path(path: &str, base: Option<&str>, rule: PathRule) -> String {
    let Some(base) = base.filter(|b| !b.is_empty()) else {
        return path.to_string();
    };
    if rule == PathRule::Plain && is_absolute(path) {
        return path.to_string();
    }
    join_path(base, path)
}

/// Whether a path from a material file counts as absolute
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

fn join_path(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    format!("{base}/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_boolean_tokens() {
        for token in ["true", "TRUE", "t", "T", "1", " True "] {
            assert!(parse_boolean(token), "{token:?} should be true");
        }
        for token in ["false", "banana", "0", "yes"] {
            assert!(!parse_boolean(token), "{token:?} should be false");
        }
    }

    #[test]
    fn test_empty_remainder_is_unset() {
        let parsed = parse_value(KeyKind::Boolean, PathRule::Plain, "   ", None);
        assert_eq!(parsed, ParsedValue::Unset);
    }

    #[test]
    fn test_float_parse_and_format() {
        match parse_value(KeyKind::Float, PathRule::Plain, " 0.3 ", None) {
            ParsedValue::Set(Value::Float(v)) => assert_relative_eq!(v, 0.3),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(format_float(0.3), "0.3000");
        assert_eq!(format_float(1.0), "1.0000");
        assert_eq!(
            parse_value(KeyKind::Float, PathRule::Plain, "abc", None),
            ParsedValue::InvalidFloat("abc".to_string())
        );
    }

    #[test]
    fn test_color_needs_three_numbers() {
        assert_eq!(parse_color("0.1 0.2 0.3"), Some(Color::new(0.1, 0.2, 0.3)));
        assert_eq!(parse_color("0.1\t0.2   0.3"), Some(Color::new(0.1, 0.2, 0.3)));
        assert_eq!(parse_color("0.1 0.2"), None);
        assert_eq!(parse_color("0.1 0.2 0.3 0.4"), None);
        assert_eq!(parse_color("0.1 x 0.3"), None);
    }

    #[test]
    fn test_path_resolution() {
        assert_eq!(
            resolve_path("skin.png", Some("/materials"), PathRule::Plain),
            "/materials/skin.png"
        );
        assert_eq!(
            resolve_path("skin.png", Some("/materials/"), PathRule::Plain),
            "/materials/skin.png"
        );
        assert_eq!(
            resolve_path("/abs/skin.png", Some("/materials"), PathRule::Plain),
            "/abs/skin.png"
        );
        assert_eq!(
            resolve_path("lib.blend/Material/skin", Some("/materials"), PathRule::Structured),
            "/materials/lib.blend/Material/skin"
        );
        assert_eq!(
            resolve_path("/lib.blend/Material/skin", Some("/materials"), PathRule::Structured),
            "/materials/lib.blend/Material/skin"
        );
        assert_eq!(resolve_path("skin.png", None, PathRule::Plain), "skin.png");
    }

    #[test]
    fn test_shader_kinds_read_value_token() {
        assert_eq!(
            parse_value(KeyKind::ShaderBoolean, PathRule::Plain, "normal True", None),
            ParsedValue::Set(Value::Boolean(true))
        );
        assert_eq!(
            parse_value(KeyKind::ShaderString, PathRule::Plain, "litsphereTexture a.png", None),
            ParsedValue::Set(Value::String("a.png".to_string()))
        );
        assert!(matches!(
            parse_value(KeyKind::ShaderBoolean, PathRule::Plain, "normal", None),
            ParsedValue::Malformed(_)
        ));
    }

    #[test]
    fn test_format_rejects_wrong_type() {
        assert!(format_value("opacity", KeyKind::Float, &Value::from("x")).is_err());
        assert_eq!(
            format_value("shadeless", KeyKind::Boolean, &Value::Boolean(true)).unwrap(),
            "True"
        );
    }

    #[test]
    fn test_format_rejects_line_breaks() {
        let err = format_value("description", KeyKind::String, &Value::from("a\nopacity 0.1"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == "description"));
        let path = Value::FilePath("a\r.png".to_string());
        assert!(format_value("diffuseTexture", KeyKind::FilePath, &path).is_err());
        assert!(check_single_line("name", "plain text").is_ok());
    }
}
