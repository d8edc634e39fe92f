//! Writing settings as MHMAT text

use crate::{
    error::{Error, Result},
    keys::{mhmat_keys, KeyDefinition, Registry},
    settings::{split_tags, SettingsMap, ShaderConfig},
    value::{check_single_line, format_boolean, format_value, Value},
};

/// First line of every written file
pub const BANNER: &str = "# This is a material file for MakeHuman, produced by MakeSkin";

/// Shader program written when a lit-sphere is set
pub const LITSPHERE_SHADER: &str = "shaders/glsl/litsphere";

const SHADER_HEADER: &str = "// Shader properties";

const UNSET_HEADER: &str =
    "// The following settings would also have been valid, but do currently not have a value";

/// Serialize with the standard registry
///
/// Output is deterministic: groups and keys follow registry order, shader
/// switches follow `shader_config` order.
pub fn serialize(
    settings: &SettingsMap,
    shader_config: &ShaderConfig,
    litsphere: Option<&str>,
) -> Result<String> {
    serialize_with(Registry::standard(), settings, shader_config, litsphere)
}

/// Serialize against a specific registry
///
/// Blank text values count as unset. Text containing a line break fails with
/// [`Error::InvalidValue`].
pub fn serialize_with(
    registry: &Registry,
    settings: &SettingsMap,
    shader_config: &ShaderConfig,
    litsphere: Option<&str>,
) -> Result<String> {
    let mut out = String::with_capacity(2048);
    push_line(&mut out, &[BANNER]);

    for &group in registry.group_order() {
        out.push('\n');
        push_line(&mut out, &["//", group.label()]);
        for def in registry.group_definitions(group) {
            if let Some(value) = written_value(settings, def) {
                write_entry(&mut out, def, value)?;
            }
        }
    }

    out.push('\n');
    push_line(&mut out, &[SHADER_HEADER]);
    match litsphere.filter(|name| !name.trim().is_empty()) {
        Some(name) => {
            check_single_line(mhmat_keys::LITSPHERE_TEXTURE, name)?;
            let texture = format!("litspheres/{name}.png");
            push_line(&mut out, &[mhmat_keys::SHADER, LITSPHERE_SHADER]);
            push_line(
                &mut out,
                &["shaderParam", mhmat_keys::LITSPHERE_TEXTURE, texture.as_str()],
            );
        }
        None => {
            if let Some(shader) = settings
                .get_str(mhmat_keys::SHADER)
                .filter(|shader| !shader.trim().is_empty())
            {
                check_single_line(mhmat_keys::SHADER, shader)?;
                push_line(&mut out, &[mhmat_keys::SHADER, shader]);
            }
        }
    }
    for (name, enabled) in shader_config.entries() {
        check_single_line("shaderConfig", name)?;
        push_line(&mut out, &["shaderConfig", name.as_str(), format_boolean(*enabled)]);
    }

    out.push('\n');
    push_line(&mut out, &[UNSET_HEADER]);
    push_line(&mut out, &["//"]);
    for def in registry.definitions() {
        if written_value(settings, def).is_none() {
            push_line(&mut out, &["//", def.name]);
        }
    }

    Ok(out)
}

/// The value to write for a key, or `None` when it is missing or blank
fn written_value<'a>(settings: &'a SettingsMap, def: &KeyDefinition) -> Option<&'a Value> {
    let value = settings.get(def.name)?;
    let blank = match value {
        Value::String(text) if def.name == mhmat_keys::TAG => split_tags(text).is_empty(),
        Value::String(text) | Value::FilePath(text) => text.trim().is_empty(),
        _ => false,
    };
    (!blank).then_some(value)
}

fn write_entry(out: &mut String, def: &KeyDefinition, value: &Value) -> Result<()> {
    if def.name == mhmat_keys::TAG {
        let Value::String(tags) = value else {
            return Err(Error::type_mismatch(def.name, def.kind.type_name()));
        };
        for tag in split_tags(tags) {
            check_single_line(def.name, tag)?;
            push_line(out, &[def.name, tag]);
        }
        return Ok(());
    }

    let formatted = format_value(def.name, def.kind, value)?;
    push_line(out, &[def.name, formatted.as_str()]);
    Ok(())
}

fn push_line(out: &mut String, parts: &[&str]) {
    out.push_str(&parts.join(" "));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    #[test]
    fn test_minimal_layout() {
        let mut settings = SettingsMap::new();
        settings.set_string("name", "skin").set_float("opacity", 0.5);

        let text = serialize(&settings, &ShaderConfig::new(), None).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], BANNER);
        assert_eq!(&lines[1..4], &["", "// Metadata", "name skin"]);
        assert!(lines.contains(&"opacity 0.5000"));
        assert!(lines.contains(&"// SSS"));
        assert!(lines.contains(&SHADER_HEADER));
        assert!(lines.contains(&"// diffuseColor"));
        assert!(!lines.contains(&"// name"));
        assert!(!lines.iter().any(|line| line.starts_with("shader ")));
    }

    #[test]
    fn test_group_order() {
        let mut settings = SettingsMap::new();
        settings
            .set_bool("shadeless", true)
            .set_color("diffuseColor", Color::WHITE)
            .set_string("name", "a");

        let text = serialize(&settings, &ShaderConfig::new(), None).unwrap();
        let name = text.find("name a").unwrap();
        let color = text.find("diffuseColor 1.0000 1.0000 1.0000").unwrap();
        let shadeless = text.find("shadeless True").unwrap();
        assert!(name < color && color < shadeless);
    }

    #[test]
    fn test_tags_one_per_line() {
        let mut settings = SettingsMap::new();
        settings.set_string("tag", "red, , female ");

        let text = serialize(&settings, &ShaderConfig::new(), None).unwrap();
        assert!(text.contains("tag red\ntag female\n"));
    }

    #[test]
    fn test_litsphere_and_switches() {
        let mut config = ShaderConfig::new();
        config.set("normal", true).set("diffuse", false);

        let text = serialize(&SettingsMap::new(), &config, Some("leather")).unwrap();
        assert!(text.contains(
            "// Shader properties\n\
             shader shaders/glsl/litsphere\n\
             shaderParam litsphereTexture litspheres/leather.png\n\
             shaderConfig normal True\n\
             shaderConfig diffuse False\n"
        ));
    }

    #[test]
    fn test_plain_shader_kept_without_litsphere() {
        let mut settings = SettingsMap::new();
        settings.set_string("shader", "shaders/glsl/skin");
        let text = serialize(&settings, &ShaderConfig::new(), None).unwrap();
        assert!(text.contains("// Shader properties\nshader shaders/glsl/skin\n"));
    }

    #[test]
    fn test_unset_block_follows_registry_order() {
        let text = serialize(&SettingsMap::new(), &ShaderConfig::new(), None).unwrap();
        let block = text.split(UNSET_HEADER).nth(1).unwrap();
        let names: Vec<&str> = block
            .lines()
            .filter_map(|line| line.strip_prefix("// "))
            .collect();
        let expected: Vec<&str> = Registry::standard()
            .definitions()
            .iter()
            .map(|def| def.name)
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_type_mismatch() {
        let mut settings = SettingsMap::new();
        settings.set_string("opacity", "high");
        let err = serialize(&settings, &ShaderConfig::new(), None).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { ref key, expected: "float" } if key == "opacity"
        ));
    }

    #[test]
    fn test_line_breaks_are_rejected() {
        let mut settings = SettingsMap::new();
        settings.set_string("description", "first line\nopacity 0.1000");
        let err = serialize(&settings, &ShaderConfig::new(), None).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == "description"));

        let mut settings = SettingsMap::new();
        settings.set_string("tag", "skin, bad\rtag");
        assert!(serialize(&settings, &ShaderConfig::new(), None).is_err());

        let mut config = ShaderConfig::new();
        config.set("normal\nshader x", true);
        assert!(serialize(&SettingsMap::new(), &config, None).is_err());
        assert!(serialize(&SettingsMap::new(), &ShaderConfig::new(), Some("eye\nx")).is_err());
    }

    #[test]
    fn test_blank_values_are_listed_as_unset() {
        let mut settings = SettingsMap::new();
        settings
            .set_string("author", "")
            .set_path("diffuseTexture", "  ")
            .set_string("tag", " , ")
            .set_string("shader", "");

        let text = serialize(&settings, &ShaderConfig::new(), None).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(!lines.iter().any(|line| line.starts_with("author")));
        assert!(!lines.iter().any(|line| line.starts_with("tag")));
        assert!(!lines.iter().any(|line| line.starts_with("shader ")));
        assert!(lines.contains(&"// author"));
        assert!(lines.contains(&"// diffuseTexture"));
        assert!(lines.contains(&"// tag"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut settings = SettingsMap::with_defaults(Registry::standard());
        settings.append_tag("a").append_tag("b");
        let first = serialize(&settings, &ShaderConfig::new(), Some("eye")).unwrap();
        let second = serialize(&settings.clone(), &ShaderConfig::new(), Some("eye")).unwrap();
        assert_eq!(first, second);
    }
}
