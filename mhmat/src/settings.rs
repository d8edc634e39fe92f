//! Settings maps and shader configuration
//!
//! A [`SettingsMap`] holds the values of one material, keyed by canonical key
//! name. [`ShaderConfig`] holds the `shaderConfig` switches in the order they
//! were set.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::{
    keys::{mhmat_keys, Registry},
    types::Color,
    value::Value,
};

/// Key to typed value mapping for one material
///
/// Keys are expected to be canonical names from the [`Registry`]; the parser
/// normalizes case before inserting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsMap {
    values: HashMap<String, Value>,
}

impl SettingsMap {
    /// Create an empty settings map
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Create a settings map holding every default the registry declares
    pub fn with_defaults(registry: &Registry) -> Self {
        let mut settings = Self::new();
        settings.apply_defaults(registry);
        settings
    }

    /// Fill in registry defaults for keys that have no value yet
    pub fn apply_defaults(&mut self, registry: &Registry) {
        for def in registry.definitions() {
            if let Some(default) = &def.default {
                self.values
                    .entry(def.name.to_string())
                    .or_insert_with(|| default.clone());
            }
        }
    }

    /// Set a value
    pub fn set<S: Into<String>, V: Into<Value>>(&mut self, name: S, value: V) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Set a string value
    pub fn set_string<S: Into<String>, V: Into<String>>(&mut self, name: S, value: V) -> &mut Self {
        self.set(name, Value::String(value.into()))
    }

    /// Set a float value
    pub fn set_float<S: Into<String>>(&mut self, name: S, value: f64) -> &mut Self {
        self.set(name, Value::Float(value))
    }

    /// Set a boolean value
    pub fn set_bool<S: Into<String>>(&mut self, name: S, value: bool) -> &mut Self {
        self.set(name, Value::Boolean(value))
    }

    /// Set a color value
    pub fn set_color<S: Into<String>, C: Into<Color>>(&mut self, name: S, value: C) -> &mut Self {
        self.set(name, Value::Color(value.into()))
    }

    /// Set a file path value
    pub fn set_path<S: Into<String>, P: Into<String>>(&mut self, name: S, value: P) -> &mut Self {
        self.set(name, Value::FilePath(value.into()))
    }

    /// Add a tag, joining it onto any tags already present with `", "`
    pub fn append_tag<S: AsRef<str>>(&mut self, tag: S) -> &mut Self {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            return self;
        }
        let joined = match self.get_str(mhmat_keys::TAG) {
            Some(existing) if !existing.is_empty() => format!("{existing}, {tag}"),
            _ => tag.to_string(),
        };
        self.set_string(mhmat_keys::TAG, joined)
    }

    /// Individual tags, split on commas and trimmed
    pub fn tags(&self) -> Vec<&str> {
        self.get_str(mhmat_keys::TAG)
            .map(split_tags)
            .unwrap_or_default()
    }

    /// Get a value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Get a text value (string or file path)
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Get a float value
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Get a boolean value
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Get a color value
    pub fn get_color(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(Value::as_color)
    }

    /// Remove a value, returning it
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Check whether a key has a value
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Copy every value of `other` over this map
    ///
    /// Tags are replaced, not accumulated.
    pub fn merge(&mut self, other: SettingsMap) {
        self.values.extend(other.values);
    }

    /// Iterate over all entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Clear all values
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SettingsMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Split an accumulated tag value into its trimmed, non-empty segments
pub fn split_tags(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

bitflags! {
    /// The shader switches MakeHuman knows about
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderFeatures: u32 {
        /// Ambient occlusion map
        const AMBIENT_OCCLUSION = 1 << 0;
        /// Normal map
        const NORMAL = 1 << 1;
        /// Bump map
        const BUMP = 1 << 2;
        /// Displacement map
        const DISPLACEMENT = 1 << 3;
        /// Vertex colors
        const VERTEX_COLORS = 1 << 4;
        /// Specular map
        const SPEC = 1 << 5;
        /// Transparency map
        const TRANSPARENCY = 1 << 6;
        /// Diffuse texture
        const DIFFUSE = 1 << 7;
    }
}

impl ShaderFeatures {
    /// Switches that are on unless a material says otherwise
    pub const DEFAULT: Self = Self::AMBIENT_OCCLUSION
        .union(Self::SPEC)
        .union(Self::TRANSPARENCY)
        .union(Self::DIFFUSE);

    const NAMED: [(&'static str, ShaderFeatures); 8] = [
        ("ambientOcclusion", Self::AMBIENT_OCCLUSION),
        ("normal", Self::NORMAL),
        ("bump", Self::BUMP),
        ("displacement", Self::DISPLACEMENT),
        ("vertexColors", Self::VERTEX_COLORS),
        ("spec", Self::SPEC),
        ("transparency", Self::TRANSPARENCY),
        ("diffuse", Self::DIFFUSE),
    ];

    /// Find a switch by its `shaderConfig` name, ignoring case
    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, flag)| flag)
    }

    /// The `shaderConfig` name of a single switch
    pub fn config_name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|&&(_, flag)| flag == self)
            .map(|&(n, _)| n)
    }

    /// Every switch with its name, in declaration order
    pub fn named() -> impl Iterator<Item = (&'static str, ShaderFeatures)> {
        Self::NAMED.into_iter()
    }
}

impl Default for ShaderFeatures {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Ordered `shaderConfig` switches
///
/// Setting a switch that is already present replaces its value in place, so
/// the written order is the order switches were first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderConfig {
    entries: Vec<(String, bool)>,
}

impl ShaderConfig {
    /// Create an empty shader configuration
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Every known switch, in declaration order, on when contained in `features`
    pub fn from_features(features: ShaderFeatures) -> Self {
        Self {
            entries: ShaderFeatures::named()
                .map(|(name, flag)| (name.to_string(), features.contains(flag)))
                .collect(),
        }
    }

    /// Set a switch
    ///
    /// Known switch names are normalized to their canonical spelling.
    pub fn set<S: Into<String>>(&mut self, name: S, enabled: bool) -> &mut Self {
        let name = name.into();
        let name = ShaderFeatures::from_config_name(&name)
            .and_then(ShaderFeatures::config_name)
            .map(str::to_string)
            .unwrap_or(name);

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = enabled,
            None => self.entries.push((name, enabled)),
        }
        self
    }

    /// Get a switch
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, v)| v)
    }

    /// Known switches that are set and on
    pub fn features(&self) -> ShaderFeatures {
        self.entries
            .iter()
            .filter(|(_, enabled)| *enabled)
            .filter_map(|(name, _)| ShaderFeatures::from_config_name(name))
            .fold(ShaderFeatures::empty(), |acc, flag| acc | flag)
    }

    /// All switches in insertion order
    pub fn entries(&self) -> &[(String, bool)] {
        &self.entries
    }

    /// Check if no switch is set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the number of switches
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<ShaderFeatures> for ShaderConfig {
    fn from(features: ShaderFeatures) -> Self {
        Self::from_features(features)
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for ShaderConfig {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (name, enabled) in iter {
            config.set(name, enabled);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_map_methods() {
        let mut settings = SettingsMap::new();
        assert!(settings.is_empty());

        settings
            .set_string("name", "skin")
            .set_float("opacity", 0.5)
            .set_bool("shadeless", true)
            .set_color("diffuseColor", [0.1, 0.2, 0.3])
            .set_path("diffuseTexture", "/tex/skin.png");

        assert_eq!(settings.len(), 5);
        assert_eq!(settings.get_str("name"), Some("skin"));
        assert_eq!(settings.get_float("opacity"), Some(0.5));
        assert_eq!(settings.get_bool("shadeless"), Some(true));
        assert_eq!(settings.get_color("diffuseColor"), Some(Color::new(0.1, 0.2, 0.3)));
        assert_eq!(settings.get_str("diffuseTexture"), Some("/tex/skin.png"));
        assert_eq!(settings.get_float("name"), None);

        assert!(settings.remove("name").is_some());
        assert!(!settings.contains("name"));
        settings.clear();
        assert!(settings.is_empty());
    }

    #[test]
    fn test_defaults_fill_only_missing() {
        let mut settings = SettingsMap::new();
        settings.set_float("opacity", 0.25);
        settings.apply_defaults(Registry::standard());

        assert_eq!(settings.get_float("opacity"), Some(0.25));
        assert_eq!(settings.get_float("roughness"), Some(0.7));
        assert_eq!(settings.get_str("license"), Some("CC0"));
        assert_eq!(settings.get_bool("backfaceCull"), Some(true));
        assert!(!settings.contains("uuid"));
    }

    #[test]
    fn test_tag_accumulation() {
        let mut settings = SettingsMap::new();
        settings.append_tag("red").append_tag(" female ").append_tag("");
        assert_eq!(settings.get_str("tag"), Some("red, female"));
        assert_eq!(settings.tags(), vec!["red", "female"]);
    }

    #[test]
    fn test_split_tags_skips_empty_segments() {
        assert_eq!(split_tags("a,, b ,c,"), vec!["a", "b", "c"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_shader_config_order_and_replace() {
        let mut config = ShaderConfig::new();
        config.set("spec", false).set("NORMAL", true).set("custom", true);
        config.set("spec", true);

        let names: Vec<&str> = config.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["spec", "normal", "custom"]);
        assert_eq!(config.get("spec"), Some(true));
        assert_eq!(config.features(), ShaderFeatures::SPEC | ShaderFeatures::NORMAL);
    }

    #[test]
    fn test_shader_config_from_default_features() {
        let config = ShaderConfig::from(ShaderFeatures::default());
        assert_eq!(config.len(), 8);
        assert_eq!(config.entries()[0], ("ambientOcclusion".to_string(), true));
        assert_eq!(config.get("normal"), Some(false));
        assert_eq!(config.features(), ShaderFeatures::DEFAULT);
    }

    #[test]
    fn test_shader_defaults_match_registry() {
        let registry = Registry::standard();
        for (name, flag) in ShaderFeatures::named() {
            let def = registry
                .lookup_shader(&format!("shaderConfig {name}"))
                .unwrap();
            assert_eq!(
                def.default,
                Some(Value::Boolean(ShaderFeatures::DEFAULT.contains(flag))),
                "{name}"
            );
        }
    }
}
