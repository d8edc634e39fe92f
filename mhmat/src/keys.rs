//! The MHMAT key schema
//!
//! Every line of a material file is `key value`. This module holds the table of
//! known keys, their kinds, defaults and output groups, and the case-insensitive
//! lookup the parser uses.
//!
//! ```rust
//! use mhmat::keys::{KeyGroup, KeyKind, Registry};
//!
//! let registry = Registry::standard();
//! let def = registry.lookup("DIFFUSECOLOR").unwrap();
//! assert_eq!(def.name, "diffuseColor");
//! assert_eq!(def.kind, KeyKind::Color);
//! assert_eq!(def.group, KeyGroup::Color);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::{
    error::{Error, Result},
    types::Color,
    value::Value,
};

/// Canonical names of the keys callers most often touch
pub mod mhmat_keys {
    /// Material tag, may occur several times
    pub const TAG: &str = "tag";
    /// Material name
    pub const NAME: &str = "name";
    /// Free text description
    pub const DESCRIPTION: &str = "description";
    /// Unique identifier
    pub const UUID: &str = "uuid";
    /// License identifier
    pub const LICENSE: &str = "license";
    /// Author home page
    pub const HOMEPAGE: &str = "homepage";
    /// Author
    pub const AUTHOR: &str = "author";
    /// Diffuse color
    pub const DIFFUSE_COLOR: &str = "diffuseColor";
    /// Specular color
    pub const SPECULAR_COLOR: &str = "specularColor";
    /// Diffuse texture
    pub const DIFFUSE_TEXTURE: &str = "diffuseTexture";
    /// Normal map texture
    pub const NORMALMAP_TEXTURE: &str = "normalmapTexture";
    /// Bump map texture
    pub const BUMPMAP_TEXTURE: &str = "bumpmapTexture";
    /// Reference to a material inside a .blend library
    pub const BLEND_MATERIAL: &str = "blendMaterial";
    /// Roughness factor
    pub const ROUGHNESS: &str = "roughness";
    /// Shininess factor
    pub const SHININESS: &str = "shininess";
    /// Opacity
    pub const OPACITY: &str = "opacity";
    /// Unlit rendering
    pub const SHADELESS: &str = "shadeless";
    /// Subsurface scattering switch
    pub const SSS_ENABLED: &str = "sssEnabled";
    /// Shader program
    pub const SHADER: &str = "shader";
    /// Synthetic key holding the lit-sphere name read from a `shaderParam` line
    pub const LITSPHERE_TEXTURE: &str = "litsphereTexture";
}

/// The type of value a key carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Free text
    String,
    /// Number with four decimals on output
    Float,
    /// `True`/`False`
    Boolean,
    /// Three numbers
    Color,
    /// File reference resolved against the material's directory
    FilePath,
    /// `shaderParam NAME VALUE` text value
    ShaderString,
    /// `shaderConfig NAME VALUE` switch
    ShaderBoolean,
}

impl KeyKind {
    /// Name of the kind as used in error messages
    pub fn type_name(self) -> &'static str {
        match self {
            KeyKind::String | KeyKind::ShaderString => "string",
            KeyKind::Float => "float",
            KeyKind::Boolean | KeyKind::ShaderBoolean => "boolean",
            KeyKind::Color => "color",
            KeyKind::FilePath => "file path",
        }
    }

    /// Whether the key belongs to the trailing shader section
    pub fn is_shader(self) -> bool {
        matches!(self, KeyKind::ShaderString | KeyKind::ShaderBoolean)
    }
}

/// Output group of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyGroup {
    /// Name, tags, license and the like
    Metadata,
    /// Color shading attributes
    Color,
    /// Texture files
    Texture,
    /// Texture intensities
    Intensity,
    /// Subsurface scattering
    Sss,
    /// Everything else
    Various,
    /// Shader program and switches, written in their own trailing section
    Shaders,
}

impl KeyGroup {
    /// Label used in the `// <Group>` comment of written files
    pub fn label(self) -> &'static str {
        match self {
            KeyGroup::Metadata => "Metadata",
            KeyGroup::Color => "Color",
            KeyGroup::Texture => "Texture",
            KeyGroup::Intensity => "Intensity",
            KeyGroup::Sss => "SSS",
            KeyGroup::Various => "Various",
            KeyGroup::Shaders => "Shaders",
        }
    }
}

impl fmt::Display for KeyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order in which groups are written
pub const GROUP_ORDER: [KeyGroup; 6] = [
    KeyGroup::Metadata,
    KeyGroup::Color,
    KeyGroup::Texture,
    KeyGroup::Intensity,
    KeyGroup::Sss,
    KeyGroup::Various,
];

/// How a file path value combines with the material's directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathRule {
    /// Relative paths are joined onto the directory, absolute ones kept
    #[default]
    Plain,
    /// Always joined; the value addresses a location inside another file
    Structured,
}

/// One schema entry
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDefinition {
    /// Canonical, case-sensitive name
    pub name: &'static str,
    /// Value kind
    pub kind: KeyKind,
    /// Default value, if any
    pub default: Option<Value>,
    /// Output group
    pub group: KeyGroup,
    /// Path handling for [`KeyKind::FilePath`] keys
    pub path_rule: PathRule,
}

impl KeyDefinition {
    /// Create a definition without a default
    pub const fn new(name: &'static str, kind: KeyKind, group: KeyGroup) -> Self {
        Self {
            name,
            kind,
            default: None,
            group,
            path_rule: PathRule::Plain,
        }
    }

    /// Set the default value
    pub fn with_default<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark a file path key as structured
    pub fn structured(mut self) -> Self {
        self.path_rule = PathRule::Structured;
        self
    }
}

/// The key table and its lookup index
///
/// Built once and never mutated. [`Registry::standard`] returns the shared
/// canonical table; custom tables can be built with [`Registry::new`].
#[derive(Debug, Clone)]
pub struct Registry {
    definitions: Vec<KeyDefinition>,
    index: HashMap<String, usize>,
    shader_definitions: Vec<KeyDefinition>,
    shader_index: HashMap<String, usize>,
}

static STANDARD: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// Build a registry from key definitions
    ///
    /// Definitions whose kind is a shader kind, or whose group is
    /// [`KeyGroup::Shaders`], go into the shader table. Fails with
    /// [`Error::SchemaCollision`] when two names collide ignoring case.
    pub fn new(definitions: Vec<KeyDefinition>) -> Result<Self> {
        let (shader_definitions, definitions): (Vec<_>, Vec<_>) = definitions
            .into_iter()
            .partition(|def| def.kind.is_shader() || def.group == KeyGroup::Shaders);

        let index = build_index(&definitions)?;
        let shader_index = build_index(&shader_definitions)?;
        if let Some(name) = shader_index.keys().find(|name| index.contains_key(*name)) {
            return Err(Error::schema_collision(name.clone()));
        }

        Ok(Self {
            definitions,
            index,
            shader_definitions,
            shader_index,
        })
    }

    /// The canonical MHMAT registry
    ///
    /// # Panics
    ///
    /// Panics on first use if the built-in table has a name collision, which is a
    /// defect in this crate rather than a runtime condition.
    pub fn standard() -> &'static Registry {
        STANDARD.get_or_init(|| {
            Registry::new(standard_definitions())
                .unwrap_or_else(|err| panic!("built-in MHMAT key table is invalid: {err}"))
        })
    }

    /// All non-shader definitions in declaration order
    pub fn definitions(&self) -> &[KeyDefinition] {
        &self.definitions
    }

    /// Definitions of the shader section in declaration order
    pub fn shader_definitions(&self) -> &[KeyDefinition] {
        &self.shader_definitions
    }

    /// Find a definition by name, ignoring case
    pub fn lookup(&self, name: &str) -> Option<&KeyDefinition> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.definitions[i])
    }

    /// Find a shader definition by its full name, e.g. `"shaderConfig normal"`
    ///
    /// Runs of whitespace in `name` are treated as a single space.
    pub fn lookup_shader(&self, name: &str) -> Option<&KeyDefinition> {
        let normalized = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        self.shader_index
            .get(&normalized)
            .map(|&i| &self.shader_definitions[i])
    }

    /// Output group order
    pub fn group_order(&self) -> &'static [KeyGroup] {
        &GROUP_ORDER
    }

    /// Definitions belonging to one group, in declaration order
    pub fn group_definitions(&self, group: KeyGroup) -> impl Iterator<Item = &KeyDefinition> {
        self.definitions.iter().filter(move |def| def.group == group)
    }

    /// Number of non-shader definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry has no non-shader definitions
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn build_index(definitions: &[KeyDefinition]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(definitions.len());
    for (i, def) in definitions.iter().enumerate() {
        if index.insert(def.name.to_ascii_lowercase(), i).is_some() {
            return Err(Error::schema_collision(def.name));
        }
    }
    Ok(index)
}

/// The canonical key table in declaration order, shader section last
pub fn standard_definitions() -> Vec<KeyDefinition> {
    use KeyGroup as G;
    use KeyKind as K;

    let string = |name, group| KeyDefinition::new(name, K::String, group);
    let float = |name, group| KeyDefinition::new(name, K::Float, group);
    let boolean = |name, group| KeyDefinition::new(name, K::Boolean, group);
    let color = |name| KeyDefinition::new(name, K::Color, G::Color);
    let file = |name| KeyDefinition::new(name, K::FilePath, G::Texture);

    vec![
        // Metadata
        string("tag", G::Metadata),
        string("name", G::Metadata),
        string("description", G::Metadata),
        string("uuid", G::Metadata),
        string("license", G::Metadata).with_default("CC0"),
        string("homepage", G::Metadata),
        string("author", G::Metadata),
        // Colors
        color("diffuseColor").with_default(Color::GREY),
        color("specularColor").with_default(Color::GREY),
        color("emissiveColor"),
        color("ambientColor"),
        color("viewPortColor"),
        // Textures
        file("diffuseTexture"),
        file("bumpmapTexture"),
        file("normalmapTexture"),
        file("displacementmapTexture"),
        file("specularmapTexture"),
        file("transmissionmapTexture"),
        file("transparencymapTexture"),
        file("roughnessmapTexture"),
        file("metallicmapTexture"),
        file("aomapTexture"),
        file("blendMaterial").structured(),
        // Intensities
        float("diffuseIntensity", G::Intensity),
        float("bumpmapIntensity", G::Intensity),
        float("normalmapIntensity", G::Intensity),
        float("displacementMapIntensity", G::Intensity),
        float("specularmapIntensity", G::Intensity),
        float("transparencymapIntensity", G::Intensity),
        float("aomapIntensity", G::Intensity),
        // SSS
        boolean("sssEnabled", G::Sss),
        float("sssRScale", G::Sss),
        float("sssGScale", G::Sss),
        float("sssBScale", G::Sss),
        // Various
        float("metallic", G::Various),
        float("ior", G::Various),
        float("roughness", G::Various).with_default(0.7),
        float("shininess", G::Various).with_default(0.3),
        float("opacity", G::Various).with_default(1.0),
        float("translucency", G::Various),
        boolean("shadeless", G::Various).with_default(false),
        boolean("wireframe", G::Various).with_default(false),
        boolean("transparent", G::Various).with_default(false),
        boolean("alphaToCoverage", G::Various).with_default(true),
        boolean("backfaceCull", G::Various).with_default(true),
        boolean("depthless", G::Various).with_default(false),
        boolean("castShadows", G::Various).with_default(true),
        boolean("receiveShadows", G::Various).with_default(true),
        boolean("autoBlendSkin", G::Various),
        // Shaders
        string("shader", G::Shaders),
        KeyDefinition::new("shaderParam litsphereTexture", K::ShaderString, G::Shaders),
        shader_switch("shaderConfig ambientOcclusion", true),
        shader_switch("shaderConfig normal", false),
        shader_switch("shaderConfig bump", false),
        shader_switch("shaderConfig displacement", false),
        shader_switch("shaderConfig vertexColors", false),
        shader_switch("shaderConfig spec", true),
        shader_switch("shaderConfig transparency", true),
        shader_switch("shaderConfig diffuse", true),
    ]
}

fn shader_switch(name: &'static str, default: bool) -> KeyDefinition {
    KeyDefinition::new(name, KeyKind::ShaderBoolean, KeyGroup::Shaders).with_default(default)
}
