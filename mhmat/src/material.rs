//! The material façade
//!
//! [`MhMat`] bundles a settings map, the shader switches and the lit-sphere of
//! one material. It starts from registry defaults; values read from a file or
//! collected from a [`MaterialSource`] override them.
//!
//! ```rust
//! use mhmat::{presets::Litsphere, MhMat};
//!
//! # fn main() -> mhmat::Result<()> {
//! let mut material = MhMat::new();
//! material
//!     .settings_mut()
//!     .set_string("name", "skin")
//!     .append_tag("female");
//! material.set_litsphere_preset(Litsphere::StandardSkin);
//!
//! let text = material.to_mhmat_string()?;
//! let reread = MhMat::parse_str(&text)?;
//! assert_eq!(reread.settings(), material.settings());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::{
    error::{Error, Result},
    io::{DefaultFileSystem, FileSystem},
    keys::{mhmat_keys, KeyKind, Registry},
    logging::Logger,
    parser::{Diagnostic, MhmatReader, ParsedMaterial},
    presets::{License, Litsphere},
    settings::{SettingsMap, ShaderConfig},
    value::Value,
    writer,
};

/// Something that can fill in a material from outside state
///
/// Implemented by collectors that read a host application's scene, and by
/// [`SettingsMap`] for plain value copies.
pub trait MaterialSource {
    /// Write this source's values into `material`
    fn collect(&self, material: &mut MhMat) -> Result<()>;
}

impl MaterialSource for SettingsMap {
    fn collect(&self, material: &mut MhMat) -> Result<()> {
        material.settings.merge(self.clone());
        Ok(())
    }
}

/// A `blendMaterial` value split into its parts
///
/// The value has the form `<blend file>/<data directory>/<asset>`; the blend
/// file path may itself contain slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendMaterialRef {
    /// Path of the .blend library
    pub blend_file: String,
    /// Data directory inside the library, usually `Material`
    pub directory: String,
    /// Name of the material asset
    pub asset: String,
}

impl BlendMaterialRef {
    /// Split a `blendMaterial` value on its last two `/` separators
    pub fn parse(value: &str) -> Result<Self> {
        let mut parts = value.rsplitn(3, '/').map(str::trim);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(asset), Some(directory), Some(blend_file)) => Ok(Self {
                blend_file: blend_file.to_string(),
                directory: directory.to_string(),
                asset: asset.to_string(),
            }),
            _ => Err(Error::invalid_parameter(format!(
                "blendMaterial needs <file>/<directory>/<asset>, got {value:?}"
            ))),
        }
    }
}

impl fmt::Display for BlendMaterialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.blend_file, self.directory, self.asset)
    }
}

/// One MakeHuman material
#[derive(Debug, Clone)]
pub struct MhMat {
    settings: SettingsMap,
    shader_config: ShaderConfig,
    diagnostics: Vec<Diagnostic>,
    registry: Option<Arc<Registry>>,
}

impl MhMat {
    /// Create a material holding every registry default
    pub fn new() -> Self {
        let mut material = Self::empty();
        material.apply_defaults();
        material
    }

    /// Create a material with no values at all
    pub fn empty() -> Self {
        Self {
            settings: SettingsMap::new(),
            shader_config: ShaderConfig::new(),
            diagnostics: Vec::new(),
            registry: None,
        }
    }

    /// Start configuring a material
    pub fn builder() -> MaterialBuilder<'static> {
        MaterialBuilder::new()
    }

    /// Read a material file, relative paths resolved against its directory
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().from_file(path).build()
    }

    /// Parse material text on top of the registry defaults
    ///
    /// Relative file paths stay as written.
    pub fn parse_str(text: &str) -> Result<Self> {
        let mut material = Self::new();
        material.merge_parsed(MhmatReader::new().parse_str(text)?);
        Ok(material)
    }

    /// Read a material file without blocking the runtime
    #[cfg(feature = "tokio")]
    pub async fn from_file_async<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = crate::io::async_io::read_to_string(path).await?;
        let reader = match crate::io::base_location(path) {
            Some(base) => MhmatReader::new().with_base_location(base),
            None => MhmatReader::new(),
        };
        let mut material = Self::new();
        material.merge_parsed(reader.parse_str(&text)?);
        Ok(material)
    }

    /// Fill in registry defaults for keys and switches that have no value yet
    pub fn apply_defaults(&mut self) {
        let registry = self.registry.clone();
        let registry = registry.as_deref().unwrap_or_else(|| Registry::standard());
        self.settings.apply_defaults(registry);

        for def in registry.shader_definitions() {
            if def.kind != KeyKind::ShaderBoolean {
                continue;
            }
            let (Some(Value::Boolean(enabled)), Some((_, name))) =
                (&def.default, def.name.split_once(' '))
            else {
                continue;
            };
            if self.shader_config.get(name).is_none() {
                self.shader_config.set(name, *enabled);
            }
        }
    }

    /// Apply the result of a parse, overriding values already present
    pub fn merge_parsed(&mut self, parsed: ParsedMaterial) {
        self.settings.merge(parsed.settings);
        for (name, enabled) in parsed.shader_config.entries() {
            self.shader_config.set(name.as_str(), *enabled);
        }
        self.diagnostics.extend(parsed.diagnostics);
    }

    /// The registry this material is checked against
    pub fn registry(&self) -> &Registry {
        self.registry
            .as_deref()
            .unwrap_or_else(|| Registry::standard())
    }

    /// Material values
    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    /// Material values, mutable
    pub fn settings_mut(&mut self) -> &mut SettingsMap {
        &mut self.settings
    }

    /// Shader switches
    pub fn shader_config(&self) -> &ShaderConfig {
        &self.shader_config
    }

    /// Shader switches, mutable
    pub fn shader_config_mut(&mut self) -> &mut ShaderConfig {
        &mut self.shader_config
    }

    /// Problems found while reading
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Material name
    pub fn name(&self) -> Option<&str> {
        self.settings.get_str(mhmat_keys::NAME)
    }

    /// Individual tags
    pub fn tags(&self) -> Vec<&str> {
        self.settings.tags()
    }

    /// The license, if it is one of the known presets
    pub fn license(&self) -> Option<License> {
        self.settings
            .get_str(mhmat_keys::LICENSE)
            .and_then(|s| s.parse().ok())
    }

    /// Set the license
    pub fn set_license(&mut self, license: License) -> &mut Self {
        self.settings.set_string(mhmat_keys::LICENSE, license.as_str());
        self
    }

    /// Lit-sphere name, as in `litspheres/<name>.png`
    pub fn litsphere(&self) -> Option<&str> {
        self.settings.get_str(mhmat_keys::LITSPHERE_TEXTURE)
    }

    /// Set the lit-sphere by name
    ///
    /// Also selects the lit-sphere shader program.
    pub fn set_litsphere<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.settings
            .set_string(mhmat_keys::LITSPHERE_TEXTURE, name)
            .set_string(mhmat_keys::SHADER, writer::LITSPHERE_SHADER);
        self
    }

    /// Set one of the shipped lit-spheres
    pub fn set_litsphere_preset(&mut self, litsphere: Litsphere) -> &mut Self {
        self.set_litsphere(litsphere.as_str())
    }

    /// Remove the lit-sphere and the lit-sphere shader
    pub fn clear_litsphere(&mut self) -> &mut Self {
        self.settings.remove(mhmat_keys::LITSPHERE_TEXTURE);
        if self.settings.get_str(mhmat_keys::SHADER) == Some(writer::LITSPHERE_SHADER) {
            self.settings.remove(mhmat_keys::SHADER);
        }
        self
    }

    /// The `blendMaterial` reference split into its parts
    pub fn blend_material_ref(&self) -> Result<Option<BlendMaterialRef>> {
        self.settings
            .get_str(mhmat_keys::BLEND_MATERIAL)
            .map(BlendMaterialRef::parse)
            .transpose()
    }

    /// Serialize to MHMAT text
    pub fn to_mhmat_string(&self) -> Result<String> {
        writer::serialize_with(
            self.registry(),
            &self.settings,
            &self.shader_config,
            self.litsphere(),
        )
    }

    /// Write to a file on disk
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_file_with(&mut DefaultFileSystem, &path.as_ref().to_string_lossy())
    }

    /// Write through a custom file system
    pub fn write_file_with(&self, fs: &mut dyn FileSystem, path: &str) -> Result<()> {
        let text = self.to_mhmat_string()?;
        fs.write(path, text.as_bytes())
    }

    /// Write to a file without blocking the runtime
    #[cfg(feature = "tokio")]
    pub async fn write_file_async<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.to_mhmat_string()?;
        crate::io::async_io::write(path, &text).await
    }
}

impl Default for MhMat {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for MhMat {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings && self.shader_config == other.shader_config
    }
}

/// Builder for constructing a [`MhMat`]
///
/// A material comes either from a [`MaterialSource`] or from a file, never
/// both.
pub struct MaterialBuilder<'a> {
    source: Option<&'a dyn MaterialSource>,
    file: Option<PathBuf>,
    file_system: Option<Arc<Mutex<dyn FileSystem>>>,
    registry: Option<Arc<Registry>>,
    logger: Option<Arc<Mutex<Logger>>>,
    defaults: bool,
}

impl MaterialBuilder<'static> {
    /// Create a builder that starts from registry defaults
    pub fn new() -> Self {
        Self {
            source: None,
            file: None,
            file_system: None,
            registry: None,
            logger: None,
            defaults: true,
        }
    }
}

impl Default for MaterialBuilder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MaterialBuilder<'a> {
    /// Read values from a material file
    pub fn from_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Collect values from a source object
    pub fn from_source<'b>(self, source: &'b dyn MaterialSource) -> MaterialBuilder<'b>
    where
        'a: 'b,
    {
        MaterialBuilder {
            source: Some(source),
            file: self.file,
            file_system: self.file_system,
            registry: self.registry,
            logger: self.logger,
            defaults: self.defaults,
        }
    }

    /// Read files through a custom file system
    pub fn with_file_system(mut self, file_system: Arc<Mutex<dyn FileSystem>>) -> Self {
        self.file_system = Some(file_system);
        self
    }

    /// Use a custom key registry
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Send parse diagnostics to this logger instead of the global one
    pub fn with_logger(mut self, logger: Arc<Mutex<Logger>>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Whether to start from registry defaults
    pub fn with_defaults(mut self, defaults: bool) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build the material
    pub fn build(self) -> Result<MhMat> {
        if self.source.is_some() && self.file.is_some() {
            return Err(Error::ConstructionConflict);
        }

        let mut material = MhMat::empty();
        material.registry = self.registry.clone();
        if self.defaults {
            material.apply_defaults();
        }

        if let Some(source) = self.source {
            source.collect(&mut material)?;
        }

        if let Some(path) = &self.file {
            let registry = material.registry.clone();
            let registry = registry.as_deref().unwrap_or_else(|| Registry::standard());
            let mut reader = MhmatReader::new().with_registry(registry);
            if let Some(logger) = &self.logger {
                reader = reader.with_logger(logger.clone());
            }

            let path = path.to_string_lossy();
            let parsed = match &self.file_system {
                Some(fs) => {
                    let fs = fs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    reader.parse_file_with(&*fs, &path)?
                }
                None => reader.parse_file_with(&DefaultFileSystem, &path)?,
            };
            material.merge_parsed(parsed);
        }

        Ok(material)
    }
}

impl fmt::Debug for MaterialBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterialBuilder")
            .field("source", &self.source.is_some())
            .field("file", &self.file)
            .field("file_system", &self.file_system.is_some())
            .field("defaults", &self.defaults)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryFileSystem;
    use approx::assert_relative_eq;

    fn quiet() -> Arc<Mutex<Logger>> {
        Arc::new(Mutex::new(Logger::new()))
    }

    #[test]
    fn test_new_holds_defaults() {
        let material = MhMat::new();
        assert_eq!(material.license(), Some(License::Cc0));
        assert_relative_eq!(material.settings().get_float("roughness").unwrap(), 0.7);
        assert_eq!(material.shader_config().get("spec"), Some(true));
        assert_eq!(material.shader_config().get("normal"), Some(false));
        assert_eq!(material.shader_config().len(), 8);
        assert!(material.litsphere().is_none());
    }

    #[test]
    fn test_parse_overrides_defaults() {
        let material = MhMat::parse_str("opacity 0.25\nshaderConfig normal true\n").unwrap();
        assert_relative_eq!(material.settings().get_float("opacity").unwrap(), 0.25);
        assert_eq!(material.shader_config().get("normal"), Some(true));
        assert_eq!(material.shader_config().entries()[1].0, "normal");
    }

    #[test]
    fn test_construction_conflict() {
        let source = SettingsMap::new();
        let result = MhMat::builder()
            .from_file("skin.mhmat")
            .from_source(&source)
            .build();
        assert!(matches!(result, Err(Error::ConstructionConflict)));
    }

    #[test]
    fn test_from_source() {
        let mut source = SettingsMap::new();
        source.set_string("name", "collected").set_float("opacity", 0.5);

        let material = MhMat::builder()
            .with_defaults(false)
            .from_source(&source)
            .build()
            .unwrap();
        assert_eq!(material.name(), Some("collected"));
        assert_eq!(material.settings().len(), 2);
        assert!(material.shader_config().is_empty());
    }

    #[test]
    fn test_from_memory_file_system() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/skins/young.mhmat", "name young\ndiffuseTexture young.png\nbogus 1\n");

        let material = MhMat::builder()
            .from_file("/skins/young.mhmat")
            .with_file_system(Arc::new(Mutex::new(fs)))
            .with_logger(quiet())
            .build()
            .unwrap();

        assert_eq!(material.name(), Some("young"));
        assert_eq!(
            material.settings().get_str("diffuseTexture"),
            Some("/skins/young.png")
        );
        assert_eq!(material.diagnostics().len(), 1);
    }

    #[test]
    fn test_write_through_file_system() {
        let mut fs = MemoryFileSystem::new();
        let mut material = MhMat::new();
        material.settings_mut().set_string("name", "out");
        material.write_file_with(&mut fs, "out.mhmat").unwrap();

        let written = fs.read_to_string("out.mhmat").unwrap();
        assert!(written.starts_with(writer::BANNER));
        assert!(written.contains("\nname out\n"));
    }

    #[test]
    fn test_blend_material_ref() {
        let parsed =
            BlendMaterialRef::parse("/lib/assets/skins.blend/Material/young_caucasian").unwrap();
        assert_eq!(parsed.blend_file, "/lib/assets/skins.blend");
        assert_eq!(parsed.directory, "Material");
        assert_eq!(parsed.asset, "young_caucasian");
        assert_eq!(
            parsed.to_string(),
            "/lib/assets/skins.blend/Material/young_caucasian"
        );

        assert!(BlendMaterialRef::parse("Material/skin").is_err());

        let mut material = MhMat::empty();
        assert_eq!(material.blend_material_ref().unwrap(), None);
        material
            .settings_mut()
            .set_path("blendMaterial", "a.blend/Material/skin");
        assert_eq!(material.blend_material_ref().unwrap().unwrap().asset, "skin");
    }

    #[test]
    fn test_litsphere_preset() {
        let mut material = MhMat::new();
        material.set_litsphere_preset(Litsphere::Eye);
        assert_eq!(material.litsphere(), Some("eye"));

        let text = material.to_mhmat_string().unwrap();
        assert!(text.contains("shaderParam litsphereTexture litspheres/eye.png"));

        material.clear_litsphere();
        assert!(material.litsphere().is_none());
        assert!(!material.settings().contains("shader"));
    }

    #[test]
    fn test_set_license() {
        let mut material = MhMat::empty();
        material.set_license(License::Agpl);
        assert_eq!(material.settings().get_str("license"), Some("AGPL"));
        assert_eq!(material.license(), Some(License::Agpl));
    }
}
