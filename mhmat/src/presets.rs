//! Licenses and lit-spheres MakeHuman ships with

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Licenses a material can be published under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum License {
    /// Creative Commons Zero
    #[default]
    Cc0,
    /// Creative Commons Attribution
    CcBy,
    /// Affero GNU Public License
    Agpl,
}

impl License {
    /// Every license, in menu order
    pub const ALL: [License; 3] = [License::Cc0, License::CcBy, License::Agpl];

    /// Identifier written after the `license` key
    pub fn as_str(self) -> &'static str {
        match self {
            License::Cc0 => "CC0",
            License::CcBy => "CC-BY",
            License::Agpl => "AGPL",
        }
    }

    /// One-line description
    pub fn description(self) -> &'static str {
        match self {
            License::Cc0 => "Creative Commons Zero",
            License::CcBy => "Creative Commons Attribution",
            License::Agpl => "Affero Gnu Public License (don't use unless absolutely necessary)",
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for License {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        License::ALL
            .into_iter()
            .find(|license| license.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_parameter(format!("Unknown license: {s}")))
    }
}

/// Lit-sphere textures used to fake lighting in the MakeHuman viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Litsphere {
    /// Suitable for all clothes
    #[default]
    Leather,
    /// Suitable for all skins
    StandardSkin,
    /// African skin
    African,
    /// Asian skin
    Asian,
    /// Caucasian skin
    Caucasian,
    /// Toon skin
    Toon01,
    /// Eyes
    Eye,
    /// Hair
    Hair,
}

impl Litsphere {
    /// Every lit-sphere, in menu order
    pub const ALL: [Litsphere; 8] = [
        Litsphere::Leather,
        Litsphere::StandardSkin,
        Litsphere::African,
        Litsphere::Asian,
        Litsphere::Caucasian,
        Litsphere::Toon01,
        Litsphere::Eye,
        Litsphere::Hair,
    ];

    /// Name used in `litspheres/<name>.png`
    pub fn as_str(self) -> &'static str {
        match self {
            Litsphere::Leather => "leather",
            Litsphere::StandardSkin => "standard_skin",
            Litsphere::African => "african",
            Litsphere::Asian => "asian",
            Litsphere::Caucasian => "caucasian",
            Litsphere::Toon01 => "toon01",
            Litsphere::Eye => "eye",
            Litsphere::Hair => "hair",
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Litsphere::Leather => "leather",
            Litsphere::StandardSkin => "standard skin",
            Litsphere::African => "african skin",
            Litsphere::Asian => "asian skin",
            Litsphere::Caucasian => "caucasian skin",
            Litsphere::Toon01 => "toon",
            Litsphere::Eye => "eye",
            Litsphere::Hair => "hair",
        }
    }

    /// One-line description
    pub fn description(self) -> &'static str {
        match self {
            Litsphere::Leather => {
                "Leather litsphere. This is appropriate for all clothes, not only leather."
            }
            Litsphere::StandardSkin => {
                "Standard skin litsphere. This is appropriate for all skins."
            }
            Litsphere::African => "African skin litsphere",
            Litsphere::Asian => "Asian skin litsphere",
            Litsphere::Caucasian => "Caucasian skin litsphere",
            Litsphere::Toon01 => "Toon skin litsphere",
            Litsphere::Eye => "Eye litsphere",
            Litsphere::Hair => "Hair litsphere",
        }
    }

    /// Texture path as written in a `shaderParam litsphereTexture` line
    pub fn texture_path(self) -> String {
        format!("litspheres/{}.png", self.as_str())
    }
}

impl fmt::Display for Litsphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Litsphere {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Litsphere::ALL
            .into_iter()
            .find(|sphere| sphere.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_parameter(format!("Unknown litsphere: {s}")))
    }
}
