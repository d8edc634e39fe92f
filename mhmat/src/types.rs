//! Common value types used throughout the MHMAT codec
//!
//! MHMAT stores colors as three doubles. [`Color`] keeps that precision and offers
//! conversions to the math libraries rendering code usually works with, gated
//! behind the `glam`, `mint` and `bytemuck` features.
//!
//! # Usage
//!
//! ```rust
//! use mhmat::types::Color;
//!
//! let skin = Color::new(0.8, 0.6, 0.5);
//! assert_eq!(skin.to_array(), [0.8, 0.6, 0.5]);
//! assert_eq!(Color::from([0.5, 0.5, 0.5]), Color::GREY);
//! ```

use std::fmt;

/// RGB color with double precision components
///
/// Components are conceptually in `[0, 1]` but are not clamped or validated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct Color {
    /// Red component
    pub r: f64,
    /// Green component
    pub g: f64,
    /// Blue component
    pub b: f64,
}

impl Color {
    /// Black
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    /// White
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    /// Mid grey, the default for diffuse and specular colors
    pub const GREY: Color = Color::new(0.5, 0.5, 0.5);

    /// Create a color from its components
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Components as an array
    pub const fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f64; 3]> for Color {
    fn from([r, g, b]: [f64; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Color> for [f64; 3] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

impl From<(f64, f64, f64)> for Color {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        Self::new(r, g, b)
    }
}

/// Canonical MHMAT form: three space separated floats with four decimals
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} {:.4} {:.4}", self.r, self.g, self.b)
    }
}

#[cfg(feature = "glam")]
mod glam_conversions {
    use super::Color;

    impl From<Color> for glam::DVec3 {
        fn from(c: Color) -> Self {
            glam::DVec3::new(c.r, c.g, c.b)
        }
    }

    impl From<glam::DVec3> for Color {
        fn from(v: glam::DVec3) -> Self {
            Color::new(v.x, v.y, v.z)
        }
    }

    impl From<Color> for glam::Vec3 {
        fn from(c: Color) -> Self {
            glam::Vec3::new(c.r as f32, c.g as f32, c.b as f32)
        }
    }

    impl From<glam::Vec3> for Color {
        fn from(v: glam::Vec3) -> Self {
            Color::new(f64::from(v.x), f64::from(v.y), f64::from(v.z))
        }
    }
}

#[cfg(feature = "mint")]
mod mint_conversions {
    use super::Color;

    impl From<Color> for mint::Vector3<f64> {
        fn from(c: Color) -> Self {
            mint::Vector3 {
                x: c.r,
                y: c.g,
                z: c.b,
            }
        }
    }

    impl From<mint::Vector3<f64>> for Color {
        fn from(v: mint::Vector3<f64>) -> Self {
            Color::new(v.x, v.y, v.z)
        }
    }

    impl From<Color> for mint::Vector3<f32> {
        fn from(c: Color) -> Self {
            mint::Vector3 {
                x: c.r as f32,
                y: c.g as f32,
                z: c.b as f32,
            }
        }
    }
}
