//! CSS Color Module Level 4: sRGB color values and the HSL/HSV models.
//! Spec: <https://www.w3.org/TR/css-color-4/>
use core::fmt;

mod convert;
mod parse;

pub use convert::{Hsl, Hsv, hsl_to_rgb, hsv_to_rgb, map_range, rgb_to_hsl, rgb_to_hsv};
pub use parse::parse_color;

/// Legacy 8-bit channel triple, ordered red, green, blue.
pub type Rgb8 = [u8; 3];

/// An sRGB color with 8-bit channels and a unit-interval alpha.
///
/// Alpha is kept exactly as parsed so it can be written back unchanged.
/// An alpha of `0` always means "transparent, skip".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorValue {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f64,
}

impl ColorValue {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0.0);

    #[inline]
    #[must_use]
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[inline]
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[inline]
    #[must_use]
    pub const fn channels(self) -> Rgb8 {
        [self.red, self.green, self.blue]
    }

    /// Replace the color channels, keeping this color's alpha.
    #[inline]
    #[must_use]
    pub const fn with_channels(self, rgb: Rgb8) -> Self {
        Self::rgba(rgb[0], rgb[1], rgb[2], self.alpha)
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.alpha <= 0.0
    }

    #[inline]
    pub fn to_hsl(self) -> Hsl {
        rgb_to_hsl(self.channels())
    }

    #[inline]
    pub fn to_hsv(self) -> Hsv {
        rgb_to_hsv(self.channels())
    }
}

/// Serializes as `rgba(R, G, B, A)`, the form written back into style properties.
impl fmt::Display for ColorValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "rgba({}, {}, {}, {})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}
