//! Lighten/darken policy applied on top of the color model.
//!
//! Both transforms return `None` ("no change") for unparseable or fully
//! transparent input and for colors already on the desired side. Neither is a
//! fixed point: callers rely on the processed marker to avoid drift.

use css_color::{ColorValue, Hsl, Hsv, hsl_to_rgb, hsv_to_rgb, map_range, parse_color, rgb_to_hsv};

use crate::properties::Category;

/// `L' = (L + (K - 1)) / K` for dark foreground colors.
pub const LIGHTEN_FACTOR: f64 = 5.0;

/// Brightness divisor selected by the property being darkened.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DarkenProfile {
    /// Border colors keep more brightness so edges stay visible on dark fills.
    Border,
    Surface,
}

impl DarkenProfile {
    pub fn for_property(property: &str) -> Self {
        if property.contains("border") {
            Self::Border
        } else {
            Self::Surface
        }
    }

    #[inline]
    pub const fn strength(self) -> f64 {
        match self {
            Self::Border => 3.0,
            Self::Surface => 6.2,
        }
    }

    /// Divisor for a color of the given HSV saturation. Collapses towards 1
    /// as saturation approaches 1.
    #[inline]
    pub fn factor(self, saturation: f64) -> f64 {
        let strength = self.strength();
        strength / map_range(saturation.powi(10), 0.0, 1.0, 1.0, strength)
    }
}

/// Lighten a dark foreground color literal.
pub fn lighten(literal: &str) -> Option<ColorValue> {
    lighten_color(parse_color(literal)?)
}

/// Darken a light background or border color literal set on `property`.
pub fn darken(literal: &str, property: &str) -> Option<ColorValue> {
    darken_color(parse_color(literal)?, DarkenProfile::for_property(property))
}

/// Apply whichever transform `category` calls for.
pub fn transform(literal: &str, property: &str, category: Category) -> Option<ColorValue> {
    match category {
        Category::Foreground => lighten(literal),
        Category::Background => darken(literal, property),
    }
}

pub fn lighten_color(color: ColorValue) -> Option<ColorValue> {
    if color.is_transparent() {
        return None;
    }
    let before_hsl = color.to_hsl();
    if before_hsl.lightness >= 0.5 {
        return None;
    }
    let before_hsv = color.to_hsv();

    let lightened = hsl_to_rgb(Hsl {
        lightness: (before_hsl.lightness + LIGHTEN_FACTOR - 1.0) / LIGHTEN_FACTOR,
        ..before_hsl
    });
    let after_hsv = rgb_to_hsv(lightened);
    // Averaging saturation keeps vivid hues from washing out.
    let rgb = hsv_to_rgb(Hsv {
        saturation: f64::midpoint(before_hsv.saturation, after_hsv.saturation),
        ..after_hsv
    });
    Some(color.with_channels(rgb))
}

pub fn darken_color(color: ColorValue, profile: DarkenProfile) -> Option<ColorValue> {
    if color.is_transparent() {
        return None;
    }
    let hsv = color.to_hsv();
    if hsv.value <= 0.5 {
        return None;
    }
    let rgb = hsv_to_rgb(Hsv {
        value: hsv.value / profile.factor(hsv.saturation),
        ..hsv
    });
    Some(color.with_channels(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_black_to_light_gray() {
        assert_eq!(lighten("#000"), Some(ColorValue::rgb(204, 204, 204)));
    }

    #[test]
    fn lighten_skips_light_colors() {
        assert_eq!(lighten("#808080"), None);
        assert_eq!(lighten("white"), None);
        assert_eq!(lighten("rgb(255, 255, 0)"), None);
        assert!(lighten("rgb(127, 127, 127)").is_some());
    }

    #[test]
    fn lighten_raises_lightness_and_keeps_hue_family() -> Result<(), &'static str> {
        let navy = ColorValue::rgb(0, 0, 128);
        let lightened = lighten_color(navy).ok_or("navy should lighten")?;
        assert!(lightened.to_hsl().lightness >= 0.5);
        assert!(lightened.blue > lightened.red);
        assert!(lightened.blue > lightened.green);
        Ok(())
    }

    #[test]
    fn darken_white_surface_and_border() {
        assert_eq!(
            darken("#fff", "background-color"),
            Some(ColorValue::rgb(41, 41, 41))
        );
        assert_eq!(
            darken("#fff", "border-top-color"),
            Some(ColorValue::rgb(85, 85, 85))
        );
    }

    #[test]
    fn border_darkens_less_than_background() -> Result<(), &'static str> {
        let literal = "rgb(230, 220, 210)";
        let border = darken(literal, "border-top-color").ok_or("border")?;
        let surface = darken(literal, "background-color").ok_or("surface")?;
        assert!(border.to_hsv().value > surface.to_hsv().value);
        Ok(())
    }

    #[test]
    fn darken_skips_dark_colors() {
        assert_eq!(darken("rgb(127, 127, 127)", "background-color"), None);
        assert_eq!(darken("#000", "background-color"), None);
        assert!(darken("#808080", "background-color").is_some());
    }

    #[test]
    fn fully_saturated_keeps_brightness() {
        assert_eq!(
            darken("rgb(255, 0, 0)", "background-color"),
            Some(ColorValue::rgb(255, 0, 0))
        );
    }

    #[test]
    fn zero_alpha_short_circuits() {
        assert_eq!(darken("rgba(10,10,10,0)", "background-color"), None);
        assert_eq!(lighten("rgba(240,240,240,0)"), None);
        assert_eq!(darken("transparent", "background-color"), None);
    }

    #[test]
    fn unparseable_is_no_change() {
        assert_eq!(lighten(""), None);
        assert_eq!(darken("currentcolor", "background-color"), None);
        assert_eq!(darken("bogus-color", "border-left-color"), None);
    }

    #[test]
    fn alpha_is_preserved_exactly() -> Result<(), &'static str> {
        let darkened = darken("rgba(250, 250, 250, 0.37)", "background-color").ok_or("dark")?;
        assert!((darkened.alpha - 0.37).abs() < f64::EPSILON);
        assert_eq!(darkened.to_string(), "rgba(40, 40, 40, 0.37)");

        let lightened = lighten("#10203080").ok_or("light")?;
        assert!((lightened.alpha - 128.0 / 255.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn factor_bounds() {
        assert!((DarkenProfile::Surface.factor(0.0) - 6.2).abs() < 1e-12);
        assert!((DarkenProfile::Surface.factor(1.0) - 1.0).abs() < 1e-12);
        assert!((DarkenProfile::Border.factor(0.0) - 3.0).abs() < 1e-12);
    }
}
