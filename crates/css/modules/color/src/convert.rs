//! RGB <-> HSL and RGB <-> HSV conversions.
//!
//! Hue is measured in normalized turns (`0.0..1.0`); saturation, lightness and
//! value are unit-interval fractions. Rounding to integer channels happens only
//! when converting back to RGB.
//!
//! Spec: <https://www.w3.org/TR/css-color-4/#hsl-to-rgb>

use crate::Rgb8;

/// Hue, saturation, lightness.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Hue, saturation, value (brightness).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Linearly remap `input` from `[from_min, from_max]` onto `[to_min, to_max]`.
#[inline]
pub fn map_range(input: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    to_min + (to_max - to_min) * ((input - from_min) / (from_max - from_min))
}

#[inline]
fn unit_channels(rgb: Rgb8) -> [f64; 3] {
    rgb.map(|channel| f64::from(channel) / 255.0)
}

#[inline]
fn to_channel(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn wrap_hue(hue: f64) -> f64 {
    let wrapped = hue.rem_euclid(1.0);
    if wrapped.is_finite() { wrapped } else { 0.0 }
}

/// Hue shared by HSL and HSV; `0` for achromatic input.
#[allow(clippy::float_cmp, reason = "max is one of the channels by construction")]
fn hue_of(red: f64, green: f64, blue: f64, max: f64, delta: f64) -> f64 {
    if delta <= 0.0 {
        return 0.0;
    }
    let sector = if max == red {
        let raw = (green - blue) / delta;
        if raw < 0.0 { raw + 6.0 } else { raw }
    } else if max == green {
        2.0 + (blue - red) / delta
    } else {
        4.0 + (red - green) / delta
    };
    sector / 6.0
}

pub fn rgb_to_hsl(rgb: Rgb8) -> Hsl {
    let [red, green, blue] = unit_channels(rgb);
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let delta = max - min;
    let lightness = (max + min) / 2.0;
    let denominator = 1.0 - (2.0 * lightness - 1.0).abs();
    let saturation = if delta <= 0.0 || denominator <= 0.0 {
        0.0
    } else {
        delta / denominator
    };
    Hsl {
        hue: hue_of(red, green, blue, max, delta),
        saturation,
        lightness,
    }
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb8 {
    let Hsl {
        hue,
        saturation,
        lightness,
    } = hsl;
    if saturation <= 0.0 {
        let gray = to_channel(lightness);
        return [gray, gray, gray];
    }

    let upper = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let lower = 2.0 * lightness - upper;
    let hue = wrap_hue(hue);
    let component = |offset: f64| {
        let turn = wrap_hue(hue + offset);
        let unit = if turn < 1.0 / 6.0 {
            lower + (upper - lower) * 6.0 * turn
        } else if turn < 1.0 / 2.0 {
            upper
        } else if turn < 2.0 / 3.0 {
            lower + (upper - lower) * (2.0 / 3.0 - turn) * 6.0
        } else {
            lower
        };
        to_channel(unit)
    };
    [component(1.0 / 3.0), component(0.0), component(-1.0 / 3.0)]
}

pub fn rgb_to_hsv(rgb: Rgb8) -> Hsv {
    let [red, green, blue] = unit_channels(rgb);
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let delta = max - min;
    Hsv {
        hue: hue_of(red, green, blue, max, delta),
        saturation: if max <= 0.0 { 0.0 } else { delta / max },
        value: max,
    }
}

pub fn hsv_to_rgb(hsv: Hsv) -> Rgb8 {
    let Hsv {
        hue,
        saturation,
        value,
    } = hsv;
    let scaled = wrap_hue(hue) * 6.0;
    let sector = scaled.floor();
    let fraction = scaled - sector;
    let low = value * (1.0 - saturation);
    let falling = value * (1.0 - fraction * saturation);
    let rising = value * (1.0 - (1.0 - fraction) * saturation);
    let (red, green, blue) = match (sector as u8) % 6 {
        0 => (value, rising, low),
        1 => (falling, value, low),
        2 => (low, value, rising),
        3 => (low, falling, value),
        4 => (rising, low, value),
        _ => (value, low, falling),
    };
    [to_channel(red), to_channel(green), to_channel(blue)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within_one(left: Rgb8, right: Rgb8) -> bool {
        left.iter()
            .zip(right.iter())
            .all(|(lhs, rhs)| lhs.abs_diff(*rhs) <= 1)
    }

    #[test]
    fn hsl_round_trip_within_one() {
        for red in (0..=255_u8).step_by(5) {
            for green in (0..=255_u8).step_by(15) {
                for blue in (0..=255_u8).step_by(17) {
                    let rgb = [red, green, blue];
                    let back = hsl_to_rgb(rgb_to_hsl(rgb));
                    assert!(within_one(rgb, back), "{rgb:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn hsv_round_trip_within_one() {
        for red in (0..=255_u8).step_by(5) {
            for green in (0..=255_u8).step_by(15) {
                for blue in (0..=255_u8).step_by(17) {
                    let rgb = [red, green, blue];
                    let back = hsv_to_rgb(rgb_to_hsv(rgb));
                    assert!(within_one(rgb, back), "{rgb:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn achromatic_is_gray() {
        let hsl = rgb_to_hsl([128, 128, 128]);
        assert!(hsl.saturation.abs() < f64::EPSILON);
        assert_eq!(hsl_to_rgb(hsl), [128, 128, 128]);
        let hsv = rgb_to_hsv([0, 0, 0]);
        assert!(hsv.saturation.abs() < f64::EPSILON);
        assert!(hsv.value.abs() < f64::EPSILON);
    }

    #[test]
    fn primaries() {
        let red = rgb_to_hsl([255, 0, 0]);
        assert!(red.hue.abs() < 1e-9);
        assert!((red.saturation - 1.0).abs() < 1e-9);
        assert!((red.lightness - 0.5).abs() < 1e-9);

        let blue = rgb_to_hsv([0, 0, 255]);
        assert!((blue.hue - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(hsv_to_rgb(blue), [0, 0, 255]);
    }

    #[test]
    fn hue_wraps_at_one_turn() {
        let base = Hsv {
            hue: 0.25,
            saturation: 0.8,
            value: 0.9,
        };
        let wrapped = Hsv { hue: 1.25, ..base };
        assert_eq!(hsv_to_rgb(base), hsv_to_rgb(wrapped));
        let hsl = Hsl {
            hue: -0.75,
            saturation: 0.5,
            lightness: 0.5,
        };
        assert_eq!(hsl_to_rgb(hsl), hsl_to_rgb(Hsl { hue: 0.25, ..hsl }));
    }

    #[test]
    fn map_range_endpoints() {
        assert!((map_range(0.0, 0.0, 1.0, 1.0, 6.2) - 1.0).abs() < 1e-12);
        assert!((map_range(1.0, 0.0, 1.0, 1.0, 6.2) - 6.2).abs() < 1e-12);
        assert!((map_range(0.5, 0.0, 1.0, 1.0, 3.0) - 2.0).abs() < 1e-12);
    }
}
