//! Color literal parsing.
//!
//! Spec: <https://www.w3.org/TR/css-color-4/#typedef-color>
//! Spec: <https://www.w3.org/TR/css-color-4/#legacy-color-values>
use csscolorparser::Color;

use crate::ColorValue;

/// Parse a CSS color literal into an RGBA quad.
///
/// Supports `transparent`, hex forms (`#rgb`/`#rgba`/`#rrggbb`/`#rrggbbaa`),
/// `rgb()`/`rgba()` with comma or space separated number or percentage
/// channels (optionally `/ alpha`), and named colors.
///
/// Returns `None` for anything else, including the empty string.
pub fn parse_color(literal: &str) -> Option<ColorValue> {
    let trimmed = literal.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.eq_ignore_ascii_case("transparent") {
        return Some(ColorValue::TRANSPARENT);
    }
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = trimmed.to_ascii_lowercase();
    if let Some(args) = functional_args(&lower) {
        return parse_rgb_args(args);
    }
    parse_named(&lower)
}

fn functional_args(lower: &str) -> Option<&str> {
    let body = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?;
    body.strip_suffix(')')
}

fn parse_hex(hex: &str) -> Option<ColorValue> {
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let digits: Vec<u8> = hex
        .bytes()
        .filter_map(|byte| char::from(byte).to_digit(16))
        .map(|digit| digit as u8)
        .collect();
    let pair = |hi: u8, lo: u8| (hi << 4) | lo;

    let [red, green, blue, alpha] = match digits.as_slice() {
        &[red, green, blue] => [red * 17, green * 17, blue * 17, 255],
        &[red, green, blue, alpha] => [red * 17, green * 17, blue * 17, alpha * 17],
        &[r_hi, r_lo, g_hi, g_lo, b_hi, b_lo] => {
            [pair(r_hi, r_lo), pair(g_hi, g_lo), pair(b_hi, b_lo), 255]
        }
        &[r_hi, r_lo, g_hi, g_lo, b_hi, b_lo, a_hi, a_lo] => [
            pair(r_hi, r_lo),
            pair(g_hi, g_lo),
            pair(b_hi, b_lo),
            pair(a_hi, a_lo),
        ],
        _ => return None,
    };
    let alpha = if alpha == 255 {
        1.0
    } else {
        f64::from(alpha) / 255.0
    };
    Some(ColorValue::rgba(red, green, blue, alpha))
}

fn parse_number(token: &str) -> Option<f64> {
    let number = token.parse::<f64>().ok()?;
    number.is_finite().then_some(number)
}

fn parse_channel(token: &str) -> Option<u8> {
    let unit = match token.strip_suffix('%') {
        Some(percent) => parse_number(percent)? / 100.0 * 255.0,
        None => parse_number(token)?,
    };
    Some(unit.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(token: &str) -> Option<f64> {
    let alpha = match token.strip_suffix('%') {
        Some(percent) => parse_number(percent)? / 100.0,
        None => parse_number(token)?,
    };
    Some(alpha.clamp(0.0, 1.0))
}

fn parse_rgb_args(args: &str) -> Option<ColorValue> {
    let (channels, slash_alpha) = match args.split_once('/') {
        Some((channels, alpha)) => (channels, Some(alpha.trim())),
        None => (args, None),
    };
    let tokens: Vec<&str> = channels
        .split(|sep: char| sep == ',' || sep.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .collect();

    let (red, green, blue, alpha_token) = match (tokens.as_slice(), slash_alpha) {
        (&[red, green, blue], alpha) => (red, green, blue, alpha),
        (&[red, green, blue, alpha], None) => (red, green, blue, Some(alpha)),
        _ => return None,
    };
    let alpha = match alpha_token {
        Some(token) => parse_alpha(token)?,
        None => 1.0,
    };
    Some(ColorValue::rgba(
        parse_channel(red)?,
        parse_channel(green)?,
        parse_channel(blue)?,
        alpha,
    ))
}

/// Resolve a bare identifier against the named color table.
fn parse_named(ident: &str) -> Option<ColorValue> {
    let is_ident = ident
        .bytes()
        .all(|byte| byte.is_ascii_alphabetic() || byte == b'-');
    // The underlying parser also accepts unprefixed hex, which no named color spells.
    if !is_ident || ident.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let parsed: Color = ident.parse().ok()?;
    let [red, green, blue, alpha] = parsed.to_rgba8();
    let alpha = if alpha == 255 {
        1.0
    } else {
        f64::from(alpha) / 255.0
    };
    Some(ColorValue::rgba(red, green, blue, alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_unparseable() {
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("   "), None);
    }

    #[test]
    fn transparent_keyword() {
        assert_eq!(parse_color("Transparent"), Some(ColorValue::TRANSPARENT));
    }

    #[test]
    fn hex_shorthand_expands() {
        assert_eq!(parse_color("#abc"), parse_color("#aabbcc"));
        assert_eq!(parse_color("#abc"), Some(ColorValue::rgb(0xaa, 0xbb, 0xcc)));
        assert_eq!(parse_color("#abcd"), parse_color("#aabbccdd"));
    }

    #[test]
    fn hex_alpha() {
        let color = parse_color("#00000080");
        assert_eq!(color, Some(ColorValue::rgba(0, 0, 0, 128.0 / 255.0)));
    }

    #[test]
    fn malformed_hex() {
        assert_eq!(parse_color("#ab"), None);
        assert_eq!(parse_color("#abcde"), None);
        assert_eq!(parse_color("#ggg"), None);
    }

    #[test]
    fn rgb_functional_forms() {
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(ColorValue::rgb(1, 2, 3)));
        assert_eq!(parse_color("RGB(1 2 3)"), Some(ColorValue::rgb(1, 2, 3)));
        assert_eq!(
            parse_color("rgba(10, 20, 30, 0.3)"),
            Some(ColorValue::rgba(10, 20, 30, 0.3))
        );
        assert_eq!(
            parse_color("rgb(100% 0% 50% / 25%)"),
            Some(ColorValue::rgba(255, 0, 128, 0.25))
        );
        assert_eq!(
            parse_color("rgb(50%, 50%, 50%)"),
            Some(ColorValue::rgb(128, 128, 128))
        );
        assert_eq!(
            parse_color("rgba(300, -4, 12.6, 2)"),
            Some(ColorValue::rgba(255, 0, 13, 1.0))
        );
    }

    #[test]
    fn rgb_wrong_arity() {
        assert_eq!(parse_color("rgb(1, 2)"), None);
        assert_eq!(parse_color("rgb(1, 2, 3, 4, 5)"), None);
        assert_eq!(parse_color("rgb(a, b, c)"), None);
    }

    #[test]
    fn named_colors() {
        assert_eq!(parse_color("red"), Some(ColorValue::rgb(255, 0, 0)));
        assert_eq!(parse_color("RebeccaPurple"), Some(ColorValue::rgb(102, 51, 153)));
        assert_eq!(parse_color("bogus-color"), None);
        assert_eq!(parse_color("inherit"), None);
        assert_eq!(parse_color("fade"), None);
    }
}
