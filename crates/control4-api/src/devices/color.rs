// Color conversions for color-capable lights
//
// Control4 color lights take a CIE 1931 xy target. RGB input is treated as
// sRGB (D65); color temperature uses the Kim et al. cubic spline
// approximation of the Planckian locus, valid for 1667 K..25000 K.

use crate::error::Error;

/// D65 white point, used for pure black where xy is undefined.
pub const D65_WHITE: (f64, f64) = (0.3127, 0.3290);

pub const MIN_KELVIN: u32 = 1667;
pub const MAX_KELVIN: u32 = 25000;

/// Parse `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB`.
pub fn hex_to_rgb(input: &str) -> Result<(u8, u8, u8), Error> {
    let s = input.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    let expanded: String = match s.len() {
        3 => s.chars().flat_map(|c| [c, c]).collect(),
        6 => s.to_owned(),
        _ => {
            return Err(Error::InvalidColor {
                input: input.to_owned(),
                reason: "expected RRGGBB, #RRGGBB, RGB or #RGB",
            });
        }
    };

    let channel = |range: std::ops::Range<usize>| {
        expanded
            .get(range)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| Error::InvalidColor {
                input: input.to_owned(),
                reason: "not a hexadecimal color",
            })
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB 0..255 to CIE xy, rounded to 4 decimals.
pub fn rgb_to_xy(r: u8, g: u8, b: u8) -> (f64, f64) {
    let r = srgb_to_linear(f64::from(r) / 255.0);
    let g = srgb_to_linear(f64::from(g) / 255.0);
    let b = srgb_to_linear(f64::from(b) / 255.0);

    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

    let sum = x + y + z;
    if sum <= 1e-9 {
        return D65_WHITE;
    }
    (round4(x / sum), round4(y / sum))
}

/// Correlated color temperature to CIE xy, rounded to 4 decimals.
///
/// Out-of-range temperatures are clamped to 1667 K..25000 K.
pub fn kelvin_to_xy(kelvin: u32) -> (f64, f64) {
    let k = f64::from(kelvin.clamp(MIN_KELVIN, MAX_KELVIN));
    let (k2, k3) = (k * k, k * k * k);

    let x = if k <= 4000.0 {
        -0.266_123_9e9 / k3 - 0.234_358_0e6 / k2 + 0.877_695_6e3 / k + 0.179_910
    } else {
        -3.025_846_9e9 / k3 + 2.107_037_9e6 / k2 + 0.222_634_7e3 / k + 0.240_390
    };

    let (x2, x3) = (x * x, x * x * x);
    let y = if k <= 2222.0 {
        -1.106_381_4 * x3 - 1.348_110_20 * x2 + 2.185_558_32 * x - 0.202_196_83
    } else if k <= 4000.0 {
        -0.954_947_6 * x3 - 1.374_185_93 * x2 + 2.091_370_15 * x - 0.167_488_67
    } else {
        3.081_758_0 * x3 - 5.873_386_70 * x2 + 3.751_129_97 * x - 0.370_014_83
    };

    (round4(x), round4(y))
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-4 && (actual.1 - expected.1).abs() < 1e-4,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn primaries_map_to_srgb_gamut_corners() {
        close(rgb_to_xy(255, 0, 0), (0.6401, 0.3300));
        close(rgb_to_xy(0, 255, 0), (0.3000, 0.6000));
        close(rgb_to_xy(0, 0, 255), (0.1500, 0.0600));
    }

    #[test]
    fn white_and_black_land_on_d65() {
        close(rgb_to_xy(255, 255, 255), D65_WHITE);
        assert_eq!(rgb_to_xy(0, 0, 0), D65_WHITE);
    }

    #[test]
    fn kelvin_follows_planckian_locus() {
        close(kelvin_to_xy(2000), (0.5269, 0.4133));
        close(kelvin_to_xy(2700), (0.4593, 0.4107));
        close(kelvin_to_xy(4000), (0.3805, 0.3767));
        close(kelvin_to_xy(6500), (0.3135, 0.3237));
    }

    #[test]
    fn kelvin_is_clamped() {
        assert_eq!(kelvin_to_xy(1000), kelvin_to_xy(MIN_KELVIN));
        close(kelvin_to_xy(1000), (0.5646, 0.4029));
        assert_eq!(kelvin_to_xy(30_000), kelvin_to_xy(MAX_KELVIN));
        close(kelvin_to_xy(30_000), (0.2525, 0.2523));
    }

    #[test]
    fn hex_forms() {
        assert_eq!(hex_to_rgb("#ff8000").unwrap(), (255, 128, 0));
        assert_eq!(hex_to_rgb("FF8000").unwrap(), (255, 128, 0));
        assert_eq!(hex_to_rgb("#0f8").unwrap(), (0, 255, 136));
        assert_eq!(hex_to_rgb(" abc ").unwrap(), (0xaa, 0xbb, 0xcc));
    }

    #[test]
    fn bad_hex_is_rejected() {
        for input in ["", "#12345", "#gggggg", "#1234567", "ééé"] {
            let err = hex_to_rgb(input).unwrap_err();
            assert!(matches!(err, Error::InvalidColor { .. }), "{input}");
        }
    }
}
