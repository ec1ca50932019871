//! Deterministic per-app colors.

use std::fmt;

/// Saturation shared by every app color, in percent.
const SATURATION: u8 = 55;

/// Lightness shared by every app color, in percent.
const LIGHTNESS: u8 = 55;

/// An HSL color with integer components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsl {
    /// Hue in degrees, `0..360`.
    pub hue: u16,
    /// Percent, `0..=100`.
    pub saturation: u8,
    /// Percent, `0..=100`.
    pub lightness: u8,
}

impl Hsl {
    /// Converts to 8-bit sRGB.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "channels are clamped to 0..=255 before the cast"
    )]
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let h = f64::from(self.hue) / 60.0;
        let s = f64::from(self.saturation) / 100.0;
        let l = f64::from(self.lightness) / 100.0;

        let chroma = (1.0 - 2.0f64.mul_add(l, -1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h {
            h if h < 1.0 => (chroma, x, 0.0),
            h if h < 2.0 => (x, chroma, 0.0),
            h if h < 3.0 => (0.0, chroma, x),
            h if h < 4.0 => (0.0, x, chroma),
            h if h < 5.0 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Derives a stable color from an app name.
///
/// The hash walks the name's UTF-16 code units. Only the shift is taken over
/// the low 32 bits; the subtraction and addition keep the full value.
pub fn app_color(name: &str) -> Hsl {
    let hash = name.encode_utf16().fold(0i64, |hash, unit| {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the shift operates on the low 32 bits"
        )]
        let shifted = (hash as i32).wrapping_shl(5);
        i64::from(unit) + i64::from(shifted) - hash
    });
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "rem_euclid(360) is always in 0..360"
    )]
    let hue = hash.rem_euclid(360) as u16;
    Hsl {
        hue,
        saturation: SATURATION,
        lightness: LIGHTNESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_color() {
        assert_eq!(app_color("Safari"), app_color("Safari"));
        assert_ne!(app_color("Safari"), app_color("Slack"));
    }

    #[test]
    fn hue_is_in_range() {
        for name in ["", "a", "Visual Studio Code", "日本語", "1Password"] {
            assert!(app_color(name).hue < 360, "{name}");
        }
    }

    #[test]
    fn known_hash_values() {
        // "a" hashes to 97; "ab" to 97 * 31 + 98 = 3105.
        assert_eq!(app_color("a").hue, 97);
        assert_eq!(app_color("ab").hue, 3105 % 360);
        assert_eq!(app_color("").hue, 0);
    }

    #[test]
    fn long_names_keep_full_precision() {
        // Hashes past 2^31 must not wrap outside the shift.
        assert_eq!(app_color("Safari").hue, 192);
        assert_eq!(app_color("FooBar").hue, 133);
        assert_eq!(app_color("Messages").hue, 308);
        assert_eq!(app_color("Calendar").hue, 150);
        assert_eq!(app_color("Raycast").hue, 65);
    }

    #[test]
    fn css_rendering() {
        let color = Hsl {
            hue: 200,
            saturation: 55,
            lightness: 55,
        };
        assert_eq!(color.to_string(), "hsl(200, 55%, 55%)");
    }

    #[test]
    fn rgb_conversion() {
        let red = Hsl {
            hue: 0,
            saturation: 100,
            lightness: 50,
        };
        assert_eq!(red.to_rgb(), (255, 0, 0));
        let gray = Hsl {
            hue: 120,
            saturation: 0,
            lightness: 50,
        };
        assert_eq!(gray.to_rgb(), (128, 128, 128));
    }
}
