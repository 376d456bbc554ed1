//! Colors with straight (non-premultiplied) alpha.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// RGBA color, all channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}' (expected hsl(h, s%, l%), hsla(h, s%, l%, a) or #rrggbb)")]
pub struct ParseColorError(String);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// `hue` in degrees, `saturation` and `lightness` in `0.0..=1.0`.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Self::new(r + m, g + m, b + m, 1.0)
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= f32::EPSILON
    }

    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }

    /// Source-over compositing of `self` onto `dst`.
    #[must_use]
    pub fn over(self, dst: Rgba) -> Rgba {
        let sa = self.a.clamp(0.0, 1.0);
        let da = dst.a.clamp(0.0, 1.0);
        let out_a = sa + da * (1.0 - sa);
        if out_a <= f32::EPSILON {
            return Rgba::TRANSPARENT;
        }
        let mix = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / out_a;
        Rgba::new(
            mix(self.r, dst.r),
            mix(self.g, dst.g),
            mix(self.b, dst.b),
            out_a,
        )
    }

    /// Linear interpolation, `t` clamped to `0.0..=1.0`.
    #[must_use]
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let l = |a: f32, b: f32| a + (b - a) * t;
        Rgba::new(
            l(self.r, other.r),
            l(self.g, other.g),
            l(self.b, other.b),
            l(self.a, other.a),
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "rgba({}, {}, {}, {:.2})", r, g, b, self.a)
        }
    }
}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let trimmed = s.trim().to_ascii_lowercase();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() != 6 && hex.len() != 8 {
                return Err(err());
            }
            let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            let (r, g, b) = (byte(0).ok_or_else(err)?, byte(2).ok_or_else(err)?, byte(4).ok_or_else(err)?);
            let mut color = Rgba::from_rgb8(r, g, b);
            if hex.len() == 8 {
                color.a = f32::from(byte(6).ok_or_else(err)?) / 255.0;
            }
            return Ok(color);
        }

        let (args, with_alpha) = if let Some(rest) = trimmed.strip_prefix("hsla(") {
            (rest, true)
        } else if let Some(rest) = trimmed.strip_prefix("hsl(") {
            (rest, false)
        } else {
            return Err(err());
        };
        let args = args.strip_suffix(')').ok_or_else(err)?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != if with_alpha { 4 } else { 3 } {
            return Err(err());
        }
        let hue = parse_hue(parts[0]).ok_or_else(err)?;
        let saturation = parse_percent(parts[1]).ok_or_else(err)?;
        let lightness = parse_percent(parts[2]).ok_or_else(err)?;
        let mut color = Rgba::from_hsl(hue, saturation, lightness);
        if with_alpha {
            color = color.with_alpha(parse_alpha(parts[3]).ok_or_else(err)?);
        }
        Ok(color)
    }
}

fn parse_number(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Degrees, optionally suffixed with `deg`.
fn parse_hue(s: &str) -> Option<f32> {
    parse_number(s.strip_suffix("deg").unwrap_or(s))
}

/// `NN%` as a fraction; the percent sign is required.
fn parse_percent(s: &str) -> Option<f32> {
    parse_number(s.strip_suffix('%')?).map(|v| v / 100.0)
}

fn parse_alpha(s: &str) -> Option<f32> {
    match s.strip_suffix('%') {
        Some(pct) => parse_number(pct).map(|v| v / 100.0),
        None => parse_number(s),
    }
}
