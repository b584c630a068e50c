//! Leaf silhouette and bark colours

/// Size of the leaf artwork's coordinate box
pub const LEAF_VIEWBOX: (f64, f64) = (18.0, 22.0);

/// Maple-like leaf outline
pub const LEAF_OUTLINE: &str = "M9 1.5C8.2 2.1 7.1 3.2 6.5 4.5L4.8 4.8C3.9 5.2 3.2 6.1 2.8 7.1C2.5 8.2 2.6 9.4 3.2 10.4L4.2 11.8C4.6 12.5 4.8 13.3 4.7 14.1C4.6 14.8 4.8 15.5 5.3 16.1L6.8 17.8C7.4 18.5 8.2 18.9 9 18.9C9.8 18.9 10.6 18.5 11.2 17.8L12.7 16.1C13.2 15.5 13.4 14.8 13.3 14.1C13.2 13.3 13.4 12.5 13.8 11.8L14.8 10.4C15.4 9.4 15.5 8.2 15.2 7.1C14.8 6.1 14.1 5.2 13.2 4.8L11.5 4.5C10.9 3.2 9.8 2.1 9 1.5Z";

pub const LEAF_MIDRIB: &str = "M9 2L9 18.5";

pub const LEAF_VEINS: &str = "M9 6L6.5 8.5M9 6L11.5 8.5M9 10L6 12.5M9 10L12 12.5M9 14L7 16M9 14L11 16";

pub const LEAF_STEM: &str = "M9 18.5L9 20.5";

/// Small notches along the edge, stroked in the leaf's own colour
pub const LEAF_SERRATION: &str = "M4.8 4.8L4.5 5.2L4.8 5.6M13.2 4.8L13.5 5.2L13.2 5.6M4.2 11.8L3.8 12.2L4.2 12.6M14.8 10.4L15.2 10.8L14.8 11.2";

pub const VEIN_COLOR: &str = "#2D5016";
pub const STEM_COLOR: &str = "#3A2F1A";

const TRUNK_BARK: Rgb = Rgb { r: 0x3A, g: 0x2F, b: 0x1A };
const TWIG_BARK: Rgb = Rgb { r: 0x8B, g: 0x6B, b: 0x4A };

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Scale brightness, saturating at white
    pub fn shade(self, factor: f32) -> Rgb {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
        let scale = |c: u8| (c as f32 * factor).round().min(255.0) as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }

    pub fn css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Bark colour for a branch: dark at the trunk, lighter towards the twigs
pub fn bark_color(level: u32, max_level: u32) -> Rgb {
    if max_level == 0 {
        return TRUNK_BARK;
    }
    TRUNK_BARK.lerp(TWIG_BARK, level as f32 / max_level as f32)
}

/// Slow per-leaf brightness flicker around 0.9
pub fn leaf_brightness(time_ms: f64, id: u64) -> f32 {
    0.9 + ((time_ms / 5000.0 + id as f64).sin() * 0.08) as f32
}
