//! Autumn palette shared by every leaf

use rand::Rng;

/// Fill colors a leaf may be assigned at spawn
pub const AUTUMN_PALETTE: [&str; 24] = [
    "#FF6B35", "#FF8C42", "#FFC14F", "#FFE66D", "#D32F2F", "#FF5722",
    "#FF9800", "#FFC107", "#8BC34A", "#4CAF50", "#2E7D32", "#689F38",
    "#827717", "#F57C00", "#E65100", "#BF360C", "#CD853F", "#D2691E",
    "#DEB887", "#F4A460", "#DAA520", "#B8860B", "#A0522D", "#8B4513",
];

/// Index into [`AUTUMN_PALETTE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PaletteColor(u8);

impl PaletteColor {
    /// Wraps out-of-range indices back into the palette
    pub fn from_index(index: usize) -> Self {
        Self((index % AUTUMN_PALETTE.len()) as u8)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_index(rng.gen_range(0..AUTUMN_PALETTE.len()))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn hex(self) -> &'static str {
        AUTUMN_PALETTE[self.index()]
    }
}

/// Palette as a JSON array of CSS colors
pub fn palette_json() -> serde_json::Result<String> {
    serde_json::to_string(&AUTUMN_PALETTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_from_index_wraps() {
        assert_eq!(PaletteColor::from_index(24), PaletteColor::from_index(0));
        assert_eq!(PaletteColor::from_index(3).hex(), "#FFE66D");
    }

    #[test]
    fn test_random_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(PaletteColor::random(&mut rng).index() < AUTUMN_PALETTE.len());
        }
    }

    #[test]
    fn test_palette_json() {
        let json = palette_json().unwrap();
        let parsed: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, AUTUMN_PALETTE);
        assert!(json.starts_with("[\"#FF6B35\""));
        assert!(json.ends_with("\"#8B4513\"]"));
        assert_eq!(json.matches('#').count(), AUTUMN_PALETTE.len());
    }
}
