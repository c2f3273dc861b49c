use std::fmt;

/// Native buffer dimensions of a panel, as reported by its driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    pub width: u32,
    pub height: u32,
}

impl DisplayGeometry {
    /// Waveshare 2.13" black/white panels (V1 through V4): 122x250 portrait
    pub const EPD_2IN13: Self = Self {
        width: 122,
        height: 250,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size of a packed 1-bit frame (rows padded to whole bytes)
    pub fn frame_bytes(&self) -> usize {
        eink_palette::bilevel::row_bytes(self.width) * self.height as usize
    }

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

impl fmt::Display for DisplayGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epd_2in13_frame_bytes() {
        // 122 pixels pad to 16 bytes per row
        assert_eq!(DisplayGeometry::EPD_2IN13.frame_bytes(), 16 * 250);
    }

    #[test]
    fn test_matches() {
        let g = DisplayGeometry::new(122, 250);
        assert!(g.matches(122, 250));
        assert!(!g.matches(250, 122));
        assert_eq!(g.to_string(), "122x250");
    }
}
