//! Card color palette shared by the Vello painter and the Canvas2D bridge.

use cb_core::model::CardColor;

/// RGBA colors for one palette slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPalette {
    pub fill: [u8; 4],
    pub border: [u8; 4],
    pub header: [u8; 4],
}

impl CardPalette {
    const fn new(fill: u32, border: u32, header: u32) -> Self {
        Self {
            fill: rgb(fill),
            border: rgb(border),
            header: rgb(header),
        }
    }
}

const fn rgb(hex: u32) -> [u8; 4] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xFF]
}

/// Palette for a card color tag.
pub fn palette(color: CardColor) -> CardPalette {
    match color {
        CardColor::Default => CardPalette::new(0xFFFFFF, 0xD1D1D6, 0xF2F2F7),
        CardColor::Red => CardPalette::new(0xFFF0F0, 0xFF6B6B, 0xFFD6D6),
        CardColor::Orange => CardPalette::new(0xFFF5EB, 0xFFA94D, 0xFFE3C4),
        CardColor::Yellow => CardPalette::new(0xFFFBE6, 0xFFD43B, 0xFFF0A8),
        CardColor::Green => CardPalette::new(0xEFFAF1, 0x51CF66, 0xC8F0D0),
        CardColor::Blue => CardPalette::new(0xEDF4FF, 0x4DABF7, 0xC9E2FD),
        CardColor::Purple => CardPalette::new(0xF5F0FF, 0x9775FA, 0xDCD0FC),
    }
}

/// CSS `rgba()` string for an RGBA quadruple.
pub fn css(rgba: [u8; 4]) -> String {
    let [r, g, b, a] = rgba;
    format!("rgba({r}, {g}, {b}, {:.3})", a as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_color_has_distinct_border() {
        let borders: Vec<[u8; 4]> = CardColor::ALL.iter().map(|c| palette(*c).border).collect();
        for (i, a) in borders.iter().enumerate() {
            for b in &borders[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn css_format() {
        assert_eq!(css([255, 0, 16, 255]), "rgba(255, 0, 16, 1.000)");
    }
}
