//! Bitmap fonts for the 8-pixel-tall matrix.

/// Horizontal advance per character, in pixels, for every font.
pub const GLYPH_PITCH: usize = 8;
/// Glyph height in pixels.
pub const GLYPH_HEIGHT: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Font {
    /// Bold 8x8 digits used for distances and counters.
    Large,
    /// 5x7 ASCII face used for everything else.
    Small,
}

/// One 8x8 bitmap. Row `0` is the top; bit 7 of a row is the leftmost column.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Glyph {
    rows: [u8; GLYPH_HEIGHT],
}

impl Glyph {
    pub const BLANK: Self = Self {
        rows: [0u8; GLYPH_HEIGHT],
    };

    pub const fn from_rows(rows: [u8; GLYPH_HEIGHT]) -> Self {
        Self { rows }
    }

    /// Converts a column-major 5-wide glyph (bit `n` = row `n`) into rows,
    /// left-aligned in the 8-pixel cell.
    pub const fn from_columns(columns: [u8; 5]) -> Self {
        let mut rows = [0u8; GLYPH_HEIGHT];
        let mut col = 0;
        while col < columns.len() {
            let mut row = 0;
            while row < GLYPH_HEIGHT {
                if columns[col] & (1 << row) != 0 {
                    rows[row] |= 0x80 >> col;
                }
                row += 1;
            }
            col += 1;
        }
        Self { rows }
    }

    pub const fn rows(&self) -> &[u8; GLYPH_HEIGHT] {
        &self.rows
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|row| *row == 0)
    }
}

/// Looks up `c` in `font`; characters the font lacks render as [`Glyph::BLANK`].
pub fn glyph(c: char, font: Font) -> Glyph {
    let found = match font {
        Font::Large => large_glyph(c),
        Font::Small => small_columns(c).map(Glyph::from_columns),
    };
    found.unwrap_or(Glyph::BLANK)
}

fn large_glyph(c: char) -> Option<Glyph> {
    let rows = match c {
        '0' => [0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C],
        '1' => [0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x18, 0x7E],
        '2' => [0x3C, 0x66, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x7E],
        '3' => [0x3C, 0x66, 0x06, 0x1C, 0x06, 0x06, 0x66, 0x3C],
        '4' => [0x0C, 0x1C, 0x3C, 0x6C, 0x7E, 0x0C, 0x0C, 0x0C],
        '5' => [0x7E, 0x60, 0x60, 0x7C, 0x06, 0x06, 0x66, 0x3C],
        '6' => [0x3C, 0x66, 0x60, 0x7C, 0x66, 0x66, 0x66, 0x3C],
        '7' => [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x30],
        '8' => [0x3C, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x66, 0x3C],
        '9' => [0x3C, 0x66, 0x66, 0x66, 0x3E, 0x06, 0x66, 0x3C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18],
        _ => return None,
    };
    Some(Glyph::from_rows(rows))
}

fn small_columns(c: char) -> Option<[u8; 5]> {
    let columns = match c {
        'A' => [0x7E, 0x11, 0x11, 0x11, 0x7E],
        'B' => [0x7F, 0x49, 0x49, 0x49, 0x36],
        'C' => [0x3E, 0x41, 0x41, 0x41, 0x22],
        'D' => [0x7F, 0x41, 0x41, 0x22, 0x1C],
        'E' => [0x7F, 0x49, 0x49, 0x49, 0x41],
        'F' => [0x7F, 0x09, 0x09, 0x09, 0x01],
        'G' => [0x3E, 0x41, 0x49, 0x49, 0x7A],
        'H' => [0x7F, 0x08, 0x08, 0x08, 0x7F],
        'I' => [0x00, 0x41, 0x7F, 0x41, 0x00],
        'J' => [0x20, 0x40, 0x41, 0x3F, 0x01],
        'K' => [0x7F, 0x08, 0x14, 0x22, 0x41],
        'L' => [0x7F, 0x40, 0x40, 0x40, 0x40],
        'M' => [0x7F, 0x02, 0x0C, 0x02, 0x7F],
        'N' => [0x7F, 0x04, 0x08, 0x10, 0x7F],
        'O' => [0x3E, 0x41, 0x41, 0x41, 0x3E],
        'P' => [0x7F, 0x09, 0x09, 0x09, 0x06],
        'Q' => [0x3E, 0x41, 0x51, 0x21, 0x5E],
        'R' => [0x7F, 0x09, 0x19, 0x29, 0x46],
        'S' => [0x46, 0x49, 0x49, 0x49, 0x31],
        'T' => [0x01, 0x01, 0x7F, 0x01, 0x01],
        'U' => [0x3F, 0x40, 0x40, 0x40, 0x3F],
        'V' => [0x1F, 0x20, 0x40, 0x20, 0x1F],
        'W' => [0x7F, 0x20, 0x18, 0x20, 0x7F],
        'X' => [0x63, 0x14, 0x08, 0x14, 0x63],
        'Y' => [0x03, 0x04, 0x78, 0x04, 0x03],
        'Z' => [0x61, 0x51, 0x49, 0x45, 0x43],
        'a' => [0x20, 0x54, 0x54, 0x54, 0x78],
        'b' => [0x7F, 0x48, 0x44, 0x44, 0x38],
        'c' => [0x38, 0x44, 0x44, 0x44, 0x20],
        'd' => [0x38, 0x44, 0x44, 0x48, 0x7F],
        'e' => [0x38, 0x54, 0x54, 0x54, 0x18],
        'f' => [0x08, 0x7E, 0x09, 0x01, 0x02],
        'g' => [0x08, 0x14, 0x54, 0x54, 0x3C],
        'h' => [0x7F, 0x08, 0x04, 0x04, 0x78],
        'i' => [0x00, 0x44, 0x7D, 0x40, 0x00],
        'j' => [0x20, 0x40, 0x44, 0x3D, 0x00],
        'k' => [0x7F, 0x10, 0x28, 0x44, 0x00],
        'l' => [0x00, 0x41, 0x7F, 0x40, 0x00],
        'm' => [0x7C, 0x04, 0x18, 0x04, 0x78],
        'n' => [0x7C, 0x08, 0x04, 0x04, 0x78],
        'o' => [0x38, 0x44, 0x44, 0x44, 0x38],
        'p' => [0x7C, 0x14, 0x14, 0x14, 0x08],
        'q' => [0x08, 0x14, 0x14, 0x18, 0x7C],
        'r' => [0x7C, 0x08, 0x04, 0x04, 0x08],
        's' => [0x48, 0x54, 0x54, 0x54, 0x20],
        't' => [0x04, 0x3F, 0x44, 0x40, 0x20],
        'u' => [0x3C, 0x40, 0x40, 0x20, 0x7C],
        'v' => [0x1C, 0x20, 0x40, 0x20, 0x1C],
        'w' => [0x3C, 0x40, 0x30, 0x40, 0x3C],
        'x' => [0x44, 0x28, 0x10, 0x28, 0x44],
        'y' => [0x0C, 0x50, 0x50, 0x50, 0x3C],
        'z' => [0x44, 0x64, 0x54, 0x4C, 0x44],
        '0' => [0x3E, 0x51, 0x49, 0x45, 0x3E],
        '1' => [0x00, 0x42, 0x7F, 0x40, 0x00],
        '2' => [0x42, 0x61, 0x51, 0x49, 0x46],
        '3' => [0x21, 0x41, 0x45, 0x4B, 0x31],
        '4' => [0x18, 0x14, 0x12, 0x7F, 0x10],
        '5' => [0x27, 0x45, 0x45, 0x45, 0x39],
        '6' => [0x3C, 0x4A, 0x49, 0x49, 0x30],
        '7' => [0x01, 0x71, 0x09, 0x05, 0x03],
        '8' => [0x36, 0x49, 0x49, 0x49, 0x36],
        '9' => [0x06, 0x49, 0x49, 0x29, 0x1E],
        '.' => [0x00, 0x60, 0x60, 0x00, 0x00],
        ',' => [0x00, 0x80, 0x60, 0x00, 0x00],
        ';' => [0x00, 0x80, 0x66, 0x00, 0x00],
        ':' => [0x00, 0x36, 0x36, 0x00, 0x00],
        '!' => [0x00, 0x00, 0x5F, 0x00, 0x00],
        '?' => [0x02, 0x01, 0x51, 0x09, 0x06],
        '\'' => [0x00, 0x05, 0x03, 0x00, 0x00],
        '+' => [0x08, 0x08, 0x3E, 0x08, 0x08],
        '-' => [0x08, 0x08, 0x08, 0x08, 0x08],
        '/' => [0x20, 0x10, 0x08, 0x04, 0x02],
        '(' => [0x00, 0x1C, 0x22, 0x41, 0x00],
        ')' => [0x00, 0x41, 0x22, 0x1C, 0x00],
        '<' => [0x08, 0x14, 0x22, 0x41, 0x00],
        '>' => [0x00, 0x41, 0x22, 0x14, 0x08],
        '[' => [0x00, 0x7F, 0x41, 0x41, 0x00],
        ']' => [0x00, 0x41, 0x41, 0x7F, 0x00],
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00],
        _ => return None,
    };
    Some(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_digits_match_reference_bitmaps() {
        assert_eq!(
            glyph('0', Font::Large).rows(),
            &[0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C]
        );
        assert_eq!(glyph('1', Font::Large).rows()[7], 0x7E);
    }

    #[test]
    fn unknown_characters_are_blank_in_both_fonts() {
        assert_eq!(glyph('k', Font::Large), Glyph::BLANK);
        assert_eq!(glyph('+', Font::Large), Glyph::BLANK);
        assert_eq!(glyph('é', Font::Small), Glyph::BLANK);
        assert_eq!(glyph('~', Font::Small), Glyph::BLANK);
    }

    #[test]
    fn column_glyphs_are_transposed_left_aligned() {
        // '-' is a single horizontal bar on row 3 spanning five columns.
        assert_eq!(
            glyph('-', Font::Small).rows(),
            &[0x00, 0x00, 0x00, 0xF8, 0x00, 0x00, 0x00, 0x00]
        );
        // 'I' has a full vertical stroke in the middle column.
        let rows = glyph('I', Font::Small);
        assert!(rows.rows()[..7].iter().all(|row| row & 0x20 != 0));
        assert_eq!(rows.rows()[7], 0x00);
    }

    #[test]
    fn space_is_known_but_blank() {
        assert!(glyph(' ', Font::Small).is_blank());
        assert!(!glyph('A', Font::Small).is_blank());
    }
}
