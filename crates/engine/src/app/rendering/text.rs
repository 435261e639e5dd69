use super::{Rgba, Surface};

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: usize = 5;
const DEFAULT_TEXT_SCALE: i32 = 2;
pub const DEBUG_TEXT_COLOR: Rgba = [255, 255, 255, 255];

/// Draws one line of diagnostic text onto a surface.
///
/// Cameras call this after compositing their view; implementations must not
/// touch anything but the given surface.
pub trait DebugText {
    fn draw_line(&self, surface: &mut Surface, x: i32, y: i32, text: &str);
}

/// 3x5 bitmap font. Lowercase letters render as uppercase; characters without
/// a glyph advance like a space.
#[derive(Debug, Clone, Copy)]
pub struct BitmapText {
    color: Rgba,
    scale: i32,
}

impl Default for BitmapText {
    fn default() -> Self {
        Self {
            color: DEBUG_TEXT_COLOR,
            scale: DEFAULT_TEXT_SCALE,
        }
    }
}

impl BitmapText {
    pub fn new(color: Rgba, scale: i32) -> Self {
        Self {
            color,
            scale: scale.max(1),
        }
    }

    pub fn advance(&self) -> i32 {
        (GLYPH_WIDTH + 1) * self.scale
    }

    fn draw_glyph(&self, surface: &mut Surface, x: i32, y: i32, rows: [u8; GLYPH_HEIGHT]) {
        for (row_index, row_bits) in rows.iter().enumerate() {
            let glyph_y = y.saturating_add(row_index as i32 * self.scale);
            for col in 0..GLYPH_WIDTH {
                if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                    continue;
                }
                let glyph_x = x.saturating_add(col * self.scale);
                for sy in 0..self.scale {
                    for sx in 0..self.scale {
                        surface.put_pixel(
                            glyph_x.saturating_add(sx),
                            glyph_y.saturating_add(sy),
                            self.color,
                        );
                    }
                }
            }
        }
    }
}

impl DebugText for BitmapText {
    fn draw_line(&self, surface: &mut Surface, x: i32, y: i32, text: &str) {
        if surface.width() == 0 || surface.height() == 0 {
            return;
        }
        let mut pen_x = x;
        for ch in text.chars() {
            if let Some(rows) = glyph_rows(ch) {
                self.draw_glyph(surface, pen_x, y, rows);
            }
            pen_x = pen_x.saturating_add(self.advance());
        }
    }
}

fn glyph_rows(ch: char) -> Option<[u8; GLYPH_HEIGHT]> {
    let rows = match ch.to_ascii_uppercase() {
        '0' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        _ => return None,
    };
    Some(rows)
}
