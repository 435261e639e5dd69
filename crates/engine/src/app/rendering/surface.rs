use thiserror::Error;

use crate::app::ScreenRect;

pub type Rgba = [u8; 4];

const BYTES_PER_PIXEL: usize = 4;

/// Largest pixel buffer a surface may allocate.
pub const MAX_SURFACE_BYTES: usize = 256 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a {width}x{height} surface exceeds the {MAX_SURFACE_BYTES}-byte limit")]
pub struct SurfaceTooLarge {
    pub width: u64,
    pub height: u64,
}

/// Byte length of a `width x height` RGBA8 buffer, or `None` past [`MAX_SURFACE_BYTES`].
pub fn surface_byte_len(width: u64, height: u64) -> Option<usize> {
    let bytes = width
        .checked_mul(height)?
        .checked_mul(BYTES_PER_PIXEL as u64)?;
    usize::try_from(bytes)
        .ok()
        .filter(|bytes| *bytes <= MAX_SURFACE_BYTES)
}

/// Fixed-size RGBA8 pixel buffer. All drawing is clipped to its bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32, fill: Rgba) -> Result<Self, SurfaceTooLarge> {
        let len = surface_byte_len(width as u64, height as u64).ok_or(SurfaceTooLarge {
            width: width as u64,
            height: height as u64,
        })?;
        let mut surface = Self {
            width,
            height,
            pixels: vec![0; len],
        };
        surface.fill(fill);
        Ok(surface)
    }

    /// Columns blend linearly from `from` at x = 0 to `to` at the right edge.
    pub fn horizontal_gradient(
        width: u32,
        height: u32,
        from: Rgba,
        to: Rgba,
    ) -> Result<Self, SurfaceTooLarge> {
        let mut surface = Self::new(width, height, from)?;
        if width == 0 || height == 0 {
            return Ok(surface);
        }

        let row_bytes = width as usize * BYTES_PER_PIXEL;
        let (first_row, rest) = surface.pixels.split_at_mut(row_bytes);
        for (x, pixel) in first_row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
            let t = x as f32 / width as f32;
            for channel in 0..BYTES_PER_PIXEL {
                let start = from[channel] as f32;
                let end = to[channel] as f32;
                pixel[channel] = (start + (end - start) * t).round() as u8;
            }
        }
        for row in rest.chunks_exact_mut(row_bytes) {
            row.copy_from_slice(first_row);
        }
        Ok(surface)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> ScreenRect {
        ScreenRect::new(0, 0, self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let offset = self.byte_offset(x, y)?;
        let mut color = [0; BYTES_PER_PIXEL];
        color.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(color)
    }

    pub fn fill(&mut self, color: Rgba) {
        for chunk in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(offset) = self.byte_offset(x, y) {
            self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, rect: ScreenRect, color: Rgba) {
        let Some(clipped) = clip_to(rect, self.width, self.height) else {
            return;
        };
        let row_bytes = self.width as usize * BYTES_PER_PIXEL;
        for y in clipped.y0..clipped.y1 {
            let row_start = y * row_bytes;
            let span_start = row_start + clipped.x0 * BYTES_PER_PIXEL;
            let span_end = row_start + clipped.x1 * BYTES_PER_PIXEL;
            let span = &mut self.pixels[span_start..span_end];
            for chunk in span.chunks_exact_mut(BYTES_PER_PIXEL) {
                chunk.copy_from_slice(&color);
            }
        }
    }

    /// Copies a same-sized surface wholesale. Returns `false` on size mismatch.
    pub fn copy_from(&mut self, source: &Surface) -> bool {
        if source.size() != self.size() {
            return false;
        }
        self.pixels.copy_from_slice(&source.pixels);
        true
    }

    /// Draws all of `source` with its top-left corner at `(dest_x, dest_y)`.
    pub fn blit(&mut self, source: &Surface, dest_x: i32, dest_y: i32) {
        self.blit_region(source, source.bounds(), dest_x, dest_y);
    }

    /// Draws the `region` of `source` with its top-left corner at `(dest_x, dest_y)`.
    ///
    /// Any part of the region that falls outside either surface is skipped, so
    /// offsets of any magnitude are valid.
    pub fn blit_region(
        &mut self,
        source: &Surface,
        region: ScreenRect,
        dest_x: i32,
        dest_y: i32,
    ) {
        let Some(src) = clip_to(region, source.width, source.height) else {
            return;
        };

        // Destination position of the clipped source rect's top-left corner.
        let shift_x = dest_x as i64 - region.x as i64;
        let shift_y = dest_y as i64 - region.y as i64;
        let dest_rect = (
            src.x0 as i64 + shift_x,
            src.y0 as i64 + shift_y,
            src.x1 as i64 + shift_x,
            src.y1 as i64 + shift_y,
        );

        let dx0 = dest_rect.0.max(0);
        let dy0 = dest_rect.1.max(0);
        let dx1 = dest_rect.2.min(self.width as i64);
        let dy1 = dest_rect.3.min(self.height as i64);
        if dx1 <= dx0 || dy1 <= dy0 {
            return;
        }

        let span_bytes = (dx1 - dx0) as usize * BYTES_PER_PIXEL;
        let src_row_bytes = source.width as usize * BYTES_PER_PIXEL;
        let dst_row_bytes = self.width as usize * BYTES_PER_PIXEL;
        for dy in dy0..dy1 {
            let sy = (dy - shift_y) as usize;
            let sx = (dx0 - shift_x) as usize;
            let src_start = sy * src_row_bytes + sx * BYTES_PER_PIXEL;
            let dst_start = dy as usize * dst_row_bytes + dx0 as usize * BYTES_PER_PIXEL;
            self.pixels[dst_start..dst_start + span_bytes]
                .copy_from_slice(&source.pixels[src_start..src_start + span_bytes]);
        }
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }
}

#[derive(Debug, Clone, Copy)]
struct ClippedSpan {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

fn clip_to(rect: ScreenRect, width: u32, height: u32) -> Option<ClippedSpan> {
    let x0 = (rect.x as i64).max(0);
    let y0 = (rect.y as i64).max(0);
    let x1 = rect.right().min(width as i64);
    let y1 = rect.bottom().min(height as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(ClippedSpan {
        x0: x0 as usize,
        y0: y0 as usize,
        x1: x1 as usize,
        y1: y1 as usize,
    })
}
