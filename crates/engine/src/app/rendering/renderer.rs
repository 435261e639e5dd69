use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::Surface;

/// Presents a fixed-size display surface to the window.
///
/// The pixel buffer keeps the display size for the whole session; only the
/// window surface it is scaled onto follows resizes.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    display_width: u32,
    display_height: u32,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        display_width: u32,
        display_height: u32,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            display_width,
            display_height,
            size.width,
            size.height,
        )?;
        Ok(Self {
            window,
            pixels,
            display_width,
            display_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            self.display_width,
            self.display_height,
            width,
            height,
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        display_width: u32,
        display_height: u32,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(display_width, display_height, surface)
    }

    pub fn present(&mut self, display: &Surface) -> Result<(), Error> {
        let frame = self.pixels.frame_mut();
        if frame.len() == display.as_bytes().len() {
            frame.copy_from_slice(display.as_bytes());
        }
        self.pixels.render()
    }
}
