use super::config::{validate_regions, ConfigError};
use super::rendering::DebugText;
use super::{Camera, KeyQuery, Rgba, Scene, ScreenRect, Surface};

/// Owns the physical display buffer and the cameras that tile it.
pub struct Compositor {
    display: Surface,
    clear_color: Rgba,
    cameras: Vec<Camera>,
    text: Box<dyn DebugText>,
}

impl Compositor {
    /// Fails if any camera region is empty, leaves the display, or overlaps another.
    pub fn new(
        display_width: u32,
        display_height: u32,
        clear_color: Rgba,
        cameras: Vec<Camera>,
        text: Box<dyn DebugText>,
    ) -> Result<Self, ConfigError> {
        let regions: Vec<ScreenRect> = cameras.iter().map(Camera::screen_region).collect();
        validate_regions(display_width, display_height, &regions)?;
        Ok(Self {
            display: Surface::new(display_width, display_height, clear_color)?,
            clear_color,
            cameras,
            text,
        })
    }

    /// Runs one full frame: simulate, render every camera, composite.
    pub fn frame(&mut self, scene: &mut Scene, dt: f32, input: &impl KeyQuery) {
        self.display.fill(self.clear_color);
        scene.tick(dt, input);
        self.render_cameras(scene);
    }

    /// Redraws every camera from the scene as it stands and composites them.
    pub fn render_cameras(&mut self, scene: &Scene) {
        for camera in &mut self.cameras {
            camera.tick(scene, self.text.as_ref());
        }
        for camera in &self.cameras {
            let region = camera.screen_region();
            self.display
                .blit_region(camera.local_buffer(), camera.visible_rect(), region.x, region.y);
        }
    }

    pub fn display(&self) -> &Surface {
        &self.display
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    /// True while any camera draws its debug line.
    pub fn debug_overlay(&self) -> bool {
        self.cameras.iter().any(Camera::debug_overlay)
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        for camera in &mut self.cameras {
            camera.set_debug_overlay(enabled);
        }
    }
}
