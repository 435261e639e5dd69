use tracing::warn;

use super::config::{camera_buffer_size, ConfigError};
use super::rendering::{camera_offset, world_blit_origin_px, CameraOffset, DebugText};
use super::{EntityId, Rgba, Scene, ScreenRect, Surface, Vec2};

const DEBUG_TEXT_INSET_PX: i32 = 10;

/// Follows one entity and renders a cropped view of the world around it.
///
/// The local buffer is the screen region plus `buffer_margin_px` on every
/// side. Only the window at `(margin, margin)` with the region's size is
/// composited to the screen.
#[derive(Debug)]
pub struct Camera {
    tracked: EntityId,
    screen_region: ScreenRect,
    buffer_margin_px: u32,
    view_center: Vec2,
    offset: CameraOffset,
    local_buffer: Surface,
    sentinel: Rgba,
    debug_overlay: bool,
    warned_missing_target: bool,
}

impl Camera {
    pub fn new(
        tracked: EntityId,
        screen_region: ScreenRect,
        buffer_margin_px: u32,
        sentinel: Rgba,
    ) -> Result<Self, ConfigError> {
        if screen_region.is_empty() {
            return Err(ConfigError::EmptyCameraRegion(screen_region));
        }
        let (buffer_width, buffer_height) = camera_buffer_size(screen_region, buffer_margin_px);
        let too_large = || ConfigError::BufferTooLarge {
            buffer: "camera".to_string(),
            width: buffer_width,
            height: buffer_height,
        };
        let local_buffer = Surface::new(
            u32::try_from(buffer_width).map_err(|_| too_large())?,
            u32::try_from(buffer_height).map_err(|_| too_large())?,
            sentinel,
        )?;
        let margin = buffer_margin_px as u64;
        let view_center = Vec2::new(
            (margin + screen_region.width as u64 / 2) as f32,
            (margin + screen_region.height as u64 / 2) as f32,
        );
        Ok(Self {
            tracked,
            screen_region,
            buffer_margin_px,
            view_center,
            offset: CameraOffset::default(),
            local_buffer,
            sentinel,
            debug_overlay: false,
            warned_missing_target: false,
        })
    }

    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }

    /// Re-centers on the tracked entity and redraws the local buffer from `scene`.
    ///
    /// Only reads the scene. With an unchanged scene the resulting buffer is
    /// identical on every call.
    pub fn tick(&mut self, scene: &Scene, text: &dyn DebugText) {
        self.local_buffer.fill(self.sentinel);

        let Some(target) = scene.entity(self.tracked) else {
            if !self.warned_missing_target {
                warn!(entity = self.tracked.0, "camera_target_missing");
                self.warned_missing_target = true;
            }
            return;
        };

        self.offset = camera_offset(self.view_center, target.position);
        let (blit_x, blit_y) = world_blit_origin_px(self.view_center, target.position);
        self.local_buffer.blit(scene.world(), blit_x, blit_y);

        if self.debug_overlay {
            let inset = self.buffer_margin_px as i32 + DEBUG_TEXT_INSET_PX;
            let line = format!("{} {:.1},{:.1}", target.name, self.offset.x, self.offset.y);
            text.draw_line(&mut self.local_buffer, inset, inset, &line);
        }
    }

    pub fn tracked(&self) -> EntityId {
        self.tracked
    }

    pub fn screen_region(&self) -> ScreenRect {
        self.screen_region
    }

    pub fn view_center(&self) -> Vec2 {
        self.view_center
    }

    /// Offset computed by the most recent [`Camera::tick`].
    pub fn offset(&self) -> CameraOffset {
        self.offset
    }

    pub fn local_buffer(&self) -> &Surface {
        &self.local_buffer
    }

    /// Part of the local buffer that is shown in the screen region.
    pub fn visible_rect(&self) -> ScreenRect {
        ScreenRect::new(
            self.buffer_margin_px as i32,
            self.buffer_margin_px as i32,
            self.screen_region.width,
            self.screen_region.height,
        )
    }

    pub fn debug_overlay(&self) -> bool {
        self.debug_overlay
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.debug_overlay = enabled;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::app::rendering::transform::world_to_local;
    use crate::app::scene::SpawnDesc;
    use crate::app::{InputSnapshot, KeyBindings};

    const SENTINEL: Rgba = [255, 0, 0, 255];
    const BACKGROUND: Rgba = [40, 40, 40, 255];
    const BLUE: Rgba = [0, 0, 255, 255];
    const ORANGE: Rgba = [255, 165, 0, 255];

    #[derive(Default)]
    struct RecordingText {
        lines: RefCell<Vec<(i32, i32, String)>>,
    }

    impl DebugText for RecordingText {
        fn draw_line(&self, _surface: &mut Surface, x: i32, y: i32, text: &str) {
            self.lines.borrow_mut().push((x, y, text.to_string()));
        }
    }

    struct NoText;

    impl DebugText for NoText {
        fn draw_line(&self, _surface: &mut Surface, _x: i32, _y: i32, _text: &str) {}
    }

    fn world_scene() -> Scene {
        let background = Surface::new(1280, 960, BACKGROUND).expect("surface");
        Scene::new(1280, 960, background, 30).expect("scene")
    }

    fn spawn(scene: &mut Scene, name: &str, color: Rgba, position: Vec2) -> EntityId {
        scene.spawn(
            SpawnDesc {
                name: name.to_string(),
                color,
                speed: 60.0,
                bindings: if name == "P1" {
                    KeyBindings::wasd()
                } else {
                    KeyBindings::ijkl()
                },
            },
            position,
        )
    }

    fn full_view_camera(tracked: EntityId) -> Camera {
        Camera::new(tracked, ScreenRect::new(0, 0, 640, 480), 0, SENTINEL).expect("camera")
    }

    #[test]
    fn centered_entity_renders_at_view_center() {
        let mut scene = world_scene();
        let id = spawn(&mut scene, "P1", BLUE, Vec2::new(640.0, 480.0));
        scene.tick(0.0, &InputSnapshot::empty());
        let mut camera = full_view_camera(id);

        camera.tick(&scene, &NoText);

        assert_eq!(camera.view_center(), Vec2::new(320.0, 240.0));
        assert_eq!(camera.offset(), CameraOffset::new(-320.0, -240.0));
        assert_eq!(camera.local_buffer().pixel(320, 240), Some(BLUE));
        assert_eq!(camera.local_buffer().pixel(349, 269), Some(BLUE));
        assert_eq!(camera.local_buffer().pixel(319, 240), Some(BACKGROUND));
        assert_eq!(camera.local_buffer().pixel(350, 270), Some(BACKGROUND));
    }

    #[test]
    fn entity_at_world_origin_shows_sentinel_beyond_world_edges() {
        let mut scene = world_scene();
        let id = spawn(&mut scene, "P1", BLUE, Vec2::ZERO);
        scene.tick(0.0, &InputSnapshot::empty());
        let mut camera = full_view_camera(id);

        camera.tick(&scene, &NoText);
        let buffer = camera.local_buffer();

        assert_eq!(buffer.pixel(10, 10), Some(SENTINEL));
        assert_eq!(buffer.pixel(600, 10), Some(SENTINEL));
        assert_eq!(buffer.pixel(10, 400), Some(SENTINEL));
        assert_eq!(buffer.pixel(320, 240), Some(BLUE));
        assert_eq!(buffer.pixel(600, 400), Some(BACKGROUND));
    }

    #[test]
    fn recentering_holds_for_any_position() {
        let mut scene = world_scene();
        let id = spawn(&mut scene, "P1", BLUE, Vec2::ZERO);
        let mut camera = full_view_camera(id);

        for position in [
            Vec2::new(0.0, 0.0),
            Vec2::new(1279.5, 959.25),
            Vec2::new(-700.0, 3000.0),
            Vec2::new(1.0e7, -1.0e7),
            Vec2::new(12.25, 45.5),
            Vec2::new(-1909.3988, 700.123),
        ] {
            scene.entity_mut(id).expect("entity").position = position;
            scene.tick(0.0, &InputSnapshot::empty());
            camera.tick(&scene, &NoText);
            assert_eq!(
                world_to_local(position, camera.offset()),
                camera.view_center(),
                "position {position:?}"
            );
        }
    }

    #[test]
    fn fractional_positions_still_land_on_view_center_pixel() {
        let mut scene = world_scene();
        let id = spawn(&mut scene, "P1", BLUE, Vec2::new(400.7, 300.2));
        scene.tick(0.0, &InputSnapshot::empty());
        let mut camera = full_view_camera(id);

        camera.tick(&scene, &NoText);

        assert_eq!(camera.local_buffer().pixel(320, 240), Some(BLUE));
        assert_eq!(camera.local_buffer().pixel(319, 239), Some(BACKGROUND));
    }

    #[test]
    fn far_out_of_bounds_target_shows_only_sentinel() {
        let mut scene = world_scene();
        let id = spawn(&mut scene, "P1", BLUE, Vec2::new(-1.0e9, 5.0e9));
        scene.tick(0.0, &InputSnapshot::empty());
        let mut camera = full_view_camera(id);

        camera.tick(&scene, &NoText);

        assert!(camera
            .local_buffer()
            .as_bytes()
            .chunks_exact(4)
            .all(|px| px == SENTINEL));
    }

    #[test]
    fn tick_is_idempotent_for_unchanged_scene() {
        let mut scene = world_scene();
        let id = spawn(&mut scene, "P1", BLUE, Vec2::new(100.0, 50.0));
        scene.tick(0.0, &InputSnapshot::empty());
        let mut camera = full_view_camera(id).with_debug_overlay(true);
        let text = crate::app::BitmapText::default();

        camera.tick(&scene, &text);
        let first = camera.local_buffer().clone();
        let first_offset = camera.offset();
        camera.tick(&scene, &text);

        assert_eq!(camera.local_buffer(), &first);
        assert_eq!(camera.offset(), first_offset);
    }

    #[test]
    fn two_cameras_are_independent_and_leave_world_untouched() {
        let mut scene = world_scene();
        let p1 = spawn(&mut scene, "P1", BLUE, Vec2::new(200.0, 200.0));
        let p2 = spawn(&mut scene, "P2", ORANGE, Vec2::new(900.0, 700.0));
        scene.tick(0.0, &InputSnapshot::empty());
        let world_before = scene.world().clone();

        let mut camera_a =
            Camera::new(p1, ScreenRect::new(0, 0, 640, 240), 16, SENTINEL).expect("camera a");
        let mut camera_b =
            Camera::new(p2, ScreenRect::new(0, 240, 640, 240), 16, SENTINEL).expect("camera b");

        camera_a.tick(&scene, &NoText);
        let buffer_a = camera_a.local_buffer().clone();
        camera_b.tick(&scene, &NoText);

        assert_ne!(camera_a.offset(), camera_b.offset());
        assert_eq!(camera_a.local_buffer(), &buffer_a);
        assert_eq!(scene.world(), &world_before);

        let center_a = camera_a.view_center().to_pixel();
        let center_b = camera_b.view_center().to_pixel();
        assert_eq!(camera_a.local_buffer().pixel(center_a.0, center_a.1), Some(BLUE));
        assert_eq!(camera_b.local_buffer().pixel(center_b.0, center_b.1), Some(ORANGE));
    }

    #[test]
    fn margin_grows_buffer_and_shifts_view_center() {
        let camera = Camera::new(EntityId(0), ScreenRect::new(0, 240, 640, 240), 16, SENTINEL)
            .expect("camera");

        assert_eq!(camera.local_buffer().size(), (672, 272));
        assert_eq!(camera.view_center(), Vec2::new(336.0, 136.0));
        assert_eq!(camera.visible_rect(), ScreenRect::new(16, 16, 640, 240));
    }

    #[test]
    fn recentering_is_exact_for_random_fractional_positions() {
        let mut scene = world_scene();
        let id = spawn(&mut scene, "P1", BLUE, Vec2::ZERO);
        let mut camera = Camera::new(id, ScreenRect::new(0, 240, 640, 240), 16, SENTINEL)
            .expect("camera");
        let mut rng = StdRng::seed_from_u64(17);

        for _ in 0..200 {
            let position = Vec2::new(
                rng.gen_range(-5000.0f32..5000.0),
                rng.gen_range(-5000.0f32..5000.0),
            );
            scene.entity_mut(id).expect("entity").position = position;
            scene.repaint();
            camera.tick(&scene, &NoText);

            assert_eq!(
                world_to_local(position, camera.offset()),
                camera.view_center(),
                "position {position:?}"
            );
            let inside_world = (0.0..1280.0).contains(&position.x)
                && (0.0..960.0).contains(&position.y);
            if inside_world {
                assert_eq!(camera.local_buffer().pixel(336, 136), Some(BLUE));
            }
        }
    }

    #[test]
    fn margin_too_large_for_a_buffer_is_an_error() {
        let error = Camera::new(
            EntityId(0),
            ScreenRect::new(0, 0, 640, 240),
            1_073_741_823,
            SENTINEL,
        )
        .expect_err("too large");
        assert!(matches!(error, ConfigError::BufferTooLarge { .. }));

        let error = Camera::new(EntityId(0), ScreenRect::new(0, 0, 640, 240), u32::MAX, SENTINEL)
            .expect_err("too large");
        assert!(matches!(error, ConfigError::BufferTooLarge { .. }));
    }

    #[test]
    fn empty_region_is_rejected() {
        let error = Camera::new(EntityId(0), ScreenRect::new(0, 0, 640, 0), 0, SENTINEL)
            .expect_err("empty");
        assert!(matches!(error, ConfigError::EmptyCameraRegion(_)));
    }

    #[test]
    fn debug_overlay_reports_name_and_offset_only_when_enabled() {
        let mut scene = world_scene();
        let id = spawn(&mut scene, "P1", BLUE, Vec2::new(640.0, 480.0));
        scene.tick(0.0, &InputSnapshot::empty());
        let text = RecordingText::default();

        let mut camera = full_view_camera(id);
        camera.tick(&scene, &text);
        assert!(text.lines.borrow().is_empty());

        camera.set_debug_overlay(true);
        camera.tick(&scene, &text);
        let lines = text.lines.borrow();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], (10, 10, "P1 -320.0,-240.0".to_string()));
    }

    #[test]
    fn missing_target_renders_sentinel_without_error() {
        let scene = world_scene();
        let mut camera = full_view_camera(EntityId(42));

        camera.tick(&scene, &NoText);
        camera.tick(&scene, &NoText);

        assert_eq!(camera.offset(), CameraOffset::default());
        assert!(camera
            .local_buffer()
            .as_bytes()
            .chunks_exact(4)
            .all(|px| px == SENTINEL));
    }
}
