use rand::Rng;
use tracing::info;

use super::config::{opaque, ConfigError, SessionConfig};
use super::scene::SpawnDesc;
use super::{BitmapText, Camera, Compositor, KeyQuery, Scene, Surface};

/// One play session: the shared scene and the compositor that views it.
pub struct Session {
    scene: Scene,
    compositor: Compositor,
}

impl Session {
    pub fn new(scene: Scene, mut compositor: Compositor, debug_overlay: bool) -> Self {
        compositor.set_debug_overlay(debug_overlay);
        Self { scene, compositor }
    }

    /// Builds the scene, spawns one entity per player at a random position and
    /// assigns each a camera, in player order.
    pub fn from_config(config: &SessionConfig, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        config.validate()?;

        let world = &config.world;
        let background = Surface::horizontal_gradient(
            world.width,
            world.height,
            opaque(world.gradient_from),
            opaque(world.gradient_to),
        )?;
        let mut scene = Scene::new(world.width, world.height, background, world.entity_size_px)?;

        let mut cameras = Vec::with_capacity(config.players.len());
        for (player, region) in config.players.iter().zip(config.camera_regions()) {
            let id = scene.spawn_random(
                SpawnDesc {
                    name: player.name.clone(),
                    color: opaque(player.color),
                    speed: player.speed,
                    bindings: player.bindings,
                },
                world.spawn_margin_px,
                rng,
            );
            if let Some(entity) = scene.entity(id) {
                info!(
                    player = entity.name.as_str(),
                    x = entity.position.x,
                    y = entity.position.y,
                    size_px = scene.entity_size_px(),
                    region = ?region,
                    "player_spawned"
                );
            }
            cameras.push(Camera::new(
                id,
                region,
                config.cameras.buffer_margin_px,
                opaque(config.cameras.sentinel_color),
            )?);
        }

        let compositor = Compositor::new(
            config.window.width,
            config.window.height,
            opaque(config.cameras.clear_color),
            cameras,
            Box::new(BitmapText::default()),
        )?;
        // Paint once so the first presented frame is never blank.
        scene.repaint();
        let mut session = Self::new(scene, compositor, config.cameras.debug_overlay);
        session.compositor.render_cameras(&session.scene);
        Ok(session)
    }

    pub fn frame(&mut self, dt: f32, input: &impl KeyQuery) {
        self.compositor.frame(&mut self.scene, dt, input);
    }

    /// Flips the overlay on every camera and returns the new state.
    pub fn toggle_debug_overlay(&mut self) -> bool {
        let enabled = !self.compositor.debug_overlay();
        self.compositor.set_debug_overlay(enabled);
        enabled
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn display(&self) -> &Surface {
        self.compositor.display()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::app::config::CameraLayout;
    use crate::app::{InputSnapshot, Vec2};

    fn default_session(seed: u64) -> Session {
        Session::from_config(&SessionConfig::default(), &mut StdRng::seed_from_u64(seed))
            .expect("session")
    }

    #[test]
    fn default_config_builds_two_players_and_two_cameras() {
        let session = default_session(11);

        assert_eq!(session.scene().entity_count(), 2);
        assert_eq!(session.compositor().cameras().len(), 2);
        assert_eq!(session.display().size(), (640, 480));
        for (camera, entity) in session
            .compositor()
            .cameras()
            .iter()
            .zip(session.scene().entities())
        {
            assert_eq!(camera.tracked(), entity.id);
            assert!((20.0..=1260.0).contains(&entity.position.x));
            assert!((20.0..=940.0).contains(&entity.position.y));
        }
    }

    #[test]
    fn first_display_is_rendered_before_any_frame() {
        let session = default_session(5);
        let p1_color = session.scene().entities()[0].color;
        assert_eq!(session.display().pixel(320, 120), Some(p1_color));
    }

    #[test]
    fn players_stay_centered_in_their_regions_while_moving() {
        let mut session = default_session(3);
        let input = InputSnapshot::empty()
            .with_key_down(KeyCode::KeyS)
            .with_key_down(KeyCode::KeyD)
            .with_key_down(KeyCode::KeyJ);
        let start: Vec<Vec2> = session
            .scene()
            .entities()
            .iter()
            .map(|entity| entity.position)
            .collect();

        for _ in 0..30 {
            session.frame(1.0 / 60.0, &input);
        }

        let entities = session.scene().entities();
        assert!(entities[0].position.x > start[0].x && entities[0].position.y > start[0].y);
        assert!(entities[1].position.x < start[1].x);
        assert_eq!(session.display().pixel(320, 120), Some(entities[0].color));
        assert_eq!(session.display().pixel(320, 360), Some(entities[1].color));
    }

    #[test]
    fn same_seed_gives_same_spawns() {
        let a = default_session(99);
        let b = default_session(99);
        let positions = |session: &Session| {
            session
                .scene()
                .entities()
                .iter()
                .map(|entity| entity.position)
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn toggle_flips_overlay_on_every_camera() {
        let mut session = default_session(1);
        assert!(session.compositor().debug_overlay());
        assert!(!session.toggle_debug_overlay());
        assert!(!session.compositor().debug_overlay());
        assert!(session.toggle_debug_overlay());
        assert!(session.compositor().debug_overlay());
    }

    #[test]
    fn invalid_config_is_fatal_at_construction() {
        let mut config = SessionConfig::default();
        config.cameras.layout = CameraLayout::Custom(vec![
            crate::app::ScreenRect::new(0, 0, 640, 480),
            crate::app::ScreenRect::new(0, 0, 320, 240),
        ]);
        let result = Session::from_config(&config, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(ConfigError::OverlappingRegions { .. })));
    }

    #[test]
    fn oversized_camera_margin_fails_without_allocating() {
        let mut config = SessionConfig::default();
        config.cameras.buffer_margin_px = 1_073_741_823;
        let result = Session::from_config(&config, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(ConfigError::BufferTooLarge { .. })));
    }

    #[test]
    fn session_without_players_is_rejected() {
        let mut config = SessionConfig::default();
        config.players.clear();
        let result = Session::from_config(&config, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(ConfigError::NoPlayers)));
    }
}
