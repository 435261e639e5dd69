mod camera;
mod compositor;
pub mod config;
mod entity;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod session;

pub use camera::Camera;
pub use compositor::Compositor;
pub use config::{
    CameraConfig, CameraLayout, ConfigError, PlayerConfig, SessionConfig, TimingConfig,
    WindowConfig, WorldConfig,
};
pub use entity::{Entity, EntityId, DEFAULT_MOVE_SPEED};
pub use geometry::{ScreenRect, Vec2};
pub use input::{
    Direction, DirectionStates, InputSnapshot, KeyBindings, KeyQuery, OVERLAY_TOGGLE_KEY,
};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::FrameStatsSnapshot;
pub use rendering::{
    camera_offset, surface_byte_len, world_blit_origin_px, world_to_local, BitmapText,
    CameraOffset, DebugText, Renderer, Rgba, Surface, SurfaceTooLarge, DEBUG_TEXT_COLOR,
    MAX_SURFACE_BYTES,
};
pub use scene::{random_spawn_position, Scene, SpawnDesc};
pub use session::Session;
