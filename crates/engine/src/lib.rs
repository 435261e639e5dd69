pub mod app;

pub use app::{
    camera_offset, random_spawn_position, run_app, surface_byte_len, world_blit_origin_px,
    world_to_local, AppError, BitmapText, Camera, CameraConfig, CameraLayout, CameraOffset,
    Compositor, ConfigError, DebugText, Direction, DirectionStates, Entity, EntityId,
    InputSnapshot, KeyBindings, KeyQuery, LoopConfig, PlayerConfig, Renderer, Rgba, Scene,
    ScreenRect, Session, SessionConfig, SpawnDesc, Surface, SurfaceTooLarge, TimingConfig, Vec2,
    WindowConfig, WorldConfig, DEBUG_TEXT_COLOR, DEFAULT_MOVE_SPEED, MAX_SURFACE_BYTES,
    OVERLAY_TOGGLE_KEY,
};
