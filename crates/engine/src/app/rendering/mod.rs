mod renderer;
mod surface;
mod text;
pub(crate) mod transform;

pub use renderer::Renderer;
pub use surface::{surface_byte_len, Rgba, Surface, SurfaceTooLarge, MAX_SURFACE_BYTES};
pub use text::{BitmapText, DebugText, DEBUG_TEXT_COLOR};
pub use transform::{camera_offset, world_blit_origin_px, world_to_local, CameraOffset};
