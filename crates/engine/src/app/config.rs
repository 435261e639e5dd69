use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use winit::keyboard::KeyCode;

use super::entity::DEFAULT_MOVE_SPEED;
use super::rendering::{surface_byte_len, SurfaceTooLarge, MAX_SURFACE_BYTES};
use super::{KeyBindings, Rgba, ScreenRect, OVERLAY_TOGGLE_KEY};

pub type Rgb = [u8; 3];

pub const fn opaque(rgb: Rgb) -> Rgba {
    [rgb[0], rgb[1], rgb[2], 255]
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("display size must be non-zero, got {width}x{height}")]
    InvalidDisplaySize { width: u32, height: u32 },
    #[error("world size must be non-zero, got {width}x{height}")]
    InvalidWorldSize { width: u32, height: u32 },
    #[error("entity size must be non-zero")]
    InvalidEntitySize,
    #[error(
        "background is {actual_width}x{actual_height} but the world is {world_width}x{world_height}"
    )]
    BackgroundSizeMismatch {
        actual_width: u32,
        actual_height: u32,
        world_width: u32,
        world_height: u32,
    },
    #[error(
        "{buffer} buffer of {width}x{height} pixels exceeds the {MAX_SURFACE_BYTES}-byte limit"
    )]
    BufferTooLarge {
        buffer: String,
        width: u64,
        height: u64,
    },
    #[error(transparent)]
    Surface(#[from] SurfaceTooLarge),
    #[error("target fps must be at least 1")]
    InvalidTargetFps,
    #[error("fixed dt must be a finite, non-negative number of milliseconds, got {0}")]
    InvalidFixedDt(f32),
    #[error("camera region is empty: {0:?}")]
    EmptyCameraRegion(ScreenRect),
    #[error("camera region {index} is empty: {region:?}")]
    EmptyRegion { index: usize, region: ScreenRect },
    #[error(
        "camera region {index} {region:?} lies outside the {display_width}x{display_height} display"
    )]
    RegionOutsideDisplay {
        index: usize,
        region: ScreenRect,
        display_width: u32,
        display_height: u32,
    },
    #[error("camera regions {first} and {second} overlap: {first_region:?} / {second_region:?}")]
    OverlappingRegions {
        first: usize,
        second: usize,
        first_region: ScreenRect,
        second_region: ScreenRect,
    },
    #[error(
        "camera region {index} is {width}x{height}, larger than the {world_width}x{world_height} world"
    )]
    ViewportLargerThanWorld {
        index: usize,
        width: u32,
        height: u32,
        world_width: u32,
        world_height: u32,
    },
    #[error("at least one player is required")]
    NoPlayers,
    #[error("{players} players configured for {regions} camera regions")]
    PlayerRegionMismatch { players: usize, regions: usize },
    #[error("player {name} has invalid speed {speed}")]
    InvalidSpeed { name: String, speed: f32 },
    #[error("key {key:?} bound by {player} is reserved for the debug overlay toggle")]
    ReservedKey { key: KeyCode, player: String },
    #[error("key {key:?} is bound by both {first} and {second}")]
    DuplicateBinding {
        key: KeyCode,
        first: String,
        second: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub window: WindowConfig,
    pub world: WorldConfig,
    pub cameras: CameraConfig,
    pub timing: TimingConfig,
    pub players: Vec<PlayerConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            world: WorldConfig::default(),
            cameras: CameraConfig::default(),
            timing: TimingConfig::default(),
            players: vec![
                PlayerConfig {
                    name: "P1".to_string(),
                    color: [0, 0, 255],
                    speed: DEFAULT_MOVE_SPEED,
                    bindings: KeyBindings::wasd(),
                },
                PlayerConfig {
                    name: "P2".to_string(),
                    color: [255, 165, 0],
                    speed: DEFAULT_MOVE_SPEED,
                    bindings: KeyBindings::ijkl(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Split Screen".to_string(),
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub gradient_from: Rgb,
    pub gradient_to: Rgb,
    pub entity_size_px: u32,
    pub spawn_margin_px: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 960,
            gradient_from: [0, 0, 0],
            gradient_to: [255, 255, 255],
            entity_size_px: 30,
            spawn_margin_px: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraLayout {
    /// Full-width bands, top to bottom.
    Stacked,
    /// Full-height columns, left to right.
    SideBySide,
    Custom(Vec<ScreenRect>),
}

impl CameraLayout {
    pub fn regions(
        &self,
        display_width: u32,
        display_height: u32,
        count: usize,
    ) -> Vec<ScreenRect> {
        match self {
            CameraLayout::Stacked => split_evenly(display_height, count)
                .map(|(start, len)| ScreenRect::new(0, start as i32, display_width, len))
                .collect(),
            CameraLayout::SideBySide => split_evenly(display_width, count)
                .map(|(start, len)| ScreenRect::new(start as i32, 0, len, display_height))
                .collect(),
            CameraLayout::Custom(regions) => regions.clone(),
        }
    }
}

fn split_evenly(total: u32, count: usize) -> impl Iterator<Item = (u32, u32)> {
    let total = total as u64;
    let count = count as u64;
    (0..count).map(move |index| {
        let start = total * index / count;
        let end = total * (index + 1) / count;
        (start as u32, (end - start) as u32)
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub layout: CameraLayout,
    pub buffer_margin_px: u32,
    pub sentinel_color: Rgb,
    pub clear_color: Rgb,
    pub debug_overlay: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            layout: CameraLayout::Stacked,
            buffer_margin_px: 16,
            sentinel_color: [255, 0, 0],
            clear_color: [0, 0, 0],
            debug_overlay: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub target_fps: u32,
    pub max_frame_delta_ms: u64,
    /// Replaces measured frame time when set.
    pub fixed_dt_ms: Option<f32>,
    pub metrics_log_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_frame_delta_ms: 250,
            fixed_dt_ms: None,
            metrics_log_interval_ms: 1000,
        }
    }
}

impl TimingConfig {
    pub fn fixed_dt(&self) -> Option<Duration> {
        self.fixed_dt_ms
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .map(|ms| Duration::from_secs_f32(ms / 1000.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    pub name: String,
    pub color: Rgb,
    #[serde(default = "default_move_speed")]
    pub speed: f32,
    pub bindings: KeyBindings,
}

fn default_move_speed() -> f32 {
    DEFAULT_MOVE_SPEED
}

impl SessionConfig {
    pub fn camera_regions(&self) -> Vec<ScreenRect> {
        self.cameras
            .layout
            .regions(self.window.width, self.window.height, self.players.len())
    }

    /// Rejects every setting that would make the session ill-formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidDisplaySize {
                width: self.window.width,
                height: self.window.height,
            });
        }
        if self.world.width == 0 || self.world.height == 0 {
            return Err(ConfigError::InvalidWorldSize {
                width: self.world.width,
                height: self.world.height,
            });
        }
        check_buffer("display", self.window.width as u64, self.window.height as u64)?;
        check_buffer("world", self.world.width as u64, self.world.height as u64)?;
        if self.world.entity_size_px == 0 {
            return Err(ConfigError::InvalidEntitySize);
        }
        if self.timing.target_fps == 0 {
            return Err(ConfigError::InvalidTargetFps);
        }
        if let Some(ms) = self.timing.fixed_dt_ms {
            if !ms.is_finite() || ms < 0.0 {
                return Err(ConfigError::InvalidFixedDt(ms));
            }
        }

        if self.players.is_empty() {
            return Err(ConfigError::NoPlayers);
        }

        let regions = self.camera_regions();
        if regions.len() != self.players.len() {
            return Err(ConfigError::PlayerRegionMismatch {
                players: self.players.len(),
                regions: regions.len(),
            });
        }
        validate_regions(self.window.width, self.window.height, &regions)?;
        for (index, region) in regions.iter().enumerate() {
            if region.width > self.world.width || region.height > self.world.height {
                return Err(ConfigError::ViewportLargerThanWorld {
                    index,
                    width: region.width,
                    height: region.height,
                    world_width: self.world.width,
                    world_height: self.world.height,
                });
            }
            let (buffer_width, buffer_height) =
                camera_buffer_size(*region, self.cameras.buffer_margin_px);
            check_buffer(&format!("camera {index}"), buffer_width, buffer_height)?;
        }

        let mut key_owners: HashMap<KeyCode, usize> = HashMap::new();
        for (index, player) in self.players.iter().enumerate() {
            if !player.speed.is_finite() || player.speed < 0.0 {
                return Err(ConfigError::InvalidSpeed {
                    name: player.name.clone(),
                    speed: player.speed,
                });
            }
            for key in player.bindings.keys() {
                if key == OVERLAY_TOGGLE_KEY {
                    return Err(ConfigError::ReservedKey {
                        key,
                        player: player.name.clone(),
                    });
                }
                match key_owners.get(&key) {
                    Some(&owner) if owner != index => {
                        return Err(ConfigError::DuplicateBinding {
                            key,
                            first: self.players[owner].name.clone(),
                            second: player.name.clone(),
                        });
                    }
                    _ => {
                        key_owners.insert(key, index);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Local buffer size of a camera: its region plus `margin_px` on every side.
pub fn camera_buffer_size(region: ScreenRect, margin_px: u32) -> (u64, u64) {
    let margins = 2 * margin_px as u64;
    (region.width as u64 + margins, region.height as u64 + margins)
}

fn check_buffer(buffer: &str, width: u64, height: u64) -> Result<(), ConfigError> {
    match surface_byte_len(width, height) {
        Some(_) => Ok(()),
        None => Err(ConfigError::BufferTooLarge {
            buffer: buffer.to_string(),
            width,
            height,
        }),
    }
}

/// Every region must be non-empty, inside the display, and disjoint from the others.
pub fn validate_regions(
    display_width: u32,
    display_height: u32,
    regions: &[ScreenRect],
) -> Result<(), ConfigError> {
    if display_width == 0 || display_height == 0 {
        return Err(ConfigError::InvalidDisplaySize {
            width: display_width,
            height: display_height,
        });
    }
    let display = ScreenRect::new(0, 0, display_width, display_height);
    for (index, region) in regions.iter().enumerate() {
        if region.is_empty() {
            return Err(ConfigError::EmptyRegion {
                index,
                region: *region,
            });
        }
        if !display.contains_rect(region) {
            return Err(ConfigError::RegionOutsideDisplay {
                index,
                region: *region,
                display_width,
                display_height,
            });
        }
    }
    for (first, first_region) in regions.iter().enumerate() {
        for (second, second_region) in regions.iter().enumerate().skip(first + 1) {
            if first_region.overlaps(second_region) {
                return Err(ConfigError::OverlappingRegions {
                    first,
                    second,
                    first_region: *first_region,
                    second_region: *second_region,
                });
            }
        }
    }
    Ok(())
}
