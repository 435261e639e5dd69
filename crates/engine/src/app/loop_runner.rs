use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::metrics::FrameStats;
use super::{InputSnapshot, Renderer, Session, SessionConfig, OVERLAY_TOGGLE_KEY};

#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub max_frame_delta: Duration,
    pub fixed_dt: Option<Duration>,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Split Screen".to_string(),
            window_width: 640,
            window_height: 480,
            target_fps: 60,
            max_frame_delta: Duration::from_millis(250),
            fixed_dt: None,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

impl From<&SessionConfig> for LoopConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            window_title: config.window.title.clone(),
            window_width: config.window.width,
            window_height: config.window.height,
            target_fps: config.timing.target_fps,
            max_frame_delta: Duration::from_millis(config.timing.max_frame_delta_ms),
            fixed_dt: config.timing.fixed_dt(),
            metrics_log_interval: Duration::from_millis(config.timing.metrics_log_interval_ms),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `session` one frame per redraw until the
/// window is closed.
pub fn run_app(config: LoopConfig, mut session: Session) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let (display_width, display_height) = session.display().size();
    let mut renderer = Renderer::new(Arc::clone(&window), display_width, display_height)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_fps = config.target_fps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let frame_target = target_frame_duration(target_fps);
    info!(
        target_fps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        fixed_dt_ms = config.fixed_dt.map(|dt| dt.as_secs_f64() * 1000.0),
        metrics_log_interval_ms = config.metrics_log_interval.as_millis() as u64,
        display_width,
        display_height,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut clock = FrameClock::new(max_frame_delta, config.fixed_dt);
    let mut stats = FrameStats::new(config.metrics_log_interval, Instant::now());
    let mut last_present_instant = Instant::now();
    let mut closing = false;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    closing = true;
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        closing = true;
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        closing = true;
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => input_collector.release_all(),
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    if closing {
                        return;
                    }
                    if input_collector.take_overlay_toggle_pressed() {
                        let overlay_visible = session.toggle_debug_overlay();
                        info!(overlay_visible, "overlay_toggled");
                    }

                    let now = Instant::now();
                    let step = clock.advance(now);
                    let input_snapshot = input_collector.snapshot_for_frame();
                    session.frame(step.sim.as_secs_f32(), &input_snapshot);

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep = compute_cap_sleep(elapsed_since_last_present, frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.present(session.display()) {
                        warn!(error = %error, "renderer_draw_failed");
                        closing = true;
                        window_target.exit();
                        return;
                    }
                    last_present_instant = Instant::now();
                    stats.record_frame(step.raw);

                    if let Some(snapshot) = stats.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            entity_count = session.scene().entity_count(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if !closing {
                    window.request_redraw();
                }
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Tracks which physical keys are currently held.
#[derive(Debug, Default)]
struct InputCollector {
    pressed: HashSet<KeyCode>,
    overlay_toggle_is_down: bool,
    overlay_toggle_pressed_edge: bool,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        if let PhysicalKey::Code(code) = key_event.physical_key {
            self.handle_key(code, key_event.state);
        }
    }

    fn handle_key(&mut self, code: KeyCode, state: ElementState) {
        if code == OVERLAY_TOGGLE_KEY {
            self.handle_overlay_toggle_key_state(state);
            return;
        }
        match state {
            ElementState::Pressed => {
                self.pressed.insert(code);
            }
            ElementState::Released => {
                self.pressed.remove(&code);
            }
        }
    }

    fn handle_overlay_toggle_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.overlay_toggle_is_down {
                    self.overlay_toggle_pressed_edge = true;
                }
                self.overlay_toggle_is_down = true;
            }
            ElementState::Released => self.overlay_toggle_is_down = false,
        }
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        let was_pressed = self.overlay_toggle_pressed_edge;
        self.overlay_toggle_pressed_edge = false;
        was_pressed
    }

    fn release_all(&mut self) {
        self.pressed.clear();
        self.overlay_toggle_is_down = false;
    }

    fn snapshot_for_frame(&self) -> InputSnapshot {
        InputSnapshot::from_pressed(self.pressed.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameStep {
    /// Wall-clock time since the previous frame, unclamped.
    raw: Duration,
    /// Time handed to the simulation.
    sim: Duration,
}

#[derive(Debug)]
struct FrameClock {
    last_frame_instant: Option<Instant>,
    max_frame_delta: Duration,
    fixed_dt: Option<Duration>,
}

impl FrameClock {
    fn new(max_frame_delta: Duration, fixed_dt: Option<Duration>) -> Self {
        Self {
            last_frame_instant: None,
            max_frame_delta,
            fixed_dt,
        }
    }

    /// The first frame always simulates zero time.
    fn advance(&mut self, now: Instant) -> FrameStep {
        let Some(previous) = self.last_frame_instant.replace(now) else {
            return FrameStep {
                raw: Duration::ZERO,
                sim: Duration::ZERO,
            };
        };
        let raw = now.saturating_duration_since(previous);
        let sim = match self.fixed_dt {
            Some(fixed_dt) => fixed_dt,
            None => clamp_frame_delta(raw, self.max_frame_delta),
        };
        FrameStep { raw, sim }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn target_frame_duration(target_fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / target_fps.max(1) as f64)
}

fn compute_cap_sleep(elapsed: Duration, target: Duration) -> Duration {
    target.saturating_sub(elapsed)
}
