use std::path::{Path, PathBuf};
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

use crate::content::{load_world_map, ContentError};
use crate::sim::{GameSession, SessionConfig, SessionError};

use super::input::ActionStates;
use super::metrics::{log_loop_metrics, MetricsAccumulator};
use super::{InputAction, Renderer};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Dungeon".to_string(),
            window_width: 1024,
            window_height: 1024,
            target_tps: 30,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
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
    #[error("failed to load levels: {0}")]
    LoadContent(#[source] ContentError),
    #[error("failed to start session: {0}")]
    StartSession(#[source] SessionError),
}

/// Loads the level manifest from `levels_dir` and starts a session on it.
pub fn load_session(levels_dir: &Path, config: &SessionConfig) -> Result<GameSession, AppError> {
    let world_map = load_world_map(levels_dir).map_err(AppError::LoadContent)?;
    GameSession::new(config, world_map).map_err(AppError::StartSession)
}

/// Opens a window and drives `session` at `config.target_tps` until quit.
pub fn run_app(
    config: LoopConfig,
    mut session: GameSession,
    asset_root: PathBuf,
) -> Result<(), AppError> {
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
    let mut renderer =
        Renderer::new(Arc::clone(&window), asset_root).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::default();

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    accumulator =
                        accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));
                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let events = input_collector.drain_for_tick();
                        let outcome = session.tick(&events);
                        metrics_accumulator.record_tick();
                        if outcome.quit_requested {
                            info!(reason = "quit_key", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.render_world(session.world()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        log_loop_metrics(&snapshot, session.world());
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!(ticks = session.tick_count(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessSummary {
    pub ticks_run: u64,
    pub quit_requested: bool,
}

/// Runs up to `max_ticks` ticks without a window, paced by a blocking
/// `TickLimiter`. `script` supplies the key-down events for each tick number.
pub fn run_headless(
    config: &LoopConfig,
    session: &mut GameSession,
    max_ticks: u64,
    mut script: impl FnMut(u64) -> Vec<InputAction>,
) -> HeadlessSummary {
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let mut limiter = TickLimiter::new(config.target_tps);
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut summary = HeadlessSummary {
        ticks_run: 0,
        quit_requested: false,
    };
    info!(max_ticks, target_tps = config.target_tps.max(1), "headless_started");

    for tick in 1..=max_ticks {
        limiter.wait();
        let events = script(tick);
        let outcome = session.tick(&events);
        summary.ticks_run = tick;
        metrics_accumulator.record_tick();
        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(Instant::now()) {
            log_loop_metrics(&snapshot, session.world());
        }
        if outcome.quit_requested {
            summary.quit_requested = true;
            break;
        }
    }

    info!(
        ticks_run = summary.ticks_run,
        quit_requested = summary.quit_requested,
        "headless_finished"
    );
    summary
}

/// Blocks until the next tick boundary. A late caller is not given a burst of
/// catch-up ticks; the schedule restarts from the current instant instead.
#[derive(Debug)]
pub struct TickLimiter {
    period: Duration,
    next_deadline: Option<Instant>,
}

impl TickLimiter {
    pub fn new(target_tps: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / target_tps.max(1) as f64),
            next_deadline: None,
        }
    }

    pub fn wait(&mut self) {
        let now = Instant::now();
        let (sleep, next) = schedule_tick(self.next_deadline, now, self.period);
        if sleep > Duration::ZERO {
            thread::sleep(sleep);
        }
        self.next_deadline = Some(next);
    }
}

/// Returns how long to sleep before running a tick at or after `now`, and the
/// deadline of the tick after it.
fn schedule_tick(deadline: Option<Instant>, now: Instant, period: Duration) -> (Duration, Instant) {
    match deadline {
        Some(deadline) if deadline > now => (deadline - now, deadline + period),
        _ => (Duration::ZERO, now + period),
    }
}

/// Turns raw winit key events into per-tick key-down events. Movement keys
/// also forward the platform's key-repeat events; every other action fires
/// once per physical press.
#[derive(Debug, Default)]
struct InputCollector {
    action_states: ActionStates,
    pending: Vec<InputAction>,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.handle_physical_key(key_event.physical_key, is_pressed, key_event.repeat);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool, is_repeat: bool) {
        let Some(action) = action_for_key(key) else {
            return;
        };
        let is_edge = self.action_states.set(action, is_pressed);
        let forwards_repeat = is_pressed && is_repeat && action.move_facing().is_some();
        if is_edge || forwards_repeat {
            self.pending.push(action);
        }
    }

    fn drain_for_tick(&mut self) -> Vec<InputAction> {
        std::mem::take(&mut self.pending)
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveNorth),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveWest),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveSouth),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveEast),
        KeyCode::KeyE => Some(InputAction::Interact),
        KeyCode::KeyQ => Some(InputAction::Attack),
        KeyCode::Space => Some(InputAction::Evade),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
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

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
