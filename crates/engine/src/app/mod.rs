mod input;
mod loop_runner;
mod metrics;
mod rendering;

pub use input::InputAction;
pub use loop_runner::{
    load_session, run_app, run_headless, AppError, HeadlessSummary, LoopConfig, TickLimiter,
};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{level_origin_px, world_to_screen_px, Renderer, Viewport};
