mod config;
mod scheduler;

pub use config::SessionConfig;
pub use scheduler::{
    GameSession, SessionError, TickOutcome, TickPhase, TickReport, PASSIVE_HEAL_AMOUNT,
    PASSIVE_HEAL_RADIUS, TICK_PHASE_ORDER,
};
