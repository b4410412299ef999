//! Application layer - tracker state, scheduling and presentation

pub mod dashboard;
pub mod scheduler;
pub mod tracker;

pub use dashboard::{ConsolePresenter, DashboardSink, DashboardView, JsonPresenter, RenderReason};
pub use scheduler::RefreshScheduler;
pub use tracker::{FetchStats, PortfolioTracker, TrackerState};
