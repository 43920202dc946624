pub mod loader;
pub mod pack;
pub mod phase;
pub mod render_set;
pub mod visibility;

// Re-exports for convenience
pub use loader::{ChartLoader, LoadPlan, LoadProgress, LoaderUpdate};
pub use pack::{ChartPackRef, ScaleBand};
pub use phase::LoadingPhase;
pub use render_set::RenderSet;
pub use visibility::{is_visible_at_zoom, query_scope};
