// Report layout: fixed Helvetica metrics, one shared wrap rule, and the paginated table engine.
// Layout is CPU-bound; callers on the async runtime run it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod table;
pub mod wrap;

// Re-export the public API consumed by the renderer.
pub use table::{layout_document, DocumentLayout, PaintOp, TableLayoutConfig};
