pub mod aggregate;
pub mod history_index;
pub mod ordering;
pub mod upsert;

pub use aggregate::aggregate;
pub use history_index::HistoryIndex;
pub use ordering::sorted_view_models;
pub use upsert::{save_history, HistoryStore};
