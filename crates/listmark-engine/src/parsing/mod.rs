pub mod analysis;
pub mod code;
pub mod extract;
pub mod inline;
pub mod numbering;
pub mod patterns;
pub mod rope;
pub mod scan;
pub mod types;

pub use analysis::{Analysis, LineRole, analyze, analyze_text};
