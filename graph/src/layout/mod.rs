pub mod check;
pub mod engine;
pub mod entry;
pub mod palette;

pub use check::validate;
pub use engine::{compute, working_directory_entry, LayoutEngine};
pub use entry::{GraphEntry, GraphLine, GraphLines};
pub use palette::{color_for, Color, PALETTE};
