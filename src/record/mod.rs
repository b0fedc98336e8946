pub mod loader;
pub mod types;

pub use loader::{load_dataset, load_dataset_pair, write_dataset, ColumnMapping};
pub use types::*;
