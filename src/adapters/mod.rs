// Adapters layer: turns external artifacts into domain types.

pub mod spreadsheet;

pub use spreadsheet::parse_dataset;
