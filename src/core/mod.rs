pub mod commands;
pub mod error;
pub mod expr;
pub mod format;
pub mod generate;
pub mod interpreter;
pub mod params;
pub mod select;
pub mod store;
pub mod structure;
pub mod substitute;
