pub mod command;
pub mod entity;
pub mod gender;
pub mod value;
