pub mod handlers;
pub mod models;
pub mod plugin;
pub mod submission;

pub use models::*;
pub use plugin::BlogPlugin;
