pub mod assets;
pub mod blog;
pub mod health;
pub mod info;
pub mod upload;
