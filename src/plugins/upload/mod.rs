pub mod intake;
pub mod plugin;

pub use intake::{read_submission, StoredImage, Submission, UploadPolicy};
pub use plugin::UploadsPlugin;
