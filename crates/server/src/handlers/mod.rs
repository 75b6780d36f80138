//! Blob request handlers.

pub mod delete;
pub mod download;
pub mod head;
pub mod list;
pub mod upload;

pub use delete::Delete;
pub use download::{Download, ProxyDownload};
pub use head::Head;
pub use list::ListBlobs;
pub use upload::Upload;
