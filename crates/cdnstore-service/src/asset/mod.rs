//! Asset queries, lifecycle transitions and upload orchestration.

pub mod lifecycle;
pub mod service;
pub mod upload;

pub use lifecycle::LifecycleManager;
pub use service::AssetService;
pub use upload::{UploadRequest, UploadService};
