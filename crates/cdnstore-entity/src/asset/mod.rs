//! Asset domain entities.

pub mod group;
pub mod model;
pub mod size;
pub mod state;
pub mod subject;

pub use group::AssetGroup;
pub use model::{Asset, AssetFilter, NewAsset, UpdateAsset};
pub use size::SizeLabel;
pub use state::{LifecycleAction, LifecycleState};
pub use subject::{SubjectKind, SubjectRef};
