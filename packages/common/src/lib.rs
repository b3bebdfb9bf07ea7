pub mod asset_status;
pub mod storage;

pub use asset_status::{AssetStatus, TransitionError};
