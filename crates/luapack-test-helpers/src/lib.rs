//! Test utilities and fixtures for luapack

pub mod bundle;
pub mod fixtures;
pub mod mocks;

pub use bundle::{
    bundle_files, bundle_files_with_config, bundle_project, fixed_time, FIXED_TIMESTAMP,
};
pub use fixtures::TempProject;
pub use mocks::CountingFileSystem;
