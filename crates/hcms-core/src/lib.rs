pub mod descriptor;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod naming;

pub use descriptor::{DescriptorOrigin, RemoteDescriptor};
pub use error::{CoreError, ErrorCategory, Result};
pub use loader::{LoadError, LoadRequest, LoadedUnit, ModuleLoader, UnitExport};
pub use manifest::Manifest;
pub use naming::{
    default_route_path, entry_url_for, manifest_url_for, normalize_route_path, title_case,
};
