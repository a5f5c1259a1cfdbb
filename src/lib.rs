//! swan-config: typed SWAN configuration compiled to command-file text
//!
//! This crate contains the configuration model and its text rendering with
//! NO I/O outside the file loader:
//! - Field validation with aggregated, path-carrying errors
//! - `model_type` discriminated unions resolved through serde
//! - Components and subcomponents for the SWAN command set
//! - Groups emitted as fixed-order command blocks
//! - Interface adapters binding run period, grid, forcing data and spectra
//! - Document assembly in fixed section order
//! - YAML/JSON configuration loader

pub mod components;
pub mod config;
pub mod error;
pub mod group;
pub mod interface;
pub mod loader;
pub mod render;
pub mod subcomponents;
pub mod tagged;
pub mod validate;

// Re-export commonly used types
pub use components::Component;
pub use config::{Boundary, InpgridSource, SwanConfig, SwanConfigBuilder};
pub use error::{ConfigError, FieldError, Result};
pub use group::{Group, Inpgrids, Lockup, Output, Physics, Startup};
pub use interface::{
    Bindings, DataDescriptor, DataSource, RunPeriod, SpatialGrid, SpectralSource,
};
pub use loader::ConfigLoader;
pub use render::{TokenLine, CONTINUATION, INDENT, MAX_WIDTH};
pub use tagged::{TaggedUnion, TAG_KEY};
pub use validate::{build, Validate, Validator};
