//! Parley service configuration.
//!
//! `ParleyConfig` is read from JSON5 layers (user, cwd, `--config`), checked
//! against the schema layer by layer, merged, and then adjusted by the
//! `PORT` and `PARLEY_MODEL` environment variables.

mod error;
mod loader;
mod model;

pub use error::ConfigError;
pub use loader::{
    ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions, MODEL_ENV, PORT_ENV,
};
pub use model::*;
