//! `wablast-core` — shared configuration and error types.
//!
//! Every other crate in the workspace depends on this one for the
//! `WablastConfig` loaded from `wablast.toml` + `WABLAST_*` env
//! overrides and for the top-level error enum.

pub mod config;
pub mod error;

pub use config::WablastConfig;
pub use error::{Result, WablastError};
