//! Configuration management for py-builder
//!
//! - **profile**: JSON profiles holding the form's option state
//! - **settings**: application-wide settings under the platform config dir

pub mod profile;
pub mod settings;

pub use settings::Settings;
