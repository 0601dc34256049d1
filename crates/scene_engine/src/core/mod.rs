//! # Core Engine Module
//!
//! Shared configuration used by every subsystem.

pub mod config;

pub use config::{
    ApplicationConfig, AssetConfig, AtmosphereConfig, Config, ConfigError, EngineConfig, InteractionConfig,
    PhysicsConfig, ShadowConfig, ViewerConfig,
};
