//! Application bootstrap and lifecycle management.
//!
//! This module provides the `TabHostApp` type, which wires the lifecycle
//! coordinator to its collaborators in the right order and tears it down
//! cleanly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          TabHostApp                          │
//! │                                                              │
//! │  1. Collaborators (sync, store, budget, launcher)            │
//! │  2. LifecycleCoordinator ──► LifecycleEvents, UsageMetrics   │
//! │  3. ForegroundLoop (spawned, cancelled on shutdown)          │
//! │  4. LaunchRouter (scheme allow-list from AppConfig)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tabhost::app::{AppConfig, Collaborators, TabHostApp};
//!
//! let app = TabHostApp::start(AppConfig::default(), collaborators).await?;
//!
//! app.coordinator().on_become_active();
//! let result = app.router().route("tabhost://open-url?url=https://example.com");
//! app.router().dispatch(&result);
//!
//! app.shutdown().await;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{Collaborators, TabHostApp};
pub use config::AppConfig;
pub use error::AppError;
