//! # EventRouter Testing Utils
//!
//! Shared testing utilities for the event router workspace.
//! This crate provides in-memory doubles for the cluster and notification seams
//! so that no test needs a live cluster or real notification targets.
//!
//! ## Features
//!
//! - **Mock Object Resolver**: in-memory `DynamicObject` store with merge-patch recording
//! - **Recording Notifier**: captures every delivered notification job
//! - **Test Data Builders**: events, owned objects and Registration resources
//! - **Helpers**: polling utilities for asynchronous assertions
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! eventrouter-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use helpers::*;
pub use mocks::*;
