//! Shared test utilities for the launcher workspace.
//!
//! This crate provides fixtures for launcher test suites. It is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject) builder for temporary
//!   projects with or without an installed extension package
//! - [`runner`]: [`ScriptedRunner`](runner::ScriptedRunner), a fake process
//!   runner that records every spawn

pub mod project;
pub mod runner;

pub use project::TestProject;
pub use runner::ScriptedRunner;
