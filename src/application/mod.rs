// SPDX-License-Identifier: MPL-2.0
//! Application layer - Use cases and orchestration.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//! - [`staging`]: Files waiting for submission and their previews
//! - [`upload`]: Batch submission to the processing service
//! - [`results`]: Review state of a successful submission
//! - [`download`]: Archive downloads and server-side cleanup
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - Presentation layer uses application layer services

pub mod download;
pub mod port;
pub mod results;
pub mod staging;
pub mod upload;
