// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! Concrete implementations of the port traits defined in
//! `application::port`.
//!
//! # Available Adapters
//!
//! - [`http`]: Detection server over HTTP (implements [`ProcessingService`])
//! - [`preview`]: iced image handles (implements [`PreviewAllocator`])
//! - [`files`]: local file reading and the picker dialog
//!
//! [`ProcessingService`]: crate::application::port::ProcessingService
//! [`PreviewAllocator`]: crate::application::port::PreviewAllocator

pub mod files;
pub mod http;
pub mod preview;

pub use http::HttpProcessingService;
pub use preview::IcedPreviewAllocator;
