// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use only domain types, keeping the staging and review logic
//! independent of iced and of the HTTP client.
//!
//! # Available Ports
//!
//! - [`preview`]: Local preview handles for staged images
//! - [`processing`]: The remote detection service
//!
//! # Example
//!
//! ```ignore
//! use iced_detect::application::port::{ProcessingService, UploadPart};
//! use std::sync::Arc;
//!
//! async fn count_outputs(service: Arc<dyn ProcessingService>, parts: Vec<UploadPart>) -> usize {
//!     service.process(parts).await.map(|r| r.filenames.len()).unwrap_or(0)
//! }
//! ```

pub mod preview;
pub mod processing;

pub use preview::PreviewAllocator;
pub use processing::{
    ProcessingResponse, ProcessingService, ServiceError, ServiceFuture, UploadPart,
};
