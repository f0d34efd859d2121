// SPDX-License-Identifier: MPL-2.0
//! Media domain types.
//!
//! Raw local payloads and their classification, independent of any
//! presentation or transport concerns.

pub mod types;

pub use types::{mime_type_for, MimeCategory, SourcePayload, IMAGE_EXTENSIONS};
