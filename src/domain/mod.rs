// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core types and rules with ZERO external dependencies.
//!
//! # Modules
//!
//! - [`carousel`]: Full-screen review state machine ([`Carousel`](carousel::Carousel))
//! - [`media`]: Local payloads and their classification
//!   ([`SourcePayload`](media::SourcePayload), [`MimeCategory`](media::MimeCategory))
//! - [`newtypes`]: Clamped configuration values
//! - [`results`]: Server results and archives
//!   ([`ResultItem`](results::ResultItem), [`ArchiveKind`](results::ArchiveKind))

pub mod carousel;
pub mod media;
pub mod newtypes;
pub mod results;
