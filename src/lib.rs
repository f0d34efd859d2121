// SPDX-License-Identifier: MPL-2.0
//! `iced_detect` is a desktop client for a batch object-detection server,
//! built with the Iced GUI framework.
//!
//! Files are staged locally (images get a preview, everything else is
//! listed), submitted in one request, and the annotated images that come
//! back are reviewed in a thumbnail grid and a full-screen carousel. The
//! result archives can be saved to disk; the server-side session is cleaned
//! up when the user leaves the results or closes the window.

#![doc(html_root_url = "https://docs.rs/iced_detect/0.1.0")]

pub mod app;
pub mod application;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod i18n;
pub mod infrastructure;
pub mod ui;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;
