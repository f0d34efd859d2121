// SPDX-License-Identifier: MPL-2.0
//! User interface components.
//!
//! Elm-style "state down, messages up": each page owns its state, turns its
//! `Message`s into an `Event` and leaves side effects to the application.
//!
//! # Screens
//!
//! - [`upload_page`] - staging, previews and submission
//! - [`results_page`] - processed images and archive downloads
//! - [`carousel_view`] - full-screen viewer shared by both screens
//!
//! # Shared Infrastructure
//!
//! - [`design_tokens`] - colors, spacing, sizing
//! - [`styles`] - button and container styles
//! - [`theming`] - light/dark/system theme mode
//! - [`notifications`] - toast notifications

pub mod carousel_view;
pub mod design_tokens;
pub mod notifications;
pub mod results_page;
pub mod styles;
pub mod theming;
pub mod upload_page;
