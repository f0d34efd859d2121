// SPDX-License-Identifier: MPL-2.0
//! Default values for configuration settings.
//!
//! Clamping bounds live with the newtypes in `domain::newtypes`; the
//! constants here re-export them so config and domain cannot drift apart.

use crate::domain::newtypes::{buffer_capacity_bounds, request_timeout_bounds};

// ==========================================================================
// Server Defaults
// ==========================================================================

/// Address of a locally running detection server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = request_timeout_bounds::DEFAULT_SECS;

/// Minimum request timeout (seconds).
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = request_timeout_bounds::MIN_SECS;

/// Maximum request timeout (seconds). Large batches can take minutes.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = request_timeout_bounds::MAX_SECS;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

pub const DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY: usize = buffer_capacity_bounds::DEFAULT;
pub const MIN_DIAGNOSTICS_BUFFER_CAPACITY: usize = buffer_capacity_bounds::MIN;
pub const MAX_DIAGNOSTICS_BUFFER_CAPACITY: usize = buffer_capacity_bounds::MAX;

// ==========================================================================
// UI Defaults
// ==========================================================================

/// Preview tiles per row on the upload screen.
pub const PREVIEW_GRID_COLUMNS: usize = 4;

/// Edge length of a preview tile (logical pixels).
pub const PREVIEW_TILE_SIZE: f32 = 160.0;

/// How often toasts are checked for expiry (milliseconds).
pub const NOTIFICATION_TICK_MS: u64 = 250;
