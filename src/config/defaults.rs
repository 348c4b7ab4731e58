// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for translation loading.

// ==========================================================================
// Locale Defaults
// ==========================================================================

/// Locale the launcher sources are written in. Selecting it shows source
/// strings unchanged.
pub const DEFAULT_LOCALE: &str = "en-US";

// ==========================================================================
// Translation File Defaults
// ==========================================================================

/// Extension of Qt Linguist translation sources.
pub const TS_EXTENSION: &str = "ts";

/// TS format version written by `lupdate` and by [`crate::catalog::ts::to_string`].
pub const TS_FORMAT_VERSION: &str = "2.1";
