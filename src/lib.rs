// SPDX-License-Identifier: MPL-2.0
//! `launcher_l10n` loads the desktop launcher's translation catalogs and
//! resolves UI strings by context and source text.
//!
//! Catalogs use the Qt Linguist TS format. Lookups fall back to the source
//! string, so a missing translation never prevents a label from rendering.
//!
//! ```
//! use launcher_l10n::config::Config;
//! use launcher_l10n::i18n::Translator;
//!
//! let mut translator = Translator::new(None, &Config::default());
//! translator.select("fr").unwrap();
//! assert_eq!(translator.tr("MenuController", "Uninstall"), "Désinstaller");
//! assert_eq!(translator.tr("MenuController", "Rename"), "Rename");
//! ```

#![doc(html_root_url = "https://docs.rs/launcher_l10n/0.1.0")]

pub mod catalog;
pub mod config;
pub mod error;
pub mod i18n;
pub mod paths;
pub mod placeholder;
pub mod validate;
