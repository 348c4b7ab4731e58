// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the launcher.
//!
//! This module loads Qt Linguist `.ts` catalogs and answers context-scoped
//! lookups for the current locale.
//!
//! # Features
//!
//! - Catalogs embedded at build time from `assets/translations/`
//! - Optional directory of extra `.ts` files that override embedded entries
//! - Automatic locale detection from CLI, config, or system settings
//! - Runtime language switching
//! - Fallback to the source string when a translation is missing
//!
//! A [`Translator`] is cheap to clone; catalogs are shared behind `Arc` and
//! never mutated after loading, so clones can be handed to any thread.

use crate::catalog::{ts, Catalog};
use crate::config::{Config, DEFAULT_LOCALE, TS_EXTENSION};
use crate::error::{Error, Result};
use crate::placeholder;
use rust_embed::RustEmbed;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "assets/translations/"]
struct Asset;

#[derive(Debug, Clone)]
pub struct Translator {
    catalogs: HashMap<LanguageIdentifier, Arc<Catalog>>,
    available_locales: Vec<LanguageIdentifier>,
    current_locale: LanguageIdentifier,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(None, &Config::default())
    }
}

impl Translator {
    /// Loads embedded and configured catalogs and picks the best locale.
    pub fn new(cli_lang: Option<String>, config: &Config) -> Self {
        let mut catalogs = HashMap::new();
        load_embedded(&mut catalogs);
        if let Some(dir) = &config.general.translations_dir {
            load_directory(dir, &mut catalogs);
        }

        let mut translator = Self::with_catalogs(catalogs);
        let system = sys_locale::get_locale();
        if let Some(locale) = resolve_locale(
            cli_lang.as_deref(),
            config.general.language.as_deref(),
            system.as_deref(),
            &translator.available_locales,
        ) {
            translator.current_locale = locale;
        }
        tracing::debug!(locale = %translator.current_locale, "translator ready");
        translator
    }

    /// Builds a translator from already parsed catalogs, starting on the
    /// source locale. Catalogs whose `language` cannot be parsed are skipped.
    pub fn from_catalogs(catalogs: impl IntoIterator<Item = Catalog>) -> Self {
        let mut by_locale = HashMap::new();
        for catalog in catalogs {
            match parse_locale(catalog.language()) {
                Some(locale) => add_catalog(&mut by_locale, locale, catalog),
                None => tracing::warn!(
                    language = catalog.language(),
                    "skipping catalog with unknown language"
                ),
            }
        }
        Self::with_catalogs(by_locale)
    }

    fn with_catalogs(catalogs: HashMap<LanguageIdentifier, Catalog>) -> Self {
        let source_locale = source_locale();
        let mut available_locales: Vec<LanguageIdentifier> = catalogs.keys().cloned().collect();
        if !available_locales.contains(&source_locale) {
            available_locales.push(source_locale.clone());
        }
        available_locales.sort_by_key(|locale| locale.to_string());

        Self {
            catalogs: catalogs
                .into_iter()
                .map(|(locale, catalog)| (locale, Arc::new(catalog)))
                .collect(),
            available_locales,
            current_locale: source_locale,
        }
    }

    pub fn available_locales(&self) -> &[LanguageIdentifier] {
        &self.available_locales
    }

    pub fn current_locale(&self) -> &LanguageIdentifier {
        &self.current_locale
    }

    /// Switches to `locale` if it is available. Returns whether it changed.
    pub fn set_locale(&mut self, locale: LanguageIdentifier) -> bool {
        if self.available_locales.contains(&locale) {
            tracing::debug!(from = %self.current_locale, to = %locale, "switching locale");
            self.current_locale = locale;
            true
        } else {
            false
        }
    }

    /// Switches to the best available match for a user-supplied locale string
    /// (`fr`, `fr_FR.UTF-8`, `zh-CN`, ...).
    pub fn select(&mut self, requested: &str) -> Result<&LanguageIdentifier> {
        let locale = parse_locale(requested)
            .and_then(|lang| match_available(&lang, &self.available_locales))
            .ok_or_else(|| Error::UnknownLocale(requested.to_string()))?;
        self.set_locale(locale);
        Ok(&self.current_locale)
    }

    pub fn catalog(&self, locale: &LanguageIdentifier) -> Option<Arc<Catalog>> {
        self.catalogs.get(locale).cloned()
    }

    /// Catalog of the current locale; `None` for the source locale.
    pub fn current_catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog(&self.current_locale)
    }

    /// Localized string for `source` in `context`, or `source` itself.
    pub fn tr(&self, context: &str, source: &str) -> String {
        self.tr_with_comment(context, source, "")
    }

    pub fn tr_with_comment(&self, context: &str, source: &str, comment: &str) -> String {
        self.catalogs
            .get(&self.current_locale)
            .and_then(|catalog| catalog.translate_with_comment(context, source, comment))
            .unwrap_or(source)
            .to_string()
    }

    /// Translates, then fills `%1`, `%2`, ... with `args`.
    pub fn tr_args(&self, context: &str, source: &str, args: &[&str]) -> String {
        placeholder::format(&self.tr(context, source), args)
    }
}

fn source_locale() -> LanguageIdentifier {
    DEFAULT_LOCALE.parse().unwrap_or_default()
}

fn add_catalog(
    catalogs: &mut HashMap<LanguageIdentifier, Catalog>,
    locale: LanguageIdentifier,
    catalog: Catalog,
) {
    tracing::debug!(%locale, messages = catalog.len(), "loaded catalog");
    match catalogs.get_mut(&locale) {
        Some(existing) => existing.merge(catalog),
        None => {
            catalogs.insert(locale, catalog);
        }
    }
}

fn has_ts_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == TS_EXTENSION)
}

fn load_embedded(catalogs: &mut HashMap<LanguageIdentifier, Catalog>) {
    for file in Asset::iter() {
        let filename = file.as_ref();
        if !has_ts_extension(filename) {
            continue;
        }
        let Some(content) = Asset::get(filename) else {
            continue;
        };
        let text = String::from_utf8_lossy(content.data.as_ref());
        match ts::parse_str(&text) {
            Ok(catalog) => register(catalogs, filename, catalog),
            Err(err) => {
                tracing::warn!(file = filename, error = %err, "skipping embedded translation")
            }
        }
    }
}

fn load_directory(dir: &Path, catalogs: &mut HashMap<LanguageIdentifier, Catalog>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "cannot read translations directory");
            return;
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_ts_extension(&path.to_string_lossy()))
        .collect();
    paths.sort();

    for path in paths {
        match ts::parse_file(&path) {
            Ok(catalog) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                register(catalogs, &name, catalog);
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "skipping translation file")
            }
        }
    }
}

fn register(
    catalogs: &mut HashMap<LanguageIdentifier, Catalog>,
    filename: &str,
    catalog: Catalog,
) {
    let locale = parse_locale(catalog.language()).or_else(|| locale_from_file_name(filename));
    match locale {
        Some(locale) => add_catalog(catalogs, locale, catalog),
        None => tracing::warn!(file = filename, "cannot determine locale of translation file"),
    }
}

/// Parses BCP-47 tags as well as POSIX names such as `fr_FR.UTF-8@euro`.
pub fn parse_locale(raw: &str) -> Option<LanguageIdentifier> {
    let tag = raw.trim().split(['.', '@']).next().unwrap_or("");
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    tag.replace('_', "-").parse().ok()
}

/// Extracts the locale from names like `dde-launcher_fr.ts` or `dde-launcher_zh_CN.ts`.
fn locale_from_file_name(name: &str) -> Option<LanguageIdentifier> {
    let stem = Path::new(name).file_stem()?.to_str()?;
    let (rest, last) = stem.rsplit_once('_')?;
    let candidate = if last.chars().all(|c| c.is_ascii_uppercase()) {
        let language = rest.rsplit('_').next()?;
        format!("{}-{}", language, last)
    } else {
        last.to_string()
    };
    candidate.parse().ok()
}

/// Exact match first, then any available locale with the same language.
fn match_available(
    lang: &LanguageIdentifier,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    if available.contains(lang) {
        return Some(lang.clone());
    }
    available
        .iter()
        .find(|candidate| candidate.language == lang.language)
        .cloned()
}

fn resolve_locale(
    cli_lang: Option<&str>,
    config_lang: Option<&str>,
    system_lang: Option<&str>,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    [cli_lang, config_lang, system_lang]
        .into_iter()
        .flatten()
        .filter_map(parse_locale)
        .find_map(|lang| match_available(&lang, available))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Context, Message};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn locales(tags: &[&str]) -> Vec<LanguageIdentifier> {
        tags.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn french() -> Translator {
        let mut translator = Translator::new(Some("fr".to_string()), &Config::default());
        translator.select("fr").expect("embedded French catalog");
        translator
    }

    #[test]
    fn test_resolve_locale_cli() {
        let available = locales(&["en-US", "fr"]);
        let lang = resolve_locale(Some("fr"), Some("en-US"), None, &available);
        assert_eq!(lang, Some("fr".parse().unwrap()));
    }

    #[test]
    fn test_resolve_locale_config() {
        let available = locales(&["en-US", "fr"]);
        let lang = resolve_locale(None, Some("fr"), Some("en-US"), &available);
        assert_eq!(lang, Some("fr".parse().unwrap()));
    }

    #[test]
    fn test_resolve_locale_system() {
        let available = locales(&["en-US", "fr"]);
        let lang = resolve_locale(None, None, Some("fr_FR.UTF-8"), &available);
        assert_eq!(lang, Some("fr".parse().unwrap()));
    }

    #[test]
    fn test_resolve_locale_skips_unavailable_candidates() {
        let available = locales(&["en-US", "fr"]);
        let lang = resolve_locale(Some("ja"), Some("fr-CA"), None, &available);
        assert_eq!(lang, Some("fr".parse().unwrap()));
        assert_eq!(resolve_locale(Some("ja"), None, None, &available), None);
    }

    #[test]
    fn parse_locale_accepts_posix_names() {
        assert_eq!(parse_locale("zh_CN.UTF-8"), Some("zh-CN".parse().unwrap()));
        assert_eq!(parse_locale("de_DE@euro"), Some("de-DE".parse().unwrap()));
        assert_eq!(parse_locale("C"), None);
        assert_eq!(parse_locale(""), None);
    }

    #[test]
    fn locale_from_file_name_handles_regions() {
        assert_eq!(
            locale_from_file_name("dde-launcher_fr.ts"),
            Some("fr".parse().unwrap())
        );
        assert_eq!(
            locale_from_file_name("dde-launcher_zh_CN.ts"),
            Some("zh-CN".parse().unwrap())
        );
        assert_eq!(locale_from_file_name("dde-launcher.ts"), None);
    }

    #[test]
    fn embedded_french_catalog_is_available() {
        let translator = Translator::new(None, &Config::default());
        assert!(translator
            .available_locales()
            .contains(&"fr".parse().unwrap()));
        assert!(translator
            .available_locales()
            .contains(&DEFAULT_LOCALE.parse().unwrap()));
    }

    #[test]
    fn translates_known_pair() {
        let translator = french();
        assert_eq!(translator.tr("MenuController", "Uninstall"), "Désinstaller");
        assert_eq!(translator.tr("ConfirmUninstallDialog", "Cancel"), "Annuler");
    }

    #[test]
    fn unknown_pair_returns_source() {
        let translator = french();
        assert_eq!(translator.tr("MenuController", "Rename"), "Rename");
        assert_eq!(translator.tr("NoSuchContext", "Uninstall"), "Uninstall");
    }

    #[test]
    fn tr_args_substitutes_after_translation() {
        let translator = french();
        assert_eq!(
            translator.tr_args("LauncherApp", "Are you sure to uninstall %1 ?", &["Firefox"]),
            "Êtes vous sûr de désinstaller Firefox ?"
        );
    }

    #[test]
    fn source_locale_is_identity() {
        let mut translator = french();
        assert!(translator.set_locale(DEFAULT_LOCALE.parse().unwrap()));
        assert_eq!(translator.tr("MenuController", "Uninstall"), "Uninstall");
        assert!(translator.current_catalog().is_none());
    }

    #[test]
    fn set_locale_rejects_unknown_locale() {
        let mut translator = french();
        assert!(!translator.set_locale("ja".parse().unwrap()));
        assert_eq!(translator.current_locale().to_string(), "fr");
    }

    #[test]
    fn select_falls_back_to_language_and_reports_unknown() {
        let mut translator = Translator::new(None, &Config::default());
        let selected = translator.select("fr_CA.UTF-8").expect("language match");
        assert_eq!(selected.to_string(), "fr");
        assert!(matches!(
            translator.select("ja"),
            Err(Error::UnknownLocale(tag)) if tag == "ja"
        ));
        assert_eq!(translator.current_locale().to_string(), "fr");
    }

    #[test]
    fn from_catalogs_keys_by_language_attribute() {
        let mut context = Context::new("MenuController");
        context.push(Message::new("Uninstall", "Deinstallieren"));
        let mut catalog = Catalog::new("de_DE");
        catalog.push_context(context);

        let mut translator = Translator::from_catalogs([catalog]);
        assert_eq!(translator.current_locale().to_string(), DEFAULT_LOCALE);
        translator.select("de").expect("region fallback");
        assert_eq!(translator.tr("MenuController", "Uninstall"), "Deinstallieren");
    }

    #[test]
    fn translations_dir_overrides_embedded_entries() {
        let dir = tempdir().expect("failed to create temp dir");
        fs::write(
            dir.path().join("dde-launcher_fr.ts"),
            r#"<?xml version="1.0" ?><!DOCTYPE TS><TS language="fr" version="2.1">
<context>
    <name>MenuController</name>
    <message>
        <source>Uninstall</source>
        <translation>Supprimer l&apos;application</translation>
    </message>
</context>
</TS>"#,
        )
        .expect("write overlay");
        fs::write(dir.path().join("broken.ts"), "<TS><context>").expect("write broken file");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write unrelated file");

        let config = Config {
            general: crate::config::GeneralConfig {
                language: Some("fr".to_string()),
                translations_dir: Some(dir.path().to_path_buf()),
            },
        };
        let translator = Translator::new(None, &config);

        assert_eq!(translator.current_locale().to_string(), "fr");
        assert_eq!(
            translator.tr("MenuController", "Uninstall"),
            "Supprimer l'application"
        );
        assert_eq!(translator.tr("MenuController", "Open(_O)"), "Ouvrir(_O)");
    }

    #[test]
    fn unfinished_overlay_entries_keep_embedded_text() {
        let dir = tempdir().expect("failed to create temp dir");
        fs::write(
            dir.path().join("dde-launcher_fr.ts"),
            r#"<?xml version="1.0" ?><!DOCTYPE TS><TS language="fr" version="2.1">
<context>
    <name>MenuController</name>
    <message>
        <source>Uninstall</source>
        <translation type="unfinished"></translation>
    </message>
    <message>
        <source>Open(_O)</source>
        <translation type="unfinished">Ouvrir le dossier(_O)</translation>
    </message>
</context>
</TS>"#,
        )
        .expect("write overlay");

        let config = Config {
            general: crate::config::GeneralConfig {
                language: Some("fr".to_string()),
                translations_dir: Some(dir.path().to_path_buf()),
            },
        };
        let translator = Translator::new(None, &config);

        assert_eq!(translator.tr("MenuController", "Uninstall"), "Désinstaller");
        assert_eq!(translator.tr("MenuController", "Open(_O)"), "Ouvrir(_O)");
    }

    #[test]
    fn missing_translations_dir_is_not_fatal() {
        let config = Config {
            general: crate::config::GeneralConfig {
                language: Some("fr".to_string()),
                translations_dir: Some(PathBuf::from("/nonexistent/launcher/translations")),
            },
        };
        let translator = Translator::new(None, &config);
        assert_eq!(translator.tr("MenuController", "Uninstall"), "Désinstaller");
    }

    #[test]
    fn translator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Translator>();

        let translator = french();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let translator = translator.clone();
                std::thread::spawn(move || translator.tr("DisplayModeFrame", "By name"))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "Par Nom");
        }
    }
}
