// SPDX-License-Identifier: MPL-2.0
//! Consistency checks for translation catalogs.
//!
//! These run at tooling time (`launcher-l10n check`) and in tests; lookups
//! never depend on them.

use crate::catalog::Catalog;
use crate::placeholder;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The same `(source, comment)` key appears more than once in a context.
    DuplicateSource,
    /// `%n` is used by the source but dropped by the translation.
    MissingPlaceholder(u8),
    /// `%n` is used by the translation but not by the source.
    UnexpectedPlaceholder(u8),
    /// Only one side of the pair carries a keyboard accelerator.
    MnemonicMismatch,
    /// Empty or unfinished translation; the source string will be shown.
    Untranslated,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::DuplicateSource
            | IssueKind::MissingPlaceholder(_)
            | IssueKind::UnexpectedPlaceholder(_) => Severity::Error,
            IssueKind::MnemonicMismatch | IssueKind::Untranslated => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub context: String,
    pub source: String,
    pub kind: IssueKind,
}

impl Issue {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} / \"{}\": ", level, self.context, self.source)?;
        match &self.kind {
            IssueKind::DuplicateSource => write!(f, "duplicate source string"),
            IssueKind::MissingPlaceholder(n) => {
                write!(f, "translation is missing placeholder %{}", n)
            }
            IssueKind::UnexpectedPlaceholder(n) => {
                write!(f, "translation adds placeholder %{} not in source", n)
            }
            IssueKind::MnemonicMismatch => write!(f, "accelerator marker mismatch"),
            IssueKind::Untranslated => write!(f, "untranslated"),
        }
    }
}

/// Checks every context of `catalog`. Obsolete and vanished entries are ignored.
pub fn validate(catalog: &Catalog) -> Vec<Issue> {
    let mut issues = Vec::new();

    for context in catalog.contexts() {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for message in context.messages() {
            if message.status.is_retired() {
                continue;
            }
            let mut report = |kind| {
                issues.push(Issue {
                    context: context.name().to_string(),
                    source: message.source.clone(),
                    kind,
                })
            };

            if !seen.insert((message.source.as_str(), message.key_comment())) {
                report(IssueKind::DuplicateSource);
            }

            if message.usable_text().is_none() {
                report(IssueKind::Untranslated);
                continue;
            }

            let expected = placeholder::placeholders(&message.source);
            let mut missing = BTreeSet::new();
            let mut unexpected = BTreeSet::new();
            for text in message.texts() {
                let found = placeholder::placeholders(text);
                missing.extend(expected.difference(&found).copied());
                unexpected.extend(found.difference(&expected).copied());
            }
            for n in missing {
                report(IssueKind::MissingPlaceholder(n));
            }
            for n in unexpected {
                report(IssueKind::UnexpectedPlaceholder(n));
            }

            let source_has_mnemonic = placeholder::mnemonic(&message.source).is_some();
            if message
                .texts()
                .iter()
                .any(|text| placeholder::mnemonic(text).is_some() != source_has_mnemonic)
            {
                report(IssueKind::MnemonicMismatch);
            }
        }
    }

    issues
}

/// True when none of `issues` is an error.
pub fn is_clean(issues: &[Issue]) -> bool {
    issues.iter().all(|issue| issue.severity() < Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Context, Message, TranslationStatus};

    fn catalog_with(messages: Vec<Message>) -> Catalog {
        let mut context = Context::new("LauncherApp");
        for message in messages {
            context.push(message);
        }
        let mut catalog = Catalog::new("fr");
        catalog.push_context(context);
        catalog
    }

    #[test]
    fn consistent_catalog_has_no_issues() {
        let catalog = catalog_with(vec![
            Message::new(
                "Are you sure to uninstall %1 ?",
                "Êtes vous sûr de désinstaller %1 ?",
            ),
            Message::new("Open(_O)", "Ouvrir(_O)"),
        ]);
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn reports_duplicate_sources() {
        let catalog = catalog_with(vec![
            Message::new("Cancel", "Annuler"),
            Message::new("Cancel", "Abandonner"),
        ]);
        let issues = validate(&catalog);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DuplicateSource);
        assert!(!is_clean(&issues));
    }

    #[test]
    fn same_source_with_distinct_comments_is_not_duplicate() {
        let catalog = catalog_with(vec![
            Message::new("Open", "Ouvrir").with_comment("menu"),
            Message::new("Open", "Ouvert").with_comment("state"),
        ]);
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn reports_missing_and_extra_placeholders() {
        let catalog = catalog_with(vec![
            Message::new("Are you sure to uninstall %1 ?", "Êtes vous sûr ?"),
            Message::new("Uninstall", "Désinstaller %2"),
        ]);
        let kinds: Vec<_> = validate(&catalog).into_iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::MissingPlaceholder(1),
                IssueKind::UnexpectedPlaceholder(2)
            ]
        );
    }

    #[test]
    fn mnemonic_mismatch_is_only_a_warning() {
        let catalog = catalog_with(vec![Message::new("Send to dock(_C)", "Épingler au lanceur")]);
        let issues = validate(&catalog);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MnemonicMismatch);
        assert!(is_clean(&issues));
    }

    #[test]
    fn untranslated_entries_are_warned_once() {
        let catalog = catalog_with(vec![
            Message::new("By name", ""),
            Message::new("By frequency %1", "").with_status(TranslationStatus::Unfinished),
        ]);
        let issues = validate(&catalog);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.kind == IssueKind::Untranslated));
    }

    #[test]
    fn retired_entries_are_ignored() {
        let catalog = catalog_with(vec![
            Message::new("Cancel", "Annuler"),
            Message::new("Cancel", "Annuler %3").with_status(TranslationStatus::Obsolete),
        ]);
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn issue_display_names_context_and_source() {
        let issue = Issue {
            context: "MenuController".to_string(),
            source: "Uninstall".to_string(),
            kind: IssueKind::MissingPlaceholder(1),
        };
        assert_eq!(
            issue.to_string(),
            "error: MenuController / \"Uninstall\": translation is missing placeholder %1"
        );
    }
}
