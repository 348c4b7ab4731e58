// SPDX-License-Identifier: MPL-2.0
//! Translation catalogs: context-scoped mappings from source strings to
//! localized strings.
//!
//! A [`Catalog`] mirrors one TS file. It groups [`Message`]s under named
//! [`Context`]s (one per UI component, e.g. `MenuController`) and answers
//! lookups by `(context, source)` or `(context, source, comment)`.
//!
//! Catalogs are built once while parsing and then only read, so they are
//! usually shared behind an `Arc`.

pub mod ts;

use std::collections::HashMap;

/// Where a message was extracted from. Tooling metadata only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub filename: String,
    pub line: Option<u32>,
}

impl Location {
    pub fn new(filename: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }
}

/// State of a translation as recorded by the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationStatus {
    #[default]
    Finished,
    Unfinished,
    Obsolete,
    Vanished,
}

impl TranslationStatus {
    /// Parses the `type` attribute of `<translation>`. Unknown values count as finished.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("unfinished") => Self::Unfinished,
            Some("obsolete") => Self::Obsolete,
            Some("vanished") => Self::Vanished,
            _ => Self::Finished,
        }
    }

    pub fn as_attribute(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Obsolete and vanished entries no longer exist in the application sources.
    pub fn is_retired(self) -> bool {
        matches!(self, Self::Obsolete | Self::Vanished)
    }
}

/// One translatable string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub source: String,
    /// Disambiguation comment; part of the lookup key when present.
    pub comment: Option<String>,
    pub translation: String,
    pub numerus: bool,
    pub numerus_forms: Vec<String>,
    pub status: TranslationStatus,
    pub locations: Vec<Location>,
}

impl Message {
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            ..Self::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// The comment part of the lookup key (`""` when absent).
    pub fn key_comment(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    /// The translated text, or the first plural form for numerus messages.
    pub fn text(&self) -> &str {
        if self.numerus {
            self.numerus_forms.first().map(String::as_str).unwrap_or("")
        } else {
            &self.translation
        }
    }

    /// Every translated string this message carries.
    pub fn texts(&self) -> Vec<&str> {
        if self.numerus {
            self.numerus_forms.iter().map(String::as_str).collect()
        } else {
            vec![self.translation.as_str()]
        }
    }

    /// Text usable at runtime: finished and non-empty.
    pub fn usable_text(&self) -> Option<&str> {
        let text = self.text();
        (self.status == TranslationStatus::Finished && !text.is_empty()).then_some(text)
    }
}

/// Messages belonging to one UI component.
#[derive(Debug, Clone, Default)]
pub struct Context {
    name: String,
    messages: Vec<Message>,
    by_source: HashMap<String, Vec<usize>>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a message, keeping duplicates so they can be reported later.
    ///
    /// Lookups resolve to the first message added for a key.
    pub fn push(&mut self, message: Message) {
        self.by_source
            .entry(message.source.clone())
            .or_default()
            .push(self.messages.len());
        self.messages.push(message);
    }

    /// Adds `message`, replacing the first entry with the same key.
    pub fn upsert(&mut self, message: Message) {
        let existing = self.position(&message.source, message.key_comment());
        match existing {
            Some(idx) => self.messages[idx] = message,
            None => self.push(message),
        }
    }

    fn position(&self, source: &str, comment: &str) -> Option<usize> {
        self.by_source
            .get(source)?
            .iter()
            .copied()
            .find(|&idx| self.messages[idx].key_comment() == comment)
    }

    /// Exact lookup by `(source, comment)`.
    pub fn find(&self, source: &str, comment: &str) -> Option<&Message> {
        self.position(source, comment).map(|idx| &self.messages[idx])
    }
}

/// All contexts of one TS file.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    language: String,
    source_language: Option<String>,
    version: String,
    contexts: Vec<Context>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: crate::config::defaults::TS_FORMAT_VERSION.to_string(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_source_language(mut self, source_language: impl Into<String>) -> Self {
        self.source_language = Some(source_language.into());
        self
    }

    /// Target language as written in the file (e.g. `fr`, `zh_CN`).
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source_language(&self) -> Option<&str> {
        self.source_language.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.by_name.get(name).map(|&idx| &self.contexts[idx])
    }

    /// Adds a context. A context whose name already exists is appended to the
    /// existing one, as happens when a TS file repeats a `<context>` block.
    pub fn push_context(&mut self, context: Context) {
        match self.by_name.get(context.name()) {
            Some(&idx) => {
                for message in context.messages {
                    self.contexts[idx].push(message);
                }
            }
            None => {
                self.by_name
                    .insert(context.name.clone(), self.contexts.len());
                self.contexts.push(context);
            }
        }
    }

    /// Iterates `(context name, message)` pairs in file order.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|ctx| ctx.messages().iter().map(move |m| (ctx.name(), m)))
    }

    /// Total number of messages across all contexts.
    pub fn len(&self) -> usize {
        self.contexts.iter().map(Context::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a message without disambiguation comment.
    pub fn translate(&self, context: &str, source: &str) -> Option<&str> {
        self.translate_with_comment(context, source, "")
    }

    /// Looks up `(context, source, comment)`, retrying without the comment
    /// when the disambiguated entry is absent or unusable.
    pub fn translate_with_comment(
        &self,
        context: &str,
        source: &str,
        comment: &str,
    ) -> Option<&str> {
        let ctx = self.context(context)?;
        ctx.find(source, comment)
            .and_then(Message::usable_text)
            .or_else(|| {
                if comment.is_empty() {
                    None
                } else {
                    ctx.find(source, "").and_then(Message::usable_text)
                }
            })
    }

    /// Overlays `other` on top of this catalog; its entries win on equal keys.
    ///
    /// An overlay entry without usable text (unfinished, retired or empty)
    /// never replaces an existing entry.
    pub fn merge(&mut self, other: Catalog) {
        for context in other.contexts {
            match self.by_name.get(context.name()) {
                Some(&idx) => {
                    let target = &mut self.contexts[idx];
                    for message in context.messages {
                        let known = target
                            .find(&message.source, message.key_comment())
                            .is_some();
                        if known && message.usable_text().is_none() {
                            continue;
                        }
                        target.upsert(message);
                    }
                }
                None => self.push_context(context),
            }
        }
    }
}
