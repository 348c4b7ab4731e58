// SPDX-License-Identifier: MPL-2.0
//! Reading and writing Qt Linguist TS files.
//!
//! ```text
//! <?xml version="1.0" ?><!DOCTYPE TS><TS language="fr" version="2.1">
//! <context>
//!     <name>MenuController</name>
//!     <message>
//!         <location filename="../controller/menucontroller.cpp" line="91"/>
//!         <source>Uninstall</source>
//!         <translation>Désinstaller</translation>
//!     </message>
//! </context>
//! </TS>
//! ```
//!
//! Elements the runtime has no use for (`extracomment`, `translatorcomment`,
//! `oldsource`, `userdata`, ...) are skipped. Location lines may be absolute
//! or relative (`+3`) to the previous location in the same file, as written
//! by `lupdate -locations relative`.
//!
//! Control characters are escaped as `<byte value="x1b"/>`, since XML 1.0
//! cannot carry them. Of several `<lengthvariant>`s only the first (longest)
//! one is kept.

use super::{Catalog, Context, Location, Message, TranslationStatus};
use crate::error::{Error, ParseError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Parses a TS document held in memory.
pub fn parse_str(text: &str) -> Result<Catalog> {
    let mut reader = Reader::from_str(text);
    let mut state = ReadState::default();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|err| xml_error(reader.error_position() as u64, err))?;

        match event {
            Event::Start(ref e) => {
                if state.start(e, position)? == Step::Skip {
                    reader
                        .read_to_end(e.name())
                        .map_err(|err| xml_error(reader.error_position() as u64, err))?;
                }
            }
            Event::Empty(ref e) => {
                if state.start(e, position)? == Step::Enter {
                    state.end(e.name().as_ref())?;
                }
            }
            Event::End(ref e) => state.end(e.name().as_ref())?,
            Event::Text(ref e) => {
                if state.field.is_some() {
                    let text = e.unescape().map_err(|err| xml_error(position, err))?;
                    state.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if state.field.is_some() {
                    state.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => {
                if state.context.is_some() || state.message.is_some() {
                    return Err(xml_error(position, "unexpected end of document"));
                }
                break;
            }
            _ => {}
        }
    }

    state.catalog.ok_or(Error::Parse(ParseError::MissingRoot))
}

/// Reads and parses a TS file from disk.
pub fn parse_file(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

fn xml_error(position: u64, err: impl fmt::Display) -> Error {
    Error::Parse(ParseError::Xml {
        position,
        message: err.to_string(),
    })
}

fn attribute(e: &BytesStart<'_>, name: &str, position: u64) -> Result<Option<String>> {
    match e.try_get_attribute(name) {
        Ok(Some(attr)) => {
            let value = attr
                .unescape_value()
                .map_err(|err| xml_error(position, err))?;
            Ok(Some(value.into_owned()))
        }
        Ok(None) => Ok(None),
        Err(err) => Err(xml_error(position, err)),
    }
}

/// Decodes `<byte value="..">`: hexadecimal with an `x` prefix, decimal otherwise.
fn decode_byte(value: String, position: u64) -> Result<char> {
    let code = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse::<u32>().ok(),
    };
    code.and_then(char::from_u32)
        .ok_or(Error::Parse(ParseError::InvalidByte { value, position }))
}

fn needs_byte_escape(c: char) -> bool {
    (c < ' ' || (c > '\u{7f}' && c.is_control())) && !matches!(c, '\n' | '\t')
}

fn unexpected(e: &BytesStart<'_>, position: u64) -> Error {
    Error::Parse(ParseError::UnexpectedElement {
        element: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        position,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ContextName,
    Source,
    Comment,
    Translation,
    NumerusForm,
    LengthVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Enter,
    Skip,
}

struct PendingContext {
    name: Option<String>,
    messages: Vec<Message>,
    position: u64,
}

struct PendingMessage {
    message: Message,
    has_source: bool,
    position: u64,
}

#[derive(Default)]
struct ReadState {
    catalog: Option<Catalog>,
    context: Option<PendingContext>,
    message: Option<PendingMessage>,
    field: Option<Field>,
    text: String,
    variant: Option<String>,
    variant_parent: Option<Field>,
    last_file: Option<String>,
    last_lines: HashMap<String, u32>,
}

impl ReadState {
    fn begin_field(&mut self, field: Field) {
        self.field = Some(field);
        self.text.clear();
    }

    fn start(&mut self, e: &BytesStart<'_>, position: u64) -> Result<Step> {
        let name = e.name();
        let name = name.as_ref();

        if self.catalog.is_none() {
            if name != b"TS" {
                return Err(Error::Parse(ParseError::MissingRoot));
            }
            let language = attribute(e, "language", position)?.unwrap_or_default();
            let mut catalog = Catalog::new(language);
            if let Some(version) = attribute(e, "version", position)? {
                catalog = catalog.with_version(version);
            }
            if let Some(source_language) = attribute(e, "sourcelanguage", position)? {
                catalog = catalog.with_source_language(source_language);
            }
            self.catalog = Some(catalog);
            return Ok(Step::Enter);
        }

        match (name, self.context.is_some(), self.message.is_some()) {
            (b"byte", _, _) if self.field.is_some() => {
                let value = attribute(e, "value", position)?.unwrap_or_default();
                self.text.push(decode_byte(value, position)?);
                return Ok(Step::Skip);
            }
            (b"context", false, _) => {
                self.context = Some(PendingContext {
                    name: None,
                    messages: Vec::new(),
                    position,
                });
            }
            (b"name", true, false) => self.begin_field(Field::ContextName),
            (b"message", true, false) => {
                let numerus = attribute(e, "numerus", position)?.as_deref() == Some("yes");
                self.message = Some(PendingMessage {
                    message: Message {
                        numerus,
                        ..Message::default()
                    },
                    has_source: false,
                    position,
                });
            }
            (b"location", true, true) => {
                let filename = attribute(e, "filename", position)?;
                let line = attribute(e, "line", position)?;
                let location = self.location(filename, line, position)?;
                if let Some(pending) = self.message.as_mut() {
                    pending.message.locations.push(location);
                }
                return Ok(Step::Skip);
            }
            (b"source", true, true) => self.begin_field(Field::Source),
            (b"comment", true, true) => self.begin_field(Field::Comment),
            (b"translation", true, true) => {
                let status = attribute(e, "type", position)?;
                if let Some(pending) = self.message.as_mut() {
                    pending.message.status = TranslationStatus::from_attribute(status.as_deref());
                }
                self.begin_field(Field::Translation);
            }
            (b"numerusform", true, true) if self.field == Some(Field::Translation) => {
                self.begin_field(Field::NumerusForm);
            }
            (b"lengthvariant", true, true)
                if matches!(self.field, Some(Field::Translation | Field::NumerusForm)) =>
            {
                if self.variant.is_some() {
                    return Ok(Step::Skip);
                }
                self.variant_parent = self.field;
                self.begin_field(Field::LengthVariant);
            }
            (b"context" | b"message" | b"TS", _, _) => return Err(unexpected(e, position)),
            _ => return Ok(Step::Skip),
        }

        Ok(Step::Enter)
    }

    fn end(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"name" if self.field == Some(Field::ContextName) => {
                let text = self.take_text();
                if let Some(context) = self.context.as_mut() {
                    context.name = Some(text);
                }
            }
            b"source" if self.field == Some(Field::Source) => {
                let text = self.take_text();
                if let Some(pending) = self.message.as_mut() {
                    pending.message.source = text;
                    pending.has_source = true;
                }
            }
            b"comment" if self.field == Some(Field::Comment) => {
                let text = self.take_text();
                if let Some(pending) = self.message.as_mut() {
                    pending.message.comment = (!text.is_empty()).then_some(text);
                }
            }
            b"lengthvariant" if self.field == Some(Field::LengthVariant) => {
                self.variant = Some(self.take_text());
                if let Some(parent) = self.variant_parent.take() {
                    self.begin_field(parent);
                }
            }
            b"numerusform" if self.field == Some(Field::NumerusForm) => {
                let text = self.take_translation();
                if let Some(pending) = self.message.as_mut() {
                    pending.message.numerus_forms.push(text);
                }
                self.begin_field(Field::Translation);
            }
            b"translation" if self.field == Some(Field::Translation) => {
                let text = self.take_translation();
                if let Some(pending) = self.message.as_mut() {
                    if !pending.message.numerus {
                        pending.message.translation = text;
                    }
                }
            }
            b"message" => {
                if let Some(pending) = self.message.take() {
                    let context = self.context.as_mut();
                    if !pending.has_source {
                        let name = context
                            .and_then(|c| c.name.clone())
                            .unwrap_or_default();
                        return Err(Error::Parse(ParseError::MissingSource {
                            context: name,
                            position: pending.position,
                        }));
                    }
                    if let Some(context) = context {
                        context.messages.push(pending.message);
                    }
                }
            }
            b"context" => {
                if let Some(pending) = self.context.take() {
                    let Some(name) = pending.name else {
                        return Err(Error::Parse(ParseError::MissingContextName {
                            position: pending.position,
                        }));
                    };
                    let mut context = Context::new(name);
                    for message in pending.messages {
                        context.push(message);
                    }
                    if let Some(catalog) = self.catalog.as_mut() {
                        catalog.push_context(context);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn take_text(&mut self) -> String {
        self.field = None;
        std::mem::take(&mut self.text)
    }

    /// Text of a translation or numerus form, preferring its first length variant.
    fn take_translation(&mut self) -> String {
        let text = self.take_text();
        self.variant.take().unwrap_or(text)
    }

    fn location(
        &mut self,
        filename: Option<String>,
        line: Option<String>,
        position: u64,
    ) -> Result<Location> {
        let filename = filename
            .or_else(|| self.last_file.clone())
            .unwrap_or_default();
        let previous = self.last_lines.get(&filename).copied().unwrap_or(0);

        let line = match line.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = if let Some(delta) = raw.strip_prefix('+') {
                    delta.parse::<u32>().ok().and_then(|d| previous.checked_add(d))
                } else if let Some(delta) = raw.strip_prefix('-') {
                    delta.parse::<u32>().ok().and_then(|d| previous.checked_sub(d))
                } else {
                    raw.parse::<u32>().ok()
                };
                let Some(value) = parsed else {
                    return Err(Error::Parse(ParseError::InvalidLine {
                        value: raw.to_string(),
                        position,
                    }));
                };
                self.last_lines.insert(filename.clone(), value);
                Some(value)
            }
        };

        self.last_file = Some(filename.clone());
        Ok(Location { filename, line })
    }
}

/// Serializes a catalog in the layout `lupdate` produces.
pub fn to_string(catalog: &Catalog) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped("TS")))?;

    let mut root = BytesStart::new("TS");
    root.push_attribute(("version", catalog.version()));
    root.push_attribute(("language", catalog.language()));
    if let Some(source_language) = catalog.source_language() {
        root.push_attribute(("sourcelanguage", source_language));
    }
    writer.write_event(Event::Start(root))?;

    for context in catalog.contexts() {
        writer.write_event(Event::Start(BytesStart::new("context")))?;
        write_text_element(&mut writer, BytesStart::new("name"), context.name())?;
        for message in context.messages() {
            write_message(&mut writer, message)?;
        }
        writer.write_event(Event::End(BytesEnd::new("context")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("TS")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

fn write_message(writer: &mut Writer<Vec<u8>>, message: &Message) -> Result<()> {
    let mut start = BytesStart::new("message");
    if message.numerus {
        start.push_attribute(("numerus", "yes"));
    }
    writer.write_event(Event::Start(start))?;

    for location in &message.locations {
        let mut element = BytesStart::new("location");
        element.push_attribute(("filename", location.filename.as_str()));
        if let Some(line) = location.line {
            element.push_attribute(("line", line.to_string().as_str()));
        }
        writer.write_event(Event::Empty(element))?;
    }

    write_text_element(writer, BytesStart::new("source"), &message.source)?;
    if let Some(comment) = &message.comment {
        write_text_element(writer, BytesStart::new("comment"), comment)?;
    }

    let mut translation = BytesStart::new("translation");
    if let Some(status) = message.status.as_attribute() {
        translation.push_attribute(("type", status));
    }
    if message.numerus {
        writer.write_event(Event::Start(translation))?;
        for form in &message.numerus_forms {
            write_text_element(writer, BytesStart::new("numerusform"), form)?;
        }
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    } else {
        write_text_element(writer, translation, &message.translation)?;
    }

    writer.write_event(Event::End(BytesEnd::new("message")))?;
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<()> {
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    // A text event, even an empty one, before every `<byte>` and the end tag
    // keeps the indenting writer from inserting whitespace into the content.
    let mut rest = text;
    while let Some((idx, c)) = rest.char_indices().find(|&(_, c)| needs_byte_escape(c)) {
        writer.write_event(Event::Text(BytesText::new(&rest[..idx])))?;
        let mut byte = BytesStart::new("byte");
        byte.push_attribute(("value", format!("x{:x}", u32::from(c)).as_str()));
        writer.write_event(Event::Empty(byte))?;
        rest = &rest[idx + c.len_utf8()..];
    }
    writer.write_event(Event::Text(BytesText::new(rest)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}
