// SPDX-License-Identifier: MPL-2.0
//! Positional placeholders and mnemonic markers inside translatable strings.
//!
//! Placeholders follow the `QString::arg` convention: `%1`, `%2`, ... up to
//! two digits, optionally localized as `%L1`. Substitution always targets the
//! lowest-numbered marker first, so `"%2 of %1"` filled with `["a", "b"]`
//! yields `"b of a"`.
//!
//! Mnemonics are the keyboard accelerators embedded in menu labels. The
//! launcher uses a GTK-like `(_O)` suffix; plain Qt strings use `&O`.

use std::collections::BTreeSet;

/// A `%N` marker found in a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    start: usize,
    end: usize,
    number: u8,
}

fn scan(text: &str) -> Vec<Marker> {
    let bytes = text.as_bytes();
    let mut markers = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let start = i;
        let mut j = i + 1;
        if bytes.get(j) == Some(&b'L') {
            j += 1;
        }
        let Some(first) = bytes.get(j).filter(|b| b.is_ascii_digit()) else {
            i += 1;
            continue;
        };
        let mut number = first - b'0';
        j += 1;
        if let Some(second) = bytes.get(j).filter(|b| b.is_ascii_digit()) {
            number = number * 10 + (second - b'0');
            j += 1;
        }
        markers.push(Marker {
            start,
            end: j,
            number,
        });
        i = j;
    }

    markers
}

/// Returns the distinct placeholder numbers used in `text`.
pub fn placeholders(text: &str) -> BTreeSet<u8> {
    scan(text).into_iter().map(|m| m.number).collect()
}

/// Replaces every occurrence of the lowest-numbered placeholder with `value`.
///
/// A template without placeholders is returned unchanged.
pub fn arg(template: &str, value: &str) -> String {
    format(template, &[value])
}

/// Fills placeholders in ascending order with `values`, in a single pass.
///
/// The i-th lowest placeholder number receives `values[i]`. Substituted text
/// is never rescanned, so a value containing `%2` stays literal. Placeholders
/// beyond the supplied values are left in place.
pub fn format(template: &str, values: &[&str]) -> String {
    let markers = scan(template);
    if markers.is_empty() || values.is_empty() {
        return template.to_string();
    }

    let order: Vec<u8> = markers
        .iter()
        .map(|m| m.number)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    for marker in &markers {
        let slot = order.iter().position(|n| *n == marker.number);
        if let Some(value) = slot.and_then(|idx| values.get(idx)) {
            out.push_str(&template[cursor..marker.start]);
            out.push_str(value);
            cursor = marker.end;
        }
    }
    out.push_str(&template[cursor..]);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicStyle {
    /// Launcher style: `Open(_O)`.
    Suffix,
    /// Qt style: `&Open`.
    Ampersand,
}

/// Keyboard accelerator carried by a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mnemonic {
    pub key: char,
    pub style: MnemonicStyle,
}

/// Byte offset of the `(` and the accelerator key of a `(_X)` suffix.
fn suffix_mnemonic(text: &str) -> Option<(usize, char)> {
    let inner = text.strip_suffix(')')?;
    let mut chars = inner.char_indices().rev();
    let (_, key) = chars.next()?;
    let (_, underscore) = chars.next()?;
    let (open, paren) = chars.next()?;
    (underscore == '_' && paren == '(' && key.is_alphanumeric()).then_some((open, key))
}

fn ampersand_mnemonic(text: &str) -> Option<char> {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '&' {
            continue;
        }
        match chars.next() {
            Some('&') => {}
            Some(key) if !key.is_whitespace() => return Some(key),
            _ => {}
        }
    }
    None
}

/// Finds the accelerator marker of a label, if any.
pub fn mnemonic(text: &str) -> Option<Mnemonic> {
    if let Some((_, key)) = suffix_mnemonic(text) {
        return Some(Mnemonic {
            key,
            style: MnemonicStyle::Suffix,
        });
    }
    ampersand_mnemonic(text).map(|key| Mnemonic {
        key,
        style: MnemonicStyle::Ampersand,
    })
}

/// Removes accelerator markers for surfaces that cannot render them.
///
/// `Open(_O)` becomes `Open`, `&Open` becomes `Open` and `&&` collapses to `&`.
pub fn strip_mnemonic(text: &str) -> String {
    if let Some((open, _)) = suffix_mnemonic(text) {
        return text[..open].trim_end().to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&' {
            match chars.peek() {
                Some('&') => {
                    out.push('&');
                    chars.next();
                }
                Some(next) if !next.is_whitespace() => {}
                _ => out.push('&'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
