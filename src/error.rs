// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Parse(ParseError),
    UnknownLocale(String),
}

/// Problems found while reading a TS translation file.
///
/// Positions are byte offsets into the input, as reported by the XML reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document is not well-formed XML.
    Xml { position: u64, message: String },

    /// The root element is missing or is not `<TS>`.
    MissingRoot,

    /// A `<context>` closed without a `<name>` child.
    MissingContextName { position: u64 },

    /// A `<message>` closed without a `<source>` child.
    MissingSource { context: String, position: u64 },

    /// An element appeared somewhere it cannot belong (e.g. `<message>` outside a context).
    UnexpectedElement { element: String, position: u64 },

    /// A `line` attribute that is neither absolute nor `+N`/`-N`.
    InvalidLine { value: String, position: u64 },

    /// A `<byte value=".."/>` escape that is not a valid character code.
    InvalidByte { value: String, position: u64 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Xml { position, message } => {
                write!(f, "malformed XML at byte {}: {}", position, message)
            }
            ParseError::MissingRoot => write!(f, "missing <TS> root element"),
            ParseError::MissingContextName { position } => {
                write!(f, "<context> without <name> at byte {}", position)
            }
            ParseError::MissingSource { context, position } => write!(
                f,
                "<message> without <source> in context '{}' at byte {}",
                context, position
            ),
            ParseError::UnexpectedElement { element, position } => {
                write!(f, "unexpected <{}> at byte {}", element, position)
            }
            ParseError::InvalidLine { value, position } => {
                write!(f, "invalid location line '{}' at byte {}", value, position)
            }
            ParseError::InvalidByte { value, position } => {
                write!(f, "invalid <byte> value '{}' at byte {}", value, position)
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Parse(e) => write!(f, "Parse Error: {}", e),
            Error::UnknownLocale(locale) => write!(f, "Unknown locale: {}", locale),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
