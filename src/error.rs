/// Fatal errors. These abort the conversion of a whole document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SVG parse error: {0}")]
    SvgParse(String),
    #[error("Could not write SVG: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Written SVG is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Why a single path command was skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandFault {
    #[error("unknown command")]
    Unknown,
    #[error("{count} operands is not a multiple of {arity}")]
    OperandCount { count: usize, arity: usize },
}

/// A recoverable problem found while parsing a path definition or decoding
/// the attributes of a shape.
///
/// Diagnostics never invalidate what was already built. They are returned
/// next to the result so callers can surface or ignore them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    #[error("Command '{command}' at offset {offset} skipped: {fault}")]
    Command {
        offset: usize,
        command: char,
        fault: CommandFault,
    },
    #[error("Trailing data at offset {offset}: {text:?}")]
    TrailingData { offset: usize, text: String },
    #[error("Unsupported command '{command}' at offset {offset}")]
    Unsupported { offset: usize, command: char },
    #[error("Could not decode attribute '{name}': {reason}")]
    AttributeDecode { name: String, reason: String },
}
