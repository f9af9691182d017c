pub mod stl;

/// Generic I/O and format‑conversion errors.
///
/// Many I/O features are behind cargo feature‑flags.
/// When a feature is disabled the corresponding variant is *not*
/// constructed in user code; the caller gets [`IoError::Unimplemented`].
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("std::io::Error: {0}")]
    StdIo(#[from] std::io::Error),

    #[error("Could not parse float: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error("Input is malformed: {0}")]
    MalformedInput(String),

    #[error("Feature is not implemented: {0}")]
    Unimplemented(String),

    /// No font file matches the requested family and style
    #[error("No font file found for '{0}'")]
    FontNotFound(String),

    #[cfg(feature = "truetype-text")]
    /// Error bubbled up from `ttf-parser` while opening a face.
    #[error("Font parsing error: {0}")]
    FontParsing(#[from] ttf_parser::FaceParsingError),

    #[cfg(feature = "svg-io")]
    /// Error bubbled up from the `svg` crate during parsing.
    #[error("SVG Parsing error: {0}")]
    SvgParsing(#[from] ::svg::parser::Error),
}
