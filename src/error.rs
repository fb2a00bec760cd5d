//! Error types shared by the Ogg layer, the Opus codec and the rewrite pipeline.

use thiserror::Error;

/// Every failure the library can report. All of them are fatal to a run.
#[derive(Debug, Error)]
pub enum Error {
    /// The Ogg framing is corrupt or the page sequence is inconsistent.
    #[error("framing error: {0}")]
    Framing(String),

    /// The second packet is not a well-formed OpusTags header.
    #[error("bad comment header: {0}")]
    BadCommentHeader(&'static str),

    /// The first packet is not an OpusHead header.
    #[error("invalid identification header: {0}")]
    InvalidIdentificationHeader(&'static str),

    /// A comment requested for addition is not of the form `FIELD=VALUE`.
    #[error("invalid comment: '{0}'")]
    InvalidComment(String),

    /// The stream ended before both Opus header packets were seen.
    #[error("invalid file: the stream does not contain both Opus header packets")]
    InvalidFile,

    /// Reading, writing or renaming failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Input and output resolve to the same file.
    #[error("the input and output files are the same: '{input}' and '{output}'")]
    PathCollision { input: String, output: String },

    /// The output file exists and overwriting was not allowed.
    #[error("'{0}' already exists (use -y to overwrite)")]
    OutputExists(String),
}

impl Error {
    pub(crate) fn framing(message: impl Into<String>) -> Self {
        Error::Framing(message.into())
    }
}

/// A convenience `Result` alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
