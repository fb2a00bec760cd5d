//! opustags - view and edit the comment header of Ogg Opus streams.
//!
//! The audio is never decoded: the stream is split into packets, the
//! OpusTags packet is replaced, and everything is laced back into pages
//! with fresh checksums.
//!
//! ```no_run
//! use opustags::{rewrite, EditRequest};
//! use std::fs::File;
//! use std::io::{BufReader, BufWriter};
//!
//! let request = EditRequest {
//!     add: vec!["TITLE=Foo Bar".to_string()],
//!     ..Default::default()
//! };
//! let input = BufReader::new(File::open("in.opus")?);
//! let output = BufWriter::new(File::create("out.opus")?);
//! let tags = rewrite(input, output, &request)?;
//! println!("{} comments written", tags.comments.len());
//! # Ok::<(), opustags::Error>(())
//! ```

pub mod edit;
pub mod error;
pub mod ogg;
pub mod opus;
pub mod pipeline;
pub mod utils;

pub use edit::{apply, read_comments, EditRequest};
pub use error::{Error, Result};
pub use opus::{validate_comment, validate_identification_header, OpusTags};
pub use pipeline::{read_tags, rewrite};
