//! Tag editing.
//!
//! An [`EditRequest`] is applied to parsed [`OpusTags`] in a fixed order:
//! deletions (or delete-all), then set-all, then additions. Additions must be
//! valid `FIELD=value` comments or the whole edit fails, while invalid lines
//! in a set-all list are only skipped with a warning.

use std::io::Read;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::opus::{validate_comment, OpusTags};
use crate::utils::encoding::decode_utf8_lossy;

/// What the user asked to change in the comment list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditRequest {
    /// Field names whose comments are all removed
    pub delete: Vec<String>,
    /// Remove every comment; takes precedence over `delete`
    pub delete_all: bool,
    /// Replacement comment list, already filtered by [`read_comments`]
    pub set_all: Option<Vec<String>>,
    /// Comments appended last, in order
    pub add: Vec<String>,
}

impl EditRequest {
    /// Whether applying the request leaves any tags unchanged
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && !self.delete_all && self.set_all.is_none() && self.add.is_empty()
    }

    /// Fail on the first addition that is not a valid comment
    pub fn validate(&self) -> Result<()> {
        match self.add.iter().find(|comment| !validate_comment(comment)) {
            Some(comment) => Err(Error::InvalidComment(comment.clone())),
            None => Ok(()),
        }
    }
}

/// Apply `request` to `tags`
pub fn apply(mut tags: OpusTags, request: &EditRequest) -> Result<OpusTags> {
    request.validate()?;
    if request.is_empty() {
        return Ok(tags);
    }

    if request.delete_all {
        debug!(removed = tags.comments.len(), "deleting all comments");
        tags.comments.clear();
    } else {
        for field in &request.delete {
            tags.delete_field(field);
        }
    }

    if let Some(comments) = &request.set_all {
        debug!(count = comments.len(), "replacing comment list");
        tags.comments = comments.iter().map(|c| c.clone().into_bytes()).collect();
    }

    for comment in &request.add {
        tags.push(comment.as_str());
    }
    Ok(tags)
}

/// Read newline-delimited comments for set-all.
///
/// Lines that are not valid comments are dropped with a warning; empty lines
/// are ignored.
pub fn read_comments<R: Read>(mut reader: R) -> Result<Vec<String>> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    let text = decode_utf8_lossy(&raw);

    let mut comments = Vec::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        if validate_comment(line) {
            comments.push(line.to_string());
        } else {
            warn!("skipping malformed tag: {}", line);
        }
    }
    Ok(comments)
}
