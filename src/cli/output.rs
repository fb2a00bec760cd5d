// Output formatting for CLI

use anyhow::Result;
use clap::ValueEnum;
use std::io::Write;

use opustags::OpusTags;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One FIELD=VALUE comment per line
    #[default]
    Text,
    /// Vendor string and comments as pretty-printed JSON
    Json,
}

/// Format and output tags
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Output the comment list of `tags`.
    ///
    /// Text output writes each comment's stored bytes unchanged; JSON output
    /// replaces malformed UTF-8.
    pub fn output_tags(&self, tags: &OpusTags, writer: &mut impl Write) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                for comment in &tags.comments {
                    writer.write_all(comment)?;
                    writer.write_all(b"\n")?;
                }
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string_pretty(tags)?)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OpusTags {
        let mut tags = OpusTags::new("libopus 1.3");
        tags.push("TITLE=七面鳥");
        tags.push("A=B");
        tags.push(&b"X=Caf\xe9"[..]);
        tags.extra_data = vec![0x80];
        tags
    }

    #[test]
    fn text_prints_one_comment_per_line() {
        let mut out = Vec::new();
        OutputFormatter::new(OutputFormat::Text)
            .output_tags(&sample(), &mut out)
            .unwrap();
        let mut expected = "TITLE=七面鳥\nA=B\n".as_bytes().to_vec();
        expected.extend_from_slice(b"X=Caf\xe9\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn json_includes_vendor_but_not_padding() {
        let mut out = Vec::new();
        OutputFormatter::new(OutputFormat::Json)
            .output_tags(&sample(), &mut out)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["vendor"], "libopus 1.3");
        assert_eq!(value["comments"][0], "TITLE=七面鳥");
        assert_eq!(value["comments"][2], "X=Caf\u{fffd}");
        assert!(value.get("extra_data").is_none());
    }
}
