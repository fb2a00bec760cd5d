// CLI configuration
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use opustags::EditRequest;

use crate::cli::output::OutputFormat;

/// Suffix of the temporary file used by `--in-place` when none is given
pub const DEFAULT_IN_PLACE_SUFFIX: &str = ".otmp";

/// opustags - view or edit Ogg Opus comments
///
/// Without an output option, the comments of INPUT are printed one per line.
#[derive(Parser, Debug)]
#[command(name = "opustags")]
#[command(about = "View or edit the comment header of Ogg Opus files", long_about = None)]
#[command(version)]
pub struct Config {
    /// Input file, or '-' for standard input
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Write the edited stream to FILE ('-' for standard output)
    #[arg(short, long, value_name = "FILE", conflicts_with = "in_place")]
    pub output: Option<String>,

    /// Edit INPUT in place, writing through INPUT followed by SUFFIX
    #[arg(
        short = 'i',
        long = "in-place",
        value_name = "SUFFIX",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = DEFAULT_IN_PLACE_SUFFIX
    )]
    pub in_place: Option<String>,

    /// Overwrite the output file if it already exists
    #[arg(short = 'y', long)]
    pub overwrite: bool,

    /// Delete all comments named FIELD
    #[arg(short, long, value_name = "FIELD")]
    pub delete: Vec<String>,

    /// Append a comment
    #[arg(short, long, value_name = "FIELD=VALUE")]
    pub add: Vec<String>,

    /// Delete all comments named FIELD, then append FIELD=VALUE
    #[arg(short, long, value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Delete every comment
    #[arg(short = 'D', long)]
    pub delete_all: bool,

    /// Replace the comments with lines read from standard input
    #[arg(short = 'S', long)]
    pub set_all: bool,

    /// Format used when printing comments
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log progress to standard error
    #[arg(short, long)]
    pub verbose: bool,

    /// --add and --set values in command-line order
    #[arg(skip)]
    additions: Vec<String>,
}

impl Config {
    /// Parse the process arguments, exiting with usage on error
    pub fn from_env() -> Self {
        let matches = Config::command().get_matches();
        Self::from_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Parse an explicit argument list
    #[cfg(test)]
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Config::command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut config = Config::from_arg_matches(matches)?;
        config.additions = ordered_values(matches, &["add", "set"]);
        Ok(config)
    }

    /// Translate the editing options into a request.
    ///
    /// `--set FIELD=VALUE` becomes a deletion of FIELD plus an addition, and
    /// additions keep the order in which `--add` and `--set` were given.
    pub fn edit_request(&self) -> EditRequest {
        let mut delete = self.delete.clone();
        delete.extend(
            self.set
                .iter()
                .map(|comment| match comment.split_once('=') {
                    Some((field, _)) => field.to_string(),
                    None => comment.clone(),
                }),
        );

        EditRequest {
            delete,
            delete_all: self.delete_all,
            set_all: None,
            add: self.additions.clone(),
        }
    }
}

/// Merge the values of several repeatable options by their command-line position
fn ordered_values(matches: &ArgMatches, ids: &[&str]) -> Vec<String> {
    let mut indexed: Vec<(usize, String)> = Vec::new();
    for id in ids {
        if let (Some(indices), Some(values)) = (matches.indices_of(id), matches.get_many::<String>(id)) {
            indexed.extend(indices.zip(values.cloned()));
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, value)| value).collect()
}
