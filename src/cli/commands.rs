// CLI command implementation
use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use opustags::{read_comments, read_tags, rewrite, EditRequest, Error};

use crate::cli::config::Config;
use crate::cli::output::OutputFormatter;

/// Placeholder path meaning standard input or standard output
const STDIO: &str = "-";

/// Where the edited stream goes
#[derive(Debug, PartialEq, Eq)]
enum Destination {
    /// Read-only run, the comments are printed
    None,
    Stdout,
    File(String),
    /// Temporary file that replaces the input once complete
    InPlace(String),
}

/// Run opustags with the parsed command line
pub fn run(config: &Config) -> Result<()> {
    run_with(config, io::stdin().lock(), io::stdout().lock())
}

/// Run against explicit standard streams. `stdin` feeds either the input
/// stream (`-`) or the `--set-all` comments, never both.
fn run_with<'a, I, O>(config: &Config, stdin: I, mut stdout: O) -> Result<()>
where
    I: Read + 'a,
    O: Write,
{
    let mut request = config.edit_request();
    request.validate()?;

    let destination = destination(config)?;
    check_destination(config, &destination)?;

    let input: Box<dyn Read + 'a> = if config.input == STDIO {
        if config.set_all {
            bail!("--set-all reads standard input, which is already the input stream");
        }
        Box::new(BufReader::new(stdin))
    } else {
        if config.set_all {
            request.set_all = Some(read_comments(stdin).context("could not read comments")?);
        }
        open_input(&config.input)?
    };

    match destination {
        Destination::None => {
            let tags = read_tags(input, &request)?;
            OutputFormatter::new(config.format).output_tags(&tags, &mut stdout)?;
        }
        Destination::Stdout => {
            rewrite(input, BufWriter::new(&mut stdout), &request)?;
        }
        Destination::File(path) => {
            write_file(input, Path::new(&path), &request)?.commit();
        }
        Destination::InPlace(path) => {
            let output = write_file(input, Path::new(&path), &request)?;
            fs::rename(&path, &config.input).with_context(|| {
                format!("could not rename '{}' to '{}'", path, config.input)
            })?;
            output.commit();
            info!("edited '{}' in place", config.input);
        }
    }
    Ok(())
}

fn destination(config: &Config) -> Result<Destination> {
    if let Some(suffix) = &config.in_place {
        if config.input == STDIO {
            bail!("cannot edit standard input in place");
        }
        return Ok(Destination::InPlace(format!("{}{}", config.input, suffix)));
    }
    Ok(match config.output.as_deref() {
        None => Destination::None,
        Some(STDIO) => Destination::Stdout,
        Some(path) => Destination::File(path.to_string()),
    })
}

/// Refuse to clobber the input or an existing file before any I/O happens
fn check_destination(config: &Config, destination: &Destination) -> Result<()> {
    let path = match destination {
        Destination::File(path) | Destination::InPlace(path) => path,
        Destination::None | Destination::Stdout => return Ok(()),
    };
    if same_file(&config.input, path) {
        return Err(Error::PathCollision {
            input: config.input.clone(),
            output: path.clone(),
        }
        .into());
    }
    let overwrite = config.overwrite || matches!(destination, Destination::InPlace(_));
    if !overwrite && Path::new(path).exists() {
        return Err(Error::OutputExists(path.clone()).into());
    }
    Ok(())
}

/// Whether two paths designate the same file after canonicalization.
///
/// `-` never matches since it stands for a standard stream.
fn same_file(input: &str, output: &str) -> bool {
    if input == STDIO || output == STDIO {
        return false;
    }
    if input == output {
        return true;
    }
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn open_input(path: &str) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("could not open '{}'", path))?;
    Ok(Box::new(BufReader::new(file)))
}

fn write_file<R: Read>(input: R, path: &Path, request: &EditRequest) -> Result<PartialOutput> {
    let (output, file) = PartialOutput::create(path)?;
    rewrite(input, BufWriter::new(file), request)?;
    debug!("wrote '{}'", path.display());
    Ok(output)
}

/// An output file that is deleted unless the run commits it
struct PartialOutput {
    path: PathBuf,
    committed: bool,
}

impl PartialOutput {
    fn create(path: &Path) -> Result<(Self, File)> {
        let file = File::create(path)
            .with_context(|| format!("could not create '{}'", path.display()))?;
        let output = PartialOutput {
            path: path.to_path_buf(),
            committed: false,
        };
        Ok((output, file))
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("could not remove '{}': {}", self.path.display(), e);
            }
        }
    }
}
