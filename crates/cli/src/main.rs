mod logging;
mod pattern;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use argh::FromArgs;

use tracevm::MatchResult;

use crate::pattern::{Pattern, Step};

#[derive(FromArgs)]
/// Match input against a pattern and print every way it was matched.
struct Args {
    /// log debug information, including the compiled program
    #[argh(switch, short = 'd')]
    debug: bool,

    /// file to write the log to
    #[argh(option)]
    log_file: Option<PathBuf>,

    /// maximum number of paths to print
    #[argh(option, default = "20")]
    limit: usize,

    /// pattern to match with
    #[argh(positional)]
    pattern: String,

    /// input to match
    #[argh(positional)]
    input: String,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(logging::LOG_FILE));
    logging::setup(args.debug, &log_file)
        .with_context(|| format!("Failed to set up logging to {}", log_file.display()))?;

    let pattern = Pattern::new(&args.pattern)
        .with_context(|| format!("Invalid pattern {:?}", args.pattern))?;
    log::debug!("{:?}", pattern.program());

    let result = pattern.matches(&args.input)?;
    if !result.success() {
        println!("rejected");
        return Ok(());
    }

    println!("accepted");
    let mut stdout = io::stdout().lock();
    let printed = write_paths(&mut stdout, &result, args.limit)?;

    log::info!(
        "Matched {:?} against {:?}, printed {printed} paths",
        args.pattern,
        args.input,
    );
    Ok(())
}

/// Write at most `limit` accepting paths, one per line, followed by `...`
/// if there are more. Paths are enumerated lazily, so ambiguous matches
/// with exponentially many paths stay cheap. Returns the number of paths
/// written.
fn write_paths(
    out: &mut impl Write,
    result: &MatchResult<Step>,
    limit: usize,
) -> io::Result<usize> {
    let mut paths = result.iter_paths();
    let mut written = 0;
    for path in paths.by_ref().take(limit) {
        let steps: Vec<String> = path.iter().map(|step| step.to_string()).collect();
        writeln!(out, "{}", steps.join(" "))?;
        written += 1;
    }

    if paths.next().is_some() {
        writeln!(out, "...")?;
    }

    Ok(written)
}
