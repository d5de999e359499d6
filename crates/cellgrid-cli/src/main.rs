//! cellgrid CLI - runs edit scripts against a table

use anyhow::{anyhow, bail, Context, Result};
use cellgrid::prelude::*;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cellgrid")]
#[command(author, version, about = "Run an edit script against a grid of cells")]
struct Cli {
    /// Script file, one command per line (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Report failing commands and carry on instead of stopping
    #[arg(short, long)]
    keep_going: bool,

    /// Delimiter used by the `values` and `texts` commands (default: tab)
    #[arg(short, long, default_value = "\t")]
    delimiter: char,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut runner = ScriptRunner::new(stdout.lock(), cli.keep_going, cli.delimiter);

    let failures = match &cli.input {
        Some(path) => runner.run(open_script(path)?)?,
        None => runner.run(io::stdin().lock())?,
    };

    let stats = runner.table().stats();
    log::info!(
        "evaluated {} formulas, invalidated {} cached values",
        stats.formulas_evaluated,
        stats.caches_invalidated
    );

    if failures > 0 {
        bail!("{} command(s) failed", failures);
    }
    Ok(())
}

fn open_script(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    Ok(BufReader::new(file))
}

/// One line of a script
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Set(Position, &'a str),
    Clear(Position),
    Get(Position),
    Text(Position),
    Size,
    Values,
    Texts,
}

/// Parse a script line; blank lines and `#` comments yield `None`
fn parse_command(line: &str) -> Result<Option<Command<'_>>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (keyword, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let command = match keyword {
        "set" => {
            // Everything after the first space following the cell name is the text, verbatim
            let (cell, text) = rest.split_once(' ').unwrap_or((rest, ""));
            Command::Set(parse_position(cell)?, text)
        }
        "clear" => Command::Clear(parse_position(rest.trim())?),
        "get" => Command::Get(parse_position(rest.trim())?),
        "text" => Command::Text(parse_position(rest.trim())?),
        "size" => Command::Size,
        "values" => Command::Values,
        "texts" => Command::Texts,
        other => return Err(anyhow!("Unknown command '{}'", other)),
    };
    Ok(Some(command))
}

fn parse_position(name: &str) -> Result<Position> {
    if name.is_empty() {
        bail!("Missing cell name");
    }
    name.parse::<Position>()
        .with_context(|| format!("Invalid cell name '{}'", name))
}

/// Executes script commands against a table, writing results to `out`
struct ScriptRunner<W: Write> {
    table: Table,
    out: W,
    keep_going: bool,
    print_options: PrintOptions,
}

impl<W: Write> ScriptRunner<W> {
    fn new(out: W, keep_going: bool, delimiter: char) -> Self {
        Self {
            table: Table::new(),
            out,
            keep_going,
            print_options: PrintOptions::default().with_delimiter(delimiter),
        }
    }

    fn table(&self) -> &Table {
        &self.table
    }

    /// Run every line of `input`; returns how many commands failed
    ///
    /// Without `keep_going` the first failure is returned as an error instead.
    fn run<R: BufRead>(&mut self, input: R) -> Result<usize> {
        let mut failures = 0;

        for (index, line) in input.lines().enumerate() {
            let line = line.context("Failed to read script")?;
            let line_no = index + 1;

            if let Err(e) = self.execute_line(&line) {
                let e = e.context(format!("line {}", line_no));
                if !self.keep_going {
                    return Err(e);
                }
                log::error!("{:#}", e);
                failures += 1;
            }
        }

        self.out.flush().context("Failed to write output")?;
        Ok(failures)
    }

    fn execute_line(&mut self, line: &str) -> Result<()> {
        let Some(command) = parse_command(line)? else {
            return Ok(());
        };

        match command {
            Command::Set(pos, text) => self.table.set_cell(pos, text)?,
            Command::Clear(pos) => self.table.clear_cell(pos)?,
            Command::Get(pos) => {
                let value = self.table.value(pos)?;
                writeln!(self.out, "{}", value)?;
            }
            Command::Text(pos) => {
                let text = self.table.text(pos)?;
                writeln!(self.out, "{}", text)?;
            }
            Command::Size => {
                let size = self.table.printable_size();
                writeln!(self.out, "{} {}", size.rows, size.cols)?;
            }
            Command::Values => {
                let options = self.print_options.clone().with_mode(PrintMode::Values);
                self.table.print_with(&mut self.out, &options)?;
            }
            Command::Texts => {
                let options = self.print_options.clone().with_mode(PrintMode::Texts);
                self.table.print_with(&mut self.out, &options)?;
            }
        }
        Ok(())
    }
}

/// Backend for the `log` records emitted by the cellgrid crates
///
/// Writes `[LEVEL] message` lines to stderr, filtered by the level chosen with `-v`.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
