//! Colored terminal output.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes user-facing progress to the terminal.
///
/// Log records go through `log`; this is for the lines a user reads while a
/// pipeline runs.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Creates a new output manager.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Whether verbose lines are shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Verbose-only message.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.is_verbose() {
            return Ok(());
        }
        self.write_stdout(None, "", message)
    }

    /// Progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_stdout(Some(Color::Cyan), "→ ", message)
    }

    /// Success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_stdout(Some(Color::Green), "✓ ", message)
    }

    /// Warning line, on stderr.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_stderr(Color::Yellow, "⚠ ", message)
    }

    /// Error line, on stderr. Shown even in quiet mode.
    pub fn error(&self, message: &str) -> io::Result<()> {
        self.write_stderr(Color::Red, "✗ ", message)
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(stdout, "\n{}", title)?;
        stdout.reset()
    }

    /// Indented plain line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_stdout(None, "   ", message)
    }

    /// Unconditional plain line, for requested output such as `help` or JSON.
    pub fn println(&self, message: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", message)
    }

    fn write_stdout(&self, color: Option<Color>, prefix: &str, message: &str) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        if let Some(color) = color {
            stdout.set_color(ColorSpec::new().set_fg(Some(color)))?;
            write!(stdout, "{}", prefix)?;
            stdout.reset()?;
        } else {
            write!(stdout, "{}", prefix)?;
        }
        writeln!(stdout, "{}", message)
    }

    fn write_stderr(&self, color: Color, prefix: &str, message: &str) -> io::Result<()> {
        let mut stderr = StandardStream::stderr(ColorChoice::Auto);
        stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(stderr, "{}", prefix)?;
        stderr.reset()?;
        writeln!(stderr, "{}", message)
    }
}
