//! Interactive menu
//!
//! [`OPERATIONS`] is the fixed table of menu entries. Each [`Operation`]
//! maps to a [`Handler`] that declares the parameters it needs; the
//! [`Dispatcher`] prompts for them and runs the handler. The command-line
//! subcommands build the same [`Args`] and call the same handlers.

mod args;
mod handlers;

use std::io::{BufRead, Write};

pub use args::{expand_globs, Args};
pub use handlers::Handler;

use crate::error::{Error, Result};
use crate::service::DocumentService;

pub const CHOICE_PROMPT: &str =
    "Choose a number from 1 to 10 corresponding to the above PDF handling or -1 to exit: ";
pub const FAREWELL: &str = "Thank you for using the App. Come again!";
pub const UNAVAILABLE: &str = "this choice is unavailable, retry from 1 to 10.";

const WELCOME: &str = "Welcome to the PDF Manager Application";

/// Menu selection that leaves the loop
pub const EXIT_SELECTION: i64 = -1;

/// One menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ReadText,
    Metadata,
    Split,
    Merge,
    Rotate,
    Encrypt,
    Decrypt,
    ExtractImages,
    Crop,
    Watermark,
}

/// Menu entries in display order; entry `i` is selected with `i + 1`
pub static OPERATIONS: [Operation; 10] = [
    Operation::ReadText,
    Operation::Metadata,
    Operation::Split,
    Operation::Merge,
    Operation::Rotate,
    Operation::Encrypt,
    Operation::Decrypt,
    Operation::ExtractImages,
    Operation::Crop,
    Operation::Watermark,
];

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::ReadText => "Page count and text extraction",
            Operation::Metadata => "Display PDF metadata",
            Operation::Split => "Split PDF document",
            Operation::Merge => "Merge PDF documents",
            Operation::Rotate => "Rotate PDF document",
            Operation::Encrypt => "Encrypt PDF document with AES 256",
            Operation::Decrypt => "Decrypt PDF document",
            Operation::ExtractImages => "Extract images",
            Operation::Crop => "Crop PDF document",
            Operation::Watermark => "Watermark PDF document",
        }
    }

    /// Menu number, from 1
    pub fn number(self) -> i64 {
        OPERATIONS
            .iter()
            .position(|&op| op == self)
            .map_or(0, |index| index as i64 + 1)
    }

    pub fn from_number(number: i64) -> Option<Self> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        OPERATIONS.get(index).copied()
    }

    pub fn handler(self) -> &'static dyn Handler {
        match self {
            Operation::ReadText => &handlers::ReadText,
            Operation::Metadata => &handlers::ShowMetadata,
            Operation::Split => &handlers::Split,
            Operation::Merge => &handlers::Merge,
            Operation::Rotate => &handlers::Rotate,
            Operation::Encrypt => &handlers::Encrypt,
            Operation::Decrypt => &handlers::Decrypt,
            Operation::ExtractImages => &handlers::ExtractImages,
            Operation::Crop => &handlers::Crop,
            Operation::Watermark => &handlers::Watermark,
        }
    }
}

/// How a parameter value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Path,
    /// Whitespace-separated paths or glob patterns
    PathList,
    Text,
    /// Taken verbatim, surrounding whitespace included
    Secret,
    Angle,
}

/// A value a handler asks for before it runs
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub key: &'static str,
    pub prompt: &'static str,
    pub kind: ParamKind,
    /// Blank input leaves the key unset
    pub optional: bool,
}

impl Param {
    pub const fn required(key: &'static str, prompt: &'static str, kind: ParamKind) -> Self {
        Self {
            key,
            prompt,
            kind,
            optional: false,
        }
    }

    pub const fn optional(key: &'static str, prompt: &'static str, kind: ParamKind) -> Self {
        Self {
            key,
            prompt,
            kind,
            optional: true,
        }
    }
}

/// A parsed menu choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Exit,
    Run(Operation),
}

/// Parse one line of menu input
pub fn parse_selection(input: &str) -> Result<Selection> {
    let input = input.trim();
    let number: i64 = input
        .parse()
        .map_err(|_| Error::MalformedInput(input.to_string()))?;

    if number == EXIT_SELECTION {
        return Ok(Selection::Exit);
    }

    Operation::from_number(number)
        .map(Selection::Run)
        .ok_or(Error::UnsupportedSelection(number))
}

/// Read-eval loop over the menu
pub struct Dispatcher<'a, R, W> {
    service: &'a DocumentService,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Dispatcher<'a, R, W> {
    pub fn new(service: &'a DocumentService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Run until the user exits or input ends
    ///
    /// Only failures to read input or write output are returned; operation
    /// errors are printed and the loop continues.
    pub fn run(&mut self) -> Result<()> {
        self.print_banner()?;
        self.print_menu()?;

        loop {
            let Some(line) = self.prompt(CHOICE_PROMPT)? else {
                writeln!(self.output)?;
                break;
            };

            match parse_selection(&line) {
                Ok(Selection::Exit) => break,
                Ok(Selection::Run(operation)) => self.run_operation(operation)?,
                Err(Error::UnsupportedSelection(_)) => writeln!(self.output, "{UNAVAILABLE}")?,
                Err(e) => writeln!(self.output, "{e}. Enter a number from 1 to 10 or -1 to exit.")?,
            }
        }

        writeln!(self.output, "{FAREWELL}")?;
        self.output.flush()?;
        Ok(())
    }

    fn print_banner(&mut self) -> Result<()> {
        let rule = "-".repeat(100);
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "\t\t\t {WELCOME}")?;
        writeln!(self.output, "{rule}")?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "\nPossible pdf handling choices:")?;
        for operation in OPERATIONS {
            writeln!(self.output, "{} _ {}", operation.number(), operation.label())?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn run_operation(&mut self, operation: Operation) -> Result<()> {
        let handler = operation.handler();

        let mut args = Args::new();
        for param in handler.params() {
            // Input ended mid-operation; the next menu prompt sees it too
            let Some(value) = self.prompt(param.prompt)? else {
                return Ok(());
            };
            let value = match param.kind {
                ParamKind::Secret => value,
                _ => value.trim().to_string(),
            };
            if value.is_empty() && param.optional {
                continue;
            }
            args.insert(param.key, value);
        }

        if let Err(e) = handler.run(self.service, &args, &mut self.output) {
            writeln!(self.output, "Error: {e}")?;
        }
        writeln!(self.output, "{}", "*".repeat(80))?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Print `prompt` and read one line without its line ending
    ///
    /// Returns `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
