//! md2tex CLI - Markdown to LaTeX converter

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use md2tex::{
    markdown_to_latex_with_report, utils::error::ConversionError, utils::CliDiagnostic,
    utils::DiagnosticSeverity, CodeStyle, M2LOptions,
};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "md2tex")]
#[command(version)]
#[command(about = "md2tex - Markdown to LaTeX converter", long_about = None)]
struct Cli {
    /// Input Markdown file (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Float placement for figures
    #[arg(long, default_value = "ht")]
    figure_pos: String,

    /// Float placement for tables
    #[arg(long, default_value = "ht")]
    table_pos: String,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// Code block rendering
    #[arg(long, value_enum, default_value_t = CodeType::Minted)]
    code_style: CodeType,

    /// The template provides the title: drop `#` headings, map `##` to \section
    #[arg(long)]
    title: bool,

    /// Prefix paragraph lines with \par
    #[arg(long)]
    par: bool,

    /// Write the warning list as JSON to this path
    #[arg(long)]
    warnings_log: Option<String>,

    /// Exit with an error when the document has unclosed environments
    #[arg(long)]
    strict: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum CodeType {
    /// lstlisting environments
    Lstlisting,
    /// minted environments
    Minted,
}

#[cfg(feature = "cli")]
impl From<CodeType> for CodeStyle {
    fn from(value: CodeType) -> Self {
        match value {
            CodeType::Lstlisting => CodeStyle::Listing,
            CodeType::Minted => CodeStyle::Minted,
        }
    }
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("✗ {}", err);
            std::process::exit(2);
        }
    }
}

/// Returns `Ok(false)` when strict mode rejects the result.
#[cfg(feature = "cli")]
fn run(cli: &Cli) -> Result<bool, ConversionError> {
    let input = match cli.input_file {
        Some(ref path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if cli.figure_pos.trim().is_empty() || cli.table_pos.trim().is_empty() {
        return Err(ConversionError::invalid("float placement must not be empty"));
    }

    let options = M2LOptions {
        figure_placement: cli.figure_pos.clone(),
        table_placement: cli.table_pos.clone(),
        indent_width: cli.indent,
        code_style: cli.code_style.into(),
        title_present: cli.title,
        paragraph_prefix: cli.par,
    };

    let result = markdown_to_latex_with_report(&input, &options);

    let mut has_errors = false;
    for warning in &result.warnings {
        let diag = CliDiagnostic::from(warning.clone());
        has_errors |= diag.severity == DiagnosticSeverity::Error;
        eprintln!("{}", diag.render(!cli.no_color));
    }

    if let Some(ref path) = cli.warnings_log {
        let serialized = serde_json::to_string_pretty(&result.warnings)?;
        fs::write(path, serialized)?;
    }

    match cli.output {
        Some(ref path) => {
            fs::write(path, &result.output)?;
            eprintln!("✓ Output written to: {}", path);
        }
        None => {
            io::stdout().write_all(result.output.as_bytes())?;
        }
    }

    Ok(!(cli.strict && has_errors))
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install md2tex --features cli");
    eprintln!("  md2tex [OPTIONS] [INPUT_FILE]");
}
