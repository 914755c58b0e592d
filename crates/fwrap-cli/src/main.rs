use clap::{Parser, Subcommand};
use fwrap_build::BuildConfig;
use fwrap_common::{Diagnostic, DiagnosticLevel, Diagnostics};
use fwrap_driver::Driver;
use miette::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fwrap")]
#[command(author, version, about = "Generate Fortran 2003 bindings for C and C++ libraries")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the C/C++ wrapper and the Fortran module for a declaration graph
    Generate {
        /// Declaration graph (JSON)
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: fwrap.toml next to the input)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fortran source file extension
        #[arg(long)]
        fext: Option<String>,

        /// Use C-style casts in the generated C++ code
        #[arg(long)]
        no_cppcast: bool,
    },

    /// Run the generator and report diagnostics without writing files
    Check {
        /// Declaration graph (JSON)
        input: PathBuf,

        /// Configuration file (default: fwrap.toml next to the input)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the Fortran identifier each name is turned into
    Mangle {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("fwrap=debug")
    } else {
        EnvFilter::new("fwrap=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
            fext,
            no_cppcast,
        } => {
            let mut driver = make_driver(&input, config.as_deref())?;
            if let Some(fext) = fext {
                driver.config_mut().generator.fext = fext;
            }
            if no_cppcast {
                driver.config_mut().generator.cppcast = false;
            }

            tracing::debug!(input = %input.display(), config = ?driver.config().generator, "generating");
            let generated = driver.run(&input, output.as_deref())?;
            report(&generated.output.diagnostics);
            if generated.has_errors() {
                return Err(failure(&input, &generated.output.diagnostics));
            }
            for path in &generated.written {
                println!("Wrote {}", path.display());
            }
        }

        Commands::Check { input, config } => {
            let driver = make_driver(&input, config.as_deref())?;
            let output = driver.generate_file(&input)?;
            report(&output.diagnostics);
            if output.diagnostics.has_errors() {
                return Err(failure(&input, &output.diagnostics));
            }
            println!(
                "{}: OK ({} warnings)",
                input.display(),
                output.diagnostics.warnings().count()
            );
        }

        Commands::Mangle { names } => {
            for name in &names {
                println!("{} -> {}", name, fwrap_gen::mangle(name));
            }
        }
    }

    Ok(())
}

/// Driver configured from `config`, or from the `fwrap.toml` beside `input`.
fn make_driver(input: &Path, config: Option<&Path>) -> Result<Driver> {
    match config {
        Some(path) => {
            let config = BuildConfig::from_file(path)
                .map_err(|e| miette::miette!("Failed to load {}: {}", path.display(), e))?;
            Ok(Driver::with_config(config))
        }
        None => Driver::discover(input.parent().unwrap_or(Path::new("."))),
    }
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", render(diagnostic));
    }
}

fn render(diagnostic: &Diagnostic) -> String {
    let level = match diagnostic.level {
        DiagnosticLevel::Error => "error",
        DiagnosticLevel::Warning => "warning",
    };
    let mut line = format!("{}[{}]: {}", level, diagnostic.code, diagnostic);
    if let Some(help) = &diagnostic.help {
        line.push_str(&format!("\n  help: {}", help));
    }
    line
}

fn failure(input: &Path, diagnostics: &Diagnostics) -> miette::Report {
    miette::miette!(
        "{}: {} error(s); no files were written",
        input.display(),
        diagnostics.errors().count()
    )
}
