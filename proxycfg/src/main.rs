//! Proxycfg - read, query and rewrite proxy configuration files
//!
//! This is the main entry point for the proxycfg CLI.

use anyhow::Context;
use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use proxycfg_parser::{ConfigParser, Error, ParserOptions, SectionKind};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Proxycfg - section-structured proxy configuration editor
#[derive(Parser)]
#[command(name = "proxycfg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reject lines no directive recognizes
    #[arg(long, global = true)]
    strict: bool,

    /// Drop comments when writing
    #[arg(long, global = true)]
    no_comments: bool,

    /// Parser options file (TOML)
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a configuration file parses
    Validate {
        /// Path to the configuration file
        config: PathBuf,
    },

    /// Print the configuration in canonical layout
    Fmt {
        config: PathBuf,

        /// Rewrite the file in place instead of printing
        #[arg(long)]
        write: bool,
    },

    /// List section names of a kind
    Sections { config: PathBuf, kind: SectionKind },

    /// Print an attribute as JSON
    Get {
        config: PathBuf,
        kind: SectionKind,
        /// Section name (`data` for global and defaults)
        name: String,
        attribute: String,

        /// Entry index for multi-valued attributes
        #[arg(long)]
        index: Option<usize>,
    },

    /// Set an attribute from directive arguments
    Set {
        config: PathBuf,
        kind: SectionKind,
        name: String,
        attribute: String,

        /// Arguments following the directive keyword
        value: Vec<String>,

        #[arg(long)]
        index: Option<usize>,

        /// Insert before `--index` instead of replacing
        #[arg(long)]
        insert: bool,

        /// Write the `no` form of a flag
        #[arg(long)]
        negate: bool,

        /// Create the section first when it does not exist
        #[arg(long)]
        create: bool,
    },

    /// Remove an attribute or one of its entries
    Delete {
        config: PathBuf,
        kind: SectionKind,
        name: String,
        attribute: String,

        #[arg(long)]
        index: Option<usize>,
    },

    /// Add a named section; it is written out once it holds a directive
    #[command(name = "create-section")]
    CreateSection {
        config: PathBuf,
        kind: SectionKind,
        name: String,
    },

    /// Remove a named section
    #[command(name = "delete-section")]
    DeleteSection {
        config: PathBuf,
        kind: SectionKind,
        name: String,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only command output
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    if let Err(e) = run(cli) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = parser_options(&cli)?;

    match cli.command {
        Commands::Validate { config } => {
            tracing::info!("Validating config: {}", config.display());
            load(&config, &options)?;
            println!("✅ Configuration '{}' is valid!", config.display());
        }

        Commands::Fmt { config, write } => {
            let parser = load(&config, &options)?;
            if write {
                parser.save(&config)?;
                tracing::info!("📝 Rewrote {}", config.display());
            } else {
                print!("{}", parser.render());
            }
        }

        Commands::Sections { config, kind } => {
            let parser = load(&config, &options)?;
            let mut names = parser.sections(kind)?;
            names.sort();
            for name in names {
                println!("{}", name);
            }
        }

        Commands::Get { config, kind, name, attribute, index } => {
            let parser = load(&config, &options)?;
            let json = match index {
                Some(_) => serde_json::to_string_pretty(&parser.get_one(kind, &name, &attribute, index)?)?,
                None => serde_json::to_string_pretty(&parser.get(kind, &name, &attribute, false)?)?,
            };
            println!("{}", json);
        }

        Commands::Set { config, kind, name, attribute, value, index, insert, negate, create } => {
            let parser = load(&config, &options)?;
            let line = directive_line(&attribute, &value, negate);
            tracing::debug!("decoding '{}' for {} {}", line, kind, name);

            let entry = parser.parse_directive(kind, &attribute, &line)?;
            if create && !parser.sections(kind)?.contains(&name) {
                parser.create_section(kind, &name)?;
                tracing::info!("➕ Created {} {}", kind, name);
            }
            if insert {
                parser.insert(kind, &name, &attribute, entry, index)?;
            } else {
                parser.set(kind, &name, &attribute, entry, index)?;
            }
            parser.save(&config)?;
            tracing::info!("✏️ Set {} in {} {}", attribute, kind, name);
        }

        Commands::Delete { config, kind, name, attribute, index } => {
            let parser = load(&config, &options)?;
            parser.delete(kind, &name, &attribute, index)?;
            parser.save(&config)?;
            tracing::info!("🗑️ Deleted {} from {} {}", attribute, kind, name);
        }

        Commands::CreateSection { config, kind, name } => {
            let parser = load(&config, &options)?;
            parser.create_section(kind, &name)?;
            parser.save(&config)?;
            tracing::info!("➕ Created {} {}", kind, name);
        }

        Commands::DeleteSection { config, kind, name } => {
            let parser = load(&config, &options)?;
            parser.delete_section(kind, &name)?;
            parser.save(&config)?;
            tracing::info!("🗑️ Deleted section {} {}", kind, name);
        }

        Commands::Version => {
            println!("Proxycfg v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Options file first, then command line overrides
fn parser_options(cli: &Cli) -> anyhow::Result<ParserOptions> {
    let mut options = match &cli.options {
        Some(path) => ParserOptions::load(path)?,
        None => ParserOptions::default(),
    };
    if cli.strict {
        options = options.strict(true);
    }
    if cli.no_comments {
        options = options.preserve_comments(false);
    }
    Ok(options)
}

fn load(path: &Path, options: &ParserOptions) -> anyhow::Result<ConfigParser> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match ConfigParser::from_text(&text, options.clone()) {
        Ok(parser) => Ok(parser),
        Err(err) => {
            report_parse_error(path, &text, &err);
            Err(err).with_context(|| format!("Failed to load {}", path.display()))
        }
    }
}

/// Rebuild the directive line a value stands for
fn directive_line(attribute: &str, value: &[String], negate: bool) -> String {
    let args = value.join(" ");
    match attribute {
        "comments" => format!("# {}", args),
        "unprocessed" => args,
        _ => {
            let mut line = String::new();
            if negate {
                line.push_str("no ");
            }
            line.push_str(attribute);
            if !args.is_empty() {
                line.push(' ');
                line.push_str(&args);
            }
            line
        }
    }
}

fn report_parse_error(path: &Path, source: &str, err: &Error) {
    let Error::Parse { parser, line_no, message, .. } = err else {
        return;
    };
    let Some(span) = line_span(source, *line_no) else {
        return;
    };

    let id = path.display().to_string();
    let _ = Report::build(ReportKind::Error, (id.as_str(), span.clone()))
        .with_message(format!("invalid '{}' directive", parser))
        .with_label(
            Label::new((id.as_str(), span))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((id.as_str(), Source::from(source)));
}

/// Character range of a 1-based line, excluding the newline
fn line_span(source: &str, line_no: usize) -> Option<Range<usize>> {
    let mut start = 0;
    for (i, line) in source.split('\n').enumerate() {
        let len = line.chars().count();
        if i + 1 == line_no {
            return Some(start..start + len);
        }
        start += len + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_line() {
        let args = vec!["web1".to_string(), "10.0.0.1:80".to_string()];
        assert_eq!(directive_line("server", &args, false), "server web1 10.0.0.1:80");
        assert_eq!(directive_line("option redispatch", &[], true), "no option redispatch");
        assert_eq!(directive_line("comments", &["hello".to_string()], false), "# hello");
    }

    #[test]
    fn test_line_span() {
        let source = "global\n  maxconn x\n";
        assert_eq!(line_span(source, 1), Some(0..6));
        assert_eq!(line_span(source, 2), Some(7..18));
        assert_eq!(line_span(source, 0), None);
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from([
            "proxycfg", "set", "haproxy.cfg", "backend", "web", "server", "web1", "10.0.0.1:80", "--index", "0",
        ])
        .unwrap();
        match cli.command {
            Commands::Set { kind, value, index, .. } => {
                assert_eq!(kind, SectionKind::Backend);
                assert_eq!(value, vec!["web1", "10.0.0.1:80"]);
                assert_eq!(index, Some(0));
            }
            _ => panic!("expected set"),
        }
    }
}
