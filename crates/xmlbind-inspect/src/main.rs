//! xmlbind-inspect
//!
//! Prints the structural events the binder reads from a document, one per
//! line, with their nesting depth. Useful to understand a structural-mismatch
//! error: the reported depth and path can be compared with this listing.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use helios_xmlbind::BindConfig;
use helios_xmlbind::xml::{Cursor, EventKind};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "xmlbind-inspect", version, about)]
struct Args {
    /// XML document to read.
    file: PathBuf,

    /// Keep surrounding whitespace of text content.
    #[arg(long)]
    no_trim: bool,

    /// Maximum element nesting.
    #[arg(long, env = "XMLBIND_MAX_DEPTH")]
    max_depth: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "XMLBIND_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

impl Args {
    fn config(&self) -> BindConfig {
        let mut config = BindConfig {
            trim_text: !self.no_trim,
            ..Default::default()
        };
        if self.max_depth.is_some() {
            config.max_depth = self.max_depth;
        }
        config
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "helios_xmlbind={level},xmlbind_inspect={level}",
            level = level
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn describe<R: std::io::BufRead>(cursor: &Cursor<R>) -> String {
    match cursor.kind() {
        EventKind::StartTag => {
            let mut tag = format!("<{}", cursor.name());
            for attribute in cursor.attributes() {
                tag.push_str(&format!(" {}={:?}", attribute.name, attribute.value));
            }
            tag.push('>');
            tag
        }
        EventKind::EndTag => format!("</{}>", cursor.name()),
        EventKind::Text => format!("{:?}", cursor.text()),
        EventKind::StartDocument | EventKind::EndDocument => String::new(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let config = args.config();
    info!(file = %args.file.display(), ?config, "inspecting document");

    let mut cursor = Cursor::new(BufReader::new(file), &config);
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut events = 0usize;
    loop {
        writeln!(
            out,
            "{:>3} {:<17} {}",
            cursor.depth(),
            cursor.kind().to_string(),
            describe(&cursor)
        )?;
        events += 1;
        if cursor.kind() == EventKind::EndDocument {
            break;
        }
        if let Err(err) = cursor.advance() {
            out.flush()?;
            return Err(err).with_context(|| format!("while reading {}", args.file.display()));
        }
    }
    out.flush()?;

    info!(events, "done");
    Ok(())
}
