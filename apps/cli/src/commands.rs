use anyhow::Context;
use clap::Subcommand;
use langfile_core::formats::{get_handler, ExchangeFormat};
use langfile_core::{
    localized_line, resolve_language_file, LanguageConfig, LanguageDocument, LoadReport,
};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum Commands {
    /// Report skipped lines, duplicate ids, dangling group members and unencodable text
    Check {
        /// Language file
        file: PathBuf,
    },

    /// Rewrite a language file in canonical order
    Format {
        /// Language file
        file: PathBuf,
    },

    /// Print one record as JSON
    Show {
        /// Language file
        file: PathBuf,

        /// Record id
        #[arg(allow_negative_numbers = true)]
        id: f32,
    },

    /// Resolve the language file and print the raw line for an id
    Line {
        /// Record id
        #[arg(allow_negative_numbers = true)]
        id: f32,

        /// System locale name, e.g. "English (United States)"
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Print which language file would be used
    Resolve {
        /// System locale name
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Export record text for translation
    Export {
        /// Language file
        file: PathBuf,

        /// Exchange format (tsv or json)
        #[arg(short, long, default_value = "tsv")]
        format: ExchangeFormat,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge translated text back into a language file
    Import {
        /// Language file
        file: PathBuf,

        /// Translated input
        input: PathBuf,

        /// Exchange format; detected from the input extension when omitted
        #[arg(short, long)]
        format: Option<ExchangeFormat>,
    },
}

impl Commands {
    /// Run the command. `Ok(false)` means it ran but found problems.
    pub fn execute(&self, config: &LanguageConfig) -> anyhow::Result<bool> {
        match self {
            Commands::Check { file } => check(file, config),
            Commands::Format { file } => format(file, config),
            Commands::Show { file, id } => show(file, *id, config),
            Commands::Line { id, locale } => line(*id, locale.as_deref(), config),
            Commands::Resolve { locale } => resolve(locale.as_deref(), config),
            Commands::Export {
                file,
                format,
                output,
            } => export(file, *format, output.as_deref(), config),
            Commands::Import {
                file,
                input,
                format,
            } => import(file, input, *format, config),
        }
    }
}

fn load(file: &Path, config: &LanguageConfig) -> anyhow::Result<LoadReport> {
    LanguageDocument::load(file, config).with_context(|| format!("loading {}", file.display()))
}

fn check(file: &Path, config: &LanguageConfig) -> anyhow::Result<bool> {
    let report = load(file, config)?;
    for skipped in &report.skipped {
        println!("skipped {}", skipped);
    }

    let consistency = report.document.check(&config.checks);
    for duplicate in consistency.duplicates.iter() {
        println!("{}", duplicate);
    }
    for dangling in &consistency.dangling {
        println!("{}", dangling);
    }
    for unencodable in &consistency.unencodable {
        println!("{}", unencodable);
    }
    for header in &consistency.header {
        println!("{}", header);
    }

    let clean = report.skipped.is_empty() && consistency.is_clean();
    if clean {
        println!(
            "{}: {} records, {} groups, {} comments, no problems",
            file.display(),
            report.document.ids.len(),
            report.document.groups.len(),
            report.document.comments.len()
        );
    }
    Ok(clean)
}

fn format(file: &Path, config: &LanguageConfig) -> anyhow::Result<bool> {
    let report = load(file, config)?;
    let outcome = report
        .document
        .save(file, config)
        .with_context(|| format!("saving {}", file.display()))?;
    if let Some(backup) = &outcome.backup_path {
        info!("backup written to {}", backup.display());
    }
    println!("formatted {}", outcome.final_path.display());
    Ok(report.skipped.is_empty())
}

fn show(file: &Path, id: f32, config: &LanguageConfig) -> anyhow::Result<bool> {
    let report = load(file, config)?;
    match report.document.record(id) {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(record)?);
            Ok(true)
        }
        None => {
            eprintln!("no record with id {}", id);
            Ok(false)
        }
    }
}

fn line(id: f32, locale: Option<&str>, config: &LanguageConfig) -> anyhow::Result<bool> {
    match localized_line(id, config, locale)? {
        Some(line) => {
            println!("{}", line);
            Ok(true)
        }
        None => {
            eprintln!("no line for id {}", id);
            Ok(false)
        }
    }
}

fn resolve(locale: Option<&str>, config: &LanguageConfig) -> anyhow::Result<bool> {
    let resolved = resolve_language_file(config, locale)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(true)
}

fn export(
    file: &Path,
    format: ExchangeFormat,
    output: Option<&Path>,
    config: &LanguageConfig,
) -> anyhow::Result<bool> {
    let report = load(file, config)?;
    let content = get_handler(format).export(&report.document)?;
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            info!("exported {} to {}", file.display(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(true)
}

fn import(
    file: &Path,
    input: &Path,
    format: Option<ExchangeFormat>,
    config: &LanguageConfig,
) -> anyhow::Result<bool> {
    let format = format
        .or_else(|| ExchangeFormat::from_path(input))
        .ok_or_else(|| anyhow::anyhow!("cannot detect format of {}", input.display()))?;
    let content =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;

    let mut document = load(file, config)?.document;
    let merge = get_handler(format).merge(&mut document, &content)?;
    for id in &merge.unknown {
        eprintln!("unknown id {}", id);
    }
    for line in &merge.malformed {
        eprintln!("malformed row on line {}", line);
    }

    document
        .save(file, config)
        .with_context(|| format!("saving {}", file.display()))?;
    println!("updated {} records in {}", merge.updated.len(), file.display());
    Ok(merge.unknown.is_empty() && merge.malformed.is_empty())
}
