use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use notice_drafter::autosave::{watch_draft_file, Autosaver};
use notice_drafter::classifier::{detect_language, Classifier};
use notice_drafter::config::AppConfig;
use notice_drafter::db::{establish_connection, Database};
use notice_drafter::logging::init_logging;
use notice_drafter::models::{Category, Draft, Language, MessageFilter, MessageTable};
use notice_drafter::service::{format_logs, NoticeService};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the message text comes from
#[derive(Args)]
#[group(required = true, multiple = false)]
struct TextSource {
    /// Message text
    #[arg(short, long)]
    text: Option<String>,

    /// Read the message text from a file
    #[arg(short, long)]
    file: Option<PathBuf>,
}

/// Language and tag selections
#[derive(Args)]
struct Selection {
    /// Draft language (English, Urdu, Sindhi); detected when omitted
    #[arg(short, long)]
    lang: Option<Language>,

    /// District; guessed from the text when omitted
    #[arg(short, long)]
    district: Option<String>,

    /// Category (A, B, C, D, Others); guessed from the text when omitted
    #[arg(short, long)]
    category: Option<Category>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a message with a template and store it
    Convert {
        #[command(flatten)]
        source: TextSource,

        #[command(flatten)]
        selection: Selection,

        /// Template name (defaults to the configured template)
        #[arg(short = 'p', long)]
        template: Option<String>,
    },
    /// Show the district and category guessed for a message
    Classify {
        #[command(flatten)]
        source: TextSource,
    },
    /// Search stored messages
    Logs {
        /// Day to show (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// District to show
        #[arg(short, long)]
        district: Option<String>,

        /// Category to show
        #[arg(short, long)]
        category: Option<Category>,

        /// Which log to search (input, translated, converted)
        #[arg(long, default_value = "converted")]
        table: MessageTable,
    },
    /// Manage templates
    Templates {
        #[command(subcommand)]
        action: TemplateCommand,
    },
    /// Autosave a draft file while it is being edited
    Watch {
        /// Draft file to watch
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        selection: Selection,

        /// Seconds between autosaves (defaults to the configured interval)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// List template names
    List,
    /// Print a template's text
    Show {
        /// Template name
        name: String,
    },
    /// Create a new template
    Create {
        /// Template name
        name: String,

        #[command(flatten)]
        source: TextSource,
    },
    /// Replace an existing template's text
    Update {
        /// Template name
        name: String,

        #[command(flatten)]
        source: TextSource,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let log_file = config.logging.file_path.as_deref().map(Path::new);
    let _log_guard = init_logging(Some(config.get_log_level().as_str()), log_file, config.logging.format == "json")?;

    info!("Starting notice-drafter");

    // One store handle for the whole session
    let db = establish_connection(&config).context("Failed to open message store")?;
    let classifier = Classifier::new(config.classifier.districts.clone());

    let result = run(&config, &db, classifier, cli.command).await;
    db.close().context("Failed to close message store")?;
    result
}

async fn run(config: &AppConfig, db: &Database, classifier: Classifier, command: Commands) -> Result<()> {
    match command {
        Commands::Convert {
            source,
            selection,
            template,
        } => {
            let text = read_text(&source)?;
            let template = template.unwrap_or_else(|| config.templates.default_name.clone());
            let draft = build_draft(text, &selection, template);
            convert_message(db, classifier, &draft)
        },
        Commands::Classify { source } => {
            let text = read_text(&source)?;
            let classification = classifier.classify(&text);
            print_lines(&[
                format!("district: {}", classification.district),
                format!("category: {}", classification.category),
            ]);
            Ok(())
        },
        Commands::Logs {
            date,
            district,
            category,
            table,
        } => {
            let filter = MessageFilter {
                date,
                district,
                category,
            };
            show_logs(db, table, &filter)
        },
        Commands::Templates { action } => manage_templates(db, action),
        Commands::Watch {
            file,
            selection,
            interval_secs,
        } => {
            let period = Duration::from_secs(interval_secs.unwrap_or(config.autosave.interval_secs).max(1));
            let draft = build_draft(String::new(), &selection, config.templates.default_name.clone());
            let mut autosaver = Autosaver::new(classifier);

            info!(path = %file.display(), ?period, "Watching draft, press Ctrl-C to stop");
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
            };

            let saved = watch_draft_file(db, &mut autosaver, &draft, &file, period, shutdown).await?;
            print_lines(&[format!("Autosaved {saved} draft version(s).")]);
            Ok(())
        },
    }
}

/// Convert a draft and print the result
fn convert_message(db: &Database, classifier: Classifier, draft: &Draft) -> Result<()> {
    let mut service = NoticeService::new(db).with_classifier(classifier);
    let report = service.convert_message(draft)?;

    if report.conversion.is_fallback() {
        warn!("Template '{}' could not be applied; output is the original message", draft.template_name);
    }
    debug!(district = %report.district, category = %report.category, "Stored tags");

    print_lines(&[report.output().to_string()]);
    Ok(())
}

/// Print matching log entries
fn show_logs(db: &Database, table: MessageTable, filter: &MessageFilter) -> Result<()> {
    let service = NoticeService::new(db);
    let entries = service.filter_table(table, filter)?;
    info!("Found {} messages", entries.len());

    print_lines(&[format_logs(&entries)]);
    Ok(())
}

/// Template subcommands
fn manage_templates(db: &Database, action: TemplateCommand) -> Result<()> {
    let service = NoticeService::new(db);

    match action {
        TemplateCommand::List => {
            print_lines(&service.template_names()?);
        },
        TemplateCommand::Show { name } => {
            let text = service.template_text(&name)?;
            if text.is_empty() {
                anyhow::bail!("Template not found: {}", name);
            }
            print_lines(&[text]);
        },
        TemplateCommand::Create { name, source } => {
            let text = read_text(&source)?;
            if !service.save_template(&name, &text)? {
                anyhow::bail!(
                    "Template '{}' already exists. Nothing was saved; use `templates update` to change it.",
                    name
                );
            }
            print_lines(&[format!("Template '{name}' saved.")]);
        },
        TemplateCommand::Update { name, source } => {
            let text = read_text(&source)?;
            if !service.edit_template(&name, &text)? {
                anyhow::bail!("Template not found: {}", name);
            }
            print_lines(&[format!("Template '{name}' updated.")]);
        },
    }

    Ok(())
}

fn build_draft(text: String, selection: &Selection, template_name: String) -> Draft {
    let lang = selection
        .lang
        .or_else(|| detect_language(&text))
        .unwrap_or_default();

    Draft {
        text,
        lang,
        district: selection.district.clone(),
        category: selection.category,
        template_name,
    }
}

fn read_text(source: &TextSource) -> Result<String> {
    match (&source.text, &source.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        },
        (None, None) => Err(anyhow::anyhow!("Provide --text or --file")),
    }
}

#[allow(clippy::print_stdout)]
fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_is_handled_by_the_parser() {
        let err = Cli::try_parse_from(["notice-drafter", "--help"])
            .err()
            .expect("--help should stop parsing");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_convert_requires_exactly_one_text_source() {
        assert!(Cli::try_parse_from(["notice-drafter", "convert"]).is_err());
        assert!(Cli::try_parse_from(["notice-drafter", "convert", "-t", "x", "-f", "y.txt"]).is_err());

        let cli = Cli::try_parse_from(["notice-drafter", "convert", "-t", "Rally", "-c", "b", "-l", "urdu"])
            .expect("valid convert invocation");
        match cli.command {
            Commands::Convert { source, selection, template } => {
                assert_eq!(source.text.as_deref(), Some("Rally"));
                assert_eq!(selection.category, Some(Category::B));
                assert_eq!(selection.lang, Some(Language::Urdu));
                assert!(template.is_none());
            },
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_logs_table_defaults_to_converted() {
        let cli = Cli::try_parse_from(["notice-drafter", "logs", "--date", "2024-01-01"]).expect("valid logs invocation");
        match cli.command {
            Commands::Logs { date, table, .. } => {
                assert_eq!(date.as_deref(), Some("2024-01-01"));
                assert_eq!(table, MessageTable::Converted);
            },
            _ => panic!("expected logs"),
        }
    }
}
