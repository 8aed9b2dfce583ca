//! Command dispatch

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::document::default_document_path;
use crate::application::{
    ApplicationError, DeliveryLog, IoResultExt, MarkdownReportBuilder, PdfReportBuilder,
    ReportBuilder, ReportConfig, ReportFormat, SessionConfig, SessionFactory, TreeDocument,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{NodeRef, Renderer, TreeNodeConvert};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    if !settings.render.color {
        output::disable_color();
    }
    debug!("settings: {:?}", settings);

    match &cli.command {
        Some(Commands::Render { document, marker }) => {
            render(&settings, document.as_deref(), *marker)
        }
        Some(Commands::Tree { document }) => tree(document.as_deref()),
        Some(Commands::Emit { event, document }) => emit(event, document.as_deref()),
        Some(Commands::Session { file }) => session(&settings, file),
        Some(Commands::Report {
            file,
            output,
            format,
        }) => report(&settings, file, output.as_deref(), *format),
        Some(Commands::Config { command }) => config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn document_path(document: Option<&Path>) -> CliResult<PathBuf> {
    match document {
        Some(path) => Ok(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().map_err(|e| CliError::Usage(e.to_string()))?;
            Ok(default_document_path(&cwd))
        }
    }
}

fn load_tree(document: Option<&Path>, log: &DeliveryLog) -> CliResult<NodeRef> {
    let path = document_path(document)?;
    let spec = TreeDocument::load(&path)?;
    Ok(spec.build(log)?)
}

#[instrument]
fn render(settings: &Settings, document: Option<&Path>, marker: Option<char>) -> CliResult<()> {
    let root = load_tree(document, &DeliveryLog::new())?;
    let renderer = Renderer::new(marker.unwrap_or(settings.render.marker));
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    renderer.render(&root, &mut lock)?;
    lock.flush().map_err(crate::domain::DomainError::from)?;
    Ok(())
}

#[instrument]
fn tree(document: Option<&Path>) -> CliResult<()> {
    let root = load_tree(document, &DeliveryLog::new())?;
    output::header(&format!(
        "{} nodes, depth {}",
        root.node_count(),
        root.depth()
    ));
    output::info(&root.to_tree_string());
    Ok(())
}

#[instrument]
fn emit(event: &str, document: Option<&Path>) -> CliResult<()> {
    let log = DeliveryLog::new();
    let root = load_tree(document, &log)?;
    let result = root.emit(event);

    for delivery in log.entries() {
        output::success_detail(&format!("<{}> {}", delivery.node, delivery.message));
    }
    match result {
        Ok(()) => {
            output::action(event, &format!("{} listener call(s)", log.len()));
            Ok(())
        }
        Err(e) => {
            output::failure(&e);
            Err(e.into())
        }
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let content = fs::read_to_string(path).with_path_context("read", path)?;
    toml::from_str(&content).map_err(|e| {
        ApplicationError::Config {
            message: format!("parse {}: {}", path.display(), e),
        }
        .into()
    })
}

#[instrument]
fn session(settings: &Settings, file: &Path) -> CliResult<()> {
    let mut config: SessionConfig = read_toml(file)?;
    if let Some(mongodb) = config.mongodb.as_mut() {
        if mongodb.auth_source.is_none() {
            mongodb.auth_source = Some(settings.session.default_auth_source.clone());
        }
    }
    let session = SessionFactory::create_session(&config).map_err(ApplicationError::from)?;
    output::action(&session.engine().to_string(), session.connection_string());
    output::success(&session.connect());
    Ok(())
}

#[instrument]
fn report(
    settings: &Settings,
    file: &Path,
    output_path: Option<&Path>,
    format: Option<ReportFormat>,
) -> CliResult<()> {
    let config: ReportConfig = read_toml(file)?;
    let format = format.unwrap_or(settings.report.format);
    let path = match output_path {
        Some(path) => path.to_path_buf(),
        None => settings
            .report
            .output_dir
            .join(format!("report.{}", format.extension())),
    };

    match format {
        ReportFormat::Markdown => {
            let mut builder =
                MarkdownReportBuilder::create(&path).map_err(ApplicationError::from)?;
            builder.export(&config).map_err(ApplicationError::from)?;
            output::action("exported", &path.display());
        }
        ReportFormat::Pdf => {
            PdfReportBuilder.export(&config).map_err(ApplicationError::from)?;
            output::warning("pdf export produces no output");
        }
    }
    Ok(())
}

fn config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory for this platform"),
        },
    }
    Ok(())
}
