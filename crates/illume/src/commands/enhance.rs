//! `illume enhance` command implementation.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use illume_config::{CliSettings, Config};
use illume_enhance::{DiagramOptions, DiagramTheme, Enhancer, Highlighter};
use illume_kroki::KrokiEngineProvider;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the enhance command.
#[derive(Args)]
pub(crate) struct EnhanceArgs {
    /// Rendered HTML document to enhance.
    input: PathBuf,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover illume.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kroki server URL for diagram and drawing rendering (overrides config).
    #[arg(long)]
    kroki_url: Option<String>,

    /// Remote PlantUML server URL (overrides config).
    #[arg(long)]
    plantuml_url: Option<String>,

    /// Enable verbose output (show per-block warnings and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl EnhanceArgs {
    /// Execute the enhance command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or document I/O fails;
    /// per-block rendering failures are reported as warnings instead.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            kroki_url: self.kroki_url,
            plantuml_url: self.plantuml_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let html = std::fs::read_to_string(&self.input)?;
        let enhancer = build_enhancer(&config);
        let outcome = enhancer.enhance(&html);

        for warning in &outcome.warnings {
            output.warning(&format!("warning: {warning}"));
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &outcome.html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                std::io::stdout().write_all(outcome.html.as_bytes())?;
            }
        }
        Ok(())
    }
}

/// Wire configuration into an enhancement pipeline.
fn build_enhancer(config: &Config) -> Enhancer {
    let languages = config
        .highlight
        .languages
        .clone()
        .unwrap_or_else(Highlighter::default_languages);

    let mut enhancer = Enhancer::new(Highlighter::new(languages))
        .with_plantuml_server(config.plantuml.server_url.clone())
        .with_plantuml_format(config.plantuml.format.clone())
        .with_diagram_options(DiagramOptions {
            theme: parse_theme(&config.diagrams.theme),
            fit_to_width: config.diagrams.fit_to_width,
        });

    if let Some(kroki_url) = &config.diagrams.kroki_url {
        let provider = KrokiEngineProvider::new(kroki_url)
            .with_timeout(Duration::from_secs(config.engines.timeout_secs));
        enhancer = enhancer
            .with_diagram_engine(provider.clone())
            .with_drawing_export(provider);
    }
    enhancer
}

fn parse_theme(name: &str) -> DiagramTheme {
    match name {
        "default" | "light" => DiagramTheme::Light,
        "dark" => DiagramTheme::Dark,
        other => {
            tracing::warn!(theme = other, "Unknown diagram theme, using dark");
            DiagramTheme::Dark
        }
    }
}
