//! # FormAI CLI
//!
//! Command-line interface for FormAI.
//!
//! ## Commands
//!
//! - `generate` - Generate a form from a description with Gemini
//! - `improve` - Ask Gemini to rework the elements of a form file
//! - `show` - Print a form file
//! - `validate` - Check every element of a form file
//! - `add` - Append an element to a form file
//!

pub mod commands;
pub mod output;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use formai_ai::config::{API_KEY_ENV, BASE_URL_ENV, DEFAULT_TIMEOUT, MODEL_ENV};
use formai_ai::{AiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, FormGenerator, GenerationRequest};
use formai_core::ElementType;
use std::path::PathBuf;
use std::time::Duration;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "formai")]
#[command(version)]
#[command(about = "Build forms by hand or generate them with AI", long_about = None)]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub ai: AiArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Generative model settings, shared by `generate` and `improve`
#[derive(Debug, Clone, Args)]
pub struct AiArgs {
    /// Gemini API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model id
    #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Base URL of the Gemini REST API
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), global = true)]
    pub timeout: u64,

    /// Sampling temperature
    #[arg(long, global = true)]
    pub temperature: Option<f32>,
}

impl AiArgs {
    pub fn to_config(&self) -> AiConfig {
        let mut config = AiConfig::new()
            .with_model(self.model.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config = config.with_api_key(key);
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a form from a description
    Generate {
        /// What the form is for (at least 10 characters)
        #[arg(short, long)]
        description: String,

        /// Kind of form, e.g. survey or registration
        #[arg(long)]
        form_type: Option<String>,

        /// Who will fill in the form
        #[arg(long)]
        audience: Option<String>,

        /// Extra instructions for the model
        #[arg(long)]
        requirements: Option<String>,

        /// Save the generated form to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Improve the elements of an existing form
    Improve {
        /// Form file
        file: PathBuf,

        /// What to change
        #[arg(short, long)]
        request: String,

        /// Write the result here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a form
    Show {
        /// Form file
        file: PathBuf,
    },

    /// Check every element of a form
    Validate {
        /// Form file
        file: PathBuf,
    },

    /// Append an element to a form
    Add {
        /// Form file
        file: PathBuf,

        /// Element type
        #[arg(short = 't', long = "type")]
        element_type: ElementType,

        /// Label for the new element
        #[arg(short, long)]
        label: Option<String>,
    },
}

// ============================================================================
// Entry point
// ============================================================================

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            description,
            form_type,
            audience,
            requirements,
            output,
        } => {
            let mut request = GenerationRequest::new(description);
            request.form_type = form_type;
            request.target_audience = audience;
            request.additional_requirements = requirements;

            let generator = FormGenerator::from_config(cli.ai.to_config())?;
            let record = commands::generate(&generator, &request, output.as_deref()).await?;
            println!();
            output::print_form(&record);
        }
        Commands::Improve {
            file,
            request,
            output,
        } => {
            let generator = FormGenerator::from_config(cli.ai.to_config())?;
            let record = commands::improve(&generator, &file, &request, output.as_deref()).await?;
            output::success(&format!(
                "Improved form now has {} elements",
                record.element_count()
            ));
            output::print_form(&record);
        }
        Commands::Show { file } => {
            output::print_form(&commands::show(&file)?);
        }
        Commands::Validate { file } => {
            let issues = commands::validate(&file)?;
            if !issues.is_empty() {
                for issue in &issues {
                    output::failure(issue);
                }
                bail!("{} has {} validation issue(s)", file.display(), issues.len());
            }
            output::success(&format!("{} is valid", file.display()));
        }
        Commands::Add {
            file,
            element_type,
            label,
        } => {
            let id = commands::add(&file, element_type, label.as_deref())?;
            output::success(&format!(
                "Added {} element '{}'",
                element_type.display_name(),
                id
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["formai", "add", "form.formai.json", "--type", "rating"])
            .unwrap();
        match cli.command {
            Commands::Add {
                element_type,
                label,
                ..
            } => {
                assert_eq!(element_type, ElementType::Rating);
                assert!(label.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_element_type_rejected() {
        let err = Cli::try_parse_from(["formai", "add", "f.json", "--type", "slider"]).unwrap_err();
        assert!(err.to_string().contains("unknown element type 'slider'"));
    }

    #[test]
    fn test_ai_args_to_config() {
        let cli = Cli::try_parse_from([
            "formai",
            "--api-key",
            "k",
            "--base-url",
            "http://localhost:9000/",
            "--temperature",
            "0.2",
            "generate",
            "-d",
            "A newsletter signup form",
        ])
        .unwrap();

        let config = cli.ai.to_config();
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.temperature, Some(0.2));
        assert!(!VERSION.is_empty());
    }
}
