use clap::{Args, Subcommand, ValueEnum};

use super::{open_preferences, runtime, CommandError, OutputFormat};
use crate::config::Config;

/// Inspect and change persisted preferences
#[derive(Args)]
pub struct PrefsCommand {
    #[command(subcommand)]
    command: PrefsSubcommand,
}

#[derive(Clone, Copy, ValueEnum)]
enum CaptureStart {
    /// Open the category picker first
    Picker,
    /// Open the barcode scanner first
    Scanner,
}

#[derive(Subcommand)]
enum PrefsSubcommand {
    /// Show resolved preferences
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set the default product category (mask, sanitizer)
    Category { value: String },

    /// Mark the intro as seen
    IntroSeen,

    /// Choose the first screen of the capture flow
    CaptureDefault {
        #[arg(value_enum)]
        start: CaptureStart,
    },

    /// Print the first screen of the capture flow
    Route,
}

impl PrefsCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        let resolver = open_preferences(config);
        let rt = runtime()?;

        rt.block_on(async {
            match &self.command {
                PrefsSubcommand::Show { format } => {
                    let prefs = resolver.resolve().await;
                    let route = resolver.resolve_capture_route().await;
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&prefs)?);
                        }
                        OutputFormat::Text => {
                            println!("Preferences");
                            println!("===========\n");
                            println!(
                                "device_id:         {}",
                                prefs.device_id.as_deref().unwrap_or("(unavailable)")
                            );
                            println!(
                                "intro_seen:        {}",
                                if prefs.intro_seen { "yes" } else { "no" }
                            );
                            println!(
                                "selected_category: {}",
                                prefs
                                    .selected_category
                                    .map(|c| c.to_string())
                                    .unwrap_or_else(|| "(none)".to_string())
                            );
                            println!("capture_route:     {}", route);
                        }
                    }
                }

                PrefsSubcommand::Category { value } => {
                    let category = resolver
                        .update_selected_category(value)
                        .await
                        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
                    println!("Default category set to {}", category);
                }

                PrefsSubcommand::IntroSeen => {
                    resolver.mark_intro_seen().await;
                    println!("Intro marked as seen");
                }

                PrefsSubcommand::CaptureDefault { start } => {
                    resolver
                        .set_capture_default(matches!(start, CaptureStart::Picker))
                        .await
                        .map_err(|e| CommandError::Persistence(e.to_string()))?;
                    println!(
                        "Capture flow now opens on {}",
                        resolver.resolve_capture_route().await
                    );
                }

                PrefsSubcommand::Route => {
                    println!("{}", resolver.resolve_capture_route().await);
                }
            }

            Ok::<(), CommandError>(())
        })
    }
}
