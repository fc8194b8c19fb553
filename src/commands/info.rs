use clap::Args;

use super::{open_session, runtime, start_and_settle, CommandError, OutputFormat};
use crate::config::Config;

/// Show about-us, FAQ and version information
#[derive(Args)]
pub struct InfoCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl InfoCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        let session = open_session(config)?;
        runtime()?.block_on(start_and_settle(&session));

        let info = session.state().more_info();
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            OutputFormat::Text => {
                let title = if info.about_us.title.is_empty() {
                    "About"
                } else {
                    info.about_us.title.as_str()
                };
                println!("{}", title);
                println!("{}", "=".repeat(title.chars().count()));
                print_section(&info.about_us.content);
                print_section(&info.about_us.footer);

                println!("FAQ");
                println!("===");
                print_section(&info.faq.content);

                println!("Version: {}", or_dash(&info.version.content));
            }
        }

        Ok(())
    }
}

fn print_section(text: &str) {
    if !text.is_empty() {
        println!("{}", text);
    }
    println!();
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}
