use clap::Args;

use miclo_core::RecordTab;

use super::{open_session, print_items, runtime, start_and_settle, CommandError, OutputFormat};
use crate::config::Config;

/// List records by tab
#[derive(Args)]
pub struct RecordsCommand {
    /// Tab to list: 0/products, 1/comparisons, 2/saved
    #[arg(default_value = "products")]
    tab: RecordTab,

    /// Pull to refresh before listing
    #[arg(long, short)]
    refresh: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl RecordsCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        let session = open_session(config)?;
        let rt = runtime()?;

        rt.block_on(async {
            start_and_settle(&session).await;
            if self.refresh {
                session.refresh().await;
            }
        });

        let items = session.state().record_tab(self.tab);
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
            OutputFormat::Text => {
                let tabs: Vec<String> = RecordTab::ALL
                    .iter()
                    .map(|tab| {
                        if *tab == self.tab {
                            format!("[{}]", tab)
                        } else {
                            tab.to_string()
                        }
                    })
                    .collect();
                println!("{}", tabs.join("  "));
                println!();
                print_items(&items);
            }
        }

        Ok(())
    }
}
