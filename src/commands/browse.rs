//! Interactive session that drives the core the way screens do: switching
//! tabs, navigating between screens and pulling to refresh.

use std::io::Write;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use miclo_core::{AppState, RecordTab, Screen, Session};

use super::{open_session, print_items, runtime, start_and_settle, CommandError};
use crate::config::Config;

const HELP: &str = "\
Commands:
  tab <0|1|2|name>   switch records tab
  open <screen>      navigate to a screen (records, history, saved, scanner, ...)
  capture            open the capture flow on its configured first screen
  refresh            pull to refresh
  help               show this help
  quit               leave";

/// Interactive records browser
#[derive(Args)]
pub struct BrowseCommand {
    /// Tab to start on
    #[arg(long, short, default_value = "products")]
    tab: RecordTab,
}

struct Browser<'a> {
    session: &'a Session,
    state: AppState,
    screen: Screen,
    tab: RecordTab,
    background: Vec<JoinHandle<()>>,
}

impl BrowseCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        let session = open_session(config)?;
        let rt = runtime()?;

        rt.block_on(async {
            start_and_settle(&session).await;

            let mut browser = Browser {
                state: session.state(),
                session: &session,
                screen: Screen::Records,
                tab: self.tab,
                background: Vec::new(),
            };
            browser.run().await
        })
    }
}

impl Browser<'_> {
    async fn run(&mut self) -> Result<(), CommandError> {
        println!("{}\n", HELP);
        self.show();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{}> ", self.screen);
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (None, _) => {}
                (Some("tab"), Some(tab)) => match tab.parse::<RecordTab>() {
                    Ok(tab) => {
                        self.tab = tab;
                        self.navigate(Screen::Records);
                    }
                    Err(e) => println!("{}", e),
                },
                (Some("open"), Some(screen)) => match screen.parse::<Screen>() {
                    Ok(screen) => self.navigate(screen),
                    Err(e) => println!("{}", e),
                },
                (Some("capture"), _) => {
                    let route = self.session.preferences().resolve_capture_route().await;
                    self.navigate(route);
                }
                (Some("refresh"), _) => {
                    self.session.refresh().await;
                    self.show();
                }
                (Some("help"), _) => println!("{}", HELP),
                (Some("quit" | "exit"), _) => break,
                (Some(other), _) => println!("Unknown command '{}'. Type 'help'.", other),
            }
        }

        // Let background refetches settle before the runtime shuts down
        for handle in self.background.drain(..) {
            let _ = handle.await;
        }
        Ok(())
    }

    fn navigate(&mut self, to: Screen) {
        if to != self.screen {
            if let Some(handle) = self.session.screen_lost_focus(self.screen) {
                self.background.retain(|h| !h.is_finished());
                self.background.push(handle);
            }
            self.screen = to;
        }
        self.show();
    }

    fn show(&self) {
        match self.screen {
            Screen::Records => {
                println!("{}", self.tab);
                print_items(&self.state.record_tab(self.tab));
            }
            Screen::RecordsHistory => {
                println!("{}", RecordTab::Comparisons);
                print_items(&self.state.record_tab(RecordTab::Comparisons));
            }
            Screen::RecordsSaved => {
                println!("{}", RecordTab::Saved);
                print_items(&self.state.record_tab(RecordTab::Saved));
            }
            Screen::ProductCategories | Screen::ProductSearch => {
                print_items(&self.state.products_in_selected_category());
            }
            other => println!("({})", other),
        }
    }
}
