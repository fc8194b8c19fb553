use chrono::{DateTime, Local, Utc};
use clap::Args;

use miclo_core::{Phase, Snapshot};

use super::{open_session, runtime, start_and_settle, CommandError};
use crate::config::Config;

/// Show collection and loading state
#[derive(Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        let session = open_session(config)?;
        runtime()?.block_on(start_and_settle(&session));
        let state = session.state();

        println!("Status");
        println!("======\n");
        println!("Server:  {}", config.server_url.value);
        println!(
            "Phase:   {}",
            match state.phase() {
                Phase::Loading => "loading",
                Phase::Ready => "ready",
            }
        );
        println!(
            "Loading: {}",
            if state.is_loading() { "yes" } else { "no" }
        );
        println!();

        print_collection("products", &state.products().snapshot());
        print_collection("comparisons", &state.comparisons().snapshot());
        print_collection("favorites", &state.favorites().snapshot());
        print_collection("info", &state.info().snapshot());

        let views = state.record_views();
        println!();
        println!("Compared products:  {}", views.all_compared.len());
        println!("Active comparisons: {}", views.active_comparisons.len());
        println!("Saved:              {}", views.favorites.len());

        Ok(())
    }
}

fn print_collection<T>(name: &str, snapshot: &Snapshot<T>) {
    println!(
        "{:<12} {:>4} records  {}",
        name,
        snapshot.items.len(),
        fetched_at(snapshot.fetched_at)
    );
}

fn fetched_at(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => format!(
            "fetched {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => "not fetched".to_string(),
    }
}
