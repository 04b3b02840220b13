use chrono::Utc;
use clap::Args;
use finishline_core::{Config, InsightsBackend};

#[derive(Args)]
pub struct SummaryArgs {
    /// Summarize a single trailing window of this many days
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    days: Option<u32>,
}

pub fn run(args: SummaryArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let backend = InsightsBackend::from_config(config)?;

    match args.days {
        Some(days) => {
            let summary = backend.window_summary_at(Some(days), Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        None => {
            let summary = backend.get_summary()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
