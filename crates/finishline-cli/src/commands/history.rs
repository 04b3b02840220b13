use clap::Args;
use finishline_core::{Config, SessionLog};

#[derive(Args)]
pub struct HistoryArgs {
    /// Only show the most recent N sessions
    #[arg(long)]
    limit: Option<usize>,
}

pub fn run(args: HistoryArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let log = SessionLog::from_config(config)?;
    let records = log.read_all_records()?;

    let skip = args
        .limit
        .map_or(0, |limit| records.len().saturating_sub(limit));
    println!("{}", serde_json::to_string_pretty(&records[skip..])?);
    Ok(())
}
