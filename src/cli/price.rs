//! Price command implementation

use crate::config::Config;
use crate::dashboard::CardView;
use crate::feed::{CoinCapClient, FeedMachine};
use chrono::Utc;
use clap::Args;

#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Print the snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

impl PriceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = CoinCapClient::new(&config.feed.rest_url, config.feed.request_timeout())?;

        let mut machine = FeedMachine::new(config.feed.retry_policy());
        machine.begin();
        machine.on_quote(client.fetch().await, Utc::now());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&machine.view())?);
        } else {
            println!("{}", CardView::from_feed(&machine.view()).render());
        }

        match machine.error() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
