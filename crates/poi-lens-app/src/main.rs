//! poi-lens-demo
//!
//! Usage:
//!   poi-lens-demo                              # static catalog around Maltepe
//!   poi-lens-demo --source overpass --radius 2 # live OpenStreetMap data
//!   poi-lens-demo --lat 39.925 --lon 32.836 --heading 180 --json

use clap::Parser;
use poi_lens_app::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    poi_lens_app::run(args).await
}
