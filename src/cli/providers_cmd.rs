//! `kargo-takip providers` — list registered carrier integrations.

use crate::registry::CargoTracker;
use anyhow::Result;

pub fn run(json: bool) -> Result<()> {
    let tracker = CargoTracker::new();
    let names = tracker.providers();

    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        println!("Registered providers ({}):", names.len());
        for name in &names {
            println!("  {name}");
        }
    }
    Ok(())
}
