use serde_json::json;

use crate::cli::OutputFormat;
use crate::database::reports;
use crate::database::DatabaseManager;
use crate::verification::ClaimWindow;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;
    let stats = reports::admin_stats(&pool, ClaimWindow::today().date).await?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "stats": stats }))?),
        OutputFormat::Text => {
            println!("Date:              {}", stats.date);
            println!("Students:          {} ({} active, {} inactive)", stats.total_students, stats.active_students, stats.inactive_students);
            println!("Active vendors:    {}", stats.active_vendors);
            println!("Claims today:      {}", stats.claims_today);
            for vendor in &stats.vendors {
                println!(
                    "  {:<30} {:>5} claimed / {:>5} assigned",
                    vendor.vendor_name, vendor.claimed_today, vendor.assigned_students
                );
            }
        }
    }
    Ok(())
}
