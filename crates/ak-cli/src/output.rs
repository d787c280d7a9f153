//! Terminal rendering helpers.

use ak_core::{Asset, AssetStatus, ReportedStatus};
use ak_lifecycle::LifecycleAction;
use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Colors a status for display.
pub fn status_label(status: &ReportedStatus) -> ColoredString {
    let text = status.to_string();
    match status.known() {
        Some(AssetStatus::Available) => text.green(),
        Some(AssetStatus::Allocated) => text.blue(),
        Some(AssetStatus::Maintenance) => text.yellow(),
        Some(AssetStatus::InRepair) => text.red(),
        Some(AssetStatus::Retired) => text.dimmed(),
        None => text.magenta(),
    }
}

pub fn owner_or_dash(owner: Option<&str>) -> &str {
    owner.filter(|o| !o.is_empty()).unwrap_or("-")
}

/// Describes an action as the command that performs it.
pub fn describe_action(asset_id: &str, action: &LifecycleAction) -> String {
    match action {
        LifecycleAction::Assign => format!("assets assign {} <user>", asset_id),
        LifecycleAction::Unassign => format!("assets unassign {}", asset_id),
        LifecycleAction::ChangeStatus(targets) => {
            let targets: Vec<&str> = targets.iter().map(|s| s.as_str()).collect();
            format!(
                "assets set-status {} <{}>",
                asset_id,
                targets.join("|")
            )
        }
    }
}

/// Prints one line per asset.
pub fn print_asset_table(assets: &[Asset]) {
    if assets.is_empty() {
        println!("No assets found");
        return;
    }
    for asset in assets {
        println!(
            "  {:<8} {:<28} {:<10} {:<14} {}",
            asset.id.cyan(),
            truncate(&asset.name, 28),
            asset.category.as_str(),
            status_label(&asset.status),
            owner_or_dash(asset.owner.as_deref())
        );
    }
    println!();
    println!("{} asset(s)", assets.len());
}

/// Prints the full record of one asset.
pub fn print_asset_detail(asset: &Asset) {
    println!("{} {}", "Asset:".bold(), asset.id);
    println!("─────────────────────────────────────────");
    println!("  {} {}", "Name:".cyan(), asset.name);
    println!("  {} {}", "Status:".cyan(), status_label(&asset.status));
    println!(
        "  {} {}",
        "Owner:".cyan(),
        owner_or_dash(asset.owner.as_deref())
    );
    println!("  {} {}", "Category:".cyan(), asset.category);
    if !asset.model_name.is_empty() {
        println!(
            "  {} {} {} {}",
            "Model:".cyan(),
            asset.manufacturer,
            asset.model_name,
            asset.model_number
        );
    }
    if let Some(serial) = &asset.serial_number {
        println!("  {} {}", "Serial:".cyan(), serial);
    }
    if let Some(tag) = &asset.asset_tag {
        println!("  {} {}", "Tag:".cyan(), tag);
    }
    if let Some(cost) = asset.cost {
        println!("  {} {:.2}", "Cost:".cyan(), cost);
    }
    if let Some(date) = asset.purchase_date {
        println!("  {} {}", "Purchased:".cyan(), date);
    }
    if let Some(date) = asset.warranty_expiry {
        println!("  {} {}", "Warranty until:".cyan(), date);
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_or_dash() {
        assert_eq!(owner_or_dash(Some("alice@example.com")), "alice@example.com");
        assert_eq!(owner_or_dash(Some("")), "-");
        assert_eq!(owner_or_dash(None), "-");
    }

    #[test]
    fn test_describe_action() {
        assert_eq!(
            describe_action("7", &LifecycleAction::Assign),
            "assets assign 7 <user>"
        );
        assert_eq!(
            describe_action(
                "7",
                &LifecycleAction::ChangeStatus(vec![AssetStatus::Available, AssetStatus::Retired])
            ),
            "assets set-status 7 <available|retired>"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Laptop", 10), "Laptop");
        assert_eq!(truncate("Very long asset name", 8), "Very lo…");
    }
}
