//! Asset Keeper CLI
//!
//! Command-line interface for managing office hardware in the inventory
//! system: browsing assets, assigning them to people and moving them through
//! maintenance, repair and retirement.

use ak_connectors::inventory::mock::MOCK_OPERATOR;
use ak_connectors::{ConnectorHealth, InventoryConnector, MockInventoryConnector, RestInventoryConnector};
use ak_core::{
    filter_history, is_valid_status, valid_transitions, Asset, AssetActivity, AssetCategory,
    AssetEdit, AssetStatus, CategoryCounts, HistoryFilter, NewAsset, OwnershipFilter,
    ReportedStatus, Role, StatusChange, StatusCounts,
};
use ak_lifecycle::{available_actions, LifecycleAction, LifecycleService};
use ak_observability::{init_logging_with_config, LoggingConfig};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, Instrument};

mod config;
mod output;
mod validator;

use config::{AppConfig, OperatorConfig};
use output::{
    describe_action, owner_or_dash, print_asset_detail, print_asset_table, print_json,
    status_label,
};
use validator::ConfigValidator;

#[derive(Parser)]
#[command(name = "asset-keeper")]
#[command(author = "Asset Keeper Team")]
#[command(version)]
#[command(about = "Track office hardware through its lifecycle", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Inventory API URL (overrides api.base_url)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use a built-in sample inventory instead of the API, acting as admin
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage assets
    Assets {
        #[command(subcommand)]
        action: AssetCommands,
    },

    /// Show the statuses reachable from a status (offline)
    Transitions {
        /// Current status (e.g. available, "in repair")
        status: String,
    },

    /// List users assets can be assigned to
    Users,

    /// List the hardware model catalogue
    Models,

    /// Show the status change history, newest first
    History {
        /// Activity filter (all, assignments, unassignments, repairs)
        #[arg(short, long, default_value = "all")]
        filter: HistoryFilter,

        /// Only show changes to this asset
        #[arg(short, long)]
        asset: Option<String>,

        /// Maximum number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show asset counts by status and category
    Dashboard {
        /// Restrict status counts to one category
        #[arg(long)]
        category: Option<String>,
    },

    /// Validate configuration
    Validate {
        /// Configuration file to validate
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show current configuration
    Config {
        /// Show secrets (redacted by default)
        #[arg(long)]
        show_secrets: bool,
    },

    /// Check connectivity to the inventory API
    Health,
}

#[derive(Subcommand)]
enum AssetCommands {
    /// List assets
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<AssetStatus>,

        /// Filter by category (case-insensitive)
        #[arg(long)]
        category: Option<String>,

        /// Filter by ownership (all, allocated, unallocated)
        #[arg(short, long, default_value = "all")]
        ownership: OwnershipFilter,
    },

    /// Show asset details and the actions currently allowed
    Show {
        /// Asset ID
        id: String,
    },

    /// List the assets held by the operator, with their recent history
    Mine {
        /// Maximum number of history entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Register a new asset
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        model_name: String,
        #[arg(long)]
        model_number: String,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        serial: String,
        #[arg(long)]
        tag: String,
        #[arg(long, default_value = "other")]
        category: String,
    },

    /// Edit descriptive fields of an asset
    Edit {
        /// Asset ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        serial: Option<String>,
        #[arg(long)]
        cost: Option<f64>,
        /// Purchase date (YYYY-MM-DD)
        #[arg(long)]
        purchase_date: Option<NaiveDate>,
        /// Warranty end date (YYYY-MM-DD)
        #[arg(long)]
        warranty_expiry: Option<NaiveDate>,
    },

    /// Assign an asset to a user
    Assign {
        /// Asset ID
        id: String,
        /// User e-mail
        user: String,
    },

    /// Take an asset back from its owner
    Unassign {
        /// Asset ID
        id: String,
    },

    /// Move an asset to maintenance, repair, retirement or back to stock
    SetStatus {
        /// Asset ID
        id: String,
        /// New status
        status: AssetStatus,
    },
}

/// Everything a command needs from the command line and configuration.
struct App {
    config: AppConfig,
    format: OutputFormat,
    demo: bool,
}

impl App {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn inventory(&self) -> Result<Arc<dyn InventoryConnector>> {
        if self.demo {
            return Ok(Arc::new(MockInventoryConnector::with_sample_data("demo")));
        }

        let validation = ConfigValidator::validate(&self.config);
        if validation.has_errors() {
            bail!(
                "Invalid configuration: {}. Run `asset-keeper validate` for details.",
                validation.errors.join("; ")
            );
        }

        let connector = RestInventoryConnector::new(self.config.api.connector_config())
            .context("Failed to create inventory connector")?;
        Ok(Arc::new(connector))
    }

    fn operator(&self) -> OperatorConfig {
        if self.demo {
            return OperatorConfig {
                email: MOCK_OPERATOR.to_string(),
                role: Role::Admin,
            };
        }
        self.config.operator.clone()
    }

    fn require_admin(&self, action: &str) -> Result<()> {
        ensure_can_manage(&self.operator(), action)
    }
}

/// Restricts a listing to what the operator may see: everything for admins,
/// only their own assets for employees.
fn visible_assets(assets: Vec<Asset>, operator: &OperatorConfig) -> Result<Vec<Asset>> {
    if operator.role.can_manage_assets() {
        return Ok(assets);
    }
    owned_assets(assets, operator)
}

/// Assets held by the operator, matched on e-mail.
fn owned_assets(assets: Vec<Asset>, operator: &OperatorConfig) -> Result<Vec<Asset>> {
    if operator.email.trim().is_empty() {
        bail!("operator.email is not set; cannot tell which assets are yours");
    }
    Ok(assets
        .into_iter()
        .filter(|a| a.is_owned_by(&operator.email))
        .collect())
}

/// History entries of the given assets, newest first.
fn history_of(entries: &[StatusChange], assets: &[Asset], limit: usize) -> Vec<StatusChange> {
    filter_history(entries, HistoryFilter::All)
        .into_iter()
        .filter(|e| assets.iter().any(|a| a.id == e.asset_id))
        .take(limit)
        .collect()
}

/// Refuses asset changes unless the operator holds the admin role.
fn ensure_can_manage(operator: &OperatorConfig, action: &str) -> Result<()> {
    if operator.role.can_manage_assets() {
        return Ok(());
    }
    bail!(
        "{} requires the admin role (operator.role is '{}')",
        action,
        operator.role
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path, cli.config.is_some(), cli.verbose)?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    let logging = if cli.verbose {
        LoggingConfig {
            json_format: config.logging.json_format,
            ..LoggingConfig::development()
        }
    } else {
        LoggingConfig::from_level_name(&config.logging.level, config.logging.json_format)
    };
    if let Err(e) = init_logging_with_config(logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    debug!(config = %config_path.display(), demo = cli.demo, "Configuration loaded");

    let app = App {
        config,
        format: cli.format,
        demo: cli.demo,
    };

    match cli.command {
        Commands::Assets { action } => cmd_assets(action, &app).await,
        Commands::Transitions { status } => cmd_transitions(&status, &app),
        Commands::Users => cmd_users(&app).await,
        Commands::Models => cmd_models(&app).await,
        Commands::History {
            filter,
            asset,
            limit,
        } => cmd_history(filter, asset.as_deref(), limit, &app).await,
        Commands::Dashboard { category } => cmd_dashboard(category.as_deref(), &app).await,
        Commands::Validate { file } => cmd_validate(file.unwrap_or(config_path), cli.api_url),
        Commands::Config { show_secrets } => cmd_config(&app, show_secrets),
        Commands::Health => cmd_health(&app).await,
    }
}

/// Loads the configuration. A file named on the command line must load; the
/// default location falls back to built-in defaults.
fn load_config(path: &Path, explicit: bool, verbose: bool) -> Result<AppConfig> {
    match AppConfig::load(path) {
        Ok(config) => Ok(config),
        Err(e) if explicit => Err(e),
        Err(e) => {
            if verbose {
                eprintln!("Using default configuration ({:#})", e);
            }
            Ok(AppConfig::default())
        }
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("com", "asset-keeper", "asset-keeper") {
        dirs.config_dir().join("config.yaml")
    } else {
        PathBuf::from("config/asset-keeper.yaml")
    }
}

async fn cmd_assets(action: AssetCommands, app: &App) -> Result<()> {
    let inventory = app.inventory()?;

    match action {
        AssetCommands::List {
            status,
            category,
            ownership,
        } => {
            let category = category.filter(|c| !c.trim().eq_ignore_ascii_case("all"));
            let listed = inventory
                .list_assets()
                .await
                .context("Failed to fetch assets")?;
            let assets: Vec<_> = visible_assets(listed, &app.operator())?
                .into_iter()
                .filter(|a| status.map_or(true, |s| a.status.is(s)))
                .filter(|a| category.as_deref().map_or(true, |c| a.matches_category(c)))
                .filter(|a| ownership.matches(a))
                .collect();

            if app.json() {
                print_json(&assets)?;
            } else {
                println!("{}", "Assets".bold());
                println!("──────");
                print_asset_table(&assets);
            }
        }
        AssetCommands::Show { id } => {
            let asset = inventory
                .get_asset(&id)
                .await
                .with_context(|| format!("Failed to fetch asset {}", id))?;
            if visible_assets(vec![asset.clone()], &app.operator())?.is_empty() {
                bail!("Asset {} is not assigned to you", id);
            }
            let actions = if app.operator().role.can_manage_assets() {
                available_actions(&asset)
            } else {
                Vec::new()
            };
            let history = inventory
                .status_history()
                .await
                .context("Failed to fetch status history")?;
            let activity = AssetActivity::for_asset(&history, &asset.id);

            if app.json() {
                print_json(&serde_json::json!({
                    "asset": asset,
                    "actions": actions,
                    "activity": activity,
                }))?;
            } else {
                print_asset_detail(&asset);
                println!();
                println!("{}", "Activity".bold());
                println!("  Status changes: {}", activity.total_changes);
                println!("  Times assigned: {}", activity.times_assigned);
                println!("  Repairs: {}", activity.repairs);
                println!();
                println!("{}", "Available Actions".bold());
                if actions.is_empty() {
                    println!("  none");
                }
                for action in &actions {
                    println!("  {}", describe_action(&asset.id, action));
                }
            }
        }
        AssetCommands::Mine { limit } => {
            let listed = inventory
                .list_assets()
                .await
                .context("Failed to fetch assets")?;
            let assets = owned_assets(listed, &app.operator())?;
            let history = inventory
                .status_history()
                .await
                .context("Failed to fetch status history")?;
            let history = history_of(&history, &assets, limit);

            if app.json() {
                print_json(&serde_json::json!({ "assets": assets, "history": history }))?;
            } else {
                println!("{} ({})", "My Assets".bold(), app.operator().email);
                println!("─────────");
                print_asset_table(&assets);
                println!();
                println!("{}", "Recent History".bold());
                print_history(&history);
            }
        }
        AssetCommands::Create {
            name,
            model_name,
            model_number,
            manufacturer,
            serial,
            tag,
            category,
        } => {
            app.require_admin("Creating assets")?;
            let request = NewAsset {
                asset_name: name,
                model_name,
                model_number,
                manufacturer,
                serial_number: serial,
                asset_tag: tag,
                category: AssetCategory::from(category),
            };
            let created = inventory
                .create_asset(request)
                .await
                .context("Failed to create asset")?;
            report_asset(app, "Created", &created)?;
        }
        AssetCommands::Edit {
            id,
            name,
            serial,
            cost,
            purchase_date,
            warranty_expiry,
        } => {
            app.require_admin("Editing assets")?;
            let edit = AssetEdit {
                asset_name: name,
                serial_number: serial,
                cost,
                purchase_date,
                warranty_expiry,
            };
            if edit.is_empty() {
                bail!("Nothing to edit. Pass at least one of --name, --serial, --cost, --purchase-date, --warranty-expiry");
            }
            let edited = inventory
                .edit_asset(&id, edit)
                .instrument(ak_observability::asset_span!(id))
                .await
                .with_context(|| format!("Failed to edit asset {}", id))?;
            report_asset(app, "Updated", &edited)?;
        }
        AssetCommands::Assign { id, user } => {
            app.require_admin("Assigning assets")?;
            let service = LifecycleService::new(inventory.clone());
            let updated = async {
                let asset = inventory
                    .get_asset(&id)
                    .await
                    .with_context(|| format!("Failed to fetch asset {}", id))?;
                if available_actions(&asset).contains(&LifecycleAction::Assign)
                    && !user.trim().is_empty()
                {
                    ensure_directory_user(inventory.as_ref(), &user).await?;
                }
                service
                    .assign(&asset, &user)
                    .await
                    .with_context(|| format!("Could not assign asset {}", id))
            }
            .instrument(ak_observability::asset_span!(id, user = %user))
            .await?;
            report_asset(app, "Assigned", &updated)?;
        }
        AssetCommands::Unassign { id } => {
            app.require_admin("Unassigning assets")?;
            let service = LifecycleService::new(inventory.clone());
            let updated = async {
                let asset = inventory
                    .get_asset(&id)
                    .await
                    .with_context(|| format!("Failed to fetch asset {}", id))?;
                service
                    .unassign(&asset)
                    .await
                    .with_context(|| format!("Could not unassign asset {}", id))
            }
            .instrument(ak_observability::asset_span!(id))
            .await?;
            report_asset(app, "Unassigned", &updated)?;
        }
        AssetCommands::SetStatus { id, status } => {
            app.require_admin("Changing asset status")?;
            let service = LifecycleService::new(inventory.clone());
            let updated = async {
                let asset = inventory
                    .get_asset(&id)
                    .await
                    .with_context(|| format!("Failed to fetch asset {}", id))?;
                service
                    .change_status(&asset, status)
                    .await
                    .with_context(|| format!("Could not change status of asset {}", id))
            }
            .instrument(ak_observability::asset_span!(id, status = %status.as_str()))
            .await?;
            report_asset(app, "Updated", &updated)?;
        }
    }
    Ok(())
}

async fn ensure_directory_user(inventory: &dyn InventoryConnector, user: &str) -> Result<()> {
    let users = inventory
        .list_users()
        .await
        .context("Failed to fetch user directory")?;
    let user = user.trim();
    if users.iter().any(|u| u.email.eq_ignore_ascii_case(user)) {
        Ok(())
    } else {
        bail!(
            "User '{}' is not in the directory. Run `asset-keeper users` to list users.",
            user
        )
    }
}

fn report_asset(app: &App, verb: &str, asset: &ak_core::Asset) -> Result<()> {
    if app.json() {
        return print_json(asset);
    }
    println!(
        "{} asset {}: {} ({})",
        verb.green(),
        asset.id.cyan(),
        status_label(&asset.status),
        owner_or_dash(asset.owner.as_deref())
    );
    Ok(())
}

fn cmd_transitions(status: &str, app: &App) -> Result<()> {
    let reported = ReportedStatus::from(status.trim());
    let targets = valid_transitions(status.trim());

    if app.json() {
        let targets: Vec<&str> = targets.iter().map(|s| s.as_str()).collect();
        return print_json(&serde_json::json!({
            "status": reported.as_str(),
            "recognized": reported.known().is_some(),
            "canonical": is_valid_status(status.trim()),
            "transitions": targets,
        }));
    }

    if reported.known().is_none() {
        println!(
            "{}: '{}' is not a recognized status; it has no transitions",
            "Note".yellow(),
            status
        );
        return Ok(());
    }

    println!("{} {}", "From:".bold(), status_label(&reported));
    if targets.is_empty() {
        println!("  terminal: no further transitions");
    }
    for target in targets {
        if target == AssetStatus::Allocated {
            println!("  → {} (via assign)", target.as_str());
        } else {
            println!("  → {}", target.as_str());
        }
    }
    Ok(())
}

async fn cmd_users(app: &App) -> Result<()> {
    let users = app
        .inventory()?
        .list_users()
        .await
        .context("Failed to fetch users")?;

    if app.json() {
        return print_json(&users);
    }

    println!("{}", "Users".bold());
    println!("─────");
    if users.is_empty() {
        println!("No users found");
    }
    for user in &users {
        println!("  {:<28} {}", user.display_name(), user.email.cyan());
    }
    Ok(())
}

async fn cmd_models(app: &App) -> Result<()> {
    let models = app
        .inventory()?
        .list_asset_models()
        .await
        .context("Failed to fetch asset models")?;

    if app.json() {
        return print_json(&models);
    }

    println!("{}", "Asset Models".bold());
    println!("────────────");
    if models.is_empty() {
        println!("No models found");
    }
    for model in &models {
        println!(
            "  {:<24} {:<12} {:<14} {}",
            model.name,
            model.model_number,
            model.manufacturer,
            model.category.as_str()
        );
    }
    Ok(())
}

async fn cmd_history(
    filter: HistoryFilter,
    asset_id: Option<&str>,
    limit: usize,
    app: &App,
) -> Result<()> {
    let inventory = app.inventory()?;
    let mut entries = inventory
        .status_history()
        .await
        .context("Failed to fetch status history")?;

    let operator = app.operator();
    if !operator.role.can_manage_assets() {
        let listed = inventory
            .list_assets()
            .await
            .context("Failed to fetch assets")?;
        let mine = owned_assets(listed, &operator)?;
        entries = history_of(&entries, &mine, usize::MAX);
    }

    let entries: Vec<_> = filter_history(&entries, filter)
        .into_iter()
        .filter(|e| asset_id.map_or(true, |id| e.asset_id == id))
        .take(limit)
        .collect();

    if app.json() {
        return print_json(&entries);
    }

    println!("{}", "Status History".bold());
    println!("──────────────");
    print_history(&entries);
    Ok(())
}

fn print_history(entries: &[StatusChange]) {
    if entries.is_empty() {
        println!("No history entries found");
    }
    for entry in entries {
        println!(
            "  {} asset {:<6} {} → {}  owner: {}  by: {}",
            entry.changed_at.format("%Y-%m-%d %H:%M"),
            entry.asset_id.cyan(),
            status_label(&entry.old_status),
            status_label(&entry.new_status),
            owner_or_dash(entry.owned_by.as_deref()),
            if entry.changed_by.is_empty() {
                "-"
            } else {
                entry.changed_by.as_str()
            }
        );
    }
}

async fn cmd_dashboard(category: Option<&str>, app: &App) -> Result<()> {
    let assets = app
        .inventory()?
        .list_assets()
        .await
        .context("Failed to fetch assets")?;

    let statuses = StatusCounts::from_assets(&assets, category);
    let categories = CategoryCounts::from_assets(&assets);

    if app.json() {
        return print_json(&serde_json::json!({
            "category": category.unwrap_or("all"),
            "status_counts": statuses,
            "category_counts": categories,
        }));
    }

    println!(
        "{} ({})",
        "Inventory Overview".bold(),
        category.unwrap_or("all categories")
    );
    println!("──────────────────");
    println!("  Total: {}", statuses.total);
    for status in AssetStatus::ALL {
        println!(
            "  {:<12} {}",
            format!("{}:", status),
            statuses.get(status)
        );
    }
    if statuses.unrecognized > 0 {
        println!("  {:<12} {}", "Unknown:".magenta(), statuses.unrecognized);
    }
    println!();
    println!("{}", "By Category".bold());
    for (name, count) in categories.iter() {
        println!("  {:<12} {}", format!("{}:", name), count);
    }
    Ok(())
}

fn cmd_validate(config_path: PathBuf, api_url: Option<String>) -> Result<()> {
    println!(
        "Validating configuration: {}",
        config_path.display().to_string().cyan()
    );

    let mut config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("{}: {:#}", "Configuration file error".red().bold(), e);
            std::process::exit(1);
        }
    };
    if let Some(url) = api_url {
        config.api.base_url = url;
    }

    let validation_result = ConfigValidator::validate(&config);
    validation_result.print();

    println!();
    println!("{}", "Configuration Summary".bold());
    println!("─────────────────────");
    println!("  API: {}", config.api.base_url);
    println!("  Operator: {} ({})", config.operator.email, config.operator.role);
    println!("  Log level: {}", config.logging.level);

    if validation_result.has_errors() {
        println!();
        println!(
            "{}",
            "Configuration validation failed. Fix the errors above."
                .red()
                .bold()
        );
        std::process::exit(1);
    } else if validation_result.has_warnings() {
        println!();
        println!(
            "{}",
            "Configuration is valid with warnings. Review the warnings above."
                .yellow()
                .bold()
        );
    } else {
        println!();
        println!("{}", "Configuration is valid.".green().bold());
    }

    Ok(())
}

fn cmd_config(app: &App, show_secrets: bool) -> Result<()> {
    let display_config = if show_secrets {
        app.config.clone()
    } else {
        app.config.redact_secrets()
    };

    if app.json() {
        return print_json(&display_config);
    }

    println!("{}", "Current Configuration".bold());
    println!("─────────────────────────");
    println!("API:");
    println!("  Base URL: {}", display_config.api.base_url);
    if display_config.api.api_key.is_empty() {
        println!("  API key: (none)");
    } else {
        println!(
            "  API key: {} (header {})",
            display_config.api.api_key, display_config.api.api_key_header
        );
    }
    println!("  Timeout: {}s", display_config.api.timeout_secs);
    println!("  Max retries: {}", display_config.api.max_retries);
    if let Some(limit) = display_config.api.rate_limit_per_minute {
        println!("  Rate limit: {}/min", limit);
    }
    println!("Operator:");
    println!("  E-mail: {}", display_config.operator.email);
    println!("  Role: {}", display_config.operator.role);
    println!("Logging:");
    println!("  Level: {}", display_config.logging.level);
    println!("  JSON: {}", display_config.logging.json_format);
    Ok(())
}

async fn cmd_health(app: &App) -> Result<()> {
    let inventory = app.inventory()?;
    let health = inventory
        .health_check()
        .await
        .context("Health check failed")?;

    if app.json() {
        return print_json(&serde_json::json!({
            "connector": inventory.name(),
            "type": inventory.connector_type(),
            "health": health,
        }));
    }

    let label = match &health {
        ConnectorHealth::Healthy => "Healthy".green(),
        ConnectorHealth::Degraded(reason) => format!("Degraded: {}", reason).yellow(),
        ConnectorHealth::Unhealthy(reason) => format!("Unhealthy: {}", reason).red(),
        ConnectorHealth::Unknown => "Unknown".dimmed(),
    };
    println!("{} ({}): {}", inventory.name(), inventory.connector_type(), label);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set_status_with_alias_and_spaces() {
        let cli = Cli::try_parse_from([
            "asset-keeper",
            "assets",
            "set-status",
            "7",
            "in repair",
        ])
        .unwrap();
        match cli.command {
            Commands::Assets {
                action: AssetCommands::SetStatus { id, status },
            } => {
                assert_eq!(id, "7");
                assert_eq!(status, AssetStatus::InRepair);
            }
            _ => panic!("Expected set-status"),
        }
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = Cli::try_parse_from([
            "asset-keeper",
            "--format",
            "json",
            "assets",
            "list",
            "--status",
            "unallocated",
            "--ownership",
            "unallocated",
        ])
        .unwrap();
        assert!(cli.format == OutputFormat::Json);
        match cli.command {
            Commands::Assets {
                action:
                    AssetCommands::List {
                        status, ownership, ..
                    },
            } => {
                assert_eq!(status, Some(AssetStatus::Available));
                assert_eq!(ownership, OwnershipFilter::Unallocated);
            }
            _ => panic!("Expected assets list"),
        }
    }

    #[test]
    fn test_unknown_status_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["asset-keeper", "assets", "set-status", "7", "lost"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_dates_are_parsed() {
        let cli = Cli::try_parse_from([
            "asset-keeper",
            "assets",
            "edit",
            "7",
            "--purchase-date",
            "2024-02-29",
        ])
        .unwrap();
        match cli.command {
            Commands::Assets {
                action: AssetCommands::Edit { purchase_date, .. },
            } => assert_eq!(purchase_date, NaiveDate::from_ymd_opt(2024, 2, 29)),
            _ => panic!("Expected assets edit"),
        }
    }

    #[test]
    fn test_only_admins_manage_assets() {
        let employee = OperatorConfig {
            email: "emma@example.com".to_string(),
            role: Role::Employee,
        };
        let err = ensure_can_manage(&employee, "Assigning assets").unwrap_err();
        assert!(err.to_string().contains("requires the admin role"));

        let admin = OperatorConfig {
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        };
        assert!(ensure_can_manage(&admin, "Assigning assets").is_ok());
    }

    #[test]
    fn test_demo_mode_acts_as_admin() {
        let app = App {
            config: AppConfig::default(),
            format: OutputFormat::Text,
            demo: true,
        };
        assert!(app.require_admin("Assigning assets").is_ok());
        assert!(app.inventory().is_ok());
    }

    #[test]
    fn test_invalid_config_blocks_remote_commands() {
        let app = App {
            config: AppConfig::default(),
            format: OutputFormat::Text,
            demo: false,
        };
        let err = app.inventory().err().unwrap();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[tokio::test]
    async fn test_directory_check() {
        let inventory = MockInventoryConnector::with_sample_data("test");
        assert!(ensure_directory_user(&inventory, "Alice@Example.com").await.is_ok());
        assert!(ensure_directory_user(&inventory, "mallory@example.com")
            .await
            .is_err());

        inventory
            .add_user(ak_core::DirectoryUser {
                id: "u-3".to_string(),
                email: "mallory@example.com".to_string(),
                name: None,
            })
            .await;
        assert!(ensure_directory_user(&inventory, "mallory@example.com")
            .await
            .is_ok());
    }

    fn employee(email: &str) -> OperatorConfig {
        OperatorConfig {
            email: email.to_string(),
            role: Role::Employee,
        }
    }

    #[tokio::test]
    async fn test_employees_only_see_their_own_assets() {
        let inventory = MockInventoryConnector::with_sample_data("test");
        let assets = inventory.list_assets().await.unwrap();

        let visible = visible_assets(assets.clone(), &employee("ALICE@example.com")).unwrap();
        let ids: Vec<_> = visible.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);

        assert!(visible_assets(assets.clone(), &employee("bob@example.com"))
            .unwrap()
            .is_empty());
        assert!(visible_assets(assets.clone(), &employee("  ")).is_err());

        let admin = OperatorConfig {
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        };
        assert_eq!(visible_assets(assets.clone(), &admin).unwrap().len(), assets.len());
    }

    #[tokio::test]
    async fn test_history_of_owned_assets() {
        let inventory = MockInventoryConnector::with_sample_data("test");
        let assets = inventory.list_assets().await.unwrap();
        let history = inventory.status_history().await.unwrap();

        let mine = owned_assets(assets, &employee("alice@example.com")).unwrap();
        let entries = history_of(&history, &mine, 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].asset_id, "2");
        assert!(history_of(&history, &mine, 0).is_empty());

        let activity = AssetActivity::for_asset(&history, "2");
        assert_eq!(activity.total_changes, 1);
        assert_eq!(activity.times_assigned, 1);
        assert_eq!(activity.repairs, 0);
    }

    #[test]
    fn test_parse_mine() {
        let cli = Cli::try_parse_from(["asset-keeper", "assets", "mine", "--limit", "3"]).unwrap();
        match cli.command {
            Commands::Assets {
                action: AssetCommands::Mine { limit },
            } => assert_eq!(limit, 3),
            _ => panic!("Expected assets mine"),
        }
    }

    #[test]
    fn test_explicit_config_must_load() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api: [not, a, mapping").unwrap();

        assert!(load_config(file.path(), true, false).is_err());
        let fallback = load_config(file.path(), false, false).unwrap();
        assert!(fallback.api.base_url.is_empty());

        let missing = Path::new("/nonexistent/asset-keeper.yaml");
        assert!(load_config(missing, true, false).is_err());
        assert!(load_config(missing, false, false).is_ok());
    }
}
