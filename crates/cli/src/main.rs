//! Shopkeep CLI - Migrations and contact group management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sk-cli migrate
//!
//! # Create the default group of every contact kind
//! sk-cli groups provision
//!
//! # List groups that override price display
//! sk-cli groups list --with-price-display-options
//!
//! # Create a group that hides prices
//! sk-cli groups create --identifier wholesale --name "Wholesale" --hide-prices true
//!
//! # Show how prices are displayed to a contact
//! sk-cli contacts price-options 42
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `groups` - Provision, list, create and configure contact groups
//! - `contacts` - Group membership and price display inspection

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use shopkeep_core::{ContactGroupId, ContactId};

mod commands;

#[derive(Parser)]
#[command(name = "sk-cli")]
#[command(author, version, about = "Shopkeep contacts CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage contact groups
    Groups {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// Inspect contacts
    Contacts {
        #[command(subcommand)]
        action: ContactAction,
    },
}

#[derive(Subcommand)]
enum GroupAction {
    /// Create the default group of every contact kind
    Provision,
    /// List contact groups
    List {
        /// Only groups that set `hide_prices` or `show_prices_including_taxes`
        #[arg(long)]
        with_price_display_options: bool,
    },
    /// Create a contact group
    Create {
        /// Unique machine-readable identifier
        #[arg(short, long)]
        identifier: Option<String>,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Hide prices from members
        #[arg(long)]
        hide_prices: Option<bool>,

        /// Show prices including taxes to members
        #[arg(long)]
        taxes: Option<bool>,
    },
    /// Delete a contact group and its memberships
    Delete {
        /// Group id
        id: ContactGroupId,
    },
    /// Change the price display settings of a group
    SetPrices {
        /// Group id
        id: ContactGroupId,

        /// Hide prices from members
        #[arg(long, conflicts_with = "clear_hide_prices")]
        hide_prices: Option<bool>,

        /// Unset `hide_prices`
        #[arg(long)]
        clear_hide_prices: bool,

        /// Show prices including taxes to members
        #[arg(long, conflicts_with = "clear_taxes")]
        taxes: Option<bool>,

        /// Unset `show_prices_including_taxes`
        #[arg(long)]
        clear_taxes: bool,
    },
}

#[derive(Subcommand)]
enum ContactAction {
    /// Add a contact to a group
    Join {
        /// Contact id
        contact_id: ContactId,
        /// Group id
        group_id: ContactGroupId,
    },
    /// Show the resolved price display options of a contact
    PriceOptions {
        /// Contact id; omit for the anonymous contact
        contact_id: Option<ContactId>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopkeep=info,sk_cli=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Groups { action } => match action {
            GroupAction::Provision => commands::groups::provision().await?,
            GroupAction::List {
                with_price_display_options,
            } => commands::groups::list(with_price_display_options).await?,
            GroupAction::Create {
                identifier,
                name,
                hide_prices,
                taxes,
            } => commands::groups::create(identifier, name, hide_prices, taxes).await?,
            GroupAction::Delete { id } => commands::groups::delete(id).await?,
            GroupAction::SetPrices {
                id,
                hide_prices,
                clear_hide_prices,
                taxes,
                clear_taxes,
            } => {
                use commands::groups::FieldUpdate;

                let hide_prices = FieldUpdate::from_args(hide_prices, clear_hide_prices);
                let taxes = FieldUpdate::from_args(taxes, clear_taxes);
                commands::groups::set_prices(id, hide_prices, taxes).await?;
            }
        },
        Commands::Contacts { action } => match action {
            ContactAction::Join {
                contact_id,
                group_id,
            } => commands::contacts::join(contact_id, group_id).await?,
            ContactAction::PriceOptions { contact_id } => {
                commands::contacts::price_options(contact_id).await?;
            }
        },
    }
    Ok(())
}
