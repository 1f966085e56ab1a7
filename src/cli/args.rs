use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cart-cli")]
#[command(about = "Storefront shopping cart ledger from the terminal")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Cart file path (overrides CART_FILE)
    #[arg(long, global = true)]
    pub cart_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add an item to the cart, merging with an existing row of the same id
    Add {
        /// Product identifier
        id: String,
        /// Display name
        name: String,
        /// Unit price
        price: f64,
        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        /// Price before discount
        #[arg(long)]
        original_price: Option<f64>,
        /// Category label
        #[arg(short, long)]
        category: Option<String>,
        /// Brand name
        #[arg(long)]
        brand: Option<String>,
        /// Image reference
        #[arg(long)]
        image: Option<String>,
        /// Badge label, e.g. "New"
        #[arg(long)]
        badge: Option<String>,
        /// Star rating (0-5)
        #[arg(long)]
        rating: Option<f64>,
        /// Number of reviews
        #[arg(long)]
        reviews: Option<u32>,
        /// Product description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Remove an item from the cart
    Remove {
        /// Product identifier
        id: String,
    },
    /// Set an item's quantity; zero or less removes it
    SetQty {
        /// Product identifier
        id: String,
        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Open the cart panel
    Open,
    /// Close the cart panel
    Close,
    /// Flip the cart panel between open and closed
    Toggle,
    /// Show cart rows and totals
    Show {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
    /// Show totals only
    Totals,
    /// Wishlist commands
    Wishlist {
        #[command(subcommand)]
        command: WishlistCommands,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Delete the saved cart and start a new session
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum WishlistCommands {
    /// Move a cart item to the wishlist
    Move {
        /// Product identifier
        id: String,
    },
    /// List wishlisted items
    List,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
