use std::sync::Arc;
use anyhow::{Context, Result};
use console::{style, Emoji};
use dialoguer::{theme::ColorfulTheme, Confirm};

use tracing::{error, info, warn};

use crate::{
    cli::args::*,
    models::line_item::AddItemRequest,
    services::{CartService, CartServiceError},
    storage::repositories::JsonFileCartRepository,
    utils::{
        formatting::{format_item_table, format_price, format_totals, format_visibility},
        Config,
    },
};

static CHECKMARK: Emoji<'_, '_> = Emoji("✅ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️ ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "");
static CART: Emoji<'_, '_> = Emoji("🛒 ", "");

pub struct CliApp {
    config: Config,
    cart_service: CartService,
}

impl CliApp {
    pub async fn new(config: Config) -> Result<Self> {
        let cart_repo = Arc::new(JsonFileCartRepository::new(config.cart_file.clone()));
        let mut cart_service = CartService::new(cart_repo, config.pricing);

        cart_service
            .load()
            .await
            .with_context(|| format!("Failed to load cart from {}", config.cart_file.display()))?;

        Ok(Self {
            config,
            cart_service,
        })
    }

    pub async fn run(&mut self, args: Args) -> Result<()> {
        match args.command {
            Commands::Add {
                id,
                name,
                price,
                quantity,
                original_price,
                category,
                brand,
                image,
                badge,
                rating,
                reviews,
                description,
            } => {
                let request = AddItemRequest {
                    id,
                    name,
                    price,
                    original_price,
                    image,
                    category,
                    brand,
                    rating,
                    reviews,
                    badge,
                    description,
                    quantity: Some(quantity),
                };
                self.handle_add(request).await
            }
            Commands::Remove { id } => self.handle_remove(id).await,
            Commands::SetQty { id, quantity } => self.handle_set_quantity(id, quantity).await,
            Commands::Clear { force } => self.handle_clear(force).await,
            Commands::Open => self.handle_visibility(VisibilityAction::Open).await,
            Commands::Close => self.handle_visibility(VisibilityAction::Close).await,
            Commands::Toggle => self.handle_visibility(VisibilityAction::Toggle).await,
            Commands::Show { format } => self.handle_show(format),
            Commands::Totals => self.handle_totals(),
            Commands::Wishlist { command } => self.handle_wishlist_command(command).await,
            Commands::Config { command } => self.handle_config_command(command),
            Commands::Reset { force } => self.handle_reset(force).await,
        }
    }

    async fn handle_add(&mut self, request: AddItemRequest) -> Result<()> {
        let id = request.id.clone();

        match self.cart_service.add_item(request) {
            Ok(ledger) => {
                let quantity = ledger.get(&id).map(|item| item.quantity).unwrap_or_default();
                println!("{} Added to cart!", CHECKMARK);
                println!("ID: {}", style(&id).cyan());
                println!("Quantity in cart: {}", style(quantity).green());
                println!("Total: {}", style(format_price(ledger.total())).yellow());
                info!("Item added: {}", id);
            }
            Err(CartServiceError::ValidationError { message }) => {
                println!("{} {}", CROSS, style(message).red());
                warn!("Rejected add for {}", id);
                return Ok(());
            }
            Err(e) => {
                println!("{} Failed to add item: {}", CROSS, style(&e).red());
                error!("Failed to add item: {}", e);
                return Ok(());
            }
        }

        self.persist().await
    }

    async fn handle_remove(&mut self, id: String) -> Result<()> {
        if !self.cart_service.ledger().contains(&id) {
            println!("{} Item '{}' is not in the cart", WARNING, style(&id).yellow());
        }

        let ledger = self.cart_service.remove_item(&id);
        println!("{} Cart now holds {} items", CHECKMARK, ledger.item_count());
        self.persist().await
    }

    async fn handle_set_quantity(&mut self, id: String, quantity: i64) -> Result<()> {
        if !self.cart_service.ledger().contains(&id) {
            println!("{} Item '{}' is not in the cart", WARNING, style(&id).yellow());
            return Ok(());
        }

        let ledger = self.cart_service.set_quantity(&id, quantity);
        match ledger.get(&id) {
            Some(item) => println!(
                "{} Quantity of {} set to {}",
                CHECKMARK,
                style(&id).cyan(),
                style(item.quantity).green()
            ),
            None => println!("{} Removed {} from cart", CHECKMARK, style(&id).cyan()),
        }
        self.persist().await
    }

    async fn handle_clear(&mut self, force: bool) -> Result<()> {
        if !force && !confirm("Are you sure you want to empty the cart?")? {
            println!("Clear cancelled");
            return Ok(());
        }

        self.cart_service.clear();
        println!("{} Cart cleared", CHECKMARK);
        self.persist().await
    }

    async fn handle_visibility(&mut self, action: VisibilityAction) -> Result<()> {
        let ledger = match action {
            VisibilityAction::Open => self.cart_service.open(),
            VisibilityAction::Close => self.cart_service.close(),
            VisibilityAction::Toggle => self.cart_service.toggle(),
        };
        println!("{} Cart is {}", CART, format_visibility(ledger));
        self.persist().await
    }

    fn handle_show(&self, format: OutputFormat) -> Result<()> {
        let ledger = self.cart_service.ledger();

        if let OutputFormat::Json = format {
            let json = serde_json::to_string_pretty(ledger).context("Failed to serialize cart")?;
            println!("{}", json);
            return Ok(());
        }

        println!(
            "{} {} ({})",
            CART,
            style("Shopping Cart").bold().cyan(),
            format_visibility(ledger)
        );
        if ledger.is_empty() {
            println!("{} Your cart is empty", INFO);
        } else {
            println!("{}", format_item_table(ledger.items()));
        }
        print!("{}", format_totals(ledger));
        Ok(())
    }

    fn handle_totals(&self) -> Result<()> {
        print!("{}", format_totals(self.cart_service.ledger()));
        Ok(())
    }

    async fn handle_wishlist_command(&mut self, command: WishlistCommands) -> Result<()> {
        match command {
            WishlistCommands::Move { id } => match self.cart_service.move_to_wishlist(&id) {
                Ok(item) => {
                    println!("{} Moved '{}' to your wishlist", CHECKMARK, style(&item.name).green());
                    self.persist().await
                }
                Err(CartServiceError::ItemNotFound { id }) => {
                    println!("{} Item '{}' is not in the cart", WARNING, style(id).yellow());
                    Ok(())
                }
                Err(e) => {
                    println!("{} Failed to move item: {}", CROSS, style(&e).red());
                    error!("Failed to move item to wishlist: {}", e);
                    Ok(())
                }
            },
            WishlistCommands::List => {
                let wishlist = self.cart_service.wishlist();
                if wishlist.is_empty() {
                    println!("{} Your wishlist is empty", INFO);
                } else {
                    println!("{} {}", INFO, style(format!("{} saved items", wishlist.len())).bold());
                    println!("{}", format_item_table(wishlist));
                }
                Ok(())
            }
        }
    }

    fn handle_config_command(&self, command: ConfigCommands) -> Result<()> {
        match command {
            ConfigCommands::Show => {
                let pricing = &self.config.pricing;
                println!("{} {}", INFO, style("Configuration").bold().cyan());
                println!("Environment: {}", style(&self.config.environment).green());
                if self.config.is_production() {
                    println!("{}", style("Running with production settings").yellow());
                }
                println!("Cart file: {}", style(self.config.cart_file.display()).green());
                println!("Session: {}", style(self.cart_service.session_id()).dim());
                println!("Tax rate: {}", style(format!("{}%", pricing.tax_rate * 100.0)).green());
                println!("Shipping fee: {}", style(format_price(pricing.shipping_fee)).green());
                println!(
                    "Free shipping above: {}",
                    style(format_price(pricing.free_shipping_threshold)).green()
                );
            }
        }
        Ok(())
    }

    async fn handle_reset(&mut self, force: bool) -> Result<()> {
        if !force && !confirm("Delete the saved cart and wishlist?")? {
            println!("Reset cancelled");
            return Ok(());
        }

        match self.cart_service.reset().await {
            Ok(true) => println!("{} Saved cart deleted", CHECKMARK),
            Ok(false) => println!("{} No saved cart to delete", INFO),
            Err(e) => {
                println!("{} Reset failed: {}", CROSS, style(&e).red());
                error!("Reset failed: {}", e);
            }
        }
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        self.cart_service
            .save()
            .await
            .with_context(|| format!("Failed to save cart to {}", self.config.cart_file.display()))
    }
}

enum VisibilityAction {
    Open,
    Close,
    Toggle,
}

fn confirm(prompt: &str) -> Result<bool> {
    let theme = ColorfulTheme::default();
    let confirmed = Confirm::with_theme(&theme)
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(confirmed)
}
