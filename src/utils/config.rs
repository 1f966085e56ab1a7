use std::env;
use std::path::PathBuf;

use crate::models::cart::{
    PricingPolicy, DEFAULT_FREE_SHIPPING_THRESHOLD, DEFAULT_SHIPPING_FEE, DEFAULT_TAX_RATE,
};

pub const DEFAULT_CART_FILE: &str = ".storefront/cart.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub cart_file: PathBuf,
    pub pricing: PricingPolicy,
    pub log_level: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` feeds it the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            cart_file: lookup("CART_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CART_FILE)),
            pricing: PricingPolicy {
                tax_rate: parse_amount(&lookup, "CART_TAX_RATE", DEFAULT_TAX_RATE)?,
                shipping_fee: parse_amount(&lookup, "CART_SHIPPING_FEE", DEFAULT_SHIPPING_FEE)?,
                free_shipping_threshold: parse_amount(
                    &lookup,
                    "CART_FREE_SHIPPING_THRESHOLD",
                    DEFAULT_FREE_SHIPPING_THRESHOLD,
                )?,
            },
            log_level: lookup("LOG_LEVEL").unwrap_or("info".to_string()),
            environment: lookup("APP_ENV").unwrap_or("development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.cart_file.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("CART_FILE must not be empty"));
        }

        let pricing = &self.pricing;
        if !(0.0..=1.0).contains(&pricing.tax_rate) {
            return Err(anyhow::anyhow!("CART_TAX_RATE must be between 0 and 1"));
        }

        if pricing.shipping_fee < 0.0 {
            return Err(anyhow::anyhow!("CART_SHIPPING_FEE must not be negative"));
        }

        if pricing.free_shipping_threshold < 0.0 {
            return Err(anyhow::anyhow!(
                "CART_FREE_SHIPPING_THRESHOLD must not be negative"
            ));
        }

        Ok(())
    }

    pub fn with_cart_file(mut self, cart_file: impl Into<PathBuf>) -> Self {
        self.cart_file = cart_file.into();
        self
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_amount<F>(lookup: &F, key: &str, default: f64) -> anyhow::Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| anyhow::anyhow!("{} must be a number, got '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.cart_file, PathBuf::from(DEFAULT_CART_FILE));
        assert_eq!(config.pricing, PricingPolicy::default());
        assert_eq!(config.environment, "development");
        assert_eq!(config.log_level, "info");
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CART_FILE", "/tmp/cart.json"),
            ("CART_TAX_RATE", "0.2"),
            ("CART_SHIPPING_FEE", "4"),
            ("CART_FREE_SHIPPING_THRESHOLD", "75.5"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();

        assert_eq!(config.cart_file, PathBuf::from("/tmp/cart.json"));
        assert_eq!(config.pricing.tax_rate, 0.2);
        assert_eq!(config.pricing.shipping_fee, 4.0);
        assert_eq!(config.pricing.free_shipping_threshold, 75.5);
        assert!(config.is_production());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("CART_TAX_RATE", "abc")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CART_TAX_RATE", "1.5")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CART_SHIPPING_FEE", "-1")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CART_FILE", "")])).is_err());
    }
}
