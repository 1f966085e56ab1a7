use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// One distinct product entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub image: String,
    pub quantity: u32,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LineItem {
    /// Minimal item with no optional metadata and a quantity of 1.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            original_price: None,
            image: String::new(),
            quantity: 1,
            category: String::new(),
            brand: None,
            rating: None,
            reviews: None,
            badge: None,
            description: None,
        }
    }

    pub fn with_original_price(mut self, original_price: f64) -> Self {
        self.original_price = Some(original_price);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Amount saved against the original price for the whole row, if discounted.
    pub fn savings(&self) -> Option<f64> {
        match self.original_price {
            Some(original) if original > self.price => {
                Some((original - self.price) * self.quantity as f64)
            }
            _ => None,
        }
    }

    pub fn discount_percent(&self) -> Option<u32> {
        match self.original_price {
            Some(original) if original > self.price && original > 0.0 => {
                Some((((original - self.price) / original) * 100.0).round() as u32)
            }
            _ => None,
        }
    }
}

// request dto
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[validate(length(min = 1, max = 64, message = "Item id must be 1-64 characters"))]
    #[validate(regex(
        path = "ITEM_ID_REGEX",
        message = "Item id can only contain letters, numbers, dashes and underscores"
    ))]
    pub id: String,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[validate(custom = "validate_name")]
    pub name: String,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    #[validate(range(min = 0.0, message = "Original price must not be negative"))]
    pub original_price: Option<f64>,

    pub image: Option<String>,

    pub category: Option<String>,

    pub brand: Option<String>,

    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: Option<f64>,

    pub reviews: Option<u32>,

    pub badge: Option<String>,

    #[validate(length(max = 1000, message = "Description must be less than 1000 characters"))]
    pub description: Option<String>,

    /// Missing or zero means one unit.
    pub quantity: Option<u32>,
}

lazy_static::lazy_static! {
    static ref ITEM_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("Name is required"));
    }
    Ok(())
}

impl AddItemRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            ..Default::default()
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.filter(|q| *q > 0).unwrap_or(1)
    }

    /// Converts the validated request into a ledger row.
    pub fn into_line_item(self) -> (LineItem, u32) {
        let quantity = self.quantity();
        let item = LineItem {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            price: self.price,
            original_price: self.original_price,
            image: self.image.unwrap_or_default(),
            quantity,
            category: self.category.unwrap_or_default(),
            brand: self.brand,
            rating: self.rating,
            reviews: self.reviews,
            badge: self.badge,
            description: self.description.map(|d| d.trim().to_string()),
        };
        (item, quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings_and_discount() {
        let mut item = LineItem::new("hoodie", "Hoodie", 30.0).with_original_price(40.0);
        item.quantity = 2;

        assert_eq!(item.line_total(), 60.0);
        assert_eq!(item.savings(), Some(20.0));
        assert_eq!(item.discount_percent(), Some(25));
    }

    #[test]
    fn test_no_savings_without_discount() {
        let item = LineItem::new("mug", "Mug", 12.0).with_original_price(10.0);
        assert_eq!(item.savings(), None);
        assert_eq!(item.discount_percent(), None);
    }

    #[test]
    fn test_request_validation() {
        assert!(AddItemRequest::new("sku-1", "Sneakers", 89.99).validate().is_ok());
        assert!(AddItemRequest::new("", "Sneakers", 89.99).validate().is_err());
        assert!(AddItemRequest::new("sku 1", "Sneakers", 89.99).validate().is_err());
        assert!(AddItemRequest::new("sku-1", "   ", 89.99).validate().is_err());
        assert!(AddItemRequest::new("sku-1", "Sneakers", -1.0).validate().is_err());

        let mut rated = AddItemRequest::new("sku-1", "Sneakers", 89.99);
        rated.rating = Some(7.5);
        assert!(rated.validate().is_err());
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let mut request = AddItemRequest::new("sku-1", "Sneakers", 89.99);
        assert_eq!(request.quantity(), 1);
        request.quantity = Some(0);
        assert_eq!(request.quantity(), 1);
        request.quantity = Some(3);

        let (item, quantity) = request.into_line_item();
        assert_eq!(quantity, 3);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.id, "sku-1");
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let item = LineItem::new("a", "A", 1.0).with_original_price(2.0);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["originalPrice"], 2.0);
        assert!(json.get("brand").is_none());
    }
}
