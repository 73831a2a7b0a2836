//! # Storefront Types
//!
//! Products and customer orders.

use crate::error::{FlylightError, FlylightResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product in the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    /// Units on hand. Settlement does not floor this, so it can go negative.
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64) -> FlylightResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FlylightError::validation("Product name is required"));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(FlylightError::validation("Product price must be a non-negative number"));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            description: None,
            price,
            stock: 0,
            category: None,
            image_url: None,
            seller_id: None,
            created_at: Utc::now(),
        })
    }

    /// Builder: set stock
    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    /// Builder: set seller
    pub fn with_seller(mut self, seller_id: impl Into<String>) -> Self {
        self.seller_id = Some(seller_id.into());
        self
    }
}

/// Seed catalog (loaded from `config/products.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// Product entry in the seed catalog; ids are assigned on insert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SeedProduct {
    /// Materialize the seed entry as a product owned by `seller_id`
    pub fn into_product(self, seller_id: &str) -> FlylightResult<Product> {
        let mut product = Product::new(self.name, self.price)?
            .with_stock(self.stock)
            .with_seller(seller_id);
        product.description = self.description;
        product.category = self.category;
        product.image_url = self.image_url;
        Ok(product)
    }
}

/// Order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// A line in an order; price is the unit price the customer saw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub price: f64,
}

/// A customer order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub payment_id: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Checkout form submitted by a customer
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_amount: Option<f64>,
}

impl NewOrder {
    /// Validate and turn the form into a pending order
    pub fn into_order(self) -> FlylightResult<Order> {
        let required = [
            ("customer_name", &self.customer_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("zip_code", &self.zip_code),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(FlylightError::validation(format!("{} is required", field)));
        }

        if self.items.is_empty() {
            return Err(FlylightError::validation("Order has no items"));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity <= 0) {
            return Err(FlylightError::validation(format!(
                "Invalid quantity for product {}",
                item.product_id
            )));
        }

        let total_amount = self
            .total_amount
            .filter(|t| t.is_finite() && *t >= 0.0)
            .ok_or_else(|| FlylightError::validation("total_amount is required"))?;

        Ok(Order {
            id: Uuid::new_v4().to_string(),
            customer_name: self.customer_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            zip_code: self.zip_code,
            items: self.items,
            total_amount,
            payment_id: None,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        })
    }
}

impl Order {
    /// Total units across all lines
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn contains_product(&self, product_id: &str) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }
}
