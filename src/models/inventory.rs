// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{Collection, Patchable, Record};
use crate::models::{auth::UserProfile, non_negative, nullable, positive};

// --- 1. Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub unit: String, // ml, unidade, g...
    pub cost_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub min_stock: Decimal,
    // Só muda via movimentação de estoque
    pub current_stock: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub unit: String,
    pub cost_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub min_stock: Decimal,
    pub current_stock: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub brand: Option<Option<String>>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub cost_price: Option<Decimal>,
    pub sale_price: Option<Option<Decimal>>,
    pub min_stock: Option<Decimal>,
    pub current_stock: Option<Decimal>,
    pub active: Option<bool>,
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;
    type Draft = NewProduct;

    fn from_draft(id: String, now: DateTime<Utc>, draft: NewProduct) -> Self {
        Self {
            id,
            name: draft.name,
            brand: draft.brand,
            category: draft.category,
            unit: draft.unit,
            cost_price: draft.cost_price,
            sale_price: draft.sale_price,
            min_stock: draft.min_stock,
            current_stock: draft.current_stock,
            active: draft.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Patchable for Product {
    type Patch = ProductPatch;

    fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(brand) = patch.brand {
            self.brand = brand;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(cost_price) = patch.cost_price {
            self.cost_price = cost_price;
        }
        if let Some(sale_price) = patch.sale_price {
            self.sale_price = sale_price;
        }
        if let Some(min_stock) = patch.min_stock {
            self.min_stock = min_stock;
        }
        if let Some(current_stock) = patch.current_stock {
            self.current_stock = current_stock;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}

// --- 2. Movimentações de Estoque ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementType {
    In,
    Out,
}

impl StockMovementType {
    /// Quantidade com sinal: entrada soma, saída subtrai.
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            StockMovementType::In => quantity,
            StockMovementType::Out => -quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    #[serde(rename = "type")]
    pub movement_type: StockMovementType,
    pub quantity: Decimal,
    pub reason: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub product_id: String,
    pub movement_type: StockMovementType,
    pub quantity: Decimal,
    pub reason: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
}

impl Record for StockMovement {
    const COLLECTION: Collection = Collection::StockMovements;
    type Draft = NewStockMovement;

    fn from_draft(id: String, now: DateTime<Utc>, draft: NewStockMovement) -> Self {
        Self {
            id,
            product_id: draft.product_id,
            movement_type: draft.movement_type,
            quantity: draft.quantity,
            reason: draft.reason,
            user_id: draft.user_id,
            date: draft.date,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementDetail {
    #[serde(flatten)]
    pub movement: StockMovement,
    pub product: Option<Product>,
    pub user: Option<UserProfile>,
}

// --- 3. Payloads ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub brand: Option<String>,
    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,
    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,
    #[validate(custom(function = "non_negative"))]
    pub cost_price: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub sale_price: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    pub min_stock: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    pub current_stock: Option<Decimal>,
    pub active: Option<bool>,
}

impl From<CreateProductPayload> for NewProduct {
    fn from(payload: CreateProductPayload) -> Self {
        Self {
            name: payload.name,
            brand: payload.brand,
            category: payload.category,
            unit: payload.unit,
            cost_price: payload.cost_price,
            sale_price: payload.sale_price,
            min_stock: payload.min_stock.unwrap_or_default(),
            current_stock: payload.current_stock.unwrap_or_default(),
            active: payload.active.unwrap_or(true),
        }
    }
}

// Sem `currentStock`: o saldo só muda por movimentação.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub brand: Option<Option<String>>,
    #[validate(length(min = 1, message = "A categoria não pode ficar vazia."))]
    pub category: Option<String>,
    #[validate(length(min = 1, message = "A unidade não pode ficar vazia."))]
    pub unit: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub cost_price: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    pub sale_price: Option<Option<Decimal>>,
    #[validate(custom(function = "non_negative"))]
    pub min_stock: Option<Decimal>,
    pub active: Option<bool>,
}

impl From<UpdateProductPayload> for ProductPatch {
    fn from(payload: UpdateProductPayload) -> Self {
        Self {
            name: payload.name,
            brand: payload.brand,
            category: payload.category,
            unit: payload.unit,
            cost_price: payload.cost_price,
            sale_price: payload.sale_price,
            min_stock: payload.min_stock,
            current_stock: None,
            active: payload.active,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockMovementPayload {
    #[validate(length(min = 1, message = "O produto é obrigatório."))]
    pub product_id: String,
    #[serde(rename = "type")]
    pub movement_type: StockMovementType,
    #[validate(custom(function = "positive"))]
    pub quantity: Decimal,
    #[validate(length(min = 1, message = "O motivo é obrigatório."))]
    pub reason: String,
    pub user_id: Option<String>,
    pub date: Option<DateTime<Utc>>,
}
