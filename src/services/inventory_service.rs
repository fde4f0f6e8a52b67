// src/services/inventory_service.rs

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::{Populate, RecordStore},
    models::{
        inventory::{
            CreateProductPayload, CreateStockMovementPayload, NewProduct, NewStockMovement,
            Product, ProductPatch, StockMovement, StockMovementDetail, StockMovementType,
            UpdateProductPayload,
        },
        DeleteOutcome,
    },
};

// Histórico devolvido na listagem de movimentações
const MOVEMENT_HISTORY_LIMIT: usize = 100;

#[derive(Clone)]
pub struct InventoryService {
    store: RecordStore,
}

impl InventoryService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    // --- PRODUTOS ---

    pub async fn list_products(&self) -> Vec<Product> {
        let mut products = self.store.find_all::<Product>().await;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, AppError> {
        self.store
            .find_by_id::<Product>(id)
            .await
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn create_product(&self, payload: CreateProductPayload) -> Product {
        let product = self.store.create::<Product>(NewProduct::from(payload)).await;
        tracing::info!("📦 Produto criado: {} (estoque {})", product.name, product.current_stock);
        product
    }

    pub async fn update_product(
        &self,
        id: &str,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        self.store
            .update::<Product>(id, ProductPatch::from(payload))
            .await
            .ok_or(AppError::ProductNotFound)
    }

    /// Produto com movimentações é apenas desativado, para manter o histórico.
    pub async fn delete_product(&self, id: &str) -> Result<DeleteOutcome, AppError> {
        let product = self.get_product(id).await?;

        let has_movements = self
            .store
            .find_all::<StockMovement>()
            .await
            .iter()
            .any(|m| m.product_id == product.id);

        if has_movements {
            let patch = ProductPatch {
                active: Some(false),
                ..Default::default()
            };
            self.store.update::<Product>(id, patch).await;
            tracing::warn!("⚠️ Produto {} possui movimentações, apenas desativado", product.name);
            return Ok(DeleteOutcome::Deactivated);
        }

        self.store.delete::<Product>(id).await;
        tracing::info!("🗑️ Produto {} excluído", product.name);
        Ok(DeleteOutcome::Deleted)
    }

    // --- MOVIMENTAÇÕES ---

    /// As movimentações mais recentes primeiro, limitadas ao histórico recente.
    pub async fn list_movements(&self) -> Vec<StockMovementDetail> {
        let mut movements = self.store.find_all::<StockMovement>().await;
        movements.sort_by(|a, b| b.date.cmp(&a.date));
        movements.truncate(MOVEMENT_HISTORY_LIMIT);

        StockMovement::populate(&self.store, movements).await
    }

    /// Registra a movimentação e ajusta o saldo do produto.
    /// Saídas maiores que o saldo atual são recusadas aqui; o store não tem piso.
    pub async fn create_movement(
        &self,
        payload: CreateStockMovementPayload,
        caller_id: &str,
    ) -> Result<StockMovementDetail, AppError> {
        let product = self.get_product(&payload.product_id).await?;

        if payload.movement_type == StockMovementType::Out && payload.quantity > product.current_stock {
            tracing::warn!(
                "⛔ Saída de {} recusada para {}: saldo {}",
                payload.quantity,
                product.name,
                product.current_stock
            );
            return Err(AppError::InsufficientStock {
                available: product.current_stock,
                requested: payload.quantity,
            });
        }

        let movement = self
            .store
            .create_stock_movement(NewStockMovement {
                product_id: payload.product_id,
                movement_type: payload.movement_type,
                quantity: payload.quantity,
                reason: payload.reason,
                user_id: payload.user_id.unwrap_or_else(|| caller_id.to_string()),
                date: payload.date.unwrap_or_else(Utc::now),
            })
            .await;

        tracing::info!(
            "🔁 Movimentação {:?} de {} em {}",
            movement.movement_type,
            movement.quantity,
            product.name
        );

        StockMovement::populate(&self.store, vec![movement])
            .await
            .pop()
            .ok_or(AppError::ProductNotFound)
    }
}
