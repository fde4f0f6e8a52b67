// src/services/finance_service.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{Populate, RecordStore},
    models::finance::{
        CreateFinancialRecordPayload, FinancialRecord, FinancialRecordDetail, FinancialSummary,
        FinancialType, NewFinancialRecord, SummaryPeriod,
    },
};

#[derive(Clone)]
pub struct FinanceService {
    store: RecordStore,
}

impl FinanceService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Lançamentos mais recentes primeiro.
    pub async fn list_records(&self) -> Vec<FinancialRecordDetail> {
        let mut records = self.store.find_all::<FinancialRecord>().await;
        records.sort_by(|a, b| b.date.cmp(&a.date));
        FinancialRecord::populate(&self.store, records).await
    }

    pub async fn create_record(
        &self,
        payload: CreateFinancialRecordPayload,
        caller_id: &str,
    ) -> Result<FinancialRecordDetail, AppError> {
        let record = self
            .store
            .create::<FinancialRecord>(NewFinancialRecord {
                record_type: payload.record_type,
                category: payload.category,
                description: payload.description,
                amount: payload.amount,
                date: payload.date,
                user_id: payload.user_id.unwrap_or_else(|| caller_id.to_string()),
            })
            .await;

        tracing::info!("💰 Lançamento {:?} de {} ({})", record.record_type, record.amount, record.category);

        FinancialRecord::populate(&self.store, vec![record])
            .await
            .pop()
            .ok_or(AppError::FinancialRecordNotFound)
    }

    pub async fn delete_record(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete::<FinancialRecord>(id).await {
            return Err(AppError::FinancialRecordNotFound);
        }
        Ok(())
    }

    pub async fn summary(&self, period: &SummaryPeriod) -> FinancialSummary {
        let (income, expense) = self
            .store
            .find_all::<FinancialRecord>()
            .await
            .iter()
            .filter(|r| period.contains(r.date))
            .fold((Decimal::ZERO, Decimal::ZERO), |(income, expense), r| match r.record_type {
                FinancialType::Income => (income + r.amount, expense),
                FinancialType::Expense => (income, expense + r.amount),
            });

        FinancialSummary {
            income,
            expense,
            balance: income - expense,
        }
    }
}
