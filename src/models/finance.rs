// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{Collection, Record};
use crate::models::{auth::UserProfile, calendar_date, non_negative};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialType {
    Income,  // Receita
    Expense, // Despesa
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: FinancialType,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFinancialRecord {
    pub record_type: FinancialType,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub user_id: String,
}

impl Record for FinancialRecord {
    const COLLECTION: Collection = Collection::FinancialRecords;
    type Draft = NewFinancialRecord;

    fn from_draft(id: String, now: DateTime<Utc>, draft: NewFinancialRecord) -> Self {
        Self {
            id,
            record_type: draft.record_type,
            category: draft.category,
            description: draft.description,
            amount: draft.amount,
            date: draft.date,
            user_id: draft.user_id,
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
pub struct FinancialRecordDetail {
    #[serde(flatten)]
    pub record: FinancialRecord,
    pub user: Option<UserProfile>,
}

// Totais do período, usados no resumo financeiro
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFinancialRecordPayload {
    #[serde(rename = "type")]
    pub record_type: FinancialType,
    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
    pub user_id: Option<String>,
}

// Período do resumo; as duas pontas são inclusivas e opcionais.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryPeriod {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl SummaryPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}
