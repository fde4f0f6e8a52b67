// src/db/record.rs

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::storage::Collection;

/// Um registro persistido numa coleção.
///
/// Todo registro tem `id`, `createdAt` e `updatedAt`. O `Draft` é o conjunto
/// de campos de negócio informado na criação.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    type Draft: Send;

    fn from_draft(id: String, now: DateTime<Utc>, draft: Self::Draft) -> Self;

    fn id(&self) -> &str;

    fn updated_at(&self) -> DateTime<Utc>;

    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// Registros que aceitam atualização parcial (merge).
pub trait Patchable: Record {
    type Patch: Send;

    fn apply(&mut self, patch: Self::Patch);
}

const ID_SUFFIX_LEN: u32 = 11;

/// Timestamp em base 36 + sufixo aleatório.
/// A unicidade é probabilística: colisões são improváveis, não impossíveis.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    let suffix = Uuid::new_v4().as_u128() % 36u128.pow(ID_SUFFIX_LEN);
    format!(
        "{}{:0>width$}",
        to_base36(millis),
        to_base36(suffix),
        width = ID_SUFFIX_LEN as usize
    )
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(char::from(DIGITS[(value % 36) as usize]));
        value /= 36;
    }
    digits.iter().rev().collect()
}

/// Próximo `updatedAt`: sempre estritamente maior que o anterior, mesmo se o
/// relógio não tiver avançado.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
