pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod finance;
pub mod inventory;
pub mod operations;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidationError;

// Resultado de uma exclusão: registros com vínculos são apenas desativados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteOutcome {
    Deleted,
    Deactivated,
}

// ---
// Helpers de payload
// ---

// Campo ausente -> None (mantém); `null` -> Some(None) (limpa); valor -> Some(Some(v)).
// Usar junto com `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Datas de calendário: aceita "YYYY-MM-DD" e também o timestamp ISO completo
// ("2025-03-10T03:00:00.000Z") gravado pelos backups antigos.
pub(crate) fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn optional_calendar_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_calendar_date(&raw))
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| {
            DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .map_err(|_| format!("data inválida: {raw}"))
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("non_negative")
            .with_message("O valor não pode ser negativo.".into()));
    }
    Ok(())
}

pub(crate) fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive")
            .with_message("A quantidade deve ser maior que zero.".into()));
    }
    Ok(())
}

// Horário no formato "HH:MM"
pub(crate) fn time_of_day(value: &str) -> Result<(), ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("time_of_day").with_message("Use o formato HH:MM.".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_accepts_only_hh_mm() {
        assert!(time_of_day("09:30").is_ok());
        assert!(time_of_day("23:59").is_ok());
        assert!(time_of_day("24:00").is_err());
        assert!(time_of_day("9h30").is_err());
    }

    #[derive(Deserialize)]
    struct Dated {
        #[serde(deserialize_with = "calendar_date")]
        date: NaiveDate,
        #[serde(default, deserialize_with = "optional_calendar_date")]
        birth: Option<NaiveDate>,
    }

    #[test]
    fn calendar_dates_accept_plain_dates_and_iso_timestamps() {
        let plain: Dated = serde_json::from_str(r#"{ "date": "2025-03-10" }"#).unwrap();
        assert_eq!(plain.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(plain.birth, None);

        let stamped: Dated = serde_json::from_str(
            r#"{ "date": "2025-03-10T03:00:00.000Z", "birth": "1990-05-15T00:00:00.000Z" }"#,
        )
        .unwrap();
        assert_eq!(stamped.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(stamped.birth, NaiveDate::from_ymd_opt(1990, 5, 15));

        let cleared: Dated = serde_json::from_str(r#"{ "date": "2025-03-10", "birth": null }"#).unwrap();
        assert_eq!(cleared.birth, None);

        assert!(serde_json::from_str::<Dated>(r#"{ "date": "10/03/2025" }"#).is_err());
    }

    #[test]
    fn decimal_checks() {
        assert!(non_negative(&Decimal::ZERO).is_ok());
        assert!(non_negative(&Decimal::NEGATIVE_ONE).is_err());
        assert!(positive(&Decimal::ZERO).is_err());
        assert!(positive(&Decimal::ONE).is_ok());
    }
}
