// src/models/coerce.rs

// Coerção "frouxa" dos dados vindos do store.
//
// O store guarda mapas aninhados sem esquema; campos numéricos podem chegar
// como número, string ou lixo, e datas como "YYYY-MM-DD", ISO completo ou
// qualquer coisa. A regra é TOTAL: nada aqui falha. Número malformado vira
// zero, data malformada vira None (e portanto nunca cai em período nenhum),
// lista ausente vira lista vazia.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Converte um `Value` em `Decimal`, degradando para zero.
pub fn decimal_from_value(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => {
            // Inteiros primeiro, para não perder precisão à toa
            if let Some(i) = n.as_i64() {
                return Decimal::from(i);
            }
            n.as_f64()
                .and_then(Decimal::from_f64_retain)
                .unwrap_or(Decimal::ZERO)
        }
        // O frontend antigo mandava valores como string ("1500.00")
        Value::String(s) => Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// Converte um `Value` em data, degradando para `None`.
///
/// Aceita "YYYY-MM-DD" puro ou um timestamp ISO (só o prefixo de data conta).
pub fn date_from_value(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    if s.len() >= 10 {
        if let Ok(d) = NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d") {
            return Some(d);
        }
    }
    None
}

// --- Desserializadores para usar com #[serde(deserialize_with = ...)] ---

pub fn lossy_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

pub fn lossy_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(date_from_value(&value))
}

/// Lista ausente, nula ou com tipo errado vira `vec![]`; itens individuais
/// malformados são descartados em vez de derrubar o registro inteiro.
pub fn lossy_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// String ausente/nula/com tipo errado vira `""`.
pub fn lossy_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numero_malformado_vira_zero() {
        assert_eq!(decimal_from_value(&json!("abc")), Decimal::ZERO);
        assert_eq!(decimal_from_value(&json!(null)), Decimal::ZERO);
        assert_eq!(decimal_from_value(&json!({})), Decimal::ZERO);
    }

    #[test]
    fn numero_em_string_e_aceito() {
        assert_eq!(decimal_from_value(&json!("1500.50")), Decimal::new(150050, 2));
        assert_eq!(decimal_from_value(&json!(300)), Decimal::from(300));
    }

    #[test]
    fn data_malformada_vira_none() {
        assert_eq!(date_from_value(&json!("ontem")), None);
        assert_eq!(date_from_value(&json!(42)), None);
        assert_eq!(date_from_value(&json!(null)), None);
    }

    #[test]
    fn data_iso_usa_so_o_prefixo() {
        let d = date_from_value(&json!("2024-03-15T10:30:00Z"));
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(date_from_value(&json!("2024-03-15")), NaiveDate::from_ymd_opt(2024, 3, 15));
    }
}
