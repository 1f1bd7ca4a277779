// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::coerce;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Despesa, // Saída
    #[default]
    #[serde(other)]
    Receita, // Entrada
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pago,
    Vencido,
    #[default]
    #[serde(other)]
    Pendente,
}

// Receita: projeto | renda_paralela. Despesa: custo_projeto | fixa | variavel.
// Registros antigos com categoria desconhecida caem em `Outra`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    Projeto,
    RendaParalela,
    CustoProjeto,
    Fixa,
    Variavel,
    #[default]
    #[serde(other)]
    Outra,
}

// --- Transação ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub description: String,

    #[serde(deserialize_with = "coerce::lossy_decimal")]
    pub value: Decimal,

    #[serde(deserialize_with = "coerce::lossy_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "coerce::lossy_date")]
    pub due_date: Option<NaiveDate>,

    pub status: TransactionStatus,
    pub category: TransactionCategory,
    pub subcategory: Option<String>,

    // Vínculo opcional com um cliente (referência, não posse)
    pub client_id: Option<String>,

    pub recurring: bool,

    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Status efetivo para exibição: pendente com vencimento no passado
    /// é mostrado como vencido, sem reescrever o registro.
    pub fn effective_status(&self, today: NaiveDate) -> TransactionStatus {
        match (self.status, self.due_date) {
            (TransactionStatus::Pendente, Some(due)) if due < today => TransactionStatus::Vencido,
            (status, _) => status,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == TransactionStatus::Pago
    }

    // Construtores de atualização (registro inteiro)

    pub fn with_status(&self, status: TransactionStatus) -> Transaction {
        Transaction { status, ..self.clone() }
    }

    /// Quita a transação na data informada
    pub fn marked_paid(&self, paid_on: NaiveDate) -> Transaction {
        Transaction {
            status: TransactionStatus::Pago,
            date: Some(paid_on),
            ..self.clone()
        }
    }
}
