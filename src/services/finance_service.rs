// src/services/finance_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::finance::{Transaction, TransactionCategory, TransactionKind, TransactionStatus},
    services::dashboard_service::Period,
    store::{DocumentStore, encode_record},
};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[validate(length(min = 1, message = "Descrição é obrigatória"))]
    pub description: String,
    pub kind: TransactionKind,
    #[serde(default)]
    pub value: Decimal,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub category: TransactionCategory,
    pub subcategory: Option<String>,
    pub client_id: Option<String>,
    #[serde(default)]
    pub recurring: bool,
}

// =========================================================================
//  DERIVADOS (puros)
// =========================================================================

/// Visão com o status efetivo aplicado: pendente vencida aparece como
/// vencida. Nada é persistido; o registro original continua pendente.
pub fn with_effective_status(transactions: &[Transaction], today: NaiveDate) -> Vec<Transaction> {
    transactions
        .iter()
        .map(|tx| {
            let status = tx.effective_status(today);
            if status == tx.status {
                tx.clone()
            } else {
                tx.with_status(status)
            }
        })
        .collect()
}

/// Despesas pagas do período somadas por categoria, na ordem da primeira
/// aparição (alimenta o gráfico de pizza do financeiro).
pub fn expenses_by_category(
    transactions: &[Transaction],
    period: &Period,
) -> Vec<(TransactionCategory, Decimal)> {
    let mut buckets: Vec<(TransactionCategory, Decimal)> = Vec::new();
    for tx in transactions {
        if tx.kind != TransactionKind::Despesa || !tx.is_paid() || !period.contains(tx.date) {
            continue;
        }
        match buckets.iter_mut().find(|(cat, _)| *cat == tx.category) {
            Some((_, total)) => *total += tx.value,
            None => buckets.push((tx.category, tx.value)),
        }
    }
    buckets
}

// =========================================================================
//  SERVIÇO
// =========================================================================

#[derive(Clone)]
pub struct FinanceService {
    store: Arc<dyn DocumentStore>,
    path: String,
}

impl FinanceService {
    pub fn new(store: Arc<dyn DocumentStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub async fn create(&self, payload: NewTransaction) -> Result<String, AppError> {
        payload.validate()?;

        let transaction = Transaction {
            kind: payload.kind,
            description: payload.description,
            value: payload.value,
            date: payload.date,
            due_date: payload.due_date,
            status: payload.status,
            category: payload.category,
            subcategory: payload.subcategory,
            client_id: payload.client_id,
            recurring: payload.recurring,
            created_at: Some(chrono::Utc::now()),
            ..Transaction::default()
        };

        let record = serde_json::to_value(&transaction)?;
        let id = self.store.create(&self.path, record).await?;
        tracing::info!(id, "transação criada");
        Ok(id)
    }

    pub async fn replace(&self, transaction: &Transaction) -> Result<(), AppError> {
        let record = encode_record(&transaction.id, transaction)?;
        self.store
            .replace(&self.path, &transaction.id, record)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(&self.path, id).await
    }

    /// Quita a transação na data informada (registro inteiro reescrito).
    pub async fn mark_paid(
        &self,
        transaction: &Transaction,
        paid_on: NaiveDate,
    ) -> Result<Transaction, AppError> {
        let updated = transaction.marked_paid(paid_on);
        self.replace(&updated).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{decode_snapshot, memory::MemoryStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn pendente_vencida_aparece_como_vencida() {
        let tx = Transaction {
            kind: TransactionKind::Receita,
            status: TransactionStatus::Pendente,
            due_date: Some(date(2024, 3, 1)),
            ..Transaction::default()
        };
        let view = with_effective_status(&[tx.clone()], date(2024, 3, 10));
        assert_eq!(view[0].status, TransactionStatus::Vencido);

        // No dia do vencimento ainda não está vencida
        let view = with_effective_status(&[tx.clone()], date(2024, 3, 1));
        assert_eq!(view[0].status, TransactionStatus::Pendente);

        // Paga nunca regride para vencida
        let paid = tx.marked_paid(date(2024, 2, 20));
        let view = with_effective_status(&[paid], date(2024, 3, 10));
        assert_eq!(view[0].status, TransactionStatus::Pago);
    }

    #[test]
    fn despesas_agrupam_por_categoria_so_com_pagas_do_periodo() {
        let inside = date(2024, 3, 15);
        let period = Period::month_of(inside);
        let expense = |value: i64, category, status| Transaction {
            kind: TransactionKind::Despesa,
            value: Decimal::from(value),
            category,
            status,
            date: Some(inside),
            ..Transaction::default()
        };

        let transactions = vec![
            expense(100, TransactionCategory::Fixa, TransactionStatus::Pago),
            expense(50, TransactionCategory::Fixa, TransactionStatus::Pago),
            expense(70, TransactionCategory::Variavel, TransactionStatus::Pago),
            expense(999, TransactionCategory::Fixa, TransactionStatus::Pendente),
        ];
        let buckets = expenses_by_category(&transactions, &period);
        assert_eq!(
            buckets,
            vec![
                (TransactionCategory::Fixa, Decimal::from(150)),
                (TransactionCategory::Variavel, Decimal::from(70)),
            ]
        );
    }

    #[tokio::test]
    async fn quitar_reescreve_o_registro_no_store() {
        let store = Arc::new(MemoryStore::new());
        let finance = FinanceService::new(store.clone(), "transacoes");

        let id = finance
            .create(NewTransaction {
                description: "Mensalidade social media".to_string(),
                kind: TransactionKind::Receita,
                value: Decimal::from(1200),
                date: None,
                due_date: Some(date(2024, 3, 5)),
                status: TransactionStatus::Pendente,
                category: TransactionCategory::Projeto,
                subcategory: None,
                client_id: Some("c1".to_string()),
                recurring: true,
            })
            .await
            .unwrap();

        let rx = store.subscribe("transacoes").await.unwrap();
        let transactions: Vec<Transaction> = decode_snapshot(&rx.borrow().clone());
        let tx = transactions.into_iter().next().unwrap();
        assert_eq!(tx.id, id);

        finance.mark_paid(&tx, date(2024, 3, 4)).await.unwrap();
        let echoed: Vec<Transaction> = decode_snapshot(&rx.borrow().clone());
        assert_eq!(echoed[0].status, TransactionStatus::Pago);
        assert_eq!(echoed[0].date, Some(date(2024, 3, 4)));
    }
}
