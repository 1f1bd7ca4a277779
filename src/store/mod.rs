// src/store/mod.rs

// Fronteira com o document store remoto.
//
// O contrato é o de uma assinatura reativa: `subscribe` entrega o estado
// atual da coleção imediatamente e de novo a cada escrita. Escritas são
// sempre do registro inteiro (`replace`), nunca patch de campo, e a visão
// local só muda quando o store ecoa o snapshot atualizado.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use crate::common::error::AppError;

pub mod memory;

/// Estado completo de uma coleção num instante: um objeto id → registro.
/// `None` significa "coleção vazia", não erro.
pub type Snapshot = Option<Value>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Assina uma coleção. O receiver já nasce com o snapshot atual.
    async fn subscribe(&self, path: &str) -> Result<watch::Receiver<Snapshot>, AppError>;

    /// Cria um registro com id novo e devolve o id atribuído.
    async fn create(&self, path: &str, record: Value) -> Result<String, AppError>;

    /// Sobrescreve o registro inteiro naquele id.
    async fn replace(&self, path: &str, id: &str, record: Value) -> Result<(), AppError>;

    /// Remove o registro. Coleções aninhadas somem junto porque vivem
    /// embutidas no documento pai.
    async fn delete(&self, path: &str, id: &str) -> Result<(), AppError>;
}

/// Decodifica um snapshot numa lista tipada, em ordem de id.
///
/// Total: snapshot vazio vira lista vazia e registros irreconhecíveis são
/// descartados em vez de derrubar a tela.
pub fn decode_snapshot<T: DeserializeOwned>(snapshot: &Snapshot) -> Vec<T> {
    let Some(Value::Object(map)) = snapshot else {
        return Vec::new();
    };
    map.values()
        .filter_map(|record| serde_json::from_value(record.clone()).ok())
        .collect()
}

/// Serializa um registro garantindo que o campo `id` acompanha o documento.
pub fn encode_record<T: Serialize>(id: &str, record: &T) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(record)?;
    match value.as_object_mut() {
        Some(map) => {
            map.insert("id".to_string(), Value::String(id.to_string()));
            Ok(value)
        }
        None => Err(AppError::InvalidRecord(
            "registro precisa ser um objeto JSON".to_string(),
        )),
    }
}
