// src/store/memory.rs

// Implementação em memória do DocumentStore.
//
// Serve de store de desenvolvimento/teste e de referência do contrato:
// um mapa path → coleção, cada coleção com um canal `watch` que sempre
// carrega o snapshot mais recente (o assinante novo recebe o estado atual
// na hora, os demais são acordados a cada escrita).

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::store::{DocumentStore, Snapshot};

struct CollectionState {
    // BTreeMap para snapshots com ordem determinística de id
    docs: BTreeMap<String, Value>,
    tx: watch::Sender<Snapshot>,
}

impl CollectionState {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            docs: BTreeMap::new(),
            tx,
        }
    }

    fn snapshot(&self) -> Snapshot {
        if self.docs.is_empty() {
            return None;
        }
        Some(Value::Object(
            self.docs
                .iter()
                .map(|(id, doc)| (id.clone(), doc.clone()))
                .collect(),
        ))
    }

    fn publish(&self) {
        // send_replace não falha mesmo sem assinantes vivos
        self.tx.send_replace(self.snapshot());
    }
}

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn require_object(record: &Value) -> Result<(), AppError> {
        if record.is_object() {
            Ok(())
        } else {
            Err(AppError::InvalidRecord(
                "documento precisa ser um objeto JSON".to_string(),
            ))
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn subscribe(&self, path: &str) -> Result<watch::Receiver<Snapshot>, AppError> {
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(path.to_string())
            .or_insert_with(CollectionState::new);
        Ok(state.tx.subscribe())
    }

    async fn create(&self, path: &str, mut record: Value) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        match record.as_object_mut() {
            Some(map) => {
                map.insert("id".to_string(), Value::String(id.clone()));
            }
            None => {
                return Err(AppError::InvalidRecord(
                    "documento precisa ser um objeto JSON".to_string(),
                ));
            }
        }

        let mut collections = self.collections.write().await;
        let state = collections
            .entry(path.to_string())
            .or_insert_with(CollectionState::new);
        state.docs.insert(id.clone(), record);
        state.publish();

        tracing::debug!(path, id, "registro criado");
        Ok(id)
    }

    async fn replace(&self, path: &str, id: &str, record: Value) -> Result<(), AppError> {
        Self::require_object(&record)?;

        let mut collections = self.collections.write().await;
        let state = collections
            .entry(path.to_string())
            .or_insert_with(CollectionState::new);
        // Semântica de `set`: grava mesmo que o id ainda não exista
        state.docs.insert(id.to_string(), record);
        state.publish();

        tracing::debug!(path, id, "registro sobrescrito");
        Ok(())
    }

    async fn delete(&self, path: &str, id: &str) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(path.to_string())
            .or_insert_with(CollectionState::new);
        if state.docs.remove(id).is_none() {
            return Err(AppError::not_found(path, id));
        }
        state.publish();

        tracing::debug!(path, id, "registro removido");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::decode_snapshot;
    use serde_json::json;

    /// O assinante novo recebe o estado atual imediatamente (coleção vazia = None).
    #[tokio::test]
    async fn assinatura_entrega_estado_inicial() {
        let store = MemoryStore::new();
        let rx = store.subscribe("clientes").await.unwrap();
        assert!(rx.borrow().is_none());
    }

    /// Cada escrita ecoa um snapshot novo para quem assinou antes.
    #[tokio::test]
    async fn escrita_ecoa_snapshot_para_assinantes() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe("clientes").await.unwrap();

        let id = store
            .create("clientes", json!({ "name": "Studio Alfa" }))
            .await
            .unwrap();

        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update().clone();
        let docs = snap.as_ref().and_then(Value::as_object).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[&id]["name"], "Studio Alfa");
        assert_eq!(docs[&id]["id"], Value::String(id.clone()));

        // Replace sobrescreve o registro inteiro: o campo antigo some
        store
            .replace("clientes", &id, json!({ "id": id, "name": "Studio Beta" }))
            .await
            .unwrap();
        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.unwrap()[&id]["name"], "Studio Beta");

        // Delete esvazia a coleção e o snapshot volta a ser None
        store.delete("clientes", &id).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn delete_de_id_inexistente_e_erro() {
        let store = MemoryStore::new();
        let result = store.delete("clientes", "nao-existe").await;
        assert!(matches!(result, Err(AppError::RecordNotFound { .. })));
    }

    #[tokio::test]
    async fn documento_que_nao_e_objeto_e_rejeitado() {
        let store = MemoryStore::new();
        let result = store.create("clientes", json!([1, 2, 3])).await;
        assert!(matches!(result, Err(AppError::InvalidRecord(_))));
    }

    /// decode_snapshot descarta lixo em vez de falhar.
    #[tokio::test]
    async fn snapshot_decodifica_registros_tipados() {
        use crate::models::crm::Client;

        let store = MemoryStore::new();
        store
            .create("clientes", json!({ "name": "Alfa", "status": "ativo" }))
            .await
            .unwrap();
        store
            .create("clientes", json!({ "name": "Beta", "value": "lixo" }))
            .await
            .unwrap();

        let rx = store.subscribe("clientes").await.unwrap();
        let clients: Vec<Client> = decode_snapshot(&rx.borrow().clone());
        assert_eq!(clients.len(), 2);
    }
}
