// src/common/error.rs

use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A camada de agregação em si nunca falha (valores malformados viram o
// elemento neutro); estes erros cobrem a fronteira com o store e a
// validação de formulários.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Registro '{id}' não encontrado em '{collection}'")]
    RecordNotFound { collection: String, id: String },

    // O store devolveu algo que não é um objeto JSON onde um era esperado
    #[error("Registro inválido: {0}")]
    InvalidRecord(String),

    #[error("Erro de serialização")]
    Serialization(#[from] serde_json::Error),

    // A assinatura foi encerrada (store derrubado enquanto alguém escutava)
    #[error("Canal do store encerrado")]
    StoreClosed,

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        AppError::RecordNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}
