// src/lib.rs

// Núcleo do painel de gestão: modelos de registro, camada de agregação
// e a fronteira com o document store remoto. A interface (rotas, formulários,
// autenticação) fica fora deste crate e consome estes módulos.

pub mod common;
pub mod config;
pub mod models;
pub mod services;
pub mod store;

// Reexports principais, para quem embute o crate
pub use common::error::AppError;
pub use config::{AppConfig, AppState, init_tracing};
pub use store::{DocumentStore, Snapshot, memory::MemoryStore};
