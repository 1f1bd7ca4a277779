// src/config.rs

use std::{env, sync::Arc};

use crate::{
    services::{CalendarService, CrmService, FinanceService, ProjectService},
    store::{DocumentStore, memory::MemoryStore},
};

/// Inicializa o logger. Quem embute o crate chama uma vez no boot.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

// Os registros do workspace vivem sob um prefixo por aplicação,
// espelhando o layout do store remoto.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_id: String,
    // Usuário logado, usado no recorte de clientes privados
    pub user_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            app_id: env::var("PAINEL_APP_ID").unwrap_or_else(|_| "painel".to_string()),
            user_id: env::var("PAINEL_USER_ID").ok(),
        }
    }

    pub fn clients_path(&self) -> String {
        format!("apps/{}/clientes", self.app_id)
    }

    pub fn leads_path(&self) -> String {
        format!("apps/{}/leads", self.app_id)
    }

    pub fn projects_path(&self) -> String {
        format!("apps/{}/projetos", self.app_id)
    }

    pub fn transactions_path(&self) -> String {
        format!("apps/{}/transacoes", self.app_id)
    }

    pub fn events_path(&self) -> String {
        format!("apps/{}/eventos", self.app_id)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,

    pub crm_service: CrmService,
    pub project_service: ProjectService,
    pub finance_service: FinanceService,
    pub calendar_service: CalendarService,
}

impl AppState {
    /// Estado padrão: configuração do ambiente + store em memória.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        Ok(Self::with_store(config, Arc::new(MemoryStore::new())))
    }

    /// Monta o gráfico de dependências sobre um store qualquer
    /// (o cliente do store remoto implementa o mesmo trait).
    pub fn with_store(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        let crm_service = CrmService::new(
            store.clone(),
            config.clients_path(),
            config.leads_path(),
        );
        let project_service = ProjectService::new(store.clone(), config.projects_path());
        let finance_service = FinanceService::new(store.clone(), config.transactions_path());
        let calendar_service = CalendarService::new(store.clone(), config.events_path());

        tracing::info!(app_id = %config.app_id, "estado da aplicação montado");

        Self {
            config,
            store,
            crm_service,
            project_service,
            finance_service,
            calendar_service,
        }
    }
}
