// src/services/crm_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::crm::{
        Client, ClientStatus, Interaction, InteractionKind, Lead, LeadOrigin, LeadStatus, Proposal,
    },
    models::projects::{Note, Project, ProjectStatus},
    store::{DocumentStore, encode_record},
};

// =========================================================================
//  PAYLOADS DE CRIAÇÃO
// =========================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, message = "Nome do cliente é obrigatório"))]
    pub name: String,
    pub company: Option<String>,
    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub private: bool,
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[validate(length(min = 1, message = "Nome do lead é obrigatório"))]
    pub name: String,
    pub company: Option<String>,
    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub estimated_value: Decimal,
    #[serde(default)]
    pub origin: LeadOrigin,
}

// =========================================================================
//  VISIBILIDADE (puro)
// =========================================================================

/// Recorta a lista para o que o usuário pode ver: registros privados
/// só aparecem para o dono.
pub fn visible_clients(clients: &[Client], user_id: Option<&str>) -> Vec<Client> {
    clients
        .iter()
        .filter(|c| c.visible_to(user_id))
        .cloned()
        .collect()
}

/// Molde de cliente a partir de um lead ganho: contato e serviços migram,
/// o funil recomeça como proposta.
pub fn client_from_lead(lead: &Lead) -> Client {
    Client {
        name: lead.name.clone(),
        company: lead.company.clone(),
        email: lead.email.clone(),
        phone: lead.phone.clone(),
        status: ClientStatus::Proposta,
        services: lead.services.clone(),
        interactions: lead.interactions.clone(),
        notes: lead.notes.clone(),
        created_at: Some(chrono::Utc::now()),
        ..Client::default()
    }
}

// =========================================================================
//  SERVIÇO
// =========================================================================

#[derive(Clone)]
pub struct CrmService {
    store: Arc<dyn DocumentStore>,
    clients_path: String,
    leads_path: String,
}

impl CrmService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clients_path: impl Into<String>,
        leads_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clients_path: clients_path.into(),
            leads_path: leads_path.into(),
        }
    }

    // --- CLIENTES ---

    pub async fn create_client(&self, payload: NewClient) -> Result<String, AppError> {
        payload.validate()?;

        let client = Client {
            name: payload.name,
            company: payload.company,
            email: payload.email,
            phone: payload.phone,
            status: ClientStatus::Proposta,
            private: payload.private,
            owner_id: payload.owner_id,
            services: payload.services,
            created_at: Some(chrono::Utc::now()),
            ..Client::default()
        };

        let record = serde_json::to_value(&client)?;
        let id = self.store.create(&self.clients_path, record).await?;
        tracing::info!(id, "cliente criado");
        Ok(id)
    }

    pub async fn replace_client(&self, client: &Client) -> Result<(), AppError> {
        let record = encode_record(&client.id, client)?;
        self.store
            .replace(&self.clients_path, &client.id, record)
            .await
    }

    /// Remoção definitiva. Os projetos embutidos somem junto, porque vivem
    /// dentro do próprio documento do cliente.
    pub async fn delete_client(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(&self.clients_path, id).await
    }

    pub async fn set_client_status(
        &self,
        client: &Client,
        status: ClientStatus,
    ) -> Result<Client, AppError> {
        let updated = client.with_status(status);
        self.replace_client(&updated).await?;
        Ok(updated)
    }

    pub async fn register_client_interaction(
        &self,
        client: &Client,
        kind: InteractionKind,
        date: Option<NaiveDate>,
        description: &str,
    ) -> Result<Client, AppError> {
        let updated = client.with_interaction(Interaction {
            id: Uuid::new_v4().to_string(),
            kind,
            date,
            description: description.to_string(),
        });
        self.replace_client(&updated).await?;
        Ok(updated)
    }

    pub async fn add_client_note(&self, client: &Client, text: &str) -> Result<Client, AppError> {
        let updated = client.with_note(Note {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            created_at: Some(chrono::Utc::now()),
        });
        self.replace_client(&updated).await?;
        Ok(updated)
    }

    /// Acrescenta um projeto embutido ao cliente (registro inteiro reescrito).
    pub async fn add_client_project(
        &self,
        client: &Client,
        name: &str,
        value: Decimal,
        deadline: Option<NaiveDate>,
    ) -> Result<Client, AppError> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            status: ProjectStatus::Negociacao,
            value,
            deadline,
            created_at: Some(chrono::Utc::now()),
            ..Project::default()
        };
        let updated = client.with_project(project);
        self.replace_client(&updated).await?;
        Ok(updated)
    }

    pub async fn update_client_project(
        &self,
        client: &Client,
        project: Project,
    ) -> Result<Client, AppError> {
        let updated = client.with_project_replaced(project);
        self.replace_client(&updated).await?;
        Ok(updated)
    }

    pub async fn remove_client_project(
        &self,
        client: &Client,
        project_id: &str,
    ) -> Result<Client, AppError> {
        let updated = client.without_project(project_id);
        self.replace_client(&updated).await?;
        Ok(updated)
    }

    // --- LEADS ---

    pub async fn create_lead(&self, payload: NewLead) -> Result<String, AppError> {
        payload.validate()?;

        let lead = Lead {
            name: payload.name,
            company: payload.company,
            email: payload.email,
            phone: payload.phone,
            services: payload.services,
            estimated_value: payload.estimated_value,
            origin: payload.origin,
            status: LeadStatus::Novo,
            created_at: Some(chrono::Utc::now()),
            ..Lead::default()
        };

        let record = serde_json::to_value(&lead)?;
        let id = self.store.create(&self.leads_path, record).await?;
        tracing::info!(id, "lead criado");
        Ok(id)
    }

    pub async fn replace_lead(&self, lead: &Lead) -> Result<(), AppError> {
        let record = encode_record(&lead.id, lead)?;
        self.store.replace(&self.leads_path, &lead.id, record).await
    }

    pub async fn delete_lead(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(&self.leads_path, id).await
    }

    /// Move o lead no funil (novo → ... → ganho|perdido).
    pub async fn advance_lead(&self, lead: &Lead, status: LeadStatus) -> Result<Lead, AppError> {
        let updated = lead.with_status(status);
        self.replace_lead(&updated).await?;
        Ok(updated)
    }

    pub async fn register_lead_interaction(
        &self,
        lead: &Lead,
        kind: InteractionKind,
        date: Option<NaiveDate>,
        description: &str,
    ) -> Result<Lead, AppError> {
        let updated = lead.with_interaction(Interaction {
            id: Uuid::new_v4().to_string(),
            kind,
            date,
            description: description.to_string(),
        });
        self.replace_lead(&updated).await?;
        Ok(updated)
    }

    pub async fn attach_proposal(
        &self,
        lead: &Lead,
        proposal: Proposal,
    ) -> Result<Lead, AppError> {
        let updated = lead.with_proposal(proposal);
        self.replace_lead(&updated).await?;
        Ok(updated)
    }

    /// Fecha o lead como ganho e abre o cliente correspondente.
    /// Devolve o id do cliente recém-criado.
    pub async fn convert_lead(&self, lead: &Lead) -> Result<String, AppError> {
        let client = client_from_lead(lead);
        let record = serde_json::to_value(&client)?;
        let client_id = self.store.create(&self.clients_path, record).await?;

        let won = lead.with_status(LeadStatus::Ganho);
        self.replace_lead(&won).await?;

        tracing::info!(lead_id = %lead.id, client_id, "lead convertido em cliente");
        Ok(client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{decode_snapshot, memory::MemoryStore};

    fn service(store: Arc<MemoryStore>) -> CrmService {
        CrmService::new(store, "clientes", "leads")
    }

    #[test]
    fn cliente_privado_so_aparece_para_o_dono() {
        let mut private = Client {
            name: "Confidencial".to_string(),
            private: true,
            owner_id: Some("ana".to_string()),
            ..Client::default()
        };
        let public = Client {
            name: "Aberto".to_string(),
            ..Client::default()
        };

        let all = vec![private.clone(), public.clone()];
        assert_eq!(visible_clients(&all, Some("ana")).len(), 2);
        assert_eq!(visible_clients(&all, Some("bia")).len(), 1);
        assert_eq!(visible_clients(&all, None).len(), 1);

        // Privado sem dono registrado não aparece para ninguém
        private.owner_id = None;
        assert_eq!(visible_clients(&[private], Some("ana")).len(), 0);
    }

    #[test]
    fn criacao_valida_nome_e_email() {
        let payload = NewClient {
            name: String::new(),
            company: None,
            email: Some("nao-e-email".to_string()),
            phone: None,
            services: vec![],
            private: false,
            owner_id: None,
        };
        assert!(payload.validate().is_err());
    }

    #[tokio::test]
    async fn apagar_cliente_leva_os_projetos_embutidos_junto() {
        let store = Arc::new(MemoryStore::new());
        let crm = service(store.clone());

        let id = crm
            .create_client(NewClient {
                name: "Studio Alfa".to_string(),
                company: None,
                email: None,
                phone: None,
                services: vec!["social_media".to_string()],
                private: false,
                owner_id: None,
            })
            .await
            .unwrap();

        let rx = store.subscribe("clientes").await.unwrap();
        let clients: Vec<Client> = decode_snapshot(&rx.borrow().clone());
        let client = clients.into_iter().next().unwrap();

        let with_project = crm
            .add_client_project(&client, "Site", Decimal::from(1000), None)
            .await
            .unwrap();
        assert_eq!(with_project.projects.len(), 1);

        // O snapshot ecoado carrega o projeto embutido
        let echoed: Vec<Client> = decode_snapshot(&rx.borrow().clone());
        assert_eq!(echoed[0].projects.len(), 1);

        // Apagar o cliente esvazia a coleção: nenhum projeto órfão sobra
        crm.delete_client(&id).await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn conversao_de_lead_cria_cliente_e_fecha_o_funil() {
        let store = Arc::new(MemoryStore::new());
        let crm = service(store.clone());

        let lead_id = crm
            .create_lead(NewLead {
                name: "Maria".to_string(),
                company: Some("Padaria Central".to_string()),
                email: None,
                phone: None,
                services: vec!["trafego_pago".to_string()],
                estimated_value: Decimal::from(2500),
                origin: LeadOrigin::Indicacao,
            })
            .await
            .unwrap();

        let leads_rx = store.subscribe("leads").await.unwrap();
        let leads: Vec<Lead> = decode_snapshot(&leads_rx.borrow().clone());
        let lead = leads.into_iter().next().unwrap();
        assert_eq!(lead.id, lead_id);
        assert_eq!(lead.status, LeadStatus::Novo);

        crm.convert_lead(&lead).await.unwrap();

        let leads: Vec<Lead> = decode_snapshot(&leads_rx.borrow().clone());
        assert_eq!(leads[0].status, LeadStatus::Ganho);

        let clients_rx = store.subscribe("clientes").await.unwrap();
        let clients: Vec<Client> = decode_snapshot(&clients_rx.borrow().clone());
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].name, "Maria");
        assert_eq!(clients[0].services, vec!["trafego_pago".to_string()]);
        assert_eq!(clients[0].status, ClientStatus::Proposta);
    }
}
