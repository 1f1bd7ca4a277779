// src/models/crm.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value; // <--- painéis de serviço ficam sem esquema, como JSONB

use crate::models::coerce;
use crate::models::projects::{Note, Project};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Ativo,
    Pausado,
    Finalizado,
    Perdido,
    #[default]
    #[serde(other)]
    Proposta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Reuniao,
    Ligacao,
    Email,
    Whatsapp,
    #[default]
    #[serde(other)]
    Outro,
}

// Funil de leads: novo → em_contato → proposta_enviada → negociacao → ganho|perdido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    EmContato,
    PropostaEnviada,
    Negociacao,
    Ganho,
    Perdido,
    #[default]
    #[serde(other)]
    Novo,
}

impl LeadStatus {
    /// Lead ainda no funil (conta para o valor de pipeline)
    pub fn is_open(&self) -> bool {
        !matches!(self, LeadStatus::Ganho | LeadStatus::Perdido)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeadOrigin {
    Indicacao,
    Instagram,
    Site,
    Anuncio,
    #[default]
    #[serde(other)]
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Enviada,
    Aceita,
    Recusada,
    #[default]
    #[serde(other)]
    Rascunho,
}

// --- SUB-ENTIDADES ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Interaction {
    pub id: String,
    pub kind: InteractionKind,
    #[serde(deserialize_with = "coerce::lossy_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Proposal {
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub title: String,
    #[serde(deserialize_with = "coerce::lossy_decimal")]
    pub value: Decimal,
    #[serde(deserialize_with = "coerce::lossy_date")]
    pub deadline: Option<NaiveDate>,
    pub status: ProposalStatus,
}

// --- CLIENTE ---

// O cliente é o registro "gordo": carrega os próprios projetos embutidos
// (apagar o cliente apaga os projetos junto, estruturalmente) e um mapa
// serviço → dados do painel daquele serviço, guardado sem esquema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    pub status: ClientStatus,

    // Visibilidade: registro privado só aparece para o dono
    pub private: bool,
    pub owner_id: Option<String>,

    // Serviços contratados (Ex: "trafego_pago", "social_media").
    // O conjunto determina quais painéis de serviço fazem sentido exibir.
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub services: Vec<String>,

    // Dados estruturados por serviço (Ex: verba de anúncio, seguidores).
    // Usamos 'Value' porque cada serviço tem um formato próprio.
    pub service_data: Value,

    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub interactions: Vec<Interaction>,
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub notes: Vec<Note>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Client {
    /// Registro visível para o usuário? Privados só aparecem para o dono.
    pub fn visible_to(&self, user_id: Option<&str>) -> bool {
        if !self.private {
            return true;
        }
        match (&self.owner_id, user_id) {
            (Some(owner), Some(user)) => owner == user,
            _ => false,
        }
    }

    /// Primeiro serviço contratado, usado como rótulo no painel
    pub fn primary_service(&self) -> Option<&str> {
        self.services.first().map(String::as_str)
    }

    // Construtores de atualização (registro inteiro, nunca patch)

    pub fn with_status(&self, status: ClientStatus) -> Client {
        Client { status, ..self.clone() }
    }

    pub fn with_interaction(&self, interaction: Interaction) -> Client {
        let mut updated = self.clone();
        updated.interactions.push(interaction);
        updated
    }

    pub fn with_note(&self, note: Note) -> Client {
        let mut updated = self.clone();
        updated.notes.push(note);
        updated
    }

    pub fn with_project(&self, project: Project) -> Client {
        let mut updated = self.clone();
        updated.projects.push(project);
        updated
    }

    /// Substitui o projeto embutido de mesmo id
    pub fn with_project_replaced(&self, project: Project) -> Client {
        let mut updated = self.clone();
        for existing in &mut updated.projects {
            if existing.id == project.id {
                *existing = project.clone();
            }
        }
        updated
    }

    pub fn without_project(&self, project_id: &str) -> Client {
        let mut updated = self.clone();
        updated.projects.retain(|p| p.id != project_id);
        updated
    }
}

// --- LEAD ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Lead {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    // Serviços oferecidos na abordagem
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub services: Vec<String>,

    #[serde(deserialize_with = "coerce::lossy_decimal")]
    pub estimated_value: Decimal,

    pub origin: LeadOrigin,
    pub status: LeadStatus,

    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub interactions: Vec<Interaction>,
    pub proposal: Option<Proposal>,
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub notes: Vec<Note>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn with_status(&self, status: LeadStatus) -> Lead {
        Lead { status, ..self.clone() }
    }

    pub fn with_interaction(&self, interaction: Interaction) -> Lead {
        let mut updated = self.clone();
        updated.interactions.push(interaction);
        updated
    }

    pub fn with_proposal(&self, proposal: Proposal) -> Lead {
        Lead {
            proposal: Some(proposal),
            ..self.clone()
        }
    }
}
