// src/models/calendar.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::coerce;

// De onde veio o evento. Só `custom` existe de verdade no store; os demais
// são projeções calculadas a partir de projetos e pagamentos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    ProjectDeadline,
    TaskDeadline,
    Payment,
    #[default]
    #[serde(other)]
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub title: String,
    #[serde(deserialize_with = "coerce::lossy_date")]
    pub date: Option<NaiveDate>,

    pub source: EventSource,

    // Contexto de exibição (de qual cliente/projeto o evento derivou)
    pub client_name: Option<String>,
    pub project_id: Option<String>,

    pub description: Option<String>,
    pub color: Option<String>,
}

impl CalendarEvent {
    /// Apenas eventos criados pelo usuário podem ser editados/apagados;
    /// os derivados mudam editando o registro de origem.
    pub fn editable(&self) -> bool {
        self.source == EventSource::Custom
    }
}
