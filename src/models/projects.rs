// src/models/projects.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::coerce;

// --- ENUMS ---

// Colunas do kanban, na ordem fixa do quadro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskColumn {
    Todo,
    Doing,
    Review,
    Done,
    #[default]
    #[serde(other)]
    Backlog,
}

impl TaskColumn {
    /// Sequência canônica do quadro (backlog → done)
    pub const SEQUENCE: [TaskColumn; 5] = [
        TaskColumn::Backlog,
        TaskColumn::Todo,
        TaskColumn::Doing,
        TaskColumn::Review,
        TaskColumn::Done,
    ];

    pub fn is_done(&self) -> bool {
        matches!(self, TaskColumn::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Baixa,
    Alta,
    Urgente,
    #[default]
    #[serde(other)]
    Media,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Ativo,
    Pausado,
    Concluido,
    Cancelado,
    #[default]
    #[serde(other)]
    Negociacao,
}

impl ProjectStatus {
    /// Ordem fixa de exibição dos agrupamentos por status
    pub const CANONICAL_ORDER: [ProjectStatus; 5] = [
        ProjectStatus::Negociacao,
        ProjectStatus::Ativo,
        ProjectStatus::Pausado,
        ProjectStatus::Concluido,
        ProjectStatus::Cancelado,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Negociacao => "Em negociação",
            ProjectStatus::Ativo => "Ativo",
            ProjectStatus::Pausado => "Pausado",
            ProjectStatus::Concluido => "Concluído",
            ProjectStatus::Cancelado => "Cancelado",
        }
    }
}

// --- SUB-ENTIDADES ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub title: String,
    pub column: TaskColumn,
    pub priority: TaskPriority,
    // Invariante: `completed` acompanha a coluna. Só mude via `moved_to`.
    pub completed: bool,
    #[serde(deserialize_with = "coerce::lossy_date")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Move a tarefa de coluna mantendo o invariante `completed == (column == done)`.
    pub fn moved_to(&self, column: TaskColumn) -> Task {
        Task {
            column,
            completed: column.is_done(),
            ..self.clone()
        }
    }

    /// Reconcilia um registro vindo do store cujo `completed` divergiu da coluna.
    pub fn normalized(mut self) -> Task {
        self.completed = self.column.is_done();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub description: String,
    #[serde(deserialize_with = "coerce::lossy_decimal")]
    pub value: Decimal,
    #[serde(deserialize_with = "coerce::lossy_date")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CostEntry {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub description: String,
    #[serde(deserialize_with = "coerce::lossy_decimal")]
    pub value: Decimal,
    #[serde(deserialize_with = "coerce::lossy_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Link {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub label: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub url: String,
}

// --- PROJETO ---

// Mesmo shape nas duas coleções: embutido no cliente e avulso na coleção
// própria. A atualização é sempre do registro inteiro (não há patch de campo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    #[serde(deserialize_with = "coerce::lossy_string")]
    pub name: String,
    pub status: ProjectStatus,

    // Valor contratado e custo estimado
    #[serde(deserialize_with = "coerce::lossy_decimal")]
    pub value: Decimal,
    #[serde(deserialize_with = "coerce::lossy_decimal")]
    pub cost: Decimal,

    #[serde(deserialize_with = "coerce::lossy_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "coerce::lossy_date")]
    pub deadline: Option<NaiveDate>,

    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub tasks: Vec<Task>,
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub payments: Vec<Payment>,
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub costs: Vec<CostEntry>,
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub notes: Vec<Note>,
    #[serde(deserialize_with = "coerce::lossy_vec")]
    pub links: Vec<Link>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    // Construtores nomeados de atualização: o registro inteiro é reconstruído
    // e reescrito no store, nunca um campo isolado.

    pub fn with_status(&self, status: ProjectStatus) -> Project {
        Project { status, ..self.clone() }
    }

    pub fn with_task(&self, task: Task) -> Project {
        let mut updated = self.clone();
        updated.tasks.push(task.normalized());
        updated
    }

    pub fn with_task_moved(&self, task_id: &str, column: TaskColumn) -> Project {
        let mut updated = self.clone();
        for task in &mut updated.tasks {
            if task.id == task_id {
                *task = task.moved_to(column);
            }
        }
        updated
    }

    pub fn without_task(&self, task_id: &str) -> Project {
        let mut updated = self.clone();
        updated.tasks.retain(|t| t.id != task_id);
        updated
    }

    pub fn with_payment(&self, payment: Payment) -> Project {
        let mut updated = self.clone();
        updated.payments.push(payment);
        updated
    }

    pub fn with_cost(&self, cost: CostEntry) -> Project {
        let mut updated = self.clone();
        updated.costs.push(cost);
        updated
    }

    pub fn with_note(&self, note: Note) -> Project {
        let mut updated = self.clone();
        updated.notes.push(note);
        updated
    }

    pub fn with_link(&self, link: Link) -> Project {
        let mut updated = self.clone();
        updated.links.push(link);
        updated
    }
}

// --- PROJETO ENRIQUECIDO ---

/// Projeto pronto para exibição: o registro base mais os campos derivados
/// (contexto do cliente dono e métricas calculadas). Nunca é persistido.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProject {
    #[serde(flatten)]
    pub base: Project,

    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub client_service: Option<String>,

    pub total_paid: Decimal,
    pub total_costs: Decimal,
    pub remaining: Decimal,
    pub profit: Decimal,

    pub progress: i32,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub urgent_tasks: usize,

    // None quando o projeto não tem prazo definido
    pub days_remaining: Option<i64>,
    pub is_overdue: bool,
}
