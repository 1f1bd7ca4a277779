// src/services/project_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::crm::Client,
    models::projects::{
        CostEntry, EnrichedProject, Note, Payment, Project, ProjectStatus, Task, TaskColumn,
        TaskPriority,
    },
    services::dashboard_service::{
        days_until, profit, remaining, sum_costs, sum_payments, task_progress, urgent_open_tasks,
    },
    store::{DocumentStore, encode_record},
};

// =========================================================================
//  ENRIQUECIMENTO (puro)
// =========================================================================

/// Combina o projeto com o cliente dono (quando houver) e anexa os campos
/// calculados de exibição. Puro e idempotente: re-enriquecer o próprio
/// `base` devolve um valor estruturalmente igual.
pub fn enrich_project(
    project: &Project,
    client: Option<&Client>,
    today: NaiveDate,
) -> EnrichedProject {
    let progress = task_progress(&project.tasks);
    let days_remaining = project.deadline.map(|deadline| days_until(deadline, today));

    EnrichedProject {
        base: project.clone(),
        client_id: client.map(|c| c.id.clone()),
        client_name: client.map(|c| c.name.clone()),
        client_service: client.and_then(|c| c.primary_service().map(str::to_string)),
        total_paid: sum_payments(&project.payments),
        total_costs: sum_costs(&project.costs),
        remaining: remaining(project),
        profit: profit(project),
        progress: progress.percent,
        completed_tasks: progress.completed,
        total_tasks: progress.total,
        urgent_tasks: urgent_open_tasks(&project.tasks),
        days_remaining,
        is_overdue: days_remaining.is_some_and(|days| days < 0),
    }
}

/// Visão unificada: projetos embutidos nos clientes (com contexto do dono)
/// mais os projetos avulsos (sem cliente).
pub fn enrich_all(
    clients: &[Client],
    standalone: &[Project],
    today: NaiveDate,
) -> Vec<EnrichedProject> {
    let mut enriched: Vec<EnrichedProject> = clients
        .iter()
        .flat_map(|client| {
            client
                .projects
                .iter()
                .map(move |project| enrich_project(project, Some(client), today))
        })
        .collect();
    enriched.extend(
        standalone
            .iter()
            .map(|project| enrich_project(project, None, today)),
    );
    enriched
}

// =========================================================================
//  CRUD SOBRE O STORE (projetos avulsos)
// =========================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[validate(length(min = 1, message = "Nome do projeto é obrigatório"))]
    pub name: String,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub cost: Decimal,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn DocumentStore>,
    path: String,
}

impl ProjectService {
    pub fn new(store: Arc<dyn DocumentStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn create(&self, payload: NewProject) -> Result<String, AppError> {
        payload.validate()?;

        let project = Project {
            name: payload.name,
            status: ProjectStatus::Negociacao,
            value: payload.value,
            cost: payload.cost,
            start_date: payload.start_date,
            deadline: payload.deadline,
            created_at: Some(chrono::Utc::now()),
            ..Project::default()
        };

        let record = serde_json::to_value(&project)?;
        let id = self.store.create(&self.path, record).await?;
        tracing::info!(id, "projeto criado");
        Ok(id)
    }

    /// Reescreve o registro inteiro. Toda atualização passa por aqui:
    /// o chamador monta o projeto novo via os construtores `with_*`.
    pub async fn replace(&self, project: &Project) -> Result<(), AppError> {
        let record = encode_record(&project.id, project)?;
        self.store.replace(&self.path, &project.id, record).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(&self.path, id).await
    }

    // --- Operações nomeadas (leitura-modificação-escrita explícita) ---

    pub async fn set_status(
        &self,
        project: &Project,
        status: ProjectStatus,
    ) -> Result<Project, AppError> {
        let updated = project.with_status(status);
        self.replace(&updated).await?;
        Ok(updated)
    }

    pub async fn add_task(
        &self,
        project: &Project,
        title: &str,
        priority: TaskPriority,
        due_date: Option<NaiveDate>,
    ) -> Result<Project, AppError> {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            column: TaskColumn::Backlog,
            priority,
            completed: false,
            due_date,
        };
        let updated = project.with_task(task);
        self.replace(&updated).await?;
        Ok(updated)
    }

    /// Arrasta a tarefa para outra coluna do kanban, mantendo o invariante
    /// `completed == (column == done)`.
    pub async fn move_task(
        &self,
        project: &Project,
        task_id: &str,
        column: TaskColumn,
    ) -> Result<Project, AppError> {
        let updated = project.with_task_moved(task_id, column);
        self.replace(&updated).await?;
        Ok(updated)
    }

    pub async fn add_payment(
        &self,
        project: &Project,
        description: &str,
        value: Decimal,
        date: Option<NaiveDate>,
    ) -> Result<Project, AppError> {
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            value,
            date,
        };
        let updated = project.with_payment(payment);
        self.replace(&updated).await?;
        Ok(updated)
    }

    pub async fn add_cost(
        &self,
        project: &Project,
        description: &str,
        value: Decimal,
        date: Option<NaiveDate>,
        category: &str,
    ) -> Result<Project, AppError> {
        let cost = CostEntry {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            value,
            date,
            category: category.to_string(),
        };
        let updated = project.with_cost(cost);
        self.replace(&updated).await?;
        Ok(updated)
    }

    pub async fn add_note(&self, project: &Project, text: &str) -> Result<Project, AppError> {
        let note = Note {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            created_at: Some(chrono::Utc::now()),
        };
        let updated = project.with_note(note);
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

    fn sample_project() -> Project {
        Project {
            id: "p1".to_string(),
            name: "Site institucional".to_string(),
            value: Decimal::from(1000),
            deadline: Some(date(2024, 3, 1)),
            payments: vec![Payment {
                value: Decimal::from(300),
                ..Payment::default()
            }],
            tasks: vec![
                Task {
                    id: "t1".to_string(),
                    column: TaskColumn::Done,
                    completed: true,
                    ..Task::default()
                },
                Task {
                    id: "t2".to_string(),
                    priority: TaskPriority::Urgente,
                    ..Task::default()
                },
            ],
            ..Project::default()
        }
    }

    #[test]
    fn enriquecimento_calcula_campos_derivados() {
        let client = Client {
            id: "c1".to_string(),
            name: "Studio Alfa".to_string(),
            services: vec!["social_media".to_string()],
            ..Client::default()
        };
        let today = date(2024, 3, 10);

        let enriched = enrich_project(&sample_project(), Some(&client), today);
        assert_eq!(enriched.client_name.as_deref(), Some("Studio Alfa"));
        assert_eq!(enriched.client_service.as_deref(), Some("social_media"));
        assert_eq!(enriched.total_paid, Decimal::from(300));
        assert_eq!(enriched.remaining, Decimal::from(700));
        assert_eq!(enriched.progress, 50);
        assert_eq!(enriched.urgent_tasks, 1);
        // Prazo 2024-03-01 com hoje 2024-03-10: 9 dias atrasado
        assert_eq!(enriched.days_remaining, Some(-9));
        assert!(enriched.is_overdue);
    }

    #[test]
    fn projeto_sem_prazo_nao_fica_atrasado() {
        let mut project = sample_project();
        project.deadline = None;
        let enriched = enrich_project(&project, None, date(2024, 3, 10));
        assert_eq!(enriched.days_remaining, None);
        assert!(!enriched.is_overdue);
    }

    /// Enriquecer é uma projeção pura: reaplicar sobre o próprio base
    /// devolve exatamente o mesmo valor.
    #[test]
    fn enriquecimento_e_idempotente() {
        let client = Client {
            id: "c1".to_string(),
            name: "Studio Alfa".to_string(),
            ..Client::default()
        };
        let today = date(2024, 3, 10);
        let once = enrich_project(&sample_project(), Some(&client), today);
        let twice = enrich_project(&once.base, Some(&client), today);
        assert_eq!(once, twice);
    }

    #[test]
    fn mover_tarefa_mantem_o_invariante_de_conclusao() {
        let project = sample_project();
        let updated = project.with_task_moved("t2", TaskColumn::Done);
        let task = updated.tasks.iter().find(|t| t.id == "t2").unwrap();
        assert!(task.completed);

        let back = updated.with_task_moved("t2", TaskColumn::Doing);
        let task = back.tasks.iter().find(|t| t.id == "t2").unwrap();
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn crud_reescreve_o_registro_inteiro_no_store() {
        let store = Arc::new(MemoryStore::new());
        let service = ProjectService::new(store.clone(), "projetos");

        let id = service
            .create(NewProject {
                name: "Identidade visual".to_string(),
                value: Decimal::from(800),
                cost: Decimal::ZERO,
                start_date: None,
                deadline: None,
            })
            .await
            .unwrap();

        let rx = store.subscribe("projetos").await.unwrap();
        let projects: Vec<Project> = decode_snapshot(&rx.borrow().clone());
        assert_eq!(projects.len(), 1);
        let project = projects.into_iter().next().unwrap();
        assert_eq!(project.id, id);

        // Uma tarefa entra e o snapshot ecoa o documento completo
        let updated = service
            .add_task(&project, "Briefing", TaskPriority::Alta, None)
            .await
            .unwrap();
        let echoed: Vec<Project> = decode_snapshot(&rx.borrow().clone());
        assert_eq!(echoed[0].tasks.len(), 1);
        assert_eq!(updated.tasks.len(), 1);

        service.delete(&id).await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn criacao_exige_nome() {
        let payload = NewProject {
            name: String::new(),
            value: Decimal::ZERO,
            cost: Decimal::ZERO,
            start_date: None,
            deadline: None,
        };
        assert!(payload.validate().is_err());
    }
}
