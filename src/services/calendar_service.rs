// src/services/calendar_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::calendar::{CalendarEvent, EventSource},
    models::crm::Client,
    models::projects::Project,
    store::{DocumentStore, encode_record},
};

// =========================================================================
//  PROJEÇÃO (pura)
// =========================================================================

// O calendário é uma visão somente-leitura montada de quatro fontes:
// eventos do usuário, prazos de projeto, prazos de tarefa e datas de
// pagamento. Só a primeira existe no store; as demais derivam dos
// registros e mudam editando a origem.

fn project_events(project: &Project, client_name: Option<&str>, out: &mut Vec<CalendarEvent>) {
    if let Some(deadline) = project.deadline {
        out.push(CalendarEvent {
            id: format!("prazo-{}", project.id),
            title: format!("Entrega: {}", project.name),
            date: Some(deadline),
            source: EventSource::ProjectDeadline,
            client_name: client_name.map(str::to_string),
            project_id: Some(project.id.clone()),
            ..CalendarEvent::default()
        });
    }
    for task in &project.tasks {
        if let Some(due) = task.due_date {
            if !task.column.is_done() {
                out.push(CalendarEvent {
                    id: format!("tarefa-{}-{}", project.id, task.id),
                    title: task.title.clone(),
                    date: Some(due),
                    source: EventSource::TaskDeadline,
                    client_name: client_name.map(str::to_string),
                    project_id: Some(project.id.clone()),
                    ..CalendarEvent::default()
                });
            }
        }
    }
    for payment in &project.payments {
        if let Some(date) = payment.date {
            out.push(CalendarEvent {
                id: format!("pagamento-{}-{}", project.id, payment.id),
                title: format!("Pagamento: {}", project.name),
                date: Some(date),
                source: EventSource::Payment,
                client_name: client_name.map(str::to_string),
                project_id: Some(project.id.clone()),
                ..CalendarEvent::default()
            });
        }
    }
}

/// Une as quatro fontes num feed ordenado por data (eventos sem data
/// válida vão para o fim, para a faixa de "sem agendamento").
pub fn collect_events(
    custom: &[CalendarEvent],
    clients: &[Client],
    standalone: &[Project],
) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = custom.to_vec();

    for client in clients {
        for project in &client.projects {
            project_events(project, Some(client.name.as_str()), &mut events);
        }
    }
    for project in standalone {
        project_events(project, None, &mut events);
    }

    events.sort_by(|a, b| match (a.date, b.date) {
        (None, None) => a.title.cmp(&b.title),
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some(_), None) => std::cmp::Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.title.cmp(&b.title)),
    });
    events
}

/// Recorte de um dia do grid mensal.
pub fn events_on(events: &[CalendarEvent], day: NaiveDate) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| e.date == Some(day))
        .cloned()
        .collect()
}

// =========================================================================
//  SERVIÇO (somente eventos `custom`)
// =========================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[validate(length(min = 1, message = "Título é obrigatório"))]
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn DocumentStore>,
    path: String,
}

impl CalendarService {
    pub fn new(store: Arc<dyn DocumentStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub async fn create(&self, payload: NewEvent) -> Result<String, AppError> {
        payload.validate()?;

        let event = CalendarEvent {
            title: payload.title,
            date: payload.date,
            source: EventSource::Custom,
            description: payload.description,
            color: payload.color,
            ..CalendarEvent::default()
        };

        let record = serde_json::to_value(&event)?;
        let id = self.store.create(&self.path, record).await?;
        tracing::info!(id, "evento criado");
        Ok(id)
    }

    /// Só eventos criados pelo usuário podem ser reescritos; os derivados
    /// não existem no store.
    pub async fn replace(&self, event: &CalendarEvent) -> Result<(), AppError> {
        if !event.editable() {
            return Err(AppError::InvalidRecord(
                "evento derivado não é editável".to_string(),
            ));
        }
        let record = encode_record(&event.id, event)?;
        self.store.replace(&self.path, &event.id, record).await
    }

    pub async fn delete(&self, event: &CalendarEvent) -> Result<(), AppError> {
        if !event.editable() {
            return Err(AppError::InvalidRecord(
                "evento derivado não pode ser apagado".to_string(),
            ));
        }
        self.store.delete(&self.path, &event.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::projects::{Payment, Task, TaskColumn};
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn workspace() -> (Vec<Client>, Vec<Project>) {
        let project = Project {
            id: "p1".to_string(),
            name: "Site".to_string(),
            deadline: Some(date(2024, 3, 20)),
            tasks: vec![
                Task {
                    id: "t1".to_string(),
                    title: "Revisar textos".to_string(),
                    due_date: Some(date(2024, 3, 12)),
                    ..Task::default()
                },
                // Concluída não gera lembrete
                Task {
                    id: "t2".to_string(),
                    title: "Briefing".to_string(),
                    due_date: Some(date(2024, 3, 5)),
                    column: TaskColumn::Done,
                    completed: true,
                    ..Task::default()
                },
            ],
            payments: vec![Payment {
                id: "pg1".to_string(),
                value: Decimal::from(500),
                date: Some(date(2024, 3, 15)),
                ..Payment::default()
            }],
            ..Project::default()
        };
        let client = Client {
            id: "c1".to_string(),
            name: "Studio Alfa".to_string(),
            projects: vec![project],
            ..Client::default()
        };
        let standalone = Project {
            id: "p2".to_string(),
            name: "Consultoria".to_string(),
            deadline: Some(date(2024, 3, 8)),
            ..Project::default()
        };
        (vec![client], vec![standalone])
    }

    #[test]
    fn projecao_une_as_quatro_fontes_em_ordem_de_data() {
        let (clients, standalone) = workspace();
        let custom = vec![CalendarEvent {
            id: "e1".to_string(),
            title: "Reunião de pauta".to_string(),
            date: Some(date(2024, 3, 10)),
            source: EventSource::Custom,
            ..CalendarEvent::default()
        }];

        let events = collect_events(&custom, &clients, &standalone);
        let sources: Vec<EventSource> = events.iter().map(|e| e.source).collect();
        assert_eq!(
            sources,
            vec![
                EventSource::ProjectDeadline, // 08: consultoria
                EventSource::Custom,          // 10: reunião
                EventSource::TaskDeadline,    // 12: revisar textos
                EventSource::Payment,         // 15: pagamento
                EventSource::ProjectDeadline, // 20: site
            ]
        );
        // Tarefa concluída ficou de fora
        assert!(!events.iter().any(|e| e.id.contains("t2")));
        // Contexto do cliente dono acompanha os derivados
        assert_eq!(events[2].client_name.as_deref(), Some("Studio Alfa"));
    }

    #[test]
    fn so_eventos_custom_sao_editaveis() {
        let (clients, standalone) = workspace();
        let events = collect_events(&[], &clients, &standalone);
        assert!(events.iter().all(|e| !e.editable()));
    }

    #[test]
    fn recorte_do_dia_filtra_por_data_exata() {
        let (clients, standalone) = workspace();
        let events = collect_events(&[], &clients, &standalone);
        let day = events_on(&events, date(2024, 3, 15));
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].source, EventSource::Payment);
    }

    #[tokio::test]
    async fn evento_derivado_nao_pode_ser_apagado() {
        use crate::store::memory::MemoryStore;

        let store = Arc::new(MemoryStore::new());
        let calendar = CalendarService::new(store, "eventos");

        let derived = CalendarEvent {
            id: "prazo-p1".to_string(),
            source: EventSource::ProjectDeadline,
            ..CalendarEvent::default()
        };
        let result = calendar.delete(&derived).await;
        assert!(matches!(result, Err(AppError::InvalidRecord(_))));
    }
}
