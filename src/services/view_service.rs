// src/services/view_service.rs

// Visões de coleção: filtro, ordenação e agrupamento.
//
// Nada aqui muta a entrada — cada função devolve um Vec novo. Sobre entrada
// bem tipada nenhuma destas funções falha; campos degradados já viraram o
// elemento neutro na coerção e o painel sempre tem o que renderizar.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::crm::{Lead, LeadOrigin, LeadStatus};
use crate::models::projects::{EnrichedProject, ProjectStatus};

// =========================================================================
//  FILTRO
// =========================================================================

/// Conjunto de filtros do quadro de projetos. Cada dimensão vazia é
/// neutra (não exclui nada); o resultado é o E de todas as não vazias.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectFilter {
    pub statuses: Vec<ProjectStatus>,
    pub client_ids: Vec<String>,
    pub services: Vec<String>,
    pub min_value: Option<Decimal>,
    pub max_value: Option<Decimal>,
    pub search: Option<String>,
}

impl ProjectFilter {
    fn matches(&self, item: &EnrichedProject) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&item.base.status) {
            return false;
        }
        if !self.client_ids.is_empty() {
            let Some(client_id) = &item.client_id else {
                return false;
            };
            if !self.client_ids.contains(client_id) {
                return false;
            }
        }
        if !self.services.is_empty() {
            let Some(service) = &item.client_service else {
                return false;
            };
            if !self.services.contains(service) {
                return false;
            }
        }
        if let Some(min) = self.min_value {
            if item.base.value < min {
                return false;
            }
        }
        if let Some(max) = self.max_value {
            if item.base.value > max {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() {
                let in_name = item.base.name.to_lowercase().contains(&needle);
                let in_client = item
                    .client_name
                    .as_ref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle));
                if !in_name && !in_client {
                    return false;
                }
            }
        }
        true
    }
}

pub fn apply_filters(items: &[EnrichedProject], filter: &ProjectFilter) -> Vec<EnrichedProject> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Filtro do funil de leads, com a mesma regra de dimensão vazia neutra.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadFilter {
    pub statuses: Vec<LeadStatus>,
    pub origins: Vec<LeadOrigin>,
    pub search: Option<String>,
}

pub fn filter_leads(leads: &[Lead], filter: &LeadFilter) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| {
            if !filter.statuses.is_empty() && !filter.statuses.contains(&lead.status) {
                return false;
            }
            if !filter.origins.is_empty() && !filter.origins.contains(&lead.origin) {
                return false;
            }
            if let Some(search) = &filter.search {
                let needle = search.trim().to_lowercase();
                if !needle.is_empty() && !lead.name.to_lowercase().contains(&needle) {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

// =========================================================================
//  ORDENAÇÃO
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Data de início mais recente primeiro
    #[default]
    Recentes,
    Alfabetica,
    /// Prazo mais próximo primeiro; sem prazo vai para o fim
    Prazo,
    /// Valor contratado decrescente
    Valor,
    /// Progresso do kanban decrescente
    Progresso,
    /// Nome do cliente dono
    Cliente,
}

/// Ordenação estável: itens equivalentes preservam a ordem de entrada.
pub fn apply_sorting(items: &[EnrichedProject], key: SortKey) -> Vec<EnrichedProject> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| match key {
        // Option ordena None < Some; invertendo, sem data vai para o fim
        SortKey::Recentes => b.base.start_date.cmp(&a.base.start_date),
        SortKey::Alfabetica => a.base.name.cmp(&b.base.name),
        SortKey::Prazo => cmp_none_last(a.base.deadline, b.base.deadline),
        SortKey::Valor => b.base.value.cmp(&a.base.value),
        SortKey::Progresso => b.progress.cmp(&a.progress),
        SortKey::Cliente => cmp_none_last(a.client_name.clone(), b.client_name.clone()),
    });
    sorted
}

fn cmp_none_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

// =========================================================================
//  AGRUPAMENTO
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Cliente,
    Status,
    Servico,
}

#[derive(Debug, Clone)]
pub struct ProjectGroup {
    pub label: String,
    pub items: Vec<EnrichedProject>,
}

/// Particiona em baldes rotulados. Agrupamento por status segue a ordem
/// canônica do funil (nunca a ordem de chegada) e omite baldes vazios;
/// as demais dimensões seguem a primeira aparição do rótulo.
pub fn group_projects(items: &[EnrichedProject], key: GroupKey) -> Vec<ProjectGroup> {
    match key {
        GroupKey::Status => ProjectStatus::CANONICAL_ORDER
            .iter()
            .map(|status| ProjectGroup {
                label: status.label().to_string(),
                items: items
                    .iter()
                    .filter(|item| item.base.status == *status)
                    .cloned()
                    .collect(),
            })
            .filter(|group| !group.items.is_empty())
            .collect(),
        GroupKey::Cliente => group_by_label(items, |item| {
            item.client_name
                .clone()
                .unwrap_or_else(|| "Sem cliente".to_string())
        }),
        GroupKey::Servico => group_by_label(items, |item| {
            item.client_service
                .clone()
                .unwrap_or_else(|| "Sem serviço".to_string())
        }),
    }
}

// Baldes na ordem da primeira aparição de cada rótulo
fn group_by_label(
    items: &[EnrichedProject],
    label_of: impl Fn(&EnrichedProject) -> String,
) -> Vec<ProjectGroup> {
    let mut groups: Vec<ProjectGroup> = Vec::new();
    for item in items {
        let label = label_of(item);
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(ProjectGroup {
                label,
                items: vec![item.clone()],
            }),
        }
    }
    groups
}
