// src/services/dashboard_service.rs

// Camada de agregação do painel.
//
// Todas as funções aqui são puras e totais: recebem as coleções já
// materializadas (nunca um handle de store), não têm efeito colateral e
// nunca falham — coleção vazia rende o elemento neutro da operação
// (0 para somas, 0% para razões), nunca NaN.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::crm::{Client, ClientStatus, Lead, LeadStatus};
use crate::models::dashboard::{ClientTotals, DashboardSummary, MonthlyEntry, TaskProgress};
use crate::models::finance::{Transaction, TransactionKind};
use crate::models::projects::{CostEntry, Payment, Project, ProjectStatus, Task, TaskPriority};

// =========================================================================
//  PERÍODO
// =========================================================================

/// Intervalo fechado `[start, end]` usado nos recortes mensais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Period {
        Period { start, end }
    }

    /// O mês-calendário que contém a data (primeiro ao último dia).
    pub fn month_of(date: NaiveDate) -> Period {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Period { start, end }
    }

    /// Teste inclusivo nas duas pontas. Data ausente (malformada na origem)
    /// não pertence a período nenhum.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match date {
            Some(d) => self.start <= d && d <= self.end,
            None => false,
        }
    }

    /// Rótulo "YYYY-MM" para o eixo do gráfico mensal.
    pub fn month_label(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }
}

// =========================================================================
//  SOMAS BÁSICAS
// =========================================================================

pub fn sum_payments(payments: &[Payment]) -> Decimal {
    payments.iter().map(|p| p.value).sum()
}

pub fn sum_costs(costs: &[CostEntry]) -> Decimal {
    costs.iter().map(|c| c.value).sum()
}

/// Quanto falta receber do projeto. Nunca negativo: pagamento acima do
/// contratado mostra zero, não crédito.
pub fn remaining(project: &Project) -> Decimal {
    (project.value - sum_payments(&project.payments)).max(Decimal::ZERO)
}

/// Lucro do projeto (valor contratado menos custos lançados).
/// Diferente de `remaining`, pode ser negativo.
pub fn profit(project: &Project) -> Decimal {
    project.value - sum_costs(&project.costs)
}

pub fn days_since(date: NaiveDate, today: NaiveDate) -> i64 {
    (today - date).num_days()
}

pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

// =========================================================================
//  KANBAN
// =========================================================================

/// Progresso do quadro. Lista vazia é 0%, nunca divisão por zero.
pub fn task_progress(tasks: &[Task]) -> TaskProgress {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.column.is_done()).count();
    let percent = ratio_percent(completed, total);
    TaskProgress {
        completed,
        total,
        percent,
    }
}

/// Tarefas urgentes ainda não concluídas.
pub fn urgent_open_tasks(tasks: &[Task]) -> usize {
    tasks
        .iter()
        .filter(|t| !t.column.is_done() && t.priority == TaskPriority::Urgente)
        .count()
}

// =========================================================================
//  FINANCEIRO (união das três fontes de receita)
// =========================================================================

fn project_payments_in<'a>(projects: &'a [Project], period: &'a Period) -> impl Iterator<Item = Decimal> + 'a {
    projects
        .iter()
        .flat_map(|p| p.payments.iter())
        .filter(|pay| period.contains(pay.date))
        .map(|pay| pay.value)
}

fn project_costs_in<'a>(projects: &'a [Project], period: &'a Period) -> impl Iterator<Item = Decimal> + 'a {
    projects
        .iter()
        .flat_map(|p| p.costs.iter())
        .filter(|cost| period.contains(cost.date))
        .map(|cost| cost.value)
}

/// Receita recebida no período, somando as três fontes uma única vez:
/// pagamentos dos projetos dos clientes, pagamentos dos projetos avulsos
/// e transações manuais de receita com status pago. Transação pendente
/// fica de fora do "recebido" (entra em `pending_revenue`).
pub fn month_revenue(
    clients: &[Client],
    standalone: &[Project],
    transactions: &[Transaction],
    period: &Period,
) -> Decimal {
    let client_payments: Decimal = clients
        .iter()
        .flat_map(|c| project_payments_in(&c.projects, period))
        .sum();
    let standalone_payments: Decimal = project_payments_in(standalone, period).sum();
    let manual: Decimal = transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Receita && t.is_paid() && period.contains(t.date))
        .map(|t| t.value)
        .sum();

    client_payments + standalone_payments + manual
}

/// Simétrico da receita: custos lançados nos projetos + despesas manuais pagas.
pub fn month_expenses(
    clients: &[Client],
    standalone: &[Project],
    transactions: &[Transaction],
    period: &Period,
) -> Decimal {
    let client_costs: Decimal = clients
        .iter()
        .flat_map(|c| project_costs_in(&c.projects, period))
        .sum();
    let standalone_costs: Decimal = project_costs_in(standalone, period).sum();
    let manual: Decimal = transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Despesa && t.is_paid() && period.contains(t.date))
        .map(|t| t.value)
        .sum();

    client_costs + standalone_costs + manual
}

/// A receber no período: transações de receita ainda não pagas, recortadas
/// pelo vencimento (ou pela data de lançamento quando não há vencimento).
pub fn pending_revenue(transactions: &[Transaction], period: &Period) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Receita && !t.is_paid())
        .filter(|t| period.contains(t.due_date.or(t.date)))
        .map(|t| t.value)
        .sum()
}

/// Crescimento percentual sobre o mês anterior. Mês anterior zerado é
/// definido como 0% de crescimento, não infinito.
pub fn revenue_growth(current: Decimal, previous: Decimal) -> i32 {
    if previous <= Decimal::ZERO {
        return 0;
    }
    let growth = (current - previous) / previous * Decimal::from(100);
    growth.round().to_i32().unwrap_or(0)
}

// =========================================================================
//  LEADS
// =========================================================================

/// Percentual de leads ganhos sobre o total. Zero leads é 0%.
pub fn conversion_rate(leads: &[Lead]) -> i32 {
    let won = leads.iter().filter(|l| l.status == LeadStatus::Ganho).count();
    ratio_percent(won, leads.len())
}

/// Valor estimado dos leads ainda no funil (nem ganhos, nem perdidos).
pub fn pipeline_value(leads: &[Lead]) -> Decimal {
    leads
        .iter()
        .filter(|l| l.status.is_open())
        .map(|l| l.estimated_value)
        .sum()
}

// =========================================================================
//  CONSOLIDADOS
// =========================================================================

/// Totais de um cliente somando os projetos embutidos. O "a receber" é
/// clampado projeto a projeto antes da soma: um projeto pago a mais não
/// abate o saldo dos outros.
pub fn client_totals(client: &Client) -> ClientTotals {
    let total_value = client.projects.iter().map(|p| p.value).sum();
    let total_paid = client
        .projects
        .iter()
        .map(|p| sum_payments(&p.payments))
        .sum();
    let remaining_total = client.projects.iter().map(remaining).sum();
    ClientTotals {
        total_value,
        total_paid,
        remaining: remaining_total,
    }
}

/// Série mensal para o gráfico receita x despesa, do mês mais antigo para
/// o atual.
pub fn monthly_series(
    clients: &[Client],
    standalone: &[Project],
    transactions: &[Transaction],
    months_back: u32,
    today: NaiveDate,
) -> Vec<MonthlyEntry> {
    (0..months_back)
        .rev()
        .filter_map(|offset| {
            today
                .checked_sub_months(Months::new(offset))
                .map(Period::month_of)
        })
        .map(|period| MonthlyEntry {
            month: period.month_label(),
            revenue: month_revenue(clients, standalone, transactions, &period),
            expenses: month_expenses(clients, standalone, transactions, &period),
        })
        .collect()
}

/// Monta os cards do topo do painel a partir do snapshot atual.
/// Recalcula tudo do zero a cada chamada; não há cache nem incremental.
pub fn build_summary(
    clients: &[Client],
    standalone: &[Project],
    transactions: &[Transaction],
    leads: &[Lead],
    today: NaiveDate,
) -> DashboardSummary {
    let current = Period::month_of(today);
    let previous = today
        .checked_sub_months(Months::new(1))
        .map(Period::month_of);

    let month_revenue_total = month_revenue(clients, standalone, transactions, &current);
    let month_expenses_total = month_expenses(clients, standalone, transactions, &current);
    let previous_revenue = previous
        .map(|p| month_revenue(clients, standalone, transactions, &p))
        .unwrap_or(Decimal::ZERO);

    let all_projects = clients
        .iter()
        .flat_map(|c| c.projects.iter())
        .chain(standalone.iter());

    let mut active_projects = 0;
    let mut overdue_projects = 0;
    for project in all_projects {
        if project.status == ProjectStatus::Ativo {
            active_projects += 1;
        }
        let closed = matches!(
            project.status,
            ProjectStatus::Concluido | ProjectStatus::Cancelado
        );
        if !closed && project.deadline.is_some_and(|d| d < today) {
            overdue_projects += 1;
        }
    }

    DashboardSummary {
        month_revenue: month_revenue_total,
        month_expenses: month_expenses_total,
        month_balance: month_revenue_total - month_expenses_total,
        pending_revenue: pending_revenue(transactions, &current),
        revenue_growth: revenue_growth(month_revenue_total, previous_revenue),
        pipeline_value: pipeline_value(leads),
        conversion_rate: conversion_rate(leads),
        active_clients: clients
            .iter()
            .filter(|c| c.status == ClientStatus::Ativo)
            .count(),
        active_projects,
        overdue_projects,
        open_leads: leads.iter().filter(|l| l.status.is_open()).count(),
    }
}

// Razão inteira em %, com zero no denominador definido como 0
fn ratio_percent(part: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let percent = Decimal::from(part as u64 * 100) / Decimal::from(total as u64);
    percent.round().to_i32().unwrap_or(0)
}
