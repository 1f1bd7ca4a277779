// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

// 1. Resumo do mês (os cards do topo do painel)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub month_revenue: Decimal,   // Recebido no mês (todas as fontes)
    pub month_expenses: Decimal,  // Gasto no mês (custos + despesas pagas)
    pub month_balance: Decimal,   // Saldo (pode ser negativo)
    pub pending_revenue: Decimal, // A receber no mês (transações não pagas)
    pub revenue_growth: i32,      // % vs. mês anterior

    pub pipeline_value: Decimal, // Valor estimado dos leads em aberto
    pub conversion_rate: i32,    // % de leads ganhos

    pub active_clients: usize,
    pub active_projects: usize,
    pub overdue_projects: usize,
    pub open_leads: usize,
}

// 2. Gráfico mensal (receita x despesa, mês a mês)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    pub month: String, // "YYYY-MM"
    pub revenue: Decimal,
    pub expenses: Decimal,
}

// 3. Progresso do kanban de um projeto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: i32, // 0..=100; lista vazia é 0%, nunca NaN
}

// 4. Totais consolidados de um cliente (soma dos projetos embutidos)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTotals {
    pub total_value: Decimal,
    pub total_paid: Decimal,
    // Clampado por projeto antes de somar: pagamento a mais não vira crédito
    pub remaining: Decimal,
}
