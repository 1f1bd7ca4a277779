pub mod calendar;
pub mod coerce;
pub mod crm;
pub mod dashboard;
pub mod finance;
pub mod projects;

pub use calendar::{CalendarEvent, EventSource};
pub use crm::{
    Client, ClientStatus, Interaction, InteractionKind, Lead, LeadOrigin, LeadStatus, Proposal,
    ProposalStatus,
};
pub use dashboard::{ClientTotals, DashboardSummary, MonthlyEntry, TaskProgress};
pub use finance::{Transaction, TransactionCategory, TransactionKind, TransactionStatus};
pub use projects::{
    CostEntry, EnrichedProject, Link, Note, Payment, Project, ProjectStatus, Task, TaskColumn,
    TaskPriority,
};
