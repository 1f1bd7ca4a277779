pub mod calendar_service;
pub mod crm_service;
pub mod dashboard_service;
pub mod finance_service;
pub mod project_service;
pub mod view_service;

pub use calendar_service::CalendarService;
pub use crm_service::CrmService;
pub use finance_service::FinanceService;
pub use project_service::ProjectService;
