pub mod gamification_service;
pub mod project_service;
pub mod settings_service;
pub mod split_service;
pub mod subscription_service;
pub mod summary_service;
pub mod transaction_service;

pub use gamification_service::GamificationService;
pub use project_service::ProjectService;
pub use settings_service::SettingsService;
pub use split_service::SplitService;
pub use subscription_service::{ScheduleState, SubscriptionService, TickOutcome, MAX_BACKLOG_TICKS};
pub use summary_service::{AggregateFilter, AggregateView, CategoryTotal, Settlement, SummaryService};
pub use transaction_service::TransactionService;
