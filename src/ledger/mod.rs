//! Ledger domain models and the snapshot shape shared with storage.

pub mod calendar;
pub mod category;
pub mod gamification;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod member;
pub mod project;
pub mod settings;
pub mod subscription;
pub mod transaction;

pub use calendar::YearMonth;
pub use category::{Category, CategoryId, FavoriteCategories, MAX_FAVORITES, OTHER_CATEGORY_ID};
pub use gamification::{Dwelling, GamificationState};
pub use ledger::Ledger;
pub use member::{Member, MemberId, MemberRole, Members};
pub use project::{Project, ProjectId, DEFAULT_PROJECT_ID};
pub use settings::LedgerSettings;
pub use subscription::{BillingCycle, Subscription, SubscriptionDraft};
pub use transaction::{ShareMap, SplitPolicy, Transaction, TransactionDraft, TransactionSource};
