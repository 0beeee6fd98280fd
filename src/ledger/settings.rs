use serde::{Deserialize, Serialize};

use super::category::FavoriteCategories;

/// Per-ledger preferences; last write wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSettings {
    #[serde(default)]
    pub selected_categories: FavoriteCategories,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
}
