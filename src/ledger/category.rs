use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Fallback category for imports and anything that does not fit elsewhere.
pub const OTHER_CATEGORY_ID: &str = "other";

/// Upper bound on quick-entry favorites.
pub const MAX_FAVORITES: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn other() -> Self {
        Self::new(OTHER_CATEGORY_ID)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Catalog entry. Categories are fixed; ledgers only choose favorites.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const CATALOG_ENTRIES: [(&str, &str, &str, &str); 15] = [
    ("food", "Food", "utensils", "#f97316"),
    ("drink", "Drinks", "coffee", "#a16207"),
    ("transport", "Transport", "bus", "#0ea5e9"),
    ("shopping", "Shopping", "shopping-bag", "#ec4899"),
    ("groceries", "Groceries", "basket", "#22c55e"),
    ("housing", "Housing", "home", "#6366f1"),
    ("utilities", "Utilities", "zap", "#eab308"),
    ("entertainment", "Entertainment", "film", "#8b5cf6"),
    ("health", "Health", "heart-pulse", "#ef4444"),
    ("travel", "Travel", "plane", "#14b8a6"),
    ("education", "Education", "book", "#3b82f6"),
    ("gift", "Gifts", "gift", "#f43f5e"),
    ("pet", "Pets", "paw", "#d97706"),
    ("subscription", "Subscriptions", "repeat", "#64748b"),
    (OTHER_CATEGORY_ID, "Other", "dots", "#94a3b8"),
];

static CATALOG: Lazy<Vec<Category>> = Lazy::new(|| {
    CATALOG_ENTRIES
        .iter()
        .map(|&(id, name, icon, color)| Category {
            id: CategoryId::new(id),
            name,
            icon,
            color,
        })
        .collect()
});

pub fn catalog() -> &'static [Category] {
    &CATALOG
}

pub fn find(id: &CategoryId) -> Option<&'static Category> {
    catalog().iter().find(|category| &category.id == id)
}

pub fn is_known(id: &CategoryId) -> bool {
    find(id).is_some()
}

/// Matches a display name or an id, ignoring case and surrounding whitespace.
pub fn lookup_label(label: &str) -> Option<&'static Category> {
    let needle = label.trim();
    catalog().iter().find(|category| {
        category.name.eq_ignore_ascii_case(needle) || category.id.as_str().eq_ignore_ascii_case(needle)
    })
}

/// Favorite categories for quick entry, capped at [`MAX_FAVORITES`] catalog ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<CategoryId>", into = "Vec<CategoryId>")]
pub struct FavoriteCategories(Vec<CategoryId>);

impl FavoriteCategories {
    pub fn as_slice(&self) -> &[CategoryId] {
        &self.0
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FavoriteCategories {
    fn default() -> Self {
        Self(
            catalog()
                .iter()
                .take(MAX_FAVORITES)
                .map(|category| category.id.clone())
                .collect(),
        )
    }
}

impl TryFrom<Vec<CategoryId>> for FavoriteCategories {
    type Error = LedgerError;

    fn try_from(ids: Vec<CategoryId>) -> Result<Self, Self::Error> {
        let mut unique: Vec<CategoryId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !is_known(&id) {
                return Err(LedgerError::UnknownCategory(id.to_string()));
            }
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.len() > MAX_FAVORITES {
            return Err(LedgerError::TooManyFavorites {
                max: MAX_FAVORITES,
                actual: unique.len(),
            });
        }
        Ok(Self(unique))
    }
}

impl From<FavoriteCategories> for Vec<CategoryId> {
    fn from(value: FavoriteCategories) -> Self {
        value.0
    }
}
