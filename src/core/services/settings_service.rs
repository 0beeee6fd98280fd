//! Membership and low-frequency ledger settings (last write wins).

use rust_decimal::Decimal;
use tracing::info;

use crate::currency::CurrencyCode;
use crate::errors::{LedgerError, Result};
use crate::ledger::{CategoryId, FavoriteCategories, Ledger, Member, MemberId, MemberRole};

pub struct SettingsService;

impl SettingsService {
    /// Adds a participant. The first to join hosts the ledger; everyone after is a guest.
    ///
    /// Joining again only refreshes the display name; roles never change.
    pub fn join(ledger: &mut Ledger, id: MemberId, name: impl Into<String>) -> Result<MemberRole> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("member name cannot be empty".into()));
        }
        if let Some(existing) = ledger.users.get_mut(&id) {
            existing.name = name;
            return Ok(existing.role);
        }
        let role = if ledger.users.is_empty() {
            MemberRole::Host
        } else {
            MemberRole::Guest
        };
        info!("member {} joined as {}", id, role.label());
        ledger.users.insert(id, Member::new(name, role));
        Ok(role)
    }

    /// Replaces one exchange-rate entry (foreign → base).
    pub fn set_rate(ledger: &mut Ledger, currency: CurrencyCode, rate: Decimal) -> Result<()> {
        if currency == ledger.currency {
            return Err(LedgerError::InvalidInput(format!(
                "{currency} is the base currency and needs no rate"
            )));
        }
        if rate <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "rate for {currency} must be positive, got {rate}"
            )));
        }
        ledger.rates.insert(currency, rate);
        Ok(())
    }

    /// Switches the base currency of an empty ledger. Rates are dropped because they were
    /// quoted against the previous base.
    pub fn set_base_currency(ledger: &mut Ledger, currency: CurrencyCode) -> Result<()> {
        if !ledger.transactions.is_empty() || !ledger.subscriptions.is_empty() {
            return Err(LedgerError::InvalidInput(
                "base currency can only change before anything is recorded".into(),
            ));
        }
        ledger.currency = currency;
        ledger.rates.clear();
        Ok(())
    }

    pub fn set_favorites(ledger: &mut Ledger, ids: Vec<CategoryId>) -> Result<()> {
        ledger.settings.selected_categories = FavoriteCategories::try_from(ids)?;
        Ok(())
    }

    pub fn set_character(ledger: &mut Ledger, character_id: Option<String>) {
        ledger.settings.character_id = character_id.filter(|id| !id.trim().is_empty());
    }
}
