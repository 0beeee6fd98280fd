//! Share computation for the four split policies.

use rust_decimal::Decimal;

use crate::currency::{floor_to_minor, round_to_minor, CurrencyCode};
use crate::errors::{LedgerError, Result};
use crate::ledger::{MemberId, MemberRole, Members, ShareMap, SplitPolicy, TransactionDraft};

/// Divides transaction amounts between ledger members.
pub struct SplitService;

impl SplitService {
    /// Collapses degenerate cases before dispatch: a lone member pays for everything.
    pub fn effective_policy(policy: &SplitPolicy, members: &Members) -> SplitPolicy {
        match policy {
            SplitPolicy::Even if members.len() == 1 => SplitPolicy::HostAll,
            other => other.clone(),
        }
    }

    /// Returns what each member owes for `draft`.
    ///
    /// Even and role splits always sum exactly to the amount: shares are rounded down to
    /// the minor unit and the leftover goes to the payer. Custom shares are returned as
    /// given; run [`SplitService::validate`] before accepting them.
    pub fn compute_shares(draft: &TransactionDraft, members: &Members) -> Result<ShareMap> {
        if members.is_empty() {
            return Err(LedgerError::NoMembers);
        }
        match Self::effective_policy(&draft.split, members) {
            SplitPolicy::Even => {
                let everyone: Vec<&MemberId> = members.keys().collect();
                Ok(Self::divide(draft, members, &everyone))
            }
            SplitPolicy::HostAll => Self::assign_to_role(draft, members, MemberRole::Host),
            SplitPolicy::GuestAll => Self::assign_to_role(draft, members, MemberRole::Guest),
            SplitPolicy::Custom(shares) => Ok(shares),
        }
    }

    /// Checks a draft against the membership before it may be appended.
    pub fn validate(draft: &TransactionDraft, members: &Members) -> Result<()> {
        if draft.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "transaction amount must be positive, got {}",
                draft.amount
            )));
        }
        if !members.contains_key(&draft.payer) {
            return Err(LedgerError::UnknownMember(draft.payer.to_string()));
        }
        if let SplitPolicy::Custom(shares) = &draft.split {
            Self::validate_custom(shares, draft.amount, &draft.currency, members)?;
        }
        Ok(())
    }

    /// Custom shares must reference members and add up to the amount at minor-unit precision.
    pub fn validate_custom(
        shares: &ShareMap,
        amount: Decimal,
        currency: &CurrencyCode,
        members: &Members,
    ) -> Result<()> {
        if let Some(unknown) = shares.keys().find(|id| !members.contains_key(*id)) {
            return Err(LedgerError::UnknownMember(unknown.to_string()));
        }
        if let Some((id, share)) = shares.iter().find(|(_, share)| share.is_sign_negative()) {
            return Err(LedgerError::InvalidAmount(format!(
                "share for {id} is negative: {share}"
            )));
        }
        let actual: Decimal = shares.values().copied().sum();
        if round_to_minor(actual, currency) != round_to_minor(amount, currency) {
            return Err(LedgerError::SplitMismatch {
                expected: amount,
                actual,
            });
        }
        Ok(())
    }

    fn assign_to_role(
        draft: &TransactionDraft,
        members: &Members,
        role: MemberRole,
    ) -> Result<ShareMap> {
        let holders: Vec<&MemberId> = members
            .iter()
            .filter(|(_, member)| member.role == role)
            .map(|(id, _)| id)
            .collect();
        if holders.is_empty() {
            return Err(LedgerError::MissingRole(role.label().to_string()));
        }
        Ok(Self::divide(draft, members, &holders))
    }

    /// Splits the amount among `participants`; everyone else owes zero.
    fn divide(draft: &TransactionDraft, members: &Members, participants: &[&MemberId]) -> ShareMap {
        let mut shares: ShareMap = members
            .keys()
            .map(|id| (id.clone(), Decimal::ZERO))
            .collect();
        let count = Decimal::from(participants.len());
        let base_share = floor_to_minor(draft.amount / count, &draft.currency);
        for id in participants {
            shares.insert((*id).clone(), base_share);
        }
        let remainder = draft.amount - base_share * count;
        if !remainder.is_zero() {
            let recipient = participants
                .iter()
                .find(|id| ***id == draft.payer)
                .or_else(|| participants.first())
                .map(|id| (*id).clone());
            if let Some(recipient) = recipient {
                *shares.entry(recipient).or_insert(Decimal::ZERO) += remainder;
            }
        }
        shares
    }
}
