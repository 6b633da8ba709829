//! Building the holder balance set from boundary records.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use arckana_core::{Address, ArckanaError, DuplicatePolicy, Result, U256};

/// Collect `(holder, balance)` records into a deduplicated balance set.
///
/// Records are applied in the order given; the result is keyed by address
/// so later stages never observe input order. Repeated addresses follow
/// `policy`.
pub fn collect_balances<I>(records: I, policy: DuplicatePolicy) -> Result<BTreeMap<Address, U256>>
where
    I: IntoIterator<Item = (Address, U256)>,
{
    let mut balances: BTreeMap<Address, U256> = BTreeMap::new();

    for (holder, balance) in records {
        let Some(existing) = balances.get_mut(&holder) else {
            balances.insert(holder, balance);
            continue;
        };

        match policy {
            DuplicatePolicy::LastWins => {
                warn!(
                    "Duplicate holder {}: balance {} replaces {}",
                    holder, balance, existing
                );
                *existing = balance;
            }
            DuplicatePolicy::Merge => {
                let merged = existing
                    .checked_add(balance)
                    .ok_or_else(|| ArckanaError::BalanceOverflow(holder.to_string()))?;
                debug!("Merged duplicate holder {}: {} + {}", holder, existing, balance);
                *existing = merged;
            }
            DuplicatePolicy::Reject => {
                return Err(ArckanaError::DuplicateHolder(holder.to_string()));
            }
        }
    }

    Ok(balances)
}
