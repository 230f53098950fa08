//! Token balances paid out by the DAO
//!
//! The treasury stands in for the token contracts: it tracks a balance per
//! (account, symbol) and the issued supply per symbol. The whole ledger is
//! written through to storage after every change.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use dho_common::{Asset, Name, Symbol};
use dho_docgraph::{JsonStorage, Storage, StorageError};

use crate::error::{PayrollError, PayrollResult};

const LEDGER_KEY: &str = "treasury/ledger";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Ledger {
    balances: HashMap<Name, BTreeMap<String, Asset>>,
    supply: BTreeMap<String, Asset>,
}

pub struct Treasury {
    storage: Arc<dyn Storage>,
    ledger: RwLock<Ledger>,
}

impl Treasury {
    /// Open the treasury, loading any ledger already in `storage`
    pub async fn open(storage: Arc<dyn Storage>) -> PayrollResult<Self> {
        let ledger = match storage.get_json::<Ledger>(LEDGER_KEY).await {
            Ok(ledger) => {
                info!("Loaded treasury ledger with {} accounts", ledger.balances.len());
                ledger
            }
            Err(StorageError::KeyNotFound(_)) => Ledger::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            storage,
            ledger: RwLock::new(ledger),
        })
    }

    /// Mint `amount` into `to`'s balance
    pub async fn issue(&self, to: &Name, amount: &Asset) -> PayrollResult<()> {
        if amount.amount() < 0 {
            return Err(PayrollError::Treasury(format!(
                "cannot issue a negative amount: {}",
                amount
            )));
        }

        if let Some(expected) = Symbol::canonical(amount.symbol().code()) {
            if amount.symbol() != &expected {
                return Err(PayrollError::Treasury(format!(
                    "{} must be issued as {}",
                    amount, expected
                )));
            }
        }

        let mut ledger = self.ledger.write().await;
        let code = amount.symbol().code().to_string();

        let supply = match ledger.supply.get(&code) {
            Some(current) => current.checked_add(amount)?,
            None => amount.clone(),
        };
        let balance = match ledger.balances.get(to).and_then(|b| b.get(&code)) {
            Some(current) => current.checked_add(amount)?,
            None => amount.clone(),
        };

        let mut updated = ledger.clone();
        updated.supply.insert(code.clone(), supply);
        updated
            .balances
            .entry(to.clone())
            .or_default()
            .insert(code, balance);

        self.storage.put_json(LEDGER_KEY, &updated).await?;
        *ledger = updated;

        debug!("Issued {} to {}", amount, to);
        Ok(())
    }

    /// Balance of `account` in `symbol`, `None` if it never held any
    pub async fn balance(&self, account: &Name, symbol: &Symbol) -> Option<Asset> {
        self.ledger
            .read()
            .await
            .balances
            .get(account)
            .and_then(|b| b.get(symbol.code()))
            .cloned()
    }

    /// Total issued in `symbol`
    pub async fn supply(&self, symbol: &Symbol) -> Asset {
        self.ledger
            .read()
            .await
            .supply
            .get(symbol.code())
            .cloned()
            .unwrap_or_else(|| Asset::zero(symbol.clone()))
    }
}
