use async_trait::async_trait;

use dho_common::{Asset, Name, Symbol};
use dho_payroll::Treasury;

/// Where vote weight comes from
#[async_trait]
pub trait VotePowerSource: Send + Sync {
    /// Voice held by `voter`, `None` if they never held any
    async fn voice_balance(&self, voter: &Name) -> Option<Asset>;

    /// Voice in circulation, the base of the quorum
    async fn voice_supply(&self) -> Asset;
}

#[async_trait]
impl VotePowerSource for Treasury {
    async fn voice_balance(&self, voter: &Name) -> Option<Asset> {
        self.balance(voter, &Symbol::hvoice()).await
    }

    async fn voice_supply(&self) -> Asset {
        self.supply(&Symbol::hvoice()).await
    }
}
