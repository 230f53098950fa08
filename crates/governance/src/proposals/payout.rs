use async_trait::async_trait;
use tracing::info;

use dho_common::names::{edges, groups, labels};
use dho_common::{Asset, Name, Symbol};
use dho_docgraph::{ContentWrapper, Document};
use dho_payroll::{ensure_payable, make_payment, Member, PayrollContext};

use super::{invalid, ProposalHandler, ProposalType};
use crate::GovernanceResult;

/// One-off payment to a member
pub struct PayoutProposal;

fn amount_labels() -> [(&'static str, Symbol); 4] {
    [
        (labels::HUSD_AMOUNT, Symbol::husd()),
        (labels::HYPHA_AMOUNT, Symbol::hypha()),
        (labels::HVOICE_AMOUNT, Symbol::hvoice()),
        (labels::SEEDS_AMOUNT, Symbol::seeds()),
    ]
}

/// The requested amounts that are present, in payment order
fn requested(content: &ContentWrapper) -> GovernanceResult<Vec<Asset>> {
    let mut amounts = Vec::new();
    for (label, symbol) in amount_labels() {
        if let Some(amount) = content.opt_asset(groups::DETAILS, label)? {
            if amount.symbol() != &symbol {
                return Err(invalid(format!("{} must be {}, got {}", label, symbol, amount)));
            }
            if amount.amount() < 0 {
                return Err(invalid(format!("{} cannot be negative", label)));
            }
            amounts.push(amount.clone());
        }
    }
    Ok(amounts)
}

fn memo(proposal: &Document, amount: &Asset) -> String {
    format!(
        "Payout: {}; {}",
        proposal.node_label().unwrap_or_default(),
        amount.symbol().code()
    )
}

#[async_trait]
impl ProposalHandler for PayoutProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::Payout
    }

    async fn propose_impl(
        &self,
        ctx: &PayrollContext<'_>,
        _proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let recipient = content.get_name(groups::DETAILS, labels::RECIPIENT)?.clone();
        Member::require(ctx.graph, ctx.root, &recipient, "only members can receive payouts").await?;

        if !requested(content)?.iter().any(Asset::is_positive) {
            return Err(invalid("a payout must request a positive amount"));
        }
        Ok(())
    }

    async fn validate_pass(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        let recipient = proposal.content.get_name(groups::DETAILS, labels::RECIPIENT)?;
        Member::require(ctx.graph, ctx.root, recipient, "only members can receive payouts").await?;
        for amount in requested(&proposal.content)? {
            ensure_payable(ctx, &proposal.hash, recipient, &amount, &memo(proposal, &amount)).await?;
        }
        Ok(())
    }

    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        _content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let recipient = proposal.content.get_name(groups::DETAILS, labels::RECIPIENT)?;
        let member = Member::require(ctx.graph, ctx.root, recipient, "only members can receive payouts").await?;

        ctx.graph
            .create_edge(ctx.contract(), ctx.root, &proposal.hash, edges::PAYOUT, ctx.now)
            .await?;
        ctx.graph
            .create_edge(ctx.contract(), &member.hash, &proposal.hash, edges::PAYOUT, ctx.now)
            .await?;

        for amount in requested(&proposal.content)? {
            make_payment(ctx, &proposal.hash, recipient, &amount, &memo(proposal, &amount)).await?;
        }

        info!("Payout {} to {} executed", proposal.hash, recipient);
        Ok(())
    }
}
