//! Vote tally engine
//!
//! A tally holds one group per ballot option with the summed vote power,
//! plus a `system` group. It carries nothing proposal specific, so equal
//! tallies hash to the same document: every unvoted proposal points at the
//! one zero tally, and proposals whose votes add up the same converge on a
//! shared tally again.

use tracing::debug;

use dho_common::names::{edges, groups, labels, types};
use dho_common::{Asset, Checksum256, Name, Symbol};
use dho_docgraph::{content_group, group_label, system_group, Content, ContentWrapper, Document};
use dho_payroll::PayrollContext;

use crate::ballot::votes_on;
use crate::proposal::ballot_options;
use crate::{GovernanceError, GovernanceResult};

pub const TALLY_LABEL: &str = "VoteTally";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    pub hash: Checksum256,
    /// Power per option, in ballot order
    pub powers: Vec<(Name, Asset)>,
}

impl VoteTally {
    pub fn content(powers: &[(Name, Asset)]) -> GovernanceResult<ContentWrapper> {
        let mut content = ContentWrapper::new();
        for (option, power) in powers {
            content.push_group(content_group(
                option.as_str(),
                [Content::new(labels::VOTE_POWER, power.clone())],
            ));
        }
        content.push_group(system_group(types::VOTE_TALLY, TALLY_LABEL)?);
        Ok(content)
    }

    pub fn from_document(document: &Document) -> GovernanceResult<Self> {
        if !document.is_type(types::VOTE_TALLY) {
            return Err(GovernanceError::InvalidVote(format!(
                "{} is not a vote tally",
                document.hash
            )));
        }

        let mut powers = Vec::new();
        for group in document.content.groups() {
            let label = match group_label(group) {
                Some(label) if label != groups::SYSTEM => label,
                _ => continue,
            };
            let option = Name::new(label)?;
            let power = document.content.get_asset(label, labels::VOTE_POWER)?.clone();
            powers.push((option, power));
        }

        Ok(Self {
            hash: document.hash,
            powers,
        })
    }

    /// Power behind `option`; zero when it is not on the ballot
    pub fn power_of(&self, option: &str) -> Asset {
        self.powers
            .iter()
            .find(|(name, _)| name.as_str() == option)
            .map(|(_, power)| power.clone())
            .unwrap_or_else(|| Asset::zero(Symbol::hvoice()))
    }

    pub fn total(&self) -> GovernanceResult<Asset> {
        let mut total = Asset::zero(Symbol::hvoice());
        for (_, power) in &self.powers {
            total = total.checked_add(power)?;
        }
        Ok(total)
    }
}

/// Sum the current votes on `proposal` per ballot option
pub async fn compute(ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<Vec<(Name, Asset)>> {
    let mut powers: Vec<(Name, Asset)> = ballot_options(proposal)?
        .into_iter()
        .map(|option| (option, Asset::zero(Symbol::hvoice())))
        .collect();

    for vote in votes_on(ctx.graph, &proposal.hash).await? {
        match powers.iter_mut().find(|(option, _)| option == &vote.vote) {
            Some((_, power)) => *power = power.checked_add(&vote.vote_power)?,
            None => {
                return Err(GovernanceError::InvalidVote(format!(
                    "vote {} is for {}, which is not on the ballot",
                    vote.hash, vote.vote
                )))
            }
        }
    }
    Ok(powers)
}

/// Recompute the tally of `proposal` and point the proposal at it
///
/// The previous tally document is erased once nothing references it.
pub async fn update(ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<VoteTally> {
    let powers = compute(ctx, proposal).await?;
    let content = VoteTally::content(&powers)?;
    let tally = ctx.graph.create_document(ctx.contract(), content, ctx.now).await?;

    let previous = ctx.graph.get_last_edge_from(&proposal.hash, edges::VOTE_TALLY).await;
    match previous {
        Some(edge) if edge.to_node == tally.hash => {
            debug!("Tally of {} unchanged: {}", proposal.hash, tally.hash);
        }
        _ => {
            if let Some(edge) = previous {
                ctx.graph
                    .erase_edge(&proposal.hash, &edge.to_node, edges::VOTE_TALLY)
                    .await?;
                if !ctx.graph.has_edges(&edge.to_node).await {
                    ctx.graph.erase_document(&edge.to_node).await?;
                    debug!("Erased unreferenced tally {}", edge.to_node);
                }
            }
            ctx.graph
                .create_edge(ctx.contract(), &proposal.hash, &tally.hash, edges::VOTE_TALLY, ctx.now)
                .await?;
            debug!("Tally of {} is now {}", proposal.hash, tally.hash);
        }
    }

    VoteTally::from_document(&tally)
}

/// The tally `proposal` currently points at
pub async fn current(ctx: &PayrollContext<'_>, proposal: &Checksum256) -> GovernanceResult<VoteTally> {
    match ctx.graph.get_last_document_of_edge(proposal, edges::VOTE_TALLY).await? {
        Some(document) => VoteTally::from_document(&document),
        None => Err(GovernanceError::InvalidProposal(format!(
            "proposal {} has no vote tally",
            proposal
        ))),
    }
}
