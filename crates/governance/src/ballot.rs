//! Vote documents
//!
//! ```text
//! member   --vote-->    vote    proposal --vote--> vote
//! vote     --ownedby--> member  vote --voteon--> proposal
//! ```
//!
//! Vote documents are content-addressed like everything else, so two
//! proposals may share one. A vote is only erased once no proposal points
//! at it.

use tracing::debug;

use dho_common::names::{edges, groups, labels, types};
use dho_common::{Asset, Checksum256, Name, TimePoint};
use dho_docgraph::{system_group, Content, ContentWrapper, Document, DocumentGraph};
use dho_payroll::{Member, PayrollContext};

use crate::{GovernanceError, GovernanceResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub hash: Checksum256,
    pub voter: Name,
    pub vote_power: Asset,
    pub vote: Name,
    pub date: TimePoint,
    pub notes: String,
}

impl Vote {
    pub fn content(
        voter: &Name,
        vote_power: &Asset,
        option: &Name,
        date: TimePoint,
        notes: &str,
    ) -> GovernanceResult<ContentWrapper> {
        let mut content = ContentWrapper::new().with_group(
            groups::VOTE,
            [
                Content::new(labels::VOTER, voter.clone()),
                Content::new(labels::VOTE_POWER, vote_power.clone()),
                Content::new(labels::VOTE, option.clone()),
                Content::new(labels::DATE, date),
                Content::new(labels::NOTES, notes),
            ],
        );
        content.push_group(system_group(types::VOTE, format!("Vote: {}", option))?);
        Ok(content)
    }

    pub fn from_document(document: &Document) -> GovernanceResult<Self> {
        if !document.is_type(types::VOTE) {
            return Err(GovernanceError::InvalidVote(format!("{} is not a vote", document.hash)));
        }
        let content = &document.content;
        Ok(Self {
            hash: document.hash,
            voter: content.get_name(groups::VOTE, labels::VOTER)?.clone(),
            vote_power: content.get_asset(groups::VOTE, labels::VOTE_POWER)?.clone(),
            vote: content.get_name(groups::VOTE, labels::VOTE)?.clone(),
            date: *content.get_time_point(groups::VOTE, labels::DATE)?,
            notes: content.get_str(groups::VOTE, labels::NOTES)?.to_string(),
        })
    }

    pub async fn load(graph: &DocumentGraph, hash: &Checksum256) -> GovernanceResult<Self> {
        Self::from_document(&graph.load_document(hash).await?)
    }
}

/// Current votes on `proposal`, oldest first
pub async fn votes_on(graph: &DocumentGraph, proposal: &Checksum256) -> GovernanceResult<Vec<Vote>> {
    let mut votes = Vec::new();
    for edge in graph.get_edges_from(proposal, edges::VOTE).await {
        votes.push(Vote::load(graph, &edge.to_node).await?);
    }
    Ok(votes)
}

/// Detach `vote` from `proposal`, erasing it if nothing else uses it
async fn remove_vote(
    graph: &DocumentGraph,
    proposal: &Checksum256,
    member: &Checksum256,
    vote: &Vote,
) -> GovernanceResult<()> {
    graph.erase_edge(proposal, &vote.hash, edges::VOTE).await?;
    graph.erase_edge(&vote.hash, proposal, edges::VOTE_ON).await?;

    if graph.get_edges_from(&vote.hash, edges::VOTE_ON).await.is_empty() {
        if graph.edge_exists(member, &vote.hash, edges::VOTE).await {
            graph.erase_edge(member, &vote.hash, edges::VOTE).await?;
        }
        if graph.edge_exists(&vote.hash, member, edges::OWNED_BY).await {
            graph.erase_edge(&vote.hash, member, edges::OWNED_BY).await?;
        }
        if !graph.has_edges(&vote.hash).await {
            graph.erase_document(&vote.hash).await?;
        }
    }

    debug!("Removed vote {} of {} on {}", vote.hash, vote.voter, proposal);
    Ok(())
}

/// Record `voter`'s vote on `proposal`, replacing any earlier one
pub async fn cast(
    ctx: &PayrollContext<'_>,
    proposal: &Checksum256,
    member: &Member,
    option: &Name,
    vote_power: &Asset,
    notes: &str,
) -> GovernanceResult<Vote> {
    for previous in votes_on(ctx.graph, proposal).await? {
        if previous.voter == member.account {
            remove_vote(ctx.graph, proposal, &member.hash, &previous).await?;
        }
    }

    let content = Vote::content(&member.account, vote_power, option, ctx.now, notes)?;
    let document = ctx.graph.create_document(&member.account, content, ctx.now).await?;
    let graph = ctx.graph;
    let creator = &member.account;

    graph.ensure_edge(creator, &member.hash, &document.hash, edges::VOTE, ctx.now).await?;
    graph.ensure_edge(creator, &document.hash, &member.hash, edges::OWNED_BY, ctx.now).await?;
    graph.create_edge(creator, proposal, &document.hash, edges::VOTE, ctx.now).await?;
    graph.create_edge(creator, &document.hash, proposal, edges::VOTE_ON, ctx.now).await?;

    Vote::from_document(&document)
}
