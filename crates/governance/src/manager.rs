//! Proposal lifecycle
//!
//! ```text
//! propose:  root --proposal--> p, member --owns--> p, p --ownedby--> member,
//!           p --votetally--> (zero tally)
//! vote:     see `ballot` and `tally`
//! close:    root --passedprops--> p   (type transition ran, p re-hashed)
//!           root --failedprops--> p
//!           root --proposal--> p is erased once the outcome is recorded
//! ```

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use dho_common::names::{edges, groups, labels};
use dho_common::{Checksum256, Name, Symbol, TimePoint};
use dho_docgraph::{content_group, system_group, Content, ContentWrapper, Document};
use dho_payroll::{Assignment, Member, PayrollContext};

use crate::ballot;
use crate::power::VotePowerSource;
use crate::proposal::ProposalView;
use crate::proposals::{extension_content, handler_for, ProposalType};
use crate::tally::{self, VoteTally};
use crate::voting::{VotingResult, VotingScheme, ABSTAIN, FAIL, PASS};
use crate::{GovernanceError, GovernanceResult};

/// Groups the engine writes; proposers may not supply them
const RESERVED_GROUPS: [&str; 3] = [groups::SYSTEM, groups::BALLOT, groups::BALLOT_OPTIONS];

#[derive(Debug, Clone)]
pub struct CloseOutcome {
    pub passed: bool,
    /// The proposal as stored after the close
    pub proposal: Document,
    pub result: VotingResult,
}

pub struct ProposalManager {
    /// Source of vote weight and supply
    power: Arc<dyn VotePowerSource>,
    /// Pass rule applied at close
    voting_scheme: Arc<RwLock<Box<dyn VotingScheme>>>,
}

fn first_str<'a>(content: &'a ContentWrapper, candidates: [&str; 2]) -> GovernanceResult<&'a str> {
    for label in candidates {
        if content.get(groups::DETAILS, label).is_some() {
            return Ok(content.get_str(groups::DETAILS, label)?);
        }
    }
    Err(GovernanceError::InvalidProposal(format!(
        "details must contain {} or {}",
        candidates[0], candidates[1]
    )))
}

fn ballot_option_names() -> GovernanceResult<Vec<Content>> {
    [PASS, ABSTAIN, FAIL]
        .iter()
        .map(|option| Ok(Content::new(*option, Name::new(*option)?)))
        .collect()
}

impl ProposalManager {
    pub fn new(power: Arc<dyn VotePowerSource>, voting_scheme: Box<dyn VotingScheme>) -> Self {
        Self {
            power,
            voting_scheme: Arc::new(RwLock::new(voting_scheme)),
        }
    }

    pub async fn set_voting_scheme(&self, voting_scheme: Box<dyn VotingScheme>) {
        debug!("Voting scheme set to {:?}", voting_scheme);
        *self.voting_scheme.write().await = voting_scheme;
    }

    /// Store a new proposal and open it for voting
    pub async fn propose(
        &self,
        ctx: &PayrollContext<'_>,
        proposer: &Name,
        proposal_type: ProposalType,
        mut content: ContentWrapper,
    ) -> GovernanceResult<Document> {
        let member = Member::require(ctx.graph, ctx.root, proposer, "only members can make proposals").await?;

        if let Some(group) = RESERVED_GROUPS.iter().find(|g| content.has_group(g)) {
            return Err(GovernanceError::InvalidProposal(format!(
                "the {} group is reserved",
                group
            )));
        }
        if !content.has_group(groups::DETAILS) {
            return Err(GovernanceError::InvalidProposal("details group is required".to_string()));
        }

        let handler = handler_for(proposal_type);
        handler.propose_impl(ctx, proposer, &mut content).await?;

        let title = first_str(&content, [labels::TITLE, labels::BALLOT_TITLE])?.to_string();
        let description = first_str(&content, [labels::DESCRIPTION, labels::BALLOT_DESCRIPTION])?.to_string();

        let mut system = system_group(proposal_type.as_str(), title.as_str())?;
        system.extend([
            Content::new(labels::DESCRIPTION, description),
            Content::new(labels::PROPOSER, proposer.clone()),
            Content::new(labels::CONTRACT_VERSION, env!("CARGO_PKG_VERSION")),
        ]);
        content.push_group(system);

        let expiration: TimePoint = ctx.now + chrono::Duration::seconds(ctx.settings.voting_duration_sec);
        content.push_group(content_group(
            groups::BALLOT,
            [Content::new(labels::EXPIRATION, expiration)],
        ));
        content.push_group(content_group(groups::BALLOT_OPTIONS, ballot_option_names()?));

        if ctx.graph.document_exists(&Document::hash_content(&content)?).await {
            return Err(GovernanceError::InvalidProposal(
                "an identical proposal already exists".to_string(),
            ));
        }

        let document = ctx.graph.create_document(proposer, content, ctx.now).await?;
        ctx.graph
            .create_edge(proposer, ctx.root, &document.hash, edges::PROPOSAL, ctx.now)
            .await?;
        ctx.graph
            .create_edge(proposer, &member.hash, &document.hash, edges::OWNS, ctx.now)
            .await?;
        ctx.graph
            .create_edge(proposer, &document.hash, &member.hash, edges::OWNED_BY, ctx.now)
            .await?;

        tally::update(ctx, &document).await?;
        handler.post_propose(ctx, &document).await?;

        info!(
            "{} proposed {} {} ({}), voting until {}",
            proposer, proposal_type, document.hash, title, expiration
        );
        Ok(document)
    }

    /// Propose adding `additional_periods` to an assignment
    pub async fn propose_extension(
        &self,
        ctx: &PayrollContext<'_>,
        issuer: &Name,
        assignment: &Checksum256,
        additional_periods: i64,
    ) -> GovernanceResult<Document> {
        let assignment = Assignment::load(ctx.graph, assignment).await?;
        if &assignment.assignee != issuer {
            return Err(GovernanceError::PermissionDenied(
                "Only the assignee can request an extension".to_string(),
            ));
        }
        Member::require(
            ctx.graph,
            ctx.root,
            issuer,
            "assignee must be a current member to request an extension",
        )
        .await?;

        let content = extension_content(&assignment, additional_periods)?;
        self.propose(ctx, issuer, ProposalType::Extension, content).await
    }

    /// Cast or replace `voter`'s vote and return the proposal's new tally
    pub async fn vote(
        &self,
        ctx: &PayrollContext<'_>,
        voter: &Name,
        proposal: &Checksum256,
        option: &Name,
        notes: &str,
    ) -> GovernanceResult<VoteTally> {
        let view = ProposalView::load(ctx.graph, proposal).await?;
        if !view.is_open(ctx.graph, ctx.root).await {
            warn!("{} voted on closed proposal {}", voter, proposal);
            return Err(GovernanceError::VotingClosed);
        }
        if view.is_expired(ctx.now) {
            return Err(GovernanceError::VotingExpired);
        }
        if !view.has_option(option) {
            return Err(GovernanceError::InvalidVote(option.to_string()));
        }

        let member = Member::require(ctx.graph, ctx.root, voter, "only members can vote").await?;
        let power = self
            .power
            .voice_balance(voter)
            .await
            .ok_or_else(|| GovernanceError::NoVoice(voter.to_string()))?;
        if power.symbol() != &Symbol::hvoice() {
            warn!("{} holds voice as {}", voter, power);
            return Err(GovernanceError::InvalidVotePower(format!(
                "{} must be {}",
                power,
                Symbol::hvoice()
            )));
        }

        let vote = ballot::cast(ctx, proposal, &member, option, &power, notes).await?;
        let tally = tally::update(ctx, &view.document).await?;

        info!("{} voted {} with {} on {}", voter, option, vote.vote_power, proposal);
        Ok(tally)
    }

    /// Close a proposal whose voting window has elapsed
    pub async fn close(
        &self,
        ctx: &PayrollContext<'_>,
        closer: &Name,
        proposal: &Checksum256,
    ) -> GovernanceResult<CloseOutcome> {
        let view = ProposalView::load(ctx.graph, proposal).await?;
        if !view.is_open(ctx.graph, ctx.root).await {
            return Err(GovernanceError::NotActive);
        }
        if !view.is_expired(ctx.now) {
            return Err(GovernanceError::VotingActive);
        }

        let tally = tally::current(ctx, proposal).await?;
        let supply = self.power.voice_supply().await;
        let result = self.voting_scheme.read().await.evaluate(&tally, &supply)?;
        debug!(
            "Closing {}: pass {} / fail {} / abstain {} of {}",
            proposal, result.pass_power, result.fail_power, result.abstain_power, result.supply
        );

        let handler = handler_for(view.proposal_type);
        if result.approved {
            handler.validate_pass(ctx, &view.document).await?;
        }

        let document = if result.approved {
            let mut content = view.document.content.clone();
            content.insert_or_replace(groups::SYSTEM, Content::new(labels::APPROVED_DATE, ctx.now));
            handler.pass_impl(ctx, &view.document, &mut content).await?;

            let passed = ctx.graph.update_document(&view.document, content).await?;
            ctx.graph.erase_edge(ctx.root, &passed.hash, edges::PROPOSAL).await?;
            ctx.graph
                .create_edge(ctx.contract(), ctx.root, &passed.hash, edges::PASSED_PROPS, ctx.now)
                .await?;
            passed
        } else {
            ctx.graph.erase_edge(ctx.root, proposal, edges::PROPOSAL).await?;
            ctx.graph
                .create_edge(ctx.contract(), ctx.root, proposal, edges::FAILED_PROPS, ctx.now)
                .await?;
            view.document.clone()
        };

        info!(
            "{} closed {} {}: {}",
            closer,
            view.proposal_type,
            document.hash,
            if result.approved { "passed" } else { "failed" }
        );

        Ok(CloseOutcome {
            passed: result.approved,
            proposal: document,
            result,
        })
    }
}
