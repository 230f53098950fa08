//! The DAO facade
//!
//! [`Dao`] owns the document graph, the treasury and the settings, and is the
//! only entry point for actions. Actions run one at a time under a single
//! lock and read "now" once from the configured [`Clock`].

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use dho_common::names::{edges, groups, labels, types};
use dho_common::{Asset, Checksum256, Clock, Configuration, DaoSettings, Name, TimePoint};
use dho_docgraph::{system_group, Content, ContentWrapper, Document, DocumentGraph, Storage};
use dho_governance::{
    AlignmentVoting, CloseOutcome, ProposalManager, ProposalType, ProposalView, VoteTally,
};
use dho_payroll::{
    self as payroll, Assignment, ClaimReceipt, Member, PayrollContext, Period, TimeShare, Treasury,
};

use crate::error::{DaoError, DaoResult};
use crate::retry::{retry, RetryPolicy};

fn root_content(dao_name: &Name) -> DaoResult<ContentWrapper> {
    let mut content = ContentWrapper::new()
        .with_group(groups::DETAILS, [Content::new(labels::ROOT_NODE, dao_name.clone())]);
    content.push_group(system_group(types::ROOT, dao_name.as_str())?);
    Ok(content)
}

fn settings_content(settings: &DaoSettings) -> DaoResult<ContentWrapper> {
    let mut details = vec![
        Content::new("voting_duration_sec", settings.voting_duration_sec),
        Content::new("default_period_count", settings.default_period_count),
        Content::new("seeds_deferral_factor_x100", settings.seeds_deferral_factor_x100),
        Content::new("hypha_deferral_factor_x100", settings.hypha_deferral_factor_x100),
        Content::new("voting_quorum_factor_x100", settings.voting_quorum_factor_x100),
        Content::new("voting_alignment_factor_x100", settings.voting_alignment_factor_x100),
        Content::new("hypha_token_contract", settings.hypha_token_contract.clone()),
        Content::new("hvoice_token_contract", settings.hvoice_token_contract.clone()),
        Content::new("husd_token_contract", settings.husd_token_contract.clone()),
        Content::new("seeds_token_contract", settings.seeds_token_contract.clone()),
        Content::new("treasury_contract", settings.treasury_contract.clone()),
        Content::new("seeds_escrow_contract", settings.seeds_escrow_contract.clone()),
        Content::new("publisher_contract", settings.publisher_contract.clone()),
        Content::new("paused", i64::from(settings.paused)),
    ];
    if let Some(price) = settings.seeds_per_usd {
        details.push(Content::new("seeds_per_usd", price.to_string()));
    }

    let mut content = ContentWrapper::new().with_group(groups::DETAILS, details);
    content.push_group(system_group(types::SETTINGS, "Settings")?);
    Ok(content)
}

pub struct Dao {
    graph: Arc<DocumentGraph>,
    treasury: Arc<Treasury>,
    settings: RwLock<DaoSettings>,
    clock: Arc<dyn Clock>,
    root: Checksum256,
    manager: ProposalManager,
    /// Serializes actions
    action_lock: Mutex<()>,
}

impl Dao {
    /// Open the DAO stored in `storage`, creating its root document on first use
    pub async fn open(
        storage: Arc<dyn Storage>,
        settings: DaoSettings,
        clock: Arc<dyn Clock>,
    ) -> DaoResult<Self> {
        settings.validate()?;

        let graph = Arc::new(DocumentGraph::open(storage.clone()).await?);
        let treasury = Arc::new(Treasury::open(storage).await?);
        let now = clock.now();

        let content = root_content(&settings.dao_name)?;
        let root_hash = Document::hash_content(&content)?;
        let root = if graph.document_exists(&root_hash).await {
            info!("Opened DAO {} at root {}", settings.dao_name, root_hash);
            root_hash
        } else {
            let root = graph.create_document(&settings.dao_name, content, now).await?;
            info!("Created DAO {} with root {}", settings.dao_name, root.hash);
            root.hash
        };

        let manager = ProposalManager::new(
            treasury.clone(),
            Box::new(AlignmentVoting::from_settings(&settings)),
        );

        let dao = Self {
            graph,
            treasury,
            settings: RwLock::new(settings.clone()),
            clock,
            root,
            manager,
            action_lock: Mutex::new(()),
        };
        dao.store_settings(&settings, now).await?;
        Ok(dao)
    }

    pub fn root(&self) -> &Checksum256 {
        &self.root
    }

    pub fn graph(&self) -> &DocumentGraph {
        &self.graph
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    pub fn now(&self) -> TimePoint {
        self.clock.now()
    }

    pub async fn settings(&self) -> DaoSettings {
        self.settings.read().await.clone()
    }

    /// Point `root --settings-->` at the document mirroring `settings`
    async fn store_settings(&self, settings: &DaoSettings, now: TimePoint) -> DaoResult<()> {
        let document = self
            .graph
            .create_document(&settings.dao_name, settings_content(settings)?, now)
            .await?;

        if let Some(previous) = self.graph.get_last_edge_from(&self.root, edges::SETTINGS).await {
            if previous.to_node == document.hash {
                return Ok(());
            }
            self.graph
                .erase_edge(&self.root, &previous.to_node, edges::SETTINGS)
                .await?;
            if !self.graph.has_edges(&previous.to_node).await {
                self.graph.erase_document(&previous.to_node).await?;
            }
        }
        self.graph
            .create_edge(&settings.dao_name, &self.root, &document.hash, edges::SETTINGS, now)
            .await?;
        Ok(())
    }

    /// Replace the settings; the DAO name is fixed at creation
    pub async fn set_settings(&self, settings: DaoSettings) -> DaoResult<()> {
        let _guard = self.action_lock.lock().await;
        settings.validate()?;

        let mut current = self.settings.write().await;
        if settings.dao_name != current.dao_name {
            return Err(dho_common::Error::configuration(format!(
                "dao_name is fixed to {}",
                current.dao_name
            ))
            .into());
        }

        self.store_settings(&settings, self.clock.now()).await?;
        self.manager
            .set_voting_scheme(Box::new(AlignmentVoting::from_settings(&settings)))
            .await;
        *current = settings;
        info!("Settings updated");
        Ok(())
    }

    pub async fn set_paused(&self, paused: bool) -> DaoResult<()> {
        let mut settings = self.settings().await;
        settings.paused = paused;
        self.set_settings(settings).await?;
        info!("DAO {}", if paused { "paused" } else { "resumed" });
        Ok(())
    }

    fn context<'a>(&'a self, settings: &'a DaoSettings) -> DaoResult<PayrollContext<'a>> {
        if settings.paused {
            warn!("Rejected action while paused");
            return Err(DaoError::Paused);
        }
        Ok(PayrollContext {
            graph: &self.graph,
            treasury: &self.treasury,
            settings,
            root: &self.root,
            now: self.clock.now(),
        })
    }

    pub async fn enroll(&self, account: &Name) -> DaoResult<Member> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(Member::enroll(ctx.graph, ctx.root, ctx.contract(), account, ctx.now).await?)
    }

    /// Mint `amount` to `account`
    pub async fn issue(&self, account: &Name, amount: &Asset) -> DaoResult<()> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        self.context(&settings)?;
        Ok(self.treasury.issue(account, amount).await?)
    }

    /// Append a period after `predecessor`, or start the chain when it is `None`
    pub async fn add_period(
        &self,
        predecessor: Option<&Checksum256>,
        start_time: TimePoint,
        label: &str,
    ) -> DaoResult<Period> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        let predecessor = predecessor.unwrap_or(ctx.root);
        Ok(Period::create(ctx.graph, ctx.root, ctx.contract(), predecessor, start_time, label, ctx.now).await?)
    }

    /// Append `count` periods of `duration` each after the last period, or
    /// starting now when there is none
    pub async fn add_periods(&self, count: usize, duration: Duration) -> DaoResult<Vec<Period>> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;

        let mut last = Period::last(ctx.graph, ctx.root).await?;
        let mut added = Vec::with_capacity(count);
        let mut index = self.graph.documents_of_type(types::PERIOD).await.len();
        for _ in 0..count {
            index += 1;
            let (predecessor, start) = match &last {
                Some(period) => (period.hash, period.start_time + duration),
                None => (*ctx.root, ctx.now),
            };
            let label = format!("Period {}", index);
            let period = Period::create(ctx.graph, ctx.root, ctx.contract(), &predecessor, start, &label, ctx.now).await?;
            last = Some(period.clone());
            added.push(period);
        }
        Ok(added)
    }

    pub async fn propose(
        &self,
        proposer: &Name,
        proposal_type: ProposalType,
        content: ContentWrapper,
    ) -> DaoResult<Document> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(self.manager.propose(&ctx, proposer, proposal_type, content).await?)
    }

    pub async fn propose_extension(
        &self,
        issuer: &Name,
        assignment: &Checksum256,
        additional_periods: i64,
    ) -> DaoResult<Document> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(self
            .manager
            .propose_extension(&ctx, issuer, assignment, additional_periods)
            .await?)
    }

    pub async fn vote(
        &self,
        voter: &Name,
        proposal: &Checksum256,
        option: &str,
        notes: &str,
    ) -> DaoResult<VoteTally> {
        let option = Name::new(option)?;
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(self.manager.vote(&ctx, voter, proposal, &option, notes).await?)
    }

    pub async fn close(&self, closer: &Name, proposal: &Checksum256) -> DaoResult<CloseOutcome> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(self.manager.close(&ctx, closer, proposal).await?)
    }

    pub async fn claim_next_period(&self, assignment: &Checksum256, claimer: &Name) -> DaoResult<ClaimReceipt> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(payroll::claim_next_period(&ctx, assignment, claimer).await?)
    }

    /// Claim, retrying while the next period has not ended yet
    pub async fn claim_next_period_with_retry(
        &self,
        assignment: &Checksum256,
        claimer: &Name,
        policy: &RetryPolicy,
    ) -> DaoResult<ClaimReceipt> {
        retry(policy, DaoError::is_retryable, move || {
            self.claim_next_period(assignment, claimer)
        })
        .await
    }

    pub async fn adjust_commitment(
        &self,
        issuer: &Name,
        assignment: &Checksum256,
        time_share_x100: i64,
        start: Option<TimePoint>,
    ) -> DaoResult<TimeShare> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(payroll::adjust_commitment(&ctx, issuer, assignment, time_share_x100, start).await?)
    }

    pub async fn adjust_deferred(
        &self,
        issuer: &Name,
        assignment: &Checksum256,
        deferred_perc_x100: i64,
    ) -> DaoResult<Assignment> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(payroll::adjust_deferred(&ctx, issuer, assignment, deferred_perc_x100).await?)
    }

    pub async fn withdraw_assignment(&self, owner: &Name, assignment: &Checksum256) -> DaoResult<Assignment> {
        let _guard = self.action_lock.lock().await;
        let settings = self.settings.read().await;
        let ctx = self.context(&settings)?;
        Ok(payroll::withdraw(&ctx, owner, assignment).await?)
    }

    pub async fn assignment(&self, hash: &Checksum256) -> DaoResult<Assignment> {
        Ok(Assignment::load(&self.graph, hash).await?)
    }

    pub async fn proposal(&self, hash: &Checksum256) -> DaoResult<ProposalView> {
        Ok(ProposalView::load(&self.graph, hash).await?)
    }
}
