#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use dho::common::names::{edges, groups, labels};
use dho::common::{Asset, Checksum256, Clock, DaoSettings, ManualClock, Name, TimePoint, TokioClock};
use dho::docgraph::{Content, ContentWrapper, Document, MemoryStorage};
use dho::governance::ProposalType;
use dho::payroll::{Assignment, Period};
use dho::Dao;

pub fn start() -> TimePoint {
    Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap()
}

pub fn name(s: &str) -> Name {
    Name::new(s).unwrap()
}

pub fn asset(s: &str) -> Asset {
    s.parse().unwrap()
}

pub fn details(items: Vec<Content>) -> ContentWrapper {
    ContentWrapper::new().with_group(groups::DETAILS, items)
}

pub enum TestClock {
    Manual(Arc<ManualClock>),
    /// Follows the paused tokio runtime
    Tokio(Arc<TokioClock>),
}

/// A DAO on in-memory storage with its own clock
pub struct TestDao {
    pub dao: Dao,
    pub clock: TestClock,
}

impl TestDao {
    pub async fn new() -> Self {
        Self::with_settings(DaoSettings::default()).await
    }

    pub async fn with_settings(settings: DaoSettings) -> Self {
        let clock = Arc::new(ManualClock::new(start()));
        let dao = Dao::open(Arc::new(MemoryStorage::new()), settings, clock.clone())
            .await
            .unwrap();
        Self {
            dao,
            clock: TestClock::Manual(clock),
        }
    }

    /// Must run inside a runtime with paused time
    pub async fn on_tokio_time() -> Self {
        let clock = Arc::new(TokioClock::new(start()));
        let dao = Dao::open(Arc::new(MemoryStorage::new()), DaoSettings::default(), clock.clone())
            .await
            .unwrap();
        Self {
            dao,
            clock: TestClock::Tokio(clock),
        }
    }

    pub fn now(&self) -> TimePoint {
        match &self.clock {
            TestClock::Manual(clock) => clock.now(),
            TestClock::Tokio(clock) => clock.now(),
        }
    }

    pub async fn advance(&self, by: Duration) {
        match &self.clock {
            TestClock::Manual(clock) => clock.advance(by),
            TestClock::Tokio(_) => tokio::time::advance(by.to_std().unwrap()).await,
        }
    }

    pub async fn set_time(&self, at: TimePoint) {
        let now = self.now();
        assert!(at >= now, "cannot move the clock back");
        self.advance(at - now).await;
    }

    /// Enroll `account` holding `voice` HVOICE
    pub async fn member(&self, account: &str, voice: &str) -> Name {
        let account = name(account);
        self.dao.enroll(&account).await.unwrap();
        self.dao.issue(&account, &asset(voice)).await.unwrap();
        account
    }

    /// `count` weekly periods, the first starting at `first_start`
    pub async fn weekly_periods(&self, first_start: TimePoint, count: usize) -> Vec<Period> {
        let mut periods: Vec<Period> = Vec::new();
        for i in 0..count {
            let start = first_start + Duration::days(7 * i as i64);
            let label = format!("Week {}", i + 1);
            let predecessor = periods.last().map(|p| p.hash);
            let period = self
                .dao
                .add_period(predecessor.as_ref(), start, &label)
                .await
                .unwrap();
            periods.push(period);
        }
        periods
    }

    pub fn voting_window(&self) -> Duration {
        Duration::seconds(DaoSettings::default().voting_duration_sec + 1)
    }

    /// Propose, vote `pass` as the proposer, wait out the vote and close
    pub async fn pass(&self, proposer: &Name, proposal_type: ProposalType, content: ContentWrapper) -> Document {
        let proposal = self.dao.propose(proposer, proposal_type, content).await.unwrap();
        self.dao.vote(proposer, &proposal.hash, "pass", "").await.unwrap();
        self.advance(self.voting_window()).await;
        let outcome = self.dao.close(proposer, &proposal.hash).await.unwrap();
        assert!(outcome.passed, "{} did not pass", proposal.hash);
        outcome.proposal
    }

    pub async fn role(&self, proposer: &Name, annual_usd: &str) -> Document {
        self.pass(
            proposer,
            ProposalType::Role,
            details(vec![
                Content::new(labels::TITLE, "Underwater Basketweaver"),
                Content::new(labels::DESCRIPTION, "Weaves baskets under water"),
                Content::new(labels::ANNUAL_USD_SALARY, asset(annual_usd)),
                Content::new(labels::MIN_TIME_SHARE, 50i64),
                Content::new(labels::MIN_DEFERRED, 50i64),
            ]),
        )
        .await
    }

    pub async fn assignment(
        &self,
        assignee: &Name,
        role: &Checksum256,
        start_period: &Checksum256,
        period_count: i64,
        time_share_x100: i64,
        deferred_perc_x100: i64,
    ) -> Assignment {
        let document = self
            .pass(
                assignee,
                ProposalType::Assignment,
                details(vec![
                    Content::new(labels::TITLE, format!("{} weaves", assignee)),
                    Content::new(labels::DESCRIPTION, "Takes the basketweaver role"),
                    Content::new(labels::ASSIGNEE, assignee.clone()),
                    Content::new(labels::ROLE, *role),
                    Content::new(labels::START_PERIOD, *start_period),
                    Content::new(labels::PERIOD_COUNT, period_count),
                    Content::new(labels::TIME_SHARE, time_share_x100),
                    Content::new(labels::DEFERRED, deferred_perc_x100),
                ]),
            )
            .await;
        Assignment::from_document(document).unwrap()
    }

    /// The assignment most recently linked from the root, after rewrites
    pub async fn latest_assignment(&self) -> Assignment {
        let edge = self
            .dao
            .graph()
            .get_last_edge_from(self.dao.root(), edges::ASSIGNMENT)
            .await
            .unwrap();
        self.dao.assignment(&edge.to_node).await.unwrap()
    }
}
