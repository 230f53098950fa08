//! Read-only view over an assignment document

use std::fmt;
use std::str::FromStr;

use dho_common::names::{edges, groups, labels, types};
use dho_common::{Checksum256, Name, TimePoint};
use dho_docgraph::{Document, DocumentGraph};

use crate::error::{PayrollError, PayrollResult};
use crate::period::Period;
use crate::proration::CommitmentSegment;
use crate::salary::PeriodSalary;
use crate::time_share::TimeShare;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentState {
    Proposed,
    Approved,
    Withdrawed,
    Suspended,
}

impl AssignmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentState::Proposed => "proposed",
            AssignmentState::Approved => "approved",
            AssignmentState::Withdrawed => "withdrawed",
            AssignmentState::Suspended => "suspended",
        }
    }

    /// States in which the assignee can no longer change the assignment
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentState::Withdrawed | AssignmentState::Suspended)
    }
}

impl fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentState {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proposed" => Ok(AssignmentState::Proposed),
            "approved" => Ok(AssignmentState::Approved),
            "withdrawed" => Ok(AssignmentState::Withdrawed),
            "suspended" => Ok(AssignmentState::Suspended),
            other => Err(PayrollError::InvalidAssignment(format!(
                "unknown assignment state: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub document: Document,
    pub assignee: Name,
    pub role: Checksum256,
    pub start_period: Checksum256,
    pub period_count: i64,
    /// Approved commitment; adjustments never exceed it
    pub time_share_x100: i64,
    pub deferred_perc_x100: i64,
    pub approved_deferred_perc_x100: i64,
    pub salary: PeriodSalary,
    pub state: AssignmentState,
    pub approved_date: Option<TimePoint>,
}

impl Assignment {
    pub fn from_document(document: Document) -> PayrollResult<Self> {
        if !document.is_type(types::ASSIGNMENT) {
            return Err(PayrollError::InvalidAssignment(format!(
                "{} is not an assignment",
                document.hash
            )));
        }

        let content = &document.content;
        let deferred_perc_x100 = content.get_i64(groups::DETAILS, labels::DEFERRED)?;
        let approved_deferred_perc_x100 = content
            .opt_i64(groups::DETAILS, labels::APPROVED_DEFERRED)?
            .unwrap_or(deferred_perc_x100);
        let approved_date = match content.get(groups::SYSTEM, labels::APPROVED_DATE) {
            Some(_) => Some(*content.get_time_point(groups::SYSTEM, labels::APPROVED_DATE)?),
            None => None,
        };

        Ok(Self {
            assignee: content.get_name(groups::DETAILS, labels::ASSIGNEE)?.clone(),
            role: *content.get_checksum(groups::DETAILS, labels::ROLE)?,
            start_period: *content.get_checksum(groups::DETAILS, labels::START_PERIOD)?,
            period_count: content.get_i64(groups::DETAILS, labels::PERIOD_COUNT)?,
            time_share_x100: content.get_i64(groups::DETAILS, labels::TIME_SHARE)?,
            deferred_perc_x100,
            approved_deferred_perc_x100,
            salary: PeriodSalary::from_content(content, groups::DETAILS)?,
            state: content.get_str(groups::DETAILS, labels::STATE)?.parse()?,
            approved_date,
            document,
        })
    }

    pub async fn load(graph: &DocumentGraph, hash: &Checksum256) -> PayrollResult<Self> {
        Self::from_document(graph.load_document(hash).await?)
    }

    pub fn hash(&self) -> &Checksum256 {
        &self.document.hash
    }

    /// Approval time, which is also the start of the initial commitment
    pub fn approved_at(&self) -> PayrollResult<TimePoint> {
        self.approved_date.ok_or_else(|| {
            PayrollError::InvalidAssignment(format!("assignment {} has not been approved", self.hash()))
        })
    }

    /// The periods covered by the assignment that exist so far, in order
    pub async fn periods(&self, graph: &DocumentGraph) -> PayrollResult<Vec<Period>> {
        let first = Period::load(graph, &self.start_period).await?;
        first.walk(graph, self.period_count).await
    }

    /// End of the assignment's last period, once that period is closed
    pub async fn expiration(&self, graph: &DocumentGraph) -> PayrollResult<Option<TimePoint>> {
        let periods = self.periods(graph).await?;
        if (periods.len() as i64) < self.period_count {
            return Ok(None);
        }
        match periods.last() {
            Some(last) => last.end_time(graph).await,
            None => Ok(None),
        }
    }

    pub async fn is_expired(&self, graph: &DocumentGraph, now: TimePoint) -> PayrollResult<bool> {
        Ok(matches!(self.expiration(graph).await?, Some(end) if end <= now))
    }

    /// Commitment history from the initial time share onwards
    pub async fn time_shares(&self, graph: &DocumentGraph) -> PayrollResult<Vec<TimeShare>> {
        let mut shares = Vec::new();
        let mut current = match graph.get_last_edge_from(self.hash(), edges::INIT_TIME_SHARE).await {
            Some(edge) => Some(TimeShare::load(graph, &edge.to_node).await?),
            None => None,
        };
        while let Some(share) = current {
            current = share.next(graph).await?;
            shares.push(share);
        }
        Ok(shares)
    }

    pub async fn last_time_share(&self, graph: &DocumentGraph) -> PayrollResult<TimeShare> {
        match graph.get_last_edge_from(self.hash(), edges::LAST_TIME_SHARE).await {
            Some(edge) => TimeShare::load(graph, &edge.to_node).await,
            None => Err(PayrollError::InvalidAssignment(format!(
                "assignment {} has no commitment history",
                self.hash()
            ))),
        }
    }

    pub async fn current_time_share(&self, graph: &DocumentGraph) -> PayrollResult<Option<TimeShare>> {
        match graph.get_last_edge_from(self.hash(), edges::CURRENT_TIME_SHARE).await {
            Some(edge) => TimeShare::load(graph, &edge.to_node).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn segments(&self, graph: &DocumentGraph) -> PayrollResult<Vec<CommitmentSegment>> {
        Ok(self
            .time_shares(graph)
            .await?
            .into_iter()
            .map(|share| CommitmentSegment::new(share.start_date, share.time_share_x100))
            .collect())
    }

    pub async fn is_claimed(&self, graph: &DocumentGraph, period: &Checksum256) -> bool {
        graph.edge_exists(self.hash(), period, edges::CLAIMED).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_strings() {
        for state in [
            AssignmentState::Proposed,
            AssignmentState::Approved,
            AssignmentState::Withdrawed,
            AssignmentState::Suspended,
        ] {
            assert_eq!(state.as_str().parse::<AssignmentState>().unwrap(), state);
        }
        assert!("active".parse::<AssignmentState>().is_err());
        assert!(!AssignmentState::Approved.is_terminal());
        assert!(AssignmentState::Withdrawed.is_terminal());
        assert!(AssignmentState::Suspended.is_terminal());
    }
}
