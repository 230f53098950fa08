//! Badge pay coefficients
//!
//! A badge may scale the HYPHA, HUSD or HVOICE pay of its holders by a
//! coefficient in ten-thousandths (`12000` means +20%). A grant
//! (`member --assignbadge--> grant --badge--> badge`) is active for the
//! periods it covers.

use tracing::debug;

use dho_common::names::{edges, groups, labels, types};
use dho_common::{Asset, Checksum256, Symbol};
use dho_docgraph::{Document, DocumentGraph};

use crate::error::{PayrollError, PayrollResult};
use crate::period::Period;

pub const COEFFICIENT_BASE: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub hash: Checksum256,
    pub hypha_coefficient_x10000: Option<i64>,
    pub husd_coefficient_x10000: Option<i64>,
    pub hvoice_coefficient_x10000: Option<i64>,
}

impl Badge {
    pub fn from_document(document: &Document) -> PayrollResult<Self> {
        if !document.is_type(types::BADGE) {
            return Err(PayrollError::InvalidAssignment(format!(
                "{} is not a badge",
                document.hash
            )));
        }
        let content = &document.content;
        Ok(Self {
            hash: document.hash,
            hypha_coefficient_x10000: content.opt_i64(groups::DETAILS, labels::HYPHA_COEFFICIENT)?,
            husd_coefficient_x10000: content.opt_i64(groups::DETAILS, labels::HUSD_COEFFICIENT)?,
            hvoice_coefficient_x10000: content.opt_i64(groups::DETAILS, labels::HVOICE_COEFFICIENT)?,
        })
    }

    pub fn coefficient_for(&self, symbol: &Symbol) -> Option<i64> {
        if symbol == &Symbol::hypha() {
            self.hypha_coefficient_x10000
        } else if symbol == &Symbol::husd() {
            self.husd_coefficient_x10000
        } else if symbol == &Symbol::hvoice() {
            self.hvoice_coefficient_x10000
        } else {
            None
        }
    }
}

/// Badges whose grant to `member` covers `period`
pub async fn active_badges(
    graph: &DocumentGraph,
    member: &Checksum256,
    period: &Period,
) -> PayrollResult<Vec<Badge>> {
    let mut badges = Vec::new();

    for grant_edge in graph.get_edges_from(member, edges::ASSIGN_BADGE).await {
        let grant = graph.load_document(&grant_edge.to_node).await?;
        let start = *grant.content.get_checksum(groups::DETAILS, labels::START_PERIOD)?;
        let count = grant.content.get_i64(groups::DETAILS, labels::PERIOD_COUNT)?;

        let covered = Period::load(graph, &start).await?.walk(graph, count).await?;
        if !covered.iter().any(|p| p.hash == period.hash) {
            continue;
        }

        for badge_edge in graph.get_edges_from(&grant.hash, edges::BADGE).await {
            let badge = Badge::from_document(&graph.load_document(&badge_edge.to_node).await?)?;
            debug!("Badge {} active for period {}", badge.hash, period.label);
            badges.push(badge);
        }
    }

    Ok(badges)
}

/// Extra pay on top of `base` from every badge with a coefficient for its symbol
pub fn badge_bonus(badges: &[Badge], base: &Asset) -> PayrollResult<Asset> {
    let mut bonus = Asset::zero(base.symbol().clone());
    for badge in badges {
        if let Some(coefficient) = badge.coefficient_for(base.symbol()) {
            let extra = base.mul_ratio(
                i128::from(coefficient - COEFFICIENT_BASE),
                i128::from(COEFFICIENT_BASE),
            )?;
            bonus = bonus.checked_add(&extra)?;
        }
    }
    Ok(bonus)
}
