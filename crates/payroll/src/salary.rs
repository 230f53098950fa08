//! Per-period compensation derived from a role's annual salary
//!
//! All conversions truncate toward zero at the target token's precision.

use rust_decimal::Decimal;

use dho_common::names::labels;
use dho_common::{Asset, DaoSettings, Symbol};
use dho_docgraph::{Content, ContentWrapper};

use crate::error::{PayrollError, PayrollResult};

/// Length of one pay period as a fraction of a year (0.02026009582)
pub const PHASE_TO_YEAR_RATIO: Decimal = Decimal::from_parts(2_026_009_582, 0, 0, false, 11);

/// Inputs to the per-period split besides the USD amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryTerms {
    pub time_share_x100: i64,
    pub deferred_perc_x100: i64,
    pub hypha_deferral_factor_x100: i64,
    pub seeds_deferral_factor_x100: i64,
    pub seeds_per_usd: Option<Decimal>,
}

impl SalaryTerms {
    pub fn new(settings: &DaoSettings, time_share_x100: i64, deferred_perc_x100: i64) -> Self {
        Self {
            time_share_x100,
            deferred_perc_x100,
            hypha_deferral_factor_x100: settings.hypha_deferral_factor_x100,
            seeds_deferral_factor_x100: settings.seeds_deferral_factor_x100,
            seeds_per_usd: settings.seeds_per_usd,
        }
    }
}

/// Token amounts paid for one full period at the approved time share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSalary {
    /// USD value of a full-time period, before the time share is applied
    pub usd: Asset,
    pub husd: Asset,
    pub hypha: Asset,
    pub hvoice: Asset,
    pub seeds: Asset,
}

fn percent(value_x100: i64) -> Decimal {
    Decimal::new(value_x100, 2)
}

/// USD value of one period of a full-time annual salary
pub fn usd_per_period(annual_usd: &Asset) -> PayrollResult<Asset> {
    if annual_usd.symbol() != &Symbol::usd() {
        return Err(PayrollError::InvalidAssignment(format!(
            "annual salary must be denominated in USD, got {}",
            annual_usd
        )));
    }
    Ok(annual_usd.scale(PHASE_TO_YEAR_RATIO)?)
}

/// Split one period's USD value into the paid tokens
pub fn derive_period_salary(usd_per_period: &Asset, terms: &SalaryTerms) -> PayrollResult<PeriodSalary> {
    let committed = usd_per_period.scale(percent(terms.time_share_x100))?;
    let committed_usd = committed.to_decimal();

    let liquid = committed_usd * (Decimal::ONE - percent(terms.deferred_perc_x100));
    let husd = Asset::from_decimal(liquid, Symbol::husd())?;

    let deferred = committed.scale(percent(terms.deferred_perc_x100))?.to_decimal();
    let hypha = Asset::from_decimal(
        deferred * percent(terms.hypha_deferral_factor_x100),
        Symbol::hypha(),
    )?;

    let hvoice = Asset::from_decimal(committed_usd * Decimal::from(2), Symbol::hvoice())?;

    let seeds = match terms.seeds_per_usd {
        Some(price) => Asset::from_decimal(
            deferred * percent(terms.seeds_deferral_factor_x100) * price,
            Symbol::seeds(),
        )?,
        None => Asset::zero(Symbol::seeds()),
    };

    Ok(PeriodSalary {
        usd: usd_per_period.clone(),
        husd,
        hypha,
        hvoice,
        seeds,
    })
}

impl PeriodSalary {
    pub fn to_content(&self) -> Vec<Content> {
        vec![
            Content::new(labels::USD_SALARY_PER_PERIOD, self.usd.clone()),
            Content::new(labels::HUSD_SALARY_PER_PERIOD, self.husd.clone()),
            Content::new(labels::HYPHA_SALARY_PER_PERIOD, self.hypha.clone()),
            Content::new(labels::HVOICE_SALARY_PER_PERIOD, self.hvoice.clone()),
            Content::new(labels::SEEDS_SALARY_PER_PERIOD, self.seeds.clone()),
        ]
    }

    pub fn from_content(content: &ContentWrapper, group: &str) -> PayrollResult<Self> {
        Ok(Self {
            usd: content.get_asset(group, labels::USD_SALARY_PER_PERIOD)?.clone(),
            husd: content.get_asset(group, labels::HUSD_SALARY_PER_PERIOD)?.clone(),
            hypha: content.get_asset(group, labels::HYPHA_SALARY_PER_PERIOD)?.clone(),
            hvoice: content.get_asset(group, labels::HVOICE_SALARY_PER_PERIOD)?.clone(),
            seeds: content
                .opt_asset(group, labels::SEEDS_SALARY_PER_PERIOD)?
                .cloned()
                .unwrap_or_else(|| Asset::zero(Symbol::seeds())),
        })
    }

    /// The tokens actually paid, in payment order
    pub fn payable(&self) -> [&Asset; 4] {
        [&self.husd, &self.hypha, &self.hvoice, &self.seeds]
    }
}
