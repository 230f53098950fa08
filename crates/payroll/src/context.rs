use dho_common::{Checksum256, DaoSettings, Name, TimePoint};
use dho_docgraph::DocumentGraph;

use crate::treasury::Treasury;

/// Everything a payroll action reads: the graph, balances, settings, the
/// root document and the action's timestamp
#[derive(Clone, Copy)]
pub struct PayrollContext<'a> {
    pub graph: &'a DocumentGraph,
    pub treasury: &'a Treasury,
    pub settings: &'a DaoSettings,
    pub root: &'a Checksum256,
    pub now: TimePoint,
}

impl<'a> PayrollContext<'a> {
    /// Account recorded as creator of documents written on the DAO's behalf
    pub fn contract(&self) -> &'a Name {
        &self.settings.dao_name
    }
}
