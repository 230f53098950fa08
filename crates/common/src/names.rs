//! Well-known edge names, content group labels, item labels and document types

/// Edge names
pub mod edges {
    pub const START: &str = "start";
    pub const NEXT: &str = "next";
    pub const PERIOD: &str = "period";
    pub const MEMBER: &str = "member";
    pub const SETTINGS: &str = "settings";

    pub const PROPOSAL: &str = "proposal";
    pub const OWNS: &str = "owns";
    pub const OWNED_BY: &str = "ownedby";
    pub const PASSED_PROPS: &str = "passedprops";
    pub const FAILED_PROPS: &str = "failedprops";
    pub const ORIGINAL: &str = "original";
    pub const SUSPEND: &str = "suspend";

    pub const VOTE: &str = "vote";
    pub const VOTE_ON: &str = "voteon";
    pub const VOTE_TALLY: &str = "votetally";

    pub const ROLE: &str = "role";
    pub const ASSIGNMENT: &str = "assignment";
    pub const ASSIGNED: &str = "assigned";
    pub const ASSIGNEE: &str = "assignee";
    pub const INIT_TIME_SHARE: &str = "initimeshare";
    pub const CURRENT_TIME_SHARE: &str = "curtimeshare";
    pub const LAST_TIME_SHARE: &str = "lasttimeshare";
    pub const NEXT_TIME_SHARE: &str = "nextimeshare";
    pub const CLAIMED: &str = "claimed";
    pub const PAYMENT: &str = "payment";

    pub const BADGE: &str = "badge";
    pub const HOLDS_BADGE: &str = "holdsbadge";
    pub const HELD_BY: &str = "heldby";
    pub const ASSIGN_BADGE: &str = "assignbadge";

    pub const PAYOUT: &str = "payout";
    pub const ATTESTATION: &str = "attestation";
}

/// Content group labels
pub mod groups {
    pub const CONTENT_GROUP_LABEL: &str = "content_group_label";
    pub const DETAILS: &str = "details";
    pub const SYSTEM: &str = "system";
    pub const BALLOT: &str = "ballot";
    pub const BALLOT_OPTIONS: &str = "ballot_options";
    pub const VOTE: &str = "vote";
}

/// Content item labels
pub mod labels {
    pub const TYPE: &str = "type";
    pub const NODE_LABEL: &str = "node_label";
    pub const ROOT_NODE: &str = "root_node";

    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const BALLOT_TITLE: &str = "ballot_title";
    pub const BALLOT_DESCRIPTION: &str = "ballot_description";
    pub const PROPOSER: &str = "proposer";
    pub const EXPIRATION: &str = "expiration";
    pub const APPROVED_DATE: &str = "approved_date";
    pub const ORIGINAL_DOCUMENT: &str = "original_document";
    pub const CONTRACT_VERSION: &str = "contract_version";

    pub const VOTER: &str = "voter";
    pub const VOTE_POWER: &str = "vote_power";
    pub const VOTE: &str = "vote";
    pub const DATE: &str = "date";
    pub const NOTES: &str = "notes";

    pub const MEMBER: &str = "member";
    pub const START_TIME: &str = "start_time";
    pub const LABEL: &str = "label";

    pub const ANNUAL_USD_SALARY: &str = "annual_usd_salary";
    pub const MIN_TIME_SHARE: &str = "min_time_share_x100";
    pub const MIN_DEFERRED: &str = "min_deferred_x100";

    pub const ASSIGNEE: &str = "assignee";
    pub const ROLE: &str = "role";
    pub const START_PERIOD: &str = "start_period";
    pub const PERIOD_COUNT: &str = "period_count";
    pub const TIME_SHARE: &str = "time_share_x100";
    pub const DEFERRED: &str = "deferred_perc_x100";
    pub const APPROVED_DEFERRED: &str = "approved_deferred_perc_x100";
    pub const USD_SALARY_PER_PERIOD: &str = "usd_salary_value_per_phase";
    pub const HUSD_SALARY_PER_PERIOD: &str = "husd_salary_per_phase";
    pub const HYPHA_SALARY_PER_PERIOD: &str = "hypha_salary_per_phase";
    pub const HVOICE_SALARY_PER_PERIOD: &str = "hvoice_salary_per_phase";
    pub const SEEDS_SALARY_PER_PERIOD: &str = "seeds_salary_per_phase";
    pub const STATE: &str = "state";
    pub const START_DATE: &str = "start_date";
    pub const ASSIGNMENT: &str = "assignment";

    pub const BADGE: &str = "badge";
    pub const HYPHA_COEFFICIENT: &str = "hypha_coefficient_x10000";
    pub const HUSD_COEFFICIENT: &str = "husd_coefficient_x10000";
    pub const HVOICE_COEFFICIENT: &str = "hvoice_coefficient_x10000";

    pub const RECIPIENT: &str = "recipient";
    pub const AMOUNT: &str = "amount";
    pub const MEMO: &str = "memo";
    pub const PAYMENT_DATE: &str = "payment_date";
    pub const PAID_FROM: &str = "paid_from";
    pub const HUSD_AMOUNT: &str = "husd_amount";
    pub const HYPHA_AMOUNT: &str = "hypha_amount";
    pub const HVOICE_AMOUNT: &str = "hvoice_amount";
    pub const SEEDS_AMOUNT: &str = "seeds_amount";
}

/// Values of the `system.type` item
pub mod types {
    pub const ROOT: &str = "dho";
    pub const MEMBER: &str = "member";
    pub const SETTINGS: &str = "settings";
    pub const PERIOD: &str = "period";
    pub const VOTE: &str = "vote";
    pub const VOTE_TALLY: &str = "vote.tally";
    pub const TIME_SHARE: &str = "timeshare";
    pub const PAYMENT: &str = "payment";

    pub const ROLE: &str = "role";
    pub const ASSIGNMENT: &str = "assignment";
    pub const BADGE: &str = "badge";
    pub const ASSIGN_BADGE: &str = "assignbadge";
    pub const PAYOUT: &str = "payout";
    pub const EDIT: &str = "edit";
    pub const EXTENSION: &str = "extension";
    pub const SUSPEND: &str = "suspend";
    pub const ATTESTATION: &str = "attestation";
}
