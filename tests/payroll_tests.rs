mod common;

use std::time::Duration as StdDuration;

use chrono::Duration;

use common::{asset, details, name, start, TestDao};
use dho::common::names::{edges, groups, labels};
use dho::common::Symbol;
use dho::docgraph::Content;
use dho::governance::ProposalType;
use dho::payroll::{AssignmentState, PayrollError};
use dho::{DaoError, RetryPolicy};

struct Staffed {
    t: TestDao,
    bob: dho::common::Name,
    assignment: dho::payroll::Assignment,
    periods: Vec<dho::payroll::Period>,
}

/// Bob on a 150000 USD role at 100% time share and 100% deferred for 9 weekly
/// periods, the first starting a day after the vote
async fn staffed() -> Staffed {
    staffed_on(TestDao::new().await).await
}

async fn staffed_on(t: TestDao) -> Staffed {
    let alice = t.member("alice", "100.00 HVOICE").await;
    let bob = t.member("bob", "100.00 HVOICE").await;
    let periods = t.weekly_periods(start() + Duration::days(1), 10).await;

    let role = t.role(&alice, "150000.00 USD").await;
    let assignment = t.assignment(&bob, &role.hash, &periods[0].hash, 9, 100, 100).await;
    assert_eq!(assignment.state, AssignmentState::Approved);

    Staffed {
        t,
        bob,
        assignment,
        periods,
    }
}

#[test_log::test(tokio::test)]
async fn test_full_period_pays_the_derived_salary() {
    let s = staffed().await;
    assert_eq!(s.assignment.salary.usd, asset("3039.01 USD"));
    assert_eq!(s.assignment.salary.husd, asset("0.00 HUSD"));

    s.t.set_time(s.periods[1].start_time + Duration::seconds(1)).await;
    let receipt = s
        .t
        .dao
        .claim_next_period(s.assignment.hash(), &s.bob)
        .await
        .unwrap();

    assert_eq!(receipt.period.hash, s.periods[0].hash);
    assert_eq!(receipt.fraction.to_string(), "1.0000");
    assert_eq!(receipt.amount_of("HYPHA"), Some(&asset("759.75 HYPHA")));
    assert_eq!(receipt.amount_of("HVOICE"), Some(&asset("6078.02 HVOICE")));
    assert!(receipt.amount_of("HUSD").is_none());
    assert!(receipt.amount_of("SEEDS").is_none());

    let treasury = s.t.dao.treasury();
    assert_eq!(
        treasury.balance(&s.bob, &Symbol::hvoice()).await,
        Some(asset("6178.02 HVOICE"))
    );
    assert_eq!(
        treasury.balance(&s.bob, &Symbol::hypha()).await,
        Some(asset("759.75 HYPHA"))
    );

    let graph = s.t.dao.graph();
    assert!(graph.edge_exists(s.assignment.hash(), &s.periods[0].hash, edges::CLAIMED).await);
    assert_eq!(graph.get_edges_from(&s.periods[0].hash, edges::PAYMENT).await.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_halved_commitment_mid_period() {
    let s = staffed().await;
    let period = &s.periods[0];
    let midpoint = period.start_time + Duration::hours(84);

    s.t.dao
        .adjust_commitment(&s.bob, s.assignment.hash(), 50, Some(midpoint))
        .await
        .unwrap();

    s.t.set_time(s.periods[1].start_time).await;
    let receipt = s
        .t
        .dao
        .claim_next_period(s.assignment.hash(), &s.bob)
        .await
        .unwrap();

    assert_eq!(receipt.fraction.to_string(), "0.7500");
    assert_eq!(receipt.amount_of("HYPHA"), Some(&asset("569.81 HYPHA")));
}

#[test_log::test(tokio::test)]
async fn test_commitment_in_thirds() {
    let s = staffed().await;
    let period = &s.periods[0];
    let third = Duration::milliseconds(7 * 24 * 3600 * 1000 / 3);

    for (share, at) in [
        (50, period.start_time),
        (100, period.start_time + third),
        (75, period.start_time + third + third),
    ] {
        s.t.dao
            .adjust_commitment(&s.bob, s.assignment.hash(), share, Some(at))
            .await
            .unwrap();
    }

    s.t.set_time(s.periods[1].start_time).await;
    let receipt = s
        .t
        .dao
        .claim_next_period(s.assignment.hash(), &s.bob)
        .await
        .unwrap();
    assert_eq!(receipt.fraction.to_string(), "0.7500");

    // the next period runs entirely at the last adjustment
    s.t.set_time(s.periods[2].start_time).await;
    let receipt = s
        .t
        .dao
        .claim_next_period(s.assignment.hash(), &s.bob)
        .await
        .unwrap();
    assert_eq!(receipt.period.hash, s.periods[1].hash);
    assert_eq!(receipt.fraction.to_string(), "0.7500");
}

#[test_log::test(tokio::test)]
async fn test_each_period_is_claimed_once() {
    let s = staffed().await;
    s.t.set_time(s.periods[2].start_time).await;

    let first = s.t.dao.claim_next_period(s.assignment.hash(), &s.bob).await.unwrap();
    let second = s.t.dao.claim_next_period(s.assignment.hash(), &s.bob).await.unwrap();
    assert_eq!(first.period.hash, s.periods[0].hash);
    assert_eq!(second.period.hash, s.periods[1].hash);

    let err = s
        .t
        .dao
        .claim_next_period(s.assignment.hash(), &s.bob)
        .await
        .unwrap_err();
    assert!(err.is_retryable(), "{}", err);
    assert_eq!(
        s.t.dao
            .graph()
            .get_edges_from(s.assignment.hash(), edges::CLAIMED)
            .await
            .len(),
        2
    );

    s.t.set_time(s.periods[9].start_time).await;
    for _ in 2..9 {
        s.t.dao.claim_next_period(s.assignment.hash(), &s.bob).await.unwrap();
    }
    let err = s
        .t
        .dao
        .claim_next_period(s.assignment.hash(), &s.bob)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "All available periods for this assignment have been claimed"
    );
    assert!(!err.is_retryable());
}

#[test_log::test(tokio::test)]
async fn test_only_the_assignee_claims() {
    let s = staffed().await;
    s.t.set_time(s.periods[1].start_time).await;

    let err = s
        .t
        .dao
        .claim_next_period(s.assignment.hash(), &name("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Payroll(PayrollError::PermissionDenied(_))));
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_claim_retries_until_the_period_ends() {
    let s = staffed_on(TestDao::on_tokio_time().await).await;

    // a minute before the first period ends
    s.t.set_time(s.periods[1].start_time - Duration::minutes(1)).await;
    let policy = RetryPolicy::new(3, StdDuration::from_secs(45));

    let receipt = s
        .t
        .dao
        .claim_next_period_with_retry(s.assignment.hash(), &s.bob, &policy)
        .await
        .unwrap();
    assert_eq!(receipt.period.hash, s.periods[0].hash);
    assert!(s.t.now() >= s.periods[1].start_time);
}

#[test_log::test(tokio::test)]
async fn test_adjustment_rules() {
    let s = staffed().await;
    let hash = s.assignment.hash();

    let err = s.t.dao.adjust_commitment(&name("alice"), hash, 50, None).await.unwrap_err();
    assert!(err.to_string().contains("Only the owner of the assignment can adjust it"));

    let err = s.t.dao.adjust_commitment(&s.bob, hash, 100, None).await.unwrap_err();
    assert!(err
        .to_string()
        .contains("New commitment: [100] must be different than current commitment: [100]"));

    let err = s.t.dao.adjust_commitment(&s.bob, hash, 120, None).await.unwrap_err();
    assert!(matches!(err, DaoError::Payroll(PayrollError::InvalidCommitment(_))));

    let later = s.t.now() + Duration::days(2);
    s.t.dao.adjust_commitment(&s.bob, hash, 60, Some(later)).await.unwrap();
    let err = s
        .t
        .dao
        .adjust_commitment(&s.bob, hash, 70, Some(later - Duration::hours(1)))
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("New time share start date must be greater than the previous time share start date"));

    s.t.set_time(s.periods[9].start_time + Duration::seconds(1)).await;
    let err = s.t.dao.adjust_commitment(&s.bob, hash, 80, None).await.unwrap_err();
    assert!(err.to_string().contains("Cannot adjust expired assignment"));
}

#[test_log::test(tokio::test)]
async fn test_deferred_can_only_rise() {
    let t = TestDao::new().await;
    let alice = t.member("alice", "100.00 HVOICE").await;
    let bob = t.member("bob", "100.00 HVOICE").await;
    let periods = t.weekly_periods(start() + Duration::days(1), 3).await;
    let role = t.role(&alice, "150000.00 USD").await;
    let assignment = t.assignment(&bob, &role.hash, &periods[0].hash, 2, 100, 50).await;
    assert_eq!(assignment.salary.husd, asset("1519.50 HUSD"));

    let err = t.dao.adjust_deferred(&bob, assignment.hash(), 40).await.unwrap_err();
    assert!(err
        .to_string()
        .contains("New percentage has to be greater or equal to approved percentage: 50"));

    let updated = t.dao.adjust_deferred(&bob, assignment.hash(), 100).await.unwrap();
    assert_eq!(updated.deferred_perc_x100, 100);
    assert_eq!(updated.approved_deferred_perc_x100, 50);
    assert_eq!(updated.salary.husd, asset("0.00 HUSD"));
    assert_eq!(updated.salary.hypha, asset("759.75 HYPHA"));
    assert!(!t.dao.graph().document_exists(assignment.hash()).await);
}

#[test_log::test(tokio::test)]
async fn test_withdraw_stops_pay() {
    let s = staffed().await;
    s.t.set_time(s.periods[1].start_time + Duration::hours(84)).await;

    let withdrawn = s
        .t
        .dao
        .withdraw_assignment(&s.bob, s.assignment.hash())
        .await
        .unwrap();
    assert_eq!(withdrawn.state, AssignmentState::Withdrawed);
    assert_eq!(withdrawn.period_count, 2);

    s.t.set_time(s.periods[2].start_time).await;
    let first = s.t.dao.claim_next_period(withdrawn.hash(), &s.bob).await.unwrap();
    assert_eq!(first.fraction.to_string(), "1.0000");
    let second = s.t.dao.claim_next_period(withdrawn.hash(), &s.bob).await.unwrap();
    assert_eq!(second.fraction.to_string(), "0.5000");

    let err = s.t.dao.claim_next_period(withdrawn.hash(), &s.bob).await.unwrap_err();
    assert!(matches!(err, DaoError::Payroll(PayrollError::AllPeriodsClaimed)));

    let err = s.t.dao.adjust_commitment(&s.bob, withdrawn.hash(), 50, None).await.unwrap_err();
    assert!(err.to_string().contains("Cannot adjust commitment for withdrawed assignments"));
}

#[test_log::test(tokio::test)]
async fn test_suspension_ends_the_assignment() {
    let s = staffed().await;
    let alice = name("alice");
    // the vote closes exactly halfway through the second period
    s.t.set_time(s.periods[1].start_time + Duration::hours(84) - s.t.voting_window())
        .await;

    let suspension = s
        .t
        .pass(
            &alice,
            ProposalType::Suspend,
            details(vec![
                Content::new(labels::TITLE, "Suspend bob"),
                Content::new(labels::DESCRIPTION, "Bob has not shown up"),
                Content::new(labels::ORIGINAL_DOCUMENT, *s.assignment.hash()),
            ]),
        )
        .await;
    assert_eq!(
        suspension.content.get_str(groups::DETAILS, labels::TITLE).unwrap(),
        "Suspension of assignment: bob weaves"
    );

    let suspended = s.t.latest_assignment().await;
    assert_ne!(suspended.hash(), s.assignment.hash());
    assert_eq!(suspended.state, AssignmentState::Suspended);
    assert_eq!(suspended.period_count, 2);
    assert!(s
        .t
        .dao
        .graph()
        .edge_exists(&suspension.hash, suspended.hash(), edges::SUSPEND)
        .await);

    let err = s.t.dao.adjust_commitment(&s.bob, suspended.hash(), 50, None).await.unwrap_err();
    assert!(err.to_string().contains("Cannot adjust commitment for suspended assignments"));
    let err = s
        .t
        .dao
        .propose(
            &alice,
            ProposalType::Suspend,
            details(vec![
                Content::new(labels::TITLE, "Suspend bob again"),
                Content::new(labels::DESCRIPTION, "Just to be sure"),
                Content::new(labels::ORIGINAL_DOCUMENT, *suspended.hash()),
            ]),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("is already suspended"));

    s.t.set_time(s.periods[2].start_time).await;
    let first = s.t.dao.claim_next_period(suspended.hash(), &s.bob).await.unwrap();
    assert_eq!(first.fraction.to_string(), "1.0000");
    let second = s.t.dao.claim_next_period(suspended.hash(), &s.bob).await.unwrap();
    assert_eq!(second.fraction.to_string(), "0.5000");
    let err = s.t.dao.claim_next_period(suspended.hash(), &s.bob).await.unwrap_err();
    assert!(matches!(err, DaoError::Payroll(PayrollError::AllPeriodsClaimed)));
}

#[test_log::test(tokio::test)]
async fn test_badge_bonus_is_added() {
    let s = staffed().await;
    let alice = name("alice");

    let badge = s
        .t
        .pass(
            &alice,
            ProposalType::Badge,
            details(vec![
                Content::new(labels::TITLE, "Steward"),
                Content::new(labels::DESCRIPTION, "Keeps the lights on"),
                Content::new(labels::HYPHA_COEFFICIENT, 11_000i64),
            ]),
        )
        .await;
    s.t.pass(
        &s.bob,
        ProposalType::AssignBadge,
        details(vec![
            Content::new(labels::TITLE, "Bob stewards"),
            Content::new(labels::DESCRIPTION, "Bob holds the steward badge"),
            Content::new(labels::ASSIGNEE, s.bob.clone()),
            Content::new(labels::BADGE, badge.hash),
            Content::new(labels::START_PERIOD, s.periods[0].hash),
            Content::new(labels::PERIOD_COUNT, 1i64),
        ]),
    )
    .await;

    s.t.set_time(s.periods[2].start_time).await;
    let with_badge = s.t.dao.claim_next_period(s.assignment.hash(), &s.bob).await.unwrap();
    assert_eq!(with_badge.amount_of("HYPHA"), Some(&asset("835.72 HYPHA")));
    assert_eq!(with_badge.amount_of("HVOICE"), Some(&asset("6078.02 HVOICE")));

    let without = s.t.dao.claim_next_period(s.assignment.hash(), &s.bob).await.unwrap();
    assert_eq!(without.amount_of("HYPHA"), Some(&asset("759.75 HYPHA")));
}
