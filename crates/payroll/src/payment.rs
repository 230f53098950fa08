use tracing::info;

use dho_common::names::{edges, groups, labels, types};
use dho_common::{Asset, Checksum256, Name};
use dho_docgraph::{system_group, Content, ContentWrapper, Document};

use crate::context::PayrollContext;
use crate::error::{PayrollError, PayrollResult};
use crate::member::Member;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub hash: Checksum256,
    pub recipient: Name,
    pub amount: Asset,
    pub memo: String,
    pub paid_from: Checksum256,
}

impl Payment {
    pub fn from_document(document: &Document) -> PayrollResult<Self> {
        if !document.is_type(types::PAYMENT) {
            return Err(PayrollError::Treasury(format!("{} is not a payment", document.hash)));
        }
        let content = &document.content;
        Ok(Self {
            hash: document.hash,
            recipient: content.get_name(groups::DETAILS, labels::RECIPIENT)?.clone(),
            amount: content.get_asset(groups::DETAILS, labels::AMOUNT)?.clone(),
            memo: content.get_str(groups::DETAILS, labels::MEMO)?.to_string(),
            paid_from: *content.get_checksum(groups::DETAILS, labels::PAID_FROM)?,
        })
    }
}

/// Content of the payment record for `amount` paid from `from_node`
///
/// The paying document is part of the content, so payments from different
/// proposals or assignments never share a hash.
pub fn payment_content(
    ctx: &PayrollContext<'_>,
    from_node: &Checksum256,
    recipient: &Name,
    amount: &Asset,
    memo: &str,
) -> PayrollResult<ContentWrapper> {
    let mut content = ContentWrapper::new().with_group(
        groups::DETAILS,
        [
            Content::new(labels::RECIPIENT, recipient.clone()),
            Content::new(labels::AMOUNT, amount.clone()),
            Content::new(labels::MEMO, memo),
            Content::new(labels::PAID_FROM, *from_node),
            Content::new(labels::PAYMENT_DATE, ctx.now),
        ],
    );
    content.push_group(system_group(types::PAYMENT, format!("Payment: {}", amount))?);
    Ok(content)
}

/// Fail if the payment record for these arguments already exists
pub async fn ensure_payable(
    ctx: &PayrollContext<'_>,
    from_node: &Checksum256,
    recipient: &Name,
    amount: &Asset,
    memo: &str,
) -> PayrollResult<()> {
    if amount.is_zero() {
        return Ok(());
    }
    let content = payment_content(ctx, from_node, recipient, amount, memo)?;
    let hash = Document::hash_content(&content)?;
    if ctx.graph.document_exists(&hash).await {
        return Err(PayrollError::DuplicatePayment {
            hash,
            memo: memo.to_string(),
        });
    }
    Ok(())
}

/// Pay `amount` to `recipient` through the treasury and record it
///
/// Zero amounts are skipped. The payment document hangs off `from_node` and
/// the recipient's member document, if they have one.
pub async fn make_payment(
    ctx: &PayrollContext<'_>,
    from_node: &Checksum256,
    recipient: &Name,
    amount: &Asset,
    memo: &str,
) -> PayrollResult<Option<Payment>> {
    if amount.is_zero() {
        return Ok(None);
    }

    ensure_payable(ctx, from_node, recipient, amount, memo).await?;
    let content = payment_content(ctx, from_node, recipient, amount, memo)?;

    ctx.treasury.issue(recipient, amount).await?;

    let document = ctx.graph.create_document(ctx.contract(), content, ctx.now).await?;
    ctx.graph
        .create_edge(ctx.contract(), from_node, &document.hash, edges::PAYMENT, ctx.now)
        .await?;
    if let Some(member) = Member::find(ctx.graph, ctx.root, recipient).await? {
        ctx.graph
            .ensure_edge(ctx.contract(), &member.hash, &document.hash, edges::PAYMENT, ctx.now)
            .await?;
    }

    info!("Paid {} to {}: {}", amount, recipient, memo);
    Payment::from_document(&document).map(Some)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use dho_common::{DaoSettings, Symbol, TimePoint};
    use dho_docgraph::{DocumentGraph, MemoryStorage};

    use super::*;
    use crate::treasury::Treasury;

    fn at() -> TimePoint {
        Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap()
    }

    async fn source(graph: &DocumentGraph, settings: &DaoSettings, title: &str) -> Checksum256 {
        let content = ContentWrapper::new().with_group(groups::DETAILS, [Content::new(labels::TITLE, title)]);
        graph.create_document(&settings.dao_name, content, at()).await.unwrap().hash
    }

    #[tokio::test]
    async fn test_payments_are_keyed_by_their_source() {
        let graph = DocumentGraph::open(Arc::new(MemoryStorage::new())).await.unwrap();
        let treasury = Treasury::open(Arc::new(MemoryStorage::new())).await.unwrap();
        let settings = DaoSettings::default();
        let root = source(&graph, &settings, "root").await;
        let ctx = PayrollContext {
            graph: &graph,
            treasury: &treasury,
            settings: &settings,
            root: &root,
            now: at(),
        };

        let bob = Name::new("bob").unwrap();
        let amount: Asset = "10.00 HUSD".parse().unwrap();
        let memo = "Payout: Travel; HUSD";
        let first = source(&graph, &settings, "first trip").await;
        let second = source(&graph, &settings, "second trip").await;

        let paid = make_payment(&ctx, &first, &bob, &amount, memo).await.unwrap().unwrap();
        assert_eq!(paid.paid_from, first);

        let err = make_payment(&ctx, &first, &bob, &amount, memo).await.unwrap_err();
        assert!(matches!(err, PayrollError::DuplicatePayment { hash, .. } if hash == paid.hash));
        assert_eq!(treasury.balance(&bob, &Symbol::husd()).await, Some(amount.clone()));

        let other = make_payment(&ctx, &second, &bob, &amount, memo).await.unwrap().unwrap();
        assert_ne!(other.hash, paid.hash);
        assert_eq!(
            treasury.balance(&bob, &Symbol::husd()).await,
            Some("20.00 HUSD".parse().unwrap())
        );

        let zero = Asset::zero(Symbol::husd());
        assert!(make_payment(&ctx, &first, &bob, &zero, memo).await.unwrap().is_none());
    }
}
