//! DAO membership
//!
//! A member document depends only on the account name, so its hash can be
//! computed without a lookup. Membership itself is the `root --member-->`
//! edge.

use tracing::info;

use dho_common::names::{edges, groups, labels, types};
use dho_common::{Checksum256, Name, TimePoint};
use dho_docgraph::{system_group, Content, ContentWrapper, Document, DocumentGraph};

use crate::error::{PayrollError, PayrollResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub account: Name,
    pub hash: Checksum256,
}

impl Member {
    pub fn content(account: &Name) -> PayrollResult<ContentWrapper> {
        let mut content = ContentWrapper::new()
            .with_group(groups::DETAILS, [Content::new(labels::MEMBER, account.clone())]);
        content.push_group(system_group(types::MEMBER, account.as_str())?);
        Ok(content)
    }

    pub fn hash_of(account: &Name) -> PayrollResult<Checksum256> {
        Ok(Document::hash_content(&Self::content(account)?)?)
    }

    /// The member record of `account`, if it is currently enrolled
    pub async fn find(
        graph: &DocumentGraph,
        root: &Checksum256,
        account: &Name,
    ) -> PayrollResult<Option<Member>> {
        let hash = Self::hash_of(account)?;
        if graph.edge_exists(root, &hash, edges::MEMBER).await {
            Ok(Some(Member {
                account: account.clone(),
                hash,
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn is_member(graph: &DocumentGraph, root: &Checksum256, account: &Name) -> PayrollResult<bool> {
        Ok(Self::find(graph, root, account).await?.is_some())
    }

    /// Fail unless `account` is enrolled, using `message` as the error text
    pub async fn require(
        graph: &DocumentGraph,
        root: &Checksum256,
        account: &Name,
        message: &str,
    ) -> PayrollResult<Member> {
        Self::find(graph, root, account)
            .await?
            .ok_or_else(|| PayrollError::Membership(format!("{}: {}", message, account)))
    }

    pub async fn enroll(
        graph: &DocumentGraph,
        root: &Checksum256,
        creator: &Name,
        account: &Name,
        now: TimePoint,
    ) -> PayrollResult<Member> {
        if Self::is_member(graph, root, account).await? {
            return Err(PayrollError::Membership(format!("{} is already a member", account)));
        }

        let document = graph.create_document(creator, Self::content(account)?, now).await?;
        graph
            .create_edge(creator, root, &document.hash, edges::MEMBER, now)
            .await?;

        info!("Enrolled member {}", account);
        Ok(Member {
            account: account.clone(),
            hash: document.hash,
        })
    }
}
