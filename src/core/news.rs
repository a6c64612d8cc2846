//! Company news - published by administrators, broadcast to every inbox.

use crate::{
    core::{
        LedgerPolicy,
        notification::{self, NotificationKind},
    },
    entities::{Account, News, account, news},
    errors::{Rejection, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};

/// Publishes a news post and notifies every account except the author.
///
/// The post and all notifications are written in one transaction.
pub async fn publish_news(
    db: &DatabaseConnection,
    policy: &LedgerPolicy,
    author: &account::Model,
    title: &str,
    content: &str,
) -> Result<news::Model> {
    policy.roles.require_administrator(author)?;

    let title = title.trim();
    let content = content.trim();
    if title.is_empty() {
        return Err(Rejection::MissingField { field: "title" }.into());
    }
    if content.is_empty() {
        return Err(Rejection::MissingField { field: "content" }.into());
    }

    let txn = db.begin().await?;

    let post = news::ActiveModel {
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        author_id: Set(author.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let audience: Vec<i64> = Account::find()
        .select_only()
        .column(account::Column::Id)
        .filter(account::Column::Id.ne(author.id))
        .into_tuple()
        .all(&txn)
        .await?;

    for account_id in &audience {
        notification::notify(
            &txn,
            *account_id,
            NotificationKind::News,
            "Company news",
            &post.title,
            None,
        )
        .await?;
    }

    txn.commit().await?;

    tracing::info!(
        news_id = post.id,
        author_id = author.id,
        notified = audience.len(),
        "News published"
    );
    Ok(post)
}

/// The newest posts, newest first.
pub async fn latest_news(db: &DatabaseConnection, limit: u64) -> Result<Vec<news::Model>> {
    News::find()
        .order_by_desc(news::Column::CreatedAt)
        .order_by_desc(news::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn count_news(db: &DatabaseConnection) -> Result<u64> {
    News::find().count(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notification as inbox;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_publish_notifies_everyone_but_author() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = LedgerPolicy::default();
        let admin = create_custom_account(&db, "admin", None, true).await?;
        let a = create_employee(&db, "a").await?;
        let b = create_employee(&db, "b").await?;

        let post = publish_news(&db, &policy, &admin, " Office move ", "We move on Monday").await?;
        assert_eq!(post.title, "Office move");
        assert_eq!(post.author_id, admin.id);

        for reader in [&a, &b] {
            let entries = inbox::list_for_account(&db, reader.id, None).await?;
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].kind, "news");
            assert_eq!(entries[0].message, "Office move");
        }
        assert_eq!(inbox::unread_count(&db, admin.id).await?, 0);

        let latest = latest_news(&db, 5).await?;
        assert_eq!(latest, vec![post]);
        assert_eq!(count_news(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_publish_requires_admin_and_content() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = LedgerPolicy::default();
        let admin = create_custom_account(&db, "admin", None, true).await?;
        let employee = create_employee(&db, "employee").await?;

        let forbidden = publish_news(&db, &policy, &employee, "Hi", "There").await;
        assert!(matches!(forbidden, Err(Error::Forbidden { .. })));

        let blank = publish_news(&db, &policy, &admin, "Title", "   ").await;
        assert!(matches!(
            blank,
            Err(Error::Rejected(Rejection::MissingField { field: "content" }))
        ));

        assert_eq!(count_news(&db).await?, 0);
        assert_eq!(inbox::unread_count(&db, employee.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_latest_news_limit_and_order() -> Result<()> {
        let db = setup_test_db().await?;
        let policy = LedgerPolicy::default();
        let admin = create_custom_account(&db, "admin", None, true).await?;

        for n in 1..=3 {
            publish_news(&db, &policy, &admin, &format!("Post {n}"), "Body").await?;
        }

        let titles: Vec<String> = latest_news(&db, 2)
            .await?
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Post 3".to_string(), "Post 2".to_string()]);
        Ok(())
    }
}
