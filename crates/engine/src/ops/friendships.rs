use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{Account, EngineError, ResultEngine, friendships};

use super::{Engine, with_tx};

impl Engine {
    /// Links two accounts as mutual friends.
    ///
    /// Both directed rows are written in one transaction. When one row already
    /// exists (a partial edge left behind by an interrupted writer) only the
    /// missing half is added, so the call doubles as a targeted repair.
    pub async fn add_friend(&self, account_id: Uuid, friend_id: Uuid) -> ResultEngine<()> {
        if account_id == friend_id {
            return Err(EngineError::InvalidTransfer(
                "cannot befriend yourself".to_string(),
            ));
        }
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id).await?;
            self.require_account(&db_tx, friend_id).await?;

            let forward = self.friendship_exists(&db_tx, account_id, friend_id).await?;
            let backward = self.friendship_exists(&db_tx, friend_id, account_id).await?;
            if forward && backward {
                return Err(EngineError::AlreadyFriends(friend_id.to_string()));
            }

            if !forward {
                friendships::ActiveModel {
                    account_id: ActiveValue::Set(account_id.to_string()),
                    friend_id: ActiveValue::Set(friend_id.to_string()),
                    created_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
            }
            if !backward {
                friendships::ActiveModel {
                    account_id: ActiveValue::Set(friend_id.to_string()),
                    friend_id: ActiveValue::Set(account_id.to_string()),
                    created_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
            }

            tracing::info!(%account_id, %friend_id, "friendship linked");
            Ok(())
        })
    }

    /// True only when both directed rows exist.
    pub async fn are_friends(&self, account_id: Uuid, friend_id: Uuid) -> ResultEngine<bool> {
        let forward = self
            .friendship_exists(&self.database, account_id, friend_id)
            .await?;
        let backward = self
            .friendship_exists(&self.database, friend_id, account_id)
            .await?;
        Ok(forward && backward)
    }

    /// Lists the mutual friends of an account, ordered by email.
    ///
    /// Partial edges are skipped, not repaired; `reconcile_friendships` is the
    /// repair path.
    pub async fn list_friends(&self, account_id: Uuid) -> ResultEngine<Vec<Account>> {
        self.require_account(&self.database, account_id).await?;

        let forward = friendships::Entity::find()
            .filter(friendships::Column::AccountId.eq(account_id.to_string()))
            .all(&self.database)
            .await?;

        let mut friends = Vec::with_capacity(forward.len());
        for edge in forward {
            let friend_id = Uuid::parse_str(&edge.friend_id)
                .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?;
            if !self
                .friendship_exists(&self.database, friend_id, account_id)
                .await?
            {
                tracing::warn!(%account_id, %friend_id, "skipping one-sided friendship");
                continue;
            }
            let model = self.require_account(&self.database, friend_id).await?;
            friends.push(Account::try_from(model)?);
        }
        friends.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(friends)
    }

    /// Sweeps the whole graph and inserts the missing half of every one-sided
    /// edge. Returns how many rows were added.
    pub async fn reconcile_friendships(&self) -> ResultEngine<u64> {
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let edges = friendships::Entity::find().all(&db_tx).await?;
            let present: HashSet<(String, String)> = edges
                .iter()
                .map(|e| (e.account_id.clone(), e.friend_id.clone()))
                .collect();

            let mut repaired = 0u64;
            for edge in &edges {
                let reverse = (edge.friend_id.clone(), edge.account_id.clone());
                if present.contains(&reverse) {
                    continue;
                }
                tracing::warn!(
                    account_id = %edge.friend_id,
                    friend_id = %edge.account_id,
                    "repairing one-sided friendship"
                );
                friendships::ActiveModel {
                    account_id: ActiveValue::Set(reverse.0),
                    friend_id: ActiveValue::Set(reverse.1),
                    created_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
                repaired += 1;
            }
            Ok(repaired)
        })
    }

    pub(super) async fn friendship_exists<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
        friend_id: Uuid,
    ) -> ResultEngine<bool> {
        let found = friendships::Entity::find_by_id((account_id.to_string(), friend_id.to_string()))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Enforces the mutual-friends policy between a sender and a recipient.
    pub(super) async fn require_friends<C: ConnectionTrait>(
        &self,
        db: &C,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> ResultEngine<()> {
        let forward = self.friendship_exists(db, sender_id, recipient_id).await?;
        let backward = self.friendship_exists(db, recipient_id, sender_id).await?;
        match (forward, backward) {
            (true, true) => Ok(()),
            (false, false) => Err(EngineError::InvalidTransfer(
                "recipient is not a friend".to_string(),
            )),
            _ => Err(EngineError::PartialFriendship(format!(
                "one-sided friendship between {sender_id} and {recipient_id}"
            ))),
        }
    }
}
