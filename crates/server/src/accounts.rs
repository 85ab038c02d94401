//! Account endpoints and the entity the auth layer reads credentials from.

use api_types::account::{AccountListResponse, AccountView, SignUp};
use axum::{Extension, Json, extract::State, http::StatusCode};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::Account;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub balance: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Id of the authenticated account, out of the extension the auth layer set.
pub fn account_id(model: &Model) -> Result<Uuid, ServerError> {
    Uuid::parse_str(&model.id).map_err(|_| ServerError::Generic("invalid account id".to_string()))
}

pub(crate) fn view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        email: account.email,
        display_name: account.display_name,
        balance: account.balance,
        created_at: account.created_at,
    }
}

/// Registers a new account. The only endpoint outside the auth layer.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<SignUp>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .create_account(
            &payload.email,
            &payload.password,
            payload.display_name.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(account))))
}

/// Returns the authenticated account, balance included.
pub async fn profile(
    Extension(account): Extension<Model>,
    State(state): State<ServerState>,
) -> Result<Json<AccountView>, ServerError> {
    let id = account_id(&account)?;
    let account = state.engine.account(id).await?;
    Ok(Json(view(account)))
}

/// Lists every other account, for picking transfer recipients.
pub async fn list(
    Extension(account): Extension<Model>,
    State(state): State<ServerState>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let id = account_id(&account)?;
    let accounts = state.engine.list_accounts_except(id).await?;
    Ok(Json(AccountListResponse {
        accounts: accounts.into_iter().map(view).collect(),
    }))
}
