use crate::domain::account::{Registration, UserProfile};
use crate::domain::ports::IssuedToken;
use crate::interfaces::http::AppState;
use crate::interfaces::http::auth::AuthenticatedUser;
use crate::interfaces::http::dto::{
    HistoryQuery, LoginRequest, RegisterRequest, RegisterResponse, StockRequest, StockResponse,
    SyncQuery, SyncResponse, TopCryptoQuery, TopCryptoResponse, TransactionRequest,
    TransactionResponse,
};
use crate::interfaces::http::error::{ApiError, ApiResult};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::info;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "<<<<< Welcome to tradedesk >>>>>" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(request) = payload?;

    let account = state
        .services
        .accounts
        .register(Registration {
            username: request.username,
            password: request.password,
            balance: request.balance,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: format!("User {} created successfully", account.username),
            user_id: account.id,
            username: account.username,
            balance: account.balance,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<IssuedToken>> {
    let Json(request) = payload?;
    let token = state
        .services
        .accounts
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(token))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state
        .services
        .accounts
        .profile(&user.username, &username)
        .await?;
    Ok(Json(profile))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let Json(request) = payload?;

    let record = state
        .services
        .ledger
        .submit(
            user.id,
            &request.ticker,
            &request.transaction_type,
            request.transaction_volume,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(username): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let Query(query) = query?;
    let range = query.range()?;

    let records = state
        .services
        .accounts
        .transactions(&user.username, &username, range)
        .await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub async fn create_stock(
    State(state): State<AppState>,
    payload: Result<Json<StockRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StockResponse>)> {
    let Json(request) = payload?;

    let instrument = state
        .services
        .catalog
        .register_manual(&request.ticker, &request.stock_name, request.stock_price)
        .await?;

    Ok((StatusCode::CREATED, Json(instrument.into())))
}

pub async fn list_stocks(State(state): State<AppState>) -> ApiResult<Json<Vec<StockResponse>>> {
    let instruments = state.services.catalog.list().await?;
    Ok(Json(instruments.into_iter().map(Into::into).collect()))
}

pub async fn get_stock(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Json<StockResponse>> {
    state
        .services
        .catalog
        .find_by_ticker(&ticker)
        .await?
        .map(|instrument| Json(instrument.into()))
        .ok_or_else(|| ApiError::NotFound(format!("Stock {} not found", ticker.trim())))
}

pub async fn top_cryptocurrencies(
    State(state): State<AppState>,
    query: Result<Query<TopCryptoQuery>, QueryRejection>,
) -> ApiResult<Json<TopCryptoResponse>> {
    let Query(query) = query?;
    let currency = query
        .vs_currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(state.feed.default_currency.as_str())
        .to_lowercase();

    let quotes = state
        .services
        .price_cache
        .fetch_prices(&currency, state.feed.sync_count)
        .await?;

    if quotes.is_empty() {
        return Err(ApiError::NotFound(
            "No cryptocurrency data available".to_string(),
        ));
    }

    if query.sync {
        let created = state.services.catalog.upsert_from_feed(&quotes).await?;
        info!("Top cryptocurrencies synced to catalog ({} new)", created);
    }

    Ok(Json(TopCryptoResponse {
        top_20_cryptocurrencies: quotes
            .iter()
            .take(state.feed.display_count)
            .cloned()
            .collect(),
    }))
}

pub async fn sync_cryptocurrencies(
    State(state): State<AppState>,
    query: Result<Query<SyncQuery>, QueryRejection>,
) -> ApiResult<Json<SyncResponse>> {
    let Query(query) = query?;
    let catalog = &state.services.catalog;

    if query.refresh {
        state.services.price_cache.invalidate().await;
    }

    let report = catalog
        .sync_from_feed(catalog.default_currency(), state.feed.sync_count)
        .await?;

    if report.fetched == 0 {
        return Err(ApiError::NotFound(
            "No cryptocurrency data available".to_string(),
        ));
    }

    Ok(Json(SyncResponse {
        message: format!(
            "Successfully synced {} cryptocurrencies to stocks table",
            report.unique
        ),
        fetched: report.fetched,
        created: report.created,
        updated: report.updated,
    }))
}
