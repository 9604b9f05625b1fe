pub mod html;
mod request;
mod ticket;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE,
        },
        method::InvalidMethod,
        request::Parts,
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, RequestPartsExt as _, Router,
};
use axum_extra::TypedHeader;
use derive_more::{Display, From};
use headers::{authorization::Basic, Authorization};
use itertools::Itertools as _;
use serde::de::DeserializeOwned;
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{
    api::FieldErrors,
    config,
    store::{CreateError, Store},
};

pub type SharedAppState = Arc<AppState>;

pub struct AppState {
    pub store: Store,

    pub library: config::Library,

    pub auth: Option<config::Auth>,
}

pub fn router(
    state: SharedAppState,
    cors: &config::Cors,
) -> Result<Router, CorsError> {
    let methods = cors
        .allowed_methods
        .iter()
        .map(|m| m.parse::<Method>())
        .collect::<Result<Vec<_>, _>>()?;
    let allowed_methods =
        HeaderValue::from_str(&methods.iter().map(Method::as_str).join(","))?;
    let allowed_headers =
        HeaderValue::from_static("Content-Type,Authorization");

    let origin = if cors.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors.allowed_origins
                .iter()
                .map(|o| o.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Ok(Router::new()
        .route("/", get(index))
        .route("/tickets", get(ticket::list).post(ticket::add))
        .route("/tickets.json", get(ticket::list_json))
        .route("/ticket/:id", get(ticket::get).patch(ticket::edit))
        .route("/requests", get(request::list).post(request::add))
        .route("/requests.json", get(request::dump))
        .route("/request/:id", get(request::get).patch(request::edit))
        .route("/request/eta/:id", get(request::eta))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            allowed_methods,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            allowed_headers,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn index() -> Redirect {
    Redirect::to("/requests")
}

#[derive(Debug, Display, derive_more::Error, From)]
pub enum CorsError {
    #[display("invalid CORS origin: {_0}")]
    Origin(axum::http::header::InvalidHeaderValue),
    #[display("invalid CORS method: {_0}")]
    Method(InvalidMethod),
}

/// Whether a resource was asked for as a page or as `.json`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Representation {
    Html,
    Json,
}

impl Representation {
    fn split(raw: &str) -> (&str, Self) {
        match raw.strip_suffix(".json") {
            Some(id) => (id, Self::Json),
            None => (raw, Self::Html),
        }
    }
}

#[derive(Debug, From)]
pub enum Error {
    TicketNotFound(String),
    RequestNotFound(String),
    #[from]
    Invalid(FieldErrors),
    #[from]
    Create(CreateError),
    Unauthorized,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::TicketNotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "message": format!("Help ticket {id} doesn't exist"),
                })),
            )
                .into_response(),
            Self::RequestNotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "message": format!("Request {id} doesn't exist"),
                })),
            )
                .into_response(),
            Self::Invalid(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": errors })),
            )
                .into_response(),
            Self::Create(e) => {
                tracing::error!(error = %e, "failed to create a record");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": e.to_string() })),
                )
                    .into_response()
            }
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, "Basic realm=\"helpdesk\"")],
                "Please authenticate yourself",
            )
                .into_response(),
        }
    }
}

/// Proof that the caller passed the Basic auth check, if one is configured.
pub struct Authorized;

#[async_trait]
impl FromRequestParts<SharedAppState> for Authorized {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedAppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = &state.auth else {
            return Ok(Self);
        };
        let TypedHeader(Authorization(basic)) = parts
            .extract::<TypedHeader<Authorization<Basic>>>()
            .await
            .map_err(|_| Error::Unauthorized)?;
        if basic.username() == expected.username
            && basic.password() == expected.password
        {
            Ok(Self)
        } else {
            tracing::warn!(
                username = basic.username(),
                "rejected credentials"
            );
            Err(Error::Unauthorized)
        }
    }
}

/// Body decoded from JSON or from an HTML form, by `Content-Type`.
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        if is_json {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(v)| Self(v))
                .map_err(IntoResponse::into_response)
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(v)| Self(v))
                .map_err(IntoResponse::into_response)
        }
    }
}
