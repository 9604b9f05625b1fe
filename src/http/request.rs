use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, StatusCode},
    response::{Html, IntoResponse as _, Response},
    Json,
};

use crate::{api, eta, search, store};

use super::{html, Authorized, Error, Payload, Representation, SharedAppState};

pub(super) async fn list(
    State(state): State<SharedAppState>,
    Query(input): Query<api::request::ListInput>,
) -> Html<String> {
    Html(render_list(&state, &input.query).await)
}

/// Whole collection in its stored layout, without derived fields.
pub(super) async fn dump(
    State(state): State<SharedAppState>,
) -> Json<store::request::Document> {
    Json(state.store.requests_document().await)
}

pub(super) async fn add(
    State(state): State<SharedAppState>,
    _: Authorized,
    Payload(input): Payload<api::request::NewRequest>,
) -> Result<Response, Error> {
    let draft = input.validate()?;
    let request = state.store.add_request(draft).await?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/request/{}", request.id))],
        Html(render_list(&state, "").await),
    )
        .into_response())
}

pub(super) async fn get(
    State(state): State<SharedAppState>,
    Path(raw): Path<String>,
) -> Result<Response, Error> {
    let (id, repr) = Representation::split(&raw);
    let request = find(&state, id).await?;

    Ok(respond(&state, request, repr).await)
}

pub(super) async fn edit(
    State(state): State<SharedAppState>,
    _: Authorized,
    Path(raw): Path<String>,
    Payload(input): Payload<api::request::RequestUpdate>,
) -> Result<Response, Error> {
    let (id, repr) = Representation::split(&raw);
    let not_found = || Error::RequestNotFound(id.to_owned());
    let id = id.parse::<store::request::Id>().map_err(|_| not_found())?;
    let request = state
        .store
        .update_request(id, input.into())
        .await
        .ok_or_else(not_found)?;

    Ok(respond(&state, request, repr).await)
}

pub(super) async fn eta(
    State(state): State<SharedAppState>,
    Path(raw): Path<String>,
) -> Result<Response, Error> {
    let (id, repr) = Representation::split(&raw);
    let request = find(&state, id).await?;
    let today = eta::today();
    let alternatives = request.estimate(today).alternatives;

    Ok(match repr {
        Representation::Html => Html(html::eta(
            &api::Request::new(request, today),
            &alternatives,
            &state.library.pickup_locations,
        ))
        .into_response(),
        Representation::Json => Json(alternatives).into_response(),
    })
}

async fn find(
    state: &SharedAppState,
    id: &str,
) -> Result<store::Request, Error> {
    let not_found = || Error::RequestNotFound(id.to_owned());
    let id = id.parse::<store::request::Id>().map_err(|_| not_found())?;
    state.store.get_request_by_id(id).await.ok_or_else(not_found)
}

async fn render_list(state: &SharedAppState, raw_query: &str) -> String {
    let query = search::Query::new(raw_query);
    let today = eta::today();
    let requests = state
        .store
        .search_requests(&query)
        .await
        .into_iter()
        .map(|r| api::Request::new(r, today))
        .collect::<Vec<_>>();

    html::request_list(&requests, raw_query, &state.library.pickup_locations)
}

async fn respond(
    state: &SharedAppState,
    request: store::Request,
    repr: Representation,
) -> Response {
    let request = api::Request::new(request, eta::today());
    match repr {
        Representation::Html => Html(html::request(
            &request,
            &state.library.pickup_locations,
        ))
        .into_response(),
        Representation::Json => Json(api::Contextual {
            context: state.store.requests_context().await,
            resource: request,
        })
        .into_response(),
    }
}
