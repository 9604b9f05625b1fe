use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse as _, Redirect, Response},
    Json,
};

use crate::{api, search, store};

use super::{html, Authorized, Error, Payload, Representation, SharedAppState};

pub(super) async fn list(
    State(state): State<SharedAppState>,
    Query(input): Query<api::ticket::ListInput>,
) -> Html<String> {
    let query = search::Query::new(&input.query);
    let tickets = state
        .store
        .search_tickets(&query, input.sort_by)
        .await
        .into_iter()
        .map(api::Ticket::from)
        .collect::<Vec<_>>();

    Html(html::ticket_list(&tickets, &input.query))
}

pub(super) async fn list_json(
    State(state): State<SharedAppState>,
    Query(input): Query<api::ticket::ListInput>,
) -> Json<api::ticket::List> {
    let query = search::Query::new(&input.query);
    let tickets = state
        .store
        .search_tickets(&query, input.sort_by)
        .await
        .into_iter()
        .map(api::Ticket::from)
        .collect();

    Json(api::ticket::List {
        context: state.store.tickets_context().await,
        tickets,
    })
}

pub(super) async fn add(
    State(state): State<SharedAppState>,
    _: Authorized,
    Payload(input): Payload<api::ticket::NewTicket>,
) -> Result<Redirect, Error> {
    let draft = input.validate()?;
    let ticket = state.store.add_ticket(draft).await?;

    Ok(Redirect::to(&format!("/ticket/{}", ticket.id)))
}

pub(super) async fn get(
    State(state): State<SharedAppState>,
    Path(raw): Path<String>,
) -> Result<Response, Error> {
    let (id, repr) = Representation::split(&raw);
    let ticket = state
        .store
        .get_ticket_by_id(&store::ticket::Id::from(id))
        .await
        .ok_or_else(|| Error::TicketNotFound(id.to_owned()))?;

    Ok(respond(&state, ticket.into(), repr).await)
}

pub(super) async fn edit(
    State(state): State<SharedAppState>,
    _: Authorized,
    Path(raw): Path<String>,
    Payload(input): Payload<api::ticket::TicketUpdate>,
) -> Result<Response, Error> {
    let (id, repr) = Representation::split(&raw);
    let ticket = state
        .store
        .update_ticket(&store::ticket::Id::from(id), input.into())
        .await
        .ok_or_else(|| Error::TicketNotFound(id.to_owned()))?;

    Ok(respond(&state, ticket.into(), repr).await)
}

async fn respond(
    state: &SharedAppState,
    ticket: api::Ticket,
    repr: Representation,
) -> Response {
    match repr {
        Representation::Html => Html(html::ticket(&ticket)).into_response(),
        Representation::Json => Json(api::Contextual {
            context: state.store.tickets_context().await,
            resource: ticket,
        })
        .into_response(),
    }
}
