use serde::{Deserialize, Serialize};

use crate::{api::FieldErrors, store};

pub use crate::store::{
    ticket::{Id, Priority, SortKey},
    Timestamp,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Ticket {
    #[serde(rename = "@id")]
    pub iri: String,
    pub id: Id,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub time: Timestamp,
    pub comments: Vec<String>,
}

impl From<store::Ticket> for Ticket {
    fn from(ticket: store::Ticket) -> Self {
        Self {
            iri: format!("ticket/{}", ticket.id),
            id: ticket.id,
            title: ticket.title,
            description: ticket.description,
            priority: ticket.priority,
            time: ticket.time,
            comments: ticket.comments,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct List {
    #[serde(rename = "@context")]
    pub context: serde_json::Value,
    pub tickets: Vec<Ticket>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListInput {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub sort_by: SortKey,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewTicket {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl NewTicket {
    pub fn validate(self) -> Result<store::ticket::Draft, FieldErrors> {
        let mut errors = FieldErrors::default();
        let draft = store::ticket::Draft {
            title: errors.require("title", self.title),
            description: errors.require("description", self.description),
        };
        errors.check(draft)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TicketUpdate {
    pub priority: Option<Priority>,
    pub comment: Option<String>,
}

impl From<TicketUpdate> for store::ticket::Update {
    fn from(input: TicketUpdate) -> Self {
        Self {
            priority: input.priority,
            comment: input.comment,
        }
    }
}
