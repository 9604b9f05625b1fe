use serde::{Deserialize, Serialize};
use time::Date;

use crate::{api::FieldErrors, store};

pub use crate::{
    eta::{Alternatives, Eta},
    store::{
        request::{Id, Status},
        Timestamp,
    },
};

/// Outgoing request, with its ETA worked out for the day it is served.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Request {
    #[serde(rename = "@id")]
    pub iri: String,
    pub id: Id,
    pub username: String,
    pub title: String,
    pub location: String,
    pub pickup: String,
    pub oclc: String,
    pub status: Status,
    pub eta: Eta,
    pub notes: Vec<String>,
    pub time: Timestamp,
}

impl Request {
    pub fn new(request: store::Request, today: Date) -> Self {
        let eta = request.estimate(today).eta;
        Self {
            iri: format!("request/{}", request.id),
            id: request.id,
            username: request.username,
            title: request.title,
            location: request.location,
            pickup: request.pickup,
            oclc: request.oclc,
            status: request.status,
            eta,
            notes: request.notes,
            time: request.time,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListInput {
    #[serde(default)]
    pub query: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewRequest {
    pub username: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub pickup: Option<String>,
    pub oclc: Option<String>,
}

impl NewRequest {
    pub fn validate(self) -> Result<store::request::Draft, FieldErrors> {
        let mut errors = FieldErrors::default();
        let draft = store::request::Draft {
            username: errors.require("username", self.username),
            title: errors.require("title", self.title),
            location: errors.require("location", self.location),
            pickup: errors.require("pickup", self.pickup),
            oclc: errors.require("oclc", self.oclc),
        };
        errors.check(draft)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RequestUpdate {
    pub pickup: Option<String>,
    pub notes: Option<String>,
}

impl From<RequestUpdate> for store::request::Update {
    fn from(input: RequestUpdate) -> Self {
        Self {
            pickup: input.pickup,
            note: input.notes,
        }
    }
}
