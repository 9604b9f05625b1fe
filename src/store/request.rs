use std::{
    collections::{btree_map::Entry, BTreeMap},
    fmt,
    str::FromStr,
};

use derive_more::Display;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::Date;

use crate::{eta, search::Query};

use super::{CreateError, Store, Timestamp};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Request {
    pub id: Id,
    #[serde(default)]
    pub username: String,
    pub title: String,
    /// Where the item is shelved.
    pub location: String,
    /// Branch the patron collects the item from.
    pub pickup: String,
    pub oclc: String,
    pub status: Status,
    #[serde(default)]
    pub notes: Vec<String>,
    pub time: Timestamp,
}

impl Request {
    pub fn estimate(&self, today: Date) -> eta::Estimate {
        eta::estimate(&self.status, self.pickup == self.location, today)
    }

    /// Applies the editable subset of fields, leaving everything else as is.
    pub fn apply(&mut self, update: Update) {
        if let Some(pickup) = update.pickup.filter(|p| !p.trim().is_empty()) {
            self.pickup = pickup;
        }
        if let Some(note) = update.note {
            if !note.trim().is_empty() {
                self.notes.push(note);
            }
        }
    }
}

/// Numeric request identifier, kept as a decimal string on the wire.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub struct Id(u64);

impl Id {
    pub const FIRST: Self = Self(1);

    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Only the canonical decimal form is accepted, so `05` or `+5` never alias
/// request 5.
impl FromStr for Id {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u64>() {
            Ok(n) if n.to_string() == s => Ok(Self(n)),
            _ => Err(InvalidId(s.to_owned())),
        }
    }
}

#[derive(Debug, Display, derive_more::Error)]
#[display("invalid request ID `{_0}`")]
pub struct InvalidId(#[error(not(source))] String);

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        String::deserialize(d)?.parse().map_err(de::Error::custom)
    }
}

/// Stage of a request.
///
/// Nothing in this service advances it; it changes only in the loaded data.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    AwaitingCirculationProcessing,
    AwaitingStacksSearching,
    InTransit,
    Finished,
    /// Anything else found in the data, preserved verbatim.
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AwaitingCirculationProcessing => {
                "Awaiting Circulation Processing"
            }
            Self::AwaitingStacksSearching => "Awaiting Stacks Searching",
            Self::InTransit => "In Transit",
            Self::Finished => "Finished",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Awaiting Circulation Processing" => {
                Self::AwaitingCirculationProcessing
            }
            "Awaiting Stacks Searching" => Self::AwaitingStacksSearching,
            "In Transit" => Self::InTransit,
            "Finished" => Self::Finished,
            _ => Self::Other(value),
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

/// Validated input for a new request.
#[derive(Clone, Debug)]
pub struct Draft {
    pub username: String,
    pub title: String,
    pub location: String,
    pub pickup: String,
    pub oclc: String,
}

#[derive(Clone, Debug, Default)]
pub struct Update {
    pub pickup: Option<String>,
    pub note: Option<String>,
}

/// On-disk layout of the request collection.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Document {
    #[serde(rename = "@context")]
    pub context: serde_json::Value,
    pub requests: BTreeMap<Id, Request>,
}

impl Document {
    /// Requests whose title, pickup and status contain `query`, in ID order.
    pub fn search<'a>(
        &'a self,
        query: &'a Query,
    ) -> impl Iterator<Item = (&'a Id, &'a Request)> + Clone + 'a {
        self.requests.iter().filter(move |(_, r)| {
            query.matches([
                r.title.as_str(),
                r.pickup.as_str(),
                r.status.as_str(),
            ])
        })
    }

    /// One past the greatest ID in use.
    pub fn next_id(&self) -> Result<Id, CreateError> {
        match self.requests.last_key_value() {
            Some((id, _)) => id.next().ok_or(CreateError::IdsExhausted),
            None => Ok(Id::FIRST),
        }
    }

    pub fn insert(&mut self, draft: Draft) -> Result<&Request, CreateError> {
        let id = self.next_id()?;
        let Entry::Vacant(slot) = self.requests.entry(id) else {
            return Err(CreateError::Taken(id.to_string()));
        };
        Ok(slot.insert(Request {
            id,
            username: draft.username,
            title: draft.title,
            location: draft.location,
            pickup: draft.pickup,
            oclc: draft.oclc,
            status: Status::AwaitingCirculationProcessing,
            notes: Vec::new(),
            time: Timestamp::now(),
        }))
    }
}

impl Store {
    pub async fn get_request_by_id(&self, id: Id) -> Option<Request> {
        self.requests.read().await.requests.get(&id).cloned()
    }

    pub async fn search_requests(&self, query: &Query) -> Vec<Request> {
        self.requests
            .read()
            .await
            .search(query)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub async fn add_request(
        &self,
        draft: Draft,
    ) -> Result<Request, CreateError> {
        let request = self.requests.write().await.insert(draft)?.clone();
        tracing::info!(
            id = %request.id,
            username = %request.username,
            "created request"
        );
        Ok(request)
    }

    pub async fn update_request(
        &self,
        id: Id,
        update: Update,
    ) -> Option<Request> {
        let mut requests = self.requests.write().await;
        let request = requests.requests.get_mut(&id)?;
        request.apply(update);
        tracing::info!(%id, pickup = %request.pickup, "updated request");
        Some(request.clone())
    }

    pub async fn requests_context(&self) -> serde_json::Value {
        self.requests.read().await.context.clone()
    }

    /// Snapshot of the whole collection as it would be stored.
    pub async fn requests_document(&self) -> Document {
        self.requests.read().await.clone()
    }
}
