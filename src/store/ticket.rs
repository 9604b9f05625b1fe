use std::{
    borrow::Borrow,
    cmp::Ordering,
    collections::{btree_map::Entry, BTreeMap},
};

use derive_more::{Display, From};
use itertools::Itertools as _;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::search::Query;

use super::{CreateError, Store, Timestamp};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Ticket {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub time: Timestamp,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Ticket {
    /// Applies the editable subset of fields, leaving everything else as is.
    pub fn apply(&mut self, update: Update) {
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(comment) = update.comment {
            if !comment.trim().is_empty() {
                self.comments.push(comment);
            }
        }
    }
}

#[derive(
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub const LEN: usize = 6;

    const ALPHABET: &'static [u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(
            (0..Self::LEN)
                .map(|_| {
                    Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())]
                        as char
                })
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Resolved; sorts below everything open.
    #[display("closed")]
    Closed,
    #[display("low")]
    Low,
    #[default]
    #[display("normal")]
    Normal,
    #[display("high")]
    High,
}

/// Field a ticket listing is ordered by, greatest first.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Time,
    Priority,
}

impl SortKey {
    fn compare(self, a: &Ticket, b: &Ticket) -> Ordering {
        match self {
            Self::Time => a.time.cmp(&b.time),
            Self::Priority => a.priority.cmp(&b.priority),
        }
    }
}

/// Validated input for a new ticket.
#[derive(Clone, Debug)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct Update {
    pub priority: Option<Priority>,
    pub comment: Option<String>,
}

/// On-disk layout of the ticket collection.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Document {
    #[serde(rename = "@context")]
    pub context: serde_json::Value,
    pub tickets: BTreeMap<Id, Ticket>,
}

impl Document {
    /// Tickets whose title and description contain `query`, greatest `sort`
    /// key first.
    pub fn search<'a>(
        &'a self,
        query: &'a Query,
        sort: SortKey,
    ) -> impl Iterator<Item = (&'a Id, &'a Ticket)> + Clone + 'a {
        self.tickets
            .iter()
            .filter(move |(_, t)| {
                query.matches([t.title.as_str(), t.description.as_str()])
            })
            .sorted_by(move |(_, a), (_, b)| sort.compare(b, a))
    }

    /// Picks a random [`Id`] not taken yet.
    pub fn next_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Id {
        loop {
            let id = Id::random(rng);
            if !self.tickets.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn insert(&mut self, draft: Draft) -> Result<&Ticket, CreateError> {
        let id = self.next_id(&mut rand::thread_rng());
        let Entry::Vacant(slot) = self.tickets.entry(id.clone()) else {
            return Err(CreateError::Taken(id.to_string()));
        };
        Ok(slot.insert(Ticket {
            id,
            title: draft.title,
            description: draft.description,
            priority: Priority::Normal,
            time: Timestamp::now(),
            comments: Vec::new(),
        }))
    }
}

impl Store {
    pub async fn get_ticket_by_id(&self, id: &Id) -> Option<Ticket> {
        self.tickets.read().await.tickets.get(id).cloned()
    }

    pub async fn search_tickets(
        &self,
        query: &Query,
        sort: SortKey,
    ) -> Vec<Ticket> {
        self.tickets
            .read()
            .await
            .search(query, sort)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub async fn add_ticket(
        &self,
        draft: Draft,
    ) -> Result<Ticket, CreateError> {
        let ticket = self.tickets.write().await.insert(draft)?.clone();
        tracing::info!(id = %ticket.id, "created ticket");
        Ok(ticket)
    }

    pub async fn update_ticket(
        &self,
        id: &Id,
        update: Update,
    ) -> Option<Ticket> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets.tickets.get_mut(id)?;
        ticket.apply(update);
        tracing::info!(%id, priority = %ticket.priority, "updated ticket");
        Some(ticket.clone())
    }

    pub async fn tickets_context(&self) -> serde_json::Value {
        self.tickets.read().await.context.clone()
    }
}
