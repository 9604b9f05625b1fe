pub mod request;
pub mod ticket;

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use derive_more::Display;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::{
    format_description::BorrowedFormatItem, macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime,
};
use tokio::{fs, sync::RwLock};

use crate::config;

pub use self::{request::Request, ticket::Ticket};

/// In-memory home of both collections.
///
/// Loaded once at startup and never written back to disk. Every operation
/// takes the lock of the collection it touches for its whole duration, so
/// creates and updates never interleave.
pub struct Store {
    tickets: RwLock<ticket::Document>,
    requests: RwLock<request::Document>,
}

impl Store {
    pub fn new(
        tickets: ticket::Document,
        requests: request::Document,
    ) -> Self {
        Self {
            tickets: RwLock::new(tickets),
            requests: RwLock::new(requests),
        }
    }

    pub async fn load(config: &config::Data) -> Result<Self, Error> {
        let tickets =
            read_document::<ticket::Document>(&config.tickets).await?;
        let requests =
            read_document::<request::Document>(&config.requests).await?;

        tracing::info!(
            tickets = tickets.tickets.len(),
            requests = requests.requests.len(),
            "loaded data"
        );

        Ok(Self::new(tickets, requests))
    }
}

async fn read_document<T: de::DeserializeOwned>(
    path: &Path,
) -> Result<T, Error> {
    let raw = fs::read_to_string(path).await.map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::Parse {
        path: path.to_owned(),
        source,
    })
}

#[derive(Debug, Display, derive_more::Error)]
pub enum Error {
    #[display("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("cannot parse `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failure to place a new record into its collection.
#[derive(Debug, Display, derive_more::Error)]
pub enum CreateError {
    #[display("no request IDs left")]
    IdsExhausted,
    #[display("ID `{_0}` is already taken")]
    Taken(#[error(not(source))] String),
}

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[month]-[day]-[year] [hour]:[minute]");

/// Creation moment of a record, kept with minute precision.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(PrimitiveDateTime);

impl Timestamp {
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        let now = PrimitiveDateTime::new(now.date(), now.time());
        // Round-trips through the stored format drop anything finer.
        now.replace_second(0)
            .and_then(|t| t.replace_nanosecond(0))
            .map_or(Self(now), Self)
    }

    pub fn date(&self) -> Date {
        self.0.date()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted =
            self.0.format(TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl FromStr for Timestamp {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveDateTime::parse(s, TIMESTAMP_FORMAT).map(Self)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        String::deserialize(d)?.parse().map_err(de::Error::custom)
    }
}
