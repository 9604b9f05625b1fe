//! Estimated completion dates of pickup requests.
//!
//! Every step of the workflow is assumed to take a day, and delivering to a
//! branch other than the one the item is shelved at adds one more.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::{
    format_description::BorrowedFormatItem, macros::format_description,
    Date, Duration, OffsetDateTime,
};

use crate::store::request::Status;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[month]-[day]-[year]");

const FINISHED: &str = "Request Finished";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Eta {
    Due(Date),

    /// No further work is expected, or the status is not one this policy
    /// knows about.
    Finished,
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Due(date) => {
                let formatted =
                    date.format(DATE_FORMAT).map_err(|_| fmt::Error)?;
                f.write_str(&formatted)
            }
            Self::Finished => f.write_str(FINISHED),
        }
    }
}

impl Serialize for Eta {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Eta {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        if raw == FINISHED {
            return Ok(Self::Finished);
        }
        Date::parse(&raw, DATE_FORMAT)
            .map(Self::Due)
            .map_err(de::Error::custom)
    }
}

/// What the ETA would be under a different pickup choice.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct Alternatives {
    /// Keeping the current pickup branch after the next status change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<Eta>,

    /// Switching pickup to the branch the item is shelved at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<Eta>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Estimate {
    pub eta: Eta,
    pub alternatives: Alternatives,
}

/// Applies the ETA rule table.
///
/// `same_branch` tells whether the pickup branch is where the item is
/// shelved.
pub fn estimate(status: &Status, same_branch: bool, today: Date) -> Estimate {
    use Status as S;

    let (eta, alt, home) = match (same_branch, status) {
        (true, S::AwaitingCirculationProcessing) => (2, 3, None),
        (true, S::AwaitingStacksSearching) => (1, 2, None),
        (false, S::AwaitingCirculationProcessing) => (3, 3, Some(2)),
        (false, S::AwaitingStacksSearching) => (2, 2, Some(1)),
        (false, S::InTransit) => (1, 1, None),
        _ => {
            return Estimate {
                eta: Eta::Finished,
                alternatives: Alternatives::default(),
            }
        }
    };

    let due = |days| Eta::Due(today.saturating_add(Duration::days(days)));
    Estimate {
        eta: due(eta),
        alternatives: Alternatives {
            eta: Some(due(alt)),
            home: home.map(due),
        },
    }
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    use Status as S;

    const TODAY: Date = date!(2026 - 10 - 19);

    fn due(days: i64) -> Option<Eta> {
        Some(Eta::Due(TODAY + Duration::days(days)))
    }

    #[test]
    fn same_branch_circulation_processing() {
        let e = estimate(&S::AwaitingCirculationProcessing, true, TODAY);
        assert_eq!(Some(e.eta), due(2));
        assert_eq!(e.alternatives.eta, due(3));
        assert_eq!(e.alternatives.home, None);
    }

    #[test]
    fn same_branch_stacks_searching() {
        let e = estimate(&S::AwaitingStacksSearching, true, TODAY);
        assert_eq!(Some(e.eta), due(1));
        assert_eq!(e.alternatives.eta, due(2));
        assert_eq!(e.alternatives.home, None);
    }

    #[test]
    fn other_branch_circulation_processing() {
        let e = estimate(&S::AwaitingCirculationProcessing, false, TODAY);
        assert_eq!(Some(e.eta), due(3));
        assert_eq!(e.alternatives.eta, due(3));
        assert_eq!(e.alternatives.home, due(2));
    }

    #[test]
    fn other_branch_stacks_searching() {
        let e = estimate(&S::AwaitingStacksSearching, false, TODAY);
        assert_eq!(Some(e.eta), due(2));
        assert_eq!(e.alternatives.eta, due(2));
        assert_eq!(e.alternatives.home, due(1));
    }

    #[test]
    fn other_branch_in_transit() {
        let e = estimate(&S::InTransit, false, TODAY);
        assert_eq!(Some(e.eta), due(1));
        assert_eq!(e.alternatives.eta, due(1));
        assert_eq!(e.alternatives.home, None);
    }

    #[test]
    fn in_transit_to_home_branch_is_finished() {
        let e = estimate(&S::InTransit, true, TODAY);
        assert_eq!(e.eta, Eta::Finished);
        assert_eq!(e.alternatives, Alternatives::default());
    }

    #[test]
    fn unknown_and_terminal_statuses_are_finished() {
        for status in [S::Finished, S::Other("Lost".into())] {
            for same_branch in [true, false] {
                let e = estimate(&status, same_branch, TODAY);
                assert_eq!(e.eta, Eta::Finished);
                assert_eq!(e.alternatives, Alternatives::default());
            }
        }
    }

    #[test]
    fn renders_month_day_year() {
        let eta = Eta::Due(date!(2026 - 01 - 05));
        assert_eq!(eta.to_string(), "01-05-2026");
        assert_eq!(Eta::Finished.to_string(), "Request Finished");
    }

    #[test]
    fn alternatives_omit_absent_entries() {
        let e = estimate(&S::InTransit, false, TODAY);
        let json = serde_json::to_value(e.alternatives).unwrap();
        assert_eq!(json, serde_json::json!({"eta": "10-20-2026"}));

        let json = serde_json::to_value(Alternatives::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn parses_rendered_eta() {
        let eta = serde_json::from_str::<Eta>("\"10-21-2026\"").unwrap();
        assert_eq!(eta, Eta::Due(date!(2026 - 10 - 21)));
        let eta = serde_json::from_str::<Eta>("\"Request Finished\"").unwrap();
        assert_eq!(eta, Eta::Finished);
    }
}
