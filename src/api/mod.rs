pub mod request;
pub mod ticket;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use self::{request::Request, ticket::Ticket};

/// JSON-LD envelope adding the collection's `@context` to a resource.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Contextual<T> {
    #[serde(rename = "@context")]
    pub context: serde_json::Value,
    #[serde(flatten)]
    pub resource: T,
}

/// Per-field messages of a rejected payload.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Takes a required value, recording an error if it is absent or empty.
    pub fn require(
        &mut self,
        field: &'static str,
        value: Option<String>,
    ) -> String {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                self.0.insert(
                    field.to_owned(),
                    format!("'{field}' is a required value"),
                );
                String::new()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Yields `value` unless something has been recorded.
    pub fn check<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}
