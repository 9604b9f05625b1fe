use std::{net, path::PathBuf};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Config {
    pub data: Data,
    pub http: Http,
    #[serde(default)]
    pub library: Library,
    pub auth: Option<Auth>,
}

/// Locations of the JSON documents the store is loaded from.
#[derive(Deserialize)]
pub struct Data {
    pub tickets: PathBuf,
    pub requests: PathBuf,
}

#[derive(Deserialize)]
pub struct Http {
    pub server: Server,
    #[serde(default)]
    pub cors: Cors,
}

#[derive(Deserialize)]
pub struct Server {
    pub addr: net::SocketAddr,
}

#[derive(Deserialize)]
pub struct Cors {
    /// `*` allows any origin.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
            allowed_methods: ["GET", "PUT", "POST", "DELETE"]
                .map(String::from)
                .into(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct Library {
    pub pickup_locations: Vec<String>,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            pickup_locations: [
                "Davis Library",
                "Undergraduate Library",
                "Science Library Annex",
                "Art Library",
                "Law Library",
                "SILS Library",
            ]
            .map(String::from)
            .into(),
        }
    }
}

/// Credentials required on mutating routes.
///
/// Compared in plain text, so this only keeps honest clients honest.
#[derive(Clone, Deserialize)]
pub struct Auth {
    pub username: String,
    pub password: String,
}
