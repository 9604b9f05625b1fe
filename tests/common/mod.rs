#![allow(dead_code)]

use std::sync::Arc;

use constcat::concat;
use helpdesk::{api, config, http, store};
use reqwest::{header::LOCATION, redirect, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TICKETS: &str = "/tickets";
const TICKETS_JSON: &str = concat!(TICKETS, ".json");
const TICKET: &str = "/ticket";
const REQUESTS: &str = "/requests";
const REQUESTS_JSON: &str = concat!(REQUESTS, ".json");
const REQUEST: &str = "/request";
const REQUEST_ETA: &str = concat!(REQUEST, "/eta");

pub fn tickets() -> Value {
    json!({
        "@context": {"@vocab": "http://schema.org/"},
        "tickets": {
            "aaaaaa": {
                "id": "aaaaaa",
                "title": "Printer jam",
                "description": "Second floor printer is jammed",
                "priority": "low",
                "time": "10-01-2020 09:30",
                "comments": []
            },
            "bbbbbb": {
                "id": "bbbbbb",
                "title": "Password reset",
                "description": "Cannot log in to the PRINTER portal",
                "priority": "high",
                "time": "09-15-2020 14:00",
                "comments": ["Called the user"]
            },
            "cccccc": {
                "id": "cccccc",
                "title": "Projector <room 208>",
                "description": "Bulb is out",
                "priority": "closed",
                "time": "10-03-2020 08:00",
                "comments": []
            }
        }
    })
}

pub fn requests() -> Value {
    json!({
        "@context": {"@vocab": "http://schema.org/"},
        "requests": {
            "1": {
                "id": "1",
                "username": "alice",
                "title": "Moby Dick",
                "location": "Davis Library",
                "pickup": "Davis Library",
                "oclc": "1000",
                "status": "Awaiting Circulation Processing",
                "notes": [],
                "time": "10-01-2020 10:00"
            },
            "2": {
                "id": "2",
                "username": "bob",
                "title": "Dune",
                "location": "Davis Library",
                "pickup": "Art Library",
                "oclc": "2000",
                "status": "Awaiting Stacks Searching",
                "notes": [],
                "time": "10-02-2020 11:00"
            },
            "3": {
                "id": "3",
                "username": "carol",
                "title": "Emma",
                "location": "Law Library",
                "pickup": "SILS Library",
                "oclc": "3000",
                "status": "In Transit",
                "notes": ["Fragile"],
                "time": "10-03-2020 12:00"
            },
            "4": {
                "id": "4",
                "username": "alice",
                "title": "Walden",
                "location": "Science Library Annex",
                "pickup": "Science Library Annex",
                "oclc": "4000",
                "status": "Awaiting Stacks Searching",
                "notes": [],
                "time": "10-04-2020 13:00"
            },
            "5": {
                "id": "5",
                "username": "dave",
                "title": "Ulysses",
                "location": "Art Library",
                "pickup": "Davis Library",
                "oclc": "5000",
                "status": "Finished",
                "notes": [],
                "time": "10-05-2020 14:00"
            }
        }
    })
}

/// Non-2xx answer of the service.
#[derive(Debug)]
pub struct Failure {
    pub status: StatusCode,
    pub body: String,
}

impl Failure {
    pub fn message(&self) -> Value {
        serde_json::from_str::<Value>(&self.body)
            .expect("error body is not JSON")["message"]
            .clone()
    }
}

pub struct Client {
    inner: reqwest::Client,
    base_url: String,
    pub credentials: Option<(String, String)>,
}

impl Client {
    /// Starts a fresh service over the fixture data.
    pub async fn spawn() -> Self {
        Self::spawn_with(None).await
    }

    pub async fn spawn_with(auth: Option<config::Auth>) -> Self {
        Self::spawn_over(tickets(), requests(), auth).await
    }

    /// Starts a service over the given ticket and request documents.
    pub async fn spawn_over(
        tickets: Value,
        requests: Value,
        auth: Option<config::Auth>,
    ) -> Self {
        let store = store::Store::new(
            serde_json::from_value(tickets).expect("bad ticket fixture"),
            serde_json::from_value(requests).expect("bad request fixture"),
        );
        let state = Arc::new(http::AppState {
            store,
            library: config::Library::default(),
            auth,
        });
        let app = http::router(state, &config::Cors::default())
            .expect("failed to build router");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind");
        let addr = listener.local_addr().expect("no local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server failed");
        });

        Self {
            inner: reqwest::Client::builder()
                .redirect(redirect::Policy::none())
                .build()
                .expect("failed to build client"),
            base_url: format!("http://{addr}"),
            credentials: None,
        }
    }

    pub fn auth(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => req.basic_auth(user, Some(password)),
            None => req,
        }
    }

    pub async fn raw(&self, req: RequestBuilder) -> reqwest::Response {
        self.authorized(req)
            .send()
            .await
            .expect("failed to send a request")
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.inner.get(self.url(path))
    }

    pub fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> RequestBuilder {
        self.inner.request(method, self.url(path))
    }

    async fn json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<T, Failure> {
        let res = check(self.raw(req).await).await?;
        Ok(res.json::<T>().await.expect("failed to get a response"))
    }

    async fn text(&self, req: RequestBuilder) -> Result<String, Failure> {
        let res = check(self.raw(req).await).await?;
        Ok(res.text().await.expect("failed to get a response"))
    }

    pub async fn tickets_html(&self, query: &str) -> Result<String, Failure> {
        self.text(self.get(TICKETS).query(&[("query", query)])).await
    }

    pub async fn tickets(
        &self,
        query: &str,
        sort_by: Option<&str>,
    ) -> Result<api::ticket::List, Failure> {
        let mut req = self.get(TICKETS_JSON).query(&[("query", query)]);
        if let Some(sort_by) = sort_by {
            req = req.query(&[("sort_by", sort_by)]);
        }
        self.json(req).await
    }

    pub async fn ticket(
        &self,
        id: &str,
    ) -> Result<api::Contextual<api::Ticket>, Failure> {
        self.json(self.get(&format!("{TICKET}/{id}.json"))).await
    }

    pub async fn ticket_html(&self, id: &str) -> Result<String, Failure> {
        self.text(self.get(&format!("{TICKET}/{id}"))).await
    }

    /// Creates a ticket, returning the ID it was redirected to.
    pub async fn add_ticket(&self, payload: Value) -> Result<String, Failure> {
        let res = self
            .raw(self.request(reqwest::Method::POST, TICKETS).json(&payload))
            .await;
        if res.status() != StatusCode::SEE_OTHER {
            return Err(failure(res).await);
        }
        Ok(location(&res)
            .strip_prefix(concat!(TICKET, "/"))
            .expect("redirect outside of tickets")
            .to_owned())
    }

    pub async fn edit_ticket(
        &self,
        id: &str,
        payload: Value,
    ) -> Result<api::Contextual<api::Ticket>, Failure> {
        let path = format!("{TICKET}/{id}.json");
        self.json(self.request(reqwest::Method::PATCH, &path).json(&payload))
            .await
    }

    pub async fn requests_html(&self, query: &str) -> Result<String, Failure> {
        self.text(self.get(REQUESTS).query(&[("query", query)])).await
    }

    pub async fn requests_dump(&self) -> Result<Value, Failure> {
        self.json(self.get(REQUESTS_JSON)).await
    }

    pub async fn request_json(
        &self,
        id: &str,
    ) -> Result<api::Contextual<api::Request>, Failure> {
        self.json(self.get(&format!("{REQUEST}/{id}.json"))).await
    }

    pub async fn request_html(&self, id: &str) -> Result<String, Failure> {
        self.text(self.get(&format!("{REQUEST}/{id}"))).await
    }

    /// Creates a request, returning its `Location` and the page served.
    pub async fn add_request(
        &self,
        req: RequestBuilder,
    ) -> Result<(String, String), Failure> {
        let res = self.raw(req).await;
        if res.status() != StatusCode::CREATED {
            return Err(failure(res).await);
        }
        let location = location(&res);
        Ok((location, res.text().await.expect("failed to get a response")))
    }

    pub fn post_requests(&self) -> RequestBuilder {
        self.request(reqwest::Method::POST, REQUESTS)
    }

    pub async fn edit_request(
        &self,
        id: &str,
        payload: Value,
    ) -> Result<api::Contextual<api::Request>, Failure> {
        let path = format!("{REQUEST}/{id}.json");
        self.json(self.request(reqwest::Method::PATCH, &path).json(&payload))
            .await
    }

    pub async fn eta(
        &self,
        id: &str,
    ) -> Result<api::request::Alternatives, Failure> {
        self.json(self.get(&format!("{REQUEST_ETA}/{id}.json"))).await
    }

    pub async fn eta_html(&self, id: &str) -> Result<String, Failure> {
        self.text(self.get(&format!("{REQUEST_ETA}/{id}"))).await
    }
}

async fn check(res: reqwest::Response) -> Result<reqwest::Response, Failure> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(failure(res).await)
    }
}

async fn failure(res: reqwest::Response) -> Failure {
    Failure {
        status: res.status(),
        body: res.text().await.expect("failed to get a response"),
    }
}

fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get(LOCATION)
        .expect("no Location header")
        .to_str()
        .expect("Location is not text")
        .to_owned()
}
