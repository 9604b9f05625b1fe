//! Server-rendered pages.
//!
//! Markup is kept minimal; every interpolated value goes through [`escape`].

use std::{borrow::Cow, fmt::Write as _};

use crate::{api, eta::Alternatives};

pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n{body}</body>\n\
         </html>\n",
        escape(title),
    )
}

fn list_items(out: &mut String, class: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "<ul class=\"{class}\">");
    for item in items {
        let _ = writeln!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>\n");
}

fn pickup_select(out: &mut String, pickups: &[String]) {
    out.push_str("<select name=\"pickup\">\n");
    for pickup in pickups {
        let _ = writeln!(
            out,
            "<option value=\"{0}\">{0}</option>",
            escape(pickup),
        );
    }
    out.push_str("</select>\n");
}

/// Read-only list of branches with the current pickup marked.
fn pickup_list(out: &mut String, pickups: &[String], current: &str) {
    out.push_str("<ul class=\"pickups\">\n");
    for pickup in pickups {
        let attr = if pickup == current {
            " class=\"selected\""
        } else {
            ""
        };
        let _ = writeln!(out, "<li{attr}>{}</li>", escape(pickup));
    }
    out.push_str("</ul>\n");
}

pub fn ticket_list(tickets: &[api::Ticket], query: &str) -> String {
    let mut body = String::from("<h1>Help tickets</h1>\n");
    let _ = writeln!(
        body,
        "<form method=\"get\" action=\"/tickets\">\
         <input name=\"query\" value=\"{}\"> <button>Search</button></form>",
        escape(query),
    );
    body.push_str("<ul class=\"tickets\">\n");
    for t in tickets {
        let _ = writeln!(
            body,
            "<li><a href=\"/ticket/{id}\">{title}</a> \
             <span class=\"priority\">{priority}</span> \
             <time>{time}</time></li>",
            id = escape(t.id.as_str()),
            title = escape(&t.title),
            priority = t.priority,
            time = t.time,
        );
    }
    body.push_str("</ul>\n");
    body.push_str(
        "<h2>New ticket</h2>\n\
         <form method=\"post\" action=\"/tickets\">\n\
         <input name=\"title\" placeholder=\"Title\">\n\
         <textarea name=\"description\" placeholder=\"Description\">\
         </textarea>\n\
         <button>Create</button>\n\
         </form>\n",
    );
    page("Help tickets", &body)
}

pub fn ticket(ticket: &api::Ticket) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<h1>{title}</h1>\n\
         <p class=\"description\">{description}</p>\n\
         <dl>\n\
         <dt>ID</dt><dd>{id}</dd>\n\
         <dt>Priority</dt><dd class=\"priority\">{priority}</dd>\n\
         <dt>Created</dt><dd><time>{time}</time></dd>\n\
         </dl>",
        title = escape(&ticket.title),
        description = escape(&ticket.description),
        id = escape(ticket.id.as_str()),
        priority = ticket.priority,
        time = ticket.time,
    );
    list_items(&mut body, "comments", &ticket.comments);
    body.push_str("<p><a href=\"/tickets\">All tickets</a></p>\n");
    page(&ticket.title, &body)
}

fn request_summary(out: &mut String, request: &api::Request) {
    let _ = writeln!(
        out,
        "<dl>\n\
         <dt>ID</dt><dd>{id}</dd>\n\
         <dt>Patron</dt><dd>{username}</dd>\n\
         <dt>OCLC</dt><dd>{oclc}</dd>\n\
         <dt>Location</dt><dd>{location}</dd>\n\
         <dt>Pickup</dt><dd class=\"pickup\">{pickup}</dd>\n\
         <dt>Status</dt><dd class=\"status\">{status}</dd>\n\
         <dt>ETA</dt><dd class=\"eta\">{eta}</dd>\n\
         <dt>Requested</dt><dd><time>{time}</time></dd>\n\
         </dl>",
        id = request.id,
        username = escape(&request.username),
        oclc = escape(&request.oclc),
        location = escape(&request.location),
        pickup = escape(&request.pickup),
        status = escape(request.status.as_str()),
        eta = request.eta,
        time = request.time,
    );
}

pub fn request_list(
    requests: &[api::Request],
    query: &str,
    pickups: &[String],
) -> String {
    let mut body = String::from("<h1>Pickup requests</h1>\n");
    let _ = writeln!(
        body,
        "<form method=\"get\" action=\"/requests\">\
         <input name=\"query\" value=\"{}\"> <button>Search</button></form>",
        escape(query),
    );
    body.push_str("<ul class=\"requests\">\n");
    for r in requests {
        let _ = writeln!(
            body,
            "<li><a href=\"/request/{id}\">{title}</a> \
             <span class=\"pickup\">{pickup}</span> \
             <span class=\"status\">{status}</span> \
             <a href=\"/request/eta/{id}\">ETA</a></li>",
            id = r.id,
            title = escape(&r.title),
            pickup = escape(&r.pickup),
            status = escape(r.status.as_str()),
        );
    }
    body.push_str("</ul>\n");
    body.push_str(
        "<h2>New request</h2>\n\
         <form method=\"post\" action=\"/requests\">\n\
         <input name=\"username\" placeholder=\"Username\">\n\
         <input name=\"title\" placeholder=\"Title\">\n\
         <input name=\"location\" placeholder=\"Item location\">\n\
         <input name=\"oclc\" placeholder=\"OCLC number\">\n",
    );
    pickup_select(&mut body, pickups);
    body.push_str("<button>Request</button>\n</form>\n");
    page("Pickup requests", &body)
}

pub fn request(request: &api::Request, pickups: &[String]) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape(&request.title));
    request_summary(&mut body, request);
    list_items(&mut body, "notes", &request.notes);
    body.push_str("<h2>Pickup branches</h2>\n");
    pickup_list(&mut body, pickups, &request.pickup);
    let _ = writeln!(
        body,
        "<p><a href=\"/request/eta/{}\">Other ETAs</a> \
         <a href=\"/requests\">All requests</a></p>",
        request.id,
    );
    page(&request.title, &body)
}

pub fn eta(
    request: &api::Request,
    alternatives: &Alternatives,
    pickups: &[String],
) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>ETA for {}</h1>", escape(&request.title));
    request_summary(&mut body, request);
    body.push_str("<ul class=\"alternatives\">\n");
    if let Some(eta) = alternatives.eta {
        let _ = writeln!(
            body,
            "<li>Another pickup branch: <span class=\"eta\">{eta}</span></li>",
        );
    }
    if let Some(home) = alternatives.home {
        let _ = writeln!(
            body,
            "<li>Pickup at {}: <span class=\"home\">{home}</span></li>",
            escape(&request.location),
        );
    }
    body.push_str("</ul>\n");
    pickup_list(&mut body, pickups, &request.pickup);
    let _ = writeln!(
        body,
        "<p><a href=\"/request/{}\">Back to request</a></p>",
        request.id,
    );
    page("Estimated arrival", &body)
}
