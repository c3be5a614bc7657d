//! Turning the backend's called-ticket list into announcement requests.

use serde::Deserialize;
use std::collections::HashSet;
use ticket_call::{ticket_key, to_millis, AnnouncementRequest};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// `calledAt` arrives either as epoch milliseconds or as an RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CalledAt {
    Millis(i64),
    Text(String),
}

impl CalledAt {
    pub fn to_millis(&self) -> Option<i64> {
        match self {
            CalledAt::Millis(ms) => Some(*ms),
            CalledAt::Text(raw) => {
                let raw = raw.trim();
                raw.parse::<i64>().ok().or_else(|| {
                    OffsetDateTime::parse(raw, &Rfc3339)
                        .ok()
                        .map(to_millis)
                })
            }
        }
    }
}

/// One row of `GET /called-tickets`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalledTicket {
    pub ticket_number: String,
    #[serde(default)]
    pub counter_number: Option<String>,
    #[serde(default)]
    pub status: String,
    pub called_at: Option<CalledAt>,
}

/// Called tickets with a counter, most recent first, one entry per ticket.
///
/// Rows without a parseable `calledAt` cannot be ordered and are dropped.
pub fn build_snapshot(tickets: Vec<CalledTicket>) -> Vec<AnnouncementRequest> {
    let mut calls: Vec<AnnouncementRequest> = tickets
        .into_iter()
        .filter(|t| t.status.trim().eq_ignore_ascii_case("called"))
        .filter_map(|t| {
            let counter = t.counter_number.as_deref().map(str::trim).unwrap_or("");
            if counter.is_empty() || t.ticket_number.trim().is_empty() {
                return None;
            }
            let called_at = t.called_at.as_ref().and_then(CalledAt::to_millis)?;
            Some(AnnouncementRequest::new(
                t.ticket_number.as_str(),
                counter,
                called_at,
            ))
        })
        .collect();

    // Stable sort keeps backend order for equal timestamps.
    calls.sort_by(|a, b| b.called_at_timestamp.cmp(&a.called_at_timestamp));

    let mut seen = HashSet::new();
    calls.retain(|c| seen.insert(ticket_key(&c.ticket_number)));
    calls
}

/// The call a poll tick should submit.
pub fn latest_call(tickets: Vec<CalledTicket>) -> Option<AnnouncementRequest> {
    build_snapshot(tickets).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(json: &str) -> Vec<CalledTicket> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn filters_sorts_and_dedups() {
        let tickets = rows(
            r#"[
                {"ticketNumber":"P-100","counterNumber":"1","status":"called","calledAt":1000},
                {"ticketNumber":"P-101","counterNumber":"2","status":"waiting","calledAt":5000},
                {"ticketNumber":"P-102","counterNumber":null,"status":"called","calledAt":4000},
                {"ticketNumber":"p-100","counterNumber":"3","status":"CALLED","calledAt":3000},
                {"ticketNumber":"P-103","counterNumber":"N/A","status":"called","calledAt":2000}
            ]"#,
        );
        let snapshot = build_snapshot(tickets);
        let summary: Vec<_> = snapshot
            .iter()
            .map(|c| (c.ticket_number.as_str(), c.counter_number.as_str(), c.called_at_timestamp))
            .collect();
        assert_eq!(
            summary,
            vec![("p-100", "3", 3000), ("P-103", "N/A", 2000)]
        );
    }

    #[test]
    fn called_at_formats() {
        assert_eq!(CalledAt::Millis(5).to_millis(), Some(5));
        assert_eq!(CalledAt::Text("42".into()).to_millis(), Some(42));
        assert_eq!(
            CalledAt::Text("2024-01-01T00:00:01Z".into()).to_millis(),
            Some(1_704_067_201_000)
        );
        assert_eq!(CalledAt::Text("yesterday".into()).to_millis(), None);
    }

    #[test]
    fn latest_of_empty_is_none() {
        assert!(latest_call(Vec::new()).is_none());
        let tickets = rows(r#"[{"ticketNumber":"A-1","counterNumber":"4","status":"called"}]"#);
        assert!(latest_call(tickets).is_none());
    }
}
