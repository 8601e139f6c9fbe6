//! Partition of a time-sorted event list by user, then session.

use std::collections::HashMap;
use tracing::info;

use super::Session;
use crate::ingest::{sort_chronologically, Event};

#[derive(Debug, Clone)]
struct SessionSlot {
    session_id: String,
    /// Indices into `SessionIndex::events`, ascending
    members: Vec<usize>,
}

#[derive(Debug, Clone)]
struct UserSessions {
    user_id: String,
    sessions: Vec<SessionSlot>,
    by_id: HashMap<String, usize>,
}

/// Read-only grouping of validated events. Users and sessions are kept in
/// the order they first appear in the sorted input.
#[derive(Debug, Clone, Default)]
pub struct SessionIndex {
    events: Vec<Event>,
    users: Vec<UserSessions>,
    by_user: HashMap<String, usize>,
}

impl SessionIndex {
    /// Group events that are already in ascending `event_time` order.
    /// Order is not re-checked; within each session arrival order is kept.
    pub fn build(events: Vec<Event>) -> Self {
        let mut users: Vec<UserSessions> = Vec::new();
        let mut by_user: HashMap<String, usize> = HashMap::new();

        for (i, e) in events.iter().enumerate() {
            let ui = *by_user.entry(e.user_id.clone()).or_insert_with(|| {
                users.push(UserSessions {
                    user_id: e.user_id.clone(),
                    sessions: Vec::new(),
                    by_id: HashMap::new(),
                });
                users.len() - 1
            });
            let user = &mut users[ui];
            let si = match user.by_id.get(&e.session_id) {
                Some(&si) => si,
                None => {
                    user.by_id.insert(e.session_id.clone(), user.sessions.len());
                    user.sessions.push(SessionSlot {
                        session_id: e.session_id.clone(),
                        members: Vec::new(),
                    });
                    user.sessions.len() - 1
                }
            };
            user.sessions[si].members.push(i);
        }

        let index = Self {
            events,
            users,
            by_user,
        };
        info!(
            users = index.user_count(),
            sessions = index.session_count(),
            "grouped sessions"
        );
        index
    }

    /// Sort once (stable) then group.
    pub fn from_unsorted(mut events: Vec<Event>) -> Self {
        sort_chronologically(&mut events);
        Self::build(events)
    }

    /// All events in chronological order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn session_count(&self) -> usize {
        self.users.iter().map(|u| u.sessions.len()).sum()
    }

    pub fn avg_sessions_per_user(&self) -> f64 {
        if self.users.is_empty() {
            0.0
        } else {
            self.session_count() as f64 / self.user_count() as f64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every session, user by user.
    pub fn sessions(&self) -> impl Iterator<Item = Session<'_>> + '_ {
        let pool = self.events.as_slice();
        self.users.iter().flat_map(move |u| {
            u.sessions
                .iter()
                .map(move |s| Session::new(&u.user_id, &s.session_id, &s.members, pool))
        })
    }

    pub fn session(&self, user_id: &str, session_id: &str) -> Option<Session<'_>> {
        let user = &self.users[*self.by_user.get(user_id)?];
        let slot = &user.sessions[*user.by_id.get(session_id)?];
        Some(Session::new(&user.user_id, &slot.session_id, &slot.members, &self.events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn conserves_every_event() {
        let index = SessionIndex::from_unsorted(vec![
            Event::new("u1", "s1", at(5), "/b"),
            Event::new("u2", "s1", at(1), "/x"),
            Event::new("u1", "s1", at(0), "/a"),
            Event::new("u1", "s2", at(9), "/c"),
        ]);
        let total: usize = index.sessions().map(|s| s.len()).sum();
        assert_eq!(total, 4);
        assert_eq!(index.user_count(), 2);
        assert_eq!(index.session_count(), 3);
        assert_eq!(index.avg_sessions_per_user(), 1.5);
    }

    #[test]
    fn session_id_is_scoped_to_user() {
        let index = SessionIndex::build(vec![
            Event::new("alice", "s1", at(0), "/a"),
            Event::new("bob", "s1", at(1), "/b"),
        ]);
        assert_eq!(index.session_count(), 2);
        assert_eq!(index.session("alice", "s1").unwrap().path_sequence(), ["/a"]);
        assert_eq!(index.session("bob", "s1").unwrap().path_sequence(), ["/b"]);
        assert!(index.session("carol", "s1").is_none());
    }

    #[test]
    fn sessions_keep_chronological_order() {
        let index = SessionIndex::from_unsorted(vec![
            Event::new("u", "s", at(20), "/third"),
            Event::new("u", "s", at(0), "/first"),
            Event::new("u", "s", at(10), "/second"),
        ]);
        let s = index.session("u", "s").unwrap();
        assert_eq!(s.path_sequence(), ["/first", "/second", "/third"]);
        let times: Vec<_> = s.events().map(|e| e.event_time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn empty_input_groups_to_nothing() {
        let index = SessionIndex::build(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.sessions().count(), 0);
        assert_eq!(index.avg_sessions_per_user(), 0.0);
    }
}
