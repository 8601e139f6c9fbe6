//! Session reconstruction: per-(user, session) chronological event sequences.

mod index;

pub use index::SessionIndex;

use chrono::{DateTime, Utc};

use crate::ingest::Event;

/// Seconds from `from` to `to`; `None` when the span does not fit the clock's range.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<f64> {
    (to - from).num_microseconds().map(|us| us as f64 / 1_000_000.0)
}

/// Borrowed view of one session inside a [`SessionIndex`]. Events are in
/// ascending `event_time` order.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    pub user_id: &'a str,
    pub session_id: &'a str,
    members: &'a [usize],
    pool: &'a [Event],
}

/// Two consecutive events of a session and the seconds between them.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub from: &'a Event,
    pub to: &'a Event,
    pub secs: f64,
}

impl<'a> Session<'a> {
    pub(crate) fn new(user_id: &'a str, session_id: &'a str, members: &'a [usize], pool: &'a [Event]) -> Self {
        Self {
            user_id,
            session_id,
            members,
            pool,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &'a Event> + 'a {
        let (members, pool) = (self.members, self.pool);
        members.iter().map(move |&i| &pool[i])
    }

    pub fn first(&self) -> Option<&'a Event> {
        let pool = self.pool;
        self.members.first().map(|&i| &pool[i])
    }

    pub fn last(&self) -> Option<&'a Event> {
        let pool = self.pool;
        self.members.last().map(|&i| &pool[i])
    }

    /// Visited paths in order, repeats included.
    pub fn path_sequence(&self) -> Vec<&'a str> {
        self.events().map(|e| e.path.as_str()).collect()
    }

    /// Adjacent event pairs with their time delta. Pairs whose delta cannot be
    /// represented are skipped.
    pub fn steps(&self) -> impl Iterator<Item = Step<'a>> + 'a {
        let (members, pool) = (self.members, self.pool);
        members.windows(2).filter_map(move |w| {
            let (from, to) = (&pool[w[0]], &pool[w[1]]);
            seconds_between(from.event_time, to.event_time).map(|secs| Step { from, to, secs })
        })
    }

    /// Last minus first event time, in minutes; 0 below two events.
    pub fn duration_minutes(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }
        match (self.first(), self.last()) {
            (Some(a), Some(b)) => seconds_between(a.event_time, b.event_time)
                .map(|s| s / 60.0)
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}
