//! Home page spotlight: one random marker, biased against immediate repeats.

use rand::Rng;

use crate::types::MarkerId;

/// Flavour lines shown next to a spotlight pick.
pub const QUIPS: &[&str] = &[
    "Again? Respect.",
    "Ok. One more.",
    "Chef’s pick.",
    "Lucky find.",
    "This one slaps.",
];

/// Anything the spotlight can pick from.
pub trait SpotlightCandidate {
    fn candidate_id(&self) -> MarkerId;
    fn rating_count(&self) -> i64;
}

/// Picker state for one browsing session.
///
/// Only the last shown id is remembered. It is used to redraw once when the
/// same marker comes up twice in a row, which makes repeats less likely but
/// does not rule them out.
#[derive(Debug, Clone, Default)]
pub struct Spotlight {
    last_shown: Option<MarkerId>,
}

impl Spotlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a session whose last pick is known.
    pub fn resume(last_shown: Option<MarkerId>) -> Self {
        Self { last_shown }
    }

    pub fn last_shown(&self) -> Option<MarkerId> {
        self.last_shown
    }

    /// Pick a marker.
    ///
    /// Markers with at least one vote are preferred; when none has votes the
    /// whole list is the pool. Returns `None` only for an empty list.
    pub fn pick<'a, T, R>(&mut self, candidates: &'a [T], rng: &mut R) -> Option<&'a T>
    where
        T: SpotlightCandidate,
        R: Rng + ?Sized,
    {
        let voted: Vec<&T> = candidates.iter().filter(|c| c.rating_count() > 0).collect();
        let pool: Vec<&T> = if voted.is_empty() {
            candidates.iter().collect()
        } else {
            voted
        };

        if pool.is_empty() {
            return None;
        }

        let mut chosen = pool[rng.random_range(0..pool.len())];
        if pool.len() > 1 && Some(chosen.candidate_id()) == self.last_shown {
            chosen = pool[rng.random_range(0..pool.len())];
        }

        self.last_shown = Some(chosen.candidate_id());
        Some(chosen)
    }
}

/// Pick one of the [`QUIPS`].
pub fn pick_quip<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    QUIPS[rng.random_range(0..QUIPS.len())]
}
