//! Per-visitor UI state and the reducer that advances it. The state is plain data the
//! client keeps between requests; nothing here reads global state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::filter::FilterState;
use crate::catalog::rng::fresh_seed;
use crate::catalog::sort::SortMode;

pub const INITIAL_DISPLAY_LIMIT: usize = 10;
pub const DISPLAY_STEP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub initial: usize,
    pub step: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            initial: INITIAL_DISPLAY_LIMIT,
            step: DISPLAY_STEP,
        }
    }
}

/// Open/closed panels of one beer card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    #[serde(default)]
    pub comment_open: bool,
    #[serde(default)]
    pub brewery_open: bool,
}

impl Disclosure {
    fn is_closed(&self) -> bool {
        !self.comment_open && !self.brewery_open
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub filters: FilterState,
    pub display_limit: usize,
    /// Soft-deleted ids; session only, never written to the source.
    pub removed_ids: BTreeSet<i64>,
    pub disclosures: BTreeMap<i64, Disclosure>,
    /// Seed of the current random ordering; `None` outside random mode.
    pub random_seed: Option<u64>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            display_limit: INITIAL_DISPLAY_LIMIT,
            removed_ids: BTreeSet::new(),
            disclosures: BTreeMap::new(),
            random_seed: None,
        }
    }
}

impl SessionState {
    pub fn with_paging(paging: &Paging) -> Self {
        Self {
            display_limit: paging.initial,
            ..Self::default()
        }
    }

    pub fn disclosure(&self, id: i64) -> Disclosure {
        self.disclosures.get(&id).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Replace the filter inputs (search, sort, size, ranges, country, styles, stock flags).
    SetFilters { filters: FilterState },
    ShowMore,
    Remove { id: i64 },
    ToggleComment { id: i64 },
    /// Open the brewery panel of this card, closing any other; again to close.
    ToggleBrewery { id: i64 },
    /// Back to defaults; also restores removed beers.
    Reset,
}

/// Apply one interaction, drawing a fresh seed from the OS when random mode needs one.
pub fn reduce(session: SessionState, action: &Action, paging: &Paging) -> SessionState {
    reduce_with_seed(session, action, paging, &mut fresh_seed)
}

pub fn reduce_with_seed(
    mut session: SessionState,
    action: &Action,
    paging: &Paging,
    next_seed: &mut dyn FnMut() -> u64,
) -> SessionState {
    if session.display_limit == 0 {
        session.display_limit = paging.initial;
    }

    match action {
        Action::SetFilters { filters } => {
            if *filters != session.filters {
                session.filters = filters.clone();
                session.display_limit = paging.initial;
                session.disclosures.clear();
                session.random_seed = None;
            }
        }
        Action::ShowMore => {
            session.display_limit = session.display_limit.saturating_add(paging.step);
        }
        Action::Remove { id } => {
            session.removed_ids.insert(*id);
            session.disclosures.remove(id);
        }
        Action::ToggleComment { id } => {
            let entry = session.disclosures.entry(*id).or_default();
            entry.comment_open = !entry.comment_open;
        }
        Action::ToggleBrewery { id } => {
            let was_open = session.disclosure(*id).brewery_open;
            for d in session.disclosures.values_mut() {
                d.brewery_open = false;
            }
            if !was_open {
                session.disclosures.entry(*id).or_default().brewery_open = true;
            }
        }
        Action::Reset => {
            session = SessionState::with_paging(paging);
        }
    }

    session.disclosures.retain(|_, d| !d.is_closed());

    match session.filters.sort {
        SortMode::Random => {
            if session.random_seed.is_none() {
                session.random_seed = Some(next_seed());
            }
        }
        _ => session.random_seed = None,
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds() -> impl FnMut() -> u64 {
        let mut n = 100;
        move || {
            n += 1;
            n
        }
    }

    fn apply(session: SessionState, action: Action, next: &mut dyn FnMut() -> u64) -> SessionState {
        reduce_with_seed(session, &action, &Paging::default(), next)
    }

    #[test]
    fn show_more_grows_and_filter_change_resets() {
        let mut next = seeds();
        let s = SessionState::default();
        let s = apply(s, Action::ShowMore, &mut next);
        let s = apply(s, Action::ShowMore, &mut next);
        assert_eq!(s.display_limit, 30);

        let same = s.filters.clone();
        let s = apply(s, Action::SetFilters { filters: same }, &mut next);
        assert_eq!(s.display_limit, 30, "unchanged filters keep the limit");

        let changed = FilterState {
            search_text: "ipa".to_string(),
            ..s.filters.clone()
        };
        let s = apply(s, Action::SetFilters { filters: changed }, &mut next);
        assert_eq!(s.display_limit, INITIAL_DISPLAY_LIMIT);
    }

    #[test]
    fn filter_change_closes_disclosures() {
        let mut next = seeds();
        let s = apply(SessionState::default(), Action::ToggleComment { id: 3 }, &mut next);
        assert!(s.disclosure(3).comment_open);
        let filters = FilterState {
            show_back_order: true,
            ..FilterState::default()
        };
        let s = apply(s, Action::SetFilters { filters }, &mut next);
        assert!(s.disclosures.is_empty());
    }

    #[test]
    fn only_one_brewery_panel_is_open() {
        let mut next = seeds();
        let s = apply(SessionState::default(), Action::ToggleBrewery { id: 1 }, &mut next);
        let s = apply(s, Action::ToggleBrewery { id: 2 }, &mut next);
        assert!(!s.disclosure(1).brewery_open);
        assert!(s.disclosure(2).brewery_open);
        let s = apply(s, Action::ToggleBrewery { id: 2 }, &mut next);
        assert!(s.disclosures.is_empty());
    }

    #[test]
    fn random_seed_is_drawn_on_entry_and_kept_while_paging() {
        let mut next = seeds();
        let random = FilterState {
            sort: SortMode::Random,
            ..FilterState::default()
        };
        let s = apply(SessionState::default(), Action::SetFilters { filters: random.clone() }, &mut next);
        let seed = s.random_seed;
        assert!(seed.is_some());

        let s = apply(s, Action::ShowMore, &mut next);
        let s = apply(s, Action::Remove { id: 9 }, &mut next);
        assert_eq!(s.random_seed, seed);

        let narrowed = FilterState {
            search_text: "stout".to_string(),
            ..random
        };
        let s = apply(s, Action::SetFilters { filters: narrowed }, &mut next);
        assert!(s.random_seed.is_some());
        assert_ne!(s.random_seed, seed, "filter change reshuffles");

        let s = apply(s, Action::SetFilters { filters: FilterState::default() }, &mut next);
        assert_eq!(s.random_seed, None);
    }

    #[test]
    fn reset_restores_removed_rows_and_defaults() {
        let mut next = seeds();
        let s = apply(SessionState::default(), Action::Remove { id: 4 }, &mut next);
        let s = apply(s, Action::ShowMore, &mut next);
        assert!(s.removed_ids.contains(&4));
        let s = apply(s, Action::Reset, &mut next);
        assert_eq!(s, SessionState::default());
    }

    #[test]
    fn actions_round_trip_through_json() {
        let action: Action = serde_json::from_str(r#"{"type":"remove","id":7}"#).unwrap();
        assert_eq!(action, Action::Remove { id: 7 });
        let state: SessionState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.display_limit, INITIAL_DISPLAY_LIMIT);
    }
}
