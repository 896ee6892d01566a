//! Category selection policies.
//!
//! Two policies share one injectable randomness source:
//! - [`pick_any`] serves `next_scenario` when no category is requested. It
//!   ignores progress and may repeat.
//! - [`suggest_next`] serves `process_response`. It only considers categories
//!   the session has not completed, and returns [`NextStep::AllCompleted`] once
//!   none remain.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::ScenarioCatalog;
use crate::model::NextStep;

/// Picks one entry out of a non-empty candidate list.
pub trait CategorySelector: Send + Sync {
    /// Return the index of the chosen candidate, or `None` if the list is empty.
    fn pick(&self, candidates: &[String]) -> Option<usize>;
}

/// Uniform random selection.
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible selection sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl CategorySelector for RandomSelector {
    fn pick(&self, candidates: &[String]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(rng.gen_range(0..candidates.len()))
    }
}

/// Always picks the first candidate. Candidates arrive in catalog order, so
/// this walks the catalog front to back.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstSelector;

impl CategorySelector for FirstSelector {
    fn pick(&self, candidates: &[String]) -> Option<usize> {
        if candidates.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

/// Any configured category, ignoring progress.
pub fn pick_any(selector: &dyn CategorySelector, catalog: &ScenarioCatalog) -> Option<String> {
    let categories = catalog.categories();
    selector
        .pick(categories)
        .and_then(|i| categories.get(i))
        .cloned()
}

/// A category the session has not completed yet, or the terminal sentinel.
pub fn suggest_next(
    selector: &dyn CategorySelector,
    catalog: &ScenarioCatalog,
    completed: &[String],
) -> NextStep {
    let remaining: Vec<String> = catalog
        .categories()
        .iter()
        .filter(|c| !completed.contains(c))
        .cloned()
        .collect();

    match selector.pick(&remaining).and_then(|i| remaining.get(i)) {
        Some(category) => NextStep::Category(category.clone()),
        None => NextStep::AllCompleted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ScenarioCatalog {
        ScenarioCatalog::new(&["beginner"], &["a", "b", "c"]).unwrap()
    }

    #[test]
    fn first_selector_walks_catalog_order() {
        let catalog = catalog();
        assert_eq!(pick_any(&FirstSelector, &catalog).as_deref(), Some("a"));
        assert_eq!(
            suggest_next(&FirstSelector, &catalog, &["a".to_string()]),
            NextStep::Category("b".into())
        );
    }

    #[test]
    fn suggestion_skips_completed_categories() {
        let catalog = catalog();
        let selector = RandomSelector::seeded(7);
        for _ in 0..50 {
            let step = suggest_next(&selector, &catalog, &["a".to_string(), "c".to_string()]);
            assert_eq!(step, NextStep::Category("b".into()));
        }
    }

    #[test]
    fn suggestion_is_terminal_when_everything_is_done() {
        let catalog = catalog();
        let done: Vec<String> = vec!["c".into(), "a".into(), "b".into()];
        assert!(suggest_next(&RandomSelector::new(), &catalog, &done).is_terminal());
    }

    #[test]
    fn seeded_selectors_agree() {
        let catalog = catalog();
        let left = RandomSelector::seeded(42);
        let right = RandomSelector::seeded(42);
        for _ in 0..20 {
            assert_eq!(pick_any(&left, &catalog), pick_any(&right, &catalog));
        }
    }

    #[test]
    fn random_pick_covers_every_category() {
        let catalog = catalog();
        let selector = RandomSelector::seeded(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(pick_any(&selector, &catalog).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn empty_candidates_yield_none() {
        assert_eq!(FirstSelector.pick(&[]), None);
        assert_eq!(RandomSelector::seeded(3).pick(&[]), None);
    }
}
