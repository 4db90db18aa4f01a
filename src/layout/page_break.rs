//! # Page Break Decisions
//!
//! Decides how many of a run of unbreakable units (table rows, note lines)
//! stay on the current page. Orphan and widow limits keep a page from ending
//! with a lone unit or starting with one, so the invoice's total row is never
//! stranded on a page by itself.

/// What to do with a run of units at the current position.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// All units fit on the current page.
    Place,
    /// None should go on this page; start a new one.
    MoveToNextPage,
    /// Place the first `units_on_current_page`, continue the rest on a new page.
    Split { units_on_current_page: usize },
}

/// Orphan/widow limits for one kind of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakRules {
    /// Fewest units allowed at the bottom of a page before a break.
    pub min_orphans: usize,
    /// Fewest units allowed at the top of the next page after a break.
    pub min_widows: usize,
}

impl BreakRules {
    /// Any split is acceptable.
    pub const NONE: BreakRules = BreakRules {
        min_orphans: 1,
        min_widows: 1,
    };
}

/// Given the space left on a page and the height of each unit, decide how to break.
pub fn decide_break(remaining_height: f64, heights: &[f64], rules: BreakRules) -> BreakDecision {
    let total: f64 = heights.iter().sum();
    if total <= remaining_height {
        return BreakDecision::Place;
    }

    let mut running = 0.0;
    let mut fit_count = 0;
    for &h in heights {
        if running + h > remaining_height {
            break;
        }
        running += h;
        fit_count += 1;
    }

    let total_units = heights.len();

    if fit_count == 0 || (fit_count < rules.min_orphans && fit_count < total_units) {
        return BreakDecision::MoveToNextPage;
    }

    let carried = total_units - fit_count;
    if carried > 0 && carried < rules.min_widows {
        let adjusted = fit_count.saturating_sub(rules.min_widows - carried);
        if adjusted == 0 || adjusted < rules.min_orphans {
            return BreakDecision::MoveToNextPage;
        }
        return BreakDecision::Split {
            units_on_current_page: adjusted,
        };
    }

    BreakDecision::Split {
        units_on_current_page: fit_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: BreakRules = BreakRules {
        min_orphans: 2,
        min_widows: 2,
    };

    #[test]
    fn everything_fits() {
        assert_eq!(decide_break(100.0, &[20.0, 30.0, 40.0], ROWS), BreakDecision::Place);
    }

    #[test]
    fn empty_run_fits() {
        assert_eq!(decide_break(0.0, &[], ROWS), BreakDecision::Place);
    }

    #[test]
    fn split_at_right_point() {
        assert_eq!(
            decide_break(55.0, &[20.0, 30.0, 40.0], BreakRules::NONE),
            BreakDecision::Split {
                units_on_current_page: 2
            }
        );
    }

    #[test]
    fn nothing_fits_moves() {
        assert_eq!(
            decide_break(10.0, &[20.0, 30.0], BreakRules::NONE),
            BreakDecision::MoveToNextPage
        );
    }

    #[test]
    fn negative_space_moves() {
        assert_eq!(
            decide_break(-5.0, &[1.0], BreakRules::NONE),
            BreakDecision::MoveToNextPage
        );
    }

    #[test]
    fn orphan_control() {
        // Only 1 unit would fit, but min_orphans is 2
        assert_eq!(
            decide_break(25.0, &[20.0, 30.0, 40.0], ROWS),
            BreakDecision::MoveToNextPage
        );
    }

    #[test]
    fn widow_control_pulls_units_back() {
        // 3 of 4 fit, leaving 1 widow (min 2) → keep 2 here
        assert_eq!(
            decide_break(70.0, &[20.0, 20.0, 20.0, 20.0], ROWS),
            BreakDecision::Split {
                units_on_current_page: 2
            }
        );
    }

    #[test]
    fn widow_control_that_would_orphan_moves_everything() {
        // 2 of 3 fit, 1 widow → 1 left here, below min_orphans
        assert_eq!(
            decide_break(45.0, &[20.0, 20.0, 20.0], ROWS),
            BreakDecision::MoveToNextPage
        );
    }
}
