use super::TagMeta;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Visibility {
    Visible,
    Hidden,
}

/// Per-overlay hidden/visible state machine. Hiding degrades the overlay's
/// view range to zero instead of despawning it, so a condition that toggles
/// frequently (invisibility effects) never churns the viewer set. The
/// pre-hide view range is cached so the exact value comes back on restore.
#[derive(Debug)]
pub struct VisibilityState {
    state: Visibility,
    cached_view_range: f32,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self {
            state: Visibility::Visible,
            // Sentinel until the first hide caches a real range
            cached_view_range: -1.0,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.state == Visibility::Hidden
    }

    /// Drive the state machine toward `hidden_condition`, mutating `meta` to
    /// match. Returns true when a transition actually happened (callers send
    /// metadata only then). Idempotent: re-applying the current state never
    /// re-caches the zeroed range.
    pub fn apply(&mut self, hidden_condition: bool, meta: &mut TagMeta) -> bool {
        match (hidden_condition, self.state) {
            (true, Visibility::Visible) => {
                self.cached_view_range = meta.view_range;
                meta.view_range = 0.0;
                meta.invisible = true;
                self.state = Visibility::Hidden;
                true
            }
            (false, Visibility::Hidden) => {
                meta.view_range = self.cached_view_range;
                meta.invisible = false;
                self.state = Visibility::Visible;
                true
            }
            _ => false,
        }
    }
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hide_caches_and_zeroes_view_range() {
        let mut meta = TagMeta::new();
        meta.view_range = 1.5;
        let mut state = VisibilityState::new();

        assert!(state.apply(true, &mut meta));
        assert_eq!(meta.view_range, 0.0);
        assert!(meta.invisible);
        assert!(state.is_hidden());
    }

    #[test]
    fn double_hide_does_not_recache_zero() {
        let mut meta = TagMeta::new();
        meta.view_range = 1.5;
        let mut state = VisibilityState::new();

        assert!(state.apply(true, &mut meta));
        assert!(!state.apply(true, &mut meta));

        assert!(state.apply(false, &mut meta));
        assert_eq!(meta.view_range, 1.5);
        assert!(!meta.invisible);
    }

    #[test]
    fn show_without_prior_hide_is_a_no_op() {
        let mut meta = TagMeta::new();
        let mut state = VisibilityState::new();

        assert!(!state.apply(false, &mut meta));
        assert_eq!(meta.view_range, TagMeta::DEFAULT_VIEW_RANGE);
    }
}
