use serde::{Deserialize, Serialize};

/// Remembers when the hosting page was last hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVisibility {
    hidden_since_milli: Option<i64>,
}

impl PageVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a visibility transition. A second "hidden" signal keeps the
    /// original instant so the aggregator does not credit the gap between them.
    pub fn set_visible(&mut self, is_visible: bool, now_milli: i64) {
        if is_visible {
            self.hidden_since_milli = None;
        } else if self.hidden_since_milli.is_none() {
            self.hidden_since_milli = Some(now_milli);
        }
    }

    pub fn hidden_since(&self) -> Option<i64> {
        self.hidden_since_milli
    }

    pub fn is_visible(&self) -> bool {
        self.hidden_since_milli.is_none()
    }

    /// End of the visible part of `[tick_start, tick_end]`, or `None` when the
    /// page was hidden for the whole window.
    pub fn visible_until(&self, tick_start: i64, tick_end: i64) -> Option<i64> {
        match self.hidden_since_milli {
            None => Some(tick_end),
            Some(hidden_at) if hidden_at <= tick_start => None,
            Some(hidden_at) => Some(hidden_at.min(tick_end)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_visible() {
        let page = PageVisibility::new();
        assert!(page.is_visible());
        assert_eq!(page.visible_until(0, 250), Some(250));
    }

    #[test]
    fn hidden_before_tick_credits_nothing() {
        let mut page = PageVisibility::new();
        page.set_visible(false, 100);
        assert_eq!(page.visible_until(100, 350), None);
        assert_eq!(page.visible_until(200, 450), None);
    }

    #[test]
    fn hidden_mid_tick_cuts_window() {
        let mut page = PageVisibility::new();
        page.set_visible(false, 180);
        assert_eq!(page.visible_until(100, 350), Some(180));
    }

    #[test]
    fn repeated_hide_keeps_first_instant() {
        let mut page = PageVisibility::new();
        page.set_visible(false, 100);
        page.set_visible(false, 500);
        assert_eq!(page.hidden_since(), Some(100));
        page.set_visible(true, 600);
        assert_eq!(page.hidden_since(), None);
    }
}
