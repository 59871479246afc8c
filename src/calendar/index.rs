use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::database::models::ExceptionDay;

/// Point-in-time membership index over the exception calendar.
///
/// Built from the spans intersecting one query window; spans are clipped to
/// the window before expansion, so an index never grows beyond the window it
/// was built for. Membership is set-based: overlapping spans of any kind
/// count a day once.
#[derive(Debug, Clone)]
pub struct CalendarIndex {
    window_start: NaiveDate,
    window_end: NaiveDate,
    excluded: BTreeSet<NaiveDate>,
}

impl CalendarIndex {
    pub fn from_spans(
        window_start: NaiveDate,
        window_end: NaiveDate,
        spans: &[ExceptionDay],
    ) -> Self {
        let mut excluded = BTreeSet::new();

        for span in spans {
            // Clip to the window; spans fully outside contribute nothing.
            let from = span.start_date.max(window_start);
            let to = span.end_date.min(window_end);
            if from > to {
                continue;
            }

            let mut day = from;
            while day <= to {
                excluded.insert(day);
                match day.succ_opt() {
                    Some(next) => day = next,
                    None => break,
                }
            }
        }

        CalendarIndex {
            window_start,
            window_end,
            excluded,
        }
    }

    pub fn empty(window_start: NaiveDate, window_end: NaiveDate) -> Self {
        CalendarIndex {
            window_start,
            window_end,
            excluded: BTreeSet::new(),
        }
    }

    /// True when `day` falls inside any holiday or weekend span.
    pub fn is_exception(&self, day: NaiveDate) -> bool {
        self.excluded.contains(&day)
    }

    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        (self.window_start, self.window_end)
    }

    /// True when `[start, end]` is fully inside the window this index was
    /// built for; queries outside it would silently see zero exceptions.
    pub fn covers(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.window_start <= start && end <= self.window_end
    }
}
