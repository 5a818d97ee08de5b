use chrono::NaiveDate;

use crate::notes::DayDocument;
use crate::stream::{build_stream_view, StreamView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadState {
    /// How many of the most recent days to load. Only grows.
    pub limit: usize,
    pub has_more: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub limit: usize,
    /// Day to keep focused once the new list arrives.
    pub anchor: Option<NaiveDate>,
}

/// Guide line and viewport over the flattened day stream.
#[derive(Debug)]
pub struct Navigator {
    days: Vec<DayDocument>,
    view: StreamView,
    guide: usize,
    offset: usize,
    height: usize,
    width: usize,
    load: LoadState,
    /// Reload asked for while a load was in flight, with its anchor.
    queued_reload: Option<Option<NaiveDate>>,
}

impl Navigator {
    pub fn new(limit: usize, width: usize, height: usize) -> Self {
        Self {
            days: Vec::new(),
            view: StreamView::default(),
            guide: 0,
            offset: 0,
            height: height.max(1),
            width,
            load: LoadState {
                limit,
                has_more: false,
                loading: false,
            },
            queued_reload: None,
        }
    }

    pub fn view(&self) -> &StreamView {
        &self.view
    }

    pub fn guide(&self) -> usize {
        self.guide
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn load(&self) -> LoadState {
        self.load
    }

    pub fn focused_day(&self) -> Option<usize> {
        self.view.day_of(self.guide)
    }

    pub fn focused_date(&self) -> Option<NaiveDate> {
        self.focused_day().and_then(|i| self.days.get(i)).map(|d| d.date)
    }

    pub fn move_guide(&mut self, delta: isize) {
        if self.view.is_empty() {
            return;
        }
        let target = self.guide.saturating_add_signed(delta);
        self.set_guide(target);
    }

    pub fn set_guide(&mut self, line: usize) {
        if self.view.is_empty() {
            self.guide = 0;
            self.offset = 0;
            return;
        }
        self.guide = line.min(self.view.len() - 1);
        self.ensure_visible();
    }

    /// Scrolls the least amount that keeps the guide on screen, never past
    /// the end of the content.
    pub fn ensure_visible(&mut self) {
        let len = self.view.len();
        if len == 0 {
            self.guide = 0;
            self.offset = 0;
            return;
        }
        self.guide = self.guide.min(len - 1);

        if self.guide < self.offset {
            self.offset = self.guide;
        } else if self.guide >= self.offset + self.height {
            self.offset = self.guide + 1 - self.height;
        }
        self.offset = self.offset.min(len.saturating_sub(self.height));
    }

    pub fn jump_to_day(&mut self, index: usize) {
        if let Some(&start) = self.view.day_start_line.get(index) {
            self.set_guide(start);
        }
    }

    /// Jumps to the start of the focused day, or to the previous day when
    /// already there.
    pub fn prev_day(&mut self) {
        let Some(day) = self.focused_day() else {
            return;
        };
        if self.guide > self.view.day_start_line[day] {
            self.jump_to_day(day);
        } else if day > 0 {
            self.jump_to_day(day - 1);
        }
    }

    pub fn next_day(&mut self) {
        if let Some(day) = self.focused_day() {
            self.jump_to_day(day + 1);
        }
    }

    pub fn top(&mut self) {
        self.set_guide(0);
    }

    pub fn bottom(&mut self) {
        self.set_guide(self.view.len().saturating_sub(1));
    }

    pub fn half_page(&self) -> isize {
        (self.height / 2).max(1) as isize
    }

    /// Pagination trigger, checked after every upward move: the guide sits
    /// on the first line, older days exist, and nothing is in flight.
    pub fn request_more(&mut self, step: usize) -> Option<LoadRequest> {
        if self.guide != 0 || !self.load.has_more || self.load.loading {
            return None;
        }
        self.load.limit += step;
        self.load.loading = true;
        tracing::debug!(limit = self.load.limit, "loading older days");
        Some(LoadRequest {
            limit: self.load.limit,
            anchor: self.focused_date(),
        })
    }

    /// Re-reads the current window, keeping `anchor` (or the focused day) in
    /// view. While another load is in flight the reload is queued and
    /// issued when that load settles, so at most one request is pending.
    pub fn reload_request(&mut self, anchor: Option<NaiveDate>) -> Option<LoadRequest> {
        if self.load.loading {
            let queued = self.queued_reload.flatten();
            self.queued_reload = Some(anchor.or(queued));
            return None;
        }
        self.load.loading = true;
        Some(LoadRequest {
            limit: self.load.limit,
            anchor: anchor.or_else(|| self.focused_date()),
        })
    }

    fn take_queued_reload(&mut self) -> Option<LoadRequest> {
        let anchor = self.queued_reload.take()?;
        self.reload_request(anchor)
    }

    /// Replaces every day wholesale and re-locates focus: the anchor day if
    /// it is still present, else the previously focused index, else the
    /// most recent day. Returns a queued reload, if any, now due.
    pub fn apply_loaded(
        &mut self,
        days: Vec<DayDocument>,
        has_more: bool,
        anchor: Option<NaiveDate>,
    ) -> Option<LoadRequest> {
        let previous = self.focused_day();

        self.days = days;
        self.load.has_more = has_more;
        self.load.loading = false;
        self.view = build_stream_view(&self.days, self.width);

        if self.days.is_empty() {
            self.guide = 0;
            self.offset = 0;
        } else {
            let focus = anchor
                .and_then(|date| self.days.iter().position(|d| d.date == date))
                .or(previous.filter(|&i| i < self.days.len()))
                .unwrap_or(self.days.len() - 1);
            self.jump_to_day(focus);
        }

        self.take_queued_reload()
    }

    pub fn load_failed(&mut self) -> Option<LoadRequest> {
        self.load.loading = false;
        self.take_queued_reload()
    }

    /// Rebuilds for a new render width, keeping the guide on the same day
    /// at the same distance from the day's first line.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.height = height.max(1);
        if width != self.width {
            let anchor = self
                .focused_day()
                .map(|day| (day, self.guide - self.view.day_start_line[day]));
            self.width = width;
            self.view = build_stream_view(&self.days, self.width);

            if let Some((day, rel)) = anchor {
                let start = self.view.day_start_line[day];
                let end = self
                    .view
                    .day_start_line
                    .get(day + 1)
                    .copied()
                    .unwrap_or(self.view.len());
                self.guide = (start + rel).min(end.saturating_sub(1));
            }
        }
        self.ensure_visible();
    }
}
