use ratatui::style::Color;
use time::Date;

/// A possibly open-ended span of days.  Either endpoint may come first until
/// the span is normalized.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct DateSpan {
    pub(crate) start_date: Option<Date>,
    pub(crate) end_date: Option<Date>,
}

impl DateSpan {
    pub(crate) fn new(start_date: Option<Date>, end_date: Option<Date>) -> DateSpan {
        DateSpan {
            start_date,
            end_date,
        }
    }

    pub(crate) fn day(date: Date) -> DateSpan {
        DateSpan::new(Some(date), Some(date))
    }

    pub(crate) fn normalized(self) -> DateSpan {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => DateSpan::new(Some(end), Some(start)),
            _ => self,
        }
    }

    /// Locates `day` relative to the span.  Endpoints are edges, not part of
    /// the span's interior, and a missing endpoint leaves that side unbounded.
    pub(crate) fn locate(self, day: Date) -> Option<SpanPosition> {
        let DateSpan {
            start_date,
            end_date,
        } = self.normalized();
        let in_range =
            start_date.is_none_or(|start| day > start) && end_date.is_none_or(|end| day < end);
        let start_edge = !in_range && start_date == Some(day);
        let end_edge = !in_range && end_date == Some(day);
        (in_range || start_edge || end_edge).then_some(SpanPosition {
            in_range,
            start_edge,
            end_edge,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct SpanPosition {
    pub(crate) in_range: bool,
    pub(crate) start_edge: bool,
    pub(crate) end_edge: bool,
}

impl SpanPosition {
    pub(crate) fn is_edge(&self) -> bool {
        self.start_edge || self.end_edge
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DateRange {
    pub(crate) span: DateSpan,
    pub(crate) key: String,
    pub(crate) color: Option<Color>,
    pub(crate) disabled: bool,
}

impl DateRange {
    pub(crate) fn new(key: &str) -> DateRange {
        DateRange {
            span: DateSpan::default(),
            key: String::from(key),
            color: None,
            disabled: false,
        }
    }

    pub(crate) fn span(mut self, span: DateSpan) -> DateRange {
        self.span = span;
        self
    }

    pub(crate) fn color(mut self, color: Color) -> DateRange {
        self.color = Some(color);
        self
    }
}

/// A range as it touches one particular day
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RangeMark {
    /// Index of the range in the list it was drawn from
    pub(crate) index: usize,
    pub(crate) color: Option<Color>,
    pub(crate) position: SpanPosition,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct DayFlags {
    pub(crate) is_weekend: bool,
    pub(crate) is_today: bool,
    pub(crate) is_start_of_week: bool,
    pub(crate) is_end_of_week: bool,
    pub(crate) is_start_of_month: bool,
    pub(crate) is_end_of_month: bool,
    pub(crate) is_passive: bool,
    pub(crate) disabled: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DayCell {
    pub(crate) date: Date,
    pub(crate) label: String,
    pub(crate) flags: DayFlags,
    pub(crate) ranges: Vec<RangeMark>,
    pub(crate) preview: Option<SpanPosition>,
    pub(crate) selected: bool,
}

impl DayCell {
    pub(crate) fn new(date: Date, label: String, flags: DayFlags) -> DayCell {
        DayCell {
            date,
            label,
            flags,
            ranges: Vec::new(),
            preview: None,
            selected: false,
        }
    }

    pub(crate) fn mark_ranges(mut self, ranges: &[DateRange]) -> DayCell {
        self.ranges = ranges
            .iter()
            .enumerate()
            .filter_map(|(index, range)| {
                range.span.locate(self.date).map(|position| RangeMark {
                    index,
                    color: range.color,
                    position,
                })
            })
            .collect();
        self
    }

    pub(crate) fn mark_preview(mut self, preview: Option<DateSpan>) -> DayCell {
        self.preview = preview.and_then(|span| span.locate(self.date));
        self
    }

    pub(crate) fn mark_selected(mut self, date: Option<Date>) -> DayCell {
        self.selected = date == Some(self.date);
        self
    }

    pub(crate) fn respond(&self, action: PointerAction) -> Vec<MonthEvent> {
        if self.flags.disabled {
            return vec![MonthEvent::PreviewChange(None)];
        }
        match action {
            PointerAction::Press => vec![MonthEvent::DragStart(self.date)],
            PointerAction::Enter => vec![
                MonthEvent::DragMove(self.date),
                MonthEvent::PreviewChange(Some(self.date)),
            ],
            PointerAction::Release => vec![MonthEvent::DragEnd(self.date)],
        }
    }
}

/// What the pointer did to a single cell
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PointerAction {
    Press,
    Enter,
    Release,
}

/// Interaction reported by a month grid to whoever owns the selection
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MonthEvent {
    DragStart(Date),
    DragMove(Date),
    DragEnd(Date),
    PreviewChange(Option<Date>),
    MouseLeave,
}
