use super::grid::{WeekdayExt, WEEKS_IN_GRID};
use super::pager::MonthPager;
use super::DateStyler;
use crate::theme::{CURSOR_MODIFIER, TITLE_STYLE, WEEKDAY_STYLE};
use ratatui::{prelude::*, widgets::*};
use time::Date;

static HEADER: &str = " Su     Mo     Tu     We     Th     Fr     Sa ";

/// Width of the calendar in columns
const MAIN_WIDTH: u16 = 46;

/// Number of lines taken up by the month title
const TITLE_LINES: u16 = 1;

/// Number of lines taken up by the weekday header and its rule
const HEADER_LINES: u16 = 2;

/// Number of lines taken up by each week of the calendar
const WEEK_LINES: u16 = 2;

/// Total height of the calendar in lines
const MAIN_HEIGHT: u16 = TITLE_LINES + HEADER_LINES + WEEK_LINES * WEEKS_IN_GRID;

/// Number of columns per day of week
const DAY_WIDTH: u16 = 7;

const ACS_HLINE: char = '─';

/// A month of days styled by `S`, with today in brackets and the pager's
/// cursor highlighted
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Calendar<S> {
    styler: S,
}

impl<S> Calendar<S> {
    pub(crate) fn new(styler: S) -> Calendar<S> {
        Calendar { styler }
    }
}

impl<S: DateStyler> StatefulWidget for Calendar<S> {
    type State = MonthPager;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let area = Rect {
            x: area.x + area.width.saturating_sub(MAIN_WIDTH) / 2,
            y: area.y + area.height.saturating_sub(MAIN_HEIGHT) / 2,
            width: area.width.min(MAIN_WIDTH),
            height: area.height.min(MAIN_HEIGHT),
        };
        let grid = state.grid();
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_title(&format!("{} {}", grid.month(), grid.year()));
        canvas.draw_header();
        for (i, week) in std::iter::zip(0u16.., grid.weeks()) {
            for &date in week.iter().flatten() {
                let mut style = self.styler.date_style(date);
                if date == state.cursor() {
                    style = style.add_modifier(CURSOR_MODIFIER);
                }
                canvas.draw_day(i, date, show(date, date == state.today()), style);
            }
        }
    }
}

fn show(date: Date, is_today: bool) -> String {
    if is_today {
        format!("[{:2}]", date.day())
    } else {
        format!(" {:2} ", date.day())
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, title: &str) {
        let width = u16::try_from(title.len()).unwrap_or(u16::MAX);
        self.mvprint(0, MAIN_WIDTH.saturating_sub(width) / 2, title, Some(TITLE_STYLE));
    }

    fn draw_header(&mut self) {
        self.mvprint(TITLE_LINES, 0, HEADER, Some(WEEKDAY_STYLE));
        self.hline(TITLE_LINES + 1, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(&mut self, week_no: u16, date: Date, s: String, style: Style) {
        self.mvprint(
            week_no * WEEK_LINES + TITLE_LINES + HEADER_LINES,
            DAY_WIDTH * date.weekday().index0(),
            s,
            Some(style),
        );
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}
