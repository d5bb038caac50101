use crate::calendar::{Calendar, DateStyler, MonthPager};
use crate::clock::Clock;
use crate::datekey::DateKey;
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::score::ScoreCard;
use crate::storage::Storage;
use crate::store::{DateStateStore, DayStatus};
use crate::theme::{
    BASE_STYLE, CLOSED_DAY_STYLE, CURRENT_DAY_STYLE, GREEN_DAY_STYLE, OPEN_DAY_STYLE,
    RED_DAY_STYLE, STATUS_STYLE, WARNING_STYLE,
};
use crossterm::event::{self, KeyCode, KeyEvent, KeyModifiers};
use log::{error, info};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::time::Duration;
use time::Date;

/// How long to wait for input before checking whether the day has changed
const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct App<S, C> {
    store: DateStateStore<S, C>,
    pager: MonthPager,
    state: AppState,
    warning: Option<String>,
}

impl<S: Storage, C: Clock> App<S, C> {
    pub(crate) fn new(store: DateStateStore<S, C>) -> App<S, C> {
        let pager = MonthPager::new(store.today().date());
        App {
            store,
            pager,
            state: AppState::Calendar,
            warning: None,
        }
    }

    pub(crate) fn start_date(mut self, date: Date) -> Self {
        self.pager = self.pager.start_date(date);
        self
    }

    /// Show `msg` on the status line until the next successful toggle
    pub(crate) fn with_warning(mut self, msg: String) -> Self {
        self.warning = Some(msg);
        self
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.refresh_today();
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        info!("Quitting");
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if !event::poll(TICK)? {
            return Ok(());
        }
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = event::read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.pager.move_days(-1).is_ok(),
                KeyCode::Char('l') | KeyCode::Right => self.pager.move_days(1).is_ok(),
                KeyCode::Char('k') | KeyCode::Up => self.pager.move_days(-7).is_ok(),
                KeyCode::Char('j') | KeyCode::Down => self.pager.move_days(7).is_ok(),
                KeyCode::Char('n') | KeyCode::PageDown => self.pager.one_month_forwards().is_ok(),
                KeyCode::Char('p') | KeyCode::PageUp => self.pager.one_month_backwards().is_ok(),
                KeyCode::Char(' ') | KeyCode::Enter => self.toggle_cursor(),
                KeyCode::Char('0') | KeyCode::Home => {
                    self.pager.jump_to_today();
                    true
                }
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('s') => {
                    self.state = AppState::Scoring;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                _ => false,
            },
            AppState::Helping | AppState::Scoring => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    return true;
                }
                let output = match key {
                    KeyCode::Char(c) => digit(c).map_or(JumpToOutput::Invalid, |d| {
                        state.handle_input(JumpToInput::Digit(d))
                    }),
                    KeyCode::Backspace | KeyCode::Delete => {
                        state.handle_input(JumpToInput::Backspace)
                    }
                    KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                    _ => JumpToOutput::Invalid,
                };
                match output {
                    JumpToOutput::Ok => true,
                    JumpToOutput::Invalid => false,
                    JumpToOutput::Jump(date) => {
                        self.state = AppState::Calendar;
                        self.pager.jump_to_date(date);
                        true
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    /// Returns `false` if the day under the cursor can't be marked
    fn toggle_cursor(&mut self) -> bool {
        let date = DateKey::from(self.pager.cursor());
        if !self.store.can_interact(date) {
            return false;
        }
        match self.store.toggle(date) {
            Ok(_) => self.warning = None,
            Err(e) => {
                let msg = format!("{:#}", anyhow::Error::new(e));
                error!("Could not save mark for {date}: {msg}");
                self.warning = Some(msg);
            }
        }
        true
    }

    fn refresh_today(&mut self) {
        if self.store.refresh_today() {
            self.pager.set_today(self.store.today().date());
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn status_line(&self) -> Line<'static> {
        if let Some(ref warning) = self.warning {
            return Line::styled(format!(" {warning}"), WARNING_STYLE);
        }
        let score = self.store.score();
        let rate = score
            .percent
            .map_or_else(|| String::from("--"), |p| format!("{p}%"));
        Line::styled(
            format!(
                " Tracking since {}   Green {}   Red {}   Success {rate}   ? for help",
                self.store.install_date(),
                score.green,
                score.red,
            ),
            STATUS_STYLE,
        )
    }
}

fn digit(c: char) -> Option<u8> {
    c.to_digit(10).and_then(|d| u8::try_from(d).ok())
}

impl<S: Storage, C: Clock> Widget for &mut App<S, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [cal_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        Calendar::new(MarkStyler(&self.store)).render(cal_area, buf, &mut self.pager);
        self.status_line().render(status_area, buf);
        match self.state {
            AppState::Helping => Help.render(area, buf),
            AppState::Scoring => ScoreCard(self.store.score()).render(area, buf),
            AppState::Jumping(ref mut state) => JumpTo.render(area, buf, state),
            AppState::Calendar | AppState::Quitting => (),
        }
    }
}

/// Colors each day by its mark and whether it can still be marked
#[derive(Debug)]
struct MarkStyler<'a, S, C>(&'a DateStateStore<S, C>);

impl<S: Storage, C: Clock> DateStyler for MarkStyler<'_, S, C> {
    fn date_style(&self, date: Date) -> Style {
        let key = DateKey::from(date);
        match self.0.status_of(key) {
            DayStatus::Green => GREEN_DAY_STYLE,
            DayStatus::Red => RED_DAY_STYLE,
            DayStatus::Current => CURRENT_DAY_STYLE,
            DayStatus::Unmarked if self.0.can_interact(key) => OPEN_DAY_STYLE,
            DayStatus::Unmarked => CLOSED_DAY_STYLE,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Scoring,
    Jumping(JumpToState),
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{MemoryStorage, StorageError, StoredDays};
    use crate::theme::CURSOR_MODIFIER;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use time::macros::{date, datetime};

    fn installed_on_10th() -> StoredDays {
        StoredDays {
            install_date: Some(datetime!(2024-01-10 00:00 UTC)),
            marks: BTreeMap::new(),
            unreadable: Vec::new(),
        }
    }

    fn app(clock: &ManualClock) -> App<MemoryStorage, &ManualClock> {
        let mut storage = MemoryStorage::new();
        storage.save(&installed_on_10th()).unwrap();
        App::new(DateStateStore::open(storage, clock).unwrap())
    }

    fn key(c: char) -> KeyCode {
        KeyCode::Char(c)
    }

    fn status<S: Storage, C: Clock>(app: &App<S, C>, date: Date) -> DayStatus {
        app.store.status_of(DateKey::from(date))
    }

    fn render<S: Storage, C: Clock>(app: &mut App<S, C>) -> (Buffer, Vec<String>) {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        let rows = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect();
        (buffer, rows)
    }

    #[derive(Debug)]
    struct ReadOnlyStorage(StoredDays);

    impl Storage for ReadOnlyStorage {
        fn load(&self) -> Result<StoredDays, StorageError> {
            Ok(self.0.clone())
        }

        fn save(&mut self, _days: &StoredDays) -> Result<(), StorageError> {
            Err(StorageError::Write {
                path: PathBuf::from("/read-only/days.json"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn test_toggle_today_cycles() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        let today = date!(2024 - 01 - 12);
        assert_eq!(status(&app, today), DayStatus::Current);
        assert!(app.handle_key(key(' ')));
        assert_eq!(status(&app, today), DayStatus::Green);
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(status(&app, today), DayStatus::Red);
        assert!(app.handle_key(key(' ')));
        assert_eq!(status(&app, today), DayStatus::Green);
    }

    #[test]
    fn test_toggle_respects_window() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        assert!(app.handle_key(key('h')));
        assert!(app.handle_key(KeyCode::Left));
        assert_eq!(app.pager.cursor(), date!(2024 - 01 - 10));
        assert!(app.handle_key(key(' ')));
        assert_eq!(status(&app, date!(2024 - 01 - 10)), DayStatus::Green);
        assert!(app.handle_key(key('h')));
        assert!(!app.handle_key(key(' ')));
        assert_eq!(status(&app, date!(2024 - 01 - 09)), DayStatus::Unmarked);
        assert!(app.handle_key(key('0')));
        assert!(app.handle_key(key('l')));
        assert_eq!(app.pager.cursor(), date!(2024 - 01 - 13));
        assert!(!app.handle_key(key(' ')));
        assert_eq!(status(&app, date!(2024 - 01 - 13)), DayStatus::Unmarked);
        assert_eq!(app.store.total_marked_days(), 1);
    }

    #[test]
    fn test_navigation() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        assert!(app.handle_key(key('j')));
        assert_eq!(app.pager.cursor(), date!(2024 - 01 - 19));
        assert!(app.handle_key(KeyCode::Up));
        assert_eq!(app.pager.cursor(), date!(2024 - 01 - 12));
        assert!(app.handle_key(key('n')));
        assert_eq!(app.pager.cursor(), date!(2024 - 02 - 12));
        assert!(app.handle_key(KeyCode::PageUp));
        assert!(app.handle_key(KeyCode::PageUp));
        assert_eq!(app.pager.cursor(), date!(2023 - 12 - 12));
        assert!(app.handle_key(KeyCode::Home));
        assert_eq!(app.pager.cursor(), date!(2024 - 01 - 12));
        assert!(!app.handle_key(key('x')));
    }

    #[test]
    fn test_overlays() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        assert!(app.handle_key(key('?')));
        assert_eq!(app.state, AppState::Helping);
        assert!(app.handle_key(key('x')));
        assert_eq!(app.state, AppState::Calendar);
        assert!(app.handle_key(key('s')));
        assert_eq!(app.state, AppState::Scoring);
        assert!(app.handle_key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Calendar);
        assert!(!app.quitting());
        assert!(app.handle_key(key('q')));
        assert!(app.quitting());
    }

    #[test]
    fn test_jump_to_date() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        assert!(app.handle_key(key('g')));
        for c in "20230615".chars() {
            assert!(app.handle_key(key(c)));
        }
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Calendar);
        assert_eq!(app.pager.cursor(), date!(2023 - 06 - 15));
    }

    #[test]
    fn test_jump_cancel_and_bad_keys() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        assert!(app.handle_key(key('g')));
        assert!(!app.handle_key(key('x')));
        assert!(!app.handle_key(KeyCode::Enter));
        assert!(app.handle_key(key('2')));
        assert!(app.handle_key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Calendar);
        assert_eq!(app.pager.cursor(), date!(2024 - 01 - 12));
    }

    #[test]
    fn test_day_rollover() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        app.refresh_today();
        assert_eq!(app.pager.today(), date!(2024 - 01 - 12));
        clock.set_date(date!(2024 - 01 - 13));
        app.refresh_today();
        assert_eq!(app.pager.today(), date!(2024 - 01 - 13));
        assert_eq!(app.pager.cursor(), date!(2024 - 01 - 13));
        assert!(app.handle_key(key(' ')));
        assert_eq!(status(&app, date!(2024 - 01 - 13)), DayStatus::Green);
        assert_eq!(app.store.total_available_days(), 4);
    }

    #[test]
    fn test_failed_save_shows_warning() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let store = DateStateStore::open(ReadOnlyStorage(installed_on_10th()), &clock).unwrap();
        let mut app = App::new(store);
        assert!(app.handle_key(key(' ')));
        assert_eq!(status(&app, date!(2024 - 01 - 12)), DayStatus::Green);
        let warning = app.warning.clone().unwrap();
        assert!(warning.starts_with("day storage is unavailable: failed to write"));
        assert!(warning.ends_with("read-only"));
        let (buffer, rows) = render(&mut app);
        assert!(rows[23].starts_with(" day storage is unavailable"));
        assert_eq!(buffer[(1, 23)].style(), WARNING_STYLE);
    }

    #[test]
    fn test_render_calendar_and_status() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        app.handle_key(key('h'));
        app.handle_key(key(' '));
        app.handle_key(key(' '));
        app.handle_key(key('h'));
        app.handle_key(key(' '));
        app.handle_key(key('0'));
        let (buffer, rows) = render(&mut app);
        assert_eq!(rows[4].trim(), "January 2024");
        assert_eq!(rows[5].trim(), "Su     Mo     Tu     We     Th     Fr     Sa");
        assert_eq!(
            rows[23].trim_end(),
            " Tracking since 2024-01-10   Green 1   Red 1   Success 50%   ? for help"
        );
        // The second week of January 2024 is drawn on row 9, with the 10th
        // (a Wednesday) starting at column 38
        assert_eq!(buffer[(39, 9)].symbol(), "1");
        assert_eq!(buffer[(40, 9)].symbol(), "0");
        assert_eq!(buffer[(38, 9)].style(), GREEN_DAY_STYLE);
        assert_eq!(buffer[(45, 9)].style(), RED_DAY_STYLE);
        assert_eq!(
            buffer[(52, 9)].style(),
            CURRENT_DAY_STYLE.add_modifier(CURSOR_MODIFIER)
        );
        assert_eq!(buffer[(59, 9)].style(), CLOSED_DAY_STYLE);
        assert_eq!(buffer[(31, 9)].style(), CLOSED_DAY_STYLE);
        assert_eq!(buffer[(0, 9)].style(), BASE_STYLE);
    }

    #[test]
    fn test_render_score_overlay() {
        let clock = ManualClock::on(date!(2024 - 01 - 12));
        let mut app = app(&clock);
        app.handle_key(key('s'));
        let (_, rows) = render(&mut app);
        assert!(rows.iter().any(|r| r.contains(" Score ")));
        assert!(rows.iter().any(|r| r.contains("Start marking your days")));
    }
}
