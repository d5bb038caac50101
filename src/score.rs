use crate::theme::score::{HIGH_STYLE, LOW_STYLE, MEDIUM_STYLE, NONE_STYLE};
use crate::theme::{BASE_STYLE, GREEN_DAY_STYLE, RED_DAY_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};
use std::fmt;

/// Point-in-time copy of a store's metrics
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Score {
    pub(crate) available: usize,
    pub(crate) marked: usize,
    pub(crate) green: usize,
    pub(crate) red: usize,
    /// Green days as a percentage of marked days, rounded up
    pub(crate) percent: Option<usize>,
}

impl Score {
    /// Days that could have been marked but weren't
    pub(crate) fn unmarked(&self) -> usize {
        self.available.saturating_sub(self.marked)
    }

    pub(crate) fn band(&self) -> ScoreBand {
        match self.percent {
            None => ScoreBand::None,
            Some(80..) => ScoreBand::High,
            Some(50..) => ScoreBand::Medium,
            Some(_) => ScoreBand::Low,
        }
    }

    fn rows(&self) -> Vec<(usize, &'static str)> {
        let mut rows = vec![
            (self.available, "Days Available"),
            (self.marked, "Days Marked"),
            (self.green, "Green Days"),
            (self.red, "Red Days"),
        ];
        if self.unmarked() > 0 {
            rows.push((self.unmarked(), "Unmarked Days"));
        }
        rows
    }

    fn hint(&self) -> Option<&'static [&'static str]> {
        if self.marked == 0 {
            Some(&["Start marking your days in the", "calendar to see your score!"])
        } else if self.unmarked() > 0 {
            Some(&[
                "Score is calculated only from days",
                "you've marked. Unmarked days don't",
                "count against you.",
            ])
        } else {
            None
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Success Rate: {}%", self.percent.unwrap_or(0))?;
        for (value, label) in self.rows() {
            writeln!(f, "{label}: {value}")?;
        }
        if let Some(hint) = self.hint() {
            writeln!(f)?;
            writeln!(f, "{}", hint.join(" "))?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum ScoreBand {
    /// Nothing marked yet
    None,
    /// 80% and up
    High,
    /// 50% up to 80%
    Medium,
    Low,
}

impl ScoreBand {
    fn style(self) -> Style {
        match self {
            ScoreBand::None => NONE_STYLE,
            ScoreBand::High => HIGH_STYLE,
            ScoreBand::Medium => MEDIUM_STYLE,
            ScoreBand::Low => LOW_STYLE,
        }
    }
}

/// Popup summarizing a [`Score`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ScoreCard(pub(crate) Score);

impl ScoreCard {
    fn text(&self) -> Text<'static> {
        let score = self.0;
        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("{:>4}%", score.percent.unwrap_or(0)),
                    score.band().style(),
                ),
                Span::raw("  Success Rate"),
            ]),
            Line::raw(""),
        ];
        for (value, label) in score.rows() {
            let style = match label {
                "Green Days" => GREEN_DAY_STYLE,
                "Red Days" => RED_DAY_STYLE,
                _ => BASE_STYLE,
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{value:>5}"), style),
                Span::raw(format!("  {label}")),
            ]));
        }
        if let Some(hint) = score.hint() {
            lines.push(Line::raw(""));
            lines.extend(hint.iter().map(|&s| Line::from(s.italic())));
        }
        lines.push(Line::raw(""));
        lines.push(Line::raw("Press the Any Key to dismiss."));
        Text::from(lines)
    }
}

impl Widget for ScoreCard {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = self.text();
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .min(area.height)
            .saturating_add(2);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .min(area.width)
            .saturating_add(2);
        let para = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Score ")
                    .title_alignment(Alignment::Center),
            )
            .style(BASE_STYLE);
        let [card_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [card_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(card_area);
        Clear.render(card_area, buf);
        para.render(card_area, buf);
    }
}
