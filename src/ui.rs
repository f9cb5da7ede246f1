//! TUI module using ratatui.
//!
//! One screen: URL input, style selector, results, and a question panel once a
//! summary exists. Requests run on spawned tasks and report back over a channel,
//! so the loop keeps drawing while they are in flight.

use crate::client::{ClientError, ServiceClient};
use crate::session::{QuestionTicket, SessionState, SummarizeTicket};
use crate::summary::{AskResponse, Style, SummarizeResponse};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style as Look, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, List, ListItem, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Which input receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Url,
    Style,
    Question,
}

/// What the loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    Summarize,
    Ask,
    Quit,
}

/// A finished request travelling back to the UI loop
enum Completion {
    Summarize(SummarizeTicket, Result<SummarizeResponse, ClientError>),
    Question(QuestionTicket, Result<AskResponse, ClientError>),
}

pub struct App {
    state: SessionState,
    focus: Focus,
    client: ServiceClient,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    tick: usize,
}

impl App {
    pub fn new(client: ServiceClient, style: Style) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(style),
            focus: Focus::Url,
            client,
            tx,
            rx,
            tick: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    fn focus_order(&self) -> &'static [Focus] {
        // The question panel only exists once there is something to ask about.
        if self.state.result().is_some() {
            &[Focus::Url, Focus::Style, Focus::Question]
        } else {
            &[Focus::Url, Focus::Style]
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    /// Update inputs for a key press and report what the loop should do.
    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Command::Quit;
        }

        match key.code {
            KeyCode::Tab => self.cycle_focus(true),
            KeyCode::BackTab => self.cycle_focus(false),
            KeyCode::Enter => {
                return match self.focus {
                    Focus::Url | Focus::Style => Command::Summarize,
                    Focus::Question => Command::Ask,
                }
            }
            KeyCode::Left if self.focus == Focus::Style => {
                self.state.set_style(self.state.style().prev())
            }
            KeyCode::Right if self.focus == Focus::Style => {
                self.state.set_style(self.state.style().next())
            }
            KeyCode::Backspace => {
                if let Some(input) = self.focused_input() {
                    input.pop();
                }
            }
            KeyCode::Char(c)
                if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() =>
            {
                if let Some(input) = self.focused_input() {
                    input.push(c);
                }
            }
            _ => {}
        }
        Command::None
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Url => Some(self.state.url_mut()),
            Focus::Question => Some(self.state.question_mut()),
            Focus::Style => None,
        }
    }

    fn spawn_summarize(&mut self) {
        let ticket = match self.state.begin_summarize() {
            Ok(ticket) => ticket,
            Err(reason) => {
                tracing::debug!("summarise not sent: {}", reason);
                return;
            }
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.summarize(&ticket.request).await;
            let _ = tx.send(Completion::Summarize(ticket, result));
        });
    }

    fn spawn_question(&mut self) {
        let ticket = match self.state.begin_question() {
            Ok(ticket) => ticket,
            Err(reason) => {
                tracing::debug!("question not sent: {}", reason);
                return;
            }
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.ask(&ticket.request).await;
            let _ = tx.send(Completion::Question(ticket, result));
        });
    }

    /// Apply a finished request on the loop's own turn
    fn apply(&mut self, done: Completion) {
        match done {
            Completion::Summarize(ticket, result) => {
                self.state.finish_summarize(ticket, result);
            }
            Completion::Question(ticket, result) => {
                self.state.finish_question(ticket, result);
            }
        }
        if self.focus == Focus::Question && self.state.result().is_none() {
            self.focus = Focus::Url;
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [title, url, style, status, body] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Line::from(" recap - summarise a page, then ask about it ").bold(),
            title,
        );
        self.draw_input(frame, url, "URL", self.state.url(), Focus::Url);
        self.draw_styles(frame, style);
        frame.render_widget(self.status_line(), status);

        match self.state.result() {
            Some(_) => {
                let [results, history, question] = Layout::vertical([
                    Constraint::Percentage(50),
                    Constraint::Fill(1),
                    Constraint::Length(3),
                ])
                .areas(body);
                self.draw_results(frame, results);
                self.draw_history(frame, history);
                let label = if self.state.is_asking() {
                    "Question (asking...)"
                } else {
                    "Question"
                };
                self.draw_input(frame, question, label, self.state.question(), Focus::Question);
            }
            None => frame.render_widget(
                Paragraph::new(
                    "Enter a URL, pick a style with ←/→, press Enter to summarise. Esc quits.",
                )
                .dark_gray()
                .wrap(Wrap { trim: true }),
                body,
            ),
        }
    }

    fn border(&self, title: &str, focus: Focus) -> Block<'static> {
        let block = Block::bordered().title(title.to_string());
        if self.focus == focus {
            block.border_style(Look::new().fg(Color::Cyan))
        } else {
            block
        }
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect, title: &str, value: &str, focus: Focus) {
        frame.render_widget(Paragraph::new(value).block(self.border(title, focus)), area);
        if self.focus == focus {
            let typed = u16::try_from(value.chars().count()).unwrap_or(u16::MAX);
            let x = area.x.saturating_add(1).saturating_add(typed);
            frame.set_cursor_position(Position::new(
                x.min(area.right().saturating_sub(2)),
                area.y.saturating_add(1),
            ));
        }
    }

    fn draw_styles(&self, frame: &mut Frame, area: Rect) {
        let spans: Vec<Span> = Style::ALL
            .iter()
            .flat_map(|style| {
                let label = format!(" {} ", style.label());
                let span = if *style == self.state.style() {
                    Span::styled(label, Look::new().add_modifier(Modifier::REVERSED))
                } else {
                    Span::raw(label)
                };
                [span, Span::raw(" ")]
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(self.border("Style", Focus::Style)),
            area,
        );
    }

    fn status_line(&self) -> Line<'static> {
        let spinner = SPINNER[self.tick % SPINNER.len()];
        if self.state.is_summarizing() {
            Line::from(format!(" {} Summarizing...", spinner)).yellow()
        } else if let Some(err) = self.state.last_error() {
            Line::from(format!(" Error: {}", err)).red()
        } else if self.state.is_asking() {
            Line::from(format!(" {} Asking...", spinner)).yellow()
        } else if let Some(session) = self.state.session_id() {
            Line::from(format!(" Session {}", session)).dark_gray()
        } else {
            Line::default()
        }
    }

    fn draw_results(&self, frame: &mut Frame, area: Rect) {
        let Some(result) = self.state.result() else {
            return;
        };
        let mut text = Text::default();
        text.push_line(Line::from(result.summary.clone()));
        text.push_line(Line::default());
        text.push_line(Line::from("Key Insights").bold());
        for insight in &result.key_insights {
            text.push_line(Line::from(format!("  • {}", insight)));
        }
        frame.render_widget(
            Paragraph::new(text)
                .block(Block::bordered().title(format!("Summary ({})", result.content_type)))
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    fn draw_history(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .state
            .history()
            .iter()
            .map(|exchange| {
                ListItem::new(Text::from(vec![
                    Line::from(format!("Q: {}", exchange.question)).cyan(),
                    Line::from(format!("A: {}", exchange.answer)),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items).block(Block::bordered().title("Conversation")), area);
    }
}

/// Run the TUI until the user quits
pub async fn run(client: ServiceClient, style: Style) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, App::new(client, style)).await;
    ratatui::restore();
    result
}

async fn event_loop(terminal: &mut DefaultTerminal, mut app: App) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        tokio::select! {
            Some(done) = app.rx.recv() => app.apply(done),
            _ = ticker.tick() => app.tick = app.tick.wrapping_add(1),
            event = events.next() => {
                let key = match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => key,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Err(err),
                    None => return Ok(()),
                };
                match app.handle_key(key) {
                    Command::Quit => return Ok(()),
                    Command::Summarize => app.spawn_summarize(),
                    Command::Ask => app.spawn_question(),
                    Command::None => {}
                }
            }
        }
    }
}
