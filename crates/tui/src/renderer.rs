use std::io::stdout;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::Result;
use commit_graph_core::{GraphEngine, GraphError, RefreshTicket};
use commit_graph_protocol::{BranchInfo, CommitRecord, Point, ThemeToken, Viewport};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::canvas::Canvas;
use crate::git::HistorySource;

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Branch0 => Color::Blue,
        ThemeToken::Branch1 => Color::Red,
        ThemeToken::Branch2 => Color::Green,
        ThemeToken::Branch3 => Color::Yellow,
        ThemeToken::Branch4 => Color::Magenta,
        ThemeToken::Branch5 => Color::Cyan,
        ThemeToken::Branch6 => Color::LightRed,
        ThemeToken::Branch7 => Color::LightGreen,
        ThemeToken::NodeBorder => Color::DarkGray,
        ThemeToken::MergeNodeFill => Color::Black,
        ThemeToken::BranchLabelBackground => Color::Rgb(55, 71, 79),
        ThemeToken::BranchLabelText => Color::White,
        ThemeToken::HeadLabelBackground => Color::Rgb(46, 125, 50),
        ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextSecondary => Color::Gray,
        ThemeToken::TextMuted => Color::DarkGray,
        ThemeToken::SelectionHighlight => Color::Rgb(38, 56, 80),
        ThemeToken::HoverHighlight => Color::Rgb(32, 32, 32),
        ThemeToken::Background => Color::Black,
    }
}

type Fetched = Result<(Vec<CommitRecord>, Vec<BranchInfo>)>;

/// Terminal front-end state: the engine plus cursor, scroll and the
/// background refresh plumbing.
pub struct App {
    engine: GraphEngine,
    source: Arc<dyn HistorySource>,
    refresh_every: Duration,
    last_refresh: Option<Instant>,
    in_flight: usize,
    tx: Sender<(RefreshTicket, Fetched)>,
    rx: Receiver<(RefreshTicket, Fetched)>,
    cursor: usize,
    scroll: usize,
    /// Content rows shown by the last frame.
    page: usize,
    status: Option<String>,
}

impl App {
    pub fn new(
        engine: GraphEngine,
        source: Arc<dyn HistorySource>,
        refresh_every: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            engine,
            source,
            refresh_every,
            last_refresh: None,
            in_flight: 0,
            tx,
            rx,
            cursor: 0,
            scroll: 0,
            page: 0,
            status: None,
        }
    }

    /// Start a fetch on a worker thread. Its result comes back through the
    /// channel tagged with the ticket issued here.
    fn request_refresh(&mut self) {
        let ticket = self.engine.begin_refresh();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let fetched = source
                .list_commits()
                .and_then(|commits| Ok((commits, source.list_branches()?)));
            let _ = tx.send((ticket, fetched));
        });
        self.in_flight += 1;
        self.last_refresh = Some(Instant::now());
        tracing::debug!(seq = ticket.seq, "refresh requested");
    }

    fn tick(&mut self) {
        while let Ok((ticket, fetched)) = self.rx.try_recv() {
            self.apply(ticket, fetched);
        }
        let due = self
            .last_refresh
            .is_none_or(|at| at.elapsed() >= self.refresh_every);
        if due && self.in_flight == 0 {
            self.request_refresh();
        }
    }

    fn apply(&mut self, ticket: RefreshTicket, fetched: Fetched) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let (commits, branches) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                // A failed fetch is just no new data for this tick.
                tracing::warn!("refresh failed: {err:#}");
                self.status = Some(format!("refresh failed: {err}"));
                return;
            }
        };

        let under_cursor = self.cursor_commit();
        let top_row = self
            .engine
            .state()
            .commits()
            .get(self.scroll)
            .map(|c| c.id.clone());
        match self.engine.on_refresh_result(ticket, commits) {
            Ok(report) => {
                self.engine.set_branches(branches);
                for rejected in &report.rejected {
                    tracing::warn!("{rejected}");
                }
                self.status = report.rewrite().as_ref().map(ToString::to_string);
                let state = self.engine.state();
                let last = state.len().saturating_sub(1);
                self.cursor = under_cursor
                    .and_then(|id| state.row(&id))
                    .unwrap_or_else(|| self.cursor.min(last));
                // Scrolled away from the top: keep the same commit in the
                // first visible row. At the top, new commits scroll in.
                if self.scroll > 0 {
                    self.scroll = top_row
                        .and_then(|id| state.row(&id))
                        .unwrap_or(self.scroll)
                        .min(last);
                }
                self.keep_cursor_visible(self.page);
            }
            Err(err @ GraphError::StaleRefreshDiscarded { .. }) => {
                tracing::debug!("{err}");
            }
            Err(err) => tracing::warn!("{err}"),
        }
    }

    fn cursor_commit(&self) -> Option<commit_graph_protocol::SharedStr> {
        self.engine
            .state()
            .commits()
            .get(self.cursor)
            .map(|c| c.id.clone())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode, page: usize) -> bool {
        let last = self.engine.state().len().saturating_sub(1);
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => self.cursor = (self.cursor + 1).min(last),
            KeyCode::Char('k') | KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::PageDown => self.cursor = (self.cursor + page).min(last),
            KeyCode::PageUp => self.cursor = self.cursor.saturating_sub(page),
            KeyCode::Enter => {
                if let Some(id) = self.cursor_commit()
                    && let Err(err) = self.engine.on_commit_click(&id)
                {
                    tracing::debug!("{err}");
                }
            }
            KeyCode::Esc => self.engine.dismiss_selection(),
            KeyCode::Char('r') if self.in_flight == 0 => self.request_refresh(),
            _ => {}
        }
        self.keep_cursor_visible(page);
        false
    }

    fn handle_click(&mut self, col: u16, row: u16, content: Rect) {
        if !content.contains((col, row).into()) {
            return;
        }
        let point = Point::new(
            f64::from(col - content.x) + 0.5,
            f64::from(row - content.y) + self.scroll as f64 + 0.5,
        );
        if self.engine.on_click_at(point).is_some()
            && let Some(id) = self.engine.commit_at(point)
            && let Some(row) = self.engine.state().row(&id)
        {
            self.cursor = row;
        }
    }

    fn keep_cursor_visible(&mut self, page: usize) {
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if page > 0 && self.cursor >= self.scroll + page {
            self.scroll = self.cursor + 1 - page;
        }
    }

    fn paint(&self, content: Rect) -> Canvas {
        let viewport = Viewport {
            y: self.scroll as f64,
            ..Viewport::new(f64::from(content.width), f64::from(content.height))
        };
        let mut canvas = Canvas::new(content.width, content.height, viewport.y);
        canvas.paint(&self.engine.current_scene(&viewport));
        if let Some(row) = self.cursor.checked_sub(self.scroll)
            && let Ok(row) = u16::try_from(row)
        {
            canvas.highlight_row(row, ThemeToken::HoverHighlight);
        }
        canvas
    }

    fn status_line(&self) -> String {
        let state = self.engine.state();
        if let Some(id) = self.engine.selection().selected()
            && let Some(commit) = state.commit(id)
        {
            let when = commit.timestamp;
            return format!(
                " {} {} <{}> @{when}",
                commit.id.short(12),
                commit.message.lines().next().unwrap_or_default(),
                commit.author,
            );
        }
        self.status.clone().unwrap_or_default()
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let state = self.engine.state();

        let header_area = Rect::new(0, 0, area.width, 1);
        let header = Block::default()
            .title(format!(
                " commit-graph — {} | {} commits, {} lanes | j/k move · Enter select · Esc clear · r refresh · q quit ",
                self.source.location().display(),
                state.len(),
                state.lanes().width(),
            ))
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(header, header_area);

        let content = content_area(area);
        let block = Block::default()
            .borders(Borders::NONE)
            .style(Style::default().bg(Color::Black));
        frame.render_widget(block, content);

        let canvas = self.paint(content);
        let buf = frame.buffer_mut();
        for row in 0..canvas.height() {
            for col in 0..canvas.width() {
                let Some(cell) = canvas.get(col, row) else {
                    continue;
                };
                let fg = cell.fg.map_or(Color::White, theme_to_color);
                let bg = cell.bg.map_or(Color::Black, theme_to_color);
                buf[(content.x + col, content.y + row)]
                    .set_char(cell.ch)
                    .set_fg(fg)
                    .set_bg(bg);
            }
        }

        let status_area = Rect::new(0, area.height.saturating_sub(1), area.width, 1);
        let status = Paragraph::new(self.status_line())
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(status, status_area);
    }
}

fn content_area(area: Rect) -> Rect {
    Rect::new(0, 1, area.width, area.height.saturating_sub(2))
}

pub fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut app, &mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| app.draw(frame))?;

        let size = terminal.size()?;
        let content = content_area(Rect::new(0, 0, size.width, size.height));
        let page = usize::from(content.height);
        app.page = page;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key.code, page) {
                        break;
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        app.handle_click(mouse.column, mouse.row, content);
                    }
                    MouseEventKind::ScrollDown => {
                        let max = app.engine.state().len().saturating_sub(page);
                        app.scroll = (app.scroll + 3).min(max);
                    }
                    MouseEventKind::ScrollUp => app.scroll = app.scroll.saturating_sub(3),
                    _ => {}
                },
                _ => {}
            }
        }
    }
    Ok(())
}
