use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Block, Borders, Cell as TableCell, Clear, Paragraph, Row as TableRow, Table, TableState, Wrap,
};

use arena_terminal::data_source::DataSource;
use arena_terminal::feed;
use arena_terminal::heatmap::{self, HeatmapView, MatrixKind};
use arena_terminal::i18n::{self, Locale};
use arena_terminal::layout::{Cell, ColumnRole, DeltaBadge, LayoutDescriptor, RowView};
use arena_terminal::query::{SortDir, SortKey};
use arena_terminal::reconcile::Trend;
use arena_terminal::state::{
    AppState, Command, Delta, Presentation, ProviderCommand, Screen, Theme, apply_command,
    apply_delta,
};

const DEFAULT_CELL_PX: u32 = 8;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    cell_px: u32,
    heat_kind: MatrixKind,
    heat_cursor: (usize, usize),
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let cell_px = std::env::var("ARENA_CELL_PX")
            .ok()
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_CELL_PX)
            .clamp(4, 32);
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            cell_px,
            heat_kind: MatrixKind::WinRate,
            heat_cursor: (0, 0),
        }
    }

    fn dispatch(&mut self, command: Command) {
        apply_command(&mut self.state, command);
    }

    fn on_resize(&mut self, cols: u16) {
        let width = u32::from(cols) * self.cell_px;
        if width != self.state.viewport_width {
            self.dispatch(Command::ViewportResized(width));
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            KeyCode::Char('1') => self.dispatch(Command::ShowScreen(Screen::Leaderboard)),
            KeyCode::Char('2') => self.dispatch(Command::ShowScreen(Screen::Heatmap)),
            KeyCode::Char('l') => self.dispatch(Command::LocaleChanged(self.state.locale.next())),
            KeyCode::Char('t') => self.dispatch(Command::ThemeToggled),
            KeyCode::Char('r') => self.request_reload(),
            _ => match self.state.screen {
                Screen::Leaderboard => self.on_leaderboard_key(key),
                Screen::Heatmap => self.on_heatmap_key(key),
            },
        }
    }

    fn on_leaderboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('o') => {
                let next = self.state.query.sort_key.next();
                self.dispatch(Command::SortRequested(next));
            }
            KeyCode::Char('d') => {
                let current = self.state.query.sort_key;
                self.dispatch(Command::SortRequested(current));
            }
            KeyCode::Enter => {
                if let Some(row) = self.state.selected_row() {
                    self.dispatch(Command::ToggleExpanded(row.row.identity));
                }
            }
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.search_active = false,
            KeyCode::Esc => {
                self.state.search_active = false;
                self.dispatch(Command::SearchChanged(String::new()));
            }
            KeyCode::Backspace => {
                let mut input = self.state.search_input.clone();
                input.pop();
                self.dispatch(Command::SearchChanged(input));
                self.state.search_active = true;
            }
            KeyCode::Char(c) => {
                let mut input = self.state.search_input.clone();
                input.push(c);
                self.dispatch(Command::SearchChanged(input));
                self.state.search_active = true;
            }
            _ => {}
        }
    }

    fn heat_labels(&self) -> usize {
        heatmap::label_universe(&self.state.matrices.win_rate, &self.state.matrices.match_count)
            .len()
    }

    fn on_heatmap_key(&mut self, key: KeyEvent) {
        let n = self.heat_labels();
        if n == 0 {
            return;
        }
        let (col, row) = self.heat_cursor;
        self.heat_cursor = match key.code {
            KeyCode::Left | KeyCode::Char('h') => (col.saturating_sub(1), row),
            KeyCode::Right => ((col + 1).min(n - 1), row),
            KeyCode::Up | KeyCode::Char('k') => (col, row.saturating_sub(1)),
            KeyCode::Down | KeyCode::Char('j') => (col, (row + 1).min(n - 1)),
            KeyCode::Char('w') | KeyCode::Tab => {
                self.heat_kind = match self.heat_kind {
                    MatrixKind::WinRate => MatrixKind::MatchCount,
                    MatrixKind::MatchCount => MatrixKind::WinRate,
                };
                (col, row)
            }
            _ => (col, row),
        };
    }

    fn request_reload(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Reload unavailable");
            return;
        };
        if tx.send(ProviderCommand::Reload).is_err() {
            self.state.push_log("[WARN] Reload request failed");
        } else {
            self.state.push_log("[INFO] Reload requested");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_loader(
        DataSource::from_env(),
        tx,
        cmd_rx,
        feed::refresh_interval_from_env(),
    );

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    app.on_resize(terminal.size()?.width);

    loop {
        while let Ok(delta) = rx.try_recv() {
            let matrices_changed = matches!(delta, Delta::SetMatrices(_));
            apply_delta(&mut app.state, delta);
            if matrices_changed {
                app.heat_cursor = heatmap::clamp_cursor(app.heat_cursor, app.heat_labels());
            }
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Resize(cols, _) => app.on_resize(cols),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    text: Color,
    muted: Color,
    border: Color,
    accent: Color,
    up: Color,
    down: Color,
    selected_bg: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                bg: Color::Rgb(0xff, 0xfc, 0xf2),
                text: Color::Rgb(0x1f, 0x23, 0x28),
                muted: Color::Rgb(0x6b, 0x6f, 0x76),
                border: Color::Rgb(0xe8, 0xd9, 0xa8),
                accent: Color::Rgb(0xb3, 0x6b, 0x00),
                up: Color::Rgb(0x1a, 0x7f, 0x37),
                down: Color::Rgb(0xcf, 0x22, 0x2e),
                selected_bg: Color::Rgb(0xf6, 0xe7, 0xb8),
            },
            Theme::Dark => Self {
                bg: Color::Rgb(0x0d, 0x11, 0x17),
                text: Color::Rgb(0xe6, 0xed, 0xf3),
                muted: Color::Rgb(0x8b, 0x94, 0x9e),
                border: Color::Rgb(0x30, 0x36, 0x3d),
                accent: Color::Rgb(0xf2, 0xc5, 0x72),
                up: Color::Rgb(0x3f, 0xb9, 0x50),
                down: Color::Rgb(0xf8, 0x51, 0x49),
                selected_bg: Color::Rgb(0x26, 0x2c, 0x36),
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.bg)
    }

    fn trend(&self, trend: Trend) -> Color {
        match trend {
            Trend::Up => self.up,
            Trend::Down => self.down,
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let presentation = app.state.presentation();
    let palette = Palette::for_theme(app.state.theme);
    let area = frame.size();
    frame.render_widget(Block::default().style(palette.base()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_lines(&app.state, &presentation, palette)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border)),
    );
    frame.render_widget(header, chunks[0]);

    match presentation.screen {
        Screen::Leaderboard => render_leaderboard(frame, chunks[1], app, &presentation, palette),
        Screen::Heatmap => render_heatmaps(frame, chunks[1], app, &presentation, palette),
    }

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(palette.muted))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(palette.border)),
        );
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_line(&app.state, &presentation, palette));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, area, app.state.locale, palette);
    }
}

fn header_lines(state: &AppState, p: &Presentation, palette: Palette) -> Vec<Line<'static>> {
    let texts = p.locale.texts();
    let sep = p.locale.kv_separator();
    let (title, subtitle) = match p.screen {
        Screen::Leaderboard => (texts.title, texts.subtitle),
        Screen::Heatmap => (texts.heatmap_title, texts.heatmap_subtitle),
    };
    let updated = state
        .current
        .updated_at
        .map(|ts| {
            ts.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "--".to_string());
    let theme_label = match p.theme {
        Theme::Light => texts.theme_to_dark,
        Theme::Dark => texts.theme_to_light,
    };

    vec![
        Line::from(vec![
            Span::styled(
                title.to_string(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {subtitle}"), Style::default().fg(palette.muted)),
        ]),
        Line::from(vec![
            Span::raw(format!("{}{sep}{}", texts.total_battles, p.total_battles)),
            Span::styled(
                format!("   {}{sep}{updated}", texts.last_updated),
                Style::default().fg(palette.muted),
            ),
            Span::styled(
                format!(
                    "   {} · t {theme_label} · l {}",
                    p.table.mode.as_str(),
                    p.locale.next().native_name()
                ),
                Style::default().fg(palette.muted),
            ),
        ]),
    ]
}

fn footer_line(state: &AppState, p: &Presentation, palette: Palette) -> Line<'static> {
    let texts = p.locale.texts();
    let sep = p.locale.kv_separator();
    let view = &p.health;
    let (dot, status, color) = if view.ok {
        ("●", texts.health_ok, palette.up)
    } else {
        ("●", texts.health_error, palette.down)
    };
    let mut spans = vec![
        Span::styled(format!("{dot} "), Style::default().fg(color)),
        Span::raw(format!("{}{sep}{status}", texts.health_prefix)),
    ];
    for (key, value) in &view.counts {
        spans.push(Span::styled(
            format!("  {}{sep}{value}", i18n::health_count_label(p.locale, *key)),
            Style::default().fg(palette.muted),
        ));
    }
    if state.search_active || !state.search_input.is_empty() {
        let cursor = if state.search_active { "_" } else { "" };
        spans.push(Span::styled(
            format!("   / {}{cursor}", state.search_input),
            Style::default().fg(palette.accent),
        ));
    } else {
        spans.push(Span::styled(
            format!("   {}", texts.key_hints),
            Style::default().fg(palette.muted),
        ));
    }
    Line::from(spans)
}

fn render_leaderboard(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    p: &Presentation,
    palette: Palette,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let texts = p.locale.texts();
    let sort_line = Line::from(vec![
        Span::styled(
            format!("{}{}", texts.sort_label, p.locale.kv_separator()),
            Style::default().fg(palette.muted),
        ),
        Span::raw(format!(
            "{} {}",
            i18n::column_label(p.locale, p.query.sort_key),
            sort_marker(p.query.sort_dir)
        )),
        Span::styled(
            format!("   {}", texts.search_placeholder),
            Style::default().fg(palette.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(sort_line), sections[0]);

    if p.table.empty {
        let msg = if p.loading { texts.loading } else { texts.no_data };
        let placeholder = Paragraph::new(msg)
            .style(Style::default().fg(palette.muted))
            .alignment(Alignment::Center);
        frame.render_widget(placeholder, sections[1]);
        return;
    }

    if p.table.mode.is_compact() {
        render_compact(frame, sections[1], &p.table, app.state.selected, p.locale, palette);
    } else {
        render_wide(frame, sections[1], &p.table, app.state.selected, p.locale, palette);
    }
}

fn sort_marker(dir: SortDir) -> &'static str {
    match dir {
        SortDir::Asc => "↑",
        SortDir::Desc => "↓",
    }
}

fn wide_width(key: SortKey) -> Constraint {
    match key {
        SortKey::ModelName => Constraint::Min(18),
        SortKey::Rank => Constraint::Length(9),
        SortKey::Rating => Constraint::Length(16),
        SortKey::WinRatePercentage => Constraint::Length(16),
        SortKey::Volatility => Constraint::Length(10),
        _ => Constraint::Length(8),
    }
}

fn render_wide(
    frame: &mut Frame,
    area: Rect,
    table: &LayoutDescriptor,
    selected: usize,
    locale: Locale,
    palette: Palette,
) {
    let header = TableRow::new(table.columns.iter().map(|col| {
        let label = i18n::column_label(locale, col.key);
        let text = match col.sort {
            Some(dir) => format!("{label} {}", sort_marker(dir)),
            None => label.to_string(),
        };
        TableCell::from(text)
    }))
    .style(
        Style::default()
            .fg(palette.muted)
            .add_modifier(Modifier::BOLD),
    );

    let rows = table.rows.iter().map(|row| {
        TableRow::new(
            row.cells
                .iter()
                .map(|cell| TableCell::from(cell_line(cell, palette))),
        )
    });
    let widths: Vec<Constraint> = table.columns.iter().map(|c| wide_width(c.key)).collect();
    let widget = Table::new(rows, widths)
        .header(header)
        .highlight_style(Style::default().bg(palette.selected_bg))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(palette.border)),
        );

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(widget, area, &mut state);
}

fn cell_line(cell: &Cell, palette: Palette) -> Line<'static> {
    let mut spans = vec![Span::raw(cell.display())];
    if let Some(badge) = &cell.delta {
        spans.push(badge_span(badge, palette));
    }
    Line::from(spans)
}

fn badge_span(badge: &DeltaBadge, palette: Palette) -> Span<'static> {
    Span::styled(
        format!(" {}", badge.label()),
        Style::default().fg(palette.trend(badge.trend)),
    )
}

fn labelled(cell: &Cell, locale: Locale, palette: Palette) -> Vec<Span<'static>> {
    let mut spans = vec![
        Span::styled(
            format!("{}{}", i18n::column_label(locale, cell.key), locale.kv_separator()),
            Style::default().fg(palette.muted),
        ),
        Span::raw(cell.display()),
    ];
    if let Some(badge) = &cell.delta {
        spans.push(badge_span(badge, palette));
    }
    spans.push(Span::raw("  "));
    spans
}

fn compact_card(row: &RowView, locale: Locale, palette: Palette) -> Vec<Line<'static>> {
    let mut main = Vec::new();
    for cell in row.cells_with_role(ColumnRole::Main) {
        main.push(Span::raw(format!("{} ", cell.display())));
        if let Some(badge) = &cell.delta {
            main.push(badge_span(badge, palette));
            main.push(Span::raw(" "));
        }
    }
    let mut lines = vec![Line::from(main)];

    let sub: Vec<Span> = row
        .cells_with_role(ColumnRole::Sub)
        .flat_map(|cell| labelled(cell, locale, palette))
        .collect();
    lines.push(Line::from(sub).style(Style::default().fg(palette.muted)));

    let highlight: Vec<Span> = row
        .cells_with_role(ColumnRole::Highlight)
        .flat_map(|cell| labelled(cell, locale, palette))
        .collect();
    if !highlight.is_empty() {
        lines.push(Line::from(highlight).style(Style::default().fg(palette.accent)));
    }

    if row.expanded {
        for cell in row.cells_with_role(ColumnRole::Detail) {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(labelled(cell, locale, palette));
            lines.push(Line::from(spans));
        }
    }
    lines
}

fn render_compact(
    frame: &mut Frame,
    area: Rect,
    table: &LayoutDescriptor,
    selected: usize,
    locale: Locale,
    palette: Palette,
) {
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_span = (0usize, 0usize);
    for (idx, row) in table.rows.iter().enumerate() {
        let start = lines.len();
        let mut card = compact_card(row, locale, palette);
        if idx == selected {
            card = card
                .into_iter()
                .map(|line| line.patch_style(Style::default().bg(palette.selected_bg)))
                .collect();
        }
        lines.extend(card);
        lines.push(Line::from(""));
        if idx == selected {
            selected_span = (start, lines.len());
        }
    }

    let height = usize::from(area.height);
    let offset = scroll_offset(selected_span, height);
    let paragraph = Paragraph::new(lines).scroll((offset, 0));
    frame.render_widget(paragraph, area);
}

// Smallest scroll that keeps the selected card fully on screen.
fn scroll_offset((start, end): (usize, usize), height: usize) -> u16 {
    if height == 0 || end <= height {
        return 0;
    }
    let offset = if end - start > height { start } else { end - height };
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn render_heatmaps(frame: &mut Frame, area: Rect, app: &App, p: &Presentation, palette: Palette) {
    let texts = p.locale.texts();
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let (view, title) = match app.heat_kind {
        MatrixKind::WinRate => (&p.heatmaps.win_rate, texts.win_rate_title),
        MatrixKind::MatchCount => (&p.heatmaps.match_count, texts.match_count_title),
    };

    if view.is_empty() {
        let msg = if app.state.loading_matrices {
            texts.loading
        } else {
            texts.no_data
        };
        let placeholder = Paragraph::new(msg)
            .style(Style::default().fg(palette.muted))
            .alignment(Alignment::Center)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(placeholder, sections[0]);
        return;
    }

    let (col, row) = heatmap::clamp_cursor(app.heat_cursor, view.labels.len());
    let widget = HeatmapWidget {
        view,
        title,
        cursor: Some((col, row)),
        palette,
    };
    frame.render_widget(widget, sections[0]);

    let tip = heatmap::tooltip(&app.state.matrices, view, col, row)
        .map(|t| t.lines(p.locale).join("\n"))
        .unwrap_or_default();
    let tooltip = Paragraph::new(tip)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(palette.border)),
        );
    frame.render_widget(tooltip, sections[1]);
}

/// Character-cell heatmap: two columns per cell, row labels on the left,
/// column indices on top and a gradient legend underneath.
struct HeatmapWidget<'a> {
    view: &'a HeatmapView,
    title: &'a str,
    cursor: Option<(usize, usize)>,
    palette: Palette,
}

impl Widget for HeatmapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let n = self.view.labels.len();
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.border));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 8 || inner.height < 3 {
            return;
        }

        let label_width = self
            .view
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(4, 16) as u16;
        let grid_x = inner.x + label_width + 1;
        let label_style = Style::default().fg(self.palette.muted);

        for j in 0..n {
            let x = grid_x + (j as u16) * 2;
            if x >= inner.right() {
                break;
            }
            buf.set_string(x, inner.y, format!("{}", j % 10), label_style);
        }

        for i in 0..n {
            let y = inner.y + 1 + i as u16;
            if y >= inner.bottom().saturating_sub(1) {
                break;
            }
            let label: String = self.view.labels[i]
                .chars()
                .take(usize::from(label_width))
                .collect();
            buf.set_string(inner.x, y, label, label_style);

            for j in 0..n {
                let x = grid_x + (j as u16) * 2;
                if x + 1 >= inner.right() {
                    break;
                }
                let Some(cell) = self.view.cell(j, i) else {
                    continue;
                };
                let mut style = match cell.color {
                    Some(rgb) => Style::default().fg(Color::Rgb(rgb.r, rgb.g, rgb.b)),
                    None => Style::default().fg(self.palette.muted),
                };
                if self.cursor == Some((j, i)) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                let glyph = if cell.value.is_some() { "██" } else { "··" };
                buf.set_string(x, y, glyph, style);
            }
        }

        // Legend: ten gradient steps from the domain minimum to maximum.
        let legend_y = inner.bottom().saturating_sub(1);
        let domain = self.view.domain;
        buf.set_string(inner.x, legend_y, heatmap::format_number(domain.min), label_style);
        let steps = 10u16;
        let legend_x = inner.x + 4;
        for s in 0..steps {
            let x = legend_x + s;
            if x >= inner.right() {
                break;
            }
            let v = domain.min + (domain.max - domain.min) * f64::from(s) / f64::from(steps - 1);
            if let Some(rgb) = heatmap::color_for(Some(v), domain, self.view.kind) {
                buf.set_string(x, legend_y, "█", Style::default().fg(Color::Rgb(rgb.r, rgb.g, rgb.b)));
            }
        }
        let max_x = legend_x + steps + 1;
        if max_x < inner.right() {
            buf.set_string(max_x, legend_y, &self.view.legend_max, label_style);
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return String::new();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect, locale: Locale, palette: Palette) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        locale.texts().title,
        "",
        "  1 / 2        Leaderboard / Heatmap",
        "  /            Search (Enter keep, Esc clear)",
        "  j/k or ↑/↓   Move",
        "  o            Next sort column",
        "  d            Flip sort direction",
        "  Enter        Expand compact row",
        "  ←/→ w        Heatmap cursor / matrix",
        "  l            Language",
        "  t            Theme",
        "  r            Reload data",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(palette.base());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
