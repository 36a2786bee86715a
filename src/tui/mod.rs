//! Ratatui-based terminal UI.
//!
//! The viewer shows every core's samples on one chart (the selected core
//! highlighted) next to the equation lines the batch produced for that core.
//! Nothing is written to disk: records go to a `MemorySink`.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{BatchReport, run_batch};
use crate::error::AppError;
use crate::fit::FitOptions;
use crate::io::ingest::IngestedData;
use crate::io::sink::MemorySink;
use crate::plot::{CHART_TITLE, ChartSeries, X_LABEL, Y_LABEL, bounds, chart_series};

mod plotters_chart;

use plotters_chart::{CoreChart, core_color};

/// Start the viewer on already-ingested data.
pub fn run(ingest: IngestedData, source: String, options: FitOptions) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(ingest, source, options);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    ingest: IngestedData,
    source: String,
    options: FitOptions,
    charts: Vec<ChartSeries>,
    sink: MemorySink,
    report: BatchReport,
    selected: usize,
    scroll: usize,
    status: String,
}

impl App {
    fn new(ingest: IngestedData, source: String, options: FitOptions) -> Self {
        let charts = chart_series(&ingest.series);
        let mut sink = MemorySink::new();
        let report = run_batch(&ingest.series, &options, &mut sink, &mut []);
        let status = format!("{} failure(s)", report.failure_count());
        Self {
            ingest,
            source,
            options,
            charts,
            sink,
            report,
            selected: 0,
            scroll: 0,
            status,
        }
    }

    fn refit(&mut self) {
        let mut sink = MemorySink::new();
        self.report = run_batch(&self.ingest.series, &self.options, &mut sink, &mut []);
        self.sink = sink;
        self.scroll = 0;
        self.status = format!(
            "pivot: {} | {} failure(s)",
            self.options.pivot.display_name(),
            self.report.failure_count()
        );
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the viewer should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let n = self.charts.len().max(1);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right => {
                self.selected = (self.selected + 1) % n;
                self.scroll = 0;
            }
            KeyCode::Left => {
                self.selected = (self.selected + n - 1) % n;
                self.scroll = 0;
            }
            KeyCode::Down => {
                if self.scroll + 1 < self.panel_lines().len() {
                    self.scroll += 1;
                }
            }
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('p') => {
                self.options.pivot = self.options.pivot.toggled();
                self.refit();
            }
            _ => {}
        }
        false
    }

    /// Equation lines plus failures of the selected core.
    fn panel_lines(&self) -> Vec<(String, bool)> {
        let Some(outcome) = self.report.cores.get(self.selected) else {
            return Vec::new();
        };
        let mut lines: Vec<(String, bool)> = self
            .sink
            .lines_for(outcome.core)
            .iter()
            .map(|l| (l.clone(), false))
            .collect();
        lines.extend(outcome.failures().into_iter().map(|e| (e.to_string(), true)));
        lines
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(58)])
            .split(chunks[1]);
        self.draw_chart(frame, body[0]);
        self.draw_equations(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let stats = &self.ingest.stats;
        let core_label = self
            .charts
            .get(self.selected)
            .map(|c| c.label.clone())
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("ctemp", Style::default().fg(Color::Cyan)),
                Span::raw(format!(": {}", self.source)),
            ]),
            Line::from(Span::styled(
                format!(
                    "samples: {} | cores: {} | time: [{:.0}, {:.0}]s | selected: {core_label} | pivot: {} | failures: {}",
                    stats.n_samples,
                    stats.n_cores,
                    stats.t_min,
                    stats.t_max,
                    self.options.pivot.display_name(),
                    self.report.failure_count(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(CHART_TITLE).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some((x_bounds, y_bounds)) = bounds(&self.charts) else {
            let msg = Paragraph::new("No samples to plot.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };
        let pad = (y_bounds[1] - y_bounds[0]) * 0.05;

        let widget = CoreChart {
            series: &self.charts,
            selected: self.selected,
            x_bounds,
            y_bounds: [y_bounds[0] - pad, y_bounds[1] + pad],
            x_label: X_LABEL,
            y_label: Y_LABEL,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_equations(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self
            .charts
            .get(self.selected)
            .map(|c| c.label.clone())
            .unwrap_or_default();
        let color = core_color(self.selected);
        let title_style = Style::default()
            .fg(Color::Rgb(color.0, color.1, color.2))
            .add_modifier(Modifier::BOLD);

        let lines: Vec<Line> = self
            .panel_lines()
            .into_iter()
            .skip(self.scroll)
            .map(|(text, failed)| {
                if failed {
                    Line::from(Span::styled(text, Style::default().fg(Color::Red)))
                } else {
                    Line::from(text)
                }
            })
            .collect();

        let p = Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(Span::styled(title, title_style))
                .borders(Borders::ALL),
        );
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ core  ↑/↓ scroll  p toggle pivot  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
