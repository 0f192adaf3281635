pub mod widgets;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use ratatui::DefaultTerminal;

use crate::analysis::LocalAnalyzer;
use crate::catalog::{CategoryFilter, ColorEntry};
use crate::sampler::ExtractedColor;
use crate::session::ExtractionSession;

use widgets::{centered, CatalogWidget, DetailWidget, PreviewWidget, TabsWidget};

/// State for the interactive catalog browser.
pub struct TuiApp {
    pub session: ExtractionSession,
    pub tab: usize,
    pub selected: Option<usize>,
    pub detail_open: bool,
    pub status: String,
}

impl TuiApp {
    pub fn new(session: ExtractionSession) -> Self {
        let mut app = Self {
            session,
            tab: 0,
            selected: None,
            detail_open: false,
            status: String::new(),
        };
        app.reset_selection();
        app.status = app.idle_status();
        app
    }

    pub fn filter(&self) -> CategoryFilter {
        CategoryFilter::TABS[self.tab % CategoryFilter::TABS.len()]
    }

    fn visible(&self) -> Vec<&ColorEntry> {
        self.session.catalog().filter(self.filter()).collect()
    }

    pub fn selected_id(&self) -> Option<String> {
        let visible = self.visible();
        self.selected
            .and_then(|i| visible.get(i))
            .map(|entry| entry.id.clone())
    }

    fn reset_selection(&mut self) {
        self.selected = if self.visible().is_empty() {
            None
        } else {
            Some(0)
        };
        self.detail_open = false;
    }

    fn idle_status(&self) -> String {
        if let Some(dims) = self.session.image_dimensions() {
            format!(
                "Tab: category  ↑↓: select  Enter: details  e: extract colors ({}x{} image)  q: quit",
                dims.width, dims.height
            )
        } else {
            "Tab: category  ↑↓: select  Enter: details  q: quit  (load an image with --image to extract)"
                .to_string()
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        self.selected = Some((current + delta).clamp(0, len as isize - 1) as usize);
    }

    fn extract(&mut self) {
        match self
            .session
            .request_automatic_extraction(&LocalAnalyzer::default())
        {
            Ok(ids) => {
                self.tab = 0;
                self.reset_selection();
                self.status = format!("Added {} color(s) to the catalog", ids.len());
            }
            Err(e) => self.status = format!("Extraction failed: {e}"),
        }
    }

    /// Apply one key press. Returns `false` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.detail_open {
            match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => self.detail_open = false,
                KeyCode::Char('q') => return false,
                _ => {}
            }
            return true;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab | KeyCode::Right => {
                self.tab = (self.tab + 1) % CategoryFilter::TABS.len();
                self.reset_selection();
            }
            KeyCode::BackTab | KeyCode::Left => {
                let n = CategoryFilter::TABS.len();
                self.tab = (self.tab + n - 1) % n;
                self.reset_selection();
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter => self.detail_open = self.selected_id().is_some(),
            KeyCode::Char('e') => self.extract(),
            _ => {}
        }
        true
    }

    fn draw(&self, frame: &mut Frame) {
        let [tabs_area, body, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        let [catalog_area, preview_area] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);

        frame.render_widget(TabsWidget::new(self.filter()), tabs_area);

        let visible = self.visible();
        frame.render_widget(CatalogWidget::new(&visible, self.selected), catalog_area);

        let preview: Vec<&ExtractedColor> = self.session.preview().collect();
        frame.render_widget(
            PreviewWidget::new(&preview, self.session.is_busy()),
            preview_area,
        );

        frame.render_widget(
            Paragraph::new(Span::styled(
                self.status.as_str(),
                Style::default().fg(Color::DarkGray),
            )),
            status_area,
        );

        if self.detail_open {
            if let Some(detail) = self
                .selected_id()
                .and_then(|id| self.session.catalog().select(&id))
            {
                let area = centered(frame.area(), 60, 16);
                frame.render_widget(DetailWidget::new(&detail), area);
            }
        }
    }
}

fn event_loop(terminal: &mut DefaultTerminal, app: &mut TuiApp) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && !app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

/// Launch the TUI application.
pub fn run(mut app: TuiApp) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app);
    ratatui::restore();
    result
}
