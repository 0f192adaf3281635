use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::catalog::{CategoryFilter, ColorDetail, ColorEntry};
use crate::color::Color as AppColor;
use crate::sampler::ExtractedColor;

fn to_color(c: &AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Choose black or white foreground for readable text on the given background.
fn contrast_fg(c: &AppColor) -> Color {
    const BLACK: AppColor = AppColor::new(0, 0, 0);
    const WHITE: AppColor = AppColor::new(255, 255, 255);
    if AppColor::contrast_ratio(c, &BLACK) > AppColor::contrast_ratio(c, &WHITE) {
        Color::Black
    } else {
        Color::White
    }
}

fn swatch(c: &AppColor, width: usize) -> Span<'static> {
    Span::styled(
        format!("{:^width$}", c.to_hex()),
        Style::default().bg(to_color(c)).fg(contrast_fg(c)),
    )
}

/// Category tabs. The active tab is bold and highlighted.
pub struct TabsWidget {
    active: CategoryFilter,
}

impl TabsWidget {
    pub fn new(active: CategoryFilter) -> Self {
        Self { active }
    }
}

impl Widget for TabsWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::raw(" ")];
        for tab in CategoryFilter::TABS {
            let style = if tab == self.active {
                Style::default()
                    .fg(Color::Rgb(150, 25, 28))
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} ", tab.label()), style));
            spans.push(Span::raw(" "));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// The filtered catalog as a column of color cards, one line each.
pub struct CatalogWidget<'a> {
    entries: &'a [&'a ColorEntry],
    selected: Option<usize>,
}

impl<'a> CatalogWidget<'a> {
    pub fn new(entries: &'a [&'a ColorEntry], selected: Option<usize>) -> Self {
        Self { entries, selected }
    }
}

impl Widget for CatalogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title(format!("Catalog ({})", self.entries.len()));
        let inner = block.inner(area);
        block.render(area, buf);

        // Keep the selection on screen.
        let visible = inner.height as usize;
        let offset = match self.selected {
            Some(i) if visible > 0 && i >= visible => i + 1 - visible,
            _ => 0,
        };

        let lines: Vec<Line> = self
            .entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, entry)| {
                let marker = if self.selected == Some(i) { "▶ " } else { "  " };
                let text_style = if self.selected == Some(i) {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(marker),
                    swatch(&entry.color, 9),
                    Span::styled(format!("  {}", entry.short_name()), text_style),
                    Span::styled(
                        format!("  {}", entry.palette_code),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Colors from the current extraction, newest first.
pub struct PreviewWidget<'a> {
    colors: &'a [&'a ExtractedColor],
    busy: bool,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(colors: &'a [&'a ExtractedColor], busy: bool) -> Self {
        Self { colors, busy }
    }
}

impl Widget for PreviewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Extraction preview");
        let inner = block.inner(area);
        block.render(area, buf);

        if self.colors.is_empty() {
            let msg = if self.busy {
                "Analyzing..."
            } else {
                "Waiting for image analysis"
            };
            Paragraph::new(Line::from(Span::styled(
                msg,
                Style::default().fg(Color::DarkGray),
            )))
            .render(inner, buf);
            return;
        }

        let mut lines = Vec::new();
        for c in self.colors {
            let mut spans = vec![swatch(&c.color, 9), Span::raw(format!("  {}", c.palette_code))];
            if let Some(label) = &c.label {
                spans.push(Span::styled(
                    format!("  {label}"),
                    Style::default().fg(Color::Rgb(150, 25, 28)),
                ));
            }
            lines.push(Line::from(spans));
            if let Some(description) = &c.description {
                lines.push(Line::from(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

/// Modal with the full detail of one entry.
pub struct DetailWidget<'a> {
    detail: &'a ColorDetail<'a>,
}

impl<'a> DetailWidget<'a> {
    pub fn new(detail: &'a ColorDetail<'a>) -> Self {
        Self { detail }
    }
}

/// Centered rectangle of at most `width` x `height` inside `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

impl Widget for DetailWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let entry = self.detail.entry;
        let cmyk = self.detail.cmyk;

        Clear.render(area, buf);
        let block = Block::bordered().title(format!(" {} ", entry.short_name()));
        let inner = block.inner(area);
        block.render(area, buf);

        let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::DarkGray));
        let lines = vec![
            Line::from(swatch(&entry.color, inner.width as usize)),
            Line::from(""),
            Line::from(Span::styled(
                entry.display_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![label("Palette  "), Span::raw(entry.palette_code.clone())]),
            Line::from(vec![label("HEX      "), Span::raw(self.detail.hex.clone())]),
            Line::from(vec![label("RGB      "), Span::raw(entry.color.rgb_string())]),
            Line::from(vec![
                label("CMYK     "),
                Span::raw(format!(
                    "C {}  M {}  Y {}  K {}",
                    cmyk.c, cmyk.m, cmyk.y, cmyk.k
                )),
            ]),
            Line::from(vec![
                label("Archive  "),
                Span::raw(format!(
                    "{} / {}",
                    entry.category.label(),
                    entry.category.archive_label()
                )),
            ]),
            Line::from(""),
            Line::from(vec![label("Source   "), Span::raw(entry.provenance.clone())]),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn catalog_widget_lists_hex_and_palette_codes() {
        let catalog = Catalog::baseline();
        let entries: Vec<&ColorEntry> = catalog
            .filter(CategoryFilter::Only(Category::Official))
            .collect();
        let area = Rect::new(0, 0, 70, 6);
        let mut buf = Buffer::empty(area);
        CatalogWidget::new(&entries, Some(0)).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Catalog (2)"));
        assert!(text.contains("#96191C"));
        assert!(text.contains("#003F87"));
        assert!(text.contains("PANTONE 19-4052 TCX"));
        assert!(text.contains("▶"));
    }

    #[test]
    fn swatch_text_is_readable_on_dark_and_light() {
        assert_eq!(contrast_fg(&AppColor::new(26, 43, 72)), Color::White);
        assert_eq!(contrast_fg(&AppColor::new(242, 242, 233)), Color::Black);
        assert_eq!(contrast_fg(&AppColor::new(150, 25, 28)), Color::White);
        assert_eq!(contrast_fg(&AppColor::new(245, 166, 35)), Color::Black);
    }

    #[test]
    fn detail_widget_shows_cmyk_and_provenance() {
        let catalog = Catalog::baseline();
        let detail = catalog.select("1").unwrap();
        let area = Rect::new(0, 0, 60, 14);
        let mut buf = Buffer::empty(area);
        DetailWidget::new(&detail).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("C 0  M 83  Y 81  K 41"));
        assert!(text.contains("150, 25, 28"));
        assert!(text.contains("Official"));
    }

    #[test]
    fn empty_preview_shows_waiting_message() {
        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&[], false).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Waiting for image analysis"));

        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&[], true).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Analyzing..."));
    }

    #[test]
    fn tabs_list_every_category() {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        TabsWidget::new(CategoryFilter::All).render(area, &mut buf);
        let text = buffer_text(&buf);
        for tab in CategoryFilter::TABS {
            assert!(text.contains(tab.label()));
        }
    }

    #[test]
    fn centered_fits_inside_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered(area, 60, 4);
        assert_eq!(rect, Rect::new(0, 3, 20, 4));
    }
}
