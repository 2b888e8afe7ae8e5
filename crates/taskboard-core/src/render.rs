use std::io::{self, IsTerminal, Write};

use chrono_tz::Tz;
use taskboard_shared::Task;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::Config;
use crate::format::{Progress, format_deadline, priority_class};
use crate::view::BoardView;

const COLUMN_WIDTH: usize = 30;
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    tz: Tz,
}

/// One rendered line of a column: plain text plus an optional ANSI colour applied
/// after padding.
struct Cell {
    text: String,
    paint: Option<&'static str>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            paint: None,
        }
    }

    fn painted(text: impl Into<String>, code: &'static str) -> Self {
        Self {
            text: text.into(),
            paint: Some(code),
        }
    }
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            color: cfg.color && io::stdout().is_terminal(),
            tz: cfg.timezone()?,
        })
    }

    pub fn plain(tz: Tz) -> Self {
        Self { color: false, tz }
    }

    #[tracing::instrument(skip(self, out, view, progress), fields(total = view.total()))]
    pub fn write_board<W: Write>(
        &self,
        out: &mut W,
        view: &BoardView,
        progress: Progress,
    ) -> io::Result<()> {
        let columns: Vec<Vec<Cell>> = view
            .columns()
            .iter()
            .map(|(status, tasks)| {
                let mut cells = vec![
                    Cell::painted(
                        format!("{} ({})", status.label(), tasks.len()),
                        "1",
                    ),
                    Cell::plain("-".repeat(COLUMN_WIDTH)),
                ];
                for task in tasks.iter() {
                    cells.extend(self.task_cells(task));
                }
                cells
            })
            .collect();

        let height = columns.iter().map(Vec::len).max().unwrap_or(0);
        for row in 0..height {
            let line = columns
                .iter()
                .map(|column| match column.get(row) {
                    Some(cell) => self.finish_cell(cell),
                    None => " ".repeat(COLUMN_WIDTH),
                })
                .collect::<Vec<_>>()
                .join(COLUMN_GAP);
            writeln!(out, "{}", line.trim_end())?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "Progress: {}% ({}/{} completed)",
            progress.percent(),
            progress.completed,
            progress.total
        )?;
        Ok(())
    }

    fn task_cells(&self, task: &Task) -> Vec<Cell> {
        let id = task
            .id
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());

        let mut cells = vec![Cell::plain(format!("#{id} {}", task.title))];

        let class = priority_class(&task.priority);
        let mut meta = format!("  [{}]", task.priority);
        let deadline = format_deadline(task.deadline.as_deref(), &self.tz);
        if !deadline.is_empty() {
            meta.push_str(&format!(" due {deadline}"));
        }
        cells.push(Cell::painted(meta, priority_code(class)));

        if let Some(description) = task
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            cells.push(Cell::plain(format!("  {description}")));
        }
        cells.push(Cell::plain(""));
        cells
    }

    fn finish_cell(&self, cell: &Cell) -> String {
        let fitted = fit_width(&cell.text, COLUMN_WIDTH);
        match cell.paint {
            Some(code) if self.color => format!("\x1b[{code}m{fitted}\x1b[0m"),
            _ => fitted,
        }
    }
}

fn priority_code(class: &str) -> &'static str {
    match class {
        "high" => "31",
        "medium" => "33",
        _ => "32",
    }
}

/// Truncates (with an ellipsis) or pads `text` to exactly `width` display columns.
/// Control characters become spaces so server text cannot break the grid or reach
/// the terminal as escape sequences.
fn fit_width(text: &str, width: usize) -> String {
    let text: String = text
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    let text = text.as_str();
    if text.width() <= width {
        let pad = width - text.width();
        return format!("{text}{}", " ".repeat(pad));
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
