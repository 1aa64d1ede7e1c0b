//! Presentation layer: terminal renderer.
//!
//! Screens are sparse and only change on a state transition (reveal
//! tick, key press, outcome), so every screen is drawn with a full
//! clear + batched `queue!` commands and a single flush. No per-cell
//! diffing is needed at this redraw rate.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::domain::card::Card;
use crate::domain::mode::GameMode;

/// Horizontal space one card occupies in the selection grid,
/// including the gap to its neighbor.
const CARD_PITCH: u16 = 9;
const CARD_WIDTH: u16 = 7;

/// Grid columns for `count` cards at the given terminal width.
/// The cursor-movement code in the main loop uses the same value.
pub fn grid_cols(count: usize, term_width: u16) -> usize {
    let fit = (term_width.saturating_sub(4) / CARD_PITCH) as usize;
    fit.clamp(1, count.max(1))
}

fn mode_color(mode: GameMode) -> Color {
    match mode {
        GameMode::Classic => Color::Magenta,
        GameMode::NBack => Color::Green,
    }
}

pub struct Renderer {
    out: BufWriter<Stdout>,
    width: u16,
    height: u16,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            out: BufWriter::new(io::stdout()),
            width: 80,
            height: 24,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.refresh_size();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.out, ResetColor, Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn refresh_size(&mut self) {
        if let Ok((w, h)) = terminal::size() {
            self.width = w;
            self.height = h;
        }
    }

    // ── Screens ──

    /// Title screen: mode select + scoreboard.
    pub fn render_title(
        &mut self,
        classic_best: usize,
        nback_best: usize,
        cursor: usize,
    ) -> io::Result<()> {
        self.begin()?;
        let mid = self.height / 3;

        self.put_centered(mid.saturating_sub(2), "MEMORY TRAINER", Color::Yellow)?;
        self.put_centered(mid.saturating_sub(1), "watch the cards, recall the order", Color::DarkGrey)?;

        let entries = [
            (GameMode::Classic, classic_best),
            (GameMode::NBack, nback_best),
        ];
        for (i, (mode, best)) in entries.iter().enumerate() {
            let marker = if cursor == i { "▶ " } else { "  " };
            let line = format!("{}{}   best level {}", marker, mode.title(), best);
            let color = if cursor == i { mode_color(*mode) } else { Color::Grey };
            self.put_centered(mid + 2 + i as u16 * 2, &line, color)?;
        }

        self.put_centered(
            self.height.saturating_sub(3),
            "↑/↓ choose   Enter play   Q quit",
            Color::DarkGrey,
        )?;
        self.end()
    }

    /// Between rounds: level, best, start prompt, and the last outcome.
    pub fn render_ready(
        &mut self,
        mode: GameMode,
        level: usize,
        best: usize,
        banner: Option<(&str, Color)>,
    ) -> io::Result<()> {
        self.begin()?;
        let mid = self.height / 3;

        self.put_centered(mid.saturating_sub(2), mode.title(), mode_color(mode))?;
        if let Some((text, color)) = banner {
            self.put_centered(mid, text, color)?;
        }
        self.put_centered(mid + 2, &format!("Level {level}"), Color::White)?;
        self.put_centered(mid + 3, &format!("best level {best}"), Color::DarkGrey)?;
        self.put_centered(mid + 5, "Space start   Esc back", Color::DarkGrey)?;
        self.end()
    }

    /// One big card mid-reveal. `card = None` draws the blank flip
    /// between two cards.
    pub fn render_reveal(
        &mut self,
        mode: GameMode,
        card: Option<&Card>,
        index: usize,
        total: usize,
    ) -> io::Result<()> {
        self.begin()?;
        let mid = self.height / 3;

        self.put_centered(mid.saturating_sub(2), mode.title(), mode_color(mode))?;

        let cx = self.width / 2;
        let top = mid + 1;
        self.put_at(cx.saturating_sub(5), top, "╭────────╮", Color::White)?;
        for dy in 1..=4 {
            self.put_at(cx.saturating_sub(5), top + dy, "│        │", Color::White)?;
        }
        self.put_at(cx.saturating_sub(5), top + 5, "╰────────╯", Color::White)?;
        if let Some(card) = card {
            self.put_at(cx.saturating_sub(1), top + 2, &card.symbol, Color::White)?;
        }

        self.put_centered(
            top + 7,
            &format!("card {} of {}", index + 1, total),
            Color::DarkGrey,
        )?;
        self.end()
    }

    /// Selection grid. Selected cards are dimmed and badged with their
    /// pick order; the cursor card is highlighted.
    pub fn render_input(
        &mut self,
        mode: GameMode,
        cards: &[Card],
        selection: &[usize],
        cursor: usize,
    ) -> io::Result<()> {
        self.begin()?;

        self.put_centered(1, mode.title(), mode_color(mode))?;
        self.put_centered(2, mode.prompt(), Color::White)?;

        let cols = grid_cols(cards.len(), self.width);
        let rows = cards.len().div_ceil(cols);
        let grid_w = cols as u16 * CARD_PITCH;
        let x0 = self.width.saturating_sub(grid_w) / 2;
        let y0 = 4;

        for (i, card) in cards.iter().enumerate() {
            let col = (i % cols) as u16;
            let row = (i / cols) as u16;
            let x = x0 + col * CARD_PITCH;
            let y = y0 + row * 3;

            let picked = selection.iter().position(|&id| id == card.id);
            let under_cursor = i == cursor;

            let frame_color = if under_cursor {
                Color::Yellow
            } else if picked.is_some() {
                Color::DarkGreen
            } else {
                Color::Grey
            };

            // Order badge sits on the top border once the card is picked.
            let badge = match picked {
                Some(pos) => format!("{:─<width$}", pos + 1, width = (CARD_WIDTH - 2) as usize),
                None => "─".repeat((CARD_WIDTH - 2) as usize),
            };
            self.put_at(x, y, &format!("╭{badge}╮"), frame_color)?;
            self.put_at(x, y + 1, &format!("│ {}  │", card.symbol), frame_color)?;
            self.put_at(x, y + 2, &format!("╰{}╯", "─".repeat((CARD_WIDTH - 2) as usize)), frame_color)?;
        }

        let picked = selection.len();
        self.put_centered(
            y0 + rows as u16 * 3 + 1,
            &format!("{picked} of {} picked", cards.len()),
            Color::DarkGrey,
        )?;
        self.put_centered(
            self.height.saturating_sub(2),
            "arrows move   Space toggle",
            Color::DarkGrey,
        )?;
        self.end()
    }

    // ── Drawing helpers ──

    fn begin(&mut self) -> io::Result<()> {
        self.refresh_size();
        queue!(self.out, SetBackgroundColor(Color::Reset), Clear(ClearType::All))?;
        Ok(())
    }

    fn end(&mut self) -> io::Result<()> {
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }

    fn put_at(&mut self, x: u16, y: u16, text: &str, color: Color) -> io::Result<()> {
        if y >= self.height {
            return Ok(());
        }
        queue!(
            self.out,
            MoveTo(x, y),
            SetForegroundColor(color),
            Print(text)
        )?;
        Ok(())
    }

    fn put_centered(&mut self, y: u16, text: &str, color: Color) -> io::Result<()> {
        let w = text.chars().count() as u16;
        let x = self.width.saturating_sub(w) / 2;
        self.put_at(x, y, text, color)
    }
}
