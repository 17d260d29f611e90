//! Text renderers for the scoreboard and the world.

use crate::domain::model::{Snapshot, Tile};
use crate::domain::ports::SnapshotListener;
use std::fmt::Write as _;
use std::io::Write;

/// `#rrggbb` 轉成 ANSI 真彩色；其他顏色名稱直接用預設色
fn paint(colour: &str, glyph: char) -> String {
    let rgb = colour
        .strip_prefix('#')
        .filter(|hex| hex.len() == 6)
        .and_then(|hex| {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        });
    match rgb {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, glyph),
        None => glyph.to_string(),
    }
}

pub fn render_scoreboard(snapshot: &Snapshot, colour: bool) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Simulation turn:  {:8}", snapshot.turn_count);
    let _ = writeln!(text, "Turns per second: {:8.1}", snapshot.tps);
    for (entrant, count) in snapshot.entrants.iter().zip(&snapshot.counts) {
        let dot = if colour {
            paint(&entrant.colour, '●')
        } else {
            "●".to_string()
        };
        let _ = writeln!(
            text,
            "{} {:<14} {:<24} {:8}",
            dot, entrant.name, entrant.group, count
        );
    }
    if snapshot.game_over {
        match snapshot.winner() {
            Some(winner) => {
                let _ = writeln!(text, "🏆 {} wins!", winner.name);
            }
            None => {
                let _ = writeln!(text, "💀 No survivors");
            }
        }
    }
    text
}

/// 記分板：回合數、速度、每個參賽者的數量
pub struct ScoreBoard<W: Write> {
    out: W,
    colour: bool,
}

impl<W: Write> ScoreBoard<W> {
    pub fn new(out: W, colour: bool) -> Self {
        Self { out, colour }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, snapshot: &Snapshot) {
        let text = render_scoreboard(snapshot, self.colour);
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to draw scoreboard: {}", e);
        }
    }
}

impl<W: Write> SnapshotListener for ScoreBoard<W> {
    fn initialize(&mut self, snapshot: &Snapshot) {
        // 新比賽的速度從 0 開始顯示
        let fresh = Snapshot {
            tps: 0.0,
            ..snapshot.clone()
        };
        self.draw(&fresh);
    }

    fn changed(&mut self, snapshot: &Snapshot) {
        self.draw(snapshot);
    }
}

fn tile_char(tile: Tile) -> char {
    match tile {
        Tile::Empty => '.',
        Tile::Plant => '*',
        Tile::Poison => '#',
        Tile::Species(index) => char::from(b'A' + (index % 26) as u8),
    }
}

/// One row of characters per world row. Species are lettered in entry order.
pub fn render_world(width: usize, tiles: &[Tile]) -> String {
    let mut text = String::with_capacity(tiles.len() + width);
    for row in tiles.chunks(width.max(1)) {
        text.extend(row.iter().copied().map(tile_char));
        text.push('\n');
    }
    text
}

fn render_world_coloured(width: usize, tiles: &[Tile]) -> String {
    let mut text = String::new();
    for row in tiles.chunks(width.max(1)) {
        for tile in row {
            text.push_str(&paint(tile.colour(), tile_char(*tile)));
        }
        text.push('\n');
    }
    text
}

pub struct WorldView<W: Write> {
    out: W,
    colour: bool,
    last: Option<Vec<Tile>>,
}

impl<W: Write> WorldView<W> {
    pub fn new(out: W, colour: bool) -> Self {
        Self {
            out,
            colour,
            last: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, snapshot: &Snapshot) {
        let text = if self.colour {
            render_world_coloured(snapshot.world_width, &snapshot.tiles)
        } else {
            render_world(snapshot.world_width, &snapshot.tiles)
        };
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to draw world: {}", e);
        }
        self.last = Some(snapshot.tiles.clone());
    }
}

impl<W: Write> SnapshotListener for WorldView<W> {
    fn initialize(&mut self, snapshot: &Snapshot) {
        self.draw(snapshot);
    }

    fn changed(&mut self, snapshot: &Snapshot) {
        if self.last.as_deref() != Some(snapshot.tiles.as_slice()) {
            self.draw(snapshot);
        }
    }
}
