//! Placed tokens and where they go.

use rand::Rng;

use crate::catalog::Token;
use crate::session::Session;
use crate::surface::{Handle, Position, Visual};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Liveness {
    /// Clickable.
    Live,
    /// Resolved (found, or animating out). Further clicks do nothing.
    Found,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub handle: Handle,
    pub token: Token,
    pub liveness: Liveness,
}

/// The tokens an engine currently has on the surface. Removal deletes the
/// entry, so a handle that is no longer here has been destroyed.
#[derive(Debug, Default)]
pub struct Instances {
    items: Vec<Instance>,
}

impl Instances {
    pub fn place(&mut self, s: &mut Session<'_>, token: Token, at: Position, size: f64) -> Handle {
        let handle = s.surface.place_token(token, at, size);
        self.items.push(Instance { handle, token, liveness: Liveness::Live });
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&Instance> {
        self.items.iter().find(|i| i.handle == handle)
    }

    /// The instance behind `handle` if it can still be clicked.
    pub fn live(&self, handle: Handle) -> Option<Instance> {
        self.get(handle).filter(|i| i.liveness == Liveness::Live).copied()
    }

    /// Marks the instance resolved and shows `visual` on it.
    pub fn resolve(&mut self, s: &mut Session<'_>, handle: Handle, visual: Visual) {
        if let Some(item) = self.items.iter_mut().find(|i| i.handle == handle) {
            item.liveness = Liveness::Found;
            s.surface.show_feedback(handle, visual);
        }
    }

    pub fn remove(&mut self, s: &mut Session<'_>, handle: Handle) -> Option<Instance> {
        let idx = self.items.iter().position(|i| i.handle == handle)?;
        s.surface.remove_token(handle);
        Some(self.items.remove(idx))
    }

    pub fn clear(&mut self, s: &mut Session<'_>) {
        for item in self.items.drain(..) {
            s.surface.remove_token(item.handle);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.items.iter()
    }
}

// --- Layout ---

/// Random spot inside `area`, keeping `margin` clear of the right and
/// bottom edges and shifted by `offset` from the top-left.
pub fn scatter<R: Rng + ?Sized>(area: (f64, f64), margin: f64, offset: f64, rng: &mut R) -> Position {
    let span = |len: f64| (len - margin).max(1.0);
    Position::new(
        rng.gen_range(0.0..span(area.0)) + offset,
        rng.gen_range(0.0..span(area.1)) + offset,
    )
}

/// Top-left corners of a `columns` × `rows` grid of `cell`-sized squares,
/// centred in `area`, row by row.
pub fn grid(area: (f64, f64), columns: usize, rows: usize, cell: f64, spacing: f64) -> Vec<Position> {
    let extent = |n: usize| n as f64 * cell + n.saturating_sub(1) as f64 * spacing;
    let x0 = (area.0 - extent(columns)) / 2.0;
    let y0 = (area.1 - extent(rows)) / 2.0;
    let mut out = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for col in 0..columns {
            out.push(Position::new(
                x0 + col as f64 * (cell + spacing),
                y0 + row as f64 * (cell + spacing),
            ));
        }
    }
    out
}

/// Largest square cell such that the grid fits in `fill` of `area`,
/// capped at `max_cell`.
pub fn fit_cell(area: (f64, f64), columns: usize, rows: usize, spacing: f64, fill: f64, max_cell: f64) -> f64 {
    let along = |len: f64, n: usize| {
        let n = n.max(1);
        (len * fill - (n - 1) as f64 * spacing) / n as f64
    };
    along(area.0, columns).min(along(area.1, rows)).min(max_cell).max(1.0)
}
