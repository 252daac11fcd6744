//! Windowing over long lists, and cursor movement within them.
//!
//! A list is rendered item by item; items may span several rows and
//! some of them (separators, disabled entries) cannot be selected. The
//! [`Paginator`] picks which rows of that list fit in a page of
//! `page_size` rows around the active item, and remembers where the
//! active item sat so the window only scrolls when it has to.
//!
//! In loop mode the list is treated as a ring: the rows above the first
//! item are the last items. The active item's row moves down as the user
//! moves down until it reaches the middle of the page, after which the
//! content scrolls under it. Moving up never moves the row, and a jump
//! of a page or more (including wrapping from the first item to the
//! last) re-centres the active item.
//!
//! Without loop mode the window is clamped to the ends of the list.

use std::fmt;

use smallvec::SmallVec;

use crate::ansi::break_lines;
use crate::error::{HookError, PromptError, PromptResult};
use crate::hooks::Hooks;

/// Rows of one rendered item. Most items are a single row.
pub type ItemLines = SmallVec<[String; 1]>;

/// What a [`Paginator`] remembers between renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Row of the active item's first line in the last page.
    pub window_offset: usize,
    /// Index of the item that was active on the last page.
    pub last_active: Option<usize>,
}

/// One page of rendered rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<String>,
    /// Row of the active item's first line within `lines`.
    pub active_row: usize,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Lays out pages and keeps the window steady between renders.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    state: PaginationState,
}

impl Paginator {
    /// A paginator that has not laid out any page yet.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> PaginationState {
        self.state
    }

    /// Lay out `items` (each possibly multi-line) around `active`.
    pub fn paginate<S: AsRef<str>>(
        &mut self,
        items: &[S],
        active: usize,
        page_size: usize,
        looping: bool,
    ) -> Page {
        let items: Vec<ItemLines> = items
            .iter()
            .map(|item| item.as_ref().split('\n').map(str::to_owned).collect())
            .collect();
        self.paginate_lines(&items, active, page_size, looping)
    }

    /// Like [`paginate`](Self::paginate), over items already split into rows.
    pub fn paginate_lines(
        &mut self,
        items: &[ItemLines],
        active: usize,
        page_size: usize,
        looping: bool,
    ) -> Page {
        if items.is_empty() {
            self.state = PaginationState::default();
            return Page::default();
        }
        let active = active.min(items.len() - 1);
        let page_size = page_size.max(1);
        let total = height(items);
        let before = height(&items[..active]);

        if total <= page_size {
            self.state = PaginationState {
                window_offset: before,
                last_active: Some(active),
            };
            return Page {
                lines: items.iter().flatten().cloned().collect(),
                active_row: before,
            };
        }

        let middle = page_size / 2;
        let pointer = if looping {
            self.ring_pointer(items, active, before, page_size)
        } else {
            let space_from_active = total - before;
            if space_from_active < page_size - middle {
                page_size - space_from_active
            } else {
                before.min(middle)
            }
        };

        self.state = PaginationState {
            window_offset: pointer,
            last_active: Some(active),
        };
        layout(items, active, pointer, page_size, looping)
    }

    fn ring_pointer(
        &self,
        items: &[ItemLines],
        active: usize,
        before: usize,
        page_size: usize,
    ) -> usize {
        let middle = page_size / 2;
        let pointer = self.state.window_offset;
        match self.state.last_active {
            Some(last) if last < active && active - last < page_size => {
                (pointer + height(&items[last..active])).min(middle)
            }
            Some(last) if last >= active => pointer.min(middle),
            _ => before.min(middle),
        }
    }
}

fn height(items: &[ItemLines]) -> usize {
    items.iter().map(SmallVec::len).sum()
}

/// Place the active item at `pointer`, then fill the rows below and
/// above it from its neighbours, never showing an item twice.
fn layout(
    items: &[ItemLines],
    active: usize,
    pointer: usize,
    page_size: usize,
    looping: bool,
) -> Page {
    let n = items.len();
    let active_lines = &items[active][..items[active].len().min(page_size)];
    let active_row = pointer.min(page_size - active_lines.len());

    let below_order: Vec<usize> = if looping {
        (1..n).map(|k| (active + k) % n).collect()
    } else {
        (active + 1..n).collect()
    };
    let above_order: Vec<usize> = if looping {
        (1..n).map(|k| (active + n - k) % n).collect()
    } else {
        (0..active).rev().collect()
    };

    let mut taken_below = vec![false; n];
    let mut taken_above = vec![false; n];
    let mut below_rows = below_order
        .iter()
        .flat_map(|&i| items[i].iter().map(move |line| (i, line)))
        .peekable();

    let mut below: Vec<&String> = Vec::with_capacity(page_size);
    let wanted_below = page_size - active_row - active_lines.len();
    while below.len() < wanted_below {
        let Some((i, line)) = below_rows.next() else {
            break;
        };
        taken_below[i] = true;
        below.push(line);
    }

    let mut above: Vec<&String> = Vec::with_capacity(active_row);
    'fill: for &i in &above_order {
        if taken_below[i] {
            break;
        }
        taken_above[i] = true;
        for line in items[i].iter().rev() {
            if above.len() >= active_row {
                break 'fill;
            }
            above.push(line);
        }
    }

    // Not enough rows above; close the gap with more rows from below.
    while above.len() + active_lines.len() + below.len() < page_size {
        match below_rows.next_if(|(i, _)| !taken_above[*i]) {
            Some((_, line)) => below.push(line),
            None => break,
        }
    }

    let mut lines = Vec::with_capacity(page_size);
    lines.extend(above.iter().rev().map(|line| (*line).clone()));
    lines.extend(active_lines.iter().cloned());
    lines.extend(below.into_iter().cloned());
    Page {
        lines,
        active_row: above.len(),
    }
}

/// Render `items` and paginate them around `active`, keeping the window
/// position in a hook slot between renders.
///
/// `render` receives each item, its index and whether it is active; its
/// output is wrapped at the terminal width before windowing.
pub fn use_pagination<T>(
    hooks: &Hooks,
    items: &[T],
    active: usize,
    page_size: usize,
    looping: bool,
    mut render: impl FnMut(&T, usize, bool) -> String,
) -> Result<Page, HookError> {
    let paginator = hooks.use_ref(Paginator::new)?;
    let width = hooks.columns();
    let rendered: Vec<ItemLines> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            break_lines(&render(item, index, index == active), width)
                .split('\n')
                .map(str::to_owned)
                .collect()
        })
        .collect();
    Ok(paginator.with_mut(|p| p.paginate_lines(&rendered, active, page_size, looping)))
}

/// Entries that the cursor may or may not land on.
pub trait Selectable {
    /// False for separators and disabled entries.
    fn is_selectable(&self) -> bool;
}

/// Which way [`step`] moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// First and last selectable index.
///
/// Fails with [`PromptError::Validation`] when nothing is selectable, so
/// callers never search a list that has no stopping point.
pub fn selectable_bounds<T: Selectable>(items: &[T]) -> PromptResult<(usize, usize)> {
    let first = items.iter().position(Selectable::is_selectable);
    let last = items.iter().rposition(Selectable::is_selectable);
    match first.zip(last) {
        Some(bounds) => Ok(bounds),
        None => Err(PromptError::validation("No selectable items")),
    }
}

/// Move one selectable entry from `active` in `direction`, skipping
/// entries that cannot be selected.
///
/// Without `looping` the cursor stays on the first (last) selectable
/// entry when moving up (down) from it.
pub fn step<T: Selectable>(
    items: &[T],
    active: usize,
    direction: Direction,
    looping: bool,
) -> PromptResult<usize> {
    let (first, last) = selectable_bounds(items)?;
    let at_edge = match direction {
        Direction::Up => active <= first,
        Direction::Down => active >= last,
    };
    if !looping && at_edge {
        return Ok(active);
    }

    let n = items.len();
    let mut next = active.min(n - 1);
    loop {
        next = match direction {
            Direction::Up => (next + n - 1) % n,
            Direction::Down => (next + 1) % n,
        };
        if items[next].is_selectable() {
            return Ok(next);
        }
    }
}

/// Raw index of the `n`th selectable entry, counting from 1.
pub fn nth_selectable<T: Selectable>(items: &[T], n: usize) -> Option<usize> {
    let n = n.checked_sub(1)?;
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_selectable())
        .nth(n)
        .map(|(index, _)| index)
}

/// Raw index of the first selectable entry matching `predicate`.
pub fn find_selectable<T: Selectable>(
    items: &[T],
    mut predicate: impl FnMut(&T) -> bool,
) -> Option<usize> {
    items
        .iter()
        .position(|item| item.is_selectable() && predicate(item))
}
