// ListingDesk - core/focus.rs
//
// Keyboard focus and edit mode for the grid, as an explicit state machine
// over abstract input events. No rendering toolkit is involved.
//
//   Idle    --Enter-->                Editing
//   Editing --Enter | Escape | Blur--> Idle
//   Editing --Tab-->                  Idle, one cell right
//   Idle    --Arrow* | Tab-->         Idle, one cell over (clamped)
//
// Text typed while Editing is committed on every keystroke by the caller.
// Leaving the editor (including Escape) never rolls those characters back.

/// Position within the visible window: row within the current page,
/// column within the visible columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    Idle,
    Editing,
}

/// Abstract input events fed to the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    Enter,
    Escape,
    Blur,
    /// Pointer focus on a specific cell.
    Focus(CellPos),
    /// The editor's full text after a keystroke.
    Input(String),
}

/// What the caller should do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Nothing changed.
    Ignored,
    Moved(CellPos),
    StartedEditing(CellPos),
    StoppedEditing(CellPos),
    /// Write `text` into the cell now.
    Commit { cell: CellPos, text: String },
}

/// Size of the currently visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub rows: usize,
    pub cols: usize,
}

impl Bounds {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    fn contains(&self, cell: CellPos) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }
}

/// 2D cursor plus edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusNavigator {
    cursor: Option<CellPos>,
    mode: FocusMode,
}

impl Default for FocusNavigator {
    fn default() -> Self {
        Self {
            cursor: None,
            mode: FocusMode::Idle,
        }
    }
}

impl FocusNavigator {
    pub fn cursor(&self) -> Option<CellPos> {
        self.cursor
    }

    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == FocusMode::Editing
    }

    /// Drop focus entirely (e.g. the window became empty).
    pub fn clear(&mut self) {
        self.cursor = None;
        self.mode = FocusMode::Idle;
    }

    /// Keep the cursor inside `bounds` after the window changed size.
    pub fn clamp_to(&mut self, bounds: Bounds) {
        if bounds.is_empty() {
            self.clear();
            return;
        }
        if let Some(cell) = self.cursor {
            let clamped = CellPos::new(cell.row.min(bounds.rows - 1), cell.col.min(bounds.cols - 1));
            if clamped != cell {
                // The edited cell is gone from view.
                self.mode = FocusMode::Idle;
            }
            self.cursor = Some(clamped);
        }
    }

    /// Close the editor without moving the cursor.
    pub fn stop_editing(&mut self) {
        self.mode = FocusMode::Idle;
    }

    /// Move the cursor to `row` in the same column, keeping the mode. Used
    /// when the edited listing moves within the page.
    pub fn follow_row(&mut self, row: usize) {
        if let Some(cell) = self.cursor.as_mut() {
            cell.row = row;
        }
    }

    /// Feed one event. `bounds` is the visible window at the time of the event.
    pub fn handle(&mut self, event: NavEvent, bounds: Bounds) -> NavOutcome {
        if bounds.is_empty() {
            self.clear();
            return NavOutcome::Ignored;
        }

        if let NavEvent::Focus(cell) = event {
            if !bounds.contains(cell) {
                return NavOutcome::Ignored;
            }
            self.cursor = Some(cell);
            self.mode = FocusMode::Idle;
            return NavOutcome::Moved(cell);
        }

        // Keyboard events need a focused cell; the first one lands on the origin.
        let Some(cell) = self.cursor else {
            return match event {
                NavEvent::ArrowUp
                | NavEvent::ArrowDown
                | NavEvent::ArrowLeft
                | NavEvent::ArrowRight
                | NavEvent::Tab => {
                    let origin = CellPos::new(0, 0);
                    self.cursor = Some(origin);
                    NavOutcome::Moved(origin)
                }
                _ => NavOutcome::Ignored,
            };
        };

        match self.mode {
            FocusMode::Idle => self.handle_idle(event, cell, bounds),
            FocusMode::Editing => self.handle_editing(event, cell, bounds),
        }
    }

    fn handle_idle(&mut self, event: NavEvent, cell: CellPos, bounds: Bounds) -> NavOutcome {
        match event {
            NavEvent::Enter => {
                self.mode = FocusMode::Editing;
                NavOutcome::StartedEditing(cell)
            }
            NavEvent::ArrowUp => self.move_to(CellPos::new(cell.row.saturating_sub(1), cell.col), cell),
            NavEvent::ArrowDown => {
                self.move_to(CellPos::new((cell.row + 1).min(bounds.rows - 1), cell.col), cell)
            }
            NavEvent::ArrowLeft => self.move_to(CellPos::new(cell.row, cell.col.saturating_sub(1)), cell),
            NavEvent::ArrowRight | NavEvent::Tab => {
                self.move_to(CellPos::new(cell.row, (cell.col + 1).min(bounds.cols - 1)), cell)
            }
            // Typing without an open editor does nothing.
            NavEvent::Input(_) | NavEvent::Escape | NavEvent::Blur | NavEvent::Focus(_) => {
                NavOutcome::Ignored
            }
        }
    }

    fn handle_editing(&mut self, event: NavEvent, cell: CellPos, bounds: Bounds) -> NavOutcome {
        match event {
            NavEvent::Input(text) => NavOutcome::Commit { cell, text },
            NavEvent::Enter | NavEvent::Escape | NavEvent::Blur => {
                self.mode = FocusMode::Idle;
                NavOutcome::StoppedEditing(cell)
            }
            NavEvent::Tab => {
                self.mode = FocusMode::Idle;
                let next = CellPos::new(cell.row, (cell.col + 1).min(bounds.cols - 1));
                self.cursor = Some(next);
                NavOutcome::Moved(next)
            }
            // Arrow keys move the caret inside the editor.
            NavEvent::ArrowUp
            | NavEvent::ArrowDown
            | NavEvent::ArrowLeft
            | NavEvent::ArrowRight
            | NavEvent::Focus(_) => NavOutcome::Ignored,
        }
    }

    fn move_to(&mut self, target: CellPos, from: CellPos) -> NavOutcome {
        if target == from {
            return NavOutcome::Ignored;
        }
        self.cursor = Some(target);
        NavOutcome::Moved(target)
    }
}
