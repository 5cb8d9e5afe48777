use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Stacked selector layout
pub struct AppLayout {
    pub header_area: Rect,
    pub controls_area: Rect,
    pub body_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Create stacked layout:
    /// - Header: title and working directory (2 rows)
    /// - Controls: mode title, key hints, sort or search line (3 rows)
    /// - Body: record table or preview messages
    /// - Status bar: bottom row
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Length(3), // Controls
                Constraint::Min(3),    // Body (at least 3 rows)
                Constraint::Length(1), // Status bar (1 row)
            ])
            .split(area);

        Self {
            header_area: chunks[0],
            controls_area: chunks[1],
            body_area: chunks[2],
            status_area: chunks[3],
        }
    }
}
