//! Panel geometry and line wrapping.
//!
//! Wrapping breaks anywhere once a row is full (no word boundaries), which
//! keeps long tokens such as paths or hashes from overflowing narrow panels.

use super::markup::{Fragment, SpanStyle};
use super::style::{PresetKind, LINE_PADDING, TOGGLE_WIDTH};
use unicode_width::UnicodeWidthChar;

/// Cell rectangle on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.x
            && row >= self.y
            && column < self.x.saturating_add(self.width)
            && row < self.y.saturating_add(self.height)
    }
}

/// Where the panel and its toggle button sit for one surface size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelGeometry {
    /// Panel body; `None` while the side panel is collapsed.
    pub panel: Option<Rect>,
    /// Collapse toggle button (side panel only).
    pub toggle: Option<Rect>,
}

/// Compute panel/toggle rectangles for a surface of `cols` x `rows`.
pub fn panel_geometry(kind: PresetKind, collapsed: bool, cols: u16, rows: u16) -> PanelGeometry {
    match kind {
        PresetKind::FullPanel => PanelGeometry {
            panel: Some(Rect {
                x: 0,
                y: 0,
                width: cols,
                height: rows,
            }),
            toggle: None,
        },
        PresetKind::SidePanel { width_percent } => {
            if collapsed {
                // Panel slides off the right edge; only the button stays.
                return PanelGeometry {
                    panel: None,
                    toggle: Some(Rect {
                        x: cols.saturating_sub(TOGGLE_WIDTH),
                        y: 0,
                        width: TOGGLE_WIDTH.min(cols),
                        height: rows,
                    }),
                };
            }
            let width = ((u32::from(cols) * u32::from(width_percent)) / 100) as u16;
            let width = width.max(1).min(cols);
            let x = cols - width;
            let toggle = (x >= TOGGLE_WIDTH).then(|| Rect {
                x: x - TOGGLE_WIDTH,
                y: 0,
                width: TOGGLE_WIDTH,
                height: rows,
            });
            PanelGeometry {
                panel: Some(Rect {
                    x,
                    y: 0,
                    width,
                    height: rows,
                }),
                toggle,
            }
        }
    }
}

/// Usable text columns inside a panel after horizontal padding.
pub fn text_columns(panel: Rect) -> usize {
    usize::from(panel.width.saturating_sub(LINE_PADDING * 2)).max(1)
}

/// Styled run of text inside one wrapped row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: SpanStyle,
}

/// One wrapped display row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub runs: Vec<StyledRun>,
    /// Occupied cells.
    pub width: usize,
}

impl Row {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    fn push(&mut self, ch: char, cells: usize, style: SpanStyle) {
        self.width += cells;
        if let Some(last) = self.runs.last_mut() {
            if last.style == style {
                last.text.push(ch);
                return;
            }
        }
        self.runs.push(StyledRun {
            text: ch.to_string(),
            style,
        });
    }
}

/// Wrapped rows for one line plus the caret cell when requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedLine {
    pub rows: Vec<Row>,
    /// `(row, col)` of the caret relative to the first row.
    pub cursor: Option<(usize, usize)>,
}

/// Collapse whitespace runs the way normal text flow does: every run of
/// whitespace becomes one space, and leading/trailing runs disappear.
pub fn collapse_whitespace(fragments: Vec<Fragment>) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(fragments.len());
    let mut at_row_start = true;
    let mut pending_space: Option<SpanStyle> = None;

    for fragment in fragments {
        match fragment {
            Fragment::Break => {
                pending_space = None;
                at_row_start = true;
                out.push(Fragment::Break);
            }
            Fragment::Text { text, style } => {
                let mut collapsed = String::new();
                for ch in text.chars() {
                    // Non-breaking spaces are content, not flow whitespace.
                    if ch.is_whitespace() && ch != '\u{a0}' {
                        if !at_row_start {
                            pending_space.get_or_insert(style);
                        }
                        continue;
                    }
                    if let Some(space_style) = pending_space.take() {
                        if space_style == style {
                            collapsed.push(' ');
                        } else {
                            out.push(Fragment::Text {
                                text: " ".into(),
                                style: space_style,
                            });
                        }
                    }
                    collapsed.push(ch);
                    at_row_start = false;
                }
                if !collapsed.is_empty() {
                    out.push(Fragment::Text {
                        text: collapsed,
                        style,
                    });
                }
            }
        }
    }
    out
}

/// Split literal typed text into fragments, one break per `\n`.
pub fn literal_fragments(text: &str) -> Vec<Fragment> {
    let mut out = Vec::new();
    for (idx, part) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push(Fragment::Break);
        }
        if !part.is_empty() {
            out.push(Fragment::Text {
                text: part.to_string(),
                style: SpanStyle::default(),
            });
        }
    }
    out
}

/// Wrap fragments into rows of at most `cols` cells.
///
/// `cursor` is a char index counted across text chars and breaks (a break is
/// one char, matching `\n` in the edit buffer).
pub fn wrap_fragments(fragments: &[Fragment], cols: usize, cursor: Option<usize>) -> WrappedLine {
    let cols = cols.max(1);
    let mut rows = vec![Row::default()];
    let mut char_idx = 0usize;
    let mut cursor_pos = None;

    let mark_cursor = |rows: &Vec<Row>, idx: usize, pos: &mut Option<(usize, usize)>| {
        if cursor == Some(idx) && pos.is_none() {
            let row = rows.len() - 1;
            *pos = Some((row, rows[row].width));
        }
    };

    for fragment in fragments {
        match fragment {
            Fragment::Break => {
                mark_cursor(&rows, char_idx, &mut cursor_pos);
                rows.push(Row::default());
                char_idx += 1;
            }
            Fragment::Text { text, style } => {
                for ch in text.chars() {
                    let cells = display_cells(ch);
                    let current = rows.len() - 1;
                    if rows[current].width + cells > cols && rows[current].width > 0 {
                        rows.push(Row::default());
                    }
                    mark_cursor(&rows, char_idx, &mut cursor_pos);
                    let current = rows.len() - 1;
                    rows[current].push(ch, cells, *style);
                    char_idx += 1;
                }
            }
        }
    }
    mark_cursor(&rows, char_idx, &mut cursor_pos);

    // A caret sitting past a full row drops to the start of the next row.
    if let Some((row, col)) = cursor_pos {
        if col >= cols {
            if row + 1 == rows.len() {
                rows.push(Row::default());
            }
            cursor_pos = Some((row + 1, 0));
        }
    }

    WrappedLine {
        rows,
        cursor: cursor_pos,
    }
}

/// Cells a char occupies; control chars draw as one blank cell.
fn display_cells(ch: char) -> usize {
    if ch.is_control() {
        return 1;
    }
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::markup::parse;

    fn row_texts(wrapped: &WrappedLine) -> Vec<String> {
        wrapped.rows.iter().map(Row::text).collect()
    }

    #[test]
    fn full_panel_covers_surface() {
        let geometry = panel_geometry(PresetKind::FullPanel, false, 80, 24);
        assert_eq!(
            geometry.panel,
            Some(Rect {
                x: 0,
                y: 0,
                width: 80,
                height: 24
            })
        );
        assert!(geometry.toggle.is_none());
    }

    #[test]
    fn side_panel_takes_right_share_with_toggle_on_left_edge() {
        let geometry = panel_geometry(PresetKind::SidePanel { width_percent: 30 }, false, 100, 20);
        let panel = geometry.panel.expect("panel visible");
        assert_eq!((panel.x, panel.width), (70, 30));
        let toggle = geometry.toggle.expect("toggle present");
        assert_eq!((toggle.x, toggle.width), (68, 2));
    }

    #[test]
    fn collapsed_side_panel_leaves_only_the_toggle_at_the_edge() {
        let geometry = panel_geometry(PresetKind::SidePanel { width_percent: 30 }, true, 100, 20);
        assert!(geometry.panel.is_none());
        assert_eq!(geometry.toggle.map(|t| t.x), Some(98));
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect {
            x: 2,
            y: 1,
            width: 3,
            height: 2,
        };
        assert!(rect.contains(2, 1));
        assert!(rect.contains(4, 2));
        assert!(!rect.contains(5, 1));
        assert!(!rect.contains(2, 3));
    }

    #[test]
    fn wrap_breaks_anywhere() {
        let wrapped = wrap_fragments(&parse("superlongtoken"), 5, None);
        assert_eq!(row_texts(&wrapped), vec!["super", "longt", "oken"]);
    }

    #[test]
    fn wrap_honors_breaks() {
        let wrapped = wrap_fragments(&parse("ab<br>cd"), 10, None);
        assert_eq!(row_texts(&wrapped), vec!["ab", "cd"]);
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let wrapped = wrap_fragments(&parse("日本語"), 4, None);
        assert_eq!(row_texts(&wrapped), vec!["日本", "語"]);
    }

    #[test]
    fn cursor_lands_after_text_and_wraps_past_full_row() {
        let fragments = literal_fragments("abc");
        assert_eq!(wrap_fragments(&fragments, 10, Some(3)).cursor, Some((0, 3)));
        assert_eq!(wrap_fragments(&fragments, 10, Some(1)).cursor, Some((0, 1)));

        let full = wrap_fragments(&fragments, 3, Some(3));
        assert_eq!(full.cursor, Some((1, 0)));
        assert_eq!(full.rows.len(), 2);
    }

    #[test]
    fn cursor_after_break_starts_next_row() {
        let fragments = literal_fragments("a\n");
        let wrapped = wrap_fragments(&fragments, 10, Some(2));
        assert_eq!(wrapped.cursor, Some((1, 0)));
    }

    #[test]
    fn empty_line_still_occupies_one_row() {
        let wrapped = wrap_fragments(&[], 10, Some(0));
        assert_eq!(wrapped.rows.len(), 1);
        assert_eq!(wrapped.cursor, Some((0, 0)));
    }

    #[test]
    fn collapse_merges_runs_and_trims_edges() {
        let collapsed = collapse_whitespace(parse("  a   b \t c  "));
        let wrapped = wrap_fragments(&collapsed, 80, None);
        assert_eq!(row_texts(&wrapped), vec!["a b c"]);
    }

    #[test]
    fn collapse_keeps_non_breaking_spaces() {
        let collapsed = collapse_whitespace(parse("a&nbsp;&nbsp;b"));
        let wrapped = wrap_fragments(&collapsed, 80, None);
        assert_eq!(row_texts(&wrapped), vec!["a\u{a0}\u{a0}b"]);
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wrapped_rows_fit_and_keep_every_char(
                text in proptest::string::string_regex("[a-z 日本\n]{0,64}").expect("regex"),
                cols in 2usize..20
            ) {
                let fragments = literal_fragments(&text);
                let cursor = text.chars().count();
                let wrapped = wrap_fragments(&fragments, cols, Some(cursor));
                for row in &wrapped.rows {
                    prop_assert!(row.width <= cols);
                }
                let kept: usize = wrapped.rows.iter().map(|r| r.text().chars().count()).sum();
                let breaks = text.matches('\n').count();
                prop_assert_eq!(kept + breaks, cursor);
                let (row, col) = wrapped.cursor.expect("cursor at end is always placed");
                prop_assert!(row < wrapped.rows.len());
                prop_assert!(col < cols);
            }
        }
    }
}
