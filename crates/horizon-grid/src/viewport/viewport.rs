//! Viewport windowing over the visible rows and columns.
//!
//! The viewport turns scroll offsets and client geometry into index ranges
//! so a renderer only touches the rows and columns on screen. Row and column
//! offsets are computed once and cached until [`Viewport::invalidate`].
//!
//! # Layout
//!
//! ```text
//! +---------+----------+--------+------------------------------+
//! |         |          | pinned |  header (scrolls with body)  |
//! +---------+----------+--------+------------------------------+
//! | row     | group    | pinned |                              |
//! | numbers | selector | cols   |   viewport area (scrolls)    |
//! |         |          |        |                              |
//! +---------+----------+--------+------------------------------+
//! ```
//!
//! Column indices are layout indices: pinned columns first, then the
//! scrollable ones. Only scrollable columns move with the horizontal offset.

use horizon_grid_core::logging::targets;
use parking_lot::Mutex;

use super::geometry::{Point, Rect, Size};

/// Geometry the viewport reads from the grid.
pub trait LayoutSource {
    /// Number of visible rows.
    fn row_count(&self) -> usize;

    /// Height of the visible row at `index`.
    fn row_height(&self, index: usize) -> u32;

    /// Number of visible columns, pinned ones included.
    fn column_count(&self) -> usize;

    /// Number of pinned columns at the front of the layout.
    fn pinned_column_count(&self) -> usize;

    /// Configured width of the column at layout `index`.
    fn column_width(&self, index: usize) -> u32;

    /// Height of the header row, zero when there is none.
    fn header_height(&self) -> u32;

    /// Padding of the row-number gutter, or `None` when it is hidden.
    fn row_number_padding(&self) -> Option<u32>;

    /// Width of the group-selector gutter, zero when it is hidden.
    fn group_selector_width(&self) -> u32;

    /// Rendered width of `text`.
    fn text_width(&self, text: &str) -> u32;
}

/// First and last index of a visible run, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    /// First wholly or partially visible index.
    pub first: usize,
    /// Last wholly or partially visible index.
    pub last: usize,
}

impl VisibleRange {
    /// Returns `true` if `index` is inside the range.
    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }

    /// Number of indices in the range.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Always `false`; an empty run is represented by `None`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Visible rows and scrollable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRange {
    /// Visible rows, `None` when there are none.
    pub rows: Option<VisibleRange>,
    /// Visible scrollable columns as layout indices, `None` when there are none.
    pub columns: Option<VisibleRange>,
}

/// Result of hit-testing a y coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowHit {
    /// The header row.
    Header,
    /// A visible row.
    Row(usize),
    /// Outside any row.
    Outside,
}

/// Result of hit-testing an x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnHit {
    /// The row-number gutter.
    RowNumbers,
    /// The group-selector gutter.
    GroupSelector,
    /// A pinned column, by layout index.
    Pinned(usize),
    /// A scrollable column, by layout index.
    Body(usize),
    /// Outside any column.
    Outside,
}

impl ColumnHit {
    /// Layout index of the hit column, if a column was hit.
    pub fn column(self) -> Option<usize> {
        match self {
            ColumnHit::Pinned(i) | ColumnHit::Body(i) => Some(i),
            _ => None,
        }
    }
}

/// Cached layout, valid until the next invalidation.
#[derive(Debug)]
struct ViewportCache {
    area: Rect,
    gutter_width: i64,
    selector_width: i64,
    pinned_count: usize,
    /// Row tops in content coordinates; one extra entry for the total.
    row_tops: Vec<i64>,
    /// Pinned column lefts relative to the pinned region, stretch applied.
    pinned_lefts: Vec<i64>,
    /// Scrollable column lefts in content coordinates, stretch applied.
    body_lefts: Vec<i64>,
    visible: Option<CellRange>,
}

impl ViewportCache {
    fn build(client: Size, layout: &dyn LayoutSource) -> Self {
        let rows = layout.row_count();
        let columns = layout.column_count();
        let pinned_count = layout.pinned_column_count().min(columns);

        let header = i64::from(layout.header_height());
        let gutter_width = match layout.row_number_padding() {
            Some(padding) => {
                let widest = rows.max(1).to_string();
                i64::from(layout.text_width(&widest)) + 2 * i64::from(padding)
            }
            None => 0,
        };
        let selector_width = i64::from(layout.group_selector_width());

        let mut pinned: Vec<i64> = (0..pinned_count)
            .map(|i| i64::from(layout.column_width(i)))
            .collect();
        let mut body: Vec<i64> = (pinned_count..columns)
            .map(|i| i64::from(layout.column_width(i)))
            .collect();
        let pinned_total: i64 = pinned.iter().sum();

        let left = gutter_width + selector_width + pinned_total;
        let area = Rect::new(
            left,
            header,
            (client.width - left).max(0),
            (client.height - header).max(0),
        );

        // The last visible column fills whatever width is left over.
        if !body.is_empty() {
            let others: i64 = body[..body.len() - 1].iter().sum();
            if let Some(last) = body.last_mut() {
                *last = (*last).max(area.width() - others);
            }
        } else if !pinned.is_empty() {
            let room = client.width - gutter_width - selector_width;
            let others: i64 = pinned[..pinned.len() - 1].iter().sum();
            if let Some(last) = pinned.last_mut() {
                *last = (*last).max(room - others);
            }
        }

        let mut row_tops = Vec::with_capacity(rows + 1);
        let mut top = 0i64;
        row_tops.push(0);
        for i in 0..rows {
            top += i64::from(layout.row_height(i));
            row_tops.push(top);
        }

        tracing::trace!(
            target: targets::VIEWPORT,
            rows,
            columns,
            area_width = area.width(),
            area_height = area.height(),
            "rebuilt viewport layout"
        );

        Self {
            area,
            gutter_width,
            selector_width,
            pinned_count,
            row_tops,
            pinned_lefts: prefix_sums(&pinned),
            body_lefts: prefix_sums(&body),
            visible: None,
        }
    }

    fn row_count(&self) -> usize {
        self.row_tops.len() - 1
    }

    fn body_count(&self) -> usize {
        self.body_lefts.len() - 1
    }

    fn row_height(&self, index: usize) -> i64 {
        self.row_tops[index + 1] - self.row_tops[index]
    }

    fn body_width(&self, index: usize) -> i64 {
        self.body_lefts[index + 1] - self.body_lefts[index]
    }

    fn total_height(&self) -> i64 {
        self.row_tops[self.row_count()]
    }

    fn total_body_width(&self) -> i64 {
        self.body_lefts[self.body_count()]
    }

    fn pinned_width(&self) -> i64 {
        self.pinned_lefts[self.pinned_lefts.len() - 1]
    }

    fn max_scroll(&self) -> Point {
        Point::new(
            (self.total_body_width() - self.area.width()).max(0),
            (self.total_height() - self.area.height()).max(0),
        )
    }
}

fn prefix_sums(widths: &[i64]) -> Vec<i64> {
    let mut out = Vec::with_capacity(widths.len() + 1);
    let mut acc = 0;
    out.push(0);
    for w in widths {
        acc += w;
        out.push(acc);
    }
    out
}

/// Index of the span containing `offset`, given span starts with a trailing
/// total.
fn span_at(starts: &[i64], offset: i64) -> Option<usize> {
    let count = starts.len().saturating_sub(1);
    if count == 0 || offset < 0 || offset >= starts[count] {
        return None;
    }
    let index = starts.partition_point(|&s| s <= offset).saturating_sub(1);
    Some(index.min(count - 1))
}

/// Forward accumulation from the span containing `scroll` until the
/// available extent is covered.
fn visible_span(starts: &[i64], scroll: i64, extent: i64) -> Option<VisibleRange> {
    let count = starts.len().saturating_sub(1);
    if count == 0 {
        return None;
    }
    let first = span_at(starts, scroll).unwrap_or(count - 1);
    let available = extent + (scroll - starts[first]).max(0);
    let mut last = first;
    let mut covered = starts[first + 1] - starts[first];
    while covered < available && last + 1 < count {
        last += 1;
        covered += starts[last + 1] - starts[last];
    }
    Some(VisibleRange { first, last })
}

/// Scroll offset that brings span `index` into a window of `extent` at
/// `scroll`. Walks backwards from the target to fill a page when the target
/// lies past the far edge.
fn reveal_offset(starts: &[i64], index: usize, scroll: i64, extent: i64) -> i64 {
    let top = starts[index];
    let bottom = starts[index + 1];
    if top < scroll {
        return top;
    }
    if bottom <= scroll + extent {
        return scroll;
    }
    let mut first = index;
    let mut covered = bottom - top;
    while first > 0 {
        let previous = starts[first] - starts[first - 1];
        if covered + previous > extent {
            break;
        }
        covered += previous;
        first -= 1;
    }
    starts[first]
}

/// Scroll state and cached layout of a grid.
#[derive(Debug, Default)]
pub struct Viewport {
    client: Size,
    scroll: Point,
    cache: Mutex<Option<ViewportCache>>,
}

impl Viewport {
    /// Creates a viewport with an empty client area.
    pub fn new() -> Self {
        Self::default()
    }

    /// The total client area.
    pub fn client_size(&self) -> Size {
        self.client
    }

    /// Resizes the client area.
    pub fn set_client_size(&mut self, size: Size) {
        if self.client != size {
            self.client = size;
            self.invalidate();
        }
    }

    /// Current scroll offset: x over scrollable columns, y over rows.
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Drops all cached bounds and the cached viewport rectangle.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    fn with_cache<R>(&self, layout: &dyn LayoutSource, f: impl FnOnce(&mut ViewportCache) -> R) -> R {
        let mut guard = self.cache.lock();
        let cache = guard.get_or_insert_with(|| ViewportCache::build(self.client, layout));
        f(cache)
    }

    /// Scrolls to `offset`, clamped to the scrollable range. Returns `true`
    /// if the offset changed.
    pub fn set_scroll(&mut self, offset: Point, layout: &dyn LayoutSource) -> bool {
        let max = self.with_cache(layout, |cache| cache.max_scroll());
        let clamped = Point::new(offset.x.clamp(0, max.x), offset.y.clamp(0, max.y));
        if clamped == self.scroll {
            return false;
        }
        self.scroll = clamped;
        self.invalidate();
        true
    }

    /// The scrollable viewport rectangle in client coordinates: the client
    /// area minus the header, gutters and pinned columns.
    pub fn viewport_area(&self, layout: &dyn LayoutSource) -> Rect {
        self.with_cache(layout, |cache| cache.area)
    }

    /// Width of the row-number gutter, zero when hidden.
    pub fn row_number_gutter_width(&self, layout: &dyn LayoutSource) -> i64 {
        self.with_cache(layout, |cache| cache.gutter_width)
    }

    /// Visible rows and scrollable columns at the current scroll offset.
    ///
    /// A row or column larger than the whole viewport yields a range whose
    /// first and last index are equal.
    pub fn calculate_visible_cell_range(&self, layout: &dyn LayoutSource) -> CellRange {
        let scroll = self.scroll;
        self.with_cache(layout, |cache| {
            if let Some(range) = cache.visible {
                return range;
            }
            let rows = visible_span(&cache.row_tops, scroll.y, cache.area.height());
            let columns = visible_span(&cache.body_lefts, scroll.x, cache.area.width()).map(|r| {
                VisibleRange {
                    first: r.first + cache.pinned_count,
                    last: r.last + cache.pinned_count,
                }
            });
            let range = CellRange { rows, columns };
            cache.visible = Some(range);
            range
        })
    }

    /// Hit-tests a y coordinate in client space.
    pub fn row_index_at(&self, y: i64, layout: &dyn LayoutSource) -> RowHit {
        let scroll = self.scroll;
        self.with_cache(layout, |cache| {
            if y < 0 || y >= self.client.height {
                return RowHit::Outside;
            }
            if y < cache.area.top() {
                return RowHit::Header;
            }
            let content_y = y - cache.area.top() + scroll.y;
            match span_at(&cache.row_tops, content_y) {
                Some(index) => RowHit::Row(index),
                None => RowHit::Outside,
            }
        })
    }

    /// Hit-tests an x coordinate in client space.
    pub fn column_index_at(&self, x: i64, layout: &dyn LayoutSource) -> ColumnHit {
        let scroll = self.scroll;
        self.with_cache(layout, |cache| {
            if x < 0 || x >= self.client.width {
                return ColumnHit::Outside;
            }
            if x < cache.gutter_width {
                return ColumnHit::RowNumbers;
            }
            let pinned_left = cache.gutter_width + cache.selector_width;
            if x < pinned_left {
                return ColumnHit::GroupSelector;
            }
            if let Some(index) = span_at(&cache.pinned_lefts, x - pinned_left) {
                return ColumnHit::Pinned(index);
            }
            let body_left = pinned_left + cache.pinned_width();
            match span_at(&cache.body_lefts, x - body_left + scroll.x) {
                Some(index) if x >= body_left => ColumnHit::Body(index + cache.pinned_count),
                _ => ColumnHit::Outside,
            }
        })
    }

    /// Rectangle of a column in client coordinates, spanning the client
    /// height and using the stretched width.
    pub fn column_rect(&self, column: usize, layout: &dyn LayoutSource) -> Option<Rect> {
        let scroll = self.scroll;
        let height = self.client.height;
        self.with_cache(layout, |cache| {
            let (left, width) = column_span(cache, column, scroll)?;
            Some(Rect::new(left, 0, width, height))
        })
    }

    /// Rectangle of a cell in client coordinates.
    pub fn cell_rect(&self, column: usize, row: usize, layout: &dyn LayoutSource) -> Option<Rect> {
        let scroll = self.scroll;
        self.with_cache(layout, |cache| {
            if row >= cache.row_count() {
                return None;
            }
            let (left, width) = column_span(cache, column, scroll)?;
            let top = cache.area.top() + cache.row_tops[row] - scroll.y;
            Some(Rect::new(left, top, width, cache.row_height(row)))
        })
    }

    /// Layout index at which a dragged header should be dropped when
    /// released at `x`.
    pub fn column_drop_index(&self, x: i64, layout: &dyn LayoutSource) -> usize {
        let count = layout.column_count();
        let hit = self.column_index_at(x, layout);
        match hit {
            ColumnHit::RowNumbers | ColumnHit::GroupSelector => 0,
            ColumnHit::Outside if x < 0 => 0,
            ColumnHit::Outside => count,
            ColumnHit::Pinned(index) | ColumnHit::Body(index) => {
                match self.column_rect(index, layout) {
                    Some(rect) if x >= rect.left() + rect.width() / 2 => index + 1,
                    _ => index,
                }
            }
        }
    }

    /// Number of rows that fit wholly in the viewport from the first visible
    /// row. At least one.
    pub fn page_row_count(&self, layout: &dyn LayoutSource) -> usize {
        let scroll = self.scroll;
        self.with_cache(layout, |cache| {
            let count = cache.row_count();
            let Some(first) = span_at(&cache.row_tops, scroll.y) else {
                return 1;
            };
            let mut fitted = 0;
            let mut covered = 0;
            for index in first..count {
                covered += cache.row_height(index);
                if covered > cache.area.height() {
                    break;
                }
                fitted += 1;
            }
            fitted.max(1)
        })
    }

    /// Scrolls the minimum amount needed to show the cell.
    ///
    /// Targets before the viewport are scrolled to directly. Targets past
    /// the far edge become the last visible row or column. Pinned columns
    /// never scroll. Returns `true` if the offset changed.
    pub fn reveal(
        &mut self,
        column: Option<usize>,
        row: Option<usize>,
        layout: &dyn LayoutSource,
    ) -> bool {
        let scroll = self.scroll;
        let target = self.with_cache(layout, |cache| {
            let mut target = scroll;
            if let Some(row) = row.filter(|&r| r < cache.row_count()) {
                target.y = reveal_offset(&cache.row_tops, row, scroll.y, cache.area.height());
            }
            if let Some(body) = column
                .and_then(|c| c.checked_sub(cache.pinned_count))
                .filter(|&c| c < cache.body_count())
            {
                target.x = reveal_offset(&cache.body_lefts, body, scroll.x, cache.area.width());
            }
            target
        });
        if target == scroll {
            return false;
        }
        tracing::debug!(
            target: targets::VIEWPORT,
            ?row,
            ?column,
            from = %scroll,
            to = %target,
            "revealing cell"
        );
        self.set_scroll(target, layout)
    }

    /// Next scroll offset while dragging with the pointer at `pointer`, or
    /// `None` once the pointer is no longer past an edge or the edge is
    /// reached.
    pub fn auto_scroll_step(&self, pointer: Point, step: u32, layout: &dyn LayoutSource) -> Option<Point> {
        let scroll = self.scroll;
        let step = i64::from(step);
        self.with_cache(layout, |cache| {
            let area = cache.area;
            let max = cache.max_scroll();
            let dy = if pointer.y < area.top() {
                -step
            } else if pointer.y >= area.bottom() {
                step
            } else {
                0
            };
            let dx = if pointer.x < area.left() {
                -step
            } else if pointer.x >= area.right() {
                step
            } else {
                0
            };
            let next = Point::new(
                (scroll.x + dx).clamp(0, max.x),
                (scroll.y + dy).clamp(0, max.y),
            );
            (next != scroll).then_some(next)
        })
    }
}

/// Left edge in client coordinates and stretched width of a layout column.
fn column_span(cache: &ViewportCache, column: usize, scroll: Point) -> Option<(i64, i64)> {
    let pinned_left = cache.gutter_width + cache.selector_width;
    if column < cache.pinned_count {
        let left = pinned_left + cache.pinned_lefts[column];
        let width = cache.pinned_lefts[column + 1] - cache.pinned_lefts[column];
        return Some((left, width));
    }
    let body = column - cache.pinned_count;
    if body >= cache.body_count() {
        return None;
    }
    let left = pinned_left + cache.pinned_width() + cache.body_lefts[body] - scroll.x;
    Some((left, cache.body_width(body)))
}
