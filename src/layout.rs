use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use ratatui::layout::{Position, Rect};
use thiserror::Error;
use unicode_width::UnicodeWidthChar;

use crate::mapping::TextMapping;

/// Identity of one on-screen interactive component. Strictly increasing,
/// never reused within a session; `INVALID` marks "no component".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractiveId(pub i64);

impl InteractiveId {
    pub const INVALID: InteractiveId = InteractiveId(-1);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for InteractiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out component ids. Owned by the rendering collaborator; kept here
/// so the id space has a single authority.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> InteractiveId {
        let id = InteractiveId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The caller referenced a component the registry does not know. This is
    /// a registry/view desync, not a user-input condition.
    #[error("component {0} is not registered")]
    ComponentNotFound(InteractiveId),
    /// A geometric query ran against a layout without any attached
    /// components.
    #[error("layout has no attached components")]
    EmptyLayout,
}

/// Arbitrary per-component payload attached by the view layer, keyed by
/// type. The core never inspects the values.
#[derive(Default)]
pub struct UserData {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl UserData {
    pub fn insert<T: 'static>(&mut self, value: T) {
        self.entries.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref())
    }

    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.entries
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast().ok())
            .map(|boxed| *boxed)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserData")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// The rendered shape of one component's text, as reported by the layout
/// engine: the visible characters, the caret column before each character,
/// and where soft line wraps fall. Caret columns are computed with
/// `unicode-width`, so zero-width glyph clusters occupy no column of their
/// own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedText {
    chars: Vec<char>,
    /// Caret column before character `i`, relative to its line; the final
    /// entry is the end-of-text column.
    caret_columns: Vec<u16>,
    /// Char offsets at which lines start. Always begins with 0.
    line_starts: Vec<usize>,
}

impl RenderedText {
    pub fn new(text: &str) -> Self {
        Self::from_lines(&[text])
    }

    pub fn from_lines(lines: &[&str]) -> Self {
        let mut chars = Vec::new();
        let mut caret_columns = Vec::new();
        let mut line_starts = vec![0];
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                line_starts.push(chars.len());
            }
            let mut column = 0u16;
            for ch in line.chars() {
                chars.push(ch);
                caret_columns.push(column);
                column = column.saturating_add(ch.width().unwrap_or(0) as u16);
            }
        }
        // End-of-text caret.
        let last_column = match chars.len().checked_sub(1) {
            Some(last) if *line_starts.last().unwrap_or(&0) <= last => {
                let width = chars[last].width().unwrap_or(0) as u16;
                caret_columns[last].saturating_add(width)
            }
            _ => 0,
        };
        caret_columns.push(last_column);
        Self {
            chars,
            caret_columns,
            line_starts,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Caret column before the given offset, within its line.
    pub fn column_at(&self, offset: usize) -> u16 {
        self.caret_columns[offset.min(self.chars.len())]
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line containing the given offset; the end-of-text offset belongs to
    /// the last line.
    pub fn line_for_offset(&self, offset: usize) -> usize {
        let offset = offset.min(self.chars.len());
        match self.line_starts.iter().rposition(|&start| start <= offset) {
            Some(line) => line,
            None => 0,
        }
    }

    /// Char-offset range of the given line.
    pub fn line_range(&self, line: usize) -> Range<usize> {
        let start = self.line_starts.get(line).copied().unwrap_or(self.len());
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.len());
        start..end
    }
}

/// One on-screen renderable unit exposing interactive text. Replaced, never
/// mutated, whenever its bounds or text change; `bounds == None` means the
/// component is currently detached (e.g. scrolled out of a virtualized
/// list) and participates in text-offset logic only.
#[derive(Debug)]
pub struct InteractiveComponent {
    pub id: InteractiveId,
    pub scroll_index: Option<usize>,
    pub bounds: Option<Rect>,
    pub visual_range: Range<usize>,
    pub mapping: TextMapping,
    pub shape: RenderedText,
    pub has_text: bool,
    pub multiline: bool,
    pub user_data: UserData,
}

impl InteractiveComponent {
    pub fn new(id: InteractiveId) -> Self {
        Self {
            id,
            scroll_index: None,
            bounds: None,
            visual_range: 0..0,
            mapping: TextMapping::Zero,
            shape: RenderedText::default(),
            has_text: false,
            multiline: false,
            user_data: UserData::default(),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.shape = RenderedText::new(text);
        self.visual_range = 0..self.shape.len();
        self.has_text = !self.shape.is_empty();
        self.multiline = false;
        self
    }

    pub fn with_lines(mut self, lines: &[&str]) -> Self {
        self.shape = RenderedText::from_lines(lines);
        self.visual_range = 0..self.shape.len();
        self.has_text = !self.shape.is_empty();
        self.multiline = lines.len() > 1;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_scroll_index(mut self, index: usize) -> Self {
        self.scroll_index = Some(index);
        self
    }

    pub fn with_mapping(mut self, mapping: TextMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_visual_range(mut self, range: Range<usize>) -> Self {
        self.visual_range = range;
        self
    }

    pub fn is_attached(&self) -> bool {
        self.bounds.is_some()
    }

    /// Clamp a visual offset into this component's text range.
    pub fn clamp_offset(&self, offset: usize) -> usize {
        offset.clamp(self.visual_range.start, self.visual_range.end)
    }

    /// Offset relative to the component's own text, for shape lookups.
    pub fn relative_offset(&self, offset: usize) -> usize {
        self.clamp_offset(offset) - self.visual_range.start
    }

    /// Screen position of the caret before the given visual offset. `None`
    /// while detached.
    pub fn caret_position(&self, offset: usize) -> Option<Position> {
        let bounds = self.bounds?;
        let relative = self.relative_offset(offset);
        let line = self.shape.line_for_offset(relative);
        let column = self.shape.column_at(relative);
        Some(Position {
            x: bounds.x.saturating_add(column),
            y: bounds.y.saturating_add(line as u16),
        })
    }

    /// The visual offset whose caret renders closest to a screen position.
    /// Ties go to the earlier offset. `None` while detached.
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let bounds = self.bounds?;
        let line = (position.y.saturating_sub(bounds.y) as usize)
            .min(self.shape.line_count().saturating_sub(1));
        let column = position.x.saturating_sub(bounds.x);
        let range = self.shape.line_range(line);
        let mut best = range.start;
        let mut best_distance = u16::MAX;
        for offset in range.start..=range.end {
            let distance = self.shape.column_at(offset).abs_diff(column);
            if distance < best_distance {
                best = offset;
                best_distance = distance;
            }
        }
        Some(self.visual_range.start + best)
    }
}

/// Registry of the components currently known to the editor, with the
/// geometric queries cursor movement is built on. The list of components in
/// line order (top-to-bottom, then left-to-right) is a cache: every insert
/// or removal invalidates it and the next ordered read re-sorts.
#[derive(Debug, Default)]
pub struct ComponentLayout {
    components: HashMap<InteractiveId, InteractiveComponent>,
    order: RefCell<Vec<InteractiveId>>,
    order_dirty: Cell<bool>,
}

fn axis_distance(value: u16, low: u16, high_inclusive: u16) -> i64 {
    if value < low {
        (low - value) as i64
    } else if value > high_inclusive {
        (value - high_inclusive) as i64
    } else {
        0
    }
}

fn rect_right(bounds: Rect) -> u16 {
    bounds.x.saturating_add(bounds.width.saturating_sub(1))
}

fn rect_bottom(bounds: Rect) -> u16 {
    bounds.y.saturating_add(bounds.height.saturating_sub(1))
}

#[derive(Clone, Copy)]
enum Side {
    Above,
    Below,
    Left,
    Right,
}

impl ComponentLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, component: InteractiveComponent) {
        tracing::trace!(id = %component.id, attached = component.is_attached(), "register component");
        self.components.insert(component.id, component);
        self.order_dirty.set(true);
    }

    pub fn unregister(&mut self, id: InteractiveId) {
        if self.components.remove(&id).is_some() {
            tracing::trace!(id = %id, "unregister component");
            self.order_dirty.set(true);
        }
    }

    /// Wholesale rebuild: the owning container was re-placed (resize,
    /// scroll), so every component re-registers from scratch.
    pub fn clear(&mut self) {
        tracing::debug!(count = self.components.len(), "clear component layout");
        self.components.clear();
        self.order.borrow_mut().clear();
        self.order_dirty.set(false);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, id: InteractiveId) -> bool {
        self.components.contains_key(&id)
    }

    pub fn get(&self, id: InteractiveId) -> Result<&InteractiveComponent, LayoutError> {
        self.components
            .get(&id)
            .ok_or(LayoutError::ComponentNotFound(id))
    }

    /// Ids of all registered components in line order.
    pub fn ordered_ids(&self) -> Vec<InteractiveId> {
        if self.order_dirty.get() {
            let mut order: Vec<InteractiveId> = self.components.keys().copied().collect();
            order.sort_by_key(|id| {
                let component = &self.components[id];
                let (y, x) = match component.bounds {
                    Some(bounds) => (bounds.y, bounds.x),
                    None => (0, 0),
                };
                (component.scroll_index.unwrap_or(0), y, x, id.0)
            });
            *self.order.borrow_mut() = order;
            self.order_dirty.set(false);
        }
        self.order.borrow().clone()
    }

    fn order_position(&self, id: InteractiveId) -> Option<usize> {
        if !self.components.contains_key(&id) {
            return None;
        }
        self.ordered_ids().iter().position(|&entry| entry == id)
    }

    /// The attached component closest to the given point. Vertical distance
    /// is weighted five times the horizontal one to bias toward same-line
    /// neighbors; ties go to the earliest component in line order.
    pub fn closest_to(&self, point: Position) -> Result<&InteractiveComponent, LayoutError> {
        let mut best: Option<(i64, InteractiveId)> = None;
        for id in self.ordered_ids() {
            let component = &self.components[&id];
            let Some(bounds) = component.bounds else {
                continue;
            };
            let dx = axis_distance(point.x, bounds.x, rect_right(bounds));
            let dy = axis_distance(point.y, bounds.y, rect_bottom(bounds));
            let distance = dx + 5 * dy;
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, id));
            }
        }
        match best {
            Some((_, id)) => Ok(&self.components[&id]),
            None => Err(LayoutError::EmptyLayout),
        }
    }

    /// The attached component whose bounds contain the point, or the
    /// closest one if none does.
    pub fn at(&self, point: Position) -> Result<&InteractiveComponent, LayoutError> {
        for id in self.ordered_ids() {
            let component = &self.components[&id];
            if let Some(bounds) = component.bounds
                && bounds.contains(point)
            {
                return Ok(component);
            }
        }
        self.closest_to(point)
    }

    pub fn above(&self, point: Position) -> Result<&InteractiveComponent, LayoutError> {
        self.toward(point, Side::Above)
    }

    pub fn below(&self, point: Position) -> Result<&InteractiveComponent, LayoutError> {
        self.toward(point, Side::Below)
    }

    pub fn left_of(&self, point: Position) -> Result<&InteractiveComponent, LayoutError> {
        self.toward(point, Side::Left)
    }

    pub fn right_of(&self, point: Position) -> Result<&InteractiveComponent, LayoutError> {
        self.toward(point, Side::Right)
    }

    fn toward(&self, point: Position, side: Side) -> Result<&InteractiveComponent, LayoutError> {
        let mut best: Option<(i64, InteractiveId)> = None;
        for id in self.ordered_ids() {
            let component = &self.components[&id];
            let Some(bounds) = component.bounds else {
                continue;
            };
            let (primary, misalignment) = match side {
                Side::Above => {
                    if rect_bottom(bounds) >= point.y {
                        continue;
                    }
                    (
                        (point.y - rect_bottom(bounds)) as i64,
                        axis_distance(point.x, bounds.x, rect_right(bounds)),
                    )
                }
                Side::Below => {
                    if bounds.y <= point.y {
                        continue;
                    }
                    (
                        (bounds.y - point.y) as i64,
                        axis_distance(point.x, bounds.x, rect_right(bounds)),
                    )
                }
                Side::Left => {
                    if rect_right(bounds) >= point.x {
                        continue;
                    }
                    (
                        (point.x - rect_right(bounds)) as i64,
                        axis_distance(point.y, bounds.y, rect_bottom(bounds)),
                    )
                }
                Side::Right => {
                    if bounds.x <= point.x {
                        continue;
                    }
                    (
                        (bounds.x - point.x) as i64,
                        axis_distance(point.y, bounds.y, rect_bottom(bounds)),
                    )
                }
            };
            // The misalignment penalty only breaks ties between candidates
            // at the same primary distance; it can never outweigh a closer
            // same-line candidate.
            let score = primary * 100 + misalignment;
            if best.is_none_or(|(best_score, _)| score < best_score) {
                best = Some((score, id));
            }
        }
        match best {
            Some((_, id)) => Ok(&self.components[&id]),
            None => self.at(point),
        }
    }

    /// The next component in line order, clamped at the end: asking past the
    /// last component returns the component itself, which callers use as the
    /// "no movement" boundary signal.
    pub fn next_on_line(&self, id: InteractiveId) -> Result<&InteractiveComponent, LayoutError> {
        let position = self
            .order_position(id)
            .ok_or(LayoutError::ComponentNotFound(id))?;
        let order = self.ordered_ids();
        let neighbor = order[(position + 1).min(order.len() - 1)];
        Ok(&self.components[&neighbor])
    }

    /// Line-order counterpart of `next_on_line`, clamped at the start.
    pub fn previous_on_line(
        &self,
        id: InteractiveId,
    ) -> Result<&InteractiveComponent, LayoutError> {
        let position = self
            .order_position(id)
            .ok_or(LayoutError::ComponentNotFound(id))?;
        let order = self.ordered_ids();
        let neighbor = order[position.saturating_sub(1)];
        Ok(&self.components[&neighbor])
    }

    /// Whether `id` comes before `anchor` in line order. Unregistered ids
    /// compare as `false` rather than failing: the caller is asking a
    /// positional question, not dereferencing.
    pub fn is_before(&self, id: InteractiveId, anchor: InteractiveId) -> bool {
        match (self.order_position(id), self.order_position(anchor)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    /// Whether `id` lies between `start` and `end` (inclusive) in line
    /// order, regardless of which of the two is visually first.
    pub fn is_between(&self, id: InteractiveId, start: InteractiveId, end: InteractiveId) -> bool {
        let (Some(position), Some(a), Some(b)) = (
            self.order_position(id),
            self.order_position(start),
            self.order_position(end),
        ) else {
            return false;
        };
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        position >= low && position <= high
    }

    /// Inclusive line-order slice between two components, regardless of
    /// argument order.
    pub fn components_between(
        &self,
        a: InteractiveId,
        b: InteractiveId,
    ) -> Result<Vec<InteractiveId>, LayoutError> {
        let first = self
            .order_position(a)
            .ok_or(LayoutError::ComponentNotFound(a))?;
        let second = self
            .order_position(b)
            .ok_or(LayoutError::ComponentNotFound(b))?;
        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        Ok(self.ordered_ids()[low..=high].to_vec())
    }

    /// All components whose mapping covers source bytes intersecting the
    /// given range, in line order.
    pub fn components_for_source(&self, range: &Range<usize>) -> Vec<InteractiveId> {
        self.ordered_ids()
            .into_iter()
            .filter(|id| {
                let Some(covered) = self.components[id].mapping.covered_source() else {
                    return false;
                };
                covered.start < range.end && range.start < covered.end
            })
            .collect()
    }

    /// Screen position of a caret inside a registered component, `None`
    /// while the component is detached.
    pub fn caret_position(&self, id: InteractiveId, offset: usize) -> Option<Position> {
        self.components.get(&id)?.caret_position(offset)
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod layout_tests;
