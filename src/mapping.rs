use std::ops::{Add, Range};

/// Translates between the visual coordinate space of one rendered unit and
/// the source coordinate space of the raw Markdown text.
///
/// Visual offsets count rendered characters, source offsets are byte offsets
/// into the document source. A mapping answers two questions: which source
/// bytes does a rendered range correspond to (`to_source`), and where does a
/// source range show up on screen (`to_visual`). Both return `None` when the
/// range cannot be represented in the other coordinate space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextMapping {
    /// Maps nothing. Used for decorative units that have no source text.
    Zero,
    /// The whole visual span maps to one fixed source span. Used for atomic
    /// inline content such as images or emoji shortcodes, where placing the
    /// cursor "inside" is meaningless.
    Constant {
        visual: Range<usize>,
        source: Range<usize>,
    },
    /// The visual text is the source text minus a fixed prefix and suffix,
    /// e.g. stripped `**` emphasis markers. Selecting the full visual span
    /// selects the markers too.
    Padded {
        visual: Range<usize>,
        source: Range<usize>,
        prefix: usize,
        suffix: usize,
    },
    /// One source sub-range per visual character, for rendering that
    /// reorders or elides characters.
    Chunked {
        visual_start: usize,
        chunks: Vec<Range<usize>>,
    },
    /// Shifts another mapping's visual coordinates by a constant. Used when
    /// several inline nodes are concatenated into one rendered text run.
    Offset {
        inner: Box<TextMapping>,
        shift: usize,
    },
    /// Concatenation of several mappings whose visual ranges follow each
    /// other. Built with the `+` operator.
    Sum { parts: Vec<TextMapping> },
}

fn range_within(outer: &Range<usize>, inner: &Range<usize>) -> bool {
    inner.start >= outer.start && inner.end <= outer.end
}

fn ranges_intersect(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

impl TextMapping {
    pub fn zero() -> Self {
        TextMapping::Zero
    }

    pub fn constant(visual: Range<usize>, source: Range<usize>) -> Self {
        TextMapping::Constant { visual, source }
    }

    pub fn padded(
        visual: Range<usize>,
        source: Range<usize>,
        prefix: usize,
        suffix: usize,
    ) -> Self {
        TextMapping::Padded {
            visual,
            source,
            prefix,
            suffix,
        }
    }

    /// A 1:1 mapping between a visual span and a source span of equal
    /// length, i.e. a padded mapping without markers.
    pub fn direct(visual: Range<usize>, source: Range<usize>) -> Self {
        TextMapping::Padded {
            visual,
            source,
            prefix: 0,
            suffix: 0,
        }
    }

    pub fn chunked(visual_start: usize, chunks: Vec<Range<usize>>) -> Self {
        TextMapping::Chunked {
            visual_start,
            chunks,
        }
    }

    pub fn offset(inner: TextMapping, shift: usize) -> Self {
        TextMapping::Offset {
            inner: Box::new(inner),
            shift,
        }
    }

    /// The visual span this mapping covers.
    pub fn visual_range(&self) -> Range<usize> {
        match self {
            TextMapping::Zero => 0..0,
            TextMapping::Constant { visual, .. } => visual.clone(),
            TextMapping::Padded { visual, .. } => visual.clone(),
            TextMapping::Chunked {
                visual_start,
                chunks,
            } => *visual_start..visual_start + chunks.len(),
            TextMapping::Offset { inner, shift } => {
                let range = inner.visual_range();
                range.start + shift..range.end + shift
            }
            TextMapping::Sum { parts } => {
                let start = parts
                    .iter()
                    .map(|part| part.visual_range().start)
                    .min()
                    .unwrap_or(0);
                let end = parts
                    .iter()
                    .map(|part| part.visual_range().end)
                    .max()
                    .unwrap_or(0);
                start..end
            }
        }
    }

    pub fn visual_len(&self) -> usize {
        let range = self.visual_range();
        range.end - range.start
    }

    /// The hull of all source bytes this mapping can reach, used by the
    /// component registry to answer "which components show this source
    /// range". `None` for mappings without any source text.
    pub fn covered_source(&self) -> Option<Range<usize>> {
        match self {
            TextMapping::Zero => None,
            TextMapping::Constant { source, .. } => Some(source.clone()),
            TextMapping::Padded { source, .. } => Some(source.clone()),
            TextMapping::Chunked { chunks, .. } => {
                let start = chunks.iter().map(|chunk| chunk.start).min()?;
                let end = chunks.iter().map(|chunk| chunk.end).max()?;
                Some(start..end)
            }
            TextMapping::Offset { inner, .. } => inner.covered_source(),
            TextMapping::Sum { parts } => {
                let mut hull: Option<Range<usize>> = None;
                for part in parts {
                    let Some(covered) = part.covered_source() else {
                        continue;
                    };
                    hull = Some(match hull {
                        None => covered,
                        Some(current) => {
                            current.start.min(covered.start)..current.end.max(covered.end)
                        }
                    });
                }
                hull
            }
        }
    }

    /// Translate a visual range into the source range it stands for.
    pub fn to_source(&self, range: &Range<usize>) -> Option<Range<usize>> {
        match self {
            TextMapping::Zero => None,
            TextMapping::Constant { visual, source } => {
                if range_within(visual, range) {
                    Some(source.clone())
                } else {
                    None
                }
            }
            TextMapping::Padded {
                visual,
                source,
                prefix,
                suffix: _,
            } => {
                if !range_within(visual, range) {
                    return None;
                }
                // Boundary offsets snap to the full source span so that
                // selecting the whole rendered text also selects the
                // stripped markers.
                let start = if range.start == visual.start {
                    source.start
                } else {
                    source.start + prefix + (range.start - visual.start)
                };
                let end = if range.end == visual.end {
                    source.end
                } else {
                    source.start + prefix + (range.end - visual.start)
                };
                Some(start..end.max(start))
            }
            TextMapping::Chunked {
                visual_start,
                chunks,
            } => {
                let visual = *visual_start..visual_start + chunks.len();
                if !range_within(&visual, range) {
                    return None;
                }
                if range.start == range.end {
                    let idx = range.start - visual_start;
                    let at = if idx < chunks.len() {
                        chunks[idx].start
                    } else {
                        chunks.last()?.end
                    };
                    return Some(at..at);
                }
                let first = &chunks[range.start - visual_start];
                let last = &chunks[range.end - 1 - visual_start];
                Some(first.start..last.end.max(first.start))
            }
            TextMapping::Offset { inner, shift } => {
                let start = range.start.checked_sub(*shift)?;
                let end = range.end.checked_sub(*shift)?;
                inner.to_source(&(start..end))
            }
            TextMapping::Sum { parts } => {
                if range.start == range.end {
                    let part = parts.iter().find(|part| {
                        let visual = part.visual_range();
                        range.start >= visual.start && range.start <= visual.end
                    })?;
                    return part.to_source(range);
                }
                let mut combined: Option<Range<usize>> = None;
                for part in parts {
                    let visual = part.visual_range();
                    if !ranges_intersect(&visual, range) {
                        continue;
                    }
                    let clipped = range.start.max(visual.start)..range.end.min(visual.end);
                    let Some(source) = part.to_source(&clipped) else {
                        continue;
                    };
                    combined = Some(match combined {
                        None => source,
                        Some(current) => current.start..source.end.max(current.start),
                    });
                }
                combined
            }
        }
    }

    /// Translate a source range into the visual range where it is rendered.
    pub fn to_visual(&self, range: &Range<usize>) -> Option<Range<usize>> {
        match self {
            TextMapping::Zero => None,
            TextMapping::Constant { visual, source } => {
                if range_within(source, range) {
                    Some(visual.clone())
                } else {
                    None
                }
            }
            TextMapping::Padded {
                visual,
                source,
                prefix,
                suffix,
            } => {
                if !range_within(source, range) {
                    return None;
                }
                let content_start = source.start + prefix;
                let content_end = source.end.saturating_sub(*suffix);
                let start = if range.start <= content_start {
                    visual.start
                } else {
                    (visual.start + (range.start - content_start)).min(visual.end)
                };
                let end = if range.end >= content_end {
                    visual.end
                } else {
                    (visual.start + (range.end.saturating_sub(content_start))).min(visual.end)
                };
                Some(start..end.max(start))
            }
            TextMapping::Chunked {
                visual_start,
                chunks,
            } => {
                if range.start == range.end {
                    let idx = chunks
                        .iter()
                        .position(|chunk| range.start >= chunk.start && range.start <= chunk.end)?;
                    let at = visual_start + idx;
                    return Some(at..at);
                }
                let first = chunks
                    .iter()
                    .position(|chunk| ranges_intersect(chunk, range))?;
                let last = chunks
                    .iter()
                    .rposition(|chunk| ranges_intersect(chunk, range))?;
                Some(visual_start + first..visual_start + last + 1)
            }
            TextMapping::Offset { inner, shift } => {
                let visual = inner.to_visual(range)?;
                Some(visual.start + shift..visual.end + shift)
            }
            TextMapping::Sum { parts } => {
                let mut combined: Option<Range<usize>> = None;
                for part in parts {
                    let Some(covered) = part.covered_source() else {
                        continue;
                    };
                    if range.start == range.end {
                        if range.start >= covered.start && range.start <= covered.end {
                            return part.to_visual(range);
                        }
                        continue;
                    }
                    if !ranges_intersect(&covered, range) {
                        continue;
                    }
                    let clipped = range.start.max(covered.start)..range.end.min(covered.end);
                    let Some(visual) = part.to_visual(&clipped) else {
                        continue;
                    };
                    combined = Some(match combined {
                        None => visual,
                        Some(current) => {
                            current.start.min(visual.start)..current.end.max(visual.end)
                        }
                    });
                }
                combined
            }
        }
    }
}

impl Add for TextMapping {
    type Output = TextMapping;

    /// Concatenates two mappings into one rendered run: the right-hand
    /// side's visual span is shifted to start where the left-hand side ends.
    fn add(self, rhs: TextMapping) -> TextMapping {
        let shift = self.visual_range().end;
        let shifted = if shift == 0 {
            rhs
        } else {
            TextMapping::offset(rhs, shift)
        };
        let mut parts = match self {
            TextMapping::Sum { parts } => parts,
            other => vec![other],
        };
        parts.push(shifted);
        TextMapping::Sum { parts }
    }
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod mapping_tests;
