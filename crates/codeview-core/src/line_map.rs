//! Line map
//!
//! Maps line indices to character ranges and carries a per-line payload. The map is built once
//! when a document is loaded and afterwards only patched: an edit rebuilds the records of the
//! lines it touched and shifts the offsets of the lines after them. Payloads of untouched lines
//! are moved along, never recomputed.
//!
//! Lines are terminated by `\n` (a preceding `\r` is excluded from the line content). A document
//! with `n` newlines has `n + 1` lines; the empty document is a single zero-length line.

use crate::text::shift;
use ropey::Rope;
use std::ops::Range;

/// One line of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord<I> {
    /// Char offset of the first character of the line.
    pub start: usize,
    /// Length in chars, including the line terminator.
    pub length: usize,
    /// Length in chars, excluding the line terminator.
    pub content_length: usize,
    /// Per-line payload.
    pub info: I,
}

impl<I> LineRecord<I> {
    /// Char range of the line, including its terminator.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Char range of the line content, excluding its terminator.
    pub fn content_range(&self) -> Range<usize> {
        self.start..self.start + self.content_length
    }

    /// Exclusive end offset (after the terminator).
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Result of [`LineMap::update_after_editing`].
#[derive(Debug)]
pub struct LineMapUpdate<I> {
    /// Indices (in the updated map) of the rebuilt lines.
    pub lines: Range<usize>,
    /// Net change in the number of lines.
    pub line_delta: isize,
    /// Payloads of lines that no longer exist.
    pub removed: Vec<I>,
}

/// Ordered line records covering the whole document.
#[derive(Debug, Clone)]
pub struct LineMap<I> {
    lines: Vec<LineRecord<I>>,
}

impl<I: Default> LineMap<I> {
    /// Build the line map of `text`, with default payloads.
    pub fn new(text: &Rope) -> Self {
        let lines = scan_lines(text, 0, text.len_chars(), true)
            .into_iter()
            .map(|span| span.into_record(I::default()))
            .collect();
        Self { lines }
    }

    /// Patch the map after `text` has been edited.
    ///
    /// `edited` is the range of the replacement text in the *updated* document and
    /// `change_in_length` the difference between the new and the old document length. The
    /// lines touched by the replaced range are re-split; every later line is shifted.
    ///
    /// A touched line keeps its payload on the rebuilt line that still contains its original
    /// content: the first rebuilt line if the edit left some of its head in place, otherwise the
    /// last rebuilt line if the tail of the last touched line survived. A last touched line that
    /// starts at the end of the replaced range survives whole, even when it is empty. Payloads
    /// that find no place, such as that of a line whose whole content was replaced, are returned
    /// in [`LineMapUpdate::removed`].
    pub fn update_after_editing(
        &mut self,
        text: &Rope,
        edited: Range<usize>,
        change_in_length: isize,
    ) -> LineMapUpdate<I> {
        let old_start = edited.start;
        let old_end = shift(edited.end, -change_in_length).max(old_start);

        let first = self.line_index_of(old_start);
        let last = self.line_index_of(old_end);
        let is_final = last + 1 == self.lines.len();

        let region_start = self.lines[first].start;
        let new_region_end = shift(self.lines[last].end(), change_in_length);
        let keeps_head = old_start > region_start;
        let tail = &self.lines[last];
        let keeps_tail = old_end == tail.start || old_end < tail.start + tail.content_length;

        let spans = scan_lines(text, region_start, new_region_end, is_final);
        let count = spans.len();

        let mut old_infos: Vec<Option<I>> = self
            .lines
            .drain(first..=last)
            .map(|record| Some(record.info))
            .collect();
        let mut new_infos: Vec<Option<I>> = std::iter::repeat_with(|| None).take(count).collect();

        if keeps_head {
            new_infos[0] = old_infos[0].take();
        }
        if keeps_tail && new_infos[count - 1].is_none() {
            let last_old = old_infos.len() - 1;
            new_infos[count - 1] = old_infos[last_old].take();
        }

        let removed = old_infos.into_iter().flatten().collect();
        let records: Vec<_> = spans
            .into_iter()
            .zip(new_infos)
            .map(|(span, info)| span.into_record(info.unwrap_or_default()))
            .collect();
        self.lines.splice(first..first, records);

        for record in &mut self.lines[first + count..] {
            record.start = shift(record.start, change_in_length);
        }

        debug_assert!(
            self.is_consistent(text.len_chars()),
            "line map out of sync with the text"
        );

        LineMapUpdate {
            lines: first..first + count,
            line_delta: count as isize - (last - first + 1) as isize,
            removed,
        }
    }
}

impl<I> LineMap<I> {
    /// Number of lines (at least one).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of characters covered by the map.
    pub fn len_chars(&self) -> usize {
        self.lines.last().map_or(0, LineRecord::end)
    }

    /// The record of `line`, or `None` if it does not exist.
    pub fn lookup(&self, line: usize) -> Option<&LineRecord<I>> {
        self.lines.get(line)
    }

    /// The payload of `line`.
    pub fn info(&self, line: usize) -> Option<&I> {
        self.lines.get(line).map(|record| &record.info)
    }

    /// Mutable payload of `line`.
    pub fn info_mut(&mut self, line: usize) -> Option<&mut I> {
        self.lines.get_mut(line).map(|record| &mut record.info)
    }

    /// Iterate over all line records.
    pub fn iter(&self) -> impl Iterator<Item = &LineRecord<I>> {
        self.lines.iter()
    }

    /// Iterate mutably over all payloads, with their line index.
    pub fn infos_mut(&mut self) -> impl Iterator<Item = (usize, &mut I)> {
        self.lines
            .iter_mut()
            .enumerate()
            .map(|(line, record)| (line, &mut record.info))
    }

    /// Line containing the char `offset`.
    ///
    /// The end of the document belongs to the last line; offsets past it yield `None`.
    pub fn line_of(&self, offset: usize) -> Option<usize> {
        (offset <= self.len_chars()).then(|| self.line_index_of(offset))
    }

    /// Lines touched by `range`. An empty range touches the line containing its start.
    pub fn lines_containing(&self, range: Range<usize>) -> Range<usize> {
        let first = self.line_index_of(range.start);
        let last = if range.end > range.start {
            self.line_index_of(range.end - 1)
        } else {
            first
        };
        first..last.max(first) + 1
    }

    /// Char range covered by `lines`, including terminators.
    pub fn char_range_of(&self, lines: Range<usize>) -> Option<Range<usize>> {
        if lines.start >= lines.end || lines.end > self.lines.len() {
            return None;
        }
        Some(self.lines[lines.start].start..self.lines[lines.end - 1].end())
    }

    fn line_index_of(&self, offset: usize) -> usize {
        self.lines
            .partition_point(|record| record.start <= offset)
            .saturating_sub(1)
    }

    fn is_consistent(&self, len_chars: usize) -> bool {
        let contiguous = self
            .lines
            .windows(2)
            .all(|pair| pair[0].end() == pair[1].start && pair[0].length > pair[0].content_length);
        let last_open = self
            .lines
            .last()
            .is_some_and(|record| record.length == record.content_length);
        !self.lines.is_empty()
            && self.lines[0].start == 0
            && contiguous
            && last_open
            && self.len_chars() == len_chars
    }
}

struct LineSpan {
    start: usize,
    length: usize,
    content_length: usize,
}

impl LineSpan {
    fn into_record<I>(self, info: I) -> LineRecord<I> {
        LineRecord {
            start: self.start,
            length: self.length,
            content_length: self.content_length,
            info,
        }
    }
}

/// Split `text[start..end]` into lines. `start` must be a line start; unless `is_final`, the
/// range must end right after a newline.
fn scan_lines(text: &Rope, start: usize, end: usize, is_final: bool) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    let mut line_start = start;
    let mut after_cr = false;

    for (index, c) in text.slice(start..end).chars().enumerate() {
        if c == '\n' {
            let offset = start + index;
            let length = offset + 1 - line_start;
            let terminator = if after_cr { 2 } else { 1 };
            spans.push(LineSpan {
                start: line_start,
                length,
                content_length: length - terminator,
            });
            line_start = offset + 1;
        }
        after_cr = c == '\r';
    }

    if is_final {
        spans.push(LineSpan {
            start: line_start,
            length: end - line_start,
            content_length: end - line_start,
        });
    } else {
        debug_assert_eq!(line_start, end, "edited region must end at a line boundary");
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ranges(map: &LineMap<u32>) -> Vec<(usize, usize, usize)> {
        map.iter()
            .map(|r| (r.start, r.length, r.content_length))
            .collect()
    }

    /// Apply a replacement to `rope` and patch `map`, returning the update.
    fn edit(
        rope: &mut Rope,
        map: &mut LineMap<u32>,
        range: Range<usize>,
        text: &str,
    ) -> LineMapUpdate<u32> {
        rope.remove(range.clone());
        rope.insert(range.start, text);
        let inserted = text.chars().count();
        let delta = inserted as isize - range.len() as isize;
        map.update_after_editing(rope, range.start..range.start + inserted, delta)
    }

    fn tagged(text: &str) -> (Rope, LineMap<u32>) {
        let rope = Rope::from_str(text);
        let mut map = LineMap::<u32>::new(&rope);
        for (line, info) in map.infos_mut() {
            *info = line as u32 + 100;
        }
        (rope, map)
    }

    fn infos(map: &LineMap<u32>) -> Vec<u32> {
        map.iter().map(|r| r.info).collect()
    }

    #[test]
    fn test_empty_document_is_one_line() {
        let map = LineMap::<u32>::new(&Rope::new());
        assert_eq!(map.line_count(), 1);
        assert_eq!(ranges(&map), vec![(0, 0, 0)]);
        assert_eq!(map.line_of(0), Some(0));
        assert_eq!(map.line_of(1), None);
    }

    #[test]
    fn test_build() {
        let map = LineMap::<u32>::new(&Rope::from_str("ab\r\ncd\n\nef"));
        assert_eq!(
            ranges(&map),
            vec![(0, 4, 2), (4, 3, 2), (7, 1, 0), (8, 2, 2)]
        );
        assert_eq!(map.len_chars(), 10);
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let (mut rope, mut map) = tagged("ab");
        let update = edit(&mut rope, &mut map, 2..2, "\n");

        assert_eq!(ranges(&map), vec![(0, 3, 2), (3, 0, 0)]);
        assert_eq!(update.lines, 0..2);
        assert_eq!(update.line_delta, 1);

        let update = edit(&mut rope, &mut map, 2..3, "");
        assert_eq!(ranges(&map), vec![(0, 2, 2)]);
        assert_eq!(update.line_delta, -1);
        assert_eq!(infos(&map), vec![100]);
    }

    #[test]
    fn test_edit_inside_line_keeps_other_infos() {
        let (mut rope, mut map) = tagged("one\ntwo\nthree");
        let update = edit(&mut rope, &mut map, 5..6, "WW");

        assert_eq!(rope.to_string(), "one\ntWWo\nthree");
        assert_eq!(update.lines, 1..2);
        assert!(update.removed.is_empty());
        assert_eq!(ranges(&map), vec![(0, 4, 3), (4, 5, 4), (9, 5, 5)]);
        assert_eq!(infos(&map), vec![100, 101, 102]);
    }

    #[test]
    fn test_insert_lines_at_line_start_moves_info_down() {
        let (mut rope, mut map) = tagged("a\nb\nc");
        edit(&mut rope, &mut map, 2..2, "x\ny\n");

        assert_eq!(rope.to_string(), "a\nx\ny\nb\nc");
        assert_eq!(infos(&map), vec![100, 0, 0, 101, 102]);
    }

    #[test]
    fn test_split_line_keeps_info_on_head() {
        let (mut rope, mut map) = tagged("abc\ndef");
        edit(&mut rope, &mut map, 1..1, "\n");

        assert_eq!(rope.to_string(), "a\nbc\ndef");
        assert_eq!(infos(&map), vec![100, 0, 101]);
    }

    #[test]
    fn test_join_lines_removes_info_of_joined_line() {
        let (mut rope, mut map) = tagged("abc\ndef\nghi");
        let update = edit(&mut rope, &mut map, 3..4, "");

        assert_eq!(rope.to_string(), "abcdef\nghi");
        assert_eq!(infos(&map), vec![100, 102]);
        assert_eq!(update.removed, vec![101]);
    }

    #[test]
    fn test_delete_whole_line_keeps_following_info() {
        let (mut rope, mut map) = tagged("abc\ndef\nghi");
        let update = edit(&mut rope, &mut map, 4..8, "");

        assert_eq!(rope.to_string(), "abc\nghi");
        assert_eq!(infos(&map), vec![100, 102]);
        assert_eq!(update.removed, vec![101]);
    }

    #[test]
    fn test_deleting_line_before_empty_line_evicts_its_info() {
        let (mut rope, mut map) = tagged("abc\n\nx");
        let update = edit(&mut rope, &mut map, 0..4, "");

        assert_eq!(rope.to_string(), "\nx");
        assert_eq!(infos(&map), vec![101, 102]);
        assert_eq!(update.removed, vec![100]);
    }

    #[test]
    fn test_replacing_whole_line_content_evicts_info() {
        let (mut rope, mut map) = tagged("abc\ndef");
        let update = edit(&mut rope, &mut map, 0..3, "xyz");

        assert_eq!(rope.to_string(), "xyz\ndef");
        assert_eq!(infos(&map), vec![0, 101]);
        assert_eq!(update.removed, vec![100]);
    }

    #[test]
    fn test_typing_into_empty_line_keeps_info() {
        let (mut rope, mut map) = tagged("a\n\nb");
        let update = edit(&mut rope, &mut map, 2..2, "x");

        assert_eq!(rope.to_string(), "a\nx\nb");
        assert_eq!(infos(&map), vec![100, 101, 102]);
        assert!(update.removed.is_empty());
    }

    #[test]
    fn test_lines_containing_and_inverse() {
        let map = LineMap::<u32>::new(&Rope::from_str("ab\ncd\nef"));

        assert_eq!(map.lines_containing(0..2), 0..1);
        assert_eq!(map.lines_containing(1..4), 0..2);
        assert_eq!(map.lines_containing(3..3), 1..2);
        assert_eq!(map.lines_containing(0..3), 0..1);
        assert_eq!(map.char_range_of(1..3), Some(3..8));
        assert_eq!(map.char_range_of(2..4), None);
        assert_eq!(map.char_range_of(1..1), None);
    }

    #[test]
    fn test_round_trip_line_mapping() {
        let text = "fn main() {\r\n    x\n\n}\n";
        let map = LineMap::<u32>::new(&Rope::from_str(text));
        for offset in 0..text.chars().count() {
            let line = map.line_of(offset).unwrap();
            let range = map.char_range_of(line..line + 1).unwrap();
            assert!(range.contains(&offset), "offset {offset} not in {range:?}");
        }
    }

    #[test]
    fn test_lookup_out_of_bounds() {
        let map = LineMap::<u32>::new(&Rope::from_str("a\nb"));
        assert!(map.lookup(1).is_some());
        assert!(map.lookup(2).is_none());
    }
}
