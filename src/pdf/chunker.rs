//! Sentence-aware chunking with overlap
//!
//! Text is cut into sentence spans that exactly cover it, sentences are packed
//! greedily into chunks of at most `chunk_size` characters, and each new chunk
//! starts with the trailing sentences of the previous one that fit into
//! `chunk_overlap` characters. The part of a chunk after that overlap is its
//! body; the bodies of all chunks cover the text once, in order.

use crate::config::PdfConfig;

/// One chunk of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfChunk {
    /// Overlap followed by body
    pub text: String,
    /// Zero-based position
    pub index: usize,
    /// Number of chunks in the document
    pub total: usize,
    /// Byte offset where the body starts within `text`
    body_offset: usize,
}

impl PdfChunk {
    /// Text carried over from the previous chunk
    pub fn overlap(&self) -> &str {
        self.text[..self.body_offset].trim_end()
    }

    /// Text that first appears in this chunk
    pub fn body(&self) -> &str {
        &self.text[self.body_offset..]
    }
}

/// Chunking limits, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_size: usize,
}

impl From<&PdfConfig> for ChunkSettings {
    fn from(config: &PdfConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            chunk_overlap: config.chunk_overlap,
            min_chunk_size: config.min_chunk_size,
        }
    }
}

/// A contiguous piece of the text, trailing whitespace included
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    chars: usize,
    trailing_ws: usize,
}

impl Span {
    fn new(text: &str, start: usize, end: usize) -> Self {
        let slice = &text[start..end];
        let chars = slice.chars().count();
        let trailing_ws = chars - slice.trim_end().chars().count();
        Self {
            start,
            end,
            chars,
            trailing_ws,
        }
    }

    fn len(&self) -> usize {
        self.chars - self.trailing_ws
    }
}

/// Index range of spans forming one chunk
#[derive(Debug, Clone, Copy)]
struct Draft {
    first: usize,
    body_first: usize,
    last: usize,
}

/// Splits cleaned text into overlapping chunks
///
/// # Examples
///
/// ```
/// use sumi_harvest::pdf::{chunk_text, ChunkSettings};
///
/// let settings = ChunkSettings { chunk_size: 40, chunk_overlap: 20, min_chunk_size: 5 };
/// let chunks = chunk_text("One short line. Another short line. A third one.", settings);
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].overlap(), "Another short line.");
/// assert_eq!(chunks[1].body(), "A third one.");
/// ```
pub fn chunk_text(text: &str, settings: ChunkSettings) -> Vec<PdfChunk> {
    let spans: Vec<Span> = sentence_spans(text)
        .into_iter()
        .flat_map(|span| split_oversized(text, span, settings.chunk_size))
        .collect();

    if spans.is_empty() {
        return Vec::new();
    }

    // prefix[i] = characters in spans[..i], whitespace included
    let mut prefix = Vec::with_capacity(spans.len() + 1);
    prefix.push(0);
    for span in &spans {
        prefix.push(prefix[prefix.len() - 1] + span.chars);
    }
    let range_len = |from: usize, to: usize| prefix[to + 1] - prefix[from] - spans[to].trailing_ws;

    let mut drafts = Vec::new();
    let mut first = 0;
    let mut body_first = 0;

    for j in 0..spans.len() {
        if j > body_first && range_len(first, j) > settings.chunk_size {
            drafts.push(Draft {
                first,
                body_first,
                last: j - 1,
            });

            let mut overlap_start = j;
            while overlap_start > body_first
                && range_len(overlap_start - 1, j - 1) <= settings.chunk_overlap
            {
                overlap_start -= 1;
            }
            while overlap_start < j && range_len(overlap_start, j) > settings.chunk_size {
                overlap_start += 1;
            }

            first = overlap_start;
            body_first = j;
        }
    }
    drafts.push(Draft {
        first,
        body_first,
        last: spans.len() - 1,
    });

    let mut merged: Vec<Draft> = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match merged.last_mut() {
            Some(previous) if range_len(draft.first, draft.last) < settings.min_chunk_size => {
                previous.last = draft.last;
            }
            _ => merged.push(draft),
        }
    }

    let total = merged.len();
    merged
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            let start = spans[draft.first].start;
            let end = spans[draft.last].end;
            PdfChunk {
                text: text[start..end].trim_end().to_string(),
                index,
                total,
                body_offset: spans[draft.body_first].start - start,
            }
        })
        .collect()
}

/// Cuts text after `.`, `!` or `?` followed by whitespace and at line breaks
fn sentence_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = text.len() - text.trim_start().len();
    let mut previous: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !c.is_whitespace() || i < start {
            previous = Some(c);
            continue;
        }

        let mut end = i + c.len_utf8();
        let mut has_newline = c == '\n';
        while let Some(&(j, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            has_newline |= next == '\n';
            end = j + next.len_utf8();
            chars.next();
        }

        if has_newline || matches!(previous, Some('.' | '!' | '?')) {
            spans.push(Span::new(text, start, end));
            start = end;
        }
        previous = Some(' ');
    }

    if start < text.len() && !text[start..].trim().is_empty() {
        spans.push(Span::new(text, start, text.len()));
    }

    spans
}

/// Splits a span longer than `max` characters at word boundaries
///
/// A single word longer than `max` is split between characters.
fn split_oversized(text: &str, span: Span, max: usize) -> Vec<Span> {
    if span.len() <= max {
        return vec![span];
    }

    let mut pieces = Vec::new();
    let mut piece_start = span.start;
    let mut piece_chars = 0;
    let mut word_start = span.start;
    let slice = &text[span.start..span.end];

    for (offset, c) in slice.char_indices() {
        let i = span.start + offset;

        if piece_chars >= max && !c.is_whitespace() {
            let cut = if word_start > piece_start { word_start } else { i };
            pieces.push(Span::new(text, piece_start, cut));
            piece_chars = text[cut..i].chars().count();
            piece_start = cut;
        }

        if c.is_whitespace() {
            word_start = i + c.len_utf8();
        }
        piece_chars += 1;
    }

    pieces.push(Span::new(text, piece_start, span.end));
    pieces
}
