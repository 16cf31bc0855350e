//! Bounded-size chunking of table text for the generic extractor
//!
//! Sizes are counted in characters, not bytes, so multi-byte labels never
//! split mid-character.

/// Splits table text into chunks of at most `budget` characters
pub struct TableChunker {
    budget: usize,
}

impl TableChunker {
    /// Create a chunker; a zero budget is treated as one
    pub fn new(budget: usize) -> Self {
        Self {
            budget: budget.max(1),
        }
    }

    /// Chunk the given text
    ///
    /// A markdown table keeps its header and delimiter lines at the top of
    /// every chunk, unless they take more than half the budget; then the table
    /// is packed line by line. Anything else is combined paragraph by paragraph.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.budget {
            return vec![text.to_string()];
        }

        let lines: Vec<&str> = text.lines().collect();
        match find_table_header(&lines) {
            Some(start) => {
                let mut chunks = Vec::new();
                let preamble: Vec<&str> = lines[..start].to_vec();
                if preamble.iter().any(|l| !l.trim().is_empty()) {
                    chunks.extend(self.chunk_by_paragraph(&preamble.join("\n")));
                }
                chunks.extend(self.chunk_table(lines[start], lines[start + 1], &lines[start + 2..]));
                chunks
            }
            None => self.chunk_by_paragraph(text),
        }
    }

    /// Chunk table rows, repeating the header block
    fn chunk_table(&self, header: &str, delimiter: &str, rows: &[&str]) -> Vec<String> {
        let head = format!("{}\n{}\n", header, delimiter);
        let head_len = char_len(&head);

        // A header taking half the budget or more is not repeated
        if head_len * 2 > self.budget {
            let lines: Vec<&str> = [header, delimiter].into_iter().chain(rows.iter().copied()).collect();
            return self.combine_until_limit(&lines, "\n");
        }

        let mut chunks = Vec::new();
        let mut current = head.clone();
        let mut has_rows = false;

        for row in rows.iter().filter(|r| !r.trim().is_empty()) {
            let row_len = char_len(row) + 1;

            if has_rows && char_len(&current) + row_len > self.budget {
                chunks.push(current.trim_end().to_string());
                current = head.clone();
                has_rows = false;
            }

            if head_len + row_len > self.budget {
                // Header plus this row can never fit; cut the row itself
                let room = self.budget - head_len;
                for piece in split_at_char_limit(row, room) {
                    chunks.push(format!("{}{}", head, piece));
                }
                continue;
            }

            current.push_str(row);
            current.push('\n');
            has_rows = true;
        }

        if has_rows {
            chunks.push(current.trim_end().to_string());
        }
        chunks
    }

    /// Chunk by paragraphs (double newlines)
    fn chunk_by_paragraph(&self, text: &str) -> Vec<String> {
        let paragraphs: Vec<&str> = text.split("\n\n").collect();
        self.combine_until_limit(&paragraphs, "\n\n")
    }

    /// Combine elements, joined by `separator`, until they reach the size limit
    fn combine_until_limit(&self, elements: &[&str], separator: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for element in elements.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
            let joiner = if current.is_empty() { 0 } else { char_len(separator) };
            if char_len(&current) + joiner + char_len(element) > self.budget {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                if char_len(element) > self.budget {
                    chunks.extend(split_at_char_limit(element, self.budget));
                    continue;
                }
            }
            if !current.is_empty() {
                current.push_str(separator);
            }
            current.push_str(element);
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

/// Index of the first markdown header line followed by a delimiter line
fn find_table_header(lines: &[&str]) -> Option<usize> {
    lines
        .windows(2)
        .position(|pair| is_table_line(pair[0]) && is_delimiter_line(pair[1]))
}

fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn is_delimiter_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('-')
        && trimmed.contains('|')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text into pieces of at most `limit` characters
fn split_at_char_limit(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}
