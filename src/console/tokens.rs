use std::collections::VecDeque;
use std::io::{self, BufRead};

/// Splits input into whitespace separated words, reading a line only when
/// the words of the previous one are used up. A command and its amount can
/// therefore share a line.
pub struct TokenReader<R> {
    reader: R,
    pending: VecDeque<String>
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> TokenReader<R> {
        TokenReader { reader, pending: VecDeque::new() }
    }

    /// Next word, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }
}


#[cfg(test)]
mod tests {
    use super::TokenReader;

    #[test]
    fn splits_lines_into_words() {
        let mut reader = TokenReader::new("d 12.50\n\n   \nBalance\n  e  ".as_bytes());
        let mut words = Vec::new();
        while let Some(word) = reader.next_token().unwrap() {
            words.push(word);
        }
        assert_eq!(words, vec!["d", "12.50", "Balance", "e"]);
        assert_eq!(reader.next_token().unwrap(), None);
    }
}
