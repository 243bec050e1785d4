//! Word-preserving text chunking with trailing overlap
//!
//! Splits window text into pieces that fit a backend's input budget. Each
//! chunk after the first repeats the last few words of its predecessor so a
//! judgment never loses the context right at a boundary.

/// One bounded piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
  pub text: String,
  /// Number of leading words repeated from the previous chunk
  pub carried: usize,
}

/// Split `text` into chunks of at most `max_chars` characters
pub fn chunk(text: &str, max_chars: usize, overlap_words: usize) -> Vec<String> {
  split_chunks(text, max_chars, overlap_words).into_iter().map(|chunk| chunk.text).collect()
}

/// Split `text` into chunks, keeping track of the overlap carried into each.
///
/// A single word longer than `max_chars` becomes a chunk of its own. Carried
/// words are dropped from the front when they would push the next word over
/// the budget.
pub fn split_chunks(text: &str, max_chars: usize, overlap_words: usize) -> Vec<Chunk> {
  let mut chunks = Vec::new();
  let mut builder = ChunkBuilder::default();

  for word in text.split_whitespace() {
    if !builder.fits(word, max_chars) {
      if builder.fresh > 0 {
        chunks.push(builder.emit());
        builder = builder.carry(overlap_words);
      }
      builder.trim_to_fit(word, max_chars);
    }
    builder.push(word);
  }

  if builder.fresh > 0 {
    chunks.push(builder.emit());
  }

  chunks
}

#[derive(Default)]
struct ChunkBuilder<'a> {
  words: Vec<&'a str>,
  /// Character length of `words` joined by single spaces
  len: usize,
  /// Words added since the last emission
  fresh: usize,
}

impl<'a> ChunkBuilder<'a> {
  fn len_with(&self, word: &str) -> usize {
    let separator = usize::from(!self.words.is_empty());
    self.len + separator + word.chars().count()
  }

  fn fits(&self, word: &str, max_chars: usize) -> bool {
    self.len_with(word) <= max_chars
  }

  fn push(&mut self, word: &'a str) {
    self.len = self.len_with(word);
    self.words.push(word);
    self.fresh += 1;
  }

  fn emit(&self) -> Chunk {
    Chunk { text: self.words.join(" "), carried: self.words.len() - self.fresh }
  }

  /// Start the next chunk from the last `overlap_words` words of this one
  fn carry(&self, overlap_words: usize) -> Self {
    let keep = overlap_words.min(self.words.len());
    let words = self.words[self.words.len() - keep..].to_vec();
    let len = joined_len(&words);
    Self { words, len, fresh: 0 }
  }

  fn trim_to_fit(&mut self, word: &str, max_chars: usize) {
    while !self.words.is_empty() && !self.fits(word, max_chars) {
      self.words.remove(0);
      self.len = joined_len(&self.words);
    }
  }
}

fn joined_len(words: &[&str]) -> usize {
  let chars: usize = words.iter().map(|word| word.chars().count()).sum();
  chars + words.len().saturating_sub(1)
}
