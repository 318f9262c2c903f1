/// Zero-based position in the loaded question list for single-question
/// mode. Moves are clamped, never wrapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionNavigator {
    index: usize,
    len: usize,
}

impl QuestionNavigator {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) -> usize {
        if self.index + 1 < self.len {
            self.index += 1;
        }
        self.index
    }

    pub fn previous(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    pub fn go_to(&mut self, index: usize) -> usize {
        self.index = index.min(self.len.saturating_sub(1));
        self.index
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// New question set: back to the first question.
    pub fn reload(&mut self, len: usize) {
        self.len = len;
        self.index = 0;
    }
}
