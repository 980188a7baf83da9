use std::rc::Rc;

/// Character stream over the program text
pub struct SourceFile {
    code: Rc<Vec<char>>,
    idx: usize,
}

impl SourceFile {
    pub fn new(code: Rc<Vec<char>>) -> Self {
        Self { code, idx: 0 }
    }

    /// `None` marks the end of the stream and is returned on every call afterwards
    pub fn read_char(&mut self) -> Option<char> {
        let ch = self.code.get(self.idx).cloned();
        if ch.is_some() {
            self.idx += 1;
        }
        ch
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_until_end() {
        let mut source = SourceFile::new(Rc::new(vec!['a', '\n']));
        assert_eq!(source.read_char(), Some('a'));
        assert_eq!(source.read_char(), Some('\n'));
        assert_eq!(source.read_char(), None);
        assert_eq!(source.read_char(), None);
    }
}
