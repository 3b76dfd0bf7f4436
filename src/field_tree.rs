//! A byte-keyed trie used to disambiguate keywords and multi-character
//! punctuation during lexing, carried over from the teacher's
//! `FieldTree<T>` almost unchanged — only made self-contained (the teacher
//! defines the struct in its crate root and the impl here; this crate keeps
//! both together since nothing else needs the split).

#[derive(Clone, Debug)]
pub struct FieldTree<T> {
    token: Option<T>,
    children: Vec<(u8, FieldTree<T>)>,
}

impl<T> Default for FieldTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldTree<T> {
    pub fn new() -> Self {
        Self {
            token: None,
            children: Vec::new(),
        }
    }

    /// Insert `value` mapped to `token`. Fails with the previously-registered
    /// token if `value` was already inserted.
    pub fn insert(&mut self, value: &[u8], token: T) -> Result<(), T> {
        if !value.is_empty() {
            match self.children.binary_search_by_key(&value[0], |c| c.0) {
                Ok(index) => self.children[index].1.insert(&value[1..], token),
                Err(index) => {
                    let mut field = FieldTree::new();
                    field.insert(&value[1..], token)?;
                    self.children.insert(index, (value[0], field));
                    Ok(())
                }
            }
        } else {
            match self.token.replace(token) {
                Some(previous) => Err(previous),
                None => Ok(()),
            }
        }
    }
}

impl<T: Clone> FieldTree<T> {
    /// Walk `code_part` as far as registered children allow and return the
    /// token found at the point the walk stopped, together with how many
    /// bytes were consumed. Callers are responsible for checking that the
    /// byte immediately after the match is not itself part of a longer
    /// identifier (e.g. `if` inside `ifx`).
    pub fn find(&self, code_part: &[u8]) -> Option<(T, usize)> {
        let mut current = self;
        let mut index = 0;
        loop {
            if code_part.len() > index {
                match current.children.binary_search_by_key(&code_part[index], |c| c.0) {
                    Ok(i) => {
                        index += 1;
                        current = &current.children[i].1;
                    }
                    Err(_) => break current.token.as_ref().map(|t| (t.clone(), index)),
                }
            } else {
                break current.token.as_ref().map(|t| (t.clone(), index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_and_longest_registered_key() {
        let mut tree = FieldTree::new();
        tree.insert(b"if", 1u8).unwrap();
        tree.insert(b"in", 2u8).unwrap();
        tree.insert(b"int", 3u8).unwrap();

        assert_eq!(tree.find(b"if x"), Some((1, 2)));
        assert_eq!(tree.find(b"int x"), Some((3, 3)));
        assert_eq!(tree.find(b"in x"), Some((2, 2)));
    }

    #[test]
    fn duplicate_insert_fails_with_previous_token() {
        let mut tree = FieldTree::new();
        tree.insert(b"if", 1u8).unwrap();
        assert_eq!(tree.insert(b"if", 2u8), Err(1));
    }
}
