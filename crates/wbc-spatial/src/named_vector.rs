//! Defines **named vectors**: an ordered sequence of values paired with unique string names.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NamedVectorError {
    #[error("name '{0}' already present in named vector")]
    DuplicateName(String),
    #[error("name '{0}' not found in named vector")]
    UnknownName(String),
    #[error("mismatched sizes: {0} names but {1} elements")]
    SizeMismatch(usize, usize),
}

#[derive(Debug, Clone, PartialEq, Default)]
/// An ordered sequence of values with a parallel sequence of unique names.
///
/// Invariant: `names.len() == elements.len()` always holds; every public constructor and
/// mutator that could break it returns a `Result` instead.
pub struct NamedVector<T> {
    names: Vec<String>,
    elements: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> NamedVector<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            elements: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_pairs(pairs: Vec<(String, T)>) -> Result<Self, NamedVectorError> {
        let mut named = Self::new();
        for (name, value) in pairs {
            named.push(name, value)?;
        }
        Ok(named)
    }

    pub fn push(&mut self, name: String, value: T) -> Result<(), NamedVectorError> {
        if self.index.contains_key(&name) {
            return Err(NamedVectorError::DuplicateName(name));
        }
        self.index.insert(name.clone(), self.elements.len());
        self.names.push(name);
        self.elements.push(value);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.index.get(name).and_then(|&i| self.elements.get(i))
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut T> {
        let i = *self.index.get(name)?;
        self.elements.get_mut(i)
    }

    pub fn set_by_name(&mut self, name: &str, value: T) -> Result<(), NamedVectorError> {
        let slot = self
            .get_by_name_mut(name)
            .ok_or_else(|| NamedVectorError::UnknownName(name.to_string()))?;
        *slot = value;
        Ok(())
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.names.iter().zip(self.elements.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.elements.iter()
    }

    /// Resizes the vector to match a new ordered set of names, carrying over the values of
    /// names present in both sets and filling new names with `default`.
    pub fn resize_to(&mut self, names: &[String], default: T)
    where
        T: Clone,
    {
        let mut new_elements = Vec::with_capacity(names.len());
        let mut new_index = HashMap::with_capacity(names.len());
        for name in names {
            let value = self.get_by_name(name).cloned().unwrap_or_else(|| default.clone());
            new_index.insert(name.clone(), new_elements.len());
            new_elements.push(value);
        }
        self.names = names.to_vec();
        self.elements = new_elements;
        self.index = new_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rejects_duplicate_names() {
        let mut v = NamedVector::new();
        v.push("a".to_string(), 1).unwrap();
        assert!(v.push("a".to_string(), 2).is_err());
    }

    #[test]
    fn by_name_lookup_matches_positional() {
        let v = NamedVector::from_pairs(vec![("x".to_string(), 1), ("y".to_string(), 2)]).unwrap();
        assert_eq!(v.get_by_name("y"), v.get(1));
    }

    #[test]
    fn resize_preserves_correspondence() {
        let mut v =
            NamedVector::from_pairs(vec![("a".to_string(), 1), ("b".to_string(), 2)]).unwrap();
        v.resize_to(&["b".to_string(), "c".to_string()], 0);
        assert_eq!(v.len(), v.names().len());
        assert_eq!(v.get_by_name("b"), Some(&2));
        assert_eq!(v.get_by_name("c"), Some(&0));
        assert_eq!(v.get_by_name("a"), None);
    }
}
