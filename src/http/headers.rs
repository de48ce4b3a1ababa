//! Case-insensitive, insertion-ordered header multimap.

/// Header fields keyed by name, each holding an ordered list of values.
///
/// Names are stored in canonical form (`content-type` becomes
/// `Content-Type`) and compared case-insensitively, so `get("HOST")` and
/// `get("host")` see the same entry. Iteration follows the order in which
/// names were first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first value stored for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name)
            .and_then(|i| self.entries[i].1.first())
            .map(|v| v.as_str())
    }

    /// Returns every value stored for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.find(name) {
            Some(i) => self.entries[i].1.as_slice(),
            None => &[],
        }
    }

    /// Replaces all values for `name` with the single `value`.
    ///
    /// An existing name keeps its position in the iteration order.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self.find(name) {
            Some(i) => self.entries[i].1 = vec![value.into()],
            None => self
                .entries
                .push((canonical_name(name), vec![value.into()])),
        }
    }

    /// Appends `value` to the values already stored for `name`.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        match self.find(name) {
            Some(i) => self.entries[i].1.push(value.into()),
            None => self
                .entries
                .push((canonical_name(name), vec![value.into()])),
        }
    }

    /// Removes `name` and all of its values.
    pub fn del(&mut self, name: &str) {
        if let Some(i) = self.find(name) {
            self.entries.remove(i);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

/// Canonical MIME form of a header name.
///
/// The first letter and any letter following a hyphen are upper-cased, the
/// rest lower-cased. Names containing anything outside the HTTP token
/// character set are returned unchanged.
pub fn canonical_name(name: &str) -> String {
    if !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
