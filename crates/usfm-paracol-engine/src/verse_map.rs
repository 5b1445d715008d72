use std::{collections::HashMap, fmt};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::reference::VerseRef;

/// Insertion-ordered mapping of verse references to encoded verse text.
///
/// Order is source order; nothing here re-sorts. Inserting a reference that is
/// already present replaces its text but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerseMap {
    entries: Vec<(VerseRef, String)>,
    index: HashMap<VerseRef, usize>,
}

impl VerseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: VerseRef, text: String) {
        match self.index.get(&reference) {
            Some(&i) => self.entries[i].1 = text,
            None => {
                self.index.insert(reference, self.entries.len());
                self.entries.push((reference, text));
            }
        }
    }

    pub fn get(&self, reference: &VerseRef) -> Option<&str> {
        self.index
            .get(reference)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, reference: &VerseRef) -> bool {
        self.index.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VerseRef, &str)> {
        self.entries.iter().map(|(r, t)| (r, t.as_str()))
    }

    pub fn refs(&self) -> impl Iterator<Item = &VerseRef> {
        self.entries.iter().map(|(r, _)| r)
    }

    /// Groups references by chapter, keeping source order within and across chapters.
    pub fn chapters(&self) -> Vec<(u32, Vec<VerseRef>)> {
        let mut out: Vec<(u32, Vec<VerseRef>)> = vec![];
        for (r, _) in &self.entries {
            match out.last_mut() {
                Some((chapter, refs)) if *chapter == r.chapter() => refs.push(*r),
                _ => out.push((r.chapter(), vec![*r])),
            }
        }
        out
    }
}

impl FromIterator<(VerseRef, String)> for VerseMap {
    fn from_iter<I: IntoIterator<Item = (VerseRef, String)>>(iter: I) -> Self {
        let mut map = VerseMap::new();
        for (r, t) in iter {
            map.insert(r, t);
        }
        map
    }
}

impl Serialize for VerseMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (r, t) in &self.entries {
            map.serialize_entry(r, t)?;
        }
        map.end()
    }
}

struct VerseMapVisitor;

impl<'de> Visitor<'de> for VerseMapVisitor {
    type Value = VerseMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of verse references to verse text")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = VerseMap::new();
        while let Some((r, t)) = access.next_entry::<VerseRef, String>()? {
            map.insert(r, t);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for VerseMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(VerseMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn r(s: &str) -> VerseRef {
        s.parse().unwrap()
    }

    #[test]
    fn keeps_insertion_order() {
        let mut map = VerseMap::new();
        map.insert(r("2:1"), "b".into());
        map.insert(r("1:1"), "a".into());
        let refs: Vec<String> = map.refs().map(ToString::to_string).collect();
        assert_eq!(refs, ["2:1", "1:1"]);
    }

    #[test]
    fn reinsert_replaces_text_in_place() {
        let mut map = VerseMap::new();
        map.insert(r("1:1"), "first".into());
        map.insert(r("1:2"), "second".into());
        map.insert(r("1:1"), "replaced".into());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&r("1:1")), Some("replaced"));
        assert_eq!(map.refs().next(), Some(&r("1:1")));
    }

    #[test]
    fn groups_chapters_in_source_order() {
        let map: VerseMap = ["1:1", "1:2", "2:1", "2:1a"]
            .iter()
            .map(|s| (r(s), String::new()))
            .collect();
        let chapters = map.chapters();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].0, 1);
        assert_eq!(chapters[1].1, vec![r("2:1"), r("2:1a")]);
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let map: VerseMap = [("3:1", "c"), ("1:1", "a"), ("2:5b", "b")]
            .iter()
            .map(|(k, v)| (r(k), v.to_string()))
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"3:1":"c","1:1":"a","2:5b":"b"}"#);
        let back: VerseMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn json_with_bad_key_fails() {
        let err = serde_json::from_str::<VerseMap>(r#"{"one":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("one"));
    }
}
