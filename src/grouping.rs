//! # Filename Grouping
//!
//! Related images are recognised purely by name: a run of Latin letters (the
//! group key, case-insensitive), immediately followed by a run of digits (the
//! sequence number), followed by a `jpg`, `jpeg` or `png` extension.
//!
//! | Name | Key | Sequence |
//! |------|-----|----------|
//! | `A1.jpg` | `A` | 1 |
//! | `shot012.PNG` | `SHOT` | 12 |
//! | `b7.jpeg` | `B` | 7 |
//! | `123.jpg`, `A.jpg`, `A1b.jpg`, `A1.gif` | excluded | |
//!
//! Members of a group are ordered by ascending sequence number (stable for
//! equal numbers), and groups with fewer than two members are dropped. Groups
//! come out in the order their key was first seen in the input.

use std::collections::HashMap;

/// Smallest group that produces an output image.
pub const MIN_GROUP_SIZE: usize = 2;

/// Extensions accepted both for grouping and when scanning directories.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// An input file as handed over by the input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawImage {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Anything that carries a file name the grouper can parse.
pub trait HasFileName {
    fn file_name(&self) -> &str;
}

impl HasFileName for RawImage {
    fn file_name(&self) -> &str {
        &self.name
    }
}

impl HasFileName for &str {
    fn file_name(&self) -> &str {
        self
    }
}

impl HasFileName for String {
    fn file_name(&self) -> &str {
        self
    }
}

/// Group key and sequence number parsed from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameKey {
    pub group: String,
    pub sequence: u64,
}

/// A set of related images that merges into one output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<T> {
    pub key: String,
    pub members: Vec<T>,
}

/// Whether `ext` (without the dot) is a recognised image extension.
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Parse `name` into its group key and sequence number.
///
/// Any directory prefix (`/` or `\` separated) is ignored. Returns `None` for
/// names that do not follow the `letters digits . extension` pattern.
pub fn parse_name(name: &str) -> Option<NameKey> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if !is_image_extension(ext) {
        return None;
    }

    let letters = stem
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(stem.len());
    let (group, digits) = stem.split_at(letters);
    if group.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(NameKey {
        group: group.to_ascii_uppercase(),
        // Digit runs too long for u64 still order after every shorter number.
        sequence: digits.parse().unwrap_or(u64::MAX),
    })
}

/// Partition `items` into ordered groups of at least [`MIN_GROUP_SIZE`] members.
pub fn group_images<T: HasFileName>(items: impl IntoIterator<Item = T>) -> Vec<Group<T>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<(u64, T)>)> = Vec::new();

    for item in items {
        let Some(key) = parse_name(item.file_name()) else {
            continue;
        };
        let slot = *index.entry(key.group.clone()).or_insert_with(|| {
            buckets.push((key.group.clone(), Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push((key.sequence, item));
    }

    buckets
        .into_iter()
        .filter(|(_, members)| members.len() >= MIN_GROUP_SIZE)
        .map(|(key, mut members)| {
            members.sort_by_key(|(sequence, _)| *sequence);
            Group {
                key,
                members: members.into_iter().map(|(_, item)| item).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<'a>(groups: &[Group<&'a str>]) -> Vec<(String, Vec<&'a str>)> {
        groups
            .iter()
            .map(|g| (g.key.clone(), g.members.clone()))
            .collect()
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(
            parse_name("A1.jpg"),
            Some(NameKey { group: "A".into(), sequence: 1 })
        );
        assert_eq!(
            parse_name("C:\\photos\\shot012.PNG"),
            Some(NameKey { group: "SHOT".into(), sequence: 12 })
        );
        assert_eq!(
            parse_name("/tmp/b7.JpEg"),
            Some(NameKey { group: "B".into(), sequence: 7 })
        );
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for name in ["123.jpg", "A.jpg", "A1b.jpg", "A1.gif", "A1", "A-1.png", "Ä1.png", "A1.tar.png"] {
            assert_eq!(parse_name(name), None, "{}", name);
        }
    }

    #[test]
    fn test_sequence_ordering() {
        let groups = group_images(["A3.jpg", "A1.jpg", "A2.jpg"]);
        assert_eq!(
            keys(&groups),
            vec![("A".to_string(), vec!["A1.jpg", "A2.jpg", "A3.jpg"])]
        );
    }

    #[test]
    fn test_numeric_not_lexical_order() {
        let groups = group_images(["A10.jpg", "A9.jpg", "A010.png"]);
        assert_eq!(groups[0].members, vec!["A9.jpg", "A10.jpg", "A010.png"]);
    }

    #[test]
    fn test_case_normalization() {
        let groups = group_images(["a1.jpg", "A2.jpg"]);
        assert_eq!(
            keys(&groups),
            vec![("A".to_string(), vec!["a1.jpg", "A2.jpg"])]
        );
    }

    #[test]
    fn test_minimum_group_size() {
        assert!(group_images(["A1.jpg"]).is_empty());
        let groups = group_images(["B1.png", "A1.jpg", "A2.jpg", "notes.txt"]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "A");
    }

    #[test]
    fn test_first_seen_key_order() {
        let groups = group_images(["B2.jpg", "A1.jpg", "B1.jpg", "A2.jpg"]);
        let order: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_deterministic_with_stable_ties() {
        let input = ["A2.jpg", "a2.png", "A1.jpg", "A02.jpeg"];
        let first = group_images(input);
        let second = group_images(input);
        assert_eq!(first, second);
        assert_eq!(
            first[0].members,
            vec!["A1.jpg", "A2.jpg", "a2.png", "A02.jpeg"]
        );
    }
}
