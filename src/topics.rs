//! Topic index: groups entries by topic and subtopic for rendering.
//!
//! One node per main topic in the taxonomy, sorted by name, each holding its
//! subtopics sorted by name. For every `{topic, subtopics}` pairing of an entry:
//!
//! - no subtopics → the entry goes in the topic's own list
//! - subtopics → the entry goes in each listed subtopic's list
//!
//! An entry paired with several topics appears once per pairing. Entries are
//! appended in input order, so a title-sorted input gives title-sorted lists.
//!
//! Names missing from the taxonomy are skipped and collected in
//! [`TopicIndex::unresolved`]; the page still renders.

use crate::taxonomy::MainTopic;
use crate::types::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtopicNode<'a> {
    pub name: String,
    pub entries: Vec<&'a Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicNode<'a> {
    pub name: String,
    /// Entries paired with this topic and no subtopic.
    pub entries: Vec<&'a Entry>,
    pub subtopics: Vec<SubtopicNode<'a>>,
}

impl TopicNode<'_> {
    /// Placements in this topic, counting each subtopic appearance.
    pub fn placement_count(&self) -> usize {
        self.entries.len() + self.subtopics.iter().map(|s| s.entries.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.placement_count() == 0
    }

    pub fn subtopic(&self, name: &str) -> Option<&SubtopicNode<'_>> {
        self.subtopics.iter().find(|s| s.name == name)
    }
}

/// A pairing that named a topic or subtopic the taxonomy doesn't know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTopic {
    pub title: String,
    pub topic: String,
    /// `None` when the topic itself is unknown.
    pub subtopic: Option<String>,
}

impl std::fmt::Display for UnresolvedTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subtopic {
            Some(sub) => write!(f, "{}: unknown subtopic {}/{}", self.title, self.topic, sub),
            None => write!(f, "{}: unknown topic {}", self.title, self.topic),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicIndex<'a> {
    pub topics: Vec<TopicNode<'a>>,
    pub unresolved: Vec<UnresolvedTopic>,
}

impl<'a> TopicIndex<'a> {
    /// Empty nodes for every taxonomy topic and subtopic, sorted by name.
    pub fn skeleton(taxonomy: &[MainTopic]) -> Self {
        let mut topics: Vec<TopicNode<'a>> = taxonomy
            .iter()
            .map(|t| {
                let mut subtopics: Vec<SubtopicNode<'a>> = t
                    .subtopics
                    .iter()
                    .map(|name| SubtopicNode {
                        name: name.clone(),
                        entries: Vec::new(),
                    })
                    .collect();
                subtopics.sort_by(|a, b| a.name.cmp(&b.name));
                subtopics.dedup_by(|a, b| a.name == b.name);
                TopicNode {
                    name: t.maintopic.clone(),
                    entries: Vec::new(),
                    subtopics,
                }
            })
            .collect();
        topics.sort_by(|a, b| a.name.cmp(&b.name));
        topics.dedup_by(|a, b| a.name == b.name);
        Self {
            topics,
            unresolved: Vec::new(),
        }
    }

    /// Build the index for `entries` against the topic taxonomy.
    pub fn build(taxonomy: &[MainTopic], entries: &'a [Entry]) -> Self {
        let mut index = Self::skeleton(taxonomy);
        for entry in entries {
            index.place(entry);
        }
        index
    }

    fn place(&mut self, entry: &'a Entry) {
        for pairing in &entry.data.topics {
            let Some(node) = self.topics.iter_mut().find(|t| t.name == pairing.topic) else {
                self.unresolved.push(UnresolvedTopic {
                    title: entry.title.clone(),
                    topic: pairing.topic.clone(),
                    subtopic: None,
                });
                continue;
            };
            if pairing.subtopics.is_empty() {
                node.entries.push(entry);
                continue;
            }
            for sub in &pairing.subtopics {
                match node.subtopics.iter_mut().find(|s| &s.name == sub) {
                    Some(sub_node) => sub_node.entries.push(entry),
                    None => self.unresolved.push(UnresolvedTopic {
                        title: entry.title.clone(),
                        topic: pairing.topic.clone(),
                        subtopic: Some(sub.clone()),
                    }),
                }
            }
        }
    }

    pub fn topic(&self, name: &str) -> Option<&TopicNode<'a>> {
        self.topics.iter().find(|t| t.name == name)
    }

    /// Topics with at least one placed entry.
    pub fn populated(&self) -> impl Iterator<Item = &TopicNode<'a>> {
        self.topics.iter().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TopicAssignment;

    fn taxonomy() -> Vec<MainTopic> {
        vec![
            MainTopic {
                maintopic: "Dev".into(),
                subtopics: vec!["Web".into(), "CLI".into()],
            },
            MainTopic {
                maintopic: "Design".into(),
                subtopics: vec![],
            },
        ]
    }

    fn entry(title: &str, topics: Vec<TopicAssignment>) -> Entry {
        let mut e = Entry {
            title: title.to_string(),
            ..Default::default()
        };
        e.data.topics = topics;
        e
    }

    fn titles<'a>(entries: &[&'a Entry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn topics_and_subtopics_are_sorted() {
        let index = TopicIndex::build(&taxonomy(), &[]);
        let names: Vec<&str> = index.topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Design", "Dev"]);
        let subs: Vec<&str> = index.topics[1]
            .subtopics
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(subs, vec!["CLI", "Web"]);
    }

    #[test]
    fn topic_without_subtopics_goes_to_top_level() {
        let entries = vec![entry("site", vec![TopicAssignment::new("Dev", &[])])];
        let index = TopicIndex::build(&taxonomy(), &entries);
        let dev = index.topic("Dev").unwrap();
        assert_eq!(titles(&dev.entries), vec!["site"]);
        assert!(dev.subtopics.iter().all(|s| s.entries.is_empty()));
    }

    #[test]
    fn subtopic_pairing_goes_to_subtopic_only() {
        let entries = vec![entry("tool", vec![TopicAssignment::new("Dev", &["CLI"])])];
        let index = TopicIndex::build(&taxonomy(), &entries);
        let dev = index.topic("Dev").unwrap();
        assert!(dev.entries.is_empty());
        assert_eq!(titles(&dev.subtopic("CLI").unwrap().entries), vec!["tool"]);
        assert!(dev.subtopic("Web").unwrap().entries.is_empty());
    }

    #[test]
    fn each_pairing_places_the_entry_once() {
        let entries = vec![entry(
            "multi",
            vec![
                TopicAssignment::new("Dev", &["CLI", "Web"]),
                TopicAssignment::new("Design", &[]),
            ],
        )];
        let index = TopicIndex::build(&taxonomy(), &entries);
        let dev = index.topic("Dev").unwrap();
        assert_eq!(dev.subtopic("CLI").unwrap().entries.len(), 1);
        assert_eq!(dev.subtopic("Web").unwrap().entries.len(), 1);
        assert_eq!(index.topic("Design").unwrap().entries.len(), 1);
        assert_eq!(dev.placement_count(), 2);
    }

    #[test]
    fn placement_follows_input_order() {
        let entries = vec![
            entry("a", vec![TopicAssignment::new("Design", &[])]),
            entry("b", vec![TopicAssignment::new("Design", &[])]),
            entry("c", vec![TopicAssignment::new("Design", &[])]),
        ];
        let index = TopicIndex::build(&taxonomy(), &entries);
        assert_eq!(
            titles(&index.topic("Design").unwrap().entries),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn unknown_names_are_collected() {
        let entries = vec![entry(
            "odd",
            vec![
                TopicAssignment::new("Cooking", &[]),
                TopicAssignment::new("Dev", &["Mobile", "CLI"]),
            ],
        )];
        let index = TopicIndex::build(&taxonomy(), &entries);

        assert_eq!(index.unresolved.len(), 2);
        assert_eq!(index.unresolved[0].subtopic, None);
        assert_eq!(index.unresolved[1].subtopic.as_deref(), Some("Mobile"));
        assert_eq!(index.unresolved[1].to_string(), "odd: unknown subtopic Dev/Mobile");
        // The known subtopic still gets the entry
        let dev = index.topic("Dev").unwrap();
        assert_eq!(dev.subtopic("CLI").unwrap().entries.len(), 1);
    }

    #[test]
    fn populated_skips_empty_topics() {
        let entries = vec![entry("x", vec![TopicAssignment::new("Dev", &["Web"])])];
        let index = TopicIndex::build(&taxonomy(), &entries);
        let names: Vec<&str> = index.populated().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Dev"]);
    }
}
