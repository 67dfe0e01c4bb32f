use std::collections::HashMap;

use crate::post::Post;

/// A ranked `(hashtag, count)` entry.
pub type Trend = (String, usize);

#[derive(Default, Debug, Clone, PartialEq)]
pub struct HashtagCounts {
    hits: HashMap<String, usize>,
}

impl HashtagCounts {
    pub fn add_post(&mut self, post: &Post) {
        for tag in post.hashtags() {
            let hits = self.hits.entry(tag.clone()).or_default();
            *hits += 1;
        }
    }

    pub fn get(&self, tag: &str) -> usize {
        self.hits.get(tag).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.hits.iter().map(|(tag, &hits)| (tag.as_str(), hits))
    }

    /// Highest counts first; equal counts ordered by hashtag ascending.
    pub fn ranked(&self, limit: usize) -> Vec<Trend> {
        if limit == 0 {
            return Vec::new();
        }
        let mut trends: Vec<Trend> = self
            .hits
            .iter()
            .map(|(tag, &hits)| (tag.clone(), hits))
            .collect();
        trends.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        trends.truncate(limit);
        trends
    }
}

impl<'a> FromIterator<&'a Post> for HashtagCounts {
    fn from_iter<I: IntoIterator<Item = &'a Post>>(posts: I) -> Self {
        let mut counts = HashtagCounts::default();
        for post in posts {
            counts.add_post(post);
        }
        counts
    }
}
