//! Filtering and sorting of merged channel lists

use crate::channel::Channel;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Sort orders offered for channel lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Case-insensitive name, then id
    #[default]
    Name,
    /// Most listeners first; channels without a count go last
    Listeners,
    /// Source id, then name
    Source,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "listeners" | "popular" => Ok(Self::Listeners),
            "source" => Ok(Self::Source),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// Criteria applied to a channel list
///
/// Every set criterion must match (logical AND). An empty filter keeps
/// every channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelFilter {
    /// Free text, matched case-insensitively against name, description,
    /// genres and now-playing text
    pub query: Option<String>,
    /// Exact genre tag (case-insensitive)
    pub genre: Option<String>,
    /// Restrict to these source ids; empty means all sources
    pub sources: Vec<String>,
    /// Restrict to this set of channel ids (favorites)
    pub only: Option<HashSet<String>>,
}

impl ChannelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn only<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// True when `channel` satisfies every criterion
    pub fn matches(&self, channel: &Channel) -> bool {
        if !self.sources.is_empty() && !self.sources.iter().any(|s| s == &channel.source) {
            return false;
        }

        if let Some(only) = &self.only {
            if !only.contains(&channel.id) {
                return false;
            }
        }

        if let Some(genre) = &self.genre {
            let genre = genre.trim().to_lowercase();
            if !channel.genres.iter().any(|g| *g == genre) {
                return false;
            }
        }

        if let Some(query) = &self.query {
            let needle = query.trim().to_lowercase();
            if !haystack(channel).contains(&needle) {
                return false;
            }
        }

        true
    }
}

fn haystack(channel: &Channel) -> String {
    let mut text = channel.name.to_lowercase();
    if let Some(description) = &channel.description {
        text.push('\n');
        text.push_str(&description.to_lowercase());
    }
    for genre in &channel.genres {
        text.push('\n');
        text.push_str(genre);
    }
    if let Some(np) = channel.now_playing.as_ref().and_then(|np| np.display()) {
        text.push('\n');
        text.push_str(&np.to_lowercase());
    }
    text
}

fn by_name(a: &Channel, b: &Channel) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort channels in place
pub fn sort(channels: &mut [Channel], order: SortOrder) {
    match order {
        SortOrder::Name => channels.sort_by(by_name),
        SortOrder::Listeners => channels.sort_by(|a, b| match (a.listeners, b.listeners) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| by_name(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => by_name(a, b),
        }),
        SortOrder::Source => {
            channels.sort_by(|a, b| a.source.cmp(&b.source).then_with(|| by_name(a, b)))
        }
    }
}

/// Filter then sort a channel list
pub fn apply(channels: &[Channel], filter: &ChannelFilter, order: SortOrder) -> Vec<Channel> {
    let mut out: Vec<Channel> = channels
        .iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect();
    sort(&mut out, order);
    out
}

/// Genre tags with the number of channels carrying them
///
/// Most common first, ties broken alphabetically.
pub fn genre_counts(channels: &[Channel]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for channel in channels {
        for genre in &channel.genres {
            *counts.entry(genre.as_str()).or_default() += 1;
        }
    }

    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(genre, count)| (genre.to_string(), count))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::NowPlaying;

    fn sample() -> Vec<Channel> {
        vec![
            Channel::new("somafm", "groovesalad", "Groove Salad", "http://gs")
                .with_genres(["ambient|electronica"])
                .with_listeners(Some(1200)),
            Channel::new("somafm", "dronezone", "Drone Zone", "http://dz")
                .with_genres(["ambient"])
                .with_description("Served best chilled")
                .with_listeners(Some(800)),
            Channel::new("kexp", "kexp", "KEXP", "http://kexp")
                .with_genres(["eclectic"])
                .with_now_playing(Some(NowPlaying {
                    artist: Some("Khruangbin".to_string()),
                    title: Some("Maria También".to_string()),
                    ..Default::default()
                })),
            Channel::new("radiobrowser", "abc", "ambient fm", "http://afm")
                .with_listeners(Some(1200)),
        ]
    }

    fn ids(channels: &[Channel]) -> Vec<&str> {
        channels.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_all_sorted_by_name() {
        let out = apply(&sample(), &ChannelFilter::new(), SortOrder::Name);
        assert_eq!(
            ids(&out),
            vec!["radiobrowser:abc", "somafm:dronezone", "somafm:groovesalad", "kexp:kexp"]
        );
    }

    #[test]
    fn test_query_matches_description_and_now_playing() {
        let out = apply(&sample(), &ChannelFilter::new().query("CHILLED"), SortOrder::Name);
        assert_eq!(ids(&out), vec!["somafm:dronezone"]);

        let out = apply(&sample(), &ChannelFilter::new().query("khruangbin"), SortOrder::Name);
        assert_eq!(ids(&out), vec!["kexp:kexp"]);
    }

    #[test]
    fn test_query_matches_genres_and_names() {
        let out = apply(&sample(), &ChannelFilter::new().query("ambient"), SortOrder::Name);
        assert_eq!(
            ids(&out),
            vec!["radiobrowser:abc", "somafm:dronezone", "somafm:groovesalad"]
        );
    }

    #[test]
    fn test_genre_is_exact() {
        let out = apply(&sample(), &ChannelFilter::new().genre("Ambient"), SortOrder::Name);
        assert_eq!(ids(&out), vec!["somafm:dronezone", "somafm:groovesalad"]);

        let out = apply(&sample(), &ChannelFilter::new().genre("amb"), SortOrder::Name);
        assert!(out.is_empty());
    }

    #[test]
    fn test_source_and_only_filters() {
        let filter = ChannelFilter::new().source("somafm").source("kexp");
        assert_eq!(apply(&sample(), &filter, SortOrder::Name).len(), 3);

        let filter = ChannelFilter::new().only(["kexp:kexp", "somafm:dronezone"]);
        assert_eq!(
            ids(&apply(&sample(), &filter, SortOrder::Name)),
            vec!["somafm:dronezone", "kexp:kexp"]
        );
    }

    #[test]
    fn test_sort_by_listeners() {
        let out = apply(&sample(), &ChannelFilter::new(), SortOrder::Listeners);
        assert_eq!(
            ids(&out),
            vec!["radiobrowser:abc", "somafm:groovesalad", "somafm:dronezone", "kexp:kexp"]
        );
    }

    #[test]
    fn test_sort_by_source() {
        let out = apply(&sample(), &ChannelFilter::new(), SortOrder::Source);
        assert_eq!(
            ids(&out),
            vec!["kexp:kexp", "radiobrowser:abc", "somafm:dronezone", "somafm:groovesalad"]
        );
    }

    #[test]
    fn test_genre_counts() {
        let counts = genre_counts(&sample());
        assert_eq!(
            counts,
            vec![
                ("ambient".to_string(), 2),
                ("eclectic".to_string(), 1),
                ("electronica".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("Listeners".parse::<SortOrder>().unwrap(), SortOrder::Listeners);
        assert_eq!("popular".parse::<SortOrder>().unwrap(), SortOrder::Listeners);
        assert!("random".parse::<SortOrder>().is_err());
    }
}
