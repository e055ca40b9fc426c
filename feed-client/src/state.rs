use crate::sort::sort_posts;
use tracing::debug;
use zenith_core::{Monitor, RedditPost, SortKey};

#[derive(Debug, Clone)]
pub enum Message {
    MonitorsRequested,
    MonitorsLoaded(Vec<Monitor>),
    MonitorsFailed(String),
    MonitorCreated(Monitor),
    MonitorUpdated(Monitor),
    /// Optimistic removal ahead of the server's answer.
    MonitorRemoved(String),
    MonitorsRestored(Vec<Monitor>),
    MonitorSelected(Option<String>),
    PostsRequested,
    PostsLoaded {
        generation: u64,
        posts: Vec<RedditPost>,
    },
    PostsFailed {
        generation: u64,
        error: String,
    },
    SortKeyChanged(SortKey),
    ErrorRaised(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub monitors: Vec<Monitor>,
    pub selected_monitor_id: Option<String>,
    pub posts: Vec<RedditPost>,
    pub loading_monitors: bool,
    pub loading_posts: bool,
    pub error: Option<String>,
    pub sort_key: SortKey,
    posts_generation: u64,
}

impl FeedState {
    pub fn with_selection(selected_monitor_id: Option<String>) -> Self {
        Self {
            selected_monitor_id,
            ..Self::default()
        }
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::MonitorsRequested => {
                self.loading_monitors = true;
                self.error = None;
            }
            Message::MonitorsLoaded(monitors) => {
                self.monitors = monitors;
                self.loading_monitors = false;
            }
            Message::MonitorsFailed(error) => {
                self.error = Some(error);
                self.loading_monitors = false;
            }
            Message::MonitorCreated(monitor) => {
                self.monitors.push(monitor);
            }
            Message::MonitorUpdated(monitor) => {
                if let Some(existing) = self.monitors.iter_mut().find(|m| m.id == monitor.id) {
                    *existing = monitor;
                }
            }
            Message::MonitorRemoved(id) => {
                self.monitors.retain(|m| m.id != id);
            }
            Message::MonitorsRestored(monitors) => {
                self.monitors = monitors;
            }
            Message::MonitorSelected(id) => {
                self.selected_monitor_id = id;
                self.posts.clear();
                self.sort_key = SortKey::New;
                self.loading_posts = false;
                // Anything still in flight belongs to the previous selection.
                self.posts_generation += 1;
            }
            Message::PostsRequested => {
                self.posts_generation += 1;
                self.loading_posts = true;
                self.error = None;
                self.posts.clear();
            }
            Message::PostsLoaded { generation, posts } => {
                if generation != self.posts_generation {
                    debug!(
                        "Discarding stale posts (generation {}, current {})",
                        generation, self.posts_generation
                    );
                    return;
                }
                self.posts = posts;
                self.loading_posts = false;
            }
            Message::PostsFailed { generation, error } => {
                if generation != self.posts_generation {
                    debug!(
                        "Discarding stale post error (generation {}, current {})",
                        generation, self.posts_generation
                    );
                    return;
                }
                self.error = Some(error);
                self.loading_posts = false;
                self.posts.clear();
            }
            Message::SortKeyChanged(key) => {
                self.sort_key = key;
            }
            Message::ErrorRaised(error) => {
                self.error = Some(error);
            }
        }
    }

    /// Generation the next `PostsLoaded`/`PostsFailed` must carry to be applied.
    pub fn posts_generation(&self) -> u64 {
        self.posts_generation
    }

    pub fn selected_monitor(&self) -> Option<&Monitor> {
        let id = self.selected_monitor_id.as_deref()?;
        self.monitors.iter().find(|m| m.id == id)
    }

    /// Current posts in the current sort order.
    pub fn sorted_posts(&self) -> Vec<RedditPost> {
        sort_posts(&self.posts, self.sort_key)
    }

    /// Selecting the monitor that is already shown with posts is a no-op.
    pub fn is_showing(&self, id: Option<&str>) -> bool {
        self.selected_monitor_id.as_deref() == id && !self.posts.is_empty()
    }

    /// Which monitor to show after the list was (re)loaded: the current selection if it
    /// still exists, otherwise the first monitor.
    pub fn selection_after_load(&self) -> Option<String> {
        self.selected_monitor()
            .or_else(|| self.monitors.first())
            .map(|m| m.id.clone())
    }

    /// Which monitor to show after `removed_id` was deleted.
    pub fn selection_after_delete(&self, removed_id: &str) -> Option<Option<String>> {
        if self.selected_monitor_id.as_deref() != Some(removed_id) {
            return None;
        }
        Some(self.monitors.first().map(|m| m.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: &str, subreddit: &str) -> Monitor {
        Monitor {
            id: id.to_string(),
            subreddit: subreddit.to_string(),
            keywords: String::new(),
        }
    }

    fn post(id: &str) -> RedditPost {
        RedditPost {
            id: id.to_string(),
            title: String::new(),
            author: String::new(),
            subreddit: "rust".to_string(),
            score: 0,
            url: String::new(),
            created_utc: 0,
            permalink: String::new(),
            num_comments: 0,
        }
    }

    #[test]
    fn test_monitor_loading_flags() {
        let mut state = FeedState::default();
        state.update(Message::MonitorsRequested);
        assert!(state.loading_monitors);

        state.update(Message::MonitorsLoaded(vec![monitor("a", "rust")]));
        assert!(!state.loading_monitors);
        assert_eq!(state.monitors.len(), 1);

        state.update(Message::MonitorsRequested);
        state.update(Message::MonitorsFailed("offline".to_string()));
        assert!(!state.loading_monitors);
        assert_eq!(state.error.as_deref(), Some("offline"));
    }

    #[test]
    fn test_selection_resets_sort_and_posts() {
        let mut state = FeedState::default();
        state.update(Message::MonitorsLoaded(vec![monitor("a", "rust"), monitor("b", "golang")]));
        state.update(Message::MonitorSelected(Some("a".to_string())));
        state.update(Message::PostsRequested);
        let generation = state.posts_generation();
        state.update(Message::PostsLoaded {
            generation,
            posts: vec![post("p1")],
        });
        state.update(Message::SortKeyChanged(SortKey::Score));

        state.update(Message::MonitorSelected(Some("b".to_string())));
        assert_eq!(state.selected_monitor_id.as_deref(), Some("b"));
        assert!(state.posts.is_empty());
        assert_eq!(state.sort_key, SortKey::New);
    }

    #[test]
    fn test_stale_posts_are_discarded() {
        let mut state = FeedState::default();
        state.update(Message::MonitorSelected(Some("a".to_string())));
        state.update(Message::PostsRequested);
        let stale = state.posts_generation();

        state.update(Message::MonitorSelected(Some("b".to_string())));
        state.update(Message::PostsRequested);
        let current = state.posts_generation();

        state.update(Message::PostsLoaded {
            generation: current,
            posts: vec![post("from-b")],
        });
        state.update(Message::PostsLoaded {
            generation: stale,
            posts: vec![post("from-a")],
        });
        state.update(Message::PostsFailed {
            generation: stale,
            error: "late failure".to_string(),
        });

        assert_eq!(state.posts, vec![post("from-b")]);
        assert_eq!(state.error, None);
        assert!(!state.loading_posts);
    }

    #[test]
    fn test_posts_failure_clears_posts() {
        let mut state = FeedState::default();
        state.update(Message::PostsRequested);
        let generation = state.posts_generation();
        state.update(Message::PostsFailed {
            generation,
            error: "Failed to fetch from Reddit: Forbidden".to_string(),
        });
        assert!(state.posts.is_empty());
        assert!(!state.loading_posts);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch from Reddit: Forbidden")
        );
    }

    #[test]
    fn test_monitor_mutations() {
        let mut state = FeedState::default();
        state.update(Message::MonitorCreated(monitor("a", "rust")));
        state.update(Message::MonitorCreated(monitor("b", "golang")));

        state.update(Message::MonitorUpdated(monitor("a", "learnrust")));
        assert_eq!(state.monitors[0].subreddit, "learnrust");

        state.update(Message::MonitorUpdated(monitor("zzz", "ghost")));
        assert_eq!(state.monitors.len(), 2);

        let before = state.monitors.clone();
        state.update(Message::MonitorRemoved("a".to_string()));
        assert_eq!(state.monitors, vec![monitor("b", "golang")]);

        state.update(Message::MonitorsRestored(before.clone()));
        assert_eq!(state.monitors, before);
    }

    #[test]
    fn test_selection_after_load() {
        let mut state = FeedState::with_selection(Some("b".to_string()));
        state.update(Message::MonitorsLoaded(vec![monitor("a", "rust"), monitor("b", "golang")]));
        assert_eq!(state.selection_after_load().as_deref(), Some("b"));

        let mut state = FeedState::with_selection(Some("gone".to_string()));
        state.update(Message::MonitorsLoaded(vec![monitor("a", "rust")]));
        assert_eq!(state.selection_after_load().as_deref(), Some("a"));

        let state = FeedState::with_selection(Some("gone".to_string()));
        assert_eq!(state.selection_after_load(), None);
    }

    #[test]
    fn test_is_showing() {
        let mut state = FeedState::default();
        state.update(Message::MonitorSelected(Some("a".to_string())));
        assert!(!state.is_showing(Some("a")));

        state.update(Message::PostsRequested);
        let generation = state.posts_generation();
        state.update(Message::PostsLoaded {
            generation,
            posts: vec![post("p")],
        });
        assert!(state.is_showing(Some("a")));
        assert!(!state.is_showing(Some("b")));
    }

    #[test]
    fn test_sorted_posts_follow_sort_key() {
        let mut state = FeedState::default();
        state.update(Message::PostsRequested);
        let generation = state.posts_generation();
        let mut low = post("low");
        low.score = 1;
        let mut high = post("high");
        high.score = 9;
        state.update(Message::PostsLoaded {
            generation,
            posts: vec![low.clone(), high.clone()],
        });

        state.update(Message::SortKeyChanged(SortKey::Score));
        assert_eq!(state.sorted_posts(), vec![high, low.clone()]);
        assert_eq!(state.posts[0], low);
    }
}
