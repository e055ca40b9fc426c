use crate::api::FeedApi;
use crate::persist::SelectionStorage;
use crate::state::{FeedState, Message};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use zenith_core::{CoreError, ErrorExt, Monitor, MonitorDraft, SortKey};

/// Single writer of [`FeedState`]. Every transition goes through [`FeedState::update`]
/// and is published to subscribers; the selected monitor id is written to
/// [`SelectionStorage`] whenever it changes.
pub struct FeedStore {
    api: Arc<dyn FeedApi>,
    storage: Box<dyn SelectionStorage>,
    state: watch::Sender<FeedState>,
}

impl FeedStore {
    pub fn new(api: Arc<dyn FeedApi>, storage: Box<dyn SelectionStorage>) -> Self {
        let persisted = match storage.load() {
            Ok(selected) => selected,
            Err(e) => {
                e.log_warn();
                None
            }
        };
        if let Some(id) = &persisted {
            debug!("Restored persisted selection {}", id);
        }

        let (state, _) = watch::channel(FeedState::with_selection(persisted));
        Self {
            api,
            storage,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Reads a projection of the current state without cloning all of it.
    pub fn select<T>(&self, f: impl FnOnce(&FeedState) -> T) -> T {
        f(&self.state.borrow())
    }

    fn dispatch(&self, message: Message) {
        let mut selection_changed = None;
        self.state.send_modify(|state| {
            let before = state.selected_monitor_id.clone();
            state.update(message);
            if state.selected_monitor_id != before {
                selection_changed = Some(state.selected_monitor_id.clone());
            }
        });

        if let Some(selected) = selection_changed {
            if let Err(e) = self.storage.save(selected.as_deref()) {
                e.log_warn();
            }
        }
    }

    fn record(&self, error: CoreError) -> CoreError {
        error.log_warn();
        self.dispatch(Message::ErrorRaised(error.user_friendly_message()));
        error
    }

    /// Loads the monitor list, then shows the previous selection if it survived, else the
    /// first monitor, else nothing.
    pub async fn fetch_monitors(&self) -> Result<(), CoreError> {
        self.dispatch(Message::MonitorsRequested);

        let monitors = match self.api.list_monitors().await {
            Ok(monitors) => monitors,
            Err(e) => {
                e.log_warn();
                self.dispatch(Message::MonitorsFailed(e.user_friendly_message()));
                return Err(e);
            }
        };
        info!("Loaded {} monitors", monitors.len());
        self.dispatch(Message::MonitorsLoaded(monitors));

        let next = self.select(|s| s.selection_after_load());
        self.select_monitor(next).await;
        Ok(())
    }

    pub async fn create_monitor(
        &self,
        subreddit: &str,
        keywords: Option<&str>,
    ) -> Result<Monitor, CoreError> {
        let draft = MonitorDraft::parse(Some(subreddit), keywords).map_err(|e| self.record(e))?;
        let monitor = self
            .api
            .create_monitor(&draft)
            .await
            .map_err(|e| self.record(e))?;

        info!("Created monitor {} for r/{}", monitor.id, monitor.subreddit);
        self.dispatch(Message::MonitorCreated(monitor.clone()));
        self.select_monitor(Some(monitor.id.clone())).await;
        Ok(monitor)
    }

    pub async fn update_monitor(
        &self,
        id: &str,
        subreddit: &str,
        keywords: Option<&str>,
    ) -> Result<Monitor, CoreError> {
        let draft = MonitorDraft::parse(Some(subreddit), keywords).map_err(|e| self.record(e))?;
        let monitor = self
            .api
            .update_monitor(id, &draft)
            .await
            .map_err(|e| self.record(e))?;

        info!("Updated monitor {} for r/{}", monitor.id, monitor.subreddit);
        self.dispatch(Message::MonitorUpdated(monitor.clone()));
        Ok(monitor)
    }

    /// Removes the monitor from the list before the server answers and puts the previous
    /// list back if the request fails.
    pub async fn delete_monitor(&self, id: &str) -> Result<(), CoreError> {
        let previous = self.select(|s| s.monitors.clone());
        self.dispatch(Message::MonitorRemoved(id.to_string()));

        if let Err(e) = self.api.delete_monitor(id).await {
            self.dispatch(Message::MonitorsRestored(previous));
            return Err(self.record(e));
        }

        info!("Deleted monitor {}", id);
        if let Some(next) = self.select(|s| s.selection_after_delete(id)) {
            self.select_monitor(next).await;
        }
        Ok(())
    }

    /// Shows `id` and fetches its posts. Post failures end up in the state's error.
    pub async fn select_monitor(&self, id: Option<String>) {
        if self.select(|s| s.is_showing(id.as_deref())) {
            debug!("Monitor {:?} already shown", id);
            return;
        }

        let fetch = id.is_some();
        self.dispatch(Message::MonitorSelected(id));
        if fetch {
            if let Err(e) = self.fetch_posts().await {
                debug!("Post fetch after selection failed: {}", e);
            }
        }
    }

    pub async fn refresh_posts(&self) -> Result<(), CoreError> {
        self.fetch_posts().await
    }

    pub fn set_sort_key(&self, key: SortKey) {
        self.dispatch(Message::SortKeyChanged(key));
    }

    async fn fetch_posts(&self) -> Result<(), CoreError> {
        let mut request = None;
        self.state.send_if_modified(|state| {
            let Some(id) = state.selected_monitor_id.clone() else {
                return false;
            };
            state.update(Message::PostsRequested);
            request = Some((id, state.posts_generation()));
            true
        });
        let Some((monitor_id, generation)) = request else {
            return Ok(());
        };

        match self.api.list_posts(&monitor_id).await {
            Ok(posts) => {
                debug!("Fetched {} posts for monitor {}", posts.len(), monitor_id);
                self.dispatch(Message::PostsLoaded { generation, posts });
                Ok(())
            }
            Err(e) => {
                e.log_warn();
                self.dispatch(Message::PostsFailed {
                    generation,
                    error: e.user_friendly_message(),
                });
                Err(e)
            }
        }
    }
}
