//! Сохранение пользовательских настроек панели между запусками.
//!
//! Сохраняется только фиксированный набор полей (поиск, пагинация, фильтр),
//! но никогда сами коллекции.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashboard_client::{Comment, Post, Todo, User};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dashboard::Stores;
use crate::debounce;
use crate::error::{StateError, StateResult};
use crate::extension::{LocalIds, Pagination, TodoFilter};
use crate::store::StoreState;

pub const STORAGE_KEY: &str = "claros-dashboard-state";

/// Пауза после последнего изменения перед записью настроек.
pub const PERSIST_DEBOUNCE: Duration = Duration::from_secs(1);

/// Хранилище строк по ключу (аналог localStorage).
pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: &str) -> StateResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StateResult<()>;
    fn remove(&self, key: &str) -> StateResult<()>;
}

/// Один JSON-файл на ключ внутри каталога.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> StateResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StateResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StateResult<()> {
        match fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Хранилище в памяти; считает записи.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> StateResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StateResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> StateResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedUserPrefs {
    pub search_query: String,
    pub current_page: u32,
    pub items_per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPostPrefs {
    pub search_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTodoPrefs {
    pub filter: TodoFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Сохраняемая часть состояния.
pub struct PersistedState {
    pub user: PersistedUserPrefs,
    pub post: PersistedPostPrefs,
    pub todo: PersistedTodoPrefs,
}

impl PersistedState {
    pub fn capture(stores: &Stores) -> Self {
        let (search_query, pagination) = stores
            .users
            .read(|state| (state.search_query.clone(), state.ext));

        Self {
            user: PersistedUserPrefs {
                search_query,
                current_page: pagination.current_page,
                items_per_page: pagination.items_per_page,
            },
            post: PersistedPostPrefs {
                search_query: stores.posts.search_query(),
            },
            todo: PersistedTodoPrefs {
                filter: stores.todos.ext(),
            },
        }
    }

    /// Восстанавливает настройки в хранилищах.
    pub fn apply(&self, stores: &Stores) {
        // поиск и размер страницы сбрасывают номер страницы, поэтому он последний
        stores.users.set_search_query(self.user.search_query.clone());
        stores.users.set_items_per_page(self.user.items_per_page);
        stores.users.set_current_page(self.user.current_page);
        stores.posts.set_search_query(self.post.search_query.clone());
        stores.todos.set_filter(self.todo.filter);
    }
}

/// Читает сохранённые настройки.
///
/// Отсутствующие или повреждённые данные означают «настроек нет».
pub fn load_persisted_state(storage: &dyn PreferenceStorage) -> Option<PersistedState> {
    let raw = match storage.get(STORAGE_KEY) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return None,
        Err(err) => {
            warn!(error = %err, "failed to read persisted dashboard state");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(state) => Some(state),
        Err(err) => {
            warn!(error = %err, "failed to parse persisted dashboard state");
            None
        }
    }
}

pub fn save_state(storage: &dyn PreferenceStorage, state: &PersistedState) {
    let result = serde_json::to_string(state)
        .map_err(StateError::from)
        .and_then(|raw| storage.set(STORAGE_KEY, &raw));

    match result {
        Ok(()) => debug!("dashboard state persisted"),
        Err(err) => warn!(error = %err, "failed to save dashboard state"),
    }
}

pub fn clear_persisted_state(storage: &dyn PreferenceStorage) {
    if let Err(err) = storage.remove(STORAGE_KEY) {
        warn!(error = %err, "failed to clear persisted dashboard state");
    }
}

/// Фоновая синхронизация настроек: после каждого изменения хранилищ и паузы
/// в `delay` записывает актуальный снимок.
pub struct PreferenceSync {
    stores: Stores,
    storage: Arc<dyn PreferenceStorage>,
    task: JoinHandle<()>,
}

impl PreferenceSync {
    pub fn spawn(stores: Stores, storage: Arc<dyn PreferenceStorage>) -> Self {
        Self::with_delay(stores, storage, PERSIST_DEBOUNCE)
    }

    pub fn with_delay(stores: Stores, storage: Arc<dyn PreferenceStorage>, delay: Duration) -> Self {
        let watched = Watched {
            users: stores.users.subscribe(),
            posts: stores.posts.subscribe(),
            comments: stores.comments.subscribe(),
            todos: stores.todos.subscribe(),
        };
        let task = tokio::spawn(sync_loop(stores.clone(), watched, storage.clone(), delay));
        Self {
            stores,
            storage,
            task,
        }
    }

    /// Записывает текущие настройки сразу, минуя паузу.
    pub fn flush(&self) {
        save_state(self.storage.as_ref(), &PersistedState::capture(&self.stores));
    }
}

impl Drop for PreferenceSync {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Watched {
    users: watch::Receiver<StoreState<User, Pagination>>,
    posts: watch::Receiver<StoreState<Post, LocalIds>>,
    comments: watch::Receiver<StoreState<Comment, ()>>,
    todos: watch::Receiver<StoreState<Todo, TodoFilter>>,
}

async fn sync_loop(
    stores: Stores,
    mut watched: Watched,
    storage: Arc<dyn PreferenceStorage>,
    delay: Duration,
) {
    let (snapshot_tx, snapshot_rx) = watch::channel(PersistedState::capture(&stores));

    let feed = async {
        loop {
            let changed = tokio::select! {
                r = watched.users.changed() => r,
                r = watched.posts.changed() => r,
                r = watched.comments.changed() => r,
                r = watched.todos.changed() => r,
            };
            if changed.is_err() {
                break;
            }

            let next = PersistedState::capture(&stores);
            snapshot_tx.send_if_modified(|current| {
                if *current == next {
                    return false;
                }
                *current = next;
                true
            });
        }
    };

    let writer = debounce::run(snapshot_rx, delay, |state| save_state(storage.as_ref(), &state));

    tokio::join!(feed, writer);
}
