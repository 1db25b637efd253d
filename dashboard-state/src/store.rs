use std::fmt::Display;
use std::sync::Arc;

use dashboard_client::{Comment, DashboardClientError, Post, Todo, User};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::entity::Entity;
use crate::error::{StateError, StateResult};
use crate::extension::{Extension, LocalIds, Pagination, TodoFilter};
use crate::gateway::Gateway;

pub type UserStore = Store<User, Pagination>;
pub type PostStore = Store<Post, LocalIds>;
pub type CommentStore = Store<Comment>;
pub type TodoStore = Store<Todo, TodoFilter>;

#[derive(Debug, Clone)]
/// Снимок состояния одной коллекции.
pub struct StoreState<E, X> {
    pub items: Vec<E>,
    pub loading: bool,
    pub operation_loading: bool,
    pub error: Option<String>,
    pub search_query: String,
    pub ext: X,
}

impl<E, X: Default> Default for StoreState<E, X> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            operation_loading: false,
            error: None,
            search_query: String::new(),
            ext: X::default(),
        }
    }
}

/// Хранилище одной коллекции с флагами жизненного цикла запросов.
///
/// Ошибки запросов перехватываются здесь и превращаются в `error`; наружу
/// они дополнительно возвращаются как `Err`, чтобы вызывающий мог дождаться
/// результата. Каждое изменение состояния публикуется подписчикам `subscribe`.
pub struct Store<E: Entity, X: Extension = ()> {
    state: watch::Sender<StoreState<E, X>>,
    gateway: Arc<dyn Gateway<E>>,
}

impl<E: Entity, X: Extension> Store<E, X> {
    pub fn new(gateway: Arc<dyn Gateway<E>>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { state, gateway }
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState<E, X>> {
        self.state.subscribe()
    }

    pub fn read<R>(&self, f: impl FnOnce(&StoreState<E, X>) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn snapshot(&self) -> StoreState<E, X> {
        self.read(Clone::clone)
    }

    pub fn items(&self) -> Vec<E> {
        self.read(|state| state.items.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|state| state.items.is_empty())
    }

    pub fn is_loading(&self) -> bool {
        self.read(|state| state.loading)
    }

    pub fn is_operation_loading(&self) -> bool {
        self.read(|state| state.operation_loading)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|state| state.error.clone())
    }

    pub fn search_query(&self) -> String {
        self.read(|state| state.search_query.clone())
    }

    pub fn ext(&self) -> X {
        self.read(|state| state.ext.clone())
    }

    fn modify(&self, f: impl FnOnce(&mut StoreState<E, X>)) {
        self.state.send_modify(f);
    }

    /// Загружает коллекцию целиком и заменяет `items`.
    ///
    /// Проверка «только если пусто» остаётся на вызывающей стороне.
    pub async fn fetch_all(&self) -> StateResult<()> {
        self.modify(|state| {
            state.loading = true;
            state.error = None;
        });
        debug!(collection = E::COLLECTION, "fetching collection");

        match self.gateway.fetch_all().await {
            Ok(items) => {
                debug!(collection = E::COLLECTION, count = items.len(), "collection fetched");
                self.modify(|state| {
                    state.loading = false;
                    state.ext.on_fetched(&items);
                    state.items = items;
                });
                Ok(())
            }
            Err(err) => {
                let message =
                    failure_message(&err, || format!("Failed to fetch {}", E::COLLECTION));
                warn!(collection = E::COLLECTION, error = %message, "fetch failed");
                self.modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(err.into())
            }
        }
    }

    /// Создаёт запись и добавляет её в начало коллекции.
    pub async fn create(&self, draft: E::Draft) -> StateResult<E> {
        self.begin_operation();

        match self.gateway.create(&draft).await {
            Ok(mut record) => {
                self.modify(|state| {
                    state.operation_loading = false;
                    state.ext.on_created(&mut record);
                    state.items.insert(0, record.clone());
                });
                debug!(collection = E::COLLECTION, id = record.id(), "record created");
                Ok(record)
            }
            Err(err) => Err(self.fail_operation("create", err)),
        }
    }

    /// Применяет патч к записи `id`.
    ///
    /// Отсутствующая запись не считается ошибкой: возвращается `Ok(None)`.
    /// Локальные записи обновляются без обращения к удалённому ресурсу.
    pub async fn update(&self, id: i64, patch: E::Patch) -> StateResult<Option<E>> {
        self.begin_operation();

        let current = self.read(|state| state.items.iter().find(|r| r.id() == id).cloned());
        let Some(mut merged) = current else {
            debug!(collection = E::COLLECTION, id, "update skipped: record is absent");
            self.modify(|state| state.operation_loading = false);
            return Ok(None);
        };
        merged.apply(&patch);

        let saved = if merged.is_local() {
            merged
        } else {
            match self.gateway.update(&merged).await {
                Ok(saved) => saved,
                Err(err) => return Err(self.fail_operation("update", err)),
            }
        };

        let mut applied = None;
        self.modify(|state| {
            state.operation_loading = false;
            if let Some(slot) = state.items.iter_mut().find(|r| r.id() == id) {
                let mut next = saved;
                if slot.is_local() {
                    next.mark_local(id);
                }
                *slot = next.clone();
                applied = Some(next);
            }
        });
        Ok(applied)
    }

    /// Удаляет запись `id`. Повторное удаление не является ошибкой.
    pub async fn delete(&self, id: i64) -> StateResult<()> {
        self.begin_operation();

        let local = self.read(|state| state.items.iter().any(|r| r.id() == id && r.is_local()));
        if !local {
            if let Err(err) = self.gateway.delete(id).await {
                return Err(self.fail_operation("delete", err));
            }
        }

        self.modify(|state| {
            state.operation_loading = false;
            state.items.retain(|r| r.id() != id);
        });
        debug!(collection = E::COLLECTION, id, local, "record deleted");
        Ok(())
    }

    pub fn set_search_query(&self, value: impl Into<String>) {
        let value = value.into();
        self.modify(|state| {
            state.search_query = value;
            state.ext.on_search_changed();
        });
    }

    pub fn clear_error(&self) {
        self.modify(|state| state.error = None);
    }

    fn begin_operation(&self) {
        self.modify(|state| {
            state.operation_loading = true;
            state.error = None;
        });
    }

    fn fail_operation(&self, action: &str, err: DashboardClientError) -> StateError {
        let message = failure_message(&err, || format!("Failed to {action} {}", E::NOUN));
        warn!(collection = E::COLLECTION, action, error = %message, "operation failed");
        self.modify(|state| {
            state.operation_loading = false;
            state.error = Some(message);
        });
        err.into()
    }
}

impl<E: Entity> Store<E, Pagination> {
    pub fn set_current_page(&self, page: u32) {
        self.modify(|state| state.ext.current_page = page.max(1));
    }

    pub fn set_items_per_page(&self, items_per_page: u32) {
        self.modify(|state| {
            state.ext.items_per_page = items_per_page.max(1);
            state.ext.current_page = 1;
        });
    }
}

impl<E: Entity> Store<E, TodoFilter> {
    pub fn set_filter(&self, filter: TodoFilter) {
        self.modify(|state| state.ext = filter);
    }
}

/// Сообщение ошибки, либо фиксированный текст, если сообщение пустое.
fn failure_message(err: &impl Display, fallback: impl FnOnce() -> String) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use dashboard_client::{DashboardClientResult, NewPost, NewTodo};

    use super::*;
    use crate::entity::{PostPatch, TodoPatch};

    #[derive(Default)]
    struct FakePostGateway {
        fetch_result: Mutex<Vec<Post>>,
        fail_with: Mutex<Option<String>>,
        update_calls: Mutex<Vec<Post>>,
        delete_calls: Mutex<Vec<i64>>,
    }

    impl FakePostGateway {
        fn failing(message: &str) -> Self {
            let fake = Self::default();
            *fake.fail_with.lock().expect("fail_with mutex poisoned") = Some(message.to_string());
            fake
        }

        fn check(&self) -> DashboardClientResult<()> {
            match self.fail_with.lock().expect("fail_with mutex poisoned").clone() {
                Some(message) => Err(DashboardClientError::InvalidRequest(message)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl Gateway<Post> for FakePostGateway {
        async fn fetch_all(&self) -> DashboardClientResult<Vec<Post>> {
            self.check()?;
            Ok(self
                .fetch_result
                .lock()
                .expect("fetch_result mutex poisoned")
                .clone())
        }

        async fn create(&self, draft: &NewPost) -> DashboardClientResult<Post> {
            self.check()?;
            Ok(Post {
                id: 101,
                user_id: draft.user_id,
                title: draft.title.clone(),
                body: draft.body.clone(),
                is_local: false,
            })
        }

        async fn update(&self, record: &Post) -> DashboardClientResult<Post> {
            self.check()?;
            self.update_calls
                .lock()
                .expect("update_calls mutex poisoned")
                .push(record.clone());
            Ok(record.clone())
        }

        async fn delete(&self, id: i64) -> DashboardClientResult<()> {
            self.check()?;
            self.delete_calls
                .lock()
                .expect("delete_calls mutex poisoned")
                .push(id);
            Ok(())
        }
    }

    struct FakeTodoGateway;

    #[async_trait]
    impl Gateway<Todo> for FakeTodoGateway {
        async fn fetch_all(&self) -> DashboardClientResult<Vec<Todo>> {
            Ok(vec![todo(1, false), todo(2, true)])
        }

        async fn create(&self, draft: &NewTodo) -> DashboardClientResult<Todo> {
            Ok(Todo {
                id: 201,
                user_id: draft.user_id,
                title: draft.title.clone(),
                completed: draft.completed,
            })
        }

        async fn update(&self, record: &Todo) -> DashboardClientResult<Todo> {
            Ok(record.clone())
        }

        async fn delete(&self, _id: i64) -> DashboardClientResult<()> {
            Ok(())
        }
    }

    fn post(id: i64, user_id: i64) -> Post {
        Post {
            id,
            user_id,
            title: format!("title {id}"),
            body: format!("body {id}"),
            is_local: false,
        }
    }

    fn todo(id: i64, completed: bool) -> Todo {
        Todo {
            id,
            user_id: 1,
            title: format!("todo {id}"),
            completed,
        }
    }

    fn draft() -> NewPost {
        NewPost {
            user_id: 1,
            title: "fresh".to_string(),
            body: "fresh body".to_string(),
        }
    }

    fn post_store(gateway: Arc<FakePostGateway>) -> PostStore {
        Store::new(gateway as Arc<dyn Gateway<Post>>)
    }

    #[tokio::test]
    async fn fetch_all_replaces_items_and_clears_loading() {
        let gateway = Arc::new(FakePostGateway::default());
        *gateway.fetch_result.lock().expect("fetch_result mutex poisoned") =
            vec![post(1, 1), post(2, 1)];
        let store = post_store(gateway.clone());

        store.fetch_all().await.expect("fetch must succeed");
        assert_eq!(store.items().len(), 2);
        assert!(!store.is_loading());

        *gateway.fetch_result.lock().expect("fetch_result mutex poisoned") = vec![post(3, 2)];
        store.fetch_all().await.expect("second fetch must succeed");
        let ids: Vec<i64> = store.items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_items_and_records_message() {
        let gateway = Arc::new(FakePostGateway::default());
        *gateway.fetch_result.lock().expect("fetch_result mutex poisoned") = vec![post(1, 1)];
        let store = post_store(gateway.clone());
        store.fetch_all().await.expect("fetch must succeed");

        *gateway.fail_with.lock().expect("fail_with mutex poisoned") =
            Some("Network Error".to_string());
        let err = store.fetch_all().await.expect_err("fetch must fail");

        assert!(matches!(err, StateError::Client(_)));
        assert_eq!(store.error().as_deref(), Some("Network Error"));
        assert!(!store.is_loading());
        assert_eq!(store.items().len(), 1);
    }

    #[tokio::test]
    async fn blank_error_message_uses_fallback() {
        let store = post_store(Arc::new(FakePostGateway::failing("")));

        store.fetch_all().await.expect_err("fetch must fail");
        assert_eq!(store.error().as_deref(), Some("Failed to fetch posts"));

        store.create(draft()).await.expect_err("create must fail");
        assert_eq!(store.error().as_deref(), Some("Failed to create post"));
    }

    #[tokio::test]
    async fn create_assigns_local_id_and_prepends() {
        let gateway = Arc::new(FakePostGateway::default());
        *gateway.fetch_result.lock().expect("fetch_result mutex poisoned") =
            vec![post(1, 1), post(100, 2)];
        let store = post_store(gateway);
        store.fetch_all().await.expect("fetch must succeed");

        let first = store.create(draft()).await.expect("create must succeed");
        let second = store.create(draft()).await.expect("create must succeed");

        assert_eq!(first.id, 1000);
        assert_eq!(second.id, 1001);
        assert!(first.is_local && second.is_local);

        let items = store.items();
        assert_eq!(items[0].id, 1001);
        assert_eq!(items[1].id, 1000);
        assert!(!store.is_operation_loading());
    }

    #[tokio::test]
    async fn create_failure_leaves_items_unchanged() {
        let store = post_store(Arc::new(FakePostGateway::failing("Request failed")));

        store.create(draft()).await.expect_err("create must fail");
        assert!(store.is_empty());
        assert_eq!(store.error().as_deref(), Some("Request failed"));
        assert!(!store.is_operation_loading());
    }

    #[tokio::test]
    async fn update_of_local_post_bypasses_gateway() {
        let gateway = Arc::new(FakePostGateway::default());
        let store = post_store(gateway.clone());
        let created = store.create(draft()).await.expect("create must succeed");

        let patch = PostPatch {
            title: Some("edited".to_string()),
            ..PostPatch::default()
        };
        let updated = store
            .update(created.id, patch)
            .await
            .expect("update must succeed")
            .expect("record must exist");

        assert_eq!(updated.title, "edited");
        assert!(updated.is_local);
        assert_eq!(store.items()[0].title, "edited");
        assert!(
            gateway
                .update_calls
                .lock()
                .expect("update_calls mutex poisoned")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn update_of_remote_post_sends_merged_record() {
        let gateway = Arc::new(FakePostGateway::default());
        *gateway.fetch_result.lock().expect("fetch_result mutex poisoned") = vec![post(7, 3)];
        let store = post_store(gateway.clone());
        store.fetch_all().await.expect("fetch must succeed");

        let patch = PostPatch {
            body: Some("new body".to_string()),
            ..PostPatch::default()
        };
        store.update(7, patch).await.expect("update must succeed");

        let calls = gateway
            .update_calls
            .lock()
            .expect("update_calls mutex poisoned")
            .clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].title, "title 7");
        assert_eq!(calls[0].body, "new body");
        assert_eq!(store.items()[0].body, "new body");
    }

    #[tokio::test]
    async fn update_failure_records_error_and_keeps_record() {
        let gateway = Arc::new(FakePostGateway::default());
        *gateway.fetch_result.lock().expect("fetch_result mutex poisoned") = vec![post(7, 3)];
        let store = post_store(gateway.clone());
        store.fetch_all().await.expect("fetch must succeed");

        *gateway.fail_with.lock().expect("fail_with mutex poisoned") =
            Some("Request failed with status code 500".to_string());
        let patch = PostPatch {
            title: Some("edited".to_string()),
            ..PostPatch::default()
        };
        let err = store.update(7, patch).await.expect_err("update must fail");

        assert!(matches!(err, StateError::Client(_)));
        assert_eq!(store.items()[0].title, "title 7");
        assert_eq!(
            store.error().as_deref(),
            Some("Request failed with status code 500")
        );
        assert!(!store.is_operation_loading());
    }

    #[tokio::test]
    async fn update_of_missing_record_is_noop() {
        let gateway = Arc::new(FakePostGateway::default());
        let store = post_store(gateway.clone());

        let result = store
            .update(55, PostPatch::default())
            .await
            .expect("missing record is not an error");

        assert!(result.is_none());
        assert!(store.error().is_none());
        assert!(!store.is_operation_loading());
    }

    #[tokio::test]
    async fn delete_of_absent_post_is_not_an_error() {
        let gateway = Arc::new(FakePostGateway::default());
        *gateway.fetch_result.lock().expect("fetch_result mutex poisoned") = vec![post(1, 1)];
        let store = post_store(gateway);
        store.fetch_all().await.expect("fetch must succeed");

        store.delete(42).await.expect("delete must succeed");

        assert_eq!(store.items().len(), 1);
        assert!(store.error().is_none());
        assert!(!store.is_operation_loading());
    }

    #[tokio::test]
    async fn delete_of_local_post_bypasses_gateway() {
        let gateway = Arc::new(FakePostGateway::default());
        let store = post_store(gateway.clone());
        let created = store.create(draft()).await.expect("create must succeed");

        store.delete(created.id).await.expect("delete must succeed");

        assert!(store.is_empty());
        assert!(
            gateway
                .delete_calls
                .lock()
                .expect("delete_calls mutex poisoned")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_failure_keeps_record() {
        let gateway = Arc::new(FakePostGateway::default());
        *gateway.fetch_result.lock().expect("fetch_result mutex poisoned") = vec![post(1, 1)];
        let store = post_store(gateway.clone());
        store.fetch_all().await.expect("fetch must succeed");

        *gateway.fail_with.lock().expect("fail_with mutex poisoned") =
            Some("Request failed with status code 500".to_string());
        store.delete(1).await.expect_err("delete must fail");

        assert_eq!(store.items().len(), 1);
        assert_eq!(
            store.error().as_deref(),
            Some("Request failed with status code 500")
        );
    }

    #[tokio::test]
    async fn clear_error_keeps_data_and_flags() {
        let store = post_store(Arc::new(FakePostGateway::failing("boom")));
        store.fetch_all().await.expect_err("fetch must fail");

        store.clear_error();
        assert!(store.error().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn user_search_resets_page() {
        struct NoUsers;

        #[async_trait]
        impl Gateway<User> for NoUsers {
            async fn fetch_all(&self) -> DashboardClientResult<Vec<User>> {
                Ok(Vec::new())
            }
            async fn create(&self, _draft: &dashboard_client::NewUser) -> DashboardClientResult<User> {
                Err(DashboardClientError::Unsupported("users"))
            }
            async fn update(&self, _record: &User) -> DashboardClientResult<User> {
                Err(DashboardClientError::Unsupported("users"))
            }
            async fn delete(&self, _id: i64) -> DashboardClientResult<()> {
                Err(DashboardClientError::Unsupported("users"))
            }
        }

        let store: UserStore = Store::new(Arc::new(NoUsers) as Arc<dyn Gateway<User>>);
        store.set_items_per_page(5);
        store.set_current_page(3);
        assert_eq!(store.ext().current_page, 3);

        store.set_search_query("lea");
        assert_eq!(store.search_query(), "lea");
        assert_eq!(store.ext().current_page, 1);
        assert_eq!(store.ext().items_per_page, 5);
    }

    #[tokio::test]
    async fn todo_toggle_through_patch() {
        let store: TodoStore = Store::new(Arc::new(FakeTodoGateway) as Arc<dyn Gateway<Todo>>);
        store.fetch_all().await.expect("fetch must succeed");

        let patch = TodoPatch {
            completed: Some(true),
            ..TodoPatch::default()
        };
        let updated = store
            .update(1, patch)
            .await
            .expect("update must succeed")
            .expect("todo must exist");
        assert!(updated.completed);

        let created = store
            .create(NewTodo {
                user_id: 1,
                title: "new".to_string(),
                completed: false,
            })
            .await
            .expect("create must succeed");
        assert_eq!(created.id, 201);
        assert!(!created.is_local());
        assert_eq!(store.items()[0].id, 201);
    }

    #[tokio::test]
    async fn subscribers_see_state_changes() {
        let store = post_store(Arc::new(FakePostGateway::default()));
        let mut rx = store.subscribe();

        store.set_search_query("abc");
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().search_query, "abc");
    }
}
