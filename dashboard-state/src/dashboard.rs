use std::sync::Arc;
use std::time::Duration;

use dashboard_client::{Comment, NewPost, NewTodo, Post, Todo, User};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{self, ChartPoint, CompletionPoint, Stats, UserActivity};
use crate::debounce::{Debounced, SEARCH_DEBOUNCE};
use crate::entity::{Entity, PostPatch, TodoPatch};
use crate::error::StateResult;
use crate::extension::{Extension, TodoFilter};
use crate::forms::PostForm;
use crate::gateway::Gateway;
use crate::pagination::{Page, paginate};
use crate::search::{filter_by_query, filter_todos};
use crate::store::{CommentStore, PostStore, Store, TodoStore, UserStore};

/// Набор из четырёх хранилищ панели.
///
/// Передаётся явно всем, кому нужен доступ к состоянию.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<UserStore>,
    pub posts: Arc<PostStore>,
    pub comments: Arc<CommentStore>,
    pub todos: Arc<TodoStore>,
}

impl Stores {
    /// Создаёт хранилища поверх одного источника данных для всех коллекций.
    pub fn new<G>(gateway: Arc<G>) -> Self
    where
        G: Gateway<User> + Gateway<Post> + Gateway<Comment> + Gateway<Todo> + 'static,
    {
        let users: Arc<dyn Gateway<User>> = gateway.clone();
        let posts: Arc<dyn Gateway<Post>> = gateway.clone();
        let comments: Arc<dyn Gateway<Comment>> = gateway.clone();
        let todos: Arc<dyn Gateway<Todo>> = gateway;

        Self {
            users: Arc::new(Store::new(users)),
            posts: Arc::new(Store::new(posts)),
            comments: Arc::new(Store::new(comments)),
            todos: Arc::new(Store::new(todos)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Всё, что показывает обзорная страница.
pub struct Overview {
    pub stats: Stats,
    pub completion_rate: u32,
    pub posts_per_user: Vec<ChartPoint>,
    pub todo_completion_per_user: Vec<CompletionPoint>,
    pub user_activities: Vec<UserActivity>,
}

/// Единый фасад над хранилищами: производные данные и действия.
///
/// Собственного изменяемого состояния у фасада нет. Отложенные поисковые
/// запросы следуют за `search_query` хранилищ, кто бы его ни менял.
/// Все производные значения считаются при чтении.
pub struct Dashboard {
    stores: Stores,
    user_search: Debounced<String>,
    post_search: Debounced<String>,
    comment_search: Debounced<String>,
    todo_search: Debounced<String>,
}

impl Dashboard {
    pub fn new(stores: Stores) -> Self {
        Self::with_search_delay(stores, SEARCH_DEBOUNCE)
    }

    /// Поисковые запросы, уже лежащие в хранилищах (например, восстановленные
    /// настройки), применяются сразу, без задержки.
    pub fn with_search_delay(stores: Stores, delay: Duration) -> Self {
        Self {
            user_search: follow_search(&stores.users, delay),
            post_search: follow_search(&stores.posts, delay),
            comment_search: follow_search(&stores.comments, delay),
            todo_search: follow_search(&stores.todos, delay),
            stores,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Загружает только пустые коллекции, параллельно.
    pub async fn load(&self) {
        tokio::join!(
            backfill(&self.stores.users),
            backfill(&self.stores.posts),
            backfill(&self.stores.comments),
            backfill(&self.stores.todos),
        );
    }

    /// Сбрасывает ошибки и перезагружает все четыре коллекции.
    pub async fn retry(&self) {
        self.clear_errors();
        debug!("retrying every collection");

        // ошибки уже записаны в состояние хранилищ
        let _ = tokio::join!(
            self.stores.users.fetch_all(),
            self.stores.posts.fetch_all(),
            self.stores.comments.fetch_all(),
            self.stores.todos.fetch_all(),
        );
    }

    pub fn clear_errors(&self) {
        self.stores.users.clear_error();
        self.stores.posts.clear_error();
        self.stores.comments.clear_error();
        self.stores.todos.clear_error();
    }

    /// Первая ошибка в порядке: пользователи, посты, комментарии, задачи.
    pub fn error(&self) -> Option<String> {
        self.stores
            .users
            .error()
            .or_else(|| self.stores.posts.error())
            .or_else(|| self.stores.comments.error())
            .or_else(|| self.stores.todos.error())
    }

    pub fn is_loading(&self) -> bool {
        self.stores.users.is_loading()
            || self.stores.posts.is_loading()
            || self.stores.comments.is_loading()
            || self.stores.todos.is_loading()
    }

    pub fn is_mutating(&self) -> bool {
        self.stores.posts.is_operation_loading() || self.stores.todos.is_operation_loading()
    }

    pub fn stats(&self) -> Stats {
        aggregate::stats(
            &self.stores.users.items(),
            &self.stores.posts.items(),
            &self.stores.comments.items(),
            &self.stores.todos.items(),
        )
    }

    pub fn posts_per_user(&self) -> Vec<ChartPoint> {
        aggregate::posts_per_user(&self.stores.users.items(), &self.stores.posts.items())
    }

    pub fn todo_completion_per_user(&self) -> Vec<CompletionPoint> {
        aggregate::todo_completion_per_user(&self.stores.users.items(), &self.stores.todos.items())
    }

    pub fn user_activities(&self) -> Vec<UserActivity> {
        aggregate::user_activities(
            &self.stores.users.items(),
            &self.stores.posts.items(),
            &self.stores.comments.items(),
            &self.stores.todos.items(),
        )
    }

    pub fn overview(&self) -> Overview {
        let users = self.stores.users.items();
        let posts = self.stores.posts.items();
        let comments = self.stores.comments.items();
        let todos = self.stores.todos.items();

        let stats = aggregate::stats(&users, &posts, &comments, &todos);
        Overview {
            completion_rate: aggregate::completion_rate(stats.completed_todos, stats.total_todos),
            stats,
            posts_per_user: aggregate::posts_per_user(&users, &posts),
            todo_completion_per_user: aggregate::todo_completion_per_user(&users, &todos),
            user_activities: aggregate::user_activities(&users, &posts, &comments, &todos),
        }
    }

    pub fn filtered_users(&self) -> Vec<User> {
        filter_by_query(&self.stores.users.items(), &self.user_search.current())
    }

    /// Текущая страница отфильтрованных пользователей.
    pub fn paginated_users(&self) -> Page<User> {
        let pagination = self.stores.users.ext();
        paginate(
            &self.filtered_users(),
            pagination.current_page,
            pagination.items_per_page,
        )
    }

    pub fn filtered_posts(&self) -> Vec<Post> {
        filter_by_query(&self.stores.posts.items(), &self.post_search.current())
    }

    pub fn filtered_comments(&self) -> Vec<Comment> {
        filter_by_query(&self.stores.comments.items(), &self.comment_search.current())
    }

    pub fn filtered_todos(&self) -> Vec<Todo> {
        filter_todos(
            &self.stores.todos.items(),
            &self.stores.users.items(),
            self.stores.todos.ext(),
            &self.todo_search.current(),
        )
    }

    /// Имя автора; для неизвестного пользователя `User <id>`.
    pub fn user_name(&self, user_id: i64) -> String {
        self.stores
            .users
            .read(|state| {
                state
                    .items
                    .iter()
                    .find(|user| user.id == user_id)
                    .map(|user| user.name.clone())
            })
            .unwrap_or_else(|| format!("User {user_id}"))
    }

    pub fn search_users(&self, query: &str) {
        self.stores.users.set_search_query(query);
    }

    pub fn search_posts(&self, query: &str) {
        self.stores.posts.set_search_query(query);
    }

    pub fn search_comments(&self, query: &str) {
        self.stores.comments.set_search_query(query);
    }

    pub fn search_todos(&self, query: &str) {
        self.stores.todos.set_search_query(query);
    }

    /// Применяет текущие запросы хранилищ, не дожидаясь паузы.
    pub fn flush_search(&self) {
        settle(&self.user_search, self.stores.users.search_query());
        settle(&self.post_search, self.stores.posts.search_query());
        settle(&self.comment_search, self.stores.comments.search_query());
        settle(&self.todo_search, self.stores.todos.search_query());
    }

    pub fn set_todo_filter(&self, filter: TodoFilter) {
        self.stores.todos.set_filter(filter);
    }

    pub fn set_user_page(&self, page: u32) {
        self.stores.users.set_current_page(page);
    }

    pub fn set_users_per_page(&self, items_per_page: u32) {
        self.stores.users.set_items_per_page(items_per_page);
    }

    pub async fn create_post(&self, draft: NewPost) -> StateResult<Post> {
        self.stores.posts.create(draft).await
    }

    /// Проверяет форму и создаёт пост. Невалидная форма до сети не доходит.
    pub async fn submit_post(&self, form: PostForm) -> StateResult<Post> {
        let draft = form.into_draft()?;
        self.create_post(draft).await
    }

    /// Проверяет форму и применяет её к посту `id`.
    pub async fn submit_post_edit(&self, id: i64, form: PostForm) -> StateResult<Option<Post>> {
        let patch = form.into_patch()?;
        self.update_post(id, patch).await
    }

    pub async fn update_post(&self, id: i64, patch: PostPatch) -> StateResult<Option<Post>> {
        self.stores.posts.update(id, patch).await
    }

    pub async fn delete_post(&self, id: i64) -> StateResult<()> {
        self.stores.posts.delete(id).await
    }

    pub async fn create_todo(&self, draft: NewTodo) -> StateResult<Todo> {
        self.stores.todos.create(draft).await
    }

    pub async fn update_todo(&self, id: i64, patch: TodoPatch) -> StateResult<Option<Todo>> {
        self.stores.todos.update(id, patch).await
    }

    /// Переключает `completed`. Для отсутствующей задачи ничего не делает.
    pub async fn toggle_todo(&self, id: i64) -> StateResult<Option<Todo>> {
        let completed = self.stores.todos.read(|state| {
            state
                .items
                .iter()
                .find(|todo| todo.id == id)
                .map(|todo| todo.completed)
        });
        let Some(completed) = completed else {
            return Ok(None);
        };

        let patch = TodoPatch {
            completed: Some(!completed),
            ..TodoPatch::default()
        };
        self.update_todo(id, patch).await
    }

    pub async fn delete_todo(&self, id: i64) -> StateResult<()> {
        self.stores.todos.delete(id).await
    }
}

fn follow_search<E: Entity, X: Extension>(store: &Store<E, X>, delay: Duration) -> Debounced<String> {
    Debounced::follow(store.subscribe(), delay, |state| state.search_query.clone())
}

fn settle(search: &Debounced<String>, query: String) {
    search.set(query);
    search.flush();
}

async fn backfill<E: Entity, X: Extension>(store: &Store<E, X>) {
    if !store.is_empty() {
        debug!(collection = E::COLLECTION, "collection already loaded");
        return;
    }
    // ошибка уже записана в состояние хранилища
    let _ = store.fetch_all().await;
}
