use async_trait::async_trait;
use dashboard_client::{
    Comment, DashboardClient, DashboardClientError, DashboardClientResult, Post, Todo, User,
};

use crate::entity::{Entity, ReadOnly};

/// Источник данных одной коллекции.
///
/// Хранилища работают только через этот трейт, поэтому в тестах вместо
/// HTTP-клиента подставляются фейки.
#[async_trait]
pub trait Gateway<E: Entity>: Send + Sync {
    async fn fetch_all(&self) -> DashboardClientResult<Vec<E>>;
    async fn create(&self, draft: &E::Draft) -> DashboardClientResult<E>;
    /// Отправляет полную (уже смерженную) запись.
    async fn update(&self, record: &E) -> DashboardClientResult<E>;
    async fn delete(&self, id: i64) -> DashboardClientResult<()>;
}

#[async_trait]
impl Gateway<User> for DashboardClient {
    async fn fetch_all(&self) -> DashboardClientResult<Vec<User>> {
        self.list_users().await
    }

    async fn create(&self, draft: &dashboard_client::NewUser) -> DashboardClientResult<User> {
        self.create_user(draft).await
    }

    async fn update(&self, record: &User) -> DashboardClientResult<User> {
        self.update_user(record).await
    }

    async fn delete(&self, id: i64) -> DashboardClientResult<()> {
        self.delete_user(id).await
    }
}

#[async_trait]
impl Gateway<Post> for DashboardClient {
    async fn fetch_all(&self) -> DashboardClientResult<Vec<Post>> {
        self.list_posts().await
    }

    async fn create(&self, draft: &dashboard_client::NewPost) -> DashboardClientResult<Post> {
        self.create_post(draft).await
    }

    async fn update(&self, record: &Post) -> DashboardClientResult<Post> {
        self.update_post(record).await
    }

    async fn delete(&self, id: i64) -> DashboardClientResult<()> {
        self.delete_post(id).await
    }
}

#[async_trait]
impl Gateway<Comment> for DashboardClient {
    async fn fetch_all(&self) -> DashboardClientResult<Vec<Comment>> {
        self.list_comments().await
    }

    async fn create(&self, draft: &ReadOnly) -> DashboardClientResult<Comment> {
        match *draft {}
    }

    async fn update(&self, _record: &Comment) -> DashboardClientResult<Comment> {
        Err(DashboardClientError::Unsupported(Comment::COLLECTION))
    }

    async fn delete(&self, _id: i64) -> DashboardClientResult<()> {
        Err(DashboardClientError::Unsupported(Comment::COLLECTION))
    }
}

#[async_trait]
impl Gateway<Todo> for DashboardClient {
    async fn fetch_all(&self) -> DashboardClientResult<Vec<Todo>> {
        self.list_todos().await
    }

    async fn create(&self, draft: &dashboard_client::NewTodo) -> DashboardClientResult<Todo> {
        self.create_todo(draft).await
    }

    async fn update(&self, record: &Todo) -> DashboardClientResult<Todo> {
        self.update_todo(record).await
    }

    async fn delete(&self, id: i64) -> DashboardClientResult<()> {
        self.delete_todo(id).await
    }
}
