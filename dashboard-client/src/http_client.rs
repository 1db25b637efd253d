use reqwest::{Client, Method};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{DashboardClientError, DashboardClientResult};
use crate::models::{Comment, NewPost, NewTodo, NewUser, Post, Todo, User};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostsByUserQuery {
    user_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentsByPostQuery {
    post_id: i64,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST-ресурса с коллекциями users/posts/comments/todos.
pub struct DashboardClient {
    base_url: String,
    client: Client,
}

impl DashboardClient {
    /// Создаёт клиент с базовым URL и таймаутами по умолчанию (5 с / 15 с).
    pub fn new(base_url: impl Into<String>) -> DashboardClientResult<Self> {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Создаёт клиент с явными таймаутами подключения и запроса.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> DashboardClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Базовый URL ресурса.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response) -> DashboardClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error.or(body.message),
            Err(_) => None,
        };
        DashboardClientError::from_http_status(status, message)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> DashboardClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(DashboardClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn get_json<TRes>(&self, path: &str) -> DashboardClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let request = self.client.request(Method::GET, self.endpoint(path));
        self.execute(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(DashboardClientError::from_reqwest)
    }

    async fn get_json_with_query<TQuery, TRes>(
        &self,
        path: &str,
        query: &TQuery,
    ) -> DashboardClientResult<TRes>
    where
        TQuery: Serialize,
        TRes: DeserializeOwned,
    {
        let request = self
            .client
            .request(Method::GET, self.endpoint(path))
            .query(query);
        self.execute(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(DashboardClientError::from_reqwest)
    }

    /// универсальный helper для отправки запросов с json-payload
    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
    ) -> DashboardClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        let request = self.client.request(method, self.endpoint(path)).json(body);
        self.execute(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(DashboardClientError::from_reqwest)
    }

    async fn delete(&self, path: &str) -> DashboardClientResult<()> {
        let request = self.client.request(Method::DELETE, self.endpoint(path));
        self.execute(request).await?;
        Ok(())
    }

    /// `GET /users`
    pub async fn list_users(&self) -> DashboardClientResult<Vec<User>> {
        self.get_json("/users").await
    }

    /// `GET /users/:id`
    pub async fn get_user(&self, id: i64) -> DashboardClientResult<User> {
        self.get_json(&format!("/users/{id}")).await
    }

    /// `POST /users`
    pub async fn create_user(&self, user: &NewUser) -> DashboardClientResult<User> {
        self.send_json(Method::POST, "/users", user).await
    }

    /// `PUT /users/:id` с полной записью пользователя.
    pub async fn update_user(&self, user: &User) -> DashboardClientResult<User> {
        self.send_json(Method::PUT, &format!("/users/{}", user.id), user)
            .await
    }

    /// `DELETE /users/:id`
    pub async fn delete_user(&self, id: i64) -> DashboardClientResult<()> {
        self.delete(&format!("/users/{id}")).await
    }

    /// `GET /posts`
    pub async fn list_posts(&self) -> DashboardClientResult<Vec<Post>> {
        self.get_json("/posts").await
    }

    /// `GET /posts?userId=<id>`
    pub async fn posts_by_user(&self, user_id: i64) -> DashboardClientResult<Vec<Post>> {
        self.get_json_with_query("/posts", &PostsByUserQuery { user_id })
            .await
    }

    /// `GET /posts/:id`
    pub async fn get_post(&self, id: i64) -> DashboardClientResult<Post> {
        self.get_json(&format!("/posts/{id}")).await
    }

    /// `POST /posts`
    ///
    /// Идентификатор в ответе назначает сервер.
    pub async fn create_post(&self, post: &NewPost) -> DashboardClientResult<Post> {
        self.send_json(Method::POST, "/posts", post).await
    }

    /// `PUT /posts/:id` с полной записью поста.
    pub async fn update_post(&self, post: &Post) -> DashboardClientResult<Post> {
        self.send_json(Method::PUT, &format!("/posts/{}", post.id), post)
            .await
    }

    /// `DELETE /posts/:id`
    pub async fn delete_post(&self, id: i64) -> DashboardClientResult<()> {
        self.delete(&format!("/posts/{id}")).await
    }

    /// `GET /comments`
    pub async fn list_comments(&self) -> DashboardClientResult<Vec<Comment>> {
        self.get_json("/comments").await
    }

    /// `GET /comments/:id`
    pub async fn get_comment(&self, id: i64) -> DashboardClientResult<Comment> {
        self.get_json(&format!("/comments/{id}")).await
    }

    /// `GET /comments?postId=<id>`
    pub async fn comments_by_post(&self, post_id: i64) -> DashboardClientResult<Vec<Comment>> {
        self.get_json_with_query("/comments", &CommentsByPostQuery { post_id })
            .await
    }

    /// `GET /todos`
    pub async fn list_todos(&self) -> DashboardClientResult<Vec<Todo>> {
        self.get_json("/todos").await
    }

    /// `GET /todos/:id`
    pub async fn get_todo(&self, id: i64) -> DashboardClientResult<Todo> {
        self.get_json(&format!("/todos/{id}")).await
    }

    /// `POST /todos`
    pub async fn create_todo(&self, todo: &NewTodo) -> DashboardClientResult<Todo> {
        self.send_json(Method::POST, "/todos", todo).await
    }

    /// `PUT /todos/:id` с полной записью задачи.
    pub async fn update_todo(&self, todo: &Todo) -> DashboardClientResult<Todo> {
        self.send_json(Method::PUT, &format!("/todos/{}", todo.id), todo)
            .await
    }

    /// `DELETE /todos/:id`
    pub async fn delete_todo(&self, id: i64) -> DashboardClientResult<()> {
        self.delete(&format!("/todos/{id}")).await
    }
}
