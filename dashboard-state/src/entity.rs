use std::fmt::Debug;

use dashboard_client::{Comment, NewPost, NewTodo, NewUser, Post, Todo, User};

/// Тип без значений: черновик/патч для коллекций только на чтение.
///
/// Операции записи над такими коллекциями невозможно вызвать.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOnly {}

/// Запись одной из коллекций панели.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Данные для создания (запись без `id`).
    type Draft: Debug + Send + Sync;
    /// Набор изменяемых полей.
    type Patch: Debug + Send + Sync;

    /// Имя коллекции во множественном числе (`users`, `posts`, ...).
    const COLLECTION: &'static str;
    /// Имя одной записи (`user`, `post`, ...).
    const NOUN: &'static str;

    fn id(&self) -> i64;

    fn apply(&mut self, patch: &Self::Patch);

    /// Запись создана в текущей сессии и неизвестна удалённому ресурсу.
    fn is_local(&self) -> bool {
        false
    }

    /// Назначает локальный идентификатор и помечает запись локальной.
    ///
    /// Для коллекций без локальных записей ничего не делает.
    fn mark_local(&mut self, _id: i64) {}
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Изменяемые поля пользователя.
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Изменяемые поля поста.
pub struct PostPatch {
    pub user_id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Изменяемые поля задачи.
pub struct TodoPatch {
    pub user_id: Option<i64>,
    pub title: Option<String>,
    pub completed: Option<bool>,
}

fn assign<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

impl Entity for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";
    const NOUN: &'static str = "user";

    fn id(&self) -> i64 {
        self.id
    }

    fn apply(&mut self, patch: &UserPatch) {
        assign(&mut self.name, &patch.name);
        assign(&mut self.username, &patch.username);
        assign(&mut self.email, &patch.email);
        assign(&mut self.phone, &patch.phone);
        assign(&mut self.website, &patch.website);
    }
}

impl Entity for Post {
    type Draft = NewPost;
    type Patch = PostPatch;

    const COLLECTION: &'static str = "posts";
    const NOUN: &'static str = "post";

    fn id(&self) -> i64 {
        self.id
    }

    fn apply(&mut self, patch: &PostPatch) {
        assign(&mut self.user_id, &patch.user_id);
        assign(&mut self.title, &patch.title);
        assign(&mut self.body, &patch.body);
    }

    fn is_local(&self) -> bool {
        self.is_local
    }

    fn mark_local(&mut self, id: i64) {
        self.id = id;
        self.is_local = true;
    }
}

impl Entity for Comment {
    type Draft = ReadOnly;
    type Patch = ReadOnly;

    const COLLECTION: &'static str = "comments";
    const NOUN: &'static str = "comment";

    fn id(&self) -> i64 {
        self.id
    }

    fn apply(&mut self, patch: &ReadOnly) {
        match *patch {}
    }
}

impl Entity for Todo {
    type Draft = NewTodo;
    type Patch = TodoPatch;

    const COLLECTION: &'static str = "todos";
    const NOUN: &'static str = "todo";

    fn id(&self) -> i64 {
        self.id
    }

    fn apply(&mut self, patch: &TodoPatch) {
        assign(&mut self.user_id, &patch.user_id);
        assign(&mut self.title, &patch.title);
        assign(&mut self.completed, &patch.completed);
    }
}
