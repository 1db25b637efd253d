use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Географические координаты адреса.
pub struct Geo {
    /// Широта.
    pub lat: String,
    /// Долгота.
    pub lng: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Почтовый адрес пользователя.
pub struct Address {
    /// Улица.
    pub street: String,
    /// Квартира/офис.
    pub suite: String,
    /// Город.
    pub city: String,
    /// Почтовый индекс.
    pub zipcode: String,
    /// Координаты.
    pub geo: Geo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Компания, в которой работает пользователь.
pub struct Company {
    /// Название компании.
    pub name: String,
    /// Слоган.
    pub catch_phrase: String,
    /// Описание деятельности.
    pub bs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Полное имя.
    pub name: String,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Телефон.
    #[serde(default)]
    pub phone: String,
    /// Сайт.
    #[serde(default)]
    pub website: String,
    /// Адрес.
    #[serde(default)]
    pub address: Address,
    /// Компания.
    #[serde(default)]
    pub company: Company,
}

impl User {
    /// Первое слово имени (для подписей на графиках).
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Идентификатор автора (может ссылаться на несуществующего пользователя).
    pub user_id: i64,
    /// Заголовок.
    pub title: String,
    /// Текст.
    pub body: String,
    /// Пост создан в текущей сессии и неизвестен удалённому API.
    #[serde(skip)]
    pub is_local: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель комментария.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Идентификатор поста.
    pub post_id: i64,
    /// Тема комментария.
    pub name: String,
    /// Email автора.
    pub email: String,
    /// Текст.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель задачи.
pub struct Todo {
    /// Идентификатор задачи.
    pub id: i64,
    /// Идентификатор владельца.
    pub user_id: i64,
    /// Заголовок.
    pub title: String,
    /// Выполнена ли задача.
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Данные для создания пользователя.
pub struct NewUser {
    /// Полное имя.
    pub name: String,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Телефон.
    pub phone: String,
    /// Сайт.
    pub website: String,
    /// Адрес.
    pub address: Address,
    /// Компания.
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Данные для создания поста.
pub struct NewPost {
    /// Идентификатор автора.
    pub user_id: i64,
    /// Заголовок.
    pub title: String,
    /// Текст.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Данные для создания задачи.
pub struct NewTodo {
    /// Идентификатор владельца.
    pub user_id: i64,
    /// Заголовок.
    pub title: String,
    /// Выполнена ли задача.
    #[serde(default)]
    pub completed: bool,
}
