//! Клиентская библиотека для REST-ресурса аналитической панели.
//!
//! Ресурс отдаёт четыре коллекции (`/users`, `/posts`, `/comments`, `/todos`)
//! со стандартной CRUD-семантикой. Клиент (`DashboardClient`) работает поверх
//! `reqwest` и возвращает типизированные модели либо `DashboardClientError`.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{DashboardClientError, DashboardClientResult};
pub use http_client::DashboardClient;
pub use models::{Address, Comment, Company, Geo, NewPost, NewTodo, NewUser, Post, Todo, User};
