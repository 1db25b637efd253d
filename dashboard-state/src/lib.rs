//! Клиентское состояние аналитической панели.
//!
//! Четыре хранилища (пользователи, посты, комментарии, задачи) поверх
//! `Gateway`, фасад `Dashboard` с производными данными и отложенным поиском,
//! а также сохранение пользовательских настроек между запусками.

pub mod aggregate;
pub mod dashboard;
pub mod debounce;
pub mod entity;
pub mod error;
pub mod extension;
pub mod forms;
pub mod gateway;
pub mod pagination;
pub mod persistence;
pub mod search;
pub mod store;

pub use aggregate::{
    ActivitySortKey, ChartPoint, CompletionPoint, SortDirection, Stats, UserActivity,
};
pub use dashboard::{Dashboard, Overview, Stores};
pub use debounce::Debounced;
pub use entity::{Entity, PostPatch, ReadOnly, TodoPatch, UserPatch};
pub use error::{StateError, StateResult};
pub use extension::{LocalIds, Pagination, TodoFilter};
pub use forms::PostForm;
pub use gateway::Gateway;
pub use pagination::{Page, PageMarker};
pub use persistence::{
    FileStorage, MemoryStorage, PersistedState, PreferenceStorage, PreferenceSync,
};
pub use store::{CommentStore, PostStore, Store, StoreState, TodoStore, UserStore};
