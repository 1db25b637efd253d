use std::fmt::Debug;

use dashboard_client::Todo;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Первый идентификатор, выдаваемый локально созданным записям.
pub const LOCAL_ID_SEED: i64 = 1000;

/// Дополнительное состояние хранилища конкретной коллекции.
///
/// Хуки вызываются внутри мутаций хранилища, под тем же обновлением состояния.
pub trait Extension: Clone + Default + Debug + Send + Sync + 'static {
    fn on_search_changed(&mut self) {}

    fn on_fetched<E: Entity>(&mut self, _items: &[E]) {}

    fn on_created<E: Entity>(&mut self, _record: &mut E) {}
}

impl Extension for () {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Клиентская пагинация списка пользователей.
pub struct Pagination {
    pub current_page: u32,
    pub items_per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            items_per_page: 10,
        }
    }
}

impl Extension for Pagination {
    // новый поисковый запрос делает текущее окно страниц неактуальным
    fn on_search_changed(&mut self) {
        self.current_page = 1;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Фильтр задач по статусу.
pub enum TodoFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl TodoFilter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Completed => todo.completed,
            Self::Pending => !todo.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }
}

impl Extension for TodoFilter {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Счётчик локальных идентификаторов для записей, созданных в сессии.
///
/// Следующий идентификатор всегда больше любого уже виденного: и загруженного
/// с сервера, и выданного ранее.
pub struct LocalIds {
    next_id: i64,
}

impl LocalIds {
    pub fn next_id(&self) -> i64 {
        self.next_id
    }
}

impl Default for LocalIds {
    fn default() -> Self {
        Self {
            next_id: LOCAL_ID_SEED,
        }
    }
}

impl Extension for LocalIds {
    fn on_fetched<E: Entity>(&mut self, items: &[E]) {
        if let Some(max_id) = items.iter().map(Entity::id).max() {
            self.next_id = self.next_id.max(max_id.saturating_add(1));
        }
    }

    fn on_created<E: Entity>(&mut self, record: &mut E) {
        record.mark_local(self.next_id);
        self.next_id += 1;
    }
}
