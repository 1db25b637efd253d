use std::collections::HashMap;

use dashboard_client::{Comment, Post, Todo, User};

use crate::extension::TodoFilter;

/// Запись, которую можно искать по подстроке без учёта регистра.
pub trait Searchable {
    /// `needle` уже приведён к нижнему регистру.
    fn matches(&self, needle: &str) -> bool;
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl Searchable for User {
    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || contains(&self.email, needle)
            || contains(&self.username, needle)
    }
}

impl Searchable for Post {
    fn matches(&self, needle: &str) -> bool {
        contains(&self.title, needle) || contains(&self.body, needle)
    }
}

impl Searchable for Comment {
    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle) || contains(&self.email, needle) || contains(&self.body, needle)
    }
}

/// Отбирает записи, подходящие под запрос. Пустой запрос пропускает всё.
pub fn filter_by_query<T>(items: &[T], query: &str) -> Vec<T>
where
    T: Searchable + Clone,
{
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.matches(&needle))
        .cloned()
        .collect()
}

/// Фильтр задач по статусу и запросу; запрос ищется в заголовке задачи
/// и в имени её владельца.
pub fn filter_todos(todos: &[Todo], users: &[User], filter: TodoFilter, query: &str) -> Vec<Todo> {
    let needle = query.to_lowercase();
    let owner_names: HashMap<i64, String> = if needle.is_empty() {
        HashMap::new()
    } else {
        users
            .iter()
            .map(|user| (user.id, user.name.to_lowercase()))
            .collect()
    };

    todos
        .iter()
        .filter(|todo| filter.matches(todo))
        .filter(|todo| {
            needle.is_empty()
                || contains(&todo.title, &needle)
                || owner_names
                    .get(&todo.user_id)
                    .is_some_and(|name| name.contains(&needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, name: &str, username: &str, email: &str) -> User {
        User {
            id,
            name: name.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            phone: String::new(),
            website: String::new(),
            address: Default::default(),
            company: Default::default(),
        }
    }

    fn todo(id: i64, user_id: i64, title: &str, completed: bool) -> Todo {
        Todo {
            id,
            user_id,
            title: title.to_string(),
            completed,
        }
    }

    #[test]
    fn user_search_is_case_insensitive() {
        let users = vec![
            user(1, "Leanne Graham", "Bret", "Sincere@april.biz"),
            user(2, "Ervin Howell", "Antonette", "Shanna@melissa.tv"),
        ];

        let found = filter_by_query(&users, "LEANNE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);

        let by_username = filter_by_query(&users, "antON");
        assert_eq!(by_username[0].id, 2);

        let by_email = filter_by_query(&users, "april.BIZ");
        assert_eq!(by_email[0].id, 1);
    }

    #[test]
    fn empty_query_keeps_everything() {
        let users = vec![user(1, "A", "a", "a@x"), user(2, "B", "b", "b@x")];
        assert_eq!(filter_by_query(&users, "").len(), 2);
    }

    #[test]
    fn post_search_covers_title_and_body() {
        let posts = vec![
            Post {
                id: 1,
                user_id: 1,
                title: "Rust".to_string(),
                body: "ownership".to_string(),
                is_local: false,
            },
            Post {
                id: 2,
                user_id: 1,
                title: "Other".to_string(),
                body: "Borrowing rules".to_string(),
                is_local: false,
            },
        ];

        assert_eq!(filter_by_query(&posts, "rust")[0].id, 1);
        assert_eq!(filter_by_query(&posts, "BORROW")[0].id, 2);
        assert!(filter_by_query(&posts, "missing").is_empty());
    }

    #[test]
    fn comment_search_covers_email() {
        let comments = vec![Comment {
            id: 1,
            post_id: 1,
            name: "id labore".to_string(),
            email: "Eliseo@gardner.biz".to_string(),
            body: "laudantium".to_string(),
        }];

        assert_eq!(filter_by_query(&comments, "eliseo").len(), 1);
    }

    #[test]
    fn todo_search_matches_owner_name() {
        let users = vec![user(1, "Leanne Graham", "Bret", "l@x"), user(2, "Ervin", "e", "e@x")];
        let todos = vec![
            todo(1, 1, "delectus", false),
            todo(2, 2, "quis ut nam", true),
            todo(3, 9, "graham cracker", true),
        ];

        let found = filter_todos(&todos, &users, TodoFilter::All, "graham");
        let ids: Vec<i64> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn todo_filter_applies_before_search() {
        let users = vec![user(1, "Leanne Graham", "Bret", "l@x")];
        let todos = vec![todo(1, 1, "a", false), todo(2, 1, "b", true), todo(3, 1, "c", true)];

        assert_eq!(filter_todos(&todos, &users, TodoFilter::Completed, "").len(), 2);
        assert_eq!(filter_todos(&todos, &users, TodoFilter::Pending, "").len(), 1);
        assert_eq!(filter_todos(&todos, &users, TodoFilter::Completed, "leanne").len(), 2);
    }
}
