//! Производные показатели панели.
//!
//! Все функции чистые: результат зависит только от переданных коллекций,
//! поэтому повторный расчёт на тех же данных даёт тот же ответ.

use std::cmp::Ordering;
use std::collections::HashMap;

use dashboard_client::{Comment, Post, Todo, User};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_users: usize,
    pub total_posts: usize,
    pub total_comments: usize,
    pub total_todos: usize,
    pub completed_todos: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Точка столбчатой диаграммы.
pub struct ChartPoint {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionPoint {
    pub name: String,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Активность одного пользователя по всем коллекциям.
pub struct UserActivity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub posts: usize,
    pub comments: usize,
    pub todos: usize,
    pub completed_todos: usize,
}

impl UserActivity {
    /// Доля выполненных задач, 0 при отсутствии задач.
    pub fn completion_ratio(&self) -> f64 {
        if self.todos == 0 {
            return 0.0;
        }
        self.completed_todos as f64 / self.todos as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySortKey {
    Name,
    Posts,
    Comments,
    Todos,
    CompletionRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Default)]
struct TodoCounts {
    total: usize,
    completed: usize,
}

fn posts_by_user(posts: &[Post]) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for post in posts {
        *counts.entry(post.user_id).or_insert(0) += 1;
    }
    counts
}

fn todos_by_user(todos: &[Todo]) -> HashMap<i64, TodoCounts> {
    let mut counts: HashMap<i64, TodoCounts> = HashMap::new();
    for todo in todos {
        let entry = counts.entry(todo.user_id).or_default();
        entry.total += 1;
        if todo.completed {
            entry.completed += 1;
        }
    }
    counts
}

// comment -> post -> user; комментарии к неизвестным постам не учитываются
fn comments_by_user(posts: &[Post], comments: &[Comment]) -> HashMap<i64, usize> {
    let owners: HashMap<i64, i64> = posts.iter().map(|post| (post.id, post.user_id)).collect();

    let mut counts = HashMap::new();
    for comment in comments {
        if let Some(owner) = owners.get(&comment.post_id) {
            *counts.entry(*owner).or_insert(0) += 1;
        }
    }
    counts
}

pub fn stats(users: &[User], posts: &[Post], comments: &[Comment], todos: &[Todo]) -> Stats {
    Stats {
        total_users: users.len(),
        total_posts: posts.len(),
        total_comments: comments.len(),
        total_todos: todos.len(),
        completed_todos: todos.iter().filter(|todo| todo.completed).count(),
    }
}

/// Количество постов на пользователя, по убыванию.
///
/// Равные значения сохраняют порядок пользователей.
pub fn posts_per_user(users: &[User], posts: &[Post]) -> Vec<ChartPoint> {
    let counts = posts_by_user(posts);

    let mut points: Vec<ChartPoint> = users
        .iter()
        .map(|user| ChartPoint {
            name: user.first_name().to_string(),
            value: counts.get(&user.id).copied().unwrap_or(0),
        })
        .collect();
    points.sort_by(|a, b| b.value.cmp(&a.value));
    points
}

/// Выполненные/все задачи на пользователя, по убыванию выполненных.
pub fn todo_completion_per_user(users: &[User], todos: &[Todo]) -> Vec<CompletionPoint> {
    let counts = todos_by_user(todos);

    let mut points: Vec<CompletionPoint> = users
        .iter()
        .map(|user| {
            let entry = counts.get(&user.id);
            CompletionPoint {
                name: user.first_name().to_string(),
                completed: entry.map_or(0, |c| c.completed),
                total: entry.map_or(0, |c| c.total),
            }
        })
        .collect();
    points.sort_by(|a, b| b.completed.cmp(&a.completed));
    points
}

pub fn user_activities(
    users: &[User],
    posts: &[Post],
    comments: &[Comment],
    todos: &[Todo],
) -> Vec<UserActivity> {
    let post_counts = posts_by_user(posts);
    let comment_counts = comments_by_user(posts, comments);
    let todo_counts = todos_by_user(todos);

    users
        .iter()
        .map(|user| {
            let todo_entry = todo_counts.get(&user.id);
            UserActivity {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                posts: post_counts.get(&user.id).copied().unwrap_or(0),
                comments: comment_counts.get(&user.id).copied().unwrap_or(0),
                todos: todo_entry.map_or(0, |c| c.total),
                completed_todos: todo_entry.map_or(0, |c| c.completed),
            }
        })
        .collect()
}

/// Процент выполнения, округлённый до целого; 0 при `total == 0`.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

pub fn sort_activities(activities: &mut [UserActivity], key: ActivitySortKey, direction: SortDirection) {
    activities.sort_by(|a, b| {
        let ordering = match key {
            ActivitySortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ActivitySortKey::Posts => a.posts.cmp(&b.posts),
            ActivitySortKey::Comments => a.comments.cmp(&b.comments),
            ActivitySortKey::Todos => a.todos.cmp(&b.todos),
            ActivitySortKey::CompletionRate => a
                .completion_ratio()
                .partial_cmp(&b.completion_ratio())
                .unwrap_or(Ordering::Equal),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            phone: String::new(),
            website: String::new(),
            address: Default::default(),
            company: Default::default(),
        }
    }

    fn post(id: i64, user_id: i64) -> Post {
        Post {
            id,
            user_id,
            title: format!("post {id}"),
            body: "body".to_string(),
            is_local: false,
        }
    }

    fn comment(id: i64, post_id: i64) -> Comment {
        Comment {
            id,
            post_id,
            name: "c".to_string(),
            email: "c@example.com".to_string(),
            body: "text".to_string(),
        }
    }

    fn todo(id: i64, user_id: i64, completed: bool) -> Todo {
        Todo {
            id,
            user_id,
            title: format!("todo {id}"),
            completed,
        }
    }

    fn scenario() -> (Vec<User>, Vec<Post>, Vec<Comment>, Vec<Todo>) {
        let users = vec![
            user(1, "Leanne Graham"),
            user(2, "Ervin Howell"),
            user(3, "Clementine Bauch"),
        ];
        let posts = vec![post(1, 1), post(2, 1), post(3, 2), post(4, 2), post(5, 2)];
        let todos = vec![
            todo(1, 1, true),
            todo(2, 1, true),
            todo(3, 2, true),
            todo(4, 3, false),
        ];
        (users, posts, Vec::new(), todos)
    }

    #[test]
    fn stats_count_every_collection() {
        let (users, posts, comments, todos) = scenario();

        let stats = stats(&users, &posts, &comments, &todos);
        assert_eq!(
            stats,
            Stats {
                total_users: 3,
                total_posts: 5,
                total_comments: 0,
                total_todos: 4,
                completed_todos: 3,
            }
        );
    }

    #[test]
    fn posts_per_user_sorted_descending_by_first_name() {
        let (users, posts, _, _) = scenario();

        let points = posts_per_user(&users, &posts);
        let pairs: Vec<(&str, usize)> = points.iter().map(|p| (p.name.as_str(), p.value)).collect();
        assert_eq!(pairs, vec![("Ervin", 3), ("Leanne", 2), ("Clementine", 0)]);
    }

    #[test]
    fn todo_completion_keeps_totals() {
        let (users, _, _, todos) = scenario();

        let points = todo_completion_per_user(&users, &todos);
        assert_eq!(points[0].name, "Leanne");
        assert_eq!((points[0].completed, points[0].total), (2, 2));
        assert_eq!(points[2].name, "Clementine");
        assert_eq!((points[2].completed, points[2].total), (0, 1));
    }

    #[test]
    fn comments_are_joined_through_posts() {
        let (users, posts, _, todos) = scenario();
        let comments = vec![
            comment(1, 1),
            comment(2, 3),
            comment(3, 5),
            comment(4, 99),
        ];

        let activities = user_activities(&users, &posts, &comments, &todos);
        let leanne = &activities[0];
        let ervin = &activities[1];
        let clementine = &activities[2];

        assert_eq!(leanne.comments, 1);
        assert_eq!(ervin.comments, 2);
        assert_eq!(clementine.comments, 0);
        assert_eq!(leanne.posts, 2);
        assert_eq!((leanne.todos, leanne.completed_todos), (2, 2));
    }

    #[test]
    fn dangling_posts_do_not_count_for_anyone() {
        let users = vec![user(1, "Leanne Graham")];
        let posts = vec![post(1, 1), post(2, 77)];
        let comments = vec![comment(1, 2)];

        let activities = user_activities(&users, &posts, &comments, &[]);
        assert_eq!(activities[0].posts, 1);
        assert_eq!(activities[0].comments, 0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let (users, posts, _, todos) = scenario();
        let comments = vec![comment(1, 1), comment(2, 4)];

        assert_eq!(
            stats(&users, &posts, &comments, &todos),
            stats(&users, &posts, &comments, &todos)
        );
        assert_eq!(posts_per_user(&users, &posts), posts_per_user(&users, &posts));
        assert_eq!(
            todo_completion_per_user(&users, &todos),
            todo_completion_per_user(&users, &todos)
        );
        assert_eq!(
            user_activities(&users, &posts, &comments, &todos),
            user_activities(&users, &posts, &comments, &todos)
        );
    }

    #[test]
    fn completion_rate_rounds_and_handles_zero() {
        assert_eq!(completion_rate(3, 4), 75);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(0, 0), 0);
    }

    #[test]
    fn activities_sort_by_completion_rate() {
        let (users, posts, comments, todos) = scenario();
        let mut activities = user_activities(&users, &posts, &comments, &todos);

        sort_activities(&mut activities, ActivitySortKey::CompletionRate, SortDirection::Asc);
        assert_eq!(activities[0].id, 3);

        sort_activities(&mut activities, ActivitySortKey::Name, SortDirection::Asc);
        let names: Vec<&str> = activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Clementine Bauch", "Ervin Howell", "Leanne Graham"]);

        sort_activities(&mut activities, ActivitySortKey::Posts, SortDirection::Desc);
        assert_eq!(activities[0].id, 2);
    }
}
