use dashboard_client::{Comment, Post, Todo, User};
use dashboard_state::aggregate::completion_rate;
use dashboard_state::{ChartPoint, CompletionPoint, Overview, Page, PageMarker, UserActivity};

const BAR_WIDTH: usize = 30;
const PREVIEW_CHARS: usize = 60;

/// Приветствие по локальному часу.
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Доброе утро",
        12..=17 => "Добрый день",
        _ => "Добрый вечер",
    }
}

fn bar(value: usize, max: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let len = (value * BAR_WIDTH).div_ceil(max);
    "█".repeat(len.min(BAR_WIDTH))
}

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= PREVIEW_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}…")
}

pub fn format_page_window(markers: &[PageMarker], current_page: u32) -> String {
    markers
        .iter()
        .map(|marker| match marker {
            PageMarker::Page(page) if *page == current_page => format!("[{page}]"),
            PageMarker::Page(page) => page.to_string(),
            PageMarker::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_error_panel(message: &str) {
    eprintln!("┌ Ошибка");
    eprintln!("│ {message}");
    eprintln!("└ повторите команду или запустите с --retries N");
}

pub fn print_overview(greeting: &str, overview: &Overview) {
    let stats = &overview.stats;
    println!("{greeting}! Сводка панели");
    println!();
    println!("Пользователи: {}", stats.total_users);
    println!("Посты:        {}", stats.total_posts);
    println!("Комментарии:  {}", stats.total_comments);
    println!(
        "Задачи:       {} (выполнено {}, {}%)",
        stats.total_todos, stats.completed_todos, overview.completion_rate
    );

    println!();
    println!("Посты по пользователям");
    print_chart(&overview.posts_per_user);

    println!();
    println!("Выполнение задач");
    print_completion(&overview.todo_completion_per_user);

    println!();
    print_activities(&overview.user_activities);
}

fn print_chart(points: &[ChartPoint]) {
    let max = points.iter().map(|p| p.value).max().unwrap_or(0);
    for point in points {
        println!("  {:<12} {:>4} {}", point.name, point.value, bar(point.value, max));
    }
}

fn print_completion(points: &[CompletionPoint]) {
    let max = points.iter().map(|p| p.total).max().unwrap_or(0);
    for point in points {
        println!(
            "  {:<12} {:>3}/{:<3} {}",
            point.name,
            point.completed,
            point.total,
            bar(point.completed, max)
        );
    }
}

pub fn print_activities(activities: &[UserActivity]) {
    println!(
        "{:<4} {:<26} {:>6} {:>8} {:>6} {:>6}",
        "id", "пользователь", "посты", "коммент.", "задачи", "готово"
    );
    for activity in activities {
        println!(
            "{:<4} {:<26} {:>6} {:>8} {:>6} {:>5}%",
            activity.id,
            activity.name,
            activity.posts,
            activity.comments,
            activity.todos,
            completion_rate(activity.completed_todos, activity.todos)
        );
    }
}

pub fn print_users(page: &Page<User>) {
    if page.items.is_empty() {
        println!("Пользователи не найдены");
        return;
    }

    for user in &page.items {
        println!(
            "- [{}] {} (@{}) <{}> {}",
            user.id, user.name, user.username, user.email, user.company.name
        );
    }
    println!(
        "Показаны {}–{} из {} · страница {}",
        page.first_item,
        page.last_item,
        page.total_items,
        format_page_window(&page.window(), page.current_page)
    );
}

pub fn print_posts(posts: &[Post], author: impl Fn(i64) -> String) {
    if posts.is_empty() {
        println!("Посты не найдены");
        return;
    }

    println!("Постов: {}", posts.len());
    for post in posts {
        let tag = if post.is_local { " (локальный)" } else { "" };
        println!("- [{}] {}{} · {}", post.id, post.title, tag, author(post.user_id));
        println!("    {}", preview(&post.body));
    }
}

pub fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("user_id: {}", post.user_id);
    println!("title: {}", post.title);
    println!("body: {}", post.body);
    if post.is_local {
        println!("local: true");
    }
}

pub fn print_comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("Комментарии не найдены");
        return;
    }

    println!("Комментариев: {}", comments.len());
    for comment in comments {
        println!(
            "- [{}] post={} {} <{}>",
            comment.id, comment.post_id, comment.name, comment.email
        );
        println!("    {}", preview(&comment.body));
    }
}

pub fn print_todos(todos: &[Todo], owner: impl Fn(i64) -> String) {
    if todos.is_empty() {
        println!("Задачи не найдены");
        return;
    }

    println!("Задач: {}", todos.len());
    for todo in todos {
        println!("{}", todo_line(todo, &owner(todo.user_id)));
    }
}

pub fn todo_line(todo: &Todo, owner: &str) -> String {
    let mark = if todo.completed { "x" } else { " " };
    format!("[{mark}] {:>4} {} · {owner}", todo.id, todo.title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_follows_hour() {
        assert_eq!(greeting(0), "Доброе утро");
        assert_eq!(greeting(11), "Доброе утро");
        assert_eq!(greeting(12), "Добрый день");
        assert_eq!(greeting(17), "Добрый день");
        assert_eq!(greeting(18), "Добрый вечер");
        assert_eq!(greeting(23), "Добрый вечер");
    }

    #[test]
    fn bar_scales_to_width() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(5, 0), "");
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5, 10).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(1, 1000).chars().count(), 1);
    }

    #[test]
    fn preview_cuts_long_lines() {
        assert_eq!(preview("short\nsecond line"), "short");

        let long = "x".repeat(PREVIEW_CHARS + 5);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 1);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn page_window_marks_current_page() {
        let markers = vec![
            PageMarker::Page(1),
            PageMarker::Ellipsis,
            PageMarker::Page(4),
            PageMarker::Page(5),
            PageMarker::Page(6),
            PageMarker::Ellipsis,
            PageMarker::Page(10),
        ];
        assert_eq!(format_page_window(&markers, 5), "1 … 4 [5] 6 … 10");
    }

    #[test]
    fn todo_line_shows_status_and_owner() {
        let todo = Todo {
            id: 3,
            user_id: 1,
            title: "fugiat veniam minus".to_string(),
            completed: true,
        };
        assert_eq!(todo_line(&todo, "Leanne Graham"), "[x]    3 fugiat veniam minus · Leanne Graham");
    }
}
