use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, Timelike};
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_client::{DashboardClient, NewTodo};
use dashboard_state::aggregate::sort_activities;
use dashboard_state::persistence::{clear_persisted_state, load_persisted_state};
use dashboard_state::{
    ActivitySortKey, Dashboard, FileStorage, PostForm, PostPatch, PreferenceStorage,
    PreferenceSync, SortDirection, StateError, StateResult, Stores, TodoFilter,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use validator::ValidationErrors;

mod logging;
mod render;
mod settings;

use logging::init_logging;
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "dashboard-cli", version, about = "Терминальная аналитическая панель")]
struct Cli {
    /// Базовый URL REST-ресурса (по умолчанию из DASHBOARD_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Каталог для сохранённых настроек (по умолчанию из DASHBOARD_STATE_DIR).
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Сколько раз повторить загрузку, если она завершилась ошибкой.
    ///
    /// Повторы выполняются только по явному запросу пользователя; по умолчанию
    /// ошибка показывается панелью без повторов.
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,

    /// Вывод в JSON вместо таблиц.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Posts,
    Comments,
    Todos,
    CompletionRate,
}

impl From<SortArg> for ActivitySortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => Self::Name,
            SortArg::Posts => Self::Posts,
            SortArg::Comments => Self::Comments,
            SortArg::Todos => Self::Todos,
            SortArg::CompletionRate => Self::CompletionRate,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Completed,
    Pending,
}

impl From<FilterArg> for TodoFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Self::All,
            FilterArg::Completed => Self::Completed,
            FilterArg::Pending => Self::Pending,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Сводка: статистика, графики и таблица активности.
    Overview {
        #[arg(long, value_enum, default_value_t = SortArg::Posts)]
        sort: SortArg,
        /// Сортировать по возрастанию.
        #[arg(long)]
        asc: bool,
    },
    /// Пользователи с поиском и постраничным выводом.
    ///
    /// Поиск, страница и размер страницы запоминаются.
    Users {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Посты; поиск запоминается.
    Posts {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Комментарии.
    Comments {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        post_id: Option<i64>,
    },
    /// Задачи; фильтр по статусу запоминается.
    Todos {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        filter: Option<FilterArg>,
    },
    /// Создание поста.
    CreatePost {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Обновление поста.
    ///
    /// Не указанные поля остаются прежними.
    UpdatePost {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    DeletePost {
        #[arg(long)]
        id: i64,
    },
    /// Создание задачи.
    CreateTodo {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        completed: bool,
    },
    /// Переключение статуса задачи.
    ToggleTodo {
        #[arg(long)]
        id: i64,
    },
    DeleteTodo {
        #[arg(long)]
        id: i64,
    },
    /// Сброс сохранённых настроек.
    ClearPreferences,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let api_url = normalize_api_url(cli.api_url.unwrap_or(settings.api_url));
    let state_dir = cli.state_dir.unwrap_or(settings.state_dir);
    let storage: Arc<dyn PreferenceStorage> = Arc::new(FileStorage::new(&state_dir));

    if matches!(cli.command, Command::ClearPreferences) {
        clear_persisted_state(storage.as_ref());
        println!("Настройки сброшены: {}", state_dir.display());
        return Ok(());
    }

    let client = DashboardClient::with_timeouts(
        api_url.as_str(),
        Duration::from_secs(settings.http_connect_timeout_secs),
        Duration::from_secs(settings.http_request_timeout_secs),
    )
    .context("не удалось создать HTTP-клиент")?;
    info!(api_url = %api_url, state_dir = %state_dir.display(), "dashboard starting");

    let stores = Stores::new(Arc::new(client));
    if let Some(saved) = load_persisted_state(storage.as_ref()) {
        debug!("restoring saved preferences");
        saved.apply(&stores);
    }

    let dashboard = Dashboard::new(stores.clone());
    let sync = PreferenceSync::spawn(stores, storage);

    load(&dashboard, cli.retries).await;
    let result = execute(&dashboard, cli.command, cli.json).await;

    sync.flush();
    result
}

fn normalize_api_url(raw: String) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    format!("https://{trimmed}")
}

/// Первичная загрузка; ошибка показывается панелью, но не прерывает вывод.
///
/// `retries` приходит только из `--retries`: это ручной повтор, заказанный
/// пользователем при запуске, сама панель ничего не повторяет.
async fn load(dashboard: &Dashboard, retries: u32) {
    dashboard.load().await;

    let mut attempt = 0;
    while dashboard.error().is_some() && attempt < retries {
        attempt += 1;
        warn!(attempt, retries, "load failed, retrying");
        dashboard.retry().await;
    }

    if let Some(message) = dashboard.error() {
        render::print_error_panel(&message);
        dashboard.clear_errors();
    }
}

async fn execute(dashboard: &Dashboard, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Overview { sort, asc } => {
            let mut overview = dashboard.overview();
            let direction = if asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            };
            sort_activities(&mut overview.user_activities, sort.into(), direction);

            if json {
                return print_json(&overview);
            }
            render::print_overview(render::greeting(Local::now().hour()), &overview);
        }
        Command::Users {
            search,
            page,
            per_page,
        } => {
            // поиск и размер страницы сбрасывают номер страницы
            if let Some(search) = search {
                dashboard.search_users(&search);
            }
            if let Some(per_page) = per_page {
                dashboard.set_users_per_page(per_page);
            }
            if let Some(page) = page {
                dashboard.set_user_page(page);
            }
            dashboard.flush_search();

            let page = dashboard.paginated_users();
            if json {
                return print_json(&page);
            }
            render::print_users(&page);
        }
        Command::Posts { search, user_id } => {
            if let Some(search) = search {
                dashboard.search_posts(&search);
            }
            dashboard.flush_search();

            let posts: Vec<_> = dashboard
                .filtered_posts()
                .into_iter()
                .filter(|post| user_id.is_none_or(|id| post.user_id == id))
                .collect();
            if json {
                return print_json(&posts);
            }
            render::print_posts(&posts, |id| dashboard.user_name(id));
        }
        Command::Comments { search, post_id } => {
            if let Some(search) = search {
                dashboard.search_comments(&search);
            }
            dashboard.flush_search();

            let comments: Vec<_> = dashboard
                .filtered_comments()
                .into_iter()
                .filter(|comment| post_id.is_none_or(|id| comment.post_id == id))
                .collect();
            if json {
                return print_json(&comments);
            }
            render::print_comments(&comments);
        }
        Command::Todos { search, filter } => {
            if let Some(search) = search {
                dashboard.search_todos(&search);
            }
            if let Some(filter) = filter {
                dashboard.set_todo_filter(filter.into());
            }
            dashboard.flush_search();

            let todos = dashboard.filtered_todos();
            if json {
                return print_json(&todos);
            }
            render::print_todos(&todos, |id| dashboard.user_name(id));
        }
        Command::CreatePost {
            user_id,
            title,
            body,
        } => {
            let post = settle(
                dashboard,
                dashboard.submit_post(PostForm::new(user_id, &title, &body)).await,
            )?;
            render::print_post("Пост создан", &post);
        }
        Command::UpdatePost { id, title, body } => {
            let patch = PostPatch {
                user_id: None,
                title: title.map(|title| title.trim().to_string()),
                body: body.map(|body| body.trim().to_string()),
            };
            match settle(dashboard, dashboard.update_post(id, patch).await)? {
                Some(post) => render::print_post("Пост обновлён", &post),
                None => println!("Пост не найден: id={id}"),
            }
        }
        Command::DeletePost { id } => {
            settle(dashboard, dashboard.delete_post(id).await)?;
            println!("Пост удалён: id={id}");
        }
        Command::CreateTodo {
            user_id,
            title,
            completed,
        } => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(anyhow!("название задачи не должно быть пустым"));
            }
            let draft = NewTodo {
                user_id,
                title,
                completed,
            };
            let todo = settle(dashboard, dashboard.create_todo(draft).await)?;
            println!("Задача создана");
            println!("{}", render::todo_line(&todo, &dashboard.user_name(todo.user_id)));
        }
        Command::ToggleTodo { id } => {
            match settle(dashboard, dashboard.toggle_todo(id).await)? {
                Some(todo) => {
                    println!("{}", render::todo_line(&todo, &dashboard.user_name(todo.user_id)))
                }
                None => println!("Задача не найдена: id={id}"),
            }
        }
        Command::DeleteTodo { id } => {
            settle(dashboard, dashboard.delete_todo(id).await)?;
            println!("Задача удалена: id={id}");
        }
        // обрабатывается в run до загрузки данных
        Command::ClearPreferences => {}
    }

    Ok(())
}

/// Переводит результат действия в ошибку CLI; ошибку из состояния
/// хранилища показывает панелью.
fn settle<T>(dashboard: &Dashboard, result: StateResult<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(StateError::Validation(errors)) => Err(anyhow!(
            "форма заполнена некорректно: {}",
            describe_validation(&errors)
        )),
        Err(err) => {
            if let Some(message) = dashboard.error() {
                render::print_error_panel(&message);
            }
            Err(anyhow::Error::new(err).context("операция не выполнена"))
        }
    }
}

fn describe_validation(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, list)| {
            list.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", error.code),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value).context("не удалось сериализовать вывод")?;
    println!("{raw}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_api_url_keeps_scheme_and_drops_trailing_slash() {
        let url = normalize_api_url("http://localhost:3000/".to_string());
        assert_eq!(url, "http://localhost:3000");
    }

    #[test]
    fn normalize_api_url_adds_https_scheme() {
        let url = normalize_api_url(" jsonplaceholder.typicode.com ".to_string());
        assert_eq!(url, "https://jsonplaceholder.typicode.com");
    }

    #[test]
    fn sort_and_filter_args_map_to_state_types() {
        assert_eq!(
            ActivitySortKey::from(SortArg::CompletionRate),
            ActivitySortKey::CompletionRate
        );
        assert_eq!(TodoFilter::from(FilterArg::Pending), TodoFilter::Pending);
    }

    #[test]
    fn cli_parses_users_command() {
        let cli = Cli::try_parse_from([
            "dashboard-cli",
            "users",
            "--search",
            "lea",
            "--per-page",
            "5",
        ])
        .expect("arguments must parse");

        match cli.command {
            Command::Users {
                search, per_page, ..
            } => {
                assert_eq!(search.as_deref(), Some("lea"));
                assert_eq!(per_page, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn load_is_not_retried_unless_requested() {
        let cli = Cli::try_parse_from(["dashboard-cli", "overview"]).expect("arguments must parse");
        assert_eq!(cli.retries, 0);

        let cli = Cli::try_parse_from(["dashboard-cli", "--retries", "2", "overview"])
            .expect("arguments must parse");
        assert_eq!(cli.retries, 2);
    }

    #[test]
    fn cli_parses_todo_filter_value() {
        let cli = Cli::try_parse_from(["dashboard-cli", "--json", "todos", "--filter", "completed"])
            .expect("arguments must parse");

        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Todos {
                filter: Some(FilterArg::Completed),
                ..
            }
        ));
    }

    #[test]
    fn validation_errors_are_readable() {
        let errors = PostForm::new(0, "ab", "short")
            .into_draft()
            .expect_err("form must be rejected");

        let text = describe_validation(&errors);
        assert!(text.contains("Title must be at least 3 characters"));
        assert!(text.contains("Content must be at least 10 characters"));
        assert!(text.contains("Author is required"));
    }
}
