use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Задержка применения поискового запроса.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Ждёт паузы во входных значениях и отдаёт последнее из них в `on_settled`.
///
/// Каждое новое значение перезапускает таймер, поэтому серия изменений даёт
/// один вызов. Завершается, когда отправитель `input` закрыт.
pub async fn run<T, F>(mut input: watch::Receiver<T>, delay: Duration, mut on_settled: F)
where
    T: Clone + Send + Sync,
    F: FnMut(T),
{
    while input.changed().await.is_ok() {
        loop {
            tokio::select! {
                _ = sleep(delay) => {
                    let value = input.borrow_and_update().clone();
                    on_settled(value);
                    break;
                }
                changed = input.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// Значение с задержкой: `set` сразу сохраняет сырое значение, а `current`
/// возвращает его только после паузы в `delay`.
///
/// Создавать нужно внутри tokio runtime: таймер живёт в отдельной задаче.
pub struct Debounced<T> {
    input: watch::Sender<T>,
    output: watch::Receiver<T>,
    output_tx: watch::Sender<T>,
    task: JoinHandle<()>,
    feeder: Option<JoinHandle<()>>,
}

impl<T> Debounced<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (input, input_rx) = watch::channel(initial.clone());
        let (output_tx, output) = watch::channel(initial);

        let publisher = output_tx.clone();
        let task = tokio::spawn(run(input_rx, delay, move |value| {
            publish(&publisher, value);
        }));

        Self {
            input,
            output,
            output_tx,
            task,
            feeder: None,
        }
    }

    /// Отложенная копия поля из чужого watch-канала.
    ///
    /// Вход меняется только когда меняется само поле `project(&source)`,
    /// остальные изменения источника таймер не перезапускают.
    pub fn follow<S, F>(mut source: watch::Receiver<S>, delay: Duration, project: F) -> Self
    where
        S: Send + Sync + 'static,
        F: Fn(&S) -> T + Send + 'static,
    {
        let initial = project(&*source.borrow_and_update());
        let mut debounced = Self::new(initial, delay);

        let input = debounced.input.clone();
        debounced.feeder = Some(tokio::spawn(async move {
            while source.changed().await.is_ok() {
                let value = project(&*source.borrow_and_update());
                publish(&input, value);
            }
        }));
        debounced
    }

    pub fn set(&self, value: T) {
        self.input.send_replace(value);
    }

    /// Последнее сырое значение (ещё может быть в ожидании).
    pub fn pending(&self) -> T {
        self.input.borrow().clone()
    }

    /// Значение, пережившее паузу.
    pub fn current(&self) -> T {
        self.output.borrow().clone()
    }

    /// Применяет ожидающее значение немедленно, не дожидаясь таймера.
    pub fn flush(&self) {
        publish(&self.output_tx, self.pending());
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.output.clone()
    }
}

impl<T> Drop for Debounced<T> {
    fn drop(&mut self) {
        self.task.abort();
        if let Some(feeder) = &self.feeder {
            feeder.abort();
        }
    }
}

fn publish<T: PartialEq>(tx: &watch::Sender<T>, value: T) {
    tx.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    });
}
