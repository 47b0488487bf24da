use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::api::TaskApi;
use crate::editor::LineEditor;
use crate::effects::Dispatcher;
use crate::error::TaskError;
use crate::models::{NewTask, Notice, NoticeLevel, PopupMode, Status, Task, TaskId, ViewTab};
use crate::reorder::{Container, DragLocation, DragResult};
use crate::state::{TaskCollection, Transition};

const TICK: Duration = Duration::from_millis(100);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

// results of awaited remote calls, handed back to the event loop
#[derive(Debug)]
pub enum Outcome {
    Fetched(Result<Vec<Task>, TaskError>),
    Created(Result<Task, TaskError>),
}

pub struct App {
    api: TaskApi,
    runtime: Handle,
    dispatcher: Dispatcher,
    outcome_tx: UnboundedSender<Outcome>,
    outcome_rx: UnboundedReceiver<Outcome>,
    pub tasks: TaskCollection,
    pub current_tab: ViewTab,
    pub list_state: ListState,
    pub column: usize,
    pub column_states: [ListState; 3],
    pub fetching: bool,
    pub creating: bool,
    pub notice: Option<Notice>,
    pub popup_mode: PopupMode,
    pub input: LineEditor,
    pub should_quit: bool,
}

impl App {
    pub fn new(api: TaskApi, runtime: Handle) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        App {
            dispatcher: Dispatcher::new(api.clone(), runtime.clone()),
            api,
            runtime,
            outcome_tx,
            outcome_rx,
            tasks: TaskCollection::default(),
            current_tab: ViewTab::List,
            list_state: ListState::default(),
            column: 0,
            column_states: Default::default(),
            fetching: false,
            creating: false,
            notice: None,
            popup_mode: PopupMode::None,
            input: LineEditor::default(),
            should_quit: false,
        }
    }

    pub fn loading(&self) -> bool {
        self.fetching || self.creating
    }

    pub fn refresh_data(&mut self) {
        if self.fetching {
            return;
        }
        self.fetching = true;
        let api = self.api.clone();
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(Outcome::Fetched(api.list().await));
        });
    }

    pub fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.handle_outcome(outcome);
        }
    }

    pub fn handle_outcome(&mut self, outcome: Outcome) {
        match &outcome {
            Outcome::Fetched(_) => self.fetching = false,
            Outcome::Created(_) => self.creating = false,
        }
        match outcome {
            Outcome::Fetched(Ok(tasks)) => {
                self.tasks = TaskCollection::from_remote(tasks);
                self.notice = Some(Notice::success("Tasks fetched successfully"));
            }
            Outcome::Fetched(Err(err)) => {
                log::error!("error fetching tasks: {err}");
                self.notice = Some(Notice::error("Error fetching tasks"));
            }
            Outcome::Created(Ok(task)) => {
                self.tasks = self.tasks.with_created(task);
                self.notice = Some(Notice::success("Task added successfully"));
            }
            Outcome::Created(Err(err)) => {
                log::error!("error adding task: {err}");
                self.notice = Some(Notice::error("Error adding task"));
            }
        }
        self.clamp_selection();
    }

    fn apply(&mut self, transition: Transition) {
        self.tasks = transition.collection;
        self.dispatcher.dispatch(transition.effects);
        self.clamp_selection();
    }

    pub fn next_tab(&mut self) {
        self.current_tab = match self.current_tab {
            ViewTab::List => ViewTab::Kanban,
            ViewTab::Kanban => ViewTab::List,
        };
        self.clamp_selection();
    }

    fn column_tasks(&self, column: usize) -> Vec<&Task> {
        self.tasks.column(Status::ALL[column])
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        match self.current_tab {
            ViewTab::List => self
                .list_state
                .selected()
                .and_then(|i| self.tasks.tasks().get(i))
                .map(|task| task.id.clone()),
            ViewTab::Kanban => {
                let selected = self.column_states[self.column].selected()?;
                self.column_tasks(self.column)
                    .get(selected)
                    .map(|task| task.id.clone())
            }
        }
    }

    fn select_task(&mut self, id: &TaskId) {
        let board = self.current_tab == ViewTab::Kanban;
        let Some(location) = self.tasks.location_of(id, board) else {
            return;
        };
        match location.container.status() {
            None => self.list_state.select(Some(location.index)),
            Some(status) => {
                let column = Status::ALL.iter().position(|s| *s == status).unwrap_or(0);
                self.column = column;
                self.column_states[column].select(Some(location.index));
            }
        }
    }

    fn clamp_selection(&mut self) {
        clamp(&mut self.list_state, self.tasks.len());
        for column in 0..Status::ALL.len() {
            let len = self.column_tasks(column).len();
            clamp(&mut self.column_states[column], len);
        }
    }

    pub fn next_item(&mut self) {
        let (state, len) = self.focused_state();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous_item(&mut self) {
        let (state, len) = self.focused_state();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    fn focused_state(&mut self) -> (&mut ListState, usize) {
        match self.current_tab {
            ViewTab::List => (&mut self.list_state, self.tasks.len()),
            ViewTab::Kanban => {
                let len = self.column_tasks(self.column).len();
                (&mut self.column_states[self.column], len)
            }
        }
    }

    pub fn next_column(&mut self) {
        self.column = (self.column + 1) % Status::ALL.len();
    }

    pub fn previous_column(&mut self) {
        self.column = if self.column == 0 { Status::ALL.len() - 1 } else { self.column - 1 };
    }

    fn perform_drag(&mut self, drag: DragResult) {
        match self.tasks.reorder(&drag) {
            Ok(Some(transition)) => {
                self.apply(transition);
                self.select_task(&drag.task_id);
            }
            Ok(None) => {}
            Err(err) => log::warn!("ignoring move of task {}: {err}", drag.task_id),
        }
    }

    /// Moves the selected task one slot up (`-1`) or down (`1`) within its
    /// list or column.
    pub fn move_selected_vertical(&mut self, delta: isize) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let board = self.current_tab == ViewTab::Kanban;
        let Some(source) = self.tasks.location_of(&id, board) else {
            return;
        };
        let len = match source.container.status() {
            None => self.tasks.len(),
            Some(status) => self.tasks.column(status).len(),
        };
        let target = source.index.saturating_add_signed(delta).min(len.saturating_sub(1));
        self.perform_drag(DragResult {
            task_id: id,
            source,
            destination: Some(DragLocation::new(source.container, target)),
        });
    }

    /// Moves the selected task to the end of the neighbouring column.
    pub fn move_selected_horizontal(&mut self, delta: isize) {
        if self.current_tab != ViewTab::Kanban {
            return;
        }
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let Some(source) = self.tasks.location_of(&id, true) else {
            return;
        };
        let column = self.column as isize + delta;
        if column < 0 || column >= Status::ALL.len() as isize {
            return;
        }
        let status = Status::ALL[column as usize];
        let end = self.tasks.column(status).len();
        self.perform_drag(DragResult {
            task_id: id,
            source,
            destination: Some(DragLocation::new(Container::for_status(status), end)),
        });
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.tasks.toggle(&id) {
            Ok(transition) => {
                self.apply(transition);
                self.select_task(&id);
            }
            Err(err) => log::warn!("toggle failed: {err}"),
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.tasks.delete(&id) {
            Ok(transition) => self.apply(transition),
            Err(err) => log::warn!("delete failed: {err}"),
        }
    }

    pub fn show_add_popup(&mut self) {
        self.popup_mode = PopupMode::AddTask;
        self.input = LineEditor::default();
    }

    pub fn show_edit_popup(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if let Some(task) = self.tasks.get(&id) {
            self.input = LineEditor::new(task.name.clone());
            self.popup_mode = PopupMode::EditName(id);
        }
    }

    pub fn close_popup(&mut self) {
        self.popup_mode = PopupMode::None;
        self.input = LineEditor::default();
    }

    pub fn submit_popup(&mut self) {
        if self.popup_mode == PopupMode::AddTask && self.loading() {
            // keep what was typed; Enter again once the store has answered
            self.notice = Some(Notice::error("Still loading, try again in a moment"));
            return;
        }
        let mode = std::mem::replace(&mut self.popup_mode, PopupMode::None);
        let edited = self.input.is_dirty;
        let text = self.input.get_content().to_string();
        self.input = LineEditor::default();
        match mode {
            PopupMode::AddTask => self.add_task(&text),
            PopupMode::EditName(_) if !edited => {}
            PopupMode::EditName(id) => match self.tasks.rename(&id, &text) {
                Ok(Some(transition)) => self.apply(transition),
                Ok(None) => {}
                Err(err) => log::warn!("rename failed: {err}"),
            },
            PopupMode::None => {}
        }
    }

    /// Creates a task remotely; it shows up once the store answers.
    pub fn add_task(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || self.loading() {
            return;
        }
        self.creating = true;
        let new_task = NewTask::new(name, self.tasks.next_position());
        let api = self.api.clone();
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(Outcome::Created(api.create(&new_task).await));
        });
    }

    pub fn handle_popup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_popup(),
            KeyCode::Enter => self.submit_popup(),
            KeyCode::Backspace => self.input.delete_char(),
            KeyCode::Delete => self.input.delete_forward(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Home => self.input.move_to_start(),
            KeyCode::End => self.input.move_to_end(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert_char(c)
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup_mode != PopupMode::None {
            self.handle_popup_key(key);
            return;
        }

        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.next_tab(),
            KeyCode::Up if shift => self.move_selected_vertical(-1),
            KeyCode::Down if shift => self.move_selected_vertical(1),
            KeyCode::Left if shift => self.move_selected_horizontal(-1),
            KeyCode::Right if shift => self.move_selected_horizontal(1),
            KeyCode::Char('K') => self.move_selected_vertical(-1),
            KeyCode::Char('J') => self.move_selected_vertical(1),
            KeyCode::Char('H') => self.move_selected_horizontal(-1),
            KeyCode::Char('L') => self.move_selected_horizontal(1),
            KeyCode::Up | KeyCode::Char('k') => self.previous_item(),
            KeyCode::Down | KeyCode::Char('j') => self.next_item(),
            KeyCode::Left | KeyCode::Char('h') => self.previous_column(),
            KeyCode::Right | KeyCode::Char('l') => self.next_column(),
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Enter | KeyCode::Char('e') => self.show_edit_popup(),
            KeyCode::Char('a') => self.show_add_popup(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('r') => self.refresh_data(),
            _ => {}
        }
    }
}

fn clamp(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        let i = state.selected().unwrap_or(0).min(len - 1);
        state.select(Some(i));
    }
}

pub fn run_tui(api: TaskApi, runtime: Handle) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api, runtime.clone());
    app.refresh_data();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    let pending = app.dispatcher.pending();
    if pending > 0 {
        log::info!("waiting for {pending} tasks with remote updates in flight");
        if runtime
            .block_on(tokio::time::timeout(SETTLE_TIMEOUT, app.dispatcher.settle()))
            .is_err()
        {
            log::warn!("gave up waiting for remote updates after {SETTLE_TIMEOUT:?}");
        }
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        app.drain_outcomes();

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let titles: Vec<Line> = ["Tasks", "Kanban"].iter().cloned().map(Line::from).collect();
    let selected_tab = match app.current_tab {
        ViewTab::List => 0,
        ViewTab::Kanban => 1,
    };
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Task Manager"))
        .select(selected_tab)
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Black),
        );
    f.render_widget(tabs, chunks[0]);

    match app.current_tab {
        ViewTab::List => render_list(f, app, chunks[1]),
        ViewTab::Kanban => render_kanban(f, app, chunks[1]),
    }
    render_footer(f, app, chunks[2]);

    let title = match &app.popup_mode {
        PopupMode::None => return,
        PopupMode::AddTask => "New Task",
        PopupMode::EditName(_) => "Edit Task Name",
    };
    let popup_area = centered_rect(60, 20, f.area());
    let (before, after) = app.input.split_at_cursor();
    let mut after_chars = after.chars();
    let cursor = after_chars.next().map(String::from).unwrap_or_else(|| " ".to_string());
    let rest: String = after_chars.collect();
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(before.to_string()),
            Span::styled(cursor, Style::default().bg(Color::Cyan).fg(Color::Black)),
            Span::raw(rest),
        ]),
        Line::from(""),
        Line::from("Press ENTER to save, ESC to cancel"),
    ])
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::DarkGray)),
    )
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::White));

    f.render_widget(Clear, popup_area);
    f.render_widget(content, popup_area);
}

// Helper function to create centered rectangles for popups
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Splits a task name into spans, highlighting anything that looks like a
/// URL.
pub fn name_spans(name: &str, style: Style) -> Vec<Span<'_>> {
    name.split_inclusive(char::is_whitespace)
        .map(|piece| {
            let word = piece.trim_end();
            if word.starts_with("http://") || word.starts_with("https://") {
                Span::styled(
                    piece,
                    style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
                )
            } else {
                Span::styled(piece, style)
            }
        })
        .collect()
}

fn list_item(task: &Task) -> ListItem<'_> {
    let (marker, marker_color) = if task.status.is_completed() {
        ("[x] ", Color::Green)
    } else {
        ("[ ] ", Color::Red)
    };
    let name_style = if task.status.is_completed() {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![Span::styled(marker, Style::default().fg(marker_color))];
    spans.extend(name_spans(&task.name, name_style));
    if task.status == Status::InProgress {
        spans.push(Span::styled(
            " (in progress)",
            Style::default().fg(Color::Yellow),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn render_list(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app.tasks.iter().map(list_item).collect();
    let tasks_list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Tasks ({})", app.tasks.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(tasks_list, area, &mut app.list_state);
}

fn render_kanban(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ]
            .as_ref(),
        )
        .split(area);

    for (column, status) in Status::ALL.into_iter().enumerate() {
        let focused = column == app.column;
        let items: Vec<ListItem> = app
            .tasks
            .column(status)
            .into_iter()
            .map(|task| ListItem::new(Line::from(name_spans(&task.name, Style::default().fg(Color::White)))))
            .collect();
        let count = items.len();
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let mut list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!("{} ({})", status.title(), count)),
        );
        if focused {
            list = list
                .highlight_style(
                    Style::default()
                        .bg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
        }
        f.render_stateful_widget(list, chunks[column], &mut app.column_states[column]);
    }
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = match app.current_tab {
        ViewTab::List => "a: add • e: edit • space: toggle • d: delete • J/K: move • r: refresh • q: quit",
        ViewTab::Kanban => "←/→: column • H/L: move across • J/K: move • e: edit • d: delete • q: quit",
    };
    let mut spans = Vec::new();
    if app.loading() {
        spans.push(Span::styled("Working... ", Style::default().fg(Color::Yellow)));
    }
    if let Some(notice) = &app.notice {
        let color = match notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        spans.push(Span::styled(
            format!("{}  ", notice.message),
            Style::default().fg(color),
        ));
    }
    spans.push(Span::styled(help, Style::default().fg(Color::Gray)));

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::tests::task;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn app_with(tasks: Vec<Task>) -> (App, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let config = Config::new(&format!("{}/todos", server.uri()), 5, "info", None).unwrap();
        let mut app = App::new(TaskApi::new(&config).unwrap(), Handle::current());
        app.handle_outcome(Outcome::Fetched(Ok(tasks)));
        (app, server)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn order(app: &App) -> Vec<&str> {
        app.tasks.iter().map(|task| task.id.as_str()).collect()
    }

    #[tokio::test]
    async fn fetch_failure_keeps_state_and_notifies() {
        let (mut app, _server) = app_with(vec![task("1", 0, Status::ToDo)]).await;
        app.handle_outcome(Outcome::Fetched(Err(TaskError::Config("boom".into()))));

        assert_eq!(order(&app), vec!["1"]);
        assert_eq!(app.notice, Some(Notice::error("Error fetching tasks")));
        assert!(!app.loading());
    }

    #[tokio::test]
    async fn add_while_loading_keeps_the_typed_name() {
        let (mut app, _server) = app_with(vec![task("1", 0, Status::ToDo)]).await;
        app.fetching = true;

        app.handle_key(key(KeyCode::Char('a')));
        for c in "Buy milk".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.popup_mode, PopupMode::AddTask);
        assert_eq!(app.input.get_content(), "Buy milk");
        assert_eq!(
            app.notice,
            Some(Notice::error("Still loading, try again in a moment"))
        );
        assert!(!app.creating);
    }

    #[tokio::test]
    async fn fetch_and_create_finish_independently() {
        let (mut app, _server) = app_with(vec![task("1", 0, Status::ToDo)]).await;
        app.fetching = true;
        app.creating = true;

        app.handle_outcome(Outcome::Created(Ok(task("2", 1, Status::ToDo))));
        assert!(app.fetching);
        assert!(!app.creating);
        assert!(app.loading());

        app.handle_outcome(Outcome::Fetched(Ok(vec![task("1", 0, Status::ToDo)])));
        assert!(!app.loading());
    }

    #[tokio::test]
    async fn unedited_rename_sends_nothing() {
        let (mut app, server) = app_with(vec![task("1", 0, Status::ToDo)]).await;

        app.handle_key(key(KeyCode::Char('e')));
        app.handle_key(key(KeyCode::Enter));
        app.dispatcher.settle().await;

        assert_eq!(app.popup_mode, PopupMode::None);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_task_is_appended_and_notified() {
        let (mut app, _server) = app_with(vec![task("1", 0, Status::ToDo)]).await;
        app.handle_outcome(Outcome::Created(Ok(task("2", 1, Status::ToDo))));

        assert_eq!(order(&app), vec!["1", "2"]);
        assert_eq!(app.notice, Some(Notice::success("Task added successfully")));
    }

    #[tokio::test]
    async fn moving_down_in_list_follows_the_task() {
        let (mut app, server) = app_with(vec![
            task("1", 0, Status::ToDo),
            task("2", 1, Status::ToDo),
            task("3", 2, Status::ToDo),
        ])
        .await;

        app.handle_key(key(KeyCode::Char('J')));

        assert_eq!(order(&app), vec!["2", "1", "3"]);
        assert_eq!(app.list_state.selected(), Some(1));

        app.dispatcher.settle().await;
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn moving_right_on_board_reclassifies() {
        let (mut app, _server) = app_with(vec![
            task("1", 0, Status::ToDo),
            task("2", 1, Status::InProgress),
        ])
        .await;
        app.handle_key(key(KeyCode::Tab));

        app.handle_key(key(KeyCode::Char('L')));

        let moved = app.tasks.get(&TaskId::new("1")).unwrap();
        assert_eq!(moved.status, Status::InProgress);
        assert_eq!(order(&app), vec!["2", "1"]);
        assert_eq!(app.column, 1);
        assert_eq!(app.column_states[1].selected(), Some(1));
    }

    #[tokio::test]
    async fn blank_rename_is_discarded() {
        let (mut app, _server) = app_with(vec![task("1", 0, Status::ToDo)]).await;

        app.handle_key(key(KeyCode::Char('e')));
        assert_eq!(app.popup_mode, PopupMode::EditName(TaskId::new("1")));
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Backspace));
        }
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.popup_mode, PopupMode::None);
        assert_eq!(app.tasks.get(&TaskId::new("1")).unwrap().name, "task 1");
    }

    #[tokio::test]
    async fn delete_removes_immediately_even_if_store_fails() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let config = Config::new(&format!("{}/todos", server.uri()), 5, "info", None).unwrap();
        let mut app = App::new(TaskApi::new(&config).unwrap(), Handle::current());
        app.handle_outcome(Outcome::Fetched(Ok(vec![
            task("1", 0, Status::ToDo),
            task("2", 1, Status::ToDo),
        ])));

        app.handle_key(key(KeyCode::Char('d')));
        app.dispatcher.settle().await;

        assert_eq!(order(&app), vec!["2"]);
        assert_eq!(app.tasks.tasks()[0].position, 0);
    }

    #[test]
    fn urls_in_names_are_highlighted() {
        let spans = name_spans("see https://example.com now", Style::default());
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].content, "https://example.com ");
        assert!(spans[1].style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(!spans[0].style.add_modifier.contains(Modifier::UNDERLINED));
    }
}
