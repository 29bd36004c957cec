use {
    crate::{aggregator::Aggregator, catalog::Catalog, state::DashboardState},
    crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{
        io::{self, Stdout, Write},
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::{Duration, Instant},
    },
};

/// Number of catalog items that get a metric tile and a removal key
pub const METRIC_SLOTS: usize = 5;

/// Upper bound on how long the loop waits for a key before redrawing
const INPUT_TICK: Duration = Duration::from_millis(250);

/// Items shown as metric tiles, in catalog order; tile `n` is removed with key `n`
pub fn metric_items(catalog: &Catalog) -> &[String] {
    let items = catalog.tags().items();
    &items[..items.len().min(METRIC_SLOTS)]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    Remove(String),
    Ignore,
}

/// Map a key press to a dashboard action
pub fn action_for_key(key: KeyEvent, catalog: &Catalog) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::Ignore;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char(c) => {
            let slot = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1));
            match slot.and_then(|slot| metric_items(catalog).get(slot)) {
                Some(item_name) => Action::Remove(item_name.clone()),
                None => Action::Ignore,
            }
        }
        _ => Action::Ignore,
    }
}

/// Run the dashboard until `cancel` is set
///
/// One fetch-summarize-render cycle at a time. A removal forces the next
/// poll to happen immediately.
pub async fn run_ui(
    aggregator: &Aggregator,
    refresh_interval: Duration,
    cancel: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, aggregator, refresh_interval, &cancel).await;

    // Restore the terminal even when the loop failed
    restore_terminal(&mut std::io::stdout(), crossterm::terminal::disable_raw_mode)?;
    result
}

/// Leave the alternate screen and raw mode; raw mode is dropped even if leaving fails
fn restore_terminal<W: Write>(
    out: &mut W,
    disable_raw_mode: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
    let leave = crossterm::execute!(
        out,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    );
    let raw = disable_raw_mode();
    leave.and(raw)
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    aggregator: &Aggregator,
    refresh_interval: Duration,
    cancel: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = DashboardState::new();
    let mut next_poll = Instant::now();

    while !cancel.load(Ordering::Relaxed) {
        if Instant::now() >= next_poll {
            state.apply_poll(aggregator.fetch_and_summarize().await);
            next_poll = Instant::now() + refresh_interval;
        }

        let area = terminal.size()?;
        terminal.draw(|f| {
            crate::ui::layout::render_layout(f, area, &state, aggregator.catalog(), refresh_interval);
        })?;

        let wait = next_poll.saturating_duration_since(Instant::now()).min(INPUT_TICK);
        if !crossterm::event::poll(wait)? {
            continue;
        }

        let Event::Key(key) = crossterm::event::read()? else {
            continue;
        };

        match action_for_key(key, aggregator.catalog()) {
            Action::Quit => cancel.store(true, Ordering::Relaxed),
            Action::Refresh => next_poll = Instant::now(),
            Action::Remove(item_name) => {
                let result = aggregator.delete_one(&item_name, &state.key_index).await;
                state.apply_removal(&item_name, result);
                next_poll = Instant::now();
            }
            Action::Ignore => {}
        }
    }

    log::info!("Dashboard stopped after {} polls", state.polls);
    Ok(())
}
