//! Main TUI application.

use std::io;
use std::sync::Arc;

use chrono::Local;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::sampler::Sampler;
use crate::telemetry::{ApplianceApi, Node, ServiceInventory};

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::{AppState, ListPayload, ListUpdate, Tab};

/// Main TUI application.
pub struct App {
    api: Arc<dyn ApplianceApi>,
    config: DashboardConfig,
    state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(api: Arc<dyn ApplianceApi>, config: DashboardConfig) -> Self {
        let state = AppState::new(&config);
        Self {
            api,
            config,
            state,
            should_quit: false,
        }
    }

    /// Runs the dashboard until the user quits. Must be called inside a
    /// tokio runtime; fetches are spawned onto it.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal even when the loop failed.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let mut events = EventHandler::new(self.config.tick_rate);
        let (mut sampler, mut samples) =
            Sampler::new(self.api.clone().telemetry(), self.config.poll_interval);
        let (list_tx, mut lists) = mpsc::unbounded_channel();

        info!(
            node = %self.state.node,
            interval_secs = self.config.poll_interval.as_secs(),
            demo = self.config.is_demo(),
            "dashboard started"
        );
        self.fetch_capabilities(&list_tx);
        self.enter_tab(&mut sampler, &list_tx);

        loop {
            self.state.auth_redirect = self.api.auth_redirect();
            terminal.draw(|frame| render(frame, &mut self.state, sampler.metrics()))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Event::Key(key)) => {
                        let action = handle_key(&mut self.state, key);
                        self.dispatch(action, &mut sampler, &list_tx);
                    }
                    // Tick redraws the clock, resize is picked up by the next draw.
                    Some(Event::Tick) | Some(Event::Resize(..)) => {}
                    None => self.should_quit = true,
                },
                Some(update) = samples.recv() => {
                    sampler.apply(update);
                    sampler.drain(&mut samples);
                }
                Some(update) = lists.recv() => {
                    self.state.apply_list(update);
                }
            }

            if self.should_quit {
                break;
            }
        }

        sampler.stop();
        info!("dashboard stopped");
        Ok(())
    }

    fn dispatch(&mut self, action: KeyAction, sampler: &mut Sampler, tx: &UnboundedSender<ListUpdate>) {
        match action {
            KeyAction::None => {}
            KeyAction::Quit => self.should_quit = true,
            KeyAction::SwitchTab(tab) => self.switch_tab(tab, sampler, tx),
            KeyAction::SwitchNode(node) => self.switch_node(node, sampler, tx),
            KeyAction::Refresh => {
                self.state.status_message = None;
                if self.state.current_tab == Tab::Overview {
                    if sampler.is_running() {
                        sampler.refresh();
                    } else {
                        sampler.start(self.state.node);
                    }
                } else {
                    self.load_list(self.state.current_tab, tx);
                }
            }
            KeyAction::ApplyFilter(tab) => {
                if tab == self.state.current_tab {
                    self.load_list(tab, tx);
                }
            }
            KeyAction::Export => self.export(tx),
        }
    }

    fn switch_tab(&mut self, tab: Tab, sampler: &mut Sampler, tx: &UnboundedSender<ListUpdate>) {
        let previous = self.state.current_tab;
        if tab == previous {
            return;
        }
        debug!(from = previous.name(), to = tab.name(), "switching tab");
        if previous == Tab::Overview {
            sampler.stop();
            self.state.unmount_overview();
        } else {
            self.state.detach_list(previous);
        }
        self.state.current_tab = tab;
        self.enter_tab(sampler, tx);
    }

    fn switch_node(&mut self, node: Node, sampler: &mut Sampler, tx: &UnboundedSender<ListUpdate>) {
        if node == self.state.node {
            return;
        }
        info!(from = %self.state.node, to = %node, "switching node");
        self.state.node = node;
        self.state.status_message = Some(format!("Switched to {} node", node));
        self.state.reset_lists();
        self.enter_tab(sampler, tx);
    }

    /// Mounts the current tab: starts sampling or issues the list fetch.
    fn enter_tab(&mut self, sampler: &mut Sampler, tx: &UnboundedSender<ListUpdate>) {
        match self.state.current_tab {
            Tab::Overview => {
                self.state.mount_overview();
                sampler.start(self.state.node);
            }
            tab => self.load_list(tab, tx),
        }
    }

    fn load_list(&mut self, tab: Tab, tx: &UnboundedSender<ListUpdate>) {
        let api = self.api.clone();
        let tx = tx.clone();
        let node = self.state.node;
        match tab {
            Tab::Overview => {}
            Tab::Applications => {
                let apps_epoch = self.state.applications.begin();
                let services_epoch = self.state.services.begin();
                tokio::spawn(async move {
                    let (apps, services) = tokio::join!(api.applications(node), api.services(node));
                    let _ = tx.send(ListUpdate {
                        epoch: apps_epoch,
                        payload: ListPayload::Applications(apps.into_result()),
                    });
                    let _ = tx.send(ListUpdate {
                        epoch: services_epoch,
                        payload: ListPayload::Services(
                            services.into_result().map(ServiceInventory::into_rows),
                        ),
                    });
                });
            }
            Tab::Failover => {
                let epoch = self.state.failover.begin();
                let query = self.state.failover_query();
                debug!(filter = %self.state.failover_filter.summary(), "loading failover history");
                tokio::spawn(async move {
                    let result = api.failover_history(&query).await.into_result();
                    let _ = tx.send(ListUpdate {
                        epoch,
                        payload: ListPayload::Failover(result),
                    });
                });
            }
            Tab::Sessions => {
                let epoch = self.state.sessions.begin();
                let query = self.state.session_query();
                debug!(filter = %self.state.session_filter.summary(), "loading user sessions");
                tokio::spawn(async move {
                    let result = api.user_sessions(&query).await.into_result();
                    let _ = tx.send(ListUpdate {
                        epoch,
                        payload: ListPayload::Sessions(result),
                    });
                });
            }
        }
    }

    /// Downloads the current tab's filtered list as CSV into the export
    /// directory. The outcome is reported in the status line.
    fn export(&mut self, tx: &UnboundedSender<ListUpdate>) {
        let Some(request) = self.state.export_request() else {
            return;
        };
        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let path = self.config.export_dir.join(request.file_name(&stamp));
        info!(endpoint = request.endpoint(), path = %path.display(), "exporting list");
        self.state.status_message = Some("Exporting…".to_string());

        let api = self.api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = match api.export_csv(&request).await.into_result() {
                Ok(csv) => match tokio::fs::write(&path, csv).await {
                    Ok(()) => Ok(path),
                    Err(e) => Err(format!("cannot write {}: {}", path.display(), e)),
                },
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(ListUpdate {
                epoch: 0,
                payload: ListPayload::Exported(result),
            });
        });
    }

    fn fetch_capabilities(&self, tx: &UnboundedSender<ListUpdate>) {
        let api = self.api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = api.capabilities().await.into_result();
            let _ = tx.send(ListUpdate {
                epoch: 0,
                payload: ListPayload::Capabilities(result),
            });
        });
    }
}
