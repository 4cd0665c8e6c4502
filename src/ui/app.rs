//! Main UI Application
//!
//! A single-screen dashboard: level and progress, balances, the reward shop,
//! the EXP ledger and level history, and a message log fed by engine events.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph},
};
use std::sync::Arc;

use crate::data::DataManager;
use crate::economy::{
    EconomyEngine, EconomyError, EconomyEvent, HabitCompleted, RecordingSink, ResetOptions, TaskCompleted,
    TransactionType, UserId,
};
use crate::progression::{AchievementStats, LevelResolver};
use crate::save::EconomyStore;

/// Maximum messages kept in the log
const MAX_MESSAGES: usize = 50;

/// Message categories for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Progress,
    Currency,
    Achievement,
    Warning,
    System,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub category: MessageCategory,
}

/// Main UI application
pub struct App<S: EconomyStore> {
    engine: EconomyEngine<S>,
    /// Receives engine notifications for the message log
    sink: Arc<RecordingSink>,
    data: DataManager,
    user_id: UserId,
    messages: Vec<Message>,
    /// Selected reward in the shop list
    reward_cursor: usize,
    /// Current habit streak for this session
    streak: u32,
    /// Longest streak seen this session
    best_streak: u32,
    /// Waiting for a second press to confirm a reset
    confirm_reset: bool,
}

impl<S: EconomyStore> App<S> {
    /// Build the app around a store, opening the user's account if needed
    pub fn new(store: S, data: DataManager, user_id: UserId) -> Result<Self, EconomyError> {
        let sink = Arc::new(RecordingSink::new());
        let resolver = LevelResolver::new(data.levels.clone());
        let engine = EconomyEngine::new(store, resolver, data.economy.clone()).with_sink(sink.clone());

        if engine.store().snapshot(&user_id)?.is_none() {
            engine.open_account(&user_id)?;
        }

        let mut app = Self {
            engine,
            sink,
            data,
            user_id,
            messages: Vec::new(),
            reward_cursor: 0,
            streak: 0,
            best_streak: 0,
            confirm_reset: false,
        };
        app.push_message("Welcome back, moonwalker.", MessageCategory::System);
        Ok(app)
    }

    pub fn engine(&self) -> &EconomyEngine<S> {
        &self.engine
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Handle a key press. Returns true when the app should quit.
    pub fn handle_input(&mut self, key: KeyEvent) -> Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        let resetting = std::mem::take(&mut self.confirm_reset);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('h') => self.complete_habit(),
            KeyCode::Char('t') => self.complete_task(),
            KeyCode::Char('c') => self.convert(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.reward_cursor = self.reward_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.data.rewards.rewards.len().saturating_sub(1);
                self.reward_cursor = (self.reward_cursor + 1).min(last);
            }
            KeyCode::Enter => self.purchase_selected(),
            KeyCode::Char('R') => {
                if resetting {
                    self.reset();
                } else {
                    self.confirm_reset = true;
                    self.push_message("Press R again to reset EXP and level.", MessageCategory::Warning);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn complete_habit(&mut self) {
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        let event = HabitCompleted {
            habit_id: "daily-practice".to_string(),
            streak_length: self.streak,
        };
        let result = self.engine.complete_habit(&self.user_id, &event);
        match result {
            Ok(reward) => {
                let text = format!("Habit done: +{} EXP (streak {})", self.data.economy.habit_exp, self.streak);
                self.push_message(&text, MessageCategory::Progress);
                log::debug!("Habit reward: {:?}", reward);
                self.check_achievements();
            }
            Err(e) => self.report(e),
        }
        self.flush_events();
    }

    fn complete_task(&mut self) {
        let event = TaskCompleted { task_id: "quick-task".to_string() };
        match self.engine.complete_task(&self.user_id, &event) {
            Ok(_) => {
                let text = format!("Task done: +{} EXP", self.data.economy.task_exp);
                self.push_message(&text, MessageCategory::Progress);
                self.check_achievements();
            }
            Err(e) => self.report(e),
        }
        self.flush_events();
    }

    fn convert(&mut self) {
        let rate = self.data.economy.conversion_rate;
        let amount = i64::try_from(rate).unwrap_or(i64::MAX);
        match self.engine.convert_exp_to_crystals(&self.user_id, amount) {
            Ok(receipt) => {
                let text = format!("Converted {} EXP into {} crystals", receipt.exp_spent, receipt.crystals_gained);
                self.push_message(&text, MessageCategory::Currency);
            }
            Err(e) => self.report(e),
        }
        self.flush_events();
    }

    fn purchase_selected(&mut self) {
        let Some(reward) = self.data.rewards.rewards.get(self.reward_cursor).cloned() else {
            return;
        };
        match self.engine.purchase_reward(&self.user_id, &reward.id, &self.data.rewards) {
            Ok(_) => {
                let text = format!("Bought {} for {} {}", reward.name, reward.cost, reward.currency);
                self.push_message(&text, MessageCategory::Currency);
            }
            Err(e) => self.report(e),
        }
    }

    fn reset(&mut self) {
        self.streak = 0;
        match self.engine.reset_stats(&self.user_id, ResetOptions::default()) {
            Ok(()) => self.push_message("Stats reset. A new moon rises.", MessageCategory::System),
            Err(e) => self.report(e),
        }
    }

    fn check_achievements(&mut self) {
        let stats = match self.achievement_stats() {
            Ok(stats) => stats,
            Err(e) => return self.report(e),
        };
        if let Err(e) = self.engine.award_achievements(&self.user_id, &stats, &self.data.achievements) {
            self.report(e);
        }
    }

    fn achievement_stats(&self) -> Result<AchievementStats, EconomyError> {
        let account = self.engine.account(&self.user_id)?;
        let completed = self
            .engine
            .recent_transactions(&self.user_id, usize::MAX)?
            .iter()
            .filter(|tx| matches!(tx.kind, TransactionType::HabitCompleted | TransactionType::TaskCompleted))
            .count() as u64;
        Ok(AchievementStats {
            total_completed: completed,
            max_streak: u64::from(self.best_streak),
            level: account.current_level(),
        })
    }

    /// Move engine notifications into the message log
    fn flush_events(&mut self) {
        for event in self.sink.drain() {
            let category = match event {
                EconomyEvent::LevelUp { .. } | EconomyEvent::LevelDown { .. } => MessageCategory::Progress,
                EconomyEvent::CurrencyEarned { .. } => MessageCategory::Currency,
                EconomyEvent::AchievementEarned { .. } => MessageCategory::Achievement,
            };
            self.push_message(&event.summary(), category);
        }
    }

    fn report(&mut self, error: EconomyError) {
        log::warn!("Operation failed for {}: {}", self.user_id, error);
        self.push_message(&error.user_message(), MessageCategory::Warning);
    }

    fn push_message(&mut self, text: &str, category: MessageCategory) {
        self.messages.push(Message { text: text.to_string(), category });
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn render(&self, frame: &mut Frame) {
        frame.render_widget(Clear, frame.area());

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_header(frame, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(4)])
            .split(columns[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[1]);

        self.render_balances(frame, left[0]);
        self.render_shop(frame, left[1]);
        self.render_ledger(frame, right[0]);
        self.render_level_history(frame, right[1]);
        self.render_messages(frame, rows[2]);
        self.render_help(frame, rows[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" LUNARIS ")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (account, progress) = match (
            self.engine.account(&self.user_id),
            self.engine.level_progress(&self.user_id),
        ) {
            (Ok(account), Ok(progress)) => (account, progress),
            _ => {
                frame.render_widget(Paragraph::new("Account unavailable"), inner);
                return;
            }
        };

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let title = Line::from(vec![
            Span::styled(
                format!("Level {} ", progress.level),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(&progress.title, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", progress.description), Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(title), parts[0]);

        let label = if progress.is_max_level() {
            format!("{} EXP (max level)", account.total_exp())
        } else {
            format!("{} / {} EXP", account.total_exp(), progress.next_level_points)
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::LightBlue).bg(Color::Black))
            .ratio(progress.progress)
            .label(label);
        frame.render_widget(gauge, parts[1]);

        let to_next = progress.exp_to_next(account.total_exp());
        let hint = if progress.is_max_level() {
            "The moon is full.".to_string()
        } else {
            format!("{} EXP to level {}", to_next, progress.level + 1)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(Color::Gray))),
            parts[2],
        );
    }

    fn render_balances(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Wallet ")
            .border_style(Style::default().fg(Color::DarkGray));

        let lines = match self.engine.account(&self.user_id) {
            Ok(account) => vec![
                Line::from(vec![
                    Span::styled("Lunar Crystals: ", Style::default().fg(Color::Gray)),
                    Span::styled(account.lunar_crystals().to_string(), Style::default().fg(Color::LightCyan)),
                ]),
                Line::from(vec![
                    Span::styled("Diamonds: ", Style::default().fg(Color::Gray)),
                    Span::styled(account.diamonds().to_string(), Style::default().fg(Color::LightMagenta)),
                ]),
                Line::from(vec![
                    Span::styled("Streak: ", Style::default().fg(Color::Gray)),
                    Span::styled(self.streak.to_string(), Style::default().fg(Color::Green)),
                ]),
            ],
            Err(_) => vec![Line::from("Unavailable")],
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_shop(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Rewards ")
            .border_style(Style::default().fg(Color::DarkGray));

        let items: Vec<ListItem> = self
            .data
            .rewards
            .rewards
            .iter()
            .map(|reward| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<16}", reward.name), Style::default().fg(Color::White)),
                    Span::styled(
                        format!("{} {}", reward.cost, reward.currency),
                        Style::default().fg(Color::LightCyan),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.reward_cursor));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_ledger(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Recent Activity ")
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);

        let transactions = self
            .engine
            .recent_transactions(&self.user_id, inner.height as usize)
            .unwrap_or_default();
        let lines: Vec<Line> = transactions
            .iter()
            .map(|tx| {
                let color = match tx.kind {
                    TransactionType::HabitCompleted | TransactionType::TaskCompleted => Color::Green,
                    TransactionType::LevelUp => Color::Yellow,
                    TransactionType::ConversionLoss => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled(tx.created_at.format("%m-%d %H:%M ").to_string(), Style::default().fg(Color::DarkGray)),
                    Span::styled(format!("{:>+6} ", tx.amount), Style::default().fg(color)),
                    Span::styled(&tx.description, Style::default().fg(Color::White)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_level_history(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Level History ")
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);

        let lines: Vec<Line> = self
            .engine
            .level_history(&self.user_id, inner.height as usize)
            .unwrap_or_default()
            .iter()
            .map(|entry| {
                let (arrow, color) = if entry.is_level_up() {
                    ("▲", Color::Yellow)
                } else {
                    ("▼", Color::LightRed)
                };
                Line::from(vec![
                    Span::styled(format!("{} ", arrow), Style::default().fg(color)),
                    Span::styled(
                        format!("{} -> {} at {} EXP", entry.old_level, entry.new_level, entry.exp_at_level_up),
                        Style::default().fg(Color::White),
                    ),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Messages ")
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);

        let messages: Vec<Line> = self
            .messages
            .iter()
            .rev()
            .take(inner.height as usize)
            .rev()
            .map(|msg| {
                let color = match msg.category {
                    MessageCategory::Progress => Color::Yellow,
                    MessageCategory::Currency => Color::LightCyan,
                    MessageCategory::Achievement => Color::Magenta,
                    MessageCategory::Warning => Color::LightRed,
                    MessageCategory::System => Color::Gray,
                };
                Line::from(Span::styled(&msg.text, Style::default().fg(color)))
            })
            .collect();

        let para = Paragraph::new(messages).block(block);
        frame.render_widget(para, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = " [h] habit  [t] task  [c] convert EXP  [↑/↓] select  [Enter] buy  [R] reset  [q] quit";
        frame.render_widget(
            Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
            area,
        );
    }
}
