//! Per-user event dispatcher
//!
//! Classifies inbound gateway events by user identity, runs the pure
//! conversation transition under that user's session lock, and executes the
//! resulting effects against the task store, the messaging gateway and the
//! session engine.

use super::traits::{MessagingGateway, StoreError, TaskStore};
use crate::db::TaskSummary;
use crate::gateway::{InboundEvent, PromptOption, PromptRef, UserId};
use crate::session::{format_clock, SessionEngine};
use crate::state_machine::{main_menu_options, transition, Command, ConvState, Effect, Event};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// One user's conversation session. Created lazily on first event, kept for
/// the process lifetime. The focus timer itself lives in the session engine.
struct UserSession {
    state: ConvState,
    /// Opaque reference to the last outbound prompt; retracted (best-effort)
    /// before the next one is delivered.
    last_prompt: Option<PromptRef>,
}

/// Event dispatcher over all user sessions.
///
/// Operations on one user are linearized by that user's session lock;
/// sessions for different users are independently schedulable. The registry
/// lock only guards insert-if-absent and lookup, never timer or dialogue
/// work.
pub struct Dispatcher<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    engine: Arc<SessionEngine<S, G>>,
    sessions: RwLock<HashMap<UserId, Arc<Mutex<UserSession>>>>,
}

impl<S, G> Dispatcher<S, G>
where
    S: TaskStore + 'static,
    G: MessagingGateway + 'static,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        let engine = Arc::new(SessionEngine::new(Arc::clone(&store), Arc::clone(&gateway)));
        Self {
            store,
            gateway,
            engine,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The session engine driving this dispatcher's timers.
    pub fn engine(&self) -> &Arc<SessionEngine<S, G>> {
        &self.engine
    }

    /// Current conversation state for a user (Idle if never seen).
    pub async fn conversation_state(&self, owner: UserId) -> ConvState {
        match self.sessions.read().await.get(&owner) {
            Some(session) => session.lock().await.state.clone(),
            None => ConvState::Idle,
        }
    }

    /// Handle one inbound event end to end. Never fails: every outcome,
    /// including rejections and store outages, is reported to the user.
    pub async fn dispatch(&self, inbound: InboundEvent) {
        let owner = inbound.owner();
        let session = self.get_or_create(owner).await;
        let mut session = session.lock().await;

        let event = match inbound {
            InboundEvent::Text { body, .. } => Event::Text { body },
            InboundEvent::Selection { value, .. } => Event::Selection { value },
        };

        let result = transition(&session.state, event);
        tracing::debug!(user = %owner, state = ?result.new_state, "Conversation transition");
        session.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(owner, &mut session, effect).await;
        }
    }

    async fn get_or_create(&self, owner: UserId) -> Arc<Mutex<UserSession>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&owner) {
                return Arc::clone(session);
            }
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(owner).or_insert_with(|| {
            tracing::info!(user = %owner, "New user session");
            Arc::new(Mutex::new(UserSession {
                state: ConvState::Idle,
                last_prompt: None,
            }))
        }))
    }

    async fn execute_effect(&self, owner: UserId, session: &mut UserSession, effect: Effect) {
        match effect {
            Effect::Prompt { text, options } => {
                self.send_prompt(owner, session, &text, &options).await;
            }

            Effect::CreateTask { name, required } => {
                match self.store.create_task(owner, &name, required).await {
                    Ok(task) => {
                        tracing::info!(user = %owner, task = %task.id, required, "Task created");
                        self.send_prompt(
                            owner,
                            session,
                            "Task added to your list!",
                            &main_menu_options(),
                        )
                        .await;
                    }
                    Err(e) => {
                        tracing::error!(user = %owner, error = %e, "Task creation failed");
                        self.send_notice(owner, session, &format!("Could not save the task: {e}"))
                            .await;
                    }
                }
            }

            Effect::ShowOngoingTasks => match self.store.incomplete_tasks(owner).await {
                Ok(tasks) => {
                    let text = render_ongoing(&tasks);
                    self.send_notice(owner, session, &text).await;
                }
                Err(e) => self.report_store_failure(owner, session, &e).await,
            },

            Effect::ShowCompletedTasks => match self.store.completed_tasks(owner).await {
                Ok(tasks) => {
                    let text = render_completed(&tasks);
                    self.send_notice(owner, session, &text).await;
                }
                Err(e) => self.report_store_failure(owner, session, &e).await,
            },

            Effect::PresentTaskSelection => match self.store.incomplete_tasks(owner).await {
                Ok(tasks) if tasks.is_empty() => {
                    // Nothing to select; the dialogue cannot proceed.
                    session.state = ConvState::Idle;
                    self.send_prompt(
                        owner,
                        session,
                        "You have no ongoing tasks. Add one first!",
                        &main_menu_options(),
                    )
                    .await;
                }
                Ok(tasks) => {
                    let options: Vec<PromptOption> = tasks
                        .iter()
                        .map(|t| PromptOption::new(t.name.clone(), t.id.to_string()))
                        .collect();
                    self.send_prompt(
                        owner,
                        session,
                        "Choose a task to work on in this session:",
                        &options,
                    )
                    .await;
                }
                Err(e) => {
                    session.state = ConvState::Idle;
                    self.report_store_failure(owner, session, &e).await;
                }
            },

            Effect::StartTimer { task, duration } => {
                match self.engine.start(owner, task, duration) {
                    Ok(()) => {
                        let text = format!(
                            "Your focus session of {} minutes started!\nI will notify you when it ends.",
                            duration.as_secs() / 60
                        );
                        self.send_prompt(owner, session, &text, &session_options())
                            .await;
                    }
                    Err(e) => self.send_notice(owner, session, &e.to_string()).await,
                }
            }

            Effect::PauseTimer => match self.engine.pause(owner) {
                Ok(remaining) => {
                    let text = format!(
                        "Session paused. Remaining time: {}",
                        format_clock(remaining)
                    );
                    let options = vec![
                        PromptOption::new("Resume session", Command::Resume.value()),
                        PromptOption::new("Back to main menu", Command::MainMenu.value()),
                    ];
                    self.send_prompt(owner, session, &text, &options).await;
                }
                Err(e) => self.send_notice(owner, session, &e.to_string()).await,
            },

            Effect::ResumeTimer => match self.engine.resume(owner) {
                Ok(remaining) => {
                    let text = format!(
                        "Session resumed, {} to go!\nI will notify you when it ends.",
                        format_clock(remaining)
                    );
                    self.send_prompt(owner, session, &text, &session_options())
                        .await;
                }
                Err(e) => self.send_notice(owner, session, &e.to_string()).await,
            },

            Effect::ReportRemaining => match self.engine.remaining(owner) {
                Ok(remaining) => {
                    let text = format!("{} remaining!", format_clock(remaining));
                    self.send_prompt(owner, session, &text, &session_options())
                        .await;
                }
                Err(e) => self.send_notice(owner, session, &e.to_string()).await,
            },
        }
    }

    async fn report_store_failure(
        &self,
        owner: UserId,
        session: &mut UserSession,
        error: &StoreError,
    ) {
        tracing::error!(user = %owner, error = %error, "Task store failure");
        self.send_notice(owner, session, &format!("Something went wrong: {error}"))
            .await;
    }

    async fn send_notice(&self, owner: UserId, session: &mut UserSession, text: &str) {
        let options = [PromptOption::new(
            "Back to main menu",
            Command::MainMenu.value(),
        )];
        self.send_prompt(owner, session, text, &options).await;
    }

    /// Deliver a prompt, retracting the previous one first. Delivery
    /// failures are logged and swallowed; they never abort a transition.
    async fn send_prompt(
        &self,
        owner: UserId,
        session: &mut UserSession,
        text: &str,
        options: &[PromptOption],
    ) {
        if let Some(previous) = session.last_prompt.take() {
            if let Err(e) = self.gateway.retract(&previous).await {
                tracing::debug!(user = %owner, error = %e, "Prompt retraction failed");
            }
        }
        match self.gateway.prompt(owner, text, options).await {
            Ok(prompt_ref) => session.last_prompt = Some(prompt_ref),
            Err(e) => tracing::warn!(user = %owner, error = %e, "Prompt delivery failed"),
        }
    }
}

fn session_options() -> Vec<PromptOption> {
    vec![
        PromptOption::new("Show remaining time", Command::Remaining.value()),
        PromptOption::new("Pause session", Command::Pause.value()),
    ]
}

fn render_ongoing(tasks: &[TaskSummary]) -> String {
    if tasks.is_empty() {
        return "You have no ongoing tasks.".to_string();
    }
    let mut text = String::from("Here are your ongoing tasks:\n");
    for task in tasks {
        text.push_str(&format!(
            "\n{}\n{} of {} intervals done ({:.2}%)\n",
            task.name,
            task.completed,
            task.required,
            task.percent_done()
        ));
    }
    text
}

fn render_completed(tasks: &[TaskSummary]) -> String {
    if tasks.is_empty() {
        return "You have no completed tasks yet.".to_string();
    }
    let mut text = String::from("Here are your completed tasks:\n");
    for task in tasks {
        text.push_str(&format!("\n{} ✅\n", task.name));
    }
    text
}
