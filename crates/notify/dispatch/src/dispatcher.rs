//! Event dispatch.
//!
//! Turns one workflow event into persisted notifications, live hub
//! pushes, and out-of-band channel sends for every recipient, then
//! echoes report lifecycle events to the department group. Channel
//! sends run on background tasks so a slow gateway never stalls the
//! workflow request that triggered the event.

use crate::channels::{send_with_retry, ChannelMessage, ChannelSender, DEFAULT_SEND_RETRY_DELAYS};
use crate::preferences::{PreferenceProvider, StaticPreferences};
use crate::recipients::recipients_for;
use crate::DispatchResult;
use approval_directory::UserDirectory;
use approval_engine::WorkflowEngine;
use approval_types::{
    Department, Report, ReportPriority, User, UserId, WorkflowEvent, WorkflowEventType,
};
use notify_hub::{Group, NotificationHub};
use notify_store::NotificationStore;
use notify_types::{
    Channel, ChannelPreferences, HubEvent, Notification, NotificationId, NotificationPriority,
    NotificationType, ReportEventMeta,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Dispatch tuning.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Extra users notified when a department's report completes
    pub stakeholders: HashMap<Department, Vec<UserId>>,
    /// Backoff schedule for out-of-band channel sends
    pub send_retry_delays: Vec<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            stakeholders: HashMap::new(),
            send_retry_delays: DEFAULT_SEND_RETRY_DELAYS.to_vec(),
        }
    }
}

/// Outcome of notifying one recipient.
#[derive(Clone, Debug)]
pub struct NotificationSendResult {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    /// Whether the notification reached the store
    pub persisted: bool,
    /// Live connections the notification was pushed to
    pub hub_deliveries: usize,
    /// Out-of-band channels a send was started on
    pub channels_attempted: Vec<Channel>,
}

/// Fans workflow events out to stored notifications, hub connections,
/// and external channels.
pub struct NotificationDispatcher {
    engine: Arc<WorkflowEngine>,
    directory: Arc<dyn UserDirectory>,
    store: Arc<dyn NotificationStore>,
    hub: Arc<NotificationHub>,
    senders: Vec<Arc<dyn ChannelSender>>,
    preferences: Arc<dyn PreferenceProvider>,
    config: DispatchConfig,
}

impl NotificationDispatcher {
    pub fn new(
        engine: Arc<WorkflowEngine>,
        directory: Arc<dyn UserDirectory>,
        store: Arc<dyn NotificationStore>,
        hub: Arc<NotificationHub>,
    ) -> Self {
        Self {
            engine,
            directory,
            store,
            hub,
            senders: Vec::new(),
            preferences: Arc::new(StaticPreferences::new()),
            config: DispatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an out-of-band channel sender.
    pub fn with_sender(mut self, sender: Arc<dyn ChannelSender>) -> Self {
        self.senders.push(sender);
        self
    }

    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceProvider>) -> Self {
        self.preferences = preferences;
        self
    }

    /// Fan a workflow event out to everyone it concerns.
    pub async fn handle(
        &self,
        event: &WorkflowEvent,
    ) -> DispatchResult<Vec<NotificationSendResult>> {
        let report = self.engine.report(&event.report_id)?;
        let recipients =
            recipients_for(event, &report, &self.directory, &self.config.stakeholders).await?;

        let mut results = Vec::with_capacity(recipients.len());
        for recipient in &recipients {
            results.push(self.notify_user(event, &report, recipient).await);
        }

        if let Some(echo) = scope_event(event) {
            self.hub
                .push_to_group(&Group::Department(event.department), &echo)
                .await;
        }

        info!(
            event = event.event_type.as_str(),
            report_id = %event.report_id,
            recipients = results.len(),
            "dispatched workflow event"
        );
        Ok(results)
    }

    async fn notify_user(
        &self,
        event: &WorkflowEvent,
        report: &Report,
        recipient: &User,
    ) -> NotificationSendResult {
        let notification = build_notification(event, report, recipient);
        let notification_id = notification.id.clone();

        // A store outage degrades to live-only delivery rather than
        // swallowing the event.
        let persisted = match self.store.insert(notification.clone()).await {
            Ok(()) => true,
            Err(error) => {
                warn!(user = %recipient.id, %error, "failed to persist notification");
                false
            }
        };

        let hub_event = HubEvent::ReceiveNotification {
            notification: notification.clone(),
        };
        let hub_deliveries = self.hub.push(&recipient.id, &hub_event).await;
        let channels_attempted = self.send_channels(event, recipient, &notification).await;

        NotificationSendResult {
            notification_id,
            user_id: recipient.id.clone(),
            persisted,
            hub_deliveries,
            channels_attempted,
        }
    }

    /// Start background sends on every channel the recipient has
    /// enabled. Returns the channels a send was started on.
    async fn send_channels(
        &self,
        event: &WorkflowEvent,
        recipient: &User,
        notification: &Notification,
    ) -> Vec<Channel> {
        if self.senders.is_empty() {
            return Vec::new();
        }
        let preferences = match self.preferences.preferences(&recipient.id).await {
            Ok(preferences) => preferences,
            Err(error) => {
                warn!(user = %recipient.id, %error, "preference lookup failed, using defaults");
                ChannelPreferences::default()
            }
        };

        let message = ChannelMessage::render(notification, event);
        let mut attempted = Vec::new();
        for sender in &self.senders {
            let channel = sender.channel();
            if !preferences.enabled(channel) {
                continue;
            }
            attempted.push(channel);

            let sender = Arc::clone(sender);
            let recipient = recipient.clone();
            let message = message.clone();
            let delays = self.config.send_retry_delays.clone();
            tokio::spawn(async move {
                if let Err(error) =
                    send_with_retry(sender.as_ref(), &recipient, &message, &delays).await
                {
                    error!(
                        user = %recipient.id,
                        channel = channel.as_str(),
                        %error,
                        "channel delivery abandoned"
                    );
                }
            });
        }
        attempted
    }
}

/// Department-scope echo for report lifecycle events. Due warnings and
/// escalations stay personal.
fn scope_event(event: &WorkflowEvent) -> Option<HubEvent> {
    let meta = ReportEventMeta {
        report_id: event.report_id.clone(),
        report_title: event.report_title.clone(),
        department: event.department,
        actor_id: event.actor_id.clone(),
        timestamp: event.timestamp,
    };
    match event.event_type {
        WorkflowEventType::Submission => Some(HubEvent::ReportSubmitted { meta }),
        WorkflowEventType::Approved => Some(HubEvent::ReportApproved { meta }),
        WorkflowEventType::Rejected => Some(HubEvent::ReportRejected { meta }),
        WorkflowEventType::DueDate | WorkflowEventType::Escalation => None,
    }
}

fn build_notification(event: &WorkflowEvent, report: &Report, recipient: &User) -> Notification {
    let is_creator = recipient.id == report.creator_id;

    let (notification_type, title, message) = match event.event_type {
        WorkflowEventType::Submission if is_creator => (
            NotificationType::Info,
            "Report submitted".to_string(),
            format!("Your report \"{}\" is now awaiting review", report.title),
        ),
        WorkflowEventType::Submission => (
            NotificationType::Info,
            "Report awaiting review".to_string(),
            format!(
                "\"{}\" from {} is waiting for your review",
                report.title, report.department
            ),
        ),
        WorkflowEventType::Approved if event.is_final() && is_creator => (
            NotificationType::Success,
            "Report completed".to_string(),
            format!("\"{}\" has been fully approved", report.title),
        ),
        WorkflowEventType::Approved if event.is_final() => (
            NotificationType::Success,
            "Report completed".to_string(),
            format!(
                "\"{}\" from {} has been fully approved",
                report.title, report.department
            ),
        ),
        WorkflowEventType::Approved if is_creator => (
            NotificationType::Info,
            "Report approved by manager".to_string(),
            format!(
                "\"{}\" passed manager review and moved to executive review",
                report.title
            ),
        ),
        WorkflowEventType::Approved => (
            NotificationType::Info,
            "Report awaiting sign-off".to_string(),
            format!(
                "\"{}\" passed manager review and needs your sign-off",
                report.title
            ),
        ),
        WorkflowEventType::Rejected => {
            let stage = event.stage().map(|s| s.as_str()).unwrap_or("review");
            let message = match event.reason() {
                Some(reason) => format!(
                    "\"{}\" was rejected at the {} stage: {}",
                    report.title, stage, reason
                ),
                None => format!("\"{}\" was rejected at the {} stage", report.title, stage),
            };
            (
                NotificationType::Warning,
                "Report rejected".to_string(),
                message,
            )
        }
        WorkflowEventType::DueDate => {
            let message = match report.due_date {
                Some(due) => format!(
                    "\"{}\" is due on {}",
                    report.title,
                    due.format("%Y-%m-%d")
                ),
                None => format!("\"{}\" is due soon", report.title),
            };
            (
                NotificationType::Warning,
                "Report due soon".to_string(),
                message,
            )
        }
        WorkflowEventType::Escalation => (
            NotificationType::Error,
            "Report overdue".to_string(),
            format!(
                "\"{}\" from {} is {} day(s) overdue",
                report.title,
                report.department,
                event.days_overdue().unwrap_or(0)
            ),
        ),
    };

    let mut priority = map_priority(report.priority);
    if event.event_type == WorkflowEventType::Escalation {
        priority = priority.max(NotificationPriority::High);
    }

    Notification::new(recipient.id.clone(), title, message, notification_type)
        .with_priority(priority)
        .with_action_url(format!("/reports/{}", report.id))
}

fn map_priority(priority: ReportPriority) -> NotificationPriority {
    match priority {
        ReportPriority::Low => NotificationPriority::Low,
        ReportPriority::Medium => NotificationPriority::Normal,
        ReportPriority::High => NotificationPriority::High,
        ReportPriority::Critical => NotificationPriority::Critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelResult;
    use approval_directory::InMemoryDirectory;
    use approval_engine::CreateReport;
    use approval_types::{Role, WorkflowEventType};
    use async_trait::async_trait;
    use notify_store::{InMemoryNotificationStore, StoreError, StoreResult};
    use notify_types::NotificationFilter;
    use std::sync::Mutex;

    struct Wiring {
        engine: Arc<WorkflowEngine>,
        directory: Arc<dyn UserDirectory>,
        store: Arc<InMemoryNotificationStore>,
        hub: Arc<NotificationHub>,
    }

    fn wiring() -> Wiring {
        let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryDirectory::with_users([
            User::new("staff-1", "Ana", Role::GeneralStaff, Department::Sales),
            User::new("mgr-sales", "Bo", Role::LineManager, Department::Sales),
            User::new("gm-1", "Dee", Role::Gm, Department::Operations),
            User::new("stake-1", "Finn", Role::GeneralStaff, Department::Sales),
        ]));
        Wiring {
            engine: Arc::new(WorkflowEngine::new(Arc::clone(&directory))),
            directory,
            store: Arc::new(InMemoryNotificationStore::new()),
            hub: Arc::new(NotificationHub::new()),
        }
    }

    fn dispatcher(w: &Wiring) -> NotificationDispatcher {
        NotificationDispatcher::new(
            Arc::clone(&w.engine),
            Arc::clone(&w.directory),
            w.store.clone(),
            Arc::clone(&w.hub),
        )
    }

    async fn submitted_event(w: &Wiring, creator: &str) -> WorkflowEvent {
        let report = w
            .engine
            .create_report(CreateReport {
                title: "Q3 revenue".to_string(),
                creator_id: UserId::new(creator),
                priority: ReportPriority::Medium,
                due_date: None,
            })
            .await
            .unwrap();
        w.engine
            .submit(&report.id, &UserId::new(creator))
            .await
            .unwrap()
    }

    async fn notifications_for(store: &InMemoryNotificationStore, user: &str) -> Vec<Notification> {
        store
            .list(&UserId::new(user), &NotificationFilter::default())
            .await
            .unwrap()
            .items
    }

    struct RecordingSender {
        channel: Channel,
        sent: Mutex<Vec<String>>,
    }

    impl RecordingSender {
        fn new(channel: Channel) -> Self {
            Self {
                channel,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChannelSender for RecordingSender {
        fn channel(&self) -> Channel {
            self.channel
        }

        async fn send(&self, recipient: &User, message: &ChannelMessage) -> ChannelResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push(format!("{}:{}", recipient.id, message.subject));
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl NotificationStore for FailingStore {
        async fn insert(&self, _notification: Notification) -> StoreResult<()> {
            Err(StoreError::Backend("store offline".to_string()))
        }

        async fn get(&self, _id: &NotificationId) -> StoreResult<Option<Notification>> {
            Err(StoreError::Backend("store offline".to_string()))
        }

        async fn list(
            &self,
            _user_id: &UserId,
            _filter: &NotificationFilter,
        ) -> StoreResult<notify_store::NotificationPage> {
            Err(StoreError::Backend("store offline".to_string()))
        }

        async fn mark_read(
            &self,
            _user_id: &UserId,
            _id: &NotificationId,
        ) -> StoreResult<Notification> {
            Err(StoreError::Backend("store offline".to_string()))
        }

        async fn mark_many_read(
            &self,
            _user_id: &UserId,
            _ids: &[NotificationId],
        ) -> StoreResult<Vec<NotificationId>> {
            Err(StoreError::Backend("store offline".to_string()))
        }

        async fn delete(&self, _user_id: &UserId, _id: &NotificationId) -> StoreResult<()> {
            Err(StoreError::Backend("store offline".to_string()))
        }

        async fn clear_all(&self, _user_id: &UserId) -> StoreResult<Vec<NotificationId>> {
            Err(StoreError::Backend("store offline".to_string()))
        }

        async fn unread_count(&self, _user_id: &UserId) -> StoreResult<usize> {
            Err(StoreError::Backend("store offline".to_string()))
        }
    }

    #[tokio::test]
    async fn submission_notifies_creator_and_reviewers() {
        let w = wiring();
        let dispatcher = dispatcher(&w);
        let event = submitted_event(&w, "staff-1").await;

        let results = dispatcher.handle(&event).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.persisted));

        let creator = notifications_for(&w.store, "staff-1").await;
        assert_eq!(creator.len(), 1);
        assert_eq!(creator[0].title, "Report submitted");
        assert_eq!(creator[0].notification_type, NotificationType::Info);

        let manager = notifications_for(&w.store, "mgr-sales").await;
        assert_eq!(manager.len(), 1);
        assert_eq!(manager[0].title, "Report awaiting review");

        // The general manager is not in the manager-review audience.
        assert!(notifications_for(&w.store, "gm-1").await.is_empty());
    }

    #[tokio::test]
    async fn bypass_submission_notifies_general_managers() {
        let w = wiring();
        let dispatcher = dispatcher(&w);
        let event = submitted_event(&w, "mgr-sales").await;

        dispatcher.handle(&event).await.unwrap();

        assert_eq!(notifications_for(&w.store, "mgr-sales").await.len(), 1);
        assert_eq!(notifications_for(&w.store, "gm-1").await.len(), 1);
        assert!(notifications_for(&w.store, "staff-1").await.is_empty());
    }

    #[tokio::test]
    async fn manager_approval_hands_off_to_general_managers() {
        let w = wiring();
        let dispatcher = dispatcher(&w);
        let event = submitted_event(&w, "staff-1").await;
        let approval = w
            .engine
            .approve(&event.report_id, &UserId::new("mgr-sales"), None)
            .await
            .unwrap();

        dispatcher.handle(&approval).await.unwrap();

        let creator = notifications_for(&w.store, "staff-1").await;
        assert_eq!(creator.len(), 1);
        assert_eq!(creator[0].title, "Report approved by manager");

        let gm = notifications_for(&w.store, "gm-1").await;
        assert_eq!(gm.len(), 1);
        assert_eq!(gm[0].title, "Report awaiting sign-off");

        assert!(notifications_for(&w.store, "mgr-sales").await.is_empty());
    }

    #[tokio::test]
    async fn final_approval_reaches_configured_stakeholders() {
        let w = wiring();
        let config = DispatchConfig {
            stakeholders: HashMap::from([(Department::Sales, vec![UserId::new("stake-1")])]),
            ..DispatchConfig::default()
        };
        let dispatcher = dispatcher(&w).with_config(config);

        let event = submitted_event(&w, "staff-1").await;
        w.engine
            .approve(&event.report_id, &UserId::new("mgr-sales"), None)
            .await
            .unwrap();
        let completion = w
            .engine
            .approve(&event.report_id, &UserId::new("gm-1"), None)
            .await
            .unwrap();
        assert!(completion.is_final());

        dispatcher.handle(&completion).await.unwrap();

        let creator = notifications_for(&w.store, "staff-1").await;
        assert_eq!(creator.len(), 1);
        assert_eq!(creator[0].notification_type, NotificationType::Success);

        let stakeholder = notifications_for(&w.store, "stake-1").await;
        assert_eq!(stakeholder.len(), 1);
        assert_eq!(stakeholder[0].title, "Report completed");
    }

    #[tokio::test]
    async fn rejection_notifies_creator_with_reason() {
        let w = wiring();
        let dispatcher = dispatcher(&w);
        let event = submitted_event(&w, "staff-1").await;
        let rejection = w
            .engine
            .reject(
                &event.report_id,
                &UserId::new("mgr-sales"),
                "figures do not reconcile",
            )
            .await
            .unwrap();

        let results = dispatcher.handle(&rejection).await.unwrap();
        assert_eq!(results.len(), 1);

        let creator = notifications_for(&w.store, "staff-1").await;
        assert_eq!(creator.len(), 1);
        assert_eq!(creator[0].notification_type, NotificationType::Warning);
        assert!(creator[0].message.contains("figures do not reconcile"));
        assert!(notifications_for(&w.store, "mgr-sales").await.is_empty());
    }

    #[tokio::test]
    async fn live_connections_get_notification_then_department_echo() {
        let w = wiring();
        let dispatcher = dispatcher(&w);
        let mut rx = w
            .hub
            .register(
                UserId::new("mgr-sales"),
                Department::Sales,
                notify_hub::ConnectionId::generate(),
            )
            .await;

        let event = submitted_event(&w, "staff-1").await;
        let results = dispatcher.handle(&event).await.unwrap();
        let manager_result = results
            .iter()
            .find(|r| r.user_id == UserId::new("mgr-sales"))
            .unwrap();
        assert_eq!(manager_result.hub_deliveries, 1);

        match rx.try_recv().unwrap() {
            HubEvent::ReceiveNotification { notification } => {
                assert_eq!(notification.user_id, UserId::new("mgr-sales"));
            }
            other => panic!("expected notification, got {}", other.name()),
        }
        match rx.try_recv().unwrap() {
            HubEvent::ReportSubmitted { meta } => {
                assert_eq!(meta.report_id, event.report_id);
            }
            other => panic!("expected report echo, got {}", other.name()),
        }
    }

    #[tokio::test]
    async fn due_warnings_skip_the_department_echo() {
        let w = wiring();
        let dispatcher = dispatcher(&w);
        let event = submitted_event(&w, "staff-1").await;

        // A Sales bystander who is not a recipient of due warnings.
        let mut rx = w
            .hub
            .register(
                UserId::new("stake-1"),
                Department::Sales,
                notify_hub::ConnectionId::generate(),
            )
            .await;

        let report = w.engine.report(&event.report_id).unwrap();
        let due = WorkflowEvent::for_report(
            WorkflowEventType::DueDate,
            &report,
            report.creator_id.clone(),
            report.creator_role,
        );
        dispatcher.handle(&due).await.unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn channel_sends_respect_preferences() {
        let w = wiring();
        let email = Arc::new(RecordingSender::new(Channel::Email));
        let chat = Arc::new(RecordingSender::new(Channel::Chat));
        let preferences = Arc::new(StaticPreferences::new());
        preferences.set(
            UserId::new("mgr-sales"),
            ChannelPreferences {
                email: false,
                sms: false,
                chat: true,
            },
        );
        let dispatcher = dispatcher(&w)
            .with_sender(email.clone())
            .with_sender(chat.clone())
            .with_preferences(preferences);

        let event = submitted_event(&w, "staff-1").await;
        let results = dispatcher.handle(&event).await.unwrap();

        let manager_result = results
            .iter()
            .find(|r| r.user_id == UserId::new("mgr-sales"))
            .unwrap();
        assert_eq!(manager_result.channels_attempted, vec![Channel::Chat]);

        let creator_result = results
            .iter()
            .find(|r| r.user_id == UserId::new("staff-1"))
            .unwrap();
        assert_eq!(
            creator_result.channels_attempted,
            vec![Channel::Email, Channel::Chat]
        );

        // Sends run on spawned tasks; give them a beat to land.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(email
            .sent
            .lock()
            .unwrap()
            .iter()
            .all(|entry| !entry.starts_with("mgr-sales:")));
        assert!(chat
            .sent
            .lock()
            .unwrap()
            .iter()
            .any(|entry| entry.starts_with("mgr-sales:")));
    }

    #[tokio::test]
    async fn store_outage_degrades_to_live_delivery() {
        let w = wiring();
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&w.engine),
            Arc::clone(&w.directory),
            Arc::new(FailingStore),
            Arc::clone(&w.hub),
        );
        let mut rx = w
            .hub
            .register(
                UserId::new("staff-1"),
                Department::Sales,
                notify_hub::ConnectionId::generate(),
            )
            .await;

        let event = submitted_event(&w, "staff-1").await;
        let results = dispatcher.handle(&event).await.unwrap();

        assert!(results.iter().all(|r| !r.persisted));
        assert!(matches!(
            rx.try_recv().unwrap(),
            HubEvent::ReceiveNotification { .. }
        ));
    }

    #[tokio::test]
    async fn unknown_report_fails_the_dispatch() {
        let w = wiring();
        let dispatcher = dispatcher(&w);
        let event = submitted_event(&w, "staff-1").await;
        let mut orphan = event.clone();
        orphan.report_id = approval_types::ReportId::generate();

        assert!(dispatcher.handle(&orphan).await.is_err());
    }
}
