//! Fan-out of push notifications to matched donors.

use crate::models::{
    AndroidConfig, AndroidNotification, DonorAction, DonorCandidate, NotificationVisibility,
    PushMessage, PushNotification, Units,
};
use crate::ports::PushService;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Routing tag the mobile app uses to open the request screen
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
pub const REQUEST_SCREEN: &str = "bloodRequest";

/// Request details shared by every message in one dispatch
#[derive(Debug, Clone, Copy)]
pub struct NotificationContext<'a> {
    pub request_id: &'a str,
    pub blood_group: &'a str,
    pub units: Option<&'a Units>,
    pub hospital: &'a str,
}

/// Successful send
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub user_id: String,
    pub message_id: String,
}

/// Failed send
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryFailure {
    pub user_id: String,
    pub error: String,
}

/// Per-donor outcome of a dispatch
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub delivered: Vec<Delivery>,
    pub failed: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Sends one push message per candidate, all concurrently
#[derive(Clone)]
pub struct NotificationDispatcher {
    push: Arc<dyn PushService>,
}

impl NotificationDispatcher {
    pub fn new(push: Arc<dyn PushService>) -> Self {
        Self { push }
    }

    /// Send to every candidate and wait until all sends have settled
    ///
    /// A failed send never cancels the others; it is logged and recorded in
    /// the report.
    pub async fn dispatch(
        &self,
        candidates: &[DonorCandidate],
        context: NotificationContext<'_>,
    ) -> DispatchReport {
        let sends = candidates.iter().map(|candidate| {
            let message = build_message(candidate, context);
            async move {
                tracing::info!(
                    "Sending notification to user {} at {}km distance",
                    candidate.user_id,
                    candidate.distance_km
                );
                let outcome = self.push.send(&message).await;
                (candidate, outcome)
            }
        });

        let mut report = DispatchReport::default();

        for (candidate, outcome) in join_all(sends).await {
            match outcome {
                Ok(message_id) => report.delivered.push(Delivery {
                    user_id: candidate.user_id.clone(),
                    message_id,
                }),
                Err(e) => {
                    tracing::warn!(
                        "Notification to user {} for request {} failed: {}",
                        candidate.user_id,
                        context.request_id,
                        e
                    );
                    report.failed.push(DeliveryFailure {
                        user_id: candidate.user_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Dispatched request {}: {} delivered, {} failed",
            context.request_id,
            report.delivered.len(),
            report.failed.len()
        );

        report
    }
}

/// Donor response buttons embedded in the data payload
pub fn donor_actions() -> Vec<DonorAction> {
    vec![
        DonorAction {
            action: "accept".to_string(),
            title: "Accept".to_string(),
        },
        DonorAction {
            action: "reject".to_string(),
            title: "Reject".to_string(),
        },
    ]
}

/// Build the push message for a single donor
pub fn build_message(candidate: &DonorCandidate, context: NotificationContext<'_>) -> PushMessage {
    let body = match context.units {
        Some(units) => format!("{} units needed at {}", units, context.hospital),
        None => format!("Units needed at {}", context.hospital),
    };

    // Serializing a Vec of two string pairs cannot fail.
    let actions = serde_json::to_string(&donor_actions()).unwrap_or_else(|_| "[]".to_string());

    let data = BTreeMap::from([
        ("requestId".to_string(), context.request_id.to_string()),
        ("bloodGroup".to_string(), context.blood_group.to_string()),
        ("hospital".to_string(), context.hospital.to_string()),
        ("click_action".to_string(), CLICK_ACTION.to_string()),
        ("screen".to_string(), REQUEST_SCREEN.to_string()),
        ("actions".to_string(), actions),
    ]);

    PushMessage {
        token: candidate.fcm_token.clone(),
        notification: PushNotification {
            title: format!("{} Blood Required", context.blood_group),
            body,
        },
        data,
        android: AndroidConfig {
            notification: AndroidNotification {
                click_action: CLICK_ACTION.to_string(),
                default_sound: true,
                default_vibrate_timings: true,
                notification_count: 0,
                visibility: NotificationVisibility::Public,
            },
        },
    }
}
