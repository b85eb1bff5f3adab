use std::collections::HashMap;

use regex::Regex;
use tokio::sync::RwLock;

use warren_proto::Event;

use crate::error::RouterError;

/// Three compiled regexes and the handler method name to invoke on the
/// subscriber (spec §3, §4.6).
pub struct Subscription {
    pub subscriber: String,
    verb: Regex,
    method: Regex,
    event_type: Regex,
    pub handler_method: String,
}

impl Subscription {
    pub fn compile(
        subscriber: impl Into<String>,
        verb: &str,
        method: &str,
        event_type: &str,
        handler_method: impl Into<String>,
    ) -> Result<Self, RouterError> {
        Ok(Self {
            subscriber: subscriber.into(),
            verb: Regex::new(verb)?,
            method: Regex::new(method)?,
            event_type: Regex::new(event_type)?,
            handler_method: handler_method.into(),
        })
    }

    /// Request events match on verb OR method OR event-type; everything
    /// else matches on event-type alone (spec §4.6).
    pub fn matches(&self, event: &Event) -> bool {
        if !event.event_type.is_request() {
            return self.event_type.is_match(event.event_type.as_str());
        }
        let verb_match = event
            .request
            .as_ref()
            .and_then(|r| r.header.verb.as_ref())
            .is_some_and(|v| self.verb.is_match(&v.second_person) || self.verb.is_match(&v.third_person));
        let method_match = event
            .request
            .as_ref()
            .is_some_and(|r| self.method.is_match(&r.method));
        verb_match || method_match || self.event_type.is_match(event.event_type.as_str())
    }
}

/// Subscriptions keyed by subscriber resource id (spec §4.6: "stores the
/// subscription keyed by resource").
#[derive(Default)]
pub struct SubscriptionTable {
    subscriptions: RwLock<HashMap<String, Subscription>>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, subscription: Subscription) {
        self.subscriptions
            .write()
            .await
            .insert(subscription.subscriber.clone(), subscription);
    }

    pub async fn unsubscribe(&self, subscriber: &str) {
        self.subscriptions.write().await.remove(subscriber);
    }

    /// Subscribers (other than `exclude`) whose subscription matches
    /// `event`, paired with the handler method to invoke on each.
    pub async fn matching(&self, event: &Event, exclude: &str) -> Vec<(String, String)> {
        self.subscriptions
            .read()
            .await
            .values()
            .filter(|sub| sub.subscriber != exclude && sub.matches(event))
            .map(|sub| (sub.subscriber.clone(), sub.handler_method.clone()))
            .collect()
    }
}
