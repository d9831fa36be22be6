use std::collections::hash_map::Entry;
use std::collections::HashMap;

use xframe_wire::{
    decode_envelope, encode_envelope, Envelope, EventMessage, FrameIdentity, Sentinel,
    TransportId, WireError, DATA, EVENT_BATCH,
};

use crate::config::RouterConfig;
use crate::creative::CreativeRouter;
use crate::error::{Result, RouterError};
use crate::report::Reporter;

/// Transport id assigned to raw data messages, which carry no sender.
pub const DEFAULT_TRANSPORT_ID: &str = "default";

type InstanceHandler = Box<dyn FnMut(&mut CreativeRouter)>;

/// Why a message was not routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No envelope marker; someone else's traffic.
    Foreign,
    /// Marker present but the body did not decode.
    Undecodable,
    /// Addressed to a different frame.
    OtherSentinel,
    /// A message type this router does not handle.
    UnknownType,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Ignored(IgnoreReason),
    Routed {
        /// Events delivered or buffered.
        events: usize,
        /// Creative routers created by this message.
        new_instances: usize,
    },
}

/// Demultiplexes the vendor frame's inbound channel into creative routers.
pub struct InboundRouter {
    identity: FrameIdentity,
    creative_routers: HashMap<TransportId, CreativeRouter>,
    /// Creatives the instance handler has not seen yet, in first-seen order.
    unannounced: Vec<TransportId>,
    instance_handler: Option<InstanceHandler>,
    reporter: Reporter,
}

impl InboundRouter {
    /// Create a router from the frame's identity payload (its window name).
    ///
    /// Fails if the payload carries no sentinel.
    pub fn new(identity_payload: &str, config: RouterConfig) -> Result<Self> {
        let identity = FrameIdentity::parse(identity_payload).map_err(RouterError::Identity)?;
        Ok(Self::from_identity(identity, config))
    }

    /// Create a router from an already parsed identity.
    pub fn from_identity(identity: FrameIdentity, config: RouterConfig) -> Self {
        tracing::debug!(sentinel = %identity.sentinel, "Created inbound router");
        Self {
            identity,
            creative_routers: HashMap::new(),
            unannounced: Vec::new(),
            instance_handler: None,
            reporter: Reporter::new(config.assertion_mode),
        }
    }

    /// Register the vendor hook called once for every newly seen creative.
    ///
    /// The hook is where vendor code registers its events listener.
    ///
    /// Creatives that arrived while no hook was set are announced now, in the
    /// order they were first seen, and their buffered batches replayed by
    /// whatever listener the hook registers.
    pub fn set_instance_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut CreativeRouter) + 'static,
    {
        let mut handler: InstanceHandler = Box::new(handler);
        for transport_id in std::mem::take(&mut self.unannounced) {
            if let Some(creative) = self.creative_routers.get_mut(&transport_id) {
                tracing::debug!(%transport_id, "Announcing buffered analytics instance");
                handler(creative);
            }
        }
        self.instance_handler = Some(handler);
    }

    pub fn sentinel(&self) -> &Sentinel {
        &self.identity.sentinel
    }

    pub fn script_src(&self) -> Option<&str> {
        self.identity.script_src.as_deref()
    }

    pub fn creative_routers(&self) -> &HashMap<TransportId, CreativeRouter> {
        &self.creative_routers
    }

    pub fn creative_router(&self, transport_id: &TransportId) -> Option<&CreativeRouter> {
        self.creative_routers.get(transport_id)
    }

    pub fn creative_router_mut(&mut self, transport_id: &TransportId) -> Option<&mut CreativeRouter> {
        self.creative_routers.get_mut(transport_id)
    }

    /// Configuration errors reported so far.
    pub fn reported_errors(&self) -> &[String] {
        self.reporter.reported()
    }

    /// Configuration errors reported since creation, retained or not.
    pub fn reported_error_count(&self) -> usize {
        self.reporter.total()
    }

    /// The readiness signal this frame posts to its host once routing is set up.
    pub fn ready_message(&self) -> Result<String> {
        Ok(encode_envelope(&Envelope::ready(self.sentinel().clone()))?)
    }

    /// Handle one raw message from the inbound channel.
    pub fn on_message(&mut self, raw: &str) -> Result<RouteOutcome> {
        let envelope = match decode_envelope(raw) {
            Ok(envelope) => envelope,
            Err(WireError::MissingMarker) => return Ok(RouteOutcome::Ignored(IgnoreReason::Foreign)),
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring undecodable message");
                return Ok(RouteOutcome::Ignored(IgnoreReason::Undecodable));
            }
        };

        if envelope.sentinel != self.identity.sentinel {
            tracing::trace!(sentinel = %envelope.sentinel, "Ignoring message for another frame");
            return Ok(RouteOutcome::Ignored(IgnoreReason::OtherSentinel));
        }

        let events = match envelope.msg_type.as_str() {
            EVENT_BATCH => envelope.events.unwrap_or_default(),
            DATA => vec![EventMessage::new(
                TransportId::from(DEFAULT_TRANSPORT_ID),
                data_to_event(envelope.data),
            )],
            other => {
                tracing::debug!(msg_type = other, "Ignoring unhandled message type");
                return Ok(RouteOutcome::Ignored(IgnoreReason::UnknownType));
            }
        };

        self.route(events)
    }

    fn route(&mut self, events: Vec<EventMessage>) -> Result<RouteOutcome> {
        let total = events.len();
        let mut new_instances = 0usize;
        // Under strict assertions the first failure is returned once every
        // group has been delivered or buffered.
        let mut failure: Option<RouterError> = None;

        for (transport_id, messages) in group_by_transport(events) {
            let creative = match self.creative_routers.entry(transport_id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let key = entry.key().clone();
                    new_instances += 1;
                    tracing::debug!(transport_id = %key, "New analytics instance");
                    self.unannounced.push(key.clone());
                    entry.insert(CreativeRouter::new(key))
                }
            };

            if let Some(pos) = self
                .unannounced
                .iter()
                .position(|id| id == creative.transport_id())
            {
                match self.instance_handler.as_mut() {
                    Some(handler) => {
                        self.unannounced.remove(pos);
                        handler(&mut *creative);
                    }
                    None => {
                        creative.buffer(messages);
                        let reported = self.reporter.report(format!(
                            "Must implement onNewAmpAnalyticsInstance in {}",
                            self.identity.script_src.as_deref().unwrap_or("vendor script")
                        ));
                        if let Err(err) = reported {
                            failure.get_or_insert(err);
                        }
                        continue;
                    }
                }
            }

            if let Err(err) = creative.dispatch(messages) {
                if let Err(err) = self.reporter.report(err.to_string()) {
                    failure.get_or_insert(err);
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }
        Ok(RouteOutcome::Routed {
            events: total,
            new_instances,
        })
    }

    /// Route messages from `inbound` until the channel closes.
    ///
    /// Returns the number of messages that were routed rather than ignored.
    #[cfg(feature = "async")]
    pub async fn listen(&mut self, inbound: &mut tokio::sync::mpsc::Receiver<String>) -> Result<usize> {
        let mut routed = 0usize;
        while let Some(raw) = inbound.recv().await {
            if let RouteOutcome::Routed { .. } = self.on_message(&raw)? {
                routed += 1;
            }
        }
        Ok(routed)
    }
}

impl std::fmt::Debug for InboundRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundRouter")
            .field("identity", &self.identity)
            .field("creative_routers", &self.creative_routers.len())
            .field("unannounced", &self.unannounced.len())
            .field("has_instance_handler", &self.instance_handler.is_some())
            .field("reporter", &self.reporter)
            .finish()
    }
}

/// Group events by transport id, keeping first-seen order of ids and arrival
/// order within each id.
fn group_by_transport(events: Vec<EventMessage>) -> Vec<(TransportId, Vec<String>)> {
    let mut index: HashMap<TransportId, usize> = HashMap::new();
    let mut groups: Vec<(TransportId, Vec<String>)> = Vec::new();
    for event in events {
        match index.entry(event.transport_id) {
            Entry::Occupied(slot) => groups[*slot.get()].1.push(event.message),
            Entry::Vacant(slot) => {
                groups.push((slot.key().clone(), vec![event.message]));
                slot.insert(groups.len() - 1);
            }
        }
    }
    groups
}

fn data_to_event(data: Option<serde_json::Value>) -> String {
    match data {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Seen = Rc<RefCell<Vec<(String, Vec<String>)>>>;

    fn router(sentinel: &str) -> InboundRouter {
        let payload = format!(r#"{{"sentinel": "{sentinel}"}}"#);
        InboundRouter::new(&payload, RouterConfig::default()).unwrap()
    }

    /// Handler that registers a listener recording `(transport id, batch)`.
    fn recording_handler(router: &mut InboundRouter) -> (Seen, Rc<RefCell<usize>>) {
        let seen: Seen = Rc::new(RefCell::new(Vec::new()));
        let calls = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        let counter = Rc::clone(&calls);
        router.set_instance_handler(move |creative| {
            *counter.borrow_mut() += 1;
            let id = creative.transport_id().to_string();
            let sink = Rc::clone(&sink);
            creative.register_events_listener(move |events| {
                sink.borrow_mut().push((id.clone(), events.to_vec()));
            });
        });
        (seen, calls)
    }

    fn batch(sentinel: &str, events: &[(&str, &str)]) -> String {
        let events = events
            .iter()
            .map(|(id, message)| EventMessage::new(TransportId::from(*id), *message))
            .collect();
        encode_envelope(&Envelope::event_batch(Sentinel::from(sentinel), events)).unwrap()
    }

    #[test]
    fn fails_without_identity_payload() {
        let err = InboundRouter::new("", RouterConfig::default()).unwrap_err();
        assert!(matches!(err, RouterError::Identity(WireError::MissingIdentity)));

        let err = InboundRouter::new("some_name", RouterConfig::default()).unwrap_err();
        assert!(matches!(err, RouterError::Identity(WireError::MalformedIdentity(_))));
    }

    #[test]
    fn sets_sentinel_from_identity_payload() {
        let router = router("5001");
        assert_eq!(router.sentinel().as_str(), "5001");
        assert!(router.script_src().is_none());
    }

    #[test]
    fn initially_has_no_creative_routers() {
        let router = router("5001");
        assert!(router.creative_routers().is_empty());
        assert!(router.reported_errors().is_empty());
    }

    #[test]
    fn new_transport_id_creates_one_router_and_calls_handler_once() {
        let mut router = router("7");
        let (seen, calls) = recording_handler(&mut router);

        let outcome = router.on_message(&batch("7", &[("9", "x")])).unwrap();
        assert_eq!(
            outcome,
            RouteOutcome::Routed {
                events: 1,
                new_instances: 1
            }
        );
        assert_eq!(router.creative_routers().len(), 1);
        assert!(router.creative_router(&TransportId::from("9")).is_some());
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(*seen.borrow(), [("9".to_string(), vec!["x".to_string()])]);

        router.on_message(&batch("7", &[("9", "y")])).unwrap();
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn other_sentinel_is_ignored() {
        let mut router = router("7");
        let (_, calls) = recording_handler(&mut router);

        let outcome = router.on_message(&batch("8", &[("9", "x")])).unwrap();
        assert_eq!(outcome, RouteOutcome::Ignored(IgnoreReason::OtherSentinel));
        assert!(router.creative_routers().is_empty());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn foreign_and_broken_messages_are_ignored() {
        let mut router = router("7");
        assert_eq!(
            router.on_message(r#"{"type":"resize"}"#).unwrap(),
            RouteOutcome::Ignored(IgnoreReason::Foreign)
        );
        assert_eq!(
            router.on_message("amp-{not json").unwrap(),
            RouteOutcome::Ignored(IgnoreReason::Undecodable)
        );
        let ready = router.ready_message().unwrap();
        assert_eq!(
            router.on_message(&ready).unwrap(),
            RouteOutcome::Ignored(IgnoreReason::UnknownType)
        );
        assert!(router.reported_errors().is_empty());
    }

    #[test]
    fn delivers_all_events_for_one_id_in_one_call_in_order() {
        let mut router = router("7");
        let (seen, _) = recording_handler(&mut router);

        router
            .on_message(&batch(
                "7",
                &[
                    ("103", "something happened"),
                    ("103", "something else happened"),
                    ("103", "a third thing happened"),
                ],
            ))
            .unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "103");
        assert_eq!(
            seen[0].1,
            [
                "something happened",
                "something else happened",
                "a third thing happened"
            ]
        );
    }

    #[test]
    fn mixed_batch_is_split_per_transport() {
        let mut router = router("7");
        let (seen, calls) = recording_handler(&mut router);

        let outcome = router
            .on_message(&batch("7", &[("1", "a1"), ("2", "b1"), ("1", "a2")]))
            .unwrap();
        assert_eq!(
            outcome,
            RouteOutcome::Routed {
                events: 3,
                new_instances: 2
            }
        );
        assert_eq!(*calls.borrow(), 2);

        let seen = seen.borrow();
        let for_one: Vec<&Vec<String>> = seen
            .iter()
            .filter(|(id, _)| id == "1")
            .map(|(_, events)| events)
            .collect();
        assert_eq!(for_one, [&vec!["a1".to_string(), "a2".to_string()]]);
    }

    #[test]
    fn missing_instance_handler_reports_must_implement() {
        let mut router = router("7");
        let outcome = router.on_message(&batch("7", &[("102", "hello, world!")])).unwrap();

        assert!(matches!(outcome, RouteOutcome::Routed { .. }));
        assert!(!router.reported_errors().is_empty());
        assert!(router
            .reported_errors()
            .iter()
            .any(|message| message.contains("Must implement onNewAmpAnalyticsInstance")));
    }

    #[test]
    fn missing_instance_handler_fails_fast_when_strict() {
        let mut router = InboundRouter::new(r#"{"sentinel":"7"}"#, RouterConfig::strict()).unwrap();
        let err = router
            .on_message(&batch("7", &[("102", "hello, world!")]))
            .unwrap_err();

        assert!(matches!(err, RouterError::Configuration(ref m) if m.contains("Must implement")));
    }

    #[test]
    fn strict_missing_handler_keeps_batch_for_late_handler() {
        let mut router = InboundRouter::new(r#"{"sentinel":"7"}"#, RouterConfig::strict()).unwrap();
        let err = router.on_message(&batch("7", &[("9", "lost")])).unwrap_err();
        assert!(matches!(err, RouterError::Configuration(_)));

        let creative = router.creative_router(&TransportId::from("9")).unwrap();
        assert_eq!(creative.backlog_len(), 1);

        let (seen, calls) = recording_handler(&mut router);
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(*seen.borrow(), [("9".to_string(), vec!["lost".to_string()])]);

        let outcome = router.on_message(&batch("7", &[("9", "after-handler")])).unwrap();
        assert_eq!(
            outcome,
            RouteOutcome::Routed {
                events: 1,
                new_instances: 0
            }
        );
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(
            seen.borrow().last(),
            Some(&("9".to_string(), vec!["after-handler".to_string()]))
        );
        assert_eq!(router.reported_errors().len(), 1);
    }

    #[test]
    fn late_handler_drains_everything_buffered_in_report_mode() {
        let mut router = router("7");
        router.on_message(&batch("7", &[("9", "a")])).unwrap();
        router.on_message(&batch("7", &[("9", "b")])).unwrap();
        assert_eq!(
            router
                .creative_router(&TransportId::from("9"))
                .unwrap()
                .backlog_len(),
            2
        );

        let (seen, calls) = recording_handler(&mut router);
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(
            router
                .creative_router(&TransportId::from("9"))
                .unwrap()
                .backlog_len(),
            0
        );

        router.on_message(&batch("7", &[("9", "c")])).unwrap();
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(router.reported_errors().len(), 2);
        assert_eq!(router.reported_error_count(), 2);
    }

    #[test]
    fn strict_failure_still_buffers_every_group_of_the_message() {
        let mut router = InboundRouter::new(r#"{"sentinel":"7"}"#, RouterConfig::strict()).unwrap();
        router
            .on_message(&batch("7", &[("1", "a"), ("2", "b")]))
            .unwrap_err();

        for id in ["1", "2"] {
            let creative = router.creative_router(&TransportId::from(id)).unwrap();
            assert_eq!(creative.backlog_len(), 1);
        }
    }

    #[test]
    fn grouping_keeps_first_seen_id_order() {
        let events = ["3", "1", "3", "2", "1"]
            .iter()
            .enumerate()
            .map(|(n, id)| EventMessage::new(TransportId::from(*id), n.to_string()))
            .collect();
        let groups = group_by_transport(events);

        let ids: Vec<&str> = groups.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["3", "1", "2"]);
        assert_eq!(groups[0].1, ["0", "2"]);
        assert_eq!(groups[1].1, ["1", "4"]);
        assert_eq!(groups[2].1, ["3"]);
    }

    #[test]
    fn handler_without_listener_reports_and_buffers_until_registration() {
        let mut router = router("7");
        router.set_instance_handler(|_creative| {});

        router.on_message(&batch("7", &[("5", "first")])).unwrap();
        router.on_message(&batch("7", &[("5", "second"), ("5", "third")])).unwrap();
        assert_eq!(router.reported_errors().len(), 2);
        assert!(router.reported_errors()[0].contains("no events listener"));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        router
            .creative_router_mut(&TransportId::from("5"))
            .unwrap()
            .register_events_listener(move |events| sink.borrow_mut().push(events.to_vec()));

        assert_eq!(
            *seen.borrow(),
            [
                vec!["first".to_string()],
                vec!["second".to_string(), "third".to_string()]
            ]
        );
    }

    #[test]
    fn data_message_goes_to_default_transport() {
        let mut router = router("7");
        let (seen, _) = recording_handler(&mut router);

        let raw = encode_envelope(&Envelope::data(
            Sentinel::from("7"),
            serde_json::json!("raw payload"),
        ))
        .unwrap();
        router.on_message(&raw).unwrap();

        let structured = encode_envelope(&Envelope::data(
            Sentinel::from("7"),
            serde_json::json!({"k": 1}),
        ))
        .unwrap();
        router.on_message(&structured).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (DEFAULT_TRANSPORT_ID.to_string(), vec!["raw payload".to_string()]));
        assert_eq!(seen[1].1, [r#"{"k":1}"#]);
    }

    #[test]
    fn ready_message_carries_own_sentinel() {
        let router = router("12");
        let ready = decode_envelope(&router.ready_message().unwrap()).unwrap();
        assert_eq!(ready.msg_type, xframe_wire::READY);
        assert_eq!(ready.sentinel.as_str(), "12");
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn listen_drains_channel_until_closed() {
        let mut router = router("7");
        let (seen, _) = recording_handler(&mut router);
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);

        tx.send(batch("7", &[("1", "a")])).await.unwrap();
        tx.send(batch("8", &[("1", "b")])).await.unwrap();
        tx.send(batch("7", &[("2", "c")])).await.unwrap();
        drop(tx);

        let routed = router.listen(&mut rx).await.unwrap();
        assert_eq!(routed, 2);
        assert_eq!(seen.borrow().len(), 2);
    }
}
