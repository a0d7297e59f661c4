//! Fire-once scenes
//!
//! An action runs its side effect exactly once. Whatever the outcome, the
//! runner never retries it; retrying a failed call is the client's job.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::ops::{Invoker, Publisher, QueueSender, StreamWriter};
use crate::common::Result;
use crate::playbook::{Outcome, Scene};
use crate::stack::{ResourceRegistry, Target};

/// Callback receiving an action's result (message ID, response payload)
type Hook<T> = Box<dyn FnMut(&T) -> Result<()> + Send>;

/// Serialize `value` to the text sent as a message body. A JSON string is
/// sent as-is rather than quoted.
fn to_message<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// Free-form step running arbitrary test code
pub struct AdLib {
    label: String,
    callback: Box<dyn FnMut() -> Result<()> + Send>,
}

impl AdLib {
    pub fn new<F>(label: impl Into<String>, callback: F) -> Self
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        Self {
            label: label.into(),
            callback: Box::new(callback),
        }
    }
}

#[async_trait]
impl Scene for AdLib {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn attempt(&mut self, _registry: &ResourceRegistry) -> Result<Outcome> {
        (self.callback)()?;
        Ok(Outcome::Done)
    }
}

/// Publish a message to a topic
pub struct Publish {
    publisher: Arc<dyn Publisher>,
    topic: Target,
    message: Vec<u8>,
    on_published: Option<Hook<String>>,
}

impl Publish {
    pub fn message(publisher: Arc<dyn Publisher>, topic: Target, message: impl Into<Vec<u8>>) -> Self {
        Self {
            publisher,
            topic,
            message: message.into(),
            on_published: None,
        }
    }

    /// Publish `object` serialized as JSON
    pub fn object<T: Serialize + ?Sized>(
        publisher: Arc<dyn Publisher>,
        topic: Target,
        object: &T,
    ) -> Result<Self> {
        Ok(Self::message(publisher, topic, serde_json::to_vec(object)?))
    }

    /// Receive the published message ID
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&String) -> Result<()> + Send + 'static,
    {
        self.on_published = Some(Box::new(callback));
        self
    }
}

#[async_trait]
impl Scene for Publish {
    fn label(&self) -> String {
        format!("Publish message to {}", self.topic)
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let topic_arn = self.topic.arn(registry)?;
        let message_id = self.publisher.publish(&topic_arn, &self.message).await?;
        debug!(topic = %topic_arn, message_id = %message_id, "Published message");

        if let Some(hook) = self.on_published.as_mut() {
            hook(&message_id)?;
        }
        Ok(Outcome::Done)
    }
}

/// Invoke a function and optionally inspect its response
pub struct Invoke {
    invoker: Arc<dyn Invoker>,
    function: Target,
    payload: Vec<u8>,
    on_response: Option<Hook<Vec<u8>>>,
}

impl Invoke {
    pub fn new(invoker: Arc<dyn Invoker>, function: Target, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            invoker,
            function,
            payload: payload.into(),
            on_response: None,
        }
    }

    /// Invoke with `event` serialized as JSON
    pub fn event<T: Serialize + ?Sized>(
        invoker: Arc<dyn Invoker>,
        function: Target,
        event: &T,
    ) -> Result<Self> {
        Ok(Self::new(invoker, function, serde_json::to_vec(event)?))
    }

    /// Invoke with a topic notification event carrying `message`
    pub fn sns_event<T: Serialize + ?Sized>(
        invoker: Arc<dyn Invoker>,
        function: Target,
        message: &T,
    ) -> Result<Self> {
        let event = serde_json::json!({
            "Records": [{
                "EventSource": "aws:sns",
                "EventVersion": "1.0",
                "Sns": { "Message": to_message(message)? }
            }]
        });
        Self::event(invoker, function, &event)
    }

    /// Receive the response payload
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Vec<u8>) -> Result<()> + Send + 'static,
    {
        self.on_response = Some(Box::new(callback));
        self
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[async_trait]
impl Scene for Invoke {
    fn label(&self) -> String {
        format!("Invoke function {}", self.function)
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let function_arn = self.function.arn(registry)?;
        let response = self.invoker.invoke(&function_arn, &self.payload).await?;
        debug!(function = %function_arn, bytes = response.len(), "Function invoked");

        if let Some(hook) = self.on_response.as_mut() {
            hook(&response)?;
        }
        Ok(Outcome::Done)
    }
}

/// Send a message to a queue
pub struct SendMessage {
    sender: Arc<dyn QueueSender>,
    queue: Target,
    body: String,
    on_sent: Option<Hook<String>>,
}

impl SendMessage {
    pub fn new(sender: Arc<dyn QueueSender>, queue: Target, body: impl Into<String>) -> Self {
        Self {
            sender,
            queue,
            body: body.into(),
            on_sent: None,
        }
    }

    /// Send `object` serialized as JSON
    pub fn object<T: Serialize + ?Sized>(
        sender: Arc<dyn QueueSender>,
        queue: Target,
        object: &T,
    ) -> Result<Self> {
        Ok(Self::new(sender, queue, serde_json::to_string(object)?))
    }

    /// Receive the sent message ID
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&String) -> Result<()> + Send + 'static,
    {
        self.on_sent = Some(Box::new(callback));
        self
    }
}

#[async_trait]
impl Scene for SendMessage {
    fn label(&self) -> String {
        format!("Send message to {}", self.queue)
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let queue = self.queue.name(registry)?;
        let message_id = self.sender.send_message(&queue, &self.body).await?;
        debug!(queue = %queue, message_id = %message_id, "Sent message");

        if let Some(hook) = self.on_sent.as_mut() {
            hook(&message_id)?;
        }
        Ok(Outcome::Done)
    }
}

/// Put one record on a stream
pub struct PutRecord {
    writer: Arc<dyn StreamWriter>,
    stream: Target,
    data: Vec<u8>,
}

impl PutRecord {
    pub fn new(writer: Arc<dyn StreamWriter>, stream: Target, data: impl Into<Vec<u8>>) -> Self {
        Self {
            writer,
            stream,
            data: data.into(),
        }
    }
}

#[async_trait]
impl Scene for PutRecord {
    fn label(&self) -> String {
        format!("Put record to {}", self.stream)
    }

    async fn attempt(&mut self, registry: &ResourceRegistry) -> Result<Outcome> {
        let stream = self.stream.name(registry)?;
        self.writer.put_record(&stream, &self.data).await?;
        debug!(stream = %stream, bytes = self.data.len(), "Put record");
        Ok(Outcome::Done)
    }
}
