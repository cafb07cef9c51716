use std::sync::Arc;

use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::broker::Broker;

/// 每个订阅者自己的缓冲。写满后中继阻塞，积压退回传输层的
/// broadcast 缓冲，发布方永远不等订阅者。
const SUBSCRIBER_BUFFER: usize = 16;

/// 实时更新桥：把一次 publish 扇出成每个订阅者独立的、
/// 可取消的字节流。与存储层完全无关，只转发给到手的负载。
#[derive(Clone)]
pub struct EventBus {
    broker: Arc<Broker>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            broker: Arc::new(Broker::new()),
        }
    }

    /// 发布是尽力而为：序列化失败向调用方报告，
    /// 投递层面的任何问题都不影响已经完成的写入。
    pub fn publish<T: Serialize>(&self, topic: &str, payload: &T) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(payload)?;
        let delivered = self.broker.publish(topic, bytes);
        tracing::debug!(topic, delivered, "event published");
        Ok(())
    }

    /// 订阅一个主题。每个订阅有自己的中继任务和取消句柄，
    /// 订阅之后发布的每条消息各收到一份，不回放历史。
    pub fn subscribe(&self, topic: &str) -> Subscription {
        let rx = self.broker.subscribe(topic);
        let (tx, out_rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let token = CancellationToken::new();

        let broker = Arc::clone(&self.broker);
        let relay_token = token.clone();
        let topic = topic.to_string();
        tokio::spawn(async move {
            relay(rx, tx, relay_token).await;
            // 中继的每条退出路径都归还传输层订阅
            broker.release(&topic);
        });

        Subscription {
            rx: out_rx,
            handle: SubscriptionHandle { token },
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

async fn relay(
    mut rx: broadcast::Receiver<Vec<u8>>,
    tx: mpsc::Sender<Vec<u8>>,
    token: CancellationToken,
) {
    loop {
        let payload = tokio::select! {
            _ = token.cancelled() => break,
            received = rx.recv() => match received {
                Ok(payload) => payload,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber fell behind topic buffer");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };
        tokio::select! {
            _ = token.cancelled() => break,
            sent = tx.send(payload) => {
                // 接收端已被丢弃
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}

/// 一条订阅：负载序列加取消句柄。丢弃即取消，
/// 中继与传输层订阅随之释放。
pub struct Subscription {
    rx: mpsc::Receiver<Vec<u8>>,
    handle: SubscriptionHandle,
}

impl Subscription {
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    /// 取消完成后不再交付任何负载，即使缓冲里还有。
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        if self.handle.is_cancelled() {
            return None;
        }
        tokio::select! {
            _ = self.handle.token.cancelled() => None,
            payload = self.rx.recv() => payload,
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<u8>> {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .recv()
                .await
                .map(|payload| (payload, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// 取消句柄。可克隆、可重复调用，重复取消是无害的空操作。
#[derive(Clone)]
pub struct SubscriptionHandle {
    token: CancellationToken,
}

impl SubscriptionHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
