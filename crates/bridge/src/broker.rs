use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;

/// 每个主题 broadcast 通道的容量。慢订阅者最多积压这么多条，
/// 再多就在传输层丢弃（表现为接收端 Lagged）。
const TOPIC_CAPACITY: usize = 64;

/// 进程内主题广播器：按需建通道，最后一个订阅走后回收。
/// 只搬运不透明的字节负载，对主题名没有任何约定。
pub struct Broker {
    topics: RwLock<HashMap<String, broadcast::Sender<Vec<u8>>>>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// 返回收到消息的订阅数。没有订阅者时是空操作。
    pub fn publish(&self, topic: &str, payload: Vec<u8>) -> usize {
        let topics = self.topics.read().unwrap();
        match topics.get(topic) {
            Some(tx) => tx.send(payload).unwrap_or(0),
            None => 0,
        }
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<Vec<u8>> {
        let mut topics = self.topics.write().unwrap();
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// 订阅释放后调用；没有剩余接收者才移除主题。
    pub fn release(&self, topic: &str) {
        let mut topics = self.topics.write().unwrap();
        if let Some(tx) = topics.get(topic) {
            if tx.receiver_count() == 0 {
                topics.remove(topic);
            }
        }
    }

    pub fn topic_count(&self) -> usize {
        self.topics.read().unwrap().len()
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}
