mod broker;
mod bus;

pub use broker::Broker;
pub use bus::{EventBus, Subscription, SubscriptionHandle};
