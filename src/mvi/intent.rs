/// Marker trait for intents: user actions or the outcome of a side effect.
pub trait Intent: Send + 'static {}
