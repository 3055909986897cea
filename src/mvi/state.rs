/// Marker trait for reducer-owned state.
///
/// `PartialEq` lets owners skip change notifications when a reduction was a no-op.
pub trait State: Clone + PartialEq + Default + Send + 'static {}
