#[cfg(feature = "vulkan")]
pub mod vulkan;
#[cfg(feature = "vulkan")]
pub(crate) use vulkan::backend_impl::*;

/// Software implementation of all types: tracks pool capacities and hands
/// out opaque handles, so the whole subsystem runs without a GPU.
#[cfg(not(feature = "vulkan"))]
pub mod null;
#[cfg(not(feature = "vulkan"))]
pub(crate) use null::backend_impl::*;
