use std::{error::Error, sync::Arc};

pub type GfxResult<T> = Result<T, GfxError>;

/// Generic error that contains all the different kinds of errors that may
/// occur when using the API
#[derive(Debug, Clone)]
pub enum GfxError {
    StringError(String),
    IoError(Arc<std::io::Error>),
    /// The active descriptor pool has no capacity left for the requested
    /// shape, either because it ran out of sets or because it is fragmented.
    /// This is the only transient error in the crate: the pool allocator
    /// retries it once on a fresh pool before surfacing it.
    OutOfPoolMemory,
    #[cfg(feature = "vulkan")]
    VkError(ash::vk::Result),
}

impl std::fmt::Display for GfxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StringError(msg) => write!(f, "{}", msg),
            Self::IoError(e) => e.fmt(f),
            Self::OutOfPoolMemory => write!(f, "descriptor pool exhausted"),
            #[cfg(feature = "vulkan")]
            Self::VkError(e) => e.fmt(f),
        }
    }
}

impl Error for GfxError {}

impl From<&str> for GfxError {
    fn from(str: &str) -> Self {
        Self::StringError(str.to_string())
    }
}

impl From<String> for GfxError {
    fn from(string: String) -> Self {
        Self::StringError(string)
    }
}

impl From<std::io::Error> for GfxError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(Arc::new(error))
    }
}

#[cfg(feature = "vulkan")]
impl From<ash::vk::Result> for GfxError {
    fn from(result: ash::vk::Result) -> Self {
        match result {
            ash::vk::Result::ERROR_OUT_OF_POOL_MEMORY
            | ash::vk::Result::ERROR_FRAGMENTED_POOL => Self::OutOfPoolMemory,
            other => Self::VkError(other),
        }
    }
}
