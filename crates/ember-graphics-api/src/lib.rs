//! Graphics Api
//!
//! The resource-binding layer of the Ember renderer: descriptor pool
//! recycling, structural deduplication of descriptor-set layouts, builder
//! style descriptor-set assembly and pipeline-layout derivation from shader
//! reflection. Device creation, swapchain handling and resource uploads are
//! the embedding renderer's concern; this crate only consumes the handles it
//! is given.

// crate-specific lint exceptions:
#![allow(clippy::missing_errors_doc)]
#![cfg_attr(not(any(feature = "vulkan")), allow(dead_code))]

pub mod backends;
pub mod error;
pub mod reflection;
pub mod types;

mod api;
pub use api::*;

mod buffer_view;
pub use buffer_view::*;

mod descriptor_pool;
pub use descriptor_pool::*;

mod descriptor_set_builder;
pub use descriptor_set_builder::*;

mod descriptor_set_layout;
pub use descriptor_set_layout::*;

mod descriptor_set_layout_cache;
pub use descriptor_set_layout_cache::*;

mod descriptor_set_writer;
pub use descriptor_set_writer::*;

mod device_context;
pub use device_context::*;

mod root_signature;
pub use root_signature::*;

mod sampler;
pub use sampler::*;

mod shader;
pub use shader::*;

mod shader_module;
pub use shader_module::*;

mod texture_view;
pub use texture_view::*;

pub mod prelude {
    pub use crate::types::*;
    pub use crate::{
        BufferView, DescriptorPool, DescriptorPoolAllocator, DescriptorSet, DescriptorSetBuilder,
        DescriptorSetHandle, DescriptorSetLayout, DescriptorSetLayoutCache, DescriptorSetWriter,
        DeviceContext, GfxApi, GfxResult, RootSignature, Sampler, Shader, TextureView,
    };
}

pub use error::*;
pub use reflection::*;
pub use types::*;

//
// Constants
//

/// The maximum descriptor set layout index allowed. Vulkan only guarantees up
/// to 4 are available
pub const MAX_DESCRIPTOR_SET_LAYOUTS: usize = 4;
pub const MAX_DESCRIPTOR_BINDINGS: usize = 64;

/// Byte offset of the first vertex-stage push-constant range.
pub const VERTEX_PUSH_CONSTANT_OFFSET: u32 = 0;
/// Byte offset of the first fragment-stage push-constant range. Vulkan
/// guarantees at least 128 bytes of push-constant space, split here into a
/// vertex window and a fragment window.
pub const FRAGMENT_PUSH_CONSTANT_OFFSET: u32 = 128;
