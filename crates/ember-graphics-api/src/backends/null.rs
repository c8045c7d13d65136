use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::{
    ApiDef, DescriptorBindingDef, DescriptorPoolDef, DescriptorRef, DescriptorSetHandle,
    DescriptorSetLayout, DeviceContext, DeviceInfo, GfxError, GfxResult, RootSignatureDef,
    ShaderModuleDef, ShaderResourceType,
};

static NEXT_NULL_HANDLE: AtomicU64 = AtomicU64::new(1);

fn next_handle() -> u64 {
    NEXT_NULL_HANDLE.fetch_add(1, Ordering::Relaxed)
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub(crate) struct NullApi;

impl NullApi {
    /// # Safety
    /// Software implementation, no safety requirements beyond the shared API
    /// contract.
    #[allow(unsafe_code)]
    pub unsafe fn new(api_def: &ApiDef) -> GfxResult<(Self, DeviceContext)> {
        let device_context = DeviceContext::new(api_def)?;
        Ok((Self, device_context))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub(crate) struct NullDeviceContext;

impl NullDeviceContext {
    pub(crate) fn new(_api_def: &ApiDef) -> GfxResult<(Self, DeviceInfo)> {
        // Four bound sets is the floor vulkan guarantees; the push-constant
        // budget leaves room for both the vertex and the fragment window.
        Ok((
            Self,
            DeviceInfo {
                max_bound_descriptor_sets: 4,
                max_push_constants_size: 256,
            },
        ))
    }

    pub(crate) fn destroy(&self) {}
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub(crate) struct NullDescriptorSetLayout {
    handle: u64,
}

impl NullDescriptorSetLayout {
    pub(crate) fn new(
        _device_context: &DeviceContext,
        _bindings: &[DescriptorBindingDef],
    ) -> GfxResult<Self> {
        Ok(Self {
            handle: next_handle(),
        })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}

    pub(crate) fn handle(&self) -> u64 {
        self.handle
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
struct NullPoolCounters {
    remaining_sets: u32,
    remaining_samplers: u32,
    remaining_combined_image_samplers: u32,
    remaining_sampled_images: u32,
    remaining_storage_images: u32,
    remaining_uniform_buffers: u32,
    remaining_storage_buffers: u32,
}

impl From<&DescriptorPoolDef> for NullPoolCounters {
    fn from(definition: &DescriptorPoolDef) -> Self {
        Self {
            remaining_sets: definition.max_descriptor_sets,
            remaining_samplers: definition.sampler_count,
            remaining_combined_image_samplers: definition.combined_image_sampler_count,
            remaining_sampled_images: definition.sampled_image_count,
            remaining_storage_images: definition.storage_image_count,
            remaining_uniform_buffers: definition.uniform_buffer_count,
            remaining_storage_buffers: definition.storage_buffer_count,
        }
    }
}

/// Capacity-tracking stand-in for a fixed-size descriptor pool. Allocation
/// fails exactly like the real thing once sets or any descriptor kind run
/// out, which is what the allocator's retry path is tested against.
#[derive(Debug)]
pub(crate) struct NullDescriptorPool {
    definition: DescriptorPoolDef,
    counters: Mutex<NullPoolCounters>,
}

impl NullDescriptorPool {
    pub(crate) fn new(
        _device_context: &DeviceContext,
        definition: &DescriptorPoolDef,
    ) -> GfxResult<Self> {
        Ok(Self {
            definition: definition.clone(),
            counters: Mutex::new(NullPoolCounters::from(definition)),
        })
    }

    pub(crate) fn allocate(
        &self,
        _device_context: &DeviceContext,
        layout: &DescriptorSetLayout,
    ) -> GfxResult<DescriptorSetHandle> {
        let mut counters = self.counters.lock().unwrap();

        let mut samplers = 0u32;
        let mut combined_image_samplers = 0u32;
        let mut sampled_images = 0u32;
        let mut storage_images = 0u32;
        let mut uniform_buffers = 0u32;
        let mut storage_buffers = 0u32;
        for binding in layout.bindings() {
            let count = binding.element_count_normalized();
            match binding.shader_resource_type {
                ShaderResourceType::Sampler => samplers += count,
                ShaderResourceType::CombinedImageSampler => combined_image_samplers += count,
                ShaderResourceType::SampledImage => sampled_images += count,
                ShaderResourceType::StorageImage => storage_images += count,
                ShaderResourceType::UniformBuffer => uniform_buffers += count,
                ShaderResourceType::StorageBuffer => storage_buffers += count,
            }
        }

        if counters.remaining_sets < 1
            || counters.remaining_samplers < samplers
            || counters.remaining_combined_image_samplers < combined_image_samplers
            || counters.remaining_sampled_images < sampled_images
            || counters.remaining_storage_images < storage_images
            || counters.remaining_uniform_buffers < uniform_buffers
            || counters.remaining_storage_buffers < storage_buffers
        {
            return Err(GfxError::OutOfPoolMemory);
        }

        counters.remaining_sets -= 1;
        counters.remaining_samplers -= samplers;
        counters.remaining_combined_image_samplers -= combined_image_samplers;
        counters.remaining_sampled_images -= sampled_images;
        counters.remaining_storage_images -= storage_images;
        counters.remaining_uniform_buffers -= uniform_buffers;
        counters.remaining_storage_buffers -= storage_buffers;

        Ok(DescriptorSetHandle {
            backend_descriptor_set_handle: next_handle(),
        })
    }

    pub(crate) fn reset(&self, _device_context: &DeviceContext) -> GfxResult<()> {
        *self.counters.lock().unwrap() = NullPoolCounters::from(&self.definition);
        Ok(())
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default)]
pub(crate) struct NullDescriptorSetWriter {
    queued_writes: u32,
}

impl NullDescriptorSetWriter {
    pub(crate) fn new(_descriptor_set_layout: &DescriptorSetLayout) -> GfxResult<Self> {
        Ok(Self::default())
    }

    pub(crate) fn queue_descriptors(
        &mut self,
        _descriptor_set: &DescriptorSetHandle,
        _descriptor: &DescriptorBindingDef,
        refs: &[DescriptorRef<'_>],
    ) {
        self.queued_writes += refs.len() as u32;
    }

    pub(crate) fn flush(&self, _device_context: &DeviceContext) {}
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub(crate) struct NullRootSignature {
    handle: u64,
}

impl NullRootSignature {
    pub(crate) fn new(
        _device_context: &DeviceContext,
        _definition: &RootSignatureDef,
    ) -> GfxResult<Self> {
        Ok(Self {
            handle: next_handle(),
        })
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}

    pub(crate) fn handle(&self) -> u64 {
        self.handle
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub(crate) struct NullShaderModule;

impl NullShaderModule {
    pub(crate) fn new(
        _device_context: &DeviceContext,
        _data: ShaderModuleDef<'_>,
    ) -> GfxResult<Self> {
        Ok(Self)
    }

    pub(crate) fn destroy(&self, _device_context: &DeviceContext) {}
}

////////////////////////////////////////////////////////////////////////////////////////////////////

pub(crate) mod backend_impl {
    pub(crate) type BackendApi = super::NullApi;
    pub(crate) type BackendDeviceContext = super::NullDeviceContext;
    pub(crate) type BackendDescriptorPool = super::NullDescriptorPool;
    pub(crate) type BackendDescriptorSetHandle = u64;
    pub(crate) type BackendDescriptorSetLayout = super::NullDescriptorSetLayout;
    pub(crate) type BackendDescriptorSetWriter = super::NullDescriptorSetWriter;
    pub(crate) type BackendRootSignature = super::NullRootSignature;
    pub(crate) type BackendShaderModule = super::NullShaderModule;

    pub(crate) type BackendRawBuffer = u64;
    pub(crate) type BackendRawImageView = u64;
    pub(crate) type BackendRawSampler = u64;
}
