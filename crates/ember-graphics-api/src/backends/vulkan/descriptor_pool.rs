use ash::vk;

use crate::{
    DescriptorPoolDef, DescriptorSetHandle, DescriptorSetLayout, DeviceContext, GfxResult,
};

fn add_if_not_zero(
    pool_sizes: &mut Vec<vk::DescriptorPoolSize>,
    ty: vk::DescriptorType,
    descriptor_count: u32,
) {
    if descriptor_count != 0 {
        pool_sizes.push(vk::DescriptorPoolSize {
            ty,
            descriptor_count,
        });
    }
}

impl DescriptorSetHandle {
    /// The raw set handle bound by the embedding renderer at draw recording
    /// time.
    pub fn vk_descriptor_set(&self) -> vk::DescriptorSet {
        self.backend_descriptor_set_handle
    }
}

pub(crate) struct VulkanDescriptorPool {
    vk_pool: vk::DescriptorPool,
}

impl VulkanDescriptorPool {
    pub(crate) fn new(
        device_context: &DeviceContext,
        definition: &DescriptorPoolDef,
    ) -> GfxResult<Self> {
        let mut pool_sizes = Vec::with_capacity(8);

        #[rustfmt::skip]
        {
            add_if_not_zero(&mut pool_sizes, vk::DescriptorType::SAMPLER, definition.sampler_count);
            add_if_not_zero(&mut pool_sizes, vk::DescriptorType::COMBINED_IMAGE_SAMPLER, definition.combined_image_sampler_count);
            add_if_not_zero(&mut pool_sizes, vk::DescriptorType::SAMPLED_IMAGE, definition.sampled_image_count);
            add_if_not_zero(&mut pool_sizes, vk::DescriptorType::STORAGE_IMAGE, definition.storage_image_count);
            add_if_not_zero(&mut pool_sizes, vk::DescriptorType::UNIFORM_BUFFER, definition.uniform_buffer_count);
            add_if_not_zero(&mut pool_sizes, vk::DescriptorType::STORAGE_BUFFER, definition.storage_buffer_count);
        };

        let vk_pool = unsafe {
            device_context.vk_device().create_descriptor_pool(
                &*vk::DescriptorPoolCreateInfo::builder()
                    .max_sets(definition.max_descriptor_sets)
                    .pool_sizes(&pool_sizes),
                None,
            )?
        };

        Ok(Self { vk_pool })
    }

    pub(crate) fn allocate(
        &self,
        device_context: &DeviceContext,
        layout: &DescriptorSetLayout,
    ) -> GfxResult<DescriptorSetHandle> {
        let set_layouts = [layout.vk_layout()];
        let allocate_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.vk_pool)
            .set_layouts(&set_layouts)
            .build();

        let result = unsafe {
            device_context
                .vk_device()
                .allocate_descriptor_sets(&allocate_info)?
        };

        Ok(DescriptorSetHandle {
            backend_descriptor_set_handle: result[0],
        })
    }

    pub(crate) fn reset(&self, device_context: &DeviceContext) -> GfxResult<()> {
        unsafe {
            device_context
                .vk_device()
                .reset_descriptor_pool(self.vk_pool, vk::DescriptorPoolResetFlags::empty())
                .map_err(Into::into)
        }
    }

    pub(crate) fn destroy(&self, device_context: &DeviceContext) {
        unsafe {
            device_context
                .vk_device()
                .destroy_descriptor_pool(self.vk_pool, None);
        }
    }
}
