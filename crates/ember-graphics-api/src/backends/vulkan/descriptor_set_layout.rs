use ash::vk;

use crate::{DescriptorBindingDef, DescriptorSetLayout, DeviceContext, GfxResult};

#[derive(Clone, Debug)]
pub(crate) struct VulkanDescriptorSetLayout {
    vk_layout: vk::DescriptorSetLayout,
}

impl VulkanDescriptorSetLayout {
    pub(crate) fn new(
        device_context: &DeviceContext,
        bindings: &[DescriptorBindingDef],
    ) -> GfxResult<Self> {
        let mut vk_bindings = Vec::<vk::DescriptorSetLayoutBinding>::with_capacity(bindings.len());

        for binding in bindings {
            let vk_descriptor_type =
                super::internal::shader_resource_type_to_descriptor_type(
                    binding.shader_resource_type,
                );

            vk_bindings.push(
                vk::DescriptorSetLayoutBinding::builder()
                    .binding(binding.binding)
                    .descriptor_type(vk_descriptor_type)
                    .descriptor_count(binding.element_count_normalized())
                    .stage_flags(super::internal::shader_stage_flags_to_vk(
                        binding.used_in_shader_stages,
                    ))
                    .build(),
            );
        }

        let vk_layout = unsafe {
            device_context.vk_device().create_descriptor_set_layout(
                &*vk::DescriptorSetLayoutCreateInfo::builder().bindings(&vk_bindings),
                None,
            )?
        };

        Ok(Self { vk_layout })
    }

    pub(crate) fn destroy(&self, device_context: &DeviceContext) {
        unsafe {
            device_context
                .vk_device()
                .destroy_descriptor_set_layout(self.vk_layout, None);
        }
    }
}

impl DescriptorSetLayout {
    pub(crate) fn vk_layout(&self) -> vk::DescriptorSetLayout {
        self.inner.backend_layout.vk_layout
    }
}
