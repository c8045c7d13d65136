use ash::vk;

use crate::{DescriptorSetLayout, DeviceContext, GfxResult, RootSignature, RootSignatureDef};

#[derive(Debug)]
pub(crate) struct VulkanRootSignature {
    vk_pipeline_layout: vk::PipelineLayout,
}

impl VulkanRootSignature {
    pub(crate) fn new(
        device_context: &DeviceContext,
        definition: &RootSignatureDef,
    ) -> GfxResult<Self> {
        let vk_descriptor_set_layouts: Vec<vk::DescriptorSetLayout> = definition
            .descriptor_set_layouts
            .iter()
            .map(DescriptorSetLayout::vk_layout)
            .collect();

        let vk_push_constant_ranges: Vec<vk::PushConstantRange> = definition
            .push_constant_ranges
            .iter()
            .map(|range| vk::PushConstantRange {
                stage_flags: super::internal::shader_stage_flags_to_vk(range.stage_flags),
                offset: range.offset,
                size: range.size,
            })
            .collect();

        let pipeline_layout_create_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(&vk_descriptor_set_layouts)
            .push_constant_ranges(&vk_push_constant_ranges)
            .build();

        let vk_pipeline_layout = unsafe {
            device_context
                .vk_device()
                .create_pipeline_layout(&pipeline_layout_create_info, None)?
        };

        Ok(Self { vk_pipeline_layout })
    }

    pub(crate) fn destroy(&self, device_context: &DeviceContext) {
        unsafe {
            device_context
                .vk_device()
                .destroy_pipeline_layout(self.vk_pipeline_layout, None);
        }
    }
}

impl RootSignature {
    /// The raw pipeline layout, needed by the embedding renderer to create
    /// pipelines and record binds.
    pub fn vk_pipeline_layout(&self) -> vk::PipelineLayout {
        self.inner.backend_root_signature.vk_pipeline_layout
    }
}
