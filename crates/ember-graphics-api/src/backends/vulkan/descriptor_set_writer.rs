use ash::vk;
use smallvec::SmallVec;

use crate::{
    DescriptorBindingDef, DescriptorRef, DescriptorSetHandle, DescriptorSetLayout, DeviceContext,
    GfxResult, ShaderResourceType, MAX_DESCRIPTOR_BINDINGS,
};

struct PendingWrite {
    dst_set: vk::DescriptorSet,
    dst_binding: u32,
    vk_descriptor_type: vk::DescriptorType,
    first_info: usize,
    info_count: usize,
    is_image_info: bool,
}

/// Accumulates descriptor writes as owned vulkan info structs and submits
/// them in a single `update_descriptor_sets` call on flush, so a set is
/// either fully written or not written at all.
pub(crate) struct VulkanDescriptorSetWriter {
    vk_image_infos: Vec<vk::DescriptorImageInfo>,
    vk_buffer_infos: Vec<vk::DescriptorBufferInfo>,
    pending_writes: SmallVec<[PendingWrite; MAX_DESCRIPTOR_BINDINGS]>,
}

impl VulkanDescriptorSetWriter {
    pub(crate) fn new(descriptor_set_layout: &DescriptorSetLayout) -> GfxResult<Self> {
        if descriptor_set_layout.vk_layout() == vk::DescriptorSetLayout::null() {
            return Err("Invalid vulkan DescriptorSetLayout".into());
        }

        Ok(Self {
            vk_image_infos: Vec::with_capacity(
                descriptor_set_layout.image_info_count() as usize
            ),
            vk_buffer_infos: Vec::with_capacity(
                descriptor_set_layout.buffer_info_count() as usize,
            ),
            pending_writes: SmallVec::new(),
        })
    }

    pub(crate) fn queue_descriptors(
        &mut self,
        descriptor_set: &DescriptorSetHandle,
        descriptor: &DescriptorBindingDef,
        refs: &[DescriptorRef<'_>],
    ) {
        let vk_descriptor_type = super::internal::shader_resource_type_to_descriptor_type(
            descriptor.shader_resource_type,
        );

        match descriptor.shader_resource_type {
            ShaderResourceType::Sampler => {
                let first_info = self.vk_image_infos.len();
                for descriptor_ref in refs {
                    if let DescriptorRef::Sampler(sampler) = descriptor_ref {
                        self.vk_image_infos.push(vk::DescriptorImageInfo {
                            sampler: sampler.raw_sampler,
                            image_view: vk::ImageView::null(),
                            image_layout: vk::ImageLayout::UNDEFINED,
                        });
                    } else {
                        unreachable!();
                    }
                }
                self.push_image_write(descriptor_set, descriptor, vk_descriptor_type, first_info);
            }
            ShaderResourceType::CombinedImageSampler => {
                let first_info = self.vk_image_infos.len();
                for descriptor_ref in refs {
                    if let DescriptorRef::CombinedImageSampler(texture_view, sampler) =
                        descriptor_ref
                    {
                        self.vk_image_infos.push(vk::DescriptorImageInfo {
                            sampler: sampler.raw_sampler,
                            image_view: texture_view.raw_image_view,
                            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                        });
                    } else {
                        unreachable!();
                    }
                }
                self.push_image_write(descriptor_set, descriptor, vk_descriptor_type, first_info);
            }
            ShaderResourceType::SampledImage => {
                let first_info = self.vk_image_infos.len();
                for descriptor_ref in refs {
                    if let DescriptorRef::TextureView(texture_view) = descriptor_ref {
                        self.vk_image_infos.push(vk::DescriptorImageInfo {
                            sampler: vk::Sampler::null(),
                            image_view: texture_view.raw_image_view,
                            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                        });
                    } else {
                        unreachable!();
                    }
                }
                self.push_image_write(descriptor_set, descriptor, vk_descriptor_type, first_info);
            }
            ShaderResourceType::StorageImage => {
                let first_info = self.vk_image_infos.len();
                for descriptor_ref in refs {
                    if let DescriptorRef::TextureView(texture_view) = descriptor_ref {
                        self.vk_image_infos.push(vk::DescriptorImageInfo {
                            sampler: vk::Sampler::null(),
                            image_view: texture_view.raw_image_view,
                            image_layout: vk::ImageLayout::GENERAL,
                        });
                    } else {
                        unreachable!();
                    }
                }
                self.push_image_write(descriptor_set, descriptor, vk_descriptor_type, first_info);
            }
            ShaderResourceType::UniformBuffer | ShaderResourceType::StorageBuffer => {
                let first_info = self.vk_buffer_infos.len();
                for descriptor_ref in refs {
                    if let DescriptorRef::BufferView(buffer_view) = descriptor_ref {
                        self.vk_buffer_infos.push(vk::DescriptorBufferInfo {
                            buffer: buffer_view.raw_buffer,
                            offset: buffer_view.offset(),
                            range: buffer_view.size(),
                        });
                    } else {
                        unreachable!();
                    }
                }
                self.pending_writes.push(PendingWrite {
                    dst_set: descriptor_set.backend_descriptor_set_handle,
                    dst_binding: descriptor.binding,
                    vk_descriptor_type,
                    first_info,
                    info_count: self.vk_buffer_infos.len() - first_info,
                    is_image_info: false,
                });
            }
        }
    }

    fn push_image_write(
        &mut self,
        descriptor_set: &DescriptorSetHandle,
        descriptor: &DescriptorBindingDef,
        vk_descriptor_type: vk::DescriptorType,
        first_info: usize,
    ) {
        self.pending_writes.push(PendingWrite {
            dst_set: descriptor_set.backend_descriptor_set_handle,
            dst_binding: descriptor.binding,
            vk_descriptor_type,
            first_info,
            info_count: self.vk_image_infos.len() - first_info,
            is_image_info: true,
        });
    }

    pub(crate) fn flush(&self, device_context: &DeviceContext) {
        let mut vk_pending_writes =
            SmallVec::<[vk::WriteDescriptorSet; MAX_DESCRIPTOR_BINDINGS]>::with_capacity(
                self.pending_writes.len(),
            );

        for pending in &self.pending_writes {
            let write_descriptor_builder = vk::WriteDescriptorSet::builder()
                .dst_set(pending.dst_set)
                .dst_binding(pending.dst_binding)
                .dst_array_element(0)
                .descriptor_type(pending.vk_descriptor_type);

            let info_range = pending.first_info..pending.first_info + pending.info_count;
            let vk_write = if pending.is_image_info {
                write_descriptor_builder
                    .image_info(&self.vk_image_infos[info_range])
                    .build()
            } else {
                write_descriptor_builder
                    .buffer_info(&self.vk_buffer_infos[info_range])
                    .build()
            };

            vk_pending_writes.push(vk_write);
        }

        unsafe {
            device_context
                .vk_device()
                .update_descriptor_sets(&vk_pending_writes, &[]);
        }
    }
}
