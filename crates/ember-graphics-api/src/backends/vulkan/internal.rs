use ash::vk;

use crate::{ShaderResourceType, ShaderStageFlags};

pub(crate) fn shader_resource_type_to_descriptor_type(
    shader_resource_type: ShaderResourceType,
) -> vk::DescriptorType {
    match shader_resource_type {
        ShaderResourceType::Sampler => vk::DescriptorType::SAMPLER,
        ShaderResourceType::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        ShaderResourceType::SampledImage => vk::DescriptorType::SAMPLED_IMAGE,
        ShaderResourceType::StorageImage => vk::DescriptorType::STORAGE_IMAGE,
        ShaderResourceType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        ShaderResourceType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
    }
}

pub(crate) fn shader_stage_flags_to_vk(stages: ShaderStageFlags) -> vk::ShaderStageFlags {
    let mut vk_stages = vk::ShaderStageFlags::empty();
    if stages.intersects(ShaderStageFlags::VERTEX) {
        vk_stages |= vk::ShaderStageFlags::VERTEX;
    }
    if stages.intersects(ShaderStageFlags::FRAGMENT) {
        vk_stages |= vk::ShaderStageFlags::FRAGMENT;
    }
    if stages.intersects(ShaderStageFlags::COMPUTE) {
        vk_stages |= vk::ShaderStageFlags::COMPUTE;
    }
    vk_stages
}
