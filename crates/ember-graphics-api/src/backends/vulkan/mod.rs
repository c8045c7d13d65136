mod api;
mod descriptor_pool;
mod descriptor_set_layout;
mod descriptor_set_writer;
mod device_context;
mod internal;
mod root_signature;
mod shader_module;

pub use device_context::VulkanExternalDevice;

pub(crate) mod backend_impl {
    pub(crate) type BackendApi = super::api::VulkanApi;
    pub(crate) type BackendDeviceContext = super::device_context::VulkanDeviceContext;
    pub(crate) type BackendDescriptorPool = super::descriptor_pool::VulkanDescriptorPool;
    pub(crate) type BackendDescriptorSetHandle = ash::vk::DescriptorSet;
    pub(crate) type BackendDescriptorSetLayout =
        super::descriptor_set_layout::VulkanDescriptorSetLayout;
    pub(crate) type BackendDescriptorSetWriter =
        super::descriptor_set_writer::VulkanDescriptorSetWriter;
    pub(crate) type BackendRootSignature = super::root_signature::VulkanRootSignature;
    pub(crate) type BackendShaderModule = super::shader_module::VulkanShaderModule;

    pub(crate) type BackendRawBuffer = ash::vk::Buffer;
    pub(crate) type BackendRawImageView = ash::vk::ImageView;
    pub(crate) type BackendRawSampler = ash::vk::Sampler;
}
