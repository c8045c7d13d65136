use ash::vk;

use crate::{DeviceContext, GfxResult, ShaderModule, ShaderModuleDef};

#[derive(Debug)]
pub(crate) struct VulkanShaderModule {
    vk_shader_module: vk::ShaderModule,
}

impl VulkanShaderModule {
    pub(crate) fn new(device_context: &DeviceContext, data: ShaderModuleDef<'_>) -> GfxResult<Self> {
        match data {
            ShaderModuleDef::SpirVBytes(bytes) => Self::new_from_bytes(device_context, bytes),
            ShaderModuleDef::Null(_) => {
                Err("the vulkan backend requires SPIR-V bytecode".into())
            }
        }
    }

    fn new_from_bytes(device_context: &DeviceContext, data: &[u8]) -> GfxResult<Self> {
        let spv = ash::util::read_spv(&mut std::io::Cursor::new(data))?;

        let vk_shader_module = unsafe {
            device_context.vk_device().create_shader_module(
                &*vk::ShaderModuleCreateInfo::builder().code(&spv),
                None,
            )?
        };

        Ok(Self { vk_shader_module })
    }

    pub(crate) fn destroy(&self, device_context: &DeviceContext) {
        unsafe {
            device_context
                .vk_device()
                .destroy_shader_module(self.vk_shader_module, None);
        }
    }
}

impl ShaderModule {
    /// The raw module handle, needed by the embedding renderer to create
    /// pipeline stages.
    pub fn vk_shader_module(&self) -> vk::ShaderModule {
        self.inner.backend_shader_module.vk_shader_module
    }
}
