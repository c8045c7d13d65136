use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::trace;

use crate::backends::BackendDeviceContext;
use crate::{
    ApiDef, DescriptorPool, DescriptorPoolDef, DescriptorSetLayout, DescriptorSetLayoutDef,
    GfxResult, RootSignature, RootSignatureDef, Shader, ShaderModule, ShaderModuleDef,
    ShaderStageDef,
};

/// Limits reported by the device/context setup layer. Only the ones this
/// subsystem consults are carried.
#[derive(Clone, Copy, Debug)]
pub struct DeviceInfo {
    /// Maximum number of simultaneously bound descriptor sets.
    pub max_bound_descriptor_sets: u32,
    /// Total push-constant space in bytes.
    pub max_push_constants_size: u32,
}

pub(crate) struct DeviceContextInner {
    device_info: DeviceInfo,
    destroyed: AtomicBool,

    pub(crate) backend_device_context: BackendDeviceContext,
}

impl Drop for DeviceContextInner {
    fn drop(&mut self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            trace!("destroying device context");
            self.backend_device_context.destroy();
        }
    }
}

/// Cloneable handle to the device every API object is created from. The
/// underlying device is owned by the embedding renderer; dropping the last
/// `DeviceContext` only releases this crate's bookkeeping.
#[derive(Clone)]
pub struct DeviceContext {
    pub(crate) inner: Arc<DeviceContextInner>,
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("device_info", &self.inner.device_info)
            .finish()
    }
}

impl DeviceContext {
    pub(crate) fn new(api_def: &ApiDef) -> GfxResult<Self> {
        let (backend_device_context, device_info) = BackendDeviceContext::new(api_def)?;

        Ok(Self {
            inner: Arc::new(DeviceContextInner {
                device_info,
                destroyed: AtomicBool::new(false),
                backend_device_context,
            }),
        })
    }

    pub fn create_descriptor_set_layout(
        &self,
        definition: &DescriptorSetLayoutDef,
    ) -> GfxResult<DescriptorSetLayout> {
        DescriptorSetLayout::new(self, definition)
    }

    pub fn create_descriptor_pool(&self, definition: &DescriptorPoolDef) -> GfxResult<DescriptorPool> {
        DescriptorPool::new(self, definition)
    }

    pub fn create_root_signature(
        &self,
        definition: RootSignatureDef,
    ) -> GfxResult<RootSignature> {
        RootSignature::new(self, definition)
    }

    pub fn create_shader_module(&self, data: ShaderModuleDef<'_>) -> GfxResult<ShaderModule> {
        ShaderModule::new(self, data)
    }

    pub fn create_shader(&self, stages: Vec<ShaderStageDef>) -> GfxResult<Shader> {
        Shader::new(self, stages)
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.inner.device_info
    }
}
