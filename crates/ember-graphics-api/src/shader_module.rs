use std::marker::PhantomData;
use std::sync::Arc;

use crate::{backends::BackendShaderModule, DeviceContext, GfxResult};

/// Owns data necessary to create a shader module.
///
/// This struct can be serialized/deserialized and is intended to allow an
/// asset pipeline to store a shader module to be created at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderPackage {
    SpirV(Vec<u8>),
    Null,
}

impl ShaderPackage {
    pub fn module_def(&self) -> ShaderModuleDef<'_> {
        match self {
            ShaderPackage::SpirV(bytes) => ShaderModuleDef::SpirVBytes(bytes),
            ShaderPackage::Null => ShaderModuleDef::Null(PhantomData),
        }
    }
}

/// Used to create a [`ShaderModule`]
///
/// This enum may be populated manually or created from a [`ShaderPackage`].
#[derive(Copy, Clone, Hash)]
pub enum ShaderModuleDef<'a> {
    /// Raw SPV bytes, no alignment or endianness requirements.
    SpirVBytes(&'a [u8]),
    Null(PhantomData<&'a u8>),
}

pub(crate) struct ShaderModuleInner {
    device_context: DeviceContext,
    pub(crate) backend_shader_module: BackendShaderModule,
}

impl Drop for ShaderModuleInner {
    fn drop(&mut self) {
        self.backend_shader_module.destroy(&self.device_context);
    }
}

#[derive(Clone)]
pub struct ShaderModule {
    pub(crate) inner: Arc<ShaderModuleInner>,
}

impl ShaderModule {
    pub(crate) fn new(device_context: &DeviceContext, data: ShaderModuleDef<'_>) -> GfxResult<Self> {
        let backend_shader_module = BackendShaderModule::new(device_context, data)?;

        Ok(Self {
            inner: Arc::new(ShaderModuleInner {
                device_context: device_context.clone(),
                backend_shader_module,
            }),
        })
    }
}
