use std::sync::Arc;

use crate::{backends::BackendApi, DeviceContext, GfxResult};

/// Creation parameters for the API. With the default (software) backend an
/// empty definition is enough; the `vulkan` backend additionally requires the
/// externally created device handles, since device/queue setup belongs to the
/// embedding renderer.
#[derive(Default)]
pub struct ApiDef {
    #[cfg(feature = "vulkan")]
    pub vulkan_device: Option<crate::backends::vulkan::VulkanExternalDevice>,
}

pub struct GfxApi {
    device_context: Option<DeviceContext>,

    #[allow(dead_code)]
    pub(crate) backend_api: BackendApi,
}

impl Drop for GfxApi {
    fn drop(&mut self) {
        self.destroy().unwrap();
    }
}

impl GfxApi {
    /// # Safety
    ///
    /// GPU programming is fundamentally unsafe, so all APIs that interact with
    /// the GPU should be considered unsafe. However, APIs are only gated by
    /// unsafe if they can cause undefined behavior on the CPU for reasons
    /// other than interacting with the GPU.
    #[allow(unsafe_code)]
    pub unsafe fn new(api_def: &ApiDef) -> GfxResult<Self> {
        let (backend_api, device_context) = BackendApi::new(api_def)?;

        Ok(Self {
            device_context: Some(device_context),
            backend_api,
        })
    }

    fn destroy(&mut self) -> GfxResult<()> {
        if let Some(device_context) = self.device_context.take() {
            // This should be the final device context; every layout, pool and
            // root signature keeps one alive, so teardown order violations
            // show up here instead of as backend crashes.
            let inner = device_context.inner.clone();
            std::mem::drop(device_context);

            let strong_count = Arc::strong_count(&inner);
            match Arc::try_unwrap(inner) {
                Ok(inner) => std::mem::drop(inner),
                Err(_arc) => {
                    return Err(format!(
                        "Could not destroy device, {} references to it exist",
                        strong_count
                    )
                    .into());
                }
            }
        }

        Ok(())
    }

    pub fn device_context(&self) -> &DeviceContext {
        self.device_context.as_ref().unwrap()
    }
}
